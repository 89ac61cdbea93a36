//! Extraction of `name = [ ['url', 'region', 'description'], ... ]` tables
//! from userscript source.
//!
//! The source is tokenized once ([`ScannedScript`]); each array is then
//! located by name and its elements walked with bracket-depth tracking.
//! Nothing here performs I/O or logs: callers decide what a missing or
//! unterminated array means for them.

mod lexer;
mod locate;
mod tuples;

use crate::core::config::DEFAULT_NEWLINE_TOKEN;
use crate::types::{ArrayExtraction, ProxyRecord};
use lexer::{Lexer, Token};

/// Tokenized script, reusable across several array names.
pub struct ScannedScript<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
}

impl<'a> ScannedScript<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Lexer::new(source).collect(),
        }
    }

    /// 1-based line number of a byte offset.
    fn line_of(&self, offset: usize) -> usize {
        self.source[..offset].matches('\n').count() + 1
    }
}

#[derive(Debug, Clone)]
pub struct ArrayScraper {
    newline_token: String,
}

impl Default for ArrayScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrayScraper {
    pub fn new() -> Self {
        Self {
            newline_token: DEFAULT_NEWLINE_TOKEN.to_string(),
        }
    }

    /// Use a different escaped-newline marker. An empty token falls back to
    /// the default `&#10;`.
    pub fn with_newline_token(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.is_empty() {
            return Self::new();
        }
        Self {
            newline_token: token,
        }
    }

    /// Extract one array from raw source text.
    pub fn extract(&self, source: &str, array_name: &str) -> ArrayExtraction {
        self.extract_scanned(&ScannedScript::new(source), array_name)
    }

    /// Extract one array from an already tokenized script.
    pub fn extract_scanned(
        &self,
        script: &ScannedScript<'_>,
        array_name: &str,
    ) -> ArrayExtraction {
        let Some(start) = script.find_declaration(array_name) else {
            return ArrayExtraction::missing();
        };

        let mut extraction = self.collect_elements(&script.tokens[start..]);
        // `start` is past `name = [`; the name token sits three back.
        extraction.line = Some(script.line_of(script.tokens[start - 3].offset));
        extraction
    }
}

/// Records of `array_name` in first-occurrence order, deduplicated by url.
/// An absent array yields an empty vector.
pub fn extract_records(source: &str, array_name: &str) -> Vec<ProxyRecord> {
    ArrayScraper::new().extract(source, array_name).records
}
