use std::collections::HashSet;

use super::lexer::{Token, TokenKind};
use super::ArrayScraper;
use crate::types::{ArrayExtraction, ArrayStatus, ProxyRecord};

impl ArrayScraper {
    /// Walks the array body starting at `tokens[0]` (just past the opening
    /// `[`) and collects its top-level elements.
    ///
    /// Nesting of `[`, `{` and `(` is tracked so commas inside an element do
    /// not split it. The walk stops at the `]` that closes the array; if the
    /// tokens run out first the result is `Unterminated` but keeps every
    /// element completed so far.
    pub(super) fn collect_elements(&self, tokens: &[Token<'_>]) -> ArrayExtraction {
        let mut out = ArrayExtraction {
            records: Vec::new(),
            status: ArrayStatus::Unterminated,
            skipped: 0,
            duplicates: 0,
            line: None,
        };
        let mut seen_urls = HashSet::new();
        let mut element: Vec<&Token<'_>> = Vec::new();
        let mut depth = 0usize;

        for token in tokens {
            match token.kind {
                TokenKind::Punct(']') if depth == 0 => {
                    self.finish_element(&element, &mut seen_urls, &mut out);
                    out.status = ArrayStatus::Complete;
                    return out;
                }
                TokenKind::Punct(',') if depth == 0 => {
                    self.finish_element(&element, &mut seen_urls, &mut out);
                    element.clear();
                }
                TokenKind::Punct('[' | '{' | '(') => {
                    depth += 1;
                    element.push(token);
                }
                TokenKind::Punct(']' | '}' | ')') => {
                    depth = depth.saturating_sub(1);
                    element.push(token);
                }
                _ => element.push(token),
            }
        }

        self.finish_element(&element, &mut seen_urls, &mut out);
        out
    }

    fn finish_element(
        &self,
        element: &[&Token<'_>],
        seen_urls: &mut HashSet<String>,
        out: &mut ArrayExtraction,
    ) {
        // Holes and trailing commas.
        if element.is_empty() {
            return;
        }

        let Some(record) = self.record_from_tuple(element) else {
            out.skipped += 1;
            return;
        };

        if seen_urls.insert(record.url.clone()) {
            out.records.push(record);
        } else {
            out.duplicates += 1;
        }
    }

    /// Accepts exactly `['url', 'region', 'description']` with an optional
    /// trailing comma. Each run of whitespace in a field folds to one space
    /// and the ends are trimmed; the newline token in the description is
    /// expanded afterwards. An empty url rejects the entry.
    fn record_from_tuple(&self, element: &[&Token<'_>]) -> Option<ProxyRecord> {
        let kinds: Vec<&TokenKind<'_>> = element.iter().map(|t| &t.kind).collect();

        let fields = match kinds.as_slice() {
            [TokenKind::Punct('['), rest @ ..] => rest,
            _ => return None,
        };
        let fields = match fields {
            [inner @ .., TokenKind::Punct(','), TokenKind::Punct(']')] => inner,
            [inner @ .., TokenKind::Punct(']')] => inner,
            _ => return None,
        };
        let (url, region, description) = match fields {
            [
                TokenKind::Str(url),
                TokenKind::Punct(','),
                TokenKind::Str(region),
                TokenKind::Punct(','),
                TokenKind::Str(description),
            ] => (url, region, description),
            _ => return None,
        };

        let url = fold_whitespace(url);
        if url.is_empty() {
            return None;
        }

        Some(ProxyRecord {
            url,
            region: fold_whitespace(region),
            description: fold_whitespace(description).replace(self.newline_token.as_str(), "\n"),
        })
    }
}

fn fold_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
