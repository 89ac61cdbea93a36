//! Minimal tokenizer for userscript source.
//!
//! It understands just enough of the host grammar to walk past noise safely:
//! comments, string/template literals and regex literals are recognised so
//! that brackets, quotes and identifiers inside them never leak into the
//! token stream as structure.
//!
//! Whether a `/` opens a regex literal is decided from the previous token.
//! A `)` closing the head of `if`, `while`, `for` or `with` allows a regex;
//! any other `)` means division.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind<'a> {
    /// Identifier, keyword or number.
    Word(&'a str),
    /// Decoded contents of a quoted literal.
    Str(String),
    Regex,
    Punct(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// Byte offset of the first character.
    pub offset: usize,
}

/// Keywords after which a `/` starts a regex literal rather than a division.
const REGEX_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

/// Statement keywords whose parenthesised head may be followed by a regex.
const HEAD_KEYWORDS: &[&str] = &["if", "while", "for", "with"];

pub(crate) struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    regex_allowed: bool,
    /// The previous token was a `HEAD_KEYWORDS` word.
    after_head_keyword: bool,
    /// One entry per open `(`: whether it opened a statement head.
    paren_heads: Vec<bool>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            regex_allowed: true,
            after_head_keyword: false,
            paren_heads: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => self.skip_line_comment(),
                (Some('/'), Some('*')) => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        match self.src[self.pos..].find('\n') {
            Some(i) => self.pos += i,
            None => self.pos = self.src.len(),
        }
    }

    fn skip_block_comment(&mut self) {
        let body = self.pos + 2;
        match self.src[body..].find("*/") {
            Some(i) => self.pos = body + i + 2,
            // Unclosed block comment swallows the rest of the input.
            None => self.pos = self.src.len(),
        }
    }

    /// Reads up to the closing `quote` (already past the opening one).
    ///
    /// Escapes are decoded; raw whitespace, line breaks included, is kept
    /// as written.
    fn read_string(&mut self, quote: char) -> String {
        let mut out = String::new();
        let mut template_depth = 0usize;

        while let Some(c) = self.bump() {
            match c {
                '\\' => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    // Line continuation.
                    Some('\r') => {
                        if self.peek() == Some('\n') {
                            self.bump();
                        }
                    }
                    Some('\n') => {}
                    Some(other) => out.push(other),
                    None => break,
                },
                '$' if quote == '`' && self.peek() == Some('{') => {
                    self.bump();
                    template_depth += 1;
                    out.push_str("${");
                }
                '}' if template_depth > 0 => {
                    template_depth -= 1;
                    out.push('}');
                }
                c if c == quote && template_depth == 0 => break,
                c => out.push(c),
            }
        }

        out
    }

    /// Tries to read a regex literal body (already past the opening `/`).
    /// Restores the position and returns `false` when the line ends first.
    fn read_regex(&mut self) -> bool {
        let start = self.pos;
        let mut in_class = false;

        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    if matches!(self.peek(), None | Some('\n') | Some('\r')) {
                        break;
                    }
                    self.bump();
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => {
                    while matches!(self.peek(), Some(f) if f.is_ascii_alphabetic()) {
                        self.bump();
                    }
                    return true;
                }
                '\n' | '\r' => break,
                _ => {}
            }
        }

        self.pos = start;
        false
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        self.skip_trivia();
        let src = self.src;
        let offset = self.pos;
        let c = self.bump()?;

        let kind = match c {
            '\'' | '"' | '`' => TokenKind::Str(self.read_string(c)),
            c if is_word_char(c) => {
                while matches!(self.peek(), Some(n) if is_word_char(n)) {
                    self.bump();
                }
                TokenKind::Word(&src[offset..self.pos])
            }
            '/' if self.regex_allowed && self.read_regex() => TokenKind::Regex,
            c => TokenKind::Punct(c),
        };

        self.regex_allowed = match &kind {
            TokenKind::Word(w) => REGEX_KEYWORDS.iter().any(|k| k == w),
            TokenKind::Str(_) | TokenKind::Regex => false,
            TokenKind::Punct(')') => self.paren_heads.pop().unwrap_or(false),
            TokenKind::Punct(p) => *p != ']',
        };
        if kind == TokenKind::Punct('(') {
            self.paren_heads.push(self.after_head_keyword);
        }
        self.after_head_keyword =
            matches!(&kind, TokenKind::Word(w) if HEAD_KEYWORDS.iter().any(|k| k == w));

        Some(Token { kind, offset })
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
