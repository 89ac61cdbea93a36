use super::lexer::{Token, TokenKind};
use super::ScannedScript;

impl<'a> ScannedScript<'a> {
    /// Index of the first token after `name = [`, or `None` when the script
    /// never assigns an array literal to `name`.
    ///
    /// The name has to be a whole identifier token in code position, so
    /// `download_url` does not match `download_url_us` and a mention inside a
    /// string, comment or regex literal is ignored. `name == [` never matches
    /// either, since the `=` must be followed directly by `[`, and neither
    /// does a member assignment such as `cfg.name = [` or `cfg?.name = [`.
    pub(crate) fn find_declaration(&self, name: &str) -> Option<usize> {
        self.tokens
            .windows(3)
            .enumerate()
            .position(|(i, window)| {
                is_declaration(window, name) && !follows_member_access(&self.tokens, i)
            })
            .map(|i| i + 3)
    }
}

fn follows_member_access(tokens: &[Token<'_>], index: usize) -> bool {
    index > 0 && tokens[index - 1].kind == TokenKind::Punct('.')
}

fn is_declaration(window: &[Token<'_>], name: &str) -> bool {
    matches!(
        window,
        [
            Token { kind: TokenKind::Word(w), .. },
            Token { kind: TokenKind::Punct('='), .. },
            Token { kind: TokenKind::Punct('['), .. },
        ] if *w == name
    )
}
