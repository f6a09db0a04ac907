// Token representation for the Vera declaration parser.

use super::keywords::Keyword;

/// Shape of one token in the statement ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Empty slot, also the result of dropping an empty macro
    None,
    /// An argument list was consumed; only this marker remains
    Args,
    BraceClose,
    BraceOpen,
    Comma,
    DoubleColon,
    Keyword,
    Name,
    /// Name found inside parentheses, candidate declarator
    ParenName,
    Semicolon,
}

/// A single token with its spelling and position. Cheap to clone; the parser
/// clones freely when it needs to look at ring neighbors while mutating.
#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub keyword: Option<Keyword>,
    pub text: String,
    pub line: u32,
    pub byte: u32,
}

impl Token {
    pub(crate) fn blank(line: u32, byte: u32) -> Self {
        Self {
            kind: TokenKind::None,
            keyword: None,
            text: String::new(),
            line,
            byte,
        }
    }

    pub(crate) fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token() {
        let t = Token::blank(7, 120);
        assert!(t.is(TokenKind::None));
        assert_eq!(t.keyword, None);
        assert!(t.text.is_empty());
        assert_eq!(t.line, 7);
        assert_eq!(t.byte, 120);
    }
}
