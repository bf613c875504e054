use std::fmt;

/// The closed set of tokens produced by the scanner.
///
/// Comments are recognised but never surface as tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Literal SQL text, still carrying doubled escapes.
    RawSql,
    /// `@name`
    Key,
    /// `??literal`, only directly after a `Key`
    Fallback,
    /// `?{`
    ConditionalOpen,
    /// `:{`
    ElseOpen,
    /// `}`
    BlockClose,
    /// `(&)[`
    AndListOpen,
    /// `(|)[`
    OrListOpen,
    /// `(,)[`
    CommaListOpen,
    /// `]`
    ListClose,
    /// `;`
    Separator,
    /// `...`
    Spread,
    Eof,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::RawSql => "RawSQL",
            TokenKind::Key => "Key",
            TokenKind::Fallback => "??",
            TokenKind::ConditionalOpen => "?{",
            TokenKind::ElseOpen => ":{",
            TokenKind::BlockClose => "}",
            TokenKind::AndListOpen => "(&)[",
            TokenKind::OrListOpen => "(|)[",
            TokenKind::CommaListOpen => "(,)[",
            TokenKind::ListClose => "]",
            TokenKind::Separator => ";",
            TokenKind::Spread => "...",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scanned token. `length` is the number of bytes consumed from the
/// template, including any whitespace the token swallows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Option<String>,
    pub length: usize,
}

impl Token {
    pub(crate) fn eof() -> Self {
        Self {
            kind: TokenKind::Eof,
            text: None,
            length: 0,
        }
    }
}
