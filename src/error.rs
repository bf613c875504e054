use crate::tpl::token::TokenKind;
use thiserror::Error;

/// A grammar violation found while scanning or parsing a template.
///
/// `offset` is the byte offset of the offending token in the template text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unexpected token '{found}' near character {offset}{}", expected_suffix(.expected))]
pub struct SyntaxError {
    pub found: TokenKind,
    pub expected: Option<TokenKind>,
    pub offset: usize,
}

fn expected_suffix(expected: &Option<TokenKind>) -> String {
    match expected {
        Some(kind) => format!(", expected '{}'", kind),
        None => String::new(),
    }
}

#[derive(Error, Debug)]
pub enum OsqlError {
    #[error("Syntax Error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("Duplicate Query Name: {0}")]
    DuplicateName(String),
    #[error("Empty Query: '{0}' has no SQL text")]
    EmptyUnit(String),
    #[error("Type Mismatch: {0}")]
    TypeMismatch(String),
    #[error("Serialization Error: {0}")]
    SerializationError(String),
    #[error("Query Load Error: {0}")]
    LoadError(String),
}

pub type Error = OsqlError;

impl serde::ser::Error for OsqlError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        OsqlError::SerializationError(msg.to_string())
    }
}
