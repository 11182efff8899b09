/// Custom Result type for recsql operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for recsql
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Unrecognized character in the source text (non-fatal, the lexer skips it)
    #[error("Illegal character {character:?} at {line}:{column}")]
    Lex {
        character: char,
        line: usize,
        column: usize,
    },
    /// Token sequence matches no production
    #[error("parse error {0}")]
    Parse(String),
    /// Well-formed tree that violates a generation rule
    #[error("semantic error {0}")]
    Semantic(String),
    /// Internal error (io, serialization, etc.)
    #[error("internal error {0}")]
    Internal(String),
}

impl Error {
    /// Whether compilation can continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Lex { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Internal(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Internal(value.to_string())
    }
}
