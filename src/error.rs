//! Error types for the LR parser framework.

use thiserror::Error;

/// Boxed error returned by user semantic callbacks. Callback failures are
/// surfaced to the caller without translation.
pub type SemanticError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised during grammar ingestion, table construction and parsing.
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Malformed production {production}: {reason}")]
    GrammarShape { production: String, reason: String },

    #[error("Rule sentence \"{0}\" is illegal")]
    Sentence(String),

    #[error("Unknown semantic callback @{0}")]
    UnknownCallback(String),

    #[error("Unresolved conflict at state {state} on symbol {symbol}: {reason}")]
    ConflictUnresolved {
        state: usize,
        symbol: String,
        reason: String,
    },

    #[error("Syntax error at line {line}, col {col}: unexpected {token} in state {state}")]
    Syntax {
        token: String,
        line: i32,
        col: i32,
        state: usize,
    },

    #[error("Semantic callback failed: {0}")]
    Callback(SemanticError),
}

/// Type alias for Results in this crate.
pub type Result<T> = std::result::Result<T, ParserError>;
