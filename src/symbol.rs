//! Grammar symbols.
//!
//! A symbol is a string identifier. Names beginning with `@` are reserved
//! for the parser core: `@S` is the synthetic start symbol of the augmented
//! grammar and `@EOF` marks end of input.

use std::fmt;
use std::sync::Arc;

/// Left-hand side of the synthetic start production.
pub const AUGMENTED_START: &str = "@S";

/// End-of-input marker fed to the driver by `finish`.
pub const END_OF_INPUT: &str = "@EOF";

/// A terminal or nonterminal, identified by name.
///
/// Symbols are cheap to clone and compare. Which side of the
/// terminal/nonterminal split a symbol falls on is decided per closure,
/// not stored here.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn augmented_start() -> Self {
        Self::new(AUGMENTED_START)
    }

    pub fn end_of_input() -> Self {
        Self::new(END_OF_INPUT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Names starting with `@` belong to the core and may not appear in
    /// user grammars.
    pub fn is_reserved(&self) -> bool {
        self.0.starts_with('@')
    }

    pub fn is_augmented_start(&self) -> bool {
        self.as_str() == AUGMENTED_START
    }

    pub fn is_end_of_input(&self) -> bool {
        self.as_str() == END_OF_INPUT
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names() {
        assert!(Symbol::augmented_start().is_reserved());
        assert!(Symbol::end_of_input().is_reserved());
        assert!(!Symbol::new("Expr").is_reserved());
    }

    #[test]
    fn test_markers() {
        assert!(Symbol::new("@S").is_augmented_start());
        assert!(Symbol::new("@EOF").is_end_of_input());
        assert!(!Symbol::new("@S").is_end_of_input());
    }
}
