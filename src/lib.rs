//! Bottom-Up LR Parser Framework
//!
//! A Rust implementation of canonical LR(0) and LR(1) table construction
//! and shift/reduce parsing for context-free grammars.
//!
//! The pipeline: a [`Grammar`] of [`Production`]s is augmented with a
//! synthetic start production, closed into LR item sets, and compiled by
//! [`LrParserBuilder`] into a frozen [`LrTable`]. [`LrParser`] then drives
//! the table over a token stream, invoking each production's semantic
//! callback at reduction time and yielding a concrete parse tree of
//! [`ParseUnit`]s. Shift/reduce and reduce/reduce conflicts are resolved
//! through a pluggable [`ConflictPolicy`], by production priority by
//! default, and recorded in a retrievable [`ConflictLog`].

pub mod builder;
pub mod closure;
pub mod conflict;
pub mod driver;
pub mod error;
pub mod grammar;
pub mod item;
pub mod rules;
pub mod symbol;
pub mod table;
pub mod unit;

// Re-export commonly used types
pub use builder::LrParserBuilder;
pub use closure::{Advance, Closure, TableKind};
pub use conflict::{
    ConflictContext, ConflictKind, ConflictLog, ConflictPolicy, PriorityPolicy, Resolution,
};
pub use driver::LrParser;
pub use error::{ParserError, Result, SemanticError};
pub use grammar::{Grammar, Production, SemanticCallback, augment, none_callback};
pub use item::Item;
pub use rules::RuleSet;
pub use symbol::Symbol;
pub use table::{Action, LrTable};
pub use unit::{ParseUnit, Position, Token};
