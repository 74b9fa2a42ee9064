//! Conflict classification, resolution policies and the conflict log.

use crate::error::{ParserError, Result};
use crate::item::Item;
use crate::symbol::Symbol;
use std::fmt;

/// The two conflict classes surfaced during table construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    MultiReduce,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::ShiftReduce => write!(f, "Shift-Reduce"),
            ConflictKind::MultiReduce => write!(f, "Reduce-Reduce"),
        }
    }
}

/// Where a conflict was met: the state being filled and the symbol probed.
pub struct ConflictContext<'a> {
    pub state: usize,
    pub symbol: &'a Symbol,
    pub kind: ConflictKind,
}

/// A policy's verdict: shift with the surviving kernels, or reduce exactly
/// one item.
pub enum Resolution<V> {
    Shift(Vec<Item<V>>),
    Reduce(Item<V>),
}

/// Append-only, human-readable record of every conflict met while building
/// a table, retrievable from the builder afterwards.
#[derive(Debug, Default, Clone)]
pub struct ConflictLog {
    text: String,
}

impl ConflictLog {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Appends a free-form line; custom policies may annotate as they wish.
    pub fn note(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    pub fn record_conflict<V>(
        &mut self,
        context: &ConflictContext<'_>,
        reducers: &[Item<V>],
        kernels: &[Item<V>],
    ) {
        self.note(&format!(
            "{} Conflict at state {} on {}:",
            context.kind, context.state, context.symbol
        ));
        if !kernels.is_empty() {
            self.note("Shift item(s):");
            for item in kernels {
                self.note(&format!("  {item}"));
            }
        }
        if !reducers.is_empty() {
            self.note("Reduce item(s):");
            for item in reducers {
                self.note(&format!("  {item}"));
            }
        }
    }

    pub fn record_resolution<V>(&mut self, resolution: &Resolution<V>) {
        match resolution {
            Resolution::Shift(kernels) => {
                for item in kernels {
                    self.note(&format!("Resolved: shift {item}"));
                }
            }
            Resolution::Reduce(item) => self.note(&format!("Resolved: reduce {item}")),
        }
        self.note("");
    }
}

impl fmt::Display for ConflictLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Decides conflicts. The builder consults the policy for every
/// shift/reduce outcome and for reduce sets with more than one candidate.
pub trait ConflictPolicy<V> {
    fn resolve(
        &mut self,
        context: &ConflictContext<'_>,
        reducers: &[Item<V>],
        kernels: &[Item<V>],
        log: &mut ConflictLog,
    ) -> Result<Resolution<V>>;
}

/// Default policy: the largest `priority` attribute among all candidates
/// wins. Ties prefer shift over reduce; within one kind the first-listed
/// candidate stands. Grammars without meaningful priorities get a
/// deterministic but possibly unintended table.
#[derive(Debug, Default, Clone, Copy)]
pub struct PriorityPolicy;

impl<V> ConflictPolicy<V> for PriorityPolicy {
    fn resolve(
        &mut self,
        context: &ConflictContext<'_>,
        reducers: &[Item<V>],
        kernels: &[Item<V>],
        log: &mut ConflictLog,
    ) -> Result<Resolution<V>> {
        log.record_conflict(context, reducers, kernels);

        let seed = kernels
            .first()
            .map(|item| (false, item))
            .or_else(|| reducers.first().map(|item| (true, item)));
        let Some(mut choice) = seed else {
            return Err(ParserError::ConflictUnresolved {
                state: context.state,
                symbol: context.symbol.to_string(),
                reason: "no candidates to choose from".into(),
            });
        };

        // Shift candidates are scanned before reduce candidates, so a tie
        // keeps the shift.
        let mut max_priority = 0;
        for item in kernels {
            if item.priority() > max_priority {
                max_priority = item.priority();
                choice = (false, item);
            }
        }
        for item in reducers {
            if item.priority() > max_priority {
                max_priority = item.priority();
                choice = (true, item);
            }
        }

        let resolution = if choice.0 {
            Resolution::Reduce(choice.1.clone())
        } else {
            Resolution::Shift(kernels.to_vec())
        };
        log.record_resolution(&resolution);
        Ok(resolution)
    }
}
