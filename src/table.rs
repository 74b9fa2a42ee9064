//! The LR action table: a dense (state × symbol) → action map.

use crate::grammar::Production;
use crate::symbol::Symbol;
use indexmap::IndexMap;
use std::fmt;

/// One cell of the table.
pub enum Action<V> {
    Shift(usize),
    Reduce(Production<V>),
    Accept,
    /// The default for uninitialized cells.
    Error,
}

impl<V> Clone for Action<V> {
    fn clone(&self) -> Self {
        match self {
            Action::Shift(state) => Action::Shift(*state),
            Action::Reduce(production) => Action::Reduce(production.clone()),
            Action::Accept => Action::Accept,
            Action::Error => Action::Error,
        }
    }
}

impl<V> PartialEq for Action<V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Action::Shift(a), Action::Shift(b)) => a == b,
            (Action::Reduce(a), Action::Reduce(b)) => a == b,
            (Action::Accept, Action::Accept) | (Action::Error, Action::Error) => true,
            _ => false,
        }
    }
}

impl<V> Eq for Action<V> {}

impl<V> fmt::Display for Action<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "s{state}"),
            Action::Reduce(production) => write!(f, "r({production})"),
            Action::Accept => write!(f, "acc"),
            Action::Error => write!(f, "·"),
        }
    }
}

impl<V> fmt::Debug for Action<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "Shift({state})"),
            Action::Reduce(production) => write!(f, "Reduce({production})"),
            Action::Accept => write!(f, "Accept"),
            Action::Error => write!(f, "Error"),
        }
    }
}

/// The parsing table. Rows grow as states are discovered; once building
/// completes the table is frozen and may be shared between parsers.
pub struct LrTable<V> {
    rows: Vec<IndexMap<Symbol, Action<V>>>,
    augmented: Option<Production<V>>,
}

impl<V> LrTable<V> {
    pub(crate) fn new() -> Self {
        Self {
            rows: Vec::new(),
            augmented: None,
        }
    }

    pub(crate) fn add_row(&mut self) -> usize {
        self.rows.push(IndexMap::new());
        self.rows.len() - 1
    }

    pub(crate) fn set(&mut self, state: usize, symbol: Symbol, action: Action<V>) {
        if let Some(row) = self.rows.get_mut(state) {
            row.insert(symbol, action);
        }
    }

    pub(crate) fn set_augmented(&mut self, production: Production<V>) {
        self.augmented = Some(production);
    }

    /// The synthetic start production; its reduction is the final Accept.
    pub fn augmented(&self) -> Option<&Production<V>> {
        self.augmented.as_ref()
    }

    pub fn state_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_action(&self, state: usize, symbol: &Symbol) -> bool {
        self.rows
            .get(state)
            .is_some_and(|row| row.contains_key(symbol))
    }

    /// The action for `(state, symbol)`; `Error` for uninitialized cells.
    pub fn action(&self, state: usize, symbol: &Symbol) -> Action<V> {
        self.rows
            .get(state)
            .and_then(|row| row.get(symbol))
            .cloned()
            .unwrap_or(Action::Error)
    }

    /// The initialized cells of one state, in emission order.
    pub fn row(&self, state: usize) -> impl Iterator<Item = (&Symbol, &Action<V>)> {
        self.rows.get(state).into_iter().flatten()
    }
}

impl<V> fmt::Display for LrTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (state, row) in self.rows.iter().enumerate() {
            write!(f, "state {state}:")?;
            for (symbol, action) in row {
                write!(f, " {symbol}:{action}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<V> fmt::Debug for LrTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
