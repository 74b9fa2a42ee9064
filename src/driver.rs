//! The shift/reduce driver: a table-indexed pushdown automaton.

use crate::error::{ParserError, Result};
use crate::grammar::Production;
use crate::table::{Action, LrTable};
use crate::unit::{ParseUnit, Position, Token};
use log::debug;
use std::sync::Arc;

/// Drives shift/reduce parsing over a frozen table.
///
/// The parser owns a state stack and a parse-unit stack kept strictly in
/// lockstep. A frozen table may back any number of parsers, each feeding
/// its own token stream.
pub struct LrParser<V> {
    table: Arc<LrTable<V>>,
    state_stack: Vec<usize>,
    value_stack: Vec<ParseUnit<V>>,
    accepted: bool,
}

impl<V> LrParser<V> {
    pub fn new(table: LrTable<V>) -> Self {
        Self::with_shared_table(Arc::new(table))
    }

    pub fn with_shared_table(table: Arc<LrTable<V>>) -> Self {
        Self {
            table,
            state_stack: vec![0],
            value_stack: Vec::new(),
            accepted: false,
        }
    }

    /// Whether the automaton has reached Accept.
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    /// Feeds one lexer token.
    pub fn feed(&mut self, token: Token<V>) -> Result<()> {
        self.feed_unit(token.into())
    }

    /// Feeds one terminal unit: applies pending reductions until the unit
    /// can be shifted (or the input is accepted), then consumes it.
    pub fn feed_unit(&mut self, unit: ParseUnit<V>) -> Result<()> {
        let mut action = self.table.action(self.top(), &unit.name);
        loop {
            match action {
                Action::Accept => {
                    debug!("accept on {}", unit.name);
                    self.reduce_augmented()?;
                    self.accepted = true;
                    break;
                }
                Action::Error => {
                    debug!("error on {} in state {}", unit.name, self.top());
                    return Err(ParserError::Syntax {
                        token: unit.name.to_string(),
                        line: unit.position.line,
                        col: unit.position.col,
                        state: self.top(),
                    });
                }
                Action::Shift(state) => {
                    debug!("shift {} to state {state}", unit.name);
                    self.state_stack.push(state);
                    break;
                }
                Action::Reduce(production) => {
                    self.reduce(&production)?;
                    action = self.table.action(self.top(), &unit.name);
                }
            }
        }
        self.value_stack.push(unit);
        Ok(())
    }

    /// Feeds the synthesized `@EOF` unit, driving the final reductions.
    pub fn finish(&mut self) -> Result<()> {
        self.feed_unit(ParseUnit::end_of_input())
    }

    /// The `@S` unit, when parsing succeeded.
    pub fn parse_tree(&self) -> Option<&ParseUnit<V>> {
        self.value_stack
            .iter()
            .find(|unit| unit.name.is_augmented_start())
    }

    pub fn into_parse_tree(self) -> Option<ParseUnit<V>> {
        self.value_stack
            .into_iter()
            .find(|unit| unit.name.is_augmented_start())
    }

    /// The state stack, bottom first. Left intact after a syntax error for
    /// inspection.
    pub fn state_stack(&self) -> &[usize] {
        &self.state_stack
    }

    /// The parse-unit stack, bottom first.
    pub fn value_stack(&self) -> &[ParseUnit<V>] {
        &self.value_stack
    }

    fn top(&self) -> usize {
        self.state_stack.last().copied().unwrap_or(0)
    }

    /// Pops `|rhs|` entries off both stacks, runs the semantic callback and
    /// pushes the reduced unit, then takes the goto transition under the
    /// fresh nonterminal.
    fn reduce(&mut self, production: &Production<V>) -> Result<()> {
        debug!("reduce {}", production);
        let children = self.pop_children(production)?;
        let value = (production.semantic)(&children).map_err(ParserError::Callback)?;
        let position = children
            .first()
            .map(|unit| unit.position)
            .unwrap_or(Position::NONE);
        let unit = ParseUnit {
            name: production.lhs.clone(),
            children,
            position,
            value,
            property: None,
        };
        match self.table.action(self.top(), &production.lhs) {
            Action::Shift(state) => {
                self.state_stack.push(state);
                self.value_stack.push(unit);
                Ok(())
            }
            _ => {
                let error = ParserError::Syntax {
                    token: production.lhs.to_string(),
                    line: position.line,
                    col: position.col,
                    state: self.top(),
                };
                self.value_stack.push(unit);
                Err(error)
            }
        }
    }

    /// The final reduction under the synthetic start production, performed
    /// when the Accept cell is hit.
    fn reduce_augmented(&mut self) -> Result<()> {
        let Some(production) = self.table.augmented().cloned() else {
            return Ok(());
        };
        let children = self.pop_children(&production)?;
        let value = (production.semantic)(&children).map_err(ParserError::Callback)?;
        let position = children
            .first()
            .map(|unit| unit.position)
            .unwrap_or(Position::NONE);
        self.value_stack.push(ParseUnit {
            name: production.lhs.clone(),
            children,
            position,
            value,
            property: None,
        });
        Ok(())
    }

    fn pop_children(&mut self, production: &Production<V>) -> Result<Vec<ParseUnit<V>>> {
        let count = production.rhs.len();
        if self.value_stack.len() < count || self.state_stack.len() <= count {
            return Err(ParserError::Syntax {
                token: production.lhs.to_string(),
                line: Position::NONE.line,
                col: Position::NONE.col,
                state: self.top(),
            });
        }
        self.state_stack.truncate(self.state_stack.len() - count);
        Ok(self.value_stack.split_off(self.value_stack.len() - count))
    }
}
