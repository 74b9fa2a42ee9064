//! Canonical LR(k) automaton construction.
//!
//! Breadth-first discovery over closures: every state is probed on each of
//! its symbols (plus `@EOF`), derived closures are deduplicated against the
//! already-discovered states by structural equality, and the resulting
//! actions are written into the dense table.

use crate::closure::{Advance, Closure, TableKind};
use crate::conflict::{
    ConflictContext, ConflictKind, ConflictLog, ConflictPolicy, PriorityPolicy, Resolution,
};
use crate::driver::LrParser;
use crate::error::{ParserError, Result};
use crate::grammar::{Grammar, SemanticCallback, augment, none_callback};
use crate::item::Item;
use crate::symbol::Symbol;
use crate::table::{Action, LrTable};
use indexmap::IndexMap;
use log::debug;

/// Builds the parsing table for a grammar under the chosen lookahead
/// discipline. Conflicts are routed through the configured policy; the
/// default picks by production priority.
pub struct LrParserBuilder<V> {
    grammar: Grammar<V>,
    kind: TableKind,
    policy: Box<dyn ConflictPolicy<V>>,
    augmented_semantic: SemanticCallback<V>,
    log: ConflictLog,
}

impl<V> LrParserBuilder<V> {
    pub fn new(grammar: Grammar<V>, kind: TableKind) -> Self {
        Self {
            grammar,
            kind,
            policy: Box::new(PriorityPolicy),
            augmented_semantic: none_callback(),
            log: ConflictLog::default(),
        }
    }

    /// Replaces the default priority policy.
    pub fn with_policy(mut self, policy: impl ConflictPolicy<V> + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Semantic callback for the synthetic start production; its result
    /// becomes the parse tree root's value.
    pub fn with_augmented_semantic(mut self, semantic: SemanticCallback<V>) -> Self {
        self.augmented_semantic = semantic;
        self
    }

    /// The conflict log accumulated by `build`, append-only.
    pub fn conflict_log(&self) -> &ConflictLog {
        &self.log
    }

    /// Builds the table and wraps it in a fresh driver.
    pub fn build_parser(&mut self) -> Result<LrParser<V>> {
        Ok(LrParser::new(self.build()?))
    }

    /// Builds the table: augments the grammar, installs the accept state,
    /// then walks states in discovery order until no new state appears.
    pub fn build(&mut self) -> Result<LrTable<V>> {
        let mut table = LrTable::new();
        let augmented = augment(
            self.grammar.productions(),
            self.augmented_semantic.clone(),
            IndexMap::new(),
        );
        let mut states = vec![Closure::new(&augmented, self.kind)];
        table.add_row();
        let Some(start_production) = augmented.first() else {
            // A grammar with no productions builds an empty automaton.
            return Ok(table);
        };
        table.set_augmented(start_production.clone());
        let start = start_production.rhs[0].clone();

        // Shifting the start symbol out of state 0 yields the accept state.
        if let Advance::Shift { next, .. } = states[0].advance(&start) {
            states.push(*next);
            table.add_row();
            table.set(0, start.clone(), Action::Shift(1));
            table.set(1, Symbol::end_of_input(), Action::Accept);
            debug!("state 1 is the accept state for {start}");
        } else {
            return Ok(table);
        }

        // The dense table covers every start-reachable symbol in every
        // state; the initial closure's partition is that universe. Probing
        // `@EOF` emits the reduce actions that end the input.
        let mut universe: Vec<Symbol> = states[0].terminals().iter().cloned().collect();
        universe.extend(states[0].nonterminals().iter().cloned());
        universe.push(Symbol::end_of_input());

        let mut index = 0;
        while index < states.len() {
            let closure = states[index].clone();
            for symbol in &universe {
                let symbol = symbol.clone();
                if table.has_action(index, &symbol) {
                    continue;
                }
                match closure.advance(&symbol) {
                    Advance::None => {}
                    Advance::Reduce(reducers) => {
                        let item = self.pick_reducer(index, &symbol, reducers)?;
                        debug!("state {index}: reduce {} on {symbol}", item.production);
                        table.set(index, symbol.clone(), Action::Reduce(item.production));
                    }
                    Advance::Shift { next, .. } => {
                        let target = intern(&mut states, &mut table, *next);
                        debug!("state {index}: shift {symbol} to state {target}");
                        table.set(index, symbol.clone(), Action::Shift(target));
                    }
                    Advance::Conflict { reducers, kernels } => {
                        let context = ConflictContext {
                            state: index,
                            symbol: &symbol,
                            kind: ConflictKind::ShiftReduce,
                        };
                        match self
                            .policy
                            .resolve(&context, &reducers, &kernels, &mut self.log)?
                        {
                            Resolution::Shift(chosen) => {
                                if chosen.is_empty() {
                                    return Err(ParserError::ConflictUnresolved {
                                        state: index,
                                        symbol: symbol.to_string(),
                                        reason: "policy answered a shift with no kernels".into(),
                                    });
                                }
                                let target =
                                    intern(&mut states, &mut table, closure.derive(chosen));
                                debug!(
                                    "state {index}: conflict on {symbol} resolved as shift to {target}"
                                );
                                table.set(index, symbol.clone(), Action::Shift(target));
                            }
                            Resolution::Reduce(item) => {
                                debug!(
                                    "state {index}: conflict on {symbol} resolved as reduce {}",
                                    item.production
                                );
                                table.set(index, symbol.clone(), Action::Reduce(item.production));
                            }
                        }
                    }
                }
            }
            index += 1;
        }

        debug!("automaton complete: {} states", states.len());
        Ok(table)
    }

    /// Narrows a reduce set down to one item, consulting the policy when
    /// more than one production is complete on the same symbol.
    fn pick_reducer(
        &mut self,
        state: usize,
        symbol: &Symbol,
        mut reducers: Vec<Item<V>>,
    ) -> Result<Item<V>> {
        if reducers.len() <= 1 {
            return reducers
                .pop()
                .ok_or_else(|| ParserError::ConflictUnresolved {
                    state,
                    symbol: symbol.to_string(),
                    reason: "reduce outcome carried no items".into(),
                });
        }
        let context = ConflictContext {
            state,
            symbol,
            kind: ConflictKind::MultiReduce,
        };
        match self.policy.resolve(&context, &reducers, &[], &mut self.log)? {
            Resolution::Reduce(item) => Ok(item),
            Resolution::Shift(_) => Err(ParserError::ConflictUnresolved {
                state,
                symbol: symbol.to_string(),
                reason: "policy answered a reduce/reduce conflict with a shift".into(),
            }),
        }
    }
}

/// Index of `closure` in `states`, appending it (and a table row) when it
/// was not seen before.
fn intern<V>(states: &mut Vec<Closure<V>>, table: &mut LrTable<V>, closure: Closure<V>) -> usize {
    if let Some(found) = states.iter().position(|state| state == &closure) {
        found
    } else {
        states.push(closure);
        table.add_row()
    }
}
