//! LR item-set closures and the advance operation that grows the automaton.
//!
//! A closure owns the productions reachable from its core, the items grouped
//! by their producing nonterminal, the terminal/nonterminal partition of
//! every reached symbol and, for LR(1), the closure-local FIRST and FOLLOW
//! dictionaries that drive lookahead expansion.

use crate::grammar::Production;
use crate::item::Item;
use crate::symbol::Symbol;
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::sync::Arc;

/// Lookahead discipline of the automaton under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// LR(0): items carry no lookahead and reduce on any symbol.
    Lr0,
    /// Canonical LR(1): every item carries exactly one lookahead terminal.
    Lr1,
}

type SymbolSets = IndexMap<Symbol, IndexSet<Symbol>>;

/// Outcome of advancing a closure over one symbol.
pub enum Advance<V> {
    /// No item shifts or reduces on the symbol.
    None,
    /// Only reductions apply.
    Reduce(Vec<Item<V>>),
    /// Only shifts apply; carries the derived closure and its kernels.
    Shift {
        next: Box<Closure<V>>,
        kernels: Vec<Item<V>>,
    },
    /// Both apply. The derived closure is built after resolution, from the
    /// kernels the conflict policy lets through.
    Conflict {
        reducers: Vec<Item<V>>,
        kernels: Vec<Item<V>>,
    },
}

/// A fixed-point-complete set of LR items.
pub struct Closure<V> {
    kind: TableKind,
    /// The whole augmented grammar, shared by every closure of one
    /// automaton; expansion during `derive` draws from here.
    pool: Arc<Vec<Production<V>>>,
    /// Productions reachable from this closure's core, core first.
    productions: Vec<Production<V>>,
    /// Items grouped by production lhs, in discovery order.
    items: IndexMap<Symbol, Vec<Item<V>>>,
    terminals: IndexSet<Symbol>,
    nonterminals: IndexSet<Symbol>,
    /// FIRST terminals per nonterminal (LR(1) only). Computed once in the
    /// initial closure and inherited by derived closures.
    first: SymbolSets,
    /// FOLLOW terminals per nonterminal (LR(1) only), local to this closure.
    follow: SymbolSets,
}

impl<V> Closure<V> {
    /// Initial closure over `productions`; the first element is the core.
    /// An empty production list yields an empty closure.
    pub fn new(productions: &[Production<V>], kind: TableKind) -> Self {
        let pool = Arc::new(productions.to_vec());
        let Some(core) = pool.first() else {
            return Self::empty(kind);
        };
        let (expansion, symbols) = reach([core.lhs.clone()], &pool);
        Self::assemble(kind, Arc::clone(&pool), Vec::new(), expansion, symbols, None)
    }

    /// Derived closure: `kernels` advanced out of `self`, expanded by the
    /// productions reachable from the symbols now under the dots. Kernel
    /// lookaheads seed the new closure's FOLLOW sets and are preserved
    /// verbatim in the kernel items themselves.
    pub fn derive(&self, kernels: Vec<Item<V>>) -> Self {
        let seeds: Vec<Symbol> = kernels
            .iter()
            .filter_map(|item| item.next_symbol().cloned())
            .collect();
        let (expansion, mut symbols) = reach(seeds, &self.pool);
        for item in &kernels {
            symbols.insert(item.production.lhs.clone());
            symbols.extend(item.production.rhs.iter().cloned());
        }
        Self::assemble(
            self.kind,
            Arc::clone(&self.pool),
            kernels,
            expansion,
            symbols,
            Some(&self.first),
        )
    }

    fn empty(kind: TableKind) -> Self {
        Self {
            kind,
            pool: Arc::new(Vec::new()),
            productions: Vec::new(),
            items: IndexMap::new(),
            terminals: IndexSet::new(),
            nonterminals: IndexSet::new(),
            first: SymbolSets::new(),
            follow: SymbolSets::new(),
        }
    }

    fn assemble(
        kind: TableKind,
        pool: Arc<Vec<Production<V>>>,
        kernels: Vec<Item<V>>,
        expansion: Vec<Production<V>>,
        symbols: IndexSet<Symbol>,
        inherited_first: Option<&SymbolSets>,
    ) -> Self {
        let mut productions: Vec<Production<V>> = Vec::new();
        for item in &kernels {
            if !productions.contains(&item.production) {
                productions.push(item.production.clone());
            }
        }
        for production in &expansion {
            if !productions.contains(production) {
                productions.push(production.clone());
            }
        }

        // A symbol is a nonterminal iff some reachable production derives it.
        let lhs_names: IndexSet<Symbol> =
            productions.iter().map(|p| p.lhs.clone()).collect();
        let mut terminals = IndexSet::new();
        let mut nonterminals = IndexSet::new();
        for symbol in symbols {
            if lhs_names.contains(&symbol) {
                nonterminals.insert(symbol);
            } else {
                terminals.insert(symbol);
            }
        }

        let mut closure = Self {
            kind,
            pool,
            productions,
            items: IndexMap::new(),
            terminals,
            nonterminals,
            first: SymbolSets::new(),
            follow: SymbolSets::new(),
        };

        if kind == TableKind::Lr1 {
            closure.first = match inherited_first {
                Some(first) => first.clone(),
                None => closure.compute_first(),
            };
            let mut seeds: SymbolSets = closure
                .nonterminals
                .iter()
                .map(|nonterminal| (nonterminal.clone(), IndexSet::new()))
                .collect();
            if inherited_first.is_none() {
                // Start-reachable set: everything may be followed by @EOF.
                for set in seeds.values_mut() {
                    set.insert(Symbol::end_of_input());
                }
            } else {
                for item in &kernels {
                    if let Some(lookahead) = &item.lookahead {
                        seeds
                            .entry(item.production.lhs.clone())
                            .or_default()
                            .insert(lookahead.clone());
                    }
                }
            }
            closure.follow = closure.compute_follow(seeds);
        }

        let mut items: IndexMap<Symbol, Vec<Item<V>>> = IndexMap::new();
        for item in kernels {
            items.entry(item.production.lhs.clone()).or_default().push(item);
        }
        for production in &expansion {
            match kind {
                TableKind::Lr0 => {
                    items
                        .entry(production.lhs.clone())
                        .or_default()
                        .push(Item::new(production.clone()));
                }
                TableKind::Lr1 => {
                    let follow = closure
                        .follow
                        .get(&production.lhs)
                        .cloned()
                        .unwrap_or_default();
                    for lookahead in follow {
                        items.entry(production.lhs.clone()).or_default().push(
                            Item::with_lookahead(production.clone(), 0, lookahead),
                        );
                    }
                }
            }
        }
        closure.items = items;
        closure
    }

    /// FIRST(A) = ⋃ FIRST(first rhs symbol) over A's productions, iterated
    /// to a fixed point. ε is not handled; ε productions are rejected at
    /// grammar ingestion.
    fn compute_first(&self) -> SymbolSets {
        let mut first: SymbolSets = self
            .nonterminals
            .iter()
            .map(|nonterminal| (nonterminal.clone(), IndexSet::new()))
            .collect();
        loop {
            let mut changed = false;
            for production in &self.productions {
                let Some(head) = production.rhs.first() else {
                    continue;
                };
                let additions: Vec<Symbol> = if self.nonterminals.contains(head) {
                    first
                        .get(head)
                        .map(|set| set.iter().cloned().collect())
                        .unwrap_or_default()
                } else {
                    vec![head.clone()]
                };
                if let Some(set) = first.get_mut(&production.lhs) {
                    for symbol in additions {
                        changed |= set.insert(symbol);
                    }
                }
            }
            if !changed {
                break;
            }
        }
        first
    }

    /// FOLLOW from the given seeds: one adjacency pass (a terminal directly
    /// after a nonterminal joins its FOLLOW, a nonterminal contributes its
    /// FIRST set), then end-of-rhs propagation until the sets stop growing.
    fn compute_follow(&self, mut follow: SymbolSets) -> SymbolSets {
        for production in &self.productions {
            for pair in production.rhs.windows(2) {
                let (symbol, next) = (&pair[0], &pair[1]);
                if !self.nonterminals.contains(symbol) {
                    continue;
                }
                let additions: Vec<Symbol> = if self.nonterminals.contains(next) {
                    self.first
                        .get(next)
                        .map(|set| set.iter().cloned().collect())
                        .unwrap_or_default()
                } else {
                    vec![next.clone()]
                };
                follow.entry(symbol.clone()).or_default().extend(additions);
            }
        }
        loop {
            let mut changed = false;
            for production in &self.productions {
                let Some(last) = production.rhs.last() else {
                    continue;
                };
                if !self.nonterminals.contains(last) {
                    continue;
                }
                let additions: Vec<Symbol> = follow
                    .get(&production.lhs)
                    .map(|set| set.iter().cloned().collect())
                    .unwrap_or_default();
                let set = follow.entry(last.clone()).or_default();
                for symbol in additions {
                    changed |= set.insert(symbol);
                }
            }
            if !changed {
                break;
            }
        }
        follow
    }

    /// Collects the items that reduce on `symbol` and the kernels produced
    /// by moving a dot over it, and classifies the combination.
    ///
    /// The synthetic start production never enters reduce candidacy; its
    /// acceptance is the Accept cell the builder installs.
    pub fn advance(&self, symbol: &Symbol) -> Advance<V> {
        let mut reducers = Vec::new();
        let mut kernels = Vec::new();
        for item in self.iter_items() {
            if item.is_reducible_on(symbol) && !item.production.lhs.is_augmented_start() {
                reducers.push(item.clone());
            }
            if let Some(advanced) = item.advance(symbol) {
                kernels.push(advanced);
            }
        }
        match (reducers.is_empty(), kernels.is_empty()) {
            (true, true) => Advance::None,
            (false, true) => Advance::Reduce(reducers),
            (true, false) => {
                let next = self.derive(kernels.clone());
                Advance::Shift {
                    next: Box::new(next),
                    kernels,
                }
            }
            (false, false) => Advance::Conflict { reducers, kernels },
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn productions(&self) -> &[Production<V>] {
        &self.productions
    }

    pub fn items(&self) -> &IndexMap<Symbol, Vec<Item<V>>> {
        &self.items
    }

    pub fn iter_items(&self) -> impl Iterator<Item = &Item<V>> {
        self.items.values().flatten()
    }

    pub fn item_count(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn terminals(&self) -> &IndexSet<Symbol> {
        &self.terminals
    }

    pub fn nonterminals(&self) -> &IndexSet<Symbol> {
        &self.nonterminals
    }

    pub fn first(&self) -> &IndexMap<Symbol, IndexSet<Symbol>> {
        &self.first
    }

    pub fn follow(&self) -> &IndexMap<Symbol, IndexSet<Symbol>> {
        &self.follow
    }

    fn canonical(&self) -> Vec<(&Symbol, &[Symbol], usize, Option<&Symbol>)> {
        let mut items: Vec<_> = self.iter_items().map(Item::sort_key).collect();
        items.sort();
        items
    }
}

/// Closures denote item sets: equality is canonicalized structural equality
/// over the items, ignoring the derived FIRST/FOLLOW maps.
impl<V> PartialEq for Closure<V> {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl<V> Eq for Closure<V> {}

impl<V> Clone for Closure<V> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            pool: Arc::clone(&self.pool),
            productions: self.productions.clone(),
            items: self.items.clone(),
            terminals: self.terminals.clone(),
            nonterminals: self.nonterminals.clone(),
            first: self.first.clone(),
            follow: self.follow.clone(),
        }
    }
}

impl<V> fmt::Debug for Closure<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter_items()).finish()
    }
}

/// Productions reachable from `seeds` by repeated rhs traversal, in
/// discovery order, together with every symbol encountered on the way.
fn reach<V>(
    seeds: impl IntoIterator<Item = Symbol>,
    pool: &[Production<V>],
) -> (Vec<Production<V>>, IndexSet<Symbol>) {
    let mut symbols: IndexSet<Symbol> = seeds.into_iter().collect();
    let mut chosen: Vec<usize> = Vec::new();
    loop {
        let before = chosen.len();
        for (index, production) in pool.iter().enumerate() {
            if symbols.contains(&production.lhs) && !chosen.contains(&index) {
                chosen.push(index);
                symbols.extend(production.rhs.iter().cloned());
            }
        }
        if chosen.len() == before {
            break;
        }
    }
    let productions = chosen
        .into_iter()
        .map(|index| pool[index].clone())
        .collect();
    (productions, symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{augment, none_callback};
    use indexmap::IndexMap as Attrs;

    fn arithmetic() -> Vec<Production<()>> {
        let productions = vec![
            Production::plain("E", &["E", "plus", "T"]),
            Production::plain("E", &["T"]),
            Production::plain("T", &["n"]),
        ];
        augment(&productions, none_callback(), Attrs::new())
    }

    #[test]
    fn test_initial_closure_reaches_all_productions() {
        let closure = Closure::new(&arithmetic(), TableKind::Lr0);
        assert_eq!(closure.productions().len(), 4);
        assert_eq!(closure.item_count(), 4);
        assert!(closure.nonterminals().contains(&Symbol::new("E")));
        assert!(closure.nonterminals().contains(&Symbol::new("T")));
        assert!(closure.terminals().contains(&Symbol::new("plus")));
        assert!(closure.terminals().contains(&Symbol::new("n")));
    }

    #[test]
    fn test_unreachable_productions_are_excluded() {
        let mut productions = arithmetic();
        productions.push(Production::plain("X", &["y"]));
        let closure = Closure::new(&productions, TableKind::Lr0);
        assert_eq!(closure.productions().len(), 4);
        assert!(!closure.nonterminals().contains(&Symbol::new("X")));
    }

    #[test]
    fn test_lr1_items_carry_single_lookaheads() {
        let closure = Closure::new(&arithmetic(), TableKind::Lr1);
        for item in closure.iter_items() {
            assert!(item.lookahead.is_some());
        }
        // FOLLOW(E) ⊇ {@EOF, plus}: E's items are cross-multiplied.
        let items = closure.items().get(&Symbol::new("E")).unwrap();
        assert!(items.len() >= 4);
    }

    #[test]
    fn test_lr1_follow_contains_adjacent_terminal() {
        let closure = Closure::new(&arithmetic(), TableKind::Lr1);
        let follow_e = closure.follow().get(&Symbol::new("E")).unwrap();
        assert!(follow_e.contains(&Symbol::new("plus")));
        assert!(follow_e.contains(&Symbol::end_of_input()));
    }

    #[test]
    fn test_first_fixed_point_handles_left_recursion() {
        let closure = Closure::new(&arithmetic(), TableKind::Lr1);
        let first_e = closure.first().get(&Symbol::new("E")).unwrap();
        assert_eq!(first_e.len(), 1);
        assert!(first_e.contains(&Symbol::new("n")));
    }

    #[test]
    fn test_equality_is_structural() {
        let one = Closure::new(&arithmetic(), TableKind::Lr0);
        let two = Closure::new(&arithmetic(), TableKind::Lr0);
        assert_eq!(one, two);
        match one.advance(&Symbol::new("n")) {
            Advance::Shift { next, .. } => assert_ne!(*next, two),
            _ => panic!("expected a shift on n"),
        }
    }

    #[test]
    fn test_derive_keeps_kernel_lookaheads() {
        let closure = Closure::new(&arithmetic(), TableKind::Lr1);
        let Advance::Shift { next, kernels } = closure.advance(&Symbol::new("T")) else {
            panic!("expected a shift on T");
        };
        for kernel in &kernels {
            assert!(kernel.lookahead.is_some());
        }
        for kernel in kernels {
            assert!(next.iter_items().any(|item| *item == kernel));
        }
    }

    #[test]
    fn test_empty_grammar_yields_empty_closure() {
        let closure = Closure::<()>::new(&[], TableKind::Lr0);
        assert!(closure.is_empty());
        assert_eq!(closure.item_count(), 0);
    }
}
