//! Unit tests for closure construction and the advance operation.

use indexmap::IndexMap;
use lr_parser::closure::{Advance, Closure, TableKind};
use lr_parser::grammar::{Production, augment, none_callback};
use lr_parser::symbol::Symbol;

fn expression_grammar() -> Vec<Production<()>> {
    let productions = vec![
        Production::plain("E", &["E", "plus", "E"]),
        Production::plain("E", &["n"]),
    ];
    augment(&productions, none_callback(), IndexMap::new())
}

fn layered_grammar() -> Vec<Production<()>> {
    let productions = vec![
        Production::plain("E", &["E", "plus", "T"]),
        Production::plain("E", &["T"]),
        Production::plain("T", &["n"]),
    ];
    augment(&productions, none_callback(), IndexMap::new())
}

#[test]
fn test_advance_on_terminal_shifts() {
    let closure = Closure::new(&layered_grammar(), TableKind::Lr0);
    match closure.advance(&Symbol::new("n")) {
        Advance::Shift { next, kernels } => {
            assert_eq!(kernels.len(), 1);
            assert_eq!(next.item_count(), 1);
            assert!(next.iter_items().all(|item| item.is_complete()));
        }
        _ => panic!("expected a shift on n"),
    }
}

#[test]
fn test_advance_on_unknown_symbol_is_none() {
    let closure = Closure::new(&layered_grammar(), TableKind::Lr0);
    assert!(matches!(
        closure.advance(&Symbol::new("zzz")),
        Advance::None
    ));
}

#[test]
fn test_complete_state_reduces() {
    let closure = Closure::new(&layered_grammar(), TableKind::Lr0);
    let Advance::Shift { next, .. } = closure.advance(&Symbol::new("n")) else {
        panic!("expected a shift on n");
    };
    // {T → n •} reduces on anything under LR(0).
    match next.advance(&Symbol::new("plus")) {
        Advance::Reduce(reducers) => {
            assert_eq!(reducers.len(), 1);
            assert_eq!(reducers[0].production.lhs, Symbol::new("T"));
        }
        _ => panic!("expected a reduce on plus"),
    }
}

#[test]
fn test_ambiguous_state_conflicts() {
    // E → E plus E drives into {E → E plus E •, E → E • plus E}, where
    // `plus` both shifts and reduces.
    let closure = Closure::new(&expression_grammar(), TableKind::Lr0);
    let Advance::Shift { next: state1, .. } = closure.advance(&Symbol::new("E")) else {
        panic!("expected a shift on E");
    };
    let Advance::Shift { next: state3, .. } = state1.advance(&Symbol::new("plus")) else {
        panic!("expected a shift on plus");
    };
    let Advance::Shift { next: state4, .. } = state3.advance(&Symbol::new("E")) else {
        panic!("expected a shift on E");
    };
    match state4.advance(&Symbol::new("plus")) {
        Advance::Conflict { reducers, kernels } => {
            assert_eq!(reducers.len(), 1);
            assert_eq!(kernels.len(), 1);
            assert!(reducers[0].is_complete());
            assert!(!kernels[0].is_complete());
        }
        _ => panic!("expected a conflict on plus"),
    }
}

#[test]
fn test_augmented_item_never_reduces() {
    // State 1 holds {@S → E •}; acceptance is the builder's cell, not a
    // reduce candidate.
    let closure = Closure::new(&layered_grammar(), TableKind::Lr0);
    let Advance::Shift { next: state1, .. } = closure.advance(&Symbol::new("E")) else {
        panic!("expected a shift on E");
    };
    assert!(matches!(
        state1.advance(&Symbol::end_of_input()),
        Advance::None
    ));
}

#[test]
fn test_construction_is_idempotent() {
    let one = Closure::new(&layered_grammar(), TableKind::Lr1);
    let two = Closure::new(&layered_grammar(), TableKind::Lr1);
    assert_eq!(one, two);

    let Advance::Shift { next: first, kernels } = one.advance(&Symbol::new("T")) else {
        panic!("expected a shift on T");
    };
    let second = two.derive(kernels);
    assert_eq!(*first, second);
}

#[test]
fn test_equality_ignores_derived_dictionaries() {
    // The same item set built under LR(0) twice compares equal even though
    // intermediate state (productions order, maps) could differ.
    let one = Closure::new(&layered_grammar(), TableKind::Lr0);
    let mut reordered = layered_grammar();
    reordered.swap(2, 3);
    reordered.swap(1, 2);
    reordered.swap(2, 3);
    let two = Closure::new(&reordered, TableKind::Lr0);
    assert_eq!(one, two);
}

#[test]
fn test_lr1_derived_follow_tracks_parentheses() {
    let productions = vec![
        Production::<()>::plain("E", &["E", "plus", "T"]),
        Production::plain("E", &["T"]),
        Production::plain("T", &["n"]),
        Production::plain("T", &["lp", "E", "rp"]),
    ];
    let closure = Closure::new(
        &augment(&productions, none_callback(), IndexMap::new()),
        TableKind::Lr1,
    );
    let Advance::Shift { next: inner, .. } = closure.advance(&Symbol::new("lp")) else {
        panic!("expected a shift on lp");
    };
    // Inside the parentheses E may be followed by rp, so T inherits it.
    let follow_e = inner.follow().get(&Symbol::new("E")).unwrap();
    assert!(follow_e.contains(&Symbol::new("rp")));
    assert!(follow_e.contains(&Symbol::new("plus")));
    let follow_t = inner.follow().get(&Symbol::new("T")).unwrap();
    assert!(follow_t.contains(&Symbol::new("rp")));
}

#[test]
fn test_lr1_reduce_requires_lookahead() {
    let closure = Closure::new(&layered_grammar(), TableKind::Lr1);
    let Advance::Shift { next, .. } = closure.advance(&Symbol::new("n")) else {
        panic!("expected a shift on n");
    };
    // {T → n •, la} reduces on its lookaheads only.
    assert!(matches!(
        next.advance(&Symbol::new("plus")),
        Advance::Reduce(_)
    ));
    assert!(matches!(
        next.advance(&Symbol::end_of_input()),
        Advance::Reduce(_)
    ));
    assert!(matches!(next.advance(&Symbol::new("n")), Advance::None));
}
