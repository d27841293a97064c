//! Integration tests for views
//!
//! Tests multi-pool intersection and mutable iteration.

use std::collections::BTreeSet;

use proptest::prelude::*;
use stowage_storage::{Entity, Raw, Safety, Stable, Storage};

#[derive(Debug, PartialEq)]
struct A(u32);

#[derive(Debug, PartialEq)]
struct B(u32);

#[derive(Debug, PartialEq)]
struct C(u32);

// =============================================================================
// Intersection
// =============================================================================

#[test]
fn yields_exactly_entities_with_all_components() {
    let mut storage = Storage::new();
    let e1 = storage.create_entity();
    let e2 = storage.create_entity();
    let e3 = storage.create_entity();
    storage.add_component(e1, A(1), Safety::Checked).unwrap();
    storage.add_component(e1, B(1), Safety::Checked).unwrap();
    storage.add_component(e2, A(2), Safety::Checked).unwrap();
    storage.add_component(e3, B(3), Safety::Checked).unwrap();

    let view = storage.view::<(A, B)>();
    let hits: Vec<Entity> = view.iter().map(|(e, _)| e).collect();

    assert_eq!(hits, vec![e1]);
}

#[test]
fn components_come_back_in_tuple_order() {
    let mut storage = Storage::new();
    let e = storage.create_entity();
    storage.add_component(e, A(1), Safety::Checked).unwrap();
    storage.add_component(e, B(2), Safety::Checked).unwrap();
    storage.add_component(e, C(3), Safety::Checked).unwrap();

    let view = storage.view::<(C, A, B)>();
    let (entity, (c, a, b)) = view.iter().next().unwrap();

    assert_eq!(entity, e);
    assert_eq!((c.0, a.0, b.0), (3, 1, 2));
}

#[test]
fn smallest_pool_drives_iteration_order() {
    let mut storage = Storage::new();
    let entities: Vec<_> = (0..6).map(|_| storage.create_entity()).collect();
    for &e in &entities {
        storage.add_component(e, A(e.index()), Safety::Checked).unwrap();
    }
    // B is the smaller pool; its dense order is reversed
    for &e in entities.iter().rev().step_by(2) {
        storage.add_component(e, B(e.index()), Safety::Checked).unwrap();
    }

    let view = storage.view::<(A, B)>();
    assert_eq!(view.len_hint(), 3);
    let hits: Vec<u32> = view.iter().map(|(e, _)| e.index()).collect();
    assert_eq!(hits, vec![5, 3, 1]);
}

#[test]
fn view_reflects_removals() {
    let mut storage = Storage::new();
    let e1 = storage.create_entity();
    let e2 = storage.create_entity();
    for e in [e1, e2] {
        storage.add_component(e, A(0), Safety::Checked).unwrap();
        storage.add_component(e, B(0), Safety::Checked).unwrap();
    }
    storage.remove_component::<B>(e1, Safety::Checked).unwrap();

    let view = storage.view::<(A, B)>();
    assert_eq!(view.iter().map(|(e, _)| e).collect::<Vec<_>>(), vec![e2]);
}

#[test]
fn empty_and_unregistered() {
    let mut storage = Storage::new();
    storage.register::<A>();
    assert_eq!(storage.view::<(A,)>().iter().count(), 0);
    assert_eq!(storage.view::<(A, C)>().iter().count(), 0);
}

// =============================================================================
// Shared borrows
// =============================================================================

#[test]
fn read_views_nest_over_the_same_pool() {
    let mut storage = Storage::new();
    for i in 0..4 {
        let e = storage.create_entity();
        storage.add_component(e, A(i), Safety::Checked).unwrap();
        if i % 2 == 1 {
            storage.add_component(e, B(i), Safety::Checked).unwrap();
        }
    }

    let mut pairs = 0;
    for _ in &storage.view::<(A,)>() {
        pairs += storage.view::<(A, B)>().iter().count();
    }

    assert_eq!(pairs, 4 * 2);
}

#[test]
fn handles_read_during_iteration() {
    let mut storage = Storage::new();
    let first = storage.create_entity();
    let second = storage.create_entity();
    storage.add_component(first, A(10), Safety::Checked).unwrap();
    storage.add_component(second, A(20), Safety::Checked).unwrap();
    let handle = storage.get_component::<A, Stable>(second, Safety::Checked).unwrap();

    let view = storage.view::<(A,)>();
    let mut seen = Vec::new();
    for (_, (a,)) in &view {
        seen.push(a.0 + handle.get().0);
    }

    assert_eq!(seen, vec![30, 40]);
}

#[test]
fn raw_references_read_during_iteration() {
    let mut storage = Storage::new();
    let first = storage.create_entity();
    let second = storage.create_entity();
    storage.add_component(first, A(1), Safety::Checked).unwrap();
    storage.add_component(second, A(2), Safety::Checked).unwrap();

    let one = storage.get_component::<A, Raw>(first, Safety::Checked).unwrap();
    let two = storage.get_component::<A, Raw>(second, Safety::Checked).unwrap();
    let total: u32 = storage.view::<(A,)>().iter().map(|(_, (a,))| a.0).sum();

    assert_eq!(total, one.0 + two.0);
}

// =============================================================================
// Mutation
// =============================================================================

#[test]
fn cursor_updates_every_match() {
    let mut storage = Storage::new();
    for i in 0..10 {
        let e = storage.create_entity();
        storage.add_component(e, A(i), Safety::Checked).unwrap();
        if i % 3 == 0 {
            storage.add_component(e, B(100), Safety::Checked).unwrap();
        }
    }

    let mut view = storage.view_mut::<(A, B)>();
    let mut cursor = view.cursor();
    let mut touched = 0;
    while let Some((_, (a, b))) = cursor.next_mut() {
        a.0 += b.0;
        touched += 1;
    }
    drop(view);

    assert_eq!(touched, 4);
    let pool = storage.pool::<A>().unwrap();
    let values: Vec<u32> = pool.values().iter().map(|a| a.0).collect();
    assert_eq!(values, vec![100, 1, 2, 103, 4, 5, 106, 7, 8, 109]);
}

#[test]
#[should_panic(expected = "already borrowed")]
fn mutable_view_conflicts_with_handle_guard() {
    let mut storage = Storage::new();
    let e = storage.create_entity();
    storage.add_component(e, A(0), Safety::Checked).unwrap();
    let handle = storage.get_component::<A, Stable>(e, Safety::Checked).unwrap();

    let _reading = handle.get();
    let _view = storage.view_mut::<(A,)>();
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #[test]
    fn view_matches_set_intersection(
        with_a in prop::collection::btree_set(0u32..40, 0..40),
        with_b in prop::collection::btree_set(0u32..40, 0..40),
    ) {
        let mut storage = Storage::new();
        let entities: Vec<_> = (0..40).map(|_| storage.create_entity()).collect();
        for &i in &with_a {
            storage.add_component(entities[i as usize], A(i), Safety::Checked).unwrap();
        }
        for &i in &with_b {
            storage.add_component(entities[i as usize], B(i), Safety::Checked).unwrap();
        }

        let view = storage.view::<(A, B)>();
        let mut seen = BTreeSet::new();
        for (e, (a, b)) in &view {
            prop_assert_eq!(a.0, e.index());
            prop_assert_eq!(b.0, e.index());
            prop_assert!(seen.insert(e.index()));
        }

        let expected: BTreeSet<u32> = with_a.intersection(&with_b).copied().collect();
        prop_assert_eq!(seen, expected);
    }
}
