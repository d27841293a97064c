//! Integration tests for handles
//!
//! Tests reference counting, staleness detection, and write-through.

use stowage_storage::{ErrorKind, Handle, Raw, Safety, Stable, Storage};

#[derive(Debug, Clone, Copy, PartialEq)]
struct V3 {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, PartialEq)]
struct Name(&'static str);

// =============================================================================
// Write-through
// =============================================================================

#[test]
fn mutation_through_handle_is_visible_to_raw_reads() {
    let mut storage = Storage::new();
    let e = storage.create_entity();
    storage
        .add_component(e, V3 { x: 1.0, y: 2.0, z: 3.0 }, Safety::Checked)
        .unwrap();

    let handle = storage.get_component::<V3, Stable>(e, Safety::Checked).unwrap();
    {
        let mut v = handle.get_mut();
        v.x += 10.0;
        v.y += 20.0;
        v.z += 30.0;
    }
    drop(handle);

    let v = storage.get_component::<V3, Raw>(e, Safety::Unchecked).unwrap();
    assert_eq!(*v, V3 { x: 11.0, y: 22.0, z: 33.0 });
}

#[test]
fn handle_follows_component_through_compaction() {
    let mut storage = Storage::new();
    let entities: Vec<_> = (0..5).map(|_| storage.create_entity()).collect();
    for (i, &e) in entities.iter().enumerate() {
        storage.add_component(e, i, Safety::Checked).unwrap();
    }

    let last = storage
        .get_component::<usize, Stable>(entities[4], Safety::Checked)
        .unwrap();
    storage
        .remove_component::<usize>(entities[0], Safety::Checked)
        .unwrap();
    storage
        .remove_component::<usize>(entities[1], Safety::Checked)
        .unwrap();

    assert!(last.valid());
    assert_eq!(*last.get(), 4);
}

// =============================================================================
// Reference counting
// =============================================================================

#[test]
fn live_handle_blocks_checked_removal() {
    let mut storage = Storage::new();
    let e = storage.create_entity();
    storage.add_component(e, Name("a"), Safety::Checked).unwrap();

    let handle = storage.get_component::<Name, Stable>(e, Safety::Checked).unwrap();
    let copy = handle.clone();

    let err = storage
        .remove_component::<Name>(e, Safety::Checked)
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::ComponentHasReferences { references: 2, .. }
    ));

    drop(handle);
    assert!(storage.remove_component::<Name>(e, Safety::Checked).is_err());

    drop(copy);
    assert_eq!(
        storage.remove_component::<Name>(e, Safety::Checked).unwrap(),
        Name("a")
    );
}

#[test]
fn moved_handle_keeps_single_reference() {
    let mut storage = Storage::new();
    let e = storage.create_entity();
    storage.add_component(e, Name("m"), Safety::Checked).unwrap();

    let handle = storage.get_component::<Name, Stable>(e, Safety::Checked).unwrap();
    let holder = vec![handle];
    assert_eq!(storage.pool::<Name>().unwrap().refcount(e), Some(1));

    drop(holder);
    assert_eq!(storage.pool::<Name>().unwrap().refcount(e), Some(0));
}

#[test]
fn reassigning_a_handle_releases_the_old_component() {
    let mut storage = Storage::new();
    let a = storage.create_entity();
    let b = storage.create_entity();
    storage.add_component(a, Name("a"), Safety::Checked).unwrap();
    storage.add_component(b, Name("b"), Safety::Checked).unwrap();

    let mut handle = storage.get_component::<Name, Stable>(a, Safety::Checked).unwrap();
    assert_eq!(*handle.get(), Name("a"));
    handle = storage.get_component::<Name, Stable>(b, Safety::Checked).unwrap();

    let pool = storage.pool::<Name>().unwrap();
    assert_eq!(pool.refcount(a), Some(0));
    assert_eq!(pool.refcount(b), Some(1));
    assert_eq!(*handle.get(), Name("b"));
}

// =============================================================================
// Staleness
// =============================================================================

#[test]
fn readd_gets_a_new_generation() {
    let mut storage = Storage::new();
    let e = storage.create_entity();
    storage.add_component(e, Name("first"), Safety::Checked).unwrap();

    let handle = storage.get_component::<Name, Stable>(e, Safety::Checked).unwrap();
    let generation = handle.generation();
    drop(handle);

    storage.remove_component::<Name>(e, Safety::Checked).unwrap();
    storage.add_component(e, Name("second"), Safety::Checked).unwrap();

    let fresh = storage.get_component::<Name, Stable>(e, Safety::Checked).unwrap();
    assert_ne!(fresh.generation(), generation);
    assert!(fresh.valid());
    assert_eq!(*fresh.get(), Name("second"));
}

#[test]
fn handle_to_missing_component_is_an_error() {
    let mut storage = Storage::new();
    let e = storage.create_entity();
    storage.register::<Name>();

    let err = storage
        .get_component::<Name, Stable>(e, Safety::Checked)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ComponentDoesNotExist { .. }));
}

#[test]
fn handle_outlives_storage() {
    let mut storage = Storage::new();
    let e = storage.create_entity();
    storage.add_component(e, Name("kept"), Safety::Checked).unwrap();

    let handle: Handle<Name> = storage.get_component::<Name, Stable>(e, Safety::Checked).unwrap();
    drop(storage);

    assert!(handle.valid());
    assert_eq!(*handle.get(), Name("kept"));
}

#[test]
#[cfg(not(debug_assertions))]
fn handle_held_across_readd_goes_stale() {
    let mut storage = Storage::new();
    let e = storage.create_entity();
    storage.add_component(e, Name("first"), Safety::Checked).unwrap();
    let old = storage.get_component::<Name, Stable>(e, Safety::Checked).unwrap();

    storage.remove_component::<Name>(e, Safety::Unchecked).unwrap();
    assert!(!old.valid());

    storage.add_component(e, Name("second"), Safety::Checked).unwrap();
    assert!(!old.valid());
    assert!(old.try_get().is_none());
    assert!(old.try_get_mut().is_none());

    let copy = old.clone();
    assert!(!copy.valid());
    assert_eq!(storage.pool::<Name>().unwrap().refcount(e), Some(0));

    let fresh = storage.get_component::<Name, Stable>(e, Safety::Checked).unwrap();
    drop(old);
    drop(copy);

    let pool = storage.pool::<Name>().unwrap();
    assert_eq!(pool.refcount(e), Some(1));
    assert!(fresh.valid());
    assert_ne!(fresh.generation(), 0);
    drop(fresh);
    assert_eq!(storage.pool::<Name>().unwrap().refcount(e), Some(0));
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "component is referenced")]
fn unchecked_removal_of_referenced_component_asserts() {
    let mut storage = Storage::new();
    let e = storage.create_entity();
    storage.add_component(e, Name("held"), Safety::Checked).unwrap();
    let _handle = storage.get_component::<Name, Stable>(e, Safety::Checked).unwrap();

    let _ = storage.remove_component::<Name>(e, Safety::Unchecked);
}
