//! Integration tests for the storage container
//!
//! Tests entity lifecycle, checked errors, bulk removal, and destruction.

use stowage_storage::{
    Entity, ErrorKind, RemovePolicy, Safety, Stable, Storage, StorageConfig,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position(f32, f32);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity(f32, f32);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Frozen;

// =============================================================================
// Entity Lifecycle
// =============================================================================

#[test]
fn ids_are_never_reused() {
    let mut storage = Storage::new();
    let a = storage.create_entity();
    storage.destroy_entity(a, Safety::Checked).unwrap();
    let b = storage.create_entity();

    assert_ne!(a, b);
    assert!(b > a);
    assert!(!storage.is_alive(a));
    assert_eq!(storage.entity_count(), 1);
}

#[test]
fn operations_on_unknown_entity_fail() {
    let mut storage = Storage::new();
    let ghost = Entity::new(77);

    let err = storage
        .remove_component::<Position>(ghost, Safety::Checked)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoSuchEntity(e) if e == ghost));

    let err = storage
        .add_component(ghost, Position(0.0, 0.0), Safety::Checked)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoSuchEntity(_)));

    let err = storage
        .get_component::<Position, Stable>(ghost, Safety::Checked)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoSuchEntity(_)));

    let err = storage.destroy_entity(ghost, Safety::Checked).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoSuchEntity(_)));
}

#[test]
fn adding_twice_fails() {
    let mut storage = Storage::new();
    let e = storage.create_entity();
    storage
        .add_component(e, Position(1.0, 1.0), Safety::Checked)
        .unwrap();

    let err = storage
        .add_component(e, Position(2.0, 2.0), Safety::Checked)
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::ComponentAlreadyExists { .. }));
    assert_eq!(
        *storage.pool::<Position>().unwrap().get(e).unwrap(),
        Position(1.0, 1.0)
    );
}

#[test]
fn with_config_prereserves() {
    let mut storage = Storage::with_config(StorageConfig::new().with_pool_capacity(64));
    let e = storage.create_entity();
    storage.add_component(e, Frozen, Safety::Unchecked).unwrap();
    assert_eq!(storage.config().pool_capacity, 64);
    assert!(storage.has_component::<Frozen>(e));
}

// =============================================================================
// Bulk Removal
// =============================================================================

fn moving_entity(storage: &mut Storage) -> Entity {
    let e = storage.create_entity();
    storage
        .add_component(e, Position(0.0, 0.0), Safety::Checked)
        .unwrap();
    storage
        .add_component(e, Velocity(1.0, 0.0), Safety::Checked)
        .unwrap();
    e
}

#[test]
fn strict_removal_of_present_set() {
    let mut storage = Storage::new();
    let e = moving_entity(&mut storage);

    storage
        .remove_components::<(Position, Velocity)>(e, RemovePolicy::Strict, Safety::Checked)
        .unwrap();

    assert!(!storage.has_component::<Position>(e));
    assert!(!storage.has_component::<Velocity>(e));
    assert!(storage.is_alive(e));
}

#[test]
fn strict_removal_reports_first_absent_type() {
    let mut storage = Storage::new();
    let e = moving_entity(&mut storage);
    storage.register::<Frozen>();

    let err = storage
        .remove_components::<(Frozen, Position)>(e, RemovePolicy::Strict, Safety::Checked)
        .unwrap_err();

    match err.kind {
        ErrorKind::ComponentDoesNotExist { component, .. } => {
            assert!(component.ends_with("Frozen"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(storage.has_component::<Position>(e));
}

#[test]
fn unchecked_strict_removal_ignores_absence() {
    let mut storage = Storage::new();
    let e = moving_entity(&mut storage);

    storage
        .remove_components::<(Frozen, Velocity)>(e, RemovePolicy::Strict, Safety::Unchecked)
        .unwrap();

    assert!(!storage.has_component::<Velocity>(e));
}

#[test]
fn remove_all_leaves_entity_alive() {
    let mut storage = Storage::new();
    let e = moving_entity(&mut storage);
    let other = moving_entity(&mut storage);

    storage
        .remove_all_components(e, RemovePolicy::Strict, Safety::Checked)
        .unwrap();

    assert!(storage.is_alive(e));
    assert!(!storage.has_component::<Position>(e));
    assert!(storage.has_component::<Position>(other));
    assert_eq!(storage.pool::<Velocity>().unwrap().len(), 1);
}

// =============================================================================
// Destruction
// =============================================================================

#[test]
fn destroy_cascades_to_every_pool() {
    let mut storage = Storage::new();
    let e = moving_entity(&mut storage);
    storage.add_component(e, Frozen, Safety::Checked).unwrap();

    storage.destroy_entity(e, Safety::Checked).unwrap();

    assert!(!storage.is_alive(e));
    assert_eq!(storage.component_names().count(), 3);
    assert!(storage.pool::<Position>().unwrap().is_empty());
    assert!(storage.pool::<Velocity>().unwrap().is_empty());
    assert!(storage.pool::<Frozen>().unwrap().is_empty());
}

#[test]
fn destroy_is_blocked_by_any_reference() {
    let mut storage = Storage::new();
    let e = moving_entity(&mut storage);
    let handle = storage
        .get_component::<Velocity, Stable>(e, Safety::Checked)
        .unwrap();

    let err = storage.destroy_entity(e, Safety::Checked).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::ComponentHasReferences { .. }));
    assert_eq!(err.context.as_ref().unwrap().operation, "destroy_entity");
    assert!(storage.is_alive(e));
    assert!(storage.has_component::<Position>(e));
    assert!(storage.has_component::<Velocity>(e));

    drop(handle);
    storage.destroy_entity(e, Safety::Checked).unwrap();
    assert!(!storage.is_alive(e));
}

#[test]
fn unchecked_destroy_of_dead_entity_is_silent() {
    let mut storage = Storage::new();
    let e = moving_entity(&mut storage);
    storage.destroy_entity(e, Safety::Unchecked).unwrap();
    storage.destroy_entity(e, Safety::Unchecked).unwrap();
    assert_eq!(storage.entity_count(), 0);
}
