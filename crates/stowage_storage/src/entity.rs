//! Entity allocation and the live-entity set.
//!
//! Identifiers are handed out from a counter and never recycled, so the set
//! is a flag vector indexed by entity id with O(1) membership.

// Entity ids are u32; the flag vector never grows past u32::MAX entries.
#![allow(clippy::cast_possible_truncation)]

use stowage_foundation::Entity;

/// Allocates entity ids and tracks which of them are alive.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    /// `alive[id]` for every id allocated so far.
    alive: Vec<bool>,
    /// Count of live entities.
    live_count: usize,
}

impl EntitySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with room for `capacity` allocations.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            alive: Vec::with_capacity(capacity),
            live_count: 0,
        }
    }

    /// Allocates the next id and marks it alive.
    ///
    /// # Panics
    ///
    /// Panics once every id below [`Entity::NULL`] has been handed out.
    pub fn allocate(&mut self) -> Entity {
        let entity = Entity::new(self.next_index());
        assert!(!entity.is_null(), "entity id space exhausted");
        self.alive.push(true);
        self.live_count += 1;
        entity
    }

    /// The id the next call to [`allocate`](Self::allocate) returns.
    #[must_use]
    pub fn next_index(&self) -> u32 {
        self.alive.len() as u32
    }

    /// Returns true if `entity` is alive.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.alive.get(entity.as_usize()).copied().unwrap_or(false)
    }

    /// Marks `entity` dead. Returns false if it was not alive.
    ///
    /// The id is never handed out again.
    pub fn remove(&mut self, entity: Entity) -> bool {
        match self.alive.get_mut(entity.as_usize()) {
            Some(flag) if *flag => {
                *flag = false;
                self.live_count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if no entity is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Iterates over live entities in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|&(_, &alive)| alive)
            .map(|(index, _)| Entity::new(index as u32))
    }
}
