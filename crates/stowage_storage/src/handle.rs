//! Generation-checked, reference-counted component handles.

use std::any::type_name;
use std::cell::{Ref, RefMut};
use std::fmt;
use std::rc::Rc;

use stowage_foundation::{Entity, Error, Result};

use crate::component::Component;
use crate::pool::PackedPool;

/// A stable reference to one component in one pool.
///
/// A handle survives compaction of its pool: it looks the component up by
/// entity on every access instead of remembering a slot. It captures the
/// component's generation tag at creation, so a component that was removed
/// and re-added is never mistaken for the original.
///
/// While a handle is [valid](Handle::valid) it counts as a reference on its
/// component, and checked removal of that component fails with
/// `ComponentHasReferences`. Dropping the handle releases the reference.
///
/// Handles keep their pool alive through an `Rc`, so they never dangle even
/// if the storage is dropped first.
pub struct Handle<C: Component> {
    pool: Rc<PackedPool<C>>,
    entity: Entity,
    generation: u32,
}

impl<C: Component> Handle<C> {
    /// Creates a handle to the component of `entity` in `pool`.
    ///
    /// # Errors
    ///
    /// Returns `ComponentDoesNotExist` if `entity` has no component there.
    pub fn new(pool: Rc<PackedPool<C>>, entity: Entity) -> Result<Self> {
        let generation = pool
            .acquire(entity)
            .ok_or_else(|| Error::does_not_exist(entity, type_name::<C>()))?;
        Ok(Self {
            pool,
            entity,
            generation,
        })
    }

    /// Creates a handle to a component the caller knows exists.
    pub(crate) fn new_unchecked(pool: Rc<PackedPool<C>>, entity: Entity) -> Self {
        debug_assert!(pool.has(entity), "{entity:?} has no component");
        let generation = pool.acquire(entity).unwrap_or_default();
        Self {
            pool,
            entity,
            generation,
        }
    }

    /// Returns true if the component this handle was created for is still
    /// in the pool.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.pool.is_current(self.entity, self.generation)
    }

    /// The entity whose component this handle refers to.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// The generation tag captured at creation.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Borrows the component.
    ///
    /// The handle must be valid; see [`try_get`](Self::try_get).
    ///
    /// # Panics
    ///
    /// Panics if the component was removed, or if it is mutably borrowed.
    #[must_use]
    pub fn get(&self) -> Ref<'_, C> {
        debug_assert!(self.valid(), "stale handle to {:?}", self.entity);
        self.pool.get_fast(self.entity)
    }

    /// Mutably borrows the component.
    ///
    /// The handle must be valid; see [`try_get_mut`](Self::try_get_mut).
    ///
    /// # Panics
    ///
    /// Panics if the component was removed, or if it is already borrowed.
    #[must_use]
    pub fn get_mut(&self) -> RefMut<'_, C> {
        debug_assert!(self.valid(), "stale handle to {:?}", self.entity);
        self.pool.get_fast_mut(self.entity)
    }

    /// Borrows the component, or returns `None` if the handle is stale.
    #[must_use]
    pub fn try_get(&self) -> Option<Ref<'_, C>> {
        self.valid().then(|| self.pool.get_fast(self.entity))
    }

    /// Mutably borrows the component, or returns `None` if the handle is stale.
    #[must_use]
    pub fn try_get_mut(&self) -> Option<RefMut<'_, C>> {
        self.valid().then(|| self.pool.get_fast_mut(self.entity))
    }
}

impl<C: Component> Clone for Handle<C> {
    fn clone(&self) -> Self {
        self.pool.retain(self.entity, self.generation);
        Self {
            pool: Rc::clone(&self.pool),
            entity: self.entity,
            generation: self.generation,
        }
    }
}

impl<C: Component> Drop for Handle<C> {
    fn drop(&mut self) {
        self.pool.release(self.entity, self.generation);
    }
}

impl<C: Component> fmt::Debug for Handle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("component", &type_name::<C>())
            .field("entity", &self.entity)
            .field("generation", &self.generation)
            .field("valid", &self.valid())
            .finish()
    }
}
