//! Dense per-type component pools.
//!
//! A [`PackedPool`] keeps every component of one type in a contiguous array
//! with no holes. A sparse array maps entity ids to dense slots; removal
//! moves the last element into the vacated slot (swap-and-pop), so the
//! dense arrays always stay packed.
//!
//! Values and bookkeeping live in separate `RefCell`s. Reading or mutating a
//! value borrows only the value array, while handles touch only the
//! bookkeeping, so the two never conflict.

// Dense indices are stored as u32; a pool can never hold more components
// than there are entity ids.
#![allow(clippy::cast_possible_truncation)]

use std::any::type_name;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;

use stowage_foundation::{Entity, Error, Result};

/// Marks an unoccupied sparse entry.
const VACANT: u32 = u32::MAX;

/// Per-slot bookkeeping, parallel to the value array.
#[derive(Debug, Default)]
pub(crate) struct Slots {
    /// `owners[i]` owns `values[i]`.
    owners: Vec<Entity>,
    /// Entity id to dense slot, or `VACANT`.
    sparse: Vec<u32>,
    /// Generation tag assigned when the component was inserted.
    generations: Vec<u32>,
    /// Outstanding handles per slot.
    refcounts: Vec<Cell<u32>>,
    next_generation: u32,
}

impl Slots {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            owners: Vec::with_capacity(capacity),
            sparse: Vec::new(),
            generations: Vec::with_capacity(capacity),
            refcounts: Vec::with_capacity(capacity),
            next_generation: 0,
        }
    }

    pub(crate) fn slot(&self, entity: Entity) -> Option<usize> {
        match self.sparse.get(entity.as_usize()) {
            Some(&slot) if slot != VACANT => Some(slot as usize),
            _ => None,
        }
    }

    /// Dense slot of a present entity. Absent entities yield an index past
    /// the end of the dense arrays, so the subsequent access panics.
    pub(crate) fn slot_fast(&self, entity: Entity) -> usize {
        self.sparse[entity.as_usize()] as usize
    }

    pub(crate) fn owners(&self) -> &[Entity] {
        &self.owners
    }

    fn push(&mut self, entity: Entity) {
        let index = entity.as_usize();
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, VACANT);
        }
        self.sparse[index] = self.owners.len() as u32;
        self.owners.push(entity);
        self.generations.push(self.next_generation);
        self.refcounts.push(Cell::new(0));
        self.next_generation = self.next_generation.wrapping_add(1);
    }

    fn swap_remove(&mut self, entity: Entity, slot: usize) {
        self.owners.swap_remove(slot);
        self.generations.swap_remove(slot);
        self.refcounts.swap_remove(slot);
        if let Some(&moved) = self.owners.get(slot) {
            self.sparse[moved.as_usize()] = slot as u32;
        }
        self.sparse[entity.as_usize()] = VACANT;
    }

    fn is_current(&self, entity: Entity, generation: u32) -> Option<usize> {
        let slot = self.slot(entity)?;
        (self.generations[slot] == generation).then_some(slot)
    }
}

/// Densely packed storage for every component of type `C`.
///
/// All methods take `&self`; the pool is shared through `Rc` by the
/// [`Storage`](crate::Storage) and every [`Handle`](crate::Handle) into it.
/// Inserting or removing while a value guard is alive is a borrow violation
/// and panics instead of invalidating the guard.
pub struct PackedPool<C> {
    values: RefCell<Vec<C>>,
    slots: RefCell<Slots>,
}

impl<C> Default for PackedPool<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> PackedPool<C> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty pool with room for `capacity` components.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: RefCell::new(Vec::with_capacity(capacity)),
            slots: RefCell::new(Slots::with_capacity(capacity)),
        }
    }

    /// Returns the number of components in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.borrow().owners.len()
    }

    /// Returns true if the pool holds no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `entity` has a component in this pool.
    #[must_use]
    pub fn has(&self, entity: Entity) -> bool {
        self.slots.borrow().slot(entity).is_some()
    }

    /// Adds a component for `entity`.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchEntity` for [`Entity::NULL`], or
    /// `ComponentAlreadyExists` if `entity` already has one.
    pub fn insert(&self, entity: Entity, value: C) -> Result<()> {
        if entity.is_null() {
            return Err(Error::no_such_entity(entity));
        }
        if self.has(entity) {
            return Err(Error::already_exists(entity, type_name::<C>()));
        }
        self.insert_fast(entity, value);
        Ok(())
    }

    /// Adds a component for `entity` without checking for an existing one.
    ///
    /// The caller guarantees `entity` is not null and has no component here.
    pub fn insert_fast(&self, entity: Entity, value: C) {
        debug_assert!(!entity.is_null(), "cannot attach components to NULL");
        debug_assert!(!self.has(entity), "{entity:?} already has a component");

        let mut values = self.values.borrow_mut();
        let mut slots = self.slots.borrow_mut();
        slots.push(entity);
        values.push(value);
    }

    /// Removes and returns the component of `entity`.
    ///
    /// # Errors
    ///
    /// Returns `ComponentDoesNotExist` if `entity` has no component, or
    /// `ComponentHasReferences` if handles to it are still alive.
    pub fn remove(&self, entity: Entity) -> Result<C> {
        {
            let slots = self.slots.borrow();
            let Some(slot) = slots.slot(entity) else {
                return Err(Error::does_not_exist(entity, type_name::<C>()));
            };
            let references = slots.refcounts[slot].get();
            if references != 0 {
                return Err(Error::has_references(
                    entity,
                    type_name::<C>(),
                    references,
                ));
            }
        }
        Ok(self.remove_fast(entity))
    }

    /// Removes and returns the component of `entity` without validation.
    ///
    /// The caller guarantees the component exists and is unreferenced.
    ///
    /// # Panics
    ///
    /// Panics if `entity` has no component in this pool.
    pub fn remove_fast(&self, entity: Entity) -> C {
        debug_assert!(self.has(entity), "{entity:?} has no component");
        debug_assert_eq!(self.refcount(entity), Some(0), "component is referenced");

        let mut values = self.values.borrow_mut();
        let mut slots = self.slots.borrow_mut();
        let slot = slots.slot_fast(entity);
        let value = values.swap_remove(slot);
        slots.swap_remove(entity, slot);
        value
    }

    /// Borrows the component of `entity`.
    ///
    /// # Errors
    ///
    /// Returns `ComponentDoesNotExist` if `entity` has no component.
    pub fn get(&self, entity: Entity) -> Result<Ref<'_, C>> {
        let slot = self
            .slots
            .borrow()
            .slot(entity)
            .ok_or_else(|| Error::does_not_exist(entity, type_name::<C>()))?;
        Ok(Ref::map(self.values.borrow(), |values| &values[slot]))
    }

    /// Mutably borrows the component of `entity`.
    ///
    /// # Errors
    ///
    /// Returns `ComponentDoesNotExist` if `entity` has no component.
    pub fn get_mut(&self, entity: Entity) -> Result<RefMut<'_, C>> {
        let slot = self
            .slots
            .borrow()
            .slot(entity)
            .ok_or_else(|| Error::does_not_exist(entity, type_name::<C>()))?;
        Ok(RefMut::map(self.values.borrow_mut(), |values| {
            &mut values[slot]
        }))
    }

    /// Borrows the component of `entity`, which must exist.
    ///
    /// # Panics
    ///
    /// Panics if `entity` has no component in this pool.
    #[must_use]
    pub fn get_fast(&self, entity: Entity) -> Ref<'_, C> {
        let slot = self.slots.borrow().slot_fast(entity);
        Ref::map(self.values.borrow(), |values| &values[slot])
    }

    /// Mutably borrows the component of `entity`, which must exist.
    ///
    /// # Panics
    ///
    /// Panics if `entity` has no component in this pool.
    #[must_use]
    pub fn get_fast_mut(&self, entity: Entity) -> RefMut<'_, C> {
        let slot = self.slots.borrow().slot_fast(entity);
        RefMut::map(self.values.borrow_mut(), |values| &mut values[slot])
    }

    /// Owners of the dense slots, in storage order.
    #[must_use]
    pub fn entities(&self) -> Ref<'_, [Entity]> {
        Ref::map(self.slots.borrow(), |slots| slots.owners.as_slice())
    }

    /// The dense value array, in the same order as [`entities`](Self::entities).
    #[must_use]
    pub fn values(&self) -> Ref<'_, [C]> {
        Ref::map(self.values.borrow(), Vec::as_slice)
    }

    /// Mutable access to the dense value array.
    #[must_use]
    pub fn values_mut(&self) -> RefMut<'_, [C]> {
        RefMut::map(self.values.borrow_mut(), Vec::as_mut_slice)
    }

    /// Dense slot currently holding the component of `entity`.
    #[must_use]
    pub fn slot(&self, entity: Entity) -> Option<usize> {
        self.slots.borrow().slot(entity)
    }

    /// Generation tag of the component of `entity`.
    #[must_use]
    pub fn generation(&self, entity: Entity) -> Option<u32> {
        let slots = self.slots.borrow();
        slots.slot(entity).map(|slot| slots.generations[slot])
    }

    /// Number of live handles to the component of `entity`.
    #[must_use]
    pub fn refcount(&self, entity: Entity) -> Option<u32> {
        let slots = self.slots.borrow();
        slots.slot(entity).map(|slot| slots.refcounts[slot].get())
    }

    /// Reserves room for at least `additional` more components.
    pub fn reserve(&self, additional: usize) {
        self.values.borrow_mut().reserve(additional);
        let mut slots = self.slots.borrow_mut();
        slots.owners.reserve(additional);
        slots.generations.reserve(additional);
        slots.refcounts.reserve(additional);
    }

    /// Verifies the sparse/dense invariants.
    ///
    /// Every dense array has the same length, every owner maps back to its
    /// own slot, and every occupied sparse entry points at a slot owned by
    /// that entity.
    #[must_use]
    pub fn check_invariants(&self) -> bool {
        let values = self.values.borrow();
        let slots = self.slots.borrow();
        let len = slots.owners.len();

        if values.len() != len || slots.generations.len() != len || slots.refcounts.len() != len
        {
            return false;
        }

        let owners_map_back = slots
            .owners
            .iter()
            .enumerate()
            .all(|(slot, &owner)| slots.slot(owner) == Some(slot));

        let occupied = slots.sparse.iter().filter(|&&slot| slot != VACANT).count();

        owners_map_back && occupied == len
    }

    /// Takes a handle reference on the component of `entity`.
    ///
    /// Returns the generation the reference was taken against.
    pub(crate) fn acquire(&self, entity: Entity) -> Option<u32> {
        let slots = self.slots.borrow();
        let slot = slots.slot(entity)?;
        let count = &slots.refcounts[slot];
        count.set(count.get() + 1);
        Some(slots.generations[slot])
    }

    /// Takes another reference if `generation` is still current.
    pub(crate) fn retain(&self, entity: Entity, generation: u32) -> bool {
        let slots = self.slots.borrow();
        match slots.is_current(entity, generation) {
            Some(slot) => {
                let count = &slots.refcounts[slot];
                count.set(count.get() + 1);
                true
            }
            None => false,
        }
    }

    /// Drops a reference if `generation` is still current.
    pub(crate) fn release(&self, entity: Entity, generation: u32) {
        let slots = self.slots.borrow();
        if let Some(slot) = slots.is_current(entity, generation) {
            let count = &slots.refcounts[slot];
            count.set(count.get().saturating_sub(1));
        }
    }

    /// Returns true if `entity` holds the component tagged `generation`.
    pub(crate) fn is_current(&self, entity: Entity, generation: u32) -> bool {
        self.slots.borrow().is_current(entity, generation).is_some()
    }

    /// Borrows the whole pool for shared iteration.
    ///
    /// # Panics
    ///
    /// Panics if a mutable value guard into this pool is alive.
    pub(crate) fn read(&self) -> PoolRef<'_, C> {
        PoolRef {
            values: self.values.borrow(),
            slots: self.slots.borrow(),
        }
    }

    /// Borrows the whole pool for mutable iteration.
    ///
    /// # Panics
    ///
    /// Panics if any value guard into this pool is alive.
    pub(crate) fn write(&self) -> PoolMut<'_, C> {
        PoolMut {
            values: self.values.borrow_mut(),
            slots: self.slots.borrow(),
        }
    }
}

impl<C> fmt::Debug for PackedPool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedPool")
            .field("component", &type_name::<C>())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Dense bookkeeping shared by both pool guards.
#[doc(hidden)]
pub trait Dense {
    /// Number of components in the pool.
    fn len(&self) -> usize;

    /// Owners of the dense slots.
    fn owners(&self) -> &[Entity];

    /// Returns true if `entity` has a component in the pool.
    fn contains(&self, entity: Entity) -> bool;
}

/// Shared borrow of a pool's values and bookkeeping, held by a
/// [`View`](crate::View) for its lifetime.
#[doc(hidden)]
pub struct PoolRef<'a, C> {
    values: Ref<'a, Vec<C>>,
    slots: Ref<'a, Slots>,
}

impl<C> PoolRef<'_, C> {
    pub(crate) fn get(&self, entity: Entity) -> &C {
        &self.values[self.slots.slot_fast(entity)]
    }
}

impl<C> Dense for PoolRef<'_, C> {
    fn len(&self) -> usize {
        self.slots.owners.len()
    }

    fn owners(&self) -> &[Entity] {
        self.slots.owners()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.slots.slot(entity).is_some()
    }
}

/// Exclusive borrow of a pool's values with shared bookkeeping, held by a
/// [`ViewMut`](crate::ViewMut) for its lifetime.
#[doc(hidden)]
pub struct PoolMut<'a, C> {
    values: RefMut<'a, Vec<C>>,
    slots: Ref<'a, Slots>,
}

impl<C> PoolMut<'_, C> {
    pub(crate) fn get_mut(&mut self, entity: Entity) -> &mut C {
        let slot = self.slots.slot_fast(entity);
        &mut self.values[slot]
    }
}

impl<C> Dense for PoolMut<'_, C> {
    fn len(&self) -> usize {
        self.slots.owners.len()
    }

    fn owners(&self) -> &[Entity] {
        self.slots.owners()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.slots.slot(entity).is_some()
    }
}
