//! The storage container.
//!
//! A [`Storage`] owns the live-entity set and one [`PackedPool`] per
//! registered component type. Pools are created lazily on first use and are
//! kept in registration order.

use std::any::{TypeId, type_name};
use std::cell::RefMut;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::{debug, trace};
use stowage_foundation::{Entity, Error, RemovePolicy, Result, Safety};

use crate::component::{Component, ErasedPool};
use crate::config::StorageConfig;
use crate::entity::EntitySet;
use crate::pool::PackedPool;
use crate::reference::ReferenceStyle;
use crate::set::{ComponentSet, Query};
use crate::view::{View, ViewMut};

/// Entities plus one packed pool per component type.
///
/// Every mutating operation takes a [`Safety`]. Checked calls validate their
/// preconditions and report violations as errors; unchecked calls trust the
/// caller and only assert in debug builds.
pub struct Storage {
    entities: EntitySet,
    pools: Vec<Rc<dyn ErasedPool>>,
    index: HashMap<TypeId, usize>,
    config: StorageConfig,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StorageConfig::default())
    }

    /// Creates an empty storage with the given capacity hints.
    #[must_use]
    pub fn with_config(config: StorageConfig) -> Self {
        Self {
            entities: EntitySet::with_capacity(config.entity_capacity),
            pools: Vec::new(),
            index: HashMap::new(),
            config,
        }
    }

    /// Returns the configuration this storage was created with.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    // --- Entities ---

    /// Allocates a new live entity.
    ///
    /// Ids are strictly increasing and never reused.
    ///
    /// # Panics
    ///
    /// Panics if the entity id space is exhausted.
    pub fn create_entity(&mut self) -> Entity {
        self.entities.allocate()
    }

    /// Returns true if `entity` is alive.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Iterates over live entities in creation order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// Destroys `entity` and every component it has.
    ///
    /// Checked destruction is all-or-nothing with respect to handles: if any
    /// component of `entity` is still referenced, nothing changes.
    ///
    /// # Errors
    ///
    /// In checked mode, returns `NoSuchEntity` if `entity` is not alive, or
    /// `ComponentHasReferences` if a handle to one of its components is alive.
    pub fn destroy_entity(&mut self, entity: Entity, safety: Safety) -> Result<()> {
        if safety.is_checked() {
            self.ensure_alive(entity)
                .map_err(|e| e.in_operation("destroy_entity"))?;

            for pool in &self.pools {
                let references = pool.references(entity);
                if references != 0 {
                    debug!(
                        "cannot destroy {entity:?}: {} has {references} reference(s)",
                        pool.component_name()
                    );
                    return Err(
                        Error::has_references(entity, pool.component_name(), references)
                            .in_operation("destroy_entity"),
                    );
                }
            }
        }

        self.entities.remove(entity);
        for pool in &self.pools {
            if pool.contains(entity) {
                pool.discard(entity, safety)
                    .map_err(|e| e.in_operation("destroy_entity"))?;
            }
        }

        trace!("destroyed entity {entity:?}");
        Ok(())
    }

    // --- Pools ---

    /// Registers a pool for `C`. Returns false if one already exists.
    pub fn register<C: Component>(&mut self) -> bool {
        if self.index.contains_key(&TypeId::of::<C>()) {
            return false;
        }
        self.insert_pool::<C>();
        true
    }

    /// Number of registered component types.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Type names of the registered component types, in registration order.
    pub fn component_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pools.iter().map(|pool| pool.component_name())
    }

    /// Returns the pool for `C`, if registered.
    #[must_use]
    pub fn pool<C: Component>(&self) -> Option<&PackedPool<C>> {
        let slot = *self.index.get(&TypeId::of::<C>())?;
        self.pools[slot].as_any().downcast_ref()
    }

    /// Returns a shared pointer to the pool for `C`, if registered.
    pub(crate) fn shared_pool<C: Component>(&self) -> Option<Rc<PackedPool<C>>> {
        let slot = *self.index.get(&TypeId::of::<C>())?;
        Rc::clone(&self.pools[slot]).into_any().downcast().ok()
    }

    fn pool_or_register<C: Component>(&mut self) -> &PackedPool<C> {
        let slot = match self.index.get(&TypeId::of::<C>()) {
            Some(&slot) => slot,
            None => self.insert_pool::<C>(),
        };
        match self.pools[slot].as_any().downcast_ref() {
            Some(pool) => pool,
            None => unreachable!("pool registered under a foreign TypeId"),
        }
    }

    fn insert_pool<C: Component>(&mut self) -> usize {
        let slot = self.pools.len();
        let pool = PackedPool::<C>::with_capacity(self.config.pool_capacity);
        self.pools.push(Rc::new(pool));
        self.index.insert(TypeId::of::<C>(), slot);
        debug!("registered component pool {} at {slot}", type_name::<C>());
        slot
    }

    // --- Components ---

    /// Attaches `value` to `entity`, registering the pool for `C` if needed.
    ///
    /// # Errors
    ///
    /// In checked mode, returns `NoSuchEntity` if `entity` is not alive, or
    /// `ComponentAlreadyExists` if it already has a `C`.
    pub fn add_component<C: Component>(
        &mut self,
        entity: Entity,
        value: C,
        safety: Safety,
    ) -> Result<()> {
        match safety {
            Safety::Checked => {
                self.ensure_alive(entity)
                    .map_err(|e| e.in_operation("add_component"))?;
                self.pool_or_register::<C>()
                    .insert(entity, value)
                    .map_err(|e| e.in_operation("add_component"))
            }
            Safety::Unchecked => {
                debug_assert!(self.is_alive(entity), "{entity:?} is not alive");
                self.pool_or_register::<C>().insert_fast(entity, value);
                Ok(())
            }
        }
    }

    /// Detaches and returns the `C` of `entity`.
    ///
    /// # Errors
    ///
    /// In checked mode, returns `NoSuchEntity`, `ComponentDoesNotExist`, or
    /// `ComponentHasReferences`. Both modes report `ComponentDoesNotExist`
    /// when no pool for `C` was ever registered.
    pub fn remove_component<C: Component>(&mut self, entity: Entity, safety: Safety) -> Result<C> {
        if safety.is_checked() {
            self.ensure_alive(entity)
                .map_err(|e| e.in_operation("remove_component"))?;
        }
        let pool = self.pool::<C>().ok_or_else(|| {
            Error::does_not_exist(entity, type_name::<C>()).in_operation("remove_component")
        })?;
        match safety {
            Safety::Checked => pool
                .remove(entity)
                .map_err(|e| e.in_operation("remove_component")),
            Safety::Unchecked => Ok(pool.remove_fast(entity)),
        }
    }

    /// Looks up the `C` of `entity`, returning a reference of style `S`.
    ///
    /// ```
    /// use stowage_storage::{Raw, Safety, Stable, Storage};
    ///
    /// let mut storage = Storage::new();
    /// let e = storage.create_entity();
    /// storage.add_component(e, 1u32, Safety::Checked).unwrap();
    ///
    /// let handle = storage.get_component::<u32, Stable>(e, Safety::Checked).unwrap();
    /// *handle.get_mut() += 1;
    /// drop(handle);
    ///
    /// let first = storage.get_component::<u32, Raw>(e, Safety::Unchecked).unwrap();
    /// let second = storage.get_component::<u32, Raw>(e, Safety::Checked).unwrap();
    /// assert_eq!(*first + *second, 4);
    /// ```
    ///
    /// # Errors
    ///
    /// In checked mode, returns `NoSuchEntity` or `ComponentDoesNotExist`.
    /// Both modes report `ComponentDoesNotExist` when no pool for `C` was
    /// ever registered.
    pub fn get_component<C: Component, S: ReferenceStyle>(
        &self,
        entity: Entity,
        safety: Safety,
    ) -> Result<S::Ref<'_, C>> {
        if safety.is_checked() {
            self.ensure_alive(entity)
                .map_err(|e| e.in_operation("get_component"))?;
        }
        S::resolve::<C>(self, entity, safety).map_err(|e| e.in_operation("get_component"))
    }

    /// Mutably borrows the `C` of `entity`.
    ///
    /// # Errors
    ///
    /// In checked mode, returns `NoSuchEntity` or `ComponentDoesNotExist`.
    /// Both modes report `ComponentDoesNotExist` when no pool for `C` was
    /// ever registered.
    ///
    /// # Panics
    ///
    /// Panics if a value of the pool is borrowed through a handle guard.
    pub fn get_component_mut<C: Component>(
        &mut self,
        entity: Entity,
        safety: Safety,
    ) -> Result<RefMut<'_, C>> {
        if safety.is_checked() {
            self.ensure_alive(entity)
                .map_err(|e| e.in_operation("get_component_mut"))?;
        }
        let pool = self.pool::<C>().ok_or_else(|| {
            Error::does_not_exist(entity, type_name::<C>()).in_operation("get_component_mut")
        })?;
        match safety {
            Safety::Checked => pool
                .get_mut(entity)
                .map_err(|e| e.in_operation("get_component_mut")),
            Safety::Unchecked => Ok(pool.get_fast_mut(entity)),
        }
    }

    /// Returns true if `entity` has a `C`.
    #[must_use]
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        self.pool::<C>().is_some_and(|pool| pool.has(entity))
    }

    /// Removes every component type in `S` from `entity`, in declaration
    /// order.
    ///
    /// Stops at the first failure; components removed before it stay
    /// removed.
    ///
    /// # Errors
    ///
    /// In checked mode, returns `NoSuchEntity` if `entity` is not alive,
    /// `ComponentHasReferences` if a present component is referenced, and,
    /// under [`RemovePolicy::Strict`], `ComponentDoesNotExist` for the first
    /// absent type.
    pub fn remove_components<S: ComponentSet>(
        &mut self,
        entity: Entity,
        policy: RemovePolicy,
        safety: Safety,
    ) -> Result<()> {
        if safety.is_checked() {
            self.ensure_alive(entity)
                .map_err(|e| e.in_operation("remove_components"))?;
        }
        let targets = S::members()
            .into_iter()
            .map(|(id, name)| (name, self.index.get(&id).map(|&slot| &self.pools[slot])));
        Self::remove_from(entity, targets, policy, safety)
            .map_err(|e| e.in_operation("remove_components"))
    }

    /// Removes every registered component type from `entity`, in
    /// registration order.
    ///
    /// # Errors
    ///
    /// As [`remove_components`](Self::remove_components), over all
    /// registered types.
    pub fn remove_all_components(
        &mut self,
        entity: Entity,
        policy: RemovePolicy,
        safety: Safety,
    ) -> Result<()> {
        if safety.is_checked() {
            self.ensure_alive(entity)
                .map_err(|e| e.in_operation("remove_all_components"))?;
        }
        let targets = self
            .pools
            .iter()
            .map(|pool| (pool.component_name(), Some(pool)));
        Self::remove_from(entity, targets, policy, safety)
            .map_err(|e| e.in_operation("remove_all_components"))
    }

    fn remove_from<'p>(
        entity: Entity,
        targets: impl IntoIterator<Item = (&'static str, Option<&'p Rc<dyn ErasedPool>>)>,
        policy: RemovePolicy,
        safety: Safety,
    ) -> Result<()> {
        let strict = policy == RemovePolicy::Strict && safety.is_checked();
        for (name, pool) in targets {
            match pool {
                Some(pool) if pool.contains(entity) => {
                    if let Err(err) = pool.discard(entity, safety) {
                        debug!("bulk removal from {entity:?} stopped at {name}: {err}");
                        return Err(err);
                    }
                }
                _ if strict => {
                    debug!("bulk removal from {entity:?} stopped: {name} is absent");
                    return Err(Error::does_not_exist(entity, name));
                }
                _ => {}
            }
        }
        Ok(())
    }

    // --- Views ---

    /// Creates a view over every entity that has all component types in `Q`.
    ///
    /// # Panics
    ///
    /// Panics if `Q` names a type twice, or if a value of one of the pools
    /// is currently borrowed.
    #[must_use]
    pub fn view<Q: Query>(&self) -> View<'_, Q> {
        View::new(self)
    }

    /// Creates a view that hands out mutable components of every entity
    /// that has all component types in `Q`.
    ///
    /// # Panics
    ///
    /// Panics if `Q` names a type twice, or if a value of one of the pools
    /// is borrowed through a handle guard.
    #[must_use]
    pub fn view_mut<Q: Query>(&mut self) -> ViewMut<'_, Q> {
        ViewMut::new(self)
    }

    fn ensure_alive(&self, entity: Entity) -> Result<()> {
        if self.entities.contains(entity) {
            Ok(())
        } else {
            Err(Error::no_such_entity(entity))
        }
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pools: Vec<_> = self
            .pools
            .iter()
            .map(|pool| (pool.component_name(), pool.len()))
            .collect();
        f.debug_struct("Storage")
            .field("entities", &self.entities.len())
            .field("pools", &pools)
            .finish_non_exhaustive()
    }
}
