//! Reference styles for component lookups.
//!
//! [`Storage::get_component`](crate::Storage::get_component) is generic over
//! how the result refers to the component:
//!
//! - [`Raw`] borrows the value directly. The borrow checker keeps it from
//!   outliving the next structural change to the storage. Raw borrows are
//!   shared; mutable access goes through
//!   [`Storage::get_component_mut`](crate::Storage::get_component_mut).
//! - [`Stable`] returns a [`Handle`], which survives compaction and reports
//!   staleness instead of dangling.

use std::cell::Ref;

use stowage_foundation::{Entity, Error, Result, Safety};

use crate::component::Component;
use crate::handle::Handle;
use crate::storage::Storage;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Raw {}
    impl Sealed for super::Stable {}
}

/// Chooses the reference type returned by a component lookup.
///
/// Sealed: [`Raw`] and [`Stable`] are the only styles.
pub trait ReferenceStyle: sealed::Sealed {
    /// The reference produced for component type `C`.
    type Ref<'a, C: Component>;

    /// Resolves the component of `entity`, whose presence the caller has
    /// already established in checked mode.
    #[doc(hidden)]
    fn resolve<C: Component>(
        storage: &Storage,
        entity: Entity,
        safety: Safety,
    ) -> Result<Self::Ref<'_, C>>;
}

/// Direct shared borrow of the component.
#[derive(Debug, Clone, Copy)]
pub enum Raw {}

/// Generation-checked [`Handle`] to the component.
#[derive(Debug, Clone, Copy)]
pub enum Stable {}

impl ReferenceStyle for Raw {
    type Ref<'a, C: Component> = Ref<'a, C>;

    fn resolve<C: Component>(
        storage: &Storage,
        entity: Entity,
        safety: Safety,
    ) -> Result<Ref<'_, C>> {
        let pool = storage
            .pool::<C>()
            .ok_or_else(|| Error::does_not_exist(entity, std::any::type_name::<C>()))?;
        match safety {
            Safety::Checked => pool.get(entity),
            Safety::Unchecked => Ok(pool.get_fast(entity)),
        }
    }
}

impl ReferenceStyle for Stable {
    type Ref<'a, C: Component> = Handle<C>;

    fn resolve<C: Component>(
        storage: &Storage,
        entity: Entity,
        safety: Safety,
    ) -> Result<Handle<C>> {
        let pool = storage
            .shared_pool::<C>()
            .ok_or_else(|| Error::does_not_exist(entity, std::any::type_name::<C>()))?;
        match safety {
            Safety::Checked => Handle::new(pool, entity),
            Safety::Unchecked => Ok(Handle::new_unchecked(pool, entity)),
        }
    }
}
