//! Component types and the type-erased pool interface.
//!
//! The [`Storage`](crate::Storage) keeps one pool per component type behind
//! the [`ErasedPool`] trait so it can walk every pool of an entity without
//! knowing the concrete types.

use std::any::{Any, type_name};
use std::rc::Rc;

use stowage_foundation::{Entity, Result, Safety};

use crate::pool::PackedPool;

/// Marker for types that can be stored as components.
///
/// Implemented for every `'static` type.
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// Operations the storage needs on a pool without knowing its type.
pub(crate) trait ErasedPool {
    /// Type name of the stored component.
    fn component_name(&self) -> &'static str;

    fn len(&self) -> usize;

    fn contains(&self, entity: Entity) -> bool;

    /// Live handles to the component of `entity`, zero if absent.
    fn references(&self, entity: Entity) -> u32;

    /// Removes and drops the component of `entity`.
    fn discard(&self, entity: Entity, safety: Safety) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<C: Component> ErasedPool for PackedPool<C> {
    fn component_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn len(&self) -> usize {
        PackedPool::len(self)
    }

    fn contains(&self, entity: Entity) -> bool {
        self.has(entity)
    }

    fn references(&self, entity: Entity) -> u32 {
        self.refcount(entity).unwrap_or(0)
    }

    fn discard(&self, entity: Entity, safety: Safety) -> Result<()> {
        match safety {
            Safety::Checked => self.remove(entity).map(drop),
            Safety::Unchecked => {
                drop(self.remove_fast(entity));
                Ok(())
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}
