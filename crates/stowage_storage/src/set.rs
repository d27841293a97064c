//! Typed component sets.
//!
//! Tuples `(A,)` through `(A, B, C, D, E, F, G, H)` of component types name
//! a fixed set of types for bulk removal ([`ComponentSet`]) and for
//! iteration ([`Query`]).

use std::any::{TypeId, type_name};

use stowage_foundation::Entity;

use crate::component::Component;
use crate::pool::{Dense, PoolMut, PoolRef};
use crate::storage::Storage;

mod sealed {
    pub trait Sealed {}
}

/// A tuple of component types, in declaration order.
pub trait ComponentSet: sealed::Sealed + 'static {
    /// Number of component types in the set.
    const LEN: usize;

    /// Type id and type name of every member, in declaration order.
    fn members() -> Vec<(TypeId, &'static str)>;

    /// Returns true if no type appears twice.
    #[must_use]
    fn is_distinct() -> bool {
        let members = Self::members();
        members
            .iter()
            .enumerate()
            .all(|(i, (id, _))| members[..i].iter().all(|(other, _)| other != id))
    }
}

/// Per-member pool guards of a view, walked through their bookkeeping.
#[doc(hidden)]
pub trait DenseSet {
    /// Position of the member pool with the fewest components.
    fn smallest(&self) -> usize;

    /// Dense owners of the member pool at `position`.
    fn owners(&self, position: usize) -> &[Entity];

    /// Returns true if `entity` has every member component.
    fn contains(&self, entity: Entity) -> bool;
}

/// A component set that can drive a [`View`](crate::View) or a
/// [`ViewMut`](crate::ViewMut).
///
/// The methods are plumbing for the views and are not meant to be called
/// directly.
pub trait Query: ComponentSet {
    /// Shared pool borrows, one per member.
    #[doc(hidden)]
    type Fetch<'s>: DenseSet;

    /// Exclusive pool borrows, one per member.
    #[doc(hidden)]
    type FetchMut<'s>: DenseSet;

    /// Shared references to one entity's components.
    type Item<'f>;

    /// Mutable references to one entity's components.
    type ItemMut<'f>;

    /// Borrows every member pool, or `None` if one is not registered.
    #[doc(hidden)]
    fn fetch(storage: &Storage) -> Option<Self::Fetch<'_>>;

    /// Mutably borrows every member pool, or `None` if one is not
    /// registered.
    #[doc(hidden)]
    fn fetch_mut(storage: &Storage) -> Option<Self::FetchMut<'_>>;

    /// Reads the components of an entity that has all of them.
    #[doc(hidden)]
    fn get<'f>(fetch: &'f Self::Fetch<'_>, entity: Entity) -> Self::Item<'f>;

    /// Mutably borrows the components of an entity that has all of them.
    #[doc(hidden)]
    fn get_mut<'f>(fetch: &'f mut Self::FetchMut<'_>, entity: Entity) -> Self::ItemMut<'f>;
}

macro_rules! impl_component_set {
    ($len:expr; $($name:ident),+) => {
        impl<$($name: Component),+> sealed::Sealed for ($($name,)+) {}

        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            const LEN: usize = $len;

            fn members() -> Vec<(TypeId, &'static str)> {
                vec![$((TypeId::of::<$name>(), type_name::<$name>())),+]
            }
        }

        #[allow(non_snake_case, unused_assignments)]
        impl<$($name: Dense),+> DenseSet for ($($name,)+) {
            fn smallest(&self) -> usize {
                let ($($name,)+) = self;
                let mut position = 0;
                let mut best = (0, usize::MAX);
                $(
                    if $name.len() < best.1 {
                        best = (position, $name.len());
                    }
                    position += 1;
                )+
                best.0
            }

            fn owners(&self, position: usize) -> &[Entity] {
                let ($($name,)+) = self;
                let mut current = 0;
                $(
                    if current == position {
                        return $name.owners();
                    }
                    current += 1;
                )+
                &[]
            }

            fn contains(&self, entity: Entity) -> bool {
                let ($($name,)+) = self;
                $($name.contains(entity))&&+
            }
        }

        #[allow(non_snake_case)]
        impl<$($name: Component),+> Query for ($($name,)+) {
            type Fetch<'s> = ($(PoolRef<'s, $name>,)+);
            type FetchMut<'s> = ($(PoolMut<'s, $name>,)+);
            type Item<'f> = ($(&'f $name,)+);
            type ItemMut<'f> = ($(&'f mut $name,)+);

            fn fetch(storage: &Storage) -> Option<Self::Fetch<'_>> {
                Some(($(storage.pool::<$name>()?.read(),)+))
            }

            fn fetch_mut(storage: &Storage) -> Option<Self::FetchMut<'_>> {
                Some(($(storage.pool::<$name>()?.write(),)+))
            }

            fn get<'f>(fetch: &'f Self::Fetch<'_>, entity: Entity) -> Self::Item<'f> {
                let ($($name,)+) = fetch;
                ($($name.get(entity),)+)
            }

            fn get_mut<'f>(fetch: &'f mut Self::FetchMut<'_>, entity: Entity) -> Self::ItemMut<'f> {
                let ($($name,)+) = fetch;
                ($($name.get_mut(entity),)+)
            }
        }
    };
}

impl_component_set!(1; A);
impl_component_set!(2; A, B);
impl_component_set!(3; A, B, C);
impl_component_set!(4; A, B, C, D);
impl_component_set!(5; A, B, C, D, E);
impl_component_set!(6; A, B, C, D, E, F);
impl_component_set!(7; A, B, C, D, E, F, G);
impl_component_set!(8; A, B, C, D, E, F, G, H);
