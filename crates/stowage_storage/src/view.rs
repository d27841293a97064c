//! Iteration over entities that have every component in a set.
//!
//! A [`View`] shares each pool named by its [`Query`] for as long as it
//! lives, so any number of views, raw references and handle reads can
//! coexist. A [`ViewMut`] borrows its pools exclusively and is created
//! through `&mut Storage`.
//!
//! Iteration walks the dense owner array of the smallest pool and skips
//! entities missing from any of the others, so the cost scales with the
//! rarest component rather than the most common one.

use std::fmt;

use stowage_foundation::Entity;

use crate::set::{DenseSet, Query};
use crate::storage::Storage;

/// Borrowed intersection of several pools.
///
/// ```
/// use stowage_storage::{Safety, Storage};
///
/// let mut storage = Storage::new();
/// for i in 0..4u32 {
///     let e = storage.create_entity();
///     storage.add_component(e, i, Safety::Checked).unwrap();
///     if i % 2 == 0 {
///         storage.add_component(e, 'x', Safety::Checked).unwrap();
///     }
/// }
///
/// let view = storage.view::<(u32, char)>();
/// let evens: Vec<u32> = view.iter().map(|(_, (n, _))| *n).collect();
/// assert_eq!(evens, vec![0, 2]);
/// ```
pub struct View<'s, Q: Query> {
    /// `None` when a member pool is not registered.
    fetch: Option<Q::Fetch<'s>>,
}

impl<'s, Q: Query> View<'s, Q> {
    /// Borrows the pools of `Q` from `storage`.
    ///
    /// # Panics
    ///
    /// Panics if `Q` names a type twice, or if a value of one of the pools
    /// is currently borrowed mutably.
    #[must_use]
    pub fn new(storage: &'s Storage) -> Self {
        assert_distinct::<Q>();
        Self {
            fetch: Q::fetch(storage),
        }
    }

    /// Iterates over `(entity, components)` pairs.
    ///
    /// The driving pool is chosen afresh on every call.
    #[must_use]
    pub fn iter(&self) -> ViewIter<'_, 's, Q> {
        let (fetch, owners) = match &self.fetch {
            Some(fetch) => (Some(fetch), fetch.owners(fetch.smallest())),
            None => (None, &[][..]),
        };
        ViewIter {
            fetch,
            owners,
            index: 0,
        }
    }

    /// Upper bound on the number of matches: the size of the smallest pool.
    #[must_use]
    pub fn len_hint(&self) -> usize {
        self.fetch.as_ref().map_or(0, len_hint)
    }

    /// Returns true if some member pool is not registered.
    #[must_use]
    pub fn is_unbound(&self) -> bool {
        self.fetch.is_none()
    }
}

impl<'v, 's, Q: Query> IntoIterator for &'v View<'s, Q> {
    type Item = (Entity, Q::Item<'v>);
    type IntoIter = ViewIter<'v, 's, Q>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<Q: Query> fmt::Debug for View<'_, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<_> = Q::members().into_iter().map(|(_, name)| name).collect();
        f.debug_struct("View")
            .field("components", &members)
            .field("len_hint", &self.len_hint())
            .finish()
    }
}

/// Iterator over a [`View`].
pub struct ViewIter<'v, 's, Q: Query> {
    fetch: Option<&'v Q::Fetch<'s>>,
    owners: &'v [Entity],
    index: usize,
}

impl<'v, Q: Query> Iterator for ViewIter<'v, '_, Q> {
    type Item = (Entity, Q::Item<'v>);

    fn next(&mut self) -> Option<Self::Item> {
        let fetch = self.fetch?;
        while let Some(&entity) = self.owners.get(self.index) {
            self.index += 1;
            if fetch.contains(entity) {
                return Some((entity, Q::get(fetch, entity)));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.owners.len() - self.index))
    }
}

/// Exclusive intersection of several pools, for mutation in place.
///
/// ```
/// use stowage_storage::{Safety, Storage};
///
/// let mut storage = Storage::new();
/// let e = storage.create_entity();
/// storage.add_component(e, 1i64, Safety::Checked).unwrap();
///
/// let mut view = storage.view_mut::<(i64,)>();
/// let mut cursor = view.cursor();
/// while let Some((_, (n,))) = cursor.next_mut() {
///     *n *= 10;
/// }
/// drop(view);
///
/// assert_eq!(*storage.pool::<i64>().unwrap().get(e).unwrap(), 10);
/// ```
pub struct ViewMut<'s, Q: Query> {
    fetch: Option<Q::FetchMut<'s>>,
}

impl<'s, Q: Query> ViewMut<'s, Q> {
    /// Mutably borrows the pools of `Q` from `storage`.
    ///
    /// # Panics
    ///
    /// Panics if `Q` names a type twice, or if a value of one of the pools
    /// is currently borrowed, for example through a [`Handle`](crate::Handle)
    /// guard.
    #[must_use]
    pub fn new(storage: &'s mut Storage) -> Self {
        assert_distinct::<Q>();
        Self {
            fetch: Q::fetch_mut(storage),
        }
    }

    /// Returns a cursor that hands out mutable components one entity at a
    /// time. The driving pool is chosen afresh on every call.
    #[must_use]
    pub fn cursor(&mut self) -> ViewCursor<'_, 's, Q> {
        let driver = self.fetch.as_ref().map_or(0, DenseSet::smallest);
        ViewCursor {
            fetch: self.fetch.as_mut(),
            driver,
            index: 0,
        }
    }

    /// Upper bound on the number of matches: the size of the smallest pool.
    #[must_use]
    pub fn len_hint(&self) -> usize {
        self.fetch.as_ref().map_or(0, len_hint)
    }

    /// Returns true if some member pool is not registered.
    #[must_use]
    pub fn is_unbound(&self) -> bool {
        self.fetch.is_none()
    }
}

impl<Q: Query> fmt::Debug for ViewMut<'_, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<_> = Q::members().into_iter().map(|(_, name)| name).collect();
        f.debug_struct("ViewMut")
            .field("components", &members)
            .field("len_hint", &self.len_hint())
            .finish()
    }
}

/// Lending cursor over a [`ViewMut`].
pub struct ViewCursor<'v, 's, Q: Query> {
    fetch: Option<&'v mut Q::FetchMut<'s>>,
    driver: usize,
    index: usize,
}

impl<Q: Query> ViewCursor<'_, '_, Q> {
    /// Advances to the next matching entity.
    pub fn next_mut(&mut self) -> Option<(Entity, Q::ItemMut<'_>)> {
        let fetch = self.fetch.as_deref_mut()?;
        loop {
            let entity = *fetch.owners(self.driver).get(self.index)?;
            self.index += 1;
            if fetch.contains(entity) {
                return Some((entity, Q::get_mut(fetch, entity)));
            }
        }
    }
}

fn assert_distinct<Q: Query>() {
    assert!(
        Q::is_distinct(),
        "view over {:?} names a component type twice",
        Q::members().iter().map(|(_, name)| *name).collect::<Vec<_>>()
    );
}

fn len_hint<F: DenseSet>(fetch: &F) -> usize {
    fetch.owners(fetch.smallest()).len()
}
