//! Storage configuration.

/// Capacity hints for a [`Storage`](crate::Storage).
///
/// Only affects allocation up front; every structure still grows on demand.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// Entities to reserve room for in the live set.
    pub entity_capacity: usize,
    /// Components to reserve room for in each newly registered pool.
    pub pool_capacity: usize,
}

impl StorageConfig {
    /// Creates a configuration with no reservations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the live-set reservation.
    #[must_use]
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    /// Sets the per-pool reservation.
    #[must_use]
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }
}
