//! Workload configuration.

use std::path::PathBuf;

use crate::error::{DriverError, Result};

/// Parameters of a benchmark run.
///
/// Entity indices are 1-based, matching the reference workload.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    /// Number of entities to create.
    pub entity_count: u32,
    /// Entities with an index above this get random `TestData`.
    pub threshold: u32,
    /// Entities with an index below this get `TestData` through a checked add.
    pub checked_prefix: u32,
    /// Every entity whose index is a multiple of this uses checked removal.
    pub checked_remove_stride: u32,
    /// Seed for the random payloads.
    pub seed: u64,
    /// Where the view pass writes its output.
    pub output: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            entity_count: 1_000_000,
            threshold: 700_000,
            checked_prefix: 100,
            checked_remove_stride: 100_000,
            seed: 1234,
            output: PathBuf::from("ecs_view.txt"),
        }
    }
}

impl DriverConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entity count.
    #[must_use]
    pub fn with_entity_count(mut self, count: u32) -> Self {
        self.entity_count = count;
        self
    }

    /// Sets the entity count and moves the threshold to the default 70%
    /// split, keeping the checked prefix below it.
    #[must_use]
    pub fn scaled_to(self, count: u32) -> Self {
        self.with_entity_count(count)
            .with_threshold(count / 10 * 7)
            .fit_checked_prefix()
    }

    /// Shrinks the checked prefix so it ends at or before the threshold.
    #[must_use]
    pub fn fit_checked_prefix(mut self) -> Self {
        self.checked_prefix = self.checked_prefix.min(self.threshold.saturating_add(1));
        self
    }

    /// Sets the random-payload threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the checked-add prefix.
    #[must_use]
    pub fn with_checked_prefix(mut self, prefix: u32) -> Self {
        self.checked_prefix = prefix;
        self
    }

    /// Sets the checked-removal stride.
    #[must_use]
    pub fn with_checked_remove_stride(mut self, stride: u32) -> Self {
        self.checked_remove_stride = stride;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the output path.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Checks that the parameters describe a runnable workload.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the threshold exceeds the entity count,
    /// if the checked prefix overlaps the random-payload range (both would
    /// add `TestData` to the same entity), or if the stride is zero.
    pub fn validate(&self) -> Result<()> {
        if self.threshold > self.entity_count {
            return Err(DriverError::InvalidArgument(format!(
                "threshold {} exceeds entity count {}",
                self.threshold, self.entity_count
            )));
        }
        if self.checked_prefix > self.threshold.saturating_add(1) {
            return Err(DriverError::InvalidArgument(format!(
                "checked prefix {} overlaps entities above threshold {}",
                self.checked_prefix, self.threshold
            )));
        }
        if self.checked_remove_stride == 0 {
            return Err(DriverError::InvalidArgument(
                "checked removal stride must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
