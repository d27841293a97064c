//! The benchmark workload.

use std::fs::File;
use std::hint::black_box;
use std::io::{BufWriter, Write};
use std::time::Instant;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use stowage_foundation::{Entity, Safety};
use stowage_storage::{Storage, StorageConfig};

use crate::components::{TestData, V3};
use crate::config::DriverConfig;
use crate::error::Result;
use crate::report::Report;

/// State of one benchmark run.
///
/// The phases can be driven one at a time, or all at once through
/// [`run`](Self::run).
#[derive(Debug)]
pub struct Workload {
    config: DriverConfig,
    storage: Storage,
    /// Created entities with their 1-based workload index.
    entities: Vec<(Entity, u32)>,
    rng: ChaCha8Rng,
}

impl Workload {
    /// Prepares a run.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the configuration does not validate.
    pub fn new(config: DriverConfig) -> Result<Self> {
        config.validate()?;
        let capacity = config.entity_count as usize;
        let storage = Storage::with_config(
            StorageConfig::new()
                .with_entity_capacity(capacity)
                .with_pool_capacity(capacity),
        );
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            entities: Vec::with_capacity(capacity),
            storage,
            config,
        })
    }

    /// The configuration of this run.
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The storage under test.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Created entities with their 1-based workload index.
    #[must_use]
    pub fn entities(&self) -> &[(Entity, u32)] {
        &self.entities
    }

    /// Creates `entity_count` entities. Returns how many were created.
    pub fn create_entities(&mut self) -> usize {
        for i in 1..=self.config.entity_count {
            let entity = self.storage.create_entity();
            self.entities.push((entity, i));
        }
        self.entities.len()
    }

    /// Runs the component math and random fills into plain vectors, without
    /// the storage. Returns the accumulated sink value.
    pub fn baseline(&mut self) -> f32 {
        let mut vectors = Vec::with_capacity(self.entities.len());
        let mut payloads = Vec::new();
        let mut sink = 0.0f32;

        for &(_, i) in &self.entities {
            let v = V3::for_index(i);
            sink += v.sum();
            vectors.push(v);
            if i > self.config.threshold {
                let data = TestData::random(&mut self.rng, bound(i));
                #[allow(clippy::cast_precision_loss)]
                {
                    sink += data.0[0] as f32;
                }
                payloads.push(data);
            }
        }

        let _ = black_box((vectors, payloads));
        black_box(sink)
    }

    /// Attaches a `V3` to every entity and `TestData` to those above the
    /// threshold (unchecked) and below the checked prefix (checked).
    /// Returns the number of components added.
    ///
    /// # Errors
    ///
    /// Returns a storage error if a checked add fails.
    pub fn add_components(&mut self) -> Result<usize> {
        let mut added = 0;
        for &(entity, i) in &self.entities {
            let note = || format!("add phase, workload index {i}");
            self.storage
                .add_component(entity, V3::for_index(i), Safety::Unchecked)
                .map_err(|e| e.with_note(note()))?;
            added += 1;

            if i > self.config.threshold {
                let data = TestData::random(&mut self.rng, bound(i));
                self.storage
                    .add_component(entity, data, Safety::Unchecked)
                    .map_err(|e| e.with_note(note()))?;
                added += 1;
            }

            if i < self.config.checked_prefix {
                let data = TestData::random(&mut self.rng, bound(i));
                self.storage
                    .add_component(entity, data, Safety::Checked)
                    .map_err(|e| e.with_note(note()))?;
                added += 1;
            }
        }
        Ok(added)
    }

    /// Removes `TestData` from every entity that has it.
    ///
    /// Every `checked_remove_stride`-th entity goes through a checked
    /// removal whose failure is logged and skipped; the others check
    /// presence first and remove unchecked. Returns `(removed, failed)`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if an unchecked removal fails, which only
    /// happens when no entity ever received `TestData`.
    pub fn remove_components(&mut self) -> Result<(usize, usize)> {
        let mut removed = 0;
        let mut failed = 0;
        for &(entity, i) in &self.entities {
            if i % self.config.checked_remove_stride == 0 {
                match self
                    .storage
                    .remove_component::<TestData>(entity, Safety::Checked)
                {
                    Ok(_) => removed += 1,
                    Err(err) => {
                        let err = err.with_note(format!("remove phase, workload index {i}"));
                        match &err.context {
                            Some(context) => warn!("checked remove failed: {err} ({context})"),
                            None => warn!("checked remove failed: {err}"),
                        }
                        failed += 1;
                    }
                }
            } else if self.storage.has_component::<TestData>(entity) {
                self.storage
                    .remove_component::<TestData>(entity, Safety::Unchecked)
                    .map_err(|e| e.with_note(format!("remove phase, workload index {i}")))?;
                removed += 1;
            }
        }
        Ok((removed, failed))
    }

    /// Writes `"{entity},{x}"` for every entity with a `V3`. Returns the
    /// number of lines written.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing fails.
    pub fn write_view<W: Write>(&self, out: &mut W) -> Result<usize> {
        let view = self.storage.view::<(V3,)>();
        let mut count = 0;
        for (entity, (v,)) in &view {
            writeln!(out, "{entity},{}", v.x)?;
            count += 1;
        }
        out.flush()?;
        Ok(count)
    }

    /// Runs every phase in order, writing the view output to `out`.
    ///
    /// # Errors
    ///
    /// Returns the first error of any phase.
    pub fn run<W: Write>(mut self, out: &mut W) -> Result<Report> {
        let mut report = Report::default();
        let start_total = Instant::now();

        info!("adding {} entities", self.config.entity_count);
        let start = Instant::now();
        let created = self.create_entities();
        report.push("create", start.elapsed(), created);
        info!("created entities in {:.3} s", start.elapsed().as_secs_f64());

        info!("running baseline compute loop");
        let start = Instant::now();
        report.baseline_sink = self.baseline();
        report.push("baseline", start.elapsed(), created);
        info!(
            "baseline math/random loop in {:.3} s (sink={:.3})",
            start.elapsed().as_secs_f64(),
            report.baseline_sink
        );

        info!("adding components");
        let start = Instant::now();
        let added = self.add_components()?;
        report.push("add", start.elapsed(), added);
        info!(
            "added {added} components in {:.3} s",
            start.elapsed().as_secs_f64()
        );

        info!("testing checked vs unchecked component removal");
        let start = Instant::now();
        let (removed, failed) = self.remove_components()?;
        report.push("remove", start.elapsed(), removed);
        report.failed_removals = failed;
        info!(
            "removed {removed} components in {:.3} s",
            start.elapsed().as_secs_f64()
        );

        info!("iterating view with output");
        let start = Instant::now();
        let lines = self.write_view(out)?;
        report.push("view", start.elapsed(), lines);
        info!(
            "iterated over {lines} entities and wrote output in {:.3} s",
            start.elapsed().as_secs_f64()
        );

        report.total = start_total.elapsed();
        info!("total runtime: {:.3} s", report.total.as_secs_f64());
        debug!("final storage: {:?}", self.storage);
        Ok(report)
    }

    /// Runs every phase, writing the view output to the configured file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created, or the first
    /// error of any phase.
    pub fn run_to_file(self) -> Result<Report> {
        let file = File::create(&self.config.output)?;
        let mut out = BufWriter::new(file);
        self.run(&mut out)
    }
}

/// Exclusive upper bound for the random payload of entity `i`.
fn bound(i: u32) -> i32 {
    i32::try_from(i).unwrap_or(i32::MAX).max(1)
}
