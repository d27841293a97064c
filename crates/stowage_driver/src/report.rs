//! Timing report for a benchmark run.

use std::fmt;
use std::time::Duration;

/// One timed phase of the workload.
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    /// Short phase name.
    pub name: &'static str,
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// Items processed (entities, components, or lines).
    pub count: usize,
}

/// Results of a complete run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    /// Phases in execution order.
    pub phases: Vec<Phase>,
    /// Checked removals that failed and were skipped.
    pub failed_removals: usize,
    /// Accumulated value of the baseline loop, kept so it is not optimised out.
    pub baseline_sink: f32,
    /// Wall-clock time of the whole run.
    pub total: Duration,
}

impl Report {
    /// Records a phase.
    pub fn push(&mut self, name: &'static str, elapsed: Duration, count: usize) {
        self.phases.push(Phase {
            name,
            elapsed,
            count,
        });
    }

    /// Looks up a phase by name.
    #[must_use]
    pub fn phase(&self, name: &str) -> Option<&Phase> {
        self.phases.iter().find(|phase| phase.name == name)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for phase in &self.phases {
            writeln!(
                f,
                "{:<10} {:>10} items in {:.3} s",
                phase.name,
                phase.count,
                phase.elapsed.as_secs_f64()
            )?;
        }
        if self.failed_removals > 0 {
            writeln!(f, "{} checked removal(s) failed", self.failed_removals)?;
        }
        write!(f, "total runtime: {:.3} s", self.total.as_secs_f64())
    }
}
