//! Timing instrumentation for the coordinate pipeline.
//!
//! Every commit pass runs all `AxisBeforeUpdate` listeners synchronously,
//! so a slow plugin shows up directly as input lag. With the `profiling`
//! feature enabled, [`profile_scope!`] wraps a block in a [`ScopedTimer`]
//! that reports passes exceeding their threshold:
//!
//! ```toml
//! [dependencies]
//! dragcore = { features = ["profiling"] }
//! ```
//!
//! ```ignore
//! fn commit(&self) {
//!     profile_scope!("commit");
//!     // ... publish and write ...
//! }
//! ```
//!
//! A listener that calls `set_position` re-enters the commit path, so
//! timers nest. Each timer knows its depth and the report for a nested
//! pass is indented under its parent.
//!
//! Without the feature the macro compiles to nothing.

use std::cell::Cell;
use std::time::Instant;
use tracing::warn;
#[cfg(feature = "profiling")]
use tracing::trace;

/// Time a scope. Without a threshold, [`crate::constants::SLOW_COMMIT_MS`]
/// applies. Zero-cost when the `profiling` feature is disabled.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        $crate::profile_scope!($name, $crate::constants::SLOW_COMMIT_MS);
    };
    ($name:expr, $threshold_ms:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::new($name, $threshold_ms);
        #[cfg(not(feature = "profiling"))]
        let _ = ($name, $threshold_ms);
    };
}

pub use profile_scope;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Measures from construction to drop and warns when over threshold.
pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
    threshold_ms: f64,
    depth: usize,
}

impl ScopedTimer {
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        let depth = DEPTH.with(|d| {
            let current = d.get();
            d.set(current + 1);
            current
        });
        Self {
            name,
            start: Instant::now(),
            threshold_ms,
            depth,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn threshold_ms(&self) -> f64 {
        self.threshold_ms
    }

    /// Number of timers that were live when this one started.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
        let elapsed_ms = self.elapsed_ms();

        #[cfg(feature = "profiling")]
        trace!(
            "{}[PERF] {}: {:.2}ms",
            "  ".repeat(self.depth),
            self.name,
            elapsed_ms
        );

        if elapsed_ms > self.threshold_ms {
            warn!(
                operation = self.name,
                depth = self.depth,
                elapsed_ms = format!("{:.2}", elapsed_ms),
                threshold_ms = format!("{:.2}", self.threshold_ms),
                "Slow pipeline pass"
            );
        }
    }
}
