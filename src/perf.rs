//! Opt-in timing instrumentation.
//!
//! Scopes are free when disabled. When enabled with [`set_enabled`], each
//! scope reports its elapsed time through `tracing` as it is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::info;

static ENABLED: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Scope {
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        info!(target: "markedit::perf", scope = self.name, elapsed_ms = self.elapsed_ms(), "timing");
    }
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}
