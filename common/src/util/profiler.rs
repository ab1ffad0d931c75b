use std::time::Instant;

/// Logs how long a routing phase took when it goes out of scope.
pub struct ScopedTimer {
    phase: &'static str,
    start: Instant,
}

impl ScopedTimer {
    pub fn new(phase: &'static str) -> Self {
        log::debug!("{}: started", phase);
        Self {
            phase,
            start: Instant::now(),
        }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        log::info!(
            "{} finished in {:.3}ms",
            self.phase,
            self.start.elapsed().as_secs_f64() * 1000.0
        );
    }
}
