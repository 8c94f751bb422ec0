use std::time::Instant;

/// Start/stop stopwatch for a single typing session.
///
/// Backed by `Instant`, so wall-clock adjustments never bleed into
/// elapsed time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionTimer {
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn has_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// No-op if already running.
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    /// No-op unless started and not yet stopped.
    pub fn stop(&mut self) {
        if self.started_at.is_some() && self.finished_at.is_none() {
            self.finished_at = Some(Instant::now());
        }
    }

    pub fn reset(&mut self) {
        self.started_at = None;
        self.finished_at = None;
    }

    /// Seconds between start and stop, or start and now while running.
    pub fn elapsed(&self) -> f64 {
        match self.started_at {
            None => 0.0,
            Some(start) => {
                let end = self.finished_at.unwrap_or_else(Instant::now);
                end.saturating_duration_since(start).as_secs_f64().max(0.0)
            }
        }
    }
}
