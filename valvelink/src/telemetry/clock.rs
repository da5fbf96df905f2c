use std::sync::OnceLock;
use std::time::Instant;

/// Monotonic elapsed-time source anchored at the first reading.
///
/// The first call to [`ElapsedClock::elapsed_ms`] returns `0.0` and fixes the
/// reference point; later calls return milliseconds since then. A link owns
/// one clock for its whole lifetime and shares it with every reader session,
/// so readings keep increasing across reconnects.
#[derive(Debug, Default)]
pub struct ElapsedClock {
    start: OnceLock<Instant>,
}

impl ElapsedClock {
    /// Create an unanchored clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the anchor, anchoring on first use.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms_at(Instant::now())
    }

    /// Same as [`elapsed_ms`](Self::elapsed_ms) with an explicit reading.
    pub fn elapsed_ms_at(&self, now: Instant) -> f64 {
        let start = *self.start.get_or_init(|| now);
        now.saturating_duration_since(start).as_secs_f64() * 1000.0
    }

    /// Whether a reference point has been fixed.
    pub fn is_anchored(&self) -> bool {
        self.start.get().is_some()
    }
}
