//! Display-side telemetry consumer.
//!
//! A [`TelemetryView`] is driven by the UI timer. Every tick drains the
//! inbound queue into the history without blocking and, when something new
//! arrived, recomputes the decimated series from scratch.

use std::time::Duration;

use crossbeam_channel::Receiver;
use tracing::trace;

use super::{decimate, DecimatedSeries, TelemetrySample, TelemetryStore};

/// Default display tick period.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(20);

/// Default maximum number of points handed to the renderer.
pub const DEFAULT_TARGET_POINTS: usize = 2000;

/// Display tick configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Period of the display timer.
    pub tick_interval: Duration,
    /// Target point count for decimation.
    pub target_points: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            target_points: DEFAULT_TARGET_POINTS,
        }
    }
}

/// Telemetry history plus the queue that feeds it.
pub struct TelemetryView {
    store: TelemetryStore,
    inbound: Receiver<TelemetrySample>,
    config: DisplayConfig,
}

impl TelemetryView {
    pub fn new(inbound: Receiver<TelemetrySample>, config: DisplayConfig) -> Self {
        Self {
            store: TelemetryStore::new(),
            inbound,
            config,
        }
    }

    /// Run one display tick.
    ///
    /// Returns the fresh render series, or `None` when no sample arrived
    /// since the previous tick.
    pub fn tick(&mut self) -> Option<DecimatedSeries> {
        let drained = self.store.drain_from(&self.inbound);
        if drained == 0 {
            return None;
        }
        let series = decimate(self.store.samples(), self.config.target_points);
        trace!(
            drained,
            history = self.store.len(),
            points = series.len(),
            "Display tick"
        );
        Some(series)
    }

    /// Decimated series of the current history without draining.
    pub fn series(&self) -> DecimatedSeries {
        decimate(self.store.samples(), self.config.target_points)
    }

    pub fn store(&self) -> &TelemetryStore {
        &self.store
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }
}
