//! Telemetry samples, history and render decimation.
//!
//! Data flows through this module in one direction:
//!
//! ```text
//! device line ──parse_line──► TelemetrySample ──inbound queue──► TelemetryStore
//!                                                                    │
//!                                                     decimate (per display tick)
//!                                                                    ▼
//!                                                             DecimatedSeries
//! ```
//!
//! The reader thread produces samples, the display side owns the store and
//! runs [`TelemetryView::tick`] on a fixed period. Link counters live in
//! [`LinkMetrics`] and are read through [`LinkSnapshot`].

mod clock;
mod decimate;
mod metrics;
mod sample;
mod snapshot;
mod store;
mod view;

pub use clock::ElapsedClock;
pub use decimate::{decimate, stride_for, DecimatedSeries};
pub use metrics::LinkMetrics;
pub use sample::{decode_line, parse_line, ServoReading, TelemetrySample};
pub use snapshot::LinkSnapshot;
pub use store::TelemetryStore;
pub use view::{DisplayConfig, TelemetryView, DEFAULT_TARGET_POINTS, DEFAULT_TICK_INTERVAL};
