use crossbeam_channel::Receiver;

use super::TelemetrySample;

/// Append-only telemetry history.
///
/// Holds every accepted sample in arrival order for the lifetime of the
/// store. Nothing is ever removed, so memory grows with the session; only the
/// render cost is bounded, by decimation.
#[derive(Debug, Default)]
pub struct TelemetryStore {
    samples: Vec<TelemetrySample>,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample.
    pub fn push(&mut self, sample: TelemetrySample) {
        self.samples.push(sample);
    }

    /// Move every sample currently queued on `inbound` into the history.
    ///
    /// Never blocks. Returns the number of samples appended.
    pub fn drain_from(&mut self, inbound: &Receiver<TelemetrySample>) -> usize {
        let before = self.samples.len();
        self.samples.extend(inbound.try_iter());
        self.samples.len() - before
    }

    /// Full history, oldest first.
    pub fn samples(&self) -> &[TelemetrySample] {
        &self.samples
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(i: i32) -> TelemetrySample {
        TelemetrySample {
            elapsed_ms: f64::from(i),
            fuel_pos: i,
            ox_pos: i * 2,
        }
    }

    #[test]
    fn test_drain_preserves_arrival_order() {
        let (tx, rx) = crossbeam_channel::unbounded();
        for i in 0..5 {
            tx.send(sample(i)).unwrap();
        }

        let mut store = TelemetryStore::new();
        assert_eq!(store.drain_from(&rx), 5);
        let fuel: Vec<i32> = store.samples().iter().map(|s| s.fuel_pos).collect();
        assert_eq!(fuel, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_drain_empty_queue_is_noop() {
        let (_tx, rx) = crossbeam_channel::unbounded::<TelemetrySample>();
        let mut store = TelemetryStore::new();
        store.push(sample(1));
        assert_eq!(store.drain_from(&rx), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_drain_appends_across_calls() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut store = TelemetryStore::new();

        tx.send(sample(1)).unwrap();
        store.drain_from(&rx);
        tx.send(sample(2)).unwrap();
        tx.send(sample(3)).unwrap();
        store.drain_from(&rx);

        assert_eq!(store.len(), 3);
        assert_eq!(store.latest().map(|s| s.fuel_pos), Some(3));
    }

    #[test]
    fn test_drain_after_sender_dropped() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(sample(9)).unwrap();
        drop(tx);

        let mut store = TelemetryStore::new();
        assert_eq!(store.drain_from(&rx), 1);
        assert_eq!(store.drain_from(&rx), 0);
    }
}
