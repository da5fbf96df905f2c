//! Fixed-stride subsampling of the telemetry history for rendering.

use super::TelemetrySample;

/// Render-ready telemetry columns of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecimatedSeries {
    pub elapsed_ms: Vec<f64>,
    pub fuel_pos: Vec<i32>,
    pub ox_pos: Vec<i32>,
}

impl DecimatedSeries {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            elapsed_ms: Vec::with_capacity(capacity),
            fuel_pos: Vec::with_capacity(capacity),
            ox_pos: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, sample: &TelemetrySample) {
        self.elapsed_ms.push(sample.elapsed_ms);
        self.fuel_pos.push(sample.fuel_pos);
        self.ox_pos.push(sample.ox_pos);
    }

    /// Number of points in each column.
    pub fn len(&self) -> usize {
        self.elapsed_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elapsed_ms.is_empty()
    }
}

/// Step between kept indices for a history of `len` samples.
///
/// `1` when the history already fits in `target` points, otherwise
/// `floor(len / target)`. A zero target is treated as one.
pub fn stride_for(len: usize, target: usize) -> usize {
    let target = target.max(1);
    if len <= target {
        1
    } else {
        (len / target).max(1)
    }
}

/// Keep every `stride`-th sample starting at index 0.
///
/// Output length is `ceil(len / stride)`, which may slightly exceed `target`
/// when `len` is not a multiple of it. No min/max binning is done, so short
/// spikes between kept indices are not shown.
pub fn decimate(samples: &[TelemetrySample], target: usize) -> DecimatedSeries {
    let stride = stride_for(samples.len(), target);
    let mut series = DecimatedSeries::with_capacity(samples.len().div_ceil(stride));
    for sample in samples.iter().step_by(stride) {
        series.push(sample);
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(n: usize) -> Vec<TelemetrySample> {
        (0..n)
            .map(|i| TelemetrySample {
                elapsed_ms: i as f64,
                fuel_pos: i as i32,
                ox_pos: -(i as i32),
            })
            .collect()
    }

    #[test]
    fn test_short_history_is_identity() {
        let samples = history(1500);
        let series = decimate(&samples, 2000);
        assert_eq!(series.len(), 1500);
        assert_eq!(series.fuel_pos[1499], 1499);
    }

    #[test]
    fn test_exact_target_is_identity() {
        let series = decimate(&history(2000), 2000);
        assert_eq!(series.len(), 2000);
    }

    #[test]
    fn test_long_history_uses_stride() {
        let samples = history(10_000);
        assert_eq!(stride_for(samples.len(), 2000), 5);

        let series = decimate(&samples, 2000);
        assert_eq!(series.len(), 2000);
        for i in [0, 1, 7, 1999] {
            assert_eq!(series.elapsed_ms[i], samples[i * 5].elapsed_ms);
            assert_eq!(series.fuel_pos[i], samples[i * 5].fuel_pos);
            assert_eq!(series.ox_pos[i], samples[i * 5].ox_pos);
        }
    }

    #[test]
    fn test_output_length_is_ceiling() {
        // 4999 / 2000 = 2, ceil(4999 / 2) = 2500
        let series = decimate(&history(4999), 2000);
        assert_eq!(series.len(), 2500);
    }

    #[test]
    fn test_columns_stay_aligned() {
        let series = decimate(&history(7777), 300);
        assert_eq!(series.elapsed_ms.len(), series.fuel_pos.len());
        assert_eq!(series.fuel_pos.len(), series.ox_pos.len());
    }

    #[test]
    fn test_empty_history() {
        let series = decimate(&[], 2000);
        assert!(series.is_empty());
    }

    #[test]
    fn test_zero_target_does_not_panic() {
        assert_eq!(stride_for(10, 0), 10);
        assert_eq!(decimate(&history(10), 0).len(), 1);
    }
}
