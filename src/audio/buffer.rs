/// Decoded mono audio. Immutable once built by the decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    samples: Vec<f32>,
}

/// A bounds-checked view into the sample buffer.
/// `offset + len` never exceeds the buffer length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleWindow {
    pub offset: usize,
    pub len: usize,
}

impl SampleWindow {
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

impl AudioBuffer {
    pub(crate) fn new(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timeline position of `index` in seconds.
    pub fn seconds_at(&self, index: usize) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        index as f64 / self.sample_rate as f64
    }

    pub fn duration_secs(&self) -> f64 {
        self.seconds_at(self.samples.len())
    }

    /// Visible subrange for plot axis limits `[min, max)`.
    ///
    /// Limits come straight from the plot and may be negative, fractional,
    /// reversed or entirely past the end of the buffer. Everything is clamped
    /// to `[0, len]`; a range that misses the buffer yields an empty window
    /// positioned at the nearest edge.
    pub fn window(&self, min: f64, max: f64) -> SampleWindow {
        let total = self.samples.len();
        let clamp = |x: f64| -> usize {
            if x.is_nan() || x <= 0.0 {
                0
            } else if x >= total as f64 {
                total
            } else {
                x as usize
            }
        };

        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let start = clamp(lo.floor());
        let end = clamp(hi.ceil());

        SampleWindow {
            offset: start,
            len: end.saturating_sub(start),
        }
    }

    pub fn window_samples(&self, window: &SampleWindow) -> &[f32] {
        let start = window.offset.min(self.samples.len());
        let end = window.end().min(self.samples.len());
        &self.samples[start..end]
    }

    /// Peak-preserving decimation for whole-file overview drawing.
    ///
    /// Each bucket contributes the sample with the largest magnitude so that
    /// transients survive the reduction.
    pub fn overview(&self, max_points: usize) -> Vec<f32> {
        if max_points == 0 {
            return Vec::new();
        }
        if self.samples.len() <= max_points {
            return self.samples.clone();
        }

        let bucket = self.samples.len().div_ceil(max_points);
        self.samples
            .chunks(bucket)
            .map(|chunk| {
                chunk
                    .iter()
                    .copied()
                    .fold(0.0f32, |peak, s| if s.abs() > peak.abs() { s } else { peak })
            })
            .collect()
    }
}
