use heapless::Vec;

use super::MAX_SAMPLES;

/// Bounded sample history for a single metric
///
/// The buffer is never appended to incrementally. Every successful fetch
/// replaces the whole contents, keeping the [`MAX_SAMPLES`] most recent values
/// in the order the cloud returned them (oldest first).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricBuffer {
    samples: Vec<f32, MAX_SAMPLES>,
}

impl MetricBuffer {
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Discard the current contents and store `values` in order
    ///
    /// When more than [`MAX_SAMPLES`] values are supplied the oldest ones are
    /// dropped. An empty input leaves an empty buffer.
    pub fn replace_all<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = f32>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        let skip = values.len().saturating_sub(MAX_SAMPLES);

        self.samples.clear();
        for value in values.skip(skip) {
            // Cannot overflow: at most MAX_SAMPLES values remain after the skip
            let _ = self.samples.push(value);
        }
    }

    /// Read-only view of the samples, oldest first
    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent finite sample, if any
    pub fn latest(&self) -> Option<f32> {
        self.samples.iter().rev().copied().find(|v| v.is_finite())
    }

    /// Min/max across finite samples
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.samples
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
