//! Decimation (zero-order hold)
//!
//! Approximates sample-rate reduction by holding one sample across N
//! output positions. The hold phase follows the in-block sample index, so
//! it restarts at every block: with a block length that is not a multiple
//! of N the hold pattern jumps at block boundaries. The held value itself
//! carries over between blocks.

/// Per-channel sample-and-hold state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Decimator {
    held: f32,
}

impl Decimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process the sample at in-block position `index`
    ///
    /// `factor` must be at least 1; the parameter store guarantees it.
    #[inline]
    pub fn process(&mut self, sample: f32, index: usize, factor: usize) -> f32 {
        debug_assert!(factor >= 1, "downsample factor must be >= 1");
        if index % factor == 0 {
            self.held = sample;
        }
        self.held
    }

    /// Last captured sample
    pub fn held(&self) -> f32 {
        self.held
    }

    pub fn reset(&mut self) {
        self.held = 0.0;
    }
}
