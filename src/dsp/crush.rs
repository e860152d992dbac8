//! Bit-Depth Reduction
//!
//! Two interchangeable strategies that map a sample onto a coarser
//! amplitude grid:
//! - **Quantize** ("QL"): `q * trunc(x / q)` with `q = 1 / (2^bits - 1)`
//! - **Truncate** ("Bit-Shift"): clear the low `27 - bits` bits of the
//!   sample's IEEE-754 pattern with an arithmetic shift pair
//!
//! Truncate works on the raw float layout (sign:1, exponent:8, mantissa:23),
//! so its artifacts depend on the sample's exponent and get unstable near
//! the low end of the bit-depth range.

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Lowest supported bit depth
pub const MIN_BIT_DEPTH: u32 = 2;

/// Highest supported bit depth
pub const MAX_BIT_DEPTH: u32 = 24;

/// Shift base for the Truncate strategy
const TRUNCATE_SHIFT_BASE: u32 = 27;

// ============================================================================
// Crush Mode
// ============================================================================

/// Bit-depth reduction strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum CrushMode {
    /// Requantize amplitude onto `2^bits - 1` steps
    #[default]
    Quantize,
    /// Drop low-order bits of the float representation
    Truncate,
}

impl CrushMode {
    /// Map a `crushMethod` choice index to a mode (out-of-range falls back to Quantize)
    pub fn from_index(index: usize) -> Self {
        match index {
            1 => CrushMode::Truncate,
            _ => CrushMode::Quantize,
        }
    }

    /// Choice index of this mode
    pub fn index(&self) -> usize {
        match self {
            CrushMode::Quantize => 0,
            CrushMode::Truncate => 1,
        }
    }

    /// Label shown on the parameter surface
    pub fn label(&self) -> &'static str {
        match self {
            CrushMode::Quantize => "QL",
            CrushMode::Truncate => "Bit-Shift",
        }
    }

    /// Crush one sample with this strategy
    #[inline]
    pub fn apply(&self, sample: f32, bit_depth: u32) -> f32 {
        match self {
            CrushMode::Quantize => quantize(sample, quantum(bit_depth)),
            CrushMode::Truncate => truncate(sample, bit_depth),
        }
    }
}

// ============================================================================
// Strategies
// ============================================================================

/// Quantization step for a bit depth: `1 / (2^bits - 1)`
///
/// Bit depth is clamped to `[MIN_BIT_DEPTH, MAX_BIT_DEPTH]`.
pub fn quantum(bit_depth: u32) -> f32 {
    let bits = bit_depth.clamp(MIN_BIT_DEPTH, MAX_BIT_DEPTH) as i32;
    (1.0 / (2.0_f64.powi(bits) - 1.0)) as f32
}

/// Snap a sample onto multiples of `quantum`, truncating toward zero
#[inline]
pub fn quantize(sample: f32, quantum: f32) -> f32 {
    quantum * (sample / quantum).trunc()
}

/// Clear the low `27 - bits` bits of the sample's bit pattern
///
/// The pattern is treated as a signed 32-bit integer and shifted
/// arithmetically right then left. The sign always survives; below 4 bits
/// the shift reaches into the exponent as well.
#[inline]
pub fn truncate(sample: f32, bit_depth: u32) -> f32 {
    let shift = TRUNCATE_SHIFT_BASE - bit_depth.clamp(MIN_BIT_DEPTH, MAX_BIT_DEPTH);
    let pattern = sample.to_bits() as i32;
    f32::from_bits(((pattern >> shift) << shift) as u32)
}

// ============================================================================
// Bit Crusher
// ============================================================================

/// Crush stage with a cached quantum
///
/// The quantum is only recomputed when the bit depth changes, which keeps
/// the power computation out of the per-sample loop. Results are identical
/// to calling [`CrushMode::apply`] directly.
#[derive(Debug, Clone, PartialEq)]
pub struct BitCrusher {
    cached_depth: u32,
    quantum: f32,
}

impl BitCrusher {
    /// Create a crusher primed for the default bit depth
    pub fn new() -> Self {
        Self {
            cached_depth: MAX_BIT_DEPTH,
            quantum: quantum(MAX_BIT_DEPTH),
        }
    }

    /// Quantum for `bit_depth`, refreshing the cache on change
    #[inline]
    pub fn quantum_for(&mut self, bit_depth: u32) -> f32 {
        if bit_depth != self.cached_depth {
            self.cached_depth = bit_depth;
            self.quantum = quantum(bit_depth);
        }
        self.quantum
    }

    /// Crush one sample
    #[inline]
    pub fn process(&mut self, sample: f32, mode: CrushMode, bit_depth: u32) -> f32 {
        match mode {
            CrushMode::Quantize => quantize(sample, self.quantum_for(bit_depth)),
            CrushMode::Truncate => truncate(sample, bit_depth),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for BitCrusher {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
