//! Equal-power dry/wet mixing
//!
//! `mix` in `[-1, 1]` maps to `p = (mix + 1) / 4` in `[0, 0.5]`, and the
//! gains follow a quarter sine/cosine period: `wet = sin(pi * p)`,
//! `dry = cos(pi * p)`. mix = -1 is fully dry, mix = +1 is fully wet.

use std::f64::consts::PI;

/// Dry and wet gains for one block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixGains {
    pub dry: f32,
    pub wet: f32,
}

impl MixGains {
    /// Gains for a mix position (clamped to `[-1, 1]`)
    ///
    /// Evaluated in double precision so the end points land as close to 0
    /// and 1 as `f32` allows.
    pub fn from_mix(mix: f32) -> Self {
        let position = mix_position(mix);
        Self {
            dry: (PI * position).cos() as f32,
            wet: (PI * position).sin() as f32,
        }
    }

    /// Blend one dry/wet pair
    #[inline]
    pub fn apply(&self, dry: f32, wet: f32) -> f32 {
        self.dry * dry + self.wet * wet
    }
}

impl Default for MixGains {
    fn default() -> Self {
        Self::from_mix(1.0)
    }
}

/// Normalized crossfade position `p = (mix + 1) / 4`
pub fn mix_position(mix: f32) -> f64 {
    let mix = if mix.is_nan() { 1.0 } else { mix.clamp(-1.0, 1.0) };
    (mix as f64 + 1.0) / 4.0
}
