//! Lock-free parameter storage
//!
//! One atomic word per parameter. The audio thread reads through
//! [`ParamStore::snapshot`] once per block; any other thread may write at any
//! time. Writes clamp at the write site, so everything downstream can trust
//! the domain.

use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::{Map, Value};

use super::descriptor::{ParamDescriptor, ParamId, NUM_MASK_BITS, PARAM_COUNT};
use crate::dsp::{combine_masks, CrushMode};
use crate::error::{CrushError, Result};

// ============================================================================
// Atomic float
// ============================================================================

/// `f32` stored as its bit pattern in an `AtomicU32`
struct AtomicF32 {
    value: AtomicU32,
}

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self {
            value: AtomicU32::new(value.to_bits()),
        }
    }

    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, value: f32) {
        self.value.store(value.to_bits(), Ordering::Relaxed);
    }
}

// ============================================================================
// Effect Configuration
// ============================================================================

/// Block-local snapshot of every control the pipeline reads
///
/// Taken once at the top of a block; never shared beyond that block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectConfig {
    /// Sample-and-hold length (>= 1)
    pub ds_factor: usize,
    /// Crush bit depth (2..=24)
    pub bit_depth: u32,
    /// Crush strategy
    pub crush_mode: CrushMode,
    /// Whether the bitmask stage runs
    pub masks_enabled: bool,
    /// One flag per IEEE-754 bit position
    pub bit_active: [bool; NUM_MASK_BITS],
    /// Dry/wet blend (-1.0..=1.0)
    pub mix: f32,
}

impl EffectConfig {
    /// Bits the mask stage clears this block (0 when masks are disabled)
    pub fn clear_mask(&self) -> u32 {
        if self.masks_enabled {
            combine_masks(&self.bit_active)
        } else {
            0
        }
    }
}

impl Default for EffectConfig {
    fn default() -> Self {
        ParamStore::new().snapshot()
    }
}

// ============================================================================
// Parameter Store
// ============================================================================

/// Thread-safe parameter storage
///
/// Share it through an `Arc`: the processor keeps one handle, the control
/// side (UI, automation, CLI) keeps others.
pub struct ParamStore {
    values: [AtomicF32; PARAM_COUNT],
}

impl ParamStore {
    /// Create a store with every parameter at its default
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|index| {
                AtomicF32::new(
                    ParamId::from_index(index)
                        .map(|id| id.descriptor().kind.default_value())
                        .unwrap_or(0.0),
                )
            }),
        }
    }

    /// Last committed plain value of a parameter
    ///
    /// # Panics
    /// If `id` is a mask bit past `NUM_MASK_BITS` (see [`ParamId::mask`])
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        self.values[id.index()].load()
    }

    /// Clamp `value` to the parameter's domain and commit it
    ///
    /// Returns the value actually stored.
    ///
    /// # Panics
    /// If `id` is a mask bit past `NUM_MASK_BITS` (see [`ParamId::mask`])
    pub fn set(&self, id: ParamId, value: f32) -> f32 {
        let clamped = id.descriptor().kind.clamp(value);
        self.values[id.index()].store(clamped);
        clamped
    }

    /// Current value mapped to `[0, 1]`
    pub fn get_normalized(&self, id: ParamId) -> f32 {
        id.descriptor().kind.to_normalized(self.get(id))
    }

    /// Set from a normalized `[0, 1]` value; returns the stored plain value
    pub fn set_normalized(&self, id: ParamId, normalized: f32) -> f32 {
        let plain = id.descriptor().kind.from_normalized(normalized);
        self.set(id, plain)
    }

    /// Restore every parameter to its default
    pub fn reset_to_defaults(&self) {
        for id in ParamId::all() {
            self.set(id, id.descriptor().kind.default_value());
        }
    }

    /// Display text for the current value
    pub fn display(&self, id: ParamId) -> String {
        id.descriptor().kind.format(self.get(id))
    }

    // ------------------------------------------------------------------------
    // Typed access
    // ------------------------------------------------------------------------

    /// Dry/wet mix (-1.0..=1.0)
    pub fn mix(&self) -> f32 {
        self.get(ParamId::Mix)
    }

    /// Downsample factor (1..=16)
    pub fn ds_factor(&self) -> usize {
        self.get(ParamId::DsFactor) as usize
    }

    /// Bit depth (2..=24)
    pub fn bit_depth(&self) -> u32 {
        self.get(ParamId::BitDepth) as u32
    }

    /// Selected crush strategy
    pub fn crush_mode(&self) -> CrushMode {
        CrushMode::from_index(self.get(ParamId::CrushMethod) as usize)
    }

    /// Whether the bitmask stage is on
    pub fn masks_enabled(&self) -> bool {
        self.get(ParamId::MasksEnabled) >= 0.5
    }

    /// Whether bit `bit` is cleared by the mask stage
    pub fn mask_bit(&self, bit: u8) -> Result<bool> {
        Ok(self.get(Self::mask_id(bit)?) >= 0.5)
    }

    pub fn set_mix(&self, mix: f32) -> f32 {
        self.set(ParamId::Mix, mix)
    }

    pub fn set_ds_factor(&self, factor: usize) -> usize {
        self.set(ParamId::DsFactor, factor as f32) as usize
    }

    pub fn set_bit_depth(&self, bits: u32) -> u32 {
        self.set(ParamId::BitDepth, bits as f32) as u32
    }

    pub fn set_crush_mode(&self, mode: CrushMode) {
        self.set(ParamId::CrushMethod, mode.index() as f32);
    }

    pub fn set_masks_enabled(&self, enabled: bool) {
        self.set(ParamId::MasksEnabled, if enabled { 1.0 } else { 0.0 });
    }

    /// Toggle one mask bit; bits past the last one are rejected untouched
    pub fn set_mask_bit(&self, bit: u8, active: bool) -> Result<()> {
        self.set(Self::mask_id(bit)?, if active { 1.0 } else { 0.0 });
        Ok(())
    }

    fn mask_id(bit: u8) -> Result<ParamId> {
        ParamId::mask(bit).ok_or_else(|| CrushError::UnknownParameter {
            id: format!("mask{}", bit),
        })
    }

    /// Block-local configuration for the audio thread
    ///
    /// Wait-free: one relaxed load per parameter, no allocation.
    pub fn snapshot(&self) -> EffectConfig {
        let mut bit_active = [false; NUM_MASK_BITS];
        for (bit, active) in bit_active.iter_mut().enumerate() {
            *active = self.get(ParamId::Mask(bit as u8)) >= 0.5;
        }

        EffectConfig {
            ds_factor: self.ds_factor().max(1),
            bit_depth: self.bit_depth(),
            crush_mode: self.crush_mode(),
            masks_enabled: self.masks_enabled(),
            bit_active,
            mix: self.mix(),
        }
    }

    // ------------------------------------------------------------------------
    // String-keyed access (CLI, presets, JSON)
    // ------------------------------------------------------------------------

    /// Look up a parameter by its string id
    pub fn lookup(key: &str) -> Result<ParamDescriptor> {
        ParamId::parse(key)
            .map(ParamId::descriptor)
            .ok_or_else(|| CrushError::UnknownParameter {
                id: key.to_string(),
            })
    }

    /// Read a parameter by string id
    pub fn get_by_key(&self, key: &str) -> Result<f32> {
        Ok(self.get(Self::lookup(key)?.id))
    }

    /// Write a parameter by string id; returns the stored value
    pub fn set_by_key(&self, key: &str, value: f32) -> Result<f32> {
        Ok(self.set(Self::lookup(key)?.id, value))
    }

    /// Write a parameter from display text (`"8"`, `"on"`, `"Bit-Shift"`)
    pub fn set_from_text(&self, key: &str, text: &str) -> Result<f32> {
        let descriptor = Self::lookup(key)?;
        let value =
            descriptor
                .kind
                .parse(text)
                .ok_or_else(|| CrushError::InvalidParameterValue {
                    id: descriptor.key.to_string(),
                    reason: format!("cannot interpret '{}'", text),
                })?;
        Ok(self.set(descriptor.id, value))
    }

    /// Write a parameter from a JSON number, bool or string
    pub fn set_from_json(&self, key: &str, value: &Value) -> Result<f32> {
        match value {
            Value::Number(number) => {
                let number = number
                    .as_f64()
                    .ok_or_else(|| CrushError::InvalidParameterValue {
                        id: key.to_string(),
                        reason: format!("{} is not representable", number),
                    })?;
                self.set_by_key(key, number as f32)
            }
            Value::Bool(flag) => self.set_by_key(key, if *flag { 1.0 } else { 0.0 }),
            Value::String(text) => self.set_from_text(key, text),
            other => Err(CrushError::InvalidParameterValue {
                id: key.to_string(),
                reason: format!("expected number, bool or string, got {}", other),
            }),
        }
    }

    /// Every parameter as a JSON object keyed by string id
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for id in ParamId::all() {
            map.insert(id.key().to_string(), Value::from(self.get(id) as f64));
        }
        Value::Object(map)
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ParamStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamStore")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
