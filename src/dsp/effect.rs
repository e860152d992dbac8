//! Effect trait definition
//!
//! Uniform surface for anything that processes an [`AudioBuffer`] in place.

use crate::engine::AudioBuffer;
use crate::error::Result;
use serde_json::Value;

/// Base trait for DSP effects
///
/// `process` is offline-friendly; real-time hosts call the implementor's
/// block entry point directly.
pub trait Effect: Send + Sync {
    /// Process audio buffer in-place
    fn process(&mut self, buffer: &mut AudioBuffer);

    /// Prepare the effect for processing
    ///
    /// Called when sample rate or block size changes.
    fn prepare(&mut self, sample_rate: u32, max_block_size: usize);

    /// Reset effect state
    fn reset(&mut self);

    /// Get the effect type identifier
    fn effect_type(&self) -> &'static str;

    /// Get human-readable display name
    fn display_name(&self) -> &str;

    /// Processing latency in samples
    fn latency_samples(&self) -> usize {
        0
    }

    /// How long the effect keeps ringing after input stops
    fn tail_length_secs(&self) -> f64 {
        0.0
    }

    /// Get all parameters as JSON (for UI/automation)
    fn get_params(&self) -> Value;

    /// Set a single parameter by name
    fn set_param(&mut self, name: &str, value: &Value) -> Result<()>;
}
