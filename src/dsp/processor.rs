//! Block Pipeline
//!
//! Runs once per host block. Parameters are snapshotted at the top of the
//! block, then every sample of every channel goes through
//!
//! crush → mask → decimate → mix (against the untouched input sample)
//!
//! Channels are independent: each owns its decimator, nothing couples left
//! and right. At most two channels are processed; anything past the stereo
//! pair is left as the host handed it over.

use std::sync::Arc;

use log::debug;
use serde_json::{json, Value};

use super::bitmask::apply_mask;
use super::crush::BitCrusher;
use super::decimator::Decimator;
use super::denormal::ScopedNoDenormals;
use super::effect::Effect;
use super::mix::MixGains;
use crate::engine::AudioBuffer;
use crate::error::Result;
use crate::params::ParamStore;

// ============================================================================
// Constants
// ============================================================================

/// Channels the effect processes (left, right)
pub const MAX_CHANNELS: usize = 2;

/// Block size used until `prepare` is called
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Replace NaN and infinities with silence
#[inline]
fn sanitize(sample: f32) -> f32 {
    if sample.is_finite() {
        sample
    } else {
        0.0
    }
}

// ============================================================================
// Crush Processor
// ============================================================================

/// The bitcrusher effect
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use crushon::dsp::CrushProcessor;
/// use crushon::params::ParamStore;
///
/// let params = Arc::new(ParamStore::new());
/// params.set_ds_factor(2);
///
/// let mut processor = CrushProcessor::new(Arc::clone(&params));
/// let mut left = [0.1_f32, 0.2, 0.3, 0.4];
/// let mut right = [0.0_f32; 4];
/// processor.process_stereo(&mut left, &mut right);
/// assert_eq!(left[1], left[0]);
/// ```
#[derive(Debug)]
pub struct CrushProcessor {
    params: Arc<ParamStore>,
    decimators: [Decimator; MAX_CHANNELS],
    crusher: BitCrusher,
    sample_rate: u32,
    max_block_size: usize,
}

impl CrushProcessor {
    /// Create a processor reading from a shared parameter store
    pub fn new(params: Arc<ParamStore>) -> Self {
        Self {
            params,
            decimators: [Decimator::new(); MAX_CHANNELS],
            crusher: BitCrusher::new(),
            sample_rate: crate::engine::DEFAULT_SAMPLE_RATE,
            max_block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Shared parameter store
    pub fn params(&self) -> &Arc<ParamStore> {
        &self.params
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Process one host block in place
    ///
    /// Real-time safe: no allocation, no locks, no logging. Each element of
    /// `channels` is one channel's samples for this block.
    pub fn process_block<C: AsMut<[f32]>>(&mut self, channels: &mut [C]) {
        let _no_denormals = ScopedNoDenormals::new();

        let config = self.params.snapshot();
        let gains = MixGains::from_mix(config.mix);
        let clear_mask = config.clear_mask();
        let crusher = &mut self.crusher;

        for (channel, decimator) in channels.iter_mut().zip(self.decimators.iter_mut()) {
            for (index, sample) in channel.as_mut().iter_mut().enumerate() {
                let dry = *sample;
                let crushed = crusher.process(dry, config.crush_mode, config.bit_depth);
                let masked = apply_mask(crushed, clear_mask);
                let wet = decimator.process(masked, index, config.ds_factor);
                *sample = gains.apply(dry, sanitize(wet));
            }
        }
    }

    /// Process a stereo pair in place
    pub fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.process_block(&mut [left, right]);
    }

    /// Process a whole buffer, split into blocks of `max_block_size`
    ///
    /// Block boundaries behave exactly as with a host calling
    /// [`CrushProcessor::process_block`] repeatedly.
    ///
    /// Offline only: each block allocates its list of channel slices. A
    /// real-time host calls [`CrushProcessor::process_block`] or
    /// [`CrushProcessor::process_stereo`] directly, which never allocate.
    pub fn process_buffer(&mut self, buffer: &mut AudioBuffer) {
        let block_size = self.max_block_size.max(1);
        let len = buffer.len();

        let mut start = 0;
        while start < len {
            let end = (start + block_size).min(len);
            let mut block: Vec<&mut [f32]> = buffer
                .channels_mut()
                .iter_mut()
                .map(|channel| &mut channel[start..end])
                .collect();
            self.process_block(&mut block);
            start = end;
        }
    }
}

impl Effect for CrushProcessor {
    fn process(&mut self, buffer: &mut AudioBuffer) {
        self.process_buffer(buffer);
    }

    fn prepare(&mut self, sample_rate: u32, max_block_size: usize) {
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size.max(1);
        self.reset();
        debug!(
            "Prepared {} at {} Hz, {} samples per block",
            self.effect_type(),
            self.sample_rate,
            self.max_block_size
        );
    }

    fn reset(&mut self) {
        for decimator in &mut self.decimators {
            decimator.reset();
        }
        self.crusher.reset();
        debug!("Reset {}", self.effect_type());
    }

    fn effect_type(&self) -> &'static str {
        "crushon"
    }

    fn display_name(&self) -> &str {
        "Crush On You"
    }

    fn get_params(&self) -> Value {
        json!({
            "effect": self.effect_type(),
            "sample_rate": self.sample_rate,
            "max_block_size": self.max_block_size,
            "params": self.params.to_json(),
        })
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        self.params.set_from_json(name, value)?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::crush::{quantize, quantum, truncate};
    use crate::dsp::CrushMode;
    use crate::engine::ChannelLayout;
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    fn processor() -> (Arc<ParamStore>, CrushProcessor) {
        let params = Arc::new(ParamStore::new());
        let processor = CrushProcessor::new(Arc::clone(&params));
        (params, processor)
    }

    fn ramp(len: usize, scale: f32) -> Vec<f32> {
        (0..len).map(|i| (i as f32 + 1.0) * scale).collect()
    }

    #[test]
    fn test_defaults_are_near_transparent() {
        let (_, mut processor) = processor();
        let input: Vec<f32> = (0..64).map(|i| (i as f32 * 0.1).sin() * 0.8).collect();
        let mut left = input.clone();
        let mut right = input.clone();
        processor.process_stereo(&mut left, &mut right);

        // 24-bit QL, no decimation, no masks, fully wet
        for (out, x) in left.iter().zip(&input) {
            assert_abs_diff_eq!(*out, *x, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_end_to_end_quantize_hold() {
        let (params, mut processor) = processor();
        params.set_ds_factor(2);
        params.set_bit_depth(8);
        params.set_crush_mode(CrushMode::Quantize);
        params.set_masks_enabled(false);
        params.set_mix(1.0);

        let input = [0.11_f32, 0.52, -0.33, 0.74, 0.05, -0.96, 0.27, 0.68];
        let mut left = input;
        let mut right = input.map(|x| -x);
        processor.process_stereo(&mut left, &mut right);

        let q = 1.0_f32 / 255.0;
        for i in 0..input.len() {
            let source = i - i % 2;
            let expected_l = q * (input[source] / q).trunc();
            let expected_r = q * (-input[source] / q).trunc();
            assert_abs_diff_eq!(left[i], expected_l, epsilon = 1e-6);
            assert_abs_diff_eq!(right[i], expected_r, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_fully_dry_passes_input() {
        let (params, mut processor) = processor();
        params.set_bit_depth(2);
        params.set_ds_factor(8);
        params.set_mask_bit(30, true).unwrap();
        params.set_mix(-1.0);

        let input = ramp(32, 0.03);
        let mut left = input.clone();
        let mut right = input.clone();
        processor.process_stereo(&mut left, &mut right);

        assert_eq!(left, input);
        assert_eq!(right, input);
    }

    #[test]
    fn test_stage_order_crush_before_decimate() {
        let (params, mut processor) = processor();
        params.set_ds_factor(4);
        params.set_bit_depth(3);
        params.set_crush_mode(CrushMode::Truncate);

        let mut block = vec![ramp(8, 0.1)];
        let input = block[0].clone();
        processor.process_block(&mut block);

        for i in 0..8 {
            let held = truncate(input[i - i % 4], 3);
            assert_abs_diff_eq!(block[0][i], held, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_mask_applied_to_wet_path() {
        let (params, mut processor) = processor();
        params.set_mask_bit(31, true).unwrap();

        let mut block = vec![vec![-0.5_f32, -0.25, 0.125]];
        processor.process_block(&mut block);

        // Sign bit cleared: every output is the magnitude
        assert_abs_diff_eq!(block[0][0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(block[0][1], 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(block[0][2], 0.125, epsilon = 1e-6);
    }

    #[test]
    fn test_masks_disabled_ignores_bits() {
        let (params, mut processor) = processor();
        params.set_mask_bit(31, true).unwrap();
        params.set_masks_enabled(false);

        let mut block = vec![vec![-0.5_f32]];
        processor.process_block(&mut block);
        assert_abs_diff_eq!(block[0][0], -0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_non_finite_wet_is_silenced() {
        let (params, mut processor) = processor();
        params.set_mix(1.0);

        // x / q overflows to infinity at 24 bits
        let mut block = vec![vec![3.0e38_f32, 0.5]];
        processor.process_block(&mut block);

        assert!(block[0].iter().all(|s| s.is_finite()));
        assert!(block[0][0].abs() < 1.0e30);
        assert_abs_diff_eq!(block[0][1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_channels_independent() {
        let (params, mut processor) = processor();
        params.set_ds_factor(3);
        params.set_bit_depth(6);

        let mut left = vec![0.0_f32; 16];
        let mut right = ramp(16, 0.05);
        processor.process_stereo(&mut left, &mut right);

        assert!(left.iter().all(|&s| s == 0.0));

        let q = quantum(6);
        let source = ramp(16, 0.05);
        for i in 0..16 {
            let expected = quantize(source[i - i % 3], q);
            assert_abs_diff_eq!(right[i], expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_mono_block() {
        let (params, mut processor) = processor();
        params.set_ds_factor(2);
        let mut block = [vec![0.1_f32, 0.2, 0.3, 0.4]];
        processor.process_block(&mut block);
        assert_abs_diff_eq!(block[0][1], block[0][0], epsilon = 1e-9);
        assert_abs_diff_eq!(block[0][3], block[0][2], epsilon = 1e-9);
    }

    #[test]
    fn test_extra_channels_untouched() {
        let (params, mut processor) = processor();
        params.set_bit_depth(2);

        let extra = vec![0.3_f32, 0.6, 0.9];
        let mut block = vec![vec![0.3_f32, 0.6, 0.9]; 3];
        processor.process_block(&mut block);

        assert_ne!(block[0], extra);
        assert_ne!(block[1], extra);
        assert_eq!(block[2], extra);
    }

    #[test]
    fn test_decimation_phase_restarts_per_block() {
        let (params, mut processor) = processor();
        params.set_ds_factor(4);

        let mut buffer = AudioBuffer::new(12, ChannelLayout::Mono);
        buffer.channel_mut(0).copy_from_slice(&ramp(12, 0.05));
        processor.prepare(48000, 6);
        processor.process_buffer(&mut buffer);

        // Blocks are [0..6) and [6..12): captures at 0, 4, 6, 10
        let input = ramp(12, 0.05);
        let sources = [0, 0, 0, 0, 4, 4, 6, 6, 6, 6, 10, 10];
        for (i, &source) in sources.iter().enumerate() {
            assert_abs_diff_eq!(buffer.channel(0)[i], input[source], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_held_value_survives_block_boundary() {
        let (params, mut processor) = processor();
        params.set_ds_factor(2);

        let mut first = vec![vec![0.5_f32, 0.6, 0.7]];
        processor.process_block(&mut first);
        assert_abs_diff_eq!(first[0][2], 0.7, epsilon = 1e-6);

        // An empty block leaves state alone
        let mut empty: Vec<Vec<f32>> = vec![Vec::new()];
        processor.process_block(&mut empty);
        assert_eq!(processor.decimators[0].held(), first[0][2]);
    }

    #[test]
    fn test_prepare_and_reset() {
        let (_, mut processor) = processor();
        processor.process_stereo(&mut [0.9], &mut [0.9]);
        processor.prepare(44100, 0);

        assert_eq!(processor.sample_rate(), 44100);
        assert_eq!(processor.max_block_size(), 1);
        assert_eq!(processor.decimators[0].held(), 0.0);
    }

    #[test]
    fn test_reset_clears_state_keeps_config() {
        let (params, mut processor) = processor();
        params.set_ds_factor(4);
        processor.prepare(44100, 256);
        processor.process_stereo(&mut [0.7, 0.1], &mut [-0.7, 0.1]);
        assert_ne!(processor.decimators[0].held(), 0.0);

        processor.reset();

        assert_eq!(processor.decimators[0].held(), 0.0);
        assert_eq!(processor.decimators[1].held(), 0.0);
        assert_eq!(processor.sample_rate(), 44100);
        assert_eq!(processor.max_block_size(), 256);
        assert_eq!(params.ds_factor(), 4);
    }

    #[test]
    fn test_effect_metadata() {
        let (_, processor) = processor();
        assert_eq!(processor.effect_type(), "crushon");
        assert_eq!(processor.display_name(), "Crush On You");
        assert_eq!(processor.latency_samples(), 0);
        assert_eq!(processor.tail_length_secs(), 0.0);
    }

    #[test]
    fn test_set_param_through_effect() {
        let (params, mut processor) = processor();
        processor.set_param("bitDepth", &json!(6)).unwrap();
        processor.set_param("crushMethod", &json!("Bit-Shift")).unwrap();

        assert_eq!(params.bit_depth(), 6);
        assert_eq!(params.crush_mode(), CrushMode::Truncate);
        assert!(processor.set_param("nope", &json!(1)).is_err());

        let state = processor.get_params();
        assert_eq!(state["effect"], "crushon");
        assert_eq!(state["params"]["bitDepth"], json!(6.0));
    }
}
