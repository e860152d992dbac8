//! DSP Library
//!
//! The bitcrusher pipeline and its stages. Each stage is a small,
//! allocation-free unit; [`CrushProcessor`] wires them together and
//! implements the `Effect` trait.

mod bitmask;
mod crush;
mod decimator;
mod denormal;
mod effect;
mod mix;
mod processor;

pub use bitmask::{apply_mask, combine_masks, BIT_MASKS};
pub use crush::{quantize, quantum, truncate, BitCrusher, CrushMode, MAX_BIT_DEPTH, MIN_BIT_DEPTH};
pub use decimator::Decimator;
pub use denormal::ScopedNoDenormals;
pub use effect::Effect;
pub use mix::{mix_position, MixGains};
pub use processor::{CrushProcessor, DEFAULT_BLOCK_SIZE, MAX_CHANNELS};
