//! Crush On You - bitcrusher and sample-rate reducer
//!
//! A real-time safe lo-fi effect. Every sample runs through
//!
//! 1. Bit-depth reduction (uniform quantization or bit-shift truncation)
//! 2. Bitmask distortion (clearing raw IEEE-754 bits)
//! 3. Decimation (zero-order hold)
//! 4. Equal-power dry/wet mix
//!
//! # Architecture
//!
//! - [`params`]: lock-free parameter store, descriptors and preset state
//! - [`dsp`]: the pipeline stages and [`dsp::CrushProcessor`]
//! - [`engine`]: offline host buffers and WAV I/O
//! - [`cli`]: the `crushon-cli` command line

pub mod cli;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod params;

pub use error::{CrushError, Result};
