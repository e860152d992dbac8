//! Offline Host
//!
//! Owned audio buffers and WAV file I/O for rendering files through the
//! processor outside a plugin host.

pub mod buffer;
pub mod io;

pub use buffer::{AudioBuffer, ChannelLayout, DEFAULT_SAMPLE_RATE};
pub use io::{
    export_audio, generate_stereo_test_tone, generate_test_tone, import_audio, ExportFormat,
};
