//! WAV file I/O for the offline host
//!
//! Imports 16/24/32-bit integer and 32-bit float WAV into an [`AudioBuffer`]
//! and writes buffers back out. Sample rates pass through untouched; there
//! is no resampling.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::info;

use crate::engine::buffer::{AudioBuffer, ChannelLayout, DEFAULT_SAMPLE_RATE};
use crate::error::{CrushError, Result};

/// Export format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFormat {
    /// Sample rate written to the header; must match the buffer
    pub sample_rate: u32,
    /// Bit depth: 16 or 24 (integer) or 32 (float)
    pub bit_depth: u16,
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self::float32(DEFAULT_SAMPLE_RATE)
    }
}

impl ExportFormat {
    /// Create a new export format with the given sample rate and bit depth
    pub fn new(sample_rate: u32, bit_depth: u16) -> Self {
        ExportFormat {
            sample_rate,
            bit_depth,
        }
    }

    /// 16-bit integer PCM
    pub fn pcm16(sample_rate: u32) -> Self {
        Self::new(sample_rate, 16)
    }

    /// 24-bit integer PCM
    pub fn pcm24(sample_rate: u32) -> Self {
        Self::new(sample_rate, 24)
    }

    /// 32-bit float, lossless for the processor's output
    pub fn float32(sample_rate: u32) -> Self {
        Self::new(sample_rate, 32)
    }

    /// 32-bit float at the buffer's own sample rate
    pub fn for_buffer(buffer: &AudioBuffer) -> Self {
        Self::float32(buffer.sample_rate())
    }

    fn spec(&self, channels: u16) -> Result<WavSpec> {
        let sample_format = match self.bit_depth {
            16 | 24 => SampleFormat::Int,
            32 => SampleFormat::Float,
            other => {
                return Err(CrushError::UnsupportedFormat {
                    details: format!("{}-bit export (only 16, 24, 32 supported)", other),
                })
            }
        };

        Ok(WavSpec {
            channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bit_depth,
            sample_format,
        })
    }
}

/// Import a WAV file
///
/// # Arguments
/// * `path` - Path to the WAV file to import
///
/// # Errors
/// * `AudioReadError` - If the file cannot be opened or decoded
/// * `UnsupportedFormat` - More than 2 channels or an unusual bit depth
/// * `InvalidAudio` - The file holds no samples
pub fn import_audio(path: &Path) -> Result<AudioBuffer> {
    let read_error = |source| CrushError::AudioReadError {
        path: path.display().to_string(),
        source,
    };

    let reader = WavReader::open(path).map_err(read_error)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let layout =
        ChannelLayout::from_count(channels).ok_or_else(|| CrushError::UnsupportedFormat {
            details: format!("{}-channel audio (only mono/stereo supported)", channels),
        })?;

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)
        .map_err(|e| match e {
            ReadFailure::Decode(source) => read_error(source),
            ReadFailure::Unsupported(details) => CrushError::UnsupportedFormat { details },
        })?;

    if interleaved.is_empty() {
        return Err(CrushError::InvalidAudio {
            reason: format!("{} contains no samples", path.display()),
        });
    }

    let buffer = AudioBuffer::from_interleaved(&interleaved, layout, spec.sample_rate)?;
    info!(
        "Imported {} ({} ch, {} Hz, {}-bit, {:.2}s)",
        path.display(),
        buffer.channels(),
        buffer.sample_rate(),
        spec.bits_per_sample,
        buffer.duration_secs()
    );

    Ok(buffer)
}

/// Export an AudioBuffer to a WAV file
///
/// Integer formats clamp to `[-1, 1]`; the float format writes samples as-is.
///
/// # Arguments
/// * `buffer` - The audio buffer to export
/// * `path` - Path where the file will be written
/// * `format` - Export format specifying sample rate and bit depth
pub fn export_audio(buffer: &AudioBuffer, path: &Path, format: ExportFormat) -> Result<()> {
    if format.sample_rate != buffer.sample_rate() {
        return Err(CrushError::UnsupportedFormat {
            details: format!(
                "export at {} Hz from a {} Hz buffer (resampling is not supported)",
                format.sample_rate,
                buffer.sample_rate()
            ),
        });
    }

    let spec = format.spec(buffer.channels() as u16)?;
    let write_error = |source| CrushError::AudioWriteError {
        path: path.display().to_string(),
        source,
    };

    let mut writer = WavWriter::create(path, spec).map_err(write_error)?;
    let interleaved = buffer.to_interleaved();

    match format.bit_depth {
        16 => {
            for sample in interleaved {
                let scaled = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
                writer.write_sample(scaled).map_err(write_error)?;
            }
        }
        24 => {
            for sample in interleaved {
                // 24-bit stored as i32 in hound
                let scaled = (sample.clamp(-1.0, 1.0) * 8388607.0) as i32;
                writer.write_sample(scaled).map_err(write_error)?;
            }
        }
        _ => {
            for sample in interleaved {
                writer.write_sample(sample).map_err(write_error)?;
            }
        }
    }

    writer.finalize().map_err(write_error)?;
    info!(
        "Exported {} ({} ch, {} Hz, {}-bit)",
        path.display(),
        buffer.channels(),
        format.sample_rate,
        format.bit_depth
    );

    Ok(())
}

/// Generate a mono sine test tone at full scale
pub fn generate_test_tone(frequency: f32, duration_secs: f32, sample_rate: u32) -> AudioBuffer {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let mut buffer = AudioBuffer::new(num_samples, ChannelLayout::Mono);
    buffer.set_sample_rate(sample_rate);
    fill_sine(buffer.channel_mut(0), frequency, sample_rate);
    buffer
}

/// Generate a stereo test tone with different frequencies per channel
///
/// # Arguments
/// * `freq_left` - Frequency for left channel in Hz
/// * `freq_right` - Frequency for right channel in Hz
/// * `duration_secs` - Duration of the tone in seconds
/// * `sample_rate` - Sample rate in Hz
pub fn generate_stereo_test_tone(
    freq_left: f32,
    freq_right: f32,
    duration_secs: f32,
    sample_rate: u32,
) -> AudioBuffer {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let mut buffer = AudioBuffer::new(num_samples, ChannelLayout::Stereo);
    buffer.set_sample_rate(sample_rate);
    fill_sine(buffer.channel_mut(0), freq_left, sample_rate);
    fill_sine(buffer.channel_mut(1), freq_right, sample_rate);
    buffer
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn fill_sine(channel: &mut [f32], frequency: f32, sample_rate: u32) {
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;
    for (i, sample) in channel.iter_mut().enumerate() {
        *sample = (angular_freq * i as f32).sin();
    }
}

enum ReadFailure {
    Decode(hound::Error),
    Unsupported(String),
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> std::result::Result<Vec<f32>, ReadFailure> {
    let samples: std::result::Result<Vec<f32>, hound::Error> = match (sample_format, bits_per_sample) {
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect(),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect(),
        // 24-bit stored as i32 in hound
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8388608.0))
            .collect(),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2147483648.0))
            .collect(),
        (format, bits) => {
            let kind = match format {
                SampleFormat::Float => "float",
                SampleFormat::Int => "integer",
            };
            return Err(ReadFailure::Unsupported(format!(
                "{}-bit {} audio",
                bits, kind
            )));
        }
    };

    samples.map_err(ReadFailure::Decode)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tempfile::tempdir;

    #[test]
    fn test_generate_test_tone() {
        let buffer = generate_test_tone(440.0, 1.0, 48000);

        assert_eq!(buffer.len(), 48000);
        assert_eq!(buffer.channels(), 1);
        assert_eq!(buffer.sample_rate(), 48000);

        // Half a cycle in, the sine is back near zero
        let zero_crossing = (48000.0 / 440.0 / 2.0) as usize;
        assert!(buffer.channel(0)[zero_crossing].abs() < 0.1);
        assert!(buffer.peak() <= 1.0);
    }

    #[test]
    fn test_generate_stereo_test_tone() {
        let buffer = generate_stereo_test_tone(440.0, 880.0, 0.5, 44100);

        assert_eq!(buffer.len(), 22050);
        assert_eq!(buffer.layout(), ChannelLayout::Stereo);
        assert!((buffer.channel(0)[100] - buffer.channel(1)[100]).abs() > 0.01);
    }

    #[test]
    fn test_export_format_presets() {
        assert_eq!(ExportFormat::pcm16(44100), ExportFormat::new(44100, 16));
        assert_eq!(ExportFormat::pcm24(48000).bit_depth, 24);
        assert_eq!(ExportFormat::default(), ExportFormat::float32(48000));

        let tone = generate_test_tone(100.0, 0.01, 22050);
        assert_eq!(ExportFormat::for_buffer(&tone).sample_rate, 22050);
    }

    #[test]
    fn test_float_round_trip_is_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");

        let original = generate_stereo_test_tone(440.0, 660.0, 0.1, 48000);
        export_audio(&original, &path, ExportFormat::for_buffer(&original)).unwrap();
        let imported = import_audio(&path).unwrap();

        assert_eq!(imported, original);
    }

    #[test]
    fn test_pcm24_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mono24.wav");

        let original = generate_test_tone(440.0, 0.1, 48000);
        export_audio(&original, &path, ExportFormat::pcm24(48000)).unwrap();
        let imported = import_audio(&path).unwrap();

        assert_eq!(imported.len(), original.len());
        assert_eq!(imported.layout(), ChannelLayout::Mono);
        for (orig, imp) in original.channel(0).iter().zip(imported.channel(0)) {
            assert_abs_diff_eq!(*orig, *imp, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_pcm16_clamps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("loud.wav");

        let buffer = AudioBuffer::from_channels(vec![vec![2.0, -2.0, 0.5]], 48000).unwrap();
        export_audio(&buffer, &path, ExportFormat::pcm16(48000)).unwrap();
        let imported = import_audio(&path).unwrap();

        assert_abs_diff_eq!(imported.channel(0)[0], 32767.0 / 32768.0, epsilon = 1e-6);
        assert_abs_diff_eq!(imported.channel(0)[1], -32767.0 / 32768.0, epsilon = 1e-6);
        assert_abs_diff_eq!(imported.channel(0)[2], 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_export_rejects_rate_mismatch() {
        let dir = tempdir().unwrap();
        let buffer = generate_test_tone(440.0, 0.01, 48000);
        let result = export_audio(&buffer, &dir.path().join("x.wav"), ExportFormat::float32(44100));
        assert!(matches!(result, Err(CrushError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_export_rejects_bit_depth() {
        let dir = tempdir().unwrap();
        let buffer = generate_test_tone(440.0, 0.01, 48000);
        let result = export_audio(&buffer, &dir.path().join("x.wav"), ExportFormat::new(48000, 8));
        assert!(matches!(result, Err(CrushError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_import_rejects_multichannel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quad.wav");
        let spec = WavSpec {
            channels: 4,
            sample_rate: 48000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..16 {
            writer.write_sample(0_i16).unwrap();
        }
        writer.finalize().unwrap();

        let result = import_audio(&path);
        assert!(matches!(result, Err(CrushError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_import_missing_file() {
        let dir = tempdir().unwrap();
        let result = import_audio(&dir.path().join("missing.wav"));
        match result {
            Err(err @ CrushError::AudioReadError { .. }) => {
                assert_eq!(err.error_code(), "AUDIO_READ_ERROR");
            }
            other => panic!("expected AudioReadError, got {:?}", other),
        }
    }
}
