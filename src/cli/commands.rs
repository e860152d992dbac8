//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use serde_json::Value;

use super::OutputFormat;
use crate::dsp::{CrushProcessor, Effect};
use crate::engine::{export_audio, generate_stereo_test_tone, import_audio, ExportFormat};
use crate::error::{CrushError, Result};
use crate::params::{descriptors, load_preset, save_preset, ParamStore};

/// Split an `ID=VALUE` override
pub fn parse_assignment(text: &str) -> Result<(&str, &str)> {
    text.split_once('=')
        .map(|(id, value)| (id.trim(), value.trim()))
        .filter(|(id, _)| !id.is_empty())
        .ok_or_else(|| CrushError::InvalidParameterValue {
            id: text.to_string(),
            reason: "expected ID=VALUE".to_string(),
        })
}

/// Apply `ID=VALUE` overrides in order
pub fn apply_overrides(store: &ParamStore, overrides: &[String]) -> Result<()> {
    for assignment in overrides {
        let (id, text) = parse_assignment(assignment)?;
        let stored = store.set_from_text(id, text)?;
        info!("Set {} = {}", id, stored);
    }
    Ok(())
}

/// Build a parameter store from an optional preset plus overrides.
fn configured_store(preset: Option<&Path>, overrides: &[String]) -> Result<Arc<ParamStore>> {
    let store = Arc::new(ParamStore::new());
    if let Some(path) = preset {
        load_preset(&store, path)?;
    }
    apply_overrides(&store, overrides)?;
    Ok(store)
}

/// Render a WAV file through the effect.
pub fn render(
    input: &Path,
    output: &Path,
    preset: Option<&Path>,
    overrides: &[String],
    block_size: usize,
    format: OutputFormat,
) -> Result<()> {
    info!("Rendering {} -> {}", input.display(), output.display());

    let params = configured_store(preset, overrides)?;
    let mut buffer = import_audio(input)?;

    let mut processor = CrushProcessor::new(Arc::clone(&params));
    processor.prepare(buffer.sample_rate(), block_size);
    processor.process(&mut buffer);

    if buffer.has_invalid_samples() {
        warn!("Output contains NaN or infinite samples");
    }

    export_audio(&buffer, output, format.export_format(buffer.sample_rate()))?;

    println!(
        "Rendered {} samples x {} channels ({:.2}s) to {}",
        buffer.len(),
        buffer.channels(),
        buffer.duration_secs(),
        output.display()
    );
    println!("Peak: {:.4}", buffer.peak());

    Ok(())
}

/// List parameters with their current values.
pub fn list_params(preset: Option<&Path>, json: bool) -> Result<()> {
    let store = configured_store(preset, &[])?;

    if json {
        let mut entries = Vec::new();
        for descriptor in descriptors() {
            let mut entry = serde_json::to_value(&descriptor)?;
            if let Value::Object(map) = &mut entry {
                map.insert("value".to_string(), Value::from(store.get(descriptor.id) as f64));
            }
            entries.push(entry);
        }
        println!("{}", serde_json::to_string_pretty(&Value::Array(entries))?);
        return Ok(());
    }

    println!("{:<14} {:<20} {:>10}  Range", "Id", "Name", "Value");
    println!("{:-<60}", "");
    for descriptor in descriptors() {
        let kind = &descriptor.kind;
        println!(
            "{:<14} {:<20} {:>10}  {} .. {}",
            descriptor.key,
            descriptor.name,
            store.display(descriptor.id),
            kind.format(kind.min()),
            kind.format(kind.max())
        );
    }

    Ok(())
}

/// Write a preset file.
pub fn write_preset(output: &Path, overrides: &[String]) -> Result<()> {
    let store = configured_store(None, overrides)?;
    save_preset(&store, output)?;
    println!("Preset written: {}", output.display());
    Ok(())
}

/// Write a stereo test tone.
pub fn write_tone(output: &Path, frequency: f32, duration: f32, sample_rate: u32) -> Result<()> {
    if !(frequency.is_finite() && frequency > 0.0) || !(duration.is_finite() && duration > 0.0) {
        return Err(CrushError::InvalidAudio {
            reason: format!(
                "tone needs a positive frequency and duration (got {} Hz, {}s)",
                frequency, duration
            ),
        });
    }

    let buffer = generate_stereo_test_tone(frequency, frequency, duration, sample_rate);
    export_audio(&buffer, output, ExportFormat::float32(sample_rate))?;
    println!(
        "Tone written: {} ({} Hz, {:.2}s)",
        output.display(),
        frequency,
        buffer.duration_secs()
    );
    Ok(())
}
