//! Preset state
//!
//! Serializes every parameter value to an opaque byte block and back.
//! Restoring a saved state reproduces the exact parameter values, so the
//! processor's output for identical input is identical too.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::descriptor::ParamId;
use super::store::ParamStore;
use crate::error::{CrushError, Result};

/// Current preset format version
pub const STATE_VERSION: u32 = 1;

/// On-disk preset layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetState {
    /// Format version
    pub version: u32,
    /// Plain parameter values keyed by string id
    pub values: BTreeMap<String, f32>,
}

/// Loosely-typed view used while validating incoming state
#[derive(Deserialize)]
struct RawPresetState {
    version: Option<u32>,
    values: Option<BTreeMap<String, f32>>,
}

impl PresetState {
    /// Capture the current values of a store
    pub fn capture(store: &ParamStore) -> Self {
        let values = ParamId::all()
            .map(|id| (id.key().to_string(), store.get(id)))
            .collect();
        Self {
            version: STATE_VERSION,
            values,
        }
    }
}

impl ParamStore {
    /// Serialize all parameter values
    pub fn save_state(&self) -> Result<Vec<u8>> {
        let state = PresetState::capture(self);
        let bytes = serde_json::to_vec_pretty(&state)?;
        debug!("Saved preset state ({} bytes)", bytes.len());
        Ok(bytes)
    }

    /// Restore parameter values from a block produced by [`ParamStore::save_state`]
    ///
    /// Every value goes through the clamping write path. Unknown ids are
    /// skipped, missing ids keep their current value. Returns the number of
    /// values applied.
    pub fn restore_state(&self, bytes: &[u8]) -> Result<usize> {
        let raw: RawPresetState = serde_json::from_slice(bytes)?;

        let version = raw.version.ok_or_else(|| CrushError::InvalidState {
            reason: "missing 'version' field".to_string(),
        })?;
        if version != STATE_VERSION {
            return Err(CrushError::UnsupportedStateVersion {
                found: version,
                expected: STATE_VERSION,
            });
        }

        let values = raw.values.ok_or_else(|| CrushError::InvalidState {
            reason: "missing 'values' field".to_string(),
        })?;

        let mut applied = 0;
        for (key, value) in &values {
            match ParamId::parse(key) {
                Some(id) => {
                    self.set(id, *value);
                    applied += 1;
                }
                None => warn!("Skipping unknown parameter '{}' in preset state", key),
            }
        }

        debug!("Restored {} of {} preset values", applied, values.len());
        Ok(applied)
    }
}

/// Write the store's state to a preset file
pub fn save_preset(store: &ParamStore, path: &Path) -> Result<()> {
    let bytes = store.save_state()?;
    fs::write(path, bytes)?;
    info!("Preset written: {}", path.display());
    Ok(())
}

/// Load a preset file into the store; returns the number of values applied
pub fn load_preset(store: &ParamStore, path: &Path) -> Result<usize> {
    let bytes = fs::read(path)?;
    let applied = store.restore_state(&bytes)?;
    info!("Preset loaded: {} ({} values)", path.display(), applied);
    Ok(applied)
}
