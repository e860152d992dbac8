//! Parameter Model
//!
//! The effect's control surface: descriptors for every parameter, the
//! lock-free store shared between the audio and control threads, and
//! preset state serialization.

mod descriptor;
mod state;
mod store;

pub use descriptor::{
    descriptors, ParamDescriptor, ParamId, ParamKind, CRUSH_METHOD_LABELS, NUM_MASK_BITS,
    PARAM_COUNT,
};
pub use state::{load_preset, save_preset, PresetState, STATE_VERSION};
pub use store::{EffectConfig, ParamStore};
