//! Parameter surface
//!
//! The flat list of named, typed, range-bounded controls the effect exposes.
//! Order is stable and doubles as the storage index: the five main controls
//! first, then the 32 mask switches.

use serde::Serialize;

// ============================================================================
// Constants
// ============================================================================

/// Number of maskable bits in an IEEE-754 single-precision sample
pub const NUM_MASK_BITS: usize = 32;

/// Total number of parameters
pub const PARAM_COUNT: usize = 5 + NUM_MASK_BITS;

/// Labels of the `crushMethod` choice, in index order
pub const CRUSH_METHOD_LABELS: &[&str] = &["QL", "Bit-Shift"];

const MASK_KEYS: [&str; NUM_MASK_BITS] = [
    "mask0", "mask1", "mask2", "mask3", "mask4", "mask5", "mask6", "mask7", "mask8", "mask9",
    "mask10", "mask11", "mask12", "mask13", "mask14", "mask15", "mask16", "mask17", "mask18",
    "mask19", "mask20", "mask21", "mask22", "mask23", "mask24", "mask25", "mask26", "mask27",
    "mask28", "mask29", "mask30", "mask31",
];

const MASK_NAMES: [&str; NUM_MASK_BITS] = [
    "Mask Bit 0",
    "Mask Bit 1",
    "Mask Bit 2",
    "Mask Bit 3",
    "Mask Bit 4",
    "Mask Bit 5",
    "Mask Bit 6",
    "Mask Bit 7",
    "Mask Bit 8",
    "Mask Bit 9",
    "Mask Bit 10",
    "Mask Bit 11",
    "Mask Bit 12",
    "Mask Bit 13",
    "Mask Bit 14",
    "Mask Bit 15",
    "Mask Bit 16",
    "Mask Bit 17",
    "Mask Bit 18",
    "Mask Bit 19",
    "Mask Bit 20",
    "Mask Bit 21",
    "Mask Bit 22",
    "Mask Bit 23",
    "Mask Bit 24",
    "Mask Bit 25",
    "Mask Bit 26",
    "Mask Bit 27",
    "Mask Bit 28",
    "Mask Bit 29",
    "Mask Bit 30",
    "Mask Bit 31",
];

// ============================================================================
// Parameter Identity
// ============================================================================

/// Identity of a single parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    /// Dry/wet blend, -1.0 (dry) to 1.0 (wet)
    Mix,
    /// Sample-and-hold length in samples
    DsFactor,
    /// Target bit depth for the crush stage
    BitDepth,
    /// Crush strategy choice
    CrushMethod,
    /// Global switch for the bitmask stage
    MasksEnabled,
    /// Clear bit N (0..31) of every sample
    ///
    /// Build it with [`ParamId::mask`]; a bit outside `0..NUM_MASK_BITS`
    /// names no parameter.
    Mask(u8),
}

impl ParamId {
    /// Mask parameter for `bit`, or `None` past the last bit
    pub fn mask(bit: u8) -> Option<Self> {
        ((bit as usize) < NUM_MASK_BITS).then_some(ParamId::Mask(bit))
    }

    /// Whether this id names an existing parameter
    pub fn is_valid(self) -> bool {
        match self {
            ParamId::Mask(bit) => (bit as usize) < NUM_MASK_BITS,
            _ => true,
        }
    }

    /// Storage index of this parameter (0..PARAM_COUNT)
    ///
    /// # Panics
    /// If the id is a mask bit past `NUM_MASK_BITS`
    pub fn index(self) -> usize {
        match self {
            ParamId::Mix => 0,
            ParamId::DsFactor => 1,
            ParamId::BitDepth => 2,
            ParamId::CrushMethod => 3,
            ParamId::MasksEnabled => 4,
            ParamId::Mask(bit) => {
                assert!(self.is_valid(), "mask bit {} out of range", bit);
                5 + bit as usize
            }
        }
    }

    /// Inverse of [`ParamId::index`]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ParamId::Mix),
            1 => Some(ParamId::DsFactor),
            2 => Some(ParamId::BitDepth),
            3 => Some(ParamId::CrushMethod),
            4 => Some(ParamId::MasksEnabled),
            i if i < PARAM_COUNT => Some(ParamId::Mask((i - 5) as u8)),
            _ => None,
        }
    }

    /// Iterate over every parameter in storage order
    pub fn all() -> impl Iterator<Item = ParamId> {
        (0..PARAM_COUNT).filter_map(ParamId::from_index)
    }

    /// Stable string id used by hosts, presets and the CLI
    ///
    /// # Panics
    /// If the id is a mask bit past `NUM_MASK_BITS`
    pub fn key(self) -> &'static str {
        match self {
            ParamId::Mix => "Mix",
            ParamId::DsFactor => "dsFactor",
            ParamId::BitDepth => "bitDepth",
            ParamId::CrushMethod => "crushMethod",
            ParamId::MasksEnabled => "masksEnabled",
            ParamId::Mask(bit) => MASK_KEYS[bit as usize],
        }
    }

    /// Parse a string id (case-insensitive)
    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        ParamId::all().find(|id| id.key().eq_ignore_ascii_case(key))
    }

    /// Full descriptor for this parameter
    pub fn descriptor(self) -> ParamDescriptor {
        let (name, kind) = match self {
            ParamId::Mix => (
                "Mix",
                ParamKind::Float {
                    min: -1.0,
                    max: 1.0,
                    default: 1.0,
                },
            ),
            ParamId::DsFactor => (
                "Downsample Factor",
                ParamKind::Int {
                    min: 1,
                    max: 16,
                    default: 1,
                },
            ),
            ParamId::BitDepth => (
                "Bit-Depth",
                ParamKind::Int {
                    min: 2,
                    max: 24,
                    default: 24,
                },
            ),
            ParamId::CrushMethod => (
                "Bitcrush Method",
                ParamKind::Choice {
                    labels: CRUSH_METHOD_LABELS,
                    default: 0,
                },
            ),
            ParamId::MasksEnabled => ("Masks Enabled", ParamKind::Bool { default: true }),
            ParamId::Mask(bit) => (
                MASK_NAMES[bit as usize],
                ParamKind::Bool { default: false },
            ),
        };

        ParamDescriptor {
            id: self,
            key: self.key(),
            name,
            kind,
        }
    }
}

// ============================================================================
// Parameter Kind
// ============================================================================

/// Semantic type and domain of a parameter
///
/// Every kind is stored as a plain `f32`. Integer, boolean and choice values
/// are always committed as whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamKind {
    /// Continuous value in `[min, max]`
    Float { min: f32, max: f32, default: f32 },
    /// Whole number in `[min, max]`
    Int { min: i32, max: i32, default: i32 },
    /// On/off switch, stored as 0 or 1
    Bool { default: bool },
    /// Index into an ordered label list
    Choice {
        labels: &'static [&'static str],
        default: usize,
    },
}

impl ParamKind {
    /// Lower bound of the plain value
    pub fn min(&self) -> f32 {
        match self {
            ParamKind::Float { min, .. } => *min,
            ParamKind::Int { min, .. } => *min as f32,
            ParamKind::Bool { .. } | ParamKind::Choice { .. } => 0.0,
        }
    }

    /// Upper bound of the plain value
    pub fn max(&self) -> f32 {
        match self {
            ParamKind::Float { max, .. } => *max,
            ParamKind::Int { max, .. } => *max as f32,
            ParamKind::Bool { .. } => 1.0,
            ParamKind::Choice { labels, .. } => labels.len().saturating_sub(1) as f32,
        }
    }

    /// Default plain value
    pub fn default_value(&self) -> f32 {
        match self {
            ParamKind::Float { default, .. } => *default,
            ParamKind::Int { default, .. } => *default as f32,
            ParamKind::Bool { default } => {
                if *default {
                    1.0
                } else {
                    0.0
                }
            }
            ParamKind::Choice { default, .. } => *default as f32,
        }
    }

    /// Number of discrete steps (0 = continuous)
    pub fn step_count(&self) -> usize {
        match self {
            ParamKind::Float { .. } => 0,
            ParamKind::Int { min, max, .. } => (max - min).max(0) as usize,
            ParamKind::Bool { .. } => 1,
            ParamKind::Choice { labels, .. } => labels.len().saturating_sub(1),
        }
    }

    /// Bring an arbitrary value into this parameter's domain
    ///
    /// NaN falls back to the default; infinities clamp to the nearest bound;
    /// discrete kinds round to the nearest whole value. Booleans commit 1 for
    /// anything at or above 0.5.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default_value();
        }

        match self {
            ParamKind::Float { min, max, .. } => value.clamp(*min, *max),
            ParamKind::Bool { .. } => {
                if value >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            ParamKind::Int { .. } | ParamKind::Choice { .. } => {
                value.round().clamp(self.min(), self.max())
            }
        }
    }

    /// Map a plain value to the normalized `[0, 1]` range
    pub fn to_normalized(&self, plain: f32) -> f32 {
        let range = self.max() - self.min();
        if range <= 0.0 {
            return 0.0;
        }
        ((self.clamp(plain) - self.min()) / range).clamp(0.0, 1.0)
    }

    /// Map a normalized `[0, 1]` value to a clamped plain value
    pub fn from_normalized(&self, normalized: f32) -> f32 {
        if normalized.is_nan() {
            return self.default_value();
        }
        let normalized = normalized.clamp(0.0, 1.0);
        self.clamp(self.min() + normalized * (self.max() - self.min()))
    }

    /// Format a plain value for display
    pub fn format(&self, plain: f32) -> String {
        let plain = self.clamp(plain);
        match self {
            ParamKind::Float { .. } => format!("{:.2}", plain),
            ParamKind::Int { .. } => format!("{}", plain as i32),
            ParamKind::Bool { .. } => {
                if plain >= 0.5 {
                    "On".to_string()
                } else {
                    "Off".to_string()
                }
            }
            ParamKind::Choice { labels, .. } => labels
                .get(plain as usize)
                .map(|label| label.to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse display text into a plain value
    ///
    /// Accepts numbers for every kind, `on`/`off`/`true`/`false` for
    /// switches and labels (case-insensitive) for choices.
    pub fn parse(&self, text: &str) -> Option<f32> {
        let text = text.trim();
        if let Ok(number) = text.parse::<f32>() {
            return Some(self.clamp(number));
        }

        match self {
            ParamKind::Bool { .. } => match text.to_ascii_lowercase().as_str() {
                "on" | "true" | "yes" => Some(1.0),
                "off" | "false" | "no" => Some(0.0),
                _ => None,
            },
            ParamKind::Choice { labels, .. } => labels
                .iter()
                .position(|label| label.eq_ignore_ascii_case(text))
                .map(|index| index as f32),
            ParamKind::Float { .. } | ParamKind::Int { .. } => None,
        }
    }
}

// ============================================================================
// Parameter Descriptor
// ============================================================================

/// `{id, display name, kind, domain, default}` entry of the parameter surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamDescriptor {
    #[serde(skip)]
    pub id: ParamId,
    /// Stable string id
    #[serde(rename = "id")]
    pub key: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Type and domain
    #[serde(flatten)]
    pub kind: ParamKind,
}

/// Every parameter descriptor in storage order
pub fn descriptors() -> impl Iterator<Item = ParamDescriptor> {
    ParamId::all().map(ParamId::descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_index_round_trip() {
        for index in 0..PARAM_COUNT {
            let id = ParamId::from_index(index).unwrap();
            assert_eq!(id.index(), index);
        }
        assert_eq!(ParamId::from_index(PARAM_COUNT), None);
        assert_eq!(ParamId::all().count(), PARAM_COUNT);
    }

    #[test]
    fn test_surface_order() {
        let keys: Vec<&str> = descriptors().map(|d| d.key).take(6).collect();
        assert_eq!(
            keys,
            vec!["Mix", "dsFactor", "bitDepth", "crushMethod", "masksEnabled", "mask0"]
        );
        assert_eq!(ParamId::Mask(31).key(), "mask31");
        assert_eq!(ParamId::Mask(31).index(), PARAM_COUNT - 1);
    }

    #[test]
    fn test_checked_mask_constructor() {
        assert_eq!(ParamId::mask(0), Some(ParamId::Mask(0)));
        assert_eq!(ParamId::mask(31), Some(ParamId::Mask(31)));
        assert_eq!(ParamId::mask(32), None);
        assert_eq!(ParamId::mask(40), None);
        assert!(!ParamId::Mask(40).is_valid());
        assert!(ParamId::all().all(ParamId::is_valid));
    }

    #[test]
    #[should_panic(expected = "mask bit 40 out of range")]
    fn test_invalid_mask_has_no_index() {
        ParamId::Mask(40).index();
    }

    #[test_case("Mix", ParamId::Mix; "exact")]
    #[test_case("mix", ParamId::Mix; "lowercase")]
    #[test_case("DSFACTOR", ParamId::DsFactor; "uppercase")]
    #[test_case(" bitDepth ", ParamId::BitDepth; "padded")]
    #[test_case("mask17", ParamId::Mask(17); "mask")]
    fn test_parse_key(key: &str, expected: ParamId) {
        assert_eq!(ParamId::parse(key), Some(expected));
    }

    #[test]
    fn test_parse_unknown_key() {
        assert_eq!(ParamId::parse("mask32"), None);
        assert_eq!(ParamId::parse("drive"), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ParamId::Mix.descriptor().kind.default_value(), 1.0);
        assert_eq!(ParamId::DsFactor.descriptor().kind.default_value(), 1.0);
        assert_eq!(ParamId::BitDepth.descriptor().kind.default_value(), 24.0);
        assert_eq!(ParamId::CrushMethod.descriptor().kind.default_value(), 0.0);
        assert_eq!(ParamId::MasksEnabled.descriptor().kind.default_value(), 1.0);
        assert_eq!(ParamId::Mask(3).descriptor().kind.default_value(), 0.0);
    }

    #[test_case(ParamId::Mix, 3.0, 1.0; "float above")]
    #[test_case(ParamId::Mix, -7.5, -1.0; "float below")]
    #[test_case(ParamId::Mix, 0.25, 0.25; "float inside")]
    #[test_case(ParamId::DsFactor, 0.0, 1.0; "int zero")]
    #[test_case(ParamId::DsFactor, -4.0, 1.0; "int negative")]
    #[test_case(ParamId::DsFactor, 3.6, 4.0; "int rounds")]
    #[test_case(ParamId::BitDepth, 99.0, 24.0; "int above")]
    #[test_case(ParamId::BitDepth, 1.0, 2.0; "int below")]
    #[test_case(ParamId::CrushMethod, 5.0, 1.0; "choice above")]
    #[test_case(ParamId::MasksEnabled, 0.7, 1.0; "bool high")]
    #[test_case(ParamId::MasksEnabled, 0.2, 0.0; "bool low")]
    fn test_clamp(id: ParamId, value: f32, expected: f32) {
        assert_eq!(id.descriptor().kind.clamp(value), expected);
    }

    #[test]
    fn test_clamp_non_finite() {
        let mix = ParamId::Mix.descriptor().kind;
        assert_eq!(mix.clamp(f32::NAN), 1.0);
        assert_eq!(mix.clamp(f32::INFINITY), 1.0);
        assert_eq!(mix.clamp(f32::NEG_INFINITY), -1.0);

        let depth = ParamId::BitDepth.descriptor().kind;
        assert_eq!(depth.clamp(f32::NAN), 24.0);
        assert_eq!(depth.clamp(f32::NEG_INFINITY), 2.0);
    }

    #[test]
    fn test_normalized_int_round_trip() {
        let kind = ParamId::DsFactor.descriptor().kind;
        for factor in 1..=16 {
            let normalized = kind.to_normalized(factor as f32);
            assert_eq!(kind.from_normalized(normalized), factor as f32);
        }
    }

    #[test]
    fn test_normalized_bounds() {
        let kind = ParamId::Mix.descriptor().kind;
        assert_eq!(kind.to_normalized(-1.0), 0.0);
        assert_eq!(kind.to_normalized(1.0), 1.0);
        assert_eq!(kind.from_normalized(0.5), 0.0);
        assert_eq!(kind.from_normalized(2.0), 1.0);
        assert_eq!(kind.from_normalized(f32::NAN), 1.0);
    }

    #[test]
    fn test_format() {
        assert_eq!(ParamId::Mix.descriptor().kind.format(-0.5), "-0.50");
        assert_eq!(ParamId::BitDepth.descriptor().kind.format(8.0), "8");
        assert_eq!(ParamId::CrushMethod.descriptor().kind.format(0.0), "QL");
        assert_eq!(ParamId::CrushMethod.descriptor().kind.format(1.0), "Bit-Shift");
        assert_eq!(ParamId::Mask(0).descriptor().kind.format(1.0), "On");
    }

    #[test]
    fn test_parse_text() {
        let method = ParamId::CrushMethod.descriptor().kind;
        assert_eq!(method.parse("bit-shift"), Some(1.0));
        assert_eq!(method.parse("QL"), Some(0.0));
        assert_eq!(method.parse("1"), Some(1.0));
        assert_eq!(method.parse("saw"), None);

        let switch = ParamId::Mask(2).descriptor().kind;
        assert_eq!(switch.parse("on"), Some(1.0));
        assert_eq!(switch.parse("Off"), Some(0.0));

        let depth = ParamId::BitDepth.descriptor().kind;
        assert_eq!(depth.parse("40"), Some(24.0));
        assert_eq!(depth.parse("eight"), None);
    }

    #[test]
    fn test_descriptor_json() {
        let json = serde_json::to_value(ParamId::CrushMethod.descriptor()).unwrap();
        assert_eq!(json["id"], "crushMethod");
        assert_eq!(json["kind"], "choice");
        assert_eq!(json["labels"][1], "Bit-Shift");
    }
}
