//! Editable properties.
//!
//! Each section that accepts `--set`, `--add` and `--delete` style changes
//! has a table of [`PropertyDefinition`]s mapping a user-facing name to the
//! element it edits and to the masters that element lives in below the
//! target's own master.

use crate::element::ScalarValue;
use crate::error::PropEditError;
use crate::schema::*;

/// A section that holds editable properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    SegmentInfo,
    Track,
}

impl Section {
    /// Name used in diagnostics.
    pub fn title(self) -> &'static str {
        match self {
            Section::SegmentInfo => "Segment information",
            Section::Track => "Track headers",
        }
    }

    /// All properties of this section.
    pub fn properties(self) -> &'static [PropertyDefinition] {
        match self {
            Section::SegmentInfo => SEGMENT_INFO_PROPERTIES,
            Section::Track => TRACK_PROPERTIES,
        }
    }

    /// Look up a property by its (case-insensitive) name.
    pub fn lookup(self, name: &str) -> Result<&'static PropertyDefinition, PropEditError> {
        let lowered = name.trim().to_ascii_lowercase();
        self.properties()
            .iter()
            .find(|property| property.name == lowered)
            .ok_or_else(|| PropEditError::UnknownProperty {
                name: name.to_string(),
                section: self.title(),
            })
    }
}

/// How a property's textual value is converted into an element value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Unsigned,
    Signed,
    Float,
    /// Stored as an unsigned `0`/`1`.
    Boolean,
    /// Printable ASCII.
    String,
    Utf8,
    /// Hex encoded; `Some(n)` requires exactly `n` bytes.
    Binary(Option<usize>),
}

/// Type-specific master a track property lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubMaster {
    Video,
    Audio,
}

impl SubMaster {
    pub fn element_id(self) -> u32 {
        match self {
            SubMaster::Video => VIDEO,
            SubMaster::Audio => AUDIO,
        }
    }

    /// Track type value that owns this sub-master.
    pub fn track_type(self) -> u64 {
        match self {
            SubMaster::Video => TRACK_TYPE_VIDEO,
            SubMaster::Audio => TRACK_TYPE_AUDIO,
        }
    }

    /// The sub-master matching a track type, if that type has one.
    pub fn for_track_type(track_type: u64) -> Option<SubMaster> {
        match track_type {
            TRACK_TYPE_VIDEO => Some(SubMaster::Video),
            TRACK_TYPE_AUDIO => Some(SubMaster::Audio),
            _ => None,
        }
    }
}

/// One editable property.
#[derive(Debug)]
pub struct PropertyDefinition {
    /// Name as used on the command line, e.g. `flag-default`.
    pub name: &'static str,
    /// Short description for listings.
    pub title: &'static str,
    /// Element the property edits.
    pub id: u32,
    pub kind: PropertyKind,
    pub sub_master: Option<SubMaster>,
    /// Master below the sub-master, e.g. `Colour`.
    pub sub_sub_master: Option<u32>,
    /// Master below the sub-sub-master, e.g. `MasteringMetadata`.
    pub sub_sub_sub_master: Option<u32>,
}

impl PropertyDefinition {
    const fn new(name: &'static str, title: &'static str, id: u32, kind: PropertyKind) -> Self {
        Self {
            name,
            title,
            id,
            kind,
            sub_master: None,
            sub_sub_master: None,
            sub_sub_sub_master: None,
        }
    }

    const fn video(mut self) -> Self {
        self.sub_master = Some(SubMaster::Video);
        self
    }

    const fn audio(mut self) -> Self {
        self.sub_master = Some(SubMaster::Audio);
        self
    }

    const fn colour(mut self) -> Self {
        self.sub_master = Some(SubMaster::Video);
        self.sub_sub_master = Some(COLOUR);
        self
    }

    const fn mastering(mut self) -> Self {
        self.sub_master = Some(SubMaster::Video);
        self.sub_sub_master = Some(COLOUR);
        self.sub_sub_sub_master = Some(MASTERING_METADATA);
        self
    }

    /// Convert the textual value given by the user.
    pub fn parse_value(&self, raw: &str) -> Result<ScalarValue, PropEditError> {
        let invalid = |reason: &str| PropEditError::InvalidPropertyValue {
            property: self.name,
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        match self.kind {
            PropertyKind::Unsigned => raw
                .trim()
                .parse::<u64>()
                .map(ScalarValue::Unsigned)
                .map_err(|_| invalid("not an unsigned integer")),
            PropertyKind::Signed => raw
                .trim()
                .parse::<i64>()
                .map(ScalarValue::Signed)
                .map_err(|_| invalid("not a signed integer")),
            PropertyKind::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(ScalarValue::Float)
                .ok_or_else(|| invalid("not a floating point number")),
            PropertyKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => Ok(ScalarValue::Unsigned(1)),
                "0" | "false" | "no" => Ok(ScalarValue::Unsigned(0)),
                _ => Err(invalid("not a boolean (0, 1, true, false, yes, no)")),
            },
            PropertyKind::String => {
                if raw.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
                    Ok(ScalarValue::String(raw.to_string()))
                } else {
                    Err(invalid("only printable ASCII characters are allowed"))
                }
            }
            PropertyKind::Utf8 => Ok(ScalarValue::String(raw.to_string())),
            PropertyKind::Binary(length) => {
                let bytes = parse_hex(raw).ok_or_else(|| invalid("not a hexadecimal byte string"))?;
                match length {
                    Some(expected) if bytes.len() != expected => {
                        Err(invalid(&format!("exactly {expected} bytes are required")))
                    }
                    _ => Ok(ScalarValue::Binary(bytes)),
                }
            }
        }
    }
}

/// Parse hex digits with optional `0x` prefixes and whitespace.
fn parse_hex(raw: &str) -> Option<Vec<u8>> {
    let digits: String = raw
        .split_whitespace()
        .map(|chunk| {
            chunk
                .strip_prefix("0x")
                .or_else(|| chunk.strip_prefix("0X"))
                .unwrap_or(chunk)
        })
        .collect();

    if digits.is_empty() || digits.len() % 2 != 0 {
        return None;
    }

    (0..digits.len())
        .step_by(2)
        .map(|index| u8::from_str_radix(digits.get(index..index + 2)?, 16).ok())
        .collect()
}

use PropertyKind::{Binary, Boolean, Float, Unsigned, Utf8};

static SEGMENT_INFO_PROPERTIES: &[PropertyDefinition] = &[
    PropertyDefinition::new("title", "Title", TITLE, Utf8),
    PropertyDefinition::new("segment-filename", "Segment filename", SEGMENT_FILENAME, Utf8),
    PropertyDefinition::new("prev-filename", "Previous filename", PREV_FILENAME, Utf8),
    PropertyDefinition::new("next-filename", "Next filename", NEXT_FILENAME, Utf8),
    PropertyDefinition::new("segment-uid", "Segment unique ID", SEGMENT_UID, Binary(Some(16))),
    PropertyDefinition::new("prev-uid", "Previous segment's unique ID", PREV_UID, Binary(Some(16))),
    PropertyDefinition::new("next-uid", "Next segment's unique ID", NEXT_UID, Binary(Some(16))),
    PropertyDefinition::new("muxing-application", "Multiplexing application", MUXING_APP, Utf8),
    PropertyDefinition::new("writing-application", "Writing application", WRITING_APP, Utf8),
];

static TRACK_PROPERTIES: &[PropertyDefinition] = &[
    PropertyDefinition::new("track-number", "Track number", TRACK_NUMBER, Unsigned),
    PropertyDefinition::new("track-uid", "Track UID", TRACK_UID, Unsigned),
    PropertyDefinition::new("flag-enabled", "\"Enabled\" flag", FLAG_ENABLED, Boolean),
    PropertyDefinition::new("flag-default", "\"Default track\" flag", FLAG_DEFAULT, Boolean),
    PropertyDefinition::new("flag-forced", "\"Forced display\" flag", FLAG_FORCED, Boolean),
    PropertyDefinition::new("flag-hearing-impaired", "\"Hearing impaired\" flag", FLAG_HEARING_IMPAIRED, Boolean),
    PropertyDefinition::new("flag-visual-impaired", "\"Visual impaired\" flag", FLAG_VISUAL_IMPAIRED, Boolean),
    PropertyDefinition::new("flag-text-descriptions", "\"Text descriptions\" flag", FLAG_TEXT_DESCRIPTIONS, Boolean),
    PropertyDefinition::new("flag-original", "\"Original language\" flag", FLAG_ORIGINAL, Boolean),
    PropertyDefinition::new("flag-commentary", "\"Commentary\" flag", FLAG_COMMENTARY, Boolean),
    PropertyDefinition::new("default-duration", "Default duration", DEFAULT_DURATION, Unsigned),
    PropertyDefinition::new("name", "Name", NAME, Utf8),
    PropertyDefinition::new("language", "Language", LANGUAGE, PropertyKind::String),
    PropertyDefinition::new("language-ietf", "Language (IETF BCP 47)", LANGUAGE_IETF, PropertyKind::String),
    PropertyDefinition::new("codec-name", "Codec name", CODEC_NAME, Utf8),
    PropertyDefinition::new("codec-delay", "Codec-inherent delay", CODEC_DELAY, Unsigned),
    PropertyDefinition::new("seek-pre-roll", "Seek pre-roll", SEEK_PRE_ROLL, Unsigned),
    PropertyDefinition::new("interlaced", "Video interlaced flag", FLAG_INTERLACED, Unsigned).video(),
    PropertyDefinition::new("stereo-mode", "Video stereo mode", STEREO_MODE, Unsigned).video(),
    PropertyDefinition::new("pixel-width", "Video pixel width", PIXEL_WIDTH, Unsigned).video(),
    PropertyDefinition::new("pixel-height", "Video pixel height", PIXEL_HEIGHT, Unsigned).video(),
    PropertyDefinition::new("pixel-crop-bottom", "Video pixel crop bottom", PIXEL_CROP_BOTTOM, Unsigned).video(),
    PropertyDefinition::new("pixel-crop-top", "Video pixel crop top", PIXEL_CROP_TOP, Unsigned).video(),
    PropertyDefinition::new("pixel-crop-left", "Video pixel crop left", PIXEL_CROP_LEFT, Unsigned).video(),
    PropertyDefinition::new("pixel-crop-right", "Video pixel crop right", PIXEL_CROP_RIGHT, Unsigned).video(),
    PropertyDefinition::new("display-width", "Video display width", DISPLAY_WIDTH, Unsigned).video(),
    PropertyDefinition::new("display-height", "Video display height", DISPLAY_HEIGHT, Unsigned).video(),
    PropertyDefinition::new("display-unit", "Video display unit", DISPLAY_UNIT, Unsigned).video(),
    PropertyDefinition::new("colour-matrix-coefficients", "Video: colour matrix coefficients", MATRIX_COEFFICIENTS, Unsigned).colour(),
    PropertyDefinition::new("colour-bits-per-channel", "Video: bits per colour channel", BITS_PER_CHANNEL, Unsigned).colour(),
    PropertyDefinition::new("colour-range", "Video: colour range", RANGE, Unsigned).colour(),
    PropertyDefinition::new("colour-transfer-characteristics", "Video: transfer characteristics", TRANSFER_CHARACTERISTICS, Unsigned).colour(),
    PropertyDefinition::new("colour-primaries", "Video: colour primaries", PRIMARIES, Unsigned).colour(),
    PropertyDefinition::new("max-content-light", "Video: maximum content light", MAX_CLL, Unsigned).colour(),
    PropertyDefinition::new("max-frame-light", "Video: maximum frame light", MAX_FALL, Unsigned).colour(),
    PropertyDefinition::new("white-coordinates-x", "Video: white colour chromaticity x", WHITE_POINT_CHROMATICITY_X, Float).mastering(),
    PropertyDefinition::new("white-coordinates-y", "Video: white colour chromaticity y", WHITE_POINT_CHROMATICITY_Y, Float).mastering(),
    PropertyDefinition::new("max-luminance", "Video: maximum luminance", LUMINANCE_MAX, Float).mastering(),
    PropertyDefinition::new("min-luminance", "Video: minimum luminance", LUMINANCE_MIN, Float).mastering(),
    PropertyDefinition::new("sampling-frequency", "Audio sampling frequency", SAMPLING_FREQUENCY, Float).audio(),
    PropertyDefinition::new("output-sampling-frequency", "Audio output sampling frequency", OUTPUT_SAMPLING_FREQUENCY, Float).audio(),
    PropertyDefinition::new("channels", "Audio channels", CHANNELS, Unsigned).audio(),
    PropertyDefinition::new("bit-depth", "Audio bit depth", BIT_DEPTH, Unsigned).audio(),
];
