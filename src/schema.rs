//! Matroska element IDs and the subset of the element schema the editor
//! needs: names for diagnostics, value kinds, and default values used to
//! decide whether a master only holds defaults.

use crate::element::ScalarValue;

// =============================================================================
// Top-level elements
// =============================================================================

/// Segment Info.
pub const INFO: u32 = 0x1549A966;
/// Tracks.
pub const TRACKS: u32 = 0x1654AE6B;
/// Tags.
pub const TAGS: u32 = 0x1254C367;
/// Chapters.
pub const CHAPTERS: u32 = 0x1043A770;
/// Attachments.
pub const ATTACHMENTS: u32 = 0x1941A469;

// =============================================================================
// Segment Information
// =============================================================================

/// Segment UID.
pub const SEGMENT_UID: u32 = 0x73A4;
/// Segment Filename.
pub const SEGMENT_FILENAME: u32 = 0x7384;
/// Previous UID.
pub const PREV_UID: u32 = 0x3CB923;
/// Previous Filename.
pub const PREV_FILENAME: u32 = 0x3C83AB;
/// Next UID.
pub const NEXT_UID: u32 = 0x3EB923;
/// Next Filename.
pub const NEXT_FILENAME: u32 = 0x3E83BB;
/// Timestamp Scale.
pub const TIMESTAMP_SCALE: u32 = 0x2AD7B1;
/// Duration.
pub const DURATION: u32 = 0x4489;
/// Title.
pub const TITLE: u32 = 0x7BA9;
/// Muxing App.
pub const MUXING_APP: u32 = 0x4D80;
/// Writing App.
pub const WRITING_APP: u32 = 0x5741;

// =============================================================================
// Track Elements
// =============================================================================

/// Track Entry.
pub const TRACK_ENTRY: u32 = 0xAE;
/// Track Number.
pub const TRACK_NUMBER: u32 = 0xD7;
/// Track UID.
pub const TRACK_UID: u32 = 0x73C5;
/// Track Type.
pub const TRACK_TYPE: u32 = 0x83;
/// Flag Enabled.
pub const FLAG_ENABLED: u32 = 0xB9;
/// Flag Default.
pub const FLAG_DEFAULT: u32 = 0x88;
/// Flag Forced.
pub const FLAG_FORCED: u32 = 0x55AA;
/// Flag Hearing Impaired.
pub const FLAG_HEARING_IMPAIRED: u32 = 0x55AB;
/// Flag Visual Impaired.
pub const FLAG_VISUAL_IMPAIRED: u32 = 0x55AC;
/// Flag Text Descriptions.
pub const FLAG_TEXT_DESCRIPTIONS: u32 = 0x55AD;
/// Flag Original.
pub const FLAG_ORIGINAL: u32 = 0x55AE;
/// Flag Commentary.
pub const FLAG_COMMENTARY: u32 = 0x55AF;
/// Flag Lacing.
pub const FLAG_LACING: u32 = 0x9C;
/// Default Duration.
pub const DEFAULT_DURATION: u32 = 0x23E383;
/// Name.
pub const NAME: u32 = 0x536E;
/// Language.
pub const LANGUAGE: u32 = 0x22B59C;
/// Language (IETF BCP 47).
pub const LANGUAGE_IETF: u32 = 0x22B59D;
/// Codec ID.
pub const CODEC_ID: u32 = 0x86;
/// Codec Name.
pub const CODEC_NAME: u32 = 0x258688;
/// Codec Delay.
pub const CODEC_DELAY: u32 = 0x56AA;
/// Seek Pre-Roll.
pub const SEEK_PRE_ROLL: u32 = 0x56BB;

/// Video settings.
pub const VIDEO: u32 = 0xE0;
/// Flag Interlaced.
pub const FLAG_INTERLACED: u32 = 0x9A;
/// Stereo Mode.
pub const STEREO_MODE: u32 = 0x53B8;
/// Pixel Width.
pub const PIXEL_WIDTH: u32 = 0xB0;
/// Pixel Height.
pub const PIXEL_HEIGHT: u32 = 0xBA;
/// Pixel Crop Bottom.
pub const PIXEL_CROP_BOTTOM: u32 = 0x54AA;
/// Pixel Crop Top.
pub const PIXEL_CROP_TOP: u32 = 0x54BB;
/// Pixel Crop Left.
pub const PIXEL_CROP_LEFT: u32 = 0x54CC;
/// Pixel Crop Right.
pub const PIXEL_CROP_RIGHT: u32 = 0x54DD;
/// Display Width.
pub const DISPLAY_WIDTH: u32 = 0x54B0;
/// Display Height.
pub const DISPLAY_HEIGHT: u32 = 0x54BA;
/// Display Unit.
pub const DISPLAY_UNIT: u32 = 0x54B2;

/// Colour.
pub const COLOUR: u32 = 0x55B0;
/// Matrix Coefficients.
pub const MATRIX_COEFFICIENTS: u32 = 0x55B1;
/// Bits Per Channel.
pub const BITS_PER_CHANNEL: u32 = 0x55B2;
/// Range.
pub const RANGE: u32 = 0x55B9;
/// Transfer Characteristics.
pub const TRANSFER_CHARACTERISTICS: u32 = 0x55BA;
/// Primaries.
pub const PRIMARIES: u32 = 0x55BB;
/// Max CLL.
pub const MAX_CLL: u32 = 0x55BC;
/// Max FALL.
pub const MAX_FALL: u32 = 0x55BD;

/// Mastering Metadata.
pub const MASTERING_METADATA: u32 = 0x55D0;
/// White Point Chromaticity X.
pub const WHITE_POINT_CHROMATICITY_X: u32 = 0x55D7;
/// White Point Chromaticity Y.
pub const WHITE_POINT_CHROMATICITY_Y: u32 = 0x55D8;
/// Luminance Max.
pub const LUMINANCE_MAX: u32 = 0x55D9;
/// Luminance Min.
pub const LUMINANCE_MIN: u32 = 0x55DA;

/// Audio settings.
pub const AUDIO: u32 = 0xE1;
/// Sampling Frequency.
pub const SAMPLING_FREQUENCY: u32 = 0xB5;
/// Output Sampling Frequency.
pub const OUTPUT_SAMPLING_FREQUENCY: u32 = 0x78B5;
/// Channels.
pub const CHANNELS: u32 = 0x9F;
/// Bit Depth.
pub const BIT_DEPTH: u32 = 0x6264;

// =============================================================================
// Attachments
// =============================================================================

/// Attached File.
pub const ATTACHED_FILE: u32 = 0x61A7;
/// File Description.
pub const FILE_DESCRIPTION: u32 = 0x467E;
/// File Name.
pub const FILE_NAME: u32 = 0x466E;
/// File MIME Type.
pub const FILE_MIME_TYPE: u32 = 0x4660;
/// File Data.
pub const FILE_DATA: u32 = 0x465C;
/// File UID.
pub const FILE_UID: u32 = 0x46AE;

// =============================================================================
// Track types
// =============================================================================

/// Track type: video.
pub const TRACK_TYPE_VIDEO: u64 = 1;
/// Track type: audio.
pub const TRACK_TYPE_AUDIO: u64 = 2;
/// Track type: subtitle.
pub const TRACK_TYPE_SUBTITLE: u64 = 0x11;
/// Track type: buttons.
pub const TRACK_TYPE_BUTTONS: u64 = 0x12;

/// The value kind of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Master,
    Unsigned,
    Signed,
    Float,
    /// Printable ASCII string.
    String,
    Utf8,
    Binary,
}

/// Default value of a scalar element, comparable against a [`ScalarValue`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Unsigned(u64),
    Float(f64),
    Str(&'static str),
}

impl DefaultValue {
    /// Returns `true` if `value` equals this default.
    pub fn matches(&self, value: &ScalarValue) -> bool {
        match (self, value) {
            (DefaultValue::Unsigned(a), ScalarValue::Unsigned(b)) => a == b,
            (DefaultValue::Float(a), ScalarValue::Float(b)) => a == b,
            (DefaultValue::Str(a), ScalarValue::String(b)) => *a == b,
            _ => false,
        }
    }
}

/// Static description of one element.
#[derive(Debug, Clone, Copy)]
pub struct ElementDefinition {
    pub id: u32,
    pub name: &'static str,
    pub kind: ValueKind,
    pub default: Option<DefaultValue>,
}

const fn master(id: u32, name: &'static str) -> ElementDefinition {
    ElementDefinition { id, name, kind: ValueKind::Master, default: None }
}

const fn scalar(id: u32, name: &'static str, kind: ValueKind) -> ElementDefinition {
    ElementDefinition { id, name, kind, default: None }
}

const fn uint_default(id: u32, name: &'static str, default: u64) -> ElementDefinition {
    ElementDefinition {
        id,
        name,
        kind: ValueKind::Unsigned,
        default: Some(DefaultValue::Unsigned(default)),
    }
}

const fn float_default(id: u32, name: &'static str, default: f64) -> ElementDefinition {
    ElementDefinition {
        id,
        name,
        kind: ValueKind::Float,
        default: Some(DefaultValue::Float(default)),
    }
}

static DEFINITIONS: &[ElementDefinition] = &[
    master(INFO, "Info"),
    master(TRACKS, "Tracks"),
    master(TAGS, "Tags"),
    master(CHAPTERS, "Chapters"),
    master(ATTACHMENTS, "Attachments"),
    // Segment information
    scalar(SEGMENT_UID, "SegmentUID", ValueKind::Binary),
    scalar(SEGMENT_FILENAME, "SegmentFilename", ValueKind::Utf8),
    scalar(PREV_UID, "PrevUID", ValueKind::Binary),
    scalar(PREV_FILENAME, "PrevFilename", ValueKind::Utf8),
    scalar(NEXT_UID, "NextUID", ValueKind::Binary),
    scalar(NEXT_FILENAME, "NextFilename", ValueKind::Utf8),
    uint_default(TIMESTAMP_SCALE, "TimestampScale", 1_000_000),
    scalar(DURATION, "Duration", ValueKind::Float),
    scalar(TITLE, "Title", ValueKind::Utf8),
    scalar(MUXING_APP, "MuxingApp", ValueKind::Utf8),
    scalar(WRITING_APP, "WritingApp", ValueKind::Utf8),
    // Track entry
    master(TRACK_ENTRY, "TrackEntry"),
    scalar(TRACK_NUMBER, "TrackNumber", ValueKind::Unsigned),
    scalar(TRACK_UID, "TrackUID", ValueKind::Unsigned),
    scalar(TRACK_TYPE, "TrackType", ValueKind::Unsigned),
    uint_default(FLAG_ENABLED, "FlagEnabled", 1),
    uint_default(FLAG_DEFAULT, "FlagDefault", 1),
    uint_default(FLAG_FORCED, "FlagForced", 0),
    scalar(FLAG_HEARING_IMPAIRED, "FlagHearingImpaired", ValueKind::Unsigned),
    scalar(FLAG_VISUAL_IMPAIRED, "FlagVisualImpaired", ValueKind::Unsigned),
    scalar(FLAG_TEXT_DESCRIPTIONS, "FlagTextDescriptions", ValueKind::Unsigned),
    scalar(FLAG_ORIGINAL, "FlagOriginal", ValueKind::Unsigned),
    scalar(FLAG_COMMENTARY, "FlagCommentary", ValueKind::Unsigned),
    uint_default(FLAG_LACING, "FlagLacing", 1),
    scalar(DEFAULT_DURATION, "DefaultDuration", ValueKind::Unsigned),
    scalar(NAME, "Name", ValueKind::Utf8),
    ElementDefinition {
        id: LANGUAGE,
        name: "Language",
        kind: ValueKind::String,
        default: Some(DefaultValue::Str("eng")),
    },
    scalar(LANGUAGE_IETF, "LanguageBCP47", ValueKind::String),
    scalar(CODEC_ID, "CodecID", ValueKind::String),
    scalar(CODEC_NAME, "CodecName", ValueKind::Utf8),
    uint_default(CODEC_DELAY, "CodecDelay", 0),
    uint_default(SEEK_PRE_ROLL, "SeekPreRoll", 0),
    // Video
    master(VIDEO, "Video"),
    uint_default(FLAG_INTERLACED, "FlagInterlaced", 0),
    uint_default(STEREO_MODE, "StereoMode", 0),
    scalar(PIXEL_WIDTH, "PixelWidth", ValueKind::Unsigned),
    scalar(PIXEL_HEIGHT, "PixelHeight", ValueKind::Unsigned),
    uint_default(PIXEL_CROP_BOTTOM, "PixelCropBottom", 0),
    uint_default(PIXEL_CROP_TOP, "PixelCropTop", 0),
    uint_default(PIXEL_CROP_LEFT, "PixelCropLeft", 0),
    uint_default(PIXEL_CROP_RIGHT, "PixelCropRight", 0),
    scalar(DISPLAY_WIDTH, "DisplayWidth", ValueKind::Unsigned),
    scalar(DISPLAY_HEIGHT, "DisplayHeight", ValueKind::Unsigned),
    uint_default(DISPLAY_UNIT, "DisplayUnit", 0),
    // Colour
    master(COLOUR, "Colour"),
    uint_default(MATRIX_COEFFICIENTS, "MatrixCoefficients", 2),
    uint_default(BITS_PER_CHANNEL, "BitsPerChannel", 0),
    uint_default(RANGE, "Range", 0),
    uint_default(TRANSFER_CHARACTERISTICS, "TransferCharacteristics", 2),
    uint_default(PRIMARIES, "Primaries", 2),
    scalar(MAX_CLL, "MaxCLL", ValueKind::Unsigned),
    scalar(MAX_FALL, "MaxFALL", ValueKind::Unsigned),
    // Mastering metadata
    master(MASTERING_METADATA, "MasteringMetadata"),
    scalar(WHITE_POINT_CHROMATICITY_X, "WhitePointChromaticityX", ValueKind::Float),
    scalar(WHITE_POINT_CHROMATICITY_Y, "WhitePointChromaticityY", ValueKind::Float),
    scalar(LUMINANCE_MAX, "LuminanceMax", ValueKind::Float),
    scalar(LUMINANCE_MIN, "LuminanceMin", ValueKind::Float),
    // Audio
    master(AUDIO, "Audio"),
    float_default(SAMPLING_FREQUENCY, "SamplingFrequency", 8000.0),
    scalar(OUTPUT_SAMPLING_FREQUENCY, "OutputSamplingFrequency", ValueKind::Float),
    uint_default(CHANNELS, "Channels", 1),
    scalar(BIT_DEPTH, "BitDepth", ValueKind::Unsigned),
    // Attachments
    master(ATTACHED_FILE, "AttachedFile"),
    scalar(FILE_DESCRIPTION, "FileDescription", ValueKind::Utf8),
    scalar(FILE_NAME, "FileName", ValueKind::Utf8),
    scalar(FILE_MIME_TYPE, "FileMediaType", ValueKind::String),
    scalar(FILE_DATA, "FileData", ValueKind::Binary),
    scalar(FILE_UID, "FileUID", ValueKind::Unsigned),
];

/// Look up the definition of an element ID.
pub fn definition(id: u32) -> Option<&'static ElementDefinition> {
    DEFINITIONS.iter().find(|definition| definition.id == id)
}

/// Name of an element for diagnostics, `"Unknown"` for IDs outside the table.
pub fn element_name(id: u32) -> &'static str {
    definition(id).map_or("Unknown", |definition| definition.name)
}

/// Returns `true` if `value` equals the schema default of element `id`.
///
/// Elements without a default never compare equal.
pub fn is_default_value(id: u32, value: &ScalarValue) -> bool {
    definition(id)
        .and_then(|definition| definition.default)
        .is_some_and(|default| default.matches(value))
}

/// Human readable name of a track type value.
pub fn track_type_name(track_type: u64) -> &'static str {
    match track_type {
        TRACK_TYPE_VIDEO => "video",
        TRACK_TYPE_AUDIO => "audio",
        TRACK_TYPE_SUBTITLE => "subtitle",
        TRACK_TYPE_BUTTONS => "buttons",
        _ => "unknown",
    }
}
