//! Raw chart model and its normalization into playable notes.
//!
//! A chart is a list of sections, each holding note tuples
//! `[strum_time, raw_direction, sustain_length?]`. The raw direction encodes
//! both the arrow and the side: `0..=3` belong to the section owner and
//! `4..=7` to the other side. [`parse_notes`] resolves that into a flat,
//! time-ordered list of [`Note`]s.
//!
//! Malformed tuples never abort parsing. They are skipped and reported as
//! [`ChartWarning`]s in the output.

#[cfg(feature = "json")]
pub mod json;
pub mod parse;

use thiserror::Error;

use crate::{conductor::DEFAULT_BPM, note::Note};

#[cfg(feature = "json")]
pub use self::json::{ChartJsonError, chart_from_json_str, parse_chart_json};
pub use self::parse::parse_notes;

/// Note skin used when a chart does not name one.
pub const DEFAULT_NOTE_SKIN: &str = "Funkin";

/// Song metadata plus the raw note sections.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Chart {
    /// Song name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub song: String,
    /// Song tempo.
    pub bpm: f64,
    /// Scroll speed multiplier.
    #[cfg_attr(feature = "serde", serde(default = "default_speed"))]
    pub speed: f64,
    /// Whether a separate vocal track is played.
    #[cfg_attr(feature = "serde", serde(default))]
    pub needs_voices: bool,
    /// Player character name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub player: String,
    /// Opponent character name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub enemy: String,
    /// Background character name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub gf_version: String,
    /// Stage name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stage: String,
    /// Note skin name.
    #[cfg_attr(feature = "serde", serde(default = "default_note_skin"))]
    pub note_skin: String,
    /// Author credits.
    #[cfg_attr(feature = "serde", serde(default))]
    pub credits: Option<String>,
    /// Note sections in chart order.
    #[cfg_attr(feature = "serde", serde(rename = "notes"))]
    pub sections: Vec<Section>,
}

#[cfg(feature = "serde")]
const fn default_speed() -> f64 {
    1.0
}

#[cfg(feature = "serde")]
fn default_note_skin() -> String {
    DEFAULT_NOTE_SKIN.to_string()
}

impl Default for Chart {
    fn default() -> Self {
        Self {
            song: String::new(),
            bpm: DEFAULT_BPM,
            speed: 1.0,
            needs_voices: false,
            player: String::new(),
            enemy: String::new(),
            gf_version: String::new(),
            stage: String::new(),
            note_skin: DEFAULT_NOTE_SKIN.to_string(),
            credits: None,
            sections: Vec::new(),
        }
    }
}

impl Chart {
    /// Creates a chart with default metadata and the given sections.
    #[must_use]
    pub fn with_sections(bpm: f64, sections: Vec<Section>) -> Self {
        Self {
            bpm,
            sections,
            ..Self::default()
        }
    }

    /// Number of raw note entries across all sections.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|section| section.notes.len()).sum()
    }

    /// Normalizes this chart into playable notes. See [`parse_notes`].
    pub fn parse_notes(&self) -> NotesOutput {
        parse_notes(self)
    }
}

/// A chart section.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section {
    /// Whether the section belongs to the player.
    #[cfg_attr(feature = "serde", serde(rename = "mustHitSection", default))]
    pub must_hit: bool,
    /// Raw note tuples.
    #[cfg_attr(feature = "serde", serde(rename = "sectionNotes", default))]
    pub notes: Vec<NoteEntry>,
}

impl Section {
    /// Creates a section.
    #[must_use]
    pub const fn new(must_hit: bool, notes: Vec<NoteEntry>) -> Self {
        Self { must_hit, notes }
    }
}

/// A raw note tuple. `None` marks a value which was not a number.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NoteEntry {
    /// `[strum_time, raw_direction, sustain_length?, ...]`.
    pub fields: Vec<Option<f64>>,
}

impl NoteEntry {
    /// A tap note tuple.
    #[must_use]
    pub fn tap(strum_time: f64, raw_direction: u8) -> Self {
        Self {
            fields: vec![Some(strum_time), Some(f64::from(raw_direction))],
        }
    }

    /// A hold note tuple.
    #[must_use]
    pub fn hold(strum_time: f64, raw_direction: u8, sustain_length: f64) -> Self {
        Self {
            fields: vec![
                Some(strum_time),
                Some(f64::from(raw_direction)),
                Some(sustain_length),
            ],
        }
    }

    /// A tuple with arbitrary fields.
    #[must_use]
    pub const fn from_fields(fields: Vec<Option<f64>>) -> Self {
        Self { fields }
    }

    /// Field at `index`, flattened so that missing and non-numeric are both `None`.
    #[must_use]
    pub fn field(&self, index: usize) -> Option<f64> {
        self.fields.get(index).copied().flatten()
    }
}

/// Recoverable problems found while reading a chart.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartWarning {
    /// A note tuple had fewer than two fields.
    #[error("section {section} entry {entry}: expected at least 2 fields, found {len}")]
    TooFewFields {
        /// Section index.
        section: usize,
        /// Entry index inside the section.
        entry: usize,
        /// Number of fields found.
        len: usize,
    },
    /// Strum time or direction was not a number.
    #[error("section {section} entry {entry}: field {field} is not a number")]
    NonNumericField {
        /// Section index.
        section: usize,
        /// Entry index inside the section.
        entry: usize,
        /// Index of the offending field.
        field: usize,
    },
    /// Strum time was NaN or infinite.
    #[error("section {section} entry {entry}: strum time is not finite")]
    NonFiniteTime {
        /// Section index.
        section: usize,
        /// Entry index inside the section.
        entry: usize,
    },
    /// Direction was not an integer.
    #[error("section {section} entry {entry}: direction {value} is not an integer")]
    NonIntegralDirection {
        /// Section index.
        section: usize,
        /// Entry index inside the section.
        entry: usize,
        /// The raw direction.
        value: f64,
    },
    /// Direction folded outside `0..=3`.
    #[error("section {section} entry {entry}: direction {value} is out of range")]
    OutOfRangeDirection {
        /// Section index.
        section: usize,
        /// Entry index inside the section.
        entry: usize,
        /// The raw direction.
        value: i64,
    },
    /// Sustain was present but not a finite, non-negative number. The note is kept as a tap.
    #[error("section {section} entry {entry}: invalid sustain length, treating as tap")]
    InvalidSustain {
        /// Section index.
        section: usize,
        /// Entry index inside the section.
        entry: usize,
    },
    /// The document was not valid JSON.
    #[error("JSON parsing failed: {0}")]
    JsonParsing(String),
    /// A required field was missing and a default was used.
    #[error("missing required field: {0}")]
    MissingField(String),
    /// A field had the wrong type or value and a default was used.
    #[error("invalid field value: {0}")]
    InvalidField(String),
}

/// Output of [`parse_notes`].
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct NotesOutput {
    /// Notes of both sides, sorted by strum time. `notes[i].id() == NoteId(i)`.
    pub notes: Vec<Note>,
    /// Skipped or adjusted entries.
    pub warnings: Vec<ChartWarning>,
}

/// Output of a fault-tolerant chart load.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct ChartOutput {
    /// The chart, with defaults filled in.
    pub chart: Chart,
    /// Problems found while loading.
    pub warnings: Vec<ChartWarning>,
}
