//! Chart loading from JSON documents shaped as `{"song": {...}}`.
//!
//! Two entry points are provided:
//!
//! - [`parse_chart_json`] never fails. Missing or mistyped fields fall back to
//!   defaults and are reported as warnings, and non-numeric tuple values become
//!   `None` so that [`super::parse_notes`] can report them per entry.
//! - [`chart_from_json_str`] is strict and reports the JSON path of the first
//!   offending value.

use log::warn;
use serde_json::{Map, Value};
use thiserror::Error;

use super::{Chart, ChartOutput, ChartWarning, DEFAULT_NOTE_SKIN, NoteEntry, Section};
use crate::conductor::DEFAULT_BPM;

/// Strict chart deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid chart at `{path}`: {message}")]
pub struct ChartJsonError {
    /// JSON path of the offending value, `.` for the root.
    pub path: String,
    /// Underlying parser message.
    pub message: String,
}

#[derive(serde::Deserialize)]
struct ChartFile {
    song: Chart,
}

/// Deserializes a chart strictly.
///
/// # Errors
///
/// Returns [`ChartJsonError`] on malformed JSON, a missing `song` object, a
/// missing `bpm` or `notes` field, or a value of the wrong type.
pub fn chart_from_json_str(source: &str) -> Result<Chart, ChartJsonError> {
    let mut deserializer = serde_json::Deserializer::from_str(source);
    let file: ChartFile =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| ChartJsonError {
            path: error.path().to_string(),
            message: error.inner().to_string(),
        })?;
    deserializer.end().map_err(|error| ChartJsonError {
        path: ".".to_string(),
        message: error.to_string(),
    })?;
    Ok(file.song)
}

/// Loads a chart with fault tolerance.
pub fn parse_chart_json(source: &str) -> ChartOutput {
    let mut warnings = Vec::new();

    let value = match serde_json::from_str::<Value>(source) {
        Ok(value) => value,
        Err(e) => {
            warnings.push(ChartWarning::JsonParsing(e.to_string()));
            return finish(Chart::default(), warnings);
        }
    };

    let Some(song) = value.get("song").and_then(Value::as_object) else {
        warnings.push(ChartWarning::MissingField("song".to_string()));
        return finish(Chart::default(), warnings);
    };

    let chart = Chart {
        song: get_string_field(song, "song", "", &mut warnings),
        bpm: get_positive_f64_field(song, "bpm", DEFAULT_BPM, true, &mut warnings),
        speed: get_positive_f64_field(song, "speed", 1.0, false, &mut warnings),
        needs_voices: get_bool_field(song, "needsVoices", false, &mut warnings),
        player: get_optional_string_field(song, "player", &mut warnings).unwrap_or_default(),
        enemy: get_optional_string_field(song, "enemy", &mut warnings).unwrap_or_default(),
        gf_version: get_optional_string_field(song, "gfVersion", &mut warnings)
            .unwrap_or_default(),
        stage: get_optional_string_field(song, "stage", &mut warnings).unwrap_or_default(),
        note_skin: get_optional_string_field(song, "noteSkin", &mut warnings)
            .filter(|skin| !skin.is_empty())
            .unwrap_or_else(|| DEFAULT_NOTE_SKIN.to_string()),
        credits: get_optional_string_field(song, "credits", &mut warnings),
        sections: parse_sections(song.get("notes"), &mut warnings),
    };

    finish(chart, warnings)
}

fn finish(chart: Chart, warnings: Vec<ChartWarning>) -> ChartOutput {
    for warning in &warnings {
        warn!("chart json: {warning}");
    }
    ChartOutput { chart, warnings }
}

fn parse_sections(value: Option<&Value>, warnings: &mut Vec<ChartWarning>) -> Vec<Section> {
    let Some(value) = value else {
        warnings.push(ChartWarning::MissingField("notes".to_string()));
        return Vec::new();
    };
    let Some(sections) = value.as_array() else {
        warnings.push(ChartWarning::InvalidField(
            "notes must be an array of sections".to_string(),
        ));
        return Vec::new();
    };

    sections
        .iter()
        .enumerate()
        .map(|(index, section)| parse_section(index, section, warnings))
        .collect()
}

/// Invalid sections become empty so that section indices stay aligned with the file.
fn parse_section(index: usize, value: &Value, warnings: &mut Vec<ChartWarning>) -> Section {
    let Some(obj) = value.as_object() else {
        warnings.push(ChartWarning::InvalidField(format!(
            "notes[{index}] is not an object"
        )));
        return Section::default();
    };

    let must_hit = get_bool_field(obj, "mustHitSection", false, warnings);
    let notes = match obj.get("sectionNotes") {
        None => Vec::new(),
        Some(Value::Array(entries)) => entries.iter().map(parse_entry).collect(),
        Some(_) => {
            warnings.push(ChartWarning::InvalidField(format!(
                "notes[{index}].sectionNotes is not an array"
            )));
            Vec::new()
        }
    };

    Section { must_hit, notes }
}

/// A non-array entry becomes an empty tuple, reported later as too short.
fn parse_entry(value: &Value) -> NoteEntry {
    let fields = value
        .as_array()
        .map(|fields| fields.iter().map(Value::as_f64).collect())
        .unwrap_or_default();
    NoteEntry { fields }
}

fn get_string_field(
    obj: &Map<String, Value>,
    key: &str,
    default: &str,
    warnings: &mut Vec<ChartWarning>,
) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            warnings.push(ChartWarning::InvalidField(format!(
                "{key} must be a string, using default {default:?}"
            )));
            default.to_string()
        }
        None => {
            warnings.push(ChartWarning::MissingField(key.to_string()));
            default.to_string()
        }
    }
}

fn get_optional_string_field(
    obj: &Map<String, Value>,
    key: &str,
    warnings: &mut Vec<ChartWarning>,
) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(_) => {
            warnings.push(ChartWarning::InvalidField(format!("{key} must be a string")));
            None
        }
    }
}

fn get_bool_field(
    obj: &Map<String, Value>,
    key: &str,
    default: bool,
    warnings: &mut Vec<ChartWarning>,
) -> bool {
    match obj.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Null) | None => default,
        Some(_) => {
            warnings.push(ChartWarning::InvalidField(format!(
                "{key} must be a boolean, using default {default}"
            )));
            default
        }
    }
}

fn get_positive_f64_field(
    obj: &Map<String, Value>,
    key: &str,
    default: f64,
    required: bool,
    warnings: &mut Vec<ChartWarning>,
) -> f64 {
    match obj.get(key).map(Value::as_f64) {
        Some(Some(value)) if value.is_finite() && value > 0.0 => value,
        Some(_) => {
            warnings.push(ChartWarning::InvalidField(format!(
                "{key} must be a positive number, using default {default}"
            )));
            default
        }
        None => {
            if required {
                warnings.push(ChartWarning::MissingField(key.to_string()));
            }
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"{
        "song": {
            "song": "Bopeebo",
            "bpm": 100,
            "speed": 1.3,
            "needsVoices": true,
            "player": "bf",
            "enemy": "dad",
            "gfVersion": "gf",
            "stage": "stage",
            "notes": [
                { "mustHitSection": false, "sectionNotes": [[0, 1, 0], [600, 5]] },
                { "mustHitSection": true, "sectionNotes": [[1200, 2, 300], [1500, "x"]] }
            ]
        }
    }"#;

    #[test]
    fn test_lenient_load() {
        let output = parse_chart_json(SAMPLE);
        assert!(output.warnings.is_empty(), "{:?}", output.warnings);
        let chart = output.chart;
        assert_eq!(chart.song, "Bopeebo");
        assert_eq!(chart.bpm, 100.0);
        assert_eq!(chart.note_skin, DEFAULT_NOTE_SKIN);
        assert_eq!(chart.credits, None);
        assert_eq!(chart.sections.len(), 2);
        assert_eq!(chart.sections[1].notes[1].fields, vec![Some(1500.0), None]);
    }

    #[test]
    fn test_lenient_load_defaults() {
        let output = parse_chart_json(r#"{"song": {"bpm": -3, "notes": [1, {"sectionNotes": 2}]}}"#);
        assert_eq!(output.chart.bpm, DEFAULT_BPM);
        assert_eq!(output.chart.sections, vec![Section::default(), Section::default()]);
        assert_eq!(
            output.warnings,
            vec![
                ChartWarning::MissingField("song".to_string()),
                ChartWarning::InvalidField(
                    "bpm must be a positive number, using default 130".to_string()
                ),
                ChartWarning::InvalidField("notes[0] is not an object".to_string()),
                ChartWarning::InvalidField("notes[1].sectionNotes is not an array".to_string()),
            ]
        );
    }

    #[test]
    fn test_lenient_load_broken_json() {
        let output = parse_chart_json("{ not json");
        assert_eq!(output.chart, Chart::default());
        assert!(matches!(output.warnings.as_slice(), [ChartWarning::JsonParsing(_)]));

        let output = parse_chart_json("[]");
        assert_eq!(output.warnings, vec![ChartWarning::MissingField("song".to_string())]);
    }

    #[test]
    fn test_strict_load() {
        let chart = chart_from_json_str(SAMPLE.replace(r#", [1500, "x"]"#, "").as_str()).unwrap();
        assert_eq!(chart.player, "bf");
        assert_eq!(chart.sections[1].notes[0], NoteEntry::hold(1200.0, 2, 300.0));
        assert!((chart.speed - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_strict_load_reports_path() {
        let error = chart_from_json_str(SAMPLE).unwrap_err();
        assert!(error.path.starts_with("song.notes[1].sectionNotes[1]"), "{error}");

        let error = chart_from_json_str(r#"{"song": {"notes": []}}"#).unwrap_err();
        assert!(error.message.contains("bpm"), "{error}");
    }
}
