//! Normalization of raw note tuples.

use itertools::Itertools;
use log::{debug, warn};

use super::{Chart, ChartWarning, NoteEntry, NotesOutput, Section};
use crate::{
    direction::NoteDirection,
    note::{Note, NoteId, Owner},
};

/// Raw directions below this belong to the section owner.
const SIDE_WIDTH: i64 = NoteDirection::COUNT as i64;

struct RawNote {
    strum_time: f64,
    direction: NoteDirection,
    sustain_length: f64,
    owner: Owner,
    section_index: usize,
}

/// Flattens every section into notes sorted by strum time.
///
/// - In a must-hit section, raw directions `0..=3` are player notes and `4..` enemy notes.
///   Otherwise the mapping is inverted.
/// - The direction is reduced modulo 4 after ownership is resolved.
/// - Entries with too few fields, a non-numeric or non-finite strum time, or a
///   negative or fractional direction are dropped with a warning.
/// - A missing sustain means a tap. An invalid one is treated as `0` with a warning.
/// - The sort is stable, so notes at the same time keep chart order. Ids follow
///   the sorted order.
///
/// The function is pure: the same chart always yields the same notes.
pub fn parse_notes(chart: &Chart) -> NotesOutput {
    let mut warnings = Vec::new();
    let mut raw_notes = Vec::with_capacity(chart.entry_count());

    for (section_index, section) in chart.sections.iter().enumerate() {
        for (entry_index, entry) in section.notes.iter().enumerate() {
            if let Some(raw) =
                normalize_entry(section, section_index, entry_index, entry, &mut warnings)
            {
                raw_notes.push(raw);
            }
        }
    }

    let notes: Vec<Note> = raw_notes
        .into_iter()
        .sorted_by(|a, b| a.strum_time.total_cmp(&b.strum_time))
        .enumerate()
        .map(|(index, raw)| {
            Note::new(
                NoteId(index),
                raw.strum_time,
                raw.direction,
                raw.sustain_length,
                raw.owner,
                raw.section_index,
            )
        })
        .collect();

    debug!(
        "normalized {} notes from {} sections ({} warnings)",
        notes.len(),
        chart.sections.len(),
        warnings.len()
    );
    NotesOutput { notes, warnings }
}

fn normalize_entry(
    section: &Section,
    section_index: usize,
    entry_index: usize,
    entry: &NoteEntry,
    warnings: &mut Vec<ChartWarning>,
) -> Option<RawNote> {
    let mut reject = |warning: ChartWarning| {
        warn!("skipping chart entry: {warning}");
        warnings.push(warning);
        None
    };

    if entry.fields.len() < 2 {
        return reject(ChartWarning::TooFewFields {
            section: section_index,
            entry: entry_index,
            len: entry.fields.len(),
        });
    }
    let Some(strum_time) = entry.field(0) else {
        return reject(ChartWarning::NonNumericField {
            section: section_index,
            entry: entry_index,
            field: 0,
        });
    };
    let Some(raw_direction) = entry.field(1) else {
        return reject(ChartWarning::NonNumericField {
            section: section_index,
            entry: entry_index,
            field: 1,
        });
    };
    if !strum_time.is_finite() {
        return reject(ChartWarning::NonFiniteTime {
            section: section_index,
            entry: entry_index,
        });
    }
    if !raw_direction.is_finite() || raw_direction.fract() != 0.0 {
        return reject(ChartWarning::NonIntegralDirection {
            section: section_index,
            entry: entry_index,
            value: raw_direction,
        });
    }
    let raw_direction = raw_direction as i64;
    if raw_direction < 0 {
        return reject(ChartWarning::OutOfRangeDirection {
            section: section_index,
            entry: entry_index,
            value: raw_direction,
        });
    }

    let owner = match (section.must_hit, raw_direction < SIDE_WIDTH) {
        (true, true) | (false, false) => Owner::Player,
        (true, false) | (false, true) => Owner::Enemy,
    };
    let direction = NoteDirection::from_int(raw_direction);

    let sustain_length = match entry.fields.get(2) {
        None => 0.0,
        Some(Some(length)) if length.is_finite() && *length >= 0.0 => *length,
        Some(_) => {
            let warning = ChartWarning::InvalidSustain {
                section: section_index,
                entry: entry_index,
            };
            warn!("adjusting chart entry: {warning}");
            warnings.push(warning);
            0.0
        }
    };

    Some(RawNote {
        strum_time,
        direction,
        sustain_length,
        owner,
        section_index,
    })
}
