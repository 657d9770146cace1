//! Finding which note a press or a passing song position affects.

use super::{Judgment, hit_window, is_long_miss, judge};
use crate::{
    direction::NoteDirection,
    note::{Note, NoteId, Owner},
};

/// A note chosen by [`judge_input`] and how it was judged.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JudgeResult {
    /// The note to hit.
    pub note: NoteId,
    /// Tier from the signed delta.
    pub judgment: Judgment,
    /// `song_position - strum_time`.
    pub delta: f64,
}

/// Notes of `owner` that a press could still resolve, with their signed delta.
///
/// `notes` must be sorted by strum time, which lets the scan start at the
/// first note inside the window.
fn candidates(
    notes: &[Note],
    owner: Owner,
    song_position: f64,
) -> impl Iterator<Item = (&Note, f64)> {
    let earliest = song_position - hit_window::MAX_JUDGE_RANGE;
    let latest = song_position + hit_window::MAX_JUDGE_RANGE;
    let start = notes.partition_point(|note| note.strum_time() < earliest);
    notes
        .iter()
        .skip(start)
        .take_while(move |note| note.strum_time() <= latest)
        .filter(move |note| note.owner() == owner && note.spawned() && !note.is_resolved())
        .map(move |note| (note, song_position - note.strum_time()))
}

/// Picks the note a press on `direction` resolves.
///
/// Only spawned, unresolved notes of `owner` within [`hit_window::MAX_JUDGE_RANGE`]
/// qualify. The nearest one in time wins, and among equally near notes the one
/// with the earliest strum time, then the lowest id. Returns `None` for a ghost tap.
#[must_use]
pub fn judge_input(
    direction: NoteDirection,
    song_position: f64,
    notes: &[Note],
    owner: Owner,
) -> Option<JudgeResult> {
    candidates(notes, owner, song_position)
        .filter(|(note, _)| note.direction() == direction)
        .filter(|(_, delta)| delta.abs() <= hit_window::MAX_JUDGE_RANGE)
        .min_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()))
        .map(|(note, delta)| JudgeResult {
            note: note.id(),
            judgment: judge(delta),
            delta,
        })
}

/// Spawned, unresolved notes of `owner` which passed the long miss threshold.
pub fn long_missed(
    notes: &[Note],
    owner: Owner,
    song_position: f64,
) -> impl Iterator<Item = NoteId> + '_ {
    notes
        .iter()
        .take_while(move |note| note.strum_time() < song_position)
        .filter(move |note| {
            note.owner() == owner
                && note.spawned()
                && !note.is_resolved()
                && is_long_miss(song_position - note.strum_time())
        })
        .map(Note::id)
}
