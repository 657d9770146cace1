//! Interfaces to the presentation layer.
//!
//! The gameplay core never draws or plays anything. It reports what happened
//! through [`NoteView`] (visual commands) and [`Feedback`] (judgment and score
//! events). Every method has a no-op default, so a host implements only what
//! it renders. `()` implements both for headless runs.

use crate::{
    direction::NoteDirection,
    judge::Judgment,
    note::{Note, NoteId, Owner},
    score::ScoreSnapshot,
};

/// Frame a strum receptor should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrumAnimation {
    /// Idle.
    Static,
    /// Key down without a note.
    Press,
    /// A note was hit.
    Confirm {
        /// The note was a hold, so the confirm frame should loop.
        hold: bool,
    },
}

/// A judged player note.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JudgmentEvent {
    /// The judged note.
    pub note: NoteId,
    /// Its direction.
    pub direction: NoteDirection,
    /// Tier awarded.
    pub judgment: Judgment,
    /// `song_position - strum_time`. Infinite for a dropped hold.
    pub delta: f64,
    /// Score change before clamping at zero.
    pub score_delta: i64,
}

/// Visual commands keyed by note identity.
///
/// Positions are offsets in pixels from the strum line along the scroll axis.
pub trait NoteView {
    /// A note entered the visible window.
    fn spawn_note(&mut self, note: &Note, y_offset: f64) {
        let _ = (note, y_offset);
    }

    /// A note head moved.
    fn move_note(&mut self, note: NoteId, y_offset: f64) {
        let _ = (note, y_offset);
    }

    /// A hold body moved.
    fn move_hold(&mut self, note: NoteId, y_offset: f64) {
        let _ = (note, y_offset);
    }

    /// Hold segment `index` crossed the strum line and should disappear.
    fn consume_hold_segment(&mut self, note: NoteId, index: u32) {
        let _ = (note, index);
    }

    /// A hold was hit, so its head should disappear while its body stays.
    fn hide_note_head(&mut self, note: NoteId) {
        let _ = note;
    }

    /// A note was missed and should be greyed out.
    fn tint_missed(&mut self, note: NoteId) {
        let _ = note;
    }

    /// Every visual of a note should be removed.
    fn despawn_note(&mut self, note: NoteId) {
        let _ = note;
    }

    /// A strum receptor changed frame.
    fn strum(&mut self, owner: Owner, direction: NoteDirection, animation: StrumAnimation) {
        let _ = (owner, direction, animation);
    }
}

/// Gameplay events for pop-ups, character animation, and score displays.
pub trait Feedback {
    /// A note of either side was resolved. Drives sing and miss animations.
    fn note_resolved(&mut self, owner: Owner, direction: NoteDirection, judgment: Judgment) {
        let _ = (owner, direction, judgment);
    }

    /// A player note was judged.
    fn judged(&mut self, event: JudgmentEvent) {
        let _ = event;
    }

    /// The player score changed.
    fn score_changed(&mut self, snapshot: ScoreSnapshot) {
        let _ = snapshot;
    }
}

/// Everything a play session reports to.
pub trait Hooks: NoteView + Feedback {}

impl<T: NoteView + Feedback + ?Sized> Hooks for T {}

impl NoteView for () {}

impl Feedback for () {}
