//! Note records and their lifecycle flags.
//!
//! Notes live in a flat arena sorted by strum time and are addressed by
//! [`NoteId`], the index into that arena. Static data never changes after
//! parsing; lifecycle state only moves forward.

use crate::direction::NoteDirection;

/// Index of a note in the sorted note list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteId(pub usize);

impl NoteId {
    /// Creates a new note id.
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the contained id value.
    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }
}

impl AsRef<usize> for NoteId {
    fn as_ref(&self) -> &usize {
        &self.0
    }
}

impl From<usize> for NoteId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl From<NoteId> for usize {
    fn from(id: NoteId) -> Self {
        id.0
    }
}

/// Which strumline a note belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Owner {
    /// The human (or bot-played) side.
    Player,
    /// The CPU opponent.
    Enemy,
}

impl Owner {
    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// Final outcome of a note. Once left, `Pending` is never entered again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Resolution {
    /// Not judged yet.
    #[default]
    Pending,
    /// Hit by a press or by auto-resolution.
    Hit,
    /// Passed without a hit.
    TooLate,
}

/// Visual presence of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpawnState {
    /// Not spawned yet.
    #[default]
    Pending,
    /// On screen.
    Live,
    /// Spawned once and removed since.
    Gone,
}

/// Progress through a hold body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HoldProgress {
    /// Number of segments laid out at spawn, end cap included.
    pub segments: u32,
    /// Segments already consumed by the strum line.
    pub destroyed: u32,
    /// The hold key is currently down for this note.
    pub being_held: bool,
    /// The hold ended before its tail.
    pub released: bool,
    /// All segments were consumed.
    pub passed: bool,
}

/// A single playable note.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    id: NoteId,
    strum_time: f64,
    direction: NoteDirection,
    sustain_length: f64,
    owner: Owner,
    section_index: usize,
    spawn: SpawnState,
    resolution: Resolution,
    hold: HoldProgress,
    bot_processed: bool,
}

impl Note {
    /// Creates an unspawned, unresolved note.
    ///
    /// Negative or non-finite sustain lengths are stored as `0`.
    #[must_use]
    pub fn new(
        id: NoteId,
        strum_time: f64,
        direction: NoteDirection,
        sustain_length: f64,
        owner: Owner,
        section_index: usize,
    ) -> Self {
        let sustain_length = if sustain_length.is_finite() && sustain_length > 0.0 {
            sustain_length
        } else {
            0.0
        };
        Self {
            id,
            strum_time,
            direction,
            sustain_length,
            owner,
            section_index,
            spawn: SpawnState::default(),
            resolution: Resolution::default(),
            hold: HoldProgress::default(),
            bot_processed: false,
        }
    }

    /// Arena id.
    #[must_use]
    pub const fn id(&self) -> NoteId {
        self.id
    }

    /// Song position the note should be hit at, in milliseconds.
    #[must_use]
    pub const fn strum_time(&self) -> f64 {
        self.strum_time
    }

    /// Arrow direction.
    #[must_use]
    pub const fn direction(&self) -> NoteDirection {
        self.direction
    }

    /// Hold duration in milliseconds. `0` for taps.
    #[must_use]
    pub const fn sustain_length(&self) -> f64 {
        self.sustain_length
    }

    /// Which side plays this note.
    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.owner
    }

    /// Index of the chart section the note came from.
    #[must_use]
    pub const fn section_index(&self) -> usize {
        self.section_index
    }

    /// Whether the note has a sustain.
    #[must_use]
    pub fn is_hold(&self) -> bool {
        self.sustain_length > 0.0
    }

    /// Song position of the tail.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.strum_time + self.sustain_length
    }

    /// Current spawn state.
    #[must_use]
    pub const fn spawn_state(&self) -> SpawnState {
        self.spawn
    }

    /// Whether the note was ever spawned.
    #[must_use]
    pub const fn spawned(&self) -> bool {
        !matches!(self.spawn, SpawnState::Pending)
    }

    /// Whether the note is on screen.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self.spawn, SpawnState::Live)
    }

    /// Final outcome so far.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Whether the note was hit.
    #[must_use]
    pub const fn was_hit(&self) -> bool {
        matches!(self.resolution, Resolution::Hit)
    }

    /// Whether the note passed without a hit.
    #[must_use]
    pub const fn too_late(&self) -> bool {
        matches!(self.resolution, Resolution::TooLate)
    }

    /// Whether the note is hit or missed.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        !matches!(self.resolution, Resolution::Pending)
    }

    /// Hold body progress.
    #[must_use]
    pub const fn hold(&self) -> &HoldProgress {
        &self.hold
    }

    /// Whether the hold key is currently down for this note.
    #[must_use]
    pub const fn is_being_held(&self) -> bool {
        self.hold.being_held
    }

    /// Whether the hold was dropped before its tail.
    #[must_use]
    pub const fn hold_released(&self) -> bool {
        self.hold.released
    }

    /// Whether the whole hold body was consumed.
    #[must_use]
    pub const fn hold_passed(&self) -> bool {
        self.hold.passed
    }

    /// Number of hold segments consumed.
    #[must_use]
    pub const fn hold_segments_destroyed(&self) -> u32 {
        self.hold.destroyed
    }

    /// Whether auto-resolution already took this note.
    #[must_use]
    pub const fn bot_processed(&self) -> bool {
        self.bot_processed
    }

    pub(crate) const fn reassign_id(&mut self, id: NoteId) {
        self.id = id;
    }

    pub(crate) const fn mark_spawned(&mut self, segments: u32) {
        if matches!(self.spawn, SpawnState::Pending) {
            self.spawn = SpawnState::Live;
            self.hold.segments = segments;
        }
    }

    pub(crate) const fn mark_despawned(&mut self) {
        if matches!(self.spawn, SpawnState::Live) {
            self.spawn = SpawnState::Gone;
        }
    }

    /// Returns `false` if the note was already resolved.
    pub(crate) fn mark_hit(&mut self) -> bool {
        if self.is_resolved() {
            return false;
        }
        self.resolution = Resolution::Hit;
        if self.is_hold() {
            self.hold.being_held = true;
        }
        true
    }

    /// Returns `false` if the note was already resolved.
    pub(crate) const fn mark_too_late(&mut self) -> bool {
        if self.is_resolved() {
            return false;
        }
        self.resolution = Resolution::TooLate;
        true
    }

    pub(crate) const fn mark_bot_processed(&mut self) {
        self.bot_processed = true;
    }

    /// Ends the hold. Returns `false` if it was not being held.
    pub(crate) const fn end_hold(&mut self, early: bool) -> bool {
        if !self.hold.being_held {
            return false;
        }
        self.hold.being_held = false;
        if early {
            self.hold.released = true;
        }
        true
    }

    /// Consumes the next segment. Returns `true` if it was the last one.
    pub(crate) const fn consume_segment(&mut self) -> bool {
        if self.hold.destroyed < self.hold.segments {
            self.hold.destroyed += 1;
            if self.hold.destroyed == self.hold.segments {
                self.hold.passed = true;
                return true;
            }
        }
        false
    }
}
