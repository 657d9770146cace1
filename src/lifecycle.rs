//! Per-frame note spawning, positioning, and hold body consumption.
//!
//! A [`NoteLifecycle`] drives the notes of one side. It never judges
//! anything: it only decides which notes are on screen, where they are, and
//! how far the strum line has eaten into the holds being held. Finished holds
//! are handed back to the caller, which decides what a finished hold means.

use log::trace;

use crate::{
    config::{HoldGeometry, PlayConfig},
    note::{Note, NoteId, Owner},
    view::NoteView,
};

/// Shared spawn, position, and hold tracking for one side.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteLifecycle {
    owner: Owner,
    lead_time: f64,
    trailing_window: f64,
    scroll_speed: f64,
    geometry: HoldGeometry,
}

impl NoteLifecycle {
    /// Creates a lifecycle for the notes of `owner`.
    #[must_use]
    pub fn new(owner: Owner, config: &PlayConfig) -> Self {
        Self {
            owner,
            lead_time: config.lead_time(),
            trailing_window: config.trailing_window_ms,
            scroll_speed: config.scroll_speed(),
            geometry: config.hold_geometry,
        }
    }

    /// The side this lifecycle drives.
    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.owner
    }

    /// Spawn lookahead in milliseconds.
    #[must_use]
    pub const fn lead_time(&self) -> f64 {
        self.lead_time
    }

    /// Trailing spawn window in milliseconds.
    #[must_use]
    pub const fn trailing_window(&self) -> f64 {
        self.trailing_window
    }

    /// Scroll rate in pixels per millisecond.
    #[must_use]
    pub const fn scroll_speed(&self) -> f64 {
        self.scroll_speed
    }

    /// Offset of a note head from the strum line, in pixels. Positive is upcoming.
    #[must_use]
    pub fn y_offset(&self, note: &Note, song_position: f64) -> f64 {
        (note.strum_time() - song_position) * self.scroll_speed
    }

    /// Runs the spawn, position, and hold passes in that order.
    ///
    /// Returns the holds whose body was fully consumed during this call.
    pub fn update<V: NoteView + ?Sized>(
        &self,
        notes: &mut [Note],
        song_position: f64,
        view: &mut V,
    ) -> Vec<NoteId> {
        self.spawn_in_range(notes, song_position, view);
        self.update_positions(notes, song_position, view);
        self.consume_held_segments(notes, song_position, view)
    }

    /// Spawns unspawned notes inside `[pos - trailing_window, pos + lead_time]`.
    ///
    /// Notes that fell behind the trailing edge before ever spawning stay
    /// unspawned for good.
    fn spawn_in_range<V: NoteView + ?Sized>(
        &self,
        notes: &mut [Note],
        song_position: f64,
        view: &mut V,
    ) {
        let earliest = song_position - self.trailing_window;
        let latest = song_position + self.lead_time;
        let start = notes.partition_point(|note| note.strum_time() < earliest);
        let end = notes.partition_point(|note| note.strum_time() <= latest);
        let Some(window) = notes.get_mut(start..end.max(start)) else {
            return;
        };

        for note in window
            .iter_mut()
            .filter(|note| note.owner() == self.owner && !note.spawned())
        {
            let segments = self
                .geometry
                .segment_count(note.sustain_length(), self.scroll_speed);
            note.mark_spawned(segments);
            view.spawn_note(note, self.y_offset(note, song_position));
            trace!("spawned {:?} note {:?} at {}", self.owner, note.id(), note.strum_time());
        }
    }

    /// Moves every live note, and removes missed notes once their tail is far behind.
    fn update_positions<V: NoteView + ?Sized>(
        &self,
        notes: &mut [Note],
        song_position: f64,
        view: &mut V,
    ) {
        let cleanup_before = song_position - self.trailing_window;
        for note in notes
            .iter_mut()
            .filter(|note| note.owner() == self.owner && note.is_live())
        {
            if note.too_late() && note.end_time() < cleanup_before {
                note.mark_despawned();
                view.despawn_note(note.id());
                continue;
            }
            let y_offset = self.y_offset(note, song_position);
            if !note.was_hit() {
                view.move_note(note.id(), y_offset);
            }
            if note.is_hold() {
                view.move_hold(note.id(), y_offset);
            }
        }
    }

    /// Consumes hold segments of held notes in order as the strum line crosses them.
    fn consume_held_segments<V: NoteView + ?Sized>(
        &self,
        notes: &mut [Note],
        song_position: f64,
        view: &mut V,
    ) -> Vec<NoteId> {
        let mut finished = Vec::new();
        for note in notes.iter_mut().filter(|note| {
            note.owner() == self.owner && note.is_being_held() && !note.hold_passed()
        }) {
            let time_to_strum = note.strum_time() - song_position;
            while note.hold_segments_destroyed() < note.hold().segments {
                let index = note.hold_segments_destroyed();
                if !self
                    .geometry
                    .segment_crossed(index, time_to_strum, self.scroll_speed)
                {
                    break;
                }
                view.consume_hold_segment(note.id(), index);
                if note.consume_segment() {
                    trace!("{:?} hold {:?} passed", self.owner, note.id());
                    finished.push(note.id());
                }
            }
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::NoteDirection;

    #[derive(Default)]
    struct Log {
        spawned: Vec<NoteId>,
        despawned: Vec<NoteId>,
        consumed: Vec<(NoteId, u32)>,
        moved: usize,
    }

    impl NoteView for Log {
        fn spawn_note(&mut self, note: &Note, _y_offset: f64) {
            self.spawned.push(note.id());
        }

        fn move_note(&mut self, _note: NoteId, _y_offset: f64) {
            self.moved += 1;
        }

        fn consume_hold_segment(&mut self, note: NoteId, index: u32) {
            self.consumed.push((note, index));
        }

        fn despawn_note(&mut self, note: NoteId) {
            self.despawned.push(note);
        }
    }

    fn lifecycle() -> NoteLifecycle {
        NoteLifecycle::new(Owner::Player, &PlayConfig::new(100.0, 1.0).unwrap())
    }

    fn note(id: usize, strum_time: f64, sustain: f64, owner: Owner) -> Note {
        Note::new(NoteId(id), strum_time, NoteDirection::Left, sustain, owner, 0)
    }

    #[test]
    fn test_spawn_window() {
        let lifecycle = lifecycle();
        let mut notes = vec![
            note(0, 0.0, 0.0, Owner::Player),
            note(1, 2000.0, 0.0, Owner::Player),
            note(2, 2500.0, 0.0, Owner::Player),
            note(3, 3000.0, 0.0, Owner::Player),
            note(4, 3000.0, 0.0, Owner::Enemy),
        ];
        let mut log = Log::default();

        // The first note is more than 1500 ms behind and is abandoned.
        lifecycle.update(&mut notes, 1600.0, &mut log);
        assert_eq!(log.spawned, vec![NoteId(1), NoteId(2), NoteId(3)]);
        assert!(!notes[0].spawned());
        assert!(!notes[4].spawned());

        // Never spawned twice.
        lifecycle.update(&mut notes, 1700.0, &mut log);
        assert_eq!(log.spawned.len(), 3);
        assert_eq!(log.moved, 6);
    }

    #[test]
    fn test_missed_notes_leave_after_trailing_window() {
        let lifecycle = lifecycle();
        let mut notes = vec![note(0, 1000.0, 200.0, Owner::Player)];
        let mut log = Log::default();
        lifecycle.update(&mut notes, 0.0, &mut log);
        notes[0].mark_too_late();

        lifecycle.update(&mut notes, 2700.0, &mut log);
        assert!(log.despawned.is_empty());
        lifecycle.update(&mut notes, 2700.5, &mut log);
        assert_eq!(log.despawned, vec![NoteId(0)]);
        assert!(notes[0].spawned() && !notes[0].is_live());
    }

    #[test]
    fn test_hold_segments_consumed_in_order() {
        let lifecycle = lifecycle();
        // 30 ms at 0.3 px/ms is 9 px: 4 pieces plus the end cap.
        let mut notes = vec![note(0, 1000.0, 30.0, Owner::Player)];
        let mut log = Log::default();
        lifecycle.update(&mut notes, 0.0, &mut log);
        assert_eq!(notes[0].hold().segments, 5);

        // Not held yet: nothing is consumed even past the strum line.
        assert!(lifecycle.update(&mut notes, 1000.0, &mut log).is_empty());
        assert!(log.consumed.is_empty());

        // Segment i crosses at 910 + 9.33 * i.
        let mut notes = vec![note(0, 1000.0, 30.0, Owner::Player)];
        lifecycle.update(&mut notes, 0.0, &mut log);
        notes[0].mark_hit();
        assert!(lifecycle.update(&mut notes, 905.0, &mut log).is_empty());
        assert!(log.consumed.is_empty());
        assert!(lifecycle.update(&mut notes, 925.0, &mut log).is_empty());
        assert_eq!(log.consumed, vec![(NoteId(0), 0), (NoteId(0), 1)]);
        assert!(lifecycle.update(&mut notes, 940.0, &mut log).is_empty());
        assert_eq!(notes[0].hold_segments_destroyed(), 4);

        let finished = lifecycle.update(&mut notes, 950.0, &mut log);
        assert_eq!(finished, vec![NoteId(0)]);
        assert!(notes[0].hold_passed());
        assert!(lifecycle.update(&mut notes, 1100.0, &mut log).is_empty());
        assert_eq!(log.consumed.len(), 5);
    }
}
