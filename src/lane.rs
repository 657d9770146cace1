//! One strumline: the shared lifecycle plus a resolution strategy.
//!
//! Both sides run the same frame loop. Only how a note gets resolved differs,
//! which is what [`ResolutionStrategy`] abstracts:
//!
//! - [`ManualOrBot`] resolves player notes from presses, or automatically in bot mode.
//! - [`AlwaysAuto`] resolves enemy notes automatically and never scores them.

pub mod enemy;
pub mod player;

use log::trace;

use crate::{
    config::PlayConfig,
    direction::{NoteDirection, PerDirection},
    judge::{Judgment, hit_window},
    lifecycle::NoteLifecycle,
    note::{Note, NoteId, Owner},
    score::{PlayStats, ScoreChange},
    view::{Hooks, JudgmentEvent, StrumAnimation},
};

pub use self::{enemy::AlwaysAuto, player::ManualOrBot};

/// Which note, if any, occupies the hold slot of each direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ActiveHolds(PerDirection<Option<NoteId>>);

impl ActiveHolds {
    /// Creates empty slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Note held on `direction`.
    #[must_use]
    pub fn get(&self, direction: NoteDirection) -> Option<NoteId> {
        self.0[direction]
    }

    /// Occupies a slot, returning the previous occupant.
    pub fn insert(&mut self, direction: NoteDirection, note: NoteId) -> Option<NoteId> {
        self.0[direction].replace(note)
    }

    /// Clears a slot, returning its occupant.
    pub fn take(&mut self, direction: NoteDirection) -> Option<NoteId> {
        self.0[direction].take()
    }

    /// Occupied slots in direction order.
    pub fn iter(&self) -> impl Iterator<Item = (NoteDirection, NoteId)> + '_ {
        self.0
            .iter()
            .filter_map(|(direction, note)| note.map(|note| (direction, note)))
    }

    /// Whether no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Mutable state a strategy works on during one call.
pub struct LaneContext<'a, H: ?Sized> {
    /// Side of the lane.
    pub owner: Owner,
    /// Song position of the call.
    pub song_position: f64,
    /// All notes, both sides, sorted by strum time.
    pub notes: &'a mut [Note],
    /// Hold slots of the lane.
    pub holds: &'a mut ActiveHolds,
    /// Player statistics.
    pub stats: &'a mut PlayStats,
    /// Presentation hooks.
    pub hooks: &'a mut H,
}

impl<H: Hooks + ?Sized> LaneContext<'_, H> {
    /// Resolves `note` as hit.
    ///
    /// A hold takes its direction slot and keeps its body; a tap is removed at
    /// once. With `scored`, the judgment goes to the statistics.
    pub fn hit(&mut self, note: NoteId, judgment: Judgment, delta: f64, scored: bool) {
        let Some(target) = self.notes.get_mut(note.value()) else {
            return;
        };
        if !target.mark_hit() {
            return;
        }
        let direction = target.direction();
        let is_hold = target.is_hold();
        if !is_hold {
            target.mark_despawned();
        }
        trace!("{:?} hit {note:?} {judgment} ({delta:+.3} ms)", self.owner);

        if is_hold {
            if let Some(previous) = self.holds.insert(direction, note) {
                self.finish_hold(previous);
            }
            self.hooks.hide_note_head(note);
        } else {
            self.hooks.despawn_note(note);
        }
        self.hooks
            .strum(self.owner, direction, StrumAnimation::Confirm { hold: is_hold });
        self.hooks.note_resolved(self.owner, direction, judgment);

        if scored {
            let change = self.stats.record_hit(judgment, delta);
            self.report(note, direction, delta, change);
        }
    }

    /// Resolves `note` as missed. It keeps scrolling, greyed out, until the
    /// lifecycle removes it.
    pub fn miss(&mut self, note: NoteId) {
        let Some(target) = self.notes.get_mut(note.value()) else {
            return;
        };
        let delta = self.song_position - target.strum_time();
        if !target.mark_too_late() {
            return;
        }
        let direction = target.direction();
        trace!("{:?} missed {note:?} ({delta:+.3} ms)", self.owner);

        self.hooks.tint_missed(note);
        self.hooks.note_resolved(self.owner, direction, Judgment::Miss);
        let change = self.stats.record_miss();
        self.report(note, direction, delta, change);
    }

    /// Ends the hold on `direction`, if any.
    ///
    /// An early release scores a miss on the hold but leaves it hit.
    pub fn release_hold(&mut self, direction: NoteDirection, early: bool) {
        let Some(note) = self.holds.take(direction) else {
            return;
        };
        if let Some(target) = self.notes.get_mut(note.value()) {
            target.end_hold(early);
            target.mark_despawned();
        }
        self.hooks.despawn_note(note);
        self.hooks.strum(self.owner, direction, StrumAnimation::Static);

        if early {
            trace!("{:?} dropped hold {note:?}", self.owner);
            self.hooks.note_resolved(self.owner, direction, Judgment::Miss);
            let change = self.stats.record_miss();
            self.report(note, direction, f64::INFINITY, change);
        }
    }

    /// Releases every occupied slot cleanly.
    pub fn release_all_holds(&mut self) {
        for direction in NoteDirection::ALL {
            self.release_hold(direction, false);
        }
    }

    /// Cleanly ends a hold which lost its slot.
    fn finish_hold(&mut self, note: NoteId) {
        if let Some(target) = self.notes.get_mut(note.value()) {
            target.end_hold(false);
            target.mark_despawned();
        }
        self.hooks.despawn_note(note);
    }

    /// Auto-resolves every reachable note of the lane as Sick, then releases
    /// holds whose tail was reached.
    pub(crate) fn auto_resolve(&mut self, scored: bool) {
        let owner = self.owner;
        let song_position = self.song_position;
        let due: Vec<NoteId> = self
            .notes
            .iter_mut()
            .take_while(|note| note.strum_time() <= song_position)
            .filter(|note| {
                note.owner() == owner
                    && note.spawned()
                    && !note.is_resolved()
                    && !note.bot_processed()
            })
            .map(|note| {
                note.mark_bot_processed();
                note.id()
            })
            .collect();
        for note in due {
            self.hit(note, Judgment::Sick, 0.0, scored);
        }

        let finished: Vec<NoteDirection> = self
            .holds
            .iter()
            .filter(|(_, note)| {
                self.notes
                    .get(note.value())
                    .is_none_or(|note| song_position >= note.end_time())
            })
            .map(|(direction, _)| direction)
            .collect();
        for direction in finished {
            self.release_hold(direction, false);
        }
    }

    /// Whether releasing the hold on `direction` now would be early.
    #[must_use]
    pub fn is_early_release(&self, direction: NoteDirection) -> bool {
        self.holds
            .get(direction)
            .and_then(|note| self.notes.get(note.value()))
            .is_some_and(|note| self.song_position < note.end_time() - hit_window::SHIT)
    }

    fn report(&mut self, note: NoteId, direction: NoteDirection, delta: f64, change: ScoreChange) {
        self.hooks.judged(JudgmentEvent {
            note,
            direction,
            judgment: change.judgment,
            delta,
            score_delta: change.score_delta,
        });
        self.hooks.score_changed(self.stats.snapshot());
    }
}

/// How notes of a lane get resolved.
pub trait ResolutionStrategy {
    /// Resolves notes after the lifecycle passes of a frame.
    fn resolve<H: Hooks + ?Sized>(&mut self, ctx: &mut LaneContext<'_, H>);

    /// Reacts to a hold whose body was fully consumed.
    fn hold_finished<H: Hooks + ?Sized>(&mut self, note: NoteId, ctx: &mut LaneContext<'_, H>);
}

/// A strumline of one side.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane<S> {
    lifecycle: NoteLifecycle,
    holds: ActiveHolds,
    strategy: S,
}

impl<S: ResolutionStrategy> Lane<S> {
    /// Creates a lane for `owner`.
    #[must_use]
    pub fn new(owner: Owner, config: &PlayConfig, strategy: S) -> Self {
        Self {
            lifecycle: NoteLifecycle::new(owner, config),
            holds: ActiveHolds::new(),
            strategy,
        }
    }

    /// Side of the lane.
    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.lifecycle.owner()
    }

    /// Spawn, position, and hold tracking.
    #[must_use]
    pub const fn lifecycle(&self) -> &NoteLifecycle {
        &self.lifecycle
    }

    /// Hold slots.
    #[must_use]
    pub const fn holds(&self) -> &ActiveHolds {
        &self.holds
    }

    /// Resolution policy.
    #[must_use]
    pub const fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Runs one frame: spawn, position, holds, then resolution.
    pub fn update<H: Hooks + ?Sized>(
        &mut self,
        notes: &mut [Note],
        stats: &mut PlayStats,
        song_position: f64,
        hooks: &mut H,
    ) {
        let finished = self.lifecycle.update(notes, song_position, hooks);
        let (strategy, mut ctx) = self.split(notes, stats, song_position, hooks);
        for note in finished {
            strategy.hold_finished(note, &mut ctx);
        }
        strategy.resolve(&mut ctx);
    }

    /// Borrows the strategy and a context over the rest of the lane.
    pub(crate) fn split<'a, H: Hooks + ?Sized>(
        &'a mut self,
        notes: &'a mut [Note],
        stats: &'a mut PlayStats,
        song_position: f64,
        hooks: &'a mut H,
    ) -> (&'a mut S, LaneContext<'a, H>) {
        let ctx = LaneContext {
            owner: self.lifecycle.owner(),
            song_position,
            notes,
            holds: &mut self.holds,
            stats,
            hooks,
        };
        (&mut self.strategy, ctx)
    }
}
