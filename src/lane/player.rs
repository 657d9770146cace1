//! Player side resolution: presses and releases, or bot play.

use log::{debug, trace};

use super::{LaneContext, ResolutionStrategy};
use crate::{
    config::InputMode,
    direction::{NoteDirection, PerDirection},
    judge::{JudgeResult, judge_input, long_missed},
    note::NoteId,
    view::{Hooks, StrumAnimation},
};

/// Player strategy.
///
/// In [`InputMode::Manual`], presses are judged against the nearest note and
/// notes nobody pressed for become misses once they pass the long miss
/// threshold. In [`InputMode::Bot`], input is ignored and every note is hit
/// as Sick at its strum time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualOrBot {
    mode: InputMode,
    pressed: PerDirection<bool>,
}

impl ManualOrBot {
    /// Creates a strategy in `mode`.
    #[must_use]
    pub fn new(mode: InputMode) -> Self {
        Self {
            mode,
            pressed: PerDirection::default(),
        }
    }

    /// Current input mode.
    #[must_use]
    pub const fn mode(&self) -> InputMode {
        self.mode
    }

    /// Whether the key of `direction` is down.
    #[must_use]
    pub fn is_pressed(&self, direction: NoteDirection) -> bool {
        self.pressed[direction]
    }

    /// Switches the input mode.
    ///
    /// Leaving bot mode releases its holds cleanly. Any change forgets which
    /// keys are down, so a key held across the switch must be pressed again.
    pub fn set_mode<H: Hooks + ?Sized>(&mut self, mode: InputMode, ctx: &mut LaneContext<'_, H>) {
        if self.mode == mode {
            return;
        }
        if self.mode == InputMode::Bot {
            ctx.release_all_holds();
        }
        self.mode = mode;
        self.pressed = PerDirection::default();
        debug!("player input mode set to {mode:?}");
    }

    /// Handles a key press. Returns the judged note, if any.
    ///
    /// Ignored in bot mode, for a key already down, and while the direction
    /// holds a note.
    pub fn press<H: Hooks + ?Sized>(
        &mut self,
        direction: NoteDirection,
        ctx: &mut LaneContext<'_, H>,
    ) -> Option<JudgeResult> {
        if self.mode == InputMode::Bot || self.pressed[direction] {
            return None;
        }
        self.pressed[direction] = true;
        if ctx.holds.get(direction).is_some() {
            return None;
        }
        ctx.hooks.strum(ctx.owner, direction, StrumAnimation::Press);

        let result = judge_input(direction, ctx.song_position, ctx.notes, ctx.owner);
        match result {
            Some(result) => ctx.hit(result.note, result.judgment, result.delta, true),
            None => trace!("ghost tap on {direction} at {:.3}", ctx.song_position),
        }
        result
    }

    /// Handles a key release.
    ///
    /// Releasing a hold more than the Shit window before its tail scores a
    /// miss on it, even if its body was already consumed.
    pub fn release<H: Hooks + ?Sized>(
        &mut self,
        direction: NoteDirection,
        ctx: &mut LaneContext<'_, H>,
    ) {
        if self.mode == InputMode::Bot || !self.pressed[direction] {
            return;
        }
        self.pressed[direction] = false;
        if ctx.holds.get(direction).is_some() {
            let early = ctx.is_early_release(direction);
            ctx.release_hold(direction, early);
        } else {
            ctx.hooks.strum(ctx.owner, direction, StrumAnimation::Static);
        }
    }
}

impl ResolutionStrategy for ManualOrBot {
    fn resolve<H: Hooks + ?Sized>(&mut self, ctx: &mut LaneContext<'_, H>) {
        match self.mode {
            InputMode::Bot => ctx.auto_resolve(true),
            InputMode::Manual => {
                let missed: Vec<NoteId> =
                    long_missed(ctx.notes, ctx.owner, ctx.song_position).collect();
                for note in missed {
                    ctx.miss(note);
                }
            }
        }
    }

    fn hold_finished<H: Hooks + ?Sized>(&mut self, note: NoteId, ctx: &mut LaneContext<'_, H>) {
        if self.mode == InputMode::Bot {
            return;
        }
        let Some(direction) = ctx.notes.get(note.value()).map(|note| note.direction()) else {
            return;
        };
        // A manual hold keeps its slot until the key is released, which
        // decides whether the release was early.
        if ctx.holds.get(direction) == Some(note) {
            ctx.hooks.strum(ctx.owner, direction, StrumAnimation::Press);
        }
    }
}
