//! Enemy side resolution.

use super::{LaneContext, ResolutionStrategy};
use crate::{note::NoteId, view::Hooks};

/// Hits every enemy note as Sick at its strum time and releases holds at
/// their tail. Nothing reaches the player statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AlwaysAuto;

impl ResolutionStrategy for AlwaysAuto {
    fn resolve<H: Hooks + ?Sized>(&mut self, ctx: &mut LaneContext<'_, H>) {
        ctx.auto_resolve(false);
    }

    fn hold_finished<H: Hooks + ?Sized>(&mut self, _note: NoteId, _ctx: &mut LaneContext<'_, H>) {}
}
