//! Prelude module for the crate.
//!
//! `use funkin_rs::prelude::*;` imports the types a host needs to load a
//! chart, run a session, and receive its events.

#[cfg(feature = "json")]
pub use crate::chart::{ChartJsonError, chart_from_json_str, parse_chart_json};
pub use crate::{
    chart::{
        Chart, ChartOutput, ChartWarning, DEFAULT_NOTE_SKIN, NoteEntry, NotesOutput, Section,
        parse_notes,
    },
    conductor::{Conductor, ConductorError, ConductorEvent, DEFAULT_BPM, SubscriptionId},
    config::{ConfigError, HoldGeometry, InputMode, PlayConfig},
    direction::{InvalidDirection, NoteDirection, PerDirection},
    health::HealthGauge,
    judge::{
        JudgeResult, Judgment, hit_window, is_long_miss, is_too_late, judge, judge_input,
        long_missed, score,
    },
    lane::{ActiveHolds, AlwaysAuto, Lane, LaneContext, ManualOrBot, ResolutionStrategy},
    lifecycle::NoteLifecycle,
    note::{HoldProgress, Note, NoteId, Owner, Resolution, SpawnState},
    score::{PlayStats, ScoreAggregator, ScoreChange, ScoreSnapshot, ScoreState, rating_label},
    session::PlaySession,
    view::{Feedback, Hooks, JudgmentEvent, NoteView, StrumAnimation},
};
