//! A play session: one chart, both strumlines, and the player statistics.

use log::debug;

use crate::{
    chart::{Chart, ChartWarning},
    config::{ConfigError, InputMode, PlayConfig},
    direction::NoteDirection,
    judge::JudgeResult,
    lane::{ActiveHolds, AlwaysAuto, Lane, ManualOrBot},
    note::{Note, NoteId, Owner},
    score::{PlayStats, ScoreState},
    view::Hooks,
};

/// Owns the note list and drives both sides frame by frame.
///
/// Each [`PlaySession::update`] runs the player lane and then the enemy lane,
/// each through spawn, position, hold, and resolution passes, and finally
/// eases the health display. Presses and releases are judged against the
/// song position they carry, which should come from the same clock as
/// `update`.
#[derive(Debug, Clone)]
pub struct PlaySession {
    config: PlayConfig,
    notes: Vec<Note>,
    player: Lane<ManualOrBot>,
    enemy: Lane<AlwaysAuto>,
    stats: PlayStats,
    song_position: f64,
    warnings: Vec<ChartWarning>,
}

impl PlaySession {
    /// Creates a session over already parsed notes.
    ///
    /// Notes are stable-sorted by strum time and renumbered so that
    /// `notes[i].id() == NoteId(i)`. Notes from [`crate::chart::parse_notes`]
    /// already satisfy this and keep their ids.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` is invalid.
    pub fn new(config: PlayConfig, mut notes: Vec<Note>) -> Result<Self, ConfigError> {
        config.validate()?;
        notes.sort_by(|a, b| a.strum_time().total_cmp(&b.strum_time()));
        for (index, note) in notes.iter_mut().enumerate() {
            if note.id() != NoteId(index) {
                debug!("renumbering note {:?} to {index}", note.id());
                note.reassign_id(NoteId(index));
            }
        }
        debug!(
            "play session with {} notes, scroll speed {:.3}, lead time {:.1} ms",
            notes.len(),
            config.scroll_speed(),
            config.lead_time()
        );
        Ok(Self {
            player: Lane::new(Owner::Player, &config, ManualOrBot::new(config.input_mode)),
            enemy: Lane::new(Owner::Enemy, &config, AlwaysAuto),
            config,
            notes,
            stats: PlayStats::new(),
            song_position: f64::NEG_INFINITY,
            warnings: Vec::new(),
        })
    }

    /// Parses a chart and creates a session with its tempo and speed.
    ///
    /// Chart warnings are kept and available from [`PlaySession::warnings`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the chart tempo or speed is invalid.
    pub fn from_chart(chart: &Chart) -> Result<Self, ConfigError> {
        Self::from_chart_with(chart, PlayConfig::from_chart(chart)?)
    }

    /// Parses a chart and creates a session with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` is invalid.
    pub fn from_chart_with(chart: &Chart, config: PlayConfig) -> Result<Self, ConfigError> {
        let output = chart.parse_notes();
        let mut session = Self::new(config, output.notes)?;
        session.warnings = output.warnings;
        Ok(session)
    }

    /// Advances both sides to `song_position`.
    ///
    /// `frame_delta_ms` only drives the health display easing.
    pub fn update<H: Hooks + ?Sized>(
        &mut self,
        song_position: f64,
        frame_delta_ms: f64,
        hooks: &mut H,
    ) {
        self.song_position = song_position;
        self.player
            .update(&mut self.notes, &mut self.stats, song_position, hooks);
        self.enemy
            .update(&mut self.notes, &mut self.stats, song_position, hooks);
        self.stats.health_mut().smooth(frame_delta_ms / 1000.0);
    }

    /// Presses the key of `direction` at `song_position`.
    ///
    /// Returns the judged note, or `None` for a ghost tap or an ignored press.
    pub fn press<H: Hooks + ?Sized>(
        &mut self,
        direction: NoteDirection,
        song_position: f64,
        hooks: &mut H,
    ) -> Option<JudgeResult> {
        let (strategy, mut ctx) =
            self.player
                .split(&mut self.notes, &mut self.stats, song_position, hooks);
        strategy.press(direction, &mut ctx)
    }

    /// Releases the key of `direction` at `song_position`.
    pub fn release<H: Hooks + ?Sized>(
        &mut self,
        direction: NoteDirection,
        song_position: f64,
        hooks: &mut H,
    ) {
        let (strategy, mut ctx) =
            self.player
                .split(&mut self.notes, &mut self.stats, song_position, hooks);
        strategy.release(direction, &mut ctx);
    }

    /// Switches the player input mode.
    pub fn set_input_mode<H: Hooks + ?Sized>(&mut self, mode: InputMode, hooks: &mut H) {
        let song_position = self.song_position;
        let (strategy, mut ctx) =
            self.player
                .split(&mut self.notes, &mut self.stats, song_position, hooks);
        strategy.set_mode(mode, &mut ctx);
    }

    /// Flips between manual and bot play. Returns the new mode.
    pub fn toggle_bot_mode<H: Hooks + ?Sized>(&mut self, hooks: &mut H) -> InputMode {
        let mode = self.input_mode().toggled();
        self.set_input_mode(mode, hooks);
        mode
    }

    /// Current player input mode.
    #[must_use]
    pub const fn input_mode(&self) -> InputMode {
        self.player.strategy().mode()
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &PlayConfig {
        &self.config
    }

    /// All notes, sorted by strum time.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// A single note.
    #[must_use]
    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(id.value())
    }

    /// Player statistics.
    #[must_use]
    pub const fn stats(&self) -> &PlayStats {
        &self.stats
    }

    /// Player score counters.
    #[must_use]
    pub const fn score(&self) -> &ScoreState {
        self.stats.aggregator().state()
    }

    /// Hold slots of a side.
    #[must_use]
    pub const fn active_holds(&self, owner: Owner) -> &ActiveHolds {
        match owner {
            Owner::Player => self.player.holds(),
            Owner::Enemy => self.enemy.holds(),
        }
    }

    /// Note held on `direction` by `owner`.
    #[must_use]
    pub fn active_hold(&self, owner: Owner, direction: NoteDirection) -> Option<NoteId> {
        self.active_holds(owner).get(direction)
    }

    /// Song position of the latest update.
    #[must_use]
    pub const fn song_position(&self) -> f64 {
        self.song_position
    }

    /// Warnings from chart normalization.
    #[must_use]
    pub fn warnings(&self) -> &[ChartWarning] {
        &self.warnings
    }

    /// Whether nothing is left to judge: every note is resolved or was left
    /// behind unspawned, and no hold is in progress.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let abandon_before = self.song_position - self.config.trailing_window_ms;
        self.notes.iter().all(|note| {
            (note.is_resolved() && !note.is_being_held())
                || (!note.spawned() && note.strum_time() < abandon_before)
        })
    }
}
