//! BPM derived beat and step clock.
//!
//! The conductor can run in two modes:
//!
//! - Active: [`Conductor::start`] and then [`Conductor::tick`] with frame deltas.
//! - Passive: [`Conductor::sync`] with the authoritative song position.
//!
//! Both funnel into the same step derivation, so listeners see identical events
//! regardless of who drives the clock. Judgment never consults the conductor; it
//! reads the same song position directly.

use std::fmt;

use log::debug;
use thiserror::Error;

/// BPM used when a chart does not provide one.
pub const DEFAULT_BPM: f64 = 130.0;

/// Number of steps in one beat.
pub const STEPS_PER_BEAT: u32 = 4;

/// Beats of pre-roll between the countdown start and the song start.
pub const COUNTDOWN_BEATS: f64 = 5.0;

/// Errors on configuring a [`Conductor`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConductorError {
    /// BPM was zero, negative, or not finite.
    #[error("bpm must be a positive finite number, got {0}")]
    InvalidBpm(f64),
}

/// Kind of event a listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConductorEvent {
    /// Fired when the beat counter advances. The payload is the new beat.
    Beat,
    /// Fired when the step counter advances. The payload is the new step.
    Step,
}

/// Handle returned by [`Conductor::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub usize);

impl SubscriptionId {
    /// Returns the contained id value.
    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }
}

impl From<SubscriptionId> for usize {
    fn from(id: SubscriptionId) -> Self {
        id.0
    }
}

struct Listener {
    id: SubscriptionId,
    event: ConductorEvent,
    callback: Box<dyn FnMut(u32)>,
}

/// The beat clock.
pub struct Conductor {
    bpm: f64,
    crochet: f64,
    step_crochet: f64,
    song_position: f64,
    is_playing: bool,
    last_beat: u32,
    last_step: u32,
    listeners: Vec<Listener>,
    next_id: usize,
}

impl Conductor {
    /// Creates a stopped conductor at the given BPM.
    ///
    /// # Errors
    ///
    /// Returns [`ConductorError::InvalidBpm`] if `bpm` is not a positive finite number.
    pub fn new(bpm: f64) -> Result<Self, ConductorError> {
        let (crochet, step_crochet) = Self::crochets(bpm)?;
        Ok(Self {
            bpm,
            crochet,
            step_crochet,
            song_position: 0.0,
            is_playing: false,
            last_beat: 0,
            last_step: 0,
            listeners: Vec::new(),
            next_id: 0,
        })
    }

    fn crochets(bpm: f64) -> Result<(f64, f64), ConductorError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(ConductorError::InvalidBpm(bpm));
        }
        let crochet = 60.0 / bpm * 1000.0;
        Ok((crochet, crochet / f64::from(STEPS_PER_BEAT)))
    }

    /// Changes the BPM and recomputes the beat and step lengths.
    ///
    /// Counters are kept as they are, so they still only move forward.
    ///
    /// # Errors
    ///
    /// Returns [`ConductorError::InvalidBpm`] and leaves the clock untouched if
    /// `bpm` is not a positive finite number.
    pub fn set_bpm(&mut self, bpm: f64) -> Result<(), ConductorError> {
        let (crochet, step_crochet) = Self::crochets(bpm)?;
        self.bpm = bpm;
        self.crochet = crochet;
        self.step_crochet = step_crochet;
        Ok(())
    }

    /// Current BPM.
    #[must_use]
    pub const fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Length of a beat in milliseconds.
    #[must_use]
    pub const fn crochet(&self) -> f64 {
        self.crochet
    }

    /// Length of a step in milliseconds.
    #[must_use]
    pub const fn step_crochet(&self) -> f64 {
        self.step_crochet
    }

    /// Last song position seen, in milliseconds.
    #[must_use]
    pub const fn song_position(&self) -> f64 {
        self.song_position
    }

    /// Whether [`Conductor::tick`] advances the clock.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Latest beat emitted.
    #[must_use]
    pub const fn last_beat(&self) -> u32 {
        self.last_beat
    }

    /// Latest step emitted.
    #[must_use]
    pub const fn last_step(&self) -> u32 {
        self.last_step
    }

    /// Fraction of the current beat already elapsed, in `[0, 1)`.
    #[must_use]
    pub fn beat_progress(&self) -> f64 {
        if self.song_position < 0.0 {
            return 0.0;
        }
        (self.song_position % self.crochet) / self.crochet
    }

    /// Pre-roll length between the countdown start and the song start.
    #[must_use]
    pub fn countdown_duration(&self) -> f64 {
        self.crochet * COUNTDOWN_BEATS
    }

    /// Starts the active mode from position zero.
    pub fn start(&mut self) {
        self.is_playing = true;
        self.song_position = 0.0;
        self.last_beat = 0;
        self.last_step = 0;
        debug!("conductor started at {} bpm", self.bpm);
    }

    /// Stops the active mode. Listeners stay registered.
    pub fn stop(&mut self) {
        self.is_playing = false;
        debug!("conductor stopped at {:.3} ms", self.song_position);
    }

    /// Registers a listener and returns a handle for [`Conductor::off`].
    pub fn on(&mut self, event: ConductorEvent, callback: impl FnMut(u32) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            event,
            callback: Box::new(callback),
        });
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Advances the active clock by `delta_ms`. Does nothing while stopped.
    pub fn tick(&mut self, delta_ms: f64) {
        if !self.is_playing {
            return;
        }
        self.song_position += delta_ms;
        self.advance_steps(self.song_position);
    }

    /// Sets the song position from an authoritative source such as the audio
    /// transport.
    ///
    /// Negative positions (pre-roll) are stored but do not derive any beat.
    pub fn sync(&mut self, song_position_ms: f64) {
        self.song_position = song_position_ms;
        self.advance_steps(song_position_ms);
    }

    /// Emits at most one step and one beat for the latest step reached.
    fn advance_steps(&mut self, position: f64) {
        if !(position >= 0.0) {
            return;
        }
        let new_step = (position / self.step_crochet).floor() as u32;
        if new_step <= self.last_step {
            return;
        }
        self.last_step = new_step;
        self.emit(ConductorEvent::Step, new_step);

        let new_beat = new_step / STEPS_PER_BEAT;
        if new_beat > self.last_beat {
            self.last_beat = new_beat;
            self.emit(ConductorEvent::Beat, new_beat);
        }
    }

    fn emit(&mut self, event: ConductorEvent, value: u32) {
        self.listeners
            .iter_mut()
            .filter(|listener| listener.event == event)
            .for_each(|listener| (listener.callback)(value));
    }
}

impl Default for Conductor {
    fn default() -> Self {
        let (crochet, step_crochet) = (60.0 / DEFAULT_BPM * 1000.0, 60.0 / DEFAULT_BPM * 250.0);
        Self {
            bpm: DEFAULT_BPM,
            crochet,
            step_crochet,
            song_position: 0.0,
            is_playing: false,
            last_beat: 0,
            last_step: 0,
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl fmt::Debug for Conductor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conductor")
            .field("bpm", &self.bpm)
            .field("crochet", &self.crochet)
            .field("step_crochet", &self.step_crochet)
            .field("song_position", &self.song_position)
            .field("is_playing", &self.is_playing)
            .field("last_beat", &self.last_beat)
            .field("last_step", &self.last_step)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recorder(conductor: &mut Conductor, event: ConductorEvent) -> Rc<RefCell<Vec<u32>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        conductor.on(event, move |value| sink.borrow_mut().push(value));
        seen
    }

    #[test]
    fn test_crochet_from_bpm() {
        let conductor = Conductor::new(100.0).unwrap();
        assert!((conductor.crochet() - 600.0).abs() < 1e-9);
        assert!((conductor.step_crochet() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_bpm_rejected() {
        assert_eq!(Conductor::new(0.0).unwrap_err(), ConductorError::InvalidBpm(0.0));
        assert!(Conductor::new(-120.0).is_err());
        assert!(Conductor::new(f64::NAN).is_err());

        let mut conductor = Conductor::new(120.0).unwrap();
        assert!(conductor.set_bpm(f64::INFINITY).is_err());
        assert!((conductor.bpm() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_matches_new() {
        let default = Conductor::default();
        let explicit = Conductor::new(DEFAULT_BPM).unwrap();
        assert!((default.crochet() - explicit.crochet()).abs() < 1e-9);
        assert!((default.step_crochet() - explicit.step_crochet()).abs() < 1e-9);
    }

    #[test]
    fn test_sync_fires_latest_step_only() {
        let mut conductor = Conductor::new(100.0).unwrap();
        let steps = recorder(&mut conductor, ConductorEvent::Step);
        let beats = recorder(&mut conductor, ConductorEvent::Beat);

        conductor.sync(150.0);
        conductor.sync(151.0);
        assert_eq!(*steps.borrow(), vec![1]);
        assert!(beats.borrow().is_empty());

        // Jumping several steps emits only the latest one.
        conductor.sync(1000.0);
        assert_eq!(*steps.borrow(), vec![1, 6]);
        assert_eq!(*beats.borrow(), vec![1]);
    }

    #[test]
    fn test_negative_position_is_ignored() {
        let mut conductor = Conductor::new(100.0).unwrap();
        let steps = recorder(&mut conductor, ConductorEvent::Step);
        conductor.sync(-500.0);
        assert!(steps.borrow().is_empty());
        assert_eq!(conductor.last_step(), 0);
        assert!((conductor.song_position() + 500.0).abs() < 1e-9);
        assert!(conductor.beat_progress().abs() < 1e-9);
    }

    #[test]
    fn test_tick_only_while_playing() {
        let mut conductor = Conductor::new(100.0).unwrap();
        conductor.tick(500.0);
        assert!(conductor.song_position().abs() < 1e-9);

        conductor.start();
        conductor.tick(300.0);
        assert_eq!(conductor.last_step(), 2);
        conductor.stop();
        conductor.tick(300.0);
        assert_eq!(conductor.last_step(), 2);
    }

    #[test]
    fn test_listeners_survive_stop_and_unsubscribe_by_id() {
        let mut conductor = Conductor::new(100.0).unwrap();
        let steps = recorder(&mut conductor, ConductorEvent::Step);
        let extra = conductor.on(ConductorEvent::Step, |_| {});
        assert_eq!(conductor.listener_count(), 2);

        conductor.start();
        conductor.stop();
        conductor.start();
        conductor.tick(150.0);
        assert_eq!(*steps.borrow(), vec![1]);

        assert!(conductor.off(extra));
        assert!(!conductor.off(extra));
        assert_eq!(conductor.listener_count(), 1);
    }

    #[test]
    fn test_countdown_and_progress() {
        let mut conductor = Conductor::new(100.0).unwrap();
        assert!((conductor.countdown_duration() - 3000.0).abs() < 1e-9);
        conductor.sync(900.0);
        assert!((conductor.beat_progress() - 0.5).abs() < 1e-9);
    }
}
