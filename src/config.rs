//! Play session configuration.
//!
//! Every field has a default, so a host may deserialize a partial
//! configuration (with the `serde` feature) and fill the rest from the chart.

use thiserror::Error;

use crate::{chart::Chart, conductor::DEFAULT_BPM};

/// Spawn lookahead at speed `1`, in milliseconds.
pub const BASE_LEAD_TIME: f64 = 2000.0;

/// How far behind the song position notes may still spawn, in milliseconds.
pub const DEFAULT_TRAILING_WINDOW: f64 = 1500.0;

/// Pixels per millisecond at speed `1` and 100 BPM.
pub const BASE_SCROLL_RATE: f64 = 0.3;

/// Errors on building a [`PlayConfig`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConfigError {
    /// BPM was zero, negative, or not finite.
    #[error("bpm must be a positive finite number, got {0}")]
    InvalidBpm(f64),
    /// Speed was zero, negative, or not finite.
    #[error("speed must be a positive finite number, got {0}")]
    InvalidSpeed(f64),
    /// The trailing spawn window was negative or not finite.
    #[error("trailing window must be a non-negative finite number, got {0}")]
    InvalidTrailingWindow(f64),
    /// Hold pieces would not advance along the scroll axis.
    #[error("hold pieces must have a positive effective height, got {0}")]
    InvalidHoldGeometry(f64),
}

/// Whether the player side takes real input or plays itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum InputMode {
    /// Notes are resolved by presses and releases.
    #[default]
    Manual,
    /// Notes are auto-resolved at their strum time.
    Bot,
}

impl InputMode {
    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Manual => Self::Bot,
            Self::Bot => Self::Manual,
        }
    }
}

/// Layout of a hold body, used to derive how many segments it has and when
/// the strum line crosses each of them. Lengths are in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HoldGeometry {
    /// Unscaled height of one body piece.
    pub piece_height: f64,
    /// Unscaled overlap between consecutive pieces, usually negative.
    pub piece_overlap: f64,
    /// Scale applied to pieces.
    pub scale: f64,
    /// Offset from a piece origin to its top edge.
    pub head_offset: f64,
    /// Slack allowed when testing whether a piece crossed the strum line.
    pub crossing_tolerance: f64,
}

impl Default for HoldGeometry {
    fn default() -> Self {
        Self {
            piece_height: 44.0,
            piece_overlap: -40.0,
            scale: 0.7,
            head_offset: 24.0,
            crossing_tolerance: 3.0,
        }
    }
}

impl HoldGeometry {
    /// Distance between the origins of consecutive pieces.
    #[must_use]
    pub fn effective_piece_height(&self) -> f64 {
        (self.piece_height + self.piece_overlap) * self.scale
    }

    /// Number of segments of a hold, end cap included. `0` for taps.
    #[must_use]
    pub fn segment_count(&self, sustain_length: f64, scroll_speed: f64) -> u32 {
        if !(sustain_length > 0.0) {
            return 0;
        }
        let pieces = (sustain_length * scroll_speed / self.effective_piece_height()).ceil();
        pieces.max(1.0) as u32 + 1
    }

    /// Whether segment `index` has reached the strum line when the note head is
    /// `time_to_strum` milliseconds away from it.
    #[must_use]
    pub fn segment_crossed(&self, index: u32, time_to_strum: f64, scroll_speed: f64) -> bool {
        let top = time_to_strum * scroll_speed + f64::from(index) * self.effective_piece_height()
            - self.head_offset;
        top <= self.crossing_tolerance
    }

    /// Checks that pieces advance along the scroll axis.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHoldGeometry`] if the effective piece height is not positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let effective = self.effective_piece_height();
        if effective.is_finite() && effective > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidHoldGeometry(effective))
        }
    }
}

/// Tunables of a play session.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayConfig {
    /// Song tempo, used for scroll speed.
    pub bpm: f64,
    /// Chart scroll speed multiplier.
    pub speed: f64,
    /// How far behind the song position notes may still spawn.
    pub trailing_window_ms: f64,
    /// Hold body layout.
    pub hold_geometry: HoldGeometry,
    /// Initial player input mode.
    pub input_mode: InputMode,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            speed: 1.0,
            trailing_window_ms: DEFAULT_TRAILING_WINDOW,
            hold_geometry: HoldGeometry::default(),
            input_mode: InputMode::default(),
        }
    }
}

impl PlayConfig {
    /// Creates a configuration with default windows.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `bpm` or `speed` is not a positive finite number.
    pub fn new(bpm: f64, speed: f64) -> Result<Self, ConfigError> {
        let config = Self {
            bpm,
            speed,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Creates a configuration from the chart tempo and speed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the chart tempo or speed is invalid.
    pub fn from_chart(chart: &Chart) -> Result<Self, ConfigError> {
        Self::new(chart.bpm, chart.speed)
    }

    /// Sets the initial input mode.
    #[must_use]
    pub const fn with_input_mode(mut self, input_mode: InputMode) -> Self {
        self.input_mode = input_mode;
        self
    }

    /// Sets the trailing spawn window.
    #[must_use]
    pub const fn with_trailing_window(mut self, trailing_window_ms: f64) -> Self {
        self.trailing_window_ms = trailing_window_ms;
        self
    }

    /// Sets the hold body layout.
    #[must_use]
    pub const fn with_hold_geometry(mut self, hold_geometry: HoldGeometry) -> Self {
        self.hold_geometry = hold_geometry;
        self
    }

    /// Scroll rate in pixels per millisecond.
    #[must_use]
    pub fn scroll_speed(&self) -> f64 {
        self.speed * BASE_SCROLL_RATE * (self.bpm / 100.0)
    }

    /// Spawn lookahead in milliseconds.
    #[must_use]
    pub fn lead_time(&self) -> f64 {
        BASE_LEAD_TIME / self.speed
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(ConfigError::InvalidBpm(self.bpm));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(ConfigError::InvalidSpeed(self.speed));
        }
        if !self.trailing_window_ms.is_finite() || self.trailing_window_ms < 0.0 {
            return Err(ConfigError::InvalidTrailingWindow(self.trailing_window_ms));
        }
        self.hold_geometry.validate()
    }
}
