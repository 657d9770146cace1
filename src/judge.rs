//! Timing judgment policy.
//!
//! Pure functions over a signed timing delta `actual - strum_time` in
//! milliseconds. Positive deltas are late hits, negative deltas are early hits.

pub mod resolver;

use std::fmt;

pub use self::resolver::{JudgeResult, judge_input, long_missed};

/// Judgment window thresholds and scoring constants, in milliseconds.
pub mod hit_window {
    /// Widest `|delta|` judged as Sick.
    pub const SICK: f64 = 45.0;
    /// Widest `|delta|` judged as Good.
    pub const GOOD: f64 = 90.0;
    /// Widest `|delta|` judged as Bad.
    pub const BAD: f64 = 135.0;
    /// Widest `|delta|` judged as Shit. Anything wider is a miss.
    pub const SHIT: f64 = 160.0;
    /// Widest `|delta|` a press can resolve a note at.
    pub const MAX_JUDGE_RANGE: f64 = SHIT;
    /// Grace margin after [`MAX_JUDGE_RANGE`] before an untouched note counts as missed.
    pub const MISS_OFFSET: f64 = 50.0;

    /// Score of a perfectly timed hit.
    pub const MAX_SCORE: i64 = 500;
    /// Deltas strictly below this score [`MAX_SCORE`].
    pub const PERFECT_THRESHOLD: f64 = 5.0;
    /// Center of the logistic falloff.
    pub const SCORING_OFFSET: f64 = 54.99;
    /// Steepness of the logistic falloff.
    pub const SCORING_SLOPE: f64 = 0.080;
    /// Floor added to the logistic curve.
    pub const MIN_SCORE: f64 = 9.0;
    /// Score of a miss.
    pub const MISS_SCORE: i64 = -100;
}

/// Accuracy tier of a single judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Judgment {
    /// `|delta| <= 45`.
    Sick,
    /// `|delta| <= 90`.
    Good,
    /// `|delta| <= 135`.
    Bad,
    /// `|delta| <= 160`.
    Shit,
    /// Outside every window, or never hit.
    Miss,
}

impl Judgment {
    /// All tiers, strictest first.
    pub const ALL: [Self; 5] = [Self::Sick, Self::Good, Self::Bad, Self::Shit, Self::Miss];

    /// Lower case name such as `"sick"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sick => "sick",
            Self::Good => "good",
            Self::Bad => "bad",
            Self::Shit => "shit",
            Self::Miss => "miss",
        }
    }

    /// Whether this tier counts as a hit for accuracy. Shit does not.
    #[must_use]
    pub const fn counts_as_hit(self) -> bool {
        matches!(self, Self::Sick | Self::Good | Self::Bad)
    }

    /// Whether this tier keeps the combo going.
    #[must_use]
    pub const fn keeps_combo(self) -> bool {
        self.counts_as_hit()
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies a signed delta into a tier. Boundaries are inclusive on the inner side.
#[must_use]
pub fn judge(delta: f64) -> Judgment {
    let abs = delta.abs();
    if abs <= hit_window::SICK {
        Judgment::Sick
    } else if abs <= hit_window::GOOD {
        Judgment::Good
    } else if abs <= hit_window::BAD {
        Judgment::Bad
    } else if abs <= hit_window::SHIT {
        Judgment::Shit
    } else {
        Judgment::Miss
    }
}

/// Continuous score for a signed delta.
///
/// Non-finite deltas score as a miss.
#[must_use]
pub fn score(delta: f64) -> i64 {
    let abs = delta.abs();
    if !(abs <= hit_window::MAX_JUDGE_RANGE) {
        return hit_window::MISS_SCORE;
    }
    if abs < hit_window::PERFECT_THRESHOLD {
        return hit_window::MAX_SCORE;
    }
    let factor = 1.0
        - 1.0 / (1.0 + (-hit_window::SCORING_SLOPE * (abs - hit_window::SCORING_OFFSET)).exp());
    (hit_window::MAX_SCORE as f64 * factor + hit_window::MIN_SCORE).floor() as i64
}

/// Whether a late delta is beyond the press window.
#[must_use]
pub fn is_too_late(delta: f64) -> bool {
    delta > hit_window::MAX_JUDGE_RANGE
}

/// Whether a late delta is beyond the passive miss threshold.
#[must_use]
pub fn is_long_miss(delta: f64) -> bool {
    delta > hit_window::MAX_JUDGE_RANGE + hit_window::MISS_OFFSET
}
