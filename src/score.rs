//! Score, accuracy, and combo bookkeeping.
//!
//! Judgment logic never reads anything back from here.

use log::trace;

use crate::{
    health::HealthGauge,
    judge::{self, Judgment, hit_window},
};

/// Raw counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreState {
    /// Cumulative score, never negative.
    pub score: i64,
    /// Judgments that count as hits.
    pub hits: u64,
    /// Misses, Shit judgments included.
    pub misses: u64,
}

impl ScoreState {
    /// `hits / (hits + misses)`, or `0` before anything is judged.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Result of recording one judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoreChange {
    /// Tier recorded.
    pub judgment: Judgment,
    /// Nominal score change, before clamping at zero.
    pub score_delta: i64,
}

/// Accumulates judgments into a [`ScoreState`] plus combo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreAggregator {
    state: ScoreState,
    combo: u32,
    max_combo: u32,
    counts: [u64; Judgment::ALL.len()],
}

impl ScoreAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a judged hit with its signed delta.
    ///
    /// Shit still adds its score but counts as a miss for accuracy and breaks
    /// the combo. A [`Judgment::Miss`] is recorded as by [`Self::record_miss`].
    pub fn record_hit(&mut self, judgment: Judgment, delta: f64) -> ScoreChange {
        if judgment == Judgment::Miss {
            return self.record_miss();
        }
        let score_delta = judge::score(delta);
        if judgment.counts_as_hit() {
            self.state.hits += 1;
        } else {
            self.state.misses += 1;
        }
        self.finish(judgment, score_delta)
    }

    /// Records a miss.
    pub fn record_miss(&mut self) -> ScoreChange {
        self.state.misses += 1;
        self.finish(Judgment::Miss, hit_window::MISS_SCORE)
    }

    fn finish(&mut self, judgment: Judgment, score_delta: i64) -> ScoreChange {
        self.state.score = self.state.score.saturating_add(score_delta).max(0);
        if judgment.keeps_combo() {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
        } else {
            self.combo = 0;
        }
        if let Some(count) = self.counts.get_mut(judgment as usize) {
            *count += 1;
        }
        trace!("recorded {judgment} ({score_delta:+}), score {}", self.state.score);
        ScoreChange {
            judgment,
            score_delta,
        }
    }

    /// Raw counters.
    #[must_use]
    pub const fn state(&self) -> &ScoreState {
        &self.state
    }

    /// Cumulative score.
    #[must_use]
    pub const fn score(&self) -> i64 {
        self.state.score
    }

    /// Hit count.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.state.hits
    }

    /// Miss count.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.state.misses
    }

    /// See [`ScoreState::accuracy`].
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.state.accuracy()
    }

    /// Current run of Sick, Good, and Bad judgments.
    #[must_use]
    pub const fn combo(&self) -> u32 {
        self.combo
    }

    /// Longest combo so far.
    #[must_use]
    pub const fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// How many times `judgment` was recorded.
    #[must_use]
    pub fn count(&self, judgment: Judgment) -> u64 {
        self.counts.get(judgment as usize).copied().unwrap_or_default()
    }
}

/// Rating label shown next to the accuracy.
#[must_use]
pub fn rating_label(accuracy: f64) -> &'static str {
    if accuracy >= 1.0 {
        "Perfect!!"
    } else if accuracy >= 0.95 {
        "Sick!"
    } else if accuracy >= 0.9 {
        "Great"
    } else if accuracy >= 0.8 {
        "Good"
    } else if accuracy >= 0.7 {
        "Meh"
    } else {
        "Bad"
    }
}

/// Values a score display needs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreSnapshot {
    /// See [`ScoreState::accuracy`].
    pub accuracy: f64,
    /// Cumulative score.
    pub score: i64,
    /// Miss count.
    pub misses: u64,
    /// Current combo.
    pub combo: u32,
    /// Health target.
    pub health: f64,
}

/// Player side statistics: score and health move together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayStats {
    aggregator: ScoreAggregator,
    health: HealthGauge,
}

impl PlayStats {
    /// Creates empty statistics at initial health.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hit and its health change.
    pub fn record_hit(&mut self, judgment: Judgment, delta: f64) -> ScoreChange {
        let change = self.aggregator.record_hit(judgment, delta);
        self.health.apply(change.judgment);
        change
    }

    /// Records a miss and its health change.
    pub fn record_miss(&mut self) -> ScoreChange {
        let change = self.aggregator.record_miss();
        self.health.apply(change.judgment);
        change
    }

    /// Score and combo.
    #[must_use]
    pub const fn aggregator(&self) -> &ScoreAggregator {
        &self.aggregator
    }

    /// Health gauge.
    #[must_use]
    pub const fn health(&self) -> &HealthGauge {
        &self.health
    }

    /// Mutable health gauge, for per-frame smoothing.
    pub const fn health_mut(&mut self) -> &mut HealthGauge {
        &mut self.health
    }

    /// Rating label for the current accuracy.
    #[must_use]
    pub fn rating(&self) -> &'static str {
        rating_label(self.aggregator.accuracy())
    }

    /// Current values for a score display.
    #[must_use]
    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            accuracy: self.aggregator.accuracy(),
            score: self.aggregator.score(),
            misses: self.aggregator.misses(),
            combo: self.aggregator.combo(),
            health: self.health.target(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_shit_counts_as_miss_for_accuracy() {
        let mut aggregator = ScoreAggregator::new();
        let change = aggregator.record_hit(Judgment::Sick, 10.0);
        assert_eq!(change.score_delta, 495);
        aggregator.record_hit(Judgment::Shit, 150.0);
        assert_eq!(
            *aggregator.state(),
            ScoreState {
                score: 504,
                hits: 1,
                misses: 1
            }
        );
        assert!((aggregator.accuracy() - 0.5).abs() < 1e-9);
        assert_eq!(aggregator.count(Judgment::Shit), 1);
    }

    #[test]
    fn test_score_never_negative() {
        let mut aggregator = ScoreAggregator::new();
        assert_eq!(aggregator.record_miss().score_delta, -100);
        assert_eq!(aggregator.score(), 0);
        aggregator.record_hit(Judgment::Good, 60.0);
        aggregator.record_miss();
        assert!(aggregator.score() >= 0);
        assert_eq!(aggregator.accuracy(), 1.0 / 3.0);
    }

    #[test]
    fn test_accuracy_before_judgments() {
        assert_eq!(ScoreState::default().accuracy(), 0.0);
    }

    #[test]
    fn test_combo() {
        let mut aggregator = ScoreAggregator::new();
        aggregator.record_hit(Judgment::Sick, 0.0);
        aggregator.record_hit(Judgment::Bad, 120.0);
        aggregator.record_hit(Judgment::Good, -70.0);
        assert_eq!(aggregator.combo(), 3);
        aggregator.record_hit(Judgment::Shit, 150.0);
        assert_eq!(aggregator.combo(), 0);
        aggregator.record_hit(Judgment::Sick, 0.0);
        aggregator.record_miss();
        assert_eq!(aggregator.combo(), 0);
        assert_eq!(aggregator.max_combo(), 3);
    }

    #[test]
    fn test_rating_labels() {
        assert_eq!(rating_label(1.0), "Perfect!!");
        assert_eq!(rating_label(0.96), "Sick!");
        assert_eq!(rating_label(0.9), "Great");
        assert_eq!(rating_label(0.85), "Good");
        assert_eq!(rating_label(0.7), "Meh");
        assert_eq!(rating_label(0.0), "Bad");
    }

    #[test]
    fn test_stats_move_health() {
        let mut stats = PlayStats::new();
        stats.record_miss();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.misses, 1);
        assert!((snapshot.health - 0.94).abs() < 1e-9);
        assert_eq!(stats.rating(), "Bad");
    }
}
