//! Player health gauge.
//!
//! The gauge keeps two values: the target, which judgments move at once, and
//! the displayed value, which eases toward the target every frame.

use crate::judge::Judgment;

/// Lowest health.
pub const MIN_HEALTH: f64 = 0.0;
/// Highest health.
pub const MAX_HEALTH: f64 = 2.0;
/// Health at the start of a song.
pub const INITIAL_HEALTH: f64 = 1.0;
/// Scale applied to heal amounts.
pub const HEAL_MULTIPLIER: f64 = 0.023;
/// Scale applied to damage amounts.
pub const DAMAGE_MULTIPLIER: f64 = 0.04;
/// Values below this snap to zero.
const ZERO_SNAP: f64 = 0.001;
/// Easing rate of the displayed value, per second.
const EASE_RATE: f64 = 5.0;

fn round_health(value: f64) -> f64 {
    let rounded = (value * 10000.0).round() / 10000.0;
    if rounded < ZERO_SNAP { 0.0 } else { rounded }
}

/// Health gauge in `[0, 2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthGauge {
    target: f64,
    displayed: f64,
}

impl Default for HealthGauge {
    fn default() -> Self {
        Self {
            target: INITIAL_HEALTH,
            displayed: INITIAL_HEALTH,
        }
    }
}

impl HealthGauge {
    /// Creates a gauge at [`INITIAL_HEALTH`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Health after the latest judgment.
    #[must_use]
    pub const fn target(&self) -> f64 {
        self.target
    }

    /// Eased health for display.
    #[must_use]
    pub const fn displayed(&self) -> f64 {
        self.displayed
    }

    /// Whether the target dropped to zero.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.target <= MIN_HEALTH
    }

    /// Whether the player icon should show its losing frame.
    #[must_use]
    pub fn player_losing(&self) -> bool {
        self.displayed < 0.4
    }

    /// Whether the opponent icon should show its losing frame.
    #[must_use]
    pub fn enemy_losing(&self) -> bool {
        self.displayed > 1.6
    }

    /// Sets the target, rounded to 4 decimals and clamped into range.
    pub fn set(&mut self, value: f64) {
        self.target = round_health(value.clamp(MIN_HEALTH, MAX_HEALTH));
    }

    /// Raises the target by `amount * HEAL_MULTIPLIER`.
    pub fn heal(&mut self, amount: f64) {
        self.set((self.target + amount * HEAL_MULTIPLIER).min(MAX_HEALTH));
    }

    /// Lowers the target by `amount * DAMAGE_MULTIPLIER`.
    pub fn damage(&mut self, amount: f64) {
        self.set((self.target - amount * DAMAGE_MULTIPLIER).max(MIN_HEALTH));
    }

    /// Applies the heal or damage a judgment is worth.
    pub fn apply(&mut self, judgment: Judgment) {
        match judgment {
            Judgment::Sick => self.heal(1.5),
            Judgment::Good => self.heal(1.0),
            Judgment::Bad => self.heal(0.5),
            Judgment::Shit => self.damage(1.0),
            Judgment::Miss => self.damage(1.5),
        }
    }

    /// Eases the displayed value toward the target over `elapsed_secs`.
    pub fn smooth(&mut self, elapsed_secs: f64) {
        if !(elapsed_secs > 0.0) {
            return;
        }
        let factor = 1.0 - (-elapsed_secs * EASE_RATE).exp();
        self.displayed = round_health(self.displayed + (self.target - self.displayed) * factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_judgment_amounts() {
        let mut gauge = HealthGauge::new();
        gauge.apply(Judgment::Sick);
        assert!((gauge.target() - 1.0345).abs() < 1e-9);
        gauge.apply(Judgment::Miss);
        assert!((gauge.target() - 0.9745).abs() < 1e-9);
        gauge.apply(Judgment::Shit);
        assert!((gauge.target() - 0.9345).abs() < 1e-9);
        // The displayed value has not moved yet.
        assert!((gauge.displayed() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_and_snapped() {
        let mut gauge = HealthGauge::new();
        gauge.set(5.0);
        assert!((gauge.target() - MAX_HEALTH).abs() < 1e-9);
        gauge.heal(1.5);
        assert!((gauge.target() - MAX_HEALTH).abs() < 1e-9);
        gauge.set(0.0004);
        assert!(gauge.is_depleted());
        gauge.damage(1.5);
        assert!(gauge.target().abs() < 1e-12);
    }

    #[test]
    fn test_smoothing_converges() {
        let mut gauge = HealthGauge::new();
        gauge.set(2.0);
        gauge.smooth(0.0);
        assert!((gauge.displayed() - 1.0).abs() < 1e-9);
        gauge.smooth(0.1);
        let first = gauge.displayed();
        assert!(first > 1.0 && first < 2.0);
        for _ in 0..100 {
            gauge.smooth(0.1);
        }
        assert!((gauge.displayed() - 2.0).abs() < 1e-3);
        assert!(gauge.enemy_losing());
        assert!(!gauge.player_losing());
    }
}
