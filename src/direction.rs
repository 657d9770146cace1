//! Strum directions and a fixed per-direction table.
//!
//! Every note and every strum belongs to one of the four arrows. The raw
//! chart stores them as integers `0..=7` where the upper half belongs to
//! the other side; [`NoteDirection::from_int`] folds any integer back into
//! the canonical range.

use std::fmt;
use std::ops::{Index, IndexMut};

use thiserror::Error;

/// One of the four arrows of a strumline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NoteDirection {
    /// Purple arrow, index 0.
    Left = 0,
    /// Blue arrow, index 1.
    Down = 1,
    /// Green arrow, index 2.
    Up = 2,
    /// Red arrow, index 3.
    Right = 3,
}

/// Error for strict conversions from integers which are out of `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("direction must be in 0..=3, got {0}")]
pub struct InvalidDirection(pub i64);

impl NoteDirection {
    /// Number of directions.
    pub const COUNT: usize = 4;

    /// All directions in index order.
    pub const ALL: [Self; Self::COUNT] = [Self::Left, Self::Down, Self::Up, Self::Right];

    /// Folds any integer into a valid direction with Euclidean modulo, so `5` is
    /// [`NoteDirection::Down`] and `-1` is [`NoteDirection::Right`].
    #[must_use]
    pub const fn from_int(value: i64) -> Self {
        Self::ALL[value.rem_euclid(Self::COUNT as i64) as usize]
    }

    /// Index of this direction in `0..4`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lower case name such as `"left"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Down => "down",
            Self::Up => "up",
            Self::Right => "right",
        }
    }

    /// Upper case name such as `"LEFT"`.
    #[must_use]
    pub const fn name_upper(self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Down => "DOWN",
            Self::Up => "UP",
            Self::Right => "RIGHT",
        }
    }

    /// Arrow color as a `#RRGGBB` string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Left => "#C241B8",
            Self::Down => "#00FFFF",
            Self::Up => "#12FA05",
            Self::Right => "#F9393F",
        }
    }

    /// Name of the arrow color, as used by note skin frame names.
    #[must_use]
    pub const fn color_name(self) -> &'static str {
        match self {
            Self::Left => "purple",
            Self::Down => "blue",
            Self::Up => "green",
            Self::Right => "red",
        }
    }
}

impl fmt::Display for NoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i64> for NoteDirection {
    type Error = InvalidDirection;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        (0..Self::COUNT as i64)
            .contains(&value)
            .then(|| Self::from_int(value))
            .ok_or(InvalidDirection(value))
    }
}

impl TryFrom<u8> for NoteDirection {
    type Error = InvalidDirection;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl From<NoteDirection> for usize {
    fn from(direction: NoteDirection) -> Self {
        direction.index()
    }
}

/// A value for each of the four directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PerDirection<T>([T; NoteDirection::COUNT]);

impl<T> PerDirection<T> {
    /// Creates a table from values in direction index order.
    #[must_use]
    pub const fn new(values: [T; NoteDirection::COUNT]) -> Self {
        Self(values)
    }

    /// Iterates over `(direction, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (NoteDirection, &T)> {
        NoteDirection::ALL.into_iter().zip(self.0.iter())
    }

    /// Iterates mutably over `(direction, value)` pairs in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (NoteDirection, &mut T)> {
        NoteDirection::ALL.into_iter().zip(self.0.iter_mut())
    }
}

impl<T> Index<NoteDirection> for PerDirection<T> {
    type Output = T;

    fn index(&self, direction: NoteDirection) -> &Self::Output {
        &self.0[direction.index()]
    }
}

impl<T> IndexMut<NoteDirection> for PerDirection<T> {
    fn index_mut(&mut self, direction: NoteDirection) -> &mut Self::Output {
        &mut self.0[direction.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_int_wraps() {
        assert_eq!(NoteDirection::from_int(0), NoteDirection::Left);
        assert_eq!(NoteDirection::from_int(5), NoteDirection::Down);
        assert_eq!(NoteDirection::from_int(7), NoteDirection::Right);
        assert_eq!(NoteDirection::from_int(-1), NoteDirection::Right);
        assert_eq!(NoteDirection::from_int(-6), NoteDirection::Up);
    }

    #[test]
    fn test_strict_conversion() {
        assert_eq!(NoteDirection::try_from(2_i64), Ok(NoteDirection::Up));
        assert_eq!(NoteDirection::try_from(4_i64), Err(InvalidDirection(4)));
        assert_eq!(NoteDirection::try_from(-1_i64), Err(InvalidDirection(-1)));
        assert_eq!(NoteDirection::try_from(3_u8), Ok(NoteDirection::Right));
    }

    #[test]
    fn test_lookups() {
        assert_eq!(NoteDirection::Up.name(), "up");
        assert_eq!(NoteDirection::Up.name_upper(), "UP");
        assert_eq!(NoteDirection::Left.color_name(), "purple");
        assert_eq!(NoteDirection::Right.color(), "#F9393F");
        assert_eq!(NoteDirection::Down.to_string(), "down");
    }

    #[test]
    fn test_per_direction_indexing() {
        let mut table = PerDirection::<u32>::default();
        table[NoteDirection::Up] += 3;
        assert_eq!(table[NoteDirection::Up], 3);
        assert_eq!(table[NoteDirection::Left], 0);
        let collected: Vec<_> = table.iter().map(|(d, v)| (d, *v)).collect();
        assert_eq!(collected[2], (NoteDirection::Up, 3));
    }
}
