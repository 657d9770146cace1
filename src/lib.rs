//! The gameplay core of a four-arrow rhythm game.
//!
//! A chart of timed notes scrolls toward a strum line. The player presses
//! arrows as notes arrive, each press is judged by how far it was from the
//! note time, and a CPU opponent plays its own notes automatically. This crate
//! decides, for a song position and a player action, which note is affected
//! and what judgment and score result. Rendering, audio, and asset loading are
//! left to the host, which receives commands through [`view::NoteView`] and
//! [`view::Feedback`].
//!
//! The pieces, leaf first:
//!
//! - [`direction`] names the four arrows.
//! - [`conductor`] is the BPM clock emitting beat and step events.
//! - [`chart`] holds raw charts and turns them into sorted [`note::Note`]s.
//! - [`judge`] classifies timing deltas and finds the note a press hits.
//! - [`lifecycle`] spawns and moves notes and tracks hold bodies.
//! - [`lane`] resolves notes, by input or automatically.
//! - [`score`] and [`health`] keep statistics.
//! - [`session`] ties everything together per frame.
//!
//! ```
//! use funkin_rs::prelude::*;
//!
//! let chart = Chart::with_sections(
//!     100.0,
//!     vec![Section::new(true, vec![NoteEntry::tap(1000.0, 0)])],
//! );
//! let mut session = PlaySession::from_chart(&chart).unwrap();
//!
//! session.update(0.0, 16.0, &mut ());
//! let result = session.press(NoteDirection::Left, 1010.0, &mut ()).unwrap();
//! assert_eq!(result.judgment, Judgment::Sick);
//! assert_eq!(session.score().score, 495);
//! ```
//!
//! # Features
//!
//! - `serde`: derives `Serialize` and `Deserialize` on public data types.
//! - `json` (default): chart loading from JSON, see [`chart::json`].

pub mod chart;
pub mod conductor;
pub mod config;
pub mod direction;
pub mod health;
pub mod judge;
pub mod lane;
pub mod lifecycle;
pub mod note;
pub mod prelude;
pub mod score;
pub mod session;
pub mod view;
