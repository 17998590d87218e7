//! `EmoSpy` - pass-and-play social deduction game
//!
//! One player is secretly the outsider; everyone else shares a hidden
//! emotion, each paired with a different situation. After a private
//! reveal and a timed discussion, the outsider tries to name the emotion.
//!
//! The [`game`] module is the engine; [`session`] drives it from a
//! terminal.

pub mod cli;
pub mod config;
pub mod error;
pub mod game;
pub mod observability;
pub mod session;
