//! The terminal reaction-time game.
//!
//! `state` holds the pure state machine, `timer` the one-shot green timer,
//! and `session` ties both to stdin, stdout and the leaderboard client.

pub mod error;
pub mod render;
pub mod session;
pub mod state;
pub mod timer;

// --- Public API ---
pub use error::GameError;
pub use session::{Flow, Input, Session, SessionEvent};
pub use state::{Command, Game, GameEvent, GameState, Round};
pub use timer::{random_delay, GreenTimer};
