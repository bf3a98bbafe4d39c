//! Simulated program execution
//!
//! [`PlaybackClock`] is the synchronous state machine; [`PlaybackTimer`]
//! runs one on a tokio task and feeds it wall-clock ticks.

pub mod clock;
pub mod timer;

pub use clock::{PlaybackClock, PlaybackCursor, PlaybackSnapshot, PlaybackState};
pub use timer::{PlaybackCommand, PlaybackConfig, PlaybackTimer};
