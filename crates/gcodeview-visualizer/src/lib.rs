//! # GCodeView Visualizer
//!
//! G-code interpretation and playback for GCodeView. Parses program text into
//! timed motion segments and advances a simulated tool through them.

pub mod gcode;
pub mod playback;

pub use gcode::{strip_comments, DistanceMode, GcodeLine, GcodeParser, ParserConfig, Words};
pub use playback::{
    PlaybackClock, PlaybackCommand, PlaybackConfig, PlaybackCursor, PlaybackSnapshot,
    PlaybackState, PlaybackTimer,
};
