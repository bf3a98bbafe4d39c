//! G-Code interpretation
//!
//! This module provides:
//! - Line tokenization (comments, command number, parameter words)
//! - The motion parser producing a [`gcodeview_core::MotionProgram`]

pub mod command;
pub mod parser;

pub use command::{strip_comments, GcodeLine, Words};
pub use parser::{DistanceMode, GcodeParser, ParserConfig, MAX_SEGMENT_SAMPLES};
