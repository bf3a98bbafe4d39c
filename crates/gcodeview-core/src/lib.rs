//! # GCodeView Core
//!
//! Core types and algorithms shared by the G-code parser and the toolpath
//! synthesizer: geometry primitives, the motion segment model, the curve
//! linearizer, and error types.

pub mod constants;
pub mod error;
pub mod geometry;
pub mod linearize;
pub mod motion;

pub use error::{Error, GcodeError, PlaybackError, Result};
pub use geometry::{Bounds, Point3D};
pub use linearize::{arc_segment_count, linearize_arc, linearize_bulge};
pub use motion::{MotionKind, MotionProgram, MotionSegment, ProgramSummary};
