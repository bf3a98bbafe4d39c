//! G-Code motion parser
//!
//! Interprets a G-Code program into a [`MotionProgram`]: one timed, sampled
//! segment per motion command. Modal state (position, distance mode, feed
//! rate) lives in a `ParserState` created fresh for every call, so parsing
//! the same text twice yields identical programs.

use gcodeview_core::constants::SECONDS_PER_MINUTE;
use gcodeview_core::{Error, GcodeError, MotionKind, MotionProgram, MotionSegment, Point3D};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::{debug, trace};

use super::command::{GcodeLine, Words};

/// Upper bound on sampled points per segment
pub const MAX_SEGMENT_SAMPLES: usize = 10_000;

/// Timing and sampling parameters for the motion parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Virtual feed rate (units/min) used to time G0 moves
    pub rapid_feed_rate: f64,
    /// Samples per second of motion for linear moves
    pub linear_sample_rate_hz: f64,
    /// Seconds of motion between arc samples
    pub arc_sample_interval_seconds: f64,
    /// Duration of a non-zero linear move when no feed rate is set
    pub min_linear_duration_seconds: f64,
    /// Duration of an arc when no feed rate is set
    pub arc_fallback_duration_seconds: f64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            rapid_feed_rate: 5000.0,
            linear_sample_rate_hz: 60.0,
            arc_sample_interval_seconds: 0.1,
            min_linear_duration_seconds: 0.01,
            arc_fallback_duration_seconds: 0.1,
        }
    }
}

impl ParserConfig {
    /// Reject non-positive or non-finite rates and intervals
    pub fn validate(&self) -> gcodeview_core::Result<()> {
        let checks = [
            ("Rapid feed rate", self.rapid_feed_rate),
            ("Linear sample rate", self.linear_sample_rate_hz),
            ("Arc sample interval", self.arc_sample_interval_seconds),
            ("Minimum linear duration", self.min_linear_duration_seconds),
            ("Arc fallback duration", self.arc_fallback_duration_seconds),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::other(format!("{} must be > 0, got {}", name, value)));
            }
        }
        Ok(())
    }
}

/// Distance mode (G90/G91)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMode {
    #[default]
    Absolute,
    Relative,
}

/// Modal state threaded through one parse
#[derive(Debug, Clone, Copy, Default)]
struct ParserState {
    position: Point3D,
    mode: DistanceMode,
    feed_rate: f64,
}

impl ParserState {
    fn target(&self, words: &Words) -> Point3D {
        match self.mode {
            DistanceMode::Absolute => Point3D::new(
                words.x.unwrap_or(self.position.x),
                words.y.unwrap_or(self.position.y),
                words.z.unwrap_or(self.position.z),
            ),
            DistanceMode::Relative => Point3D::new(
                self.position.x + words.x.unwrap_or(0.0),
                self.position.y + words.y.unwrap_or(0.0),
                self.position.z + words.z.unwrap_or(0.0),
            ),
        }
    }
}

/// Source line being interpreted
struct SourceLine<'a> {
    number: u32,
    text: &'a str,
}

/// G-Code motion parser
#[derive(Debug, Clone, Default)]
pub struct GcodeParser {
    config: ParserConfig,
}

impl GcodeParser {
    /// Create a parser with default timing
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a complete program.
    ///
    /// Parsing is atomic: a malformed numeric token anywhere fails the whole
    /// call and no partial program is returned.
    pub fn parse(&self, text: &str) -> Result<MotionProgram, GcodeError> {
        debug!("Starting G-code parse, input size: {} bytes", text.len());

        let mut state = ParserState::default();
        let mut program = MotionProgram::new();

        for (index, raw) in text.lines().enumerate() {
            let number = u32::try_from(index + 1).unwrap_or(u32::MAX);
            let Some(line) = GcodeLine::parse(raw, number)? else {
                continue;
            };
            let source = SourceLine {
                number,
                text: raw.trim(),
            };

            if let Some(feed) = line.words.f {
                state.feed_rate = feed;
            }

            match line.command {
                Some(0) => {
                    let feed = self.config.rapid_feed_rate;
                    let segment = self.linear_move(
                        &mut state,
                        &line.words,
                        feed,
                        MotionKind::Rapid,
                        &source,
                    );
                    program.push(segment);
                }
                Some(1) => {
                    let feed = state.feed_rate;
                    let segment = self.linear_move(
                        &mut state,
                        &line.words,
                        feed,
                        MotionKind::Linear,
                        &source,
                    );
                    program.push(segment);
                }
                Some(2) => {
                    let segment = self.arc_move(&mut state, &line.words, true, &source);
                    program.push(segment);
                }
                Some(3) => {
                    let segment = self.arc_move(&mut state, &line.words, false, &source);
                    program.push(segment);
                }
                Some(90) => state.mode = DistanceMode::Absolute,
                Some(91) => state.mode = DistanceMode::Relative,
                Some(other) => trace!("Line {}: G{} ignored", number, other),
                None => {}
            }
        }

        let (rapid, linear, arc) = program.count_by_kind();
        debug!(
            "Parse complete: G0={}, G1={}, G2/G3={}, total segments={}",
            rapid,
            linear,
            arc,
            program.len()
        );
        let bounds = program.bounds();
        debug!(
            "Bounds: x=[{:.2}, {:.2}], y=[{:.2}, {:.2}], z=[{:.2}, {:.2}]",
            bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y, bounds.min_z, bounds.max_z
        );

        Ok(program)
    }

    fn linear_move(
        &self,
        state: &mut ParserState,
        words: &Words,
        feed_rate: f64,
        kind: MotionKind,
        source: &SourceLine<'_>,
    ) -> MotionSegment {
        let from = state.position;
        let to = state.target(words);
        let distance = from.distance_to(&to);

        let duration_seconds = if feed_rate > 0.0 {
            distance / feed_rate * SECONDS_PER_MINUTE
        } else if distance > 0.0 {
            self.config.min_linear_duration_seconds
        } else {
            0.0
        };

        let sample_count = ((duration_seconds * self.config.linear_sample_rate_hz).ceil() as usize)
            .clamp(2, MAX_SEGMENT_SAMPLES);
        let last = sample_count - 1;
        let mut points: Vec<Point3D> = (0..last)
            .map(|i| from.lerp(&to, i as f64 / last as f64))
            .collect();
        points.push(to);

        trace!(
            "Line {}: {} to ({:.3},{:.3},{:.3}), {:.3}s, {} samples",
            source.number,
            kind,
            to.x,
            to.y,
            to.z,
            duration_seconds,
            points.len()
        );

        state.position = to;
        MotionSegment {
            kind,
            points,
            feed_rate,
            distance,
            duration_seconds,
            source_line_number: source.number,
            source_text: source.text.to_string(),
        }
    }

    fn arc_move(
        &self,
        state: &mut ParserState,
        words: &Words,
        clockwise: bool,
        source: &SourceLine<'_>,
    ) -> MotionSegment {
        let from = state.position;
        let to = state.target(words);
        let offset_i = words.i.unwrap_or(0.0);
        let offset_j = words.j.unwrap_or(0.0);
        let center_x = from.x + offset_i;
        let center_y = from.y + offset_j;
        let radius = offset_i.hypot(offset_j);

        let start_angle = (from.y - center_y).atan2(from.x - center_x);
        let mut end_angle = (to.y - center_y).atan2(to.x - center_x);
        if clockwise {
            if end_angle >= start_angle {
                end_angle -= TAU;
            }
        } else if end_angle <= start_angle {
            end_angle += TAU;
        }
        let sweep = end_angle - start_angle;

        let arc_length = radius * sweep.abs();
        let dz = to.z - from.z;
        let distance = (arc_length * arc_length + dz * dz).sqrt();
        let feed_rate = state.feed_rate;
        let duration_seconds = if feed_rate > 0.0 {
            distance / feed_rate * SECONDS_PER_MINUTE
        } else {
            self.config.arc_fallback_duration_seconds
        };

        let intervals = ((duration_seconds / self.config.arc_sample_interval_seconds).ceil()
            as usize)
            .clamp(1, MAX_SEGMENT_SAMPLES - 1);
        let mut points = Vec::with_capacity(intervals + 1);
        points.push(from);
        points.extend((1..intervals).map(|i| {
            let t = i as f64 / intervals as f64;
            let angle = start_angle + sweep * t;
            Point3D::new(
                center_x + radius * angle.cos(),
                center_y + radius * angle.sin(),
                from.z + dz * t,
            )
        }));
        points.push(to);

        trace!(
            "Line {}: arc from=({:.2},{:.2}), to=({:.2},{:.2}), center=({:.2},{:.2}), radius={:.4}, cw={}",
            source.number,
            from.x,
            from.y,
            to.x,
            to.y,
            center_x,
            center_y,
            radius,
            clockwise
        );

        state.position = to;
        MotionSegment {
            kind: MotionKind::Arc,
            points,
            feed_rate,
            distance,
            duration_seconds,
            source_line_number: source.number,
            source_text: source.text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ParserConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_non_positive_values() {
        let config = ParserConfig {
            arc_sample_interval_seconds: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ParserConfig {
            rapid_feed_rate: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_relative_mode_absent_axes_add_zero() {
        let mut state = ParserState {
            position: Point3D::new(1.0, 2.0, 3.0),
            mode: DistanceMode::Relative,
            feed_rate: 0.0,
        };
        let words = Words {
            x: Some(5.0),
            ..Default::default()
        };
        assert_eq!(state.target(&words), Point3D::new(6.0, 2.0, 3.0));

        state.mode = DistanceMode::Absolute;
        assert_eq!(state.target(&words), Point3D::new(5.0, 2.0, 3.0));
    }

    #[test]
    fn test_zero_length_move_still_produces_segment() {
        let program = GcodeParser::new().parse("G1 X0 Y0 F100").unwrap();
        assert_eq!(program.len(), 1);
        let segment = program.segment(0).unwrap();
        assert_eq!(segment.duration_seconds, 0.0);
        assert_eq!(segment.points.len(), 2);
    }

    #[test]
    fn test_linear_without_feed_uses_minimal_duration() {
        let program = GcodeParser::new().parse("G1 X10").unwrap();
        let segment = program.segment(0).unwrap();
        assert_eq!(segment.duration_seconds, 0.01);
        assert_eq!(segment.points.len(), 2);
    }

    #[test]
    fn test_arc_without_feed_uses_fallback_duration() {
        let program = GcodeParser::new().parse("G3 X10 Y0 I5 J0").unwrap();
        let segment = program.segment(0).unwrap();
        assert_eq!(segment.kind, MotionKind::Arc);
        assert_eq!(segment.duration_seconds, 0.1);
        assert_eq!(segment.points.len(), 2);
    }

    #[test]
    fn test_source_text_is_trimmed_raw_line() {
        let program = GcodeParser::new().parse("  G0 X1 ; go\n").unwrap();
        let segment = program.segment(0).unwrap();
        assert_eq!(segment.source_text, "G0 X1 ; go");
        assert_eq!(segment.source_line_number, 1);
        assert_eq!(segment.feed_rate, 5000.0);
    }

    #[test]
    fn test_slow_linear_move_is_capped() {
        let program = GcodeParser::new().parse("G1 X1000 F0.00001").unwrap();
        let segment = program.segment(0).unwrap();
        assert_eq!(segment.points.len(), MAX_SEGMENT_SAMPLES);
        assert_eq!(segment.points[0], Point3D::default());
        assert_eq!(*segment.end().unwrap(), Point3D::new(1000.0, 0.0, 0.0));
        assert!(segment.duration_seconds > 1e9);
    }

    #[test]
    fn test_slow_arc_is_capped() {
        let program = GcodeParser::new()
            .parse("G2 X10 Y0 I5 J0 F0.00001")
            .unwrap();
        let segment = program.segment(0).unwrap();
        assert_eq!(segment.points.len(), MAX_SEGMENT_SAMPLES);
        assert_eq!(*segment.end().unwrap(), Point3D::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_overflowing_coordinate_fails_parse() {
        let text = format!("G0 X1\nG1 X{} F600", "9".repeat(400));
        let err = GcodeParser::new().parse(&text).unwrap_err();
        assert_eq!(err.line_number(), Some(2));
    }
}
