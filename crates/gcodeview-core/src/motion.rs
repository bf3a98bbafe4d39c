//! Motion segment model
//!
//! A [`MotionProgram`] is the output of one parse: an ordered list of
//! [`MotionSegment`]s plus bounds accumulated from every sampled point.
//! Programs are never edited in place; a re-parse builds a new one.

use crate::constants::Z_FLAT_TOLERANCE;
use crate::error::Result;
use crate::geometry::{Bounds, Point3D};
use serde::{Deserialize, Serialize};

/// Kind of tool movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionKind {
    /// Non-cutting repositioning move (G0)
    Rapid,
    /// Linear interpolation (G1)
    Linear,
    /// Circular/helical interpolation (G2/G3)
    Arc,
}

impl MotionKind {
    /// Returns the name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            MotionKind::Rapid => "Rapid",
            MotionKind::Linear => "Linear",
            MotionKind::Arc => "Arc",
        }
    }
}

impl std::fmt::Display for MotionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One continuous tool movement, sampled at an even time cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionSegment {
    pub kind: MotionKind,
    /// Sampled points; first is the position before the move, last the target
    pub points: Vec<Point3D>,
    /// Feed rate in units/min used to time the move
    pub feed_rate: f64,
    /// Path length of the move
    pub distance: f64,
    pub duration_seconds: f64,
    /// 1-based line number in the source text
    pub source_line_number: u32,
    pub source_text: String,
}

impl MotionSegment {
    pub fn start(&self) -> Option<&Point3D> {
        self.points.first()
    }

    pub fn end(&self) -> Option<&Point3D> {
        self.points.last()
    }

    /// Length of the sampled polyline
    pub fn polyline_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }

    /// Tool position at `progress` (clamped to `[0, 1]`).
    ///
    /// Samples are evenly spaced in time, so progress maps linearly onto the
    /// sample index.
    pub fn point_at(&self, progress: f64) -> Option<Point3D> {
        let last = self.points.len().checked_sub(1)?;
        if last == 0 {
            return self.points.first().copied();
        }
        let scaled = progress.clamp(0.0, 1.0) * last as f64;
        let index = (scaled.floor() as usize).min(last - 1);
        let t = scaled - index as f64;
        Some(self.points[index].lerp(&self.points[index + 1], t))
    }
}

/// Parsed motion program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionProgram {
    segments: Vec<MotionSegment>,
    bounds: Bounds,
}

impl MotionProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment, growing the bounds by every sampled point
    pub fn push(&mut self, segment: MotionSegment) {
        for point in &segment.points {
            self.bounds.include(point);
        }
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[MotionSegment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&MotionSegment> {
        self.segments.get(index)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// True when the Z span strictly exceeds the flatness tolerance
    pub fn is_3d(&self) -> bool {
        self.bounds.is_valid() && (self.bounds.max_z - self.bounds.min_z) > Z_FLAT_TOLERANCE
    }

    /// Per-segment durations, in program order
    pub fn durations(&self) -> Vec<f64> {
        self.segments.iter().map(|s| s.duration_seconds).collect()
    }

    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_seconds).sum()
    }

    pub fn total_distance(&self) -> f64 {
        self.segments.iter().map(|s| s.distance).sum()
    }

    /// Counts segments by kind: (rapid, linear, arc)
    pub fn count_by_kind(&self) -> (usize, usize, usize) {
        let mut rapid = 0;
        let mut linear = 0;
        let mut arc = 0;

        for segment in &self.segments {
            match segment.kind {
                MotionKind::Rapid => rapid += 1,
                MotionKind::Linear => linear += 1,
                MotionKind::Arc => arc += 1,
            }
        }

        (rapid, linear, arc)
    }

    pub fn summary(&self) -> ProgramSummary {
        let (rapid_count, linear_count, arc_count) = self.count_by_kind();
        ProgramSummary {
            segment_count: self.segments.len(),
            rapid_count,
            linear_count,
            arc_count,
            bounds: self.bounds,
            is_3d: self.is_3d(),
            total_distance: self.total_distance(),
            total_duration_seconds: self.total_duration(),
        }
    }
}

/// Program summary consumed by display collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSummary {
    pub segment_count: usize,
    pub rapid_count: usize,
    pub linear_count: usize,
    pub arc_count: usize,
    pub bounds: Bounds,
    pub is_3d: bool,
    pub total_distance: f64,
    pub total_duration_seconds: f64,
}

impl ProgramSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(kind: MotionKind, points: Vec<Point3D>, duration: f64) -> MotionSegment {
        let mut seg = MotionSegment {
            kind,
            points,
            feed_rate: 600.0,
            distance: 0.0,
            duration_seconds: duration,
            source_line_number: 1,
            source_text: String::new(),
        };
        seg.distance = seg.polyline_length();
        seg
    }

    #[test]
    fn test_point_at_interpolates_samples() {
        let seg = segment(
            MotionKind::Linear,
            vec![
                Point3D::xy(0.0, 0.0),
                Point3D::xy(5.0, 0.0),
                Point3D::xy(10.0, 0.0),
            ],
            1.0,
        );
        assert_eq!(seg.point_at(0.0), Some(Point3D::xy(0.0, 0.0)));
        assert_eq!(seg.point_at(0.25), Some(Point3D::xy(2.5, 0.0)));
        assert_eq!(seg.point_at(1.0), Some(Point3D::xy(10.0, 0.0)));
        assert_eq!(seg.point_at(7.0), Some(Point3D::xy(10.0, 0.0)));
    }

    #[test]
    fn test_push_updates_bounds_from_every_point() {
        let mut program = MotionProgram::new();
        program.push(segment(
            MotionKind::Arc,
            vec![
                Point3D::xy(0.0, 0.0),
                Point3D::xy(5.0, 5.0),
                Point3D::xy(0.0, 10.0),
            ],
            1.0,
        ));
        assert_eq!(program.bounds().max_x, 5.0);
        assert_eq!(program.bounds().max_y, 10.0);
    }

    #[test]
    fn test_is_3d_threshold_is_strict() {
        let mut flat = MotionProgram::new();
        flat.push(segment(
            MotionKind::Linear,
            vec![Point3D::new(0.0, 0.0, 0.0), Point3D::new(1.0, 0.0, 0.01)],
            1.0,
        ));
        assert!(!flat.is_3d());

        let mut deep = MotionProgram::new();
        deep.push(segment(
            MotionKind::Linear,
            vec![Point3D::new(0.0, 0.0, 0.0), Point3D::new(1.0, 0.0, 0.02)],
            1.0,
        ));
        assert!(deep.is_3d());

        assert!(!MotionProgram::new().is_3d());
    }

    #[test]
    fn test_summary_counts() {
        let mut program = MotionProgram::new();
        program.push(segment(
            MotionKind::Rapid,
            vec![Point3D::xy(0.0, 0.0), Point3D::xy(3.0, 4.0)],
            0.5,
        ));
        program.push(segment(
            MotionKind::Linear,
            vec![Point3D::xy(3.0, 4.0), Point3D::xy(3.0, 0.0)],
            1.5,
        ));
        let summary = program.summary();
        assert_eq!(summary.segment_count, 2);
        assert_eq!((summary.rapid_count, summary.linear_count), (1, 1));
        assert_eq!(summary.total_distance, 9.0);
        assert_eq!(summary.total_duration_seconds, 2.0);
        assert!(summary.to_json().unwrap().contains("\"segment_count\": 2"));
    }
}
