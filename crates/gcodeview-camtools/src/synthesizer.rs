//! Geometry-to-toolpath synthesizer
//!
//! Turns 2D vector entities into a G-code program in four passes:
//!
//! 1. **Extraction**: each entity becomes a [`DrawablePath`] (curves go
//!    through the shared linearizer).
//! 2. **Ordering**: greedy nearest-neighbour tour from the origin, trying
//!    each remaining path in both directions.
//! 3. **Merging**: consecutive paths that touch are joined so the tool does
//!    not lift between them.
//! 4. **Emission**: fixed header, one plunge/cut/retract block per path,
//!    fixed footer.
//!
//! The tour is a heuristic and is not guaranteed to be the shortest.

use crate::entities::VectorEntity;
use crate::error::{ParameterError, ParameterResult};
use gcodeview_core::{linearize_arc, linearize_bulge, Point3D};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::{debug, trace};

/// Machining parameters for synthesized programs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Z for travel moves
    pub safe_height: f64,
    /// Z while cutting
    pub cut_depth: f64,
    /// Feed rate for plunging to cut depth (units/min)
    pub plunge_feed: f64,
    /// Feed rate while cutting (units/min)
    pub cut_feed: f64,
    /// Rapid feed rate declared in the header (units/min)
    pub rapid_feed: f64,
    /// Maximum gap between paths that are joined
    pub merge_tolerance: f64,
    /// Where the tour starts
    pub origin: Point3D,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            safe_height: 5.0,
            cut_depth: -1.0,
            plunge_feed: 100.0,
            cut_feed: 500.0,
            rapid_feed: 3000.0,
            merge_tolerance: 1e-6,
            origin: Point3D::ORIGIN,
        }
    }
}

impl SynthesisConfig {
    pub fn validate(&self) -> ParameterResult<()> {
        let feeds = [
            ("plunge_feed", self.plunge_feed),
            ("cut_feed", self.cut_feed),
            ("rapid_feed", self.rapid_feed),
        ];
        for (name, value) in feeds {
            if !value.is_finite() || value <= 0.0 {
                return Err(ParameterError::InvalidValue {
                    name: name.to_string(),
                    reason: format!("must be > 0, got {}", value),
                });
            }
        }

        if !self.merge_tolerance.is_finite() || !(0.0..=1.0).contains(&self.merge_tolerance) {
            return Err(ParameterError::OutOfRange {
                name: "merge_tolerance".to_string(),
                value: self.merge_tolerance,
                min: 0.0,
                max: 1.0,
            });
        }

        if self.cut_depth >= self.safe_height {
            return Err(ParameterError::Incompatible(format!(
                "cut depth {} must be below safe height {}",
                self.cut_depth, self.safe_height
            )));
        }

        Ok(())
    }
}

/// One entity flattened to a polyline
#[derive(Debug, Clone, PartialEq)]
pub struct DrawablePath {
    pub points: Vec<Point3D>,
    pub closed: bool,
}

impl DrawablePath {
    pub fn new(points: Vec<Point3D>, closed: bool) -> Self {
        Self { points, closed }
    }

    pub fn start(&self) -> Option<&Point3D> {
        self.points.first()
    }

    pub fn end(&self) -> Option<&Point3D> {
        self.points.last()
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }
}

/// Flatten one entity; `None` for unsupported or degenerate geometry.
pub fn extract_path(entity: &VectorEntity) -> Option<DrawablePath> {
    let path = match entity {
        VectorEntity::Line { start, end } => DrawablePath::new(
            vec![Point3D::xy(start.x, start.y), Point3D::xy(end.x, end.y)],
            false,
        ),
        VectorEntity::Circle { center, radius } => DrawablePath::new(
            linearize_arc(Point3D::xy(center.x, center.y), *radius, 0.0, 360.0),
            true,
        ),
        VectorEntity::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => {
            // DXF arcs always run counter-clockwise; equal angles mean a full turn
            let mut end_angle = *end_angle;
            if end_angle <= *start_angle {
                end_angle += (((*start_angle - end_angle) / 360.0).floor() + 1.0) * 360.0;
            }
            let full_turn = end_angle - *start_angle >= 360.0;
            DrawablePath::new(
                linearize_arc(
                    Point3D::xy(center.x, center.y),
                    *radius,
                    *start_angle,
                    end_angle,
                ),
                full_turn,
            )
        }
        VectorEntity::LwPolyline { vertices, closed } => {
            let mut points: Vec<Point3D> = Vec::new();
            let edge_count = if *closed {
                vertices.len()
            } else {
                vertices.len().saturating_sub(1)
            };
            if vertices.len() >= 2 {
                for i in 0..edge_count {
                    let from = &vertices[i];
                    let to = &vertices[(i + 1) % vertices.len()];
                    let edge = linearize_bulge(from.point(), to.point(), from.bulge);
                    let skip = usize::from(!points.is_empty());
                    points.extend(edge.into_iter().skip(skip));
                }
            }
            DrawablePath::new(points, *closed)
        }
        VectorEntity::Unsupported { kind } => {
            debug!("Skipping unsupported entity {}", kind);
            return None;
        }
    };

    if path.points.len() < 2 {
        debug!("Skipping degenerate {} entity", entity.kind());
        return None;
    }
    Some(path)
}

pub fn extract_paths(entities: &[VectorEntity]) -> Vec<DrawablePath> {
    entities.iter().filter_map(extract_path).collect()
}

/// Greedy nearest-neighbour ordering starting at `origin`.
///
/// Candidates are compared by 2D distance to the current tool position.
/// Ties keep the first candidate found: forward before reversed, earlier
/// paths before later ones.
pub fn order_paths(mut remaining: Vec<DrawablePath>, origin: Point3D) -> Vec<DrawablePath> {
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut position = origin;

    while !remaining.is_empty() {
        let mut best_index = 0;
        let mut best_reversed = false;
        let mut best_distance = f64::INFINITY;

        for (index, path) in remaining.iter().enumerate() {
            let (Some(start), Some(end)) = (path.start(), path.end()) else {
                continue;
            };
            let forward = position.distance_2d(start);
            if forward < best_distance {
                best_index = index;
                best_reversed = false;
                best_distance = forward;
            }
            let backward = position.distance_2d(end);
            if backward < best_distance {
                best_index = index;
                best_reversed = true;
                best_distance = backward;
            }
        }

        let mut path = remaining.remove(best_index);
        if best_reversed {
            path.reverse();
        }
        if let Some(end) = path.end() {
            position = *end;
        }
        trace!(
            "Ordered path {} (reversed={}, travel={:.3})",
            ordered.len(),
            best_reversed,
            best_distance
        );
        ordered.push(path);
    }

    ordered
}

/// Join consecutive paths whose gap is below `tolerance`.
///
/// The joining start point is dropped. A path that absorbed another one is
/// no longer closed.
pub fn merge_paths(paths: Vec<DrawablePath>, tolerance: f64) -> Vec<DrawablePath> {
    let mut merged: Vec<DrawablePath> = Vec::with_capacity(paths.len());

    for path in paths {
        if let Some(current) = merged.last_mut() {
            let touching = match (current.end(), path.start()) {
                (Some(end), Some(start)) => end.distance_2d(start) < tolerance,
                _ => false,
            };
            if touching {
                current.points.extend(path.points.into_iter().skip(1));
                current.closed = false;
                continue;
            }
        }
        merged.push(path);
    }

    merged
}

/// Render ordered paths as a G-code program
pub fn emit(paths: &[DrawablePath], config: &SynthesisConfig) -> String {
    let mut gcode = String::new();

    // Writing to a String cannot fail
    let _ = write_program(&mut gcode, paths, config);
    gcode
}

fn write_program(
    out: &mut String,
    paths: &[DrawablePath],
    config: &SynthesisConfig,
) -> std::fmt::Result {
    writeln!(out, "; Generated by GCodeView toolpath synthesizer")?;
    writeln!(out, "; Paths: {}", paths.len())?;
    writeln!(out, "G90         ; Absolute positioning")?;
    writeln!(out, "G21         ; Millimeter units")?;
    writeln!(out, "G17         ; XY plane")?;
    writeln!(out, "F{:.3}   ; Rapid feed rate", config.rapid_feed)?;
    writeln!(out, "G0 Z{:.3}", config.safe_height)?;

    for path in paths {
        let Some(start) = path.start() else {
            continue;
        };
        writeln!(out, "G0 X{:.3} Y{:.3}", start.x, start.y)?;
        writeln!(out, "G1 Z{:.3} F{:.3}", config.cut_depth, config.plunge_feed)?;
        writeln!(out, "G1 F{:.3}", config.cut_feed)?;
        for point in &path.points[1..] {
            writeln!(out, "G1 X{:.3} Y{:.3}", point.x, point.y)?;
        }
        if path.closed {
            let at_start = path
                .end()
                .is_some_and(|end| end.distance_2d(start) < config.merge_tolerance);
            if !at_start {
                writeln!(out, "G1 X{:.3} Y{:.3}", start.x, start.y)?;
            }
        }
        writeln!(out, "G0 Z{:.3}", config.safe_height)?;
    }

    writeln!(out, "G0 Z{:.3}", config.safe_height)?;
    writeln!(out, "G0 X{:.3} Y{:.3}", config.origin.x, config.origin.y)?;
    writeln!(out, "M2")?;
    Ok(())
}

/// Vector entities to G-code
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    config: SynthesisConfig,
}

impl Synthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SynthesisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn synthesize(&self, entities: &[VectorEntity]) -> String {
        let extracted = extract_paths(entities);
        let extracted_count = extracted.len();
        let ordered = order_paths(extracted, self.config.origin);
        let merged = merge_paths(ordered, self.config.merge_tolerance);

        debug!(
            "Synthesized {} entities into {} paths ({} after merging)",
            entities.len(),
            extracted_count,
            merged.len()
        );
        emit(&merged, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PolylineVertex;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> VectorEntity {
        VectorEntity::Line {
            start: Point3D::xy(x1, y1),
            end: Point3D::xy(x2, y2),
        }
    }

    fn open_path(points: &[(f64, f64)]) -> DrawablePath {
        DrawablePath::new(
            points.iter().map(|&(x, y)| Point3D::xy(x, y)).collect(),
            false,
        )
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(SynthesisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = SynthesisConfig {
            cut_feed: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ParameterError::InvalidValue { .. })
        ));

        let config = SynthesisConfig {
            cut_depth: 10.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ParameterError::Incompatible(_))
        ));

        let config = SynthesisConfig {
            merge_tolerance: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ParameterError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_extract_line_flattens_z() {
        let entity = VectorEntity::Line {
            start: Point3D::new(1.0, 2.0, 3.0),
            end: Point3D::new(4.0, 5.0, 6.0),
        };
        let path = extract_path(&entity).unwrap();
        assert_eq!(path.points, vec![Point3D::xy(1.0, 2.0), Point3D::xy(4.0, 5.0)]);
        assert!(!path.closed);
    }

    #[test]
    fn test_extract_circle_is_closed() {
        let entity = VectorEntity::Circle {
            center: Point3D::xy(0.0, 0.0),
            radius: 10.0,
        };
        let path = extract_path(&entity).unwrap();
        assert!(path.closed);
        // 2 * pi * 10 / 0.5 = 125.7 -> 126, 360 * 0.5 = 180
        assert_eq!(path.points.len(), 181);
    }

    #[test]
    fn test_extract_arc_normalizes_end_angle() {
        let entity = VectorEntity::Arc {
            center: Point3D::ORIGIN,
            radius: 1.0,
            start_angle: 270.0,
            end_angle: 0.0,
        };
        let path = extract_path(&entity).unwrap();
        let start = path.start().unwrap();
        let end = path.end().unwrap();
        assert!((start.y + 1.0).abs() < 1e-9);
        assert!((end.x - 1.0).abs() < 1e-9);
        // Counter-clockwise quarter through the fourth quadrant
        assert!(path.points.iter().all(|p| p.x > -1e-9 && p.y < 1e-9));
    }

    #[test]
    fn test_extract_arc_with_equal_angles_is_full_circle() {
        let entity = VectorEntity::Arc {
            center: Point3D::xy(5.0, 5.0),
            radius: 2.0,
            start_angle: 90.0,
            end_angle: 90.0,
        };
        let path = extract_path(&entity).unwrap();
        assert!(path.closed);
        assert_eq!(path.points.len(), 181);
        let start = path.start().unwrap();
        assert!((start.x - 5.0).abs() < 1e-9 && (start.y - 7.0).abs() < 1e-9);
        assert!(path.end().unwrap().distance_2d(start) < 1e-9);
        assert!(path.points.iter().any(|p| (p.y - 3.0).abs() < 1e-9));
    }

    #[test]
    fn test_footer_returns_to_configured_origin() {
        let config = SynthesisConfig {
            origin: Point3D::xy(12.5, -3.0),
            ..Default::default()
        };
        let gcode = Synthesizer::with_config(config).synthesize(&[]);
        assert!(gcode.ends_with("G0 Z5.000\nG0 X12.500 Y-3.000\nM2\n"));
    }

    #[test]
    fn test_extract_closed_polyline_includes_closing_edge() {
        let entity = VectorEntity::LwPolyline {
            vertices: vec![
                PolylineVertex::new(0.0, 0.0, 0.0),
                PolylineVertex::new(10.0, 0.0, 0.0),
                PolylineVertex::new(10.0, 10.0, 0.0),
            ],
            closed: true,
        };
        let path = extract_path(&entity).unwrap();
        assert!(path.closed);
        assert_eq!(
            path.points,
            vec![
                Point3D::xy(0.0, 0.0),
                Point3D::xy(10.0, 0.0),
                Point3D::xy(10.0, 10.0),
                Point3D::xy(0.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_extract_bulged_polyline_edge() {
        let entity = VectorEntity::LwPolyline {
            vertices: vec![
                PolylineVertex::new(0.0, 0.0, 1.0),
                PolylineVertex::new(2.0, 0.0, 0.0),
                PolylineVertex::new(2.0, 5.0, 0.0),
            ],
            closed: false,
        };
        let path = extract_path(&entity).unwrap();
        // Semicircle: max(ceil(pi / 0.5), 90) = 90 segments, then one straight edge
        assert_eq!(path.points.len(), 92);
        assert_eq!(*path.end().unwrap(), Point3D::xy(2.0, 5.0));
        assert_eq!(path.points[90], Point3D::xy(2.0, 0.0));
    }

    #[test]
    fn test_extract_skips_unsupported_and_degenerate() {
        let entities = vec![
            VectorEntity::Unsupported {
                kind: "SPLINE".to_string(),
            },
            VectorEntity::Circle {
                center: Point3D::ORIGIN,
                radius: 0.0,
            },
            VectorEntity::LwPolyline {
                vertices: vec![PolylineVertex::new(1.0, 1.0, 0.0)],
                closed: false,
            },
            line(0.0, 0.0, 1.0, 0.0),
        ];
        assert_eq!(extract_paths(&entities).len(), 1);
    }

    #[test]
    fn test_order_picks_nearest_and_reverses() {
        let paths = vec![
            open_path(&[(50.0, 0.0), (60.0, 0.0)]),
            open_path(&[(20.0, 0.0), (1.0, 0.0)]),
        ];
        let ordered = order_paths(paths, Point3D::ORIGIN);
        assert_eq!(ordered[0].points[0], Point3D::xy(1.0, 0.0));
        assert_eq!(ordered[0].points[1], Point3D::xy(20.0, 0.0));
        assert_eq!(ordered[1].points[0], Point3D::xy(50.0, 0.0));
    }

    #[test]
    fn test_order_ties_prefer_first_candidate() {
        // Both ends of the first path and the start of the second are 5 away
        let paths = vec![
            open_path(&[(3.0, 4.0), (4.0, 3.0)]),
            open_path(&[(-3.0, -4.0), (-30.0, -40.0)]),
        ];
        let ordered = order_paths(paths, Point3D::ORIGIN);
        assert_eq!(ordered[0].points[0], Point3D::xy(3.0, 4.0));
        assert_eq!(ordered[1].points[0], Point3D::xy(-3.0, -4.0));
    }

    #[test]
    fn test_merge_below_tolerance() {
        let paths = vec![
            open_path(&[(0.0, 0.0), (1.0, 0.0)]),
            open_path(&[(1.0 + 5e-7, 0.0), (2.0, 0.0)]),
        ];
        let merged = merge_paths(paths, 1e-6);
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].points,
            vec![
                Point3D::xy(0.0, 0.0),
                Point3D::xy(1.0, 0.0),
                Point3D::xy(2.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_no_merge_at_larger_gap() {
        let paths = vec![
            open_path(&[(0.0, 0.0), (1.0, 0.0)]),
            open_path(&[(1.0 + 1e-5, 0.0), (2.0, 0.0)]),
        ];
        assert_eq!(merge_paths(paths, 1e-6).len(), 2);
    }

    #[test]
    fn test_merged_path_loses_closed_flag() {
        let square = DrawablePath::new(
            vec![
                Point3D::xy(0.0, 0.0),
                Point3D::xy(1.0, 0.0),
                Point3D::xy(1.0, 1.0),
                Point3D::xy(0.0, 0.0),
            ],
            true,
        );
        let tail = open_path(&[(0.0, 0.0), (-1.0, 0.0)]);
        let merged = merge_paths(vec![square.clone(), tail], 1e-6);
        assert_eq!(merged.len(), 1);
        assert!(!merged[0].closed);

        let alone = merge_paths(vec![square], 1e-6);
        assert!(alone[0].closed);
    }

    #[test]
    fn test_emit_single_line() {
        let gcode = Synthesizer::new().synthesize(&[line(1.0, 2.0, 3.0, 4.0)]);
        let expected = "\
; Generated by GCodeView toolpath synthesizer
; Paths: 1
G90         ; Absolute positioning
G21         ; Millimeter units
G17         ; XY plane
F3000.000   ; Rapid feed rate
G0 Z5.000
G0 X1.000 Y2.000
G1 Z-1.000 F100.000
G1 F500.000
G1 X3.000 Y4.000
G0 Z5.000
G0 Z5.000
G0 X0.000 Y0.000
M2
";
        assert_eq!(gcode, expected);
    }

    #[test]
    fn test_emit_closes_open_ended_closed_path() {
        let triangle = DrawablePath::new(
            vec![
                Point3D::xy(0.0, 0.0),
                Point3D::xy(1.0, 0.0),
                Point3D::xy(0.0, 1.0),
            ],
            true,
        );
        let gcode = emit(&[triangle], &SynthesisConfig::default());
        assert!(gcode.contains("G1 X0.000 Y1.000\nG1 X0.000 Y0.000\nG0 Z5.000\n"));
    }

    #[test]
    fn test_empty_input_emits_header_and_footer() {
        let gcode = Synthesizer::new().synthesize(&[]);
        assert!(gcode.contains("; Paths: 0"));
        assert!(gcode.ends_with("G0 X0.000 Y0.000\nM2\n"));
        assert!(!gcode.contains("G1 "));
    }
}
