//! Curve linearizer
//!
//! Converts circular arcs and bulge-annotated polyline edges into polylines.
//! The segment count adapts to both the arc length and the swept angle so
//! that large shallow arcs and small tight arcs are equally smooth.

use crate::constants::GEOMETRY_EPSILON;
use crate::geometry::Point3D;
use tracing::trace;

/// Maximum chord length used when deriving the segment count
pub const MAX_SEGMENT_LENGTH: f64 = 0.5;
/// Minimum number of segments per degree of sweep
pub const SEGMENTS_PER_DEGREE: f64 = 0.5;
pub const MIN_ARC_SEGMENTS: usize = 4;
pub const MAX_ARC_SEGMENTS: usize = 360;

/// Number of segments used to approximate an arc.
///
/// `max(ceil(length / 0.5), ceil(|degrees| * 0.5))`, clamped to `[4, 360]`.
pub fn arc_segment_count(radius: f64, angle_degrees: f64) -> usize {
    let angle_degrees = angle_degrees.abs();
    let arc_length = radius.abs() * angle_degrees.to_radians();
    let by_length = (arc_length / MAX_SEGMENT_LENGTH).ceil();
    let by_angle = (angle_degrees * SEGMENTS_PER_DEGREE).ceil();

    // NaN casts to 0 and is clamped up to the minimum
    (by_length.max(by_angle) as usize).clamp(MIN_ARC_SEGMENTS, MAX_ARC_SEGMENTS)
}

/// Linearize a circular arc in the XY plane at `center.z`.
///
/// The sweep is `end - start`: counter-clockwise when `end_degrees` is the
/// larger angle, clockwise otherwise. A degenerate radius yields a single
/// point.
pub fn linearize_arc(
    center: Point3D,
    radius: f64,
    start_degrees: f64,
    end_degrees: f64,
) -> Vec<Point3D> {
    if radius.abs() <= GEOMETRY_EPSILON {
        return vec![center];
    }

    let sweep_degrees = end_degrees - start_degrees;
    let segments = arc_segment_count(radius, sweep_degrees);
    let start = start_degrees.to_radians();
    let sweep = sweep_degrees.to_radians();

    (0..=segments)
        .map(|i| {
            let angle = start + sweep * (i as f64 / segments as f64);
            Point3D::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
                center.z,
            )
        })
        .collect()
}

/// Arc geometry recovered from a bulge-annotated polyline edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulgeArc {
    pub center: Point3D,
    pub radius: f64,
    /// Angle of the edge start point about the center, radians
    pub start_angle: f64,
    /// Signed sweep in radians; positive is counter-clockwise
    pub sweep: f64,
}

/// Recover the arc described by `bulge` on the edge `p1 -> p2`.
///
/// Returns `None` for a straight edge (near-zero bulge or chord).
pub fn bulge_to_arc(p1: Point3D, p2: Point3D, bulge: f64) -> Option<BulgeArc> {
    let chord = p1.distance_2d(&p2);
    if bulge.abs() < GEOMETRY_EPSILON || chord < GEOMETRY_EPSILON {
        return None;
    }

    let magnitude = bulge.abs();
    let sweep = 4.0 * magnitude.atan();
    let radius = chord * (1.0 + bulge * bulge) / (4.0 * magnitude);
    let sagitta = chord * magnitude / 2.0;

    // Center sits on the perpendicular bisector, left of the chord for a
    // positive bulge; past a half circle (|bulge| > 1) it crosses over.
    let ux = (p2.x - p1.x) / chord;
    let uy = (p2.y - p1.y) / chord;
    let offset = (radius - sagitta) * bulge.signum();
    let mid_x = (p1.x + p2.x) / 2.0;
    let mid_y = (p1.y + p2.y) / 2.0;
    let center = Point3D::new(mid_x - uy * offset, mid_y + ux * offset, p1.z);

    let start_angle = (p1.y - center.y).atan2(p1.x - center.x);

    Some(BulgeArc {
        center,
        radius,
        start_angle,
        sweep: sweep * bulge.signum(),
    })
}

/// Linearize one polyline edge carrying a bulge factor.
///
/// The result always starts at `p1` and ends at `p2` exactly; a straight
/// edge yields just the two endpoints. Z is interpolated along the edge.
pub fn linearize_bulge(p1: Point3D, p2: Point3D, bulge: f64) -> Vec<Point3D> {
    let Some(arc) = bulge_to_arc(p1, p2, bulge) else {
        return vec![p1, p2];
    };

    let segments = arc_segment_count(arc.radius, arc.sweep.to_degrees());
    trace!(
        "Bulge {} on edge ({}, {}) -> ({}, {}): radius {:.4}, {} segments",
        bulge,
        p1.x,
        p1.y,
        p2.x,
        p2.y,
        arc.radius,
        segments
    );
    let mut points = Vec::with_capacity(segments + 1);
    points.push(p1);
    for i in 1..segments {
        let t = i as f64 / segments as f64;
        let angle = arc.start_angle + arc.sweep * t;
        points.push(Point3D::new(
            arc.center.x + arc.radius * angle.cos(),
            arc.center.y + arc.radius * angle.sin(),
            p1.z + (p2.z - p1.z) * t,
        ));
    }
    points.push(p2);
    points
}
