//! DXF import
//!
//! Reads the ENTITIES section of a drawing with the `dxf` crate and maps
//! LINE, CIRCLE, ARC and LWPOLYLINE into [`VectorEntity`]. Other entity
//! types are kept as [`VectorEntity::Unsupported`] so callers can report them.

use crate::entities::{PolylineVertex, VectorEntity};
use crate::error::{FileFormatError, FileFormatResult};
use dxf::entities::EntityType;
use gcodeview_core::Point3D;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Bit 0 of the LWPOLYLINE flags marks a closed polyline
const LWPOLYLINE_CLOSED: i32 = 1;

/// Load entities from a DXF file on disk
pub fn load_dxf_file(path: impl AsRef<Path>) -> FileFormatResult<Vec<VectorEntity>> {
    let mut file = std::fs::File::open(path.as_ref())?;
    load_dxf(&mut file)
}

/// Load entities from any DXF byte stream
pub fn load_dxf<R: Read>(reader: &mut R) -> FileFormatResult<Vec<VectorEntity>> {
    let drawing = dxf::Drawing::load(reader)
        .map_err(|e| FileFormatError::DxfParseError(e.to_string()))?;
    Ok(entities_from_drawing(&drawing))
}

pub fn entities_from_drawing(drawing: &dxf::Drawing) -> Vec<VectorEntity> {
    let entities: Vec<VectorEntity> = drawing
        .entities()
        .map(|entity| convert_entity(&entity.specific))
        .collect();

    let unsupported = entities.iter().filter(|e| !e.is_supported()).count();
    debug!(
        "DXF import: {} entities, {} unsupported",
        entities.len(),
        unsupported
    );
    entities
}

fn convert_point(point: &dxf::Point) -> Point3D {
    Point3D::new(point.x, point.y, point.z)
}

fn convert_entity(specific: &EntityType) -> VectorEntity {
    match specific {
        EntityType::Line(line) => VectorEntity::Line {
            start: convert_point(&line.p1),
            end: convert_point(&line.p2),
        },
        EntityType::Circle(circle) => VectorEntity::Circle {
            center: convert_point(&circle.center),
            radius: circle.radius,
        },
        EntityType::Arc(arc) => VectorEntity::Arc {
            center: convert_point(&arc.center),
            radius: arc.radius,
            start_angle: arc.start_angle,
            end_angle: arc.end_angle,
        },
        EntityType::LwPolyline(polyline) => VectorEntity::LwPolyline {
            vertices: polyline
                .vertices
                .iter()
                .map(|v| PolylineVertex::new(v.x, v.y, v.bulge))
                .collect(),
            closed: polyline.flags & LWPOLYLINE_CLOSED != 0,
        },
        other => VectorEntity::Unsupported {
            kind: unsupported_kind(other).to_string(),
        },
    }
}

fn unsupported_kind(specific: &EntityType) -> &'static str {
    match specific {
        EntityType::Polyline(_) => "POLYLINE",
        EntityType::Spline(_) => "SPLINE",
        EntityType::Ellipse(_) => "ELLIPSE",
        EntityType::Text(_) => "TEXT",
        EntityType::MText(_) => "MTEXT",
        EntityType::Insert(_) => "INSERT",
        EntityType::ModelPoint(_) => "POINT",
        EntityType::Solid(_) => "SOLID",
        _ => "UNKNOWN",
    }
}
