//! Vector geometry input model
//!
//! Entities mirror the DXF subset the synthesizer understands. Angles are in
//! degrees, arcs run counter-clockwise from `start_angle` to `end_angle`.

use crate::dxf_import;
use crate::error::{CamToolResult, FileFormatError};
use gcodeview_core::Point3D;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// One lightweight-polyline vertex
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolylineVertex {
    pub x: f64,
    pub y: f64,
    /// Bulge of the edge leaving this vertex; 0 for a straight edge
    #[serde(default)]
    pub bulge: f64,
}

impl PolylineVertex {
    pub fn new(x: f64, y: f64, bulge: f64) -> Self {
        Self { x, y, bulge }
    }

    pub fn point(&self) -> Point3D {
        Point3D::xy(self.x, self.y)
    }
}

/// 2D vector entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VectorEntity {
    Line {
        start: Point3D,
        end: Point3D,
    },
    Circle {
        center: Point3D,
        radius: f64,
    },
    Arc {
        center: Point3D,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    LwPolyline {
        vertices: Vec<PolylineVertex>,
        #[serde(default)]
        closed: bool,
    },
    /// Anything else found in a source drawing; ignored by the synthesizer
    Unsupported {
        kind: String,
    },
}

impl VectorEntity {
    /// Short entity name for logging
    pub fn kind(&self) -> &str {
        match self {
            VectorEntity::Line { .. } => "LINE",
            VectorEntity::Circle { .. } => "CIRCLE",
            VectorEntity::Arc { .. } => "ARC",
            VectorEntity::LwPolyline { .. } => "LWPOLYLINE",
            VectorEntity::Unsupported { kind } => kind,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, VectorEntity::Unsupported { .. })
    }
}

/// Parse a JSON array of entities
pub fn entities_from_json(json: &str) -> CamToolResult<Vec<VectorEntity>> {
    Ok(serde_json::from_str(json)?)
}

pub fn entities_to_json(entities: &[VectorEntity]) -> CamToolResult<String> {
    Ok(serde_json::to_string_pretty(entities)?)
}

/// Load entities from a `.dxf` or `.json` file
pub fn load_entities(path: impl AsRef<Path>) -> CamToolResult<Vec<VectorEntity>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let entities = match extension.as_str() {
        "dxf" => dxf_import::load_dxf_file(path)?,
        "json" => {
            let content = std::fs::read_to_string(path)?;
            entities_from_json(&content)?
        }
        _ => return Err(FileFormatError::UnknownExtension(extension).into()),
    };

    debug!(
        "Loaded {} entities from {}",
        entities.len(),
        path.display()
    );
    Ok(entities)
}
