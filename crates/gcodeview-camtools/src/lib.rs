//! # GCodeView CAM Tools
//!
//! Converts 2D vector geometry into G-code toolpaths.
//!
//! - **Entities**: the LINE / CIRCLE / ARC / LWPOLYLINE input model, loadable
//!   from JSON or DXF
//! - **DXF Import**: drawing files read through the `dxf` crate
//! - **Synthesizer**: extraction, nearest-neighbour ordering, merging and
//!   G-code emission

pub mod dxf_import;
pub mod entities;
pub mod error;
pub mod synthesizer;

pub use dxf_import::{entities_from_drawing, load_dxf, load_dxf_file};
pub use entities::{
    entities_from_json, entities_to_json, load_entities, PolylineVertex, VectorEntity,
};
pub use error::{
    CamToolError, CamToolResult, FileFormatError, FileFormatResult, ParameterError,
    ParameterResult,
};
pub use synthesizer::{
    emit, extract_path, extract_paths, merge_paths, order_paths, DrawablePath, SynthesisConfig,
    Synthesizer,
};
