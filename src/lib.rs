//! # GCodeView
//!
//! A G-code motion previewer and DXF-to-G-code toolpath synthesizer.
//!
//! ## Architecture
//!
//! GCodeView is organized as a workspace with multiple crates:
//!
//! 1. **gcodeview-core** - Geometry, motion model, curve linearizer, errors
//! 2. **gcodeview-visualizer** - G-code motion parser and playback clock
//! 3. **gcodeview-camtools** - Vector entities, DXF import, toolpath synthesis
//! 4. **gcodeview-settings** - Configuration persistence
//! 5. **gcodeview** - Headless binary that integrates all crates

use anyhow::Context;
use std::path::Path;
use tracing::{debug, info};

pub use gcodeview_camtools::{
    load_entities, DrawablePath, PolylineVertex, SynthesisConfig, Synthesizer, VectorEntity,
};
pub use gcodeview_core::{
    Bounds, Error, GcodeError, MotionKind, MotionProgram, MotionSegment, PlaybackError, Point3D,
    ProgramSummary, Result,
};
pub use gcodeview_settings::{Config, SettingsError};
pub use gcodeview_visualizer::{
    GcodeParser, ParserConfig, PlaybackClock, PlaybackConfig, PlaybackSnapshot, PlaybackState,
    PlaybackTimer,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Kind of input file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// `.gcode`, `.nc`, `.ngc`
    Gcode,
    /// `.dxf` or `.json` vector geometry
    Geometry,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "gcode" | "nc" | "ngc" => Some(Self::Gcode),
            "dxf" | "json" => Some(Self::Geometry),
            _ => None,
        }
    }
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr so stdout stays clean for generated G-code
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}

/// Parse a G-code file into its motion summary
pub fn preview_file(path: &Path, config: &Config) -> anyhow::Result<ProgramSummary> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let program = GcodeParser::with_config(config.parser.clone())
        .parse(&source)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let summary = program.summary();
    info!(
        "Parsed {} segments from {} ({:.2}s)",
        summary.segment_count,
        path.display(),
        summary.total_duration_seconds
    );
    Ok(summary)
}

/// Synthesize G-code from a DXF or JSON geometry file.
///
/// The output is parsed once more before it is returned so a caller never
/// receives a program the previewer would reject.
pub fn synthesize_file(path: &Path, config: &Config) -> anyhow::Result<String> {
    let entities = load_entities(path)
        .with_context(|| format!("failed to load geometry from {}", path.display()))?;
    debug!("Loaded {} entities from {}", entities.len(), path.display());

    let gcode = Synthesizer::with_config(config.synthesis.clone()).synthesize(&entities);
    let program = GcodeParser::with_config(config.parser.clone())
        .parse(&gcode)
        .context("synthesized G-code failed to parse")?;
    info!(
        "Synthesized {} lines, {} motion segments",
        gcode.lines().count(),
        program.len()
    );
    Ok(gcode)
}
