//! Shared numeric constants.

/// Z span at or below which a program is considered flat (2D)
pub const Z_FLAT_TOLERANCE: f64 = 0.01;

/// Seconds per minute, for converting units/min feed rates to durations
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Lengths below this are treated as zero by the geometry routines
pub const GEOMETRY_EPSILON: f64 = 1e-10;
