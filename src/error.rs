//! Configuration and validation errors.
//!
//! Numerical dead ends in the simulation (unreachable heights, a ball that
//! leaves the playfield, a bisection that fails to converge) are not errors.
//! They come back as `Option`s and outcome enums from the `sim` module. This
//! type covers what can actually go wrong at the edges: reading settings and
//! rejecting constants the solver cannot work with.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error enum for sector-golf.
#[derive(Debug)]
pub enum SimError {
    /// Settings file could not be read or written.
    ConfigIo {
        /// File that was being accessed.
        path: PathBuf,
        source: io::Error,
    },

    /// Settings file was read but is not valid JSON for [`crate::Settings`].
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A constant is outside the range the solver can handle.
    UnsafeConstant {
        /// Name of the setting (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f64,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::ConfigIo { path, source } => {
                write!(f, "settings I/O failed for {}: {source}", path.display())
            }
            SimError::ConfigParse { path, source } => {
                write!(f, "settings in {} are malformed: {source}", path.display())
            }
            SimError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(f, "{name} = {value} is outside the safe range {safe_range}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::ConfigIo { source, .. } => Some(source),
            SimError::ConfigParse { source, .. } => Some(source),
            SimError::UnsafeConstant { .. } => None,
        }
    }
}

/// Convenience alias for results carrying a [`SimError`].
pub type SimResult<T> = Result<T, SimError>;
