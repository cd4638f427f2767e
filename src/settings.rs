//! Simulation settings
//!
//! Physical constants, terrain generation parameters and planner safety
//! bounds. Persisted as JSON; missing keys fall back to the defaults below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{G, STRUCTURE_CEILING_GAP};
use crate::error::{SimError, SimResult};

/// Terrain style presets
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
pub enum SectorStyle {
    /// Straight segments only
    #[default]
    #[value(alias = "line")]
    Lines,
    /// Straight segments with occasional sine humps on flat ground
    #[value(alias = "hills")]
    Rolling,
}

impl SectorStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectorStyle::Lines => "Lines",
            SectorStyle::Rolling => "Rolling",
        }
    }
}

/// Constants used by kinematics, collision search and bounce response
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration applied to vertical kinematics (negative)
    pub gravity: f64,
    /// Fraction of impact speed retained after a bounce
    pub restitution: f64,
    /// Horizontal speed removed per bounce; also the horizontal rest threshold
    pub kinetic_friction: f64,
    /// Vertical rest threshold
    pub min_vertical_velocity: f64,
    /// Collision tolerance and resting offset above the surface
    pub height_precision: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: G,
            restitution: 0.7,
            kinetic_friction: 0.6,
            min_vertical_velocity: 2.0,
            height_precision: 3.0,
        }
    }
}

/// Procedural terrain parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Total horizontal extent of a sector
    pub width: f64,
    /// Highest allowed terrain point
    pub max_height: f64,
    /// Lowest allowed terrain point
    pub min_structure_height: f64,
    /// Upper bound on segments per sector
    pub segment_count: usize,
    pub min_segment_width: f64,
    pub max_segment_width: f64,
    /// Height of the first segment's start point
    pub seed_height: f64,
    pub slope_min: f64,
    pub slope_max: f64,
    /// Chance that a segment is forced flat
    pub flat_probability: f64,
    /// Chance that a flat segment becomes a hump (Rolling style only)
    pub hump_probability: f64,
    pub style: SectorStyle,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        let width = 1200.0;
        let playfield_height = 600.0;
        Self {
            width,
            max_height: playfield_height - STRUCTURE_CEILING_GAP,
            min_structure_height: 0.0,
            segment_count: 10,
            min_segment_width: width / 20.0,
            max_segment_width: width / 4.0,
            seed_height: 50.0,
            slope_min: -1.5,
            slope_max: 1.5,
            flat_probability: 0.3,
            hump_probability: 0.35,
            style: SectorStyle::Lines,
        }
    }
}

/// Caller-level bounds on the bounce-chain resolver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerLimits {
    /// Maximum number of flight arcs in one chain
    pub max_arcs: usize,
    /// Maximum sim time covered by one chain
    pub max_elapsed: f64,
}

impl Default for PlannerLimits {
    fn default() -> Self {
        Self {
            max_arcs: 256,
            max_elapsed: 600.0,
        }
    }
}

/// All settings for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub physics: PhysicsConfig,
    pub terrain: TerrainConfig,
    pub planner: PlannerLimits,
}

impl Settings {
    /// Create settings with a terrain style preset applied
    pub fn from_style(style: SectorStyle) -> Self {
        let mut settings = Self::default();
        settings.terrain.style = style;
        settings
    }

    /// Reject values the solver cannot work with
    pub fn validate(&self) -> SimResult<()> {
        let p = &self.physics;
        let t = &self.terrain;

        check("physics.gravity", p.gravity, "(-inf, 0)", p.gravity < 0.0)?;
        check(
            "physics.restitution",
            p.restitution,
            "[0, 1]",
            (0.0..=1.0).contains(&p.restitution),
        )?;
        check(
            "physics.kinetic_friction",
            p.kinetic_friction,
            "[0, inf)",
            p.kinetic_friction >= 0.0,
        )?;
        check(
            "physics.min_vertical_velocity",
            p.min_vertical_velocity,
            "[0, inf)",
            p.min_vertical_velocity >= 0.0,
        )?;
        check(
            "physics.height_precision",
            p.height_precision,
            "(0, inf)",
            p.height_precision > 0.0,
        )?;

        check("terrain.width", t.width, "(0, inf)", t.width > 0.0)?;
        check(
            "terrain.segment_count",
            t.segment_count as f64,
            "[1, inf)",
            t.segment_count >= 1,
        )?;
        check(
            "terrain.min_segment_width",
            t.min_segment_width,
            "(0, max_segment_width]",
            t.min_segment_width > 0.0 && t.min_segment_width <= t.max_segment_width,
        )?;
        check(
            "terrain.max_height",
            t.max_height,
            "(min_structure_height, inf)",
            t.max_height > t.min_structure_height,
        )?;
        check(
            "terrain.slope_max",
            t.slope_max,
            "[slope_min, inf)",
            t.slope_max >= t.slope_min,
        )?;
        check(
            "terrain.flat_probability",
            t.flat_probability,
            "[0, 1]",
            (0.0..=1.0).contains(&t.flat_probability),
        )?;
        check(
            "terrain.hump_probability",
            t.hump_probability,
            "[0, 1]",
            (0.0..=1.0).contains(&t.hump_probability),
        )?;

        check(
            "planner.max_arcs",
            self.planner.max_arcs as f64,
            "[1, inf)",
            self.planner.max_arcs >= 1,
        )?;
        check(
            "planner.max_elapsed",
            self.planner.max_elapsed,
            "(0, inf)",
            self.planner.max_elapsed > 0.0,
        )
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> SimResult<Self> {
        let json = fs::read_to_string(path).map_err(|source| SimError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|source| SimError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON (tmp file, then rename over the target)
    pub fn save(&self, path: &Path) -> SimResult<()> {
        let io_err = |source: std::io::Error| SimError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };

        let data = serde_json::to_vec_pretty(self).map_err(|source| SimError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

fn check(name: &'static str, value: f64, safe_range: &'static str, ok: bool) -> SimResult<()> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range,
        })
    }
}
