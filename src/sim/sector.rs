//! Procedurally generated terrain
//!
//! A sector is an ordered run of segments covering `[0, width]` with no
//! gaps or overlaps. Heights are continuous across boundaries but slopes
//! need not be. Sectors are built once and never mutated.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::segment::Segment;
use crate::constrain;
use crate::settings::{SectorStyle, TerrainConfig};

/// One hole's terrain profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    width: f64,
    segments: Vec<Segment>,
}

impl Sector {
    /// Build a sector from already-contiguous segments
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        debug_assert!(
            segments.windows(2).all(|w| w[0].end_x == w[1].start_x),
            "segments must be contiguous"
        );
        let width = segments.last().map(|s| s.end_x).unwrap_or(0.0)
            - segments.first().map(|s| s.start_x).unwrap_or(0.0);
        Self { width, segments }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Index of the segment under `x`.
    ///
    /// On a shared boundary the segment ahead in the travel `direction` wins,
    /// so a ball leaving a boundary never starts its walk behind itself.
    pub fn locate(&self, x: f64, direction: i32) -> Option<usize> {
        let mut hits = self
            .segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.contains_x(x))
            .map(|(i, _)| i);
        if direction >= 0 { hits.last() } else { hits.next() }
    }

    /// Terrain height at `x`, if `x` is inside the sector
    pub fn height_at(&self, x: f64) -> Option<f64> {
        self.locate(x, 1).map(|i| self.segments[i].height_at(x))
    }
}

/// Generate a sector using the configured width, height and segment count
pub fn generate_sector<R: Rng + ?Sized>(config: &TerrainConfig, rng: &mut R) -> Sector {
    generate_sector_with(
        config,
        config.width,
        config.max_height,
        config.segment_count,
        config.style,
        rng,
    )
}

/// Generate a sector of `total_width` with at most `segment_count` pieces.
///
/// Every segment end stays within `[min_structure_height, max_height]`, and
/// the pieces always add up to exactly `total_width`.
pub fn generate_sector_with<R: Rng + ?Sized>(
    config: &TerrainConfig,
    total_width: f64,
    max_height: f64,
    segment_count: usize,
    style: SectorStyle,
    rng: &mut R,
) -> Sector {
    let min_height = config.min_structure_height;
    let widths = segment_widths(config, total_width, segment_count, rng);

    let mut segments = Vec::with_capacity(widths.len());
    let mut current_x = 0.0;
    let mut current_y = constrain(config.seed_height, min_height, max_height);

    for (i, &width) in widths.iter().enumerate() {
        // The last piece ends exactly on the sector edge
        let end_x = if i + 1 == widths.len() {
            total_width
        } else {
            current_x + width
        };

        let flat = rng.random_bool(config.flat_probability);
        let segment = if flat {
            let hump = style == SectorStyle::Rolling && rng.random_bool(config.hump_probability);
            if hump {
                random_hump(current_x, end_x, current_y, min_height, max_height, rng)
            } else {
                Segment::line(0.0, current_x, end_x, current_y)
            }
        } else {
            let slope = uniform(rng, config.slope_min, config.slope_max);
            let slope = constrain_line_slope(slope, current_y, end_x - current_x, min_height, max_height);
            Segment::line(slope, current_x, end_x, current_y)
        };

        let end = segment.end();
        current_x = end.x;
        // Snap away rounding so the bound holds exactly
        current_y = constrain(end.y, min_height, max_height);
        segments.push(segment);
    }

    log::debug!(
        "Generated sector: width={}, segments={}, style={}",
        total_width,
        segments.len(),
        style.as_str()
    );

    Sector::from_segments(segments)
}

/// Draw segment widths that sum to `total_width`.
///
/// Each width comes from `[min_segment_width, min(remaining, max_segment_width)]`.
/// A piece that would leave less than `min_segment_width` behind absorbs the
/// leftover, and the last allowed piece absorbs whatever remains.
pub fn segment_widths<R: Rng + ?Sized>(
    config: &TerrainConfig,
    total_width: f64,
    segment_count: usize,
    rng: &mut R,
) -> Vec<f64> {
    let min_w = config.min_segment_width;
    let max_w = config.max_segment_width;
    let count = segment_count.max(1);

    let mut widths = Vec::with_capacity(count);
    let mut remaining = total_width;

    while remaining > 0.0 {
        if widths.len() + 1 == count || remaining <= min_w {
            widths.push(remaining);
            break;
        }

        let mut width = uniform(rng, min_w, remaining.min(max_w));
        if remaining - width < min_w {
            width = remaining;
        }
        remaining -= width;
        widths.push(width);
    }

    widths
}

/// Pull a slope back so the segment end lands inside `[min_height, max_height]`
pub fn constrain_line_slope(
    slope: f64,
    start_height: f64,
    width: f64,
    min_height: f64,
    max_height: f64,
) -> f64 {
    let end = slope * width + start_height;
    if end > max_height {
        (max_height - start_height) / width
    } else if end < min_height {
        (min_height - start_height) / width
    } else {
        slope
    }
}

fn random_hump<R: Rng + ?Sized>(
    start_x: f64,
    end_x: f64,
    start_y: f64,
    min_height: f64,
    max_height: f64,
    rng: &mut R,
) -> Segment {
    let width = end_x - start_x;
    let half_waves = rng.random_range(1..=2u32);
    // Hump height is capped so the whole curve stays inside the bounds
    let headroom = (max_height - start_y).min(start_y - min_height).max(0.0);
    let amplitude = uniform(rng, 0.0, (width * 0.15).min(headroom));
    let amplitude = if rng.random_bool(0.5) { amplitude } else { -amplitude };

    if amplitude == 0.0 {
        Segment::line(0.0, start_x, end_x, start_y)
    } else {
        Segment::sine(start_x, end_x, start_y, amplitude, half_waves)
    }
}

/// Uniform float in `[min, max)`; collapses to `min` on an empty range
fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}
