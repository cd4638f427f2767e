//! Terrain segment geometry
//!
//! A segment is one piece of the ground profile, valid over a horizontal
//! range `[start_x, end_x]`. Everything downstream (collision search, bounce
//! response, meshing) talks to a segment only through `height_at` and
//! `slope_at`, so new shapes only need those two.

use std::f64::consts::PI;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Height profile of a segment, relative to its start point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SegmentShape {
    /// Straight ramp with constant slope
    Line { slope: f64 },
    /// `half_waves` half sine periods across the segment, so the end height
    /// matches the start height
    Sine { amplitude: f64, half_waves: u32 },
}

/// A piece of terrain over `[start_x, end_x]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start_x: f64,
    pub end_x: f64,
    /// Height at `start_x`
    pub start_y: f64,
    pub shape: SegmentShape,
}

impl Segment {
    /// Straight segment from `(start_x, start_y)` with the given slope
    pub fn line(slope: f64, start_x: f64, end_x: f64, start_y: f64) -> Self {
        debug_assert!(start_x < end_x, "segment range must be increasing");
        Self {
            start_x,
            end_x,
            start_y,
            shape: SegmentShape::Line { slope },
        }
    }

    /// Sine hump (or dip, for negative amplitude) starting and ending at `start_y`
    pub fn sine(start_x: f64, end_x: f64, start_y: f64, amplitude: f64, half_waves: u32) -> Self {
        debug_assert!(start_x < end_x, "segment range must be increasing");
        Self {
            start_x,
            end_x,
            start_y,
            shape: SegmentShape::Sine {
                amplitude,
                half_waves: half_waves.max(1),
            },
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.end_x - self.start_x
    }

    /// Terrain height at `x`. Lines extrapolate outside the range.
    pub fn height_at(&self, x: f64) -> f64 {
        let dx = x - self.start_x;
        match self.shape {
            SegmentShape::Line { slope } => self.start_y + slope * dx,
            SegmentShape::Sine {
                amplitude,
                half_waves,
            } => {
                let k = PI * half_waves as f64 / self.width();
                self.start_y + amplitude * (k * dx).sin()
            }
        }
    }

    /// First derivative of [`Segment::height_at`]
    pub fn slope_at(&self, x: f64) -> f64 {
        match self.shape {
            SegmentShape::Line { slope } => slope,
            SegmentShape::Sine {
                amplitude,
                half_waves,
            } => {
                let k = PI * half_waves as f64 / self.width();
                amplitude * k * (k * (x - self.start_x)).cos()
            }
        }
    }

    #[inline]
    pub fn start(&self) -> DVec2 {
        DVec2::new(self.start_x, self.start_y)
    }

    #[inline]
    pub fn end(&self) -> DVec2 {
        DVec2::new(self.end_x, self.height_at(self.end_x))
    }

    /// Check if `x` lies within the segment's range (inclusive)
    #[inline]
    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.start_x && x <= self.end_x
    }

    /// Edge a ball moving in `direction` crosses first
    #[inline]
    pub fn near_x(&self, direction: i32) -> f64 {
        if direction >= 0 { self.start_x } else { self.end_x }
    }

    /// Edge a ball moving in `direction` leaves through
    #[inline]
    pub fn far_x(&self, direction: i32) -> f64 {
        if direction >= 0 { self.end_x } else { self.start_x }
    }

    /// Sample points along the surface (for meshing or debugging)
    pub fn sample_surface(&self, num_points: usize) -> Vec<DVec2> {
        let n = num_points.max(2);
        (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64;
                let x = self.start_x + t * self.width();
                DVec2::new(x, self.height_at(x))
            })
            .collect()
    }

    /// Lowest and highest surface height, sampled
    pub fn height_extent(&self) -> (f64, f64) {
        match self.shape {
            SegmentShape::Line { .. } => {
                let (a, b) = (self.start_y, self.end().y);
                (a.min(b), a.max(b))
            }
            SegmentShape::Sine { .. } => self
                .sample_surface(65)
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                    (lo.min(p.y), hi.max(p.y))
                }),
        }
    }
}
