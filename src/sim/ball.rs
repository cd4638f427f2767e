//! The ball and its continuous collision search against a sector
//!
//! Between impulses the ball's flight is closed-form: a constant-velocity
//! horizontal axis and a constantly accelerating vertical one, both measured
//! from the last re-anchor. Collision search therefore never steps the ball;
//! it brackets and bisects in time directly.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::kinematics::Kinematics;
use super::sector::Sector;
use super::segment::{Segment, SegmentShape};
use crate::consts::{G, MAX_BISECTION_STEPS};
use crate::travel_direction;

/// Gap samples taken per half wave before bisecting a sine segment
const SINE_SAMPLES_PER_HALF_WAVE: usize = 16;

/// Outcome of a collision search
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionSearch {
    /// Ball touches `segment` at `time` (relative to the ball's origin)
    Hit { time: f64, segment: usize },
    /// Ball leaves the sector without touching anything
    Miss,
    /// Bisection ran out of steps inside `segment` without locating a crossing
    NoConvergence { segment: usize },
}

/// A point mass in flight since its last impulse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Position at the origin instant
    initial_pos: DVec2,
    /// Velocity at the origin instant
    initial_vel: DVec2,
    gravity: f64,
    x_motion: Kinematics,
    y_motion: Kinematics,
}

impl Ball {
    /// A ball at rest at `(x, y)` under the default gravity
    pub fn new(x: f64, y: f64) -> Self {
        Self::with_gravity(x, y, G)
    }

    /// A ball at rest at `(x, y)`; it starts falling immediately
    pub fn with_gravity(x: f64, y: f64, gravity: f64) -> Self {
        Self::anchored(DVec2::new(x, y), DVec2::ZERO, gravity)
    }

    /// A ball at `pos` moving with `vel` at its origin instant
    pub fn anchored(pos: DVec2, vel: DVec2, gravity: f64) -> Self {
        Self {
            initial_pos: pos,
            initial_vel: vel,
            gravity,
            x_motion: Kinematics::new(vel.x, 0.0),
            y_motion: Kinematics::new(vel.y, gravity),
        }
    }

    /// Apply an impulse at `time`: the ball's new origin is wherever it is at
    /// `time`, moving with `velocity`, and its clock restarts at zero.
    ///
    /// This is the only way a ball changes after construction.
    pub fn reanchor(&mut self, velocity: DVec2, time: f64) {
        *self = Self::anchored(self.position_at(time), velocity, self.gravity);
    }

    #[inline]
    pub fn initial_position(&self) -> DVec2 {
        self.initial_pos
    }

    #[inline]
    pub fn initial_velocity(&self) -> DVec2 {
        self.initial_vel
    }

    #[inline]
    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    #[inline]
    pub fn x_at(&self, t: f64) -> f64 {
        self.initial_pos.x + self.x_motion.position(t)
    }

    #[inline]
    pub fn y_at(&self, t: f64) -> f64 {
        self.initial_pos.y + self.y_motion.position(t)
    }

    #[inline]
    pub fn vx_at(&self, t: f64) -> f64 {
        self.x_motion.velocity(t)
    }

    #[inline]
    pub fn vy_at(&self, t: f64) -> f64 {
        self.y_motion.velocity(t)
    }

    pub fn position_at(&self, t: f64) -> DVec2 {
        DVec2::new(self.x_at(t), self.y_at(t))
    }

    pub fn velocity_at(&self, t: f64) -> DVec2 {
        DVec2::new(self.vx_at(t), self.vy_at(t))
    }

    /// Time at which the ball is at horizontal position `x`
    pub fn time_at_x(&self, x: f64) -> Option<f64> {
        self.x_motion
            .time_for_displacement(x - self.initial_pos.x)
            .map(|(t, _)| t)
    }

    /// Both times at which the ball is at height `y`, earliest first
    pub fn times_at_y(&self, y: f64) -> Option<(f64, f64)> {
        self.y_motion.time_for_displacement(y - self.initial_pos.y)
    }

    /// Find the first point after `start_time` where the flight path meets
    /// the terrain.
    ///
    /// Segments are walked in travel order starting under the ball, so the
    /// first crossing found is the physically first one. Within a segment the
    /// impact time is bisected until the ball sits less than
    /// `height_precision` above the surface.
    pub fn find_collision(
        &self,
        sector: &Sector,
        start_time: f64,
        height_precision: f64,
    ) -> CollisionSearch {
        let vx = self.vx_at(start_time);
        let direction = travel_direction(vx);
        let x = self.x_at(start_time);

        if vx == 0.0 {
            return match sector.locate(x, direction) {
                Some(index) => {
                    self.find_vertical_collision(sector, index, start_time, height_precision)
                }
                None => {
                    log::debug!("Ball at x={} is outside the sector", x);
                    CollisionSearch::Miss
                }
            };
        }

        // A ball outside the sector can still fly back over it
        let entry = match sector.locate(x, direction) {
            Some(index) => Some(index),
            None if x > sector.width() && direction < 0 => sector.len().checked_sub(1),
            None if x < 0.0 && direction > 0 && !sector.is_empty() => Some(0),
            None => None,
        };
        let Some(start_index) = entry else {
            log::debug!("Ball at x={} is outside the sector and moving away", x);
            return CollisionSearch::Miss;
        };

        let segments = sector.segments();
        let mut index = start_index;
        loop {
            let segment = &segments[index];
            log::debug!(
                "Checking segment {} [{}, {}] for impact",
                index,
                segment.start_x,
                segment.end_x
            );

            if let Some(outcome) =
                self.search_segment(sector, index, direction, start_time, height_precision)
            {
                return outcome;
            }

            let next = index as i64 + direction as i64;
            if next < 0 || next >= segments.len() as i64 {
                return CollisionSearch::Miss;
            }
            index = next as usize;
        }
    }

    /// Straight drop onto the segment under the ball
    fn find_vertical_collision(
        &self,
        sector: &Sector,
        index: usize,
        start_time: f64,
        height_precision: f64,
    ) -> CollisionSearch {
        let segment = &sector.segments()[index];
        let ground = segment.height_at(self.initial_pos.x);

        // Rest marginally above the surface. A ball already bouncing inside
        // that band may never climb back to it, so fall back to the surface.
        let landing = |height: f64| {
            self.times_at_y(height)
                .map(|(_, t)| t)
                .filter(|t| *t >= start_time)
        };

        match landing(ground + height_precision).or_else(|| landing(ground)) {
            Some(time) => CollisionSearch::Hit {
                time,
                segment: index,
            },
            None => CollisionSearch::Miss,
        }
    }

    /// Bracket and bisect one segment. `None` means the ball flies past it.
    fn search_segment(
        &self,
        sector: &Sector,
        index: usize,
        direction: i32,
        start_time: f64,
        height_precision: f64,
    ) -> Option<CollisionSearch> {
        let segment = &sector.segments()[index];
        let far_x = segment.far_x(direction);

        // Horizontal motion is linear with vx != 0, so both edges resolve
        let near_time = self.time_at_x(segment.near_x(direction))?;
        let mut min_time = near_time.max(start_time);
        let mut max_time = self.time_at_x(far_x)?;
        if max_time < min_time {
            return None;
        }

        let gap_at = |t: f64| self.y_at(t) - segment.height_at(self.x_at(t));

        match segment.shape {
            SegmentShape::Line { .. } => {
                // The gap is concave in time here, so clear at both ends of
                // the bracket means clear all the way across
                if self.y_at(max_time) > segment.height_at(far_x) && gap_at(min_time) > 0.0 {
                    return None;
                }
            }
            SegmentShape::Sine { half_waves, .. } => {
                // A crest can rise between two clear edges
                let (lo, hi) =
                    self.first_dip(segment, half_waves, min_time, max_time, &gap_at)?;
                min_time = lo;
                max_time = hi;
            }
        }

        for _ in 0..MAX_BISECTION_STEPS {
            let mid = (min_time + max_time) / 2.0;
            if mid <= min_time || mid >= max_time {
                // Bracket collapsed to adjacent floats
                break;
            }

            let gap = gap_at(mid);
            if gap > 0.0 && gap < height_precision {
                return Some(CollisionSearch::Hit {
                    time: mid,
                    segment: index,
                });
            }

            if gap > 0.0 {
                min_time = mid;
            } else {
                max_time = mid;
            }
        }

        log::warn!(
            "Collision search did not converge on segment {} (bracket [{}, {}])",
            index,
            min_time,
            max_time
        );
        Some(CollisionSearch::NoConvergence { segment: index })
    }

    /// Sample the gap across `[min_time, max_time]` (always including the
    /// instants the ball passes over a crest or trough) and return the first
    /// sub-interval that ends at or below the surface.
    fn first_dip(
        &self,
        segment: &Segment,
        half_waves: u32,
        min_time: f64,
        max_time: f64,
        gap_at: impl Fn(f64) -> f64,
    ) -> Option<(f64, f64)> {
        let steps = SINE_SAMPLES_PER_HALF_WAVE * half_waves.max(1) as usize;
        let mut times: Vec<f64> = (0..=steps)
            .map(|i| min_time + (max_time - min_time) * i as f64 / steps as f64)
            .collect();

        let half_wave = segment.width() / half_waves.max(1) as f64;
        times.extend(
            (0..half_waves)
                .filter_map(|j| self.time_at_x(segment.start_x + (j as f64 + 0.5) * half_wave))
                .filter(|t| *t > min_time && *t < max_time),
        );
        times.sort_by(f64::total_cmp);

        let first_below = times.iter().position(|t| gap_at(*t) <= 0.0)?;
        if first_below == 0 {
            return Some((min_time, min_time));
        }
        Some((times[first_below - 1], times[first_below]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(height: f64, width: f64) -> Sector {
        Sector::from_segments(vec![Segment::line(0.0, 0.0, width, height)])
    }

    #[test]
    fn test_new_ball_is_at_rest_and_falls() {
        let ball = Ball::new(10.0, 100.0);
        assert_eq!(ball.velocity_at(0.0), DVec2::ZERO);
        assert_eq!(ball.position_at(0.0), DVec2::new(10.0, 100.0));
        assert!((ball.y_at(1.0) - (100.0 + G / 2.0)).abs() < 1e-12);
        assert_eq!(ball.x_at(5.0), 10.0);
    }

    #[test]
    fn test_reanchor_moves_origin() {
        let mut ball = Ball::anchored(DVec2::new(0.0, 100.0), DVec2::new(10.0, 0.0), G);
        let before = ball.position_at(2.0);
        ball.reanchor(DVec2::new(-3.0, 4.0), 2.0);
        assert_eq!(ball.initial_position(), before);
        assert_eq!(ball.initial_velocity(), DVec2::new(-3.0, 4.0));
        assert_eq!(ball.position_at(0.0), before);
        assert_eq!(ball.velocity_at(0.0), DVec2::new(-3.0, 4.0));
    }

    #[test]
    fn test_vertical_drop_matches_free_fall() {
        let sector = flat(20.0, 100.0);
        let ball = Ball::new(50.0, 120.0);
        let precision = 0.5;

        match ball.find_collision(&sector, 0.0, precision) {
            CollisionSearch::Hit { time, segment } => {
                let expected = (2.0 * (120.0 - 20.0 - precision) / G.abs()).sqrt();
                assert!((time - expected).abs() < 1e-9);
                assert_eq!(segment, 0);
                assert!((ball.y_at(time) - (20.0 + precision)).abs() < 1e-9);
            }
            other => panic!("expected hit, got {other:?}"),
        }
    }

    #[test]
    fn test_vertical_drop_outside_sector_misses() {
        let sector = flat(0.0, 100.0);
        let ball = Ball::new(150.0, 50.0);
        assert_eq!(ball.find_collision(&sector, 0.0, 0.1), CollisionSearch::Miss);
    }

    #[test]
    fn test_vertical_bounce_inside_tolerance_band() {
        // Ball 1 unit above ground, tossed up too weakly to clear the 3-unit band
        let sector = flat(0.0, 100.0);
        let ball = Ball::anchored(DVec2::new(50.0, 1.0), DVec2::new(0.0, 2.0), G);
        match ball.find_collision(&sector, 0.0, 3.0) {
            CollisionSearch::Hit { time, .. } => {
                assert!(time > 0.0);
                assert!(ball.y_at(time).abs() < 1e-9);
            }
            other => panic!("expected hit, got {other:?}"),
        }
    }

    #[test]
    fn test_flat_launch_first_impact() {
        let sector = flat(0.0, 1000.0);
        let ball = Ball::anchored(DVec2::new(0.0, 100.0), DVec2::new(10.0, 0.0), G);
        let precision = 1e-3;

        let CollisionSearch::Hit { time, segment } = ball.find_collision(&sector, 0.0, precision)
        else {
            panic!("expected a hit");
        };
        let expected = (200.0 / 9.8_f64).sqrt();
        assert_eq!(segment, 0);
        assert!((time - expected).abs() < 1e-3, "time = {time}");
        assert!((ball.x_at(time) - 45.18).abs() < 0.01);
        let gap = ball.y_at(time);
        assert!(gap > 0.0 && gap < precision);
    }

    #[test]
    fn test_hit_never_precedes_start_time() {
        let sector = flat(0.0, 1000.0);
        let ball = Ball::anchored(DVec2::new(0.0, 100.0), DVec2::new(10.0, 0.0), G);
        if let CollisionSearch::Hit { time, .. } = ball.find_collision(&sector, 3.0, 0.01) {
            assert!(time >= 3.0);
        } else {
            panic!("expected a hit");
        }
    }

    #[test]
    fn test_flies_over_low_segment_to_hit_wall() {
        // Low floor, then a steep ramp the ball slams into
        let sector = Sector::from_segments(vec![
            Segment::line(0.0, 0.0, 50.0, 0.0),
            Segment::line(0.0, 50.0, 100.0, 0.0),
            Segment::line(4.0, 100.0, 150.0, 0.0),
        ]);
        let ball = Ball::anchored(DVec2::new(10.0, 50.0), DVec2::new(60.0, 5.0), G);
        match ball.find_collision(&sector, 0.0, 0.01) {
            CollisionSearch::Hit { time, segment } => {
                assert_eq!(segment, 2);
                let x = ball.x_at(time);
                assert!(x > 100.0 && x < 150.0);
                let gap = ball.y_at(time) - sector.segments()[2].height_at(x);
                assert!(gap > 0.0 && gap < 0.01);
            }
            other => panic!("expected hit on the ramp, got {other:?}"),
        }
    }

    #[test]
    fn test_first_crossing_wins_over_later_segment() {
        // Ball comes down on segment 1; segment 2 would also be "below" later
        let sector = Sector::from_segments(vec![
            Segment::line(0.0, 0.0, 20.0, 0.0),
            Segment::line(0.0, 20.0, 40.0, 0.0),
            Segment::line(0.0, 40.0, 400.0, 0.0),
        ]);
        let ball = Ball::anchored(DVec2::new(5.0, 10.0), DVec2::new(10.0, 0.0), G);
        // Free fall of 10 units takes ~1.43 s, landing at x ≈ 19.3
        match ball.find_collision(&sector, 0.0, 0.01) {
            CollisionSearch::Hit { segment, .. } => assert_eq!(segment, 0),
            other => panic!("expected hit, got {other:?}"),
        }
    }

    #[test]
    fn test_leftward_flight() {
        let sector = Sector::from_segments(vec![
            Segment::line(0.0, 0.0, 50.0, 0.0),
            Segment::line(0.6, 50.0, 100.0, 0.0),
        ]);
        // Starts over the ramp moving left, clears it, lands on the flat left half
        let ball = Ball::anchored(DVec2::new(60.0, 40.0), DVec2::new(-20.0, 0.0), G);
        match ball.find_collision(&sector, 0.0, 0.01) {
            CollisionSearch::Hit { time, segment } => {
                assert_eq!(segment, 0);
                assert!(ball.x_at(time) < 50.0);
            }
            other => panic!("expected hit, got {other:?}"),
        }
    }

    #[test]
    fn test_ball_leaving_sector_misses() {
        let sector = flat(0.0, 100.0);
        let ball = Ball::anchored(DVec2::new(10.0, 500.0), DVec2::new(200.0, 0.0), G);
        assert_eq!(ball.find_collision(&sector, 0.0, 0.01), CollisionSearch::Miss);
    }

    fn hump_sector() -> Sector {
        Sector::from_segments(vec![
            Segment::line(0.0, 0.0, 100.0, 0.0),
            Segment::sine(100.0, 200.0, 0.0, 15.0, 1),
            Segment::line(0.0, 200.0, 1000.0, 0.0),
        ])
    }

    #[test]
    fn test_hump_between_clear_edges_is_hit() {
        // Clear of the hump at both of its edges, but under the crest at x = 150
        let sector = hump_sector();
        let ball = Ball::anchored(DVec2::new(50.0, 10.0), DVec2::new(100.0, 5.0), G);
        assert!(ball.y_at(1.0) < sector.segments()[1].height_at(150.0));

        match ball.find_collision(&sector, 0.0, 0.5) {
            CollisionSearch::Hit { time, segment } => {
                assert_eq!(segment, 1);
                let x = ball.x_at(time);
                assert!(x > 100.0 && x < 150.0, "x = {x}");
                let gap = ball.y_at(time) - sector.segments()[1].height_at(x);
                assert!(gap > 0.0 && gap < 0.5);
            }
            other => panic!("expected hit on the hump, got {other:?}"),
        }
    }

    #[test]
    fn test_ball_clearing_hump_lands_beyond() {
        let sector = hump_sector();
        let ball = Ball::anchored(DVec2::new(50.0, 40.0), DVec2::new(100.0, 5.0), G);
        match ball.find_collision(&sector, 0.0, 0.5) {
            CollisionSearch::Hit { segment, .. } => assert_eq!(segment, 2),
            other => panic!("expected hit past the hump, got {other:?}"),
        }
    }

    #[test]
    fn test_ball_outside_sector_flies_back_onto_it() {
        let sector = flat(0.0, 100.0);
        let ball = Ball::anchored(DVec2::new(130.0, 20.0), DVec2::new(-40.0, 0.0), G);
        match ball.find_collision(&sector, 0.0, 0.01) {
            CollisionSearch::Hit { time, segment } => {
                assert_eq!(segment, 0);
                let x = ball.x_at(time);
                assert!((0.0..100.0).contains(&x));
            }
            other => panic!("expected hit, got {other:?}"),
        }

        let away = Ball::anchored(DVec2::new(130.0, 20.0), DVec2::new(40.0, 0.0), G);
        assert_eq!(away.find_collision(&sector, 0.0, 0.01), CollisionSearch::Miss);
    }

    #[test]
    fn test_ball_below_surface_reports_no_convergence() {
        // Starting underground, the gap never turns positive inside the bracket
        let sector = flat(50.0, 100.0);
        let ball = Ball::anchored(DVec2::new(10.0, 0.0), DVec2::new(5.0, 0.0), G);
        assert_eq!(
            ball.find_collision(&sector, 0.0, 0.01),
            CollisionSearch::NoConvergence { segment: 0 }
        );
    }
}
