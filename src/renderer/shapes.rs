//! Triangle-list geometry for the sector, the ball and its planned flight
//!
//! Everything here is read-only over sim types. The sector is drawn purely
//! through `height_at`, so sine humps and lines need no separate paths.

use glam::{DVec2, Vec2};
use std::f32::consts::PI;

use super::vertex::Vertex;
use crate::sim::{BounceChain, Sector};

/// Shade a flight sample by speed (slow=blue, fast=orange)
fn speed_color(speed: f64, max_speed: f64, alpha: f32) -> [f32; 4] {
    let t = if max_speed > 0.0 {
        (speed / max_speed).clamp(0.0, 1.0) as f32
    } else {
        0.0
    };

    let (r, g, b) = if t < 0.5 {
        // Blue to green
        let u = t / 0.5;
        (0.2, 0.4 + 0.4 * u, 1.0 - 0.6 * u)
    } else {
        // Green to orange
        let u = (t - 0.5) / 0.5;
        (0.2 + 0.8 * u, 0.8 - 0.3 * u, 0.4 - 0.2 * u)
    };

    [r, g, b, alpha]
}

fn push_quad(vertices: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: [f32; 4]) {
    // a-b on one side, c-d on the other
    vertices.push(Vertex::new(a.x, a.y, color));
    vertices.push(Vertex::new(b.x, b.y, color));
    vertices.push(Vertex::new(c.x, c.y, color));

    vertices.push(Vertex::new(c.x, c.y, color));
    vertices.push(Vertex::new(b.x, b.y, color));
    vertices.push(Vertex::new(d.x, d.y, color));
}

/// Filled terrain from the surface down to y = 0
pub fn sector_mesh(sector: &Sector, color: [f32; 4], samples_per_segment: usize) -> Vec<Vertex> {
    let steps = samples_per_segment.max(1);
    let mut vertices = Vec::with_capacity(sector.len() * steps * 6);

    for segment in sector.segments() {
        let width = segment.width();
        for i in 0..steps {
            let x1 = segment.start_x + width * i as f64 / steps as f64;
            let x2 = segment.start_x + width * (i + 1) as f64 / steps as f64;
            let top1 = Vec2::new(x1 as f32, segment.height_at(x1) as f32);
            let top2 = Vec2::new(x2 as f32, segment.height_at(x2) as f32);
            let base1 = Vec2::new(x1 as f32, 0.0);
            let base2 = Vec2::new(x2 as f32, 0.0);
            push_quad(&mut vertices, top1, base1, top2, base2, color);
        }
    }

    vertices
}

/// Ball as a filled disc
pub fn ball_quad(center: DVec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let center = center.as_vec2();
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Thick polyline along the planned flight from chain time 0 to `until`,
/// shaded by speed and fading toward the end
pub fn flight_path(chain: &BounceChain, until: f64, samples: usize, half_width: f32) -> Vec<Vertex> {
    if samples < 2 || until <= 0.0 {
        return Vec::new();
    }

    let points: Vec<(Vec2, f64)> = (0..samples)
        .filter_map(|i| {
            let t = until * i as f64 / (samples - 1) as f64;
            let pos = chain.position_at(t)?;
            let speed = chain.velocity_at(t)?.length();
            Some((pos.as_vec2(), speed))
        })
        .collect();
    if points.len() < 2 {
        return Vec::new();
    }

    let max_speed = points.iter().map(|(_, s)| *s).fold(0.0, f64::max);
    let count = points.len() as f32;
    let mut vertices = Vec::with_capacity(points.len() * 6);

    for (i, pair) in points.windows(2).enumerate() {
        let (p1, s1) = pair[0];
        let (p2, s2) = pair[1];

        let dir = (p2 - p1).normalize_or_zero();
        // Resting stretches have no direction to widen along
        if dir == Vec2::ZERO {
            continue;
        }
        let perp = Vec2::new(-dir.y, dir.x) * half_width;

        let alpha = 1.0 - 0.6 * (i as f32 / count);
        let c1 = speed_color(s1, max_speed, alpha);
        let c2 = speed_color(s2, max_speed, alpha);

        vertices.push(Vertex::new((p1 + perp).x, (p1 + perp).y, c1));
        vertices.push(Vertex::new((p1 - perp).x, (p1 - perp).y, c1));
        vertices.push(Vertex::new((p2 + perp).x, (p2 + perp).y, c2));

        vertices.push(Vertex::new((p2 + perp).x, (p2 + perp).y, c2));
        vertices.push(Vertex::new((p1 - perp).x, (p1 - perp).y, c1));
        vertices.push(Vertex::new((p2 - perp).x, (p2 - perp).y, c2));
    }

    vertices
}
