//! Real-time hole driver
//!
//! The presentation layer calls [`tick`] once per frame with the current sim
//! time and whatever the player did. Nothing is integrated here; the ball's
//! flight was planned at the last strike and `tick` only reports which
//! planned events have now happened.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::state::{Hole, HolePhase};
use super::trajectory::{ChainStatus, Impact};
use crate::consts::NUDGE_SPEED;

/// Player input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Replace the ball's velocity outright (a full strike)
    pub strike: Option<DVec2>,
    /// Directional nudges, each adding `NUDGE_SPEED` along its axis
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl TickInput {
    /// Net velocity change from the directional nudges
    pub fn nudge(&self) -> DVec2 {
        let mut delta = DVec2::ZERO;
        if self.left {
            delta.x -= NUDGE_SPEED;
        }
        if self.right {
            delta.x += NUDGE_SPEED;
        }
        if self.up {
            delta.y += NUDGE_SPEED;
        }
        if self.down {
            delta.y -= NUDGE_SPEED;
        }
        delta
    }

    /// Input carries an impulse
    pub fn is_impulse(&self) -> bool {
        self.strike.is_some() || self.left || self.right || self.up || self.down
    }
}

/// Something that happened to the ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HoleEvent {
    /// An impulse was applied and the flight replanned
    Struck { position: DVec2, velocity: DVec2 },
    Bounced(Impact),
    CameToRest { position: DVec2 },
    LeftPlayfield { position: DVec2 },
    Stalled { position: DVec2 },
}

/// Advance the hole to sim time `now`, applying `input` first
pub fn tick(hole: &mut Hole, input: &TickInput, now: f64) -> Vec<HoleEvent> {
    let mut events = Vec::new();

    // Impulses apply in every phase, so a departing ball can be steered back
    if input.is_impulse() {
        let base = input.strike.unwrap_or_else(|| hole.ball_velocity(now));
        let velocity = base + input.nudge();
        let position = hole.ball_position(now);
        hole.strike(velocity, now);
        events.push(HoleEvent::Struck { position, velocity });
    }

    if hole.phase != HolePhase::InFlight {
        return events;
    }

    let t = hole.chain_time(now);
    let impacts = hole.chain.impacts();
    for impact in impacts.iter().skip(hole.reported_impacts) {
        if impact.time > t {
            break;
        }
        events.push(HoleEvent::Bounced(*impact));
        hole.reported_impacts += 1;
    }

    let outcome_time = hole.outcome_time();
    if t < outcome_time {
        return events;
    }

    let position = hole.chain.position_at(outcome_time).unwrap_or(DVec2::ZERO);
    match hole.chain.status {
        ChainStatus::WaitingForStrike => {
            hole.phase = HolePhase::WaitingForStrike;
            events.push(HoleEvent::CameToRest { position });
        }
        ChainStatus::Impossible => {
            hole.phase = HolePhase::OutOfBounds;
            events.push(HoleEvent::LeftPlayfield { position });
        }
        ChainStatus::Stalled => {
            hole.phase = HolePhase::Stalled;
            events.push(HoleEvent::Stalled { position });
        }
        ChainStatus::Truncated => {
            // Keep flying: plan the next stretch from where this one stopped
            if let Some(ball) = hole.chain.ball_at(outcome_time) {
                let resume_at = hole.strike_time + outcome_time;
                log::debug!("Extending truncated flight at t={:.3}", resume_at);
                hole.replan(ball, resume_at);
            }
        }
    }

    events
}
