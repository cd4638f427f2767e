//! Sector Golf entry point
//!
//! Generates a hole, lets the opening drop settle, takes one strike and
//! reports how the planned flight plays out.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use glam::DVec2;
use serde::Serialize;

use sector_golf::Settings;
use sector_golf::consts::TIME_SCALE;
use sector_golf::settings::SectorStyle;
use sector_golf::sim::{BounceChain, Hole, HoleEvent, HolePhase, Impact, Sector, TickInput, tick};

/// Ticks to follow before giving up on a flight that keeps getting extended
const MAX_SETTLE_TICKS: usize = 64;

#[derive(Parser, Debug)]
#[command(version, about = "Fire a ball across a generated sector and trace its bounces")]
struct Args {
    /// terrain seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// horizontal strike velocity
    #[arg(long, default_value_t = 30.0, allow_negative_numbers = true)]
    vx: f64,

    /// vertical strike velocity
    #[arg(long, default_value_t = 40.0, allow_negative_numbers = true)]
    vy: f64,

    /// settings file (JSON); missing keys fall back to defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// terrain style (overrides the settings file)
    #[arg(long, value_enum)]
    style: Option<SectorStyle>,

    /// print the hole and its planned flight as JSON
    #[arg(long)]
    json: bool,

    /// print N evenly spaced positions along the flight
    #[arg(long)]
    samples: Option<usize>,

    /// write the default settings to this path and exit
    #[arg(long)]
    write_default_config: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    seed: u64,
    strike: DVec2,
    phase: HolePhase,
    sector: &'a Sector,
    chain: &'a BounceChain,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(path) = &args.write_default_config {
        Settings::default()
            .save(path)
            .with_context(|| format!("writing default settings to {}", path.display()))?;
        println!("Wrote default settings to {}", path.display());
        return Ok(());
    }

    let mut settings = match &args.config {
        Some(path) => Settings::load(path).context("loading settings")?,
        None => Settings::default(),
    };
    if let Some(style) = args.style {
        settings.terrain.style = style;
    }
    let seed = args.seed.unwrap_or_else(clock_seed);
    log::info!("Sector Golf starting with seed {}", seed);

    let mut hole = Hole::new(seed, settings);
    let idle = TickInput::default();

    // Opening drop
    let mut now = settle(&mut hole, &idle, 0.0, args.json);
    if hole.phase != HolePhase::WaitingForStrike {
        anyhow::bail!("opening drop ended {:?}; try another seed", hole.phase);
    }

    let strike = DVec2::new(args.vx, args.vy);
    let input = TickInput {
        strike: Some(strike),
        ..Default::default()
    };
    for event in tick(&mut hole, &input, now) {
        report_event(&event, args.json);
    }
    let strike_time = hole.strike_time;
    let flight_end = hole.outcome_time();
    let plan = hole.chain.clone();
    now = settle(&mut hole, &idle, now, args.json);

    if args.json {
        let report = Report {
            seed,
            strike,
            phase: hole.phase,
            sector: &hole.sector,
            chain: &plan,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(samples) = args.samples {
        print_samples(&plan, flight_end, samples);
    }

    println!(
        "seed {}: struck at t={:.2} with ({:.1}, {:.1}), {} impacts, {:?} at t={:.2}",
        seed,
        strike_time,
        strike.x,
        strike.y,
        plan.impacts().len(),
        hole.phase,
        now
    );
    Ok(())
}

/// Tick at each planned outcome until the ball stops flying
fn settle(hole: &mut Hole, idle: &TickInput, mut now: f64, quiet: bool) -> f64 {
    for _ in 0..MAX_SETTLE_TICKS {
        now = hole.strike_time + hole.outcome_time();
        for event in tick(hole, idle, now) {
            report_event(&event, quiet);
        }
        if hole.phase != HolePhase::InFlight {
            break;
        }
    }
    now
}

fn report_event(event: &HoleEvent, quiet: bool) {
    log::debug!("{:?}", event);
    if quiet {
        return;
    }
    match event {
        HoleEvent::Struck { position, velocity } => println!(
            "  struck at ({:.1}, {:.1}) -> v=({:.1}, {:.1})",
            position.x, position.y, velocity.x, velocity.y
        ),
        HoleEvent::Bounced(Impact {
            time,
            position,
            segment,
        }) => println!(
            "  bounce t={:.2} at ({:.1}, {:.1}) on segment {}",
            time, position.x, position.y, segment
        ),
        HoleEvent::CameToRest { position } => {
            println!("  at rest at ({:.1}, {:.1})", position.x, position.y)
        }
        HoleEvent::LeftPlayfield { position } => {
            println!("  left the playfield at ({:.1}, {:.1})", position.x, position.y)
        }
        HoleEvent::Stalled { position } => {
            println!("  stalled at ({:.1}, {:.1})", position.x, position.y)
        }
    }
}

fn print_samples(chain: &BounceChain, until: f64, samples: usize) {
    let n = samples.max(2);
    println!("{:>8} {:>8} {:>10} {:>10}", "t", "wall", "x", "y");
    for i in 0..n {
        let t = until * i as f64 / (n - 1) as f64;
        if let Some(p) = chain.position_at(t) {
            println!("{:>8.3} {:>8.3} {:>10.3} {:>10.3}", t, t / TIME_SCALE, p.x, p.y);
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
