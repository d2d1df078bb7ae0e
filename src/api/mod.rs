//! The library's public boundary: takes a [`dto::RunRequest`], builds a
//! world, plays it out, and hands back a [`dto::SimulationOutput`]. Loading
//! `RunRequest` from disk, wiring it behind an HTTP handler, and parsing CLI
//! flags are all the caller's job; this module starts from an
//! already-deserialized request.

pub mod dto;

use crate::error::SimResult;
use crate::kernel;
use crate::setup;
use dto::{FinalState, GridMetadata, InitialState, RunRequest, SimulationOutput, Trace, TraceMetadata, UnitSnapshot};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Runs one full battle and returns its outcome plus the complete trace.
pub fn run(request: RunRequest) -> SimResult<SimulationOutput> {
    let RunRequest { rosters, seed, config, templates } = request;
    let ticks_per_second = config.ticks_per_second;
    let grid = GridMetadata { width: config.grid_width, height: config.grid_height };

    let mut world = setup::build_world(templates, &rosters, seed, config)?;
    let initial_state = InitialState { units: world.units.iter().map(snapshot).collect() };

    let started = Instant::now();
    let winner_team = kernel::run_battle(&mut world);
    let duration_seconds = started.elapsed().as_secs_f64();

    let mut survivors: Vec<String> = world.units.iter().filter(|u| u.is_alive()).map(|u| u.id.clone()).collect();
    survivors.sort();

    let metadata = TraceMetadata {
        version: env!("CARGO_PKG_VERSION"),
        seed,
        ticks_per_second,
        grid,
        timestamp: SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0),
    };
    let final_state = FinalState { winner_team, total_ticks: world.tick, survivors: survivors.clone() };
    let trace = Trace { metadata, initial_state, events: world.log.into_events(), final_state };

    Ok(SimulationOutput { winner_team, total_ticks: world.tick, duration_seconds, survivors, trace })
}

fn snapshot(unit: &crate::model::unit::Unit) -> UnitSnapshot {
    UnitSnapshot {
        id: unit.id.clone(),
        base_id: unit.base_id.clone(),
        name: unit.name.clone(),
        team: unit.team,
        star_level: unit.star_level,
        position: [unit.position.q, unit.position.r],
        max_hp: unit.stats.max_hp(),
    }
}
