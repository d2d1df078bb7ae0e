//! Turns a template bundle and a pair of rosters into a ready-to-tick
//! `World`: template validation, default/star-level merging, deterministic
//! id assignment, and grid placement. Everything here runs once, before
//! the first tick.

use crate::api::dto::{RosterEntry, TemplateBundle};
use crate::config::{SimulationConfig, StarLevelScaling};
use crate::error::{SimResult, SimulationError};
use crate::events::EventType;
use crate::hex::HexGrid;
use crate::model::stats::{StatBlock, UnitStats};
use crate::model::unit::{Unit, UnitScratch};
use crate::rng::GameRng;
use crate::state_machine::UnitStateMachine;
use crate::world::World;
use serde_json::json;

/// Builds a fresh `World` from two rosters, validating every template
/// reference and item loadout before a single unit is placed.
pub fn build_world(
    templates: TemplateBundle,
    rosters: &[Vec<RosterEntry>; 2],
    seed: u64,
    config: SimulationConfig,
) -> SimResult<World> {
    if rosters[0].is_empty() && rosters[1].is_empty() {
        return Err(SimulationError::EmptyRoster);
    }

    let grid = HexGrid::new(config.grid_width, config.grid_height);
    let rng = GameRng::new(seed);
    let mut world = World::new(grid, rng, config, templates);

    for (team, roster) in rosters.iter().enumerate() {
        for (index, entry) in roster.iter().enumerate() {
            let unit = build_unit(&world.templates, entry, team as u8, index)?;
            // Bad placement (invalid/occupied hex) refuses only this spawn;
            // it does not abort the simulation (unlike a bad template id).
            if let Err(reason) = world.grid.place(&unit.id, unit.position) {
                log::warn!("refusing spawn for '{}': {reason}", unit.id);
                continue;
            }
            place_unit(&mut world, unit, entry);
        }
    }

    Ok(world)
}

fn build_unit(
    templates: &TemplateBundle,
    entry: &RosterEntry,
    team: u8,
    roster_index: usize,
) -> SimResult<Unit> {
    let Some(template) = templates.units.get(&entry.unit_template_id) else {
        return Err(SimulationError::UnknownTemplateId {
            kind: "unit",
            id: entry.unit_template_id.clone(),
        });
    };
    let mut template = template.clone();
    templates.unit_defaults.apply_to(&mut template);

    if let Some(ability_id) = &template.ability {
        if !templates.abilities.contains_key(ability_id) {
            return Err(SimulationError::UnknownTemplateId {
                kind: "ability",
                id: ability_id.clone(),
            });
        }
    }
    for trait_id in &template.traits {
        if !templates.traits.contains_key(trait_id) {
            return Err(SimulationError::UnknownTemplateId {
                kind: "trait",
                id: trait_id.clone(),
            });
        }
    }
    validate_loadout(templates, entry)?;

    let star_level = entry.star_level.clamp(1, 3);
    let scaling = star_scaling_for(templates, star_level);
    let base_stats = StatBlock {
        hp: template.stats.hp * scaling.hp_multiplier,
        attack_damage: template.stats.attack_damage * scaling.damage_multiplier,
        ability_power: template.stats.ability_power * scaling.damage_multiplier,
        ..template.stats.clone()
    };

    let id = unit_id(team, roster_index, &entry.unit_template_id);
    let stats = UnitStats::new(base_stats, template.attack_range, template.max_mana, template.start_mana);

    Ok(Unit {
        id,
        base_id: entry.unit_template_id.clone(),
        name: template.name.clone(),
        team,
        star_level,
        position: entry.hex(),
        stats,
        status: Default::default(),
        state: UnitStateMachine::default(),
        target: None,
        ability_id: template.ability.clone(),
        item_ids: entry.item_ids.clone(),
        trait_ids: template.traits.clone(),
        attack_cooldown: 0,
        attack_range: template.attack_range,
        scratch: UnitScratch::default(),
    })
}

fn validate_loadout(templates: &TemplateBundle, entry: &RosterEntry) -> SimResult<()> {
    if entry.item_ids.len() > 3 {
        return Err(SimulationError::InvalidLoadout {
            unit_id: entry.unit_template_id.clone(),
            reason: format!("{} items equipped, max is 3", entry.item_ids.len()),
        });
    }
    let mut seen_unique = std::collections::HashSet::new();
    for item_id in &entry.item_ids {
        let Some(item) = templates.items.get(item_id) else {
            return Err(SimulationError::UnknownTemplateId { kind: "item", id: item_id.clone() });
        };
        if item.unique && !seen_unique.insert(item_id.clone()) {
            return Err(SimulationError::InvalidLoadout {
                unit_id: entry.unit_template_id.clone(),
                reason: format!("unique item '{item_id}' equipped more than once"),
            });
        }
    }
    Ok(())
}

fn star_scaling_for(templates: &TemplateBundle, star_level: u8) -> StarLevelScaling {
    let idx = (star_level.clamp(1, 3) - 1) as usize;
    templates.star_scaling.get(idx).cloned().unwrap_or_else(|| StarLevelScaling::for_star(star_level))
}

/// `team_rosterIndex_templateId`, stable across runs with the same rosters:
/// no randomness, no counter shared across teams.
fn unit_id(team: u8, roster_index: usize, template_id: &str) -> String {
    format!("t{team}_{roster_index}_{template_id}")
}

/// Records a unit that has already been placed on the grid into the world
/// and emits its spawn event. Placement itself happens in `build_world`
/// so a failed placement can skip the unit without touching the world.
fn place_unit(world: &mut World, unit: Unit, entry: &RosterEntry) {
    let pos = entry.hex();
    let (id, team, star_level, max_hp) = (unit.id.clone(), unit.team, unit.star_level, unit.stats.max_hp());
    world.add_unit(unit);
    world.log.push(
        0,
        EventType::UnitSpawn,
        Some(id),
        None,
        Some(json!({"team": team, "star_level": star_level, "position": [pos.q, pos.r], "max_hp": max_hp})),
    );
}
