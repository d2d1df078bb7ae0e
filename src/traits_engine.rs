//! Runtime trait (synergy) aggregation: per-team unique-holder counting,
//! active-threshold tracking, and trigger dispatch.

use crate::effects::{apply, EffectContext};
use crate::model::trait_def::{TraitEffectTarget, TraitTriggerType};
use crate::world::World;
use std::collections::HashSet;

/// Recomputes every trait's active threshold for both teams and fires
/// `on_battle_start` effects for whichever threshold is active. Called once
/// during world setup, before the first tick.
pub fn apply_battle_start(world: &mut World) {
    for team in [0u8, 1u8] {
        let trait_ids: Vec<String> = world.templates.traits.keys().cloned().collect();
        for trait_id in trait_ids {
            let count = unique_holder_count(world, team, &trait_id);
            let Some(threshold) = world.templates.traits.get(&trait_id).and_then(|t| t.active_threshold(count).map(|(_, th)| th.clone())) else {
                continue;
            };
            world.active_trait_thresholds.insert((team, trait_id.clone()), count);
            match threshold.trigger {
                TraitTriggerType::OnBattleStart => {
                    fire_threshold(world, team, &trait_id, None, &threshold.target, &threshold.effects);
                }
                TraitTriggerType::OnTime => {
                    if let Some(at_tick) = threshold.at_tick {
                        world.trait_next_fire.insert((team, trait_id.clone()), at_tick);
                    }
                }
                TraitTriggerType::OnInterval => {
                    if let Some(period) = threshold.interval_ticks {
                        world.trait_next_fire.insert((team, trait_id.clone()), period);
                    }
                }
                TraitTriggerType::OnDamage | TraitTriggerType::OnFirstCast | TraitTriggerType::OnKill => {}
            }
        }
    }
}

/// Fires any `on_time`/`on_interval` trait threshold that is due this tick.
/// Called once per tick, alongside zone bookkeeping.
pub fn dispatch_time_triggers(world: &mut World) {
    let due: Vec<(u8, String, u32)> = world
        .trait_next_fire
        .iter()
        .filter(|(_, &next)| next <= world.tick)
        .map(|(k, &next)| (k.0, k.1.clone(), next))
        .collect();
    for (team, trait_id, _) in due {
        let Some(&count) = world.active_trait_thresholds.get(&(team, trait_id.clone())) else {
            world.trait_next_fire.remove(&(team, trait_id));
            continue;
        };
        let Some(threshold) = world.templates.traits.get(&trait_id).and_then(|t| t.active_threshold(count).map(|(_, th)| th.clone())) else {
            world.trait_next_fire.remove(&(team, trait_id));
            continue;
        };
        fire_threshold(world, team, &trait_id, None, &threshold.target, &threshold.effects);
        match threshold.trigger {
            TraitTriggerType::OnInterval => {
                if let Some(period) = threshold.interval_ticks {
                    world.trait_next_fire.insert((team, trait_id), world.tick + period);
                } else {
                    world.trait_next_fire.remove(&(team, trait_id));
                }
            }
            _ => {
                world.trait_next_fire.remove(&(team, trait_id));
            }
        }
    }
}

/// Unique `base_id` count of living-or-placed units on `team` carrying `trait_id`.
fn unique_holder_count(world: &World, team: u8, trait_id: &str) -> u32 {
    let mut seen: HashSet<&str> = HashSet::new();
    for unit in world.units.iter().filter(|u| u.team == team && u.trait_ids.iter().any(|t| t == trait_id)) {
        seen.insert(unit.base_id.as_str());
    }
    seen.len() as u32
}

/// Called after a unit on `team` deals damage, casts for the first time, or
/// gets a kill; fires any trait threshold whose trigger matches.
pub fn dispatch(world: &mut World, unit_id: &str, trigger: TraitTriggerType) {
    let Some(unit) = world.unit(unit_id) else { return };
    let team = unit.team;
    let trait_ids = unit.trait_ids.clone();
    for trait_id in trait_ids {
        let Some(&count) = world.active_trait_thresholds.get(&(team, trait_id.clone())) else { continue };
        let Some(template) = world.templates.traits.get(&trait_id) else { continue };
        let Some((_, threshold)) = template.active_threshold(count) else { continue };
        if threshold.trigger != trigger {
            continue;
        }
        let threshold = threshold.clone();
        fire_threshold(world, team, &trait_id, Some(unit_id), &threshold.target, &threshold.effects);
    }
}

fn fire_threshold(
    world: &mut World,
    team: u8,
    trait_id: &str,
    trigger_unit: Option<&str>,
    target: &TraitEffectTarget,
    effects: &[crate::effects::Effect],
) {
    let targets = resolve_targets(world, team, trait_id, trigger_unit, target);
    if targets.is_empty() {
        return;
    }
    let caster_id = trigger_unit.unwrap_or("").to_string();
    let ctx = EffectContext { caster_id, star_level: 1, targets, epicenter: None };
    for effect in effects {
        apply(effect, &ctx, world);
    }
}

fn resolve_targets(
    world: &mut World,
    team: u8,
    trait_id: &str,
    trigger_unit: Option<&str>,
    target: &TraitEffectTarget,
) -> Vec<String> {
    match target {
        TraitEffectTarget::Holders => world
            .units
            .iter()
            .filter(|u| u.is_alive() && u.team == team && u.trait_ids.iter().any(|t| t == trait_id))
            .map(|u| u.id.clone())
            .collect(),
        TraitEffectTarget::Team => world.living_team(team).into_iter().map(|u| u.id.clone()).collect(),
        TraitEffectTarget::SelfUnit => trigger_unit.map(|id| vec![id.to_string()]).unwrap_or_default(),
        TraitEffectTarget::Enemies => world.living_enemies_of(team).into_iter().map(|u| u.id.clone()).collect(),
        TraitEffectTarget::Adjacent => {
            let Some(source_pos) = trigger_unit.and_then(|id| world.unit(id)).map(|u| u.position) else { return vec![] };
            source_pos
                .neighbors()
                .iter()
                .filter_map(|&pos| world.grid.unit_at(pos))
                .filter(|id| world.unit(id).map(|u| u.team == team).unwrap_or(false))
                .map(|s| s.to_string())
                .collect()
        }
        TraitEffectTarget::NearestAlly => {
            let Some((source_id, source_pos)) = trigger_unit.and_then(|id| world.unit(id)).map(|u| (u.id.clone(), u.position)) else {
                return vec![];
            };
            let mut candidates: Vec<(String, i32)> = world
                .living_allies_of(team)
                .into_iter()
                .filter(|u| u.id != source_id)
                .map(|u| (u.id.clone(), source_pos.distance(u.position)))
                .collect();
            if candidates.is_empty() {
                return vec![];
            }
            candidates.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
            let best_distance = candidates[0].1;
            let tied: Vec<&str> = candidates
                .iter()
                .filter(|(_, d)| *d == best_distance)
                .map(|(id, _)| id.as_str())
                .collect();
            vec![world.rng.choice(&tied).to_string()]
        }
    }
}
