//! The fixed-order tick pipeline: everything that can happen in one tick
//! happens in exactly this order, every time, for every seed.

use crate::damage::{calculate_damage, mana_from_damage, DamageModifiers};
use crate::effects::{apply, resolve_aoe, Effect, EffectContext};
use crate::events::EventType;
use crate::hex::find_path;
use crate::items;
use crate::model::ability::{AbilityTemplate, Delivery};
use crate::model::item::TriggerType;
use crate::model::status::{DamageType, StackTrigger};
use crate::model::trait_def::TraitTriggerType;
use crate::model::unit::TargetRef;
use crate::projectile::ProjectileStep;
use crate::state_machine::UnitState;
use crate::targeting::{select, TargetSelector};
use crate::traits_engine;
use crate::world::World;
use crate::zone::ZoneStep;
use serde_json::json;
use std::collections::HashSet;

/// Runs the whole battle: setup triggers, then ticks until a team wipes or
/// `max_ticks` is reached. Returns the winning team, or `None` for a draw.
pub fn run_battle(world: &mut World) -> Option<u8> {
    world.log.push(0, EventType::SimulationStart, None, None, None);

    traits_engine::apply_battle_start(world);
    let ids: Vec<String> = world.units.iter().map(|u| u.id.clone()).collect();
    for id in &ids {
        items::equip_items(world, id);
    }
    for id in &ids {
        items::apply_battle_start(world, id);
    }

    while !world.terminal && world.tick < world.config.max_ticks {
        tick(world);
        check_end_condition(world);
    }

    world.log.push(world.tick, EventType::SimulationEnd, None, None, Some(json!({"winner_team": world.winner})));
    world.winner
}

fn tick(world: &mut World) {
    world.tick += 1;
    world.log.push(world.tick, EventType::TickStart, None, None, None);

    phase_zone_tick(world);
    phase_status_tick(world);
    phase_ability_trigger_check(world);
    phase_ai_decision(world);
    phase_effect_point_firing(world);
    phase_action_execution(world);
    phase_projectile_advance(world);
    phase_cooldowns_and_state_tick(world);
}

/// Phases 1-2: trait time-triggers and zone/passive bookkeeping.
fn phase_zone_tick(world: &mut World) {
    traits_engine::dispatch_time_triggers(world);
    let tick = world.tick;
    for id in world.living_ids() {
        items::dispatch_on_interval(world, &id, tick);
        fire_unit_interval_triggers(world, &id, tick);
    }

    let mut triggered = Vec::new();
    let mut expired = Vec::new();
    for zone in &mut world.zones.zones {
        match zone.tick() {
            ZoneStep::Triggered => triggered.push((zone.id, zone.center, zone.radius, zone.source_id.clone(), zone.on_tick_effects.clone())),
            ZoneStep::Expired => expired.push((zone.id, zone.center, zone.radius, zone.source_id.clone(), zone.on_end_effects.clone())),
            ZoneStep::Idle => {}
        }
    }
    let triggered_ids: HashSet<u64> = triggered.iter().map(|(id, ..)| *id).collect();
    for (zone_id, center, radius, source_id, effects) in triggered.into_iter().chain(expired.clone().into_iter()) {
        let targets: Vec<String> = world
            .units
            .iter()
            .filter(|u| u.is_alive() && center.distance(u.position) <= radius)
            .map(|u| u.id.clone())
            .collect();
        if targets.is_empty() {
            continue;
        }
        let ctx = EffectContext { caster_id: source_id, star_level: 1, targets, epicenter: Some(center) };
        let mut damage_done = 0.0;
        for effect in &effects {
            let result = apply(effect, &ctx, world);
            if result.is_damage() {
                damage_done += result.value;
            }
        }
        if damage_done > 0.0 && triggered_ids.contains(&zone_id) {
            if let Some(zone) = world.zones.zones.iter_mut().find(|z| z.id == zone_id) {
                zone.record_damage(damage_done);
            }
        }
    }
    let expired_ids: HashSet<u64> = expired.iter().map(|(id, ..)| *id).collect();
    world.zones.zones.retain(|z| !expired_ids.contains(&z.id));
}

/// Fires any passive installed by `Effect::IntervalTrigger` whose schedule
/// is due, then reschedules it for the rest of the battle.
fn fire_unit_interval_triggers(world: &mut World, unit_id: &str, tick: u32) {
    let due: Vec<(usize, crate::effects::Effect, String)> = {
        let Some(unit) = world.unit(unit_id) else { return };
        unit.scratch
            .interval_triggers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.next_tick <= tick)
            .map(|(i, t)| (i, (*t.effect).clone(), t.source_id.clone()))
            .collect()
    };
    for (idx, effect, source_id) in due {
        let ctx = EffectContext { caster_id: source_id, star_level: 1, targets: vec![unit_id.to_string()], epicenter: None };
        apply(&effect, &ctx, world);
        if let Some(unit) = world.unit_mut(unit_id) {
            if let Some(trigger) = unit.scratch.interval_triggers.get_mut(idx) {
                trigger.next_tick = tick + trigger.interval_ticks;
            }
        }
    }
}

/// Phase 3: status-effect ticking (DoTs/burns, timed debuffs, stat decay).
fn phase_status_tick(world: &mut World) {
    let ids: Vec<String> = world.living_ids();
    let current_tick = world.tick;
    let ticks_per_second = world.config.ticks_per_second;
    for id in &ids {
        let hits = {
            let Some(unit) = world.unit_mut(id) else { continue };
            unit.status.tick_timed_effects();
            unit.tick_timed_stat_buffs();
            unit.status.tick_dots_and_burns(current_tick, ticks_per_second)
        };
        for (amount, damage_type, source_id) in hits {
            world.deal_damage(id, &source_id, amount, damage_type);
        }
        process_heal_over_time(world, id, current_tick);
    }
}

fn process_heal_over_time(world: &mut World, id: &str, current_tick: u32) {
    let due: Vec<usize> = {
        let Some(unit) = world.unit(id) else { return };
        unit.scratch
            .heal_over_time
            .iter()
            .enumerate()
            .filter(|(_, h)| h.next_tick <= current_tick && h.remaining_ticks > 0)
            .map(|(i, _)| i)
            .collect()
    };
    for idx in due {
        let Some(unit) = world.unit_mut(id) else { continue };
        let Some(entry) = unit.scratch.heal_over_time.get_mut(idx) else { continue };
        let amount = if entry.is_percent_max_hp {
            entry.amount_per_tick * unit.stats.max_hp()
        } else {
            entry.amount_per_tick
        };
        entry.next_tick = current_tick + entry.interval;
        world.heal(id, amount);
    }
    let Some(unit) = world.unit_mut(id) else { return };
    for entry in &mut unit.scratch.heal_over_time {
        if entry.remaining_ticks > 0 {
            entry.remaining_ticks -= 1;
        }
    }
    unit.scratch.heal_over_time.retain(|h| h.remaining_ticks > 0);
}

/// Phase 4: start casts for units with full, unlocked mana and an off-cooldown ability.
fn phase_ability_trigger_check(world: &mut World) {
    let ids: Vec<String> = world.living_ids();
    for id in &ids {
        let Some(unit) = world.unit(id) else { continue };
        if unit.state.state != UnitState::Idle && unit.state.state != UnitState::Attacking {
            continue;
        }
        if unit.status.is_silenced() || !unit.has_full_mana() {
            continue;
        }
        let Some(ability_id) = unit.ability_id.clone() else { continue };
        let Some(ability) = world.templates.abilities.get(&ability_id).cloned() else { continue };
        let star_level = unit.star_level;
        let caster_pos = unit.position;
        let caster_team = unit.team;

        let targets = resolve_ability_targets(world, id, caster_team, caster_pos, &ability);
        if targets.is_empty() {
            continue;
        }

        let Some(unit) = world.unit_mut(id) else { continue };
        unit.consume_mana_for_cast();
        unit.state.start_cast(
            ability.cast_time_for(star_level),
            ability.effect_delay_for(star_level),
            ability.mana_lock_for(star_level),
        );
        let first_cast = !unit.scratch.has_cast_before;
        unit.scratch.has_cast_before = true;
        unit.scratch.pending_ability_targets = targets;
        unit.scratch.pending_ability_epicenter = Some(caster_pos);
        unit.fire_stack_trigger(StackTrigger::OnCast);

        world.log.push(world.tick, EventType::AbilityCast, Some(id.clone()), None, Some(json!({"ability_id": ability_id})));
        if first_cast {
            items::dispatch(world, id, TriggerType::OnFirstCast, None);
            traits_engine::dispatch(world, id, TraitTriggerType::OnFirstCast);
        }
        items::dispatch(world, id, TriggerType::OnAbilityCast, None);
    }
}

fn resolve_ability_targets(
    world: &mut World,
    caster_id: &str,
    caster_team: u8,
    caster_pos: crate::hex::HexCoord,
    ability: &AbilityTemplate,
) -> Vec<String> {
    let offensive = !matches!(
        ability.effects.first(),
        Some(Effect::Heal { .. })
            | Some(Effect::Shield { .. })
            | Some(Effect::CleanseDebuffs)
            | Some(Effect::GrantMana { .. })
            | Some(Effect::BuffTeam { .. })
            | Some(Effect::ShieldSelf { .. })
            | Some(Effect::HealOverTime { .. })
    );
    let mut rng = world.rng_snapshot();
    let targets = {
        let pool: Vec<&crate::model::unit::Unit> = if offensive {
            world.living_enemies_of(caster_team)
        } else {
            world.living_allies_of(caster_team)
        };
        match world.unit(caster_id) {
            None => None,
            Some(caster) => select(&ability.target_type, caster, &pool, &mut rng).map(|primary| match &ability.aoe_config {
                None => vec![primary.id.clone()],
                Some(shape) => {
                    let hits = resolve_aoe(shape, caster_pos, primary.position, &pool);
                    if hits.is_empty() {
                        vec![primary.id.clone()]
                    } else {
                        hits.into_iter().map(|u| u.id.clone()).collect()
                    }
                }
            }),
        }
    };
    world.commit_rng(rng);
    targets.unwrap_or_default()
}

/// Phase 5: target acquisition and state transition only — no movement or
/// attacks happen here. A unit decided to attack this phase may still be
/// pre-empted by a stun that lands in phase 6 (effect-point firing) before
/// phase 7 gets a chance to execute the action.
fn phase_ai_decision(world: &mut World) {
    let ids: Vec<String> = world.living_ids();
    for id in &ids {
        let Some(unit) = world.unit(id) else { continue };
        let current_state = unit.state.state;
        if current_state != UnitState::Idle && current_state != UnitState::Attacking && current_state != UnitState::Moving {
            continue;
        }
        let team = unit.team;
        let position = unit.position;
        let attack_range = unit.attack_range;
        let forced_target = unit.status.taunt.as_ref().map(|t| t.forced_target.clone());

        let target_info = if let Some(forced_id) = forced_target.filter(|tid| world.is_alive(tid)) {
            world.unit(&forced_id).map(|t| (t.id.clone(), t.position))
        } else {
            let mut rng = world.rng_snapshot();
            let target_info = {
                let enemies = world.living_enemies_of(team);
                let target = select(&TargetSelector::CurrentTarget { max_range: None }, world.unit(id).unwrap(), &enemies, &mut rng);
                target.map(|t| (t.id.clone(), t.position))
            };
            world.commit_rng(rng);
            target_info
        };

        let Some((target_id, target_pos)) = target_info else { continue };

        retarget_if_changed(world, id, &target_id);

        let distance = position.distance(target_pos);
        let in_range = distance <= attack_range;
        if let Some(unit) = world.unit_mut(id) {
            match current_state {
                UnitState::Idle | UnitState::Attacking => {
                    unit.state.transition(if in_range { UnitState::Attacking } else { UnitState::Moving });
                }
                UnitState::Moving => {
                    if in_range {
                        unit.state.transition(UnitState::Attacking);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Phase 7: carries out the movement or auto-attack decided in phase 5,
/// against whatever state the unit is actually in after phase 6's effect
/// firing — a cast-cancelling stun there means this phase simply does
/// nothing for that unit.
fn phase_action_execution(world: &mut World) {
    let ids: Vec<String> = world.living_ids();
    for id in &ids {
        let Some(unit) = world.unit(id) else { continue };
        let state = unit.state.state;
        let Some(target_id) = unit.target.as_ref().map(|t| t.id.clone()) else { continue };
        match state {
            UnitState::Attacking => try_attack(world, id, &target_id),
            UnitState::Moving => {
                if let Some(target_pos) = world.unit(&target_id).map(|t| t.position) {
                    step_toward(world, id, target_pos, &target_id);
                }
            }
            _ => {}
        }
    }
}

fn retarget_if_changed(world: &mut World, unit_id: &str, target_id: &str) {
    let Some(unit) = world.unit_mut(unit_id) else { return };
    let changed = unit.target.as_ref().map(|t| t.id != target_id).unwrap_or(true);
    if changed {
        unit.target = Some(TargetRef { id: target_id.to_string() });
        world.log.push(world.tick, EventType::TargetAcquired, Some(unit_id.to_string()), Some(target_id.to_string()), None);
    }
}

fn try_attack(world: &mut World, attacker_id: &str, target_id: &str) {
    let Some(unit) = world.unit(attacker_id) else { return };
    if unit.attack_cooldown > 0 || unit.status.is_disarmed() {
        return;
    }

    let attacker = unit.clone();
    let Some(target) = world.unit(target_id) else { return };
    let target = target.clone();

    let empowered = attacker.scratch.empowered_attack.clone();
    let base_damage = empowered.as_ref().map(|e| e.damage).unwrap_or_else(|| attacker.stats.attack_damage());
    let in_range = empowered.as_ref().map(|e| e.infinite_range).unwrap_or(false)
        || attacker.position.distance(target.position) <= attacker.attack_range;
    if !in_range {
        return;
    }

    let modifiers = items::aggregate_conditional_modifiers(
        world,
        attacker_id,
        target.stats.max_hp(),
        1.0 - target.stats.hp_percent(),
    );
    let result = calculate_damage(&attacker, &target, base_damage, DamageType::Physical, &mut world.rng, true, true, false, modifiers);
    world.deal_damage(target_id, attacker_id, result.final_damage, result.damage_type);
    if result.lifesteal_amount > 0.0 {
        world.heal(attacker_id, result.lifesteal_amount);
    }
    let defender_mana = mana_from_damage(&result, world.config_mana_pre(), world.config_mana_post(), world.config_mana_cap());
    world.gain_mana(target_id, defender_mana);

    if let Some(bonus) = attacker.scratch.transform_on_hit.clone() {
        let extra = bonus.scaling.resolve(&attacker, &target) + bonus.current_bonus;
        if world.is_alive(target_id) && extra > 0.0 {
            let bonus_result = calculate_damage(&attacker, &target, extra, bonus.damage_type, &mut world.rng, false, false, true, DamageModifiers::default());
            world.deal_damage(target_id, attacker_id, bonus_result.final_damage, bonus.damage_type);
        }
        if let Some(unit) = world.unit_mut(attacker_id) {
            if let Some(on_hit) = &mut unit.scratch.transform_on_hit {
                on_hit.current_bonus += bonus.stack_per_hit;
            }
        }
    }

    world.log.push(world.tick, EventType::UnitAttack, Some(attacker_id.to_string()), Some(target_id.to_string()), Some(json!({"damage": result.final_damage, "is_crit": result.is_crit})));

    if let Some(unit) = world.unit_mut(attacker_id) {
        unit.gain_mana(world.templates_mana_per_attack(), true);
        unit.state.transition(UnitState::Attacking);
        let slowed_attack_speed = (unit.stats.attack_speed() * (1.0 - unit.status.attack_speed_slow_percent())).max(0.01);
        let cooldown = (world.config.ticks_per_second as f64 / slowed_attack_speed).round().max(1.0) as u32;
        unit.attack_cooldown = cooldown;
        unit.fire_stack_trigger(StackTrigger::OnAttack);
        if let Some(empowered) = &mut unit.scratch.empowered_attack {
            empowered.remaining_uses = empowered.remaining_uses.saturating_sub(1);
            if empowered.remaining_uses == 0 {
                unit.scratch.empowered_attack = None;
            }
        }
    }
    traits_engine::dispatch(world, attacker_id, TraitTriggerType::OnDamage);
    items::dispatch(world, attacker_id, TriggerType::OnAttack, None);
    items::dispatch(world, target_id, TriggerType::OnTakeDamage, None);
    if !world.is_alive(target_id) {
        items::dispatch(world, attacker_id, TriggerType::OnKill, None);
        traits_engine::dispatch(world, attacker_id, TraitTriggerType::OnKill);
        if let Some(unit) = world.unit_mut(attacker_id) {
            unit.target = None;
        }
        world.log.push(world.tick, EventType::TargetLost, Some(attacker_id.to_string()), Some(target_id.to_string()), None);
    }
}

fn step_toward(world: &mut World, unit_id: &str, destination: crate::hex::HexCoord, ignore_id: &str) {
    let Some(unit) = world.unit(unit_id) else { return };
    let start = unit.position;
    let mut ignore = HashSet::new();
    ignore.insert(ignore_id.to_string());
    let Some(path) = find_path(&world.grid, start, destination, &ignore) else { return };
    if path.len() < 2 {
        return;
    }
    let next = path[1];
    if let Some(unit) = world.unit_mut(unit_id) {
        unit.state.transition(UnitState::Moving);
    }
    world.move_unit(unit_id, next);
}

/// Phase 6: fires ability effects once a cast's effect-delay elapses.
fn phase_effect_point_firing(world: &mut World) {
    let ids: Vec<String> = world.living_ids();
    for id in &ids {
        let Some(unit) = world.unit(id) else { continue };
        if unit.state.state != UnitState::Casting || !unit.state.should_trigger_effect() {
            continue;
        }
        let Some(ability_id) = unit.ability_id.clone() else { continue };
        let Some(ability) = world.templates.abilities.get(&ability_id).cloned() else { continue };
        let star_level = unit.star_level;
        let targets = unit.scratch.pending_ability_targets.clone();
        let epicenter = unit.scratch.pending_ability_epicenter;

        if let Some(unit) = world.unit_mut(id) {
            unit.state.mark_effect_triggered();
        }

        match ability.delivery {
            Delivery::Instant => {
                let ctx = EffectContext { caster_id: id.clone(), star_level, targets, epicenter };
                for effect in &ability.effects {
                    apply(effect, &ctx, world);
                }
                world.log.push(world.tick, EventType::AbilityEffect, Some(id.clone()), None, None);
            }
            Delivery::Projectile => {
                spawn_ability_projectile(world, id, &ability, star_level, &targets);
            }
        }
    }
}

fn spawn_ability_projectile(world: &mut World, caster_id: &str, ability: &AbilityTemplate, star_level: u8, targets: &[String]) {
    let Some(target_id) = targets.first().cloned() else { return };
    let Some(config) = &ability.projectile_config else { return };
    let Some(caster) = world.unit(caster_id) else { return };
    let Some(target) = world.unit(&target_id) else { return };
    let start_pixel = caster.position.pixel();
    let target_pixel = target.position.pixel();
    let id = world.projectiles.spawn(
        caster_id.to_string(),
        target_id,
        ability.id.clone(),
        star_level,
        start_pixel,
        target_pixel,
        config.speed,
        config.homing,
        config.can_miss,
        config.max_ticks,
    );
    world.pending_projectile_effects.insert(id, (caster_id.to_string(), star_level, ability.effects.clone()));
}

/// Phase 8: advances in-flight projectiles, applying effects on arrival.
fn phase_projectile_advance(world: &mut World) {
    let snapshot: Vec<(u64, String, bool)> = world
        .projectiles
        .projectiles
        .iter()
        .map(|p| (p.id, p.target_id.clone(), p.active))
        .collect();

    let mut arrivals = Vec::new();
    for (id, target_id, active) in snapshot {
        if !active {
            continue;
        }
        let live_pixel = world.unit(&target_id).filter(|u| u.is_alive()).map(|u| u.position.pixel());
        let Some(projectile) = world.projectiles.projectiles.iter_mut().find(|p| p.id == id) else { continue };
        match projectile.tick(live_pixel) {
            ProjectileStep::Arrived => arrivals.push((id, projectile.target_id.clone())),
            ProjectileStep::InFlight | ProjectileStep::Missed | ProjectileStep::TimedOut => {}
        }
    }

    for (id, target_id) in arrivals {
        let Some((caster_id, star_level, effects)) = world.pending_projectile_effects.remove(&id) else { continue };
        if !world.is_alive(&target_id) {
            continue;
        }
        let ctx = EffectContext { caster_id, star_level, targets: vec![target_id], epicenter: None };
        for effect in &effects {
            apply(&effect, &ctx, world);
        }
    }

    world.projectiles.projectiles.retain(|p| p.active);
}

/// Phase 9: advances cast/mana-lock/stun timers and attack cooldowns.
fn phase_cooldowns_and_state_tick(world: &mut World) {
    let ids: Vec<String> = world.living_ids();
    for id in &ids {
        let Some(unit) = world.unit_mut(id) else { continue };
        if unit.attack_cooldown > 0 {
            unit.attack_cooldown -= 1;
        }
        match unit.state.state {
            UnitState::Casting => unit.state.tick_cast(),
            UnitState::Stunned => unit.state.tick_stun(),
            _ => {}
        }
    }
}

fn check_end_condition(world: &mut World) {
    let team0_alive = world.units.iter().any(|u| u.is_alive() && u.team == 0);
    let team1_alive = world.units.iter().any(|u| u.is_alive() && u.team == 1);
    if !team0_alive || !team1_alive {
        world.terminal = true;
        world.winner = match (team0_alive, team1_alive) {
            (true, false) => Some(0),
            (false, true) => Some(1),
            _ => None,
        };
    }
}
