//! Runtime item handling: equip-time stat/trait aggregation and triggered
//! effect dispatch. `model::item` holds the static templates this reads.

use crate::effects::{apply, EffectContext};
use crate::model::item::{ConditionalDamageModifier, DamageCondition, TriggerType};
use crate::model::stats::Stat;
use crate::world::World;

const STAT_FIELDS: [Stat; 13] = [
    Stat::Hp,
    Stat::AttackDamage,
    Stat::AbilityPower,
    Stat::Armor,
    Stat::MagicResist,
    Stat::AttackSpeed,
    Stat::CritChance,
    Stat::CritDamage,
    Stat::DodgeChance,
    Stat::Lifesteal,
    Stat::SpellVamp,
    Stat::Omnivamp,
    Stat::Mana,
];

fn stat_block_value(block: &crate::model::stats::StatBlock, stat: Stat) -> f64 {
    match stat {
        Stat::Hp => block.hp,
        Stat::AttackDamage => block.attack_damage,
        Stat::AbilityPower => block.ability_power,
        Stat::Armor => block.armor,
        Stat::MagicResist => block.magic_resist,
        Stat::AttackSpeed => block.attack_speed,
        Stat::CritChance => block.crit_chance,
        Stat::CritDamage => block.crit_damage,
        Stat::DodgeChance => block.dodge_chance,
        Stat::Lifesteal => block.lifesteal,
        Stat::SpellVamp => block.spell_vamp,
        Stat::Omnivamp => block.omnivamp,
        Stat::Mana => block.mana,
    }
}

/// Applies every equipped item's flat/percent stats and granted traits onto
/// `unit_id`. Called once per unit during world setup.
pub fn equip_items(world: &mut World, unit_id: &str) {
    let Some(unit) = world.unit(unit_id) else { return };
    let item_ids = unit.item_ids.clone();
    let mut granted_traits = Vec::new();

    for item_id in &item_ids {
        let Some(item) = world.templates.items.get(item_id) else { continue };
        let flat = item.flat_stats.clone();
        let percent = item.percent_stats.clone();
        granted_traits.extend(item.granted_traits.iter().cloned());
        if let Some(unit) = world.unit_mut(unit_id) {
            for stat in STAT_FIELDS {
                unit.stats.add_flat(stat, stat_block_value(&flat, stat));
                unit.stats.add_percent(stat, stat_block_value(&percent, stat));
            }
        }
    }

    if let Some(unit) = world.unit_mut(unit_id) {
        for trait_id in granted_traits {
            if !unit.trait_ids.contains(&trait_id) {
                unit.trait_ids.push(trait_id);
            }
        }
    }
}

/// Fires every equipped item's `on_battle_start` triggered effects.
pub fn apply_battle_start(world: &mut World, unit_id: &str) {
    dispatch(world, unit_id, TriggerType::OnBattleStart, None);
}

pub fn dispatch(world: &mut World, unit_id: &str, trigger: TriggerType, interval_index: Option<usize>) {
    let Some(unit) = world.unit(unit_id) else { return };
    let item_ids = unit.item_ids.clone();
    for item_id in &item_ids {
        let Some(item) = world.templates.items.get(item_id) else { continue };
        let matching: Vec<_> = item
            .triggered_effects
            .iter()
            .enumerate()
            .filter(|(i, te)| te.trigger == trigger && interval_index.map(|want| *i == want).unwrap_or(true))
            .map(|(_, te)| te.effect.clone())
            .collect();
        for effect in matching {
            let ctx = EffectContext {
                caster_id: unit_id.to_string(),
                star_level: world.unit(unit_id).map(|u| u.star_level).unwrap_or(1),
                targets: vec![unit_id.to_string()],
                epicenter: None,
            };
            apply(&effect, &ctx, world);
        }
    }
}

/// Fires any equipped item's `on_interval` triggered effects whose period
/// divides the current tick. Called once per unit per tick.
pub fn dispatch_on_interval(world: &mut World, unit_id: &str, tick: u32) {
    if tick == 0 {
        return;
    }
    let Some(unit) = world.unit(unit_id) else { return };
    let item_ids = unit.item_ids.clone();
    let star_level = unit.star_level;
    for item_id in &item_ids {
        let Some(item) = world.templates.items.get(item_id) else { continue };
        let due: Vec<_> = item
            .triggered_effects
            .iter()
            .filter(|te| te.trigger == TriggerType::OnInterval)
            .filter_map(|te| te.interval_ticks.map(|n| (n, te.effect.clone())))
            .filter(|(n, _)| *n > 0 && tick % n == 0)
            .map(|(_, effect)| effect)
            .collect();
        for effect in due {
            let ctx = EffectContext {
                caster_id: unit_id.to_string(),
                star_level,
                targets: vec![unit_id.to_string()],
                epicenter: None,
            };
            apply(&effect, &ctx, world);
        }
    }
}

/// Aggregates every equipped item's conditional damage modifiers that
/// currently apply against `target_max_hp`/`target_missing_hp_percent`.
pub fn aggregate_conditional_modifiers(
    world: &World,
    unit_id: &str,
    target_max_hp: f64,
    target_missing_hp_percent: f64,
) -> crate::damage::DamageModifiers {
    let mut out = crate::damage::DamageModifiers::default();
    let Some(unit) = world.unit(unit_id) else { return out };
    for item_id in &unit.item_ids {
        let Some(item) = world.templates.items.get(item_id) else { continue };
        for modifier in &item.conditional_effects {
            if condition_met(modifier, target_max_hp, target_missing_hp_percent) {
                out.damage_amp += modifier.damage_amp;
                out.damage_reduction += modifier.damage_reduction;
                out.armor_pen += modifier.armor_pen;
                out.magic_pen += modifier.magic_pen;
            }
        }
    }
    out
}

fn condition_met(modifier: &ConditionalDamageModifier, target_max_hp: f64, target_missing_hp_percent: f64) -> bool {
    match modifier.condition {
        DamageCondition::TargetMaxHpAbove { threshold } => target_max_hp > threshold,
        DamageCondition::TargetMaxHpBelow { threshold } => target_max_hp < threshold,
        DamageCondition::TargetMissingHpAbovePercent { threshold } => target_missing_hp_percent > threshold,
    }
}
