//! The ability/item/trait effect vocabulary. A single tagged enum with a
//! shared `apply` entry point, rather than one struct per named behavior —
//! most of the ~44 behaviors distinguish only in their numeric knobs.

use crate::events::EventType;
use crate::hex::HexCoord;
use crate::model::stats::Stat;
use crate::model::status::{Burn, DamageType, Dot, StackTrigger, StackingBuff, TauntState, TimedModifier};
use crate::model::unit::{EmpoweredAttack, HealOverTime as HealOverTimeState, IntervalTrigger, TransformOnHit};
use crate::damage::{calculate_damage, mana_from_damage};
use crate::items::aggregate_conditional_modifiers;
use crate::targeting::{select, TargetSelector};
use crate::world::World;
use crate::zone::Zone;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Linear scaling from a caster's stats and/or a target's max HP, shared by
/// every effect that produces a number (damage, healing, shields, ...).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageScaling {
    #[serde(default)]
    pub base: f64,
    #[serde(default)]
    pub attack_damage_ratio: f64,
    #[serde(default)]
    pub ability_power_ratio: f64,
    #[serde(default)]
    pub target_max_hp_ratio: f64,
    #[serde(default)]
    pub target_missing_hp_ratio: f64,
}

impl DamageScaling {
    pub fn resolve(&self, caster: &crate::model::unit::Unit, target: &crate::model::unit::Unit) -> f64 {
        self.base
            + self.attack_damage_ratio * caster.stats.attack_damage()
            + self.ability_power_ratio * caster.stats.ability_power()
            + self.target_max_hp_ratio * target.stats.max_hp()
            + self.target_missing_hp_ratio * (target.stats.max_hp() - target.stats.current_hp)
    }
}

/// Per-hex damage reduction applied to secondary AoE targets, measured from
/// the ability's epicenter rather than from the caster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Falloff {
    pub start_range: i32,
    pub percent_per_hex: f64,
}

impl Falloff {
    fn multiplier(&self, distance: i32) -> f64 {
        let beyond = (distance - self.start_range).max(0);
        (1.0 - self.percent_per_hex * beyond as f64).max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Damage {
        scaling: DamageScaling,
        damage_type: DamageType,
        #[serde(default)]
        can_crit: bool,
        #[serde(default)]
        can_dodge: bool,
        #[serde(default)]
        falloff: Option<Falloff>,
        /// Kills the target outright if its HP percent is at or below this
        /// threshold, regardless of the computed damage amount.
        #[serde(default)]
        execute_threshold: Option<f64>,
    },
    Heal {
        scaling: DamageScaling,
        #[serde(default)]
        is_percent_max_hp: bool,
    },
    HealOverTime {
        amount_per_tick: f64,
        #[serde(default)]
        is_percent_max_hp: bool,
        duration_ticks: u32,
        interval_ticks: u32,
    },
    Shield {
        scaling: DamageScaling,
        duration_ticks: u32,
    },
    Burn {
        dps: f64,
        duration_ticks: u32,
    },
    Dot {
        damage_per_tick: f64,
        damage_type: DamageType,
        duration_ticks: u32,
        interval_ticks: u32,
    },
    Stun {
        duration_ticks: u32,
    },
    Silence {
        duration_ticks: u32,
    },
    Disarm {
        duration_ticks: u32,
    },
    Taunt {
        duration_ticks: u32,
    },
    Slow {
        percent: f64,
        duration_ticks: u32,
    },
    Wound {
        percent: f64,
        duration_ticks: u32,
    },
    ArmorShred {
        #[serde(default)]
        flat: f64,
        #[serde(default)]
        percent: f64,
        duration_ticks: u32,
    },
    MrShred {
        #[serde(default)]
        flat: f64,
        #[serde(default)]
        percent: f64,
        duration_ticks: u32,
    },
    StatBuffTimed {
        stat: Stat,
        #[serde(default)]
        flat: f64,
        #[serde(default)]
        percent: f64,
        duration_ticks: u32,
    },
    StatBuffPermanent {
        stat: Stat,
        #[serde(default)]
        flat: f64,
        #[serde(default)]
        percent: f64,
    },
    StackingStatBuff {
        stat: Stat,
        per_stack_value: f64,
        #[serde(default)]
        is_percent: bool,
        #[serde(default = "one")]
        stacks_gained: u32,
        #[serde(default)]
        max_stacks: Option<u32>,
        trigger: StackTrigger,
    },
    DecayingStatBuff {
        stat: Stat,
        initial: f64,
        #[serde(default)]
        is_percent: bool,
        duration_ticks: u32,
    },
    CleanseDebuffs,
    GrantMana {
        amount: f64,
    },
    ManaBurn {
        amount: f64,
    },
    Knockback {
        distance: i32,
        #[serde(default = "default_knockback_stun")]
        stun_duration: u32,
        #[serde(default)]
        condition: Option<String>,
    },
    ReplaceNextAttacks {
        uses: u32,
        damage: f64,
        #[serde(default)]
        infinite_range: bool,
        #[serde(default)]
        bonus_on_last_multiplier: Option<f64>,
    },
    Resurrect {
        hp_percent: f64,
    },
    SpawnZone {
        radius: i32,
        duration_ticks: u32,
        ticks_per_second: u32,
        #[serde(default)]
        track_damage: bool,
        on_tick_effects: Vec<Effect>,
        #[serde(default)]
        on_end_effects: Vec<Effect>,
    },
    Chance {
        chance: f64,
        effect: Box<Effect>,
    },
    Sequence(Vec<Effect>),

    /// Identical to `Slow`; kept as its own variant for naming parity with
    /// data authored against the "chill" name.
    Chill {
        percent: f64,
        duration_ticks: u32,
    },
    /// Damage proportional to the target's max (or current) HP, still
    /// passed through the normal mitigation pipeline.
    PercentHpDamage {
        percent: f64,
        #[serde(default)]
        use_current_hp: bool,
        damage_type: DamageType,
        #[serde(default)]
        can_crit: bool,
        #[serde(default)]
        can_dodge: bool,
    },
    /// Primary target takes full damage; every other resolved target takes
    /// `splash_percent` of the same base amount.
    Splash {
        scaling: DamageScaling,
        damage_type: DamageType,
        #[serde(default)]
        can_crit: bool,
        #[serde(default)]
        can_dodge: bool,
        splash_percent: f64,
    },
    /// Deals damage to the primary target; if it dies, the remaining
    /// (post-mitigation) damage bounces to the nearest other enemy, up to
    /// `max_bounces` hops.
    Ricochet {
        scaling: DamageScaling,
        damage_type: DamageType,
        #[serde(default)]
        can_crit: bool,
        #[serde(default)]
        can_dodge: bool,
        max_bounces: u32,
    },
    /// Strikes every resolved target `hits` separate times, each an
    /// independent crit/dodge roll.
    MultiHit {
        scaling: DamageScaling,
        damage_type: DamageType,
        #[serde(default)]
        can_crit: bool,
        #[serde(default)]
        can_dodge: bool,
        hits: u32,
    },
    /// Selects up to `count` enemies (nearest-first) and hits each with
    /// falling-off damage, approximating simultaneous projectiles.
    ProjectileSpread {
        scaling: DamageScaling,
        damage_type: DamageType,
        count: u32,
        #[serde(default)]
        falloff_percent: f64,
    },
    /// Hits the primary target, then re-targets the nearest surviving enemy
    /// repeatedly for `jumps` total hits.
    ProjectileSwarm {
        scaling: DamageScaling,
        damage_type: DamageType,
        jumps: u32,
    },
    /// Displaces the target toward the caster instead of away from it.
    Pull {
        distance: i32,
    },
    /// Moves the caster toward (or away from) a selected target.
    Dash {
        selector: TargetSelector,
        #[serde(default)]
        toward_enemies: bool,
        max_distance: i32,
        #[serde(default)]
        away: bool,
    },
    /// Moves the caster through the primary target's hex, damaging every
    /// unit on the line.
    DashThrough {
        scaling: DamageScaling,
        damage_type: DamageType,
        #[serde(default)]
        can_crit: bool,
        #[serde(default)]
        can_dodge: bool,
    },
    /// Applies a timed flat/percent stat buff to the caster's whole team,
    /// ignoring the resolved target list.
    BuffTeam {
        stat: Stat,
        #[serde(default)]
        flat: f64,
        #[serde(default)]
        percent: f64,
        duration_ticks: u32,
    },
    /// Shields the caster, ignoring the resolved target list.
    ShieldSelf {
        scaling: DamageScaling,
        duration_ticks: u32,
    },
    /// Increases the target's next cast's mana cost.
    ManaReave {
        amount: f64,
    },
    /// A one-shot permanent flat/percent stat addition, fired each time some
    /// external trigger calls it; `key` namespaces the running stack count
    /// kept for event-log parity.
    PermanentStack {
        key: String,
        stat: Stat,
        per_stack_value: f64,
        #[serde(default)]
        is_percent: bool,
    },
    /// Installs a passive on every resolved target that fires `effect`
    /// against its holder every `interval_ticks`, for the rest of the battle.
    IntervalTrigger {
        interval_ticks: u32,
        effect: Box<Effect>,
    },
    /// Accumulates a charge under `key` for every resolved target; once the
    /// count reaches `threshold`, it resets to zero and fires `on_threshold`.
    Accumulator {
        key: String,
        threshold: u32,
        on_threshold: Box<Effect>,
    },
    /// Permanently alters the caster's stats and installs a stacking
    /// on-hit damage bonus consumed by every subsequent auto-attack.
    Transform {
        stat_changes: Vec<StatDelta>,
        on_hit_scaling: DamageScaling,
        on_hit_damage_type: DamageType,
        stack_per_hit: f64,
    },
    /// Repeats `per_hit` against the resolved targets `hits` times, then
    /// applies `on_final_hit` once more on the last repetition.
    MultiStrike {
        hits: u32,
        #[serde(default)]
        per_hit: Vec<Effect>,
        #[serde(default)]
        on_final_hit: Vec<Effect>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatDelta {
    pub stat: Stat,
    #[serde(default)]
    pub flat: f64,
    #[serde(default)]
    pub percent: f64,
}

fn one() -> u32 {
    1
}

fn default_knockback_stun() -> u32 {
    15
}

/// Outcome of a single `Effect::apply` call, suitable for the event log and
/// for triggered-effect bookkeeping (e.g. "did this kill anything").
#[derive(Debug, Clone)]
pub struct EffectResult {
    pub effect_type: &'static str,
    pub success: bool,
    pub value: f64,
    pub target_ids: Vec<String>,
}

impl EffectResult {
    fn empty(effect_type: &'static str) -> Self {
        EffectResult { effect_type, success: false, value: 0.0, target_ids: vec![] }
    }

    /// Whether `value` represents damage dealt, for zones that track it.
    pub fn is_damage(&self) -> bool {
        matches!(
            self.effect_type,
            "damage"
                | "dot"
                | "burn"
                | "percent_hp_damage"
                | "splash"
                | "ricochet"
                | "multi_hit"
                | "projectile_spread"
                | "projectile_swarm"
                | "dash_through"
                | "multi_strike"
        )
    }
}

/// What an effect needs to resolve against: who cast it, at what star
/// level, which units it hits, and (for AoE) where it's centered.
pub struct EffectContext {
    pub caster_id: String,
    pub star_level: u8,
    pub targets: Vec<String>,
    pub epicenter: Option<HexCoord>,
}

pub fn apply(effect: &Effect, ctx: &EffectContext, world: &mut World) -> EffectResult {
    match effect {
        Effect::Damage { scaling, damage_type, can_crit, can_dodge, falloff, execute_threshold } => {
            apply_damage(scaling, *damage_type, *can_crit, *can_dodge, falloff.as_ref(), *execute_threshold, ctx, world)
        }
        Effect::Heal { scaling, is_percent_max_hp } => apply_heal(scaling, *is_percent_max_hp, ctx, world),
        Effect::HealOverTime { amount_per_tick, is_percent_max_hp, duration_ticks, interval_ticks } => {
            apply_heal_over_time(*amount_per_tick, *is_percent_max_hp, *duration_ticks, *interval_ticks, ctx, world)
        }
        Effect::Shield { scaling, duration_ticks } => apply_shield(scaling, *duration_ticks, ctx, world),
        Effect::Burn { dps, duration_ticks } => apply_burn(*dps, *duration_ticks, ctx, world),
        Effect::Dot { damage_per_tick, damage_type, duration_ticks, interval_ticks } => {
            apply_dot(*damage_per_tick, *damage_type, *duration_ticks, *interval_ticks, ctx, world)
        }
        Effect::Stun { duration_ticks } => apply_cc(ctx, world, "stun", |u| u.state.apply_stun(*duration_ticks)),
        Effect::Silence { duration_ticks } => {
            apply_cc(ctx, world, "silence", |u| u.status.silence_ticks = u.status.silence_ticks.max(*duration_ticks))
        }
        Effect::Disarm { duration_ticks } => {
            apply_cc(ctx, world, "disarm", |u| u.status.disarm_ticks = u.status.disarm_ticks.max(*duration_ticks))
        }
        Effect::Taunt { duration_ticks } => apply_taunt(*duration_ticks, ctx, world),
        Effect::Slow { percent, duration_ticks } => {
            apply_timed_modifier(ctx, world, "slow", *percent, *duration_ticks, |u| &mut u.status.slow)
        }
        Effect::Wound { percent, duration_ticks } => {
            apply_timed_modifier(ctx, world, "wound", *percent, *duration_ticks, |u| &mut u.status.wound)
        }
        Effect::ArmorShred { flat, percent, duration_ticks } => {
            apply_shred(ctx, world, "armor_shred", *flat, *percent, *duration_ticks, |u| &mut u.status.armor_shred)
        }
        Effect::MrShred { flat, percent, duration_ticks } => {
            apply_shred(ctx, world, "mr_shred", *flat, *percent, *duration_ticks, |u| &mut u.status.mr_shred)
        }
        Effect::StatBuffTimed { .. } => apply_stat_buff_timed(effect, ctx, world),
        Effect::StatBuffPermanent { .. } => apply_stat_buff_permanent(effect, ctx, world),
        Effect::StackingStatBuff { .. } => apply_stacking_stat_buff(effect, ctx, world),
        Effect::DecayingStatBuff { .. } => apply_decaying_stat_buff(effect, ctx, world),
        Effect::CleanseDebuffs => apply_cleanse(ctx, world),
        Effect::GrantMana { amount } => apply_grant_mana(*amount, ctx, world),
        Effect::ManaBurn { amount } => apply_mana_burn(*amount, ctx, world),
        Effect::Knockback { distance, stun_duration, condition } => {
            apply_knockback(*distance, *stun_duration, condition.as_deref(), ctx, world)
        }
        Effect::ReplaceNextAttacks { uses, damage, infinite_range, bonus_on_last_multiplier } => {
            apply_replace_attacks(*uses, *damage, *infinite_range, *bonus_on_last_multiplier, ctx, world)
        }
        Effect::Resurrect { hp_percent } => apply_resurrect(*hp_percent, ctx, world),
        Effect::SpawnZone { radius, duration_ticks, ticks_per_second, track_damage, on_tick_effects, on_end_effects } => {
            apply_spawn_zone(*radius, *duration_ticks, *ticks_per_second, *track_damage, on_tick_effects, on_end_effects, ctx, world)
        }
        Effect::Chance { chance, effect } => {
            if world.rng.roll_chance(*chance) {
                apply(effect, ctx, world)
            } else {
                EffectResult::empty("chance")
            }
        }
        Effect::Sequence(effects) => {
            let mut total = 0.0;
            let mut hit = Vec::new();
            let mut any_success = false;
            for inner in effects {
                let r = apply(inner, ctx, world);
                total += r.value;
                any_success |= r.success;
                hit.extend(r.target_ids);
            }
            EffectResult { effect_type: "sequence", success: any_success, value: total, target_ids: hit }
        }
        Effect::Chill { percent, duration_ticks } => {
            apply_timed_modifier(ctx, world, "chill", *percent, *duration_ticks, |u| &mut u.status.slow)
        }
        Effect::PercentHpDamage { percent, use_current_hp, damage_type, can_crit, can_dodge } => {
            apply_percent_hp_damage(*percent, *use_current_hp, *damage_type, *can_crit, *can_dodge, ctx, world)
        }
        Effect::Splash { scaling, damage_type, can_crit, can_dodge, splash_percent } => {
            apply_splash(scaling, *damage_type, *can_crit, *can_dodge, *splash_percent, ctx, world)
        }
        Effect::Ricochet { scaling, damage_type, can_crit, can_dodge, max_bounces } => {
            apply_ricochet(scaling, *damage_type, *can_crit, *can_dodge, *max_bounces, ctx, world)
        }
        Effect::MultiHit { scaling, damage_type, can_crit, can_dodge, hits } => {
            apply_multi_hit(scaling, *damage_type, *can_crit, *can_dodge, *hits, ctx, world)
        }
        Effect::ProjectileSpread { scaling, damage_type, count, falloff_percent } => {
            apply_projectile_spread(scaling, *damage_type, *count, *falloff_percent, ctx, world)
        }
        Effect::ProjectileSwarm { scaling, damage_type, jumps } => {
            apply_projectile_swarm(scaling, *damage_type, *jumps, ctx, world)
        }
        Effect::Pull { distance } => apply_pull(*distance, ctx, world),
        Effect::Dash { selector, toward_enemies, max_distance, away } => {
            apply_dash(selector, *toward_enemies, *max_distance, *away, ctx, world)
        }
        Effect::DashThrough { scaling, damage_type, can_crit, can_dodge } => {
            apply_dash_through(scaling, *damage_type, *can_crit, *can_dodge, ctx, world)
        }
        Effect::BuffTeam { stat, flat, percent, duration_ticks } => {
            apply_buff_team(*stat, *flat, *percent, *duration_ticks, ctx, world)
        }
        Effect::ShieldSelf { scaling, duration_ticks } => apply_shield_self(scaling, *duration_ticks, ctx, world),
        Effect::ManaReave { amount } => apply_mana_reave(*amount, ctx, world),
        Effect::PermanentStack { key, stat, per_stack_value, is_percent } => {
            apply_permanent_stack(key, *stat, *per_stack_value, *is_percent, ctx, world)
        }
        Effect::IntervalTrigger { interval_ticks, effect } => apply_interval_trigger(*interval_ticks, effect, ctx, world),
        Effect::Accumulator { key, threshold, on_threshold } => apply_accumulator(key, *threshold, on_threshold, ctx, world),
        Effect::Transform { stat_changes, on_hit_scaling, on_hit_damage_type, stack_per_hit } => {
            apply_transform(stat_changes, on_hit_scaling, *on_hit_damage_type, *stack_per_hit, ctx, world)
        }
        Effect::MultiStrike { hits, per_hit, on_final_hit } => apply_multi_strike(*hits, per_hit, on_final_hit, ctx, world),
    }
}

fn apply_damage(
    scaling: &DamageScaling,
    damage_type: DamageType,
    can_crit: bool,
    can_dodge: bool,
    falloff: Option<&Falloff>,
    execute_threshold: Option<f64>,
    ctx: &EffectContext,
    world: &mut World,
) -> EffectResult {
    let Some(caster) = world.unit(&ctx.caster_id).cloned() else { return EffectResult::empty("damage") };
    let mut total = 0.0;
    let mut hit_ids = Vec::new();

    for target_id in &ctx.targets {
        let Some(target) = world.unit(target_id).cloned() else { continue };
        if !target.is_alive() {
            continue;
        }

        if let Some(threshold) = execute_threshold {
            if target.stats.hp_percent() <= threshold {
                world.deal_damage(target_id, &ctx.caster_id, target.stats.current_hp, damage_type);
                hit_ids.push(target_id.clone());
                continue;
            }
        }

        let mut base = scaling.resolve(&caster, &target);
        if let Some(fo) = falloff {
            if let Some(epicenter) = ctx.epicenter {
                base *= fo.multiplier(epicenter.distance(target.position));
            }
        }

        let modifiers = aggregate_conditional_modifiers(world, &ctx.caster_id, target.stats.max_hp(), 1.0 - target.stats.hp_percent());
        let result = calculate_damage(
            &caster,
            &target,
            base,
            damage_type,
            &mut world.rng,
            can_crit,
            can_dodge,
            true,
            modifiers,
        );
        world.deal_damage(target_id, &ctx.caster_id, result.final_damage, damage_type);
        if result.lifesteal_amount > 0.0 {
            world.heal(&ctx.caster_id, result.lifesteal_amount);
        }
        let mana_gain = mana_from_damage(&result, world.config_mana_pre(), world.config_mana_post(), world.config_mana_cap());
        world.gain_mana(target_id, mana_gain);

        total += result.final_damage;
        hit_ids.push(target_id.clone());
    }

    EffectResult { effect_type: "damage", success: !hit_ids.is_empty(), value: total, target_ids: hit_ids }
}

fn apply_heal(scaling: &DamageScaling, is_percent_max_hp: bool, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let Some(caster) = world.unit(&ctx.caster_id).cloned() else { return EffectResult::empty("heal") };
    let mut total = 0.0;
    let mut hit_ids = Vec::new();
    for target_id in &ctx.targets {
        let Some(target) = world.unit(target_id).cloned() else { continue };
        if !target.is_alive() {
            continue;
        }
        let mut amount = scaling.resolve(&caster, &target);
        if is_percent_max_hp {
            amount *= target.stats.max_hp();
        }
        amount *= 1.0 - target.status.wound_percent();
        let healed = world.heal(target_id, amount);
        total += healed;
        hit_ids.push(target_id.clone());
    }
    EffectResult { effect_type: "heal", success: !hit_ids.is_empty(), value: total, target_ids: hit_ids }
}

fn apply_heal_over_time(
    amount_per_tick: f64,
    is_percent_max_hp: bool,
    duration_ticks: u32,
    interval_ticks: u32,
    ctx: &EffectContext,
    world: &mut World,
) -> EffectResult {
    let mut hit_ids = Vec::new();
    for target_id in &ctx.targets {
        let next_tick = world.tick + interval_ticks;
        let Some(target) = world.unit_mut(target_id) else { continue };
        if !target.is_alive() {
            continue;
        }
        target.scratch.heal_over_time.push(HealOverTimeState {
            amount_per_tick,
            is_percent_max_hp,
            remaining_ticks: duration_ticks,
            interval: interval_ticks,
            next_tick,
            source_id: ctx.caster_id.clone(),
        });
        hit_ids.push(target_id.clone());
    }
    EffectResult { effect_type: "heal_over_time", success: !hit_ids.is_empty(), value: 0.0, target_ids: hit_ids }
}

fn apply_shield(scaling: &DamageScaling, duration_ticks: u32, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let Some(caster) = world.unit(&ctx.caster_id).cloned() else { return EffectResult::empty("shield") };
    let mut total = 0.0;
    let mut hit_ids = Vec::new();
    for target_id in &ctx.targets {
        let Some(target) = world.unit(target_id).cloned() else { continue };
        if !target.is_alive() {
            continue;
        }
        let amount = scaling.resolve(&caster, &target);
        world.apply_shield(target_id, amount, duration_ticks);
        world.log.push(world.tick, EventType::BuffApply, Some(ctx.caster_id.clone()), Some(target_id.clone()), Some(json!({"kind": "shield", "amount": amount})));
        total += amount;
        hit_ids.push(target_id.clone());
    }
    EffectResult { effect_type: "shield", success: !hit_ids.is_empty(), value: total, target_ids: hit_ids }
}

fn apply_burn(dps: f64, duration_ticks: u32, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let mut hit_ids = Vec::new();
    for target_id in &ctx.targets {
        let Some(target) = world.unit_mut(target_id) else { continue };
        if !target.is_alive() {
            continue;
        }
        target.status.burns.push(Burn { dps, remaining_ticks: duration_ticks, source_id: ctx.caster_id.clone() });
        hit_ids.push(target_id.clone());
    }
    EffectResult { effect_type: "burn", success: !hit_ids.is_empty(), value: 0.0, target_ids: hit_ids }
}

fn apply_dot(
    damage_per_tick: f64,
    damage_type: DamageType,
    duration_ticks: u32,
    interval_ticks: u32,
    ctx: &EffectContext,
    world: &mut World,
) -> EffectResult {
    let mut hit_ids = Vec::new();
    for target_id in &ctx.targets {
        let next_tick = world.tick + interval_ticks;
        let Some(target) = world.unit_mut(target_id) else { continue };
        if !target.is_alive() {
            continue;
        }
        target.status.dots.push(Dot {
            damage_per_tick,
            damage_type,
            remaining_ticks: duration_ticks,
            interval: interval_ticks,
            next_tick,
            source_id: ctx.caster_id.clone(),
        });
        hit_ids.push(target_id.clone());
    }
    EffectResult { effect_type: "dot", success: !hit_ids.is_empty(), value: 0.0, target_ids: hit_ids }
}

fn apply_cc(ctx: &EffectContext, world: &mut World, name: &'static str, mut f: impl FnMut(&mut crate::model::unit::Unit)) -> EffectResult {
    let mut hit_ids = Vec::new();
    for target_id in &ctx.targets {
        let Some(target) = world.unit_mut(target_id) else { continue };
        if !target.is_alive() {
            continue;
        }
        f(target);
        hit_ids.push(target_id.clone());
    }
    EffectResult { effect_type: name, success: !hit_ids.is_empty(), value: 0.0, target_ids: hit_ids }
}

fn apply_taunt(duration_ticks: u32, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let forced_target = ctx.caster_id.clone();
    apply_cc(ctx, world, "taunt", move |u| {
        u.status.taunt = Some(TauntState { remaining_ticks: duration_ticks, forced_target: forced_target.clone() });
    })
}

fn apply_timed_modifier(
    ctx: &EffectContext,
    world: &mut World,
    name: &'static str,
    percent: f64,
    duration_ticks: u32,
    slot: fn(&mut crate::model::unit::Unit) -> &mut Option<TimedModifier>,
) -> EffectResult {
    apply_cc(ctx, world, name, move |u| {
        let field = slot(u);
        match field {
            Some(existing) => existing.refresh(0.0, percent, duration_ticks),
            None => *field = Some(TimedModifier { flat: 0.0, percent, remaining_ticks: duration_ticks }),
        }
    })
}

fn apply_shred(
    ctx: &EffectContext,
    world: &mut World,
    name: &'static str,
    flat: f64,
    percent: f64,
    duration_ticks: u32,
    slot: fn(&mut crate::model::unit::Unit) -> &mut Option<TimedModifier>,
) -> EffectResult {
    apply_cc(ctx, world, name, move |u| {
        let field = slot(u);
        match field {
            Some(existing) => existing.refresh(flat, percent, duration_ticks),
            None => *field = Some(TimedModifier { flat, percent, remaining_ticks: duration_ticks }),
        }
    })
}

fn apply_stat_buff_timed(effect: &Effect, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let Effect::StatBuffTimed { stat, flat, percent, duration_ticks } = effect.clone() else { unreachable!() };
    apply_cc(ctx, world, "stat_buff_timed", move |u| {
        u.add_timed_stat_buff(stat, flat, percent, duration_ticks);
    })
}

fn apply_stat_buff_permanent(effect: &Effect, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let Effect::StatBuffPermanent { stat, flat, percent } = effect.clone() else { unreachable!() };
    apply_cc(ctx, world, "stat_buff_permanent", move |u| {
        u.stats.add_flat(stat, flat);
        u.stats.add_percent(stat, percent);
    })
}

/// Installs (or re-configures) a stacking buff for `trigger`. The install
/// itself never adds a stack — stacks accrue only when `trigger` actually
/// fires, via `Unit::fire_stack_trigger`, called from the kernel at cast,
/// attack, and damage-dealt/taken time.
fn apply_stacking_stat_buff(effect: &Effect, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let Effect::StackingStatBuff { stat, per_stack_value, is_percent, stacks_gained, max_stacks, trigger } = effect.clone() else { unreachable!() };
    apply_cc(ctx, world, "stacking_stat_buff", move |u| {
        let entry = u.status.stacking_buffs.entry((stat, trigger)).or_insert_with(|| StackingBuff {
            stat,
            per_stack_value,
            stacks: 0,
            max_stacks,
            permanent: true,
            is_percent,
            stacks_per_event: stacks_gained,
        });
        entry.per_stack_value = per_stack_value;
        entry.max_stacks = max_stacks;
        entry.stacks_per_event = stacks_gained;
    })
}

fn apply_decaying_stat_buff(effect: &Effect, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let Effect::DecayingStatBuff { stat, initial, is_percent, duration_ticks } = effect.clone() else { unreachable!() };
    apply_cc(ctx, world, "decaying_stat_buff", move |u| {
        u.status.decaying_buffs.push(crate::model::status::DecayingBuff {
            stat,
            initial,
            current: initial,
            remaining_ticks: duration_ticks,
            total_duration: duration_ticks,
            is_percent,
        });
    })
}

fn apply_cleanse(ctx: &EffectContext, world: &mut World) -> EffectResult {
    apply_cc(ctx, world, "cleanse", |u| u.status.clear_all_debuffs())
}

fn apply_grant_mana(amount: f64, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let mut hit_ids = Vec::new();
    for target_id in &ctx.targets {
        world.gain_mana(target_id, amount);
        hit_ids.push(target_id.clone());
    }
    EffectResult { effect_type: "grant_mana", success: !hit_ids.is_empty(), value: amount, target_ids: hit_ids }
}

fn apply_mana_burn(amount: f64, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let mut total = 0.0;
    let mut hit_ids = Vec::new();
    for target_id in &ctx.targets {
        let Some(target) = world.unit_mut(target_id) else { continue };
        if !target.is_alive() {
            continue;
        }
        let removed = amount.min(target.stats.current_mana);
        target.stats.current_mana -= removed;
        total += removed;
        hit_ids.push(target_id.clone());
    }
    EffectResult { effect_type: "mana_burn", success: !hit_ids.is_empty(), value: total, target_ids: hit_ids }
}

fn apply_knockback(
    distance: i32,
    stun_duration: u32,
    condition: Option<&str>,
    ctx: &EffectContext,
    world: &mut World,
) -> EffectResult {
    let Some(caster_pos) = world.unit(&ctx.caster_id).map(|u| u.position) else { return EffectResult::empty("knockback") };
    let mut hit_ids = Vec::new();
    for target_id in &ctx.targets {
        let Some(target_pos) = world.unit(target_id).map(|u| u.position) else { continue };
        if let Some(cond) = condition {
            if !knockback_condition_met(cond, caster_pos, target_pos) {
                continue;
            }
        }
        let away = target_pos - caster_pos;
        let mut dest = target_pos;
        for _ in 0..distance {
            let candidate = dest + away_unit_step(away);
            if world.grid.is_walkable(candidate) {
                dest = candidate;
            } else {
                break;
            }
        }
        // Suppressed displacement still lets the mini-stun land, per the
        // specification's "out-of-bounds displacement" error handling.
        if dest != target_pos {
            world.move_unit(target_id, dest);
        }
        if stun_duration > 0 {
            if let Some(target) = world.unit_mut(target_id) {
                target.state.apply_stun(stun_duration);
            }
        }
        hit_ids.push(target_id.clone());
    }
    EffectResult { effect_type: "knockback", success: !hit_ids.is_empty(), value: 0.0, target_ids: hit_ids }
}

/// Parses conditions of the form `range_below_N` / `range_above_N`, gating
/// whether the knockback (and its mini-stun) fires at all.
fn knockback_condition_met(condition: &str, caster_pos: HexCoord, target_pos: HexCoord) -> bool {
    let parts: Vec<&str> = condition.split('_').collect();
    if parts.len() >= 3 && parts[0] == "range" {
        if let Ok(threshold) = parts[2].parse::<i32>() {
            let actual = caster_pos.distance(target_pos);
            return match parts[1] {
                "below" => actual < threshold,
                "above" => actual > threshold,
                _ => true,
            };
        }
    }
    true
}

/// Picks the neighbor direction step whose unit vector best matches `away`.
fn away_unit_step(away: HexCoord) -> HexCoord {
    let origin = HexCoord::new(0, 0);
    origin
        .neighbors()
        .into_iter()
        .min_by(|a, b| {
            let da = (a.q - away.q).pow(2) + (a.r - away.r).pow(2);
            let db = (b.q - away.q).pow(2) + (b.r - away.r).pow(2);
            da.cmp(&db)
        })
        .unwrap_or(origin)
}

fn apply_replace_attacks(
    uses: u32,
    damage: f64,
    infinite_range: bool,
    bonus_on_last_multiplier: Option<f64>,
    ctx: &EffectContext,
    world: &mut World,
) -> EffectResult {
    apply_cc(ctx, world, "replace_next_attacks", move |u| {
        u.scratch.empowered_attack = Some(EmpoweredAttack {
            damage,
            remaining_uses: uses,
            infinite_range,
            bonus_on_last_multiplier,
        });
    })
}

fn apply_resurrect(hp_percent: f64, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let mut hit_ids = Vec::new();
    for target_id in &ctx.targets {
        let Some(target) = world.unit_mut(target_id) else { continue };
        if target.is_alive() {
            continue;
        }
        let max_hp = target.stats.max_hp();
        target.stats.current_hp = max_hp * hp_percent;
        target.state.state = crate::state_machine::UnitState::Idle;
        target.state.previous_state = crate::state_machine::UnitState::Idle;
        target.state.stun_remaining = 0;
        target.state.cast = None;
        let pos = target.position;
        if world.grid.place(target_id, pos).is_ok() {
            hit_ids.push(target_id.clone());
        }
    }
    EffectResult { effect_type: "resurrect", success: !hit_ids.is_empty(), value: 0.0, target_ids: hit_ids }
}

/// Deals one instance of damage from `caster` to `target_id`, applying
/// lifesteal and mana-on-hit the same way every other damage effect does.
#[allow(clippy::too_many_arguments)]
fn strike(
    world: &mut World,
    caster: &crate::model::unit::Unit,
    target_id: &str,
    base_damage: f64,
    damage_type: DamageType,
    can_crit: bool,
    can_dodge: bool,
) -> Option<crate::damage::DamageResult> {
    let target = world.unit(target_id)?.clone();
    if !target.is_alive() {
        return None;
    }
    let modifiers = aggregate_conditional_modifiers(world, &caster.id, target.stats.max_hp(), 1.0 - target.stats.hp_percent());
    let result = calculate_damage(caster, &target, base_damage, damage_type, &mut world.rng, can_crit, can_dodge, true, modifiers);
    world.deal_damage(target_id, &caster.id, result.final_damage, damage_type);
    if result.lifesteal_amount > 0.0 {
        world.heal(&caster.id, result.lifesteal_amount);
    }
    let mana_gain = mana_from_damage(&result, world.config_mana_pre(), world.config_mana_post(), world.config_mana_cap());
    world.gain_mana(target_id, mana_gain);
    Some(result)
}

fn apply_percent_hp_damage(
    percent: f64,
    use_current_hp: bool,
    damage_type: DamageType,
    can_crit: bool,
    can_dodge: bool,
    ctx: &EffectContext,
    world: &mut World,
) -> EffectResult {
    let Some(caster) = world.unit(&ctx.caster_id).cloned() else { return EffectResult::empty("percent_hp_damage") };
    let mut total = 0.0;
    let mut hit_ids = Vec::new();
    for target_id in &ctx.targets {
        let Some(target) = world.unit(target_id) else { continue };
        if !target.is_alive() {
            continue;
        }
        let base = percent * if use_current_hp { target.stats.current_hp } else { target.stats.max_hp() };
        if let Some(result) = strike(world, &caster, target_id, base, damage_type, can_crit, can_dodge) {
            total += result.final_damage;
            hit_ids.push(target_id.clone());
        }
    }
    EffectResult { effect_type: "percent_hp_damage", success: !hit_ids.is_empty(), value: total, target_ids: hit_ids }
}

fn apply_splash(
    scaling: &DamageScaling,
    damage_type: DamageType,
    can_crit: bool,
    can_dodge: bool,
    splash_percent: f64,
    ctx: &EffectContext,
    world: &mut World,
) -> EffectResult {
    let Some(caster) = world.unit(&ctx.caster_id).cloned() else { return EffectResult::empty("splash") };
    let mut total = 0.0;
    let mut hit_ids = Vec::new();
    for (i, target_id) in ctx.targets.iter().enumerate() {
        let Some(target) = world.unit(target_id).cloned() else { continue };
        if !target.is_alive() {
            continue;
        }
        let mut base = scaling.resolve(&caster, &target);
        if i > 0 {
            base *= splash_percent;
        }
        if let Some(result) = strike(world, &caster, target_id, base, damage_type, can_crit, can_dodge) {
            total += result.final_damage;
            hit_ids.push(target_id.clone());
        }
    }
    EffectResult { effect_type: "splash", success: !hit_ids.is_empty(), value: total, target_ids: hit_ids }
}

fn apply_ricochet(
    scaling: &DamageScaling,
    damage_type: DamageType,
    can_crit: bool,
    can_dodge: bool,
    max_bounces: u32,
    ctx: &EffectContext,
    world: &mut World,
) -> EffectResult {
    let Some(caster) = world.unit(&ctx.caster_id).cloned() else { return EffectResult::empty("ricochet") };
    let Some(mut current_id) = ctx.targets.first().cloned() else { return EffectResult::empty("ricochet") };
    let mut hit_ids = Vec::new();
    let mut total = 0.0;
    // The next hop's base damage: freshly scaled for the first hit, then the
    // previous hit's overkill for every bounce after.
    let mut carry_damage: Option<f64> = None;
    let mut hops_left = max_bounces + 1;

    loop {
        if hops_left == 0 {
            break;
        }
        hops_left -= 1;
        let Some(target) = world.unit(&current_id).cloned() else { break };
        if !target.is_alive() {
            break;
        }
        let hp_before = target.stats.current_hp;
        let base = carry_damage.unwrap_or_else(|| scaling.resolve(&caster, &target));
        let Some(result) = strike(world, &caster, &current_id, base, damage_type, can_crit, can_dodge) else { break };
        total += result.final_damage;
        hit_ids.push(current_id.clone());

        let overkill = result.final_damage - hp_before;
        if world.is_alive(&current_id) || overkill <= 0.0 {
            break;
        }
        let from_pos = target.position;
        let team = caster.team;
        let next = world
            .living_enemies_of(team)
            .into_iter()
            .filter(|u| !hit_ids.contains(&u.id))
            .map(|u| (u.id.clone(), from_pos.distance(u.position)))
            .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        match next {
            Some((id, _)) => {
                current_id = id;
                carry_damage = Some(overkill);
            }
            None => break,
        }
    }
    EffectResult { effect_type: "ricochet", success: !hit_ids.is_empty(), value: total, target_ids: hit_ids }
}

fn apply_multi_hit(
    scaling: &DamageScaling,
    damage_type: DamageType,
    can_crit: bool,
    can_dodge: bool,
    hits: u32,
    ctx: &EffectContext,
    world: &mut World,
) -> EffectResult {
    let Some(caster) = world.unit(&ctx.caster_id).cloned() else { return EffectResult::empty("multi_hit") };
    let mut total = 0.0;
    let mut hit_ids = Vec::new();
    for target_id in &ctx.targets {
        for _ in 0..hits {
            let Some(target) = world.unit(target_id).cloned() else { break };
            if !target.is_alive() {
                break;
            }
            let base = scaling.resolve(&caster, &target);
            if let Some(result) = strike(world, &caster, target_id, base, damage_type, can_crit, can_dodge) {
                total += result.final_damage;
                hit_ids.push(target_id.clone());
            }
        }
    }
    EffectResult { effect_type: "multi_hit", success: !hit_ids.is_empty(), value: total, target_ids: hit_ids }
}

fn apply_projectile_spread(
    scaling: &DamageScaling,
    damage_type: DamageType,
    count: u32,
    falloff_percent: f64,
    ctx: &EffectContext,
    world: &mut World,
) -> EffectResult {
    let Some(caster) = world.unit(&ctx.caster_id).cloned() else { return EffectResult::empty("projectile_spread") };
    let mut pool: Vec<(String, i32)> = world
        .living_enemies_of(caster.team)
        .into_iter()
        .map(|u| (u.id.clone(), caster.position.distance(u.position)))
        .collect();
    pool.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    pool.truncate(count as usize);

    let mut total = 0.0;
    let mut hit_ids = Vec::new();
    for (i, (target_id, _)) in pool.into_iter().enumerate() {
        let Some(target) = world.unit(&target_id).cloned() else { continue };
        let falloff = (1.0 - falloff_percent * i as f64).max(0.0);
        let base = scaling.resolve(&caster, &target) * falloff;
        if let Some(result) = strike(world, &caster, &target_id, base, damage_type, true, true) {
            total += result.final_damage;
            hit_ids.push(target_id);
        }
    }
    EffectResult { effect_type: "projectile_spread", success: !hit_ids.is_empty(), value: total, target_ids: hit_ids }
}

fn apply_projectile_swarm(scaling: &DamageScaling, damage_type: DamageType, jumps: u32, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let Some(caster) = world.unit(&ctx.caster_id).cloned() else { return EffectResult::empty("projectile_swarm") };
    let mut hit_ids: Vec<String> = Vec::new();
    let mut total = 0.0;
    let Some(mut current_id) = ctx.targets.first().cloned() else { return EffectResult::empty("projectile_swarm") };

    for _ in 0..jumps {
        let Some(target) = world.unit(&current_id).cloned() else { break };
        if !target.is_alive() {
            break;
        }
        let base = scaling.resolve(&caster, &target);
        if let Some(result) = strike(world, &caster, &current_id, base, damage_type, true, true) {
            total += result.final_damage;
            hit_ids.push(current_id.clone());
        }
        let from_pos = target.position;
        let team = caster.team;
        let next = world
            .living_enemies_of(team)
            .into_iter()
            .filter(|u| u.id != current_id)
            .map(|u| (u.id.clone(), from_pos.distance(u.position)))
            .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        match next {
            Some((id, _)) => current_id = id,
            None => break,
        }
    }
    EffectResult { effect_type: "projectile_swarm", success: !hit_ids.is_empty(), value: total, target_ids: hit_ids }
}

fn apply_pull(distance: i32, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let Some(caster_pos) = world.unit(&ctx.caster_id).map(|u| u.position) else { return EffectResult::empty("pull") };
    let mut hit_ids = Vec::new();
    for target_id in &ctx.targets {
        let Some(target_pos) = world.unit(target_id).map(|u| u.position) else { continue };
        let toward = caster_pos - target_pos;
        let mut dest = target_pos;
        for _ in 0..distance {
            let candidate = dest + away_unit_step(toward);
            if world.grid.is_walkable(candidate) {
                dest = candidate;
            } else {
                break;
            }
        }
        if dest != target_pos && world.move_unit(target_id, dest) {
            hit_ids.push(target_id.clone());
        }
    }
    EffectResult { effect_type: "pull", success: !hit_ids.is_empty(), value: 0.0, target_ids: hit_ids }
}

fn apply_dash(
    selector: &TargetSelector,
    toward_enemies: bool,
    max_distance: i32,
    away: bool,
    ctx: &EffectContext,
    world: &mut World,
) -> EffectResult {
    let Some(caster) = world.unit(&ctx.caster_id).cloned() else { return EffectResult::empty("dash") };
    let mut rng = world.rng_snapshot();
    let target_pos = {
        let pool: Vec<&crate::model::unit::Unit> = if toward_enemies {
            world.living_enemies_of(caster.team)
        } else {
            world.living_allies_of(caster.team)
        };
        select(selector, &caster, &pool, &mut rng).map(|t| t.position)
    };
    world.commit_rng(rng);
    let Some(target_pos) = target_pos else { return EffectResult::empty("dash") };

    let direction = if away { caster.position - target_pos } else { target_pos - caster.position };
    let step = away_unit_step(direction);
    let mut dest = caster.position;
    for _ in 0..max_distance {
        let candidate = dest + step;
        if !world.grid.is_walkable(candidate) {
            break;
        }
        dest = candidate;
    }
    if dest != caster.position && world.move_unit(&ctx.caster_id, dest) {
        EffectResult { effect_type: "dash", success: true, value: 0.0, target_ids: vec![ctx.caster_id.clone()] }
    } else {
        EffectResult::empty("dash")
    }
}

fn apply_dash_through(scaling: &DamageScaling, damage_type: DamageType, can_crit: bool, can_dodge: bool, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let Some(caster) = world.unit(&ctx.caster_id).cloned() else { return EffectResult::empty("dash_through") };
    let Some(primary_id) = ctx.targets.first().cloned() else { return EffectResult::empty("dash_through") };
    let Some(primary_pos) = world.unit(&primary_id).map(|u| u.position) else { return EffectResult::empty("dash_through") };

    let path = caster.position.line_to(primary_pos);
    let mut total = 0.0;
    let mut hit_ids = Vec::new();
    let on_path: Vec<String> = world
        .units
        .iter()
        .filter(|u| u.is_alive() && u.id != caster.id && path.contains(&u.position))
        .map(|u| u.id.clone())
        .collect();
    for target_id in on_path {
        let Some(target) = world.unit(&target_id).cloned() else { continue };
        let base = scaling.resolve(&caster, &target);
        if let Some(result) = strike(world, &caster, &target_id, base, damage_type, can_crit, can_dodge) {
            total += result.final_damage;
            hit_ids.push(target_id);
        }
    }

    let direction = primary_pos - caster.position;
    let step = away_unit_step(direction);
    let beyond = primary_pos + step;
    if world.grid.is_walkable(beyond) {
        world.move_unit(&ctx.caster_id, beyond);
    }

    EffectResult { effect_type: "dash_through", success: !hit_ids.is_empty(), value: total, target_ids: hit_ids }
}

fn apply_buff_team(stat: Stat, flat: f64, percent: f64, duration_ticks: u32, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let Some(team) = world.unit(&ctx.caster_id).map(|u| u.team) else { return EffectResult::empty("buff_team") };
    let ids: Vec<String> = world.living_team(team).into_iter().map(|u| u.id.clone()).collect();
    for id in &ids {
        if let Some(unit) = world.unit_mut(id) {
            unit.add_timed_stat_buff(stat, flat, percent, duration_ticks);
        }
    }
    EffectResult { effect_type: "buff_team", success: !ids.is_empty(), value: 0.0, target_ids: ids }
}

fn apply_shield_self(scaling: &DamageScaling, duration_ticks: u32, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let Some(caster) = world.unit(&ctx.caster_id).cloned() else { return EffectResult::empty("shield_self") };
    let amount = scaling.resolve(&caster, &caster);
    world.apply_shield(&ctx.caster_id, amount, duration_ticks);
    EffectResult { effect_type: "shield_self", success: true, value: amount, target_ids: vec![ctx.caster_id.clone()] }
}

fn apply_mana_reave(amount: f64, ctx: &EffectContext, world: &mut World) -> EffectResult {
    apply_cc(ctx, world, "mana_reave", move |u| {
        u.scratch.mana_reave_surcharge += amount;
    })
}

fn apply_permanent_stack(key: &str, stat: Stat, per_stack_value: f64, is_percent: bool, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let key = key.to_string();
    apply_cc(ctx, world, "permanent_stack", move |u| {
        *u.scratch.permanent_stacks.entry(key.clone()).or_insert(0) += 1;
        if is_percent {
            u.stats.add_percent(stat, per_stack_value);
        } else {
            u.stats.add_flat(stat, per_stack_value);
        }
    })
}

fn apply_interval_trigger(interval_ticks: u32, effect: &Effect, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let next_tick = world.tick + interval_ticks;
    let source_id = ctx.caster_id.clone();
    let boxed = Box::new(effect.clone());
    apply_cc(ctx, world, "interval_trigger", move |u| {
        u.scratch.interval_triggers.push(IntervalTrigger {
            effect: boxed.clone(),
            interval_ticks,
            next_tick,
            source_id: source_id.clone(),
        });
    })
}

fn apply_accumulator(key: &str, threshold: u32, on_threshold: &Effect, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let mut triggered_ids = Vec::new();
    for target_id in &ctx.targets {
        let Some(unit) = world.unit_mut(target_id) else { continue };
        if !unit.is_alive() {
            continue;
        }
        let count = unit.scratch.accumulator_charges.entry(key.to_string()).or_insert(0);
        *count += 1;
        if *count >= threshold {
            *count = 0;
            triggered_ids.push(target_id.clone());
        }
    }
    for target_id in &triggered_ids {
        let burst_ctx = EffectContext { caster_id: ctx.caster_id.clone(), star_level: ctx.star_level, targets: vec![target_id.clone()], epicenter: ctx.epicenter };
        apply(on_threshold, &burst_ctx, world);
    }
    EffectResult { effect_type: "accumulator", success: !triggered_ids.is_empty(), value: 0.0, target_ids: triggered_ids }
}

fn apply_transform(stat_changes: &[StatDelta], on_hit_scaling: &DamageScaling, on_hit_damage_type: DamageType, stack_per_hit: f64, ctx: &EffectContext, world: &mut World) -> EffectResult {
    let changes = stat_changes.to_vec();
    let scaling = *on_hit_scaling;
    apply_cc(ctx, world, "transform", move |u| {
        for change in &changes {
            u.stats.add_flat(change.stat, change.flat);
            u.stats.add_percent(change.stat, change.percent);
        }
        u.scratch.transform_on_hit = Some(TransformOnHit {
            scaling,
            damage_type: on_hit_damage_type,
            stack_per_hit,
            current_bonus: 0.0,
        });
    })
}

fn apply_multi_strike(hits: u32, per_hit: &[Effect], on_final_hit: &[Effect], ctx: &EffectContext, world: &mut World) -> EffectResult {
    let mut total = 0.0;
    let mut hit_ids = Vec::new();
    let mut any_success = false;
    for i in 0..hits {
        for effect in per_hit {
            let r = apply(effect, ctx, world);
            total += r.value;
            any_success |= r.success;
            hit_ids.extend(r.target_ids);
        }
        if i + 1 == hits {
            for effect in on_final_hit {
                let r = apply(effect, ctx, world);
                total += r.value;
                any_success |= r.success;
                hit_ids.extend(r.target_ids);
            }
        }
    }
    EffectResult { effect_type: "multi_strike", success: any_success, value: total, target_ids: hit_ids }
}

#[allow(clippy::too_many_arguments)]
fn apply_spawn_zone(
    radius: i32,
    duration_ticks: u32,
    ticks_per_second: u32,
    track_damage: bool,
    on_tick_effects: &[Effect],
    on_end_effects: &[Effect],
    ctx: &EffectContext,
    world: &mut World,
) -> EffectResult {
    let Some(center) = ctx.epicenter.or_else(|| world.unit(&ctx.caster_id).map(|u| u.position)) else {
        return EffectResult::empty("spawn_zone");
    };
    let zone = Zone {
        id: 0,
        source_id: ctx.caster_id.clone(),
        center,
        radius,
        team_filter: None,
        on_tick_effects: on_tick_effects.to_vec(),
        on_end_effects: on_end_effects.to_vec(),
        remaining_ticks: duration_ticks,
        ticks_per_second,
        ticks_since_last_trigger: 0,
        damage_tracked: 0.0,
        track_damage,
    };
    let id = world.zones.spawn(zone);
    EffectResult { effect_type: "spawn_zone", success: true, value: id as f64, target_ids: vec![] }
}
