//! The durable battlefield entity.

use super::stats::UnitStats;
use super::status::{DamageType, StackTrigger, StatusBag};
use crate::effects::DamageScaling;
use crate::hex::HexCoord;
use crate::state_machine::{UnitState, UnitStateMachine};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A weak reference to another unit by id. Holders must re-check
/// `World::is_alive` before using it; this struct carries no pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRef {
    pub id: String,
}

/// Data overriding the next auto-attack(s), installed by `replace_attacks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmpoweredAttack {
    pub damage: f64,
    pub remaining_uses: u32,
    pub infinite_range: bool,
    pub bonus_on_last_multiplier: Option<f64>,
}

/// Runtime scratch state, battle-persistent but tick-scoped in meaning
/// (see DESIGN.md's resolution of the accumulator-lifetime open question).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitScratch {
    pub pending_mana_overflow: f64,
    pub empowered_attack: Option<EmpoweredAttack>,
    pub interval_triggers: Vec<IntervalTrigger>,
    pub heal_over_time: Vec<HealOverTime>,
    pub timed_stat_buffs: Vec<TimedStatBuff>,
    pub accumulator_charges: HashMap<String, u32>,
    pub has_cast_before: bool,
    /// Targets resolved when a cast started, applied when its effect fires.
    pub pending_ability_targets: Vec<String>,
    pub pending_ability_epicenter: Option<HexCoord>,
    /// Extra mana cost applied to this unit's next cast, from `Effect::ManaReave`.
    pub mana_reave_surcharge: f64,
    /// Installed by `Effect::Transform`: bonus on-hit damage, consumed and
    /// restacked by every auto-attack.
    pub transform_on_hit: Option<TransformOnHit>,
    /// Running permanent-stack totals, keyed by the effect's stack key, kept
    /// for event-log parity with the source's note-taking.
    pub permanent_stacks: HashMap<String, u32>,
}

/// The on-hit bonus installed by a `Transform` effect: deals `scaling`
/// damage on every auto-attack and grows by `stack_per_hit` each time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformOnHit {
    pub scaling: DamageScaling,
    pub damage_type: DamageType,
    pub stack_per_hit: f64,
    pub current_bonus: f64,
}

/// A timed flat/percent stat modifier applied directly to `UnitStats`'
/// accumulators on grant and subtracted back out on expiry, since those
/// accumulators themselves carry no notion of duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedStatBuff {
    pub stat: super::stats::Stat,
    pub flat: f64,
    pub percent: f64,
    pub remaining_ticks: u32,
}

/// A passive installed by `Effect::IntervalTrigger`: fires `effect` against
/// its holder every `interval_ticks`, for the rest of the battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalTrigger {
    pub effect: Box<crate::effects::Effect>,
    pub interval_ticks: u32,
    pub next_tick: u32,
    pub source_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealOverTime {
    pub amount_per_tick: f64,
    pub is_percent_max_hp: bool,
    pub remaining_ticks: u32,
    pub interval: u32,
    pub next_tick: u32,
    pub source_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub base_id: String,
    pub name: String,
    pub team: u8,
    pub star_level: u8,

    pub position: HexCoord,
    pub stats: UnitStats,
    pub status: StatusBag,
    pub state: UnitStateMachine,

    pub target: Option<TargetRef>,

    pub ability_id: Option<String>,
    pub item_ids: Vec<String>,
    pub trait_ids: Vec<String>,

    pub attack_cooldown: u32,
    pub attack_range: i32,

    pub scratch: UnitScratch,
}

impl Unit {
    pub fn is_alive(&self) -> bool {
        self.state.state != UnitState::Dead && self.stats.is_alive()
    }

    pub fn kill(&mut self) {
        self.state.kill();
        self.stats.current_hp = 0.0;
    }

    pub fn gain_mana(&mut self, amount: f64, mana_rule_cap_overflow: bool) {
        if self.state.is_mana_locked() || amount <= 0.0 {
            return;
        }
        let max = self.stats.max_mana;
        let new_total = self.stats.current_mana + amount;
        if new_total > max {
            if mana_rule_cap_overflow {
                self.scratch.pending_mana_overflow += new_total - max;
            }
            self.stats.current_mana = max;
        } else {
            self.stats.current_mana = new_total;
        }
    }

    pub fn has_full_mana(&self) -> bool {
        self.stats.current_mana >= self.stats.max_mana && self.stats.max_mana > 0.0
    }

    /// Consumes mana for a cast: current mana is reset to the carried
    /// overflow and the overflow accumulator is cleared.
    pub fn consume_mana_for_cast(&mut self) {
        let carried = (self.scratch.pending_mana_overflow - self.scratch.mana_reave_surcharge).max(0.0);
        self.stats.current_mana = carried.min(self.stats.max_mana);
        self.scratch.pending_mana_overflow = 0.0;
        self.scratch.mana_reave_surcharge = 0.0;
    }

    pub fn add_timed_stat_buff(&mut self, stat: super::stats::Stat, flat: f64, percent: f64, duration_ticks: u32) {
        self.stats.add_flat(stat, flat);
        self.stats.add_percent(stat, percent);
        self.scratch.timed_stat_buffs.push(TimedStatBuff { stat, flat, percent, remaining_ticks: duration_ticks });
    }

    /// Decrements every timed stat buff, reverting its flat/percent
    /// contribution back out of the stat accumulators on expiry.
    pub fn tick_timed_stat_buffs(&mut self) {
        let stats = &mut self.stats;
        self.scratch.timed_stat_buffs.retain_mut(|buff| {
            if buff.remaining_ticks > 0 {
                buff.remaining_ticks -= 1;
            }
            if buff.remaining_ticks == 0 {
                stats.add_flat(buff.stat, -buff.flat);
                stats.add_percent(buff.stat, -buff.percent);
                false
            } else {
                true
            }
        });
    }

    /// Adds each registered stacking buff's per-trigger stack count for
    /// `trigger`, applying the resulting delta straight into the stat
    /// accumulators (see `Effect::StackingStatBuff`).
    pub fn fire_stack_trigger(&mut self, trigger: StackTrigger) {
        for ((_, buff_trigger), buff) in self.status.stacking_buffs.iter_mut() {
            if *buff_trigger != trigger {
                continue;
            }
            let added = buff.add_stacks(buff.stacks_per_event);
            if added == 0 {
                continue;
            }
            let delta = buff.per_stack_value * added as f64;
            if buff.is_percent {
                self.stats.add_percent(buff.stat, delta);
            } else {
                self.stats.add_flat(buff.stat, delta);
            }
        }
    }
}
