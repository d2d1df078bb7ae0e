//! The status-effect bag. Kept as independent structured fields (rather
//! than one unified tagged list) per the source's layout — clearer to
//! read even if it's a little more code per effect kind.

use super::stats::Stat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageType {
    Physical,
    Magical,
    True,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shield {
    pub remaining_hp: f64,
    pub expiry_tick: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Burn {
    pub dps: f64,
    pub remaining_ticks: u32,
    pub source_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dot {
    pub damage_per_tick: f64,
    pub damage_type: DamageType,
    pub remaining_ticks: u32,
    pub interval: u32,
    pub next_tick: u32,
    pub source_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimedModifier {
    pub flat: f64,
    pub percent: f64,
    pub remaining_ticks: u32,
}

impl TimedModifier {
    /// Refreshing a modifier keeps the larger magnitude and the longer duration.
    pub fn refresh(&mut self, flat: f64, percent: f64, ticks: u32) {
        self.flat = self.flat.max(flat);
        self.percent = self.percent.max(percent);
        self.remaining_ticks = self.remaining_ticks.max(ticks);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TauntState {
    pub remaining_ticks: u32,
    pub forced_target: String,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackTrigger {
    OnCast,
    OnAttack,
    OnDamageDealt,
    OnDamageTaken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackingBuff {
    pub stat: Stat,
    pub per_stack_value: f64,
    pub stacks: u32,
    pub max_stacks: Option<u32>,
    pub permanent: bool,
    pub is_percent: bool,
    /// Stacks granted each time the buff's configured trigger fires.
    pub stacks_per_event: u32,
}

impl StackingBuff {
    pub fn total(&self) -> f64 {
        self.per_stack_value * self.stacks as f64
    }

    /// Adds up to `n` stacks, capped at `max_stacks`. Returns the number of
    /// stacks actually added, so callers can apply just the delta to the
    /// effective stat.
    pub fn add_stacks(&mut self, n: u32) -> u32 {
        let new_total = self.stacks + n;
        let capped = match self.max_stacks {
            Some(cap) => new_total.min(cap),
            None => new_total,
        };
        let added = capped - self.stacks;
        self.stacks = capped;
        added
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecayingBuff {
    pub stat: Stat,
    pub initial: f64,
    pub current: f64,
    pub remaining_ticks: u32,
    pub total_duration: u32,
    pub is_percent: bool,
}

impl DecayingBuff {
    /// Advances one tick, linearly decaying toward zero. Returns `false`
    /// once the buff has fully expired.
    pub fn tick(&mut self) -> bool {
        if self.remaining_ticks == 0 {
            return false;
        }
        self.remaining_ticks -= 1;
        if self.total_duration == 0 {
            self.current = 0.0;
        } else {
            self.current = self.initial * (self.remaining_ticks as f64 / self.total_duration as f64);
        }
        self.remaining_ticks > 0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusBag {
    pub shield: Option<Shield>,
    pub burns: Vec<Burn>,
    pub dots: Vec<Dot>,
    pub slow: Option<TimedModifier>,
    pub wound: Option<TimedModifier>,
    pub armor_shred: Option<TimedModifier>,
    pub mr_shred: Option<TimedModifier>,
    pub silence_ticks: u32,
    pub disarm_ticks: u32,
    pub taunt: Option<TauntState>,
    pub stacking_buffs: HashMap<(Stat, StackTrigger), StackingBuff>,
    pub decaying_buffs: Vec<DecayingBuff>,
}

impl StatusBag {
    pub fn is_silenced(&self) -> bool {
        self.silence_ticks > 0
    }

    pub fn is_disarmed(&self) -> bool {
        self.disarm_ticks > 0
    }

    /// Adds to the shield pool, never shrinking it (replaced by larger, never stacked).
    pub fn apply_shield(&mut self, amount: f64, expiry_tick: u64) {
        match &mut self.shield {
            Some(existing) if existing.remaining_hp >= amount => {
                existing.expiry_tick = existing.expiry_tick.max(expiry_tick);
            }
            _ => {
                self.shield = Some(Shield { remaining_hp: amount, expiry_tick });
            }
        }
    }

    /// Absorbs damage through the shield if present. Returns the
    /// remaining damage that passes through.
    pub fn absorb_with_shield(&mut self, incoming: f64) -> f64 {
        if let Some(shield) = &mut self.shield {
            if shield.remaining_hp >= incoming {
                shield.remaining_hp -= incoming;
                return 0.0;
            }
            let leftover = incoming - shield.remaining_hp;
            self.shield = None;
            return leftover;
        }
        incoming
    }

    /// Sums all active burn/DoT damage for this tick, grouped by damage
    /// type, and advances/expires each entry. Burns store a per-second rate,
    /// so the per-tick amount is that rate divided by `ticks_per_second`;
    /// DoTs already store a per-tick amount and need no conversion.
    pub fn tick_dots_and_burns(&mut self, current_tick: u32, ticks_per_second: u32) -> Vec<(f64, DamageType, String)> {
        let mut hits = Vec::new();

        let active_burns: Vec<(f64, String)> = self
            .burns
            .iter()
            .filter(|b| b.remaining_ticks > 0)
            .map(|b| (b.dps, b.source_id.clone()))
            .collect();
        if !active_burns.is_empty() {
            let dps_sum: f64 = active_burns.iter().map(|(dps, _)| dps).sum();
            let source = active_burns[0].1.clone();
            hits.push((dps_sum / ticks_per_second as f64, DamageType::True, source));
        }
        for burn in &mut self.burns {
            if burn.remaining_ticks > 0 {
                burn.remaining_ticks -= 1;
            }
        }
        self.burns.retain(|b| b.remaining_ticks > 0);

        for dot in &mut self.dots {
            if dot.next_tick <= current_tick && dot.remaining_ticks > 0 {
                hits.push((dot.damage_per_tick, dot.damage_type, dot.source_id.clone()));
                dot.next_tick = current_tick + dot.interval;
            }
            if dot.remaining_ticks > 0 {
                dot.remaining_ticks -= 1;
            }
        }
        self.dots.retain(|d| d.remaining_ticks > 0);

        hits
    }

    /// Decrements all timed debuffs/CC, removing those that expire.
    pub fn tick_timed_effects(&mut self) {
        tick_timed_modifier(&mut self.slow);
        tick_timed_modifier(&mut self.wound);
        tick_timed_modifier(&mut self.armor_shred);
        tick_timed_modifier(&mut self.mr_shred);

        if self.silence_ticks > 0 {
            self.silence_ticks -= 1;
        }
        if self.disarm_ticks > 0 {
            self.disarm_ticks -= 1;
        }
        if let Some(taunt) = &mut self.taunt {
            if taunt.remaining_ticks > 0 {
                taunt.remaining_ticks -= 1;
            }
            if taunt.remaining_ticks == 0 {
                self.taunt = None;
            }
        }

        self.decaying_buffs.retain_mut(|b| b.tick());
    }

    pub fn clear_all_debuffs(&mut self) {
        self.slow = None;
        self.wound = None;
        self.armor_shred = None;
        self.mr_shred = None;
        self.silence_ticks = 0;
        self.disarm_ticks = 0;
    }

    pub fn armor_shred_flat(&self) -> f64 {
        self.armor_shred.map(|m| m.flat).unwrap_or(0.0)
    }

    pub fn armor_shred_percent(&self) -> f64 {
        self.armor_shred.map(|m| m.percent).unwrap_or(0.0)
    }

    pub fn mr_shred_flat(&self) -> f64 {
        self.mr_shred.map(|m| m.flat).unwrap_or(0.0)
    }

    pub fn mr_shred_percent(&self) -> f64 {
        self.mr_shred.map(|m| m.percent).unwrap_or(0.0)
    }

    pub fn wound_percent(&self) -> f64 {
        self.wound.map(|m| m.percent).unwrap_or(0.0)
    }

    pub fn attack_speed_slow_percent(&self) -> f64 {
        self.slow.map(|m| m.percent).unwrap_or(0.0)
    }
}

fn tick_timed_modifier(modifier: &mut Option<TimedModifier>) {
    if let Some(m) = modifier {
        if m.remaining_ticks > 0 {
            m.remaining_ticks -= 1;
        }
        if m.remaining_ticks == 0 {
            *modifier = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shield_replaced_by_larger_never_stacks() {
        let mut bag = StatusBag::default();
        bag.apply_shield(100.0, 10);
        bag.apply_shield(50.0, 20);
        assert_eq!(bag.shield.as_ref().unwrap().remaining_hp, 100.0);
        bag.apply_shield(200.0, 30);
        assert_eq!(bag.shield.as_ref().unwrap().remaining_hp, 200.0);
    }

    #[test]
    fn refresh_takes_max_of_magnitude_and_duration() {
        let mut modifier = TimedModifier { flat: 0.0, percent: -0.2, remaining_ticks: 30 };
        modifier.refresh(0.0, -0.5, 10);
        assert_eq!(modifier.percent, -0.2);
        assert_eq!(modifier.remaining_ticks, 30);
    }

    #[test]
    fn decaying_buff_reaches_zero_at_end() {
        let mut buff = DecayingBuff {
            stat: Stat::AttackDamage,
            initial: 100.0,
            current: 100.0,
            remaining_ticks: 10,
            total_duration: 10,
            is_percent: false,
        };
        let mut alive = true;
        while alive {
            alive = buff.tick();
        }
        assert_eq!(buff.current, 0.0);
    }

    #[test]
    fn stacking_buff_respects_max_stacks() {
        let mut buff = StackingBuff {
            stat: Stat::Armor,
            per_stack_value: 5.0,
            stacks: 0,
            max_stacks: Some(3),
            permanent: false,
            is_percent: false,
            stacks_per_event: 1,
        };
        let added = buff.add_stacks(10);
        assert_eq!(added, 3);
        assert_eq!(buff.stacks, 3);
        assert_eq!(buff.total(), 15.0);
    }
}
