//! Stacked stat model: base + flat, then scaled by (1 + percent), with
//! per-stat clamping.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Hp,
    AttackDamage,
    AbilityPower,
    Armor,
    MagicResist,
    AttackSpeed,
    CritChance,
    CritDamage,
    DodgeChance,
    Lifesteal,
    SpellVamp,
    Omnivamp,
    Mana,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatBlock {
    pub hp: f64,
    pub attack_damage: f64,
    pub ability_power: f64,
    pub armor: f64,
    pub magic_resist: f64,
    pub attack_speed: f64,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub dodge_chance: f64,
    pub lifesteal: f64,
    pub spell_vamp: f64,
    pub omnivamp: f64,
    pub mana: f64,
}

/// Base/flat/percent stacked attributes plus mutable HP/mana state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitStats {
    pub base: StatBlock,
    pub flat: StatBlock,
    pub percent: StatBlock,

    pub attack_range: i32,
    pub max_mana: f64,
    pub start_mana: f64,

    pub current_hp: f64,
    pub current_mana: f64,
}

fn effective(base: f64, flat: f64, percent: f64) -> f64 {
    (base + flat) * (1.0 + percent)
}

impl UnitStats {
    pub fn new(base: StatBlock, attack_range: i32, max_mana: f64, start_mana: f64) -> Self {
        let max_hp = base.hp;
        let mut stats = UnitStats {
            base,
            flat: StatBlock::default(),
            percent: StatBlock::default(),
            attack_range,
            max_mana,
            start_mana,
            current_hp: max_hp,
            current_mana: start_mana,
        };
        stats.current_hp = stats.max_hp();
        stats.current_mana = start_mana;
        stats
    }

    pub fn max_hp(&self) -> f64 {
        effective(self.base.hp, self.flat.hp, self.percent.hp)
    }

    pub fn attack_damage(&self) -> f64 {
        effective(self.base.attack_damage, self.flat.attack_damage, self.percent.attack_damage)
    }

    pub fn ability_power(&self) -> f64 {
        effective(self.base.ability_power, self.flat.ability_power, self.percent.ability_power)
    }

    pub fn armor(&self) -> f64 {
        effective(self.base.armor, self.flat.armor, self.percent.armor)
    }

    pub fn magic_resist(&self) -> f64 {
        effective(self.base.magic_resist, self.flat.magic_resist, self.percent.magic_resist)
    }

    pub fn attack_speed(&self) -> f64 {
        effective(self.base.attack_speed, self.flat.attack_speed, self.percent.attack_speed)
            .clamp(0.2, 5.0)
    }

    pub fn crit_chance(&self) -> f64 {
        effective(self.base.crit_chance, self.flat.crit_chance, self.percent.crit_chance)
            .clamp(0.0, 1.0)
    }

    pub fn crit_damage(&self) -> f64 {
        effective(self.base.crit_damage, self.flat.crit_damage, self.percent.crit_damage).max(1.0)
    }

    pub fn dodge_chance(&self) -> f64 {
        effective(self.base.dodge_chance, self.flat.dodge_chance, self.percent.dodge_chance)
            .clamp(0.0, 1.0)
    }

    pub fn lifesteal(&self) -> f64 {
        effective(self.base.lifesteal, self.flat.lifesteal, self.percent.lifesteal)
    }

    pub fn spell_vamp(&self) -> f64 {
        effective(self.base.spell_vamp, self.flat.spell_vamp, self.percent.spell_vamp)
    }

    pub fn omnivamp(&self) -> f64 {
        effective(self.base.omnivamp, self.flat.omnivamp, self.percent.omnivamp).clamp(0.0, 1.0)
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0.0
    }

    pub fn hp_percent(&self) -> f64 {
        let max = self.max_hp();
        if max <= 0.0 {
            0.0
        } else {
            (self.current_hp / max).clamp(0.0, 1.0)
        }
    }

    /// Applies raw damage, floored at zero. Returns the amount actually removed.
    pub fn take_damage(&mut self, amount: f64) -> f64 {
        let before = self.current_hp;
        self.current_hp = (self.current_hp - amount).max(0.0);
        before - self.current_hp
    }

    /// Heals, capped at max HP. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f64) -> f64 {
        let max = self.max_hp();
        let before = self.current_hp;
        self.current_hp = (self.current_hp + amount).min(max);
        self.current_hp - before
    }

    pub fn add_flat(&mut self, stat: Stat, amount: f64) {
        *self.flat_mut(stat) += amount;
    }

    pub fn add_percent(&mut self, stat: Stat, amount: f64) {
        *self.percent_mut(stat) += amount;
    }

    fn flat_mut(&mut self, stat: Stat) -> &mut f64 {
        match stat {
            Stat::Hp => &mut self.flat.hp,
            Stat::AttackDamage => &mut self.flat.attack_damage,
            Stat::AbilityPower => &mut self.flat.ability_power,
            Stat::Armor => &mut self.flat.armor,
            Stat::MagicResist => &mut self.flat.magic_resist,
            Stat::AttackSpeed => &mut self.flat.attack_speed,
            Stat::CritChance => &mut self.flat.crit_chance,
            Stat::CritDamage => &mut self.flat.crit_damage,
            Stat::DodgeChance => &mut self.flat.dodge_chance,
            Stat::Lifesteal => &mut self.flat.lifesteal,
            Stat::SpellVamp => &mut self.flat.spell_vamp,
            Stat::Omnivamp => &mut self.flat.omnivamp,
            Stat::Mana => &mut self.flat.mana,
        }
    }

    fn percent_mut(&mut self, stat: Stat) -> &mut f64 {
        match stat {
            Stat::Hp => &mut self.percent.hp,
            Stat::AttackDamage => &mut self.percent.attack_damage,
            Stat::AbilityPower => &mut self.percent.ability_power,
            Stat::Armor => &mut self.percent.armor,
            Stat::MagicResist => &mut self.percent.magic_resist,
            Stat::AttackSpeed => &mut self.percent.attack_speed,
            Stat::CritChance => &mut self.percent.crit_chance,
            Stat::CritDamage => &mut self.percent.crit_damage,
            Stat::DodgeChance => &mut self.percent.dodge_chance,
            Stat::Lifesteal => &mut self.percent.lifesteal,
            Stat::SpellVamp => &mut self.percent.spell_vamp,
            Stat::Omnivamp => &mut self.percent.omnivamp,
            Stat::Mana => &mut self.percent.mana,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_stats() -> UnitStats {
        UnitStats::new(
            StatBlock { hp: 500.0, attack_damage: 50.0, armor: 0.0, ..Default::default() },
            1,
            100.0,
            0.0,
        )
    }

    #[test]
    fn flat_and_percent_stack_multiplicatively() {
        let mut stats = base_stats();
        stats.add_flat(Stat::AttackDamage, 10.0);
        stats.add_percent(Stat::AttackDamage, 0.20);
        // (50 + 10) * 1.2 = 72
        assert!((stats.attack_damage() - 72.0).abs() < 1e-9);
    }

    #[test]
    fn crit_chance_clamps_to_one() {
        let mut stats = base_stats();
        stats.add_flat(Stat::CritChance, 2.0);
        assert_eq!(stats.crit_chance(), 1.0);
    }

    #[test]
    fn crit_damage_floors_at_one() {
        let mut stats = base_stats();
        stats.add_flat(Stat::CritDamage, -5.0);
        assert_eq!(stats.crit_damage(), 1.0);
    }

    #[test]
    fn attack_speed_clamped_both_directions() {
        let mut stats = base_stats();
        stats.base.attack_speed = 1.0;
        stats.add_percent(Stat::AttackSpeed, 10.0);
        assert_eq!(stats.attack_speed(), 5.0);
        stats.percent.attack_speed = -0.99;
        assert_eq!(stats.attack_speed(), 0.2);
    }

    #[test]
    fn take_damage_floors_at_zero() {
        let mut stats = base_stats();
        let removed = stats.take_damage(10_000.0);
        assert_eq!(stats.current_hp, 0.0);
        assert_eq!(removed, 500.0);
        assert!(!stats.is_alive());
    }

    #[test]
    fn heal_caps_at_max_hp() {
        let mut stats = base_stats();
        stats.current_hp = 490.0;
        let healed = stats.heal(100.0);
        assert_eq!(stats.current_hp, 500.0);
        assert_eq!(healed, 10.0);
    }
}
