//! The damage pipeline: crit, dodge, resistance reduction, lifesteal/vamp.

use crate::model::status::DamageType;
use crate::model::unit::Unit;
use crate::rng::GameRng;

#[derive(Debug, Clone, Copy)]
pub struct DamageResult {
    pub raw_damage: f64,
    pub pre_mitigation_damage: f64,
    pub final_damage: f64,
    pub damage_type: DamageType,
    pub is_crit: bool,
    pub was_dodged: bool,
    pub reduction: f64,
    pub lifesteal_amount: f64,
}

/// Extension point for item conditional effects, consumed between
/// reduction and the final-damage floor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DamageModifiers {
    pub damage_amp: f64,
    pub damage_reduction: f64,
    pub armor_pen: f64,
    pub magic_pen: f64,
}

pub fn calculate_reduction(resistance: f64) -> f64 {
    resistance / (resistance + 100.0)
}

#[allow(clippy::too_many_arguments)]
pub fn calculate_damage(
    attacker: &Unit,
    defender: &Unit,
    base_damage: f64,
    damage_type: DamageType,
    rng: &mut GameRng,
    can_crit: bool,
    can_dodge: bool,
    is_ability: bool,
    modifiers: DamageModifiers,
) -> DamageResult {
    let mut damage = base_damage;
    let mut is_crit = false;

    if can_crit && !is_ability {
        let crit_chance = attacker.stats.crit_chance();
        if rng.roll_crit(crit_chance) {
            is_crit = true;
            damage *= attacker.stats.crit_damage();
        }
    }

    let raw_damage = damage;

    if can_dodge && !is_ability {
        let dodge_chance = defender.stats.dodge_chance();
        if rng.roll_dodge(dodge_chance) {
            return DamageResult {
                raw_damage,
                pre_mitigation_damage: raw_damage,
                final_damage: 0.0,
                damage_type,
                is_crit,
                was_dodged: true,
                reduction: 0.0,
                lifesteal_amount: 0.0,
            };
        }
    }

    let reduction = match damage_type {
        DamageType::Physical => {
            let armor = (defender.stats.armor()
                - defender.status.armor_shred_flat()
                - modifiers.armor_pen)
                * (1.0 - defender.status.armor_shred_percent());
            calculate_reduction(armor)
        }
        DamageType::Magical => {
            let mr = (defender.stats.magic_resist()
                - defender.status.mr_shred_flat()
                - modifiers.magic_pen)
                * (1.0 - defender.status.mr_shred_percent());
            calculate_reduction(mr)
        }
        DamageType::True => 0.0,
    };

    let mut final_damage = raw_damage * (1.0 - reduction);
    final_damage *= 1.0 + modifiers.damage_amp;
    final_damage *= 1.0 - modifiers.damage_reduction;
    final_damage = final_damage.max(0.0);

    let mut lifesteal_amount = 0.0;
    if is_ability {
        let spell_vamp = attacker.stats.spell_vamp();
        if spell_vamp > 0.0 {
            lifesteal_amount += final_damage * spell_vamp;
        }
    } else if damage_type == DamageType::Physical {
        let lifesteal = attacker.stats.lifesteal();
        if lifesteal > 0.0 {
            lifesteal_amount += final_damage * lifesteal;
        }
    }
    let omnivamp = attacker.stats.omnivamp();
    if omnivamp > 0.0 {
        lifesteal_amount += final_damage * omnivamp;
    }

    DamageResult {
        raw_damage,
        pre_mitigation_damage: raw_damage,
        final_damage,
        damage_type,
        is_crit,
        was_dodged: false,
        reduction,
        lifesteal_amount,
    }
}

/// TFT mana-on-damage rule: `gained = min(cap, pre*pre_coef + final*post_coef)`.
pub fn mana_from_damage(
    result: &DamageResult,
    pre_coef: f64,
    post_coef: f64,
    cap: f64,
) -> f64 {
    if result.was_dodged {
        return 0.0;
    }
    (result.pre_mitigation_damage * pre_coef + result.final_damage * post_coef).min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stats::{StatBlock, UnitStats};
    use crate::model::status::StatusBag;
    use crate::model::unit::UnitScratch;
    use crate::state_machine::UnitStateMachine;
    use crate::hex::HexCoord;

    fn unit_with(hp: f64, ad: f64, armor: f64, mr: f64, crit_chance: f64, dodge: f64) -> Unit {
        Unit {
            id: "u".into(),
            base_id: "u".into(),
            name: "u".into(),
            team: 0,
            star_level: 1,
            position: HexCoord::new(0, 0),
            stats: UnitStats::new(
                StatBlock {
                    hp,
                    attack_damage: ad,
                    armor,
                    magic_resist: mr,
                    crit_chance,
                    dodge_chance: dodge,
                    crit_damage: 1.5,
                    ..Default::default()
                },
                1,
                100.0,
                0.0,
            ),
            status: StatusBag::default(),
            state: UnitStateMachine::default(),
            target: None,
            ability_id: None,
            item_ids: vec![],
            trait_ids: vec![],
            attack_cooldown: 0,
            attack_range: 1,
            scratch: UnitScratch::default(),
        }
    }

    #[test]
    fn armor_formula_reduces_exactly() {
        let attacker = unit_with(500.0, 100.0, 0.0, 0.0, 0.0, 0.0);
        let defender = unit_with(500.0, 0.0, 100.0, 0.0, 0.0, 0.0);
        let mut rng = GameRng::new(1);
        let result = calculate_damage(
            &attacker,
            &defender,
            100.0,
            DamageType::Physical,
            &mut rng,
            true,
            true,
            false,
            DamageModifiers::default(),
        );
        assert!((result.final_damage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn guaranteed_dodge_zeroes_damage() {
        let attacker = unit_with(500.0, 100.0, 0.0, 0.0, 0.0, 0.0);
        let defender = unit_with(500.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let mut rng = GameRng::new(1);
        for _ in 0..20 {
            let result = calculate_damage(
                &attacker,
                &defender,
                100.0,
                DamageType::Physical,
                &mut rng,
                true,
                true,
                false,
                DamageModifiers::default(),
            );
            assert!(result.was_dodged);
            assert_eq!(result.final_damage, 0.0);
        }
    }

    #[test]
    fn true_damage_ignores_resistance() {
        let attacker = unit_with(500.0, 100.0, 0.0, 0.0, 0.0, 0.0);
        let defender = unit_with(500.0, 0.0, 1000.0, 1000.0, 0.0, 0.0);
        let mut rng = GameRng::new(1);
        let result = calculate_damage(
            &attacker,
            &defender,
            30.0,
            DamageType::True,
            &mut rng,
            false,
            false,
            true,
            DamageModifiers::default(),
        );
        assert_eq!(result.final_damage, 30.0);
    }

    #[test]
    fn ability_never_crits_or_dodges_by_default() {
        let attacker = unit_with(500.0, 100.0, 0.0, 0.0, 1.0, 0.0);
        let defender = unit_with(500.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let mut rng = GameRng::new(1);
        let result = calculate_damage(
            &attacker,
            &defender,
            100.0,
            DamageType::Magical,
            &mut rng,
            true,
            true,
            true,
            DamageModifiers::default(),
        );
        assert!(!result.is_crit);
        assert!(!result.was_dodged);
    }
}
