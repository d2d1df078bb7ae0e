//! Item templates: static stat/flag grants plus triggered and conditional effects.

use super::stats::StatBlock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    OnEquip,
    OnBattleStart,
    OnAttack,
    OnAbilityCast,
    OnFirstCast,
    OnTakeDamage,
    OnKill,
    OnInterval,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredEffect {
    pub trigger: TriggerType,
    #[serde(default)]
    pub interval_ticks: Option<u32>,
    pub effect: crate::effects::Effect,
}

/// A condition evaluated during damage calculation (e.g. "+20% damage vs
/// targets with more than 1600 max HP").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DamageCondition {
    TargetMaxHpAbove { threshold: f64 },
    TargetMaxHpBelow { threshold: f64 },
    TargetMissingHpAbovePercent { threshold: f64 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalDamageModifier {
    pub condition: DamageCondition,
    #[serde(default)]
    pub damage_amp: f64,
    #[serde(default)]
    pub damage_reduction: f64,
    #[serde(default)]
    pub armor_pen: f64,
    #[serde(default)]
    pub magic_pen: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub flat_stats: StatBlock,
    #[serde(default)]
    pub percent_stats: StatBlock,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub granted_traits: Vec<String>,
    #[serde(default)]
    pub triggered_effects: Vec<TriggeredEffect>,
    #[serde(default)]
    pub conditional_effects: Vec<ConditionalDamageModifier>,
    #[serde(default)]
    pub unique: bool,
}
