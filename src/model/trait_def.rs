//! Trait (synergy) templates: count thresholds that gate a triggered effect list.

use crate::effects::Effect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitTriggerType {
    OnBattleStart,
    OnDamage,
    OnFirstCast,
    OnKill,
    /// Fires once, at `TraitThreshold::at_tick`.
    OnTime,
    /// Fires every `TraitThreshold::interval_ticks`, starting at that tick.
    OnInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitEffectTarget {
    Holders,
    Team,
    SelfUnit,
    Adjacent,
    Enemies,
    NearestAlly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitThreshold {
    pub trigger: TraitTriggerType,
    pub target: TraitEffectTarget,
    pub effects: Vec<Effect>,
    /// Tick at which an `on_time` threshold fires.
    #[serde(default)]
    pub at_tick: Option<u32>,
    /// Period, in ticks, at which an `on_interval` threshold fires.
    #[serde(default)]
    pub interval_ticks: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitTemplate {
    pub id: String,
    /// Keyed by minimum unique-holder count; `BTreeMap` keeps thresholds
    /// sorted so "highest threshold at or below count" is a single scan.
    pub thresholds: BTreeMap<u32, TraitThreshold>,
}

impl TraitTemplate {
    /// The active threshold for `count` unique holders, or `None` if
    /// `count` is below every threshold.
    pub fn active_threshold(&self, count: u32) -> Option<(&u32, &TraitThreshold)> {
        self.thresholds.range(..=count).next_back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_trait() -> TraitTemplate {
        let mut thresholds = BTreeMap::new();
        thresholds.insert(2, TraitThreshold {
            trigger: TraitTriggerType::OnBattleStart,
            target: TraitEffectTarget::Holders,
            effects: vec![],
            at_tick: None,
            interval_ticks: None,
        });
        thresholds.insert(4, TraitThreshold {
            trigger: TraitTriggerType::OnBattleStart,
            target: TraitEffectTarget::Holders,
            effects: vec![],
            at_tick: None,
            interval_ticks: None,
        });
        TraitTemplate { id: "t".to_string(), thresholds }
    }

    #[test]
    fn three_holders_activates_lower_threshold_only() {
        let t = make_trait();
        let (count, _) = t.active_threshold(3).unwrap();
        assert_eq!(*count, 2);
    }

    #[test]
    fn four_holders_activates_higher_threshold_not_both() {
        let t = make_trait();
        let (count, _) = t.active_threshold(4).unwrap();
        assert_eq!(*count, 4);
    }

    #[test]
    fn below_every_threshold_is_inactive() {
        let t = make_trait();
        assert!(t.active_threshold(1).is_none());
    }
}
