//! Simulation-wide tunables. The core never reads these from disk — the
//! caller parses its own config format and hands over this struct.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub ticks_per_second: u32,
    pub max_ticks: u32,
    pub grid_width: i32,
    pub grid_height: i32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            ticks_per_second: 30,
            max_ticks: 3000,
            grid_width: 7,
            grid_height: 8,
        }
    }
}

/// TFT-style mana-on-damage coefficients, overridable per template bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManaRuleConfig {
    pub pre_mitigation_coef: f64,
    pub post_mitigation_coef: f64,
    pub cap: f64,
    pub mana_per_attack: f64,
}

impl Default for ManaRuleConfig {
    fn default() -> Self {
        ManaRuleConfig {
            pre_mitigation_coef: 0.01,
            post_mitigation_coef: 0.03,
            cap: 42.5,
            mana_per_attack: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarLevelScaling {
    pub hp_multiplier: f64,
    pub damage_multiplier: f64,
}

impl Default for StarLevelScaling {
    fn default() -> Self {
        StarLevelScaling { hp_multiplier: 1.0, damage_multiplier: 1.0 }
    }
}

impl StarLevelScaling {
    pub fn defaults() -> [StarLevelScaling; 3] {
        [
            StarLevelScaling { hp_multiplier: 1.0, damage_multiplier: 1.0 },
            StarLevelScaling { hp_multiplier: 1.8, damage_multiplier: 1.8 },
            StarLevelScaling { hp_multiplier: 3.24, damage_multiplier: 3.24 },
        ]
    }

    pub fn for_star(star_level: u8) -> StarLevelScaling {
        let defaults = Self::defaults();
        let idx = (star_level.max(1).min(3) - 1) as usize;
        defaults[idx].clone()
    }
}
