//! Ability templates: delivery, projectile/AoE configuration, and the
//! per-star timing arrays.

use crate::effects::Effect;
use crate::targeting::TargetSelector;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    Instant,
    Projectile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileConfig {
    pub speed: f64,
    pub homing: bool,
    pub can_miss: bool,
    #[serde(default = "default_projectile_timeout")]
    pub max_ticks: u32,
}

fn default_projectile_timeout() -> u32 {
    300
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum AoeConfig {
    Circle { radius: i32, includes_target: bool },
    Cone { angle_degrees: f64, range: i32 },
    Line { width: i32, range: i32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityTemplate {
    pub id: String,
    pub mana_cost: f64,
    /// Cast time in ticks, indexed `[star_level - 1]`.
    pub cast_time: [u32; 3],
    /// Ticks from cast start until the effect fires, indexed `[star_level - 1]`.
    pub effect_delay: [u32; 3],
    #[serde(default)]
    pub mana_lock: [u32; 3],
    pub target_type: TargetSelector,
    pub delivery: Delivery,
    #[serde(default)]
    pub projectile_config: Option<ProjectileConfig>,
    #[serde(default)]
    pub aoe_config: Option<AoeConfig>,
    pub effects: Vec<Effect>,
}

impl AbilityTemplate {
    pub fn cast_time_for(&self, star_level: u8) -> u32 {
        self.cast_time[star_index(star_level)]
    }

    pub fn effect_delay_for(&self, star_level: u8) -> u32 {
        self.effect_delay[star_index(star_level)]
    }

    pub fn mana_lock_for(&self, star_level: u8) -> u32 {
        self.mana_lock[star_index(star_level)]
    }
}

fn star_index(star_level: u8) -> usize {
    (star_level.clamp(1, 3) - 1) as usize
}
