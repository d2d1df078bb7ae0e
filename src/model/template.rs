//! Load-time template records consumed (not defined) by the core: the
//! shape a caller's on-disk definitions must already have been parsed into.

use super::stats::StatBlock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub ability: Option<String>,
    pub attack_range: i32,
    pub stats: StatBlock,
    #[serde(default)]
    pub max_mana: f64,
    #[serde(default)]
    pub start_mana: f64,
    #[serde(default)]
    pub cost: u32,
}

/// Deep-merged into every loaded unit template before star-level scaling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDefaults {
    #[serde(default)]
    pub stats: StatBlock,
    #[serde(default)]
    pub attack_range: Option<i32>,
    #[serde(default)]
    pub max_mana: Option<f64>,
    #[serde(default)]
    pub start_mana: Option<f64>,
}

impl UnitDefaults {
    /// Merges defaults underneath an explicit template value: an explicit
    /// nonzero field on the template wins, zero/absent falls back to the default.
    pub fn apply_to(&self, template: &mut UnitTemplate) {
        merge_stat(&mut template.stats.hp, self.stats.hp);
        merge_stat(&mut template.stats.attack_damage, self.stats.attack_damage);
        merge_stat(&mut template.stats.ability_power, self.stats.ability_power);
        merge_stat(&mut template.stats.armor, self.stats.armor);
        merge_stat(&mut template.stats.magic_resist, self.stats.magic_resist);
        merge_stat(&mut template.stats.attack_speed, self.stats.attack_speed);
        merge_stat(&mut template.stats.crit_chance, self.stats.crit_chance);
        merge_stat(&mut template.stats.crit_damage, self.stats.crit_damage);
        merge_stat(&mut template.stats.dodge_chance, self.stats.dodge_chance);
        merge_stat(&mut template.stats.lifesteal, self.stats.lifesteal);
        merge_stat(&mut template.stats.spell_vamp, self.stats.spell_vamp);
        merge_stat(&mut template.stats.omnivamp, self.stats.omnivamp);
        merge_stat(&mut template.stats.mana, self.stats.mana);

        if template.attack_range == 0 {
            if let Some(v) = self.attack_range {
                template.attack_range = v;
            }
        }
        if template.max_mana == 0.0 {
            if let Some(v) = self.max_mana {
                template.max_mana = v;
            }
        }
        if template.start_mana == 0.0 {
            if let Some(v) = self.start_mana {
                template.start_mana = v;
            }
        }
    }
}

fn merge_stat(value: &mut f64, default: f64) {
    if *value == 0.0 {
        *value = default;
    }
}
