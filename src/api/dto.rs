//! Request/response records at the library boundary. These are the only
//! types a caller needs to serialize; internal engine types never leak here.

use crate::config::{ManaRuleConfig, SimulationConfig, StarLevelScaling};
use crate::events::LoggedEvent;
use crate::hex::HexCoord;
use crate::model::{AbilityTemplate, ItemTemplate, TraitTemplate, UnitDefaults, UnitTemplate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub unit_template_id: String,
    pub position: [i32; 2],
    pub star_level: u8,
    #[serde(default)]
    pub item_ids: Vec<String>,
}

impl RosterEntry {
    pub fn hex(&self) -> HexCoord {
        HexCoord::new(self.position[0], self.position[1])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateBundle {
    pub units: HashMap<String, UnitTemplate>,
    pub abilities: HashMap<String, AbilityTemplate>,
    pub items: HashMap<String, ItemTemplate>,
    pub traits: HashMap<String, TraitTemplate>,
    #[serde(default)]
    pub unit_defaults: UnitDefaults,
    #[serde(default)]
    pub mana_rule: ManaRuleConfig,
    #[serde(default = "StarLevelScaling::defaults")]
    pub star_scaling: [StarLevelScaling; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: String,
    pub base_id: String,
    pub name: String,
    pub team: u8,
    pub star_level: u8,
    pub position: [i32; 2],
    pub max_hp: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridMetadata {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceMetadata {
    pub version: &'static str,
    pub seed: u64,
    pub ticks_per_second: u32,
    pub grid: GridMetadata,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialState {
    pub units: Vec<UnitSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalState {
    pub winner_team: Option<u8>,
    pub total_ticks: u32,
    pub survivors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    pub metadata: TraceMetadata,
    pub initial_state: InitialState,
    pub events: Vec<LoggedEvent>,
    pub final_state: FinalState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub winner_team: Option<u8>,
    pub total_ticks: u32,
    pub duration_seconds: f64,
    pub survivors: Vec<String>,
    pub trace: Trace,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub rosters: [Vec<RosterEntry>; 2],
    pub seed: u64,
    #[serde(default)]
    pub config: SimulationConfig,
    pub templates: TemplateBundle,
}
