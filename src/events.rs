//! The append-only event log. Serialized only after `run()` returns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub tick: u32,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "SIMULATION_START")]
    SimulationStart,
    #[serde(rename = "SIMULATION_END")]
    SimulationEnd,
    #[serde(rename = "TICK_START")]
    TickStart,
    #[serde(rename = "UNIT_SPAWN")]
    UnitSpawn,
    #[serde(rename = "UNIT_MOVE")]
    UnitMove,
    #[serde(rename = "UNIT_ATTACK")]
    UnitAttack,
    #[serde(rename = "UNIT_DAMAGE")]
    UnitDamage,
    #[serde(rename = "UNIT_HEAL")]
    UnitHeal,
    #[serde(rename = "UNIT_DEATH")]
    UnitDeath,
    #[serde(rename = "UNIT_MANA_GAIN")]
    UnitManaGain,
    #[serde(rename = "ABILITY_CAST")]
    AbilityCast,
    #[serde(rename = "ABILITY_EFFECT")]
    AbilityEffect,
    #[serde(rename = "BUFF_APPLY")]
    BuffApply,
    #[serde(rename = "BUFF_EXPIRE")]
    BuffExpire,
    #[serde(rename = "BUFF_STACK")]
    BuffStack,
    #[serde(rename = "STATE_CHANGE")]
    StateChange,
    #[serde(rename = "TARGET_ACQUIRED")]
    TargetAcquired,
    #[serde(rename = "TARGET_LOST")]
    TargetLost,
}

#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn push(
        &mut self,
        tick: u32,
        event_type: EventType,
        unit_id: Option<String>,
        target_id: Option<String>,
        data: Option<Value>,
    ) {
        self.events.push(LoggedEvent { tick, event_type, unit_id, target_id, data });
    }

    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<LoggedEvent> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_preserve_insertion_order() {
        let mut log = EventLog::default();
        log.push(0, EventType::SimulationStart, None, None, None);
        log.push(1, EventType::UnitAttack, Some("a".into()), Some("b".into()), Some(json!({"damage": 5.0})));
        let events = log.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].unit_id.as_deref(), Some("a"));
    }
}
