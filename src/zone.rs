//! Persistent AoE zones: tick at every whole second, fire on-end effects
//! on expiry, optionally track damage dealt inside them.

use crate::effects::Effect;
use crate::hex::HexCoord;

#[derive(Debug, Clone)]
pub struct Zone {
    pub id: u64,
    pub source_id: String,
    pub center: HexCoord,
    pub radius: i32,
    pub team_filter: Option<u8>,
    pub on_tick_effects: Vec<Effect>,
    pub on_end_effects: Vec<Effect>,
    pub remaining_ticks: u32,
    pub ticks_per_second: u32,
    pub ticks_since_last_trigger: u32,
    pub damage_tracked: f64,
    pub track_damage: bool,
}

pub enum ZoneStep {
    Idle,
    Triggered,
    Expired,
}

impl Zone {
    pub fn contains(&self, pos: HexCoord) -> bool {
        self.center.distance(pos) <= self.radius
    }

    pub fn tick(&mut self) -> ZoneStep {
        if self.remaining_ticks == 0 {
            return ZoneStep::Expired;
        }
        self.remaining_ticks -= 1;
        self.ticks_since_last_trigger += 1;

        let triggers = self.ticks_since_last_trigger >= self.ticks_per_second;
        if triggers {
            self.ticks_since_last_trigger = 0;
        }

        if self.remaining_ticks == 0 {
            ZoneStep::Expired
        } else if triggers {
            ZoneStep::Triggered
        } else {
            ZoneStep::Idle
        }
    }

    pub fn record_damage(&mut self, amount: f64) {
        if self.track_damage {
            self.damage_tracked += amount;
        }
    }
}

#[derive(Debug, Default)]
pub struct ZoneManager {
    pub zones: Vec<Zone>,
    next_id: u64,
}

impl ZoneManager {
    pub fn spawn(&mut self, mut zone: Zone) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        zone.id = id;
        self.zones.push(zone);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_zone(duration: u32, tps: u32) -> Zone {
        Zone {
            id: 0,
            source_id: "s".into(),
            center: HexCoord::new(0, 0),
            radius: 1,
            team_filter: None,
            on_tick_effects: vec![],
            on_end_effects: vec![],
            remaining_ticks: duration,
            ticks_per_second: tps,
            ticks_since_last_trigger: 0,
            damage_tracked: 0.0,
            track_damage: true,
        }
    }

    #[test]
    fn triggers_every_whole_second() {
        let mut zone = make_zone(90, 30);
        let mut triggers = 0;
        for _ in 0..90 {
            if matches!(zone.tick(), ZoneStep::Triggered) {
                triggers += 1;
            }
        }
        assert_eq!(triggers, 3);
    }

    #[test]
    fn expires_at_zero() {
        let mut zone = make_zone(5, 30);
        let mut last = ZoneStep::Idle;
        for _ in 0..5 {
            last = zone.tick();
        }
        assert!(matches!(last, ZoneStep::Expired));
    }
}
