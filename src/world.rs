//! The simulation world: owns every piece of mutable state for one run.

use crate::api::dto::TemplateBundle;
use crate::config::SimulationConfig;
use crate::events::{EventLog, EventType};
use crate::hex::{HexCoord, HexGrid};
use crate::model::status::{DamageType, StackTrigger};
use crate::model::unit::Unit;
use crate::projectile::ProjectileManager;
use crate::rng::GameRng;
use crate::zone::ZoneManager;
use serde_json::json;
use std::collections::HashMap;

pub struct World {
    pub grid: HexGrid,
    pub units: Vec<Unit>,
    index: HashMap<String, usize>,
    pub rng: GameRng,
    pub log: EventLog,
    pub tick: u32,
    pub terminal: bool,
    pub winner: Option<u8>,
    pub config: SimulationConfig,
    pub templates: TemplateBundle,
    pub projectiles: ProjectileManager,
    pub zones: ZoneManager,
    /// Active threshold count currently applied, per (team, trait_id).
    pub active_trait_thresholds: HashMap<(u8, String), u32>,
    /// Next tick an `on_time`/`on_interval` trait threshold is due to fire.
    pub trait_next_fire: HashMap<(u8, String), u32>,
    /// Effects to resolve when a projectile arrives, keyed by projectile id.
    pub pending_projectile_effects: HashMap<u64, (String, u8, Vec<crate::effects::Effect>)>,
}

impl World {
    pub fn new(grid: HexGrid, rng: GameRng, config: SimulationConfig, templates: TemplateBundle) -> Self {
        World {
            grid,
            units: Vec::new(),
            index: HashMap::new(),
            rng,
            log: EventLog::default(),
            tick: 0,
            terminal: false,
            winner: None,
            config,
            templates,
            projectiles: ProjectileManager::default(),
            zones: ZoneManager::default(),
            active_trait_thresholds: HashMap::new(),
            trait_next_fire: HashMap::new(),
            pending_projectile_effects: HashMap::new(),
        }
    }

    pub fn add_unit(&mut self, unit: Unit) {
        self.index.insert(unit.id.clone(), self.units.len());
        self.units.push(unit);
    }

    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.index.get(id).map(|&i| &self.units[i])
    }

    pub fn unit_mut(&mut self, id: &str) -> Option<&mut Unit> {
        match self.index.get(id) {
            Some(&i) => Some(&mut self.units[i]),
            None => None,
        }
    }

    pub fn is_alive(&self, id: &str) -> bool {
        self.unit(id).map(|u| u.is_alive()).unwrap_or(false)
    }

    pub fn living_ids(&self) -> Vec<String> {
        self.units.iter().filter(|u| u.is_alive()).map(|u| u.id.clone()).collect()
    }

    pub fn living_team(&self, team: u8) -> Vec<&Unit> {
        self.units.iter().filter(|u| u.is_alive() && u.team == team).collect()
    }

    pub fn living_enemies_of(&self, team: u8) -> Vec<&Unit> {
        self.living_team(1 - team)
    }

    pub fn living_allies_of(&self, team: u8) -> Vec<&Unit> {
        self.living_team(team)
    }

    /// Deals damage to a unit, applying shields first, then logs and
    /// checks for death. Returns the actual HP removed (post-shield).
    pub fn deal_damage(
        &mut self,
        target_id: &str,
        source_id: &str,
        amount: f64,
        damage_type: DamageType,
    ) -> f64 {
        let Some(target) = self.unit_mut(target_id) else { return 0.0 };
        if !target.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        let after_shield = target.status.absorb_with_shield(amount);
        let removed = target.stats.take_damage(after_shield);
        let hp_after = target.stats.current_hp;

        self.log.push(
            self.tick,
            EventType::UnitDamage,
            Some(target_id.to_string()),
            None,
            Some(json!({
                "source_id": source_id,
                "damage": removed,
                "damage_type": format!("{:?}", damage_type),
                "hp_after": hp_after,
            })),
        );

        if removed > 0.0 {
            if let Some(target) = self.unit_mut(target_id) {
                target.fire_stack_trigger(StackTrigger::OnDamageTaken);
            }
            if let Some(source) = self.unit_mut(source_id) {
                source.fire_stack_trigger(StackTrigger::OnDamageDealt);
            }
        }

        if hp_after <= 0.0 {
            self.kill_unit(target_id, Some(source_id));
        }
        removed
    }

    pub fn heal(&mut self, target_id: &str, amount: f64) -> f64 {
        let Some(target) = self.unit_mut(target_id) else { return 0.0 };
        if !target.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        let healed = target.stats.heal(amount);
        if healed > 0.0 {
            self.log.push(
                self.tick,
                EventType::UnitHeal,
                Some(target_id.to_string()),
                None,
                Some(json!({"amount": healed})),
            );
        }
        healed
    }

    pub fn apply_shield(&mut self, target_id: &str, amount: f64, duration_ticks: u32) {
        let expiry = self.tick as u64 + duration_ticks as u64;
        if let Some(target) = self.unit_mut(target_id) {
            target.status.apply_shield(amount, expiry);
        }
    }

    pub fn kill_unit(&mut self, unit_id: &str, killer_id: Option<&str>) {
        let already_dead = self.unit(unit_id).map(|u| !u.is_alive()).unwrap_or(true);
        if already_dead {
            return;
        }
        if let Some(unit) = self.unit_mut(unit_id) {
            unit.kill();
        }
        self.grid.remove(unit_id);
        self.log.push(
            self.tick,
            EventType::UnitDeath,
            Some(unit_id.to_string()),
            None,
            Some(json!({"killer_id": killer_id})),
        );
    }

    /// Moves a unit toward `new_pos`, keeping grid and unit state consistent.
    pub fn move_unit(&mut self, unit_id: &str, new_pos: HexCoord) -> bool {
        if self.grid.move_unit(unit_id, new_pos).is_err() {
            return false;
        }
        let from = self.unit(unit_id).map(|u| u.position);
        if let Some(unit) = self.unit_mut(unit_id) {
            unit.position = new_pos;
        }
        self.log.push(
            self.tick,
            EventType::UnitMove,
            Some(unit_id.to_string()),
            None,
            Some(json!({
                "from": from.map(|p| [p.q, p.r]),
                "to": [new_pos.q, new_pos.r],
            })),
        );
        true
    }

    pub fn config_mana_pre(&self) -> f64 {
        self.templates.mana_rule.pre_mitigation_coef
    }

    pub fn config_mana_post(&self) -> f64 {
        self.templates.mana_rule.post_mitigation_coef
    }

    pub fn config_mana_cap(&self) -> f64 {
        self.templates.mana_rule.cap
    }

    pub fn templates_mana_per_attack(&self) -> f64 {
        self.templates.mana_rule.mana_per_attack
    }

    /// Takes a clone of the RNG stream for use inside a scope that also
    /// needs an immutable borrow of `self` (e.g. target selection, which
    /// reads the unit list). Must be paired with [`commit_rng`] once the
    /// immutable borrows have ended, so the draws actually advance the
    /// single shared stream.
    pub fn rng_snapshot(&self) -> GameRng {
        self.rng.clone()
    }

    pub fn commit_rng(&mut self, rng: GameRng) {
        self.rng = rng;
    }

    pub fn gain_mana(&mut self, unit_id: &str, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        let Some(unit) = self.unit_mut(unit_id) else { return };
        let before = unit.stats.current_mana;
        unit.gain_mana(amount, true);
        let after = unit.stats.current_mana;
        if after != before {
            self.log.push(
                self.tick,
                EventType::UnitManaGain,
                Some(unit_id.to_string()),
                None,
                Some(json!({"amount": after - before})),
            );
        }
    }
}
