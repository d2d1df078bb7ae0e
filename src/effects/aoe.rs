//! AoE shape resolution: which units on the board are affected.

use crate::hex::HexCoord;
use crate::model::ability::AoeConfig;
use crate::model::unit::Unit;
use std::f64::consts::PI;

/// Resolves which of `candidates` are inside the AoE anchored at
/// `primary_pos`, cast by a unit standing at `caster_pos`.
pub fn resolve_aoe<'a>(
    config: &AoeConfig,
    caster_pos: HexCoord,
    primary_pos: HexCoord,
    candidates: &[&'a Unit],
) -> Vec<&'a Unit> {
    match *config {
        AoeConfig::Circle { radius, includes_target } => candidates
            .iter()
            .copied()
            .filter(|u| {
                let in_radius = primary_pos.distance(u.position) <= radius;
                in_radius && (includes_target || u.position != primary_pos)
            })
            .collect(),
        AoeConfig::Cone { angle_degrees, range } => {
            let base_angle = caster_pos.angle_to(primary_pos);
            let half_angle = angle_degrees.to_radians() / 2.0;
            candidates
                .iter()
                .copied()
                .filter(|u| {
                    if u.position == caster_pos {
                        return false;
                    }
                    let within_range = caster_pos.distance(u.position) <= range;
                    let angle = caster_pos.angle_to(u.position);
                    let delta = angular_distance(base_angle, angle);
                    within_range && delta <= half_angle
                })
                .collect()
        }
        AoeConfig::Line { width, range } => {
            let line: Vec<HexCoord> = caster_pos.line_to(primary_pos);
            let mut hexes: Vec<HexCoord> = line.clone();
            if width > 0 {
                for hex in &line {
                    hexes.extend(hex.neighbors());
                }
            }
            candidates
                .iter()
                .copied()
                .filter(|u| {
                    caster_pos.distance(u.position) <= range.max(caster_pos.distance(primary_pos))
                        && hexes.contains(&u.position)
                })
                .collect()
        }
    }
}

fn angular_distance(a: f64, b: f64) -> f64 {
    let mut diff = (a - b).abs() % (2.0 * PI);
    if diff > PI {
        diff = 2.0 * PI - diff;
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stats::{StatBlock, UnitStats};
    use crate::model::status::StatusBag;
    use crate::model::unit::UnitScratch;
    use crate::state_machine::UnitStateMachine;

    fn make_unit(id: &str, pos: HexCoord) -> Unit {
        Unit {
            id: id.to_string(),
            base_id: id.to_string(),
            name: id.to_string(),
            team: 1,
            star_level: 1,
            position: pos,
            stats: UnitStats::new(StatBlock { hp: 100.0, ..Default::default() }, 1, 0.0, 0.0),
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
    fn circle_includes_hexes_within_radius() {
        let center = HexCoord::new(0, 0);
        let near = make_unit("near", HexCoord::new(1, 0));
        let far = make_unit("far", HexCoord::new(5, 0));
        let candidates = vec![&near, &far];
        let hit = resolve_aoe(&AoeConfig::Circle { radius: 2, includes_target: true }, HexCoord::new(-1, 0), center, &candidates);
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].id, "near");
    }

    #[test]
    fn circle_can_exclude_primary_target() {
        let center = HexCoord::new(2, 0);
        let target = make_unit("target", center);
        let candidates = vec![&target];
        let hit = resolve_aoe(&AoeConfig::Circle { radius: 1, includes_target: false }, HexCoord::new(0, 0), center, &candidates);
        assert!(hit.is_empty());
    }

    #[test]
    fn line_hits_units_on_the_path() {
        let caster = HexCoord::new(0, 0);
        let primary = HexCoord::new(3, 0);
        let on_path = make_unit("on_path", HexCoord::new(2, 0));
        let off_path = make_unit("off_path", HexCoord::new(2, 3));
        let candidates = vec![&on_path, &off_path];
        let hit = resolve_aoe(&AoeConfig::Line { width: 0, range: 3 }, caster, primary, &candidates);
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].id, "on_path");
    }
}
