//! Target selectors: polymorphic candidate pickers used both by a unit's
//! default auto-attack target and by ability `target_type`.

use crate::model::stats::Stat;
use crate::model::unit::Unit;
use crate::rng::GameRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "selector", rename_all = "snake_case")]
pub enum TargetSelector {
    Nearest { max_range: Option<i32> },
    Farthest { max_range: Option<i32> },
    LowestHpPercent { max_range: Option<i32> },
    LowestHpFlat { max_range: Option<i32> },
    HighestStat { stat: Stat, max_range: Option<i32> },
    Cluster { radius: i32, max_range: Option<i32> },
    Random { max_range: Option<i32> },
    Frontline { max_range: Option<i32> },
    Backline { max_range: Option<i32> },
    CurrentTarget { max_range: Option<i32> },
}

fn stat_value(unit: &Unit, stat: Stat) -> f64 {
    match stat {
        Stat::AttackDamage => unit.stats.attack_damage(),
        Stat::AbilityPower => unit.stats.ability_power(),
        Stat::AttackSpeed => unit.stats.attack_speed(),
        Stat::Hp => unit.stats.current_hp,
        Stat::MagicResist => unit.stats.magic_resist(),
        Stat::Armor => unit.stats.armor(),
        Stat::CritChance => unit.stats.crit_chance(),
        Stat::CritDamage => unit.stats.crit_damage(),
        Stat::Mana => unit.stats.current_mana,
        Stat::DodgeChance => unit.stats.dodge_chance(),
        Stat::Lifesteal => unit.stats.lifesteal(),
        Stat::SpellVamp => unit.stats.spell_vamp(),
        Stat::Omnivamp => unit.stats.omnivamp(),
    }
}

/// Filters candidates within `max_range` hexes of `source`, if set.
fn in_range<'a>(source: &Unit, candidates: &[&'a Unit], max_range: Option<i32>) -> Vec<&'a Unit> {
    match max_range {
        None => candidates.to_vec(),
        Some(r) => candidates
            .iter()
            .copied()
            .filter(|c| source.position.distance(c.position) <= r)
            .collect(),
    }
}

/// Sorts candidates by id for determinism, then breaks remaining ties via RNG.
fn pick_best<'a>(
    mut candidates: Vec<&'a Unit>,
    rng: &mut GameRng,
    mut key: impl FnMut(&Unit) -> f64,
    maximize: bool,
) -> Option<&'a Unit> {
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by(|a, b| a.id.cmp(&b.id));
    let best_value = candidates
        .iter()
        .map(|u| key(u))
        .fold(None::<f64>, |acc, v| match acc {
            None => Some(v),
            Some(cur) => Some(if maximize { cur.max(v) } else { cur.min(v) }),
        })
        .unwrap();
    let tied: Vec<&Unit> = candidates
        .into_iter()
        .filter(|u| (key(u) - best_value).abs() < 1e-9)
        .collect();
    if tied.len() == 1 {
        Some(tied[0])
    } else {
        Some(*rng.choice(&tied))
    }
}

/// Selects a target for `source` among `candidates` (already filtered to
/// the correct side by the caller). `source.team == 0` treats small `r`
/// as its own side, so frontline/backline are relative to that.
pub fn select<'a>(
    selector: &TargetSelector,
    source: &Unit,
    candidates: &[&'a Unit],
    rng: &mut GameRng,
) -> Option<&'a Unit> {
    match *selector {
        TargetSelector::Nearest { max_range } => {
            let pool = in_range(source, candidates, max_range);
            pick_best(pool, rng, |u| source.position.distance(u.position) as f64, false)
        }
        TargetSelector::Farthest { max_range } => {
            let pool = in_range(source, candidates, max_range);
            pick_best(pool, rng, |u| source.position.distance(u.position) as f64, true)
        }
        TargetSelector::LowestHpPercent { max_range } => {
            let pool = in_range(source, candidates, max_range);
            pick_best(pool, rng, |u| u.stats.hp_percent(), false)
        }
        TargetSelector::LowestHpFlat { max_range } => {
            let pool = in_range(source, candidates, max_range);
            pick_best(pool, rng, |u| u.stats.current_hp, false)
        }
        TargetSelector::HighestStat { stat, max_range } => {
            let pool = in_range(source, candidates, max_range);
            pick_best(pool, rng, |u| stat_value(u, stat), true)
        }
        TargetSelector::Cluster { radius, max_range } => {
            let pool = in_range(source, candidates, max_range);
            let counts: Vec<usize> = pool
                .iter()
                .map(|c| {
                    pool.iter()
                        .filter(|other| c.position.distance(other.position) <= radius)
                        .count()
                })
                .collect();
            pick_best(pool.clone(), rng, {
                let pool = pool.clone();
                move |u| {
                    let idx = pool.iter().position(|c| c.id == u.id).unwrap();
                    counts[idx] as f64
                }
            }, true)
        }
        TargetSelector::Random { max_range } => {
            let pool = in_range(source, candidates, max_range);
            if pool.is_empty() {
                None
            } else {
                let mut sorted = pool;
                sorted.sort_by(|a, b| a.id.cmp(&b.id));
                Some(*rng.choice(&sorted))
            }
        }
        TargetSelector::Frontline { max_range } => {
            let pool = in_range(source, candidates, max_range);
            pick_best(pool, rng, |u| frontline_key(source.team, u), true)
        }
        TargetSelector::Backline { max_range } => {
            let pool = in_range(source, candidates, max_range);
            pick_best(pool, rng, |u| frontline_key(source.team, u), false)
        }
        TargetSelector::CurrentTarget { max_range } => {
            if let Some(target_ref) = &source.target {
                if let Some(existing) = candidates.iter().find(|c| c.id == target_ref.id) {
                    let ok_range = max_range
                        .map(|r| source.position.distance(existing.position) <= r)
                        .unwrap_or(true);
                    if existing.is_alive() && ok_range {
                        return Some(existing);
                    }
                }
            }
            select(
                &TargetSelector::Nearest { max_range },
                source,
                candidates,
                rng,
            )
        }
    }
}

/// Smaller `r` is "more frontline" for team 0; larger `r` is "more
/// frontline" for team 1 (the two teams face each other across the grid).
fn frontline_key(source_team: u8, candidate: &Unit) -> f64 {
    if source_team == 0 {
        -(candidate.position.r as f64)
    } else {
        candidate.position.r as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stats::{StatBlock, UnitStats};
    use crate::model::status::StatusBag;
    use crate::model::unit::UnitScratch;
    use crate::state_machine::UnitStateMachine;
    use crate::hex::HexCoord;

    fn make_unit(id: &str, team: u8, pos: HexCoord, hp: f64) -> Unit {
        Unit {
            id: id.to_string(),
            base_id: id.to_string(),
            name: id.to_string(),
            team,
            star_level: 1,
            position: pos,
            stats: UnitStats::new(
                StatBlock { hp, attack_damage: 10.0, ..Default::default() },
                1,
                100.0,
                0.0,
            ),
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
    fn nearest_picks_closest_by_distance() {
        let source = make_unit("s", 0, HexCoord::new(0, 0), 100.0);
        let a = make_unit("a", 1, HexCoord::new(5, 0), 100.0);
        let b = make_unit("b", 1, HexCoord::new(1, 0), 100.0);
        let candidates = vec![&a, &b];
        let mut rng = GameRng::new(1);
        let picked = select(&TargetSelector::Nearest { max_range: None }, &source, &candidates, &mut rng);
        assert_eq!(picked.unwrap().id, "b");
    }

    #[test]
    fn lowest_hp_percent_picks_lowest() {
        let source = make_unit("s", 0, HexCoord::new(0, 0), 100.0);
        let a = make_unit("a", 1, HexCoord::new(1, 0), 90.0);
        let b = make_unit("b", 1, HexCoord::new(1, 1), 10.0);
        let candidates = vec![&a, &b];
        let mut rng = GameRng::new(1);
        let picked = select(&TargetSelector::LowestHpPercent { max_range: None }, &source, &candidates, &mut rng);
        assert_eq!(picked.unwrap().id, "b");
    }

    #[test]
    fn max_range_filters_out_of_range_candidates() {
        let source = make_unit("s", 0, HexCoord::new(0, 0), 100.0);
        let far = make_unit("far", 1, HexCoord::new(10, 0), 100.0);
        let candidates = vec![&far];
        let mut rng = GameRng::new(1);
        let picked = select(&TargetSelector::Nearest { max_range: Some(2) }, &source, &candidates, &mut rng);
        assert!(picked.is_none());
    }
}
