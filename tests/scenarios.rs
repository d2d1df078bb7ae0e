//! End-to-end battle scenarios exercising the public `run` entry point
//! (and, where a scenario needs to inspect mid-battle state directly, the
//! `setup`/`effects`/`traits_engine` internals) against known outcomes.

use std::collections::{BTreeMap, HashMap};

use hexbattle_sim::api::dto::TemplateBundle;
use hexbattle_sim::config::SimulationConfig;
use hexbattle_sim::effects::{apply, DamageScaling, Effect, EffectContext};
use hexbattle_sim::model::ability::{AbilityTemplate, Delivery};
use hexbattle_sim::model::stats::StatBlock;
use hexbattle_sim::model::status::DamageType;
use hexbattle_sim::model::trait_def::{TraitEffectTarget, TraitThreshold, TraitTemplate, TraitTriggerType};
use hexbattle_sim::model::template::UnitTemplate;
use hexbattle_sim::setup;
use hexbattle_sim::targeting::TargetSelector;
use hexbattle_sim::{run, RosterEntry, RunRequest};

fn unit_template(id: &str, hp: f64, attack_damage: f64, armor: f64, magic_resist: f64) -> UnitTemplate {
    UnitTemplate {
        id: id.to_string(),
        name: id.to_string(),
        traits: vec![],
        ability: None,
        attack_range: 1,
        stats: StatBlock {
            hp,
            attack_damage,
            armor,
            magic_resist,
            attack_speed: 1.0,
            ..Default::default()
        },
        max_mana: 0.0,
        start_mana: 0.0,
        cost: 1,
    }
}

fn roster_entry(template_id: &str, q: i32, r: i32) -> RosterEntry {
    RosterEntry { unit_template_id: template_id.to_string(), position: [q, r], star_level: 1, item_ids: vec![] }
}

#[test]
fn melee_mismatch_wins_outright() {
    let mut units = HashMap::new();
    units.insert("brute".to_string(), unit_template("brute", 500.0, 80.0, 0.0, 0.0));
    units.insert("weakling".to_string(), unit_template("weakling", 30.0, 5.0, 0.0, 0.0));

    let templates = TemplateBundle { units, ..Default::default() };
    let request = RunRequest {
        rosters: [vec![roster_entry("brute", 0, 0)], vec![roster_entry("weakling", 1, 0)]],
        seed: 42,
        config: SimulationConfig::default(),
        templates,
    };

    let output = run(request).expect("valid request");
    assert_eq!(output.winner_team, Some(0));
    assert!(output.survivors.iter().any(|id| id.starts_with("t0_")));
    assert!(output.survivors.iter().all(|id| !id.starts_with("t1_")));
}

#[test]
fn burn_deals_per_second_rate_divided_across_ticks() {
    let mut units = HashMap::new();
    units.insert("caster".to_string(), {
        let mut t = unit_template("caster", 500.0, 10.0, 0.0, 0.0);
        t.ability = Some("ignite".to_string());
        t.max_mana = 1.0;
        t.start_mana = 1.0;
        // Never lets the caster land a melee auto-attack (which would regain
        // mana and trigger a second cast, stacking a second burn on the tank).
        t.attack_range = 0;
        t
    });
    units.insert("tank".to_string(), unit_template("tank", 1000.0, 0.0, 1000.0, 1000.0));

    let mut abilities = HashMap::new();
    abilities.insert(
        "ignite".to_string(),
        AbilityTemplate {
            id: "ignite".to_string(),
            mana_cost: 1.0,
            cast_time: [0, 0, 0],
            effect_delay: [0, 0, 0],
            mana_lock: [0, 0, 0],
            target_type: TargetSelector::Nearest { max_range: None },
            delivery: Delivery::Instant,
            projectile_config: None,
            aoe_config: None,
            effects: vec![Effect::Burn { dps: 30.0, duration_ticks: 90 }],
        },
    );

    let templates = TemplateBundle { units, abilities, ..Default::default() };
    let mut config = SimulationConfig::default();
    config.ticks_per_second = 30;
    config.max_ticks = 200;

    let request = RunRequest {
        // Distance 3 keeps the tank out of melee range so only the burn hits it.
        rosters: [vec![roster_entry("caster", 0, 0)], vec![roster_entry("tank", 3, 0)]],
        seed: 7,
        config,
        templates,
    };

    let output = run(request).expect("valid request");
    let tank_id = "t1_0_tank";
    let last_damage = output
        .trace
        .events
        .iter()
        .filter(|e| e.unit_id.as_deref() == Some(tank_id))
        .filter(|e| matches!(e.event_type, hexbattle_sim::events::EventType::UnitDamage))
        .last()
        .expect("tank took at least one damage event");

    let hp_after = last_damage.data.as_ref().unwrap()["hp_after"].as_f64().unwrap();
    // 90 ticks of a 30 dps burn at 30 ticks/second is 1 hp per tick, 90 hp total.
    assert!((hp_after - 910.0).abs() < 1e-6, "expected 910.0 hp remaining, got {hp_after}");
}

#[test]
fn trait_threshold_replaces_rather_than_stacks() {
    let mut traits = HashMap::new();
    let mut thresholds = BTreeMap::new();
    thresholds.insert(
        3,
        TraitThreshold {
            trigger: TraitTriggerType::OnBattleStart,
            target: TraitEffectTarget::Holders,
            effects: vec![Effect::StatBuffPermanent { stat: hexbattle_sim::model::stats::Stat::Armor, flat: 20.0, percent: 0.0 }],
            at_tick: None,
            interval_ticks: None,
        },
    );
    thresholds.insert(
        4,
        TraitThreshold {
            trigger: TraitTriggerType::OnBattleStart,
            target: TraitEffectTarget::Holders,
            effects: vec![Effect::StatBuffPermanent { stat: hexbattle_sim::model::stats::Stat::Armor, flat: 40.0, percent: 0.0 }],
            at_tick: None,
            interval_ticks: None,
        },
    );
    traits.insert("guardian".to_string(), TraitTemplate { id: "guardian".to_string(), thresholds });

    let mut units = HashMap::new();
    for i in 0..4 {
        let id = format!("guard{i}");
        let mut t = unit_template(&id, 500.0, 10.0, 0.0, 0.0);
        t.traits = vec!["guardian".to_string()];
        units.insert(id, t);
    }

    let three_holders = vec![roster_entry("guard0", 0, 0), roster_entry("guard1", 1, 0), roster_entry("guard2", 2, 0)];
    let mut world_three = setup::build_world(
        TemplateBundle { units: units.clone(), traits: traits.clone(), ..Default::default() },
        &[three_holders, vec![]],
        1,
        SimulationConfig::default(),
    )
    .expect("valid roster");
    hexbattle_sim::traits_engine::apply_battle_start(&mut world_three);
    let armor_with_three = world_three.unit("t0_0_guard0").unwrap().stats.armor();

    let four_holders = vec![
        roster_entry("guard0", 0, 0),
        roster_entry("guard1", 1, 0),
        roster_entry("guard2", 2, 0),
        roster_entry("guard3", 3, 0),
    ];
    let mut world_four = setup::build_world(
        TemplateBundle { units, traits, ..Default::default() },
        &[four_holders, vec![]],
        1,
        SimulationConfig::default(),
    )
    .expect("valid roster");
    hexbattle_sim::traits_engine::apply_battle_start(&mut world_four);

    assert_eq!(armor_with_three, 20.0);
    let armor_with_four = world_four.unit("t0_0_guard0").unwrap().stats.armor();
    assert_eq!(armor_with_four, 40.0, "4 holders should replace the 3-holder bonus, not stack with it");
}

#[test]
fn execute_threshold_kills_regardless_of_computed_damage() {
    let mut units = HashMap::new();
    units.insert("finisher".to_string(), unit_template("finisher", 500.0, 1.0, 0.0, 0.0));
    units.insert("fortress".to_string(), unit_template("fortress", 1000.0, 0.0, 1000.0, 1000.0));

    let templates = TemplateBundle { units, ..Default::default() };
    let mut world = setup::build_world(
        templates,
        &[vec![roster_entry("finisher", 0, 0)], vec![roster_entry("fortress", 5, 0)]],
        1,
        SimulationConfig::default(),
    )
    .expect("valid roster");

    let caster_id = "t0_0_finisher".to_string();
    let target_id = "t1_0_fortress".to_string();
    world.unit_mut(&target_id).unwrap().stats.current_hp = 150.0; // 15% of 1000 max hp

    let effect = Effect::Damage {
        scaling: DamageScaling { base: 1.0, ..Default::default() },
        damage_type: DamageType::Physical,
        can_crit: false,
        can_dodge: false,
        falloff: None,
        execute_threshold: Some(0.20),
    };
    let ctx = EffectContext { caster_id, star_level: 1, targets: vec![target_id.clone()], epicenter: None };
    apply(&effect, &ctx, &mut world);

    assert!(!world.is_alive(&target_id), "target at 15% hp should die to a 20% execute threshold");
}
