//! Property checks over randomised catalogs and customer bases.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rand::prelude::IndexedRandom;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use u_engagement::config::EngineConfig;
use u_engagement::engine::{resolve_cap, CalendarEngine, CalendarKpi, EnginePlan};
use u_engagement::models::{ActivityDefinition, CustomerProfile, Outcome, RepeatPenaltyMode};

const PERSONAS: [&str; 5] = ["Lion", "Hawk", "Elephant", "Deer", "Fox"];
const LIFE_STAGES: [&str; 4] = ["Young Adult", "Early Nester", "Established", "Retiree"];
const CATEGORIES: [&str; 9] = [
    "Everyday Life & Learning",
    "Policy Journey",
    "Trust & Touchpoints",
    "Loyalty, Rewards & Access",
    "Community & Connections",
    "Growth & Review",
    "Maturity",
    "Servicing",
    "Renewal",
];
const CHANNELS: [&str; 5] = ["Email", "SMS", "App", "Call", "Branch"];
const THEMES: [&str; 4] = ["", "Health", "Savings", "Family"];
const VARIETY_KEYS: [&str; 4] = ["", "K1", "K2", "K3"];

fn random_customers(rng: &mut SmallRng, n: usize) -> Vec<CustomerProfile> {
    (0..n)
        .map(|i| {
            CustomerProfile::new(format!("C{i:03}"))
                .with_persona(*PERSONAS.choose(rng).unwrap())
                .with_life_stage(*LIFE_STAGES.choose(rng).unwrap())
                .with_kids(if rng.random_bool(0.5) { "Y" } else { "N" }, "6-15")
                .with_percent_surrenders(if rng.random_bool(0.2) { 0.5 } else { 0.0 })
        })
        .collect()
}

fn random_catalog(rng: &mut SmallRng, n: usize) -> Vec<ActivityDefinition> {
    (0..n)
        .map(|i| {
            let channels: Vec<&str> = CHANNELS
                .iter()
                .copied()
                .filter(|_| rng.random_bool(0.5))
                .collect();
            let channels = if channels.is_empty() { vec!["Email"] } else { channels };
            let preferred = *channels.choose(rng).unwrap();
            let mode = if rng.random_bool(0.5) {
                RepeatPenaltyMode::Hard
            } else {
                RepeatPenaltyMode::Soft
            };

            let category = *CATEGORIES.choose(rng).unwrap();
            let mut activity = ActivityDefinition::new(format!("A{i:03}"), category)
                .with_priority(rng.random_range(0..10))
                .with_theme(*THEMES.choose(rng).unwrap())
                .with_gaps(rng.random_range(0..6), rng.random_range(0..4))
                .with_variety(*VARIETY_KEYS.choose(rng).unwrap(), mode)
                .with_channels(&channels, preferred)
                .with_requires_human(rng.random_bool(0.2))
                .with_surrender_exclusion(rng.random_bool(0.1));
            if rng.random_bool(0.3) {
                activity = activity.with_personas(&[*PERSONAS.choose(rng).unwrap()]);
            }
            if rng.random_bool(0.2) {
                activity = activity.with_kids_flags(&["Y"]);
            }
            activity
        })
        .collect()
}

type Scenario = (
    EngineConfig,
    Vec<CustomerProfile>,
    Vec<ActivityDefinition>,
    EnginePlan,
);

fn scenario(seed: u64) -> Scenario {
    let mut rng = SmallRng::seed_from_u64(seed);
    let customers = random_customers(&mut rng, 12);
    let activities = random_catalog(&mut rng, 20);
    let config = EngineConfig::default().with_life_stage_cap("Retiree", 10);
    let reference = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
    let plan = CalendarEngine::new(config.clone()).run(&customers, &activities, reference);
    (config, customers, activities, plan)
}

const SEEDS: [u64; 5] = [1, 7, 42, 1234, 98765];

#[test]
fn test_decision_log_is_complete() {
    for seed in SEEDS {
        let (_, customers, activities, plan) = scenario(seed);
        let kpi = CalendarKpi::calculate(&plan);
        assert!(kpi.coverage_is_complete(customers.len(), activities.len()));

        let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
        for row in &plan.decision_log {
            *seen
                .entry((row.customer_id.as_str(), row.activity_id.as_str()))
                .or_insert(0) += 1;
            assert_ne!(row.result, Outcome::Deferred);
        }
        assert_eq!(seen.len(), customers.len() * activities.len());
        assert!(seen.values().all(|&n| n == 1));
    }
}

#[test]
fn test_included_rows_match_calendar() {
    for seed in SEEDS {
        let (_, _, _, plan) = scenario(seed);
        for row in &plan.decision_log {
            let scheduled = plan
                .calendar
                .iter()
                .any(|e| e.customer_id == row.customer_id && e.activity_id == row.activity_id);
            assert_eq!(scheduled, row.result == Outcome::Included, "seed {seed}");
        }
    }
}

#[test]
fn test_persona_cap_respected() {
    for seed in SEEDS {
        let (config, customers, _, plan) = scenario(seed);
        let kpi = CalendarKpi::calculate(&plan);
        for customer in &customers {
            let cap = resolve_cap(customer, &config).cap as usize;
            let count = kpi
                .entries_by_customer
                .get(&customer.customer_id)
                .copied()
                .unwrap_or(0);
            assert!(count <= cap, "seed {seed}: {} has {count} > {cap}", customer.customer_id);
        }
    }
}

#[test]
fn test_category_cap_respected() {
    for seed in SEEDS {
        let (config, _, _, plan) = scenario(seed);
        let mut counts: BTreeMap<(&str, &str), u32> = BTreeMap::new();
        for e in &plan.calendar {
            *counts
                .entry((e.customer_id.as_str(), e.category.as_str()))
                .or_insert(0) += 1;
        }
        for ((_, category), count) in counts {
            if let Some(max) = config.category_rule(category).max_per_year {
                assert!(count <= max, "seed {seed}: {category} scheduled {count} > {max}");
            }
        }
    }
}

#[test]
fn test_one_entry_per_customer_week() {
    for seed in SEEDS {
        let (_, _, _, plan) = scenario(seed);
        let mut slots: Vec<(&str, &str)> = plan
            .calendar
            .iter()
            .map(|e| (e.customer_id.as_str(), e.week_bucket.as_str()))
            .collect();
        let total = slots.len();
        slots.dedup();
        assert_eq!(slots.len(), total);
    }
}

#[test]
fn test_activity_gap_respected() {
    for seed in SEEDS {
        let (config, _, activities, plan) = scenario(seed);
        let gaps: HashMap<&str, u32> = activities
            .iter()
            .map(|a| (a.activity_id.as_str(), a.min_gap_activity_weeks))
            .collect();
        let week_index: HashMap<String, usize> = u_engagement::models::planning_weeks(
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            config.horizon_weeks,
        )
        .into_iter()
        .map(|w| (w.week_bucket, w.index))
        .collect();

        let mut last: HashMap<(&str, &str), usize> = HashMap::new();
        for e in &plan.calendar {
            let week = week_index[&e.week_bucket];
            let key = (e.customer_id.as_str(), e.activity_id.as_str());
            if let Some(prev) = last.insert(key, week) {
                let g = gaps[e.activity_id.as_str()] as usize;
                assert!(week - prev >= g, "seed {seed}: {key:?} weeks {prev} and {week}, gap {g}");
            }
        }
    }
}

#[test]
fn test_hard_variety_once_per_month() {
    for seed in SEEDS {
        let (_, _, activities, plan) = scenario(seed);
        let hard_keys: HashMap<&str, &str> = activities
            .iter()
            .filter(|a| {
                a.repeat_penalty_mode == RepeatPenaltyMode::Hard && !a.variety_key.is_empty()
            })
            .map(|a| (a.activity_id.as_str(), a.variety_key.as_str()))
            .collect();

        let mut seen: HashMap<(&str, &str, &str), usize> = HashMap::new();
        for e in &plan.calendar {
            if let Some(&key) = hard_keys.get(e.activity_id.as_str()) {
                *seen
                    .entry((e.customer_id.as_str(), key, e.month_bucket.as_str()))
                    .or_insert(0) += 1;
            }
        }
        assert!(seen.values().all(|&n| n == 1), "seed {seed}: {seen:?}");
    }
}

#[test]
fn test_human_delivery_uses_human_channels() {
    for seed in SEEDS {
        let (config, _, activities, plan) = scenario(seed);
        let by_id: HashMap<&str, &ActivityDefinition> =
            activities.iter().map(|a| (a.activity_id.as_str(), a)).collect();
        for e in &plan.calendar {
            let activity = by_id[e.activity_id.as_str()];
            assert!(activity.channels.contains(&e.channel));
            if activity.requires_human {
                assert!(config.is_human_channel(&e.channel));
            }
            assert_eq!(e.owner_type, config.owner_for(&e.channel));
        }
    }
}

#[test]
fn test_runs_are_deterministic() {
    for seed in SEEDS {
        let (_, _, _, a) = scenario(seed);
        let (_, _, _, b) = scenario(seed);
        assert_eq!(a.calendar_records_json().unwrap(), b.calendar_records_json().unwrap());
        assert_eq!(
            a.decision_log_records_json().unwrap(),
            b.decision_log_records_json().unwrap()
        );
    }
}

#[test]
fn test_input_order_does_not_matter() {
    let (config, mut customers, activities, plan) = scenario(42);
    customers.reverse();
    let reference = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
    let reversed = CalendarEngine::new(config).run(&customers, &activities, reference);
    assert_eq!(plan, reversed);
}
