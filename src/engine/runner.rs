//! Calendarization entry point.
//!
//! # Pipeline (per customer)
//!
//! 1. Resolve the persona cap and its source.
//! 2. Filter the catalog by eligibility (once).
//! 3. Schedule week by week against fresh per-customer state.
//! 4. Build one decision-log row per catalog activity.
//!
//! Customers never share state, so each run is independent; they are
//! processed in customer-ID order and both output tables are sorted before
//! they are returned.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::models::{
    planning_weeks, ActivityDefinition, CalendarEntry, CustomerProfile, DecisionLogEntry,
    WeekSlot,
};
use crate::validation::validate_input;

use super::caps::resolve_cap;
use super::decision_log::{build_decision_log, DecisionTrail};
use super::eligibility::filter_eligible;
use super::scheduler::WeeklyScheduler;
use super::state::SchedulingState;

/// Output of a calendarization run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnginePlan {
    /// Committed (customer, week) assignments.
    pub calendar: Vec<CalendarEntry>,
    /// One audit row per (customer, activity).
    pub decision_log: Vec<DecisionLogEntry>,
}

/// Calendar row as exported: reason codes pipe-joined.
#[derive(Serialize)]
struct CalendarRecord<'a> {
    customer_id: &'a str,
    week_bucket: &'a str,
    month_bucket: &'a str,
    activity_id: &'a str,
    category: &'a str,
    sub_category: &'a str,
    channel: &'a str,
    owner_type: &'a str,
    reason_codes: String,
}

impl EnginePlan {
    /// Sorts the calendar by (customer, week, activity) and the decision
    /// log by (customer, activity, stage, reason code).
    pub fn sort(&mut self) {
        self.calendar.sort_by(|a, b| {
            (&a.customer_id, &a.week_bucket, &a.activity_id).cmp(&(
                &b.customer_id,
                &b.week_bucket,
                &b.activity_id,
            ))
        });
        self.decision_log.sort_by(|a, b| {
            (
                &a.customer_id,
                &a.activity_id,
                a.stage.as_str(),
                a.reason_code.as_str(),
            )
                .cmp(&(
                    &b.customer_id,
                    &b.activity_id,
                    b.stage.as_str(),
                    b.reason_code.as_str(),
                ))
        });
    }

    /// Calendar table as a JSON array of records.
    pub fn calendar_records_json(&self) -> Result<String, serde_json::Error> {
        let records: Vec<CalendarRecord<'_>> = self
            .calendar
            .iter()
            .map(|e| CalendarRecord {
                customer_id: &e.customer_id,
                week_bucket: &e.week_bucket,
                month_bucket: &e.month_bucket,
                activity_id: &e.activity_id,
                category: &e.category,
                sub_category: &e.sub_category,
                channel: &e.channel,
                owner_type: &e.owner_type,
                reason_codes: e.reason_codes_joined(),
            })
            .collect();
        serde_json::to_string_pretty(&records)
    }

    /// Decision-log table as a JSON array of records.
    pub fn decision_log_records_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.decision_log)
    }
}

/// Weekly engagement calendar engine.
///
/// A pure function of its configuration and inputs: the same customers,
/// activities and reference date always produce the same plan.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_engagement::config::EngineConfig;
/// use u_engagement::engine::CalendarEngine;
/// use u_engagement::models::{ActivityDefinition, CustomerProfile, Outcome};
///
/// let customers = vec![CustomerProfile::new("C1").with_persona("Lion")];
/// let activities = vec![
///     ActivityDefinition::new("A1", "Servicing").with_priority(5).with_gaps(2, 0),
///     ActivityDefinition::new("A2", "Servicing").with_personas(&["Deer"]),
/// ];
///
/// let engine = CalendarEngine::new(EngineConfig::default().with_horizon_weeks(4));
/// let reference = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
/// let plan = engine.run(&customers, &activities, reference);
///
/// let weeks: Vec<&str> = plan.calendar.iter().map(|e| e.week_bucket.as_str()).collect();
/// assert_eq!(weeks, vec!["2024-W01", "2024-W03"]);
/// assert_eq!(plan.decision_log.len(), 2);
/// assert_eq!(plan.decision_log[0].result, Outcome::Included);
/// assert_eq!(plan.decision_log[1].result, Outcome::Excluded);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CalendarEngine {
    config: EngineConfig,
}

impl CalendarEngine {
    /// Creates an engine over the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs the calendarization pass over every customer.
    ///
    /// Never fails: each (customer, activity) pair ends as an INCLUDED or
    /// EXCLUDED decision-log row.
    pub fn run(
        &self,
        customers: &[CustomerProfile],
        activities: &[ActivityDefinition],
        reference_date: NaiveDate,
    ) -> EnginePlan {
        let weeks = planning_weeks(reference_date, self.config.horizon_weeks);

        let mut ordered: Vec<&CustomerProfile> = customers.iter().collect();
        ordered.sort_by(|a, b| a.customer_id.cmp(&b.customer_id));

        let mut plan = EnginePlan::default();
        for customer in ordered {
            let customer_plan = self.plan_customer(customer, activities, &weeks);
            plan.calendar.extend(customer_plan.calendar);
            plan.decision_log.extend(customer_plan.decision_log);
        }
        plan.sort();

        info!(
            customers = customers.len(),
            activities = activities.len(),
            weeks = weeks.len(),
            entries = plan.calendar.len(),
            log_rows = plan.decision_log.len(),
            "calendarization complete"
        );
        plan
    }

    /// Validates the input tables, then runs.
    pub fn run_validated(
        &self,
        customers: &[CustomerProfile],
        activities: &[ActivityDefinition],
        reference_date: NaiveDate,
    ) -> Result<EnginePlan, EngineError> {
        validate_input(customers, activities)?;
        Ok(self.run(customers, activities, reference_date))
    }

    /// Plans a single customer over the given weeks (unsorted output).
    pub fn plan_customer(
        &self,
        customer: &CustomerProfile,
        activities: &[ActivityDefinition],
        weeks: &[WeekSlot],
    ) -> EnginePlan {
        let cap = resolve_cap(customer, &self.config);
        let mut trail = DecisionTrail::new();
        let eligible = filter_eligible(customer, activities, &mut trail);

        debug!(
            customer_id = %customer.customer_id,
            cap = cap.cap,
            cap_source = %cap.source,
            eligible = eligible.len(),
            "customer planning started"
        );

        let mut state = SchedulingState::new(cap.cap, cap.source);
        let calendar = WeeklyScheduler::new(&self.config).schedule(
            customer,
            &eligible,
            weeks,
            &cap,
            &mut state,
            &mut trail,
        );
        let decision_log = build_decision_log(customer, activities, &trail, cap.source);

        EnginePlan {
            calendar,
            decision_log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CapSource, Outcome, ReasonCode, RepeatPenaltyMode, Stage};

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn engine(weeks: usize) -> CalendarEngine {
        CalendarEngine::new(EngineConfig::default().with_horizon_weeks(weeks))
    }

    fn row<'a>(plan: &'a EnginePlan, customer: &str, activity: &str) -> &'a DecisionLogEntry {
        plan.decision_log
            .iter()
            .find(|r| r.customer_id == customer && r.activity_id == activity)
            .unwrap()
    }

    #[test]
    fn test_completeness() {
        let customers = vec![
            CustomerProfile::new("C2").with_persona("Hawk"),
            CustomerProfile::new("C1").with_persona("Lion"),
            CustomerProfile::new("C3"),
        ];
        let activities = vec![
            ActivityDefinition::new("A1", "Servicing"),
            ActivityDefinition::new("A2", "Growth & Review").with_personas(&["Lion"]),
            ActivityDefinition::new("A3", "Maturity").with_life_stages(&["Retiree"]),
        ];
        let plan = engine(8).run(&customers, &activities, reference());
        assert_eq!(plan.decision_log.len(), 9);

        let keys: Vec<(&str, &str)> = plan
            .decision_log
            .iter()
            .map(|r| (r.customer_id.as_str(), r.activity_id.as_str()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_calendar_sorted() {
        let customers = vec![
            CustomerProfile::new("C2").with_persona("Lion"),
            CustomerProfile::new("C1").with_persona("Lion"),
        ];
        let activities = vec![ActivityDefinition::new("A1", "Servicing")];
        let plan = engine(3).run(&customers, &activities, reference());
        assert_eq!(plan.calendar.len(), 6);
        assert_eq!(plan.calendar[0].customer_id, "C1");
        assert_eq!(plan.calendar[2].week_bucket, "2024-W03");
        assert_eq!(plan.calendar[3].customer_id, "C2");
    }

    #[test]
    fn test_cap_source_precedence() {
        let config = EngineConfig::default()
            .with_horizon_weeks(2)
            .with_life_stage_cap("Early Nester", 10)
            .with_life_stage_cap("Retiree", 10);
        let customers = vec![
            CustomerProfile::new("C1").with_persona("Lion").with_life_stage("Early Nester"),
            CustomerProfile::new("C2").with_persona("Fox").with_life_stage("Retiree"),
            CustomerProfile::new("C3").with_persona("Fox").with_life_stage("Student"),
        ];
        let activities = vec![ActivityDefinition::new("A1", "Servicing")];
        let plan = CalendarEngine::new(config).run(&customers, &activities, reference());

        assert!(row(&plan, "C1", "A1").details.ends_with("cap_source: SAFARI"));
        assert!(row(&plan, "C2", "A1").details.ends_with("cap_source: LIFESTAGE"));
        let c3 = row(&plan, "C3", "A1");
        assert!(c3.details.ends_with("cap_source: DEFAULT"));
        assert!(c3.details.contains("WARN_CAP_FALLBACK_DEFAULT"));

        let c3_entries: Vec<&CalendarEntry> =
            plan.calendar.iter().filter(|e| e.customer_id == "C3").collect();
        assert!(c3_entries
            .iter()
            .all(|e| e.reason_codes.contains(&ReasonCode::WarnCapFallbackDefault)));
        assert!(plan
            .calendar
            .iter()
            .filter(|e| e.customer_id != "C3")
            .all(|e| !e.reason_codes.contains(&ReasonCode::WarnCapFallbackDefault)));
        assert_eq!(CapSource::Lifestage.as_str(), "LIFESTAGE");
    }

    #[test]
    fn test_hard_variety_collision_scenario() {
        let customers = vec![CustomerProfile::new("C1").with_persona("Lion")];
        let activities = vec![
            ActivityDefinition::new("A1", "Servicing").with_variety("K1", RepeatPenaltyMode::Hard),
            ActivityDefinition::new("A2", "Servicing").with_variety("K1", RepeatPenaltyMode::Hard),
        ];
        let plan = engine(52).run(&customers, &activities, reference());
        assert!(plan.calendar.iter().all(|e| e.activity_id == "A1"));
        let r = row(&plan, "C1", "A2");
        assert_eq!(r.result, Outcome::Excluded);
        assert_eq!(r.reason_code, ReasonCode::FailVarietyKeyMonthHard);
        assert_eq!(r.stage, Stage::Schedule);
    }

    #[test]
    fn test_channel_owner_mismatch_scenario() {
        let customers = vec![CustomerProfile::new("C1").with_persona("Lion")];
        let activities = vec![ActivityDefinition::new("A1", "Servicing")
            .with_channels(&["Email", "WhatsApp"], "Email")
            .with_requires_human(true)];
        let plan = engine(4).run(&customers, &activities, reference());
        assert!(plan.calendar.is_empty());
        assert_eq!(
            row(&plan, "C1", "A1").reason_code,
            ReasonCode::FailChannelOwnerMapping
        );
    }

    #[test]
    fn test_zero_horizon_falls_back() {
        let customers = vec![CustomerProfile::new("C1")];
        let activities = vec![ActivityDefinition::new("A1", "Servicing")];
        let plan = engine(0).run(&customers, &activities, reference());
        assert!(plan.calendar.is_empty());
        let r = row(&plan, "C1", "A1");
        assert_eq!(r.stage, Stage::Cap);
        assert_eq!(r.reason_code, ReasonCode::FailCategoryCap);
        assert_eq!(r.details, "No decision reached");
    }

    #[test]
    fn test_determinism() {
        let customers = vec![
            CustomerProfile::new("C1").with_persona("Lion"),
            CustomerProfile::new("C2").with_persona("Deer").with_kids("Y", "0-5"),
        ];
        let activities = vec![
            ActivityDefinition::new("A1", "Policy Journey")
                .with_priority(3)
                .with_theme("T1")
                .with_gaps(0, 3),
            ActivityDefinition::new("A2", "Growth & Review").with_priority(4),
            ActivityDefinition::new("A3", "Everyday Life & Learning")
                .with_variety("K", RepeatPenaltyMode::Soft)
                .with_kids_flags(&["Y"]),
        ];
        let e = engine(20);
        let a = e.run(&customers, &activities, reference());
        let b = e.run(&customers, &activities, reference());
        assert_eq!(a, b);
        assert_eq!(
            a.calendar_records_json().unwrap(),
            b.calendar_records_json().unwrap()
        );
        assert_eq!(
            a.decision_log_records_json().unwrap(),
            b.decision_log_records_json().unwrap()
        );
    }

    #[test]
    fn test_records_json_columns() {
        let customers = vec![CustomerProfile::new("C1").with_persona("Lion")];
        let activities =
            vec![ActivityDefinition::new("A1", "Servicing").with_name("Policy check-in")];
        let plan = engine(1).run(&customers, &activities, reference());

        let calendar: serde_json::Value =
            serde_json::from_str(&plan.calendar_records_json().unwrap()).unwrap();
        let first = &calendar[0];
        assert_eq!(first["customer_id"], "C1");
        assert_eq!(first["week_bucket"], "2024-W01");
        assert_eq!(first["owner_type"], "Digital");
        assert_eq!(
            first["reason_codes"],
            "PASS_ELIGIBILITY|PASS_MODIFIER|PASS_CAP|PASS_SCHEDULE"
        );

        let log: serde_json::Value =
            serde_json::from_str(&plan.decision_log_records_json().unwrap()).unwrap();
        assert_eq!(log[0]["activity_name"], "Policy check-in");
        assert_eq!(log[0]["result"], "INCLUDED");
        assert_eq!(log[0]["stage"], "SCHEDULE");
        assert_eq!(log[0]["reason_code"], "PASS_SCHEDULE");
    }

    #[test]
    fn test_run_validated_rejects_bad_input() {
        let customers = vec![CustomerProfile::new("C1"), CustomerProfile::new("C1")];
        let activities =
            vec![ActivityDefinition::new("A1", "Servicing").with_channels(&[], "Email")];
        let err = engine(4)
            .run_validated(&customers, &activities, reference())
            .unwrap_err();
        match err {
            EngineError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_run_validated_ok() {
        let customers = vec![CustomerProfile::new("C1").with_persona("Lion")];
        let activities = vec![ActivityDefinition::new("A1", "Servicing")];
        let plan = engine(2)
            .run_validated(&customers, &activities, reference())
            .unwrap();
        assert_eq!(plan.calendar.len(), 2);
    }
}
