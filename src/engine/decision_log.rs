//! Decision trail and decision-log construction.
//!
//! While a customer is scheduled, [`DecisionTrail`] collects per-activity
//! terminal facts: the first hard-check failure (eligibility and weekly
//! failures share one slot) and every committed week. After the last week
//! [`build_decision_log`] turns the trail into exactly one row per catalog
//! activity:
//!
//! | Trail state | Row |
//! |-------------|-----|
//! | committed at least once | SCHEDULE / INCLUDED / PASS_SCHEDULE |
//! | failed a hard check | that failure, EXCLUDED |
//! | neither | CAP / EXCLUDED / FAIL_CATEGORY_CAP fallback |

use std::collections::{BTreeSet, HashMap};

use crate::models::{
    ActivityDefinition, CapSource, CustomerProfile, DecisionLogEntry, Failure, Outcome,
    ReasonCode, Stage,
};

/// Terminal facts about one activity for one customer.
#[derive(Debug, Clone, Default)]
pub struct ActivityTrail {
    failure: Option<Failure>,
    included_weeks: Vec<String>,
    reason_codes: BTreeSet<&'static str>,
}

impl ActivityTrail {
    /// First recorded failure, if any.
    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    /// Week buckets in which the activity was committed.
    pub fn included_weeks(&self) -> &[String] {
        &self.included_weeks
    }

    /// Whether the activity was committed at least once.
    pub fn is_included(&self) -> bool {
        !self.included_weeks.is_empty()
    }
}

/// Per-customer collection of activity trails.
#[derive(Debug, Clone, Default)]
pub struct DecisionTrail {
    trails: HashMap<String, ActivityTrail>,
}

impl DecisionTrail {
    /// Creates an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hard-check failure. Only the first failure per activity
    /// is kept; later ones are ignored.
    pub fn record_failure(&mut self, activity_id: &str, failure: Failure) {
        let trail = self.trails.entry(activity_id.to_string()).or_default();
        if trail.failure.is_none() {
            trail.failure = Some(failure);
        }
    }

    /// Records a committed week.
    pub fn record_inclusion(&mut self, activity_id: &str, week_bucket: &str, codes: &[ReasonCode]) {
        let trail = self.trails.entry(activity_id.to_string()).or_default();
        trail.included_weeks.push(week_bucket.to_string());
        trail.reason_codes.extend(codes.iter().map(|c| c.as_str()));
    }

    /// Trail of an activity, if anything was recorded.
    pub fn get(&self, activity_id: &str) -> Option<&ActivityTrail> {
        self.trails.get(activity_id)
    }
}

/// Builds one decision-log row per catalog activity.
///
/// `activities` is the full catalog (before eligibility filtering).
pub fn build_decision_log(
    customer: &CustomerProfile,
    activities: &[ActivityDefinition],
    trail: &DecisionTrail,
    cap_source: CapSource,
) -> Vec<DecisionLogEntry> {
    activities
        .iter()
        .map(|activity| {
            let recorded = trail.get(&activity.activity_id);
            let (stage, result, reason_code, details) = match recorded {
                Some(t) if t.is_included() => (
                    Stage::Schedule,
                    Outcome::Included,
                    ReasonCode::PassSchedule,
                    format!(
                        "Included in weeks: {}; reasons: {}; cap_source: {}",
                        t.included_weeks.join(","),
                        t.reason_codes.iter().copied().collect::<Vec<_>>().join("|"),
                        cap_source
                    ),
                ),
                _ => match recorded.and_then(ActivityTrail::failure) {
                    Some(f) => (f.stage, Outcome::Excluded, f.reason_code, f.details.clone()),
                    None => (
                        Stage::Cap,
                        Outcome::Excluded,
                        ReasonCode::FailCategoryCap,
                        "No decision reached".to_string(),
                    ),
                },
            };
            DecisionLogEntry {
                customer_id: customer.customer_id.clone(),
                activity_id: activity.activity_id.clone(),
                activity_name: activity.name.clone(),
                category: activity.category.clone(),
                sub_category: activity.sub_category.clone(),
                stage,
                result,
                reason_code,
                details,
            }
        })
        .collect()
}
