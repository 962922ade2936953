//! Audit trail vocabulary and decision-log rows.
//!
//! Every (customer, activity) pair ends in exactly one [`DecisionLogEntry`].
//! Reason codes are a closed set of audit tokens; they render as the
//! upper-snake strings used in the output tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pipeline stage that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stage {
    /// Hard segment membership (life stage, persona, renewal bucket).
    Eligibility,
    /// Profile modifiers (kids, PTI, city, occupation, surrenders).
    Modifier,
    /// Persona and category quotas.
    Cap,
    /// Week-level spacing, variety and delivery rules.
    Schedule,
}

impl Stage {
    /// Table token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Eligibility => "ELIGIBILITY",
            Stage::Modifier => "MODIFIER",
            Stage::Cap => "CAP",
            Stage::Schedule => "SCHEDULE",
        }
    }
}

/// Final outcome of an activity for one customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    /// Scheduled at least once.
    Included,
    /// Never scheduled.
    Excluded,
    /// Postponed outside the horizon. Part of the table contract; the
    /// weekly engine resolves every activity to one of the other two.
    Deferred,
}

impl Outcome {
    /// Table token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Included => "INCLUDED",
            Outcome::Excluded => "EXCLUDED",
            Outcome::Deferred => "DEFERRED",
        }
    }
}

/// Provenance of a customer's total-activity quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CapSource {
    /// Persona-specific cap.
    Safari,
    /// Life-stage-specific cap.
    Lifestage,
    /// Configured default cap.
    Default,
}

impl CapSource {
    /// Table token.
    pub fn as_str(&self) -> &'static str {
        match self {
            CapSource::Safari => "SAFARI",
            CapSource::Lifestage => "LIFESTAGE",
            CapSource::Default => "DEFAULT",
        }
    }
}

/// Audit token explaining a pass, fail or advisory decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    PassEligibility,
    PassModifier,
    PassCap,
    PassSchedule,
    WarnCapFallbackDefault,
    FailLifestage,
    FailSafari,
    FailRenewalBucket,
    FailKids,
    FailKidsAge,
    FailPti,
    FailCity,
    FailOccupation,
    FailSurrenderPct,
    FailPersonaCap,
    FailCategoryCap,
    FailCategorySpacing,
    FailGapSameActivity,
    FailGapSameTheme,
    FailVarietyKeyMonthHard,
    FailChannelOwnerMapping,
}

impl ReasonCode {
    /// Every code, in declaration order.
    pub const ALL: [ReasonCode; 21] = [
        ReasonCode::PassEligibility,
        ReasonCode::PassModifier,
        ReasonCode::PassCap,
        ReasonCode::PassSchedule,
        ReasonCode::WarnCapFallbackDefault,
        ReasonCode::FailLifestage,
        ReasonCode::FailSafari,
        ReasonCode::FailRenewalBucket,
        ReasonCode::FailKids,
        ReasonCode::FailKidsAge,
        ReasonCode::FailPti,
        ReasonCode::FailCity,
        ReasonCode::FailOccupation,
        ReasonCode::FailSurrenderPct,
        ReasonCode::FailPersonaCap,
        ReasonCode::FailCategoryCap,
        ReasonCode::FailCategorySpacing,
        ReasonCode::FailGapSameActivity,
        ReasonCode::FailGapSameTheme,
        ReasonCode::FailVarietyKeyMonthHard,
        ReasonCode::FailChannelOwnerMapping,
    ];

    /// Table token.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::PassEligibility => "PASS_ELIGIBILITY",
            ReasonCode::PassModifier => "PASS_MODIFIER",
            ReasonCode::PassCap => "PASS_CAP",
            ReasonCode::PassSchedule => "PASS_SCHEDULE",
            ReasonCode::WarnCapFallbackDefault => "WARN_CAP_FALLBACK_DEFAULT",
            ReasonCode::FailLifestage => "FAIL_LIFESTAGE",
            ReasonCode::FailSafari => "FAIL_SAFARI",
            ReasonCode::FailRenewalBucket => "FAIL_RENEWAL_BUCKET",
            ReasonCode::FailKids => "FAIL_KIDS",
            ReasonCode::FailKidsAge => "FAIL_KIDS_AGE",
            ReasonCode::FailPti => "FAIL_PTI",
            ReasonCode::FailCity => "FAIL_CITY",
            ReasonCode::FailOccupation => "FAIL_OCCUPATION",
            ReasonCode::FailSurrenderPct => "FAIL_SURRENDER_PCT",
            ReasonCode::FailPersonaCap => "FAIL_PERSONA_CAP",
            ReasonCode::FailCategoryCap => "FAIL_CATEGORY_CAP",
            ReasonCode::FailCategorySpacing => "FAIL_CATEGORY_SPACING",
            ReasonCode::FailGapSameActivity => "FAIL_GAP_SAME_ACTIVITY",
            ReasonCode::FailGapSameTheme => "FAIL_GAP_SAME_THEME",
            ReasonCode::FailVarietyKeyMonthHard => "FAIL_VARIETY_KEY_MONTH_HARD",
            ReasonCode::FailChannelOwnerMapping => "FAIL_CHANNEL_OWNER_MAPPING",
        }
    }

    /// Whether this code records a hard-check failure.
    pub fn is_failure(&self) -> bool {
        self.as_str().starts_with("FAIL_")
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CapSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known reason code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reason code '{0}'")]
pub struct UnknownReasonCode(pub String);

impl FromStr for ReasonCode {
    type Err = UnknownReasonCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReasonCode::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownReasonCode(s.to_string()))
    }
}

/// A hard-check failure: where it happened, which rule, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Stage that rejected the activity.
    pub stage: Stage,
    /// Rule that rejected it.
    pub reason_code: ReasonCode,
    /// Free-text explanation.
    pub details: String,
}

impl Failure {
    /// Creates a failure record.
    pub fn new(stage: Stage, reason_code: ReasonCode, details: impl Into<String>) -> Self {
        Self {
            stage,
            reason_code,
            details: details.into(),
        }
    }
}

/// One audit row: the final outcome of an activity for a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    /// Customer evaluated.
    pub customer_id: String,
    /// Activity evaluated.
    pub activity_id: String,
    /// Activity display name.
    pub activity_name: String,
    /// Activity category.
    pub category: String,
    /// Activity sub-category.
    pub sub_category: String,
    /// Stage that decided the outcome.
    pub stage: Stage,
    /// Final outcome.
    pub result: Outcome,
    /// Deciding reason code.
    pub reason_code: ReasonCode,
    /// Free-text explanation.
    pub details: String,
}
