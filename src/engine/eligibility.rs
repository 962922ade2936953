//! Eligibility filter.
//!
//! Reduces the catalog to the activities a customer may ever receive.
//! Checks run in a fixed order and stop at the first failure:
//!
//! | # | Check | Failure | Stage |
//! |---|-------|---------|-------|
//! | 1 | life stage | FAIL_LIFESTAGE | ELIGIBILITY |
//! | 2 | persona | FAIL_SAFARI | ELIGIBILITY |
//! | 3 | renewal bucket | FAIL_RENEWAL_BUCKET | ELIGIBILITY |
//! | 4 | kids flag | FAIL_KIDS | MODIFIER |
//! | 5 | kids age band | FAIL_KIDS_AGE | MODIFIER |
//! | 6 | PTI band | FAIL_PTI | MODIFIER |
//! | 7 | city tier | FAIL_CITY | MODIFIER |
//! | 8 | occupation | FAIL_OCCUPATION | MODIFIER |
//! | 9 | surrender exclusion | FAIL_SURRENDER_PCT | MODIFIER |
//!
//! The filter runs once per customer. A failure here is terminal.

use crate::models::{admits, ActivityDefinition, CustomerProfile, Failure, ReasonCode, Stage};

use super::decision_log::DecisionTrail;

/// Reason codes carried by every activity that passes the filter.
pub const BASE_PASS_CODES: [ReasonCode; 2] =
    [ReasonCode::PassEligibility, ReasonCode::PassModifier];

/// Runs the ordered checks for one (customer, activity) pair.
pub fn check_eligibility(
    customer: &CustomerProfile,
    activity: &ActivityDefinition,
) -> Result<(), Failure> {
    let membership = [
        (
            &activity.life_stages,
            customer.life_stage.as_str(),
            Stage::Eligibility,
            ReasonCode::FailLifestage,
            "Life stage",
        ),
        (
            &activity.personas,
            customer.safari_persona.as_str(),
            Stage::Eligibility,
            ReasonCode::FailSafari,
            "Safari persona",
        ),
        (
            &activity.renewal_buckets,
            customer.renewal_bucket.as_str(),
            Stage::Eligibility,
            ReasonCode::FailRenewalBucket,
            "Renewal bucket",
        ),
        (
            &activity.kids_flags,
            customer.kids_flag.as_str(),
            Stage::Modifier,
            ReasonCode::FailKids,
            "Kids flag",
        ),
        (
            &activity.kids_age_bands,
            customer.kids_age_band.as_str(),
            Stage::Modifier,
            ReasonCode::FailKidsAge,
            "Kids age band",
        ),
        (
            &activity.pti_bands,
            customer.pti_band.as_str(),
            Stage::Modifier,
            ReasonCode::FailPti,
            "PTI band",
        ),
        (
            &activity.city_tiers,
            customer.city_tier.as_str(),
            Stage::Modifier,
            ReasonCode::FailCity,
            "City tier",
        ),
        (
            &activity.occupations,
            customer.occupation_type.as_str(),
            Stage::Modifier,
            ReasonCode::FailOccupation,
            "Occupation",
        ),
    ];

    for (allowed, value, stage, code, label) in membership {
        if !admits(allowed, value) {
            return Err(Failure::new(stage, code, format!("{label} '{value}' not eligible")));
        }
    }

    if activity.exclude_if_high_surrender && customer.percent_surrenders > 0.0 {
        return Err(Failure::new(
            Stage::Modifier,
            ReasonCode::FailSurrenderPct,
            format!(
                "Surrender ratio {:.2} excludes this activity",
                customer.percent_surrenders
            ),
        ));
    }

    Ok(())
}

/// Filters the catalog for one customer, recording each failure in `trail`.
///
/// Catalog order is preserved.
pub fn filter_eligible<'a>(
    customer: &CustomerProfile,
    activities: &'a [ActivityDefinition],
    trail: &mut DecisionTrail,
) -> Vec<&'a ActivityDefinition> {
    activities
        .iter()
        .filter(|activity| match check_eligibility(customer, activity) {
            Ok(()) => true,
            Err(failure) => {
                trail.record_failure(&activity.activity_id, failure);
                false
            }
        })
        .collect()
}
