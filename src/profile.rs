//! Customer-profile derivation.
//!
//! Builds the normalized [`CustomerProfile`]s the engine consumes from two
//! upstream extracts keyed by `CustomerID`:
//!
//! | Extract | Row | Keying |
//! |---------|-----|--------|
//! | policy | [`PolicyRecord`] | one row per policy; customers may repeat |
//! | engagement | [`EngagementRecord`] | exactly one row per customer |
//!
//! Policies of one customer are aggregated first (premiums summed, highest
//! income, latest issuance date), then the extracts are inner-joined and
//! every band is derived by a small pure function so each rule can be
//! tested on its own.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::CustomerProfile;
use crate::validation::{ValidationError, ValidationErrorKind};

/// Premium-to-income bands as (upper bound exclusive, label).
const PTI_BANDS: [(f64, &str); 3] = [(0.05, "Light"), (0.1, "Comfortable"), (0.2, "Heavy")];

const METRO_CITIES: [&str; 5] = ["Mumbai", "Delhi", "Bengaluru", "Chennai", "Hyderabad"];
const TIER1_CITIES: [&str; 2] = ["Pune", "Ahmedabad"];

const OCCUPATIONS: [&str; 6] = [
    "Salaried",
    "Business",
    "Professional",
    "Retired",
    "Homemaker",
    "Student",
];

const KIDS_RELATIONSHIPS: [&str; 3] = ["Son", "Daughter", "Child"];

/// Renewal buckets as (max policy months inclusive, label).
const RENEWAL_BUCKETS: [(i64, &str); 5] = [
    (24, "13M"),
    (36, "25M"),
    (48, "37M"),
    (60, "49M"),
    (72, "61M"),
];

/// One row of the policy extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRecord {
    /// Owning customer.
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    /// Date the policy was issued.
    #[serde(rename = "PolicyIssuanceDate")]
    pub policy_issuance_date: NaiveDate,
    /// Annual premium of this policy.
    #[serde(rename = "AnnualPremium")]
    pub annual_premium: f64,
    /// Declared annual income.
    #[serde(rename = "AnnualIncome")]
    pub annual_income: f64,
    /// City of residence.
    #[serde(rename = "City", default)]
    pub city: String,
    /// Raw occupation.
    #[serde(rename = "Occupation", default)]
    pub occupation: String,
    /// Nominee's relationship to the customer.
    #[serde(rename = "NomineeRelationship", default)]
    pub nominee_relationship: Option<String>,
    /// Nominee's age in years.
    #[serde(rename = "NomineeAge", default)]
    pub nominee_age: Option<f64>,
}

/// One row of the engagement/persona extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
    /// Customer key (unique within the extract).
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    /// Behavioral persona.
    #[serde(rename = "SafariPersona")]
    pub safari_persona: String,
    /// Life stage segment.
    #[serde(rename = "LifeStage")]
    pub life_stage: String,
    /// Policies surrendered to date.
    #[serde(rename = "PoliciesSurrendered")]
    pub policies_surrendered: u32,
    /// Policies ever held.
    #[serde(rename = "PoliciesTotalEver")]
    pub policies_total_ever: u32,
    /// Renewal bucket, when already known upstream.
    #[serde(rename = "RenewalBucket", default)]
    pub renewal_bucket: Option<String>,
}

/// Merged upstream record for one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCustomer {
    /// Customer key.
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    /// Life stage segment.
    #[serde(rename = "LifeStage")]
    pub life_stage: String,
    /// Behavioral persona.
    #[serde(rename = "SafariPersona")]
    pub safari_persona: String,
    /// Issuance date of the latest policy.
    #[serde(rename = "PolicyIssuanceDate")]
    pub policy_issuance_date: NaiveDate,
    /// Total annual premium across policies.
    #[serde(rename = "AnnualPremium")]
    pub annual_premium: f64,
    /// Highest declared annual income.
    #[serde(rename = "AnnualIncome")]
    pub annual_income: f64,
    /// City of residence.
    #[serde(rename = "City")]
    pub city: String,
    /// Raw occupation.
    #[serde(rename = "Occupation")]
    pub occupation: String,
    /// Nominee's relationship to the customer.
    #[serde(rename = "NomineeRelationship")]
    pub nominee_relationship: Option<String>,
    /// Nominee's age in years.
    #[serde(rename = "NomineeAge")]
    pub nominee_age: Option<f64>,
    /// Policies surrendered to date.
    #[serde(rename = "PoliciesSurrendered")]
    pub policies_surrendered: u32,
    /// Policies ever held.
    #[serde(rename = "PoliciesTotalEver")]
    pub policies_total_ever: u32,
    /// Renewal bucket supplied upstream, if any.
    #[serde(rename = "RenewalBucket")]
    pub renewal_bucket: Option<String>,
}

impl SourceCustomer {
    /// Joins a customer's aggregated policy with their engagement row.
    pub fn join(policy: PolicyRecord, engagement: &EngagementRecord) -> Self {
        Self {
            customer_id: policy.customer_id,
            life_stage: engagement.life_stage.clone(),
            safari_persona: engagement.safari_persona.clone(),
            policy_issuance_date: policy.policy_issuance_date,
            annual_premium: policy.annual_premium,
            annual_income: policy.annual_income,
            city: policy.city,
            occupation: policy.occupation,
            nominee_relationship: policy.nominee_relationship,
            nominee_age: policy.nominee_age,
            policies_surrendered: engagement.policies_surrendered,
            policies_total_ever: engagement.policies_total_ever,
            renewal_bucket: engagement.renewal_bucket.clone(),
        }
    }
}

/// Collapses one customer's policies into a single record.
///
/// The latest-issued policy supplies city and occupation. Premiums are
/// summed, income is the maximum, the nominee relationship is the first
/// one present and the nominee age is the highest one present.
/// Returns `None` for an empty group.
pub fn aggregate_policies(policies: &[&PolicyRecord]) -> Option<PolicyRecord> {
    let latest = policies
        .iter()
        .copied()
        .reduce(|best, p| {
            if p.policy_issuance_date > best.policy_issuance_date {
                p
            } else {
                best
            }
        })?;

    let mut merged = latest.clone();
    merged.annual_premium = policies.iter().map(|p| p.annual_premium).sum();
    merged.annual_income = policies
        .iter()
        .map(|p| p.annual_income)
        .fold(f64::NEG_INFINITY, f64::max);
    merged.nominee_relationship = policies
        .iter()
        .find_map(|p| p.nominee_relationship.clone().filter(|r| !r.trim().is_empty()));
    merged.nominee_age = policies
        .iter()
        .filter_map(|p| p.nominee_age)
        .filter(|age| age.is_finite())
        .reduce(f64::max);
    Some(merged)
}

/// PTI band from annual premium and income.
pub fn pti_band(premium: f64, income: f64) -> &'static str {
    if !income.is_finite() || income <= 0.0 {
        return "Unknown";
    }
    let ratio = premium / income;
    PTI_BANDS
        .iter()
        .find(|(upper, _)| ratio < *upper)
        .map(|(_, label)| *label)
        .unwrap_or("Stretched")
}

/// City tier for a city name.
pub fn city_tier(city: &str) -> &'static str {
    let city = city.trim();
    if city.is_empty() {
        "Unknown"
    } else if METRO_CITIES.contains(&city) {
        "Metro"
    } else if TIER1_CITIES.contains(&city) {
        "Tier1"
    } else {
        "Tier3/4"
    }
}

/// Occupation type (unknown values collapse to `Unknown`).
pub fn occupation_type(raw: &str) -> &'static str {
    OCCUPATIONS
        .iter()
        .find(|o| **o == raw.trim())
        .copied()
        .unwrap_or("Unknown")
}

/// Kids flag and age band from the nominee.
pub fn kids_flag_and_band(
    relationship: Option<&str>,
    nominee_age: Option<f64>,
) -> (&'static str, &'static str) {
    match relationship {
        Some(r) if KIDS_RELATIONSHIPS.contains(&r.trim()) => {
            let band = match nominee_age {
                Some(age) if age.is_finite() => {
                    if age <= 5.0 {
                        "0-5"
                    } else if age <= 15.0 {
                        "6-15"
                    } else if age <= 22.0 {
                        "16-22"
                    } else {
                        "22+"
                    }
                }
                _ => "Unknown",
            };
            ("Y", band)
        }
        _ => ("Unsure", "Unknown"),
    }
}

/// Renewal bucket: a supplied value wins, otherwise derived from policy age.
pub fn renewal_bucket(policy_months: i64, provided: Option<&str>) -> String {
    if let Some(p) = provided.map(str::trim).filter(|p| !p.is_empty()) {
        return p.to_string();
    }
    RENEWAL_BUCKETS
        .iter()
        .find(|(max, _)| policy_months <= *max)
        .map(|(_, label)| *label)
        .unwrap_or("61+")
        .to_string()
}

/// Share of policies ever surrendered.
pub fn surrender_ratio(surrendered: u32, total_ever: u32) -> f64 {
    if total_ever == 0 {
        0.0
    } else {
        f64::from(surrendered) / f64::from(total_ever)
    }
}

/// Whole 30-day months between issuance and `as_of` (never negative).
pub fn policy_months(issued: NaiveDate, as_of: NaiveDate) -> i64 {
    (as_of - issued).num_days().max(0) / 30
}

/// Derives the engine-facing profile.
pub fn derive_profile(source: &SourceCustomer, as_of: NaiveDate) -> CustomerProfile {
    let (kids_flag, kids_band) =
        kids_flag_and_band(source.nominee_relationship.as_deref(), source.nominee_age);

    CustomerProfile::new(source.customer_id.clone())
        .with_life_stage(source.life_stage.clone())
        .with_persona(source.safari_persona.clone())
        .with_renewal_bucket(renewal_bucket(
            policy_months(source.policy_issuance_date, as_of),
            source.renewal_bucket.as_deref(),
        ))
        .with_pti_band(pti_band(source.annual_premium, source.annual_income))
        .with_city_tier(city_tier(&source.city))
        .with_occupation(occupation_type(&source.occupation))
        .with_kids(kids_flag, kids_band)
        .with_percent_surrenders(surrender_ratio(
            source.policies_surrendered,
            source.policies_total_ever,
        ))
}

/// Derives profiles for every customer present in both extracts.
///
/// Fails when the engagement extract repeats a customer ID or when the
/// two extracts share no customer. Output is ordered by customer ID.
pub fn derive_profiles(
    policies: &[PolicyRecord],
    engagement: &[EngagementRecord],
    as_of: NaiveDate,
) -> Result<Vec<CustomerProfile>, Vec<ValidationError>> {
    let mut by_id: HashMap<&str, &EngagementRecord> = HashMap::new();
    let mut duplicates = BTreeSet::new();
    for row in engagement {
        if by_id.insert(row.customer_id.as_str(), row).is_some() {
            duplicates.insert(row.customer_id.as_str());
        }
    }
    if !duplicates.is_empty() {
        return Err(duplicates
            .into_iter()
            .map(|id| {
                ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Engagement extract has duplicate CustomerID: {id}"),
                )
            })
            .collect());
    }

    let mut groups: BTreeMap<&str, Vec<&PolicyRecord>> = BTreeMap::new();
    for policy in policies {
        groups.entry(policy.customer_id.as_str()).or_default().push(policy);
    }

    let profiles: Vec<CustomerProfile> = groups
        .into_iter()
        .filter_map(|(id, group)| {
            let engagement = by_id.get(id)?;
            let policy = aggregate_policies(&group)?;
            Some(derive_profile(&SourceCustomer::join(policy, engagement), as_of))
        })
        .collect();

    if profiles.is_empty() {
        return Err(vec![ValidationError::new(
            ValidationErrorKind::NoOverlap,
            "No overlapping customers between policy and engagement extracts",
        )]);
    }
    Ok(profiles)
}
