//! Activity-library normalisation.
//!
//! Converts raw catalog rows, with every column still a string as
//! delivered upstream, into [`ActivityDefinition`]s. Each row is
//! normalised independently by pure functions:
//!
//! | Raw column | Rule |
//! |------------|------|
//! | multi-value eligibility columns | split on `|`, trim, drop blanks; `ALL` → unrestricted |
//! | `allowed_channels` | same split; must not end up empty |
//! | `business_priority` | integer |
//! | `min_gap_days_*` | blank → 0; otherwise non-negative days, ceil-divided into weeks |
//! | `repeat_penalty_mode` | blank → `HARD`; `HARD`/`SOFT` case-insensitive |
//! | boolean flags | TRUE/FALSE, Y/N, YES/NO, 1/0 or blank |
//!
//! Malformed values are rejected, never coerced.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::EngineError;
use crate::models::{ActivityDefinition, RepeatPenaltyMode};
use crate::validation::{ValidationError, ValidationErrorKind};

/// One activity row as delivered upstream.
///
/// Every column is required except `allowed_kids_age_bands`,
/// `requires_kids` and `exclude_if_high_surrender_pct`, which default to
/// blank. A row missing any other column fails to deserialise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawActivityRecord {
    /// Unique activity identifier.
    pub activity_id: String,
    /// Display name copied into decision-log rows.
    pub activity_name: String,
    /// Category used for caps, cooldowns and bonuses.
    pub category: String,
    /// Sub-category.
    pub sub_category: String,
    /// Theme for the same-theme gap (blank = none).
    pub theme: String,
    /// Pipe-delimited life stages, or `ALL`.
    pub eligible_life_stages: String,
    /// Pipe-delimited personas, or `ALL`.
    pub eligible_safari_personas: String,
    /// Pipe-delimited PTI bands, or `ALL`.
    pub allowed_premium_to_income_bands: String,
    /// Pipe-delimited city tiers, or `ALL`.
    pub allowed_city_tiers: String,
    /// Pipe-delimited occupation types, or `ALL`.
    pub allowed_occupation_types: String,
    /// Pipe-delimited renewal buckets, or `ALL`.
    pub allowed_renewal_buckets: String,
    /// Pipe-delimited kids age bands, or `ALL`.
    #[serde(default)]
    pub allowed_kids_age_bands: String,
    /// Pipe-delimited delivery channels (must be concrete).
    pub allowed_channels: String,
    /// Channel used when feasible.
    pub preferred_channel: String,
    /// Integer priority, higher first.
    pub business_priority: String,
    /// Minimum days between two placements of this activity.
    pub min_gap_days_same_activity: String,
    /// Minimum days between two placements sharing the theme.
    pub min_gap_days_same_theme: String,
    /// Variety key (blank = none).
    pub variety_key: String,
    /// `HARD`, `SOFT` or blank.
    pub repeat_penalty_mode: String,
    /// Boolean: only customers with kids.
    #[serde(default)]
    pub requires_kids: String,
    /// Boolean: needs a human-capable channel.
    pub requires_human: String,
    /// Boolean: skip customers with any surrender.
    #[serde(default)]
    pub exclude_if_high_surrender_pct: String,
}

/// Splits a pipe-delimited field. An `ALL` token means "no restriction".
pub fn split_pipe(value: &str) -> Vec<String> {
    let parts: Vec<String> = value
        .split('|')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();
    if parts.iter().any(|p| p.eq_ignore_ascii_case("ALL")) {
        Vec::new()
    } else {
        parts
    }
}

/// Converts a day count into whole weeks, rounding up.
pub fn days_to_weeks(days: f64) -> u32 {
    (days / 7.0).ceil() as u32
}

fn invalid(kind: ValidationErrorKind, activity_id: &str, msg: String) -> ValidationError {
    ValidationError::new(kind, format!("Activity '{activity_id}': {msg}"))
}

fn parse_bool(activity_id: &str, column: &str, raw: &str) -> Result<bool, ValidationError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "TRUE" | "Y" | "YES" | "1" => Ok(true),
        "FALSE" | "N" | "NO" | "0" | "" => Ok(false),
        other => Err(invalid(
            ValidationErrorKind::InvalidEnumValue,
            activity_id,
            format!("{column} must be a boolean, got '{other}'"),
        )),
    }
}

fn parse_gap_weeks(activity_id: &str, column: &str, raw: &str) -> Result<u32, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    let days: f64 = raw.parse().map_err(|_| {
        invalid(
            ValidationErrorKind::InvalidNumber,
            activity_id,
            format!("{column} must be numeric, got '{raw}'"),
        )
    })?;
    if !days.is_finite() || days < 0.0 {
        return Err(invalid(
            ValidationErrorKind::OutOfRange,
            activity_id,
            format!("{column} must be a non-negative day count, got '{raw}'"),
        ));
    }
    Ok(days_to_weeks(days))
}

fn parse_penalty_mode(activity_id: &str, raw: &str) -> Result<RepeatPenaltyMode, ValidationError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "" | "HARD" => Ok(RepeatPenaltyMode::Hard),
        "SOFT" => Ok(RepeatPenaltyMode::Soft),
        other => Err(invalid(
            ValidationErrorKind::InvalidEnumValue,
            activity_id,
            format!("repeat_penalty_mode must be HARD or SOFT, got '{other}'"),
        )),
    }
}

fn to_set(raw: &str) -> BTreeSet<String> {
    split_pipe(raw).into_iter().collect()
}

/// Normalises a single raw row.
pub fn normalise_activity(raw: &RawActivityRecord) -> Result<ActivityDefinition, ValidationError> {
    let id = raw.activity_id.trim();
    if id.is_empty() {
        return Err(ValidationError::new(
            ValidationErrorKind::EmptyId,
            "Activity row with blank activity_id",
        ));
    }

    let priority: i32 = raw.business_priority.trim().parse().map_err(|_| {
        invalid(
            ValidationErrorKind::InvalidNumber,
            id,
            format!(
                "business_priority must be an integer, got '{}'",
                raw.business_priority
            ),
        )
    })?;

    let channels = split_pipe(&raw.allowed_channels);
    if channels.is_empty() {
        return Err(invalid(
            ValidationErrorKind::EmptyChannels,
            id,
            "allowed_channels must list at least one concrete channel".to_string(),
        ));
    }

    let kids_flags = if parse_bool(id, "requires_kids", &raw.requires_kids)? {
        BTreeSet::from(["Y".to_string()])
    } else {
        BTreeSet::new()
    };

    Ok(ActivityDefinition {
        activity_id: id.to_string(),
        name: raw.activity_name.trim().to_string(),
        category: raw.category.trim().to_string(),
        sub_category: raw.sub_category.trim().to_string(),
        theme: raw.theme.trim().to_string(),
        priority,
        life_stages: to_set(&raw.eligible_life_stages),
        personas: to_set(&raw.eligible_safari_personas),
        renewal_buckets: to_set(&raw.allowed_renewal_buckets),
        pti_bands: to_set(&raw.allowed_premium_to_income_bands),
        city_tiers: to_set(&raw.allowed_city_tiers),
        occupations: to_set(&raw.allowed_occupation_types),
        kids_flags,
        kids_age_bands: to_set(&raw.allowed_kids_age_bands),
        channels,
        preferred_channel: raw.preferred_channel.trim().to_string(),
        requires_human: parse_bool(id, "requires_human", &raw.requires_human)?,
        min_gap_activity_weeks: parse_gap_weeks(
            id,
            "min_gap_days_same_activity",
            &raw.min_gap_days_same_activity,
        )?,
        min_gap_theme_weeks: parse_gap_weeks(
            id,
            "min_gap_days_same_theme",
            &raw.min_gap_days_same_theme,
        )?,
        variety_key: raw.variety_key.trim().to_string(),
        repeat_penalty_mode: parse_penalty_mode(id, &raw.repeat_penalty_mode)?,
        exclude_if_high_surrender: parse_bool(
            id,
            "exclude_if_high_surrender_pct",
            &raw.exclude_if_high_surrender_pct,
        )?,
    })
}

/// Normalises a whole library.
///
/// Every row is attempted; all errors are returned together. On success
/// the definitions are ordered by priority (descending), then ID.
pub fn normalise_library(
    records: &[RawActivityRecord],
) -> Result<Vec<ActivityDefinition>, Vec<ValidationError>> {
    let mut activities = Vec::with_capacity(records.len());
    let mut errors = Vec::new();

    for raw in records {
        match normalise_activity(raw) {
            Ok(a) => activities.push(a),
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    activities.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.activity_id.cmp(&b.activity_id))
    });
    Ok(activities)
}

/// Parses a JSON array of raw rows.
///
/// A row missing a required column is rejected as [`EngineError::Records`].
pub fn records_from_json(json: &str) -> Result<Vec<RawActivityRecord>, EngineError> {
    serde_json::from_str(json).map_err(EngineError::Records)
}

/// Parses and normalises a JSON activity library in one step.
pub fn library_from_json(json: &str) -> Result<Vec<ActivityDefinition>, EngineError> {
    let records = records_from_json(json)?;
    Ok(normalise_library(&records)?)
}
