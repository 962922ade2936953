//! Activity definition model.
//!
//! An activity is one entry of the engagement catalog: something that can
//! be placed into a single weekly slot of a customer's calendar. Each
//! definition carries three groups of rules:
//!
//! - **Eligibility sets**: which customers may ever receive it. An empty
//!   set means "unrestricted".
//! - **Spacing rules**: minimum gaps (in weeks) between repeats of the same
//!   activity or the same theme, and a variety key with a repeat policy.
//! - **Delivery**: allowed channels (ordered), a preferred channel, and
//!   whether a human must deliver it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How repeats of the same variety key are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RepeatPenaltyMode {
    /// At most one activity per variety key per month bucket.
    #[default]
    Hard,
    /// Repeats inside the lookback window are allowed but score lower.
    Soft,
}

impl RepeatPenaltyMode {
    /// Upper-case token as used in activity tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatPenaltyMode::Hard => "HARD",
            RepeatPenaltyMode::Soft => "SOFT",
        }
    }
}

/// A catalog activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDefinition {
    /// Unique activity identifier.
    pub activity_id: String,
    /// Human-readable name.
    pub name: String,
    /// Category (drives caps, cooldowns and precedence bonuses).
    pub category: String,
    /// Sub-category.
    pub sub_category: String,
    /// Theme (drives the same-theme gap rule). Empty = no theme gap.
    pub theme: String,
    /// Business priority (higher = more important).
    pub priority: i32,
    /// Eligible life stages.
    pub life_stages: BTreeSet<String>,
    /// Eligible personas.
    pub personas: BTreeSet<String>,
    /// Eligible renewal buckets.
    pub renewal_buckets: BTreeSet<String>,
    /// Eligible premium-to-income bands.
    pub pti_bands: BTreeSet<String>,
    /// Eligible city tiers.
    pub city_tiers: BTreeSet<String>,
    /// Eligible occupation types.
    pub occupations: BTreeSet<String>,
    /// Eligible kids flags.
    pub kids_flags: BTreeSet<String>,
    /// Eligible kids age bands.
    pub kids_age_bands: BTreeSet<String>,
    /// Delivery channels in catalog order. Never empty once normalized.
    pub channels: Vec<String>,
    /// Preferred channel (used when feasible).
    pub preferred_channel: String,
    /// Whether delivery requires a human-capable channel.
    pub requires_human: bool,
    /// Minimum weeks between two placements of this activity.
    pub min_gap_activity_weeks: u32,
    /// Minimum weeks between two placements sharing this theme.
    pub min_gap_theme_weeks: u32,
    /// Variety key. Empty = no variety constraint.
    pub variety_key: String,
    /// Repeat policy for the variety key.
    pub repeat_penalty_mode: RepeatPenaltyMode,
    /// Exclude customers with any surrender history.
    pub exclude_if_high_surrender: bool,
}

impl ActivityDefinition {
    /// Creates an unrestricted activity delivered by email.
    pub fn new(activity_id: impl Into<String>, category: impl Into<String>) -> Self {
        let activity_id = activity_id.into();
        Self {
            name: activity_id.clone(),
            activity_id,
            category: category.into(),
            sub_category: String::new(),
            theme: String::new(),
            priority: 0,
            life_stages: BTreeSet::new(),
            personas: BTreeSet::new(),
            renewal_buckets: BTreeSet::new(),
            pti_bands: BTreeSet::new(),
            city_tiers: BTreeSet::new(),
            occupations: BTreeSet::new(),
            kids_flags: BTreeSet::new(),
            kids_age_bands: BTreeSet::new(),
            channels: vec!["Email".to_string()],
            preferred_channel: "Email".to_string(),
            requires_human: false,
            min_gap_activity_weeks: 0,
            min_gap_theme_weeks: 0,
            variety_key: String::new(),
            repeat_penalty_mode: RepeatPenaltyMode::Hard,
            exclude_if_high_surrender: false,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the sub-category.
    pub fn with_sub_category(mut self, sub_category: impl Into<String>) -> Self {
        self.sub_category = sub_category.into();
        self
    }

    /// Sets the theme.
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    /// Sets the business priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Restricts to the given life stages.
    pub fn with_life_stages(mut self, values: &[&str]) -> Self {
        self.life_stages = to_set(values);
        self
    }

    /// Restricts to the given personas.
    pub fn with_personas(mut self, values: &[&str]) -> Self {
        self.personas = to_set(values);
        self
    }

    /// Restricts to the given renewal buckets.
    pub fn with_renewal_buckets(mut self, values: &[&str]) -> Self {
        self.renewal_buckets = to_set(values);
        self
    }

    /// Restricts to the given PTI bands.
    pub fn with_pti_bands(mut self, values: &[&str]) -> Self {
        self.pti_bands = to_set(values);
        self
    }

    /// Restricts to the given city tiers.
    pub fn with_city_tiers(mut self, values: &[&str]) -> Self {
        self.city_tiers = to_set(values);
        self
    }

    /// Restricts to the given occupation types.
    pub fn with_occupations(mut self, values: &[&str]) -> Self {
        self.occupations = to_set(values);
        self
    }

    /// Restricts to the given kids flags.
    pub fn with_kids_flags(mut self, values: &[&str]) -> Self {
        self.kids_flags = to_set(values);
        self
    }

    /// Restricts to the given kids age bands.
    pub fn with_kids_age_bands(mut self, values: &[&str]) -> Self {
        self.kids_age_bands = to_set(values);
        self
    }

    /// Sets the allowed channels (catalog order) and the preferred channel.
    pub fn with_channels(mut self, channels: &[&str], preferred: impl Into<String>) -> Self {
        self.channels = channels.iter().map(|c| c.to_string()).collect();
        self.preferred_channel = preferred.into();
        self
    }

    /// Requires a human-capable channel.
    pub fn with_requires_human(mut self, requires_human: bool) -> Self {
        self.requires_human = requires_human;
        self
    }

    /// Sets the same-activity and same-theme gaps (weeks).
    pub fn with_gaps(mut self, activity_weeks: u32, theme_weeks: u32) -> Self {
        self.min_gap_activity_weeks = activity_weeks;
        self.min_gap_theme_weeks = theme_weeks;
        self
    }

    /// Sets the variety key and its repeat policy.
    pub fn with_variety(mut self, key: impl Into<String>, mode: RepeatPenaltyMode) -> Self {
        self.variety_key = key.into();
        self.repeat_penalty_mode = mode;
        self
    }

    /// Excludes customers with any surrender history.
    pub fn with_surrender_exclusion(mut self, exclude: bool) -> Self {
        self.exclude_if_high_surrender = exclude;
        self
    }
}

fn to_set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Whether `value` satisfies an eligibility set (empty = unrestricted).
#[inline]
pub fn admits(set: &BTreeSet<String>, value: &str) -> bool {
    set.is_empty() || set.contains(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_builder() {
        let act = ActivityDefinition::new("A1", "Policy Journey")
            .with_name("Renewal reminder")
            .with_sub_category("Renewal")
            .with_theme("renewals")
            .with_priority(3)
            .with_life_stages(&["Early Nester"])
            .with_channels(&["SMS", "Call"], "Call")
            .with_requires_human(true)
            .with_gaps(4, 2)
            .with_variety("K1", RepeatPenaltyMode::Soft);

        assert_eq!(act.activity_id, "A1");
        assert_eq!(act.name, "Renewal reminder");
        assert_eq!(act.priority, 3);
        assert_eq!(act.channels, vec!["SMS", "Call"]);
        assert_eq!(act.preferred_channel, "Call");
        assert!(act.requires_human);
        assert_eq!(act.min_gap_activity_weeks, 4);
        assert_eq!(act.min_gap_theme_weeks, 2);
        assert_eq!(act.repeat_penalty_mode, RepeatPenaltyMode::Soft);
    }

    #[test]
    fn test_defaults_are_unrestricted() {
        let act = ActivityDefinition::new("A1", "Servicing");
        assert_eq!(act.name, "A1");
        assert!(act.life_stages.is_empty());
        assert!(!act.channels.is_empty());
        assert_eq!(act.repeat_penalty_mode, RepeatPenaltyMode::Hard);
    }

    #[test]
    fn test_admits() {
        let empty = BTreeSet::new();
        assert!(admits(&empty, "anything"));

        let set = to_set(&["Metro", "Tier1"]);
        assert!(admits(&set, "Metro"));
        assert!(!admits(&set, "Tier3/4"));
    }

    #[test]
    fn test_penalty_mode_tokens() {
        assert_eq!(RepeatPenaltyMode::Hard.as_str(), "HARD");
        let parsed: RepeatPenaltyMode = serde_json::from_str("\"SOFT\"").unwrap();
        assert_eq!(parsed, RepeatPenaltyMode::Soft);
    }
}
