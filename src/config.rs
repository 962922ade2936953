//! Engine configuration.
//!
//! All business tables the scheduler consults are held in one immutable
//! [`EngineConfig`] that is handed to [`crate::engine::CalendarEngine`].
//! Nothing is read from globals, so tests override any table through the
//! `with_*` builders.
//!
//! A configuration can also be loaded from JSON. Missing fields fall back
//! to their defaults:
//!
//! ```
//! use u_engagement::config::EngineConfig;
//!
//! let config = EngineConfig::from_json(r#"{ "horizon_weeks": 12, "default_cap": 10 }"#).unwrap();
//! assert_eq!(config.horizon_weeks, 12);
//! assert_eq!(config.default_cap, 10);
//! assert_eq!(config.soft_variety_penalty, 1000);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::EngineError;

/// Annual quota and cooldown for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Maximum placements per horizon. `None` = unlimited.
    pub max_per_year: Option<u32>,
    /// Minimum weeks between two placements in the category.
    pub cooldown_weeks: u32,
}

impl CategoryRule {
    /// Capped category.
    pub fn capped(max_per_year: u32, cooldown_weeks: u32) -> Self {
        Self {
            max_per_year: Some(max_per_year),
            cooldown_weeks,
        }
    }

    /// Uncapped category with no cooldown.
    pub fn unlimited() -> Self {
        Self {
            max_per_year: None,
            cooldown_weeks: 0,
        }
    }
}

/// Tunable parameters of the calendar engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of weekly slots in the planning horizon.
    pub horizon_weeks: usize,
    /// Category → quota and cooldown. Unlisted categories are unconstrained.
    pub category_rules: BTreeMap<String, CategoryRule>,
    /// Persona → total-activity cap.
    pub persona_caps: BTreeMap<String, u32>,
    /// Life stage → total-activity cap (consulted when the persona has none).
    pub life_stage_caps: BTreeMap<String, u32>,
    /// Cap used when neither table matches.
    pub default_cap: u32,
    /// Weeks during which a SOFT variety key counts as recently used.
    pub soft_variety_lookback_weeks: usize,
    /// Score subtracted from recently used SOFT variety keys.
    pub soft_variety_penalty: i64,
    /// Category → precedence bonus added to the score.
    pub category_bonuses: BTreeMap<String, i64>,
    /// Channel → owner type.
    pub channel_owners: BTreeMap<String, String>,
    /// Owner type for channels missing from `channel_owners`.
    pub default_owner: String,
    /// Channels that can carry human-delivered activities.
    pub human_channels: BTreeSet<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let category_rules = [
            ("Everyday Life & Learning", CategoryRule::capped(8, 1)),
            ("Policy Journey", CategoryRule::capped(8, 1)),
            ("Trust & Touchpoints", CategoryRule::capped(6, 1)),
            ("Loyalty, Rewards & Access", CategoryRule::capped(4, 1)),
            ("Community & Connections", CategoryRule::capped(4, 1)),
            ("Growth & Review", CategoryRule::capped(2, 2)),
            ("Maturity", CategoryRule::unlimited()),
            ("Servicing", CategoryRule::unlimited()),
        ];
        let persona_caps = [("Lion", 24), ("Hawk", 28), ("Elephant", 26), ("Deer", 30)];
        let category_bonuses = [
            ("Servicing", 100),
            ("Maturity", 90),
            ("Renewal", 80),
            ("Growth & Review", 70),
            ("Policy Journey", 60),
        ];
        let channel_owners = [
            ("Email", "Digital"),
            ("SMS", "Digital"),
            ("WhatsApp", "Digital"),
            ("App", "Digital"),
            ("Push", "Digital"),
            ("Call", "Human"),
            ("Branch", "Human"),
            ("Agent Visit", "Human"),
        ];

        Self {
            horizon_weeks: 52,
            category_rules: category_rules
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            persona_caps: persona_caps
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            life_stage_caps: BTreeMap::new(),
            default_cap: 24,
            soft_variety_lookback_weeks: 8,
            soft_variety_penalty: 1000,
            category_bonuses: category_bonuses
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            channel_owners: channel_owners
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            default_owner: "Digital".to_string(),
            human_channels: ["Call", "Branch", "Agent Visit"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the horizon length (weeks).
    pub fn with_horizon_weeks(mut self, weeks: usize) -> Self {
        self.horizon_weeks = weeks;
        self
    }

    /// Sets or replaces a category rule.
    pub fn with_category_rule(mut self, category: impl Into<String>, rule: CategoryRule) -> Self {
        self.category_rules.insert(category.into(), rule);
        self
    }

    /// Sets or replaces a persona cap.
    pub fn with_persona_cap(mut self, persona: impl Into<String>, cap: u32) -> Self {
        self.persona_caps.insert(persona.into(), cap);
        self
    }

    /// Sets or replaces a life-stage cap.
    pub fn with_life_stage_cap(mut self, life_stage: impl Into<String>, cap: u32) -> Self {
        self.life_stage_caps.insert(life_stage.into(), cap);
        self
    }

    /// Sets the default cap.
    pub fn with_default_cap(mut self, cap: u32) -> Self {
        self.default_cap = cap;
        self
    }

    /// Sets the soft-variety lookback window and penalty.
    pub fn with_soft_variety(mut self, lookback_weeks: usize, penalty: i64) -> Self {
        self.soft_variety_lookback_weeks = lookback_weeks;
        self.soft_variety_penalty = penalty;
        self
    }

    /// Sets or replaces a category precedence bonus.
    pub fn with_category_bonus(mut self, category: impl Into<String>, bonus: i64) -> Self {
        self.category_bonuses.insert(category.into(), bonus);
        self
    }

    /// Maps a channel to an owner type.
    pub fn with_channel_owner(
        mut self,
        channel: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        self.channel_owners.insert(channel.into(), owner.into());
        self
    }

    /// Marks a channel as human-capable.
    pub fn with_human_channel(mut self, channel: impl Into<String>) -> Self {
        self.human_channels.insert(channel.into());
        self
    }

    /// Rule for a category (unconstrained when not configured).
    pub fn category_rule(&self, category: &str) -> CategoryRule {
        self.category_rules
            .get(category)
            .copied()
            .unwrap_or_else(CategoryRule::unlimited)
    }

    /// Precedence bonus for a category (0 when not configured).
    pub fn category_bonus(&self, category: &str) -> i64 {
        self.category_bonuses.get(category).copied().unwrap_or(0)
    }

    /// Owner type delivering a channel.
    pub fn owner_for(&self, channel: &str) -> &str {
        self.channel_owners
            .get(channel)
            .map(String::as_str)
            .unwrap_or(&self.default_owner)
    }

    /// Whether a channel can carry human-delivered activities.
    pub fn is_human_channel(&self, channel: &str) -> bool {
        self.human_channels.contains(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.horizon_weeks, 52);
        assert_eq!(c.soft_variety_lookback_weeks, 8);
        assert_eq!(c.soft_variety_penalty, 1000);
        assert_eq!(c.persona_caps["Deer"], 30);
        assert!(c.life_stage_caps.is_empty());
        assert_eq!(
            c.category_rule("Growth & Review"),
            CategoryRule::capped(2, 2)
        );
        assert_eq!(c.category_rule("Servicing").max_per_year, None);
    }

    #[test]
    fn test_unknown_category_is_unconstrained() {
        let c = EngineConfig::default();
        assert_eq!(c.category_rule("Nope"), CategoryRule::unlimited());
        assert_eq!(c.category_bonus("Nope"), 0);
    }

    #[test]
    fn test_renewal_bonus_is_category_keyed() {
        let c = EngineConfig::default();
        assert_eq!(c.category_bonus("Renewal"), 80);
        // Renewal journeys filed under Policy Journey score that category.
        assert_eq!(c.category_bonus("Policy Journey"), 60);

        let c = c.with_category_bonus("Policy Journey", 80);
        assert_eq!(c.category_bonus("Policy Journey"), 80);
    }

    #[test]
    fn test_owner_lookup() {
        let c = EngineConfig::default().with_channel_owner("Video", "Human");
        assert_eq!(c.owner_for("Call"), "Human");
        assert_eq!(c.owner_for("Email"), "Digital");
        assert_eq!(c.owner_for("Video"), "Human");
        assert_eq!(c.owner_for("Carrier Pigeon"), "Digital");
    }

    #[test]
    fn test_builders() {
        let c = EngineConfig::new()
            .with_horizon_weeks(12)
            .with_persona_cap("Fox", 3)
            .with_life_stage_cap("Young Adult", 5)
            .with_default_cap(7)
            .with_soft_variety(4, 500)
            .with_category_bonus("Custom", 15)
            .with_category_rule("Custom", CategoryRule::capped(1, 3))
            .with_human_channel("Video");

        assert_eq!(c.horizon_weeks, 12);
        assert_eq!(c.persona_caps["Fox"], 3);
        assert_eq!(c.life_stage_caps["Young Adult"], 5);
        assert_eq!(c.default_cap, 7);
        assert_eq!(c.soft_variety_lookback_weeks, 4);
        assert_eq!(c.soft_variety_penalty, 500);
        assert_eq!(c.category_bonus("Custom"), 15);
        assert_eq!(c.category_rule("Custom").cooldown_weeks, 3);
        assert!(c.is_human_channel("Video"));
    }

    #[test]
    fn test_from_json_overrides() {
        let json = r#"{
            "persona_caps": { "Lion": 2 },
            "category_rules": { "Servicing": { "max_per_year": 1, "cooldown_weeks": 4 } }
        }"#;
        let c = EngineConfig::from_json(json).unwrap();
        assert_eq!(c.persona_caps.len(), 1);
        assert_eq!(c.persona_caps["Lion"], 2);
        assert_eq!(c.category_rule("Servicing"), CategoryRule::capped(1, 4));
        assert_eq!(c.horizon_weeks, 52);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
