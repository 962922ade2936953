//! Per-customer scheduling state.
//!
//! Created empty when a customer's run starts and dropped when it ends;
//! never shared between customers. Every tracker is only written by
//! [`SchedulingState::commit`], so week `w` always sees exactly the
//! placements of weeks `0..w`.

use std::collections::{HashMap, HashSet};

use crate::models::{ActivityDefinition, CapSource, RepeatPenaltyMode};

/// Most recent placement in some grouping (category or theme).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastUse {
    /// Week index of the placement.
    pub week: usize,
    /// Activity placed.
    pub activity_id: String,
}

/// Live trackers consulted by the weekly hard checks.
#[derive(Debug, Clone)]
pub struct SchedulingState {
    /// Total-activity quota for this customer.
    pub persona_cap: u32,
    /// Where the quota came from.
    pub cap_source: CapSource,
    /// Placements so far (monotonic).
    pub persona_count: u32,
    category_counts: HashMap<String, u32>,
    last_category: HashMap<String, LastUse>,
    last_activity_week: HashMap<String, usize>,
    last_theme: HashMap<String, LastUse>,
    variety_month_seen: HashSet<(String, String)>,
    variety_recent_week: HashMap<String, usize>,
}

impl SchedulingState {
    /// Creates an empty state with the resolved quota.
    pub fn new(persona_cap: u32, cap_source: CapSource) -> Self {
        Self {
            persona_cap,
            cap_source,
            persona_count: 0,
            category_counts: HashMap::new(),
            last_category: HashMap::new(),
            last_activity_week: HashMap::new(),
            last_theme: HashMap::new(),
            variety_month_seen: HashSet::new(),
            variety_recent_week: HashMap::new(),
        }
    }

    /// Whether the total quota is exhausted.
    pub fn persona_cap_reached(&self) -> bool {
        self.persona_count >= self.persona_cap
    }

    /// Placements so far in a category.
    pub fn category_count(&self, category: &str) -> u32 {
        self.category_counts.get(category).copied().unwrap_or(0)
    }

    /// Latest placement in a category.
    pub fn last_category_use(&self, category: &str) -> Option<&LastUse> {
        self.last_category.get(category)
    }

    /// Week of the latest placement of an activity.
    pub fn last_activity_week(&self, activity_id: &str) -> Option<usize> {
        self.last_activity_week.get(activity_id).copied()
    }

    /// Latest placement sharing a theme.
    pub fn last_theme_use(&self, theme: &str) -> Option<&LastUse> {
        self.last_theme.get(theme)
    }

    /// Whether a HARD variety key was already used in a month bucket.
    pub fn variety_used_in_month(&self, variety_key: &str, month_bucket: &str) -> bool {
        self.variety_month_seen
            .contains(&(variety_key.to_string(), month_bucket.to_string()))
    }

    /// Week of the latest placement carrying a variety key.
    pub fn variety_last_week(&self, variety_key: &str) -> Option<usize> {
        self.variety_recent_week.get(variety_key).copied()
    }

    /// Records a committed placement.
    pub fn commit(&mut self, activity: &ActivityDefinition, week: usize, month_bucket: &str) {
        self.persona_count += 1;
        *self
            .category_counts
            .entry(activity.category.clone())
            .or_insert(0) += 1;

        let last = LastUse {
            week,
            activity_id: activity.activity_id.clone(),
        };
        self.last_category.insert(activity.category.clone(), last.clone());
        self.last_activity_week.insert(activity.activity_id.clone(), week);
        if !activity.theme.is_empty() {
            self.last_theme.insert(activity.theme.clone(), last);
        }

        if !activity.variety_key.is_empty() {
            if activity.repeat_penalty_mode == RepeatPenaltyMode::Hard {
                self.variety_month_seen
                    .insert((activity.variety_key.clone(), month_bucket.to_string()));
            }
            self.variety_recent_week.insert(activity.variety_key.clone(), week);
        }
    }
}
