//! Weekly scheduler.
//!
//! # Algorithm
//!
//! For each week, in increasing order:
//! 1. Run the live hard checks on every eligible activity (first failure
//!    stops that activity for this week and is recorded in the trail):
//!    persona cap, category cap, category cooldown, same-activity gap,
//!    same-theme gap, HARD variety per month, channel/owner feasibility.
//! 2. Score survivors: `priority * 100 + category bonus`, minus the soft
//!    penalty when a SOFT variety key was used inside the lookback window.
//! 3. Rank by (score desc, priority desc, bonus desc, activity ID asc) and
//!    commit the single winner. Losers are simply not chosen this week.
//!
//! # Complexity
//! O(w * n log n) per customer, where w = weeks and n = eligible activities.

use std::cmp::Ordering;

use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{
    ActivityDefinition, CalendarEntry, CustomerProfile, Failure, ReasonCode, RepeatPenaltyMode,
    Stage, WeekSlot,
};

use super::caps::ResolvedCap;
use super::decision_log::DecisionTrail;
use super::eligibility::BASE_PASS_CODES;
use super::state::SchedulingState;

/// An activity that survived this week's hard checks.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    /// The activity.
    pub activity: &'a ActivityDefinition,
    /// Channels it may use, in catalog order.
    pub feasible_channels: Vec<&'a str>,
    /// Category precedence bonus.
    pub bonus: i64,
    /// Final score (after any soft penalty).
    pub score: i64,
    /// Whether the soft variety penalty applied.
    pub penalized: bool,
}

impl Candidate<'_> {
    /// Preferred channel when feasible, else the first feasible channel.
    pub fn channel(&self) -> &str {
        let preferred = self.activity.preferred_channel.as_str();
        if self.feasible_channels.contains(&preferred) {
            preferred
        } else {
            self.feasible_channels.first().copied().unwrap_or(preferred)
        }
    }
}

/// Total order used to pick the weekly winner (best first).
pub fn rank(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.activity.priority.cmp(&a.activity.priority))
        .then_with(|| b.bonus.cmp(&a.bonus))
        .then_with(|| a.activity.activity_id.cmp(&b.activity.activity_id))
}

/// Greedy one-slot-per-week scheduler for a single customer.
#[derive(Debug, Clone, Copy)]
pub struct WeeklyScheduler<'c> {
    config: &'c EngineConfig,
}

impl<'c> WeeklyScheduler<'c> {
    /// Creates a scheduler over the given configuration.
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config }
    }

    /// Runs the live hard checks for one activity in one week.
    ///
    /// Returns the feasible channels on success.
    pub fn check_live<'a>(
        &self,
        activity: &'a ActivityDefinition,
        state: &SchedulingState,
        week: &WeekSlot,
        weeks: &[WeekSlot],
    ) -> Result<Vec<&'a str>, Failure> {
        let now = week.index;
        let bucket_of = |index: usize| {
            weeks
                .get(index)
                .map(|w| w.week_bucket.as_str())
                .unwrap_or("?")
        };

        if state.persona_cap_reached() {
            return Err(Failure::new(
                Stage::Cap,
                ReasonCode::FailPersonaCap,
                format!(
                    "Persona cap {} reached ({}) by {}",
                    state.persona_cap, state.cap_source, week.week_bucket
                ),
            ));
        }

        let rule = self.config.category_rule(&activity.category);
        if let Some(max) = rule.max_per_year {
            let used = state.category_count(&activity.category);
            if used >= max {
                return Err(Failure::new(
                    Stage::Cap,
                    ReasonCode::FailCategoryCap,
                    format!(
                        "Category '{}' cap reached ({used} of {max}) by {}",
                        activity.category, week.week_bucket
                    ),
                ));
            }
        }

        if let Some(last) = state.last_category_use(&activity.category) {
            let gap = now - last.week;
            if gap < rule.cooldown_weeks as usize {
                return Err(Failure::new(
                    Stage::Schedule,
                    ReasonCode::FailCategorySpacing,
                    format!(
                        "Category '{}' used by {} in {}; required gap {} weeks, actual {gap}",
                        activity.category,
                        last.activity_id,
                        bucket_of(last.week),
                        rule.cooldown_weeks
                    ),
                ));
            }
        }

        if let Some(last) = state.last_activity_week(&activity.activity_id) {
            let gap = now - last;
            if gap < activity.min_gap_activity_weeks as usize {
                return Err(Failure::new(
                    Stage::Schedule,
                    ReasonCode::FailGapSameActivity,
                    format!(
                        "Activity scheduled in {}; required gap {} weeks, actual {gap}",
                        bucket_of(last),
                        activity.min_gap_activity_weeks
                    ),
                ));
            }
        }

        if !activity.theme.is_empty() {
            if let Some(last) = state.last_theme_use(&activity.theme) {
                let gap = now - last.week;
                if gap < activity.min_gap_theme_weeks as usize {
                    return Err(Failure::new(
                        Stage::Schedule,
                        ReasonCode::FailGapSameTheme,
                        format!(
                            "Theme '{}' used by {} in {}; required gap {} weeks, actual {gap}",
                            activity.theme,
                            last.activity_id,
                            bucket_of(last.week),
                            activity.min_gap_theme_weeks
                        ),
                    ));
                }
            }
        }

        if activity.repeat_penalty_mode == RepeatPenaltyMode::Hard
            && !activity.variety_key.is_empty()
            && state.variety_used_in_month(&activity.variety_key, &week.month_bucket)
        {
            return Err(Failure::new(
                Stage::Schedule,
                ReasonCode::FailVarietyKeyMonthHard,
                format!(
                    "Variety key '{}' already used in {}",
                    activity.variety_key, week.month_bucket
                ),
            ));
        }

        let feasible: Vec<&'a str> = activity
            .channels
            .iter()
            .map(String::as_str)
            .filter(|c| !activity.requires_human || self.config.is_human_channel(c))
            .collect();
        if feasible.is_empty() {
            return Err(Failure::new(
                Stage::Schedule,
                ReasonCode::FailChannelOwnerMapping,
                format!(
                    "Requires human delivery but none of [{}] is human-capable",
                    activity.channels.join(", ")
                ),
            ));
        }

        Ok(feasible)
    }

    /// Scores a surviving activity.
    pub fn candidate<'a>(
        &self,
        activity: &'a ActivityDefinition,
        feasible_channels: Vec<&'a str>,
        state: &SchedulingState,
        week_index: usize,
    ) -> Candidate<'a> {
        let bonus = self.config.category_bonus(&activity.category);
        let base = i64::from(activity.priority) * 100 + bonus;

        let penalized = activity.repeat_penalty_mode == RepeatPenaltyMode::Soft
            && !activity.variety_key.is_empty()
            && state
                .variety_last_week(&activity.variety_key)
                .is_some_and(|last| week_index - last < self.config.soft_variety_lookback_weeks);

        let score = if penalized {
            base - self.config.soft_variety_penalty
        } else {
            base
        };

        Candidate {
            activity,
            feasible_channels,
            bonus,
            score,
            penalized,
        }
    }

    /// Schedules one customer over the horizon.
    ///
    /// `eligible` is the output of the eligibility filter; `state` must be
    /// fresh for this customer. Weeks are processed in order.
    pub fn schedule(
        &self,
        customer: &CustomerProfile,
        eligible: &[&ActivityDefinition],
        weeks: &[WeekSlot],
        cap: &ResolvedCap,
        state: &mut SchedulingState,
        trail: &mut DecisionTrail,
    ) -> Vec<CalendarEntry> {
        let mut entries = Vec::new();

        let mut reason_codes: Vec<ReasonCode> = BASE_PASS_CODES.to_vec();
        reason_codes.extend(cap.advisory);
        reason_codes.push(ReasonCode::PassCap);
        reason_codes.push(ReasonCode::PassSchedule);

        for week in weeks {
            let mut candidates: Vec<Candidate<'_>> = Vec::with_capacity(eligible.len());
            for &activity in eligible {
                match self.check_live(activity, state, week, weeks) {
                    Ok(channels) => {
                        candidates.push(self.candidate(activity, channels, state, week.index))
                    }
                    Err(failure) => trail.record_failure(&activity.activity_id, failure),
                }
            }

            candidates.sort_by(rank);
            let Some(winner) = candidates.first() else {
                continue;
            };

            let channel = winner.channel().to_string();
            let activity = winner.activity;
            debug!(
                customer_id = %customer.customer_id,
                week = %week.week_bucket,
                activity_id = %activity.activity_id,
                score = winner.score,
                penalized = winner.penalized,
                "committed weekly winner"
            );

            entries.push(CalendarEntry {
                customer_id: customer.customer_id.clone(),
                week_bucket: week.week_bucket.clone(),
                month_bucket: week.month_bucket.clone(),
                activity_id: activity.activity_id.clone(),
                category: activity.category.clone(),
                sub_category: activity.sub_category.clone(),
                owner_type: self.config.owner_for(&channel).to_string(),
                channel,
                reason_codes: reason_codes.clone(),
            });
            trail.record_inclusion(&activity.activity_id, &week.week_bucket, &reason_codes);
            state.commit(activity, week.index, &week.month_bucket);
        }

        entries
    }
}
