//! Calendar quality metrics (KPIs).
//!
//! Summarises a finished [`EnginePlan`] for reporting and sanity checks.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total Entries | Calendar rows across all customers |
//! | Customers Reached | Customers with at least one entry |
//! | Entries per Customer | Row count per customer ID |
//! | Owner Mix | Row count per owner type |
//! | Exclusions | EXCLUDED decision rows per reason code |
//! | Mean Entries | Total entries / customers in the decision log |

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Outcome, ReasonCode};

use super::EnginePlan;

/// Calendar performance indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarKpi {
    /// Total calendar rows.
    pub total_entries: usize,
    /// Customers with at least one calendar row.
    pub customers_reached: usize,
    /// Calendar rows per customer.
    pub entries_by_customer: BTreeMap<String, usize>,
    /// Calendar rows per owner type.
    pub entries_by_owner: BTreeMap<String, usize>,
    /// EXCLUDED decision rows per reason code.
    pub exclusions_by_reason: BTreeMap<ReasonCode, usize>,
    /// Mean calendar rows per customer seen in the decision log.
    pub mean_entries_per_customer: f64,
    /// Decision-log rows.
    pub decision_rows: usize,
}

impl CalendarKpi {
    /// Computes KPIs from a finished plan.
    pub fn calculate(plan: &EnginePlan) -> Self {
        let mut entries_by_customer: BTreeMap<String, usize> = BTreeMap::new();
        let mut entries_by_owner: BTreeMap<String, usize> = BTreeMap::new();
        for entry in &plan.calendar {
            *entries_by_customer
                .entry(entry.customer_id.clone())
                .or_insert(0) += 1;
            *entries_by_owner.entry(entry.owner_type.clone()).or_insert(0) += 1;
        }

        let mut exclusions_by_reason: BTreeMap<ReasonCode, usize> = BTreeMap::new();
        let mut customers: BTreeSet<&str> = BTreeSet::new();
        for row in &plan.decision_log {
            customers.insert(row.customer_id.as_str());
            if row.result == Outcome::Excluded {
                *exclusions_by_reason.entry(row.reason_code).or_insert(0) += 1;
            }
        }

        let total_entries = plan.calendar.len();
        let mean_entries_per_customer = if customers.is_empty() {
            0.0
        } else {
            total_entries as f64 / customers.len() as f64
        };

        Self {
            total_entries,
            customers_reached: entries_by_customer.len(),
            entries_by_customer,
            entries_by_owner,
            exclusions_by_reason,
            mean_entries_per_customer,
            decision_rows: plan.decision_log.len(),
        }
    }

    /// Whether the decision log holds one row per (customer, activity).
    pub fn coverage_is_complete(&self, customers: usize, activities: usize) -> bool {
        self.decision_rows == customers * activities
    }

    /// Exclusion count for one reason code.
    pub fn exclusions(&self, code: ReasonCode) -> usize {
        self.exclusions_by_reason.get(&code).copied().unwrap_or(0)
    }
}
