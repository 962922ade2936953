//! Weekly calendarization engine.
//!
//! Turns (customers, activity catalog, reference date) into a calendar and
//! a complete decision log.
//!
//! # Components
//!
//! | Component | Role |
//! |-----------|------|
//! | `caps` | Resolves each customer's total quota and its source |
//! | `eligibility` | Drops activities a customer may never receive |
//! | `state` | Per-customer trackers for caps, gaps and variety |
//! | `scheduler` | Commits at most one activity per week |
//! | `decision_log` | One audit row per (customer, activity) |
//! | `kpi` | Summary metrics over a finished plan |
//!
//! # Determinism
//!
//! Every ordering decision is a total order (customer ID, week index,
//! score tie-breaks ending in activity ID), so identical inputs yield
//! identical tables.

mod caps;
mod decision_log;
mod eligibility;
mod kpi;
mod runner;
mod scheduler;
mod state;

pub use caps::{resolve_cap, ResolvedCap};
pub use decision_log::{build_decision_log, ActivityTrail, DecisionTrail};
pub use eligibility::{check_eligibility, filter_eligible, BASE_PASS_CODES};
pub use kpi::CalendarKpi;
pub use runner::{CalendarEngine, EnginePlan};
pub use scheduler::{rank, Candidate, WeeklyScheduler};
pub use state::{LastUse, SchedulingState};
