//! Engagement calendar domain models.
//!
//! Inputs are two immutable tables (customer profiles and the activity
//! catalog); outputs are two append-only tables (calendar entries and the
//! decision log).
//!
//! # Table Contracts
//!
//! | Model | Direction | Key |
//! |-------|-----------|-----|
//! | CustomerProfile | input | customer_id |
//! | ActivityDefinition | input | activity_id |
//! | CalendarEntry | output | (customer_id, week_bucket) |
//! | DecisionLogEntry | output | (customer_id, activity_id) |

mod activity;
mod calendar;
mod customer;
mod decision;

pub use activity::{admits, ActivityDefinition, RepeatPenaltyMode};
pub use calendar::{
    month_bucket, planning_weeks, week_bucket, week_start, CalendarEntry, WeekSlot,
};
pub use customer::CustomerProfile;
pub use decision::{
    CapSource, DecisionLogEntry, Failure, Outcome, ReasonCode, Stage, UnknownReasonCode,
};
