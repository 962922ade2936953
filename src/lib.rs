//! Weekly engagement calendarization.
//!
//! Assigns each customer a deterministic, rule-compliant sequence of
//! weekly engagement activities over a planning horizon and records why
//! every activity was or was not scheduled.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `CustomerProfile`, `ActivityDefinition`,
//!   `WeekSlot`, `CalendarEntry`, `DecisionLogEntry`, `ReasonCode`
//! - **`config`**: `EngineConfig`, the injected business tables (caps,
//!   cooldowns, bonuses, channel owners)
//! - **`engine`**: Cap resolution, eligibility, weekly scheduling,
//!   decision-log construction and KPIs
//! - **`validation`**: Input integrity checks (IDs, channels, ratios)
//! - **`library`**: Normalisation of raw activity-library records
//! - **`profile`**: Derivation of customer profiles from source records
//! - **`error`**: `EngineError`
//!
//! # Architecture
//!
//! The engine is a pure function of (config, customers, activities,
//! reference date). Upstream collaborators (`library`, `profile`,
//! `validation`) produce the normalised input tables; the engine never
//! fails on well-formed input.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - ISO 8601 week numbering

pub mod config;
pub mod engine;
pub mod error;
pub mod library;
pub mod models;
pub mod profile;
pub mod validation;
