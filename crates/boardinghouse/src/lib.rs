//! Student boarding-house accreditation service.
//!
//! Scores accreditation questionnaires against a fixed rubric, serves the
//! boarding-house listing catalog, and proxies shortest-path queries to a
//! spatial routing backend.

pub mod accreditation;
pub mod config;
pub mod error;
pub mod listings;
pub mod prediction;
pub mod routing;
pub mod session;
pub mod telemetry;
