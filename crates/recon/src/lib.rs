//! `bomdiff-recon`: BOM aggregation and reconciliation.
//!
//! Pure engine crate: canonical tables in, cleaned/classified copies out.
//! No CLI or IO dependencies.

pub mod clean;
pub mod compare;
pub mod stats;
pub mod wires;

pub use clean::clean;
pub use compare::reconcile;
pub use stats::{comparison_stats, ComparisonStats};
pub use wires::{wire_differences, WireReport, WireRow};
