//! Work-unit metrics.
//!
//! Per-unit timing, progress, ETA, and credit estimation for the gridbot
//! worker agent. One [`UnitMetrics`] instance tracks one running unit; the
//! owning job object serializes access to it.

#![warn(missing_docs)]

pub mod estimator;

pub use estimator::UnitMetrics;
