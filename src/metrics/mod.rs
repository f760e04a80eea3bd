//! Metrics for the quiz engine
//!
//! This module provides Prometheus counters and histograms for answers,
//! rating updates and question selection.

pub mod collector;

pub use collector::{AnswerMetrics, MetricsCollector, MetricsTimer, SelectionMetrics};
