//! Metrics collection using Prometheus
//!
//! The collector owns its own registry. Exposition is left to whatever
//! surface embeds the engine.

use anyhow::Result;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the quiz engine
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Answer and rating metrics
    answer_metrics: AnswerMetrics,

    /// Question selection metrics
    selection_metrics: SelectionMetrics,
}

/// Answer and rating metrics
#[derive(Clone)]
pub struct AnswerMetrics {
    /// Graded answers by result
    pub answers_total: IntCounterVec,

    /// Answers whose rating update the cap suppressed
    pub rating_updates_suppressed_total: IntCounter,

    /// Report-skip records written
    pub report_skips_total: IntCounter,

    /// Time spent grading, updating and persisting one answer
    pub rating_update_duration: Histogram,
}

/// Question selection metrics
#[derive(Clone)]
pub struct SelectionMetrics {
    /// Selections by path (closest / fallback)
    pub selections_total: IntCounterVec,

    /// Failed selections by reason
    pub selection_errors_total: IntCounterVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let answer_metrics = AnswerMetrics::new(&registry)?;
        let selection_metrics = SelectionMetrics::new(&registry)?;

        Ok(Self {
            registry,
            answer_metrics,
            selection_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn answers(&self) -> &AnswerMetrics {
        &self.answer_metrics
    }

    pub fn selection(&self) -> &SelectionMetrics {
        &self.selection_metrics
    }

    /// Record a graded answer
    pub fn record_answer(&self, correct: bool, rating_applied: bool, duration: Duration) {
        let result = if correct { "correct" } else { "incorrect" };

        self.answer_metrics
            .answers_total
            .with_label_values(&[result])
            .inc();

        if !rating_applied {
            self.answer_metrics.rating_updates_suppressed_total.inc();
        }

        self.answer_metrics
            .rating_update_duration
            .observe(duration.as_secs_f64());
    }

    pub fn record_report_skip(&self) {
        self.answer_metrics.report_skips_total.inc();
    }

    /// Record a successful selection
    pub fn record_selection(&self, fallback: bool) {
        let path = if fallback { "fallback" } else { "closest" };

        self.selection_metrics
            .selections_total
            .with_label_values(&[path])
            .inc();
    }

    /// Record a selection that ended in an error
    pub fn record_selection_error(&self, reason: &str) {
        self.selection_metrics
            .selection_errors_total
            .with_label_values(&[reason])
            .inc();
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl AnswerMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let answers_total = IntCounterVec::new(
            Opts::new("quiz_ladder_answers_total", "Total graded answers"),
            &["result"],
        )?;
        registry.register(Box::new(answers_total.clone()))?;

        let rating_updates_suppressed_total = IntCounter::new(
            "quiz_ladder_rating_updates_suppressed_total",
            "Answers whose rating update was suppressed by the rating cap",
        )?;
        registry.register(Box::new(rating_updates_suppressed_total.clone()))?;

        let report_skips_total = IntCounter::new(
            "quiz_ladder_report_skips_total",
            "Report-skip answer records written",
        )?;
        registry.register(Box::new(report_skips_total.clone()))?;

        let rating_update_duration = Histogram::with_opts(
            HistogramOpts::new(
                "quiz_ladder_rating_update_duration_seconds",
                "Time to grade an answer and persist both ratings",
            )
            .buckets(vec![0.00001, 0.0001, 0.001, 0.01, 0.1]),
        )?;
        registry.register(Box::new(rating_update_duration.clone()))?;

        Ok(Self {
            answers_total,
            rating_updates_suppressed_total,
            report_skips_total,
            rating_update_duration,
        })
    }
}

impl SelectionMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let selections_total = IntCounterVec::new(
            Opts::new("quiz_ladder_selections_total", "Questions selected"),
            &["path"],
        )?;
        registry.register(Box::new(selections_total.clone()))?;

        let selection_errors_total = IntCounterVec::new(
            Opts::new(
                "quiz_ladder_selection_errors_total",
                "Question selections that failed",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(selection_errors_total.clone()))?;

        Ok(Self {
            selections_total,
            selection_errors_total,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}
