//! Rewrite metrics for one locale's run through the pipeline.
//!
//! Counts how many markers of each kind were replaced and how many kept their
//! source text because the translation key was missing. Each locale gets its
//! own `RewriteMetrics`; nothing is shared between locales.

use crate::markers::MarkerKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// Replaced/missing counts for a single marker kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassCounts {
    pub replaced: usize,
    pub missing: usize,
}

/// Counters collected while localizing one document.
#[derive(Debug, Clone, Default)]
pub struct RewriteMetrics {
    passes: BTreeMap<MarkerKind, PassCounts>,

    /// Structured-data fields overlaid with a translation
    structured_data_fields: usize,

    /// Whether the structured-data payload was present but unparseable
    structured_data_skipped: bool,
}

impl RewriteMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one marker pass.
    pub fn record_pass(&mut self, kind: MarkerKind, replaced: usize, missing: usize) {
        let counts = self.passes.entry(kind).or_default();
        counts.replaced += replaced;
        counts.missing += missing;
    }

    pub fn record_structured_data(&mut self, fields: usize) {
        self.structured_data_fields += fields;
    }

    pub fn record_structured_data_skipped(&mut self) {
        self.structured_data_skipped = true;
    }

    /// Counts for one kind (zero if the pass never ran).
    pub fn pass(&self, kind: MarkerKind) -> PassCounts {
        self.passes.get(&kind).copied().unwrap_or_default()
    }

    /// Total markers replaced across all passes.
    pub fn replaced(&self) -> usize {
        self.passes.values().map(|c| c.replaced).sum()
    }

    /// Total markers left untouched across all passes.
    pub fn missing(&self) -> usize {
        self.passes.values().map(|c| c.missing).sum()
    }

    pub fn structured_data_fields(&self) -> usize {
        self.structured_data_fields
    }

    /// Generate a metrics report for `locale`.
    pub fn report(&self, locale: &str) -> MetricsReport {
        let replaced = self.replaced();
        let missing = self.missing();
        let total = replaced + missing;
        let coverage = if total > 0 {
            (replaced as f64 / total as f64) * 100.0
        } else {
            100.0
        };

        MetricsReport {
            locale: locale.to_string(),
            replaced,
            missing,
            coverage,
            passes: self.passes.clone(),
            structured_data_fields: self.structured_data_fields,
            structured_data_skipped: self.structured_data_skipped,
        }
    }
}

/// Serializable summary of a locale's rewrite metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub locale: String,

    /// Markers replaced
    pub replaced: usize,

    /// Markers whose key was missing
    pub missing: usize,

    /// Replaced markers as a percentage of all markers (100 when there are none)
    pub coverage: f64,

    /// Per-kind counts
    pub passes: BTreeMap<MarkerKind, PassCounts>,

    pub structured_data_fields: usize,
    pub structured_data_skipped: bool,
}
