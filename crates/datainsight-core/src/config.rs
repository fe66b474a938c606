//! Configuration types for the insight pipeline.
//!
//! Every bound the profiling, aggregation, context and extraction steps use
//! lives in [`AnalysisConfig`], built with the builder pattern.

use serde::{Deserialize, Serialize};

/// The `y_field` value that switches aggregations into counting mode.
pub const TALLY_SENTINEL: &str = "count";

/// Configuration for an analysis pass.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use datainsight_core::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .pie_top_n(5)
///     .scatter_max_points(250)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of leading records inspected when inferring column types.
    /// Default: 10
    pub inference_sample_rows: usize,

    /// Number of slices kept in a pie chart (largest first).
    /// Default: 10
    pub pie_top_n: usize,

    /// Maximum number of points in a scatter chart.
    /// Default: 100
    pub scatter_max_points: usize,

    /// Maximum number of x-groups in an ungrouped bar or line chart.
    /// Default: 20
    pub category_max_groups: usize,

    /// Maximum number of series in a grouped bar chart.
    /// Default: 5
    pub max_series: usize,

    /// Number of records copied into the context summary.
    /// Default: 5
    pub context_sample_records: usize,

    /// Number of sample values listed per column in the context summary.
    /// Default: 3
    pub context_column_samples: usize,

    /// Maximum number of bullet items recovered from a narrative.
    /// Default: 5
    pub bullet_limit: usize,

    /// Minimum length (in characters) of a bullet item.
    /// Default: 10
    pub bullet_min_chars: usize,

    /// Maximum number of key sentences recovered from a narrative.
    /// Default: 3
    pub sentence_limit: usize,

    /// Minimum length (in characters) of a key sentence.
    /// Default: 20
    pub sentence_min_chars: usize,

    /// Label used for records whose category field is missing.
    /// Default: "Unknown"
    pub unknown_label: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            inference_sample_rows: 10,
            pie_top_n: 10,
            scatter_max_points: 100,
            category_max_groups: 20,
            max_series: 5,
            context_sample_records: 5,
            context_column_samples: 3,
            bullet_limit: 5,
            bullet_min_chars: 10,
            sentence_limit: 3,
            sentence_min_chars: 20,
            unknown_label: "Unknown".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let limits = [
            ("inference_sample_rows", self.inference_sample_rows),
            ("pie_top_n", self.pie_top_n),
            ("scatter_max_points", self.scatter_max_points),
            ("category_max_groups", self.category_max_groups),
            ("max_series", self.max_series),
            ("context_sample_records", self.context_sample_records),
            ("context_column_samples", self.context_column_samples),
            ("bullet_limit", self.bullet_limit),
            ("sentence_limit", self.sentence_limit),
        ];

        for (field, value) in limits {
            if value == 0 {
                return Err(ConfigValidationError::ZeroLimit {
                    field: field.to_string(),
                });
            }
        }

        if self.unknown_label.trim().is_empty() {
            return Err(ConfigValidationError::EmptyUnknownLabel);
        }

        Ok(())
    }

    /// The settings a chart aggregation depends on.
    pub fn chart_bounds(&self) -> ChartBounds {
        ChartBounds {
            pie_top_n: self.pie_top_n,
            scatter_max_points: self.scatter_max_points,
            category_max_groups: self.category_max_groups,
            max_series: self.max_series,
            unknown_label: self.unknown_label.clone(),
        }
    }
}

/// Subset of [`AnalysisConfig`] that shapes chart aggregation, usable as a
/// cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChartBounds {
    pub pie_top_n: usize,
    pub scatter_max_points: usize,
    pub category_max_groups: usize,
    pub max_series: usize,
    pub unknown_label: String,
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid limit for '{field}': must be at least 1")]
    ZeroLimit { field: String },

    #[error("The unknown-category label must not be blank")]
    EmptyUnknownLabel,
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    inference_sample_rows: Option<usize>,
    pie_top_n: Option<usize>,
    scatter_max_points: Option<usize>,
    category_max_groups: Option<usize>,
    max_series: Option<usize>,
    context_sample_records: Option<usize>,
    context_column_samples: Option<usize>,
    bullet_limit: Option<usize>,
    bullet_min_chars: Option<usize>,
    sentence_limit: Option<usize>,
    sentence_min_chars: Option<usize>,
    unknown_label: Option<String>,
}

impl AnalysisConfigBuilder {
    /// Set how many leading records are used for type inference.
    pub fn inference_sample_rows(mut self, rows: usize) -> Self {
        self.inference_sample_rows = Some(rows);
        self
    }

    /// Set how many pie slices are kept.
    pub fn pie_top_n(mut self, n: usize) -> Self {
        self.pie_top_n = Some(n);
        self
    }

    /// Set the scatter point cap.
    pub fn scatter_max_points(mut self, n: usize) -> Self {
        self.scatter_max_points = Some(n);
        self
    }

    /// Set the x-group cap for ungrouped bar and line charts.
    pub fn category_max_groups(mut self, n: usize) -> Self {
        self.category_max_groups = Some(n);
        self
    }

    /// Set the series cap for grouped bar charts.
    pub fn max_series(mut self, n: usize) -> Self {
        self.max_series = Some(n);
        self
    }

    /// Set how many records the context summary carries.
    pub fn context_sample_records(mut self, n: usize) -> Self {
        self.context_sample_records = Some(n);
        self
    }

    /// Set how many sample values each column lists in the context summary.
    pub fn context_column_samples(mut self, n: usize) -> Self {
        self.context_column_samples = Some(n);
        self
    }

    /// Set the bullet item cap.
    pub fn bullet_limit(mut self, n: usize) -> Self {
        self.bullet_limit = Some(n);
        self
    }

    /// Set the minimum bullet length in characters.
    pub fn bullet_min_chars(mut self, n: usize) -> Self {
        self.bullet_min_chars = Some(n);
        self
    }

    /// Set the key sentence cap.
    pub fn sentence_limit(mut self, n: usize) -> Self {
        self.sentence_limit = Some(n);
        self
    }

    /// Set the minimum key sentence length in characters.
    pub fn sentence_min_chars(mut self, n: usize) -> Self {
        self.sentence_min_chars = Some(n);
        self
    }

    /// Set the label used for missing category values.
    pub fn unknown_label(mut self, label: impl Into<String>) -> Self {
        self.unknown_label = Some(label.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            inference_sample_rows: self
                .inference_sample_rows
                .unwrap_or(defaults.inference_sample_rows),
            pie_top_n: self.pie_top_n.unwrap_or(defaults.pie_top_n),
            scatter_max_points: self
                .scatter_max_points
                .unwrap_or(defaults.scatter_max_points),
            category_max_groups: self
                .category_max_groups
                .unwrap_or(defaults.category_max_groups),
            max_series: self.max_series.unwrap_or(defaults.max_series),
            context_sample_records: self
                .context_sample_records
                .unwrap_or(defaults.context_sample_records),
            context_column_samples: self
                .context_column_samples
                .unwrap_or(defaults.context_column_samples),
            bullet_limit: self.bullet_limit.unwrap_or(defaults.bullet_limit),
            bullet_min_chars: self.bullet_min_chars.unwrap_or(defaults.bullet_min_chars),
            sentence_limit: self.sentence_limit.unwrap_or(defaults.sentence_limit),
            sentence_min_chars: self
                .sentence_min_chars
                .unwrap_or(defaults.sentence_min_chars),
            unknown_label: self.unknown_label.unwrap_or(defaults.unknown_label),
        };

        config.validate()?;
        Ok(config)
    }
}

impl From<ConfigValidationError> for crate::error::InsightError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::InsightError::InvalidConfig(err.to_string())
    }
}
