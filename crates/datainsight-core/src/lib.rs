//! Data Insight Library
//!
//! Profiling, chart aggregation and narrative extraction for AI-assisted
//! exploration of rectangular datasets.
//!
//! # Overview
//!
//! - **Type Inference**: numeric vs categorical classification from a leading sample
//! - **Descriptive Statistics**: mean, extrema, population standard deviation, missing counts
//! - **Chart Aggregation**: bar, line, grouped bar, pie and scatter views
//! - **Context Summaries**: a bounded digest of the dataset for a language model
//! - **Narrative Extraction**: sections, bullets and key sentences from free text
//! - **AI Narration**: optional Gemini integration behind the `ai` feature
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use datainsight_core::{ChartSpec, ChartType, InsightSession, NarrativeRequest, ingest};
//!
//! let dataset = ingest::load_path("vendas.csv")?;
//! let session = InsightSession::builder().build()?;
//!
//! let charts = [ChartSpec::new(ChartType::Bar).x("regiao").y("vendas")];
//! let analysis = session.analyze(&dataset, &charts, &NarrativeRequest::Skip)?;
//!
//! for column in &analysis.profile.columns {
//!     println!("{}: {}", column.name, column.column_type.as_str());
//! }
//! println!("{}", serde_json::to_string_pretty(&analysis.charts[0].data.to_rows())?);
//! ```
//!
//! # Narration
//!
//! With a [`ai::NarrativeProvider`] configured, the session renders a prompt
//! from the context summary, sends it, and turns the reply into an
//! [`InsightReport`]:
//!
//! ```rust,ignore
//! use datainsight_core::ai::GeminiProvider;
//! use std::sync::Arc;
//!
//! let session = InsightSession::builder()
//!     .provider(Arc::new(GeminiProvider::from_env()?))
//!     .build()?;
//! let analysis = session.analyze(&dataset, &[], &NarrativeRequest::FullAnalysis)?;
//!
//! match analysis.narrative.report() {
//!     Some(report) => println!("{}", report.overview),
//!     None => println!("no narrative: {:?}", analysis.narrative.failure()),
//! }
//! ```
//!
//! # Configuration
//!
//! Every bound (sample sizes, series and slice limits, extraction thresholds)
//! lives in [`AnalysisConfig`]:
//!
//! ```rust,ignore
//! let config = AnalysisConfig::builder()
//!     .pie_top_n(5)
//!     .max_series(3)
//!     .unknown_label("Sem valor")
//!     .build()?;
//! ```

pub mod ai;
pub mod charts;
pub mod config;
pub mod context;
pub mod error;
pub mod ingest;
pub mod narrative;
pub mod profiler;
pub mod report;
pub mod sample;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use charts::{ChartAggregator, ChartCache, ChartData, ChartPoint, EmptyReason, Measure};
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, ChartBounds, ConfigValidationError, TALLY_SENTINEL,
};
pub use context::{ContextSummary, ContextSummaryBuilder, OrderedStats};
pub use error::{InsightError, Result as InsightResult, ResultExt};
pub use narrative::{DEFAULT_SECTION_LABELS, NarrativeExtractor, NarrativeResult};
pub use profiler::{DataProfiler, DatasetOverview, DatasetProfile};
pub use report::{CustomAnswer, InsightReport};
pub use session::{Analysis, InsightSession, InsightSessionBuilder, NarrativeOutcome, NarrativeRequest};
pub use types::{ChartSpec, ChartType, Column, ColumnStats, ColumnType, Dataset, Record, Value};
