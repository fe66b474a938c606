//! One analysis pass over a dataset.
//!
//! [`InsightSession`] wires the components together in order:
//!
//! ```text
//! Dataset ─► profile ─┬─► charts (memoized)
//!                     └─► context ─► prompt ─► provider ─► extraction ─► report
//! ```
//!
//! Narrative failures reported by the provider are kept as they are and only
//! skip the steps that need the reply; profile and charts are still returned.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::ai::{NarrativeFailure, NarrativeProvider};
use crate::charts::{ChartAggregator, ChartCache, ChartData};
use crate::config::AnalysisConfig;
use crate::context::{ContextSummary, ContextSummaryBuilder, prompt};
use crate::error::{InsightError, Result};
use crate::narrative::{NarrativeExtractor, NarrativeResult};
use crate::profiler::{DataProfiler, DatasetProfile};
use crate::report::{CustomAnswer, InsightReport};
use crate::types::{ChartSpec, Column, Dataset};

/// Model name recorded for replies that were not generated in this pass.
pub const SAVED_REPLY_MODEL: &str = "saved";

/// What narrative work a pass should do.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NarrativeRequest {
    /// Profile and charts only.
    #[default]
    Skip,
    /// Ask the provider for a full structured analysis.
    FullAnalysis,
    /// Ask the provider a free-form question.
    Question(String),
    /// Extract structure from a reply obtained earlier.
    SavedReply(String),
}

/// Narrative part of an [`Analysis`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NarrativeOutcome {
    Skipped,
    Report {
        extraction: NarrativeResult,
        report: InsightReport,
    },
    Answer {
        extraction: NarrativeResult,
        answer: CustomAnswer,
    },
    /// The provider failed; the failure is passed through unchanged.
    Failed { failure: NarrativeFailure },
}

impl NarrativeOutcome {
    pub fn report(&self) -> Option<&InsightReport> {
        match self {
            Self::Report { report, .. } => Some(report),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&NarrativeFailure> {
        match self {
            Self::Failed { failure } => Some(failure),
            _ => None,
        }
    }
}

/// A chart spec with its aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResult {
    pub spec: ChartSpec,
    pub data: ChartData,
}

/// Everything one pass produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub profile: DatasetProfile,
    pub charts: Vec<ChartResult>,
    pub context: ContextSummary,
    pub narrative: NarrativeOutcome,
}

/// Orchestrates profiling, charting, context building and narration.
///
/// # Example
///
/// ```rust,ignore
/// use datainsight_core::{InsightSession, NarrativeRequest};
/// use datainsight_core::ai::GeminiProvider;
/// use std::sync::Arc;
///
/// let session = InsightSession::builder()
///     .provider(Arc::new(GeminiProvider::from_env()?))
///     .build()?;
/// let analysis = session.analyze(&dataset, &charts, &NarrativeRequest::FullAnalysis)?;
/// ```
pub struct InsightSession {
    config: AnalysisConfig,
    provider: Option<Arc<dyn NarrativeProvider>>,
    cache: Arc<ChartCache>,
}

static_assertions::assert_impl_all!(InsightSession: Send, Sync);

impl InsightSession {
    pub fn builder() -> InsightSessionBuilder {
        InsightSessionBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Classify columns and compute statistics.
    pub fn profile(&self, dataset: &Dataset) -> DatasetProfile {
        DataProfiler::profile_dataset(dataset, &self.config)
    }

    /// Aggregate one chart, reusing earlier results computed for the same
    /// dataset, chart bounds and axis types.
    pub fn chart(&self, dataset: &Dataset, columns: &[Column], spec: &ChartSpec) -> ChartData {
        self.cache.get_or_compute(dataset, spec, &self.config, columns, || {
            ChartAggregator::new(&self.config).aggregate(dataset, columns, spec)
        })
    }

    pub fn context(&self, dataset: &Dataset, profile: &DatasetProfile) -> ContextSummary {
        ContextSummaryBuilder::new(&self.config).from_profile(dataset, profile)
    }

    /// Extract structure from reply text.
    pub fn extract(&self, text: &str) -> NarrativeResult {
        NarrativeExtractor::new(&self.config).extract_default(text)
    }

    /// Run a full pass.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the request needs a provider and none is
    /// configured. Provider failures are not errors; they are reported in
    /// [`Analysis::narrative`].
    pub fn analyze(
        &self,
        dataset: &Dataset,
        charts: &[ChartSpec],
        request: &NarrativeRequest,
    ) -> Result<Analysis> {
        info!(
            "Starting analysis of dataset v{} ({} rows)",
            dataset.version(),
            dataset.len()
        );

        info!("Step 1: Profiling dataset...");
        let profile = self.profile(dataset);

        info!("Step 2: Aggregating {} chart(s)...", charts.len());
        let charts = charts
            .iter()
            .map(|spec| ChartResult {
                spec: spec.clone(),
                data: self.chart(dataset, &profile.columns, spec),
            })
            .collect();

        info!("Step 3: Building context summary...");
        let context = self.context(dataset, &profile);

        let narrative = self.narrate(&context, request)?;

        Ok(Analysis {
            profile,
            charts,
            context,
            narrative,
        })
    }

    fn narrate(&self, context: &ContextSummary, request: &NarrativeRequest) -> Result<NarrativeOutcome> {
        let instruction = match request {
            NarrativeRequest::Skip => return Ok(NarrativeOutcome::Skipped),
            NarrativeRequest::SavedReply(text) => {
                info!("Step 4: Extracting saved narrative...");
                let extraction = self.extract(text);
                let report = InsightReport::assemble(&extraction, text, SAVED_REPLY_MODEL);
                return Ok(NarrativeOutcome::Report { extraction, report });
            }
            NarrativeRequest::FullAnalysis => prompt::analysis_instruction(context)?,
            NarrativeRequest::Question(question) => prompt::question_instruction(question, context)?,
        };

        let provider = self.provider.as_ref().ok_or_else(|| {
            InsightError::InvalidConfig("a narrative provider is required".to_string())
        })?;

        info!("Step 4: Requesting narrative from {}...", provider.name());
        let full_prompt = prompt::render_prompt(context, &instruction)?;
        let reply = match provider.generate(&full_prompt) {
            Ok(reply) => reply,
            Err(failure) => {
                warn!("Narrative step skipped: {}", failure);
                return Ok(NarrativeOutcome::Failed { failure });
            }
        };

        info!("Step 5: Extracting narrative structure...");
        let extraction = self.extract(&reply.text);
        Ok(match request {
            NarrativeRequest::Question(question) => {
                let answer = CustomAnswer::assemble(question, &extraction, &reply.text, &reply.model);
                NarrativeOutcome::Answer { extraction, answer }
            }
            _ => {
                let report = InsightReport::assemble(&extraction, &reply.text, &reply.model);
                NarrativeOutcome::Report { extraction, report }
            }
        })
    }
}

/// Builder for [`InsightSession`].
#[derive(Default)]
pub struct InsightSessionBuilder {
    config: Option<AnalysisConfig>,
    provider: Option<Arc<dyn NarrativeProvider>>,
    cache: Option<Arc<ChartCache>>,
}

impl InsightSessionBuilder {
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn NarrativeProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Share a chart cache between sessions.
    pub fn cache(mut self, cache: Arc<ChartCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the session, validating the configuration.
    pub fn build(self) -> Result<InsightSession> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(InsightSession {
            config,
            provider: self.provider,
            cache: self.cache.unwrap_or_default(),
        })
    }
}
