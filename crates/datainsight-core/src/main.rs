//! CLI entry point for dataset insight analysis.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use datainsight_core::utils::{format_number, truncate_chars};
use datainsight_core::{
    Analysis, ChartData, ChartPoint, ChartSpec, ChartType, InsightSession, Measure,
    NarrativeOutcome, NarrativeRequest, ingest, sample,
};
use dotenv::dotenv;
use std::path::Path;
use tracing::{info, warn};

#[cfg(feature = "ai")]
use datainsight_core::ai::GeminiProvider;
#[cfg(feature = "ai")]
use std::sync::Arc;

/// CLI-compatible chart type enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliChartType {
    /// Average (or count) per category
    Bar,
    /// Same aggregation as bar, drawn as a line
    Line,
    /// Top slices by total
    Pie,
    /// Raw numeric pairs
    Scatter,
}

impl From<CliChartType> for ChartType {
    fn from(cli: CliChartType) -> Self {
        match cli {
            CliChartType::Bar => ChartType::Bar,
            CliChartType::Line => ChartType::Line,
            CliChartType::Pie => ChartType::Pie,
            CliChartType::Scatter => ChartType::Scatter,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Profile a dataset, aggregate charts and narrate insights",
    long_about = "Loads a CSV or JSON dataset (or a generated sample), infers column types, \
                  computes descriptive statistics and chart aggregations, and optionally asks \
                  Gemini for a structured narrative.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  GEMINI_API_KEY    API key used by --narrate and --question\n  \
                  RUST_LOG          Overrides --log-level (e.g. RUST_LOG=debug)\n\n\
                  EXAMPLES:\n  \
                  datainsight --input vendas.csv\n  \
                  datainsight --sample --chart bar --x regiao --y vendas\n  \
                  datainsight --input vendas.json --chart bar --x mes --y vendas --group regiao\n  \
                  datainsight --sample --narrate\n  \
                  datainsight --sample --question \"Qual região vende mais?\"\n  \
                  datainsight --input vendas.csv --narrative-file resposta.txt --json"
)]
struct Args {
    /// Input dataset (.csv or .json)
    #[arg(short, long, conflicts_with = "sample", required_unless_present = "sample")]
    input: Option<String>,

    /// Use the generated sales sample, optionally with a seed
    #[arg(long, num_args = 0..=1, default_missing_value = "42", value_name = "SEED")]
    sample: Option<u64>,

    /// Chart to aggregate
    #[arg(short, long, value_enum)]
    chart: Option<CliChartType>,

    /// Category (or horizontal) field of the chart
    #[arg(short = 'x', long = "x", value_name = "FIELD")]
    x_field: Option<String>,

    /// Measured field; omit or pass "count" to count records
    #[arg(short = 'y', long = "y", value_name = "FIELD")]
    y_field: Option<String>,

    /// Series field for grouped bar charts
    #[arg(short, long, value_name = "FIELD")]
    group: Option<String>,

    /// Ask the narrative provider for a full analysis
    #[arg(long, conflicts_with_all = ["question", "narrative_file"])]
    narrate: bool,

    /// Ask the narrative provider a free-form question
    #[arg(long, conflicts_with = "narrative_file")]
    question: Option<String>,

    /// Extract insights from a previously saved narrative reply
    #[arg(long, value_name = "PATH")]
    narrative_file: Option<String>,

    /// Output the analysis as JSON to stdout (disables logging)
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize logging with the specified level.
///
/// If `json_output` is true, logging is disabled entirely so that
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    dotenv().ok();

    let dataset = match (&args.input, args.sample) {
        (Some(input), _) => {
            if !Path::new(input).exists() {
                return Err(anyhow!("Input file not found: {}", input));
            }
            ingest::load_path(input)?
        }
        (None, Some(seed)) => {
            info!("Generating sample dataset (seed {})", seed);
            sample::sample_dataset(seed)?
        }
        (None, None) => return Err(anyhow!("Either --input or --sample is required")),
    };

    let request = narrative_request(&args)?;
    let session = build_session(&request)?;

    let charts: Vec<ChartSpec> = args.chart.map(|chart| chart_spec(&args, chart)).into_iter().collect();

    let analysis = session.analyze(&dataset, &charts, &request)?;

    if let Some(failure) = analysis.narrative.failure() {
        warn!("{} ({})", failure.kind.user_message(), failure.kind.error_code());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_human_readable_summary(&analysis, &args);
    }

    Ok(())
}

fn chart_spec(args: &Args, chart: CliChartType) -> ChartSpec {
    let mut spec = ChartSpec::new(chart.into());
    if let Some(ref x) = args.x_field {
        spec = spec.x(x);
    }
    if let Some(ref y) = args.y_field {
        spec = spec.y(y);
    }
    if let Some(ref group) = args.group {
        spec = spec.group(group);
    }
    spec
}

fn narrative_request(args: &Args) -> Result<NarrativeRequest> {
    if let Some(ref path) = args.narrative_file {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read narrative file {}: {}", path, e))?;
        return Ok(NarrativeRequest::SavedReply(text));
    }
    if let Some(ref question) = args.question {
        if question.trim().is_empty() {
            return Err(anyhow!("--question must not be empty"));
        }
        return Ok(NarrativeRequest::Question(question.clone()));
    }
    if args.narrate {
        return Ok(NarrativeRequest::FullAnalysis);
    }
    Ok(NarrativeRequest::Skip)
}

/// Build the session, attaching a provider only when the request needs one.
#[cfg(feature = "ai")]
fn build_session(request: &NarrativeRequest) -> Result<InsightSession> {
    let builder = InsightSession::builder();
    let builder = match request {
        NarrativeRequest::FullAnalysis | NarrativeRequest::Question(_) => {
            let provider = GeminiProvider::from_env()?;
            info!("Narrative provider initialized (Gemini)");
            builder.provider(Arc::new(provider))
        }
        _ => builder,
    };
    Ok(builder.build()?)
}

#[cfg(not(feature = "ai"))]
fn build_session(request: &NarrativeRequest) -> Result<InsightSession> {
    if matches!(
        request,
        NarrativeRequest::FullAnalysis | NarrativeRequest::Question(_)
    ) {
        return Err(anyhow!(
            "--narrate and --question need the 'ai' feature. Rebuild with: cargo build --features ai"
        ));
    }
    Ok(InsightSession::builder().build()?)
}

/// Print a human-readable summary of the analysis.
///
/// This is the default output when `--json` is not specified.
fn print_human_readable_summary(analysis: &Analysis, args: &Args) {
    let profile = &analysis.profile;
    let overview = &profile.overview;

    println!();
    println!("{}", "=".repeat(80));
    println!("ANALYSIS COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    let source = match (&args.input, args.sample) {
        (Some(input), _) => input.clone(),
        (None, Some(seed)) => format!("sample (seed {})", seed),
        (None, None) => "unknown".to_string(),
    };
    println!(
        "Input: {} ({} rows x {} columns)",
        source, overview.total_rows, overview.total_columns
    );
    println!(
        "Columns: {} numeric, {} categorical, {} missing values",
        overview.numeric_columns, overview.categorical_columns, overview.total_missing
    );
    println!();

    println!("COLUMN PROFILES");
    println!("{}", "-".repeat(40));
    println!(
        "{:<20} {:<12} {:<12} {:<12} {:<12} {:<8}",
        "Column", "Type", "Mean", "Min", "Max", "Missing"
    );
    println!("{}", "-".repeat(80));
    for column in &profile.columns {
        let missing = profile.missing_values.get(&column.name).copied().unwrap_or(0);
        match profile.column_stats.get(&column.name) {
            Some(stats) => println!(
                "{:<20} {:<12} {:<12} {:<12} {:<12} {:<8}",
                truncate_chars(&column.name, 19),
                column.column_type.as_str(),
                format_number(stats.mean),
                format_number(stats.min),
                format_number(stats.max),
                missing
            ),
            None => println!(
                "{:<20} {:<12} {:<12} {:<12} {:<12} {:<8}",
                truncate_chars(&column.name, 19),
                column.column_type.as_str(),
                "-",
                "-",
                "-",
                missing
            ),
        }
    }
    println!();

    for chart in &analysis.charts {
        println!("CHART: {}", chart.spec.chart_type);
        println!("{}", "-".repeat(40));
        print_chart(&chart.data);
        println!();
    }

    match &analysis.narrative {
        NarrativeOutcome::Skipped => {}
        NarrativeOutcome::Report { report, .. } => {
            println!("NARRATIVE ({})", report.model_used);
            println!("{}", "-".repeat(40));
            println!("  {}", report.overview);
            println!();
            println!("Insights:");
            for insight in &report.insights {
                println!("  - {}", insight);
            }
            println!("Key Findings:");
            for finding in &report.key_findings {
                println!("  - {}", finding);
            }
            println!();
        }
        NarrativeOutcome::Answer { answer, .. } => {
            println!("ANSWER ({})", answer.model);
            println!("{}", "-".repeat(40));
            println!("  Q: {}", answer.question);
            println!("  A: {}", answer.answer);
            for insight in &answer.related_insights {
                println!("  - {}", insight);
            }
            println!();
        }
        NarrativeOutcome::Failed { failure } => {
            println!("NARRATIVE UNAVAILABLE");
            println!("{}", "-".repeat(40));
            println!("  ! {}", failure.kind.user_message());
            println!();
        }
    }

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}

fn print_chart(data: &ChartData) {
    if let Some(reason) = data.empty_reason() {
        println!("  (empty: {})", reason);
        return;
    }
    if !data.series().is_empty() {
        println!("  Series: {}", data.series().join(", "));
    }
    for point in data.points() {
        match point {
            ChartPoint::Category { x, measure } => match measure {
                Measure::Average(v) => println!("  {:<24} {}", x, format_number(*v)),
                Measure::Count(n) => println!("  {:<24} {} (count)", x, n),
            },
            ChartPoint::Grouped { x, cells } => {
                let cells: Vec<String> = cells
                    .iter()
                    .map(|(series, v)| format!("{}={}", series, format_number(*v)))
                    .collect();
                println!("  {:<24} {}", x, cells.join("  "));
            }
            ChartPoint::Slice { name, value } => {
                println!("  {:<24} {}", name, format_number(*value))
            }
            ChartPoint::Scatter { x, y } => {
                println!("  ({}, {})", format_number(*x), format_number(*y))
            }
        }
    }
}
