//! h1brief - HackerOne program briefings
//!
//! The `h1brief` command fetches a bug-bounty program from HackerOne and
//! writes a reviewed Markdown brief for security researchers.
//!
//! ## Commands
//!
//! - `list`: List programs accessible to the API user
//! - `search`: Find programs through hacktivity
//! - `find`: Filter accessible programs by name
//! - `analyze`: Generate the brief for one program

mod menu;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};

use h1brief_core::{
    find_programs_by_name, run_analysis, write_report, write_review_artifact, HackerOneClient,
    OpenRouterConfig, OpenRouterGenerator, PipelineConfig, ProgramRecord, ProgramSource,
    ProgramSummary, ReportGenerator, ReviewArtifact, RunStatus, DEFAULT_REPORT_PATH, METRICS,
};

#[derive(Parser)]
#[command(name = "h1brief")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Summarize HackerOne bug bounty programs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines and JSON command output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List programs accessible to the configured API user
    List,

    /// Search hacktivity for programs matching a query
    Search {
        /// Handle, name or lucene-style query string
        query: String,
    },

    /// Filter accessible programs by name or handle (case-insensitive)
    Find {
        needle: String,
    },

    /// Analyze a program and write a Markdown brief
    Analyze {
        /// Program handle (interactive selection if omitted)
        handle: Option<String>,

        /// Output path for the brief
        #[arg(short, long, default_value = DEFAULT_REPORT_PATH)]
        output: PathBuf,

        /// Re-summarize attempts after a failed review
        #[arg(long, default_value_t = 2, env = "H1BRIEF_MAX_RETRIES")]
        max_retries: u32,

        /// Model override (default: OPENROUTER_MODEL or openai/gpt-4o-mini)
        #[arg(long)]
        model: Option<String>,

        /// Skip writing the review artifact next to the brief
        #[arg(long)]
        no_artifact: bool,
    },
}

/// Options for one `analyze` invocation.
struct AnalyzeOptions {
    output: PathBuf,
    pipeline: PipelineConfig,
    write_artifact: bool,
    json: bool,
}

#[derive(Debug, Serialize)]
struct AnalyzeOutput {
    handle: String,
    status: RunStatus,
    output: PathBuf,
    artifact: Option<PathBuf>,
    retries: u32,
    generator_calls: u32,
    deficiencies: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    h1brief_core::init_tracing(cli.json, level);

    let result = run(cli).await;
    METRICS.flush();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::List => cmd_list(&connect()?, cli.json, &mut stdout).await,
        Commands::Search { query } => cmd_search(&connect()?, &query, cli.json, &mut stdout).await,
        Commands::Find { needle } => cmd_find(&connect()?, &needle, cli.json, &mut stdout).await,
        Commands::Analyze {
            handle,
            output,
            max_retries,
            model,
            no_artifact,
        } => {
            let client = connect()?;
            let generator = generator(model.as_deref())?;

            let program = match handle {
                Some(handle) => client
                    .fetch_program(&handle)
                    .await
                    .with_context(|| format!("Failed to fetch program '{}'", handle))?,
                None => {
                    let programs = client
                        .list_accessible_programs()
                        .await
                        .context("Failed to list accessible programs")?;
                    let mut input = tokio::io::BufReader::new(tokio::io::stdin());
                    menu::select_program(&client, &programs, &mut input, &mut stdout).await?
                }
            };

            let options = AnalyzeOptions {
                output,
                pipeline: PipelineConfig::default().with_max_retries(max_retries),
                write_artifact: !no_artifact,
                json: cli.json,
            };
            cmd_analyze(&generator, program, &options, &mut stdout)
                .await
                .map(|_| ())
        }
    }
}

fn connect() -> Result<HackerOneClient> {
    HackerOneClient::from_env().context(
        "HackerOne API credentials not found. Set HACKERONE_API_USERNAME/HACKERONE_API_TOKEN \
         or create .hackerone with 'username:api_token'",
    )
}

fn generator(model: Option<&str>) -> Result<OpenRouterGenerator> {
    let mut config = OpenRouterConfig::from_env().context(
        "OpenRouter API key not found. Set OPENROUTER_API_KEY or create .openrouter_api_key",
    )?;
    if let Some(model) = model {
        config = config.with_model(model);
    }
    let generator = OpenRouterGenerator::new(config).context("Failed to build OpenRouter client")?;
    info!("OpenRouter model: {}", generator.model());
    Ok(generator)
}

fn print_programs(programs: &[ProgramSummary], json: bool, out: &mut dyn Write) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(programs)?)?;
        return Ok(());
    }
    for (idx, program) in programs.iter().enumerate() {
        writeln!(out, "{}. {}", idx + 1, program)?;
    }
    Ok(())
}

/// List accessible programs
async fn cmd_list(source: &dyn ProgramSource, json: bool, out: &mut dyn Write) -> Result<()> {
    let programs = source
        .list_accessible_programs()
        .await
        .context("Failed to list accessible programs")?;

    if programs.is_empty() && !json {
        writeln!(out, "No programs found. Make sure your API token is valid.")?;
        return Ok(());
    }
    print_programs(&programs, json, out)
}

/// Search hacktivity for programs
async fn cmd_search(
    source: &dyn ProgramSource,
    query: &str,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let programs = source
        .search_hacktivity(query)
        .await
        .with_context(|| format!("Hacktivity search for '{}' failed", query))?;

    if programs.is_empty() && !json {
        writeln!(out, "No programs found via hacktivity for '{}'", query)?;
        return Ok(());
    }
    print_programs(&programs, json, out)
}

/// Filter accessible programs by name
async fn cmd_find(
    source: &dyn ProgramSource,
    needle: &str,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let programs = source
        .list_accessible_programs()
        .await
        .context("Failed to list accessible programs")?;
    let matches = find_programs_by_name(&programs, needle);

    if matches.is_empty() && !json {
        writeln!(out, "No accessible program matches '{}'", needle)?;
        return Ok(());
    }
    print_programs(&matches, json, out)
}

/// Run the pipeline for `program` and persist the brief.
///
/// Hard failures return an error before anything is written. A degraded
/// run still writes the annotated brief and returns `Ok`.
async fn cmd_analyze(
    generator: &dyn ReportGenerator,
    program: ProgramRecord,
    options: &AnalyzeOptions,
    out: &mut dyn Write,
) -> Result<AnalyzeOutput> {
    let handle = program.handle.clone();
    if !options.json {
        writeln!(out, "Analyzing: {} ({})\n", program.name, program.handle)?;
    }

    let outcome = run_analysis(generator, program, options.pipeline)
        .await
        .with_context(|| format!("Analysis of '{}' failed", handle))?;

    write_report(&options.output, &outcome)
        .with_context(|| format!("Failed to write report to {:?}", options.output))?;

    let artifact = if options.write_artifact {
        let record = ReviewArtifact::from_outcome(&outcome, &generator.name());
        Some(
            write_review_artifact(&options.output, &record)
                .context("Failed to write review artifact")?,
        )
    } else {
        None
    };

    let summary = AnalyzeOutput {
        handle: outcome.handle.clone(),
        status: outcome.status,
        output: options.output.clone(),
        artifact,
        retries: outcome.retries,
        generator_calls: outcome.generator_calls,
        deficiencies: outcome.deficiencies.clone(),
    };

    if options.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        render_analyze_text(&summary, out)?;
    }
    Ok(summary)
}

fn render_analyze_text(summary: &AnalyzeOutput, out: &mut dyn Write) -> Result<()> {
    match summary.status {
        RunStatus::Complete => writeln!(out, "✓ Analysis complete!")?,
        RunStatus::Degraded => {
            writeln!(out, "✗ Analysis finished with an incomplete report:")?;
            for deficiency in &summary.deficiencies {
                writeln!(out, "  - {}", deficiency)?;
            }
        }
    }
    writeln!(
        out,
        "Retries: {}, model calls: {}",
        summary.retries, summary.generator_calls
    )?;
    writeln!(out, "✓ Summary saved to: {}", display_path(&summary.output))?;
    if let Some(artifact) = &summary.artifact {
        writeln!(out, "Review artifact: {}", display_path(artifact))?;
    }
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
