use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use resume_core::config_file::{self, ConfigFile};
use resume_parsing::{ParsingConfig, ParsingConfigBuilder, ResumeExtractor};

mod output;

use output::ColorMode;

/// Resume Parser - Extract an evidence-backed candidate profile from a resume
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log per-line parsing decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a PDF, DOCX, or text resume into a candidate profile
    Parse {
        /// Path to the resume file
        file_path: PathBuf,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Path to output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to a config file (default: .resume-parser.toml, then the platform config)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Abort if parsing takes longer than this many milliseconds
        #[arg(long)]
        budget_ms: Option<u64>,
    },

    /// Show the line view the parser works on: locator, original text and search text
    Lines {
        /// Path to the resume file
        file_path: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Path to a config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Parse {
            file_path,
            json,
            no_color,
            output,
            config,
            budget_ms,
        } => parse(file_path, json, no_color, output, config, budget_ms),
        Command::Lines {
            file_path,
            no_color,
            config,
        } => lines(file_path, no_color, config),
    }
}

/// Logs go to stderr so stdout stays clean for JSON.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_file_config(path: Option<&Path>) -> anyhow::Result<ConfigFile> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            config_file::load_from_path(&path.to_path_buf())
                .ok_or_else(|| anyhow::anyhow!("Could not parse config file: {}", path.display()))
        }
        None => Ok(config_file::load_config()),
    }
}

/// Resolve parsing settings: CLI flags > config file > defaults.
fn build_parsing_config(file: &ConfigFile, budget_ms: Option<u64>) -> anyhow::Result<ParsingConfig> {
    let mut builder = match &file.parsing {
        Some(section) => ParsingConfigBuilder::from_file_section(section),
        None => ParsingConfigBuilder::new(),
    };
    if let Some(ms) = budget_ms {
        builder = builder.time_budget(Duration::from_millis(ms));
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("Invalid pattern in configuration: {}", e))
}

fn parse(
    file_path: PathBuf,
    json: bool,
    no_color: bool,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    budget_ms: Option<u64>,
) -> anyhow::Result<()> {
    let file_config = load_file_config(config.as_deref())?;
    let output_section = file_config.output.clone().unwrap_or_default();
    let json = json || output_section.json.unwrap_or(false);
    let use_color = !no_color && output.is_none() && output_section.color.unwrap_or(true);
    let color = ColorMode(use_color);

    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let extractor = ResumeExtractor::with_config(build_parsing_config(&file_config, budget_ms)?);
    let response = resume_ingest::parse_file_with(&file_path, &extractor)?;

    let mut writer: Box<dyn Write> = if let Some(ref output_path) = output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    };

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&response)?)?;
        return Ok(());
    }

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.display().to_string());

    output::print_profile(&mut writer, &file_name, &response, color)?;
    output::print_experiences(&mut writer, &response.candidate_profile.experiences, color)?;
    output::print_education(&mut writer, &response.candidate_profile.education, color)?;
    output::print_confidence(&mut writer, &response.confidence_scores, color)?;
    output::print_warnings(&mut writer, &response.warnings, color)?;

    Ok(())
}

fn lines(file_path: PathBuf, no_color: bool, config: Option<PathBuf>) -> anyhow::Result<()> {
    let color = ColorMode(!no_color);

    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let file_config = load_file_config(config.as_deref())?;
    let extractor = ResumeExtractor::with_config(build_parsing_config(&file_config, None)?);
    let lines = resume_ingest::read_lines(&file_path)?;
    let normalized = extractor.normalize_lines(&lines);

    let mut writer = std::io::stdout().lock();
    output::print_lines(&mut writer, &normalized, color)?;
    Ok(())
}
