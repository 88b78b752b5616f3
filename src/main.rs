// LogDigest - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation
// 3. Registry loading (the only fatal step)
// 4. Digest run, console/file output, optional export

use clap::{Parser, Subcommand, ValueEnum};
use logdigest::app;
use logdigest::core::export::{self, ExportFormat};
use logdigest::core::filter::FilterConfig;
use logdigest::core::model::ContinuationPolicy;
use logdigest::core::report::ReportOptions;
use logdigest::core::window::SystemClock;
use logdigest::platform::config::{
    load_config, parse_delimiter, AppConfig, PlatformPaths, DELIMITER_EXPECTED,
};
use logdigest::platform::fs::expand_home;
use logdigest::util::constants;
use logdigest::util::error::{LogDigestError, RegistryError, Result};
use std::path::{Path, PathBuf};

/// LogDigest - category-grouped digest of recent log activity.
///
/// Reads a registry of `CATEGORY|DESCRIPTION|PATH|COLOR` lines and prints
/// the recent lines of every listed log file, grouped by category.
#[derive(Parser, Debug)]
#[command(name = "logdigest", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Registry file (default: sources.conf in the platform config directory).
    #[arg(short = 'r', long = "registry", global = true)]
    registry: Option<PathBuf>,

    /// Only show lines stamped within the last N minutes.
    #[arg(
        short = 'm',
        long = "minutes",
        value_parser = clap::value_parser!(u32).range(
            i64::from(constants::MIN_WINDOW_MINUTES)..=i64::from(constants::MAX_WINDOW_MINUTES)
        )
    )]
    minutes: Option<u32>,

    /// Show at most the last N lines per source (0 = unlimited).
    #[arg(short = 'n', long = "lines")]
    max_lines: Option<u32>,

    /// Show file size and modification time for each source.
    #[arg(long = "metadata")]
    show_metadata: bool,

    /// Also write the plain-text report to this file.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Disable ANSI colour on the console.
    #[arg(long = "no-color")]
    no_color: bool,

    /// Registry field delimiter.
    #[arg(long = "delimiter", value_parser = delimiter_arg)]
    delimiter: Option<char>,

    /// How to treat lines without a leading timestamp while a window is active.
    #[arg(long = "continuation", value_enum)]
    continuation: Option<ContinuationArg>,

    /// Write a machine-readable copy of the report to this file.
    #[arg(long = "export")]
    export: Option<PathBuf>,

    /// Format for --export.
    #[arg(long = "export-format", value_enum, default_value_t = ExportArg::Json)]
    export_format: ExportArg,

    /// Path to config.toml (default: platform config directory).
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,
}

fn delimiter_arg(raw: &str) -> std::result::Result<char, String> {
    parse_delimiter(raw).ok_or_else(|| format!("expected {DELIMITER_EXPECTED}"))
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a commented default registry to the registry path.
    Init {
        /// Overwrite an existing registry.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ContinuationArg {
    Include,
    Inherit,
    Exclude,
}

impl From<ContinuationArg> for ContinuationPolicy {
    fn from(arg: ContinuationArg) -> Self {
        match arg {
            ContinuationArg::Include => ContinuationPolicy::Include,
            ContinuationArg::Inherit => ContinuationPolicy::Inherit,
            ContinuationArg::Exclude => ContinuationPolicy::Exclude,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportArg {
    Json,
    Csv,
}

impl From<ExportArg> for ExportFormat {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Json => ExportFormat::Json,
            ExportArg::Csv => ExportFormat::Csv,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let platform_paths = PlatformPaths::resolve();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform_paths.config_file.clone());
    let (config, config_warnings) = load_config(&config_path);

    init_logging(&cli, &config);

    for warning in &config_warnings {
        tracing::warn!(error = %warning, "Configuration warning");
    }

    // Registry path: CLI override > config.toml > platform default
    let registry_path = cli
        .registry
        .clone()
        .or_else(|| config.registry_path.clone())
        .map(|p| expand_home(&p.to_string_lossy()))
        .unwrap_or_else(|| platform_paths.registry_file.clone());

    let result = match &cli.command {
        Some(Command::Init { force }) => init_registry(&registry_path, *force),
        None => run_digest(&cli, &config, &registry_path),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "LogDigest failed");
        eprintln!("Error: {e}");
        if matches!(e, LogDigestError::Registry(RegistryError::NotFound { .. })) {
            eprintln!("Hint: run `logdigest init` to create a default registry.");
        }
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli, config: &AppConfig) {
    logdigest::util::logging::init(cli.debug, config.log_level.as_deref());
    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "LogDigest starting"
    );
}

fn init_registry(path: &Path, force: bool) -> Result<()> {
    app::init::write_default_registry(path, force)?;
    println!("Wrote default registry to {}", path.display());
    Ok(())
}

fn run_digest(cli: &Cli, config: &AppConfig, registry_path: &Path) -> Result<()> {
    let delimiter = cli.delimiter.unwrap_or(config.delimiter);
    let (registry, skipped) = app::digest::load_registry(registry_path, delimiter)?;

    let filter_config = FilterConfig {
        max_lines: cli.max_lines.unwrap_or(config.max_lines),
        continuation: cli
            .continuation
            .map(ContinuationPolicy::from)
            .unwrap_or(config.continuation),
        ..Default::default()
    };
    let minutes = cli.minutes.or(config.minutes);

    let report = app::digest::digest(
        &registry,
        skipped.len(),
        minutes,
        &SystemClock,
        &filter_config,
    );

    let color = config.color && !cli.no_color && std::env::var_os(constants::NO_COLOR_ENV).is_none();
    let options = ReportOptions {
        show_metadata: cli.show_metadata || config.show_metadata,
        color,
    };
    let output_file = cli.output.clone().or_else(|| config.output_file.clone());

    let stdout = std::io::stdout();
    let failures = app::output::emit_report(&report, &options, stdout.lock(), output_file.as_deref());

    if let Some(export_path) = &cli.export {
        let file = std::fs::File::create(export_path).map_err(|source| LogDigestError::Io {
            path: export_path.clone(),
            operation: "export",
            source,
        })?;
        export::export_report(
            &report,
            cli.export_format.into(),
            std::io::BufWriter::new(file),
            export_path,
        )?;
    }

    match failures.into_iter().next() {
        Some(failure) => Err(failure.into()),
        None => Ok(()),
    }
}
