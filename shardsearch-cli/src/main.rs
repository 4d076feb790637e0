use clap::error::ErrorKind;
use clap::Parser;
use shardsearch::{search, CliOverrides, DistributionMode, SearchConfig, SearchError};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, SearchError>;

/// Distributed exact substring search over a file-backed corpus.
///
/// Prints one line per match to standard output: the global byte offset
/// where the pattern occurs, in strictly increasing order. Exits 0 on
/// success (zero matches included), 1 on invalid input, 2 on a worker
/// failure mid-run.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pattern to search for; shell quoting artifacts are stripped
    pattern: String,

    /// File containing the corpus to search
    corpus_file: PathBuf,

    /// Number of workers (defaults to available parallelism)
    worker_count: Option<NonZeroUsize>,

    /// How worker buffers are filled (self-load | ship, defaults to self-load)
    #[arg(long)]
    mode: Option<String>,

    /// Optional YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a run summary instead of individual offsets
    #[arg(short, long)]
    stats: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    let code = match run() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("shardsearch: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

/// Parses the command line, keeping clap's rendering but remapping its
/// exit code: a missing or malformed argument is invalid input (exit 1),
/// not a mid-run worker failure.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => SearchError::invalid_argument(e.to_string()).exit_code(),
            };
            let _ = e.print();
            std::process::exit(code);
        }
    }
}

fn run() -> Result<()> {
    let cli = parse_cli();

    let distribution = match cli.mode.as_deref() {
        None => None,
        Some("self-load") => Some(DistributionMode::SelfLoad),
        Some("ship") => Some(DistributionMode::Ship),
        Some(other) => {
            return Err(SearchError::invalid_argument(format!(
                "unknown distribution mode: {other} (expected self-load or ship)"
            )))
        }
    };

    let overrides = CliOverrides {
        pattern: Some(cli.pattern),
        corpus_path: Some(cli.corpus_file),
        worker_count: cli.worker_count,
        distribution,
        stats_only: cli.stats,
        log_level: cli.log_level,
    };

    let config = SearchConfig::load_from(cli.config.as_deref())?.merge_with_cli(overrides);
    init_tracing(&config.log_level);

    let report = search(&config)?;

    if config.stats_only {
        println!(
            "Found {} matches in {} bytes using {} workers",
            report.total_matches(),
            report.corpus_len,
            report.worker_count
        );
    } else {
        for offset in &report.offsets {
            println!("{offset}");
        }
    }
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
