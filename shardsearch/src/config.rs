use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{SearchError, SearchResult};

/// How worker buffers get filled during the Distributing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistributionMode {
    /// Each worker opens its own read-only handle and loads its range
    /// directly; file-position state is never shared.
    #[default]
    SelfLoad,
    /// The coordinator reads every range sequentially over one handle
    /// (seeking explicitly before each read) and ships each buffer to its
    /// worker. For when workers cannot reach the file themselves.
    Ship,
}

/// Configuration for one search run.
///
/// Can be loaded from YAML config files in order of precedence:
/// 1. Custom config file passed to [`SearchConfig::load_from`]
/// 2. Local `.shardsearch.yaml` in the current directory
/// 3. Global `$HOME/.config/shardsearch/config.yaml`
///
/// Example:
/// ```yaml
/// worker-count: 8
/// distribution: ship
/// log-level: "debug"
/// ```
///
/// CLI arguments take precedence over config file values; the merging
/// behavior is defined in [`SearchConfig::merge_with_cli`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchConfig {
    /// The raw pattern argument; normalized before matching
    #[serde(default)]
    pub pattern: String,

    /// File backing the corpus
    #[serde(default)]
    pub corpus_path: PathBuf,

    /// Number of workers the corpus is partitioned across
    /// Defaults to the number of CPU cores if not specified
    #[serde(default = "default_worker_count")]
    pub worker_count: NonZeroUsize,

    /// How worker buffers are filled (self-load or ship)
    #[serde(default)]
    pub distribution: DistributionMode,

    /// Whether to print a run summary instead of individual offsets
    #[serde(default)]
    pub stats_only: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// CLI-provided values to merge over a loaded configuration.
///
/// `None` means the flag was absent, so the configuration file value (or
/// its default) stands. `Some` always wins, even when the value the user
/// typed happens to equal the built-in default.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub pattern: Option<String>,
    pub corpus_path: Option<PathBuf>,
    pub worker_count: Option<NonZeroUsize>,
    pub distribution: Option<DistributionMode>,
    pub stats_only: bool,
    pub log_level: Option<String>,
}

fn default_worker_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get().max(1)).unwrap()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            corpus_path: PathBuf::new(),
            worker_count: default_worker_count(),
            distribution: DistributionMode::default(),
            stats_only: false,
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Convenience constructor with default parallelism and mode.
    pub fn new(pattern: impl Into<String>, corpus_path: impl Into<PathBuf>) -> Self {
        Self {
            pattern: pattern.into(),
            corpus_path: corpus_path.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from the default locations
    pub fn load() -> SearchResult<Self> {
        Self::load_from(None)
    }

    /// Loads configuration, additionally reading a specific file
    pub fn load_from(config_path: Option<&Path>) -> SearchResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("shardsearch/config.yaml")),
            // Local config
            Some(PathBuf::from(".shardsearch.yaml")),
            // Custom config
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            } else if config_path == Some(path.as_path()) {
                return Err(SearchError::config_error(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        }

        builder
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| SearchError::config_error(e.to_string()))
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        // Any flag the user actually gave takes precedence
        if let Some(pattern) = cli.pattern {
            self.pattern = pattern;
        }
        if let Some(corpus_path) = cli.corpus_path {
            self.corpus_path = corpus_path;
        }
        if let Some(worker_count) = cli.worker_count {
            self.worker_count = worker_count;
        }
        if let Some(distribution) = cli.distribution {
            self.distribution = distribution;
        }
        if cli.stats_only {
            self.stats_only = true;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        self
    }
}
