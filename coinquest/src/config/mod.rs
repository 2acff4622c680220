//! Configuration for the `coinquest` command-line front end.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/coinquest/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::lifecycle::FormLimits;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    fixture: FixtureFileConfig,
    tasks: TasksFileConfig,
    wishes: WishesFileConfig,
    calendar: CalendarFileConfig,
}

/// `[fixture]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct FixtureFileConfig {
    path: Option<PathBuf>,
}

/// `[tasks]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct TasksFileConfig {
    max_title_len: Option<usize>,
}

/// `[wishes]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct WishesFileConfig {
    default_coin_cost: Option<u64>,
}

/// `[calendar]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct CalendarFileConfig {
    reference_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// JSON fixture holding the server records to operate on.
    pub fixture_path: Option<PathBuf>,
    /// Maximum task and wish title length in characters.
    pub max_title_len: usize,
    /// Coin cost pre-filled when a wish is added without one.
    pub default_wish_cost: u64,
    /// Fixed "today" for week views; `None` means the local date.
    pub reference_date: Option<NaiveDate>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fixture_path: None,
            max_title_len: FormLimits::default().max_title_len,
            default_wish_cost: 50,
            reference_date: None,
        }
    }
}

impl AppConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path
    /// (`~/.config/coinquest/config.toml`) is tried and silently ignored if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve an `AppConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            fixture_path: cli.fixture.clone().or_else(|| file.fixture.path.clone()),
            max_title_len: file
                .tasks
                .max_title_len
                .unwrap_or(defaults.max_title_len),
            default_wish_cost: file
                .wishes
                .default_coin_cost
                .unwrap_or(defaults.default_wish_cost),
            reference_date: cli.today.or(file.calendar.reference_date),
        }
    }

    /// Returns the form limits implied by this configuration.
    #[must_use]
    pub const fn form_limits(&self) -> FormLimits {
        FormLimits {
            max_title_len: self.max_title_len,
        }
    }

    /// Returns the reference date, falling back to `today`.
    #[must_use]
    pub fn reference_date_or(&self, today: NaiveDate) -> NaiveDate {
        self.reference_date.unwrap_or(today)
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Reward and progression engine for a gamified to-do list")]
pub struct CliArgs {
    /// JSON fixture of server records (`todos`, `categories`, `user`).
    #[arg(long, env = "COINQUEST_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// Write the updated records back to the fixture after a mutation.
    #[arg(long)]
    pub save: bool,

    /// Treat this date as today (`YYYY-MM-DD`).
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Path to config file (default: `~/.config/coinquest/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "COINQUEST_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/coinquest.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// What to do; defaults to an overview of wallet and rooms.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Engine operations exposed on the command line.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the tasks of one week, day by day.
    Week {
        /// Weeks away from the current one (negative for the past).
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,
    },
    /// Show progress of every room.
    Rooms,
    /// Show the tasks of one room.
    Room {
        /// Category id of the room.
        category_id: u64,
    },
    /// Show wishes and their tally.
    Wishes,
    /// Show the coins a task would earn.
    Reward {
        /// Task id.
        task_id: u64,
    },
    /// Complete a task and collect its coins.
    Complete {
        /// Task id.
        task_id: u64,
    },
    /// Spend coins on a wish.
    Fulfill {
        /// Wish id.
        wish_id: u64,
    },
    /// Add a task.
    AddTask {
        /// Title.
        #[arg(long)]
        title: String,
        /// Description.
        #[arg(long, default_value = "")]
        description: String,
        /// Category id.
        #[arg(long)]
        category: Option<u64>,
        /// Base coin value.
        #[arg(long)]
        coins: String,
        /// Due date (`YYYY-MM-DD`).
        #[arg(long)]
        due: String,
    },
    /// Add a wish.
    AddWish {
        /// Title.
        #[arg(long)]
        title: String,
        /// Description.
        #[arg(long)]
        description: String,
        /// Coin cost (defaults to the configured preset).
        #[arg(long)]
        cost: Option<String>,
    },
    /// Delete a task.
    DeleteTask {
        /// Task id.
        task_id: u64,
    },
    /// Delete a pending wish.
    DeleteWish {
        /// Wish id.
        wish_id: u64,
    },
}

impl Command {
    /// Returns `true` if the command changes records.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Complete { .. }
                | Self::Fulfill { .. }
                | Self::AddTask { .. }
                | Self::AddWish { .. }
                | Self::DeleteTask { .. }
                | Self::DeleteWish { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        // No config dir available, use defaults.
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("coinquest").join("config.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
