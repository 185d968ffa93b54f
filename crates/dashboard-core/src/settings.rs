use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::periods::PeriodStrategy;
use crate::time_utils::TimezoneHandler;

/// Directory under the home directory holding session, config and logs.
pub const APP_DIR_NAME: &str = ".payments-dashboard";

/// Default stored-procedure endpoint root.
pub const DEFAULT_API_BASE_URL: &str = "https://api01-dev.quidly.ng/api/txdb/procedure";

/// `~/.payments-dashboard` rooted at `base_dir`.
pub fn app_dir_in(base_dir: &Path) -> PathBuf {
    base_dir.join(APP_DIR_NAME)
}

/// `~/.payments-dashboard` for the current user.
pub fn app_dir() -> PathBuf {
    app_dir_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Terminal dashboard for successful merchant payment transactions
#[derive(Parser, Debug, Clone)]
#[command(
    name = "payments-dashboard",
    about = "Terminal dashboard for successful merchant payment transactions",
    version
)]
pub struct Settings {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Bucketing granularity
    #[arg(long, global = true, default_value = "monthly", value_parser = ["monthly", "quarterly"])]
    pub period: String,

    /// Base URL of the transaction procedures
    #[arg(long, global = true, env = "PAYMENTS_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Timezone used to place transactions in periods (auto-detected if not specified)
    #[arg(long, global = true, default_value = "auto")]
    pub timezone: String,

    /// Display theme
    #[arg(long, global = true, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Skip the network and show synthetic data
    #[arg(long, global = true)]
    pub offline: bool,

    /// Logging level
    #[arg(long, global = true, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long, global = true)]
    pub clear: bool,
}

/// Subcommands. Running without one opens the dashboard.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the interactive dashboard (requires login)
    Dashboard,
    /// Log in as an operator
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the logged-in operator
    Logout,
    /// Print the per-period table and exit
    Report,
    /// Print a JSON payment blob with card data masked
    Mask {
        /// Raw `jsondata` value
        json: String,
    },
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.payments-dashboard/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        app_dir().join("last_used.json")
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        app_dir_in(base_dir).join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load persisted params from an explicit path.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`load_with_last_used`](Self::load_with_last_used) with an
    /// explicit argument list and config path.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = <Settings as CommandFactory>::command().get_matches_from(args);
        let mut settings = match Settings::from_arg_matches(&matches) {
            Ok(settings) => settings,
            Err(e) => e.exit(),
        };

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        if !is_arg_explicitly_set(&matches, "period") {
            if let Some(v) = last.period.filter(|v| v.parse::<PeriodStrategy>().is_ok()) {
                settings.period = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "api_base_url") {
            if let Some(v) = last.api_base_url {
                settings.api_base_url = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::debug!(error = %e, "could not persist last-used settings");
        }

        settings
    }

    /// Resolve `"auto"` sentinel values, replace unknown timezones with the
    /// system one, and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        } else if !TimezoneHandler::validate_timezone(&settings.timezone) {
            let system = crate::time_utils::get_system_timezone();
            tracing::warn!(
                "Unknown timezone {:?}; using system timezone {}",
                settings.timezone,
                system
            );
            settings.timezone = system;
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// The chosen granularity. Unknown values fall back to monthly.
    pub fn strategy(&self) -> PeriodStrategy {
        self.period.parse().unwrap_or_default()
    }

    /// The subcommand to run, defaulting to the dashboard.
    pub fn subcommand(&self) -> Command {
        self.command.clone().unwrap_or(Command::Dashboard)
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            period: Some(s.period.clone()),
            theme: Some(s.theme.clone()),
            timezone: Some(s.timezone.clone()),
            api_base_url: Some(s.api_base_url.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied on the command line or through
/// its environment variable.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(clap::parser::ValueSource::CommandLine | clap::parser::ValueSource::EnvVariable)
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────
