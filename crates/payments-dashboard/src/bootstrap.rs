use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashboard_core::settings::{app_dir, Command};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default log file name inside `~/.payments-dashboard/logs/`.
pub const DEFAULT_LOG_FILE: &str = "dashboard.log";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.payments-dashboard/` and its `logs/` subdirectory exist.
pub fn ensure_directories() -> anyhow::Result<PathBuf> {
    let dir = app_dir();
    ensure_directories_in(&dir)?;
    Ok(dir)
}

/// Create `dir` and `dir/logs`, including any missing parents.
pub fn ensure_directories_in(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::create_dir_all(dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// The dashboard owns the screen, so it always logs to a file; the other
/// commands log to stderr unless `--log-file` is given.
pub fn log_target(command: &Command, log_file: Option<&Path>, app_dir: &Path) -> LogTarget {
    match (command, log_file) {
        (_, Some(path)) => LogTarget::File(path.to_path_buf()),
        (Command::Dashboard, None) => {
            LogTarget::File(app_dir.join("logs").join(DEFAULT_LOG_FILE))
        }
        _ => LogTarget::Stderr,
    }
}

/// Map a CLI level name to an [`EnvFilter`] directive.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Unknown level names fall back to `"info"`.
pub fn setup_logging(log_level: &str, target: &LogTarget) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, stderr_layer) = match target {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        LogTarget::Stderr => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── ensure_directories ────────────────────────────────────────────────────

    #[test]
    fn test_ensure_directories_in() {
        let tmp = TempDir::new().expect("tempdir");
        let dir = tmp.path().join(".payments-dashboard");

        ensure_directories_in(&dir).expect("ensure_directories_in should succeed");

        assert!(dir.is_dir(), ".payments-dashboard dir must exist");
        assert!(dir.join("logs").is_dir(), "logs subdir must exist");
    }

    #[test]
    fn test_ensure_directories_in_is_idempotent() {
        let tmp = TempDir::new().expect("tempdir");
        let dir = tmp.path().join("app");
        ensure_directories_in(&dir).expect("first");
        ensure_directories_in(&dir).expect("second");
        assert!(dir.join("logs").is_dir());
    }

    // ── log_target ────────────────────────────────────────────────────────────

    #[test]
    fn test_log_target_dashboard_defaults_to_file() {
        let app = Path::new("/home/op/.payments-dashboard");
        assert_eq!(
            log_target(&Command::Dashboard, None, app),
            LogTarget::File(app.join("logs").join("dashboard.log"))
        );
    }

    #[test]
    fn test_log_target_report_defaults_to_stderr() {
        let app = Path::new("/tmp/app");
        assert_eq!(log_target(&Command::Report, None, app), LogTarget::Stderr);
        assert_eq!(
            log_target(
                &Command::Mask {
                    json: "{}".to_string()
                },
                None,
                app
            ),
            LogTarget::Stderr
        );
    }

    #[test]
    fn test_log_target_explicit_file_wins() {
        let app = Path::new("/tmp/app");
        let file = Path::new("/var/log/pd.log");
        assert_eq!(
            log_target(&Command::Report, Some(file), app),
            LogTarget::File(file.to_path_buf())
        );
        assert_eq!(
            log_target(&Command::Dashboard, Some(file), app),
            LogTarget::File(file.to_path_buf())
        );
    }

    // ── level_directive ───────────────────────────────────────────────────────

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("info"), "info");
        assert_eq!(level_directive("WARNING"), "warn");
        assert_eq!(level_directive("ERROR"), "error");
        assert_eq!(level_directive("CRITICAL"), "error");
        assert_eq!(level_directive("TRACE"), "trace");
    }
}
