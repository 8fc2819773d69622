//! File logging for the board. Every launch writes a fresh timestamped file
//! under the board's data directory and prunes the oldest ones.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_LEVEL_ENV: &str = "DND_KANBAN_LOG_LEVEL";
const LOG_DIR_ENV: &str = "DND_KANBAN_LOG_DIR";
const LOG_FILE_PREFIX: &str = "dnd-kanban-";
const LOG_FILE_EXTENSION: &str = "log";
/// Log files kept after pruning, the current one included.
const MAX_LOG_FILES: usize = 10;

pub fn init_logging() -> Result<PathBuf> {
    let log_dir = resolve_log_directory(std::env::var_os(LOG_DIR_ENV))?;
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory '{}'", log_dir.display()))?;

    let log_file_path = get_log_file_path(&log_dir);
    let file = fs::File::create(&log_file_path)
        .with_context(|| format!("failed to create log file '{}'", log_file_path.display()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // The process logs until exit; the writer thread must outlive main.
    std::mem::forget(guard);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(build_log_filter(std::env::var(LOG_LEVEL_ENV).ok().as_deref()))
        .with(file_layer)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "dnd-kanban logging to {}",
        log_file_path.display()
    );

    match prune_old_logs(&log_dir, MAX_LOG_FILES) {
        Ok(0) => {}
        Ok(removed) => info!("removed {removed} old log file(s)"),
        Err(err) => warn!("failed to prune old log files: {err:#}"),
    }

    Ok(log_file_path)
}

/// Crate targets follow the configured level. Terminal and realm internals
/// stay at warn unless tracing is requested.
fn build_log_filter(raw_level: Option<&str>) -> EnvFilter {
    let level = raw_level.and_then(normalize_log_level).unwrap_or("warn");
    let backend = if level == "trace" { "trace" } else { "warn" };
    EnvFilter::new(format!(
        "{level},dnd_kanban={level},tuirealm={backend},crossterm={backend}"
    ))
}

fn normalize_log_level(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

/// `DND_KANBAN_LOG_DIR` wins; otherwise logs sit beside the default board
/// store in `<data_local_dir>/dnd-kanban/logs`.
fn resolve_log_directory(override_dir: Option<OsString>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let data_dir = dirs::data_local_dir().context("failed to determine local data directory")?;
    Ok(data_dir.join("dnd-kanban").join("logs"))
}

fn get_log_file_path(log_dir: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    log_dir.join(format!("{LOG_FILE_PREFIX}{timestamp}.{LOG_FILE_EXTENSION}"))
}

fn is_board_log(path: &Path) -> bool {
    let name_matches = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
    name_matches && path.extension().is_some_and(|ext| ext == LOG_FILE_EXTENSION)
}

/// Deletes all but the newest `keep` board logs in `log_dir` and returns how
/// many were removed. File names carry a sortable timestamp, so name order
/// is age order. Other files are left alone.
fn prune_old_logs(log_dir: &Path, keep: usize) -> Result<usize> {
    let mut logs = fs::read_dir(log_dir)
        .with_context(|| format!("failed to list log directory '{}'", log_dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && is_board_log(path))
        .collect::<Vec<_>>();
    logs.sort();

    let excess = logs.len().saturating_sub(keep);
    for path in &logs[..excess] {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove log file '{}'", path.display()))?;
    }
    Ok(excess)
}

pub fn print_log_location(log_path: &Path) {
    println!();
    println!("  Log file: {}", log_path.display());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").expect("failed to write log fixture");
    }

    #[test]
    fn test_log_directory_defaults_under_data_dir() {
        let path = resolve_log_directory(None).expect("data dir should resolve");
        assert!(path.ends_with("dnd-kanban/logs"));

        let empty = resolve_log_directory(Some(OsString::new())).expect("data dir should resolve");
        assert_eq!(empty, path);
    }

    #[test]
    fn test_log_directory_override() {
        let path = resolve_log_directory(Some(OsString::from("/tmp/board-logs")))
            .expect("override should resolve");
        assert_eq!(path, PathBuf::from("/tmp/board-logs"));
    }

    #[test]
    fn test_get_log_file_path() {
        let path = get_log_file_path(Path::new("/tmp/test-logs"));
        assert!(is_board_log(&path));
        assert!(path.starts_with("/tmp/test-logs"));
    }

    #[test]
    fn test_prune_keeps_newest_board_logs() {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let dir = temp_dir.path();
        for day in 1..=4 {
            touch(dir, &format!("dnd-kanban-2026-01-0{day}_09-00-00.log"));
        }
        touch(dir, "dnd-kanban-notes.txt");
        touch(dir, "other-2020-01-01.log");

        assert_eq!(prune_old_logs(dir, 2).expect("prune should succeed"), 2);

        let mut left = fs::read_dir(dir)
            .expect("log dir should list")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        left.sort();
        assert_eq!(
            left,
            vec![
                "dnd-kanban-2026-01-03_09-00-00.log",
                "dnd-kanban-2026-01-04_09-00-00.log",
                "dnd-kanban-notes.txt",
                "other-2020-01-01.log",
            ]
        );
    }

    #[test]
    fn test_prune_under_limit_removes_nothing() {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        touch(temp_dir.path(), "dnd-kanban-2026-01-01_09-00-00.log");
        assert_eq!(
            prune_old_logs(temp_dir.path(), MAX_LOG_FILES).expect("prune should succeed"),
            0
        );
    }

    #[test]
    fn test_filter_keeps_backend_quiet_below_trace() {
        let debug = build_log_filter(Some("debug")).to_string();
        assert!(debug.contains("dnd_kanban=debug"));
        assert!(debug.contains("tuirealm=warn"));

        let trace = build_log_filter(Some("TRACE")).to_string();
        assert!(trace.contains("tuirealm=trace"));

        assert!(build_log_filter(Some("loud")).to_string().contains("dnd_kanban=warn"));
    }

    #[test]
    fn test_normalize_log_level() {
        assert_eq!(normalize_log_level("TRACE"), Some("trace"));
        assert_eq!(normalize_log_level(" debug "), Some("debug"));
        assert_eq!(normalize_log_level("warning"), Some("warn"));
        assert_eq!(normalize_log_level("nope"), None);
    }
}
