//! Logging through `tracing`, to stderr and to a per-launch file.
//!
//! Each launch writes `pixel-picker-<unix seconds>.log` in the app log
//! directory. Older files are pruned so that at most [`MAX_LOG_FILES`]
//! remain. "Export Log" copies whatever is left into a folder the user can
//! attach to a bug report.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

pub const MAX_LOG_FILES: usize = 3;

const LOG_PREFIX: &str = "pixel-picker-";
const LOG_EXTENSION: &str = "log";
const EXPORT_PREFIX: &str = "Pixel Picker Logs";

/// Installs the global subscriber. Returns the path of this launch's log
/// file.
///
/// `debug` raises the default level from `info` to `debug`. `RUST_LOG`
/// always wins.
pub fn init_logging(log_dir: &Path, debug: bool) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(log_dir).context("failed to create log directory")?;
    // Make room for the file about to be created.
    prune_log_files(log_dir, MAX_LOG_FILES.saturating_sub(1));

    let path = log_dir.join(log_file_name(unix_seconds()));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let level = if debug || cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(build_env_filter(level))
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(
            fmt::layer()
                .with_writer(SharedFileWriter::new(file))
                .with_ansi(false),
        )
        .try_init()
        .context("logging already initialised")?;

    Ok(path)
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Dependencies stay at warn.
        EnvFilter::new(format!("warn,pixel_picker_lib={level},pixel_picker={level}"))
    })
}

pub fn log_file_name(stamp: u64) -> String {
    format!("{LOG_PREFIX}{stamp:020}.{LOG_EXTENSION}")
}

/// Log files in `dir`, oldest first.
pub fn log_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_log_file(path))
        .collect();
    files.sort();
    files
}

fn is_log_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.is_file()
        && name.starts_with(LOG_PREFIX)
        && path.extension().and_then(|e| e.to_str()) == Some(LOG_EXTENSION)
}

/// Deletes the oldest log files until at most `keep` are left.
pub fn prune_log_files(dir: &Path, keep: usize) {
    let files = log_files(dir);
    let excess = files.len().saturating_sub(keep);
    for path in files.into_iter().take(excess) {
        if let Err(err) = fs::remove_file(&path) {
            eprintln!("failed to remove old log {}: {err}", path.display());
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub destination: PathBuf,
    pub copied: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// `<base>/Pixel Picker Logs <stamp>`.
pub fn export_destination(base: &Path, stamp: u64) -> PathBuf {
    base.join(format!("{EXPORT_PREFIX} {stamp}"))
}

/// Copies every log file into `destination`. A file that fails to copy is
/// logged and skipped.
pub fn export_logs(log_dir: &Path, destination: &Path) -> anyhow::Result<ExportReport> {
    fs::create_dir_all(destination)
        .with_context(|| format!("failed to create {}", destination.display()))?;

    let mut report = ExportReport {
        destination: destination.to_path_buf(),
        ..ExportReport::default()
    };
    for source in log_files(log_dir) {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = destination.join(name);
        match fs::copy(&source, &target) {
            Ok(_) => {
                info!(from = %source.display(), to = %target.display(), "exported log");
                report.copied.push(target);
            }
            Err(err) => {
                warn!(file = %source.display(), "failed to export log: {err}");
                report.failed.push(source);
            }
        }
    }
    Ok(report)
}

/// Shows `path` in the platform file browser.
pub fn reveal_path(path: &Path) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(target_os = "windows")]
    let opener = "explorer";
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let opener = "xdg-open";

    std::process::Command::new(opener)
        .arg(path)
        .spawn()
        .with_context(|| format!("failed to launch {opener}"))?;
    Ok(())
}

pub fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<fs::File>>,
}

impl SharedFileWriter {
    fn new(file: fs::File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

struct SharedFileGuard {
    file: Arc<Mutex<fs::File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            file: Arc::clone(&self.file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).expect("write");
        path
    }

    #[test]
    fn file_names_sort_chronologically() {
        assert!(log_file_name(999) < log_file_name(1_000));
    }

    #[test]
    fn only_log_files_are_listed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = touch(dir.path(), &log_file_name(1), "a");
        touch(dir.path(), "pixelpicker.db", "");
        touch(dir.path(), "notes.log", "");
        assert_eq!(log_files(dir.path()), vec![log]);
    }

    #[test]
    fn prune_keeps_the_newest() {
        let dir = tempfile::tempdir().expect("tempdir");
        for stamp in [5, 1, 3, 4] {
            touch(dir.path(), &log_file_name(stamp), "");
        }
        prune_log_files(dir.path(), 2);
        assert_eq!(
            log_files(dir.path()),
            vec![dir.path().join(log_file_name(4)), dir.path().join(log_file_name(5))]
        );
    }

    #[test]
    fn missing_log_dir_lists_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(log_files(&dir.path().join("absent")).is_empty());
    }

    #[test]
    fn export_copies_every_log() {
        let logs = tempfile::tempdir().expect("tempdir");
        let desktop = tempfile::tempdir().expect("tempdir");
        touch(logs.path(), &log_file_name(1), "first");
        touch(logs.path(), &log_file_name(2), "second");

        let destination = export_destination(desktop.path(), 42);
        assert!(destination.ends_with("Pixel Picker Logs 42"));

        let report = export_logs(logs.path(), &destination).expect("export");
        assert_eq!(report.copied.len(), 2);
        assert!(report.failed.is_empty());
        let copied = fs::read_to_string(destination.join(log_file_name(2))).expect("read");
        assert_eq!(copied, "second");
    }
}
