// `log` backend installed by `app::config::load_config_from_disk` (or directly by a host).
// Records land in a bounded in-memory buffer the host reads back with `recent` to show the
// controller's activity next to the page; warn+ lines also go to the configured log file,
// and everything is mirrored to stderr when LIVE_FILTER_LOG_STDERR is truthy.

use lazy_static::lazy_static;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

const MAX_RECORDS: usize = 5000;

lazy_static! {
    static ref RECORDS: Mutex<VecDeque<String>> = Mutex::new(VecDeque::new());
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
    static ref MIRROR_STDERR: bool = std::env::var("LIVE_FILTER_LOG_STDERR")
        .map(|v| is_truthy(&v))
        .unwrap_or(false);
}

struct LiveFilterLogger;

impl Log for LiveFilterLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:>5}] {}: {}",
            timestamp_millis(),
            record.level(),
            record.target(),
            record.args()
        );

        if *MIRROR_STDERR {
            eprintln!("{line}");
        }
        if record.level() <= Level::Warn {
            if let Ok(mut file) = LOG_FILE.lock() {
                if let Some(f) = file.as_mut() {
                    let _ = writeln!(f, "{line}");
                }
            }
        }
        record_line(line);
    }

    fn flush(&self) {
        if let Ok(mut file) = LOG_FILE.lock() {
            if let Some(f) = file.as_mut() {
                let _ = f.flush();
            }
        }
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn record_line(line: String) {
    if let Ok(mut buf) = RECORDS.lock() {
        if buf.len() == MAX_RECORDS {
            buf.pop_front();
        }
        buf.push_back(line);
    }
}

/// Level named by a `RUST_LOG`-style value, if any.
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    let v = value.to_lowercase();
    [
        ("trace", LevelFilter::Trace),
        ("debug", LevelFilter::Debug),
        ("info", LevelFilter::Info),
        ("warn", LevelFilter::Warn),
        ("error", LevelFilter::Error),
        ("off", LevelFilter::Off),
    ]
    .into_iter()
    .find(|(name, _)| v.contains(name))
    .map(|(_, level)| level)
}

/// Install the logger. Level comes from `RUST_LOG`, default info.
/// Calling again keeps the installed logger but re-applies the level and,
/// when given, switches the warn+ file.
pub fn init(log_file: Option<&Path>) {
    let installed = log::set_boxed_logger(Box::new(LiveFilterLogger)).is_ok();
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| parse_level(&v))
        .unwrap_or(LevelFilter::Info);
    log::set_max_level(level);

    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => {
                if let Ok(mut file) = LOG_FILE.lock() {
                    *file = Some(f);
                }
            }
            Err(e) => log::warn!("Cannot open log file {}: {}", path.to_string_lossy(), e),
        }
    }

    if installed {
        log::info!("Live filter logger initialized at level {level}");
    }
}

/// The last `limit` buffered records, oldest first.
pub fn recent(limit: usize) -> Vec<String> {
    match RECORDS.lock() {
        Ok(buf) => buf.iter().skip(buf.len().saturating_sub(limit)).cloned().collect(),
        Err(_) => Vec::new(),
    }
}

fn timestamp_millis() -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    format!("{}.{:03}", now.as_secs(), now.subsec_millis())
}
