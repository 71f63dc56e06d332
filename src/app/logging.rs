//! Opt-in debug log and crash log.
//!
//! Both files are capped. When the debug log would pass its cap the current
//! file moves to `<name>.1` (replacing any older generation) and a fresh file
//! starts, so the lines leading up to a problem survive one rotation.

use crate::config::AppConfig;
use std::{
    env, fs,
    io::Write,
    panic,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard, OnceLock,
    },
    time::{SystemTime, UNIX_EPOCH},
};

const DEBUG_LOG_CAP: u64 = 5 * 1024 * 1024;
const CRASH_LOG_CAP: u64 = 256 * 1024;
static LOG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_CONTENT_ENABLED: AtomicBool = AtomicBool::new(false);
static DEBUG_LOG: OnceLock<Mutex<Option<RotatingLog>>> = OnceLock::new();

/// Debug log location. `VOXCHEF_LOG_FILE` overrides the temp-dir default.
pub fn log_file_path() -> PathBuf {
    env::var("VOXCHEF_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("voxchef.log"))
}

/// Crash log location (panic location and version only, unless content logging is on).
pub fn crash_log_path() -> PathBuf {
    env::temp_dir().join("voxchef_crash.log")
}

fn previous_generation(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".1");
    PathBuf::from(name)
}

/// Append-only file that rolls over to one previous generation at `cap` bytes.
struct RotatingLog {
    path: PathBuf,
    file: fs::File,
    cap: u64,
    len: u64,
}

impl RotatingLog {
    fn open(path: PathBuf, cap: u64) -> Option<Self> {
        if fs::metadata(&path).map(|m| m.len()).unwrap_or(0) > cap {
            let _ = fs::rename(&path, previous_generation(&path));
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()?;
        let len = file.metadata().map(|m| m.len()).unwrap_or(0);
        Some(Self {
            path,
            file,
            cap,
            len,
        })
    }

    fn roll_over(&mut self) {
        let _ = fs::rename(&self.path, previous_generation(&self.path));
        if let Ok(file) = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
        {
            self.file = file;
            self.len = 0;
        }
    }

    fn write(&mut self, line: &str) {
        let incoming = line.len() as u64;
        if self.len > 0 && self.len.saturating_add(incoming) > self.cap {
            self.roll_over();
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.len = self.len.saturating_add(incoming);
        }
    }
}

// The log cannot report its own poisoned lock, so it recovers silently.
fn debug_log() -> MutexGuard<'static, Option<RotatingLog>> {
    DEBUG_LOG
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn write_line(tag: Option<&str>, msg: &str) {
    let line = match tag {
        Some(tag) => format!("[{}] [{tag}] {msg}\n", unix_seconds()),
        None => format!("[{}] {msg}\n", unix_seconds()),
    };
    if let Some(log) = debug_log().as_mut() {
        log.write(&line);
    }
}

fn apply_log_flags(enabled: bool, content_enabled: bool) {
    LOG_ENABLED.store(enabled, Ordering::Relaxed);
    LOG_CONTENT_ENABLED.store(enabled && content_enabled, Ordering::Relaxed);
    *debug_log() = if enabled {
        RotatingLog::open(log_file_path(), DEBUG_LOG_CAP)
    } else {
        None
    };
}

/// Turn file logging on or off from the CLI flags.
///
/// `--no-logs` always wins. Structured tracing is installed alongside the
/// plain debug log whenever logging is enabled.
pub fn init_logging(config: &AppConfig) {
    let enabled = config.logs && !config.no_logs;
    apply_log_flags(enabled, config.log_content);
    if enabled {
        crate::telemetry::init_tracing(config);
    }
}

/// Append a line to the debug log when logging is enabled.
pub fn log_debug(msg: &str) {
    if LOG_ENABLED.load(Ordering::Relaxed) {
        write_line(None, msg);
    }
}

/// Log a line that carries what the user said. Off unless `--log-content`.
pub fn log_debug_content(msg: &str) {
    if LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        write_line(Some("content"), msg);
    }
}

/// Record a panic in the crash log.
pub fn log_panic(info: &panic::PanicHookInfo<'_>) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    let payload = if LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        if let Some(text) = info.payload().downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = info.payload().downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        }
    } else {
        "panic payload omitted (log-content disabled)".to_string()
    };

    let line = format!(
        "[{}] panic at {location}: {payload} (v{})\n",
        unix_seconds(),
        env!("CARGO_PKG_VERSION")
    );
    if let Some(mut log) = RotatingLog::open(crash_log_path(), CRASH_LOG_CAP) {
        log.write(&line);
    }
}
