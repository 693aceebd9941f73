use crate::config::settings::DebugLogRotation;
use crate::config::Config;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "projsel-debug.log";

/// Keeps the background log writer alive; logs stop flushing once dropped.
pub struct LogGuard(#[allow(dead_code)] WorkerGuard);

/// Initialize debug logging.
///
/// When `debug` is enabled, logs are written to `<config_dir>/projsel/projsel-debug.log`
/// by default. When `debug` is disabled, this is a no-op.
pub fn init(config: &Config) -> Result<Option<LogGuard>> {
    if !config.debug {
        return Ok(None);
    }

    let rotation = config.debug_log_rotation.unwrap_or(DebugLogRotation::Session);
    let base = resolve_base_log_path(config.debug_log_path.as_deref())?;
    let (writer, log_path, guard) = open_writer(&base, rotation, config.debug_log_keep)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("projsel=debug,warn"))
        .unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .ok(); // Already initialized (e.g. in tests).

    tracing::info!(log_file = %log_path.display(), rotation = ?rotation, "debug logging enabled");

    Ok(Some(LogGuard(guard)))
}

fn open_writer(
    base: &Path,
    rotation: DebugLogRotation,
    keep: Option<usize>,
) -> Result<(NonBlocking, PathBuf, WorkerGuard)> {
    match rotation {
        DebugLogRotation::None => {
            let file = open_append(base)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            Ok((non_blocking, base.to_path_buf(), guard))
        }
        DebugLogRotation::Daily => {
            let (dir, base_name) = split_dir_and_name(base)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            let kind = RotationKind::Daily {
                base_name: base_name.clone(),
            };
            cleanup_rotated_logs(&dir, &kind, keep)?;

            let appender = tracing_appender::rolling::daily(&dir, &base_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            Ok((non_blocking, base.to_path_buf(), guard))
        }
        DebugLogRotation::Session => {
            let (dir, base_name) = split_dir_and_name(base)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            let kind = RotationKind::Session {
                base_name: base_name.clone(),
            };
            cleanup_rotated_logs(&dir, &kind, keep)?;

            let session_path = build_session_log_path(&dir, &base_name);
            let file = open_append(&session_path)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            Ok((non_blocking, session_path, guard))
        }
    }
}

fn open_append(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

fn resolve_base_log_path(config_value: Option<&str>) -> Result<PathBuf> {
    let Some(raw) = config_value else {
        return Ok(crate::config::config_dir()?.join(LOG_FILE_NAME));
    };

    let path = PathBuf::from(expand_tilde(raw));

    if raw.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
        return Ok(path.join(LOG_FILE_NAME));
    }

    Ok(path)
}

fn expand_tilde(raw: &str) -> String {
    if raw == "~" || raw.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let suffix = raw.strip_prefix('~').unwrap_or("");
            return format!("{}{}", home.display(), suffix);
        }
    }
    raw.to_string()
}

fn split_dir_and_name(path: &Path) -> Result<(PathBuf, String)> {
    let dir = path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid debug_log_path: not valid UTF-8")?
        .to_string();
    Ok((dir, name))
}

fn build_session_log_path(dir: &Path, base_name: &str) -> PathBuf {
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
    dir.join(format!("{base_name}.session-{ts}"))
}

enum RotationKind {
    Daily { base_name: String },
    Session { base_name: String },
}

impl RotationKind {
    /// Whether `name` is a file this rotation produced.
    fn matches(&self, name: &str) -> bool {
        match self {
            // tracing_appender::rolling::daily uses `{base_name}.{YYYY-MM-DD}`
            RotationKind::Daily { base_name } => name
                .strip_prefix(base_name.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .is_some_and(is_date_suffix),
            RotationKind::Session { base_name } => name
                .strip_prefix(base_name.as_str())
                .is_some_and(|rest| rest.starts_with(".session-")),
        }
    }
}

fn is_date_suffix(suffix: &str) -> bool {
    suffix.len() == 10
        && suffix.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn cleanup_rotated_logs(dir: &Path, kind: &RotationKind, keep: Option<usize>) -> Result<usize> {
    let keep = keep.unwrap_or(match kind {
        RotationKind::Daily { .. } => 7,
        RotationKind::Session { .. } => 20,
    });

    if keep == 0 {
        return Ok(0);
    }

    let mut candidates: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?
    {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else { continue };
        if kind.matches(name) {
            candidates.push(name.to_string());
        }
    }

    // Newest first; both suffix formats sort lexicographically by time.
    candidates.sort_unstable_by(|a, b| b.cmp(a));

    let mut removed = 0;
    for name in candidates.iter().skip(keep) {
        let path = dir.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => {
                tracing::debug!(error = %e, file = %path.display(), "failed to remove old log file")
            }
        }
    }

    Ok(removed)
}

/// Best-effort redaction of bearer tokens (e.g. echoed back in error bodies).
pub fn redact_secrets(input: &str) -> String {
    const PREFIX: &str = "Bearer ";

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(PREFIX) {
        let token_start = pos + PREFIX.len();
        let token_len = rest[token_start..]
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'='))
            .count();

        out.push_str(&rest[..token_start]);
        // Require a minimum length to reduce false positives.
        if token_len >= 8 {
            out.push_str("***REDACTED***");
        } else {
            out.push_str(&rest[token_start..token_start + token_len]);
        }
        rest = &rest[token_start + token_len..];
    }

    out.push_str(rest);
    out
}
