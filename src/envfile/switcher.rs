// src/envfile/switcher.rs

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use regex::{NoExpand, Regex};
use tracing::{debug, info, warn};

use crate::config::EndpointsSection;
use crate::errors::ConfigError;
use crate::events::EventBus;
use crate::types::{Channel, EnvironmentMode};

pub const DATABASE_KEY: &str = "DATABASE_URL";
pub const REDIS_KEY: &str = "REDIS_URL";

static ENTRY_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [DATABASE_KEY, REDIS_KEY]
        .into_iter()
        .map(|key| (key, entry_pattern(key)))
        .collect()
});

fn entry_pattern(key: &str) -> Regex {
    // `[^\r\n]*` keeps a CRLF line ending intact.
    Regex::new(&format!(r"(?m)^{}=[^\r\n]*", regex::escape(key)))
        .expect("escaped key always forms a valid pattern")
}

/// Points the environment file at one mode's infrastructure endpoints.
///
/// `apply` is a read-modify-write of the whole file. It holds the
/// path-keyed lock from [`super::lock`] for the duration, and replaces the
/// file through a rename so a reader never observes a half-written file.
#[derive(Debug, Clone)]
pub struct ConfigModeSwitcher {
    path: PathBuf,
    endpoints: EndpointsSection,
    bus: EventBus,
    lock: Arc<Mutex<()>>,
}

impl ConfigModeSwitcher {
    pub fn new(path: impl Into<PathBuf>, endpoints: EndpointsSection, bus: EventBus) -> Self {
        let path = path.into();
        let lock = super::lock::lock_for(&path);
        Self {
            path,
            endpoints,
            bus,
            lock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite `DATABASE_URL` and `REDIS_URL` for `mode`.
    ///
    /// Publishes exactly one manager event: success, a warning when the file
    /// does not exist, or an error when it cannot be rewritten.
    pub fn apply(&self, mode: EnvironmentMode) -> Result<(), ConfigError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        match self.rewrite(mode) {
            Ok(()) => {
                info!(path = %self.path.display(), %mode, "environment file updated");
                self.bus.success(
                    Channel::Manager,
                    format!("'{}' updated for {mode} mode.", self.path.display()),
                );
                Ok(())
            }
            Err(err @ ConfigError::NotFound(_)) => {
                warn!(path = %self.path.display(), %mode, "environment file not found");
                self.bus.warning(
                    Channel::Manager,
                    format!(
                        "'{}' not found; keeping default endpoints for {mode} mode.",
                        self.path.display()
                    ),
                );
                Err(err)
            }
            Err(err) => {
                warn!(path = %self.path.display(), %mode, error = %err, "environment file rewrite failed");
                self.bus.error(Channel::Manager, err.to_string());
                Err(err)
            }
        }
    }

    fn rewrite(&self, mode: EnvironmentMode) -> Result<(), ConfigError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(self.path.clone()));
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let set = self.endpoints.for_mode(mode);
        let updated = rewrite_entries(
            &contents,
            &[
                (DATABASE_KEY, set.database_url.as_str()),
                (REDIS_KEY, set.redis_url.as_str()),
            ],
        );

        if updated == contents {
            debug!(path = %self.path.display(), %mode, "environment file already in requested mode");
            return Ok(());
        }

        write_replacing(&self.path, &updated).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Replace the first `KEY=...` line for each entry, leaving every other line
/// (comments, ordering, line endings) untouched. Keys that do not appear are
/// not added.
pub fn rewrite_entries(contents: &str, entries: &[(&str, &str)]) -> String {
    let mut out = contents.to_string();
    for (key, value) in entries {
        let replacement = format!("{key}={value}");
        let replaced = match ENTRY_PATTERNS.iter().find(|(k, _)| k == key) {
            Some((_, re)) => re.replace(&out, NoExpand(&replacement)).into_owned(),
            None => entry_pattern(key)
                .replace(&out, NoExpand(&replacement))
                .into_owned(),
        };
        out = replaced;
    }
    out
}

/// Write `contents` to a sibling temp file and rename it over `path`.
fn write_replacing(path: &Path, contents: &str) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "env".to_string());
    let tmp_path = path.with_file_name(format!(".{file_name}.devconsole-tmp"));

    let result = (|| {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        if let Ok(meta) = fs::metadata(path) {
            fs::set_permissions(&tmp_path, meta.permissions())?;
        }
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}
