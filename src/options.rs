//! Options handed to foreign formatters, and per-identifier overrides
//!
//! Every delegation starts from the global options, then applies the first
//! override record that lists the literal's identifier. Override records come
//! straight from the configuration, or from a source string naming a JSON
//! file or a script, or holding the JSON itself.

use crate::sandbox::ScriptRunner;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Formatter options, keyed the way foreign formatters expect them
/// (`printWidth`, `parser`, ...).
pub type Options = serde_json::Map<String, Value>;

const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "ts", "mts", "cts"];

/// Options applied to a set of identifiers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideRecord {
    pub identifiers: Vec<String>,
    #[serde(default)]
    pub options: Options,
}

/// The `overrides` setting as written in the configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideSetting {
    Inline(Vec<OverrideRecord>),
    /// A path to a `.json` file or a script, or a JSON document
    Source(String),
}

/// `base` with every key of `overrides` written over it.
pub fn merge_options(base: &Options, overrides: Option<&Options>) -> Options {
    let mut merged = base.clone();
    if let Some(overrides) = overrides {
        merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    merged
}

/// Options of the first record whose identifier list contains `identifier`.
pub fn find_override<'a>(records: &'a [OverrideRecord], identifier: &str) -> Option<&'a Options> {
    records
        .iter()
        .find(|record| record.identifiers.iter().any(|id| id == identifier))
        .map(|record| &record.options)
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum SourceKey {
    File(PathBuf),
    Json(String),
}

type PathKey = (String, Option<PathBuf>);

/// Resolves override options for an identifier, loading sources at most once.
///
/// Both caches live as long as the resolver and are never invalidated, so a
/// source edited while a run is in progress is not picked up again.
#[derive(Debug)]
pub struct OverrideResolver {
    setting: Option<OverrideSetting>,
    runner: ScriptRunner,
    paths: Mutex<HashMap<PathKey, Option<PathBuf>>>,
    loaded: Mutex<HashMap<SourceKey, Arc<Vec<OverrideRecord>>>>,
}

impl OverrideResolver {
    pub fn new(setting: Option<OverrideSetting>, runner: ScriptRunner) -> Self {
        Self {
            setting,
            runner,
            paths: Mutex::new(HashMap::new()),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Override options for `identifier` when formatting `file`.
    ///
    /// Any problem loading the source is logged and treated as "no override".
    pub fn resolve(&self, identifier: &str, file: Option<&Path>) -> Option<Options> {
        match self.setting.as_ref()? {
            OverrideSetting::Inline(records) => find_override(records, identifier).cloned(),
            OverrideSetting::Source(source) => {
                let records = self.records(source, file);
                find_override(&records, identifier).cloned()
            }
        }
    }

    fn records(&self, source: &str, file: Option<&Path>) -> Arc<Vec<OverrideRecord>> {
        let key = match self.resolve_path(source, file) {
            Some(path) => SourceKey::File(path),
            None => SourceKey::Json(source.to_string()),
        };
        if let Some(records) = self.loaded.lock().get(&key) {
            return Arc::clone(records);
        }

        // Loading may run a script; no lock is held meanwhile. Two threads
        // racing here load the same records and the second insert wins.
        let records = Arc::new(self.load(&key));
        self.loaded.lock().insert(key, Arc::clone(&records));
        records
    }

    fn load(&self, key: &SourceKey) -> Vec<OverrideRecord> {
        let text = match key {
            SourceKey::File(path) if has_extension(path, &["json"]) => {
                match fs::read_to_string(path) {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::warn!(path = %path.display(), "cannot read overrides: {err}");
                        return Vec::new();
                    }
                }
            }
            SourceKey::File(path) => match self.runner.evaluate(path) {
                Some(text) => text,
                None => return Vec::new(),
            },
            SourceKey::Json(text) => text.clone(),
        };

        match serde_json::from_str::<Vec<OverrideRecord>>(&text) {
            Ok(records) => {
                tracing::debug!(count = records.len(), "loaded override records");
                records
            }
            Err(err) => {
                tracing::warn!("ignoring overrides that are not a list of records: {err}");
                Vec::new()
            }
        }
    }

    /// Absolute paths are taken as they are; relative ones are tried against
    /// the formatted file's directory, then the working directory.
    fn resolve_path(&self, source: &str, file: Option<&Path>) -> Option<PathBuf> {
        let key = (source.to_string(), file.map(Path::to_path_buf));
        if let Some(cached) = self.paths.lock().get(&key) {
            return cached.clone();
        }

        let path = Path::new(source);
        let mut candidates = Vec::new();
        if path.is_absolute() {
            candidates.push(path.to_path_buf());
        } else {
            if let Some(dir) = file.and_then(Path::parent) {
                candidates.push(dir.join(path));
            }
            if let Ok(cwd) = std::env::current_dir() {
                candidates.push(cwd.join(path));
            }
        }
        let resolved = candidates.into_iter().find(|candidate| {
            (has_extension(candidate, &["json"]) || has_extension(candidate, SCRIPT_EXTENSIONS))
                && candidate.is_file()
        });

        tracing::trace!(source, resolved = ?resolved, "resolved override source");
        self.paths.lock().insert(key, resolved.clone());
        resolved
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(&ext))
}
