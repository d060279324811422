//! Configuration for embedfmt.
//!
//! Loaded from `--config <file>` or from `.embedfmt.json` in the working
//! directory. Every key is optional.
//!
//! ```json
//! {
//!   "printWidth": 100,
//!   "languages": {
//!     "sql": { "identifiers": ["sql", "pg"], "noEmbeddedIdentificationByTag": ["pg"] }
//!   },
//!   "sqlFormatter": "node-sql-parser",
//!   "noIndent": ["markdown"],
//!   "overrides": [{ "identifiers": ["pg"], "options": { "keywordCase": "upper" } }],
//!   "formatters": { "node-sql-parser": { "command": ["node", "scripts/format-sql.mjs"] } }
//! }
//! ```

use crate::doc::printer::PrintOptions;
use crate::embed::sql::SqlBackend;
use crate::options::{OverrideSetting, Options};
use crate::sandbox::ScriptRunner;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".embedfmt.json";

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbedConfig {
    pub print_width: usize,
    pub tab_width: usize,
    pub use_tabs: bool,
    /// Passed to every foreign formatter
    pub options: Options,
    /// Per-language settings, keyed by language name (`sql`, `css`, ...)
    pub languages: HashMap<String, LanguageConfig>,
    /// Identifiers whose exterior whitespace is kept verbatim
    pub preserve_whitespace: Vec<String>,
    /// Identifiers whose content is not indented relative to the literal
    pub no_indent: Vec<String>,
    pub sql_formatter: SqlBackend,
    pub overrides: Option<OverrideSetting>,
    /// External programs registered as foreign formatters, keyed by name
    pub formatters: HashMap<String, CommandSpec>,
    pub script_runner: ScriptRunnerConfig,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            print_width: 80,
            tab_width: 2,
            use_tabs: false,
            options: Options::new(),
            languages: HashMap::new(),
            preserve_whitespace: Vec::new(),
            no_indent: Vec::new(),
            sql_formatter: SqlBackend::default(),
            overrides: None,
            formatters: HashMap::new(),
            script_runner: ScriptRunnerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageConfig {
    /// Replaces the language's default identifiers when set
    pub identifiers: Option<Vec<String>>,
    pub no_embedded_identification_by_comment: Vec<String>,
    pub no_embedded_identification_by_tag: Vec<String>,
    /// Parser name passed to the foreign formatter
    pub parser: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommandSpec {
    pub command: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScriptRunnerConfig {
    /// Interpreter argv; defaults to node with a small module loader
    pub command: Option<Vec<String>>,
    pub timeout_ms: u64,
}

impl Default for ScriptRunnerConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout_ms: 5000,
        }
    }
}

impl ScriptRunnerConfig {
    pub fn runner(&self) -> ScriptRunner {
        let default = ScriptRunner::default();
        ScriptRunner {
            command: self.command.clone().unwrap_or(default.command),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

impl EmbedConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    /// Loads `explicit` if given, else [`CONFIG_FILE`] if present, else the
    /// defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = Path::new(CONFIG_FILE);
        if local.is_file() {
            tracing::debug!("using {CONFIG_FILE}");
            return Self::load(local);
        }
        Ok(Self::default())
    }

    pub fn print_options(&self) -> PrintOptions {
        PrintOptions {
            print_width: self.print_width,
            tab_width: self.tab_width,
            use_tabs: self.use_tabs,
        }
    }

    /// Global options every delegation starts from: the print settings,
    /// then the `options` map on top.
    pub fn base_options(&self) -> Options {
        let mut options = Options::new();
        options.insert("printWidth".to_string(), Value::from(self.print_width));
        options.insert("tabWidth".to_string(), Value::from(self.tab_width));
        options.insert("useTabs".to_string(), Value::from(self.use_tabs));
        options.extend(self.options.iter().map(|(k, v)| (k.clone(), v.clone())));
        options
    }

    pub fn language(&self, name: &str) -> Option<&LanguageConfig> {
        self.languages.get(name)
    }
}
