//! Foreign formatters: the black boxes that turn embedded text into a [`Doc`]
//!
//! A foreign formatter receives the literal's static text with placeholders
//! in place of interpolations, plus the merged options, and returns a
//! document. Formatters are looked up by name in a [`FormatterRegistry`];
//! a language adapter names the formatter it needs.

use crate::config::EmbedConfig;
use crate::doc::Doc;
use crate::options::Options;
use crate::sandbox;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Environment variable carrying the merged options, as JSON, for
/// [`CommandFormatter`] programs.
pub const OPTIONS_ENV: &str = "EMBEDFMT_OPTIONS";

pub trait ForeignFormatter: Send + Sync {
    fn text_to_doc(&self, text: &str, options: &Options) -> Result<Doc>;
}

impl<F> ForeignFormatter for F
where
    F: Fn(&str, &Options) -> Result<Doc> + Send + Sync,
{
    fn text_to_doc(&self, text: &str, options: &Options) -> Result<Doc> {
        self(text, options)
    }
}

/// Keeps the text as written, only removing the indentation shared by all
/// lines after the first so the wrapper can indent it again.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl ForeignFormatter for Passthrough {
    fn text_to_doc(&self, text: &str, _options: &Options) -> Result<Doc> {
        Ok(Doc::lines(&dedent(text)))
    }
}

fn dedent(text: &str) -> String {
    let common = text
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    text.split('\n')
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim_end()
            } else {
                // Whitespace is ASCII here, so `common` is a char boundary
                // for every line that is at least that deeply indented.
                line.get(common..).unwrap_or_else(|| line.trim_start()).trim_end()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pipes the text through an external program.
///
/// The program reads the text on stdin and writes the formatted text to
/// stdout; the merged options are in the [`OPTIONS_ENV`] variable.
#[derive(Clone, Debug)]
pub struct CommandFormatter {
    pub command: Vec<String>,
}

impl CommandFormatter {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl ForeignFormatter for CommandFormatter {
    fn text_to_doc(&self, text: &str, options: &Options) -> Result<Doc> {
        let options = serde_json::to_string(options).context("failed to encode options")?;
        let stdout = sandbox::run(&self.command, Some(text), &[(OPTIONS_ENV, options)], None)?;
        let formatted = stdout.strip_suffix('\n').unwrap_or(&stdout);
        Ok(Doc::lines(formatted))
    }
}

/// Foreign formatters by name.
#[derive(Clone)]
pub struct FormatterRegistry {
    formatters: HashMap<String, Arc<dyn ForeignFormatter>>,
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        let mut registry = Self {
            formatters: HashMap::new(),
        };
        registry.register("noop", Passthrough);
        registry
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.formatters.keys().collect();
        names.sort();
        f.debug_struct("FormatterRegistry").field("formatters", &names).finish()
    }
}

impl FormatterRegistry {
    /// Registry holding only the built-in `noop` formatter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-ins plus every `formatters.<name>.command` from the config.
    pub fn from_config(config: &EmbedConfig) -> Self {
        let mut registry = Self::default();
        for (name, spec) in &config.formatters {
            if spec.command.is_empty() {
                tracing::warn!(formatter = %name, "ignoring formatter with an empty command");
                continue;
            }
            registry.register(name, CommandFormatter::new(spec.command.clone()));
        }
        registry
    }

    pub fn register(&mut self, name: &str, formatter: impl ForeignFormatter + 'static) {
        self.formatters.insert(name.to_string(), Arc::new(formatter));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, name: &str, formatter: impl ForeignFormatter + 'static) -> Self {
        self.register(name, formatter);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ForeignFormatter>> {
        self.formatters.get(name)
    }
}
