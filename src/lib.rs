//! # embedfmt - Formatter for Embedded Languages
//!
//! embedfmt formats SQL, HTML, CSS, Markdown and other languages written
//! inside JavaScript and TypeScript template literals. It uses
//! [tree-sitter](https://tree-sitter.github.io/tree-sitter/) to find the
//! literals, decides which language each one holds from its tag or a
//! leading block comment, and hands the text to a foreign formatter for that
//! language with every `${...}` interpolation replaced by a placeholder.
//! The formatted result is spliced back into the literal with the
//! interpolations restored.
//!
//! ```js
//! const users = sql`
//!   SELECT id, name FROM users WHERE id = ${id}
//! `;
//! const button = /* css */ `color: ${color};`;
//! ```
//!
//! ## Usage
//!
//! ### As a Library
//!
//! ```rust
//! use embedfmt::config::EmbedConfig;
//! use embedfmt::doc::Doc;
//! use embedfmt::embed::Dispatcher;
//! use embedfmt::foreign::FormatterRegistry;
//! use embedfmt::formatter::{FormatOptions, format_source};
//! use embedfmt::options::Options;
//!
//! // Any closure can act as a foreign formatter.
//! let keywords = |text: &str, _: &Options| {
//!     Ok::<_, anyhow::Error>(Doc::lines(&text.replace(" FROM ", "\nFROM ")))
//! };
//! let formatters = FormatterRegistry::new().with("sql-formatter", keywords);
//! let dispatcher = Dispatcher::new(&EmbedConfig::default(), formatters);
//!
//! let source = "const q = sql`SELECT * FROM users WHERE id = ${id}`;\n";
//! let formatted = format_source(source, &FormatOptions::default(), &dispatcher).unwrap();
//! assert_eq!(
//!     formatted,
//!     "const q = sql`\n  SELECT *\n  FROM users WHERE id = ${id}\n`;\n"
//! );
//! ```
//!
//! ### As a CLI Tool
//!
//! `embedfmt fmt [PATHS..] [--write | --check]` formats files in place or
//! reports the ones that would change; `embedfmt debug FILE` lists the
//! template literals of a file and the language claiming each. External
//! formatters are configured per name in `.embedfmt.json`; see [`config`].
//!
//! ## Modules
//!
//! - [`embed`] - The per-literal pipeline and the language adapters
//! - [`formatter`] - Formatting whole files
//! - [`identifier`] - Comment and tag based language identification
//! - [`placeholder`], [`rehydrate`], [`whitespace`] - The stages of the pipeline
//! - [`doc`] - Document trees and their rendering
//! - [`foreign`] - Foreign formatters and their registry
//! - [`options`], [`sandbox`] - Option overrides and script evaluation

pub mod config;
pub mod doc;
pub mod embed;
pub mod error;
pub mod foreign;
pub mod formatter;
pub mod identifier;
pub mod literal;
pub mod logging;
pub mod options;
/// Tree-sitter based JavaScript and TypeScript parser
pub mod parser;
pub mod placeholder;
pub mod rehydrate;
pub mod sandbox;
pub mod whitespace;
