//! The per-literal embedding pipeline
//!
//! [`Dispatcher::embed`] walks a literal through
//! identification, extraction, delegation, rehydration and wrapping:
//!
//! 1. find the first language whose identifier rules claim the literal;
//! 2. join the static segments with placeholder tokens and split off the
//!    exterior whitespace;
//! 3. merge the options and hand the trimmed text to the language's
//!    foreign formatter;
//! 4. replace the placeholders in the returned document with the
//!    interpolations;
//! 5. wrap the result in backticks according to the language's layout.
//!
//! Literals that are not claimed come back as `Ok(None)` and are left
//! alone. Any failure after identification is an [`EmbedError`] naming the
//! identifier.

pub mod css;
pub mod markdown;
pub mod markup;
pub mod php;
pub mod sh;
pub mod simple;
pub mod sql;

use crate::config::EmbedConfig;
use crate::doc::Doc;
use crate::error::EmbedError;
use crate::foreign::FormatterRegistry;
use crate::identifier::IdentifierRules;
use crate::literal::Literal;
use crate::options::{OverrideResolver, Options, merge_options};
use crate::parser::HostLanguage;
use crate::placeholder::PlaceholderCodec;
use crate::rehydrate::{Rehydration, rehydrate};
use crate::whitespace::{Layout, Spacing, WhitespaceProfile, wrap};
use sql::SqlBackend;
use std::path::Path;

/// Label attached to every document produced by [`Dispatcher::embed`].
pub const EMBED_LABEL: &str = "embed";

/// What an adapter needs to know about the literal being delegated.
#[derive(Clone, Copy, Debug)]
pub struct Request<'a> {
    pub identifier: &'a str,
    /// The language's identifier list, in configured order
    pub siblings: &'a [String],
    /// `languages.<name>.parser` from the configuration
    pub parser: Option<&'a str>,
    pub sql_backend: SqlBackend,
}

/// One embedded language: its identifiers and how its text is delegated
/// and laid out.
pub trait EmbeddedLanguage: Send + Sync {
    fn name(&self) -> &'static str;

    fn default_identifiers(&self) -> &'static [&'static str];

    /// Word the language accepts wherever an interpolation may appear.
    fn placeholder_prefix(&self) -> &'static str {
        "embed_placeholder"
    }

    fn quoted_placeholders(&self) -> bool {
        false
    }

    fn rehydration(&self) -> Rehydration {
        Rehydration::Structural
    }

    fn layout(&self, _options: &Options) -> Layout {
        Layout::Indented {
            force_preserve: false,
        }
    }

    /// Adds the language's own keys to `options` and returns the name of the
    /// foreign formatter to delegate to.
    fn prepare(&self, request: &Request<'_>, options: &mut Options) -> Result<String, EmbedError>;
}

/// Every built-in language, in identification order.
pub fn builtin_languages() -> Vec<Box<dyn EmbeddedLanguage>> {
    vec![
        Box::new(css::Css),
        Box::new(markup::Html),
        Box::new(markup::Xml),
        Box::new(markdown::Markdown),
        Box::new(sql::Sql),
        Box::new(php::Php),
        Box::new(sh::Shell),
        Box::new(simple::GRAPHQL),
        Box::new(simple::JSON),
        Box::new(simple::YAML),
        Box::new(simple::TOML),
        Box::new(simple::INI),
        Box::new(simple::NOOP),
    ]
}

/// Where the literal being embedded comes from.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbedContext<'a> {
    pub host: HostLanguage,
    /// The file being formatted, used to resolve relative override sources
    pub file: Option<&'a Path>,
}

struct Registered {
    language: Box<dyn EmbeddedLanguage>,
    rules: IdentifierRules,
    parser: Option<String>,
}

/// A literal claimed by a language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identified<'a> {
    pub language: &'static str,
    pub identifier: &'a str,
}

pub struct Dispatcher {
    languages: Vec<Registered>,
    formatters: FormatterRegistry,
    overrides: OverrideResolver,
    base_options: Options,
    preserve_whitespace: Vec<String>,
    no_indent: Vec<String>,
    sql_backend: SqlBackend,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.languages.iter().map(|r| r.language.name()).collect();
        f.debug_struct("Dispatcher")
            .field("languages", &names)
            .field("formatters", &self.formatters)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Dispatcher over the built-in languages.
    pub fn new(config: &EmbedConfig, formatters: FormatterRegistry) -> Self {
        Self::with_languages(config, formatters, builtin_languages())
    }

    pub fn with_languages(
        config: &EmbedConfig,
        formatters: FormatterRegistry,
        languages: Vec<Box<dyn EmbeddedLanguage>>,
    ) -> Self {
        let languages = languages
            .into_iter()
            .map(|language| {
                let settings = config.language(language.name()).cloned().unwrap_or_default();
                let identifiers = settings.identifiers.unwrap_or_else(|| {
                    language
                        .default_identifiers()
                        .iter()
                        .map(|s| s.to_string())
                        .collect()
                });
                Registered {
                    rules: IdentifierRules {
                        identifiers,
                        skip_comment: settings.no_embedded_identification_by_comment,
                        skip_tag: settings.no_embedded_identification_by_tag,
                    },
                    parser: settings.parser,
                    language,
                }
            })
            .collect();

        Self {
            languages,
            formatters,
            overrides: OverrideResolver::new(config.overrides.clone(), config.script_runner.runner()),
            base_options: config.base_options(),
            preserve_whitespace: config.preserve_whitespace.clone(),
            no_indent: config.no_indent.clone(),
            sql_backend: config.sql_formatter,
        }
    }

    /// The language and identifier that claim `literal`, if any.
    pub fn identify<'s>(&'s self, literal: &Literal, host: HostLanguage) -> Option<Identified<'s>> {
        let (registered, identifier) = self.find(literal, host)?;
        Some(Identified {
            language: registered.language.name(),
            identifier,
        })
    }

    fn find<'s>(&'s self, literal: &Literal, host: HostLanguage) -> Option<(&'s Registered, &'s str)> {
        self.languages.iter().find_map(|registered| {
            registered
                .rules
                .resolve(literal, host)
                .map(|identifier| (registered, identifier))
        })
    }

    /// Formats `literal` if an embedded language claims it.
    pub fn embed(&self, literal: &Literal, context: &EmbedContext<'_>) -> Result<Option<Doc>, EmbedError> {
        let Some(quasis) = literal.static_text() else {
            tracing::trace!("literal has unrepresentable text; leaving it alone");
            return Ok(None);
        };
        let Some((registered, identifier)) = self.find(literal, context.host) else {
            return Ok(None);
        };
        let language = registered.language.as_ref();
        tracing::debug!(language = language.name(), identifier, "identified embedded literal");

        let codec = PlaceholderCodec::new(language.placeholder_prefix(), language.quoted_placeholders())?;
        let text = codec.build_text(&quasis);
        let profile = WhitespaceProfile::of(&text);
        if literal.expressions.is_empty() && profile.trimmed.is_empty() {
            return Ok(Some(Doc::label(EMBED_LABEL, Doc::text("``"))));
        }

        let overrides = self.overrides.resolve(identifier, context.file);
        let mut options = merge_options(&self.base_options, overrides.as_ref());
        let request = Request {
            identifier,
            siblings: &registered.rules.identifiers,
            parser: registered.parser.as_deref(),
            sql_backend: self.sql_backend,
        };
        let formatter_name = language.prepare(&request, &mut options)?;
        let formatter = self
            .formatters
            .get(&formatter_name)
            .ok_or_else(|| EmbedError::FormatterMissing {
                language: language.name(),
                identifier: identifier.to_string(),
                formatter: formatter_name.clone(),
            })?;

        tracing::debug!(formatter = %formatter_name, bytes = profile.trimmed.len(), "delegating");
        let formatted = formatter
            .text_to_doc(profile.trimmed, &options)
            .map_err(|source| EmbedError::Delegation {
                language: language.name(),
                identifier: identifier.to_string(),
                source,
            })?;

        let expressions: Vec<Doc> = literal.expressions.iter().map(print_template_expression).collect();
        let content = rehydrate(&formatted, &codec, &expressions, language.rehydration()).map_err(|err| {
            EmbedError::PlaceholderMismatch {
                language: language.name(),
                identifier: identifier.to_string(),
                detail: err.to_string(),
            }
        })?;

        let spacing = Spacing {
            preserve_whitespace: self.preserve_whitespace.iter().any(|id| id == identifier),
            no_indent: self.no_indent.iter().any(|id| id == identifier),
        };
        let wrapped = wrap(language.layout(&options), &profile, content, spacing);
        Ok(Some(Doc::label(EMBED_LABEL, wrapped)))
    }
}

/// `${expression}` as it is printed back into the literal.
pub fn print_template_expression(expression: &Doc) -> Doc {
    Doc::concat([Doc::text("${"), expression.clone(), Doc::text("}")])
}

/// Sets `parser` unless an override already chose one.
pub(crate) fn set_parser(options: &mut Options, parser: &str) {
    options
        .entry("parser")
        .or_insert_with(|| serde_json::Value::from(parser));
}
