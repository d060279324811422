//! Errors raised while embedding a literal
//!
//! Everything here is fatal for the literal being formatted and aborts the
//! file. Problems loading overrides never surface as an [`EmbedError`]; they
//! are logged and formatting continues with the base options.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbedError {
    /// No foreign formatter is registered under the name a language asked for
    #[error("embedded {language} (identifier `{identifier}`) needs the `{formatter}` formatter, which is not loaded")]
    FormatterMissing {
        language: &'static str,
        identifier: String,
        formatter: String,
    },

    /// The foreign formatter itself failed
    #[error("failed to format embedded {language} (identifier `{identifier}`)")]
    Delegation {
        language: &'static str,
        identifier: String,
        #[source]
        source: anyhow::Error,
    },

    /// Neither SQL backend, nor any earlier sibling identifier, knows the dialect
    #[error("unsupported SQL dialect `{identifier}`: no formatter supports it and no earlier identifier can stand in")]
    UnsupportedDialect { identifier: String },

    /// The formatted output lost, duplicated out of range, or invented a placeholder
    #[error("placeholder mismatch in embedded {language} (identifier `{identifier}`): {detail}")]
    PlaceholderMismatch {
        language: &'static str,
        identifier: String,
        detail: String,
    },

    #[error("invalid placeholder pattern")]
    Placeholder(#[from] regex::Error),
}
