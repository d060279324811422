//! Embedded shell scripts
//!
//! Shell formatters return plain text, so newlines inside text leaves are
//! turned into hard breaks during rehydration.

use super::{EmbeddedLanguage, Request, set_parser};
use crate::error::EmbedError;
use crate::options::Options;
use crate::rehydrate::Rehydration;

pub struct Shell;

impl EmbeddedLanguage for Shell {
    fn name(&self) -> &'static str {
        "sh"
    }

    fn default_identifiers(&self) -> &'static [&'static str] {
        &["sh", "bash", "shell", "zsh"]
    }

    fn rehydration(&self) -> Rehydration {
        Rehydration::LineNormalizing
    }

    fn prepare(&self, request: &Request<'_>, options: &mut Options) -> Result<String, EmbedError> {
        set_parser(options, request.parser.unwrap_or("sh"));
        // Keeps the variant in step with the identifier unless configured.
        if !options.contains_key("variant") {
            let variant = match request.identifier {
                "bash" | "zsh" => "bash",
                _ => "posix",
            };
            options.insert("variant".to_string(), variant.into());
        }
        Ok("sh".to_string())
    }
}
