//! Embedded Markdown

use super::{EmbeddedLanguage, Request, set_parser};
use crate::error::EmbedError;
use crate::options::Options;

pub struct Markdown;

impl EmbeddedLanguage for Markdown {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn default_identifiers(&self) -> &'static [&'static str] {
        &["md", "markdown"]
    }

    fn prepare(&self, request: &Request<'_>, options: &mut Options) -> Result<String, EmbedError> {
        set_parser(options, request.parser.unwrap_or("markdown"));
        Ok("markdown".to_string())
    }
}
