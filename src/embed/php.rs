//! Embedded PHP
//!
//! Laid out like SQL: one line between the backticks, or the content on its
//! own indented lines.

use super::{EmbeddedLanguage, Request, set_parser};
use crate::error::EmbedError;
use crate::options::Options;
use crate::whitespace::Layout;

pub struct Php;

impl EmbeddedLanguage for Php {
    fn name(&self) -> &'static str {
        "php"
    }

    fn default_identifiers(&self) -> &'static [&'static str] {
        &["php", "php5", "php7", "php8"]
    }

    // PHP variables start with `$`, which keeps the token an expression.
    fn placeholder_prefix(&self) -> &'static str {
        "$embed_placeholder"
    }

    fn layout(&self, _options: &Options) -> Layout {
        Layout::Binary
    }

    fn prepare(&self, request: &Request<'_>, options: &mut Options) -> Result<String, EmbedError> {
        set_parser(options, request.parser.unwrap_or("php"));
        Ok("php".to_string())
    }
}
