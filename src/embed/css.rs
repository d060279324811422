//! Embedded CSS, Less and SCSS

use super::{EmbeddedLanguage, Request, set_parser};
use crate::error::EmbedError;
use crate::options::Options;
use crate::whitespace::Layout;

pub struct Css;

impl EmbeddedLanguage for Css {
    fn name(&self) -> &'static str {
        "css"
    }

    fn default_identifiers(&self) -> &'static [&'static str] {
        &["css", "less", "scss"]
    }

    // An at-rule name is valid in selector, property and value positions.
    fn placeholder_prefix(&self) -> &'static str {
        "@embed-placeholder"
    }

    fn layout(&self, options: &Options) -> Layout {
        Layout::Indented {
            force_preserve: options
                .get("htmlWhitespaceSensitivity")
                .and_then(|v| v.as_str())
                == Some("strict"),
        }
    }

    fn prepare(&self, request: &Request<'_>, options: &mut Options) -> Result<String, EmbedError> {
        let parser = request.parser.unwrap_or(match request.identifier {
            "less" => "less",
            "scss" => "scss",
            _ => "css",
        });
        set_parser(options, parser);
        Ok("css".to_string())
    }
}
