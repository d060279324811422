//! Embedded HTML and XML
//!
//! Both are whitespace sensitive: when the foreign formatter is told to
//! treat whitespace strictly, the whitespace around the content is kept
//! exactly as written.

use super::{EmbeddedLanguage, Request, set_parser};
use crate::error::EmbedError;
use crate::options::Options;
use crate::whitespace::Layout;

fn sensitivity<'o>(options: &'o Options, key: &str) -> Option<&'o str> {
    options.get(key).and_then(|v| v.as_str())
}

pub struct Html;

impl EmbeddedLanguage for Html {
    fn name(&self) -> &'static str {
        "html"
    }

    fn default_identifiers(&self) -> &'static [&'static str] {
        &["html", "xhtml"]
    }

    fn layout(&self, options: &Options) -> Layout {
        Layout::Indented {
            force_preserve: sensitivity(options, "htmlWhitespaceSensitivity") == Some("strict"),
        }
    }

    fn prepare(&self, request: &Request<'_>, options: &mut Options) -> Result<String, EmbedError> {
        set_parser(options, request.parser.unwrap_or("html"));
        Ok("html".to_string())
    }
}

pub struct Xml;

impl EmbeddedLanguage for Xml {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn default_identifiers(&self) -> &'static [&'static str] {
        &["xml", "opf", "xsd", "xsl", "svg", "rss"]
    }

    fn layout(&self, options: &Options) -> Layout {
        Layout::Indented {
            force_preserve: matches!(
                sensitivity(options, "xmlWhitespaceSensitivity"),
                Some("strict" | "preserve")
            ),
        }
    }

    fn prepare(&self, request: &Request<'_>, options: &mut Options) -> Result<String, EmbedError> {
        set_parser(options, request.parser.unwrap_or("xml"));
        Ok("xml".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with(key: &str, value: &str) -> Options {
        let mut options = Options::new();
        options.insert(key.to_string(), json!(value));
        options
    }

    #[test]
    fn html_preserves_only_when_strict() {
        assert_eq!(
            Html.layout(&with("htmlWhitespaceSensitivity", "strict")),
            Layout::Indented { force_preserve: true }
        );
        assert_eq!(
            Html.layout(&with("htmlWhitespaceSensitivity", "css")),
            Layout::Indented { force_preserve: false }
        );
    }

    #[test]
    fn xml_preserves_when_strict_or_preserve() {
        for value in ["strict", "preserve"] {
            assert_eq!(
                Xml.layout(&with("xmlWhitespaceSensitivity", value)),
                Layout::Indented { force_preserve: true }
            );
        }
        assert_eq!(
            Xml.layout(&with("xmlWhitespaceSensitivity", "ignore")),
            Layout::Indented { force_preserve: false }
        );
        // The HTML setting has no say over XML.
        assert_eq!(
            Xml.layout(&with("htmlWhitespaceSensitivity", "strict")),
            Layout::Indented { force_preserve: false }
        );
    }
}
