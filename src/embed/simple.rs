//! Languages that need nothing beyond a parser name

use super::{EmbeddedLanguage, Request, set_parser};
use crate::error::EmbedError;
use crate::options::Options;
use crate::rehydrate::Rehydration;

/// A language described by data alone.
#[derive(Clone, Copy, Debug)]
pub struct Simple {
    name: &'static str,
    identifiers: &'static [&'static str],
    formatter: &'static str,
    /// Parser when neither the configuration nor the identifier picks one
    parser: Option<&'static str>,
    /// Identifiers that double as parser names
    identifier_parsers: &'static [&'static str],
    quoted: bool,
    rehydration: Rehydration,
}

pub const GRAPHQL: Simple = Simple {
    name: "graphql",
    identifiers: &["graphql", "gql"],
    formatter: "graphql",
    parser: Some("graphql"),
    identifier_parsers: &[],
    quoted: false,
    rehydration: Rehydration::Structural,
};

/// JSON rejects bare words, so its placeholders are quoted.
pub const JSON: Simple = Simple {
    name: "json",
    identifiers: &["json", "json5", "jsonc"],
    formatter: "json",
    parser: Some("json"),
    identifier_parsers: &["json5", "jsonc"],
    quoted: true,
    rehydration: Rehydration::Structural,
};

pub const YAML: Simple = Simple {
    name: "yaml",
    identifiers: &["yaml", "yml"],
    formatter: "yaml",
    parser: Some("yaml"),
    identifier_parsers: &[],
    quoted: false,
    rehydration: Rehydration::Structural,
};

pub const TOML: Simple = Simple {
    name: "toml",
    identifiers: &["toml"],
    formatter: "toml",
    parser: Some("toml"),
    identifier_parsers: &[],
    quoted: false,
    rehydration: Rehydration::LineNormalizing,
};

pub const INI: Simple = Simple {
    name: "ini",
    identifiers: &["ini", "cfg", "pro"],
    formatter: "ini",
    parser: Some("ini"),
    identifier_parsers: &[],
    quoted: false,
    rehydration: Rehydration::LineNormalizing,
};

/// Re-indents the text and changes nothing else. Has no identifiers until
/// some are configured.
pub const NOOP: Simple = Simple {
    name: "noop",
    identifiers: &[],
    formatter: "noop",
    parser: None,
    identifier_parsers: &[],
    quoted: false,
    rehydration: Rehydration::LineNormalizing,
};

impl EmbeddedLanguage for Simple {
    fn name(&self) -> &'static str {
        self.name
    }

    fn default_identifiers(&self) -> &'static [&'static str] {
        self.identifiers
    }

    fn quoted_placeholders(&self) -> bool {
        self.quoted
    }

    fn rehydration(&self) -> Rehydration {
        self.rehydration
    }

    fn prepare(&self, request: &Request<'_>, options: &mut Options) -> Result<String, EmbedError> {
        let parser = request.parser.or_else(|| {
            self.identifier_parsers
                .iter()
                .copied()
                .find(|p| *p == request.identifier)
                .or(self.parser)
        });
        if let Some(parser) = parser {
            set_parser(options, parser);
        }
        Ok(self.formatter.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::sql::SqlBackend;
    use serde_json::json;

    fn request(identifier: &str) -> Request<'_> {
        Request {
            identifier,
            siblings: &[],
            parser: None,
            sql_backend: SqlBackend::default(),
        }
    }

    #[test]
    fn json_dialects_pick_their_parser() {
        let mut options = Options::new();
        assert_eq!(JSON.prepare(&request("jsonc"), &mut options).unwrap(), "json");
        assert_eq!(options["parser"], json!("jsonc"));

        let mut options = Options::new();
        JSON.prepare(&request("json"), &mut options).unwrap();
        assert_eq!(options["parser"], json!("json"));
        assert!(JSON.quoted_placeholders());
    }

    #[test]
    fn override_parser_is_kept() {
        let mut options = Options::new();
        options.insert("parser".to_string(), json!("graphql-custom"));
        GRAPHQL.prepare(&request("gql"), &mut options).unwrap();
        assert_eq!(options["parser"], json!("graphql-custom"));
    }

    #[test]
    fn noop_sets_no_parser() {
        let mut options = Options::new();
        assert_eq!(NOOP.prepare(&request("raw"), &mut options).unwrap(), "noop");
        assert!(options.is_empty());
        assert!(NOOP.default_identifiers().is_empty());
    }
}
