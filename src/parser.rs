//! Host language parser using tree-sitter
//!
//! Source files are parsed with the
//! [tree-sitter-javascript](https://github.com/tree-sitter/tree-sitter-javascript) or
//! [tree-sitter-typescript](https://github.com/tree-sitter/tree-sitter-typescript)
//! grammar, depending on the file extension. The resulting tree is walked by the
//! formatter to find template literals, and by the identifier resolver to
//! compare tag expressions.
//!
//! # Example
//!
//! ```rust
//! use embedfmt::parser::{HostLanguage, parse};
//!
//! let source = "const q = sql`SELECT 1`;";
//! let tree = parse(source, HostLanguage::JavaScript).unwrap();
//! assert_eq!(tree.root_node().kind(), "program");
//! ```

use once_cell::sync::Lazy;
use std::path::Path;
use tree_sitter::{Language, Parser, Tree};

static JAVASCRIPT: Lazy<Language> = Lazy::new(|| tree_sitter_javascript::LANGUAGE.into());
static TYPESCRIPT: Lazy<Language> =
    Lazy::new(|| tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into());
static TSX: Lazy<Language> = Lazy::new(|| tree_sitter_typescript::LANGUAGE_TSX.into());

/// Grammar used to parse a host file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HostLanguage {
    /// `.js`, `.jsx`, `.mjs`, `.cjs`
    #[default]
    JavaScript,
    /// `.ts`, `.mts`, `.cts`
    TypeScript,
    /// `.tsx`
    Tsx,
}

impl HostLanguage {
    /// Picks the grammar from a file extension, or `None` for files that are
    /// not JavaScript or TypeScript.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str())? {
            "js" | "jsx" | "mjs" | "cjs" => Some(HostLanguage::JavaScript),
            "ts" | "mts" | "cts" => Some(HostLanguage::TypeScript),
            "tsx" => Some(HostLanguage::Tsx),
            _ => None,
        }
    }

    fn grammar(self) -> &'static Language {
        match self {
            HostLanguage::JavaScript => &JAVASCRIPT,
            HostLanguage::TypeScript => &TYPESCRIPT,
            HostLanguage::Tsx => &TSX,
        }
    }
}

/// Parse host source code into a syntax tree
///
/// # Arguments
///
/// * `source` - The JavaScript or TypeScript source code to parse
/// * `host` - Which grammar to use
///
/// # Note
///
/// tree-sitter is tolerant of syntax errors and returns a tree with error
/// nodes for malformed input. Template literals that contain errors are
/// skipped by the formatter rather than reformatted.
pub fn parse(source: &str, host: HostLanguage) -> anyhow::Result<Tree> {
    let mut parser = Parser::new();
    parser.set_language(host.grammar())?;
    parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse {host:?} source"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_selects_grammar() {
        assert_eq!(
            HostLanguage::from_path(Path::new("a/b.mjs")),
            Some(HostLanguage::JavaScript)
        );
        assert_eq!(
            HostLanguage::from_path(Path::new("query.cts")),
            Some(HostLanguage::TypeScript)
        );
        assert_eq!(
            HostLanguage::from_path(Path::new("view.tsx")),
            Some(HostLanguage::Tsx)
        );
        assert_eq!(HostLanguage::from_path(Path::new("README.md")), None);
    }

    #[test]
    fn tagged_template_is_a_call_expression() {
        let source = "sql`SELECT ${id}`";
        let tree = parse(source, HostLanguage::TypeScript).unwrap();
        let root = tree.root_node();
        let mut cursor = root.walk();
        let statement = root.named_children(&mut cursor).next().unwrap();
        let mut cursor = statement.walk();
        let call = statement.named_children(&mut cursor).next().unwrap();
        assert_eq!(call.kind(), "call_expression");
        assert_eq!(
            call.child_by_field_name("arguments").unwrap().kind(),
            "template_string"
        );
    }
}
