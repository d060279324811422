//! Deciding which embedded language a literal belongs to
//!
//! A literal is claimed by an identifier either through a block comment
//! written right before it (`/* sql */ `...``) or through its tag
//! (`sql`...``). Tags that are not plain names, such as `db.sql` or
//! `sql.unsafe()`, are matched structurally: the configured identifier is
//! parsed as the tag of an empty template and both syntax trees are compared
//! node by node, ignoring positions and comments.

use crate::literal::{Literal, Tag};
use crate::parser::{HostLanguage, parse};
use tree_sitter::{Node, Tree};

/// Identifier list of one embedded language plus the exclusions that turn
/// off comment or tag based identification for particular names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentifierRules {
    pub identifiers: Vec<String>,
    pub skip_comment: Vec<String>,
    pub skip_tag: Vec<String>,
}

impl IdentifierRules {
    pub fn new<S: AsRef<str>>(identifiers: &[S]) -> Self {
        Self {
            identifiers: identifiers.iter().map(|s| s.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    /// First identifier, in configured order, that claims `literal`.
    pub fn resolve(&self, literal: &Literal, host: HostLanguage) -> Option<&str> {
        let comment = literal.block_comment_value();
        let tag_snippet = literal
            .tag
            .as_ref()
            .filter(|tag| !tag.is_identifier)
            .and_then(|tag| TagSnippet::parse(&tag.source, host));

        self.identifiers
            .iter()
            .find(|identifier| {
                let by_comment = !self.skip_comment.contains(identifier)
                    && comment.is_some_and(|value| is_comment_for(value, identifier));
                let by_tag = !self.skip_tag.contains(identifier)
                    && literal.tag.as_ref().is_some_and(|tag| {
                        tag_matches(tag, tag_snippet.as_ref(), identifier, host)
                    });
                by_comment || by_tag
            })
            .map(String::as_str)
    }
}

/// The comment must read exactly ` identifier `, one space on each side.
fn is_comment_for(value: &str, identifier: &str) -> bool {
    value
        .strip_prefix(' ')
        .and_then(|v| v.strip_suffix(' '))
        .is_some_and(|v| v == identifier)
}

fn tag_matches(tag: &Tag, snippet: Option<&TagSnippet>, identifier: &str, host: HostLanguage) -> bool {
    if tag.is_identifier {
        return tag.source == identifier;
    }
    let Some(snippet) = snippet else {
        return false;
    };
    TagSnippet::parse(identifier, host).is_some_and(|candidate| snippet.same_tag(&candidate))
}

/// Returns true when `tag` and `candidate` parse to the same tag expression.
pub fn tags_equal(tag: &str, candidate: &str, host: HostLanguage) -> bool {
    match (TagSnippet::parse(tag, host), TagSnippet::parse(candidate, host)) {
        (Some(a), Some(b)) => a.same_tag(&b),
        _ => false,
    }
}

/// `<expression>``` parsed on its own, so its tag can be compared.
struct TagSnippet {
    source: String,
    tree: Tree,
}

impl TagSnippet {
    fn parse(expression: &str, host: HostLanguage) -> Option<Self> {
        let source = format!("{expression}``");
        let tree = parse(&source, host).ok()?;
        if tree.root_node().has_error() {
            return None;
        }
        let snippet = Self { source, tree };
        snippet.tag()?;
        Some(snippet)
    }

    /// The `function` of the single tagged template spanning the snippet.
    fn tag(&self) -> Option<Node<'_>> {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        let statement = root.named_children(&mut cursor).next()?;
        if statement.kind() != "expression_statement" {
            return None;
        }
        let mut cursor = statement.walk();
        let call = statement.named_children(&mut cursor).next()?;
        let arguments = call.child_by_field_name("arguments")?;
        if call.kind() != "call_expression"
            || arguments.kind() != "template_string"
            || arguments.end_byte() != self.source.len()
        {
            return None;
        }
        call.child_by_field_name("function")
    }

    fn same_tag(&self, other: &TagSnippet) -> bool {
        match (self.tag(), other.tag()) {
            (Some(a), Some(b)) => same_shape(a, &self.source, b, &other.source),
            _ => false,
        }
    }
}

/// Compares kind, named-ness, field names and leaf text; byte positions and
/// extra nodes such as comments never take part.
fn same_shape(a: Node<'_>, a_source: &str, b: Node<'_>, b_source: &str) -> bool {
    if a.kind_id() != b.kind_id() || a.is_named() != b.is_named() {
        return false;
    }
    let a_children = significant_children(a);
    let b_children = significant_children(b);
    if a_children.is_empty() && b_children.is_empty() {
        return a.utf8_text(a_source.as_bytes()).ok() == b.utf8_text(b_source.as_bytes()).ok();
    }
    a_children.len() == b_children.len()
        && a_children
            .iter()
            .zip(&b_children)
            .all(|((a_field, a_child), (b_field, b_child))| {
                a_field == b_field && same_shape(*a_child, a_source, *b_child, b_source)
            })
}

fn significant_children(node: Node<'_>) -> Vec<(Option<&'static str>, Node<'_>)> {
    let mut children = Vec::new();
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if !child.is_extra() {
                children.push((cursor.field_name(), child));
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    children
}
