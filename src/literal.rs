//! Template literals as seen by the embedding pipeline
//!
//! A [`Literal`] is the host-independent view of a template literal: its raw
//! static segments, the printed form of its interpolations, its tag and the
//! block comment right before it. [`extract`] builds one from a
//! tree-sitter `template_string` node.

use crate::doc::Doc;
use std::ops::Range;
use tree_sitter::Node;

/// Tag expression of a tagged template, as written in the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub source: String,
    /// True for a plain name such as `sql`; false for `db.sql`, `sql()` and
    /// other expressions that need a structural comparison
    pub is_identifier: bool,
}

impl Tag {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            is_identifier: is_plain_identifier(source),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Literal {
    /// Raw static text between interpolations; `None` when the segment
    /// cannot be represented
    pub quasis: Vec<Option<String>>,
    /// Each interpolated expression as it is printed back, without `${` and
    /// `}`
    pub expressions: Vec<Doc>,
    pub tag: Option<Tag>,
    /// The comment immediately preceding the literal, including delimiters
    pub leading_comment: Option<String>,
}

impl Literal {
    /// Builds a literal from static segments and expression sources.
    pub fn new<Q: AsRef<str>, E: AsRef<str>>(quasis: &[Q], expressions: &[E]) -> Self {
        Self {
            quasis: quasis.iter().map(|q| Some(q.as_ref().to_string())).collect(),
            expressions: expressions.iter().map(|e| Doc::text(e.as_ref())).collect(),
            tag: None,
            leading_comment: None,
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(Tag::new(tag));
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.leading_comment = Some(comment.to_string());
        self
    }

    /// The static segments, if every one is representable and they
    /// alternate correctly with the expressions.
    pub fn static_text(&self) -> Option<Vec<&str>> {
        if self.quasis.len() != self.expressions.len() + 1 {
            return None;
        }
        self.quasis.iter().map(|q| q.as_deref()).collect()
    }

    /// Text between `/*` and `*/` of the leading comment, when it is a block
    /// comment.
    pub fn block_comment_value(&self) -> Option<&str> {
        self.leading_comment
            .as_deref()?
            .strip_prefix("/*")?
            .strip_suffix("*/")
    }
}

fn is_plain_identifier(source: &str) -> bool {
    let mut chars = source.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Builds a [`Literal`] from a `template_string` node.
///
/// `print_expression` receives each `template_substitution` child and the
/// byte range of its expression (inside `${` and `}`, whitespace trimmed);
/// the caller decides whether nested literals inside it are reformatted
/// first.
pub fn extract<'t, F>(node: Node<'t>, source: &str, mut print_expression: F) -> anyhow::Result<Literal>
where
    F: FnMut(Node<'t>, Range<usize>) -> anyhow::Result<Doc>,
{
    let unrepresentable = node.has_error();
    let mut quasis = Vec::new();
    let mut expressions = Vec::new();
    // Skip the opening backtick.
    let mut segment_start = node.start_byte() + 1;

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "template_substitution" {
            continue;
        }
        quasis.push(segment(source, segment_start, child.start_byte(), unrepresentable));
        let range = expression_range(source, child);
        expressions.push(print_expression(child, range)?);
        segment_start = child.end_byte();
    }
    let end = node.end_byte().saturating_sub(1).max(segment_start);
    quasis.push(segment(source, segment_start, end, unrepresentable));

    let tagged_call = node.parent().filter(|parent| {
        parent.kind() == "call_expression"
            && parent
                .child_by_field_name("arguments")
                .is_some_and(|args| args.id() == node.id())
    });
    let tag = match tagged_call.and_then(|call| call.child_by_field_name("function")) {
        Some(function) => Some(Tag {
            source: function.utf8_text(source.as_bytes())?.to_string(),
            is_identifier: function.kind() == "identifier",
        }),
        None => None,
    };

    let anchor = tagged_call.unwrap_or(node);
    let leading_comment = match anchor.prev_sibling() {
        Some(prev) if prev.kind() == "comment" => {
            Some(prev.utf8_text(source.as_bytes())?.to_string())
        }
        _ => None,
    };

    Ok(Literal {
        quasis,
        expressions,
        tag,
        leading_comment,
    })
}

/// Byte range of the expression inside a `template_substitution` node.
fn expression_range(source: &str, node: Node<'_>) -> Range<usize> {
    let Range { mut start, mut end } = node.byte_range();
    let whole = source.get(start..end).unwrap_or_default();
    if whole.starts_with("${") {
        start += 2;
    }
    if end > start && whole.ends_with('}') {
        end -= 1;
    }
    let inner = source.get(start..end).unwrap_or_default();
    let leading = inner.len() - inner.trim_start().len();
    let trailing = inner.len() - inner.trim_end().len();
    start + leading..(end - trailing).max(start + leading)
}

fn segment(source: &str, start: usize, end: usize, unrepresentable: bool) -> Option<String> {
    if unrepresentable {
        return None;
    }
    source.get(start..end).map(str::to_string)
}
