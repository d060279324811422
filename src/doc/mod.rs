//! Formatted document tree
//!
//! Foreign formatters hand back a [`Doc`], interpolated host expressions are
//! rendered into a [`Doc`], and the embedding pipeline stitches the two
//! together. The tree is a closed set of variants: text leaves,
//! concatenations, groups, indentation markers and line breaks. Trees are
//! never edited in place; [`map_doc`] and [`try_map_doc`] rebuild a new tree
//! bottom-up.
//!
//! # Example
//!
//! ```rust
//! use embedfmt::doc::{Doc, map_doc};
//!
//! let doc = Doc::concat([Doc::text("select"), Doc::line(), Doc::text("1")]);
//! let upper = map_doc(&doc, &mut |d| match d {
//!     Doc::Text(s) => Doc::Text(s.to_uppercase()),
//!     other => other,
//! });
//! assert_eq!(upper, Doc::concat([Doc::text("SELECT"), Doc::line(), Doc::text("1")]));
//! ```

pub mod printer;

use std::convert::Infallible;

/// Line break flavours understood by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// Nothing when the enclosing group is flat, a newline otherwise
    Soft,
    /// A space when the enclosing group is flat, a newline otherwise
    Line,
    /// Always a newline at the current indentation; breaks enclosing groups
    Hard,
    /// Always a newline at the root indentation; breaks enclosing groups
    Literal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Doc {
    Text(String),
    Concat(Vec<Doc>),
    Group(Box<Doc>),
    Indent(Box<Doc>),
    DedentToRoot(Box<Doc>),
    Line(LineKind),
    /// Transparent marker so later passes can recognise where a doc came from
    Label(&'static str, Box<Doc>),
}

impl Doc {
    pub fn text(text: impl Into<String>) -> Self {
        Doc::Text(text.into())
    }

    pub fn nil() -> Self {
        Doc::Concat(Vec::new())
    }

    pub fn concat(parts: impl IntoIterator<Item = Doc>) -> Self {
        Doc::Concat(parts.into_iter().collect())
    }

    pub fn group(doc: Doc) -> Self {
        Doc::Group(Box::new(doc))
    }

    pub fn indent(doc: Doc) -> Self {
        Doc::Indent(Box::new(doc))
    }

    pub fn dedent_to_root(doc: Doc) -> Self {
        Doc::DedentToRoot(Box::new(doc))
    }

    pub fn label(name: &'static str, doc: Doc) -> Self {
        Doc::Label(name, Box::new(doc))
    }

    pub fn line() -> Self {
        Doc::Line(LineKind::Line)
    }

    pub fn softline() -> Self {
        Doc::Line(LineKind::Soft)
    }

    pub fn hardline() -> Self {
        Doc::Line(LineKind::Hard)
    }

    pub fn literalline() -> Self {
        Doc::Line(LineKind::Literal)
    }

    /// Joins `docs` with `separator` between each pair.
    pub fn join(separator: Doc, docs: impl IntoIterator<Item = Doc>) -> Self {
        let mut parts = Vec::new();
        for (i, doc) in docs.into_iter().enumerate() {
            if i > 0 {
                parts.push(separator.clone());
            }
            parts.push(doc);
        }
        Doc::Concat(parts)
    }

    /// Splits `text` on newlines and joins the lines with hard breaks.
    pub fn lines(text: &str) -> Self {
        Doc::join(Doc::hardline(), text.split('\n').map(Doc::text))
    }

    /// True when the tree contains a hard or literal line break.
    pub fn has_hard_break(&self) -> bool {
        match self {
            Doc::Line(kind) => matches!(kind, LineKind::Hard | LineKind::Literal),
            Doc::Text(_) => false,
            Doc::Concat(parts) => parts.iter().any(Doc::has_hard_break),
            Doc::Group(doc) | Doc::Indent(doc) | Doc::DedentToRoot(doc) | Doc::Label(_, doc) => {
                doc.has_hard_break()
            }
        }
    }

    /// True when rendering the tree always produces more than one line,
    /// through a hard break or a newline inside a text leaf.
    pub fn spans_lines(&self) -> bool {
        match self {
            Doc::Text(text) => text.contains('\n'),
            Doc::Line(kind) => matches!(kind, LineKind::Hard | LineKind::Literal),
            Doc::Concat(parts) => parts.iter().any(Doc::spans_lines),
            Doc::Group(doc) | Doc::Indent(doc) | Doc::DedentToRoot(doc) | Doc::Label(_, doc) => {
                doc.spans_lines()
            }
        }
    }

    /// The label name, if this node is a [`Doc::Label`].
    pub fn label_name(&self) -> Option<&'static str> {
        match self {
            Doc::Label(name, _) => Some(*name),
            _ => None,
        }
    }
}

impl From<&str> for Doc {
    fn from(text: &str) -> Self {
        Doc::text(text)
    }
}

/// Rebuilds `doc` bottom-up, applying `f` to every node after its children
/// have been mapped.
pub fn map_doc<F>(doc: &Doc, f: &mut F) -> Doc
where
    F: FnMut(Doc) -> Doc,
{
    match try_map_doc(doc, &mut |d| Ok::<_, Infallible>(f(d))) {
        Ok(mapped) => mapped,
        Err(never) => match never {},
    }
}

/// Fallible variant of [`map_doc`]; the first error aborts the walk.
pub fn try_map_doc<F, E>(doc: &Doc, f: &mut F) -> Result<Doc, E>
where
    F: FnMut(Doc) -> Result<Doc, E>,
{
    let rebuilt = match doc {
        Doc::Text(_) | Doc::Line(_) => doc.clone(),
        Doc::Concat(parts) => Doc::Concat(
            parts
                .iter()
                .map(|part| try_map_doc(part, f))
                .collect::<Result<_, _>>()?,
        ),
        Doc::Group(inner) => Doc::Group(Box::new(try_map_doc(inner, f)?)),
        Doc::Indent(inner) => Doc::Indent(Box::new(try_map_doc(inner, f)?)),
        Doc::DedentToRoot(inner) => Doc::DedentToRoot(Box::new(try_map_doc(inner, f)?)),
        Doc::Label(name, inner) => Doc::Label(name, Box::new(try_map_doc(inner, f)?)),
    };
    f(rebuilt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_places_separator_between_items() {
        let joined = Doc::join(Doc::hardline(), ["a", "b", "c"].map(Doc::text));
        assert_eq!(
            joined,
            Doc::concat([
                Doc::text("a"),
                Doc::hardline(),
                Doc::text("b"),
                Doc::hardline(),
                Doc::text("c"),
            ])
        );
    }

    #[test]
    fn hard_breaks_are_found_through_wrappers() {
        let doc = Doc::group(Doc::indent(Doc::concat([Doc::text("a"), Doc::literalline()])));
        assert!(doc.has_hard_break());
        assert!(!Doc::group(Doc::concat([Doc::line(), Doc::softline()])).has_hard_break());
    }

    #[test]
    fn newlines_in_text_span_lines() {
        assert!(Doc::concat([Doc::text("a"), Doc::text("b\nc")]).spans_lines());
        assert!(Doc::indent(Doc::hardline()).spans_lines());
        assert!(!Doc::group(Doc::concat([Doc::text("a"), Doc::line()])).spans_lines());
    }

    #[test]
    fn map_doc_visits_children_before_parents() {
        let doc = Doc::group(Doc::concat([Doc::text("a"), Doc::text("b")]));
        let mut order = Vec::new();
        map_doc(&doc, &mut |d| {
            order.push(match &d {
                Doc::Text(s) => s.clone(),
                Doc::Concat(_) => "concat".to_string(),
                Doc::Group(_) => "group".to_string(),
                _ => "other".to_string(),
            });
            d
        });
        assert_eq!(order, ["a", "b", "concat", "group"]);
    }

    #[test]
    fn try_map_doc_stops_on_error() {
        let doc = Doc::concat([Doc::text("ok"), Doc::text("bad")]);
        let result: Result<Doc, String> = try_map_doc(&doc, &mut |d| match &d {
            Doc::Text(s) if s == "bad" => Err(s.clone()),
            _ => Ok(d),
        });
        assert_eq!(result, Err("bad".to_string()));
    }
}
