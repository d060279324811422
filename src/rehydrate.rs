//! Splicing interpolations back into a foreign formatter's output
//!
//! The foreign formatter returns a [`Doc`] whose text leaves still contain
//! placeholder tokens. Rehydration rebuilds that tree, splitting every text
//! leaf on the codec's regex: static pieces are escaped so they stay valid
//! inside a template literal, and each token is replaced by the document of
//! the interpolation it stands for.

use crate::doc::{Doc, LineKind, try_map_doc};
use crate::placeholder::PlaceholderCodec;
use thiserror::Error;

/// How text leaves are treated during rehydration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rehydration {
    /// Split text leaves only; every structural node is kept as is
    Structural,
    /// Also turn newlines inside text leaves into hard breaks, for
    /// formatters that return plain text rather than a structured tree
    LineNormalizing,
}

/// Result of a rehydration pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rehydrated {
    pub doc: Doc,
    /// Whether any hard or literal break ended up in the content
    pub multiline: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RehydrateError {
    #[error("formatter output refers to placeholder {0}, but the literal has {1} interpolation(s)")]
    UnknownIndex(String, usize),
    #[error("formatter output lost the placeholder for interpolation {0}")]
    Missing(usize),
}

/// Rebuilds `doc` with every placeholder replaced by `expressions[index]`.
///
/// Fails when a token refers to an index outside `expressions` or when any
/// interpolation never reappears, so a successful pass always places every
/// interpolation.
pub fn rehydrate(
    doc: &Doc,
    codec: &PlaceholderCodec,
    expressions: &[Doc],
    strategy: Rehydration,
) -> Result<Rehydrated, RehydrateError> {
    let mut pass = Pass {
        codec,
        expressions,
        strategy,
        used: vec![false; expressions.len()],
        multiline: false,
        escaper: Escaper::new(doc, codec),
    };

    let doc = try_map_doc(doc, &mut |node| match node {
        Doc::Text(text) => pass.split_text(&text),
        Doc::Line(LineKind::Hard | LineKind::Literal) => {
            pass.multiline = true;
            pass.escaper.reset();
            Ok(node)
        }
        other => Ok(other),
    })?;

    if let Some(missing) = pass.used.iter().position(|seen| !seen) {
        return Err(RehydrateError::Missing(missing));
    }
    Ok(Rehydrated {
        doc,
        multiline: pass.multiline,
    })
}

struct Pass<'a> {
    codec: &'a PlaceholderCodec,
    expressions: &'a [Doc],
    strategy: Rehydration,
    used: Vec<bool>,
    multiline: bool,
    escaper: Escaper,
}

impl Pass<'_> {
    fn split_text(&mut self, text: &str) -> Result<Doc, RehydrateError> {
        let mut parts = Vec::new();
        let mut last = 0;

        for found in self.codec.matches(text) {
            self.push_static(&text[last..found.range.start], &mut parts);
            let position = found
                .index
                .filter(|&i| i < self.expressions.len())
                .ok_or_else(|| {
                    RehydrateError::UnknownIndex(found.digits.to_string(), self.expressions.len())
                })?;
            tracing::trace!(index = position, "replacing placeholder");
            self.used[position] = true;
            let expression = &self.expressions[position];
            self.multiline |= expression.spans_lines();
            parts.push(expression.clone());
            self.escaper.reset();
            last = found.range.end;
        }
        self.push_static(&text[last..], &mut parts);

        Ok(match parts.len() {
            1 => parts.remove(0),
            _ => Doc::Concat(parts),
        })
    }

    fn push_static(&mut self, segment: &str, parts: &mut Vec<Doc>) {
        if segment.is_empty() {
            return;
        }
        let escaped = self.escaper.escape(segment);
        match self.strategy {
            Rehydration::Structural => parts.push(Doc::Text(escaped)),
            Rehydration::LineNormalizing => {
                for (i, line) in escaped.split('\n').enumerate() {
                    if i > 0 {
                        parts.push(Doc::hardline());
                        self.multiline = true;
                    }
                    if !line.is_empty() {
                        parts.push(Doc::text(line));
                    }
                }
            }
        }
    }
}

/// Static text in document order, as the rehydration walk meets it.
enum Piece {
    Static(char),
    /// An interpolation or a hard break; delimiters never span one
    Boundary,
}

/// Escapes static segments as one stream, so a delimiter split over two
/// adjacent text leaves (`$` then `{`, or `\` then a backtick) is still
/// recognised.
struct Escaper {
    /// The character right after each non-empty static segment, if the next
    /// piece is static text too
    followers: std::vec::IntoIter<Option<char>>,
    backslashes: usize,
}

impl Escaper {
    fn new(doc: &Doc, codec: &PlaceholderCodec) -> Self {
        let mut pieces = Vec::new();
        collect_pieces(doc, codec, &mut pieces);

        let mut followers = Vec::with_capacity(pieces.len());
        let mut next = None;
        for piece in pieces.iter().rev() {
            match piece {
                Piece::Static(first) => {
                    followers.push(next);
                    next = Some(*first);
                }
                Piece::Boundary => next = None,
            }
        }
        followers.reverse();
        Self {
            followers: followers.into_iter(),
            backslashes: 0,
        }
    }

    fn escape(&mut self, segment: &str) -> String {
        let follower = self.followers.next().flatten();
        escape_run(segment, &mut self.backslashes, follower)
    }

    fn reset(&mut self) {
        self.backslashes = 0;
    }
}

/// Visits leaves in the same order as [`try_map_doc`].
fn collect_pieces(doc: &Doc, codec: &PlaceholderCodec, pieces: &mut Vec<Piece>) {
    match doc {
        Doc::Text(text) => {
            let mut last = 0;
            for found in codec.matches(text) {
                push_piece(&text[last..found.range.start], pieces);
                pieces.push(Piece::Boundary);
                last = found.range.end;
            }
            push_piece(&text[last..], pieces);
        }
        Doc::Line(LineKind::Hard | LineKind::Literal) => pieces.push(Piece::Boundary),
        Doc::Line(_) => {}
        Doc::Concat(parts) => {
            for part in parts {
                collect_pieces(part, codec, pieces);
            }
        }
        Doc::Group(inner) | Doc::Indent(inner) | Doc::DedentToRoot(inner) | Doc::Label(_, inner) => {
            collect_pieces(inner, codec, pieces)
        }
    }
}

fn push_piece(segment: &str, pieces: &mut Vec<Piece>) {
    if let Some(first) = segment.chars().next() {
        pieces.push(Piece::Static(first));
    }
}

/// Escapes backticks and `${` that are not already escaped.
///
/// Static text is extracted raw, so a backslash run before a delimiter is
/// already part of the source; only an even-length run leaves the delimiter
/// live and needs one more backslash.
pub fn escape_template_characters(text: &str) -> String {
    escape_run(text, &mut 0, None)
}

/// `backslashes` carries the length of the trailing backslash run into the
/// next segment; `follower` is the character after `text`, if any.
fn escape_run(text: &str, backslashes: &mut usize, follower: Option<char>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let next = chars.peek().copied().or(follower);
        let live_delimiter = c == '`' || (c == '$' && next == Some('{'));
        if live_delimiter && *backslashes % 2 == 0 {
            out.push('\\');
        }
        out.push(c);
        *backslashes = if c == '\\' { *backslashes + 1 } else { 0 };
    }
    out
}
