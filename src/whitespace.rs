//! Exterior whitespace and indentation of embedded content
//!
//! The leading and trailing whitespace of a literal is split off before the
//! text is delegated, and put back afterwards according to a [`Layout`]
//! chosen by the embedded language and the per-identifier settings.

use crate::doc::Doc;
use crate::rehydrate::Rehydrated;

/// Whitespace around the static text of a literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WhitespaceProfile<'a> {
    pub leading: &'a str,
    pub trailing: &'a str,
    pub trimmed: &'a str,
}

impl<'a> WhitespaceProfile<'a> {
    pub fn of(text: &'a str) -> Self {
        let trimmed_start = text.trim_start();
        let leading = &text[..text.len() - trimmed_start.len()];
        let trimmed = trimmed_start.trim_end();
        let trailing = &trimmed_start[trimmed.len()..];
        Self {
            leading,
            trailing,
            trimmed,
        }
    }
}

/// How a language lays out its content between the backticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Content indented inside a group, or exterior whitespace kept verbatim
    /// when preservation is requested or forced by the foreign formatter's
    /// whitespace sensitivity
    Indented { force_preserve: bool },
    /// Either everything on one line, or content on its own indented lines
    Binary,
}

/// Per-identifier switches from the configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Spacing {
    pub preserve_whitespace: bool,
    pub no_indent: bool,
}

/// Wraps rehydrated content in backticks according to `layout`.
pub fn wrap(layout: Layout, profile: &WhitespaceProfile<'_>, content: Rehydrated, spacing: Spacing) -> Doc {
    let tick = || Doc::text("`");
    match layout {
        Layout::Indented { force_preserve } if force_preserve || spacing.preserve_whitespace => {
            let body = if spacing.no_indent {
                content.doc
            } else {
                Doc::indent(content.doc)
            };
            Doc::concat([
                tick(),
                Doc::text(profile.leading),
                body,
                Doc::text(profile.trailing),
                tick(),
            ])
        }
        Layout::Indented { .. } => {
            let inner = Doc::concat([exterior_break(profile.leading), Doc::group(content.doc)]);
            let body = if spacing.no_indent {
                Doc::dedent_to_root(inner)
            } else {
                Doc::indent(inner)
            };
            Doc::concat([tick(), body, exterior_break(profile.trailing), tick()])
        }
        Layout::Binary => {
            let multiline = content.multiline
                || (!profile.leading.is_empty() && !profile.trailing.is_empty());
            if multiline {
                Doc::concat([
                    tick(),
                    Doc::indent(Doc::concat([Doc::hardline(), content.doc])),
                    Doc::hardline(),
                    tick(),
                ])
            } else {
                Doc::concat([tick(), content.doc, tick()])
            }
        }
    }
}

fn exterior_break(whitespace: &str) -> Doc {
    if whitespace.is_empty() {
        Doc::softline()
    } else {
        Doc::line()
    }
}
