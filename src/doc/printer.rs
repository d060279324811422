//! Width-aware rendering of a [`Doc`] into text
//!
//! A small Wadler-style printer: a group is printed flat when its content
//! (plus whatever follows it up to the next possible break) fits in the
//! remaining width and contains no hard break; otherwise its lines break.
//!
//! # Example
//!
//! ```rust
//! use embedfmt::doc::Doc;
//! use embedfmt::doc::printer::{PrintOptions, render};
//!
//! let doc = Doc::group(Doc::concat([
//!     Doc::text("`"),
//!     Doc::indent(Doc::concat([Doc::softline(), Doc::text("SELECT 1")])),
//!     Doc::softline(),
//!     Doc::text("`"),
//! ]));
//! assert_eq!(render(&doc, &PrintOptions::default(), "", 0), "`SELECT 1`");
//! ```

use super::{Doc, LineKind};

/// Layout settings for [`render`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrintOptions {
    pub print_width: usize,
    pub tab_width: usize,
    pub use_tabs: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            print_width: 80,
            tab_width: 2,
            use_tabs: false,
        }
    }
}

impl PrintOptions {
    fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.tab_width)
        }
    }

    /// Display width of `text`, counting a tab as `tab_width` columns.
    pub fn width_of(&self, text: &str) -> usize {
        text.chars()
            .map(|c| if c == '\t' { self.tab_width } else { 1 })
            .sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Break,
    Flat,
}

struct Command<'d> {
    indent: String,
    mode: Mode,
    doc: &'d Doc,
}

/// Renders `doc` starting at `start_column` of a line whose indentation is
/// `base_indent`.
///
/// Hard and soft breaks continue at the current indentation (initially
/// `base_indent`); literal breaks and [`Doc::DedentToRoot`] return to
/// column zero.
pub fn render(doc: &Doc, opts: &PrintOptions, base_indent: &str, start_column: usize) -> String {
    let unit = opts.indent_unit();
    let mut out = String::new();
    let mut column = start_column;
    let mut commands = vec![Command {
        indent: base_indent.to_string(),
        mode: Mode::Break,
        doc,
    }];

    while let Some(Command { indent, mode, doc }) = commands.pop() {
        match doc {
            Doc::Text(text) => {
                out.push_str(text);
                column = match text.rfind('\n') {
                    Some(pos) => opts.width_of(&text[pos + 1..]),
                    None => column + opts.width_of(text),
                };
            }
            Doc::Concat(parts) => {
                for part in parts.iter().rev() {
                    commands.push(Command {
                        indent: indent.clone(),
                        mode,
                        doc: part,
                    });
                }
            }
            Doc::Indent(inner) => commands.push(Command {
                indent: format!("{indent}{unit}"),
                mode,
                doc: inner.as_ref(),
            }),
            Doc::DedentToRoot(inner) => commands.push(Command {
                indent: String::new(),
                mode,
                doc: inner.as_ref(),
            }),
            Doc::Label(_, inner) => commands.push(Command {
                indent,
                mode,
                doc: inner.as_ref(),
            }),
            Doc::Group(inner) => {
                let group_mode = if mode == Mode::Flat {
                    Mode::Flat
                } else if !inner.has_hard_break() {
                    let remaining = opts.print_width as isize - column as isize;
                    if fits(inner, &commands, remaining, opts) {
                        Mode::Flat
                    } else {
                        Mode::Break
                    }
                } else {
                    Mode::Break
                };
                commands.push(Command {
                    indent,
                    mode: group_mode,
                    doc: inner.as_ref(),
                });
            }
            Doc::Line(kind) => match (mode, kind) {
                (Mode::Flat, LineKind::Soft) => {}
                (Mode::Flat, LineKind::Line) => {
                    out.push(' ');
                    column += 1;
                }
                (_, LineKind::Literal) => {
                    out.push('\n');
                    column = 0;
                }
                _ => {
                    trim_trailing_whitespace(&mut out);
                    out.push('\n');
                    out.push_str(&indent);
                    column = opts.width_of(&indent);
                }
            },
        }
    }

    out
}

/// Whether `next`, printed flat, and the pending `rest` up to its first
/// break fit into `remaining` columns.
fn fits(next: &Doc, rest: &[Command<'_>], mut remaining: isize, opts: &PrintOptions) -> bool {
    let mut rest_index = rest.len();
    let mut pending: Vec<(Mode, &Doc)> = vec![(Mode::Flat, next)];

    loop {
        if remaining < 0 {
            return false;
        }
        let (mode, doc) = match pending.pop() {
            Some(item) => item,
            None => {
                if rest_index == 0 {
                    return true;
                }
                rest_index -= 1;
                (rest[rest_index].mode, rest[rest_index].doc)
            }
        };
        match doc {
            Doc::Text(text) => match text.find('\n') {
                Some(pos) => return remaining >= opts.width_of(&text[..pos]) as isize,
                None => remaining -= opts.width_of(text) as isize,
            },
            Doc::Concat(parts) => {
                for part in parts.iter().rev() {
                    pending.push((mode, part));
                }
            }
            Doc::Indent(inner) | Doc::DedentToRoot(inner) | Doc::Label(_, inner) => {
                pending.push((mode, inner.as_ref()))
            }
            Doc::Group(inner) => {
                let mode = if inner.has_hard_break() {
                    Mode::Break
                } else {
                    mode
                };
                pending.push((mode, inner.as_ref()));
            }
            Doc::Line(kind) => match (mode, kind) {
                (Mode::Break, _) | (_, LineKind::Hard | LineKind::Literal) => return true,
                (Mode::Flat, LineKind::Line) => remaining -= 1,
                (Mode::Flat, LineKind::Soft) => {}
            },
        }
    }
}

fn trim_trailing_whitespace(out: &mut String) {
    let trimmed = out.trim_end_matches([' ', '\t']).len();
    out.truncate(trimmed);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(content: Doc) -> Doc {
        Doc::group(Doc::concat([
            Doc::text("`"),
            Doc::indent(Doc::concat([Doc::softline(), content])),
            Doc::softline(),
            Doc::text("`"),
        ]))
    }

    #[test]
    fn flat_group_when_it_fits() {
        let doc = literal(Doc::text("color: red;"));
        assert_eq!(render(&doc, &PrintOptions::default(), "", 0), "`color: red;`");
    }

    #[test]
    fn hard_break_forces_enclosing_group_to_break() {
        let doc = literal(Doc::concat([
            Doc::text("SELECT *"),
            Doc::hardline(),
            Doc::text("FROM t"),
        ]));
        assert_eq!(
            render(&doc, &PrintOptions::default(), "    ", 10),
            "`\n      SELECT *\n      FROM t\n    `"
        );
    }

    #[test]
    fn group_breaks_when_too_wide() {
        let opts = PrintOptions {
            print_width: 10,
            ..PrintOptions::default()
        };
        let doc = Doc::group(Doc::concat([
            Doc::text("aaaa"),
            Doc::line(),
            Doc::text("bbbb"),
            Doc::line(),
            Doc::text("cccc"),
        ]));
        assert_eq!(render(&doc, &opts, "", 0), "aaaa\nbbbb\ncccc");
    }

    #[test]
    fn literal_line_and_dedent_return_to_root() {
        let doc = Doc::indent(Doc::concat([
            Doc::text("a"),
            Doc::literalline(),
            Doc::text("b"),
            Doc::dedent_to_root(Doc::concat([Doc::hardline(), Doc::text("c")])),
            Doc::hardline(),
            Doc::text("d"),
        ]));
        assert_eq!(
            render(&doc, &PrintOptions::default(), "  ", 2),
            "a\nb\nc\n    d"
        );
    }

    #[test]
    fn tabs_are_used_for_indentation_when_requested() {
        let opts = PrintOptions {
            use_tabs: true,
            ..PrintOptions::default()
        };
        let doc = Doc::indent(Doc::concat([Doc::hardline(), Doc::text("x")]));
        assert_eq!(render(&doc, &opts, "", 0), "\n\tx");
    }

    #[test]
    fn trailing_spaces_are_trimmed_before_breaks() {
        let doc = Doc::concat([Doc::text("a  "), Doc::hardline(), Doc::text("b")]);
        assert_eq!(render(&doc, &PrintOptions::default(), "", 0), "a\nb");
    }
}
