//! Formatting embedded languages in JavaScript and TypeScript source
//!
//! The file is parsed with tree-sitter and every template literal is handed
//! to the [`Dispatcher`]. Literals it claims are rendered and spliced back in
//! place; everything else in the file stays byte for byte as it was.
//! Literals nested inside the interpolations of another literal are
//! formatted first; when the outer literal is claimed too, their documents
//! become part of its interpolations and are laid out where they end up.
//!
//! # Example
//!
//! ```rust
//! use embedfmt::config::EmbedConfig;
//! use embedfmt::doc::Doc;
//! use embedfmt::embed::Dispatcher;
//! use embedfmt::foreign::FormatterRegistry;
//! use embedfmt::formatter::{FormatOptions, format_source};
//! use embedfmt::options::Options;
//!
//! let upper = |text: &str, _: &Options| Ok::<_, anyhow::Error>(Doc::text(text.to_uppercase()));
//! let formatters = FormatterRegistry::new().with("css", upper);
//! let dispatcher = Dispatcher::new(&EmbedConfig::default(), formatters);
//!
//! let source = "const style = css` a { color: red } `;\n";
//! let formatted = format_source(source, &FormatOptions::default(), &dispatcher).unwrap();
//! assert_eq!(formatted, "const style = css` A { COLOR: RED } `;\n");
//! ```

use crate::doc::Doc;
use crate::doc::printer::{PrintOptions, render};
use crate::embed::{Dispatcher, EmbedContext};
use crate::literal::{Literal, extract};
use crate::parser::{HostLanguage, parse};
use anyhow::{Context, Result};
use std::ops::Range;
use std::path::Path;
use tree_sitter::Node;

/// Output mode for the formatter
///
/// Determines how the formatted code should be handled after processing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Print formatted code to stdout
    #[default]
    Stdout,
    /// Write formatted code back to source files
    Write,
    /// Check if formatting would change the code (used for CI/validation)
    Check,
}

/// Configuration options for the formatter
#[derive(Clone, Copy, Debug, Default)]
pub struct FormatOptions {
    /// Width and indentation used when rendering formatted literals
    pub print: PrintOptions,
    /// How to handle the formatted output
    pub mode: Mode,
    /// Grammar used to parse the source
    pub host: HostLanguage,
}

/// A replacement of `range` in the source by `text`, the rendering of `doc`
/// at the literal's original position.
#[derive(Debug)]
struct Edit {
    range: Range<usize>,
    text: String,
    doc: Doc,
}

struct Rewriter<'a> {
    source: &'a str,
    dispatcher: &'a Dispatcher,
    print: PrintOptions,
    context: EmbedContext<'a>,
}

/// Format the embedded languages in a JavaScript or TypeScript source
///
/// # Errors
///
/// Fails when the source cannot be parsed, or when a claimed literal cannot
/// be formatted (missing formatter, formatter failure, unsupported SQL
/// dialect, lost placeholder). The error names the identifier and the line
/// of the literal.
pub fn format_source(input: &str, opts: &FormatOptions, dispatcher: &Dispatcher) -> Result<String> {
    rewrite(input, opts, dispatcher, None)
}

/// Like [`format_source`], with the grammar picked from `path` and override
/// sources resolved relative to it.
pub fn format_file_source(
    input: &str,
    path: &Path,
    opts: &FormatOptions,
    dispatcher: &Dispatcher,
) -> Result<String> {
    let opts = FormatOptions {
        host: HostLanguage::from_path(path).unwrap_or(opts.host),
        ..*opts
    };
    rewrite(input, &opts, dispatcher, Some(path))
}

fn rewrite(input: &str, opts: &FormatOptions, dispatcher: &Dispatcher, file: Option<&Path>) -> Result<String> {
    let tree = parse(input, opts.host)?;
    let rewriter = Rewriter {
        source: input,
        dispatcher,
        print: opts.print,
        context: EmbedContext {
            host: opts.host,
            file,
        },
    };
    let mut edits = Vec::new();
    rewriter.collect(tree.root_node(), &mut edits)?;
    tracing::debug!(literals = edits.len(), "formatted embedded literals");
    Ok(apply(input, 0..input.len(), &edits))
}

impl<'a> Rewriter<'a> {
    fn collect(&self, node: Node<'_>, edits: &mut Vec<Edit>) -> Result<()> {
        if node.kind() != "template_string" {
            return self.collect_children(node, edits);
        }

        let mut nested = Vec::new();
        let literal = extract(node, self.source, |substitution, range| {
            let mut inner = Vec::new();
            self.collect_children(substitution, &mut inner)?;
            let doc = splice(self.source, range, &inner);
            nested.extend(inner);
            Ok(doc)
        })?;

        let position = node.start_position();
        let embedded = self
            .dispatcher
            .embed(&literal, &self.context)
            .with_context(|| format!("line {}, column {}", position.row + 1, position.column + 1))?;
        match embedded {
            Some(doc) => {
                let doc = Doc::group(doc);
                edits.push(Edit {
                    range: node.byte_range(),
                    text: self.render(node.start_byte(), &doc),
                    doc,
                });
            }
            None => edits.extend(nested),
        }
        Ok(())
    }

    fn collect_children(&self, node: Node<'_>, edits: &mut Vec<Edit>) -> Result<()> {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect(child, edits)?;
        }
        Ok(())
    }

    /// Renders `doc` as if it were printed at byte `start` of the source:
    /// continuation lines are indented like the line the literal starts on.
    fn render(&self, start: usize, doc: &Doc) -> String {
        let line_start = self.source[..start].rfind('\n').map_or(0, |i| i + 1);
        let line = &self.source[line_start..start];
        let base_indent = &line[..line.len() - line.trim_start().len()];
        let column = self.print.width_of(line);
        render(doc, &self.print, base_indent, column)
    }
}

/// The source of `range` as a document, with the documents of `edits` in
/// place of the text they replace.
fn splice(source: &str, range: Range<usize>, edits: &[Edit]) -> Doc {
    let mut parts = Vec::with_capacity(edits.len() * 2 + 1);
    let mut last = range.start;
    for edit in edits {
        if last < edit.range.start {
            parts.push(Doc::text(&source[last..edit.range.start]));
        }
        parts.push(edit.doc.clone());
        last = edit.range.end;
    }
    if last < range.end || parts.is_empty() {
        parts.push(Doc::text(&source[last..range.end]));
    }
    match parts.len() {
        1 => parts.remove(0),
        _ => Doc::Concat(parts),
    }
}

/// The text of `range` with `edits` applied. Edits are in source order and
/// do not overlap.
fn apply(source: &str, range: Range<usize>, edits: &[Edit]) -> String {
    let mut out = String::with_capacity(range.len());
    let mut last = range.start;
    for edit in edits {
        out.push_str(&source[last..edit.range.start]);
        out.push_str(&edit.text);
        last = edit.range.end;
    }
    out.push_str(&source[last..range.end]);
    out
}

/// A template literal as the dispatcher sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteralReport {
    /// One-based line of the opening backtick
    pub line: usize,
    pub column: usize,
    pub tag: Option<String>,
    pub comment: Option<String>,
    pub expressions: usize,
    /// Language and identifier, when a language claims the literal
    pub claimed_by: Option<(&'static str, String)>,
}

/// Lists every template literal in `input` with the language that claims it.
pub fn inspect(input: &str, host: HostLanguage, dispatcher: &Dispatcher) -> Result<Vec<LiteralReport>> {
    let tree = parse(input, host)?;
    let mut reports = Vec::new();
    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        if node.kind() == "template_string" {
            let literal: Literal = extract(node, input, |_, range| Ok(Doc::text(&input[range])))?;
            let position = node.start_position();
            reports.push(LiteralReport {
                line: position.row + 1,
                column: position.column + 1,
                tag: literal.tag.as_ref().map(|tag| tag.source.clone()),
                comment: literal.leading_comment.clone(),
                expressions: literal.expressions.len(),
                claimed_by: dispatcher
                    .identify(&literal, host)
                    .map(|found| (found.language, found.identifier.to_string())),
            });
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    Ok(reports)
}
