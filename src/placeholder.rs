//! Placeholder tokens standing in for `${...}` interpolations
//!
//! Before the static text of a literal is handed to a foreign formatter, every
//! interpolation is replaced by a token that the foreign language is likely
//! to treat as an ordinary word. Languages that reject bare words where a
//! value is expected (JSON) get the token wrapped in double quotes, unless
//! the user already put quotes around the interpolation. Each codec carries
//! a random stub so tokens cannot collide with text the user wrote.
//!
//! After formatting, [`PlaceholderCodec::matches`] finds the tokens again
//! even if the formatter changed their case or swapped the quotes around a
//! quoted token.
//!
//! # Example
//!
//! ```rust
//! use embedfmt::placeholder::PlaceholderCodec;
//!
//! let codec = PlaceholderCodec::new("embed_placeholder", false).unwrap();
//! let text = codec.build_text(&["SELECT ", " FROM t"]);
//! let token = codec.create(0);
//! assert_eq!(text, format!("SELECT {token} FROM t"));
//!
//! let upper = token.to_uppercase();
//! let found = codec.matches(&upper);
//! assert_eq!(found[0].index, Some(0));
//! ```

use regex::Regex;
use std::ops::Range;
use uuid::Uuid;

/// Creates tokens for interpolation indices and recognises them again.
#[derive(Clone, Debug)]
pub struct PlaceholderCodec {
    prefix: String,
    stub: String,
    quoted: bool,
    regex: Regex,
}

/// One token found in formatted text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderMatch<'t> {
    /// Byte range of the token, including any quotes that were consumed
    pub range: Range<usize>,
    /// Digits captured from the token
    pub digits: &'t str,
    /// The digits as an index, if they fit in `usize`
    pub index: Option<usize>,
}

impl PlaceholderCodec {
    /// Builds a codec with a fresh random stub.
    ///
    /// `prefix` should be a valid word in the target language. With `quoted`
    /// set, tokens are wrapped in double quotes where the surrounding text
    /// does not already quote them.
    pub fn new(prefix: &str, quoted: bool) -> Result<Self, regex::Error> {
        let stub = Uuid::new_v4().simple().to_string()[..8].to_string();
        Self::with_stub(prefix, &stub, quoted)
    }

    /// Builds a codec with a fixed stub. Mostly useful in tests.
    pub fn with_stub(prefix: &str, stub: &str, quoted: bool) -> Result<Self, regex::Error> {
        let core = format!("{}_{}_", regex::escape(prefix), regex::escape(stub));
        // Quoted tokens end in `_q`; only they may swallow the quotes around them.
        let pattern = format!("(?i)[\"'`]?{core}(\\d+)_q[\"'`]?|{core}(\\d+)_");
        Ok(Self {
            prefix: prefix.to_string(),
            stub: stub.to_string(),
            quoted,
            regex: Regex::new(&pattern)?,
        })
    }

    /// Bare token for the interpolation at `index`.
    pub fn create(&self, index: usize) -> String {
        format!("{}_{}_{}_", self.prefix, self.stub, index)
    }

    /// Token wrapped in double quotes, for positions where the foreign
    /// language needs a value rather than a word.
    pub fn create_quoted(&self, index: usize) -> String {
        format!("\"{}_{}_{}_q\"", self.prefix, self.stub, index)
    }

    /// Every token in `text`, in order of appearance.
    pub fn matches<'t>(&self, text: &'t str) -> Vec<PlaceholderMatch<'t>> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let digits = caps.get(1).or_else(|| caps.get(2))?.as_str();
                Some(PlaceholderMatch {
                    range: whole.range(),
                    digits,
                    index: digits.parse().ok(),
                })
            })
            .collect()
    }

    /// Joins static segments with a token between each consecutive pair.
    ///
    /// The last segment carries no trailing token, so `n` segments produce
    /// `n - 1` tokens.
    pub fn build_text<S: AsRef<str>>(&self, quasis: &[S]) -> String {
        let mut text = String::new();
        for (index, quasi) in quasis.iter().enumerate() {
            if index > 0 {
                let before = quasis[index - 1].as_ref();
                let token = if self.quoted && !already_quoted(before, quasi.as_ref()) {
                    self.create_quoted(index - 1)
                } else {
                    self.create(index - 1)
                };
                text.push_str(&token);
            }
            text.push_str(quasi.as_ref());
        }
        text
    }
}

fn already_quoted(before: &str, after: &str) -> bool {
    match before.chars().last() {
        Some(quote @ ('"' | '\'')) => after.starts_with(quote),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(codec: &PlaceholderCodec, text: &str) -> Vec<Option<usize>> {
        codec.matches(text).iter().map(|m| m.index).collect()
    }

    #[test]
    fn stubs_differ_between_codecs() {
        let a = PlaceholderCodec::new("p", false).unwrap();
        let b = PlaceholderCodec::new("p", false).unwrap();
        assert_ne!(a.create(0), b.create(0));
    }

    #[test]
    fn bare_tokens_do_not_swallow_quotes() {
        let codec = PlaceholderCodec::with_stub("embed_placeholder", "abcd1234", false).unwrap();
        let text = format!("WHERE name = '{}'", codec.create(3));
        let found = codec.matches(&text);
        assert_eq!(&text[found[0].range.clone()], "embed_placeholder_abcd1234_3_");
        assert_eq!(found[0].index, Some(3));
    }

    #[test]
    fn quoted_tokens_tolerate_quote_normalisation() {
        let codec = PlaceholderCodec::with_stub("embed_placeholder", "abcd1234", true).unwrap();
        assert_eq!(codec.create_quoted(1), "\"embed_placeholder_abcd1234_1_q\"");
        let reformatted = "key: 'EMBED_PLACEHOLDER_ABCD1234_1_Q'";
        let found = codec.matches(reformatted);
        assert_eq!(&reformatted[found[0].range.clone()], "'EMBED_PLACEHOLDER_ABCD1234_1_Q'");
        assert_eq!(found[0].digits, "1");
    }

    #[test]
    fn quoted_codec_leaves_user_quotes_alone() {
        let codec = PlaceholderCodec::with_stub("p", "s", true).unwrap();
        let text = codec.build_text(&["{\"id\": ", ", \"name\": \"", "\"}"]);
        assert_eq!(text, "{\"id\": \"p_s_0_q\", \"name\": \"p_s_1_\"}");
        let found = codec.matches(&text);
        assert_eq!(&text[found[0].range.clone()], "\"p_s_0_q\"");
        assert_eq!(&text[found[1].range.clone()], "p_s_1_");
    }

    #[test]
    fn trailing_separator_keeps_adjacent_digits_apart() {
        let codec = PlaceholderCodec::with_stub("p", "s", false).unwrap();
        let text = codec.build_text(&["", "0", ""]);
        assert_eq!(text, "p_s_0_0p_s_1_");
        assert_eq!(indices(&codec, &text), [Some(0), Some(1)]);
    }

    #[test]
    fn oversized_index_is_reported_without_a_value() {
        let codec = PlaceholderCodec::with_stub("p", "s", false).unwrap();
        let found = codec.matches("p_s_99999999999999999999999_");
        assert_eq!(found[0].digits, "99999999999999999999999");
        assert_eq!(found[0].index, None);
    }

    #[test]
    fn single_segment_has_no_tokens() {
        let codec = PlaceholderCodec::with_stub("p", "s", false).unwrap();
        assert_eq!(codec.build_text(&["plain"]), "plain");
    }
}
