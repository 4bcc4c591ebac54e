//! Escape-aware delimiter tokenizer for blockfill templates.
//!
//! This crate locates delimited placeholder blocks (default `<name>`) in a
//! template string with a single forward scan. It produces immutable,
//! location-tagged [`Block`] records that the `blockfill` crate's compile and
//! render pipeline consumes.
//!
//! # Example
//!
//! ```rust
//! use blockfill_parser::{tokenize, DelimiterPair};
//!
//! let pairs = DelimiterPair::default();
//! let blocks = tokenize("hello, <name>!", &pairs);
//!
//! assert_eq!(blocks.len(), 1);
//! assert_eq!(blocks[0].name, "name");
//! assert_eq!(blocks[0].loc.s, 7);
//! ```
//!
//! # Scanning rules
//!
//! - A backslash escapes exactly the next character; an escaped character can
//!   neither start nor end a delimiter.
//! - A start delimiter seen while a block is already open discards the
//!   previous opener (delimiters never nest; the most recent opener wins).
//! - Inner text is trimmed of surrounding whitespace. An empty or
//!   whitespace-only placeholder produces no block.
//! - An opener with no matching closer before end of input produces no block.
//!
//! All offsets are byte offsets into the template. The inclusive `e`/`ve`
//! offsets always precede a UTF-8 boundary, so [`Loc::span`] and
//! [`Loc::inner`] are safe to slice with.

use std::collections::HashMap;
use std::ops::Range;

use serde::Serialize;
use thiserror::Error;

/// The escape prefix. A character following it is always literal text.
pub const ESCAPE_CHAR: char = '\\';

/// The configurable start/end marker strings bounding a placeholder.
///
/// Construction validates the configuration preconditions: both markers must
/// be non-empty and must differ from each other. The tokenizer itself never
/// re-checks this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelimiterPair {
    start: String,
    end: String,
}

impl DelimiterPair {
    /// Creates a delimiter pair, rejecting empty or identical markers.
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Result<Self, DelimiterError> {
        let start = start.into();
        let end = end.into();
        if start.is_empty() || end.is_empty() {
            return Err(DelimiterError::Empty);
        }
        if start == end {
            return Err(DelimiterError::Identical(start));
        }
        Ok(Self { start, end })
    }

    /// The start marker.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// The end marker.
    pub fn end(&self) -> &str {
        &self.end
    }
}

impl Default for DelimiterPair {
    /// The default `<` / `>` pair.
    fn default() -> Self {
        Self {
            start: "<".to_string(),
            end: ">".to_string(),
        }
    }
}

/// Invalid delimiter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DelimiterError {
    /// A zero-length marker was supplied.
    #[error("delimiter markers must be non-empty")]
    Empty,

    /// Start and end markers are the same string.
    #[error("start and end delimiters must differ, both are {0:?}")]
    Identical(String),
}

/// Outcome of probing for a delimiter at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterMatch {
    /// The delimiter begins exactly at the probed position.
    Hit {
        /// Byte offset where the delimiter starts (equals the probed position).
        start: usize,
        /// Byte offset just past the delimiter.
        next: usize,
    },
    /// No delimiter here; `next` advances past one character.
    Miss {
        /// Byte offset of the following character.
        next: usize,
    },
}

/// Probes whether `delimiter` starts at byte offset `pos` in `text`.
///
/// Pure and stateless. `pos` must lie on a character boundary; on a miss the
/// returned position advances by exactly one character, keeping the scan
/// UTF-8 safe.
pub fn match_delimiter(text: &str, delimiter: &str, pos: usize) -> DelimiterMatch {
    if text[pos..].starts_with(delimiter) {
        DelimiterMatch::Hit {
            start: pos,
            next: pos + delimiter.len(),
        }
    } else {
        DelimiterMatch::Miss {
            next: pos + char_width(text, pos),
        }
    }
}

/// Byte width of the character at `pos`, or 1 past end of input.
fn char_width(text: &str, pos: usize) -> usize {
    text[pos..].chars().next().map_or(1, char::len_utf8)
}

/// Source offsets of one placeholder occurrence.
///
/// `s..=e` spans the whole delimited run including both markers; `vs..=ve`
/// spans the inner variable text before trimming. Invariant:
/// `s <= vs <= ve + 1 <= e`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Loc {
    /// Start of the delimited span.
    pub s: usize,
    /// End of the delimited span (inclusive).
    pub e: usize,
    /// Start of the inner variable text.
    pub vs: usize,
    /// End of the inner variable text (inclusive, untrimmed).
    pub ve: usize,
}

impl Loc {
    /// The whole delimited span as an exclusive range.
    pub fn span(&self) -> Range<usize> {
        self.s..self.e + 1
    }

    /// The untrimmed inner text as an exclusive range.
    pub fn inner(&self) -> Range<usize> {
        self.vs..self.ve + 1
    }
}

/// One recognized placeholder occurrence.
///
/// `name` is the mutable lookup key, initially the trimmed inner text;
/// compile-time transforms may rewrite it. `raw` is that same trimmed text,
/// frozen at tokenization, which plugins read to derive their own fields.
/// `hits` lists the plugins that claimed this block, in claim order.
///
/// Plugin-specific data goes in the attribute store under
/// convention-namespaced keys (`pipe.filters`, `slice.len`, ...) rather than
/// on the struct itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// Source offsets, fixed at tokenization.
    pub loc: Loc,
    /// Lookup key; transforms may rewrite it.
    pub name: String,
    raw: String,
    /// Names of the plugins that claimed this block, in claim order.
    pub hits: Vec<String>,
    attrs: HashMap<String, serde_json::Value>,
}

impl Block {
    fn new(loc: Loc, text: &str) -> Self {
        Self {
            loc,
            name: text.to_string(),
            raw: text.to_string(),
            hits: Vec::new(),
            attrs: HashMap::new(),
        }
    }

    /// The trimmed inner text as it appeared in the template.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Reads a plugin-owned attribute.
    pub fn attr(&self, key: &str) -> Option<&serde_json::Value> {
        self.attrs.get(key)
    }

    /// Writes a plugin-owned attribute, replacing any existing value.
    pub fn set_attr(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.attrs.insert(key.into(), value);
    }

    /// Whether `name` appears in this block's hit list.
    pub fn has_hit(&self, name: &str) -> bool {
        self.hits.iter().any(|h| h == name)
    }
}

/// Pending opener while the tokenizer is inside a block.
#[derive(Clone, Copy)]
struct Open {
    s: usize,
    vs: usize,
}

/// Single-pass tokenizer over one template.
///
/// Iterates the recognized [`Block`]s in ascending source order. The scan is
/// O(n) in the template length with no backtracking: each position is visited
/// once, and a delimiter probe costs at most the delimiter's length.
pub struct Tokenizer<'a> {
    template: &'a str,
    pairs: &'a DelimiterPair,
    pos: usize,
    open: Option<Open>,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer positioned at the start of `template`.
    pub fn new(template: &'a str, pairs: &'a DelimiterPair) -> Self {
        Self {
            template,
            pairs,
            pos: 0,
            open: None,
        }
    }

    fn advance_escape(&mut self) {
        self.pos += ESCAPE_CHAR.len_utf8();
        if self.pos < self.template.len() {
            // The escaped character is consumed without inspection.
            self.pos += char_width(self.template, self.pos);
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        while self.pos < self.template.len() {
            if self.template[self.pos..].starts_with(ESCAPE_CHAR) {
                self.advance_escape();
                continue;
            }

            let Some(open) = self.open else {
                match match_delimiter(self.template, self.pairs.start(), self.pos) {
                    DelimiterMatch::Hit { start, next } => {
                        self.open = Some(Open { s: start, vs: next });
                        self.pos = next;
                    }
                    DelimiterMatch::Miss { next } => self.pos = next,
                }
                continue;
            };

            match match_delimiter(self.template, self.pairs.end(), self.pos) {
                DelimiterMatch::Hit { start, next } => {
                    let trimmed = self.template[open.vs..start].trim();
                    self.open = None;
                    self.pos = next;
                    if !trimmed.is_empty() {
                        let loc = Loc {
                            s: open.s,
                            e: next - 1,
                            vs: open.vs,
                            ve: start - 1,
                        };
                        return Some(Block::new(loc, trimmed));
                    }
                    // Empty placeholder: no block, the markers stay literal.
                }
                DelimiterMatch::Miss { .. } => {
                    match match_delimiter(self.template, self.pairs.start(), self.pos) {
                        DelimiterMatch::Hit { start, next } => {
                            // Most recent unclosed opener wins.
                            self.open = Some(Open { s: start, vs: next });
                            self.pos = next;
                        }
                        DelimiterMatch::Miss { next } => self.pos = next,
                    }
                }
            }
        }
        None
    }
}

/// Tokenizes a whole template into its ordered block list.
pub fn tokenize(template: &str, pairs: &DelimiterPair) -> Vec<Block> {
    Tokenizer::new(template, pairs).collect()
}

/// Appends `text` to `out` with escape characters consumed.
///
/// Each `\` drops out of the output and the character after it is kept
/// verbatim (`\\` therefore yields a single backslash). A trailing lone `\`
/// is dropped.
pub fn unescape_into(out: &mut String, text: &str) {
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE_CHAR {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn braces() -> DelimiterPair {
        DelimiterPair::new("{{", "}}").unwrap()
    }

    // ==================== Delimiter Matcher Tests ====================

    mod matcher {
        use super::*;

        #[test]
        fn hit_at_position() {
            assert_eq!(
                match_delimiter("a<b", "<", 1),
                DelimiterMatch::Hit { start: 1, next: 2 }
            );
        }

        #[test]
        fn hit_multichar() {
            assert_eq!(
                match_delimiter("x{{y", "{{", 1),
                DelimiterMatch::Hit { start: 1, next: 3 }
            );
        }

        #[test]
        fn miss_advances_one_char() {
            assert_eq!(match_delimiter("abc", "<", 0), DelimiterMatch::Miss { next: 1 });
        }

        #[test]
        fn miss_advances_whole_utf8_char() {
            // 'é' is two bytes; a miss must not land mid-character.
            assert_eq!(match_delimiter("é<", "<", 0), DelimiterMatch::Miss { next: 2 });
        }

        #[test]
        fn partial_prefix_is_a_miss() {
            assert_eq!(match_delimiter("{x", "{{", 0), DelimiterMatch::Miss { next: 1 });
        }
    }

    // ==================== Delimiter Pair Tests ====================

    mod pairs {
        use super::*;

        #[test]
        fn default_is_angle_brackets() {
            let pairs = DelimiterPair::default();
            assert_eq!(pairs.start(), "<");
            assert_eq!(pairs.end(), ">");
        }

        #[test]
        fn empty_marker_rejected() {
            assert_eq!(DelimiterPair::new("", ">"), Err(DelimiterError::Empty));
            assert_eq!(DelimiterPair::new("<", ""), Err(DelimiterError::Empty));
        }

        #[test]
        fn identical_markers_rejected() {
            assert_eq!(
                DelimiterPair::new("%", "%"),
                Err(DelimiterError::Identical("%".to_string()))
            );
        }
    }

    // ==================== Tokenizer Tests ====================

    mod tokenizer {
        use super::*;

        #[test]
        fn adjacent_blocks_with_exact_offsets() {
            let blocks = tokenize("<foo><bar>", &DelimiterPair::default());
            assert_eq!(blocks.len(), 2);

            assert_eq!(blocks[0].name, "foo");
            assert_eq!(blocks[0].raw(), "foo");
            assert_eq!(blocks[0].loc, Loc { s: 0, e: 4, vs: 1, ve: 3 });

            assert_eq!(blocks[1].name, "bar");
            assert_eq!(blocks[1].loc, Loc { s: 5, e: 9, vs: 6, ve: 8 });
        }

        #[test]
        fn inner_text_is_trimmed_but_offsets_are_not() {
            let template = ".{{ foo }}.";
            let blocks = tokenize(template, &braces());
            assert_eq!(blocks.len(), 1);

            let block = &blocks[0];
            assert_eq!(block.name, "foo");
            assert_eq!(&template[block.loc.inner()], " foo ");
            assert_eq!(block.loc, Loc { s: 1, e: 9, vs: 3, ve: 7 });
        }

        #[test]
        fn empty_placeholder_produces_no_block() {
            let pairs = DelimiterPair::default();
            assert!(tokenize("hi<>", &pairs).is_empty());
            assert!(tokenize("hi<  >", &pairs).is_empty());
        }

        #[test]
        fn escaped_start_delimiter_is_literal() {
            assert!(tokenize(r"\<foo>", &DelimiterPair::default()).is_empty());
        }

        #[test]
        fn escaped_end_delimiter_keeps_block_open() {
            // The escaped '>' cannot close, so the block never closes.
            assert!(tokenize(r"<a\>", &DelimiterPair::default()).is_empty());
        }

        #[test]
        fn escape_inside_literal_text() {
            let blocks = tokenize(r"a\xb<c>", &DelimiterPair::default());
            assert_eq!(blocks.len(), 1);
            assert_eq!(blocks[0].name, "c");
        }

        #[test]
        fn unterminated_opener_yields_nothing() {
            assert!(tokenize("before <name", &DelimiterPair::default()).is_empty());
        }

        #[test]
        fn reopened_start_discards_previous_opener() {
            let blocks = tokenize("a<b<c>d", &DelimiterPair::default());
            assert_eq!(blocks.len(), 1);
            assert_eq!(blocks[0].name, "c");
            assert_eq!(blocks[0].loc, Loc { s: 3, e: 5, vs: 4, ve: 4 });
        }

        #[test]
        fn multichar_delimiters() {
            let blocks = tokenize("hello {{name}}!", &braces());
            assert_eq!(blocks.len(), 1);
            assert_eq!(blocks[0].name, "name");
            assert_eq!(blocks[0].loc, Loc { s: 6, e: 13, vs: 8, ve: 11 });
        }

        #[test]
        fn utf8_literal_text_before_block() {
            let template = "héllo <name>";
            let blocks = tokenize(template, &DelimiterPair::default());
            assert_eq!(blocks.len(), 1);
            assert_eq!(&template[blocks[0].loc.span()], "<name>");
        }

        #[test]
        fn blocks_never_overlap_and_ascend() {
            let blocks = tokenize("<a> x <b> y <c>", &DelimiterPair::default());
            assert_eq!(blocks.len(), 3);
            for pair in blocks.windows(2) {
                assert!(pair[0].loc.e < pair[1].loc.s);
            }
        }

        #[test]
        fn plain_text_yields_nothing() {
            assert!(tokenize("no placeholders here", &DelimiterPair::default()).is_empty());
        }
    }

    // ==================== Block Attribute Tests ====================

    mod attrs {
        use super::*;
        use serde_json::json;

        #[test]
        fn set_and_read_attr() {
            let mut blocks = tokenize("<a>", &DelimiterPair::default());
            let block = &mut blocks[0];

            assert!(block.attr("pipe.filters").is_none());
            block.set_attr("pipe.filters", json!(["upper"]));
            assert_eq!(block.attr("pipe.filters"), Some(&json!(["upper"])));
        }

        #[test]
        fn raw_survives_name_rewrite() {
            let mut blocks = tokenize("<a|b>", &DelimiterPair::default());
            let block = &mut blocks[0];

            block.name = "a".to_string();
            assert_eq!(block.raw(), "a|b");
        }

        #[test]
        fn hit_membership() {
            let mut blocks = tokenize("<a>", &DelimiterPair::default());
            let block = &mut blocks[0];

            assert!(!block.has_hit("pipe"));
            block.hits.push("pipe".to_string());
            assert!(block.has_hit("pipe"));
        }
    }

    // ==================== Unescape Tests ====================

    mod unescape {
        use super::*;

        fn unescaped(text: &str) -> String {
            let mut out = String::new();
            unescape_into(&mut out, text);
            out
        }

        #[test]
        fn escape_char_is_consumed() {
            assert_eq!(unescaped(r"\<foo>"), "<foo>");
        }

        #[test]
        fn double_escape_yields_one_backslash() {
            assert_eq!(unescaped(r"a\\b"), r"a\b");
        }

        #[test]
        fn trailing_escape_is_dropped() {
            assert_eq!(unescaped("ab\\"), "ab");
        }

        #[test]
        fn plain_text_is_unchanged() {
            assert_eq!(unescaped("plain text"), "plain text");
        }
    }
}
