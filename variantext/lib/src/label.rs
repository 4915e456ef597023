//! Variant labels and the inline marker grammar.
//!
//! A marker is the sentinel (`##` by default) followed by a label token made
//! of `[A-Za-z0-9.]`, an optional `=` exclusivity flag and any trailing
//! whitespace. The empty label is legal and means "back to common content".
//!
//! ## Examples
//!
//! ```
//! use variantext::label::MarkerGrammar;
//!
//! let grammar = MarkerGrammar::default();
//! let split = grammar.split("shared ##B= only in B");
//!
//! assert_eq!(split.parts, vec!["shared ", "only in B"]);
//! assert_eq!(split.markers[0].label.as_str(), "B");
//! assert!(split.markers[0].exclusive);
//! ```

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{VariantError, VariantResult};

/// The sentinel used when no other is configured.
pub const DEFAULT_SENTINEL: &str = "##";

/// Characters allowed in a label token.
const LABEL_CLASS: &str = "[A-Za-z0-9.]";

lazy_static! {
    static ref LABEL_PATTERN: Regex = Regex::new(&format!("^{LABEL_CLASS}*$")).unwrap();
    static ref DEFAULT_GRAMMAR: MarkerGrammar = MarkerGrammar::new(DEFAULT_SENTINEL).unwrap();
    /// A comment or a tag, with quoted attribute values skipped as a whole.
    static ref MARKUP_PATTERN: Regex =
        Regex::new(r#"(?s)<!--.*?-->|<(?:[^>"']|"[^"]*"|'[^']*')*>"#).unwrap();
}

/// A variant label such as `A`, `2.1` or the empty common label.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VariantLabel(String);

impl VariantLabel {
    /// The reserved empty label for content shown under every filter.
    pub fn common() -> Self {
        Self(String::new())
    }

    /// Parses a label, returning `None` when it contains characters outside
    /// `[A-Za-z0-9.]`.
    ///
    /// ```
    /// use variantext::label::VariantLabel;
    ///
    /// assert!(VariantLabel::parse("v1.2").is_some());
    /// assert!(VariantLabel::parse("").unwrap().is_common());
    /// assert!(VariantLabel::parse("a-b").is_none());
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        LABEL_PATTERN.is_match(s).then(|| Self(s.to_string()))
    }

    /// Returns `true` for the empty common label.
    pub fn is_common(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VariantLabel {
    type Error = VariantError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if LABEL_PATTERN.is_match(&value) {
            Ok(Self(value))
        } else {
            Err(VariantError::InvalidLabel(value))
        }
    }
}

impl From<VariantLabel> for String {
    fn from(label: VariantLabel) -> Self {
        label.0
    }
}

/// One marker occurrence, with the `=` flag already split off the label.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Marker {
    pub label: VariantLabel,
    pub exclusive: bool,
}

/// Text cut at every marker occurrence.
///
/// `parts` always holds one more entry than `markers`: `parts[i]` is the text
/// before `markers[i]` and the final part is whatever follows the last marker.
/// Parts may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitText<'t> {
    pub parts: Vec<&'t str>,
    pub markers: Vec<Marker>,
}

impl SplitText<'_> {
    /// Returns `true` when no marker was found.
    pub fn is_plain(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Compiled marker grammar for a given sentinel.
#[derive(Debug, Clone)]
pub struct MarkerGrammar {
    sentinel: String,
    marker: Regex,
    discovery: Regex,
}

impl MarkerGrammar {
    /// Compiles the grammar for `sentinel`.
    ///
    /// ## Errors
    ///
    /// Returns [`VariantError::InvalidSentinel`] for an empty sentinel.
    pub fn new(sentinel: &str) -> VariantResult<Self> {
        if sentinel.is_empty() {
            return Err(VariantError::InvalidSentinel(sentinel.to_string()));
        }

        let escaped = regex::escape(sentinel);
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|_| VariantError::InvalidSentinel(sentinel.to_string()))
        };

        Ok(Self {
            sentinel: sentinel.to_string(),
            marker: compile(format!(r"{escaped}({LABEL_CLASS}*)(=?)\s*"))?,
            discovery: compile(format!(r"{escaped}({LABEL_CLASS}+)=?"))?,
        })
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Returns `true` if `text` contains at least one marker.
    pub fn contains_marker(&self, text: &str) -> bool {
        text_runs(text).any(|(_, run)| self.marker.is_match(run))
    }

    /// Collects every non-empty label in `text`, exclusivity stripped.
    ///
    /// Markers are only recognised in text, never inside tags or comments.
    ///
    /// ```
    /// use variantext::label::MarkerGrammar;
    ///
    /// let set = MarkerGrammar::default().discover("##C x ##A= y ##C z ##");
    /// let labels: Vec<&str> = set.iter().map(|l| l.as_str()).collect();
    /// assert_eq!(labels, vec!["A", "C"]);
    /// ```
    pub fn discover(&self, text: &str) -> VariantSet {
        text_runs(text)
            .flat_map(|(_, run)| self.discovery.captures_iter(run))
            .map(|caps| VariantLabel(caps[1].to_string()))
            .collect()
    }

    /// Cuts `text` at each marker found outside tags and comments.
    pub fn split<'t>(&self, text: &'t str) -> SplitText<'t> {
        let mut parts = Vec::new();
        let mut markers = Vec::new();
        let mut last = 0;

        for (offset, run) in text_runs(text) {
            for caps in self.marker.captures_iter(run) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                parts.push(&text[last..offset + whole.start()]);
                markers.push(Marker {
                    label: VariantLabel(caps[1].to_string()),
                    exclusive: !caps[2].is_empty(),
                });
                last = offset + whole.end();
            }
        }
        parts.push(&text[last..]);

        SplitText { parts, markers }
    }

    /// Removes every marker from `text`, leaving tags and comments alone.
    pub fn strip<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if !self.contains_marker(text) {
            return Cow::Borrowed(text);
        }
        let mut stripped = String::with_capacity(text.len());
        let mut last = 0;
        for (offset, run) in text_runs(text) {
            stripped.push_str(&text[last..offset]);
            stripped.push_str(&self.marker.replace_all(run, ""));
            last = offset + run.len();
        }
        stripped.push_str(&text[last..]);
        Cow::Owned(stripped)
    }
}

/// The stretches of `markup` outside tags and comments, with their byte offsets.
fn text_runs(markup: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut last = 0;
    let mut tags = MARKUP_PATTERN.find_iter(markup);
    std::iter::from_fn(move || {
        loop {
            if last > markup.len() {
                return None;
            }
            let (end, next) = match tags.next() {
                Some(tag) => (tag.start(), tag.end()),
                None => (markup.len(), markup.len() + 1),
            };
            let start = last;
            last = next;
            if end > start {
                return Some((start, &markup[start..end]));
            }
        }
    })
}

impl Default for MarkerGrammar {
    fn default() -> Self {
        DEFAULT_GRAMMAR.clone()
    }
}

/// The distinct non-empty labels of one processing run, sorted.
///
/// The position of a label in this set is its ordering index, used by the
/// selector for inheritance ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariantSet {
    labels: Vec<VariantLabel>,
}

impl VariantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordering index of `label`, or `None` if it is unknown or common.
    pub fn index_of(&self, label: &VariantLabel) -> Option<usize> {
        self.labels.binary_search(label).ok()
    }

    pub fn contains(&self, label: &VariantLabel) -> bool {
        self.index_of(label).is_some()
    }

    pub fn labels(&self) -> &[VariantLabel] {
        &self.labels
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VariantLabel> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl FromIterator<VariantLabel> for VariantSet {
    fn from_iter<I: IntoIterator<Item = VariantLabel>>(iter: I) -> Self {
        let unique: BTreeSet<VariantLabel> =
            iter.into_iter().filter(|label| !label.is_common()).collect();
        Self {
            labels: unique.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a VariantSet {
    type Item = &'a VariantLabel;
    type IntoIter = std::slice::Iter<'a, VariantLabel>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn label(s: &str) -> VariantLabel {
        VariantLabel::parse(s).unwrap()
    }

    #[test]
    fn test_label_parse() {
        assert_eq!(label("B").as_str(), "B");
        assert_eq!(label("1.2.3").as_str(), "1.2.3");
        assert!(label("").is_common());
        assert!(VariantLabel::parse("B=").is_none());
        assert!(VariantLabel::parse("a b").is_none());
        assert!(VariantLabel::parse("é").is_none());
    }

    #[test]
    fn test_label_serde_validates() {
        let ok: VariantLabel = serde_json::from_str(r#""v2""#).unwrap();
        assert_eq!(ok, label("v2"));

        let bad = serde_json::from_str::<VariantLabel>(r#""v-2""#);
        assert!(bad.is_err());

        assert_eq!(serde_json::to_string(&label("A")).unwrap(), r#""A""#);
    }

    #[test]
    fn test_split_without_markers() {
        let split = MarkerGrammar::default().split("<em>plain</em> text");
        assert!(split.is_plain());
        assert_eq!(split.parts, vec!["<em>plain</em> text"]);
    }

    #[test]
    fn test_split_marker_at_start() {
        let split = MarkerGrammar::default().split("##B content1");
        assert_eq!(split.parts, vec!["", "content1"]);
        assert_eq!(split.markers, vec![Marker { label: label("B"), exclusive: false }]);
    }

    #[test]
    fn test_split_marker_at_end() {
        let split = MarkerGrammar::default().split("content1 ##B");
        assert_eq!(split.parts, vec!["content1 ", ""]);
        assert_eq!(split.markers[0].label, label("B"));
    }

    #[test]
    fn test_split_exclusive_marker() {
        let split = MarkerGrammar::default().split("a ##A= b ## c");
        assert_eq!(split.parts, vec!["a ", "b ", "c"]);
        assert!(split.markers[0].exclusive);
        assert_eq!(split.markers[0].label, label("A"));
        assert!(!split.markers[1].exclusive);
        assert!(split.markers[1].label.is_common());
    }

    #[test]
    fn test_adjacent_markers_leave_empty_parts() {
        let split = MarkerGrammar::default().split("##A ##B text");
        assert_eq!(split.parts, vec!["", "", "text"]);
        assert_eq!(split.markers.len(), 2);
        assert_eq!(split.markers[1].label, label("B"));
    }

    #[test]
    fn test_disallowed_characters_stay_literal() {
        let split = MarkerGrammar::default().split("x ##A-b y");
        assert_eq!(split.markers[0].label, label("A"));
        assert_eq!(split.parts, vec!["x ", "-b y"]);
    }

    #[test]
    fn test_discover_ignores_empty_labels() {
        let set = MarkerGrammar::default().discover("## a ##B b ##A= c ##B d");
        assert_eq!(set.labels(), &[label("A"), label("B")]);
    }

    #[test]
    fn test_strip_removes_markers_and_trailing_space() {
        let grammar = MarkerGrammar::default();
        assert_eq!(grammar.strip("one ##A two ##B=  three"), "one two three");
        assert!(matches!(grammar.strip("no markers"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_markers_inside_attributes_are_ignored() {
        let grammar = MarkerGrammar::default();
        let markup = r##"see <a href="/page##B" title='x ##C'>link</a> ##A here"##;

        let split = grammar.split(markup);
        assert_eq!(
            split.parts,
            vec![r##"see <a href="/page##B" title='x ##C'>link</a> "##, "here"]
        );
        assert_eq!(split.markers[0].label, label("A"));
        assert_eq!(grammar.discover(markup).labels(), &[label("A")]);
        assert_eq!(
            grammar.strip(markup),
            r##"see <a href="/page##B" title='x ##C'>link</a> here"##
        );
    }

    #[test]
    fn test_markers_inside_comments_are_ignored() {
        let grammar = MarkerGrammar::default();
        let markup = "<!-- ##X <b> --><em>one</em>##B two";

        assert!(grammar.discover("<!-- ##X -->").is_empty());
        assert!(!grammar.contains_marker(r###"<img alt="##A">"###));

        let split = grammar.split(markup);
        assert_eq!(split.parts, vec!["<!-- ##X <b> --><em>one</em>", "two"]);
        assert_eq!(split.markers[0].label, label("B"));
    }

    #[test]
    fn test_custom_sentinel() {
        let grammar = MarkerGrammar::new("@@").unwrap();
        assert_eq!(grammar.sentinel(), "@@");
        let split = grammar.split("a ##B b @@C c");
        assert_eq!(split.parts, vec!["a ##B b ", "c"]);
        assert_eq!(split.markers[0].label, label("C"));
    }

    #[test]
    fn test_sentinel_with_regex_metacharacters() {
        let grammar = MarkerGrammar::new("[v]").unwrap();
        let split = grammar.split("x [v]A y v z");
        assert_eq!(split.parts, vec!["x ", "y v z"]);
    }

    #[test]
    fn test_empty_sentinel_is_rejected() {
        let err = MarkerGrammar::new("").unwrap_err();
        assert!(matches!(err, VariantError::InvalidSentinel(_)));
    }

    #[test]
    fn test_variant_set_index() {
        let set: VariantSet = ["C", "A", "B", "A", ""].iter().map(|s| label(s)).collect();
        assert_eq!(set.len(), 3);
        assert_eq!(set.index_of(&label("A")), Some(0));
        assert_eq!(set.index_of(&label("C")), Some(2));
        assert_eq!(set.index_of(&label("D")), None);
        assert_eq!(set.index_of(&VariantLabel::common()), None);
        assert!(!set.contains(&VariantLabel::common()));
    }

    proptest! {
        #[test]
        fn prop_ordering_index_is_lexicographic(
            names in proptest::collection::vec("[A-Za-z0-9.]{1,4}", 1..12)
        ) {
            let set: VariantSet = names.iter().map(|n| label(n)).collect();
            for a in set.iter() {
                for b in set.iter() {
                    let (ia, ib) = (set.index_of(a).unwrap(), set.index_of(b).unwrap());
                    prop_assert_eq!(ia < ib, a.as_str() < b.as_str());
                }
            }
        }

        #[test]
        fn prop_split_parts_rejoin_to_stripped_text(text in "[a-z #=AB.\\n]{0,60}") {
            let grammar = MarkerGrammar::default();
            let split = grammar.split(&text);
            prop_assert_eq!(split.parts.len(), split.markers.len() + 1);
            prop_assert_eq!(split.parts.concat(), grammar.strip(&text).into_owned());
        }
    }
}
