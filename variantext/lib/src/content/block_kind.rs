//! Block-level element kinds recognised by the segmenter.
//!
//! Only direct children of the content root whose tag is on the configured
//! allow-list are segmented. Everything else passes through untouched.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

/// A block-level HTML element kind.
///
/// ## Examples
///
/// ```rust
/// use variantext::content::BlockKind;
///
/// assert_eq!(BlockKind::from_tag("P"), Some(BlockKind::P));
/// assert_eq!(BlockKind::H2.as_tag(), "h2");
/// assert_eq!(BlockKind::from_tag("span"), None);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// The `<p>` element.
    P,
    /// The `<div>` element.
    Div,
    /// The `<section>` element.
    Section,
    Article,
    Aside,
    Header,
    Footer,
    Blockquote,
    /// The `<pre>` element.
    ///
    /// Markers inside preformatted text are honoured like anywhere else.
    Pre,
    /// The `<ul>` element. The whole list is one block.
    Ul,
    Ol,
    Dl,
    Table,
    H1,
    /// The `<h2>` element.
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl BlockKind {
    /// The lowercase tag name for this kind.
    pub fn as_tag(&self) -> &str {
        self.as_ref()
    }

    /// Looks up a kind by tag name, ignoring ASCII case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        tag.parse().ok()
    }

    /// The allow-list used when none is configured: `p`, `div`, `section`,
    /// `pre`, `ul` and `h2`.
    pub fn default_allow_list() -> Vec<Self> {
        vec![Self::P, Self::Div, Self::Section, Self::Pre, Self::Ul, Self::H2]
    }

    /// Every recognised kind.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_kind_tags() {
        assert_eq!(BlockKind::P.as_tag(), "p");
        assert_eq!(BlockKind::Blockquote.as_tag(), "blockquote");
        assert_eq!(BlockKind::H6.as_tag(), "h6");
    }

    #[test]
    fn block_kind_from_tag() {
        assert_eq!(BlockKind::from_tag("section"), Some(BlockKind::Section));
        assert_eq!(BlockKind::from_tag("SECTION"), Some(BlockKind::Section));
        assert_eq!(BlockKind::from_tag("em"), None);
        assert_eq!(BlockKind::from_tag(""), None);
    }

    #[test]
    fn block_kind_round_trips_through_tag() {
        for kind in BlockKind::all() {
            assert_eq!(BlockKind::from_tag(kind.as_tag()), Some(kind));
        }
    }

    #[test]
    fn default_allow_list_matches_common_blocks() {
        let allow = BlockKind::default_allow_list();
        assert_eq!(allow.len(), 6);
        assert!(allow.contains(&BlockKind::Pre));
        assert!(!allow.contains(&BlockKind::H1));
    }

    #[test]
    fn block_kind_serde_uses_tag_names() {
        let kinds: Vec<BlockKind> = serde_json::from_str(r#"["p","h3","blockquote"]"#).unwrap();
        assert_eq!(kinds, vec![BlockKind::P, BlockKind::H3, BlockKind::Blockquote]);
        assert_eq!(serde_json::to_string(&BlockKind::Ol).unwrap(), r#""ol""#);
    }
}
