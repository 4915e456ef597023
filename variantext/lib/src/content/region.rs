//! Loading the processed region out of an HTML page.
//!
//! The region is the element matched by the configured root selector. Its
//! direct children are flattened into an arena of [`ContentNode`]s: allow-listed
//! block elements become [`Block`]s and everything else is kept verbatim as
//! passthrough markup.
//!
//! ## Trade-offs
//!
//! `scraper` parses into a read-only DOM and does not keep byte offsets, so
//! block content is re-serialised from the tree. Attribute order and entity
//! spelling may therefore differ slightly from the input, but markers (which
//! only use `#`, `=`, ASCII alphanumerics and `.`) survive unchanged.

use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use super::BlockKind;
use crate::error::{VariantError, VariantResult};

/// An allow-listed block element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    pub inner_html: String,
}

impl Block {
    /// Creates a block with no attributes.
    pub fn new(kind: BlockKind, inner_html: impl Into<String>) -> Self {
        Self {
            kind,
            attrs: Vec::new(),
            inner_html: inner_html.into(),
        }
    }

    /// Adds an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }
}

/// A direct child of the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    /// A block the segmenter processes.
    Block(Block),
    /// Markup that is carried through unchanged.
    Passthrough(String),
}

impl ContentNode {
    /// The markup scanned for variant labels.
    pub fn source_text(&self) -> &str {
        match self {
            Self::Block(block) => &block.inner_html,
            Self::Passthrough(html) => html,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Self::Block(block) => Some(block),
            Self::Passthrough(_) => None,
        }
    }
}

/// The processed region: the root element and its children in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRoot {
    tag: String,
    attrs: Vec<(String, String)>,
    nodes: Vec<ContentNode>,
}

impl ContentRoot {
    pub fn new(tag: impl Into<String>, attrs: Vec<(String, String)>, nodes: Vec<ContentNode>) -> Self {
        Self {
            tag: tag.into(),
            attrs,
            nodes,
        }
    }

    /// Builds a `<div>` region made only of the given blocks.
    ///
    /// ```rust
    /// use variantext::content::{Block, BlockKind, ContentRoot};
    ///
    /// let root = ContentRoot::from_blocks([
    ///     Block::new(BlockKind::P, "##B content1"),
    ///     Block::new(BlockKind::P, "content2"),
    /// ]);
    /// assert_eq!(root.nodes().len(), 2);
    /// ```
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        Self::new("div", Vec::new(), blocks.into_iter().map(ContentNode::Block).collect())
    }

    /// Locates the region in an HTML page.
    ///
    /// Returns `Ok(None)` when no element matches `root_selector`; a page
    /// without a region simply has nothing to process.
    ///
    /// ## Errors
    ///
    /// Returns [`VariantError::InvalidSelector`] if `root_selector` does not parse.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use variantext::content::{BlockKind, ContentRoot};
    ///
    /// let html = r#"<div id="main-content"><p>##A one</p><table></table></div>"#;
    /// let root = ContentRoot::from_html(html, "#main-content", &BlockKind::default_allow_list())
    ///     .unwrap()
    ///     .unwrap();
    ///
    /// assert_eq!(root.blocks().count(), 1);
    /// assert_eq!(root.nodes().len(), 2);
    /// ```
    pub fn from_html(
        html: &str,
        root_selector: &str,
        allow_list: &[BlockKind],
    ) -> VariantResult<Option<Self>> {
        let selector = parse_selector(root_selector)?;
        let document = Html::parse_document(html);

        let Some(root) = document.select(&selector).next() else {
            debug!(root_selector, "No content root found");
            return Ok(None);
        };

        let nodes: Vec<ContentNode> = root
            .children()
            .filter_map(|child| match child.value() {
                Node::Element(_) => ElementRef::wrap(child).map(|el| element_node(el, allow_list)),
                Node::Text(text) => Some(ContentNode::Passthrough(
                    html_escape::encode_text(&**text).into_owned(),
                )),
                Node::Comment(comment) => {
                    Some(ContentNode::Passthrough(format!("<!--{}-->", &**comment)))
                }
                _ => None,
            })
            .collect();

        let element = root.value();
        Ok(Some(Self {
            tag: element.name().to_string(),
            attrs: owned_attrs(element.attrs()),
            nodes,
        }))
    }

    /// Tag name of the root element.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    pub fn nodes(&self) -> &[ContentNode] {
        &self.nodes
    }

    /// Blocks with their arena index, in document order.
    pub fn blocks(&self) -> impl Iterator<Item = (usize, &Block)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.as_block().map(|block| (index, block)))
    }
}

fn element_node(element: ElementRef<'_>, allow_list: &[BlockKind]) -> ContentNode {
    let value = element.value();
    match BlockKind::from_tag(value.name()) {
        Some(kind) if allow_list.contains(&kind) => ContentNode::Block(Block {
            kind,
            attrs: owned_attrs(value.attrs()),
            inner_html: element.inner_html(),
        }),
        _ => ContentNode::Passthrough(element.html()),
    }
}

fn owned_attrs<'a>(attrs: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<(String, String)> {
    attrs
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// The text of an HTML fragment with runs of whitespace collapsed.
///
/// ```rust
/// use variantext::content::plain_text;
///
/// assert_eq!(plain_text("<em>Hello</em>\n   world"), "Hello world");
/// ```
pub fn plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a CSS selector string, returning an error for invalid selectors.
pub(crate) fn parse_selector(selector_str: &str) -> VariantResult<Selector> {
    Selector::parse(selector_str).map_err(|_| VariantError::InvalidSelector(selector_str.to_string()))
}
