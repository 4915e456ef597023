//! Splitting a content region into variant-tagged segments.
//!
//! The segmenter walks the region's blocks in document order while a single
//! "current label" flows from block to block, like an ink colour that stays
//! on until a marker changes it. Blocks without markers become one segment in
//! the current label. Blocks with markers are cut at each marker and every
//! non-empty part becomes an inline segment in the label active when it began.
//!
//! Each labelled segment also learns the label that replaced its own
//! (`next_label`). Segments wait in a pending queue until the label changes,
//! then the whole queue is tagged at once.
//!
//! ## Examples
//!
//! ```
//! use variantext::content::{Block, BlockKind, ContentRoot};
//! use variantext::segmenter::segment;
//!
//! let root = ContentRoot::from_blocks([
//!     Block::new(BlockKind::P, "##A first"),
//!     Block::new(BlockKind::P, "second ##C"),
//!     Block::new(BlockKind::P, "third"),
//! ]);
//! let result = segment(&root);
//!
//! let labels: Vec<&str> = result.segments().iter().map(|s| s.label.as_str()).collect();
//! assert_eq!(labels, vec!["A", "A", "C"]);
//! assert_eq!(result.segments()[0].next_label.as_ref().unwrap().as_str(), "C");
//! assert!(result.segments()[2].next_label.is_none());
//! ```

use scraper::{ElementRef, Html};
use serde::Serialize;
use tracing::{debug, info};

use crate::content::{Block, ContentRoot};
use crate::label::{Marker, MarkerGrammar, SplitText, VariantLabel, VariantSet};

/// Elements that may be cut by an inline split without breaking structure.
const PHRASING_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "del", "dfn", "em", "i", "img",
    "ins", "kbd", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u",
    "var", "wbr",
];

/// Index of a segment within its [`Segmentation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SegmentId(pub usize);

/// How much of its source block a segment covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// The entire block, markers removed.
    Block,
    /// One part of a block cut at its markers.
    Inline,
}

/// A span of content carrying exactly one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub id: SegmentId,
    /// Arena index of the source block in the [`ContentRoot`].
    pub block: usize,
    pub kind: SegmentKind,
    pub label: VariantLabel,
    pub exclusive: bool,
    /// The label that took over after this segment's run ended.
    ///
    /// `None` when the run lasts to the end of the document. A run closed by
    /// a return to common content records the common label.
    pub next_label: Option<VariantLabel>,
    /// Inner HTML with markers removed.
    pub content: String,
}

impl Segment {
    pub fn is_common(&self) -> bool {
        self.label.is_common()
    }
}

/// The segmenter's output: ordered segments plus the sorted label set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Segmentation {
    segments: Vec<Segment>,
    labels: VariantSet,
}

impl Segmentation {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn labels(&self) -> &VariantSet {
        &self.labels
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.0)
    }

    /// Segments cut from the block at arena index `block`.
    pub fn segments_for_block(&self, block: usize) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(move |s| s.block == block)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Splits content regions according to a marker grammar.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    grammar: MarkerGrammar,
}

impl Segmenter {
    pub fn new(grammar: MarkerGrammar) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &MarkerGrammar {
        &self.grammar
    }

    /// Segments `root`.
    ///
    /// The label set is collected from the whole region before any block is
    /// split, so the ordering index is complete from the start.
    #[tracing::instrument(skip_all, fields(nodes = root.nodes().len()))]
    pub fn segment(&self, root: &ContentRoot) -> Segmentation {
        let labels: VariantSet = root
            .nodes()
            .iter()
            .flat_map(|node| self.grammar.discover(node.source_text()).labels().to_vec())
            .collect();

        let mut run = LabelRun::default();
        for (index, block) in root.blocks() {
            self.segment_block(index, block, &mut run);
        }
        let segments = run.finish();

        info!(
            segments = segments.len(),
            labels = labels.len(),
            "Segmented content region"
        );
        Segmentation { segments, labels }
    }

    fn segment_block(&self, index: usize, block: &Block, run: &mut LabelRun) {
        let split = self.grammar.split(&block.inner_html);

        if split.is_plain() {
            run.emit(index, SegmentKind::Block, block.inner_html.clone());
            return;
        }

        debug!(
            block = index,
            kind = block.kind.as_tag(),
            markers = split.markers.len(),
            "Splitting block"
        );

        if let [marker] = split.markers.as_slice() {
            let (before, after) = (split.parts[0], split.parts[1]);
            let stripped = format!("{before}{after}");

            if before.trim().is_empty() {
                run.open(marker.clone());
                if stripped.trim().is_empty() {
                    debug!(block = index, "Dropping block left empty by its marker");
                } else {
                    run.emit(index, SegmentKind::Block, stripped);
                }
                return;
            }

            if after.trim().is_empty() {
                run.emit(index, SegmentKind::Block, stripped);
                run.open(marker.clone());
                return;
            }
        }

        if has_structural_children(&block.inner_html) {
            segment_atomic(index, split, run);
            return;
        }

        for (i, part) in split.parts.iter().enumerate() {
            if i > 0 {
                run.open(split.markers[i - 1].clone());
            }
            if !part.is_empty() {
                run.emit(index, SegmentKind::Inline, balanced_fragment(part));
            }
        }
    }
}

/// Segments `root` with the default `##` grammar.
pub fn segment(root: &ContentRoot) -> Segmentation {
    Segmenter::default().segment(root)
}

/// Tracks the active label and the segments still waiting for `next_label`.
#[derive(Debug, Default)]
struct LabelRun {
    current: Marker,
    pending: Vec<usize>,
    segments: Vec<Segment>,
}

impl LabelRun {
    /// Makes `marker` the active label, closing the previous run if the label
    /// actually changes.
    fn open(&mut self, marker: Marker) {
        if marker.label != self.current.label {
            for index in self.pending.drain(..) {
                self.segments[index].next_label = Some(marker.label.clone());
            }
        }
        self.current = marker;
    }

    fn emit(&mut self, block: usize, kind: SegmentKind, content: String) {
        let index = self.segments.len();
        self.segments.push(Segment {
            id: SegmentId(index),
            block,
            kind,
            label: self.current.label.clone(),
            exclusive: self.current.exclusive,
            next_label: None,
            content,
        });
        if !self.current.label.is_common() {
            self.pending.push(index);
        }
    }

    /// Runs still open at the end of input apply through the end of the document.
    fn finish(self) -> Vec<Segment> {
        self.segments
    }
}

/// Keeps a block with nested structure whole.
///
/// Markers preceding all of the block's text still label it; the rest only
/// take effect for the blocks that follow.
fn segment_atomic(index: usize, split: SplitText<'_>, run: &mut LabelRun) {
    debug!(block = index, "Block has nested structure, keeping it whole");

    let mut markers = split.markers.into_iter().enumerate().peekable();
    while let Some((i, _)) = markers.peek() {
        if !is_blank_markup(&split.parts[..=*i].concat()) {
            break;
        }
        if let Some((_, marker)) = markers.next() {
            run.open(marker);
        }
    }

    let content = split.parts.concat();
    if is_blank_markup(&content) && content.trim().is_empty() {
        debug!(block = index, "Dropping block left empty by its markers");
    } else {
        run.emit(index, SegmentKind::Block, content);
    }

    for (_, marker) in markers {
        run.open(marker);
    }
}

/// Re-serialises a part cut out of a block so its tags are balanced.
///
/// Elements left open are closed at the end of the part and stray end tags
/// are dropped.
fn balanced_fragment(part: &str) -> String {
    if !part.contains('<') {
        return part.to_string();
    }
    Html::parse_fragment(part).root_element().inner_html()
}

/// Returns `true` if the markup holds anything but phrasing elements.
fn has_structural_children(inner_html: &str) -> bool {
    let fragment = Html::parse_fragment(inner_html);
    fragment
        .root_element()
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|element| !PHRASING_TAGS.contains(&element.value().name()))
}

/// Returns `true` if the markup has no text apart from whitespace.
fn is_blank_markup(html: &str) -> bool {
    Html::parse_fragment(html)
        .root_element()
        .text()
        .all(|text| text.trim().is_empty())
}
