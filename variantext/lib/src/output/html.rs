//! HTML rendering of a processed region.
//!
//! The rewritten region mirrors the source: passthrough markup is copied as-is,
//! blocks keep their tag and attributes, and every segment is tagged with
//! `data-variant` (plus `data-next-variant` and `data-variant-exclusive` where
//! they apply). Blocks that were split inline wrap each part in a `<span>`.
//!
//! ## Examples
//!
//! ```
//! use variantext::content::{Block, BlockKind, ContentRoot};
//! use variantext::output::render_region;
//! use variantext::segmenter::segment;
//!
//! let root = ContentRoot::from_blocks([Block::new(BlockKind::P, "##A first")]);
//! let segmentation = segment(&root);
//!
//! assert_eq!(
//!     render_region(&root, &segmentation, None),
//!     r#"<div><p data-variant="A">first</p></div>"#
//! );
//! ```

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::Palette;
use crate::content::{Block, ContentNode, ContentRoot};
use crate::label::VariantSet;
use crate::segmenter::{Segment, SegmentKind, Segmentation};
use crate::selector::{SelectionState, Visibility};

/// Attributes written by the renderer; copies on source elements are replaced.
const MANAGED_ATTRS: &[&str] = &[
    "data-variant",
    "data-next-variant",
    "data-variant-exclusive",
    "data-exclusive",
    "data-variant-root",
    "hidden",
];

/// Bare attributes written without a value.
const BOOLEAN_ATTRS: &[&str] = &["hidden", "data-variant-exclusive", "data-variant-root"];

/// Builds the stylesheet highlighting each label.
///
/// The exclusive-view rule targets the `data-variant-root` attribute that
/// [`render_page`] puts on the region, whatever selector located it.
///
/// ```rust
/// use variantext::label::{VariantLabel, VariantSet};
/// use variantext::output::{Palette, stylesheet};
///
/// let labels: VariantSet = [VariantLabel::parse("A").unwrap()].into_iter().collect();
/// let css = stylesheet(&labels, &Palette::default());
///
/// assert!(css.contains(r#"[data-variant="A"] { background: #fffbe6; color: #333; }"#));
/// ```
pub fn stylesheet(labels: &VariantSet, palette: &Palette) -> String {
    let mut css = String::from(
        "#variant-btn-container button[aria-pressed=\"true\"] {\n  \
         font-weight: bold;\n  \
         box-shadow: inset 0 2px 4px rgba(0,0,0,0.3);\n  \
         transform: translateY(1px);\n}\n",
    );
    for (index, label) in labels.iter().enumerate() {
        css.push_str(&format!(
            "[data-variant=\"{label}\"] {{ background: {}; color: #333; }}\n",
            palette.color_for(index)
        ));
    }
    css.push_str("[data-variant-root][data-exclusive=\"1\"] [data-variant=\"\"] { display: none; }\n");
    css.push_str("[data-variant][hidden] { display: none; }\n");
    css
}

/// Renders the region with every segment tagged.
///
/// When `visibility` is given, hidden segments carry the `hidden` attribute.
pub fn render_region(
    root: &ContentRoot,
    segmentation: &Segmentation,
    visibility: Option<&Visibility>,
) -> String {
    render_root(root, segmentation, visibility, &[])
}

/// Renders the selection controls: one button per label, then "All".
pub fn render_controls(labels: &VariantSet, state: &SelectionState, palette: &Palette) -> String {
    let mut html = String::from("<div id=\"variant-btn-container\">");
    for (index, control) in state.controls(labels).iter().enumerate() {
        let value = control.target.as_ref().map_or("", |label| label.as_str());
        let style = match control.target {
            Some(_) => format!(
                " style=\"background: {}; color: #333;\"",
                encode_double_quoted_attribute(palette.color_for(index))
            ),
            None => String::new(),
        };
        html.push_str(&format!(
            "<button type=\"button\" data-select=\"{}\" aria-pressed=\"{}\"{style}>{}</button>",
            encode_double_quoted_attribute(value),
            control.pressed,
            encode_text(control.caption()),
        ));
    }
    html.push_str("</div>");
    html
}

/// Renders a complete view: stylesheet, controls and the filtered region.
pub fn render_page(
    root: &ContentRoot,
    segmentation: &Segmentation,
    state: &SelectionState,
    palette: &Palette,
) -> String {
    let visibility = state.visibility(segmentation);
    let exclusive = if state.exclusive_view() { "1" } else { "0" };

    let mut html = String::new();
    html.push_str("<style id=\"variantext-style\">\n");
    html.push_str(&stylesheet(segmentation.labels(), palette));
    html.push_str("</style>\n");
    html.push_str(&render_controls(segmentation.labels(), state, palette));
    html.push('\n');
    html.push_str(&render_root(
        root,
        segmentation,
        Some(&visibility),
        &[("data-variant-root", ""), ("data-exclusive", exclusive)],
    ));
    html
}

fn render_root(
    root: &ContentRoot,
    segmentation: &Segmentation,
    visibility: Option<&Visibility>,
    extra: &[(&str, &str)],
) -> String {
    let mut html = open_tag(root.tag(), root.attrs(), extra);
    for (index, node) in root.nodes().iter().enumerate() {
        match node {
            ContentNode::Passthrough(markup) => html.push_str(markup),
            ContentNode::Block(block) => {
                let segments: Vec<&Segment> = segmentation.segments_for_block(index).collect();
                render_block(&mut html, block, &segments, visibility);
            }
        }
    }
    html.push_str(&format!("</{}>", root.tag()));
    html
}

fn render_block(
    html: &mut String,
    block: &Block,
    segments: &[&Segment],
    visibility: Option<&Visibility>,
) {
    let tag = block.kind.as_tag();
    match segments {
        // Left empty by its markers.
        [] => {}
        [segment] if segment.kind == SegmentKind::Block => {
            let attrs = segment_attrs(segment, visibility);
            html.push_str(&open_tag(tag, &block.attrs, &as_refs(&attrs)));
            html.push_str(&segment.content);
            html.push_str(&format!("</{tag}>"));
        }
        _ => {
            html.push_str(&open_tag(tag, &block.attrs, &[]));
            for segment in segments {
                let attrs = segment_attrs(segment, visibility);
                html.push_str(&open_tag("span", &[], &as_refs(&attrs)));
                html.push_str(&segment.content);
                html.push_str("</span>");
            }
            html.push_str(&format!("</{tag}>"));
        }
    }
}

fn segment_attrs(segment: &Segment, visibility: Option<&Visibility>) -> Vec<(&'static str, String)> {
    let mut attrs = vec![("data-variant", segment.label.to_string())];
    if let Some(next) = &segment.next_label {
        attrs.push(("data-next-variant", next.to_string()));
    }
    if segment.exclusive {
        attrs.push(("data-variant-exclusive", String::new()));
    }
    if visibility.is_some_and(|v| !v.is_visible(segment.id)) {
        attrs.push(("hidden", String::new()));
    }
    attrs
}

fn as_refs<'a>(attrs: &'a [(&'static str, String)]) -> Vec<(&'a str, &'a str)> {
    attrs.iter().map(|(name, value)| (*name, value.as_str())).collect()
}

/// Writes an opening tag. Source attributes named in [`MANAGED_ATTRS`] are
/// dropped in favour of `extra`.
fn open_tag(tag: &str, attrs: &[(String, String)], extra: &[(&str, &str)]) -> String {
    let mut html = format!("<{tag}");
    let source = attrs
        .iter()
        .filter(|(name, _)| !MANAGED_ATTRS.contains(&name.as_str()))
        .map(|(name, value)| (name.as_str(), value.as_str()));

    for (name, value) in source.chain(extra.iter().copied()) {
        if value.is_empty() && BOOLEAN_ATTRS.contains(&name) {
            html.push_str(&format!(" {name}"));
        } else {
            html.push_str(&format!(" {name}=\"{}\"", encode_double_quoted_attribute(value)));
        }
    }
    html.push('>');
    html
}
