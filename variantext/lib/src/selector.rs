//! Deciding which segments are visible for the current selection.
//!
//! The selection is a pair `(selected, exclusive_view)` that starts at
//! `("", false)`, meaning "show everything". Choosing a variant filters the
//! document down to:
//!
//! - segments tagged with exactly that variant,
//! - common segments,
//! - and segments of an earlier variant whose run was not yet overridden at
//!   the selected position in the sorted label order (inheritance).
//!
//! Exclusive segments (`##A=`) never inherit. Choosing the same variant a
//! second time toggles the exclusive view, which hides everything except the
//! variant's own segments.
//!
//! ## Examples
//!
//! ```
//! use variantext::content::{Block, BlockKind, ContentRoot};
//! use variantext::label::VariantLabel;
//! use variantext::segmenter::segment;
//! use variantext::selector::SelectionState;
//!
//! let root = ContentRoot::from_blocks([
//!     Block::new(BlockKind::P, "##A from A on"),
//!     Block::new(BlockKind::P, "##C only C"),
//! ]);
//! let segmentation = segment(&root);
//!
//! let mut state = SelectionState::new();
//! state.select(VariantLabel::parse("C").unwrap());
//! let visibility = state.visibility(&segmentation);
//!
//! assert_eq!(visibility.visible_count(), 1);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::label::{VariantLabel, VariantSet};
use crate::segmenter::{Segment, SegmentId, Segmentation};

/// An external selection event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// A variant control was chosen.
    Variant(VariantLabel),
    /// The "all" control was chosen.
    All,
}

/// The current filter.
///
/// Fields are private so that `exclusive_view` can only be on while a
/// variant is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    selected: VariantLabel,
    exclusive_view: bool,
}

impl SelectionState {
    /// The initial "show everything" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected label, or the common label when nothing is filtered.
    pub fn selected(&self) -> &VariantLabel {
        &self.selected
    }

    pub fn exclusive_view(&self) -> bool {
        self.exclusive_view
    }

    /// Returns `true` while a variant is selected.
    pub fn is_filtering(&self) -> bool {
        !self.selected.is_common()
    }

    /// Applies one event.
    ///
    /// Choosing the selected variant again flips the exclusive view, choosing
    /// another variant selects it with the exclusive view off, and choosing
    /// "all" (or the common label) clears the filter.
    pub fn apply(&mut self, event: SelectionEvent) {
        match event {
            SelectionEvent::Variant(label) if !label.is_common() => {
                if label == self.selected {
                    self.exclusive_view = !self.exclusive_view;
                } else {
                    self.selected = label;
                    self.exclusive_view = false;
                }
            }
            _ => {
                self.selected = VariantLabel::common();
                self.exclusive_view = false;
            }
        }
        debug!(
            selected = self.selected.as_str(),
            exclusive_view = self.exclusive_view,
            "Selection changed"
        );
    }

    pub fn select(&mut self, label: VariantLabel) {
        self.apply(SelectionEvent::Variant(label));
    }

    pub fn select_all(&mut self) {
        self.apply(SelectionEvent::All);
    }

    /// Visibility of every segment under this selection.
    pub fn visibility(&self, segmentation: &Segmentation) -> Visibility {
        compute_visibility(
            segmentation.segments(),
            segmentation.labels(),
            &self.selected,
            self.exclusive_view,
        )
    }

    /// The controls a view should show: one per label, then "all".
    pub fn controls(&self, labels: &VariantSet) -> Vec<Control> {
        labels
            .iter()
            .map(|label| Control {
                target: Some(label.clone()),
                pressed: *label == self.selected,
            })
            .chain(std::iter::once(Control {
                target: None,
                pressed: !self.is_filtering(),
            }))
            .collect()
    }
}

/// A selection control and whether it is pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Control {
    /// The label this control selects; `None` for the "all" control.
    pub target: Option<VariantLabel>,
    pub pressed: bool,
}

impl Control {
    /// The caption shown on the control.
    pub fn caption(&self) -> &str {
        self.target.as_ref().map_or("All", |label| label.as_str())
    }

    pub fn event(&self) -> SelectionEvent {
        match &self.target {
            Some(label) => SelectionEvent::Variant(label.clone()),
            None => SelectionEvent::All,
        }
    }
}

/// Per-segment visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Visibility {
    map: BTreeMap<SegmentId, bool>,
}

impl Visibility {
    /// Visibility of `id`; segments not in the map are visible.
    pub fn is_visible(&self, id: SegmentId) -> bool {
        self.map.get(&id).copied().unwrap_or(true)
    }

    pub fn visible_count(&self) -> usize {
        self.map.values().filter(|visible| **visible).count()
    }

    pub fn hidden_count(&self) -> usize {
        self.map.len() - self.visible_count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SegmentId, bool)> + '_ {
        self.map.iter().map(|(id, visible)| (*id, *visible))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Computes the visibility of every segment.
///
/// A selected label that is not in `labels` matches nothing: only common
/// content and runs that stay open to the end of the document remain visible.
pub fn compute_visibility(
    segments: &[Segment],
    labels: &VariantSet,
    selected: &VariantLabel,
    exclusive_view: bool,
) -> Visibility {
    if selected.is_common() && exclusive_view {
        warn!("Exclusive view requested without a selected variant, ignoring it");
    }

    let map: BTreeMap<SegmentId, bool> = segments
        .iter()
        .map(|segment| {
            (
                segment.id,
                is_visible(segment, labels, selected, exclusive_view),
            )
        })
        .collect();

    let visibility = Visibility { map };
    debug!(
        selected = selected.as_str(),
        visible = visibility.visible_count(),
        hidden = visibility.hidden_count(),
        "Computed visibility"
    );
    visibility
}

/// Decides whether one segment is visible.
pub fn is_visible(
    segment: &Segment,
    labels: &VariantSet,
    selected: &VariantLabel,
    exclusive_view: bool,
) -> bool {
    if selected.is_common() || segment.label == *selected {
        return true;
    }
    if exclusive_view || segment.exclusive {
        return false;
    }
    if segment.label.is_common() {
        return true;
    }

    let Some(start) = labels.index_of(&segment.label) else {
        return false;
    };
    // An unknown selection sorts after every label; an unknown or common
    // next label leaves the run open.
    let position = labels.index_of(selected);
    let end = segment
        .next_label
        .as_ref()
        .and_then(|next| labels.index_of(next));

    match (position, end) {
        (Some(position), Some(end)) => start <= position && position < end,
        (Some(position), None) => start <= position,
        (None, end) => end.is_none(),
    }
}
