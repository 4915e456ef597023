//! A processing session over one page.
//!
//! [`VariantProcessor`] ties the pipeline together: it locates the region,
//! segments it, keeps the selection state and reports changes to a
//! [`VariantObserver`].
//!
//! ## Examples
//!
//! ```
//! use variantext::config::VariantConfig;
//! use variantext::label::VariantLabel;
//! use variantext::processor::VariantProcessor;
//!
//! let mut processor = VariantProcessor::new(VariantConfig::default(), ()).unwrap();
//! let found = processor
//!     .process(r#"<div id="main-content"><p>##A one</p><p>##B two</p></div>"#)
//!     .unwrap();
//! assert!(found);
//!
//! let visibility = processor.select(VariantLabel::parse("B").unwrap());
//! assert_eq!(visibility.visible_count(), 1);
//! ```

use tracing::info;

use crate::config::VariantConfig;
use crate::content::ContentRoot;
use crate::error::VariantResult;
use crate::label::VariantLabel;
use crate::output::render_page;
use crate::segmenter::{Segmentation, Segmenter};
use crate::selector::{SelectionEvent, SelectionState, Visibility};

/// Receives notifications from a [`VariantProcessor`].
///
/// Both methods default to doing nothing.
pub trait VariantObserver {
    /// Called after each `process` with the sorted labels found.
    fn on_labels_discovered(&mut self, _labels: &[VariantLabel]) {}

    /// Called after each selection change.
    fn on_visibility_computed(&mut self, _visibility: &Visibility) {}
}

impl VariantObserver for () {}

/// Owns the configuration, the processed region and the current selection.
#[derive(Debug)]
pub struct VariantProcessor<O: VariantObserver = ()> {
    config: VariantConfig,
    segmenter: Segmenter,
    observer: O,
    root: Option<ContentRoot>,
    segmentation: Segmentation,
    state: SelectionState,
    visibility: Visibility,
}

impl<O: VariantObserver> VariantProcessor<O> {
    /// Creates a processor.
    ///
    /// ## Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(config: VariantConfig, observer: O) -> VariantResult<Self> {
        config.validate()?;
        let segmenter = Segmenter::new(config.grammar()?);
        Ok(Self {
            config,
            segmenter,
            observer,
            root: None,
            segmentation: Segmentation::default(),
            state: SelectionState::new(),
            visibility: Visibility::default(),
        })
    }

    /// Processes a page, replacing everything derived from a previous one.
    ///
    /// Returns `false` when the page has no region matching the configured
    /// root; the processor is then empty.
    #[tracing::instrument(skip_all, fields(root = %self.config.root))]
    pub fn process(&mut self, html: &str) -> VariantResult<bool> {
        self.root = None;
        self.segmentation = Segmentation::default();
        self.state = SelectionState::new();
        self.visibility = Visibility::default();

        let Some(root) = ContentRoot::from_html(html, &self.config.root, &self.config.blocks)? else {
            self.observer.on_labels_discovered(&[]);
            return Ok(false);
        };

        self.segmentation = self.segmenter.segment(&root);
        self.root = Some(root);
        self.visibility = self.state.visibility(&self.segmentation);

        info!(
            labels = self.segmentation.labels().len(),
            segments = self.segmentation.len(),
            "Processed page"
        );
        self.observer
            .on_labels_discovered(self.segmentation.labels().labels());
        Ok(true)
    }

    /// Selects `label`, or toggles the exclusive view if it is already selected.
    pub fn select(&mut self, label: VariantLabel) -> &Visibility {
        self.apply(SelectionEvent::Variant(label))
    }

    /// Clears the filter.
    pub fn select_all(&mut self) -> &Visibility {
        self.apply(SelectionEvent::All)
    }

    /// Applies a selection event and recomputes visibility.
    pub fn apply(&mut self, event: SelectionEvent) -> &Visibility {
        self.state.apply(event);
        self.visibility = self.state.visibility(&self.segmentation);
        self.observer.on_visibility_computed(&self.visibility);
        &self.visibility
    }

    pub fn config(&self) -> &VariantConfig {
        &self.config
    }

    /// The processed region, if the last page had one.
    pub fn root(&self) -> Option<&ContentRoot> {
        self.root.as_ref()
    }

    pub fn segmentation(&self) -> &Segmentation {
        &self.segmentation
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Renders stylesheet, controls and region for the current selection.
    ///
    /// Returns `None` when no region has been processed.
    pub fn render_page(&self) -> Option<String> {
        self.root.as_ref().map(|root| {
            render_page(root, &self.segmentation, &self.state, &self.config.palette)
        })
    }
}
