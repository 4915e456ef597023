//! Variantext - multi-variant documents from a single HTML source
//!
//! Authors write one document and tag passages with inline markers such as
//! `##A` or `##B=`. This library turns such a region into labelled segments,
//! decides which segments a reader sees for a chosen variant, and renders the
//! result as filtered HTML or a side-by-side comparison table.
//!
//! ## Modules
//!
//! - [`label`] - marker grammar, variant labels and the sorted label set
//! - [`content`] - the region's blocks, loaded from HTML
//! - [`segmenter`] - splitting blocks into labelled segments
//! - [`selector`] - selection state and visibility
//! - [`table`] - comparison table of all variants
//! - [`output`] - stylesheet, controls and rewritten HTML
//! - [`processor`] - a session tying the pipeline together
//! - [`config`] - YAML configuration
//!
//! ## Examples
//!
//! ```
//! use variantext::{VariantConfig, VariantLabel, VariantProcessor};
//!
//! let html = r#"<div id="main-content">
//!     <p>Install the tool.</p>
//!     <p>##linux Run the installer script.</p>
//!     <p>##windows Run the setup wizard.</p>
//! </div>"#;
//!
//! let mut processor = VariantProcessor::new(VariantConfig::default(), ()).unwrap();
//! processor.process(html).unwrap();
//! processor.select(VariantLabel::parse("windows").unwrap());
//!
//! let page = processor.render_page().unwrap();
//! assert!(page.contains(r#"<p data-variant="linux" data-next-variant="windows" hidden>"#));
//! ```

pub mod config;
pub mod content;
pub mod error;
pub mod label;
pub mod output;
pub mod processor;
pub mod segmenter;
pub mod selector;
pub mod table;

pub use config::VariantConfig;
pub use error::{VariantError, VariantResult};
pub use label::{MarkerGrammar, VariantLabel, VariantSet};
pub use processor::{VariantObserver, VariantProcessor};
pub use segmenter::{Segment, Segmentation, Segmenter, segment};
pub use selector::{SelectionEvent, SelectionState, Visibility};
pub use table::ComparisonTable;
