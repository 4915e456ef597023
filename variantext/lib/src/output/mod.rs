//! Presentation of processed regions.
//!
//! - [`Palette`] - per-label highlight colours
//! - [`render_region`] / [`render_page`] - the rewritten HTML
//! - [`render_controls`] - the variant selection buttons

pub mod html;
pub mod palette;

pub use html::{render_controls, render_page, render_region, stylesheet};
pub use palette::{DEFAULT_COLORS, Palette};
