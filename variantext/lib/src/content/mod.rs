//! The block content model the segmenter walks.
//!
//! - [`BlockKind`] - allow-listed block-level element kinds
//! - [`ContentRoot`] - the processed region as an arena of [`ContentNode`]s

pub mod block_kind;
pub mod region;

pub use block_kind::BlockKind;
pub use region::{Block, ContentNode, ContentRoot, plain_text};
