//! Processor configuration.
//!
//! Every field has a default, so an empty document is a valid configuration.
//!
//! ```yaml
//! root: "#main-content"
//! sentinel: "##"
//! blocks: [p, div, section, pre, ul, h2]
//! palette: ["#fffbe6", "#e6f7ff"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::content::BlockKind;
use crate::content::region::parse_selector;
use crate::error::{VariantError, VariantResult};
use crate::label::{DEFAULT_SENTINEL, MarkerGrammar};
use crate::output::Palette;

/// Selector of the region processed when none is configured.
pub const DEFAULT_ROOT: &str = "#main-content";

/// Settings for a [`VariantProcessor`](crate::processor::VariantProcessor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct VariantConfig {
    /// CSS selector of the content region.
    pub root: String,
    /// Text that opens a marker.
    pub sentinel: String,
    /// Block kinds the segmenter processes.
    pub blocks: Vec<BlockKind>,
    /// Highlight colours.
    pub palette: Palette,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            sentinel: DEFAULT_SENTINEL.to_string(),
            blocks: BlockKind::default_allow_list(),
            palette: Palette::default(),
        }
    }
}

impl VariantConfig {
    /// Parses and validates a YAML configuration.
    ///
    /// ```rust
    /// use variantext::config::VariantConfig;
    ///
    /// let config = VariantConfig::from_yaml("root: article\n").unwrap();
    /// assert_eq!(config.root, "article");
    /// assert_eq!(config.sentinel, "##");
    /// ```
    ///
    /// ## Errors
    ///
    /// Returns [`VariantError::Config`] for malformed YAML and the matching
    /// validation error for unusable values.
    pub fn from_yaml(yaml: &str) -> VariantResult<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> VariantResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| VariantError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_yaml(&yaml)
    }

    /// Checks the root selector, sentinel and palette.
    pub fn validate(&self) -> VariantResult<()> {
        parse_selector(&self.root)?;
        MarkerGrammar::new(&self.sentinel)?;
        self.palette.validate()
    }

    /// Compiles the marker grammar for the configured sentinel.
    pub fn grammar(&self) -> VariantResult<MarkerGrammar> {
        MarkerGrammar::new(&self.sentinel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = VariantConfig::default();
        assert_eq!(config.root, "#main-content");
        assert_eq!(config.sentinel, "##");
        assert_eq!(config.blocks, BlockKind::default_allow_list());
        assert_eq!(config.palette, Palette::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(VariantConfig::from_yaml("").unwrap(), VariantConfig::default());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r##"
root: "main > article"
sentinel: "@@"
blocks: [p, li, blockquote]
palette: ["#000", "#111"]
"##;
        let result = VariantConfig::from_yaml(yaml);
        // `li` is not a block kind
        assert!(matches!(result, Err(VariantError::Config(_))));

        let config = VariantConfig::from_yaml(&yaml.replace("li, ", "")).unwrap();
        assert_eq!(config.root, "main > article");
        assert_eq!(config.sentinel, "@@");
        assert_eq!(config.blocks, vec![BlockKind::P, BlockKind::Blockquote]);
        assert_eq!(config.palette.color_for(1), "#111");
    }

    #[test]
    fn test_invalid_root_is_rejected() {
        let result = VariantConfig::from_yaml("root: \"div[\"\n");
        assert!(matches!(result, Err(VariantError::InvalidSelector(_))));
    }

    #[test]
    fn test_empty_sentinel_is_rejected() {
        let result = VariantConfig::from_yaml("sentinel: \"\"\n");
        assert!(matches!(result, Err(VariantError::InvalidSentinel(_))));
    }

    #[test]
    fn test_blank_palette_entry_is_rejected() {
        let result = VariantConfig::from_yaml("palette: [red, \"\"]\n");
        assert!(matches!(result, Err(VariantError::EmptyPaletteEntry { index: 1 })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "root: main").unwrap();

        let config = VariantConfig::load(file.path()).unwrap();
        assert_eq!(config.root, "main");
        assert_eq!(config.grammar().unwrap().sentinel(), "##");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        match VariantConfig::load(&path) {
            Err(VariantError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("Expected Io error, got {other:?}"),
        }
    }
}
