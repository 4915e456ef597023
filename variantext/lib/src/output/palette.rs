//! Background colours for variant highlighting.

use serde::{Deserialize, Serialize};

use crate::error::{VariantError, VariantResult};

/// The built-in pastel colours.
pub const DEFAULT_COLORS: [&str; 10] = [
    "#fffbe6", "#e6f7ff", "#f9e6ff", "#e6ffe6", "#ffe6f7", "#f7ffe6", "#e6e6ff", "#ffe6e6",
    "#e6fff7", "#f7e6ff",
];

/// Colours handed out to labels in sorted order, cycling when exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    /// Creates a palette from CSS colour values.
    ///
    /// ## Errors
    ///
    /// Returns [`VariantError::EmptyPaletteEntry`] for a blank entry. An empty
    /// list falls back to the default colours.
    pub fn new(colors: impl IntoIterator<Item = impl Into<String>>) -> VariantResult<Self> {
        let colors: Vec<String> = colors.into_iter().map(Into::into).collect();
        if colors.is_empty() {
            return Ok(Self::default());
        }
        let palette = Self { colors };
        palette.validate()?;
        Ok(palette)
    }

    /// Checks that no entry is blank.
    pub fn validate(&self) -> VariantResult<()> {
        match self.colors.iter().position(|c| c.trim().is_empty()) {
            Some(index) => Err(VariantError::EmptyPaletteEntry { index }),
            None => Ok(()),
        }
    }

    /// Colour for the label at `index` in the sorted label set.
    ///
    /// ```rust
    /// use variantext::output::Palette;
    ///
    /// let palette = Palette::default();
    /// assert_eq!(palette.color_for(0), "#fffbe6");
    /// assert_eq!(palette.color_for(10), "#fffbe6");
    /// ```
    pub fn color_for(&self, index: usize) -> &str {
        match self.colors.len() {
            0 => DEFAULT_COLORS[index % DEFAULT_COLORS.len()],
            len => &self.colors[index % len],
        }
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}
