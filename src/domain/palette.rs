// Category to color mapping for chart series
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryColor {
    pub name: String,
    pub color: String,
}

impl CategoryColor {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPalette {
    entries: Vec<CategoryColor>,
    default_color: String,
}

pub const DEFAULT_SERIES_COLOR: &str = "gray";

impl CategoryPalette {
    pub fn new(entries: Vec<CategoryColor>, default_color: impl Into<String>) -> Self {
        Self {
            entries,
            default_color: default_color.into(),
        }
    }

    pub fn default_entries() -> Vec<CategoryColor> {
        vec![
            CategoryColor::new("Tote_util", "royalblue"),
            CategoryColor::new("Tray_util", "seagreen"),
            CategoryColor::new("Combi_util", "indianred"),
        ]
    }

    pub fn color_for(&self, category: &str) -> &str {
        self.entries
            .iter()
            .find(|e| e.name == category)
            .map(|e| e.color.as_str())
            .unwrap_or(&self.default_color)
    }
}

impl Default for CategoryPalette {
    fn default() -> Self {
        Self::new(Self::default_entries(), DEFAULT_SERIES_COLOR)
    }
}
