//! Positioned text blocks, the input unit of the extraction engine.

use serde::{Deserialize, Serialize};

/// A positioned unit of extracted text.
///
/// Supplied wholesale by the upstream PDF reader for one document.
/// Blocks carry no inherent reading order; all order is derived
/// geometrically from the bounding box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Text content; may contain internal newlines.
    pub text: String,

    /// Bounding box `[x0, y0, x1, y1]` in page coordinates.
    pub bbox: [f64; 4],

    /// 0-based page number, monotonic with physical page order.
    #[serde(default)]
    pub page: u32,

    /// Average font size of the spans making up this block.
    #[serde(default = "default_font_size", alias = "font")]
    pub font_size: f64,
}

fn default_font_size() -> f64 {
    10.0
}

impl Block {
    /// Create a block from text and bounding box on page 0.
    pub fn new(text: impl Into<String>, bbox: [f64; 4]) -> Self {
        Self {
            text: text.into(),
            bbox,
            page: 0,
            font_size: default_font_size(),
        }
    }

    /// Same block on a specific page.
    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn x0(&self) -> f64 {
        self.bbox[0]
    }

    pub fn y0(&self) -> f64 {
        self.bbox[1]
    }

    pub fn x1(&self) -> f64 {
        self.bbox[2]
    }

    pub fn y1(&self) -> f64 {
        self.bbox[3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_block_deserialize_defaults() {
        let b: Block = serde_json::from_str(r#"{"text":"TOTAL","bbox":[10.0,20.0,80.0,32.0]}"#).unwrap();
        assert_eq!(b.page, 0);
        assert_eq!(b.font_size, 10.0);
        assert_eq!(b.x1(), 80.0);
    }

    #[test]
    fn test_block_font_alias() {
        let b: Block =
            serde_json::from_str(r#"{"text":"x","bbox":[0.0,0.0,1.0,1.0],"font":8.5,"page":2}"#).unwrap();
        assert_eq!(b.font_size, 8.5);
        assert_eq!(b.page, 2);
    }
}
