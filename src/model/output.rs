//! Final per-page output items.

use serde::{Deserialize, Serialize};

/// Content type of an output item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Text only
    #[default]
    Text,
    /// Text followed by one or more tables
    Excel,
}

/// One page of assembled content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputItem {
    /// 1-based page number
    pub page: u32,

    /// `text` or `excel`
    #[serde(rename = "type")]
    pub content_type: ContentType,

    /// Document title
    pub title: String,

    /// Source identifier
    pub source: String,

    /// Page text, then table markup on following lines
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_item_json_keys() {
        let item = OutputItem {
            page: 2,
            content_type: ContentType::Excel,
            title: "report".into(),
            source: "report.pdf".into(),
            content: "x".into(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "excel");
        assert_eq!(json["page"], 2);
    }
}
