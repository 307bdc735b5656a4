//! JSON rendering for conversion results.

use serde::Serialize;

use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize any output value (items, a title tree, stats) to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentType, OutputItem, TitleNode, TitleEntry, TitleTree};

    #[test]
    fn test_to_json_pretty() {
        let items = vec![OutputItem {
            page: 1,
            content_type: ContentType::Text,
            title: "年报".into(),
            source: "年报.pdf".into(),
            content: "正文".into(),
        }];

        let json = to_json(&items, JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"type\": \"text\""));
        assert!(json.contains("正文"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let tree = TitleTree::new(vec![TitleEntry::Section(TitleNode::new(1, "1释义"))]);
        let json = to_json(&tree, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert_eq!(
            json,
            r#"[{"id":1,"label":"1释义","subsections":[],"tables":[]}]"#
        );
    }
}
