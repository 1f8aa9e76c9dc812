//! Tool call results as the dispatcher produces them.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

/// A single block of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text { text } => text,
        }
    }
}

/// Outcome of a tool call that reached its handler.
///
/// `is_error` marks an execution failure reported as ordinary output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// Text of the first content block, or "" when there is none.
    pub fn first_text(&self) -> &str {
        self.content.first().map(ContentBlock::as_text).unwrap_or("")
    }
}

impl From<ToolResult> for CallToolResult {
    fn from(result: ToolResult) -> Self {
        let content = result
            .content
            .into_iter()
            .map(|block| match block {
                ContentBlock::Text { text } => Content::text(text),
            })
            .collect();

        if result.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_wire_shape() {
        let result = ToolResult::error("Error: boom");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "content": [{"type": "text", "text": "Error: boom"}],
                "isError": true
            })
        );
    }

    #[test]
    fn test_into_call_tool_result_keeps_flag() {
        let ok: CallToolResult = ToolResult::text("[]").into();
        assert_eq!(ok.is_error, Some(false));
        assert_eq!(ok.content.len(), 1);

        let failed: CallToolResult = ToolResult::error("Error: x").into();
        assert_eq!(failed.is_error, Some(true));
    }
}
