// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::builtin::read_file::decode_text;
use crate::error::ToolError;
use crate::tool::{Tool, ToolCall, ToolOutput};

/// Exact-match text replacement.  Replaces the first occurrence of
/// `old_text` with `new_text`; no match is an error so the model learns
/// its snippet was stale.
pub struct EditFileTool;

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &str {
        "edit_file"
    }

    fn description(&self) -> &str {
        "Edit a file by replacing the first occurrence of 'old_text' with 'new_text'. \
         'old_text' must match the file contents exactly, including whitespace and \
         indentation. Re-read the file first if unsure of its exact contents. \
         An empty 'new_text' deletes the matched text."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute or relative path to the file"
                },
                "old_text": {
                    "type": "string",
                    "description": "Exact text to find (first occurrence is replaced)"
                },
                "new_text": {
                    "type": "string",
                    "description": "Replacement text"
                }
            },
            "required": ["path", "old_text", "new_text"]
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let path = match call.args.get("path").and_then(|v| v.as_str()) {
            Some(p) => p.to_string(),
            None => {
                return ToolOutput::err(&call.id, ToolError::MissingArgument("path").to_string())
            }
        };
        let old_text = match call.args.get("old_text").and_then(|v| v.as_str()) {
            Some(s) => s.to_string(),
            None => {
                return ToolOutput::err(&call.id, ToolError::MissingArgument("old_text").to_string())
            }
        };
        let new_text = match call.args.get("new_text").and_then(|v| v.as_str()) {
            Some(s) => s.to_string(),
            None => {
                return ToolOutput::err(&call.id, ToolError::MissingArgument("new_text").to_string())
            }
        };
        if old_text.is_empty() {
            return ToolOutput::err(&call.id, "'old_text' must not be empty");
        }

        debug!(path = %path, "edit_file tool");

        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) => return ToolOutput::err(&call.id, format!("read error: {e}")),
        };
        let content = match decode_text(&bytes) {
            Ok(t) => t,
            Err(e) => return ToolOutput::err(&call.id, e.to_string()),
        };

        let Some(pos) = content.find(&old_text) else {
            return ToolOutput::err(
                &call.id,
                format!("'old_text' not found in {path}; re-read the file and try again"),
            );
        };
        let occurrences = content.matches(&old_text).count();

        let mut updated = String::with_capacity(content.len() + new_text.len());
        updated.push_str(&content[..pos]);
        updated.push_str(&new_text);
        updated.push_str(&content[pos + old_text.len()..]);

        match tokio::fs::write(&path, updated.as_bytes()).await {
            Ok(()) => {
                let mut msg = format!("replaced 1 occurrence in {path}");
                if occurrences > 1 {
                    msg.push_str(&format!(
                        " ({} more matches left untouched)",
                        occurrences - 1
                    ));
                }
                ToolOutput::ok(&call.id, msg)
            }
            Err(e) => ToolOutput::err(&call.id, format!("write error: {e}")),
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn call(args: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "1".into(),
            name: "edit_file".into(),
            args,
        }
    }

    #[tokio::test]
    async fn replaces_first_occurrence_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, "foo bar foo").unwrap();
        let out = EditFileTool
            .execute(&call(json!({
                "path": path.to_str().unwrap(),
                "old_text": "foo",
                "new_text": "qux"
            })))
            .await;
        assert!(!out.is_error, "{}", out.content);
        assert!(out.content.contains("1 more matches left untouched"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "qux bar foo");
    }

    #[tokio::test]
    async fn no_match_is_error_and_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, "original").unwrap();
        let out = EditFileTool
            .execute(&call(json!({
                "path": path.to_str().unwrap(),
                "old_text": "missing",
                "new_text": "x"
            })))
            .await;
        assert!(out.is_error);
        assert!(out.content.contains("not found"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
    }

    #[tokio::test]
    async fn empty_new_text_deletes_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, "keep DELETE keep").unwrap();
        let out = EditFileTool
            .execute(&call(json!({
                "path": path.to_str().unwrap(),
                "old_text": "DELETE ",
                "new_text": ""
            })))
            .await;
        assert!(!out.is_error);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep keep");
    }

    #[tokio::test]
    async fn empty_old_text_is_rejected() {
        let out = EditFileTool
            .execute(&call(json!({
                "path": "/tmp/whatever.txt",
                "old_text": "",
                "new_text": "x"
            })))
            .await;
        assert!(out.is_error);
        assert!(out.content.contains("old_text"));
    }

    #[tokio::test]
    async fn multiline_replacement_preserves_surroundings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.rs");
        std::fs::write(&path, "fn a() {}\nfn b() {}\nfn c() {}\n").unwrap();
        let out = EditFileTool
            .execute(&call(json!({
                "path": path.to_str().unwrap(),
                "old_text": "fn b() {}\n",
                "new_text": "fn b() { body(); }\n"
            })))
            .await;
        assert!(!out.is_error);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "fn a() {}\nfn b() { body(); }\nfn c() {}\n"
        );
    }
}
