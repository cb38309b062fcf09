// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{Tool, ToolCall, ToolOutput};

pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Writes a file to the local filesystem. Overwrites the existing file if one \
         exists at the provided path. ALWAYS prefer editing existing files with edit_file. \
         Creates parent directories automatically. \
         Set mode=append to add to the end of an existing file instead of overwriting."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute or relative path to the file"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write to the file"
                },
                "mode": {
                    "type": "string",
                    "enum": ["overwrite", "append"],
                    "description": "overwrite (default) replaces the file, append adds to its end"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let path = match call.args.get("path").and_then(|v| v.as_str()) {
            Some(p) => p.to_string(),
            None => {
                return ToolOutput::err(&call.id, ToolError::MissingArgument("path").to_string())
            }
        };
        let content = match call.args.get("content").and_then(|v| v.as_str()) {
            Some(c) => c.to_string(),
            None => {
                return ToolOutput::err(&call.id, ToolError::MissingArgument("content").to_string())
            }
        };
        let should_append = match call.args.get("mode").and_then(|v| v.as_str()) {
            None | Some("overwrite") => false,
            Some("append") => true,
            Some(other) => {
                return ToolOutput::err(
                    &call.id,
                    format!("invalid mode '{other}': expected 'overwrite' or 'append'"),
                )
            }
        };

        debug!(path = %path, append = should_append, bytes = content.len(), "write_file tool");

        if let Some(parent) = std::path::Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    return ToolOutput::err(&call.id, format!("mkdir error: {e}"));
                }
            }
        }

        if should_append {
            use tokio::io::AsyncWriteExt;
            match tokio::fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(&path)
                .await
            {
                Ok(mut f) => {
                    let result = f.write_all(content.as_bytes()).await;
                    // tokio closes files lazily on drop; flush + shutdown so
                    // every byte reaches the OS before we report success.
                    let _ = f.flush().await;
                    let _ = f.shutdown().await;
                    match result {
                        Ok(()) => ToolOutput::ok(
                            &call.id,
                            format!("appended {} bytes to {path}", content.len()),
                        ),
                        Err(e) => ToolOutput::err(&call.id, format!("write error: {e}")),
                    }
                }
                Err(e) => ToolOutput::err(&call.id, format!("open error: {e}")),
            }
        } else {
            match tokio::fs::write(&path, content.as_bytes()).await {
                Ok(()) => ToolOutput::ok(
                    &call.id,
                    format!("wrote {} bytes to {path}", content.len()),
                ),
                Err(e) => ToolOutput::err(&call.id, format!("write error: {e}")),
            }
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
            name: "write_file".into(),
            args,
        }
    }

    #[tokio::test]
    async fn writes_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let out = WriteFileTool
            .execute(&call(json!({
                "path": path.to_str().unwrap(),
                "content": "hello"
            })))
            .await;
        assert!(!out.is_error, "{}", out.content);
        assert!(out.content.contains("wrote 5 bytes"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "old content").unwrap();
        WriteFileTool
            .execute(&call(json!({
                "path": path.to_str().unwrap(),
                "content": "new"
            })))
            .await;
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[tokio::test]
    async fn append_adds_to_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(&path, "one\n").unwrap();
        let out = WriteFileTool
            .execute(&call(json!({
                "path": path.to_str().unwrap(),
                "content": "two\n",
                "mode": "append"
            })))
            .await;
        assert!(!out.is_error);
        assert!(out.content.contains("appended"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.txt");
        let out = WriteFileTool
            .execute(&call(json!({
                "path": path.to_str().unwrap(),
                "content": "deep"
            })))
            .await;
        assert!(!out.is_error, "{}", out.content);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "deep");
    }

    #[tokio::test]
    async fn unknown_mode_is_rejected() {
        let out = WriteFileTool
            .execute(&call(json!({
                "path": "/tmp/x.txt",
                "content": "y",
                "mode": "patch"
            })))
            .await;
        assert!(out.is_error);
        assert!(out.content.contains("invalid mode 'patch'"));
    }

    #[tokio::test]
    async fn missing_content_argument_is_error() {
        let out = WriteFileTool
            .execute(&call(json!({ "path": "/tmp/x.txt" })))
            .await;
        assert!(out.is_error);
        assert!(out.content.contains("content"));
    }
}
