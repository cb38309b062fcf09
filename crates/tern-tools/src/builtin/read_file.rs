// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{Tool, ToolCall, ToolOutput};

/// Hard byte ceiling on file content before line selection.
const READ_LIMIT: usize = 200_000;

pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Reads a text file from the local filesystem. It is okay to read a file that \
         does not exist; an error will be returned. Optionally specify a line offset \
         and limit for large files. Lines in the output are numbered starting at 1. \
         UTF-8 and UTF-16 files are decoded; other encodings are rejected."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute or relative path to the file"
                },
                "offset": {
                    "type": "integer",
                    "description": "1-indexed line number to start reading from (default 1)"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of lines to return (default 2000)"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let path = match call.args.get("path").and_then(|v| v.as_str()) {
            Some(p) => p.to_string(),
            None => {
                return ToolOutput::err(&call.id, ToolError::MissingArgument("path").to_string())
            }
        };
        let offset = call.args.get("offset").and_then(|v| v.as_u64()).unwrap_or(1) as usize;
        let limit = call.args.get("limit").and_then(|v| v.as_u64()).unwrap_or(2000) as usize;

        debug!(path = %path, offset, limit, "read_file tool");

        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) => return ToolOutput::err(&call.id, format!("read error: {e}")),
        };
        let text = match decode_text(&bytes) {
            Ok(t) => t,
            Err(e) => return ToolOutput::err(&call.id, e.to_string()),
        };
        if text.is_empty() {
            return ToolOutput::ok(&call.id, "File is empty.");
        }

        let capped = if text.len() > READ_LIMIT {
            let mut end = READ_LIMIT;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...[file truncated at {} bytes]", &text[..end], text.len())
        } else {
            text
        };

        let start = offset.saturating_sub(1);
        let lines: Vec<&str> = capped.lines().collect();
        let total = lines.len();

        let selected: Vec<String> = lines
            .into_iter()
            .enumerate()
            .skip(start)
            .take(limit)
            .map(|(i, line)| format!("L{}:{}", i + 1, line))
            .collect();

        let mut content = selected.join("\n");
        let shown = limit.min(total.saturating_sub(start));
        if start + shown < total {
            content.push_str(&format!(
                "\n...[{} more lines, use offset={} to continue]",
                total - start - shown,
                start + shown + 1
            ));
        }

        ToolOutput::ok(&call.id, content)
    }
}

/// Decode file bytes as text: strict UTF-8 first, then UTF-16 via BOM, then
/// a NUL-byte heuristic for BOM-less UTF-16.  Anything else is refused so
/// binary garbage never reaches the conversation.
pub(crate) fn decode_text(bytes: &[u8]) -> Result<String, ToolError> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Ok(s.trim_start_matches('\u{feff}').to_string());
    }
    if bytes.len() >= 2 {
        if bytes[0] == 0xFF && bytes[1] == 0xFE {
            return decode_utf16(&bytes[2..], true);
        }
        if bytes[0] == 0xFE && bytes[1] == 0xFF {
            return decode_utf16(&bytes[2..], false);
        }
    }
    // BOM-less UTF-16 from Windows tooling: ASCII-heavy text shows NULs on
    // every other byte.
    if bytes.len() >= 4 && bytes.len() % 2 == 0 {
        let odd_nuls = bytes.iter().skip(1).step_by(2).filter(|b| **b == 0).count();
        let even_nuls = bytes.iter().step_by(2).filter(|b| **b == 0).count();
        let half = bytes.len() / 2;
        if odd_nuls * 10 >= half * 8 {
            return decode_utf16(bytes, true);
        }
        if even_nuls * 10 >= half * 8 {
            return decode_utf16(bytes, false);
        }
    }
    Err(ToolError::Decode("unknown or binary encoding".into()))
}

fn decode_utf16(bytes: &[u8], little_endian: bool) -> Result<String, ToolError> {
    if bytes.len() % 2 != 0 {
        return Err(ToolError::Decode("odd byte count for UTF-16".into()));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| {
            if little_endian {
                u16::from_le_bytes([c[0], c[1]])
            } else {
                u16::from_be_bytes([c[0], c[1]])
            }
        })
        .collect();
    String::from_utf16(&units).map_err(|e| ToolError::Decode(e.to_string()))
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
