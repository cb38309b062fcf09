// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use chrono::Local;
use serde_json::{json, Value};

use crate::tool::{Tool, ToolCall, ToolOutput};

/// Reports the wall-clock time.  Models have no clock of their own, so
/// anything date-sensitive (logs, changelogs, "today") needs this.
pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Get the current local date and time in ISO-8601 format. Takes no parameters."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        ToolOutput::ok(&call.id, Local::now().format("%Y-%m-%dT%H:%M:%S%:z").to_string())
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn returns_iso8601_timestamp() {
        let out = CurrentTimeTool
            .execute(&ToolCall {
                id: "1".into(),
                name: "current_time".into(),
                args: json!({}),
            })
            .await;
        assert!(!out.is_error);
        // e.g. 2026-02-14T09:30:12+01:00
        assert_eq!(&out.content[4..5], "-");
        assert_eq!(&out.content[10..11], "T");
    }
}
