// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::todo::TodoStore;
use crate::tool::{Tool, ToolCall, ToolOutput};

pub struct TodoReadTool {
    todos: TodoStore,
}

impl TodoReadTool {
    pub fn new(todos: TodoStore) -> Self {
        Self { todos }
    }
}

#[async_trait]
impl Tool for TodoReadTool {
    fn name(&self) -> &str {
        "todo_read"
    }

    fn description(&self) -> &str {
        "Read the current task list as structured JSON. Takes no parameters. \
         Use before updating the list if unsure of its current state."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let items = self.todos.lock().await.clone();
        match serde_json::to_string_pretty(&items) {
            Ok(s) => ToolOutput::ok(&call.id, s),
            Err(e) => ToolOutput::err(&call.id, format!("serialize error: {e}")),
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
