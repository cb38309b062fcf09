// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::debug;

use crate::events::ToolEvent;
use crate::todo::{render_todos, validate_todos, TodoItem, TodoStore, MAX_TODOS};
use crate::tool::{Tool, ToolCall, ToolOutput};

pub struct TodoWriteTool {
    todos: TodoStore,
    event_tx: mpsc::Sender<ToolEvent>,
}

impl TodoWriteTool {
    pub fn new(todos: TodoStore, event_tx: mpsc::Sender<ToolEvent>) -> Self {
        Self { todos, event_tx }
    }
}

#[async_trait]
impl Tool for TodoWriteTool {
    fn name(&self) -> &str {
        "todo_write"
    }

    fn description(&self) -> &str {
        "Create and manage a structured task list for the current session.\n\n\
         ## Task Statuses\n\
         - pending: Not yet started\n\
         - in_progress: Currently being worked on (only ONE at a time)\n\
         - completed: Finished successfully\n\n\
         ## When to Use\n\
         Use proactively for complex multi-step tasks (3+ distinct steps), or when \
         the user provides multiple tasks to accomplish.\n\
         Skip for single straightforward tasks and purely conversational requests.\n\n\
         ## IMPORTANT\n\
         - Each item requires content (imperative, e.g. \"Fix the parser\") and \
           activeForm (present continuous, e.g. \"Fixing the parser\")\n\
         - Only one item in_progress at a time\n\
         - Mark items completed IMMEDIATELY after finishing them\n\
         - Calling todo_write replaces the entire list (not a merge)"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "tasks": {
                    "type": "array",
                    "description": "Full task list (replaces the existing list)",
                    "maxItems": MAX_TODOS,
                    "items": {
                        "type": "object",
                        "properties": {
                            "content": {
                                "type": "string",
                                "description": "Imperative description of the task"
                            },
                            "status": {
                                "type": "string",
                                "enum": ["pending", "in_progress", "completed"],
                                "description": "Current status of the task"
                            },
                            "activeForm": {
                                "type": "string",
                                "description": "Present-continuous form shown while active"
                            }
                        },
                        "required": ["content", "status", "activeForm"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["tasks"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let tasks_value = match call.args.get("tasks") {
            Some(v) => v.clone(),
            None => return ToolOutput::err(&call.id, "missing 'tasks' array"),
        };
        let items: Vec<TodoItem> = match serde_json::from_value(tasks_value) {
            Ok(items) => items,
            Err(e) => return ToolOutput::err(&call.id, format!("invalid 'tasks' array: {e}")),
        };

        // Reject before touching the store, so a bad list never clobbers
        // the previous one.
        if let Err(e) = validate_todos(&items) {
            return ToolOutput::err(&call.id, e.to_string());
        }

        debug!(count = items.len(), "todo_write tool");

        *self.todos.lock().await = items.clone();
        let _ = self.event_tx.send(ToolEvent::TodoUpdate(items.clone())).await;

        ToolOutput::ok(&call.id, render_todos(&items))
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tokio::sync::{mpsc, Mutex};

    use super::*;
    use crate::todo::TodoStatus;

    fn setup() -> (TodoWriteTool, TodoStore, mpsc::Receiver<ToolEvent>) {
        let store: TodoStore = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::channel(8);
        (TodoWriteTool::new(store.clone(), tx), store, rx)
    }

    fn call(args: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "1".into(),
            name: "todo_write".into(),
            args,
        }
    }

    #[tokio::test]
    async fn replaces_store_and_emits_event() {
        let (tool, store, mut rx) = setup();
        let out = tool
            .execute(&call(json!({ "tasks": [
                { "content": "do a", "status": "in_progress", "activeForm": "doing a" },
                { "content": "do b", "status": "pending", "activeForm": "doing b" }
            ]})))
            .await;
        assert!(!out.is_error, "{}", out.content);
        assert!(out.content.contains("[>] do a <- doing a"));
        assert!(out.content.contains("(0/2 completed)"));

        let stored = store.lock().await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].status, TodoStatus::InProgress);
        drop(stored);

        match rx.try_recv() {
            Ok(ToolEvent::TodoUpdate(items)) => assert_eq!(items.len(), 2),
            other => panic!("expected TodoUpdate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_list_leaves_previous_list_intact() {
        let (tool, store, _rx) = setup();
        tool.execute(&call(json!({ "tasks": [
            { "content": "keep me", "status": "pending", "activeForm": "keeping" }
        ]})))
        .await;
        let out = tool
            .execute(&call(json!({ "tasks": [
                { "content": "x", "status": "in_progress", "activeForm": "xing" },
                { "content": "y", "status": "in_progress", "activeForm": "ying" }
            ]})))
            .await;
        assert!(out.is_error);
        let stored = store.lock().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].content, "keep me");
    }

    #[tokio::test]
    async fn unknown_status_is_rejected() {
        let (tool, _store, _rx) = setup();
        let out = tool
            .execute(&call(json!({ "tasks": [
                { "content": "x", "status": "cancelled", "activeForm": "xing" }
            ]})))
            .await;
        assert!(out.is_error);
        assert!(out.content.contains("invalid 'tasks' array"));
    }

    #[tokio::test]
    async fn empty_list_clears_store() {
        let (tool, store, _rx) = setup();
        tool.execute(&call(json!({ "tasks": [
            { "content": "a", "status": "pending", "activeForm": "a-ing" }
        ]})))
        .await;
        let out = tool.execute(&call(json!({ "tasks": [] }))).await;
        assert!(!out.is_error);
        assert!(store.lock().await.is_empty());
    }
}
