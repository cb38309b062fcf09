// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::ToolError;

/// Ceiling on the number of items in a single task list.
pub const MAX_TODOS: usize = 20;

/// Session-scoped task list shared between the todo tools and the agent loop.
pub type TodoStore = Arc<Mutex<Vec<TodoItem>>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Imperative description ("Fix the parser").
    pub content: String,
    pub status: TodoStatus,
    /// Present-continuous form shown while the item is active ("Fixing the parser").
    #[serde(rename = "activeForm")]
    pub active_form: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

/// Check a candidate task list against the invariants.
///
/// Called before the shared store is touched; a rejected list leaves the
/// previous list fully intact.
pub fn validate_todos(items: &[TodoItem]) -> Result<(), ToolError> {
    if items.len() > MAX_TODOS {
        return Err(ToolError::TodoInvariant(format!(
            "{} items exceeds the maximum of {MAX_TODOS}",
            items.len()
        )));
    }
    for (i, item) in items.iter().enumerate() {
        if item.content.trim().is_empty() {
            return Err(ToolError::TodoInvariant(format!(
                "item {} has empty 'content'",
                i + 1
            )));
        }
        if item.active_form.trim().is_empty() {
            return Err(ToolError::TodoInvariant(format!(
                "item {} has empty 'activeForm'",
                i + 1
            )));
        }
    }
    let in_progress = items
        .iter()
        .filter(|t| t.status == TodoStatus::InProgress)
        .count();
    if in_progress > 1 {
        return Err(ToolError::TodoInvariant(format!(
            "{in_progress} items are in_progress, at most one is allowed"
        )));
    }
    Ok(())
}

/// Render the task list as the progress view shown to both the model and
/// the user.  Completed items show their active form past the checkbox so
/// the view reads as a narrative of what happened.
pub fn render_todos(items: &[TodoItem]) -> String {
    if items.is_empty() {
        return "(no tasks)".to_string();
    }
    let mut lines: Vec<String> = items
        .iter()
        .map(|t| match t.status {
            TodoStatus::Pending => format!("[ ] {}", t.content),
            TodoStatus::InProgress => format!("[>] {} <- {}", t.content, t.active_form),
            TodoStatus::Completed => format!("[x] {}", t.active_form),
        })
        .collect();
    let done = items
        .iter()
        .filter(|t| t.status == TodoStatus::Completed)
        .count();
    lines.push(format!("({done}/{} completed)", items.len()));
    lines.join("\n")
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
