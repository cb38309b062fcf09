// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
mod current_time;
mod edit;
mod read_file;
mod shell;
mod todo_read;
mod todo_write;
mod write;

pub use current_time::CurrentTimeTool;
pub use edit::EditFileTool;
pub use read_file::ReadFileTool;
pub use shell::ShellTool;
pub use todo_read::TodoReadTool;
pub use todo_write::TodoWriteTool;
pub use write::WriteFileTool;

use tern_config::ToolsConfig;
use tokio::sync::mpsc;

use crate::{ToolEvent, ToolRegistry, TodoStore};

/// Build a registry holding the complete built-in tool set.
pub fn default_registry(
    cfg: &ToolsConfig,
    todos: TodoStore,
    event_tx: mpsc::Sender<ToolEvent>,
) -> ToolRegistry {
    let mut reg = ToolRegistry::new();
    reg.register(ShellTool::from_config(cfg));
    reg.register(ReadFileTool);
    reg.register(WriteFileTool);
    reg.register(EditFileTool);
    reg.register(TodoWriteTool::new(todos.clone(), event_tx));
    reg.register(TodoReadTool::new(todos));
    reg.register(CurrentTimeTool);
    reg
}
