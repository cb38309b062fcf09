// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
//! Tool trait, registry and the built-in tool set.

pub mod builtin;
mod error;
mod events;
mod policy;
mod registry;
mod todo;
mod tool;

pub use error::ToolError;
pub use events::ToolEvent;
pub use policy::CommandPolicy;
pub use registry::{ToolRegistry, ToolSchema};
pub use todo::{render_todos, validate_todos, TodoItem, TodoStatus, TodoStore, MAX_TODOS};
pub use tool::{Tool, ToolCall, ToolOutput};
