// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use crate::todo::TodoItem;

/// Events emitted by tools to communicate state changes back to the agent loop.
/// The agent translates these into `AgentEvent` variants for the UI.
#[derive(Debug)]
pub enum ToolEvent {
    TodoUpdate(Vec<TodoItem>),
}
