// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use tern_tools::{TodoItem, ToolCall};

/// Events emitted by the agent during a single turn.
/// Consumers (CLI one-shot mode, REPL) subscribe to these to drive output.
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// A complete text segment from the model.  Emitted as soon as the
    /// response arrives, before any tool calls from the same response run.
    TextComplete(String),
    /// The model has requested a tool call
    ToolCallStarted(ToolCall),
    /// A tool call finished
    ToolCallFinished {
        call_id: String,
        tool_name: String,
        output: String,
        is_error: bool,
    },
    /// The todo list was updated
    TodoUpdate(Vec<TodoItem>),
    /// The agent has finished processing the current user turn
    TurnComplete,
    /// The loop stopped because the configured tool-round budget ran out
    IterationLimit { rounds: u32 },
    /// The turn was cancelled; any text already produced is carried here
    Aborted { partial_text: String },
}
