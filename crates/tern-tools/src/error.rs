// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use thiserror::Error;

/// Structured failures raised inside tool implementations.
///
/// These never cross the agent loop boundary.  Tools render them into an
/// error-flagged [`crate::ToolOutput`] so the model sees the message and the
/// loop keeps running.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("missing required parameter '{0}'")]
    MissingArgument(&'static str),

    #[error("command blocked by policy: matches deny pattern '{0}'")]
    Denied(String),

    #[error("timeout after {0}s")]
    Timeout(u64),

    #[error("file is not valid UTF-8 or UTF-16 text: {0}")]
    Decode(String),

    #[error("todo list rejected: {0}")]
    TodoInvariant(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
