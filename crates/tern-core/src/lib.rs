// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
//! The agent runtime: session state and the model ↔ tool loop.

mod agent;
mod events;
mod prompts;
mod session;

pub use agent::{Agent, RunOutcome};
pub use events::AgentEvent;
pub use prompts::system_prompt;
pub use session::Session;
