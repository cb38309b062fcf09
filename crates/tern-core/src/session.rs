// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use tern_model::Message;
use uuid::Uuid;

/// In-memory conversation session.  History lives here for the lifetime of
/// the process; nothing is persisted.
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub messages: Vec<Message>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
        }
    }

    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
