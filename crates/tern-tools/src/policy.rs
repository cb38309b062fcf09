// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use regex::Regex;
use tracing::warn;

use crate::error::ToolError;

/// Deny-list gate applied to every shell command before execution.
///
/// Patterns are shell-style globs (`*` and `?`), matched against the whole
/// command string.  A matching command is refused and reported back to the
/// model as a tool error.
pub struct CommandPolicy {
    deny: Vec<(String, Regex)>,
}

impl CommandPolicy {
    pub fn new(patterns: &[String]) -> Self {
        let deny = patterns
            .iter()
            .filter_map(|p| match glob_to_regex(p) {
                Ok(re) => Some((p.clone(), re)),
                Err(e) => {
                    warn!(pattern = %p, error = %e, "skipping invalid deny pattern");
                    None
                }
            })
            .collect();
        Self { deny }
    }

    /// Return `Err(ToolError::Denied)` if `command` matches any deny pattern.
    pub fn check(&self, command: &str) -> Result<(), ToolError> {
        for (pattern, re) in &self.deny {
            if re.is_match(command) {
                return Err(ToolError::Denied(pattern.clone()));
            }
        }
        Ok(())
    }
}

/// Translate a glob pattern into an anchored regex.
fn glob_to_regex(glob: &str) -> Result<Regex, regex::Error> {
    let mut out = String::with_capacity(glob.len() + 8);
    out.push('^');
    for c in glob.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    Regex::new(&out)
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
