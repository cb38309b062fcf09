// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use std::collections::HashMap;
use std::sync::Arc;

use crate::{Tool, ToolCall, ToolOutput};

/// A tool schema as advertised to the model.  Mirrors tern_model::ToolSchema
/// but keeps the tools crate independent from the model crate.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Central registry holding all available tools.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Produce schemas for all registered tools, sorted by name so the
    /// advertised order is stable across runs.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .tools
            .values()
            .map(|t| ToolSchema {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Dispatch a single call.  Unknown tools and missing required arguments
    /// come back as error-flagged outputs, never as panics or hard failures.
    pub async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let tool = match self.tools.get(&call.name) {
            Some(t) => t,
            None => {
                return ToolOutput::err(&call.id, format!("unknown tool: {}", call.name));
            }
        };
        if let Some(missing) = first_missing_required(&tool.parameters_schema(), &call.args) {
            return ToolOutput::err(
                &call.id,
                format!(
                    "missing required parameter '{missing}' for tool '{}'",
                    call.name
                ),
            );
        }
        tool.execute(call).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Check `args` against the schema's `required` list.  Returns the first
/// required property that is absent, if any.
fn first_missing_required(schema: &serde_json::Value, args: &serde_json::Value) -> Option<String> {
    let required = schema.get("required")?.as_array()?;
    for name in required.iter().filter_map(|v| v.as_str()) {
        if args.get(name).is_none() {
            return Some(name.to_string());
        }
    }
    None
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
