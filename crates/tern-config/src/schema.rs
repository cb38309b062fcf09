// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider identifier: "openai" | "deepseek" | "siliconflow" | "local" | "mock".
    /// All of these except "mock" speak the OpenAI chat-completions wire format;
    /// they differ only in default base URL and API-key environment variable.
    pub provider: String,
    /// Model name forwarded to the provider API
    pub name: String,
    /// Environment variable that holds the API key (read at runtime).
    /// When absent, the provider's canonical variable is used
    /// (OPENAI_API_KEY, DEEPSEEK_API_KEY, SILICONFLOW_API_KEY).
    pub api_key_env: Option<String>,
    /// Explicit API key; prefer api_key_env so secrets stay out of
    /// version-controlled config files
    pub api_key: Option<String>,
    /// Base URL override.  Useful for proxies or a non-default local server.
    pub base_url: Option<String>,
    /// Maximum tokens to request in a single completion
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0–2.0)
    pub temperature: Option<f32>,
    /// Scripted replies for the mock provider (used when provider = "mock").
    /// Each entry is consumed by one completion call, in order.
    #[serde(default)]
    pub mock_responses: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            name: "gpt-4o".into(),
            api_key_env: None,
            api_key: None,
            base_url: None,
            max_tokens: Some(4000),
            temperature: Some(1.0),
            mock_responses: Vec::new(),
        }
    }
}

fn default_max_tool_rounds() -> u32 {
    0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum number of tool-call rounds before the loop stops with an
    /// iteration-limit outcome.  0 means unbounded: the run ends only when
    /// the model replies without tool calls.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
    /// System prompt override; leave None to use the built-in prompt
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: 0,
            system_prompt: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}
fn default_output_limit_bytes() -> usize {
    50_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Timeout in seconds for a single shell command (overridable per call)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Refuse shell commands matching these glob patterns
    #[serde(default = "default_deny_patterns")]
    pub deny_patterns: Vec<String>,
    /// Byte cap for tool output returned to the model
    #[serde(default = "default_output_limit_bytes")]
    pub output_limit_bytes: usize,
}

fn default_deny_patterns() -> Vec<String> {
    vec![
        "*rm -rf /*".into(),
        "*sudo *".into(),
        "sudo *".into(),
        "*shutdown*".into(),
        "*reboot*".into(),
        "*> /dev/*".into(),
        "*dd if=*".into(),
    ]
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            deny_patterns: default_deny_patterns(),
            output_limit_bytes: default_output_limit_bytes(),
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
