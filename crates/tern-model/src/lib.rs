// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
mod mock;
mod openai;
mod provider;
mod types;

pub use mock::{MockProvider, ScriptedMockProvider};
pub use openai::OpenAiCompatProvider;
pub use provider::ModelProvider;
pub use types::*;

use anyhow::bail;
use tern_config::ModelConfig;

/// Construct a boxed [`ModelProvider`] from configuration.
///
/// Provider selection:
/// - `"openai"`, `"deepseek"`, `"siliconflow"` → hosted OpenAI-compatible
///   endpoints with the matching base URL and key env var
/// - `"local"` → an OpenAI-compatible server on localhost (no key needed)
/// - `"mock"` → [`ScriptedMockProvider`] if `mock_responses` is configured,
///   otherwise [`MockProvider`] (echo-back)
pub fn from_config(cfg: &ModelConfig) -> anyhow::Result<Box<dyn ModelProvider>> {
    if cfg.provider == "mock" {
        if cfg.mock_responses.is_empty() {
            return Ok(Box::new(MockProvider));
        }
        let scripts = cfg
            .mock_responses
            .iter()
            .map(|t| ModelResponse::text_only(t.clone()))
            .collect();
        return Ok(Box::new(ScriptedMockProvider::new(scripts)));
    }

    let (driver, default_base, key_env) = match cfg.provider.as_str() {
        "openai" => ("openai", "https://api.openai.com/v1", Some("OPENAI_API_KEY")),
        "deepseek" => ("deepseek", "https://api.deepseek.com", Some("DEEPSEEK_API_KEY")),
        "siliconflow" => (
            "siliconflow",
            "https://api.siliconflow.cn/v1",
            Some("SILICONFLOW_API_KEY"),
        ),
        "local" => ("local", "http://127.0.0.1:1234/v1", None),
        other => bail!("unknown model provider: {other}"),
    };

    let base_url = cfg
        .base_url
        .clone()
        .unwrap_or_else(|| default_base.to_string());
    Ok(Box::new(OpenAiCompatProvider::new(
        driver,
        cfg.name.clone(),
        resolve_api_key(cfg, key_env),
        base_url,
        cfg.max_tokens,
        cfg.temperature,
    )))
}

/// API key resolution order: explicit config value, then the configured
/// env var, then the provider's canonical env var.
fn resolve_api_key(cfg: &ModelConfig, canonical_env: Option<&str>) -> Option<String> {
    if let Some(k) = &cfg.api_key {
        return Some(k.clone());
    }
    if let Some(env) = &cfg.api_key_env {
        if let Ok(v) = std::env::var(env) {
            return Some(v);
        }
    }
    canonical_env.and_then(|env| std::env::var(env).ok())
}
