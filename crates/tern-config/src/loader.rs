use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::Config;

/// Environment variables applied on top of every file layer.
/// Each maps to a `[section] key` in the merged config.
const ENV_OVERRIDES: [(&str, &str, &str); 3] = [
    ("TERN_PROVIDER", "model", "provider"),
    ("TERN_BASE_URL", "model", "base_url"),
    ("TERN_API_KEY", "model", "api_key"),
];

/// Load configuration from discovered files, an optional explicit file,
/// and the environment, lowest to highest priority:
/// /etc, XDG/home, workspace-local, `--config`, `TERN_*` variables.
pub fn load(extra: Option<&Path>) -> anyhow::Result<Config> {
    let mut merged = toml::Table::new();

    for path in discovered_files() {
        if let Some(layer) = read_optional_layer(&path)? {
            debug!(path = %path.display(), "loading config layer");
            merge_tables(&mut merged, layer);
        }
    }

    if let Some(path) = extra {
        debug!(path = %path.display(), "loading explicit config");
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        merge_tables(&mut merged, parse_layer(&text, path)?);
    }

    apply_env_overrides(&mut merged);

    toml::Value::Table(merged)
        .try_into()
        .context("config values did not match the expected types")
}

/// Well-known config file locations, lowest priority first.
/// Missing files are skipped; unreadable or malformed ones are errors.
fn discovered_files() -> Vec<PathBuf> {
    let mut files = vec![PathBuf::from("/etc/tern/config.toml")];
    if let Some(home) = dirs::home_dir() {
        files.push(home.join(".config/tern/config.toml"));
    }
    if let Some(cfg) = dirs::config_dir() {
        files.push(cfg.join("tern/config.toml"));
    }
    files.push(PathBuf::from(".tern/config.toml"));
    files.push(PathBuf::from("tern.toml"));
    files
}

fn read_optional_layer(path: &Path) -> anyhow::Result<Option<toml::Table>> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_layer(&text, path).map(Some)
}

fn parse_layer(text: &str, path: &Path) -> anyhow::Result<toml::Table> {
    toml::from_str(text).with_context(|| format!("parsing {}", path.display()))
}

/// Deep-merge `src` into `dst`.  Tables merge key by key; anything else
/// from `src` replaces what `dst` had.
fn merge_tables(dst: &mut toml::Table, src: toml::Table) {
    for (key, incoming) in src {
        if let toml::Value::Table(sub) = incoming {
            if let Some(toml::Value::Table(existing)) = dst.get_mut(&key) {
                merge_tables(existing, sub);
                continue;
            }
            dst.insert(key, toml::Value::Table(sub));
        } else {
            dst.insert(key, incoming);
        }
    }
}

/// Fold `TERN_*` variables into the merged table.  Empty values are
/// ignored so an unset-but-exported variable does not wipe a configured one.
fn apply_env_overrides(merged: &mut toml::Table) {
    for (var, section, key) in ENV_OVERRIDES {
        let Ok(value) = std::env::var(var) else { continue };
        if value.is_empty() {
            continue;
        }
        debug!(var, section, key, "applying environment override");
        let entry = merged
            .entry(section.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        if let toml::Value::Table(t) = entry {
            t.insert(key.to_string(), toml::Value::String(value));
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
