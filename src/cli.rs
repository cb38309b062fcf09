// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tern",
    about = "A minimal agentic coding loop for the terminal",
    version,
    long_about = None,
)]
pub struct Cli {
    /// Task to run in one-shot mode.  Omit to start the interactive REPL.
    #[arg(value_name = "PROMPT")]
    pub prompt: Option<String>,

    /// Model to use, e.g. "gpt-4o" or "deepseek-chat"
    #[arg(long, short = 'M', env = "TERN_MODEL")]
    pub model: Option<String>,

    /// Provider to use: openai | deepseek | siliconflow | local | mock
    #[arg(long, short = 'p')]
    pub provider: Option<String>,

    /// Path to config file (overrides auto-discovery)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Maximum tool-call rounds per turn (0 = unbounded)
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<u32>,

    /// Override the system prompt with this text
    #[arg(long, value_name = "TEXT")]
    pub system_prompt: Option<String>,

    /// Increase log verbosity (-v: debug, -vv: trace); logs go to stderr
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_shot_prompt() {
        let cli = Cli::parse_from(["tern", "list the files here"]);
        assert_eq!(cli.prompt.as_deref(), Some("list the files here"));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::parse_from([
            "tern",
            "-M",
            "deepseek-chat",
            "-p",
            "deepseek",
            "--max-rounds",
            "5",
            "-vv",
        ]);
        assert_eq!(cli.model.as_deref(), Some("deepseek-chat"));
        assert_eq!(cli.provider.as_deref(), Some("deepseek"));
        assert_eq!(cli.max_rounds, Some(5));
        assert_eq!(cli.verbose, 2);
        assert!(cli.prompt.is_none());
    }
}
