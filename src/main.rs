// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
mod cli;

use std::io::{BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::Cli;
use tern_core::{Agent, AgentEvent, RunOutcome};
use tern_tools::{builtin::default_registry, render_todos, TodoStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = tern_config::load(cli.config.as_deref())?;
    if let Some(provider) = &cli.provider {
        config.model.provider = provider.clone();
    }
    if let Some(model) = &cli.model {
        config.model.name = model.clone();
    }
    if let Some(rounds) = cli.max_rounds {
        config.agent.max_tool_rounds = rounds;
    }
    if let Some(prompt) = &cli.system_prompt {
        config.agent.system_prompt = Some(prompt.clone());
    }

    let model: Arc<dyn tern_model::ModelProvider> =
        Arc::from(tern_model::from_config(&config.model)?);
    tracing::debug!(provider = model.name(), model = model.model_name(), "provider ready");

    let todos: TodoStore = Arc::new(tokio::sync::Mutex::new(Vec::new()));
    let (tool_tx, tool_rx) = mpsc::channel(64);
    let registry = Arc::new(default_registry(&config.tools, todos, tool_tx));
    let mut agent = Agent::new(model, registry, Arc::new(config.agent.clone()), tool_rx);

    match cli.prompt {
        Some(prompt) => run_once(&mut agent, &prompt).await,
        None => run_repl(&mut agent).await,
    }
}

/// Run a single turn and exit.  Assistant text goes to stdout; tool traffic
/// and task-list renders go to stderr so the output stays pipeable.
async fn run_once(agent: &mut Agent, prompt: &str) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel(64);
    let printer = spawn_printer(rx);

    let (cancel_tx, cancel_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(());
        }
    });

    let outcome = agent.submit_with_cancel(prompt, tx, cancel_rx).await?;
    let _ = printer.await;

    match outcome {
        RunOutcome::Completed { .. } => Ok(()),
        RunOutcome::IterationLimit { rounds, .. } => {
            anyhow::bail!("stopped after {rounds} tool rounds (see --max-rounds)")
        }
        RunOutcome::Aborted { .. } => anyhow::bail!("cancelled"),
    }
}

/// Interactive loop.  History persists across turns within the process.
async fn run_repl(agent: &mut Agent) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    loop {
        print!("user> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        let (tx, rx) = mpsc::channel(64);
        let printer = spawn_printer(rx);

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let ctrlc = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = cancel_tx.send(());
            }
        });

        match agent.submit_with_cancel(input, tx, cancel_rx).await {
            Ok(RunOutcome::IterationLimit { rounds, .. }) => {
                eprintln!("[stopped after {rounds} tool rounds]");
            }
            Ok(_) => {}
            Err(e) => eprintln!("error: {e:#}"),
        }
        ctrlc.abort();
        let _ = printer.await;
    }
    Ok(())
}

fn spawn_printer(mut rx: mpsc::Receiver<AgentEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                AgentEvent::TextComplete(text) => {
                    println!("{text}");
                }
                AgentEvent::ToolCallStarted(tc) => {
                    eprintln!("[{}] {}", tc.name, preview(&tc.args.to_string()));
                }
                AgentEvent::ToolCallFinished {
                    tool_name,
                    output,
                    is_error,
                    ..
                } => {
                    let marker = if is_error { "!" } else { "ok" };
                    eprintln!("[{tool_name} {marker}] {}", preview(&output));
                }
                AgentEvent::TodoUpdate(items) => {
                    eprintln!("{}", render_todos(&items));
                }
                AgentEvent::Aborted { .. } => {
                    eprintln!("[cancelled]");
                }
                AgentEvent::TurnComplete | AgentEvent::IterationLimit { .. } => {}
            }
        }
    })
}

/// First line of `s`, capped for terminal display.
fn preview(s: &str) -> String {
    const MAX: usize = 120;
    let line = s.lines().next().unwrap_or("");
    if line.len() <= MAX {
        line.to_string()
    } else {
        let mut end = MAX;
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &line[..end])
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
