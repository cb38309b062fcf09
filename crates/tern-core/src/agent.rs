// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use tern_config::AgentConfig;
use tern_model::{
    CompletionRequest, FunctionCall, Message, MessageContent, ModelProvider, Role,
    ToolCallRequest,
};
use tern_tools::{ToolCall, ToolEvent, ToolOutput, ToolRegistry};

use crate::{events::AgentEvent, prompts::system_prompt, session::Session};

/// How a single user turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The model finished without requesting more tools.
    /// `text` is every assistant text segment of the turn, newline-joined.
    Completed { text: String },
    /// The configured tool-round budget ran out before the model finished.
    IterationLimit { text: String, rounds: u32 },
    /// The caller cancelled the turn between iterations.
    Aborted { partial_text: String },
}

/// The core agent.  Owns a session and drives the model ↔ tool loop.
pub struct Agent {
    session: Session,
    tools: Arc<ToolRegistry>,
    model: Arc<dyn ModelProvider>,
    config: Arc<AgentConfig>,
    /// Receives `ToolEvent`s emitted by stateful tools (todo updates).
    /// The paired sender is held by `TodoWriteTool` inside the registry.
    tool_event_rx: mpsc::Receiver<ToolEvent>,
}

impl Agent {
    /// Construct an agent.
    ///
    /// `tool_event_rx` must be the receiving end of the channel whose sender
    /// was given to `TodoWriteTool`, so that tool events are drained by the
    /// agent loop.
    pub fn new(
        model: Arc<dyn ModelProvider>,
        tools: Arc<ToolRegistry>,
        config: Arc<AgentConfig>,
        tool_event_rx: mpsc::Receiver<ToolEvent>,
    ) -> Self {
        Self {
            session: Session::new(),
            tools,
            model,
            config,
            tool_event_rx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Push a user message, run the agent loop, and stream events through
    /// the sender.  The only fatal error is a failed model completion;
    /// everything a tool does wrong flows back to the model as an
    /// error-flagged result.
    pub async fn submit(
        &mut self,
        user_input: &str,
        tx: mpsc::Sender<AgentEvent>,
    ) -> anyhow::Result<RunOutcome> {
        // Sender stays alive for the whole call, so the loop never sees a
        // closed cancel channel.
        let (_cancel_tx, cancel_rx) = oneshot::channel::<()>();
        self.submit_with_cancel(user_input, tx, cancel_rx).await
    }

    /// Like [`Agent::submit`] but accepts a cancellation channel.
    ///
    /// Sending `()` (or dropping the sender) stops the loop.  An in-flight
    /// completion or tool dispatch is dropped where it stands; a cancelled
    /// tool batch records error results for its unfinished calls, so the
    /// session history is never left with a tool call that has no result.
    pub async fn submit_with_cancel(
        &mut self,
        user_input: &str,
        tx: mpsc::Sender<AgentEvent>,
        mut cancel: oneshot::Receiver<()>,
    ) -> anyhow::Result<RunOutcome> {
        if self.session.messages.is_empty() {
            self.session.push(self.system_message());
        }
        self.session.push(Message::user(user_input));

        let mut rounds = 0u32;
        let mut transcript: Vec<String> = Vec::new();

        loop {
            // Both an explicit send(()) and a dropped sender count as
            // cancellation.  try_recv returns Err(Closed) for the latter,
            // so only Err(Empty) means "keep going".
            match cancel.try_recv() {
                Err(oneshot::error::TryRecvError::Empty) => {}
                _ => return Ok(abort(&tx, transcript).await),
            }

            let response = tokio::select! {
                biased;
                _ = &mut cancel => None,
                result = self.complete_one_turn() => Some(result),
            };
            let response = match response {
                None => return Ok(abort(&tx, transcript).await),
                Some(r) => r?,
            };

            if let Some(text) = &response.text {
                self.session.push(Message::assistant(text));
                transcript.push(text.clone());
                let _ = tx.send(AgentEvent::TextComplete(text.clone())).await;
            }

            let tool_calls = prepare_tool_calls(&response.tool_calls);
            if tool_calls.is_empty() {
                let _ = tx.send(AgentEvent::TurnComplete).await;
                return Ok(RunOutcome::Completed {
                    text: transcript.join("\n"),
                });
            }

            if self.config.max_tool_rounds > 0 && rounds >= self.config.max_tool_rounds {
                // Stop before pushing the tool-call messages, so the history
                // is not left waiting for results that never come.
                let _ = tx.send(AgentEvent::IterationLimit { rounds }).await;
                return Ok(RunOutcome::IterationLimit {
                    text: transcript.join("\n"),
                    rounds,
                });
            }
            rounds += 1;
            debug!(round = rounds, calls = tool_calls.len(), "dispatching tool calls");

            // Phase 1: record every requested call before any result, as the
            // wire format expects all of a turn's tool calls in one block.
            for tc in &tool_calls {
                let _ = tx.send(AgentEvent::ToolCallStarted(tc.clone())).await;
                self.session.push(Message {
                    role: Role::Assistant,
                    content: MessageContent::ToolCall {
                        tool_call_id: tc.id.clone(),
                        function: FunctionCall {
                            name: tc.name.clone(),
                            arguments: tc.args.to_string(),
                        },
                    },
                });
            }

            // Phase 2: execute sequentially, in request order.  Later calls
            // routinely depend on the side effects of earlier ones.  Each
            // dispatch is raced against the cancel channel; dropping an
            // in-flight execute future kills any subprocess behind it
            // (kill_on_drop).  Cancelled and skipped calls still get an
            // error result so every recorded call stays paired.
            let mut outputs = Vec::with_capacity(tool_calls.len());
            let mut cancelled = false;
            for tc in &tool_calls {
                let output = if cancelled {
                    ToolOutput::err(&tc.id, "cancelled before execution")
                } else {
                    tokio::select! {
                        biased;
                        _ = &mut cancel => {
                            cancelled = true;
                            ToolOutput::err(&tc.id, "cancelled during execution")
                        }
                        out = self.tools.execute(tc) => out,
                    }
                };
                self.drain_tool_events(&tx).await;
                let _ = tx
                    .send(AgentEvent::ToolCallFinished {
                        call_id: tc.id.clone(),
                        tool_name: tc.name.clone(),
                        output: output.content.clone(),
                        is_error: output.is_error,
                    })
                    .await;
                outputs.push(output);
            }

            // Phase 3: push tool results, matching the request order.
            for (tc, output) in tool_calls.iter().zip(outputs.iter()) {
                let content = if output.is_error {
                    format!("ERROR: {}", output.content)
                } else {
                    output.content.clone()
                };
                self.session.push(Message::tool_result(&tc.id, &content));
            }

            if cancelled {
                return Ok(abort(&tx, transcript).await);
            }
        }
    }

    async fn complete_one_turn(&self) -> anyhow::Result<tern_model::ModelResponse> {
        let tools: Vec<tern_model::ToolSchema> = self
            .tools
            .schemas()
            .into_iter()
            .map(|s| tern_model::ToolSchema {
                name: s.name,
                description: s.description,
                parameters: s.parameters,
            })
            .collect();
        let req = CompletionRequest {
            messages: self.session.messages.clone(),
            tools,
        };
        self.model
            .complete(req)
            .await
            .context("model completion failed")
    }

    /// Drain pending tool events and translate to AgentEvents.
    async fn drain_tool_events(&mut self, tx: &mpsc::Sender<AgentEvent>) {
        while let Ok(te) = self.tool_event_rx.try_recv() {
            match te {
                ToolEvent::TodoUpdate(todos) => {
                    let _ = tx.send(AgentEvent::TodoUpdate(todos)).await;
                }
            }
        }
    }

    fn system_message(&self) -> Message {
        let workdir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Message::system(&system_prompt(
            &workdir,
            self.config.system_prompt.as_deref(),
        ))
    }
}

async fn abort(tx: &mpsc::Sender<AgentEvent>, transcript: Vec<String>) -> RunOutcome {
    let partial_text = transcript.join("\n");
    let _ = tx
        .send(AgentEvent::Aborted {
            partial_text: partial_text.clone(),
        })
        .await;
    RunOutcome::Aborted { partial_text }
}

/// Turn raw model tool-call requests into dispatchable [`ToolCall`]s.
///
/// Models occasionally emit malformed metadata; the lenient path keeps the
/// turn alive:
/// - empty or invalid JSON arguments become `{}` (the registry then reports
///   missing required parameters as a normal tool error)
/// - an empty call id gets a synthetic fallback so results can still be
///   paired with their calls
/// - a call with no name cannot be dispatched at all and is dropped
fn prepare_tool_calls(requests: &[ToolCallRequest]) -> Vec<ToolCall> {
    let mut calls = Vec::with_capacity(requests.len());
    for (i, req) in requests.iter().enumerate() {
        if req.name.is_empty() {
            warn!(tool_call_id = %req.id, "dropping tool call with empty name from model");
            continue;
        }
        let args = if req.arguments.trim().is_empty() {
            serde_json::json!({})
        } else {
            match serde_json::from_str(&req.arguments) {
                Ok(v) => v,
                Err(e) => {
                    warn!(
                        tool_name = %req.name,
                        error = %e,
                        "tool call arguments are not valid JSON; substituting {{}}"
                    );
                    serde_json::json!({})
                }
            }
        };
        let id = if req.id.is_empty() {
            warn!(tool_name = %req.name, "tool call from model had empty id; generating one");
            format!("tc_synthetic_{i}")
        } else {
            req.id.clone()
        };
        calls.push(ToolCall {
            id,
            name: req.name.clone(),
            args,
        });
    }
    calls
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn req(id: &str, name: &str, args: &str) -> ToolCallRequest {
        ToolCallRequest {
            id: id.into(),
            name: name.into(),
            arguments: args.into(),
        }
    }

    #[test]
    fn valid_arguments_parse() {
        let calls = prepare_tool_calls(&[req("c1", "shell_exec", r#"{"command":"ls"}"#)]);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args["command"], "ls");
    }

    #[test]
    fn empty_arguments_become_empty_object() {
        let calls = prepare_tool_calls(&[req("c1", "todo_read", "")]);
        assert_eq!(calls[0].args, serde_json::json!({}));
    }

    #[test]
    fn invalid_json_becomes_empty_object() {
        let calls = prepare_tool_calls(&[req("c1", "shell_exec", "{not json")]);
        assert_eq!(calls[0].args, serde_json::json!({}));
    }

    #[test]
    fn empty_id_gets_synthetic_fallback() {
        let calls = prepare_tool_calls(&[req("", "shell_exec", "{}"), req("", "shell_exec", "{}")]);
        assert_eq!(calls[0].id, "tc_synthetic_0");
        assert_eq!(calls[1].id, "tc_synthetic_1");
    }

    #[test]
    fn empty_name_is_dropped() {
        let calls = prepare_tool_calls(&[req("c1", "", "{}"), req("c2", "shell_exec", "{}")]);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "c2");
    }
}
