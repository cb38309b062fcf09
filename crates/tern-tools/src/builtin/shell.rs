// Copyright (c) 2025-2026 Tern Contributors
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
#[cfg(unix)]
use libc;
use serde_json::{json, Value};
use std::process::Stdio;
use tern_config::ToolsConfig;
use tokio::process::Command;
use tracing::debug;

use crate::error::ToolError;
use crate::policy::CommandPolicy;
use crate::tool::{Tool, ToolCall, ToolOutput};

/// Built-in tool that runs a shell command.
pub struct ShellTool {
    timeout_secs: u64,
    output_limit_bytes: usize,
    policy: CommandPolicy,
}

impl ShellTool {
    pub fn from_config(cfg: &ToolsConfig) -> Self {
        Self {
            timeout_secs: cfg.timeout_secs,
            output_limit_bytes: cfg.output_limit_bytes,
            policy: CommandPolicy::new(&cfg.deny_patterns),
        }
    }
}

impl Default for ShellTool {
    fn default() -> Self {
        Self::from_config(&ToolsConfig::default())
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "shell_exec"
    }

    fn description(&self) -> &str {
        "Execute a shell command and return stdout + stderr.\n\
         'command' is required and can be any bash one-liner.\n\
         Output is capped; when larger, the tail is dropped with an omission marker.\n\
         Prefer non-interactive commands. Avoid commands that require a TTY.\n\
         Destructive commands (rm -rf /, sudo, shutdown, dd) are refused by policy."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The complete bash one-liner command to execute."
                },
                "workdir": {
                    "type": "string",
                    "description": "Working directory (optional, defaults to cwd)"
                },
                "timeout_secs": {
                    "type": "integer",
                    "description": "Execution timeout in seconds (optional)"
                }
            },
            "required": ["command"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let command = match call.args.get("command").and_then(|v| v.as_str()) {
            Some(c) => c.to_string(),
            None => {
                return ToolOutput::err(&call.id, ToolError::MissingArgument("command").to_string())
            }
        };
        if let Err(e) = self.policy.check(&command) {
            return ToolOutput::err(&call.id, e.to_string());
        }
        let workdir = call
            .args
            .get("workdir")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let timeout = call
            .args
            .get("timeout_secs")
            .and_then(|v| v.as_u64())
            .unwrap_or(self.timeout_secs);

        debug!(cmd = %command, timeout, "executing shell tool");

        let mut cmd = Command::new("bash");
        cmd.arg("-c").arg(&command);
        // stdin(null): the child must not read from the agent's terminal.
        // kill_on_drop: when the timeout fires and the future is dropped,
        // tokio SIGKILLs the child instead of leaving it running.
        cmd.stdin(Stdio::null());
        cmd.kill_on_drop(true);
        // setsid() detaches the child from the controlling terminal, so it
        // cannot open /dev/tty and write escape sequences past our capture.
        #[cfg(unix)]
        unsafe {
            cmd.pre_exec(|| {
                libc::setsid();
                Ok(())
            });
        }
        if let Some(wd) = &workdir {
            cmd.current_dir(wd);
        }

        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        let child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => return ToolOutput::err(&call.id, format!("spawn error: {e}")),
        };
        let child_pid = child.id();

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(timeout),
            child.wait_with_output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => {
                let mut content = String::new();
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);

                if !stdout.is_empty() {
                    content.push_str(&stdout);
                }
                if !stderr.is_empty() {
                    if !content.is_empty() {
                        content.push('\n');
                    }
                    content.push_str("[stderr]\n");
                    content.push_str(&stderr);
                }
                // One cap for the combined capture, so stdout plus stderr
                // together never exceed the configured bound.
                let mut content = truncate_output(&content, self.output_limit_bytes);

                let code = output.status.code().unwrap_or(-1);
                if content.is_empty() {
                    content = format!("[exit {code}]");
                }
                if code == 0 {
                    ToolOutput::ok(&call.id, content)
                } else {
                    ToolOutput::err(&call.id, format!("[exit {code}]\n{content}"))
                }
            }
            Ok(Err(e)) => ToolOutput::err(&call.id, format!("wait error: {e}")),
            Err(_) => {
                kill_process_group(child_pid);
                ToolOutput::err(&call.id, ToolError::Timeout(timeout).to_string())
            }
        }
    }
}

/// SIGKILL the child's whole process group.  The child leads its own
/// session (setsid), so the negative pid reaches grandchildren a plain
/// kill of the shell would leave running.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    if let Some(pid) = pid {
        unsafe {
            libc::kill(-(pid as i32), libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

/// Cap `s` at `limit` bytes, cutting on a char boundary and appending an
/// omission marker with the dropped byte count.
fn truncate_output(s: &str, limit: usize) -> String {
    if s.len() <= limit {
        return s.to_string();
    }
    let mut end = limit;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\n...[{} bytes omitted]", &s[..end], s.len() - end)
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn call(args: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "1".into(),
            name: "shell_exec".into(),
            args,
        }
    }

    #[tokio::test]
    async fn executes_echo_and_returns_stdout() {
        let t = ShellTool::default();
        let out = t.execute(&call(json!({"command": "echo hello"}))).await;
        assert!(!out.is_error, "{}", out.content);
        assert!(out.content.contains("hello"));
    }

    #[tokio::test]
    async fn stdout_and_stderr_both_captured() {
        let t = ShellTool::default();
        let out = t
            .execute(&call(json!({"command": "echo out && echo err >&2"})))
            .await;
        assert!(out.content.contains("out"));
        assert!(out.content.contains("[stderr]"));
        assert!(out.content.contains("err"));
    }

    #[tokio::test]
    async fn workdir_changes_cwd() {
        let t = ShellTool::default();
        let out = t
            .execute(&call(json!({"command": "pwd", "workdir": "/tmp"})))
            .await;
        assert!(!out.is_error);
        assert!(out.content.contains("/tmp"));
    }

    #[tokio::test]
    async fn nonzero_exit_is_error_with_code() {
        let t = ShellTool::default();
        let out = t.execute(&call(json!({"command": "exit 3"}))).await;
        assert!(out.is_error);
        assert!(out.content.contains("[exit 3]"));
    }

    #[tokio::test]
    async fn missing_command_argument_is_error() {
        let t = ShellTool::default();
        let out = t.execute(&call(json!({}))).await;
        assert!(out.is_error);
        assert!(out.content.contains("command"));
    }

    #[tokio::test]
    async fn denied_command_is_refused_without_running() {
        let t = ShellTool::default();
        let out = t
            .execute(&call(json!({"command": "sudo rm -rf /var"})))
            .await;
        assert!(out.is_error);
        assert!(out.content.contains("blocked by policy"));
    }

    #[tokio::test]
    async fn timeout_returns_error() {
        let cfg = ToolsConfig {
            timeout_secs: 1,
            ..ToolsConfig::default()
        };
        let t = ShellTool::from_config(&cfg);
        let out = t.execute(&call(json!({"command": "sleep 60"}))).await;
        assert!(out.is_error);
        assert!(out.content.contains("timeout after 1s"));
    }

    /// True while the process exists and is not a zombie awaiting reaping.
    #[cfg(target_os = "linux")]
    fn process_running(pid: i32) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            // Field 3 (after the parenthesized comm) is the state letter.
            Ok(stat) => stat
                .rsplit(')')
                .next()
                .map(|rest| !rest.trim_start().starts_with('Z'))
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn timeout_kills_the_child_process() {
        let cfg = ToolsConfig {
            timeout_secs: 1,
            ..ToolsConfig::default()
        };
        let t = ShellTool::from_config(&cfg);
        let dir = tempfile::tempdir().unwrap();
        let pidfile = dir.path().join("pid");
        let cmd = format!("echo $$ > {} && sleep 60", pidfile.display());

        let out = t.execute(&call(json!({"command": cmd}))).await;
        assert!(out.is_error);
        assert!(out.content.contains("timeout after 1s"));

        let pid: i32 = std::fs::read_to_string(&pidfile)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        let mut gone = false;
        for _ in 0..50 {
            if !process_running(pid) {
                gone = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        assert!(gone, "child {pid} still running after the timeout");
    }

    #[tokio::test]
    async fn output_cap_covers_stdout_and_stderr_together() {
        let cfg = ToolsConfig {
            output_limit_bytes: 100,
            ..ToolsConfig::default()
        };
        let t = ShellTool::from_config(&cfg);
        let out = t
            .execute(&call(json!({
                "command": "head -c 200 /dev/zero | tr '\\0' a; head -c 200 /dev/zero | tr '\\0' b >&2"
            })))
            .await;
        assert!(!out.is_error, "{}", out.content);
        assert_eq!(out.content.matches("bytes omitted").count(), 1);
        // 100 bytes of capture plus the one omission marker.
        assert!(out.content.len() < 150, "len = {}", out.content.len());
    }

    #[test]
    fn short_output_passes_through_unchanged() {
        assert_eq!(truncate_output("hello\n", 100), "hello\n");
    }

    #[test]
    fn oversized_output_is_capped_with_marker() {
        let s = "x".repeat(200);
        let out = truncate_output(&s, 50);
        assert!(out.contains("[150 bytes omitted]"));
        assert!(out.len() < s.len());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let s = "é".repeat(100); // 2 bytes per char
        let out = truncate_output(&s, 51);
        assert!(out.contains("omitted"));
    }

    #[test]
    fn schema_requires_only_command() {
        let t = ShellTool::default();
        let schema = t.parameters_schema();
        assert_eq!(schema["required"], json!(["command"]));
    }
}
