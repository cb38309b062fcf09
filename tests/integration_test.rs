/// End-to-end tests of the assembled runtime using the mock providers and
/// the full built-in tool set.
use std::sync::Arc;

use tern_config::{AgentConfig, Config, ToolsConfig};
use tern_core::{Agent, AgentEvent, RunOutcome};
use tern_model::{MockProvider, ModelResponse, ScriptedMockProvider, ToolCallRequest};
use tern_tools::{builtin::default_registry, TodoStore};
use tokio::sync::mpsc;

fn assemble(provider: Arc<dyn tern_model::ModelProvider>) -> Agent {
    let todos: TodoStore = Arc::new(tokio::sync::Mutex::new(Vec::new()));
    let (tool_tx, tool_rx) = mpsc::channel(64);
    let registry = Arc::new(default_registry(&ToolsConfig::default(), todos, tool_tx));
    Agent::new(provider, registry, Arc::new(AgentConfig::default()), tool_rx)
}

fn tool_call(id: &str, name: &str, args: &str) -> ModelResponse {
    ModelResponse {
        text: None,
        tool_calls: vec![ToolCallRequest {
            id: id.into(),
            name: name.into(),
            arguments: args.into(),
        }],
    }
}

#[tokio::test]
async fn echo_provider_round_trip() {
    let mut agent = assemble(Arc::new(MockProvider));
    let (tx, mut rx) = mpsc::channel(64);

    let outcome = agent.submit("hello", tx).await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            text: "MOCK: hello".into()
        }
    );

    let mut got_text = false;
    while let Ok(event) = rx.try_recv() {
        if let AgentEvent::TextComplete(t) = event {
            assert!(t.contains("MOCK"));
            got_text = true;
        }
    }
    assert!(got_text, "expected a TextComplete event");
}

#[tokio::test]
async fn write_then_read_through_the_full_stack() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.txt");
    let path_str = path.to_str().unwrap();

    let provider = ScriptedMockProvider::new(vec![
        tool_call(
            "c1",
            "write_file",
            &format!(r#"{{"path":"{path_str}","content":"hello from the loop"}}"#),
        ),
        tool_call("c2", "read_file", &format!(r#"{{"path":"{path_str}"}}"#)),
        ModelResponse::text_only("file verified"),
    ]);
    let mut agent = assemble(Arc::new(provider));
    let (tx, mut rx) = mpsc::channel(64);

    let outcome = agent.submit("write a note", tx).await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            text: "file verified".into()
        }
    );
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "hello from the loop"
    );

    // read_file's numbered output flowed back as a tool result
    let mut read_ok = false;
    while let Ok(event) = rx.try_recv() {
        if let AgentEvent::ToolCallFinished {
            call_id,
            output,
            is_error,
            ..
        } = event
        {
            if call_id == "c2" {
                assert!(!is_error);
                assert!(output.contains("L1:hello from the loop"));
                read_ok = true;
            }
        }
    }
    assert!(read_ok, "expected the read_file result event");
}

#[tokio::test]
async fn todo_flow_renders_progress() {
    let provider = ScriptedMockProvider::new(vec![
        tool_call(
            "c1",
            "todo_write",
            r#"{"tasks":[
                {"content":"Survey the code","status":"completed","activeForm":"Surveying the code"},
                {"content":"Apply the fix","status":"in_progress","activeForm":"Applying the fix"},
                {"content":"Run the tests","status":"pending","activeForm":"Running the tests"}
            ]}"#,
        ),
        ModelResponse::text_only("tracking three tasks"),
    ]);
    let mut agent = assemble(Arc::new(provider));
    let (tx, mut rx) = mpsc::channel(64);

    agent.submit("plan the work", tx).await.unwrap();

    let mut rendered = None;
    let mut todo_event_items = None;
    while let Ok(event) = rx.try_recv() {
        match event {
            AgentEvent::ToolCallFinished { output, .. } => rendered = Some(output),
            AgentEvent::TodoUpdate(items) => todo_event_items = Some(items),
            _ => {}
        }
    }

    let view = rendered.expect("todo_write output");
    assert!(view.contains("[x] Surveying the code"));
    assert!(view.contains("[>] Apply the fix <- Applying the fix"));
    assert!(view.contains("[ ] Run the tests"));
    assert!(view.contains("(1/3 completed)"));
    assert_eq!(todo_event_items.expect("TodoUpdate event").len(), 3);
}

#[tokio::test]
async fn shell_errors_do_not_stop_the_run() {
    let provider = ScriptedMockProvider::new(vec![
        tool_call("c1", "shell_exec", r#"{"command":"exit 7"}"#),
        ModelResponse::text_only("noted the failure"),
    ]);
    let mut agent = assemble(Arc::new(provider));
    let (tx, mut rx) = mpsc::channel(64);

    let outcome = agent.submit("run it", tx).await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            text: "noted the failure".into()
        }
    );

    let mut saw_error_result = false;
    while let Ok(event) = rx.try_recv() {
        if let AgentEvent::ToolCallFinished {
            is_error: true,
            output,
            ..
        } = event
        {
            assert!(output.contains("[exit 7]"));
            saw_error_result = true;
        }
    }
    assert!(saw_error_result);
}

#[test]
fn config_defaults_are_valid() {
    let config = Config::default();
    assert_eq!(config.model.provider, "openai");
    assert_eq!(config.agent.max_tool_rounds, 0);
    assert_eq!(config.tools.timeout_secs, 60);
    assert!(!config.tools.deny_patterns.is_empty());
}
