//! Integration tests for the tool-calling state machine.
//!
//! All tests use `MockLlmCaller` — no network calls are made.

use helpdesk_agent::{
    tool_fn, AgentBuilder, AgentEngine, AgentError,
    Event, LlmResponse, State, ToolCall, ToolRegistry,
};
use helpdesk_agent::llm::MockLlmCaller;
use helpdesk_agent::memory::AgentMemory;
use helpdesk_agent::states::{AgentState, ActingState, IdleState, ObservingState, PlanningState};
use helpdesk_agent::transitions::build_transition_table;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Test helpers
// ─────────────────────────────────────────────────────────────────────────────

fn test_memory() -> AgentMemory {
    AgentMemory::new("test task")
}

fn tool_call(name: &str) -> LlmResponse {
    LlmResponse::ToolCall {
        tool: ToolCall {
            name: name.to_string(),
            args: HashMap::new(),
            id:   None,
        },
    }
}

fn final_answer(content: &str) -> LlmResponse {
    LlmResponse::FinalAnswer { content: content.to_string() }
}

/// Build a full engine from a MockLlmCaller. Registers a "dummy" tool.
fn engine_with(mock: Arc<MockLlmCaller>) -> AgentEngine {
    AgentBuilder::new("test task")
        .llm(mock)
        .tool(
            "dummy",
            "A dummy tool for testing",
            json!({ "type": "object", "properties": {} }),
            tool_fn(|_args| async move { Ok("dummy result".to_string()) }),
        )
        .build()
        .expect("builder should succeed")
}

// ─────────────────────────────────────────────────────────────────────────────
// State handlers
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn idle_emits_start_and_moves_to_planning() {
    let mut memory = test_memory();
    let tools = ToolRegistry::new();
    let llm = MockLlmCaller::new(vec![]);

    let event = IdleState.handle(&mut memory, &tools, &llm).await;
    assert_eq!(event, Event::START);

    let table = build_transition_table();
    assert_eq!(table.get(&(State::IDLE, Event::START)), Some(&State::PLANNING));
}

#[tokio::test]
async fn planning_stops_at_max_steps_without_calling_llm() {
    let mut memory = test_memory();
    memory.config.max_steps = 3;
    memory.step = 3;

    let tools = ToolRegistry::new();
    let llm = MockLlmCaller::new(vec![]);

    let event = PlanningState.handle(&mut memory, &tools, &llm).await;

    assert_eq!(event, Event::MAX_STEPS);
    assert_eq!(llm.call_count(), 0);
    assert!(memory.error.as_deref().is_some_and(|e| e.contains("Max steps")));

    let table = build_transition_table();
    assert_eq!(table.get(&(State::PLANNING, Event::MAX_STEPS)), Some(&State::ERROR));
}

#[tokio::test]
async fn acting_treats_unknown_tool_as_failure() {
    let mut memory = test_memory();
    memory.current_tool_call = Some(ToolCall {
        name: "nonexistent_tool".to_string(),
        args: HashMap::new(),
        id:   None,
    });

    let tools = ToolRegistry::new();
    let llm = MockLlmCaller::new(vec![]);

    let event = ActingState.handle(&mut memory, &tools, &llm).await;

    assert_eq!(event, Event::TOOL_FAILURE);
    assert!(memory.last_observation.as_deref().is_some_and(|o| o.starts_with("ERROR:")));
}

#[tokio::test]
async fn observing_commits_to_history() {
    let mut memory = test_memory();
    memory.step = 1;
    memory.current_tool_call = Some(ToolCall {
        name: "requests_get".to_string(),
        args: HashMap::from([("path".to_string(), json!("/api/tickets"))]),
        id:   Some("call_1".to_string()),
    });
    memory.last_observation = Some("SUCCESS: []".to_string());

    let tools = ToolRegistry::new();
    let llm = MockLlmCaller::new(vec![]);

    let event = ObservingState.handle(&mut memory, &tools, &llm).await;

    assert_eq!(event, Event::CONTINUE);
    assert_eq!(memory.history.len(), 1);
    assert_eq!(memory.history[0].tool.name, "requests_get");
    assert!(memory.history[0].success);
    assert!(memory.current_tool_call.is_none());
    assert!(memory.last_observation.is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Full runs
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn tool_call_then_final_answer_reaches_done() {
    let mock = Arc::new(MockLlmCaller::new(vec![
        tool_call("dummy"),
        final_answer("Based on the dummy tool result, the answer is 42."),
    ]));

    let mut engine = engine_with(Arc::clone(&mock));
    let answer = engine.run().await.expect("agent should complete");

    assert!(answer.contains("42"));
    assert_eq!(engine.current_state(), &State::DONE);
    assert_eq!(mock.call_count(), 2);

    // The second call saw the committed tool result.
    let second = mock.call(1).unwrap();
    assert_eq!(second.history_len, 1);
    assert_eq!(second.tool_names, vec!["dummy"]);
    assert_eq!(engine.memory.history[0].observation, "SUCCESS: dummy result");
}

#[tokio::test]
async fn trace_records_every_state() {
    let mock = Arc::new(MockLlmCaller::new(vec![
        tool_call("dummy"),
        final_answer("Trace test complete answer value here."),
    ]));

    let mut engine = engine_with(mock);
    engine.run().await.expect("agent should complete");

    let trace = engine.trace();
    for state in ["Idle", "Planning", "Acting", "Observing", "Done"] {
        assert!(!trace.for_state(state).is_empty(), "trace has no {} entries", state);
    }
    assert!(trace.contains_event("TASK_COMPLETE"));
}

#[tokio::test]
async fn blacklisted_tool_is_refused_and_run_continues() {
    let mock = Arc::new(MockLlmCaller::new(vec![
        tool_call("forbidden_tool"),
        final_answer("I used an allowed approach to answer."),
    ]));

    let mut engine = AgentBuilder::new("test blacklist")
        .llm(mock.clone())
        .tool(
            "forbidden_tool",
            "Registered but blacklisted",
            json!({ "type": "object", "properties": {} }),
            tool_fn(|_| async move { Ok("should never run".to_string()) }),
        )
        .blacklist_tool("forbidden_tool")
        .build()
        .unwrap();

    engine.run().await.expect("agent should complete");
    assert!(engine.trace().contains_event("TOOL_BLACKLISTED"));
    assert_eq!(mock.call(1).unwrap().last_observation.as_deref(),
               Some("ERROR: tool 'forbidden_tool' is not permitted"));
    assert!(!engine.trace().contains_event("TOOL_EXECUTE"));
    assert!(!engine.memory.history[0].success);
}

#[tokio::test]
async fn short_answer_is_accepted_by_default() {
    let mock = Arc::new(MockLlmCaller::new(vec![final_answer("Done")]));

    let mut engine = engine_with(Arc::clone(&mock));
    assert_eq!(engine.run().await.unwrap(), "Done");
    assert_eq!(mock.call_count(), 1);
    assert!(!engine.trace().contains_event("ANSWER_TOO_SHORT"));
}

#[tokio::test]
async fn short_answer_is_retried_with_a_correction() {
    let mock = Arc::new(MockLlmCaller::new(vec![
        final_answer("ok"),
        final_answer("Ticket 7 categorized as Mechanical."),
    ]));

    let mut engine = AgentBuilder::new("test task")
        .llm(mock.clone())
        .min_answer_length(5)
        .build()
        .unwrap();
    let answer = engine.run().await.unwrap();

    assert_eq!(answer, "Ticket 7 categorized as Mechanical.");
    assert_eq!(mock.call_count(), 2);
    assert!(engine.trace().contains_event("ANSWER_TOO_SHORT"));

    // The retry carries the rejected answer and the correction.
    let first = mock.call(0).unwrap();
    let second = mock.call(1).unwrap();
    assert_eq!(second.message_count, first.message_count + 2);

    let messages = engine.memory.build_messages();
    assert_eq!(messages[1]["content"], "ok");
    assert!(messages[2]["content"].as_str().unwrap().contains("at least 5 characters"));
}

#[tokio::test]
async fn malformed_tool_call_is_fatal_by_default() {
    let mock = Arc::new(MockLlmCaller::new(vec![
        LlmResponse::MalformedToolCall {
            name:   "dummy".to_string(),
            id:     None,
            reason: "expected value at line 1 column 1".to_string(),
        },
    ]));

    let mut engine = engine_with(mock);
    let err = engine.run().await.unwrap_err();

    assert!(matches!(err, AgentError::AgentFailed(ref m) if m.contains("Could not parse")));
    assert_eq!(engine.current_state(), &State::ERROR);
}

#[tokio::test]
async fn malformed_tool_call_is_fed_back_when_tolerated() {
    let mock = Arc::new(MockLlmCaller::new(vec![
        LlmResponse::MalformedToolCall {
            name:   "dummy".to_string(),
            id:     Some("call_x".to_string()),
            reason: "trailing comma".to_string(),
        },
        final_answer("Recovered after the parse error."),
    ]));

    let mut engine = AgentBuilder::new("tolerant")
        .llm(mock.clone())
        .handle_parsing_errors(true)
        .build()
        .unwrap();

    let answer = engine.run().await.unwrap();
    assert_eq!(answer, "Recovered after the parse error.");

    let entry = &engine.memory.history[0];
    assert!(entry.observation.starts_with("ERROR: trailing comma"));
    assert_eq!(mock.call(1).unwrap().history_len, 1);
}

#[tokio::test]
async fn llm_error_fails_the_run() {
    // No programmed responses: the first call errors.
    let mock = Arc::new(MockLlmCaller::new(vec![]));
    let mut engine = engine_with(mock);

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, AgentError::AgentFailed(ref m) if m.starts_with("LLM error")));
}

#[tokio::test]
async fn max_steps_bounds_a_looping_model() {
    let responses = (0..10).map(|_| tool_call("dummy")).collect();
    let mock = Arc::new(MockLlmCaller::new(responses));

    let mut engine = AgentBuilder::new("loop")
        .llm(mock.clone())
        .max_steps(3)
        .tool(
            "dummy",
            "A dummy tool",
            json!({ "type": "object", "properties": {} }),
            tool_fn(|_| async move { Ok("again".to_string()) }),
        )
        .build()
        .unwrap();

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, AgentError::AgentFailed(ref m) if m.contains("Max steps 3")));
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn builder_requires_llm() {
    let result = AgentBuilder::new("no llm").build();
    match result.err() {
        Some(AgentError::BuildError(msg)) => assert!(msg.contains("LLM")),
        other => panic!("expected BuildError, got {:?}", other.map(|e| e.to_string())),
    }
}

#[tokio::test]
async fn registry_reports_unknown_tool() {
    let registry = ToolRegistry::new();
    let err = registry.execute("nonexistent_tool", HashMap::new()).await.unwrap_err();
    assert!(err.contains("not found"));
}
