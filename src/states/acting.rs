use crate::states::AgentState;
use crate::events::Event;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::llm::AsyncLlmCaller;
use crate::types::ToolCall;
use async_trait::async_trait;

pub struct ActingState;

/// `requests_get` + `{"path": "/api/tickets/7"}` reads as `GET /api/tickets/7`.
fn describe(call: &ToolCall) -> String {
    let verb = call.name.strip_prefix("requests_")
        .map(str::to_ascii_uppercase)
        .unwrap_or_else(|| call.name.clone());
    match call.args.get("path").and_then(|p| p.as_str()) {
        Some(path) => format!("{} {}", verb, path),
        None       => verb,
    }
}

#[async_trait]
impl AgentState for ActingState {
    fn name(&self) -> &'static str { "Acting" }

    async fn handle(
        &self,
        memory: &mut AgentMemory,
        tools:  &ToolRegistry,
        _llm:   &dyn AsyncLlmCaller,
    ) -> Event {
        let Some(call) = memory.current_tool_call.clone() else {
            memory.error = Some("Acting entered without a pending tool call".to_string());
            memory.log("Acting", "FATAL_ERROR", "no pending tool call");
            return Event::FATAL_ERROR;
        };

        let request = describe(&call);
        memory.log("Acting", "TOOL_EXECUTE", &request);

        // Unknown tools and HTTP failures both come back as Err and are
        // handed to the model as an observation.
        let outcome = tools.execute(&call.name, call.args).await;
        let (event, label, observation) = match outcome {
            Ok(body) => (Event::TOOL_SUCCESS, "TOOL_SUCCESS", format!("SUCCESS: {}", body)),
            Err(err) => (Event::TOOL_FAILURE, "TOOL_FAILURE", format!("ERROR: {}", err)),
        };

        let preview: String = observation.chars().take(100).collect();
        memory.log("Acting", label, &format!("{} -> {}", request, preview));
        memory.last_observation = Some(observation);
        event
    }
}
