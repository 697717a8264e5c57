use crate::states::AgentState;
use crate::events::Event;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::llm::AsyncLlmCaller;
use async_trait::async_trait;

/// Moves the finished request and its response into history so the next
/// planning call sees them.
pub struct ObservingState;

#[async_trait]
impl AgentState for ObservingState {
    fn name(&self) -> &'static str { "Observing" }

    async fn handle(
        &self,
        memory: &mut AgentMemory,
        _tools: &ToolRegistry,
        _llm:   &dyn AsyncLlmCaller,
    ) -> Event {
        match (memory.current_tool_call.take(), memory.last_observation.take()) {
            (Some(call), Some(observation)) => {
                let tool = call.name.clone();
                memory.commit(call, observation);
                let ok = memory.history.last().is_some_and(|e| e.success);
                memory.log("Observing", "HISTORY_COMMIT", &format!(
                    "tool='{}' ok={} history={}", tool, ok, memory.history.len()
                ));
            }
            _ => memory.log("Observing", "NOTHING_TO_COMMIT", ""),
        }
        Event::CONTINUE
    }
}
