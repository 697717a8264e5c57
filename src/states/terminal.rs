use crate::states::AgentState;
use crate::events::Event;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::llm::AsyncLlmCaller;
use async_trait::async_trait;

// The engine runs a terminal handler once after the loop ends, only to close
// the trace. The returned event is never looked up.

fn request_tally(memory: &AgentMemory) -> String {
    let failed = memory.history.iter().filter(|e| !e.success).count();
    format!("steps={} requests={} failed={}", memory.step, memory.history.len(), failed)
}

pub struct DoneState;

#[async_trait]
impl AgentState for DoneState {
    fn name(&self) -> &'static str { "Done" }

    async fn handle(
        &self,
        memory: &mut AgentMemory,
        _tools: &ToolRegistry,
        _llm:   &dyn AsyncLlmCaller,
    ) -> Event {
        let tally = request_tally(memory);
        let answer: String = memory.final_answer.as_deref()
            .unwrap_or_default()
            .chars().take(80).collect();
        memory.log("Done", "TASK_COMPLETE", &format!("{} answer='{}'", tally, answer));
        Event::START
    }
}

pub struct ErrorState;

#[async_trait]
impl AgentState for ErrorState {
    fn name(&self) -> &'static str { "Error" }

    async fn handle(
        &self,
        memory: &mut AgentMemory,
        _tools: &ToolRegistry,
        _llm:   &dyn AsyncLlmCaller,
    ) -> Event {
        let tally = request_tally(memory);
        let reason = memory.error.get_or_insert_with(|| "Unknown error".to_string()).clone();
        tracing::warn!(reason = %reason, "agent run failed");
        memory.log("Error", "AGENT_FAILED", &format!("{} reason='{}'", tally, reason));
        Event::START
    }
}
