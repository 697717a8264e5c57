use crate::states::AgentState;
use crate::events::Event;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::llm::AsyncLlmCaller;
use async_trait::async_trait;

pub struct IdleState;

#[async_trait]
impl AgentState for IdleState {
    fn name(&self) -> &'static str { "Idle" }

    async fn handle(
        &self,
        memory: &mut AgentMemory,
        tools:  &ToolRegistry,
        _llm:   &dyn AsyncLlmCaller,
    ) -> Event {
        let instruction: String = memory.task.chars().take(80).collect();
        tracing::info!(tools = ?tools.names(), max_steps = memory.config.max_steps, "agent run started");
        memory.log("Idle", "AGENT_STARTED", &format!(
            "instruction='{}' tools=[{}]", instruction, tools.names().join(",")
        ));
        Event::START
    }
}
