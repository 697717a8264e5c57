use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::types::LlmResponse;
use async_trait::async_trait;

mod openai;
mod mock;

pub use openai::OpenAiCaller;
pub use mock::{MockCall, MockLlmCaller};

/// Asks a chat model for the next move of a planning step.
///
/// Implementations send `memory.build_messages()` together with one function
/// definition per entry of `tools.schemas()`, and map the reply onto
/// [`LlmResponse`]. A tool call whose arguments are not a JSON object is a
/// successful reply (`MalformedToolCall`); the planner decides whether that
/// ends the run. `Err` is reserved for the request itself failing: transport,
/// authentication, or a reply with neither content nor tool calls.
#[async_trait]
pub trait AsyncLlmCaller: Send + Sync {
    async fn call_async(
        &self,
        memory: &AgentMemory,
        tools:  &ToolRegistry,
        model:  &str,
    ) -> Result<LlmResponse, String>;
}
