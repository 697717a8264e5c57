use crate::events::Event;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::llm::AsyncLlmCaller;
use async_trait::async_trait;

mod idle;
mod planning;
mod acting;
mod observing;
mod terminal;

pub use idle::IdleState;
pub use planning::PlanningState;
pub use acting::ActingState;
pub use observing::ObservingState;
pub use terminal::{DoneState, ErrorState};

/// Work done while the engine sits in one state.
///
/// A handler reads and updates `memory` and reports how it went as an
/// [`Event`]. It never panics and never returns an error: a failed request or
/// an unusable model reply is written to `memory` (as an observation or as
/// `memory.error`) and signalled through the event. Every call leaves at
/// least one trace entry via `memory.log()`.
#[async_trait]
pub trait AgentState: Send + Sync {
    /// Must match the key used in the engine's handler map.
    fn name(&self) -> &'static str;

    async fn handle(
        &self,
        memory: &mut AgentMemory,
        tools:  &ToolRegistry,
        llm:    &dyn AsyncLlmCaller,
    ) -> Event;
}
