use std::collections::HashMap;
use std::sync::Arc;
use crate::states::AgentState;
use crate::events::Event;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::llm::AsyncLlmCaller;
use crate::transitions::TransitionTable;
use crate::trace::Trace;
use crate::types::State;
use crate::error::AgentError;

pub struct AgentEngine {
    pub memory:          AgentMemory,
    pub tools:           Arc<ToolRegistry>,
    pub llm:             Arc<dyn AsyncLlmCaller>,
    state:               State,
    transitions:         TransitionTable,
    handlers:            HashMap<String, Box<dyn AgentState>>,
}

impl AgentEngine {
    /// Creates a new engine. Prefer using AgentBuilder for ergonomic construction.
    pub fn new(
        memory:      AgentMemory,
        tools:       Arc<ToolRegistry>,
        llm:         Arc<dyn AsyncLlmCaller>,
        transitions: TransitionTable,
        handlers:    HashMap<String, Box<dyn AgentState>>,
    ) -> Self {
        Self {
            memory,
            tools,
            llm,
            state: State::IDLE,
            transitions,
            handlers,
        }
    }

    /// Run the agent to completion.
    /// Returns Ok(final_answer) or Err(AgentError).
    pub async fn run(&mut self) -> Result<String, AgentError> {
        // Idle, three states per step, and the final MaxSteps planning pass.
        let safety_cap = self.memory.config.max_steps * 3 + 2;
        let mut iterations = 0;

        while !self.state.is_terminal() {
            iterations += 1;
            if iterations > safety_cap {
                return Err(AgentError::SafetyCapExceeded(iterations));
            }

            self.step().await?;
        }

        // Run the terminal handler once so the trace records the outcome.
        if let Some(handler) = self.handlers.get(self.state.as_str()) {
            handler.handle(&mut self.memory, &self.tools, self.llm.as_ref()).await;
        }

        if self.memory.config.verbose {
            println!("{}", self.memory.trace);
        }

        if self.state == State::DONE {
            Ok(self.memory.final_answer.clone()
                .unwrap_or_else(|| "[No answer produced]".to_string()))
        } else {
            Err(AgentError::AgentFailed(
                self.memory.error.clone()
                    .unwrap_or_else(|| "Unknown error".to_string())
            ))
        }
    }

    /// Executes a single state transition.
    pub async fn step(&mut self) -> Result<(), AgentError> {
        tracing::debug!(state = %self.state, "agent step");

        let state_name = self.state.as_str();
        let handler = self.handlers.get(state_name)
            .ok_or_else(|| AgentError::NoHandlerForState(state_name.to_string()))?;

        let event: Event = handler.handle(&mut self.memory, &self.tools, self.llm.as_ref()).await;

        let key = (self.state.clone(), event.clone());
        let next_state = self.transitions.get(&key)
            .cloned()
            .ok_or_else(|| AgentError::InvalidTransition {
                from:  self.state.clone(),
                event: event.clone(),
            })?;

        tracing::info!(from = %self.state, event = %event, to = %next_state, "transition");
        if self.memory.config.verbose {
            println!("  ══ {} --{}--> {} ══", self.state, event, next_state);
        }

        self.state = next_state;
        Ok(())
    }

    pub fn trace(&self) -> &Trace {
        &self.memory.trace
    }

    pub fn current_state(&self) -> &State {
        &self.state
    }
}
