use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

/// A node of the agent's state machine.
///
/// ```
/// use helpdesk_agent::State;
/// assert_eq!(State::new("Planning"), State::PLANNING);
/// assert!(State::ERROR.is_terminal());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State(Cow<'static, str>);

impl State {
    pub const IDLE:      State = State::named("Idle");
    pub const PLANNING:  State = State::named("Planning");
    pub const ACTING:    State = State::named("Acting");
    pub const OBSERVING: State = State::named("Observing");
    pub const DONE:      State = State::named("Done");
    pub const ERROR:     State = State::named("Error");

    const fn named(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The run ends once the engine enters `Done` or `Error`.
    pub fn is_terminal(&self) -> bool {
        *self == Self::DONE || *self == Self::ERROR
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tool invocation requested by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub args: HashMap<String, serde_json::Value>,
    pub id:   Option<String>,
}

/// A completed tool invocation stored in history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub step:        usize,
    pub tool:        ToolCall,
    pub observation: String,
    pub success:     bool,
}

/// What the LLM can return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LlmResponse {
    /// LLM wants to invoke a tool
    ToolCall {
        tool: ToolCall,
    },
    /// LLM asked for a tool but its arguments could not be parsed
    MalformedToolCall {
        name:   String,
        id:     Option<String>,
        reason: String,
    },
    /// LLM produced a final answer — task is complete
    FinalAnswer {
        content: String,
    },
}

/// A final answer the planner turned down. It is replayed to the model
/// together with the correction on the next planning call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedAnswer {
    /// Number of history entries committed before the answer was given
    pub after:      usize,
    pub content:    String,
    pub correction: String,
}

/// Configuration for the agent's planning behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Hard cap on number of planning/acting cycles
    pub max_steps: usize,

    /// Minimum answer length in characters. Zero accepts any answer.
    pub min_answer_length: usize,

    /// Model name passed to the LLM caller. Empty lets the caller decide.
    pub model: String,

    /// Print every transition and the trace table after each run
    pub verbose: bool,

    /// Feed unparseable tool calls back to the LLM instead of failing
    pub handle_parsing_errors: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps:             15,
            min_answer_length:     0,
            model:                 String::new(),
            verbose:               false,
            handle_parsing_errors: false,
        }
    }
}
