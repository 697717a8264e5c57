use std::borrow::Cow;
use serde::{Deserialize, Serialize};

/// Outcome reported by a state handler; the transition table maps
/// `(State, Event)` to the next state.
///
/// Built-in events are associated constants, so handlers and the table
/// share them without allocating:
///
/// ```
/// use helpdesk_agent::Event;
/// assert_eq!(Event::new("ToolSuccess"), Event::TOOL_SUCCESS);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event(Cow<'static, str>);

impl Event {
    pub const START:            Event = Event::named("Start");

    // Planning: what the model asked for
    pub const LLM_TOOL_CALL:    Event = Event::named("LlmToolCall");
    pub const LLM_FINAL_ANSWER: Event = Event::named("LlmFinalAnswer");
    pub const PARSE_ERROR:      Event = Event::named("ParseError");
    pub const ANSWER_TOO_SHORT: Event = Event::named("AnswerTooShort");
    pub const TOOL_BLACKLISTED: Event = Event::named("ToolBlacklisted");
    pub const MAX_STEPS:        Event = Event::named("MaxSteps");
    pub const FATAL_ERROR:      Event = Event::named("FatalError");

    // Acting: how the HTTP request went
    pub const TOOL_SUCCESS:     Event = Event::named("ToolSuccess");
    pub const TOOL_FAILURE:     Event = Event::named("ToolFailure");

    pub const CONTINUE:         Event = Event::named("Continue");

    const fn named(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
