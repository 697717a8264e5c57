use std::collections::HashMap;
use crate::types::State;
use crate::events::Event;

pub type TransitionTable = HashMap<(State, Event), State>;

/// `(from, event, to)` rows of the request loop. A pair missing here makes
/// `AgentEngine::step()` fail with `AgentError::InvalidTransition`.
/// `Done` and `Error` have no outgoing rows.
pub const TRANSITIONS: &[(State, Event, State)] = &[
    (State::IDLE,      Event::START,            State::PLANNING),

    (State::PLANNING,  Event::LLM_TOOL_CALL,    State::ACTING),
    (State::PLANNING,  Event::LLM_FINAL_ANSWER, State::DONE),
    (State::PLANNING,  Event::PARSE_ERROR,      State::PLANNING),
    (State::PLANNING,  Event::ANSWER_TOO_SHORT, State::PLANNING),
    (State::PLANNING,  Event::TOOL_BLACKLISTED, State::PLANNING),
    (State::PLANNING,  Event::MAX_STEPS,        State::ERROR),
    (State::PLANNING,  Event::FATAL_ERROR,      State::ERROR),

    // A failed request is still an observation for the model.
    (State::ACTING,    Event::TOOL_SUCCESS,     State::OBSERVING),
    (State::ACTING,    Event::TOOL_FAILURE,     State::OBSERVING),
    (State::ACTING,    Event::FATAL_ERROR,      State::ERROR),

    (State::OBSERVING, Event::CONTINUE,         State::PLANNING),
];

pub fn build_transition_table() -> TransitionTable {
    TRANSITIONS.iter()
        .map(|(from, event, to)| ((from.clone(), event.clone()), to.clone()))
        .collect()
}
