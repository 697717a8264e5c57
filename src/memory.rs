use crate::types::{ToolCall, HistoryEntry, AgentConfig, RejectedAnswer};
use crate::trace::Trace;
use std::collections::HashSet;

#[derive(Debug)]
pub struct AgentMemory {
    // ── Task definition ──────────────────────────────────
    /// The natural-language instruction being executed
    pub task:               String,
    /// The system prompt to prepend to every LLM call
    pub system_prompt:      String,

    // ── Execution state ──────────────────────────────────
    /// Current step number (incremented at start of each Planning cycle)
    pub step:               usize,

    // ── Tool call lifecycle ──────────────────────────────
    /// Set by PlanningState when LLM requests a tool, consumed by ActingState
    pub current_tool_call:  Option<ToolCall>,
    /// Set by ActingState after tool execution, consumed by ObservingState
    pub last_observation:   Option<String>,

    // ── History and results ──────────────────────────────
    /// Ordered list of completed tool calls and their observations
    pub history:            Vec<HistoryEntry>,
    /// Final answers turned down for being too short
    pub rejected_answers:   Vec<RejectedAnswer>,
    /// Set when LLM produces a final answer
    pub final_answer:       Option<String>,
    /// Set when agent encounters an unrecoverable error
    pub error:              Option<String>,

    // ── Configuration ────────────────────────────────────
    pub config:             AgentConfig,
    /// Tools the agent is not permitted to call
    pub blacklisted_tools:  HashSet<String>,

    // ── Observability ────────────────────────────────────
    pub trace:              Trace,
}

impl AgentMemory {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task:              task.into(),
            system_prompt:     String::new(),
            step:              0,
            current_tool_call: None,
            last_observation:  None,
            history:           Vec::new(),
            rejected_answers:  Vec::new(),
            final_answer:      None,
            error:             None,
            config:            AgentConfig::default(),
            blacklisted_tools: HashSet::new(),
            trace:             Trace::new(),
        }
    }

    pub fn blacklist_tool(&mut self, tool_name: impl Into<String>) {
        self.blacklisted_tools.insert(tool_name.into());
    }

    /// Records an event into the trace log. Called by all state handlers.
    pub fn log(&mut self, state: &str, event: &str, data: &str) {
        tracing::debug!(state, event, data, step = self.step, "agent trace");
        self.trace.record(self.step, state, event, data);
    }

    /// Records a tool call and its observation in history.
    pub fn commit(&mut self, tool: ToolCall, observation: String) {
        let success = observation.starts_with("SUCCESS:");
        self.history.push(HistoryEntry {
            step: self.step,
            tool,
            observation,
            success,
        });
    }

    /// Keeps a turned-down answer so the next call shows the model what was
    /// wrong with it.
    pub fn reject_answer(&mut self, content: String, correction: String) {
        self.rejected_answers.push(RejectedAnswer {
            after: self.history.len(),
            content,
            correction,
        });
    }

    fn push_rejected(&self, messages: &mut Vec<serde_json::Value>, after: usize) {
        for rejected in self.rejected_answers.iter().filter(|r| r.after == after) {
            messages.push(serde_json::json!({
                "role": "assistant",
                "content": rejected.content
            }));
            messages.push(serde_json::json!({
                "role": "user",
                "content": rejected.correction
            }));
        }
    }

    /// Builds the messages array to send to the LLM, in OpenAI chat format.
    /// Every history entry becomes an assistant tool call followed by the
    /// matching tool result. Rejected answers appear where they were given,
    /// each followed by its correction.
    pub fn build_messages(&self) -> Vec<serde_json::Value> {
        let mut messages = Vec::new();

        if !self.system_prompt.is_empty() {
            messages.push(serde_json::json!({
                "role": "system",
                "content": self.system_prompt
            }));
        }

        messages.push(serde_json::json!({
            "role": "user",
            "content": &self.task
        }));

        for (i, entry) in self.history.iter().enumerate() {
            self.push_rejected(&mut messages, i);

            let tool_id = entry.tool.id.clone()
                .unwrap_or_else(|| format!("call_{}_{}", entry.step, i));

            messages.push(serde_json::json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": tool_id,
                    "type": "function",
                    "function": {
                        "name": entry.tool.name,
                        "arguments": serde_json::to_string(&entry.tool.args).unwrap_or_default()
                    }
                }]
            }));

            messages.push(serde_json::json!({
                "role": "tool",
                "tool_call_id": tool_id,
                "content": entry.observation
            }));
        }
        self.push_rejected(&mut messages, self.history.len());

        messages
    }
}
