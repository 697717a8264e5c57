use crate::states::AgentState;
use crate::events::Event;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::llm::AsyncLlmCaller;
use crate::types::{LlmResponse, ToolCall};
use async_trait::async_trait;
use std::collections::HashMap;

pub struct PlanningState;

impl PlanningState {
    fn handle_tool_call(&self, memory: &mut AgentMemory, tool: ToolCall) -> Event {
        if memory.blacklisted_tools.contains(&tool.name) {
            memory.log("Planning", "TOOL_BLACKLISTED", &format!(
                "Requested blacklisted tool: {}", tool.name
            ));
            let observation = format!("ERROR: tool '{}' is not permitted", tool.name);
            memory.commit(tool, observation);
            return Event::TOOL_BLACKLISTED;
        }

        memory.log("Planning", "LLM_TOOL_CALL", &format!("tool='{}'", tool.name));
        memory.current_tool_call = Some(tool);
        Event::LLM_TOOL_CALL
    }

    fn handle_malformed(
        &self,
        memory: &mut AgentMemory,
        name:   String,
        id:     Option<String>,
        reason: String,
    ) -> Event {
        if !memory.config.handle_parsing_errors {
            memory.error = Some(format!("Could not parse LLM output for tool '{}': {}", name, reason));
            memory.log("Planning", "PARSE_ERROR_FATAL", &reason);
            return Event::FATAL_ERROR;
        }

        // Hand the parse failure back to the model as an observation.
        memory.log("Planning", "PARSE_ERROR", &format!("tool='{}' {}", name, reason));
        let observation = format!(
            "ERROR: {}. Respond again with a valid JSON object as the tool arguments.",
            reason
        );
        memory.commit(ToolCall { name, args: HashMap::new(), id }, observation);
        Event::PARSE_ERROR
    }

    fn handle_final_answer(&self, memory: &mut AgentMemory, content: String) -> Event {
        let min = memory.config.min_answer_length;
        if content.trim().len() < min {
            memory.log("Planning", "ANSWER_TOO_SHORT", &format!(
                "len={} min={}", content.trim().len(), min
            ));
            let correction = format!(
                "That answer is too short. Reply with a complete answer of at least {} characters.",
                min
            );
            memory.reject_answer(content, correction);
            return Event::ANSWER_TOO_SHORT;
        }

        memory.log("Planning", "LLM_FINAL_ANSWER", &content.chars().take(100).collect::<String>());
        memory.final_answer = Some(content);
        Event::LLM_FINAL_ANSWER
    }
}

#[async_trait]
impl AgentState for PlanningState {
    fn name(&self) -> &'static str { "Planning" }

    async fn handle(
        &self,
        memory: &mut AgentMemory,
        tools:  &ToolRegistry,
        llm:    &dyn AsyncLlmCaller,
    ) -> Event {
        if memory.step >= memory.config.max_steps {
            memory.error = Some(format!("Max steps {} exceeded", memory.config.max_steps));
            memory.log("Planning", "MAX_STEPS", &format!("step={}", memory.step));
            return Event::MAX_STEPS;
        }

        memory.step += 1;
        memory.log("Planning", "STEP_START", &format!("step={}/{}", memory.step, memory.config.max_steps));

        let model = memory.config.model.clone();
        let response = llm.call_async(memory, tools, &model).await;

        match response {
            Ok(LlmResponse::ToolCall { tool }) => {
                self.handle_tool_call(memory, tool)
            }
            Ok(LlmResponse::MalformedToolCall { name, id, reason }) => {
                self.handle_malformed(memory, name, id, reason)
            }
            Ok(LlmResponse::FinalAnswer { content }) => {
                self.handle_final_answer(memory, content)
            }
            Err(err) => {
                memory.log("Planning", "LLM_ERROR", &err);
                memory.error = Some(format!("LLM error: {}", err));
                Event::FATAL_ERROR
            }
        }
    }
}
