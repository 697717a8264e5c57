use std::sync::Mutex;
use crate::llm::AsyncLlmCaller;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::types::LlmResponse;
use async_trait::async_trait;

/// Scripted LLM caller for tests: replays responses in order and records
/// what it was asked.
pub struct MockLlmCaller {
    responses: Mutex<Vec<LlmResponse>>,
    call_log:  Mutex<Vec<MockCall>>,
}

/// One recorded invocation of the mock.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub model:         String,
    pub task:          String,
    pub system_prompt: String,
    pub tool_names:    Vec<String>,
    pub history_len:   usize,
    /// Length of the chat transcript the call would have sent
    pub message_count: usize,
    pub last_observation: Option<String>,
}

impl MockLlmCaller {
    pub fn new(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_log:  Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of times call_async() was invoked
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    /// Returns the Nth recorded call (0-indexed)
    pub fn call(&self, n: usize) -> Option<MockCall> {
        self.call_log.lock().unwrap().get(n).cloned()
    }
}

#[async_trait]
impl AsyncLlmCaller for MockLlmCaller {
    async fn call_async(
        &self,
        memory: &AgentMemory,
        tools:  &ToolRegistry,
        model:  &str,
    ) -> Result<LlmResponse, String> {
        self.call_log.lock().unwrap().push(MockCall {
            model:         model.to_string(),
            task:          memory.task.clone(),
            system_prompt: memory.system_prompt.clone(),
            tool_names:    tools.names().into_iter().map(String::from).collect(),
            history_len:   memory.history.len(),
            message_count: memory.build_messages().len(),
            last_observation: memory.history.last().map(|h| h.observation.clone()),
        });

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err("MockLlmCaller: no more programmed responses".to_string());
        }
        Ok(responses.remove(0))
    }
}
