use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage,
        ChatCompletionTool,
        ChatCompletionToolType,
        CreateChatCompletionRequestArgs,
        FunctionObject,
        ChatCompletionMessageToolCall,
    },
    Client,
};
use async_trait::async_trait;
use crate::config::{ApiKey, DEFAULT_CHAT_MODEL};
use crate::llm::AsyncLlmCaller;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::types::{LlmResponse, ToolCall};
use std::collections::HashMap;

pub struct OpenAiCaller {
    client:      Client<OpenAIConfig>,
    temperature: f32,
}

impl OpenAiCaller {
    /// Standard OpenAI client using OPENAI_API_KEY env var
    pub fn new() -> Self {
        Self { client: Client::new(), temperature: 0.0 }
    }

    /// OpenAI client with an explicitly supplied key.
    pub fn with_api_key(api_key: &ApiKey) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.expose());
        Self { client: Client::with_config(config), temperature: 0.0 }
    }

    /// Custom base URL — for Groq, Together, Ollama, Fireworks, etc.
    /// api_base example: "https://api.groq.com/openai/v1"
    pub fn with_base_url(api_base: impl Into<String>, api_key: &ApiKey) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(api_base)
            .with_api_key(api_key.expose());
        Self { client: Client::with_config(config), temperature: 0.0 }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Convert our ToolSchema into async-openai's ChatCompletionTool type
    fn build_tools(tools: &ToolRegistry) -> Vec<ChatCompletionTool> {
        tools.schemas().into_iter().map(|schema| {
            ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name:        schema.name,
                    description: Some(schema.description),
                    parameters:  Some(schema.input_schema),
                },
            }
        }).collect()
    }

    /// Parse a tool call from an OpenAI response. Unparseable arguments are
    /// reported as a malformed call so the planner can decide what to do.
    fn parse_tool_call(tc: &ChatCompletionMessageToolCall) -> LlmResponse {
        let parsed: Result<HashMap<String, serde_json::Value>, _> =
            serde_json::from_str(&tc.function.arguments);
        match parsed {
            Ok(args) => LlmResponse::ToolCall {
                tool: ToolCall {
                    name: tc.function.name.clone(),
                    args,
                    id:   Some(tc.id.clone()),
                },
            },
            Err(e) => LlmResponse::MalformedToolCall {
                name:   tc.function.name.clone(),
                id:     Some(tc.id.clone()),
                reason: format!("Failed to parse tool args: {}", e),
            },
        }
    }
}

impl Default for OpenAiCaller {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl AsyncLlmCaller for OpenAiCaller {
    async fn call_async(
        &self,
        memory: &AgentMemory,
        tools:  &ToolRegistry,
        model:  &str,
    ) -> Result<LlmResponse, String> {
        let messages_json = memory.build_messages();

        // serde round-trip: our JSON messages → async-openai typed messages
        let messages: Vec<ChatCompletionRequestMessage> =
            serde_json::from_value(serde_json::Value::Array(messages_json))
                .map_err(|e| format!("Failed to build messages: {}", e))?;

        let model = if model.is_empty() { DEFAULT_CHAT_MODEL } else { model };
        let oai_tools = Self::build_tools(tools);

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder
            .model(model)
            .messages(messages)
            .temperature(self.temperature);

        if !oai_tools.is_empty() {
            request_builder.tools(oai_tools);
        }

        let request = request_builder.build()
            .map_err(|e| format!("Failed to build request: {}", e))?;

        let response = self.client.chat()
            .create(request)
            .await
            .map_err(|e| format!("OpenAI API error: {}", e))?;

        if let Some(u) = &response.usage {
            tracing::debug!(
                prompt_tokens     = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                "openai usage"
            );
        }

        let choice = response.choices.into_iter().next()
            .ok_or("Empty response from OpenAI")?;

        let message = choice.message;

        // Tool call takes priority over text content. The agent runs one
        // HTTP call per step, so only the first requested call is taken.
        if let Some(tool_calls) = message.tool_calls {
            if tool_calls.len() > 1 {
                tracing::debug!(count = tool_calls.len(), "multiple tool calls requested, taking the first");
            }
            if let Some(tc) = tool_calls.first() {
                return Ok(Self::parse_tool_call(tc));
            }
        }

        let content = message.content
            .ok_or("No content in OpenAI response")?;

        Ok(LlmResponse::FinalAnswer { content })
    }
}
