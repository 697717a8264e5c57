use std::sync::Arc;
use async_trait::async_trait;
use crate::builder::AgentBuilder;
use crate::categorize::TicketAgent;
use crate::error::AgentError;
use crate::llm::AsyncLlmCaller;
use crate::openapi::{request_tool, HttpMethod, RequestsWrapper, ServiceDescription};
use crate::tools::ToolRegistry;
use crate::types::AgentConfig;

/// An agent that turns natural-language instructions into calls against the
/// API described by a [`ServiceDescription`].
///
/// Each [`invoke`](OpenApiAgent::invoke) runs a fresh state machine; nothing
/// carries over between instructions except the description, tools and LLM.
pub struct OpenApiAgent {
    description:   Arc<ServiceDescription>,
    tools:         Arc<ToolRegistry>,
    llm:           Arc<dyn AsyncLlmCaller>,
    config:        AgentConfig,
    system_prompt: String,
    /// Tool names of the methods left out of the allow-list
    refused_tools: Vec<String>,
}

impl OpenApiAgent {
    pub fn builder(description: ServiceDescription) -> OpenApiAgentBuilder {
        OpenApiAgentBuilder::new(description)
    }

    pub fn description(&self) -> &ServiceDescription {
        &self.description
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.names()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Runs the instruction and returns the agent's answer or the reason it
    /// stopped. Requests for a method outside the allow-list are refused
    /// before anything is sent and reported back to the model.
    pub async fn run(&self, instruction: &str) -> Result<String, AgentError> {
        let mut builder = AgentBuilder::new(instruction)
            .system_prompt(self.system_prompt.clone())
            .llm(Arc::clone(&self.llm))
            .tools(Arc::clone(&self.tools))
            .config(self.config.clone());
        for name in &self.refused_tools {
            builder = builder.blacklist_tool(name.clone());
        }
        let mut engine = builder.build()?;
        engine.run().await
    }

    /// Like [`run`](OpenApiAgent::run), but failures come back as text.
    pub async fn invoke(&self, instruction: &str) -> String {
        match self.run(instruction).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "agent invocation failed");
                format!("Agent stopped: {}", e)
            }
        }
    }
}

#[async_trait]
impl TicketAgent for OpenApiAgent {
    async fn invoke(&self, instruction: &str) -> String {
        OpenApiAgent::invoke(self, instruction).await
    }
}

pub struct OpenApiAgentBuilder {
    description:              ServiceDescription,
    llm:                      Option<Arc<dyn AsyncLlmCaller>>,
    http_client:              Option<reqwest::Client>,
    config:                   AgentConfig,
    allow_dangerous_requests: bool,
    allowed_operations:       Vec<HttpMethod>,
}

impl OpenApiAgentBuilder {
    pub fn new(description: ServiceDescription) -> Self {
        Self {
            description,
            llm:                      None,
            http_client:              None,
            config:                   AgentConfig::default(),
            allow_dangerous_requests: false,
            allowed_operations:       vec![HttpMethod::Get, HttpMethod::Post],
        }
    }

    pub fn llm(mut self, llm: Arc<dyn AsyncLlmCaller>) -> Self {
        self.llm = Some(llm); self
    }

    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client); self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into(); self
    }

    pub fn max_steps(mut self, n: usize) -> Self {
        self.config.max_steps = n; self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose; self
    }

    pub fn handle_parsing_errors(mut self, handle: bool) -> Self {
        self.config.handle_parsing_errors = handle; self
    }

    /// Final answers shorter than `n` characters are sent back for a retry.
    /// Zero, the default, accepts any answer.
    pub fn min_answer_length(mut self, n: usize) -> Self {
        self.config.min_answer_length = n; self
    }

    /// Must be set to `true`: the request tools can modify the remote service.
    pub fn allow_dangerous_requests(mut self, allow: bool) -> Self {
        self.allow_dangerous_requests = allow; self
    }

    pub fn allow_operations(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        let mut allowed = Vec::new();
        for method in methods {
            if !allowed.contains(&method) {
                allowed.push(method);
            }
        }
        self.allowed_operations = allowed;
        self
    }

    pub fn build(self) -> Result<OpenApiAgent, AgentError> {
        if !self.allow_dangerous_requests {
            return Err(AgentError::BuildError(
                "the OpenAPI agent issues arbitrary HTTP requests; \
                 opt in with allow_dangerous_requests(true)".to_string(),
            ));
        }

        let llm = self.llm
            .ok_or_else(|| AgentError::BuildError("LLM caller is required".to_string()))?;

        let base_url = self.description.base_url()
            .ok_or_else(|| AgentError::BuildError("API description declares no server URL".to_string()))?
            .to_string();

        if self.allowed_operations.is_empty() {
            return Err(AgentError::BuildError("at least one HTTP method must be allowed".to_string()));
        }

        let wrapper = Arc::new(RequestsWrapper::new(
            self.http_client.unwrap_or_default(),
            base_url,
        ));

        let mut tools = ToolRegistry::new();
        let mut refused_tools = Vec::new();
        for method in HttpMethod::ALL {
            if self.allowed_operations.contains(&method) {
                tools.add(request_tool(Arc::clone(&wrapper), method));
            } else {
                refused_tools.push(method.tool_name());
            }
        }

        let system_prompt = build_system_prompt(&self.description, &self.allowed_operations);

        tracing::info!(
            base_url  = %wrapper.base_url(),
            endpoints = self.description.endpoints.len(),
            tools     = ?tools.names(),
            "OpenAPI agent ready"
        );

        Ok(OpenApiAgent {
            description: Arc::new(self.description),
            tools:       Arc::new(tools),
            llm,
            config:      self.config,
            system_prompt,
            refused_tools,
        })
    }
}

fn build_system_prompt(description: &ServiceDescription, allowed: &[HttpMethod]) -> String {
    let endpoints: Vec<String> = description.endpoints.iter()
        .filter(|e| allowed.contains(&e.method))
        .map(|e| format!("- {}", e))
        .collect();

    let endpoints = if endpoints.is_empty() {
        "(none)".to_string()
    } else {
        endpoints.join("\n")
    };

    format!(
        "You are an agent that carries out instructions by calling an HTTP API.\n\n\
         Base URL: {base}\n\
         API description: {desc}\n\n\
         Available endpoints:\n{endpoints}\n\n\
         Work out which endpoints the instruction needs, call them with the \
         requests_* tools (paths are relative to the base URL), read the \
         responses, and call further endpoints if needed. Only use the \
         endpoints listed above. When finished, reply with a short summary of \
         what was done. If no endpoint fits or a call fails, say so in your \
         reply instead of guessing.",
        base = description.base_url().unwrap_or_default(),
        desc = if description.description.is_empty() { "(none)" } else { description.description.as_str() },
        endpoints = endpoints,
    )
}
