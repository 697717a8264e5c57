use std::collections::HashMap;
use std::sync::Arc;
use crate::engine::AgentEngine;
use crate::error::AgentError;
use crate::memory::AgentMemory;
use crate::tools::{Tool, ToolRegistry, ToolFn};
use crate::llm::AsyncLlmCaller;
use crate::states::{
    AgentState, IdleState, PlanningState, ActingState,
    ObservingState, DoneState, ErrorState,
};
use crate::transitions::build_transition_table;
use crate::types::AgentConfig;

pub struct AgentBuilder {
    memory:  AgentMemory,
    tools:   ToolRegistry,
    shared_tools: Option<Arc<ToolRegistry>>,
    llm:     Option<Arc<dyn AsyncLlmCaller>>,
    config:  Option<AgentConfig>,
}

impl AgentBuilder {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            memory:       AgentMemory::new(task),
            tools:        ToolRegistry::new(),
            shared_tools: None,
            llm:          None,
            config:       None,
        }
    }

    pub fn system_prompt(mut self, p: impl Into<String>) -> Self {
        self.memory.system_prompt = p.into(); self
    }

    pub fn llm(mut self, llm: Arc<dyn AsyncLlmCaller>) -> Self {
        self.llm = Some(llm); self
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = Some(config); self
    }

    pub fn max_steps(mut self, n: usize) -> Self {
        self.memory.config.max_steps = n; self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.memory.config.model = model.into(); self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.memory.config.verbose = verbose; self
    }

    pub fn handle_parsing_errors(mut self, handle: bool) -> Self {
        self.memory.config.handle_parsing_errors = handle; self
    }

    pub fn min_answer_length(mut self, n: usize) -> Self {
        self.memory.config.min_answer_length = n; self
    }

    pub fn tool(
        mut self,
        name:        impl Into<String>,
        description: impl Into<String>,
        schema:      serde_json::Value,
        func:        ToolFn,
    ) -> Self {
        self.tools.register(name, description, schema, func);
        self
    }

    pub fn add_tool(mut self, tool: Tool) -> Self {
        self.tools.add(tool);
        self
    }

    /// Use an already-built registry shared between runs. Tools added with
    /// `.tool()` / `.add_tool()` are ignored when this is set.
    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.shared_tools = Some(tools); self
    }

    pub fn blacklist_tool(mut self, name: impl Into<String>) -> Self {
        self.memory.blacklist_tool(name); self
    }

    /// Builds the AgentEngine with the default state handlers.
    pub fn build(self) -> Result<AgentEngine, AgentError> {
        self.build_with_handlers(HashMap::new())
    }

    /// Builds with custom state handlers.
    /// Any entry in `extra_handlers` replaces the default handler for that state name.
    pub fn build_with_handlers(
        mut self,
        extra_handlers: HashMap<&'static str, Box<dyn AgentState>>,
    ) -> Result<AgentEngine, AgentError> {
        let llm = self.llm
            .ok_or_else(|| AgentError::BuildError("LLM caller is required".to_string()))?;

        if let Some(config) = self.config {
            self.memory.config = config;
        }

        let mut handlers: HashMap<String, Box<dyn AgentState>> = HashMap::new();
        for handler in default_handlers() {
            handlers.insert(handler.name().to_string(), handler);
        }
        for (key, handler) in extra_handlers {
            handlers.insert(key.to_string(), handler);
        }

        let tools = self.shared_tools.unwrap_or_else(|| Arc::new(self.tools));

        Ok(AgentEngine::new(
            self.memory,
            tools,
            llm,
            build_transition_table(),
            handlers,
        ))
    }
}

fn default_handlers() -> Vec<Box<dyn AgentState>> {
    vec![
        Box::new(IdleState),
        Box::new(PlanningState),
        Box::new(ActingState),
        Box::new(ObservingState),
        Box::new(DoneState),
        Box::new(ErrorState),
    ]
}
