use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

/// A tool function: takes JSON args, resolves to a result string or an error string.
pub type ToolFn = Arc<dyn Fn(HashMap<String, Value>) -> BoxFuture<'static, Result<String, String>> + Send + Sync>;

/// Wraps an async closure into a [`ToolFn`].
pub fn tool_fn<F, Fut>(f: F) -> ToolFn
where
    F:   Fn(HashMap<String, Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String, String>> + Send + 'static,
{
    Arc::new(move |args| f(args).boxed())
}

/// Tool schema for sending to LLM (OpenAI tool format)
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolSchema {
    pub name:         String,
    pub description:  String,
    pub input_schema: Value,   // JSON Schema object
}

/// A tool definition that can be handed to the registry in one piece.
#[derive(Clone)]
pub struct Tool {
    pub schema: ToolSchema,
    pub func:   ToolFn,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: Value, func: ToolFn) -> Self {
        Self {
            schema: ToolSchema {
                name:         name.into(),
                description:  description.into(),
                input_schema: schema,
            },
            func,
        }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    // Vec keeps registration order so the tool list sent to the LLM is stable.
    tools: Vec<Tool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool with its schema and implementation.
    /// A tool registered under an existing name replaces the old one.
    pub fn register(
        &mut self,
        name:        impl Into<String>,
        description: impl Into<String>,
        schema:      Value,
        func:        ToolFn,
    ) {
        self.add(Tool::new(name, description, schema, func));
    }

    pub fn add(&mut self, tool: Tool) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    /// Execute a named tool with given arguments.
    /// Never panics — all errors are captured as Err variants.
    pub async fn execute(&self, name: &str, args: HashMap<String, Value>) -> Result<String, String> {
        match self.tools.iter().find(|t| t.name() == name) {
            Some(tool) => (tool.func)(args).await,
            None       => Err(format!("Tool '{}' not found in registry", name)),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Returns all tool schemas — used to build the tools array for LLM calls.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
