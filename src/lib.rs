pub mod types;
pub mod memory;
pub mod events;
pub mod transitions;
pub mod tools;
pub mod engine;
pub mod trace;
pub mod error;
pub mod builder;
pub mod states;
pub mod llm;
pub mod config;
pub mod feed;
pub mod poller;
pub mod openapi;
pub mod categorize;
pub mod corpus;

// Convenience re-exports at crate root
pub use builder::AgentBuilder;
pub use engine::AgentEngine;
pub use memory::AgentMemory;
pub use types::{State, LlmResponse, ToolCall, HistoryEntry, AgentConfig, RejectedAnswer};
pub use events::Event;
pub use tools::{ToolRegistry, ToolFn, Tool, tool_fn};
pub use llm::{AsyncLlmCaller, OpenAiCaller};
pub use trace::{TraceEntry, Trace};
pub use error::{AgentError, ClientError, FeedError};
pub use config::{ApiKey, ClientConfig};
pub use feed::{FeedMessage, TicketFeed, TicketUpdateEvent, UpdateType};
pub use poller::{HttpTicketSource, TicketPoller, TicketSource};
pub use openapi::{
    fetch_service_description, reduce_openapi_spec,
    HttpMethod, OpenApiAgent, OperationDescriptor, ServiceDescription,
};
pub use categorize::{run_categorizer, categorization_instruction, TicketAgent, CATEGORIES};
pub use corpus::{load_directory, Embedder, InMemoryVectorStore, OpenAiEmbedder, SupportDocument};
