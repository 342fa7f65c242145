//! Agent Service library: translates natural-language
//! instructions into MCP tool invocations by looping against an
//! OpenAI-compatible chat model.

pub mod chat;
pub mod error;
pub mod handlers;
pub mod mcp_client;
pub mod orchestrator;
pub mod router;
pub mod state;

pub use error::{AgentError, AgentResult};
pub use state::AgentState;
