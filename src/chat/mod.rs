//! Chat completion schema and normalization
//!
//! Callers may speak OpenAI, Anthropic or Azure conventions; everything is
//! rewritten into one canonical request before it reaches the backend.

pub mod normalize;
pub mod request;
pub mod types;

pub use normalize::normalize;
pub use request::{ChatCompletionRequest, IncomingChatRequest};
pub use types::{Content, ContentPart, Message, Role, Tool, ToolChoice};
