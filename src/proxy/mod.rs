//! Proxy module
//!
//! Handles request forwarding to the backend inference engine.

pub mod headers;
pub mod logging;
pub mod relay;

pub use relay::{ByteStream, InferenceRelay, Relayed};
