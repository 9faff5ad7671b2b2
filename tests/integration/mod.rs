//! Integration tests for the gateway
//!
//! These tests drive the real router end to end: credential extraction,
//! request normalization, tool augmentation and the backend relay.

mod tool_host;
