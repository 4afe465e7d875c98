//! Tool registry and dispatch for the threadrelay chat assistant.
//!
//! This crate provides:
//!
//! - **`ToolRegistry`**: name-to-executor mapping, registered at startup
//! - **`ToolDispatcher`**: concurrent, order-preserving batch execution
//!   with per-invocation failure containment
//! - **`QueryTool`**: the built-in data-query tool speaking the toolbox
//!   HTTP contract

pub mod dispatch;
pub mod error;
pub mod query;
pub mod registry;

pub use dispatch::{ToolDispatcher, ToolUse};
pub use error::ToolError;
pub use query::{QueryResponse, QueryTool};
pub use registry::{ToolExecutor, ToolRegistry};
