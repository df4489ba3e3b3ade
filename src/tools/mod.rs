//! MCP tool functions

pub mod moisture;
