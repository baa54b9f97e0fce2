//! CLI command implementations.

pub mod common;
pub mod patch;
pub mod render;
pub mod table;
