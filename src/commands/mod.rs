//! CLI commands

pub mod export;
pub mod grid;
pub mod list;
pub mod show;
