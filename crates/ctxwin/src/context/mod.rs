//! Context budgeting on top of resolved context windows.

pub mod budget;

pub use budget::{ContextBudget, ContextUsage, DEFAULT_CHARS_PER_TOKEN};
