//! Process-wide registry of model context windows.
//!
//! A model's context window is not always known from static configuration.
//! Backends often reveal it in response metadata, and provider catalogs list
//! it per model. `ctxwin` keeps the last value seen for each model in a
//! [`ContextWindowRegistry`] so budgeting and truncation code anywhere in
//! the process can reuse it.
//!
//! # Getting started
//!
//! ```
//! use ctxwin::prelude::*;
//! use serde_json::json;
//!
//! // One registry per process, shared by clone.
//! let registry = ContextWindowRegistry::new();
//!
//! // Learn a window from a backend response.
//! let response = json!({ "model": "Local/Llama-3", "usage": { "context_length": 8192 } });
//! observe_response(&registry, None, &response);
//! assert_eq!(registry.lookup("local/llama-3"), Some(8192));
//!
//! // Budget against it, falling back to family defaults for unseen models.
//! let resolver = ContextWindowResolver::new(registry.clone(), ResolverConfig::default());
//! assert_eq!(resolver.resolve("local/llama-3").source, WindowSource::Observed);
//! assert_eq!(resolver.resolve("claude-opus-4").tokens, 200_000);
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`registry`] | [`ContextWindowRegistry`]: last-write-wins cache keyed by normalized model id |
//! | [`usage`] | Pulls context-window values out of response bodies and records them |
//! | [`catalog`] | Parses and fetches provider model listings to seed the registry |
//! | [`limits`] | Static per-family defaults |
//! | [`resolve`] | [`ContextWindowResolver`]: observed, then family default, then fallback |
//! | [`context`] | [`ContextBudget`](context::ContextBudget) usage estimates and advisories |
//! | [`config`] | [`ResolverConfig`] |

pub mod catalog;
pub mod config;
pub mod context;
pub mod limits;
pub mod prelude;
pub mod registry;
pub mod resolve;
pub mod usage;

use serde::{Deserialize, Serialize};

pub use config::ResolverConfig;
pub use registry::ContextWindowRegistry;
pub use resolve::{ContextWindowResolver, ResolvedWindow, WindowSource};

/// Normalize a model identifier into a registry key: surrounding whitespace
/// trimmed, then lowercased.
///
/// ```
/// assert_eq!(ctxwin::normalize_model_id("  GPT-4o "), "gpt-4o");
/// ```
pub fn normalize_model_id(model_id: &str) -> String {
    model_id.trim().to_lowercase()
}

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Tool => write!(f, "tool"),
        }
    }
}

/// A conversation message, as far as budgeting cares about it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    pub role: MessageRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Tool, content)
    }

    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_model_id("Model-X"), "model-x");
        assert_eq!(normalize_model_id("\t model-x \n"), "model-x");
        assert_eq!(normalize_model_id("   "), "");
    }

    #[test]
    fn message_constructors() {
        let sys = Message::system("hello");
        assert_eq!(sys.role, MessageRole::System);
        assert_eq!(sys.content.as_deref(), Some("hello"));
        assert_eq!(Message::tool("r").role, MessageRole::Tool);
    }

    #[test]
    fn message_role_serializes_lowercase() {
        let json = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(MessageRole::User.to_string(), "user");
    }
}
