//! Convenience re-exports for common `ctxwin` types.
//!
//! ```
//! use ctxwin::prelude::*;
//! ```
//!
//! Pulls in the registry, resolver, observers, and budget. The catalog
//! client and per-family limits are left out; import those from their
//! modules directly.

// ── Registry ────────────────────────────────────────────────────────
pub use crate::{ContextWindowRegistry, Message, MessageRole, normalize_model_id};

// ── Resolution ──────────────────────────────────────────────────────
pub use crate::config::ResolverConfig;
pub use crate::resolve::{ContextWindowResolver, ResolvedWindow, WindowSource};

// ── Observation ─────────────────────────────────────────────────────
pub use crate::usage::{observe_response, observe_response_str};

// ── Context management ──────────────────────────────────────────────
pub use crate::context::{ContextBudget, ContextUsage};
