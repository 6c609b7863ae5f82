//! Context-window resolution: observed value, then family default, then
//! the configured fallback.

use serde::Serialize;
use std::fmt;

use crate::config::ResolverConfig;
use crate::limits::default_context_limit;
use crate::registry::ContextWindowRegistry;

/// Where a resolved window came from.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WindowSource {
    /// Recorded in the registry from a backend response or catalog.
    Observed,
    /// Static default for the model's family.
    FamilyDefault,
    /// Nothing known; the configured fallback.
    Fallback,
}

impl fmt::Display for WindowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowSource::Observed => write!(f, "observed"),
            WindowSource::FamilyDefault => write!(f, "family default"),
            WindowSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// A context window estimate for one model.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub tokens: usize,
    pub source: WindowSource,
}

/// Answers "what window should I budget against for this model?".
///
/// Holds a clone of the process registry, so values recorded anywhere else
/// in the process are visible on the next [`resolve`](Self::resolve).
#[derive(Clone, Debug)]
pub struct ContextWindowResolver {
    registry: ContextWindowRegistry,
    config: ResolverConfig,
}

impl ContextWindowResolver {
    pub fn new(registry: ContextWindowRegistry, config: ResolverConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ContextWindowRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the context window for `model_id`.
    ///
    /// An observed value of zero (a sub-token float floored down) is not a
    /// usable budget and falls through to the next source.
    pub fn resolve(&self, model_id: &str) -> ResolvedWindow {
        if let Some(tokens) = self.registry.lookup(model_id).filter(|t| *t > 0) {
            return ResolvedWindow {
                tokens,
                source: WindowSource::Observed,
            };
        }
        if self.config.use_family_defaults
            && let Some(tokens) = default_context_limit(model_id)
        {
            return ResolvedWindow {
                tokens,
                source: WindowSource::FamilyDefault,
            };
        }
        ResolvedWindow {
            tokens: self.config.fallback_window,
            source: WindowSource::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(config: ResolverConfig) -> ContextWindowResolver {
        ContextWindowResolver::new(ContextWindowRegistry::new(), config)
    }

    #[test]
    fn observed_wins_over_family_default() {
        let r = resolver(ResolverConfig::default());
        r.registry().record("anthropic/claude-sonnet-4", 1_000_000.0);
        let resolved = r.resolve("Anthropic/Claude-Sonnet-4");
        assert_eq!(resolved.tokens, 1_000_000);
        assert_eq!(resolved.source, WindowSource::Observed);
    }

    #[test]
    fn family_default_when_unobserved() {
        let r = resolver(ResolverConfig::default());
        let resolved = r.resolve("gpt-4o");
        assert_eq!(resolved.tokens, 128_000);
        assert_eq!(resolved.source, WindowSource::FamilyDefault);
    }

    #[test]
    fn fallback_for_unknown_model() {
        let r = resolver(ResolverConfig::default().with_fallback_window(4096));
        let resolved = r.resolve("my-local-model");
        assert_eq!(resolved.tokens, 4096);
        assert_eq!(resolved.source, WindowSource::Fallback);
    }

    #[test]
    fn family_defaults_can_be_disabled() {
        let r = resolver(ResolverConfig::default().with_family_defaults(false));
        assert_eq!(r.resolve("claude-opus-4").source, WindowSource::Fallback);
    }

    #[test]
    fn zero_observation_falls_through() {
        let r = resolver(ResolverConfig::default());
        r.registry().record("deepseek-chat", 0.25);
        let resolved = r.resolve("deepseek-chat");
        assert_eq!(resolved.tokens, 64_000);
        assert_eq!(resolved.source, WindowSource::FamilyDefault);
    }

    #[test]
    fn sees_writes_made_through_other_handles() {
        let registry = ContextWindowRegistry::new();
        let r = ContextWindowResolver::new(registry.clone(), ResolverConfig::default());
        assert_eq!(r.resolve("local-llm").source, WindowSource::Fallback);
        registry.record("local-llm", 16_384.0);
        assert_eq!(r.resolve("local-llm").tokens, 16_384);
    }

    #[test]
    fn source_display() {
        assert_eq!(WindowSource::FamilyDefault.to_string(), "family default");
    }
}
