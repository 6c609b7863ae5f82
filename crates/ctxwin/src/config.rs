//! Resolver configuration with sensible defaults.

/// Conservative window used when a model was never observed and matches no
/// known family.
pub const DEFAULT_FALLBACK_WINDOW: usize = 8_192;

/// Settings for [`ContextWindowResolver`](crate::resolve::ContextWindowResolver).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Window returned when nothing else is known. Default: `8192`.
    pub fallback_window: usize,
    /// Consult static per-family defaults before the fallback. Default: `true`.
    pub use_family_defaults: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fallback_window: DEFAULT_FALLBACK_WINDOW,
            use_family_defaults: true,
        }
    }
}

impl ResolverConfig {
    pub fn with_fallback_window(mut self, tokens: usize) -> Self {
        self.fallback_window = tokens;
        self
    }

    pub fn with_family_defaults(mut self, enabled: bool) -> Self {
        self.use_family_defaults = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.fallback_window, 8_192);
        assert!(config.use_family_defaults);
    }

    #[test]
    fn builders_override() {
        let config = ResolverConfig::default()
            .with_fallback_window(32_000)
            .with_family_defaults(false);
        assert_eq!(config.fallback_window, 32_000);
        assert!(!config.use_family_defaults);
    }
}
