//! Context budget tracking against a model's resolved context window.
//!
//! Estimates token usage from message character counts and produces
//! advisory notices when usage crosses thresholds, so a caller can nudge the
//! model toward finishing rather than gathering more input. The window size
//! comes from a [`ContextWindowResolver`], so a value observed from a live
//! response replaces the static guess as soon as it is recorded.

use crate::Message;
use crate::resolve::{ContextWindowResolver, WindowSource};

/// Default characters per token (conservative estimate for English text).
/// Most tokenizers average 3-4 chars per token; we use 3.5 as a middle ground.
pub const DEFAULT_CHARS_PER_TOKEN: f64 = 3.5;

/// Window used by [`ContextBudget::with_calibration`] until overridden.
const DEFAULT_CONTEXT_WINDOW: usize = 200_000;

/// Threshold percentages at which to emit context notices.
const WARNING_THRESHOLD: f64 = 0.60;
const CRITICAL_THRESHOLD: f64 = 0.80;

/// Tracks context budget consumption for one conversation.
///
/// # Example
///
/// ```
/// use ctxwin::{ContextWindowRegistry, ContextWindowResolver, Message, ResolverConfig};
/// use ctxwin::context::ContextBudget;
///
/// let registry = ContextWindowRegistry::new();
/// registry.record("local/llama-3", 8192.0);
/// let resolver = ContextWindowResolver::new(registry, ResolverConfig::default());
///
/// let budget = ContextBudget::for_model("You are terse.", "local/llama-3", &resolver)
///     .with_output_reserve(1024);
/// assert_eq!(budget.max_tokens(), 8192);
///
/// let usage = budget.estimate_usage(&[Message::user("hello")]);
/// assert!(usage.usage_pct < 0.01);
/// assert!(budget.advisory(&[Message::user("hello")]).is_none());
/// ```
#[derive(Debug)]
pub struct ContextBudget {
    /// Maximum context window in tokens.
    max_tokens: usize,
    /// Where `max_tokens` came from, when resolved for a model.
    window_source: Option<WindowSource>,
    /// Tokens reserved for model output (per-response token limit).
    output_reserve: usize,
    /// Tokens reserved for system prompt overhead.
    system_reserve: usize,
    /// Size of the system prompt in characters.
    system_prompt_chars: usize,
    /// Characters per token ratio (calibrated or default).
    chars_per_token: f64,
    warning_message: Option<String>,
    critical_message: Option<String>,
}

impl ContextBudget {
    /// Create a budget with a calibrated chars-per-token ratio. Pass `None`
    /// to use the default.
    pub fn with_calibration(system_prompt: &str, calibrated_cpt: Option<f64>) -> Self {
        let cpt = calibrated_cpt
            .filter(|c| c.is_finite() && *c > 0.0)
            .unwrap_or(DEFAULT_CHARS_PER_TOKEN);
        Self {
            max_tokens: DEFAULT_CONTEXT_WINDOW,
            window_source: None,
            output_reserve: 0,
            system_reserve: 0,
            system_prompt_chars: system_prompt.len(),
            chars_per_token: cpt,
            warning_message: None,
            critical_message: None,
        }
    }

    /// Create a budget sized to the resolved context window of `model_id`.
    pub fn for_model(
        system_prompt: &str,
        model_id: &str,
        resolver: &ContextWindowResolver,
    ) -> Self {
        let resolved = resolver.resolve(model_id);
        let mut budget =
            Self::with_calibration(system_prompt, None).with_max_tokens(resolved.tokens);
        budget.window_source = Some(resolved.source);
        budget
    }

    /// Override the context window size (in tokens).
    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = max;
        self
    }

    /// Set a custom warning message (emitted at 60% usage).
    pub fn with_warning_message(mut self, msg: impl Into<String>) -> Self {
        self.warning_message = Some(msg.into());
        self
    }

    /// Set a custom critical message (emitted at 80% usage).
    pub fn with_critical_message(mut self, msg: impl Into<String>) -> Self {
        self.critical_message = Some(msg.into());
        self
    }

    /// Set tokens reserved for model output (the per-response max_tokens limit).
    pub fn with_output_reserve(mut self, tokens: usize) -> Self {
        self.output_reserve = tokens;
        self
    }

    /// Set tokens reserved for system prompt overhead.
    pub fn with_system_reserve(mut self, tokens: usize) -> Self {
        self.system_reserve = tokens;
        self
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// How the window was chosen; `None` unless built with [`for_model`](Self::for_model).
    pub fn window_source(&self) -> Option<WindowSource> {
        self.window_source
    }

    /// Effective context window: max_tokens minus reserves for output and system prompt.
    pub fn effective_max_tokens(&self) -> usize {
        self.max_tokens
            .saturating_sub(self.output_reserve)
            .saturating_sub(self.system_reserve)
    }

    /// Estimate the total tokens consumed by the system prompt and all messages.
    ///
    /// Usage percentage is computed against [`effective_max_tokens()`](Self::effective_max_tokens).
    pub fn estimate_usage(&self, messages: &[Message]) -> ContextUsage {
        let total_chars = self.system_prompt_chars
            + messages
                .iter()
                .filter_map(|m| m.content.as_ref())
                .map(|c| c.len())
                .sum::<usize>();

        let estimated_tokens = (total_chars as f64 / self.chars_per_token) as usize;
        let effective = self.effective_max_tokens();
        let usage_pct = if effective > 0 {
            estimated_tokens as f64 / effective as f64
        } else {
            1.0
        };

        ContextUsage {
            estimated_tokens,
            max_tokens: self.max_tokens,
            usage_pct,
        }
    }

    /// Context advisory notice if usage exceeds thresholds, else `None`.
    pub fn advisory(&self, messages: &[Message]) -> Option<String> {
        let usage = self.estimate_usage(messages);

        if usage.usage_pct >= CRITICAL_THRESHOLD {
            Some(self.critical_message.clone().unwrap_or_else(|| {
                format!(
                    "[Context notice: ~{:.0}% of context budget used ({} est. tokens / {} max). \
                     Finish the task now and avoid pulling in more input.]",
                    usage.usage_pct * 100.0,
                    usage.estimated_tokens,
                    usage.max_tokens,
                )
            }))
        } else if usage.usage_pct >= WARNING_THRESHOLD {
            Some(self.warning_message.clone().unwrap_or_else(|| {
                format!(
                    "[Context notice: ~{:.0}% of context budget used. \
                     Start wrapping up.]",
                    usage.usage_pct * 100.0,
                )
            }))
        } else {
            None
        }
    }
}

/// Snapshot of context usage at a point in time.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ContextUsage {
    pub estimated_tokens: usize,
    pub max_tokens: usize,
    /// Usage as a fraction (0.0 to 1.0+).
    pub usage_pct: f64,
}

impl ContextUsage {
    /// Format as a short log-friendly string.
    pub fn to_log_string(&self) -> String {
        format!(
            "context: ~{} tokens ({:.0}% of {})",
            self.estimated_tokens,
            self.usage_pct * 100.0,
            self.max_tokens,
        )
    }
}
