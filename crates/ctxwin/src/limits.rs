//! Static context-window defaults for known model families.
//!
//! Used when nothing has been observed for a model yet. Matching runs on the
//! model name segment (after the last `/` in ids like
//! `"anthropic/claude-sonnet-4"`), lowercased, so org prefixes such as
//! `"my-org/custom-sonnet-finetune"` don't produce false matches.

/// Default context window (in tokens) for a known model family.
///
/// Returns `None` for models that match no known family; callers decide
/// the fallback.
pub fn default_context_limit(model_id: &str) -> Option<usize> {
    let name = model_id
        .trim()
        .rsplit('/')
        .next()
        .unwrap_or(model_id)
        .to_lowercase();

    // Approximate sizes as of early 2026. Observed values always win over
    // these, so they only need to be in the right ballpark.
    let limit = if name.starts_with("claude-") {
        200_000
    } else if name.starts_with("gpt-4.1") {
        1_047_576
    } else if name.starts_with("gpt-4o") || name.starts_with("gpt-4-turbo") {
        128_000
    } else if name.starts_with("gpt-4") {
        8_192
    } else if name.starts_with("gpt-3.5") {
        16_385
    } else if name.starts_with("o1") || name.starts_with("o3") || name.starts_with("o4") {
        200_000
    } else if name.starts_with("gemini") {
        1_048_576
    } else if name.starts_with("grok-") {
        131_072
    } else if name.starts_with("deepseek-") {
        64_000
    } else if name.starts_with("qwen") || name.starts_with("qwq-") {
        32_768
    } else if name.starts_with("kimi-") || name.starts_with("moonshot-") {
        128_000
    } else if name.contains("mistral") || name.contains("mixtral") {
        32_000
    } else if name.contains("llama") {
        128_000
    } else {
        return None;
    };
    Some(limit)
}
