//! Learns context windows from backend response metadata.
//!
//! Providers disagree on where (and whether) they report a model's context
//! window. [`observe_response`] checks the known locations in a fixed order
//! and records the first numeric value it finds. Validation is left to
//! [`ContextWindowRegistry::record`], so a zero or garbage value is simply
//! dropped there.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::registry::ContextWindowRegistry;

/// JSON pointers checked for a context-window value, in priority order.
///
/// The last two cover llama.cpp's server, which reports `n_ctx` both at the
/// top level of some builds and under `/props`.
pub const CONTEXT_WINDOW_POINTERS: &[&str] = &[
    "/usage/context_window",
    "/usage/context_length",
    "/usage/max_context_tokens",
    "/context_window",
    "/context_length",
    "/n_ctx",
    "/default_generation_settings/n_ctx",
];

/// First context-window value present in a response body.
pub fn extract_context_window(body: &Value) -> Option<f64> {
    CONTEXT_WINDOW_POINTERS
        .iter()
        .find_map(|ptr| body.pointer(ptr).and_then(Value::as_f64))
}

/// Record the context window carried by a response body, if any.
///
/// The model id comes from the body's `model` field, or `fallback_model`
/// when the body has none (llama.cpp `/props` does not name the model).
/// Returns the raw value handed to the registry.
pub fn observe_response(
    registry: &ContextWindowRegistry,
    fallback_model: Option<&str>,
    body: &Value,
) -> Option<f64> {
    let model = body
        .get("model")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .or(fallback_model)?;
    let window = extract_context_window(body)?;
    registry.record(model, window);
    Some(window)
}

/// Parse a raw response body and observe it.
pub fn observe_response_str(
    registry: &ContextWindowRegistry,
    fallback_model: Option<&str>,
    body: &str,
) -> Result<Option<f64>, String> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| format!("failed to parse response: {e}"))?;
    Ok(observe_response(registry, fallback_model, &value))
}

/// Observe every JSON line from a reader. Blank and malformed lines
/// (including invalid UTF-8) are skipped; only I/O errors abort. Returns how
/// many lines carried a context window.
pub fn observe_lines(
    registry: &ContextWindowRegistry,
    fallback_model: Option<&str>,
    reader: impl BufRead,
) -> Result<usize, String> {
    let mut observed = 0;
    for (idx, raw) in reader.split(b'\n').enumerate() {
        let raw = raw.map_err(|e| format!("failed to read line {}: {e}", idx + 1))?;
        let line = match String::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                warn!("skipping line {}: {e}", idx + 1);
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match observe_response_str(registry, fallback_model, &line) {
            Ok(Some(_)) => observed += 1,
            Ok(None) => {}
            Err(e) => warn!("skipping line {}: {e}", idx + 1),
        }
    }
    debug!("observed {observed} context window(s)");
    Ok(observed)
}

/// Observe a JSON-lines file of response bodies.
pub fn load_observations(
    registry: &ContextWindowRegistry,
    fallback_model: Option<&str>,
    path: &Path,
) -> Result<usize, String> {
    let file =
        File::open(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    observe_lines(registry, fallback_model, BufReader::new(file))
}
