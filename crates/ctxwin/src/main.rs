//! Build a context-window registry from observations and report what each
//! model resolves to.
//!
//! # Examples
//!
//! ```sh
//! # Learn windows from captured response bodies (JSON lines), then query
//! ctxwin --responses responses.jsonl --model gpt-4o --model local/llama-3
//!
//! # Seed from the OpenRouter catalog and budget a prompt
//! ctxwin --catalog --model anthropic/claude-sonnet-4 --prompt "$(cat draft.md)"
//!
//! # Record values directly and print JSON
//! ctxwin --record "My-Model=32768" --model my-model --json
//! ```

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use ctxwin::catalog::{CatalogClient, seed_registry};
use ctxwin::config::DEFAULT_FALLBACK_WINDOW;
use ctxwin::context::{ContextBudget, ContextUsage};
use ctxwin::usage::{load_observations, observe_lines};
use ctxwin::{
    ContextWindowRegistry, ContextWindowResolver, Message, ResolvedWindow, ResolverConfig,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Build a context-window registry from observations and report what each
/// model resolves to.
#[derive(Parser)]
#[command(name = "ctxwin")]
struct Cli {
    // ── Observations ───────────────────────────────────────────
    /// JSON-lines file of backend response bodies ("-" for stdin)
    #[arg(long)]
    responses: Option<PathBuf>,

    /// Model id for response bodies that don't name one
    #[arg(long)]
    response_model: Option<String>,

    /// Record a window directly, as MODEL=TOKENS (repeatable)
    #[arg(long = "record", value_parser = parse_record)]
    records: Vec<(String, f64)>,

    /// Seed the registry from the OpenRouter model catalog
    #[arg(long)]
    catalog: bool,

    /// Alternative catalog endpoint (implies --catalog)
    #[arg(long)]
    catalog_url: Option<String>,

    // ── Resolution ─────────────────────────────────────────────
    /// Model to resolve (repeatable)
    #[arg(long = "model")]
    models: Vec<String>,

    /// Window used when a model is unobserved and unrecognized
    #[arg(long, default_value_t = DEFAULT_FALLBACK_WINDOW)]
    fallback_window: usize,

    /// Skip per-family defaults; go straight to the fallback
    #[arg(long)]
    no_family_defaults: bool,

    // ── Budgeting ──────────────────────────────────────────────
    /// Prompt text to budget against each --model
    #[arg(long)]
    prompt: Option<String>,

    /// Tokens reserved for the model's response
    #[arg(long, default_value_t = 0)]
    output_reserve: usize,

    // ── Output ─────────────────────────────────────────────────
    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,

    /// Debug-level logging to stderr (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

/// Parse a `MODEL=TOKENS` pair. Splits on the last `=`.
fn parse_record(s: &str) -> Result<(String, f64), String> {
    let (model, tokens) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected MODEL=TOKENS, got {s:?}"))?;
    if model.trim().is_empty() {
        return Err(format!("missing model in {s:?}"));
    }
    let tokens: f64 = tokens
        .trim()
        .parse()
        .map_err(|e| format!("invalid token count in {s:?}: {e}"))?;
    Ok((model.to_string(), tokens))
}

#[derive(Serialize)]
struct ModelReport {
    model: String,
    observed: Option<usize>,
    resolved: ResolvedWindow,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<ContextUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    advisory: Option<String>,
}

#[derive(Serialize)]
struct Entry {
    model: String,
    tokens: usize,
}

#[derive(Serialize)]
struct Report {
    models: Vec<ModelReport>,
    registry: Vec<Entry>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn populate(cli: &Cli, registry: &ContextWindowRegistry) -> Result<(), String> {
    if cli.catalog || cli.catalog_url.is_some() {
        let client = match &cli.catalog_url {
            Some(url) => CatalogClient::with_url(url.clone())?,
            None => CatalogClient::new()?,
        };
        let models = client.fetch().await?;
        seed_registry(registry, &models);
    }

    if let Some(path) = &cli.responses {
        let fallback = cli.response_model.as_deref();
        let observed = if path.as_os_str() == "-" {
            observe_lines(registry, fallback, io::stdin().lock())?
        } else {
            load_observations(registry, fallback, path)?
        };
        info!("{observed} response(s) carried a context window");
    }

    // Explicit records go last so they override anything observed.
    for (model, tokens) in &cli.records {
        registry.record(model, *tokens);
    }
    Ok(())
}

fn build_report(cli: &Cli, resolver: &ContextWindowResolver) -> Report {
    let messages: Vec<Message> = cli.prompt.iter().map(Message::user).collect();

    let models = cli
        .models
        .iter()
        .map(|model| {
            let (usage, advisory) = if messages.is_empty() {
                (None, None)
            } else {
                let budget = ContextBudget::for_model("", model, resolver)
                    .with_output_reserve(cli.output_reserve);
                (
                    Some(budget.estimate_usage(&messages)),
                    budget.advisory(&messages),
                )
            };
            ModelReport {
                model: model.clone(),
                observed: resolver.registry().lookup(model),
                resolved: resolver.resolve(model),
                usage,
                advisory,
            }
        })
        .collect();

    let registry = resolver
        .registry()
        .snapshot()
        .into_iter()
        .map(|(model, tokens)| Entry { model, tokens })
        .collect();

    Report { models, registry }
}

fn render_text(report: &Report) -> String {
    let mut out = String::new();
    for m in &report.models {
        out.push_str(&format!(
            "{}: {} tokens ({})\n",
            m.model, m.resolved.tokens, m.resolved.source
        ));
        if let Some(usage) = &m.usage {
            out.push_str(&format!("  {}\n", usage.to_log_string()));
        }
        if let Some(advisory) = &m.advisory {
            out.push_str(&format!("  {advisory}\n"));
        }
    }
    if !report.models.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!("registry: {} entries\n", report.registry.len()));
    for e in &report.registry {
        out.push_str(&format!("  {} = {}\n", e.model, e.tokens));
    }
    out
}

async fn run(cli: &Cli) -> Result<String, String> {
    // The one registry for this process; everything below gets a clone.
    let registry = ContextWindowRegistry::new();
    populate(cli, &registry).await?;

    let config = ResolverConfig::default()
        .with_fallback_window(cli.fallback_window)
        .with_family_defaults(!cli.no_family_defaults);
    let resolver = ContextWindowResolver::new(registry, config);

    let report = build_report(cli, &resolver);
    if cli.json {
        serde_json::to_string_pretty(&report)
            .map(|s| s + "\n")
            .map_err(|e| format!("failed to serialize report: {e}"))
    } else {
        Ok(render_text(&report))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxwin::WindowSource;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ctxwin").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parse_record_splits_on_last_equals() {
        assert_eq!(
            parse_record("My-Model=32768").unwrap(),
            ("My-Model".to_string(), 32_768.0)
        );
        assert_eq!(
            parse_record("org/a=b=100.5").unwrap(),
            ("org/a=b".to_string(), 100.5)
        );
    }

    #[test]
    fn parse_record_rejects_bad_input() {
        assert!(parse_record("no-equals").is_err());
        assert!(parse_record("=100").is_err());
        assert!(parse_record("m=lots").is_err());
    }

    #[test]
    fn cli_defaults() {
        let cli = cli(&[]);
        assert_eq!(cli.fallback_window, 8_192);
        assert!(!cli.no_family_defaults);
        assert!(cli.models.is_empty());
    }

    #[tokio::test]
    async fn records_resolve_and_render() {
        let cli = cli(&[
            "--record",
            "My-Model=32768",
            "--record",
            "bad=0",
            "--model",
            "my-model",
            "--model",
            "gpt-4o",
            "--model",
            "unknown",
            "--fallback-window",
            "4096",
        ]);
        let registry = ContextWindowRegistry::new();
        populate(&cli, &registry).await.unwrap();
        assert_eq!(registry.len(), 1);

        let resolver = ContextWindowResolver::new(
            registry,
            ResolverConfig::default().with_fallback_window(cli.fallback_window),
        );
        let report = build_report(&cli, &resolver);
        let sources: Vec<WindowSource> =
            report.models.iter().map(|m| m.resolved.source).collect();
        assert_eq!(
            sources,
            vec![
                WindowSource::Observed,
                WindowSource::FamilyDefault,
                WindowSource::Fallback
            ]
        );
        assert_eq!(report.models[2].resolved.tokens, 4096);

        let text = render_text(&report);
        assert!(text.contains("my-model: 32768 tokens (observed)"));
        assert!(text.contains("registry: 1 entries"));
    }

    #[test]
    fn prompt_adds_usage_and_advisory() {
        let cli = cli(&["--model", "tiny", "--prompt", &"x".repeat(3_150)]);
        let registry = ContextWindowRegistry::new();
        registry.record("tiny", 1000.0);
        let resolver = ContextWindowResolver::new(registry, ResolverConfig::default());
        let report = build_report(&cli, &resolver);
        let m = &report.models[0];
        assert_eq!(m.usage.as_ref().unwrap().estimated_tokens, 900);
        assert!(m.advisory.is_some());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["models"][0]["resolved"]["source"], "observed");
        assert_eq!(json["registry"][0]["model"], "tiny");
    }
}
