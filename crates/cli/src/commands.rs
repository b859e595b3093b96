//! Command implementations for the Promptdeck CLI.

use std::path::Path;

use promptdeck_core::ProviderParams;
use promptdeck_engine::Orchestrator;

/// List contexts, models, handlers and the current selections.
pub fn show(deck: &Orchestrator) {
    let state = deck.current_state();

    println!("Contexts:");
    for name in deck.contexts().available_contexts() {
        let marker = if name == state.context.current { "*" } else { " " };
        println!("  {marker} {name}");
    }

    println!("Models:");
    for name in deck.models().available_models() {
        let marker = if name == state.model.current { "*" } else { " " };
        println!("  {marker} {name}");
    }

    println!("Handlers:");
    for name in deck.models().available_handlers() {
        let marker = if name == deck.models().current_handler() {
            "*"
        } else {
            " "
        };
        println!("  {marker} {name}");
    }

    if let Some(model) = &state.model.config {
        println!("Current model provider: {}", model.provider);
    }
}

/// Apply the requested switches, generate one response, print it.
pub fn generate(
    deck: &mut Orchestrator,
    prompt: &str,
    context: Option<String>,
    model: Option<String>,
    handler: Option<String>,
    options: &[String],
) -> anyhow::Result<()> {
    if let Some(name) = context {
        if !deck.switch_context(&name) {
            anyhow::bail!("context '{name}' is not configured");
        }
    }
    if let Some(name) = model {
        if !deck.switch_model(&name) {
            anyhow::bail!("model '{name}' is not configured");
        }
    }
    if let Some(name) = handler {
        if !deck.switch_handler(&name) {
            anyhow::bail!("handler '{name}' is not configured");
        }
    }

    let options = parse_options(options)?;
    let response = deck.generate_response(prompt, &options)?;
    println!("{response}");
    Ok(())
}

/// Print the derived metrics snapshot.
pub fn metrics(deck: &Orchestrator) {
    let m = deck.metrics();
    println!("requests:        {}", m.requests);
    println!("errors:          {}", m.errors);
    println!("cache hits:      {}", m.cache_hits);
    println!("cache misses:    {}", m.cache_misses);
    println!("total tokens:    {}", m.total_tokens);
    println!("total time:      {:.4}s", m.total_time_secs);
    println!("average time:    {:.4}s", m.average_time_secs);
    println!("error rate:      {:.2}%", m.error_rate * 100.0);
    println!("cache hit rate:  {:.2}%", m.cache_hit_rate * 100.0);
}

/// Write the engine state to `path`.
pub fn export(deck: &Orchestrator, path: &Path) -> anyhow::Result<()> {
    deck.export_state(path)?;
    println!("State exported to {}", path.display());
    Ok(())
}

/// Load the engine state from `path` and show where it landed.
pub fn import(deck: &mut Orchestrator, path: &Path) -> anyhow::Result<()> {
    if !deck.import_state(path) {
        anyhow::bail!("failed to import state from {}", path.display());
    }
    let state = deck.current_state();
    println!(
        "State imported: context '{}', model '{}', {} interaction(s)",
        state.context.current,
        state.model.current,
        deck.interactions().len()
    );
    Ok(())
}

/// Parse `key=value` pairs; values that parse as JSON stay typed,
/// everything else becomes a string.
fn parse_options(pairs: &[String]) -> anyhow::Result<ProviderParams> {
    let mut options = ProviderParams::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("option '{pair}' is not of the form key=value"))?;
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        options.insert(key.to_string(), value);
    }
    Ok(options)
}
