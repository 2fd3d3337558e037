//! Command-line host for the sieve engine.
//!
//! Loads a JSON array of records and optional settings, replays the
//! operations given on the command line against an [`Engine`], and renders
//! the result as pretty-printed JSON.

pub mod args;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value as Json;
use sieve::{Engine, FilterValue, Settings, SortSpec};
use tracing::{debug, info};

pub use args::Cli;

/// Runs one invocation and returns the rendered output.
pub fn run(cli: &Cli) -> Result<String> {
    let records = load_records(&cli.records)?;
    let mut settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    settings
        .filterable_attributes
        .extend(cli.filterable.iter().cloned());
    settings
        .searchable_fields
        .extend(cli.searchable.iter().cloned());

    info!(
        records = records.len(),
        filterable = settings.filterable_attributes.len(),
        "building engine"
    );
    let mut engine =
        Engine::new(settings.into_config(records)).context("invalid engine configuration")?;

    replay(&mut engine, cli)?;

    let output = if cli.full {
        engine.state().to_json()?
    } else {
        serde_json::to_value(engine.collection())?
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Applies the command-line operations in a fixed order: toggles, exclusive
/// toggles, clears, search, sort.
fn replay(engine: &mut Engine<Json>, cli: &Cli) -> Result<()> {
    for (group, raw) in &cli.filters {
        let value = resolve_value(engine, group, raw);
        engine
            .toggle_filter(group, value)
            .with_context(|| format!("--filter {}={}", group, raw))?;
    }
    for (group, raw) in &cli.only {
        let value = resolve_value(engine, group, raw);
        engine
            .toggle_only(group, value)
            .with_context(|| format!("--only {}={}", group, raw))?;
    }
    for group in &cli.clear {
        engine
            .clear_filters(group)
            .with_context(|| format!("--clear {}", group))?;
    }
    if cli.clear_all {
        engine.clear_all_filters();
    }
    if let Some(keyword) = &cli.search {
        engine.keyword_search(keyword);
    }
    if let Some(id) = &cli.sort {
        engine
            .apply_sort(id.as_str())
            .with_context(|| format!("--sort {}", id))?;
    }
    if let Some((field, dir)) = &cli.sort_by {
        let (field, dir) = (field.clone(), *dir);
        engine.apply_sort(SortSpec::comparator(move |a: &Json, b: &Json| {
            sieve::compare_field(a, b, &field, dir)
        }))?;
    }
    Ok(())
}

/// Interprets a command-line value against the group's options.
///
/// The literal is tried first (`3`, `true`); if the group has no such option
/// but has the raw text, the text wins, so `--filter code=007` finds `"007"`.
fn resolve_value(engine: &Engine<Json>, group: &str, raw: &str) -> FilterValue {
    let literal = FilterValue::parse_literal(raw);
    let text = FilterValue::from(raw);
    match engine.option_groups().get(group) {
        Some(options) if !options.contains(&literal) && options.contains(&text) => text,
        _ => literal,
    }
}

fn load_records(path: &Path) -> Result<Vec<Json>> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("failed to read records from {}", path.display()))?;
    let parsed: Json = serde_json::from_str(&input)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    match parsed {
        Json::Array(records) => {
            debug!(count = records.len(), "records loaded");
            Ok(records)
        }
        _ => bail!("{} must contain a JSON array of records", path.display()),
    }
}

fn load_settings(path: &Path) -> Result<Settings> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    let settings = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Settings::from_yaml(&input),
        _ => Settings::from_json(&input),
    }
    .with_context(|| format!("invalid settings in {}", path.display()))?;
    Ok(settings)
}
