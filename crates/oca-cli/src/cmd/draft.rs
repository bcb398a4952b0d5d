use anyhow::{Context, Result};

use oca_core::draft::{draft_bundle, DraftSchema};

use crate::io::{export, input};
use crate::output;

pub fn run(schema_path: &str, out: Option<&str>) -> Result<()> {
    let schema_json = input::read_json_file(schema_path)?;
    let schema = DraftSchema::from_value(schema_json)
        .with_context(|| format!("reading schema {schema_path}"))?;

    let bundle = draft_bundle(&schema)?;
    tracing::info!(
        attributes = schema.attributes.len(),
        overlays = bundle.overlays().len(),
        "drafted bundle"
    );

    match out {
        Some(path) => export::write_json(path, &bundle.to_value()),
        None => output::print(&bundle),
    }
}
