use anyhow::Result;
use serde::Serialize;

use oca_core::canonical::CanonicalJsonOptions;
use oca_core::config::{validate_config, CoreConfig};
use oca_core::said::SaidEngine;

use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
pub struct SaidOut {
    pub said: String,
    pub algorithm: String,
    /// Whether the record's existing `digest` already equals the derived identifier.
    pub matches_existing: bool,
}

pub fn run(cfg: CoreConfig, record_path: &str) -> Result<()> {
    let record = input::read_json_file(record_path)?;
    let existing = record
        .get("digest")
        .and_then(|d| d.as_str())
        .map(str::to_string);

    validate_config(&cfg)?;
    let engine = SaidEngine::new(cfg.said).with_canonical_options(CanonicalJsonOptions {
        max_depth: cfg.limits.max_depth,
    });
    let (_, said) = engine.seal(record)?;

    output::print(&SaidOut {
        matches_existing: existing.as_deref() == Some(said.as_str()),
        said: said.into_string(),
        algorithm: engine.algorithm().to_string(),
    })
}
