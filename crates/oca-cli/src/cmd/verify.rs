use anyhow::{bail, Result};

use oca_core::canonical::CanonicalJsonOptions;
use oca_core::config::CoreConfig;
use oca_core::said::SaidEngine;
use oca_core::verify::verify_bundle;

use crate::io::input;
use crate::output;

pub fn run(cfg: CoreConfig, bundle_path: &str) -> Result<()> {
    let bundle = input::read_json_file(bundle_path)?;
    let engine = SaidEngine::new(cfg.said).with_canonical_options(CanonicalJsonOptions {
        max_depth: cfg.limits.max_depth,
    });

    let report = verify_bundle(&bundle, &engine)?;
    output::print(&report)?;

    if !report.ok {
        bail!("bundle verification failed");
    }
    Ok(())
}
