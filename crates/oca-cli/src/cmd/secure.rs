use anyhow::{Context, Result};
use serde::Serialize;

use oca_core::bundle::UnsecuredBundle;
use oca_core::config::CoreConfig;
use oca_core::secure::BundleSecurer;

use crate::io::{export, input};
use crate::output;

#[derive(Debug, Serialize)]
pub struct SecureOut {
    pub digest: String,
    pub overlays: usize,
    pub out: String,
}

pub fn run(cfg: CoreConfig, bundle_path: &str, out: Option<&str>) -> Result<()> {
    let securer = BundleSecurer::new(cfg)?;

    let raw = input::read_json_file(bundle_path)?;
    let unsecured = UnsecuredBundle::from_value(raw, &securer.config().limits)
        .with_context(|| format!("reading bundle {bundle_path}"))?;
    let secured = securer.secure(unsecured)?;

    match out {
        Some(path) => {
            export::write_json(path, &secured.to_value())?;
            output::print(&SecureOut {
                digest: secured.digest().to_string(),
                overlays: secured.overlays().len(),
                out: path.to_string(),
            })
        }
        None => output::print(&secured),
    }
}
