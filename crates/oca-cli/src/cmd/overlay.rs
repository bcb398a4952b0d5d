use anyhow::{anyhow, Result};

use oca_core::bundle::SecuredBundle;
use oca_core::config::CoreConfig;

use crate::io::input;
use crate::output;

pub fn run(cfg: CoreConfig, bundle_path: &str, type_tag: &str) -> Result<()> {
    let bundle = SecuredBundle::from_value(input::read_json_file(bundle_path)?, &cfg.limits)?;
    let overlay = bundle
        .find_overlay(type_tag)
        .ok_or_else(|| anyhow!("overlay not found: {type_tag}"))?;
    output::print(overlay)
}
