use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

/// Read a JSON file. `-` reads stdin.
pub fn read_json_file<P: AsRef<Path>>(path: P) -> Result<serde_json::Value> {
    let path = path.as_ref();
    let raw = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("reading stdin")?
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    let v: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid json in {}: {e}", path.display()))?;
    Ok(v)
}
