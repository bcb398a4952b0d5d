use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Write pretty JSON, creating parent directories as needed.
pub fn write_json<P: AsRef<Path>>(path: P, value: &serde_json::Value) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote json");
    Ok(())
}
