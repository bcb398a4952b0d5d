use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use oca_core::OcaError;

static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Set the stdout mode and install the log subscriber (stderr, `RUST_LOG`, default `warn`).
pub fn init(json: bool, log_json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let res = if log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = res {
        eprintln_line(&format!("failed to initialise logging: {e}"));
    }
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

pub fn render<T: Serialize>(value: &T) -> anyhow::Result<String> {
    if is_json() {
        Ok(serde_json::to_string(value)?)
    } else {
        Ok(serde_json::to_string_pretty(value)?)
    }
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = render(value)?;
    println!("{s}");
    Ok(())
}

pub fn eprintln_line(msg: &str) {
    eprintln!("{msg}");
}

/// Print a failed command to stderr, tagged with the core error code when there is one.
pub fn report_error(err: &anyhow::Error) {
    match err.chain().find_map(|e| e.downcast_ref::<OcaError>()) {
        Some(core) => eprintln_line(&format!("error[{}]: {err:#}", core.code())),
        None => eprintln_line(&format!("error: {err:#}")),
    }
}
