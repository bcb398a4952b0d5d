use anyhow::Result;

use crate::args::{Cli, Command};

mod draft;
mod overlay;
mod said;
mod secure;
mod verify;

pub fn dispatch(cli: Cli) -> Result<()> {
    let cfg = cli.core_config();
    match cli.command {
        Command::Draft { schema, out } => draft::run(&schema, out.as_deref()),
        Command::Secure { bundle, out } => secure::run(cfg, &bundle, out.as_deref()),
        Command::Verify { bundle } => verify::run(cfg, &bundle),
        Command::Overlay { bundle, type_tag } => overlay::run(cfg, &bundle, &type_tag),
        Command::Said { record } => said::run(cfg, &record),
    }
}
