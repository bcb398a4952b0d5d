use std::process::ExitCode;

mod args;
mod cmd;
mod io;
mod output;

fn main() -> ExitCode {
    let cli = args::Cli::parse_args();
    output::init(cli.json, cli.log_json);

    match cmd::dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::report_error(&err);
            ExitCode::FAILURE
        }
    }
}
