//! Binary entrypoint for the `dockerize` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    // Recording and replay are handled in commands::dispatch via
    // DOCKERIZE_RECORD=<dir> and DOCKERIZE_REPLAY=<cassette>.
    match dockerize::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
