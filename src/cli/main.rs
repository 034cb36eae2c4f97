use std::process::ExitCode;

use ixa_seirv::runner::run_with_args;

fn main() -> ExitCode {
    match run_with_args() {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
