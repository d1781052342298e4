use std::process::ExitCode;

fn main() -> ExitCode {
    match owld::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("owld: {error}");
            ExitCode::FAILURE
        }
    }
}
