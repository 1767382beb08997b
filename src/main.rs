use std::process::ExitCode;

fn main() -> ExitCode {
    match bracket_engine::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("bracket-engine: {e}");
            ExitCode::FAILURE
        }
    }
}
