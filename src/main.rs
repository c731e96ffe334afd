use std::process::ExitCode;

fn main() -> ExitCode {
    match search_form::run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
