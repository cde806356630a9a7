//! tailwind-sync - Tailwind @source directives from the project graph

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = tailwind_sync::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
