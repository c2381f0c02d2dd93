//! Fleet Ops - Pilot and drone scheduling for field operations

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = fleetops::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
