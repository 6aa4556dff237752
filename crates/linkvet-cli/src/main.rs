//! Entrypoint for the `linkvet` binary.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match linkvet_cli::run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
