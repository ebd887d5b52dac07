use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    tc_cli::run().await
}
