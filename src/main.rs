use std::process::ExitCode;

use clap::Parser;

use mediary::lifecycle::startup::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    startup::run(Cli::parse()).await
}
