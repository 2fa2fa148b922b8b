use clap::Parser;
use smn_processor::cli::{run, Cli};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("Error: {}", error);
        process::exit(1);
    }
}
