#![forbid(unsafe_code)]

//! Binary entrypoint for the gamefinder CLI.

use std::process;

#[tokio::main]
async fn main() {
    let exit_code = gamefinder_cli::run().await;
    if exit_code != 0 {
        process::exit(exit_code);
    }
}
