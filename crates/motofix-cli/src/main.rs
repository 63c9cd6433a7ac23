//! Motofix command-line client
//!
//! Drives the Motofix SDK from a terminal:
//!
//! - `motofix otp <phone>`              request a one-time code
//! - `motofix login <phone> <code>`     sign in and cache the session
//! - `motofix whoami`                   show and verify the cached session
//! - `motofix request new ...`          report a breakdown
//! - `motofix request list`             track your requests
//! - `motofix geocode <lat> <lon>`      look up an address
//!
//! Set `RUST_LOG=debug` (or pass `--verbose`) for request-level logging.

mod args;
mod commands;
mod console;
mod router;

use args::Cli;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    router::route(cli).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
        let cli = Cli::try_parse_from(["motofix", "whoami", "--offline"]).unwrap();
        assert!(!cli.verbose);
    }
}
