//! Casino - a hand-rolled HTTP game server with an encrypted user store.

use clap::Parser;

use casino_server::app;
use casino_server::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    app::run(cli)
}
