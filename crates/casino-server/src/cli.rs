use clap::{Parser, Subcommand};

use casino_core::VERSION;

/// Casino - a hand-rolled HTTP game server with an encrypted user store
#[derive(Parser)]
#[command(name = "casino")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, env = "CASINO_CONFIG")]
    pub config: Option<String>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, global = true, env = "PORT")]
    pub port: Option<u16>,

    /// Passphrase protecting the credential file
    #[arg(long, global = true, env = "CASINO_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the server (default)
    Serve,

    /// Write a default config file and create the encrypted credential file
    Init {
        /// Where to write the config (defaults to the XDG config path)
        #[arg(value_name = "PATH")]
        path: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// List registered users
    Users,
}
