//! Command execution.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use casino_core::CredentialStore;
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::config::{default_config_path, load_config, write_config, CasinoConfig};
use crate::helpers::resolve_passphrase;
use crate::logging;
use crate::server::Server;
use crate::state::AppState;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref().map(PathBuf::from);

    match &cli.command {
        None | Some(Commands::Serve) => {
            let config = effective_config(&cli, config_path.as_deref())?;
            let _guard = logging::init(&config.logging)?;
            serve(&cli, &config)
        }
        Some(Commands::Init { path, force }) => {
            let target = match path.as_deref().map(PathBuf::from).or(config_path) {
                Some(target) => target,
                None => default_config_path()?,
            };
            init(&cli, &target, *force)
        }
        Some(Commands::Users) => {
            let config = effective_config(&cli, config_path.as_deref())?;
            let store = open_store(&cli, &config, false)?;
            for username in store.usernames()? {
                println!("{}", username);
            }
            Ok(())
        }
    }
}

fn effective_config(cli: &Cli, path: Option<&Path>) -> anyhow::Result<CasinoConfig> {
    let mut config = load_config(path)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    Ok(config)
}

fn open_store(cli: &Cli, config: &CasinoConfig, confirm: bool) -> anyhow::Result<CredentialStore> {
    let passphrase = resolve_passphrase(
        cli.passphrase.as_deref(),
        config.storage.passphrase.as_deref(),
        confirm,
    )?;
    let path = Path::new(&config.storage.path);
    CredentialStore::open(path, &passphrase, config.storage.store_options())
        .map_err(|e| anyhow::anyhow!("Failed to open credential file {}: {}", path.display(), e))
}

fn serve(cli: &Cli, config: &CasinoConfig) -> anyhow::Result<()> {
    let options = config.server.options()?;
    let store = open_store(cli, config, false)?;
    info!(path = %config.storage.path, "credential file ready");

    let state = Arc::new(AppState::new(store));
    let address = config.server.address();
    let server = Server::bind(address.as_str(), state, options)
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", address, e))?;

    if !cli.quiet {
        eprintln!("Casino listening on http://{}", server.local_addr()?);
    }
    server.run()?;
    Ok(())
}

fn init(cli: &Cli, target: &Path, force: bool) -> anyhow::Result<()> {
    if target.exists() && !force {
        return Err(anyhow::anyhow!(
            "Config already exists at {} (use --force to overwrite)",
            target.display()
        ));
    }

    let mut config = CasinoConfig::default();
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    write_config(target, &config)?;

    let store = open_store(cli, &config, true)?;
    if !cli.quiet {
        println!("Wrote config to {}", target.display());
        println!("Credential file ready at {}", store.path()?.display());
    }
    Ok(())
}
