use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use ll_core::ActivityRegistry;
use ll_store::{RecordStore, player_key};
use tracing_subscriber::EnvFilter;

use ll_cli::commands::reclaim::ReclaimedItem;
use ll_cli::commands::{
    activities, clear, ingest, list, migrate, playback, reclaim, show, status, util,
};
use ll_cli::{Cli, Commands, Config};

/// Load config and open the store for the configured player.
fn open_store(config_path: Option<&Path>) -> Result<(RecordStore, Config)> {
    let config = load_config(config_path)?;
    let store = util::open_store(&config)?;
    Ok((store, config))
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let registry = ActivityRegistry::builtin();
    for conflict in registry.conflicts() {
        tracing::debug!(%conflict, "builtin alias conflict");
    }
    let mut stdout = io::stdout().lock();

    match cli.command {
        Some(Commands::Status) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            status::run(&mut stdout, &store)?;
        }
        Some(Commands::List { json }) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            list::run(&mut stdout, &store, registry, json)?;
        }
        Some(Commands::Activities { category }) => {
            // Only needs the builtin registry
            activities::run(&mut stdout, registry, category.as_deref())?;
        }
        Some(Commands::Show {
            name,
            reward_type,
            json,
        }) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            show::run(
                &mut stdout,
                &store,
                registry,
                &config,
                &name,
                reward_type,
                json,
            )?;
        }
        Some(Commands::Ingest) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            ingest::run(io::stdin().lock(), &mut stdout, &store, registry, &config)?;
        }
        Some(Commands::Reclaim {
            name,
            item_id,
            item_name,
            quantity,
            price,
            level,
            reward_type,
        }) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            let reward_type = util::reward_type_for(registry, &name, reward_type);
            let item = ReclaimedItem {
                id: item_id,
                name: item_name,
                quantity,
                price,
            };
            reclaim::run(&mut stdout, &store, &name, reward_type, level, item)?;
        }
        Some(Commands::Clear { name, reward_type }) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            clear::run(&mut stdout, &store, registry, &name, reward_type)?;
        }
        Some(Commands::Migrate { legacy }) => {
            let config = load_config(cli.config.as_deref())?;
            let Some(account) = config.player.as_deref() else {
                anyhow::bail!("no player configured to migrate into");
            };
            std::fs::create_dir_all(&config.data_dir)
                .with_context(|| format!("failed to create {}", config.data_dir.display()))?;
            let store = RecordStore::new(&config.data_dir);
            let key = player_key(account, config.profile.as_deref());
            migrate::run(&mut stdout, &store, &legacy, &key)?;
        }
        Some(Commands::Playback { name, reward_type }) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            playback::run(&mut stdout, &store, registry, &config, &name, reward_type)?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
