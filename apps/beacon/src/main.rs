mod cli;
mod commands;
mod watch;

use std::rc::Rc;

use clap::Parser;
use cli::CliArgs;
use color_eyre::Result;
use log::debug;
use techno_beacon::config::AppConfig;
use techno_beacon::storage::{FileStore, Namespaced};
use techno_beacon::{Catalog, StorageEvents};

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();

    let config = AppConfig::from_env();
    env_logger::Builder::new()
        .parse_filters(&config.log_filter)
        .init();
    debug!("resolved config: {config:?}");

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::builtin()?,
    };

    let store = FileStore::open(config.store_path.clone())?;
    debug!("using store {}", store.path().display());
    let substrate = Namespaced::new(Rc::new(store), config.namespace);
    debug!("keys prefixed with {:?}", substrate.prefix());

    let events = StorageEvents::new();
    commands::run(args.command, Rc::new(catalog), substrate, &events).await
}
