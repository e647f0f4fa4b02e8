//! XRSCOPE entry point.
//!
//! Bootstraps the OpenXR runtime -- extension catalog, capability
//! negotiation, instance creation, system discovery -- then runs the
//! interactive command loop: stdin lines feed a background worker until
//! `exit` or end-of-input. Type `help` for the available commands.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use xrscope_runtime::{ExtensionCatalog, OpenXrEntry, bootstrap, negotiate};
use xrscope_shell::{CommandRegistry, command_queue, pump_lines, register_builtins, spawn_worker};
use xrscope_types::config::XrscopeConfig;
use xrscope_types::model::DeviceClass;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Resolve config from the CLI arg, XRSCOPE_CONFIG, or defaults.
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("XRSCOPE_CONFIG").ok());
    let config = match &config_path {
        Some(path) => XrscopeConfig::load(Path::new(path))
            .with_context(|| format!("loading config {path}"))?,
        None => XrscopeConfig::default(),
    };
    log::info!("starting xrscope (app={})", config.application.name);

    let entry =
        OpenXrEntry::open(config.loader_path.as_deref()).context("opening OpenXR loader")?;

    let catalog = ExtensionCatalog::query(&entry).context("querying extension catalog")?;
    log::info!("runtime supports {} extension(s)", catalog.len());

    let negotiated = negotiate(&catalog, &config.extensions);

    let context = bootstrap(
        &entry,
        &config.application,
        negotiated,
        DeviceClass::HeadMountedDisplay,
    )
    .context("bootstrapping runtime instance")?;

    let mut registry = CommandRegistry::new();
    register_builtins(&mut registry);

    let (queue, worker_queue) = command_queue();
    let worker =
        spawn_worker(registry, context, worker_queue).context("spawning command worker")?;

    // The foreground blocks on line input for the rest of the process.
    let stdin = io::stdin();
    pump_lines(stdin.lock(), &queue);
    drop(queue);

    if worker.join().is_err() {
        log::error!("command worker panicked");
    }
    Ok(())
}
