mod backend;
mod commands;
mod config;
mod error;
mod render;

use crate::{
    backend::{HttpBackend, MemoryBackend},
    config::StoreKind,
    error::Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    let (settings, command) = config::load()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "si2g_assistant={level},engine={level},store_client={level}",
            level = settings.level
        ))
        .init();

    let output = match settings.store {
        StoreKind::Http => {
            let backend = HttpBackend::new(&settings)?;
            commands::run(&backend, &settings, command).await?
        }
        StoreKind::Memory => {
            let backend = MemoryBackend::new(settings.seed.clone())?;
            commands::run(&backend, &settings, command).await?
        }
    };
    println!("{output}");

    Ok(())
}
