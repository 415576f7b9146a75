use std::path::Path;

use anyhow::Result;
use tracing::info;

use locale_service::config::Config;
use locale_service::i18n::ModuleRegistry;
use locale_service::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_service=info".parse()?),
        )
        .init();

    info!("Starting locale resolution service");

    // Load configuration from environment
    let config = Config::from_env()?;

    // Build the module registry once; it is read-only for the process lifetime
    let registry = match &config.locales_dir {
        Some(dir) => {
            info!("Loading translation modules from {}", dir);
            ModuleRegistry::load_dir(Path::new(dir))?
        }
        None => ModuleRegistry::builtin(),
    };
    info!("Registry ready with {} modules", registry.len());

    server::serve(&config, registry).await
}
