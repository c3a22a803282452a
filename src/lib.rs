//! LIBRIS Application Library
//!
//! Wires the circulation engine, in-memory store, and HTTP modules into a
//! runnable service.

pub mod modules;

use anyhow::Context;

use libris_kernel::module::InitCtx;
use libris_kernel::settings::Settings;
use libris_kernel::ModuleRegistry;
use libris_store::MemoryStore;

/// Load settings, wire the modules, and serve until shutdown.
pub async fn run() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load LIBRIS settings")?;
    libris_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        "libris-app bootstrap starting"
    );

    let store = MemoryStore::new();
    let registry = build_registry(&store, &settings);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    libris_http::start_server(&registry, &settings).await?;

    registry.stop_modules().await?;
    Ok(())
}

/// Register all application modules over one shared store.
pub fn build_registry(store: &MemoryStore, settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store, settings);
    registry
}
