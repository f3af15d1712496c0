//! Palette Server - Dominant color palettes for remote images.
//!
//! This binary starts the HTTP server and configures all components.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use palette_server::{
    cache::{DurableStore, MemoryDurableStore, MemoryFastCache, RedisDurableStore, TieredCache},
    config::Config,
    fetch::HttpImageFetcher,
    server::{create_router, RouterConfig},
    service::PaletteService,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Palette Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Allowed hosts: {}", config.allowed_hosts().join(", "));
    info!("  Fast cache: {} entries", config.fast_cache_entries);
    info!("  Sample stride: {}", config.sample_stride);
    info!("  s-maxage: {}s", config.cache_max_age);

    let durable = match build_durable_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to connect to Redis: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let fast = Arc::new(MemoryFastCache::with_capacity(config.fast_cache_entries));
    let cache = TieredCache::new(fast, durable);

    let service = PaletteService::new(HttpImageFetcher::new(), cache)
        .with_stride(config.sample_stride());

    let router = create_router(service, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("    curl http://{}/health", addr);
    info!("    curl 'http://{}/?image=<url>&count=4'", addr);
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "palette_server=debug,tower_http=debug"
    } else {
        "palette_server=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect the durable tier, falling back to process memory without Redis.
async fn build_durable_store(
    config: &Config,
) -> Result<Arc<dyn DurableStore>, palette_server::CacheError> {
    match config.redis_url {
        Some(ref url) => {
            info!("  Durable cache: Redis");
            let store = RedisDurableStore::connect(url).await?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("  Durable cache: IN-MEMORY - palettes are lost on restart");
            warn!("        Configure for production: --redis-url=redis://<host>/");
            Ok(Arc::new(MemoryDurableStore::new()))
        }
    }
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_allowed_hosts(config.allowed_hosts())
        .with_cache_max_age(config.cache_max_age);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}
