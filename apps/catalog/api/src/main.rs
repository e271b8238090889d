use axum_helpers::server::{create_production_app, create_router};
use catalog_api::api;
use catalog_api::config::{Config, StorageBackend};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{self, DatabaseConnection};
use domain_products::{
    InMemoryProductRepository, MokaProductCache, PgProductRepository, ProductService,
};
use migration::Migrator;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let cache = Arc::new(MokaProductCache::new(&config.cache));
    info!(
        capacity = config.cache.max_capacity,
        ttl = ?config.cache.ttl,
        evict_all_on_delete = config.cache.evict_all_on_delete,
        "Product cache configured"
    );

    let (api_routes, db): (_, Option<DatabaseConnection>) = match config.storage {
        StorageBackend::Postgres => {
            let db_config = config
                .database
                .clone()
                .ok_or_else(|| eyre::eyre!("Postgres backend selected without database settings"))?;

            let db = postgres::connect_from_config_with_retry(db_config, None)
                .await
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

            if config.run_migrations {
                postgres::run_migrations::<Migrator>(&db, "catalog_api")
                    .await
                    .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;
            }

            let service = ProductService::new(PgProductRepository::new(db.clone()), cache)
                .with_evict_all_on_delete(config.cache.evict_all_on_delete);
            (api::routes(service), Some(db))
        }
        StorageBackend::Memory => {
            info!("Using in-memory product storage; data is lost on restart");
            let service = ProductService::new(InMemoryProductRepository::new(), cache)
                .with_evict_all_on_delete(config.cache.evict_all_on_delete);
            (api::routes(service), None)
        }
    };

    let router = create_router(api_routes);

    info!(
        storage = %config.storage,
        "Starting catalog API ({:?} shutdown timeout)",
        config.server.shutdown_timeout
    );

    create_production_app(router, &config.server, async move {
        let Some(db) = db else {
            return;
        };

        info!("Shutting down: closing database connection");
        match db.close().await {
            Ok(_) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog API shutdown complete");
    Ok(())
}
