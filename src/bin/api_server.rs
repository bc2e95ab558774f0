// src/bin/api_server.rs

use anyhow::Context;
use bytebooks_catalog::infra::config::{self, StorageKind};
use bytebooks_catalog::transport;
use bytebooks_catalog::{
    run_import, BookRepository, CatalogService, ImportOutcome, ImportSettings,
    InMemoryBookRepository, PostgresBookRepository,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // --- Repository Initialization ---
    let repo: Arc<dyn BookRepository> = match config::storage_kind()? {
        StorageKind::Postgres => {
            log::info!("Connecting to PostgreSQL...");
            let url = config::database_url()?;
            let max_connections = config::database_max_connections()?;
            let repo = PostgresBookRepository::connect(&url, max_connections)
                .await
                .context("failed to connect to the book store")?;
            Arc::new(repo)
        }
        StorageKind::Memory => {
            log::warn!("STORAGE=memory: books are kept in process and lost on exit");
            Arc::new(InMemoryBookRepository::new())
        }
    };

    // --- Bulk Import ---
    //
    // Runs to completion before the listener binds, so no request ever sees a half-loaded
    // catalog. Import problems are logged and never stop the server.
    let settings = ImportSettings::from_env()?;
    log::info!("CSV file path: {}", settings.file_path.display());
    match run_import(&settings, repo.as_ref()).await {
        ImportOutcome::Skipped => {}
        ImportOutcome::SourceUnavailable { reason } => {
            log::warn!("No books imported ({}); serving existing catalog", reason);
        }
        ImportOutcome::Completed(summary) => {
            log::info!(
                "Catalog import finished: {} imported, {} skipped{}",
                summary.imported,
                summary.failed,
                if summary.capped { " (row limit reached)" } else { "" }
            );
        }
    }

    let app_state = transport::http::AppState {
        catalog: Arc::new(CatalogService::new(repo)),
    };

    // --- API Server Initialization ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let bind_addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    log::info!("API server listening on http://{}", bind_addr);
    log::info!("Swagger UI available at http://{}/swagger-ui", bind_addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("Shutdown signal received, stopping");
        }
    }

    Ok(())
}
