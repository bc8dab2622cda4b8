use anyhow::Result;
use bucket_list::{
    config::AppConfig,
    services::{bucket_list_service::BucketListService, persistence::Persistence},
};
use std::io::ErrorKind;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting bucket-list with config: {:?}", cfg);

    // --- Initialize state ---
    let service = match &cfg.database_url {
        Some(db_url) => {
            tracing::debug!("Connecting using raw URL => {}", db_url);
            let persistence = Persistence::connect(db_url).await?;

            // --- Handle migration mode ---
            if migrate {
                persistence.migrate().await?;
                tracing::info!("Database migration complete.");
                return Ok(()); // exit after migration
            }

            BucketListService::with_persistence(persistence).await?
        }
        None => {
            tracing::warn!("Running in memory; state is lost on shutdown");
            BucketListService::in_memory()
        }
    };

    // --- Build router ---
    let app = bucket_list::app(service);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
