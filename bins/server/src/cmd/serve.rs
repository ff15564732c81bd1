use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use replica_api::ChangeFeed;
use replica_engine::{
    BulkLoader, ChangeFeedConsumer, ensure_sor_ready, select_backend, spawn_consumer_task,
};
use sor_client::{DatabusClient, SorClient};

use crate::config::{ServeArgs, ServerConfig};
use crate::error::ServerError;

/// Сколько ждать завершения задач после Ctrl+C.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn run(args: ServeArgs) -> Result<(), ServerError> {
    tracing::info!("replica-server starting");

    // --- Load config ---
    let config = ServerConfig::load(&args.config)?;
    tracing::info!(config = %args.config, "loaded config");

    // --- Collaborator clients ---
    let sor = Arc::new(SorClient::new(config.sor.clone())?);
    let databus = Arc::new(DatabusClient::new(&config.sor, config.databus.clone())?);

    // --- Startup gate ---
    ensure_sor_ready(&*sor).await?;

    // --- Backend ---
    let backend = select_backend(config.elastic.clone()).await;
    let index = backend.index();
    tracing::info!(backend = index.name(), "index backend selected");

    // --- Initial load ---
    let loader = BulkLoader::new(sor.clone(), index.clone(), config.sor.bulk_limit);
    if let Err(e) = loader.load().await {
        tracing::error!(error = %e, "bulk load incomplete, serving what was applied");
    }

    // --- Change feed ---
    match databus.subscribe().await {
        Ok(()) => tracing::info!(subscription = %config.databus.subscription, "subscribed to change feed"),
        Err(e) => tracing::warn!(error = %e, "subscribe failed, continuing"),
    }

    // --- Query gateway port ---
    let listener = replica_gateway::bind(config.api_port).await.map_err(ServerError::Gateway)?;

    let token = CancellationToken::new();
    let consumer = ChangeFeedConsumer::new(databus, index.clone(), config.consumer.clone());
    let consumer_handle = spawn_consumer_task(consumer, token.clone());

    // --- Query gateway ---
    let api_index = index.clone();
    let api_token = token.clone();
    let api_handle = tokio::spawn(async move {
        if let Err(e) = replica_gateway::serve(listener, api_index, api_token).await {
            tracing::error!(error = %e, "query gateway error");
        }
    });

    tracing::info!(port = config.api_port, "server ready");

    // --- Ожидание Ctrl+C ---
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down...");

    token.cancel();

    for (name, mut handle) in [("consumer", consumer_handle), ("gateway", api_handle)] {
        if tokio::time::timeout(DRAIN_TIMEOUT, &mut handle).await.is_err() {
            tracing::warn!(task = name, "task did not stop in time, aborting");
            handle.abort();
        }
    }

    tracing::info!("shutdown complete");
    Ok(())
}
