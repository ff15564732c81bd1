use replica_api::{ChangeFeed, SystemOfRecord};
use replica_engine::ensure_sor_ready;
use sor_client::{DatabusClient, SorClient};

use crate::config::{ProvisionArgs, ServerConfig};
use crate::error::ServerError;

/// Пересоздать таблицу с чистого листа. Drop и unsubscribe могут
/// не пройти на свежей установке, это не ошибка.
pub async fn run(args: ProvisionArgs) -> Result<(), ServerError> {
    let config = ServerConfig::load(&args.config)?;
    let table = config.sor.table.clone();
    let sor = SorClient::new(config.sor.clone())?;
    let databus = DatabusClient::new(&config.sor, config.databus.clone())?;

    ensure_sor_ready(&sor).await?;

    match sor.drop_table().await {
        Ok(()) => tracing::info!(%table, "table dropped"),
        Err(e) => tracing::warn!(%table, error = %e, "table not dropped, continuing"),
    }
    match databus.unsubscribe().await {
        Ok(()) => tracing::info!(subscription = %config.databus.subscription, "subscription removed"),
        Err(e) => tracing::warn!(error = %e, "unsubscribe failed, continuing"),
    }

    sor.create_table().await?;
    tracing::info!(%table, placement = %config.sor.placement, "table created");

    match sor.table_size().await {
        Ok(size) => tracing::info!(%table, size, "table size"),
        Err(e) => tracing::warn!(%table, error = %e, "table size unavailable"),
    }
    Ok(())
}
