use replica_api::SystemOfRecord;

use crate::EngineError;

/// Startup gate: system-of-record должен отвечать на ping и быть здоров.
pub async fn ensure_sor_ready(sor: &dyn SystemOfRecord) -> Result<(), EngineError> {
    sor.ping()
        .await
        .map_err(|e| EngineError::Startup(format!("system-of-record unreachable: {e}")))?;
    sor.healthcheck()
        .await
        .map_err(|e| EngineError::Startup(format!("system-of-record unhealthy: {e}")))?;
    tracing::info!("system-of-record healthy");
    Ok(())
}
