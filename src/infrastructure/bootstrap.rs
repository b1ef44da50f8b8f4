use std::sync::Arc;

use tracing::{error, info};

use crate::application::{DataIngestionUseCase, DataRetrievalUseCase};
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::storage::{ensure_storage_root, DatasetStore, JsonFileDatasetStore};
use crate::infrastructure::token_store::{InMemoryTokenStore, TokenStore};
use crate::interfaces::http::HttpState;

/// Create the storage directory and wire stores into the use cases.
pub fn setup(config: &AppConfig) -> Result<HttpState> {
    let storage_dir = ensure_storage_root(&config.storage_path()).map_err(|err| {
        error!(
            error = %err,
            storage_dir = %config.storage_dir,
            "Failed to create storage dir"
        );
        err
    })?;
    info!(storage_dir = %storage_dir.display(), "Dataset storage ready");

    let tokens: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
    let datasets: Arc<dyn DatasetStore> = Arc::new(JsonFileDatasetStore::new(storage_dir));

    Ok(build_state(tokens, datasets, &config.token_header))
}

pub fn build_state(
    tokens: Arc<dyn TokenStore>,
    datasets: Arc<dyn DatasetStore>,
    token_header: &str,
) -> HttpState {
    HttpState {
        ingestion: Arc::new(DataIngestionUseCase::new(tokens.clone(), datasets.clone())),
        retrieval: Arc::new(DataRetrievalUseCase::new(tokens, datasets)),
        token_header: token_header.to_string(),
    }
}
