use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::data_retrieval::DATA_ENDPOINT;
use super::normalizer::Normalizer;
use crate::domain::error::{AppError, Result};
use crate::domain::patient_data::{AccessToken, Dataset};
use crate::infrastructure::storage::DatasetStore;
use crate::infrastructure::token_store::TokenStore;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File processed successfully.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadReceipt {
    pub message: String,
    pub token: AccessToken,
    pub endpoint: String,
}

/// Upload pipeline: normalize, store, then issue the token.
pub struct DataIngestionUseCase {
    normalizer: Normalizer,
    tokens: Arc<dyn TokenStore>,
    datasets: Arc<dyn DatasetStore>,
}

impl DataIngestionUseCase {
    pub fn new(tokens: Arc<dyn TokenStore>, datasets: Arc<dyn DatasetStore>) -> Self {
        Self {
            normalizer: Normalizer::new(),
            tokens,
            datasets,
        }
    }

    pub async fn execute(&self, file_name: String, bytes: Vec<u8>) -> Result<UploadReceipt> {
        let size_bytes = bytes.len();
        let normalizer = self.normalizer.clone();
        let name = file_name.clone();
        let dataset = tokio::task::spawn_blocking(move || normalizer.normalize(&name, bytes))
            .await
            .map_err(|e| AppError::Internal(format!("Unexpected error: {}", e)))?
            .map_err(|e| {
                warn!(file_name = %file_name, error = %e, "Upload rejected");
                e
            })?;

        let token = self.commit(&dataset).await.map_err(unexpected)?;

        info!(
            file_name = %file_name,
            size_bytes,
            records = dataset.len(),
            token = token.redacted(),
            "Upload stored"
        );

        Ok(UploadReceipt {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            token,
            endpoint: DATA_ENDPOINT.to_string(),
        })
    }

    /// Persist `dataset` under a fresh token and register the token only
    /// once the write has succeeded. On failure nothing is registered.
    pub async fn commit(&self, dataset: &Dataset) -> Result<AccessToken> {
        let mut token = AccessToken::generate();
        while self.tokens.is_valid(&token) {
            token = AccessToken::generate();
        }

        self.datasets.save(&token, dataset).await?;

        if !self.tokens.register(&token) {
            return Err(AppError::Internal(format!(
                "Token {} was issued twice",
                token.redacted()
            )));
        }
        Ok(token)
    }
}

fn unexpected(err: AppError) -> AppError {
    if err.is_client_error() {
        err
    } else {
        AppError::Internal(format!("Unexpected error: {}", err.detail()))
    }
}
