use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::patient_data::{AccessToken, Dataset};
use crate::infrastructure::storage::DatasetStore;
use crate::infrastructure::token_store::TokenStore;

/// Path clients are pointed at after a successful upload.
pub const DATA_ENDPOINT: &str = "/api/v1/data";

pub struct DataRetrievalUseCase {
    tokens: Arc<dyn TokenStore>,
    datasets: Arc<dyn DatasetStore>,
}

impl DataRetrievalUseCase {
    pub fn new(tokens: Arc<dyn TokenStore>, datasets: Arc<dyn DatasetStore>) -> Self {
        Self { tokens, datasets }
    }

    /// Return the stored dataset for `token` unchanged.
    pub async fn execute(&self, token: Option<AccessToken>) -> Result<Dataset> {
        let token = match token {
            Some(token) if self.tokens.is_valid(&token) => token,
            _ => {
                warn!("Rejected data request with missing or unknown token");
                return Err(AppError::Forbidden(
                    "Invalid or missing access token.".to_string(),
                ));
            }
        };

        match self.datasets.load(&token).await {
            Ok(Some(dataset)) => {
                info!(
                    token = token.redacted(),
                    records = dataset.len(),
                    "Dataset retrieved"
                );
                Ok(dataset)
            }
            Ok(None) => Err(AppError::NotFound(
                "Data not found for this token.".to_string(),
            )),
            Err(e) => Err(AppError::Internal(format!(
                "Could not retrieve data: {}",
                e.detail()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient_data::{FieldValue, Record};
    use crate::infrastructure::storage::JsonFileDatasetStore;
    use crate::infrastructure::token_store::InMemoryTokenStore;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        tokens: Arc<InMemoryTokenStore>,
        store: Arc<JsonFileDatasetStore>,
        use_case: DataRetrievalUseCase,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let tokens = Arc::new(InMemoryTokenStore::new());
        let store = Arc::new(JsonFileDatasetStore::new(dir.path()));
        let use_case = DataRetrievalUseCase::new(tokens.clone(), store.clone());
        Fixture {
            _dir: dir,
            tokens,
            store,
            use_case,
        }
    }

    #[tokio::test]
    async fn test_missing_token_is_forbidden() {
        let f = fixture();
        let err = f.use_case.execute(None).await.unwrap_err();
        assert_eq!(
            err,
            AppError::Forbidden("Invalid or missing access token.".to_string())
        );
    }

    #[tokio::test]
    async fn test_unissued_token_is_forbidden_even_if_file_exists() {
        let f = fixture();
        let token = AccessToken::generate();
        f.store.save(&token, &Dataset::default()).await.unwrap();

        let err = f.use_case.execute(Some(token)).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_valid_token_without_dataset_is_not_found() {
        let f = fixture();
        let token = AccessToken::generate();
        f.tokens.register(&token);

        let err = f.use_case.execute(Some(token)).await.unwrap_err();
        assert_eq!(
            err,
            AppError::NotFound("Data not found for this token.".to_string())
        );
    }

    #[tokio::test]
    async fn test_valid_token_returns_stored_dataset() {
        let f = fixture();
        let token = AccessToken::generate();
        let mut record = Record::new();
        record.insert("insulin_uu_ml".to_string(), FieldValue::Float(8.2));
        let dataset = Dataset::new(vec![record]);
        f.store.save(&token, &dataset).await.unwrap();
        f.tokens.register(&token);

        assert_eq!(f.use_case.execute(Some(token)).await.unwrap(), dataset);
    }

    #[tokio::test]
    async fn test_unreadable_dataset_is_internal_error() {
        let f = fixture();
        let token = AccessToken::generate();
        std::fs::write(f.store.dataset_path(&token).unwrap(), b"[{").unwrap();
        f.tokens.register(&token);

        match f.use_case.execute(Some(token)).await.unwrap_err() {
            AppError::Internal(msg) => assert!(msg.starts_with("Could not retrieve data:")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
