pub mod use_cases;

pub use use_cases::data_ingestion::{DataIngestionUseCase, UploadReceipt};
pub use use_cases::data_retrieval::{DataRetrievalUseCase, DATA_ENDPOINT};
pub use use_cases::normalizer::Normalizer;
