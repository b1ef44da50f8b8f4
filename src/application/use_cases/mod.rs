pub mod data_ingestion;
pub mod data_retrieval;
pub mod normalizer;
