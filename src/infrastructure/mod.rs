pub mod bootstrap;
pub mod config;
pub mod storage;
pub mod tabular;
pub mod token_store;
