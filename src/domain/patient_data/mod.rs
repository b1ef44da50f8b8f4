// ============================================================
// PATIENT DATA DOMAIN LAYER
// ============================================================
// Records, datasets and access tokens for uploaded patient files
// No I/O, no async

mod access_token;
mod raw_table;
mod record;

pub use access_token::AccessToken;
pub use raw_table::{RawTable, SourceFormat};
pub use record::{Dataset, FieldValue, Record};
