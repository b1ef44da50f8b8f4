pub mod error;

// Uploaded patient data
pub mod patient_data;
