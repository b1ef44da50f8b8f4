use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;

use crate::domain::error::{AppError, Result};

/// Form field the upload is expected under.
pub const UPLOAD_FIELD: &str = "file";

fn malformed(err: impl std::fmt::Display) -> AppError {
    AppError::ValidationError(format!("Malformed multipart body: {}", err))
}

async fn read_field(field: &mut Field) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Pull the uploaded file out of a multipart body.
///
/// The `file` field wins; otherwise the first part with a filename is used.
pub async fn read_upload_file(mut payload: Multipart) -> Result<(String, Vec<u8>)> {
    let mut fallback: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let disposition = field.content_disposition();
        let is_upload_field = disposition.get_name() == Some(UPLOAD_FIELD);
        let file_name = disposition.get_filename().map(str::to_string);

        let bytes = read_field(&mut field).await?;

        match file_name {
            Some(name) if is_upload_field => return Ok((name, bytes)),
            None if is_upload_field => return Ok((String::new(), bytes)),
            Some(name) if fallback.is_none() => fallback = Some((name, bytes)),
            _ => {}
        }
    }

    fallback.ok_or_else(|| {
        AppError::ValidationError(format!(
            "No file uploaded; expected a multipart field named '{}'",
            UPLOAD_FIELD
        ))
    })
}
