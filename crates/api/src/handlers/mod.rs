pub mod auth;
pub mod events;
pub mod users;

use axum::extract::multipart::Field;

use crate::{middleware::error_handling::AppError, services::UploadedFile};

/// Reads a multipart file part. A part without a file name and without
/// content (an untouched file input) counts as no file at all.
pub(crate) async fn read_file_field(field: Field<'_>) -> Result<Option<UploadedFile>, AppError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let data = field.bytes().await?.to_vec();

    if filename.is_empty() && data.is_empty() {
        return Ok(None);
    }

    Ok(Some(UploadedFile { filename, data }))
}
