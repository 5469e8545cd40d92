//! `multipart/form-data` parsing for proof uploads.
//!
//! The file arrives in the `proof` field; an optional `description` text
//! field may accompany it. Other fields are ignored.

use std::convert::Infallible;

use hyper::body::Bytes;
use tracing::debug;

use relief_core::constants::PROOF_FIELD;
use relief_core::error::{ReliefError, ReliefResult};
use relief_services::proof::Upload;

const DESCRIPTION_FIELD: &str = "description";
const FALLBACK_MIME: &str = "application/octet-stream";

/// Extract the proof upload from an already size-limited request body.
pub(crate) async fn parse_proof_upload(content_type: Option<&str>, body: Bytes) -> ReliefResult<Upload> {
    let content_type =
        content_type.ok_or_else(|| ReliefError::Upload("expected multipart/form-data".into()))?;
    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| ReliefError::Upload(format!("invalid multipart content type: {e}")))?;

    let stream = tokio_stream::once(Ok::<Bytes, Infallible>(body));
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ReliefError::Upload(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(PROOF_FIELD) => {
                let file_name = field.file_name().unwrap_or("proof").to_string();
                let mime = field
                    .content_type()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| FALLBACK_MIME.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ReliefError::Upload(format!("failed to read file: {e}")))?;
                file = Some((file_name, mime, bytes.to_vec()));
            }
            Some(DESCRIPTION_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ReliefError::Upload(format!("failed to read description: {e}")))?;
                description = Some(text).filter(|t| !t.trim().is_empty());
            }
            other => debug!("ignoring multipart field {other:?}"),
        }
    }

    let (original_name, mime_type, bytes) =
        file.ok_or_else(|| ReliefError::Upload(format!("no file in field \"{PROOF_FIELD}\"")))?;
    Ok(Upload {
        original_name,
        mime_type,
        bytes,
        description,
    })
}
