//! Proof endpoints: multipart upload, listing, and review status.

use std::path::Path;

use reqwest::multipart::{Form, Part};

use relief_core::constants::PROOF_FIELD;
use relief_core::error::{ReliefError, ReliefResult};
use relief_models::{Proof, ProofStatus, ProofStatusUpdate};

use crate::client::ApiClient;

/// A file to upload as proof of delivery.
#[derive(Debug, Clone)]
pub struct ProofFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ProofFile {
    /// Read a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: &Path) -> ReliefResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ReliefError::InvalidInput(format!("not a file: {}", path.display())))?;
        Ok(Self {
            mime_type: guess_mime(&file_name).to_string(),
            file_name,
            bytes,
        })
    }
}

/// MIME type for the common proof formats. Unknown extensions are sent as
/// octet-stream and left for the server to accept or refuse.
pub fn guess_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

impl ApiClient {
    /// `GET /api/campaigns/:id/proofs`.
    pub async fn proofs(&self, campaign_id: u64) -> ReliefResult<Vec<Proof>> {
        self.get_json(&format!("/api/campaigns/{campaign_id}/proofs"))
            .await
    }

    /// `POST /api/campaigns/:id/proofs` as `multipart/form-data`.
    pub async fn upload_proof(
        &self,
        campaign_id: u64,
        file: ProofFile,
        description: Option<&str>,
    ) -> ReliefResult<Proof> {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.mime_type)
            .map_err(|e| ReliefError::InvalidInput(format!("invalid mime type {}: {e}", file.mime_type)))?;
        let mut form = Form::new().part(PROOF_FIELD, part);
        if let Some(text) = description {
            form = form.text("description", text.to_string());
        }

        let resp = self
            .post_multipart(&format!("/api/campaigns/{campaign_id}/proofs"), form)
            .await?;
        ApiClient::parse_response(resp).await
    }

    /// `PATCH /api/proofs/:id`.
    pub async fn set_proof_status(&self, proof_id: u64, status: ProofStatus) -> ReliefResult<Proof> {
        self.patch_json(&format!("/api/proofs/{proof_id}"), &ProofStatusUpdate { status })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime("receipt.PDF"), "application/pdf");
        assert_eq!(guess_mime("camp.jpeg"), "image/jpeg");
        assert_eq!(guess_mime("clip.mov"), "video/quicktime");
        assert_eq!(guess_mime("README"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("site photo.png");
        std::fs::write(&path, b"png").unwrap();

        let file = ProofFile::from_path(&path).await.unwrap();
        assert_eq!(file.file_name, "site photo.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.bytes, b"png");
    }
}
