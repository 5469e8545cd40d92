//! Proof uploads: evidence files stored on disk with metadata in the store.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;

use relief_core::config::UploadConfig;
use relief_core::error::{ReliefError, ReliefResult};
use relief_models::models::proof::NewProof;
use relief_models::{Proof, ProofStatus, Store};

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState, StateCell};

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub original_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub description: Option<String>,
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    // Only the last path component is kept.
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "file".to_string()
    } else {
        cleaned
    }
}

pub struct ProofService {
    state: StateCell,
    store: Store,
    event_bus: EventBus,
    upload_dir: PathBuf,
    limits: UploadConfig,
}

impl ProofService {
    pub fn new(store: Store, event_bus: EventBus, upload_dir: PathBuf, limits: UploadConfig) -> Self {
        Self {
            state: StateCell::new(),
            store,
            event_bus,
            upload_dir,
            limits,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn max_file_size(&self) -> u64 {
        self.limits.max_file_size_bytes
    }

    pub async fn list(&self, campaign_id: u64) -> ReliefResult<Vec<Proof>> {
        self.store.proofs_for(campaign_id).await
    }

    fn check_upload(&self, upload: &Upload) -> ReliefResult<()> {
        let size = upload.bytes.len() as u64;
        if size == 0 {
            return Err(ReliefError::Upload("file is empty".into()));
        }
        if size > self.limits.max_file_size_bytes {
            return Err(ReliefError::PayloadTooLarge {
                size,
                limit: self.limits.max_file_size_bytes,
            });
        }
        let mime = upload.mime_type.to_ascii_lowercase();
        if !self
            .limits
            .allowed_mime_prefixes
            .iter()
            .any(|prefix| mime.starts_with(&prefix.to_ascii_lowercase()))
        {
            return Err(ReliefError::Upload(format!(
                "file type {} is not accepted",
                upload.mime_type
            )));
        }
        Ok(())
    }

    /// Validate, write to disk, and record an uploaded proof.
    pub async fn store_upload(&self, campaign_id: u64, upload: Upload) -> ReliefResult<Proof> {
        self.store.campaign(campaign_id).await?;
        self.check_upload(&upload)?;

        let file_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(&upload.original_name));
        let path = self.upload_dir.join(&file_name);
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::write(&path, &upload.bytes).await?;
        debug!("wrote {} bytes to {}", upload.bytes.len(), path.display());

        let new = NewProof {
            campaign_id,
            file_name,
            original_name: upload.original_name,
            mime_type: upload.mime_type,
            size: upload.bytes.len() as u64,
            description: upload.description.filter(|d| !d.trim().is_empty()),
        };
        let proof = match self.store.insert_proof(new).await {
            Ok(proof) => proof,
            Err(e) => {
                // Don't leave orphaned files behind.
                if let Err(rm) = tokio::fs::remove_file(&path).await {
                    warn!("failed to remove {}: {rm}", path.display());
                }
                return Err(e);
            }
        };

        info!("proof {} stored for campaign {campaign_id}", proof.id);
        self.event_bus.emit(AppEvent::ProofUploaded {
            campaign_id,
            proof_id: proof.id,
        });
        Ok(proof)
    }

    /// Mark a proof verified, rejected, or back to pending.
    pub async fn set_status(&self, proof_id: u64, status: ProofStatus) -> ReliefResult<Proof> {
        let proof = self.store.set_proof_status(proof_id, status).await?;
        self.event_bus.emit(AppEvent::ProofStatusChanged { proof_id, status });
        Ok(proof)
    }
}

impl Service for ProofService {
    fn name(&self) -> &str {
        "proof"
    }

    fn state(&self) -> ServiceState {
        self.state.get()
    }

    fn init(&self) -> ReliefResult<()> {
        self.state.set(ServiceState::Initializing);
        if let Err(e) = std::fs::create_dir_all(&self.upload_dir) {
            self.state.set(ServiceState::Failed);
            return Err(ReliefError::ServiceInit(format!(
                "cannot create upload directory {}: {e}",
                self.upload_dir.display()
            )));
        }
        info!("proof uploads stored in {}", self.upload_dir.display());
        self.state.set(ServiceState::Running);
        Ok(())
    }

    fn shutdown(&self) -> ReliefResult<()> {
        self.state.set(ServiceState::Stopped);
        Ok(())
    }
}
