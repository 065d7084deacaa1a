//! Compliance document upload and removal.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use licensedesk_core::{Clock, DocumentId, LicenseId, position_of};
use licensedesk_inventory::document::check_upload_size;
use licensedesk_inventory::{DEFAULT_MAX_DOCUMENT_BYTES, Document, DocumentUpload};

use crate::error::ServiceResult;
use crate::medium::PersistenceMedium;
use crate::store::{EntityStore, WriteReport};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    /// The document as persisted (its payload may be a placeholder).
    pub document: Document,
    pub write: WriteReport,
}

pub struct DocumentService<M> {
    store: Arc<EntityStore<M>>,
    clock: Arc<dyn Clock>,
    max_document_bytes: u64,
}

impl<M> DocumentService<M>
where
    M: PersistenceMedium,
{
    pub fn new(store: Arc<EntityStore<M>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }

    pub fn with_max_document_bytes(mut self, max: u64) -> Self {
        self.max_document_bytes = max;
        self
    }

    /// Attach an uploaded document to a license.
    ///
    /// Oversized uploads are rejected before the store is touched. Returns
    /// `Ok(None)` when the license does not exist.
    pub fn upload(&self, license_id: &LicenseId, upload: DocumentUpload) -> ServiceResult<Option<UploadOutcome>> {
        let size = upload.bytes.len() as u64;
        if let Err(e) = check_upload_size(size, self.max_document_bytes) {
            warn!(license_id = %license_id, size, max = self.max_document_bytes, "document upload rejected");
            return Err(e.into());
        }

        let document = Document::from_upload(
            DocumentId::generate(),
            upload,
            self.clock.now(),
            self.max_document_bytes,
        )?;

        let mut licenses = self.store.read_all_licenses()?;
        let Some(index) = position_of(&licenses, license_id) else {
            debug!(license_id = %license_id, "upload to unknown license ignored");
            return Ok(None);
        };
        let mut stored = document.clone();
        licenses[index].documents.push(document);

        let write = self.store.write_all_licenses(&licenses)?;
        // Report the persisted form, which reflects any placeholder swap.
        if write.degraded.iter().any(|d| d.document_id == stored.id) {
            stored.degrade_payload();
        }
        info!(
            license_id = %license_id,
            document_id = %stored.id,
            size,
            placeholder = stored.is_placeholder(),
            "document uploaded"
        );

        Ok(Some(UploadOutcome {
            document: stored,
            write,
        }))
    }

    /// Remove one document; `false` when the license or document is absent.
    pub fn delete(&self, license_id: &LicenseId, document_id: &DocumentId) -> ServiceResult<bool> {
        let mut licenses = self.store.read_all_licenses()?;
        let Some(index) = position_of(&licenses, license_id) else {
            debug!(license_id = %license_id, "document delete on unknown license ignored");
            return Ok(false);
        };
        if !licenses[index].remove_document(document_id) {
            debug!(license_id = %license_id, document_id = %document_id, "delete of unknown document ignored");
            return Ok(false);
        }
        self.store.write_all_licenses(&licenses)?;
        info!(license_id = %license_id, document_id = %document_id, "document deleted");
        Ok(true)
    }
}
