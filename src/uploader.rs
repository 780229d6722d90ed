//! Upload flow and local document removal.
//!
//! The files in a selection are sent concurrently, so results arrive in
//! whatever order the server finishes them. Each success appends one record
//! to the store; failures only produce an alert.
//!
//! Removal is local: it edits the document list and never calls the server.

use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;

use crate::backend::Backend;
use crate::error::ClientError;
use crate::models::{DocumentId, DocumentRecord, FileHandle};
use crate::notify::Notifier;
use crate::store::{self, SharedStore};

/// Result of uploading one file.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Uploaded {
        id: DocumentId,
        filename: String,
        chunks: u64,
    },
    Failed {
        file: String,
        error: ClientError,
    },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { .. })
    }
}

/// Result of a removal request.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    Removed(DocumentRecord),
    Cancelled,
    NotFound,
}

#[derive(Clone)]
pub struct Uploader {
    backend: Arc<dyn Backend>,
    store: SharedStore,
    notifier: Arc<dyn Notifier>,
}

impl Uploader {
    pub fn new(backend: Arc<dyn Backend>, store: SharedStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            store,
            notifier,
        }
    }

    /// Uploads every file concurrently and waits for all of them.
    ///
    /// Outcomes are returned in the order the files were given. The store is
    /// updated as each response arrives.
    pub async fn submit_files(&self, files: Vec<FileHandle>) -> Vec<UploadOutcome> {
        if files.is_empty() {
            return Vec::new();
        }
        join_all(files.into_iter().map(|file| self.upload_document(file))).await
    }

    /// Uploads a single file and reflects the result in the store.
    pub async fn upload_document(&self, file: FileHandle) -> UploadOutcome {
        match self.backend.upload(&file).await {
            Ok(ack) => {
                let id = store::lock(&self.store).add_document(
                    ack.filename.clone(),
                    file.mime_type.clone(),
                    file.size_bytes(),
                    Utc::now(),
                );
                self.notifier.alert(&format!(
                    "File {} uploaded successfully! Processed {} chunks.",
                    ack.filename, ack.chunks
                ));
                UploadOutcome::Uploaded {
                    id,
                    filename: ack.filename,
                    chunks: ack.chunks,
                }
            }
            Err(error) => {
                match &error {
                    ClientError::Server(message) => {
                        self.notifier.alert(&format!("Error: {}", message));
                    }
                    other => {
                        tracing::error!(file = %file.name, error = %other, "upload failed");
                        self.notifier.alert("Error uploading file");
                    }
                }
                UploadOutcome::Failed {
                    file: file.name,
                    error,
                }
            }
        }
    }

    /// Removes a document from the list after the user confirms.
    pub fn remove_document(&self, id: DocumentId) -> RemoveOutcome {
        let name = match store::lock(&self.store).document(id) {
            Some(doc) => doc.name.clone(),
            None => return RemoveOutcome::NotFound,
        };

        if !self
            .notifier
            .confirm(&format!("Are you sure you want to remove {}?", name))
        {
            return RemoveOutcome::Cancelled;
        }

        match store::lock(&self.store).remove_document(id) {
            Some(record) => {
                tracing::info!(document = %record.name, "document removed from list");
                RemoveOutcome::Removed(record)
            }
            None => RemoveOutcome::NotFound,
        }
    }
}
