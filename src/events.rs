//! Structured UI events and the dispatcher that routes them.
//!
//! Front ends translate their input (terminal commands, widget callbacks)
//! into [`UiEvent`]s and hand them to [`App::handle`]. Remove actions carry
//! a [`DocumentId`], never an encoded name.

use std::sync::Arc;

use crate::backend::Backend;
use crate::error::ClientError;
use crate::models::{DocumentId, FileHandle};
use crate::notify::Notifier;
use crate::query::{AskOutcome, QueryClient};
use crate::store::SharedStore;
use crate::uploader::{RemoveOutcome, UploadOutcome, Uploader};

/// Keys the question box reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other(char),
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Files picked through a file chooser.
    FilesSelected(Vec<FileHandle>),
    /// Files dropped on the drop zone.
    FilesDropped(Vec<FileHandle>),
    DragOver,
    DragLeave,
    /// The question box now holds `text`.
    QuestionEdited(String),
    /// A key pressed in the question box.
    QuestionKey { key: Key, shift: bool },
    AskClicked,
    RemoveClicked(DocumentId),
}

/// What handling an event produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Uploaded(Vec<UploadOutcome>),
    Asked(Result<AskOutcome, ClientError>),
    Removed(RemoveOutcome),
}

pub struct App {
    uploader: Uploader,
    query: QueryClient,
    draft: String,
    drop_highlighted: bool,
}

impl App {
    pub fn new(backend: Arc<dyn Backend>, store: SharedStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            uploader: Uploader::new(backend.clone(), store.clone(), notifier.clone()),
            query: QueryClient::new(backend, store, notifier),
            draft: String::new(),
            drop_highlighted: false,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_drop_highlighted(&self) -> bool {
        self.drop_highlighted
    }

    pub fn uploader(&self) -> &Uploader {
        &self.uploader
    }

    pub fn query_client(&self) -> &QueryClient {
        &self.query
    }

    pub async fn handle(&mut self, event: UiEvent) -> Effect {
        match event {
            UiEvent::FilesSelected(files) => self.upload(files).await,
            UiEvent::FilesDropped(files) => {
                self.drop_highlighted = false;
                self.upload(files).await
            }
            UiEvent::DragOver => {
                self.drop_highlighted = true;
                Effect::None
            }
            UiEvent::DragLeave => {
                self.drop_highlighted = false;
                Effect::None
            }
            UiEvent::QuestionEdited(text) => {
                self.draft = text;
                Effect::None
            }
            UiEvent::QuestionKey {
                key: Key::Enter,
                shift: false,
            } => self.ask().await,
            UiEvent::QuestionKey {
                key: Key::Enter,
                shift: true,
            } => {
                self.draft.push('\n');
                Effect::None
            }
            UiEvent::QuestionKey { .. } => Effect::None,
            UiEvent::AskClicked => self.ask().await,
            UiEvent::RemoveClicked(id) => Effect::Removed(self.uploader.remove_document(id)),
        }
    }

    async fn upload(&self, files: Vec<FileHandle>) -> Effect {
        if files.is_empty() {
            return Effect::None;
        }
        Effect::Uploaded(self.uploader.submit_files(files).await)
    }

    async fn ask(&self) -> Effect {
        Effect::Asked(self.query.ask(&self.draft).await)
    }
}
