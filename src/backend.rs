//! Transport to the question-answering server.
//!
//! The [`Backend`] trait is the seam between the client flows and the
//! network. [`HttpBackend`] talks to a real server with `reqwest`; tests
//! substitute an in-memory implementation.
//!
//! # Endpoints
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | `POST` | `/upload` | multipart, field `file` | `{filename, chunks}` or `{error}` |
//! | `POST` | `/ask` | `{"question": "..."}` | `{answer, sources}` or `{error}` |
//!
//! Response bodies are decoded regardless of HTTP status, since the server
//! reports failures as `{error}` with a 4xx/5xx status.

use async_trait::async_trait;
use reqwest::multipart;

use crate::config::Config;
use crate::error::ClientError;
use crate::models::FileHandle;
use crate::wire::{self, AskAnswer, AskRequest, UploadAck};

#[async_trait]
pub trait Backend: Send + Sync {
    /// Sends one file to the ingestion endpoint.
    async fn upload(&self, file: &FileHandle) -> Result<UploadAck, ClientError>;

    /// Sends one question to the query endpoint.
    async fn ask(&self, question: &str) -> Result<AskAnswer, ClientError>;
}

pub struct HttpBackend {
    client: reqwest::Client,
    upload_url: String,
    ask_url: String,
    field_name: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            upload_url: config.upload_url(),
            ask_url: config.ask_url(),
            field_name: config.upload.field_name.clone(),
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn upload(&self, file: &FileHandle) -> Result<UploadAck, ClientError> {
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = multipart::Form::new().part(self.field_name.clone(), part);

        tracing::debug!(url = %self.upload_url, file = %file.name, bytes = file.bytes.len(), "upload");

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        tracing::debug!(status = %status, file = %file.name, "upload response");
        wire::decode_upload(&body)
    }

    async fn ask(&self, question: &str) -> Result<AskAnswer, ClientError> {
        tracing::debug!(url = %self.ask_url, "ask");

        let response = self
            .client
            .post(&self.ask_url)
            .json(&AskRequest { question })
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        tracing::debug!(status = %status, "ask response");
        wire::decode_ask(&body)
    }
}
