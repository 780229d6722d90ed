//! Response bodies of the `/upload` and `/ask` endpoints.
//!
//! Both endpoints answer either with a success shape or with
//! `{"error": "..."}`. A body carrying `error` is always treated as a
//! server-reported failure, whatever else it contains.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ClientError;
use crate::models::AnswerResult;

/// Request body of `POST /ask`.
#[derive(Debug, Clone, Serialize)]
pub struct AskRequest<'a> {
    pub question: &'a str,
}

/// Successful `POST /upload` body. Extra fields (`message`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadAck {
    pub filename: String,
    pub chunks: u64,
}

/// Successful `POST /ask` body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AskAnswer {
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<String>,
}

/// `"sources": null` means no references, same as a missing key.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<AskAnswer> for AnswerResult {
    fn from(a: AskAnswer) -> Self {
        AnswerResult {
            answer_text: a.answer,
            sources: a.sources,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Reply<T> {
    Error(ErrorBody),
    Ok(T),
}

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    match serde_json::from_slice::<Reply<T>>(body) {
        Ok(Reply::Ok(value)) => Ok(value),
        Ok(Reply::Error(e)) => Err(ClientError::Server(e.error)),
        Err(e) => Err(ClientError::transport(format!("unexpected response body: {}", e))),
    }
}

/// Decodes an `/upload` response body.
pub fn decode_upload(body: &[u8]) -> Result<UploadAck, ClientError> {
    decode(body)
}

/// Decodes an `/ask` response body.
pub fn decode_ask(body: &[u8]) -> Result<AskAnswer, ClientError> {
    decode(body)
}
