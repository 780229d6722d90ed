//! Question flow.
//!
//! [`QueryClient::ask`] validates the question, takes a ticket from the
//! store, sends the question and writes the outcome to the answer panel.
//! Overlapping questions are allowed; the store keeps only the answer to the
//! newest one.

use std::sync::Arc;

use crate::backend::Backend;
use crate::error::ClientError;
use crate::models::AnswerResult;
use crate::notify::Notifier;
use crate::store::{self, AnswerFailure, QueryTicket, SharedStore};

/// Alert shown when the question is blank.
pub const EMPTY_QUESTION_ALERT: &str = "Please enter a question first.";

/// Result of a question that was actually sent.
#[derive(Debug, Clone, PartialEq)]
pub struct AskOutcome {
    pub ticket: QueryTicket,
    pub result: Result<AnswerResult, ClientError>,
    /// `false` when a newer question was issued before this response arrived
    /// and the response was therefore not shown.
    pub applied: bool,
}

#[derive(Clone)]
pub struct QueryClient {
    backend: Arc<dyn Backend>,
    store: SharedStore,
    notifier: Arc<dyn Notifier>,
}

impl QueryClient {
    pub fn new(backend: Arc<dyn Backend>, store: SharedStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            store,
            notifier,
        }
    }

    /// Asks a question.
    ///
    /// Returns [`ClientError::EmptyQuestion`] without touching the network or
    /// the store when `question` is blank. The question is otherwise sent
    /// exactly as typed.
    pub async fn ask(&self, question: &str) -> Result<AskOutcome, ClientError> {
        if question.trim().is_empty() {
            self.notifier.alert(EMPTY_QUESTION_ALERT);
            return Err(ClientError::EmptyQuestion);
        }

        let ticket = store::lock(&self.store).begin_query();

        let result = self
            .backend
            .ask(question)
            .await
            .map(AnswerResult::from);

        let panel_outcome = match &result {
            Ok(answer) => Ok(answer.clone()),
            Err(ClientError::Server(message)) => Err(AnswerFailure::Server(message.clone())),
            Err(e) => {
                tracing::error!(error = %e, "question failed");
                Err(AnswerFailure::Connectivity)
            }
        };

        let applied = store::lock(&self.store).complete_query(ticket, panel_outcome);

        Ok(AskOutcome {
            ticket,
            result,
            applied,
        })
    }
}
