//! Text and JSON rendering of the store.
//!
//! Answers are rendered verbatim: the client never interprets answer text or
//! source names as markup.

use serde_json::{json, Value};
use std::fmt;

use crate::models::{AnswerResult, DocumentRecord};
use crate::notify::NotifyMode;
use crate::store::{AnswerFailure, AnswerPanel, Store, StoreEvent};

pub const NO_REFERENCES: &str = "No specific references found";
pub const CONNECTIVITY_ERROR: &str = "Error connecting to server. Please try again.";
pub const ANSWER_PLACEHOLDER: &str = "Ask a question to see an answer";
pub const PROCESSING: &str = "Processing...";
pub const NO_DOCUMENTS: &str = "No documents uploaded";

/// One line of the references list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceEntry {
    Source(String),
    Placeholder,
}

impl fmt::Display for ReferenceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceEntry::Source(name) => write!(f, "{} (relevant section)", name),
            ReferenceEntry::Placeholder => f.write_str(NO_REFERENCES),
        }
    }
}

/// One entry per source in order, or a single placeholder when there are none.
pub fn reference_entries(answer: &AnswerResult) -> Vec<ReferenceEntry> {
    if answer.sources.is_empty() {
        return vec![ReferenceEntry::Placeholder];
    }
    answer
        .sources
        .iter()
        .map(|s| ReferenceEntry::Source(s.clone()))
        .collect()
}

/// Message shown in place of an answer.
pub fn failure_message(failure: &AnswerFailure) -> String {
    match failure {
        AnswerFailure::Server(message) => format!("Error: {}", message),
        AnswerFailure::Connectivity => CONNECTIVITY_ERROR.to_string(),
    }
}

pub fn render_documents(documents: &[DocumentRecord]) -> String {
    if documents.is_empty() {
        return format!("{}\n", NO_DOCUMENTS);
    }
    let mut out = format!("--- Documents ({}) ---\n", documents.len());
    for doc in documents {
        out.push_str(&format!(
            "[{}] {:<6} {}  ({}, {}, {})\n",
            doc.id.short(),
            doc.kind().icon(),
            doc.name,
            doc.mime_type,
            format_size(doc.size_bytes),
            doc.uploaded_at.format("%Y-%m-%dT%H:%M:%SZ"),
        ));
    }
    out
}

pub fn render_panel(panel: &AnswerPanel, busy: bool) -> String {
    if busy {
        return format!("{}\n", PROCESSING);
    }
    match panel {
        AnswerPanel::Empty => format!("{}\n", ANSWER_PLACEHOLDER),
        AnswerPanel::Failed(failure) => format!("{}\n", failure_message(failure)),
        AnswerPanel::Answered(answer) => {
            let mut out = String::from("--- Answer ---\n");
            out.push_str(&answer.answer_text);
            out.push_str("\n\n--- References ---\n");
            for entry in reference_entries(answer) {
                out.push_str(&format!("{}\n", entry));
            }
            out
        }
    }
}

pub fn panel_json(panel: &AnswerPanel, busy: bool) -> Value {
    if busy {
        return json!({ "state": "busy" });
    }
    match panel {
        AnswerPanel::Empty => json!({ "state": "empty" }),
        AnswerPanel::Failed(failure) => json!({
            "state": "error",
            "message": failure_message(failure),
        }),
        AnswerPanel::Answered(answer) => json!({
            "state": "answered",
            "answer": answer.answer_text,
            "references": reference_entries(answer)
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>(),
        }),
    }
}

pub fn documents_json(documents: &[DocumentRecord]) -> Value {
    Value::Array(
        documents
            .iter()
            .map(|d| {
                json!({
                    "id": d.id,
                    "name": d.name,
                    "kind": d.kind(),
                    "mime_type": d.mime_type,
                    "size_bytes": d.size_bytes,
                    "uploaded_at": d.uploaded_at,
                })
            })
            .collect(),
    )
}

/// Subscribes a stdout printer to the store.
pub fn attach_printer(store: &mut Store, mode: NotifyMode) {
    store.subscribe(move |event, store| {
        let line = match mode {
            NotifyMode::Human => render_event(event, store),
            NotifyMode::Json => format!("{}\n", event_json(event, store)),
        };
        print!("{}", line);
    });
}

fn render_event(event: &StoreEvent, store: &Store) -> String {
    match event {
        StoreEvent::DocumentAdded(_) | StoreEvent::DocumentRemoved(_) => {
            render_documents(store.documents())
        }
        StoreEvent::QueryStarted(_) | StoreEvent::AnswerUpdated(_) => {
            render_panel(store.panel(), store.is_busy())
        }
    }
}

fn event_json(event: &StoreEvent, store: &Store) -> Value {
    match event {
        StoreEvent::DocumentAdded(id) => json!({
            "event": "document_added",
            "id": id,
            "documents": documents_json(store.documents()),
        }),
        StoreEvent::DocumentRemoved(record) => json!({
            "event": "document_removed",
            "id": record.id,
            "documents": documents_json(store.documents()),
        }),
        StoreEvent::QueryStarted(ticket) => json!({
            "event": "query_started",
            "ticket": ticket.seq(),
        }),
        StoreEvent::AnswerUpdated(ticket) => json!({
            "event": "answer",
            "ticket": ticket.seq(),
            "panel": panel_json(store.panel(), store.is_busy()),
        }),
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
