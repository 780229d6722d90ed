//! Client-side state: the document list and the answer panel.
//!
//! The [`Store`] is the single source of truth for what the user sees. The
//! upload and query flows mutate it; renderers observe it through
//! [`Store::subscribe`]. Observers run synchronously, under the store lock,
//! and receive the store itself so they never need to lock it again.
//!
//! Questions are sequenced by [`QueryTicket`]: only the most recently issued
//! ticket may write the answer panel, so a slow response to an earlier
//! question cannot overwrite the answer to a later one.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{AnswerResult, DocumentId, DocumentRecord};

/// Sequence number of a submitted question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryTicket(u64);

impl QueryTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// Why a question produced no answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerFailure {
    /// Message reported by the server in an `{error}` body.
    Server(String),
    /// The server could not be reached or replied with garbage.
    Connectivity,
}

/// Contents of the answer area.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnswerPanel {
    #[default]
    Empty,
    Answered(AnswerResult),
    Failed(AnswerFailure),
}

/// A change applied to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    DocumentAdded(DocumentId),
    DocumentRemoved(DocumentRecord),
    QueryStarted(QueryTicket),
    AnswerUpdated(QueryTicket),
}

type Observer = Box<dyn Fn(&StoreEvent, &Store) + Send>;

#[derive(Default)]
pub struct Store {
    documents: Vec<DocumentRecord>,
    panel: AnswerPanel,
    busy: bool,
    last_ticket: u64,
    observers: Vec<Observer>,
}

pub type SharedStore = Arc<Mutex<Store>>;

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// Registers an observer called after every change.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&StoreEvent, &Store) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    fn emit(&self, event: StoreEvent) {
        for observer in &self.observers {
            observer(&event, self);
        }
    }

    // ============ Documents ============

    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    pub fn document(&self, id: DocumentId) -> Option<&DocumentRecord> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Appends a record and returns its freshly assigned id.
    pub fn add_document(
        &mut self,
        name: String,
        mime_type: String,
        size_bytes: u64,
        uploaded_at: DateTime<Utc>,
    ) -> DocumentId {
        let id = DocumentId::new();
        self.documents.push(DocumentRecord {
            id,
            name,
            mime_type,
            size_bytes,
            uploaded_at,
        });
        self.emit(StoreEvent::DocumentAdded(id));
        id
    }

    /// Removes exactly the entry with `id`. Returns `None` if it is not listed.
    pub fn remove_document(&mut self, id: DocumentId) -> Option<DocumentRecord> {
        let pos = self.documents.iter().position(|d| d.id == id)?;
        let removed = self.documents.remove(pos);
        self.emit(StoreEvent::DocumentRemoved(removed.clone()));
        Some(removed)
    }

    /// Resolves a user-typed handle: an id prefix (at least 4 hex digits)
    /// or an exact document name. The first match in list order wins.
    pub fn find(&self, handle: &str) -> Option<DocumentId> {
        let handle = handle.trim();
        if handle.is_empty() {
            return None;
        }
        let is_prefix = handle.len() >= 4 && handle.chars().all(|c| c.is_ascii_hexdigit());
        self.documents
            .iter()
            .find(|d| {
                d.name == handle
                    || (is_prefix
                        && d.id
                            .as_uuid()
                            .simple()
                            .to_string()
                            .starts_with(&handle.to_ascii_lowercase()))
            })
            .map(|d| d.id)
    }

    // ============ Answer panel ============

    pub fn panel(&self) -> &AnswerPanel {
        &self.panel
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Issues a new ticket and shows the busy indicator. Any ticket issued
    /// earlier is superseded.
    pub fn begin_query(&mut self) -> QueryTicket {
        self.last_ticket += 1;
        let ticket = QueryTicket(self.last_ticket);
        self.busy = true;
        self.emit(StoreEvent::QueryStarted(ticket));
        ticket
    }

    /// Applies the outcome of `ticket`. Returns `false` and leaves the store
    /// untouched if a newer question has been issued since.
    pub fn complete_query(
        &mut self,
        ticket: QueryTicket,
        outcome: Result<AnswerResult, AnswerFailure>,
    ) -> bool {
        if ticket.0 != self.last_ticket {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.last_ticket,
                "discarding response to superseded question"
            );
            return false;
        }
        self.busy = false;
        self.panel = match outcome {
            Ok(answer) => AnswerPanel::Answered(answer),
            Err(failure) => AnswerPanel::Failed(failure),
        };
        self.emit(StoreEvent::AnswerUpdated(ticket));
        true
    }
}

/// Locks a shared store, recovering the data if a previous holder panicked.
pub fn lock(store: &SharedStore) -> MutexGuard<'_, Store> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn add(store: &mut Store, name: &str) -> DocumentId {
        store.add_document(name.to_string(), "text/plain".to_string(), 10, Utc::now())
    }

    fn answer(text: &str) -> AnswerResult {
        AnswerResult {
            answer_text: text.to_string(),
            sources: vec![],
        }
    }

    #[test]
    fn remove_only_targets_one_entry() {
        let mut store = Store::new();
        let a = add(&mut store, "a.txt");
        let b = add(&mut store, "b.txt");
        let c = add(&mut store, "c.txt");

        let removed = store.remove_document(b).unwrap();
        assert_eq!(removed.name, "b.txt");

        let ids: Vec<_> = store.documents().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![a, c]);
        assert!(store.remove_document(b).is_none());
    }

    #[test]
    fn duplicate_names_get_distinct_ids() {
        let mut store = Store::new();
        let first = add(&mut store, "notes.pdf");
        let second = add(&mut store, "notes.pdf");
        assert_ne!(first, second);

        store.remove_document(second);
        assert_eq!(store.documents().len(), 1);
        assert_eq!(store.documents()[0].id, first);
    }

    #[test]
    fn find_by_name_or_prefix() {
        let mut store = Store::new();
        let a = add(&mut store, "alpha.md");
        let b = add(&mut store, "beta.md");

        assert_eq!(store.find("alpha.md"), Some(a));
        assert_eq!(store.find(&b.short()), Some(b));
        assert_eq!(store.find(&b.short().to_uppercase()), Some(b));
        assert_eq!(store.find("gamma.md"), None);
        assert_eq!(store.find("  "), None);
    }

    #[test]
    fn latest_ticket_wins() {
        let mut store = Store::new();
        let first = store.begin_query();
        let second = store.begin_query();
        assert!(store.is_busy());

        assert!(store.complete_query(second, Ok(answer("second"))));
        assert!(!store.is_busy());

        assert!(!store.complete_query(first, Ok(answer("first"))));
        assert_eq!(store.panel(), &AnswerPanel::Answered(answer("second")));
    }

    #[test]
    fn stale_response_keeps_busy_indicator() {
        let mut store = Store::new();
        let first = store.begin_query();
        let _second = store.begin_query();

        assert!(!store.complete_query(first, Err(AnswerFailure::Connectivity)));
        assert!(store.is_busy());
        assert_eq!(store.panel(), &AnswerPanel::Empty);
    }

    #[test]
    fn observers_see_every_change() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let mut store = Store::new();
        store.subscribe(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let id = add(&mut store, "a.txt");
        store.remove_document(id);
        let t = store.begin_query();
        store.complete_query(t, Ok(answer("ok")));

        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn observer_reads_state_after_change() {
        let names = Arc::new(Mutex::new(Vec::new()));
        let sink = names.clone();

        let mut store = Store::new();
        store.subscribe(move |event, store| {
            if let StoreEvent::DocumentAdded(id) = event {
                let name = store.document(*id).map(|d| d.name.clone()).unwrap();
                sink.lock().unwrap().push(name);
            }
        });

        add(&mut store, "one.txt");
        add(&mut store, "two.txt");
        assert_eq!(*names.lock().unwrap(), vec!["one.txt", "two.txt"]);
    }
}
