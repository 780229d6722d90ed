//! Interactive line-oriented front end (`dqa session`).
//!
//! Each input line is translated into [`UiEvent`]s:
//!
//! | Input | Events |
//! |-------|--------|
//! | `upload <path>...` | `FilesSelected` |
//! | `ask <question>` or any other text | `QuestionEdited` + Enter |
//! | line ending in `\` | `QuestionEdited` + Shift+Enter (question continues) |
//! | `rm <id-prefix or name>` | `RemoveClicked` |
//! | `list` | prints the document list |
//! | `help`, `quit` | |

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::events::{App, Effect, Key, UiEvent};
use crate::models::FileHandle;
use crate::notify::Notifier;
use crate::render;
use crate::store::{self, SharedStore};
use crate::uploader::RemoveOutcome;

const HELP: &str = "\
Commands:
  upload <path>...   upload one or more files (quote paths with spaces)
  ask <question>     ask a question (bare text works too)
  rm <id|name>       remove a document from the list
  list               show uploaded documents
  help               show this help
  quit               leave the session
End a line with \\ to continue the question on the next line.
";

/// Summary of a finished session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub uploads_ok: usize,
    pub uploads_failed: usize,
    pub questions: usize,
    pub removed: usize,
}

pub struct Session<'a> {
    app: &'a mut App,
    store: SharedStore,
    notifier: &'a dyn Notifier,
    continuation: Option<String>,
    stats: SessionStats,
}

impl<'a> Session<'a> {
    pub fn new(app: &'a mut App, store: SharedStore, notifier: &'a dyn Notifier) -> Self {
        Self {
            app,
            store,
            notifier,
            continuation: None,
            stats: SessionStats::default(),
        }
    }

    /// Reads commands until end of input or `quit`.
    pub async fn run<R: BufRead, W: Write>(
        mut self,
        mut input: R,
        out: &mut W,
        interactive: bool,
    ) -> Result<SessionStats> {
        if interactive {
            writeln!(out, "Type 'help' for commands.")?;
        }
        loop {
            if interactive {
                let prompt = if self.continuation.is_some() { ". " } else { "> " };
                write!(out, "{}", prompt)?;
                out.flush()?;
            }

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim_end_matches(['\n', '\r']);

            if !self.handle_line(line, out).await? {
                break;
            }
        }
        Ok(self.stats)
    }

    /// Handles one line. Returns `false` when the session should end.
    pub async fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<bool> {
        if let Some(mut pending) = self.continuation.take() {
            pending.push_str(line);
            self.question_line(pending).await;
            return Ok(true);
        }

        let trimmed = line.trim();
        let (command, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (trimmed, ""),
        };

        match command {
            "" => {}
            "quit" | "exit" => return Ok(false),
            "help" => write!(out, "{}", HELP)?,
            "list" => {
                let listing = render::render_documents(store::lock(&self.store).documents());
                write!(out, "{}", listing)?;
            }
            "upload" => self.upload(rest).await,
            "rm" => self.remove(&split_args(rest).join(" ")).await,
            "ask" => self.question_line(rest.to_string()).await,
            _ => self.question_line(line.to_string()).await,
        }
        Ok(true)
    }

    async fn question_line(&mut self, text: String) {
        if let Some(head) = text.strip_suffix('\\') {
            self.app
                .handle(UiEvent::QuestionEdited(head.to_string()))
                .await;
            self.app
                .handle(UiEvent::QuestionKey {
                    key: Key::Enter,
                    shift: true,
                })
                .await;
            self.continuation = Some(self.app.draft().to_string());
            return;
        }

        self.app.handle(UiEvent::QuestionEdited(text)).await;
        let effect = self
            .app
            .handle(UiEvent::QuestionKey {
                key: Key::Enter,
                shift: false,
            })
            .await;
        if let Effect::Asked(Ok(_)) = effect {
            self.stats.questions += 1;
        }
    }

    async fn upload(&mut self, args: &str) {
        let paths: Vec<PathBuf> = split_args(args).into_iter().map(PathBuf::from).collect();
        if paths.is_empty() {
            self.notifier.alert("Usage: upload <path>...");
            return;
        }

        let mut files = Vec::with_capacity(paths.len());
        for path in &paths {
            match FileHandle::from_path(path).await {
                Ok(file) => files.push(file),
                Err(e) => {
                    self.stats.uploads_failed += 1;
                    self.notifier.alert(&format!("Error: {:#}", e));
                }
            }
        }

        if let Effect::Uploaded(outcomes) = self.app.handle(UiEvent::FilesSelected(files)).await {
            for outcome in outcomes {
                if outcome.is_success() {
                    self.stats.uploads_ok += 1;
                } else {
                    self.stats.uploads_failed += 1;
                }
            }
        }
    }

    async fn remove(&mut self, handle: &str) {
        let id = store::lock(&self.store).find(handle);
        let Some(id) = id else {
            self.notifier.alert(&format!("No document matches '{}'", handle));
            return;
        };
        if let Effect::Removed(RemoveOutcome::Removed(_)) =
            self.app.handle(UiEvent::RemoveClicked(id)).await
        {
            self.stats.removed += 1;
        }
    }
}

/// Splits on whitespace, keeping `"..."` and `'...'` spans together.
fn split_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_arg = true;
            }
            None if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            None => {
                current.push(c);
                in_arg = true;
            }
        }
    }
    if in_arg {
        args.push(current);
    }
    args
}
