//! # docqa
//!
//! A client for document question-answering services.
//!
//! `docqa` uploads files to a retrieval-augmented-generation server, keeps a
//! local list of the documents it uploaded, asks questions and shows the
//! answer together with the files it was drawn from. Retrieval and generation
//! happen on the server; this crate only speaks its HTTP interface.
//!
//! ## Architecture
//!
//! ```text
//!   UiEvent ──▶ App ──┬──▶ Uploader ────┐        ┌──────────┐
//!                     │                 ├──────▶ │ Backend  │──▶ POST /upload
//!                     └──▶ QueryClient ─┘        │ (HTTP)   │──▶ POST /ask
//!                              │                 └──────────┘
//!                              ▼
//!                           Store ──▶ observers (render)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dqa upload notes.pdf handbook.md
//! dqa ask "What is the refund policy?"
//! dqa session                    # interactive
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`wire`] | Endpoint request/response bodies |
//! | [`error`] | Error taxonomy |
//! | [`backend`] | Transport trait and HTTP implementation |
//! | [`store`] | Client-side state and observers |
//! | [`notify`] | Alerts and confirmations |
//! | [`uploader`] | Upload flow and document removal |
//! | [`query`] | Question flow |
//! | [`render`] | Text and JSON rendering |
//! | [`events`] | UI events and dispatcher |
//! | [`session`] | Interactive terminal front end |

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod notify;
pub mod query;
pub mod render;
pub mod session;
pub mod store;
pub mod uploader;
pub mod wire;
