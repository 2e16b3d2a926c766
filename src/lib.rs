//! # askpdf
//!
//! Session-scoped PDF question answering over embedding similarity search.
//!
//! askpdf loads a PDF, splits its text into overlapping fragments, embeds
//! them through a hosted embedding provider, and answers natural-language
//! questions by retrieving the nearest fragments and running one
//! deterministic generation request over them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────┐   ┌──────────────────────┐   ┌────────────────┐
//! │   PDF   │──▶│  Pipeline             │──▶│ KnowledgeIndex │
//! │  bytes  │   │ extract→chunk→embed  │   │  (in-memory)   │
//! └─────────┘   └──────────────────────┘   └───────┬────────┘
//!                                                  │ top-k
//!                    ┌─────────────────────────────┤
//!                    ▼                             ▼
//!               ┌─────────┐                 ┌────────────┐
//!               │   CLI   │                 │    HTTP    │
//!               │ (askpdf)│                 │  (session) │
//!               └─────────┘                 └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! askpdf extract paper.pdf              # show extracted text
//! askpdf chunk paper.pdf                # dry-run fragment counts
//! askpdf ask paper.pdf "What is the main result?" --key $OPENAI_API_KEY
//! askpdf serve                          # start the HTTP surface
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`extract`] | PDF text extraction |
//! | [`chunk`] | Separator-aware chunking with overlap |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`generate`] | Generative completion provider abstraction |
//! | [`index`] | In-memory nearest-neighbor knowledge index |
//! | [`question`] | Preset / free-text question resolution |
//! | [`session`] | Session state and pipeline orchestration |
//! | [`server`] | HTTP interactive surface |

pub mod chunk;
pub mod config;
pub mod embedding;
pub mod extract;
pub mod generate;
pub mod index;
pub mod models;
pub mod question;
pub mod server;
pub mod session;
