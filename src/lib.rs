//! Library crate for polyglot-lexicon
//!
//! Exposes the lookup pipeline and its stages so the binary, the web surface
//! and integration tests share one implementation.

pub mod config;
pub mod enrichment;
pub mod error;
pub mod language;
pub mod lexicon;
pub mod openai;
pub mod pipeline;
pub mod presenter;
pub mod retry;
pub mod server;
pub mod spelling;
pub mod translation;
