//! Core types and shared functionality for notekeep.
//!
//! This crate provides:
//! - Bearer token identity gate
//! - Note records with a SQLite store
//! - Per-user list cache with SQLite and in-memory backends
//! - Search filter compilation
//! - The note query service tying these together
//! - Unified error types and configuration

pub mod auth;
pub mod cache;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod note;
pub mod service;
pub mod store;

pub use auth::IdentityGate;
pub use cache::{CacheStore, MemoryCache, SqliteCache};
pub use config::{AppConfig, ConfigError};
pub use error::{Error, ErrorKind};
pub use filter::SearchCriteria;
pub use note::{Note, NoteDraft, NoteId, NoteType, NoteUpdate, UserId};
pub use service::NoteQueryService;
pub use store::{NoteStore, SqliteNoteStore};
