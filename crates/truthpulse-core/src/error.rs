//! Error types shared across truthpulse crates.
//!
//! Store and export errors are defined here so the [`Recorder`] can tell a
//! failed primary write (surfaced to the caller) from a failed export row
//! (logged and swallowed) without string matching.
//!
//! [`Recorder`]: crate::recorder::Recorder

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a [`RecordStore`](crate::traits::RecordStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded or decoded.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing document exists but is not a valid record collection.
    #[error("store document {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// A blocking store task panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(String),
}

/// Errors raised by a [`TabularExport`](crate::traits::TabularExport).
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row could not be encoded.
    #[error("export encoding error: {0}")]
    Encode(String),

    #[error("export task failed: {0}")]
    Task(String),
}

/// Errors from [`Recorder::record`](crate::recorder::Recorder::record).
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record carries no contact email and contact is required.
    #[error("contact email is required before a response can be recorded")]
    MissingContact,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from quiz catalog lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("quiz item {index} does not exist (catalog has {len} items)")]
    UnknownItem { index: usize, len: usize },

    #[error("quiz catalog is empty")]
    Empty,
}
