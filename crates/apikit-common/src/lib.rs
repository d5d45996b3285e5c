//! apikit Common - Shared utilities and types
//!
//! This crate provides the functionality shared by every apikit client:
//! - The result envelope returned by all client operations
//! - Error types and failure classification
//! - Configuration loading helpers
//! - HTTP transport helpers
//! - Record and pagination helpers
//! - Logging initialisation

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod logging;
pub mod records;

pub use envelope::{Envelope, Failure, FailureKind, Payload};
pub use error::{Error, Result};
pub use records::Record;
