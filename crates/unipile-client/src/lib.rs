//! Unipile client
//!
//! Reads LinkedIn profiles through the Unipile REST API. Every call returns
//! an [`Envelope`]; failures never escape as errors.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod client;
pub mod config;
pub mod profiles;

pub use api::UnipileApi;
pub use client::UnipileClient;
pub use config::UnipileConfig;
pub use profiles::{extract_profile_data, ProfilesService, Provider};

pub use apikit_common::{Envelope, FailureKind};
