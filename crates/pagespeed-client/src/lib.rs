//! Google PageSpeed Insights client
//!
//! Runs Lighthouse audits through the PageSpeed Insights v5 API and
//! condenses the result into category scores and core web-vital metrics.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod client;
pub mod config;
pub mod report;

pub use client::{Category, PageSpeedClient, Strategy};
pub use config::PageSpeedConfig;
pub use report::{Metric, Metrics, PageSpeedReport, Scores};

pub use apikit_common::{Envelope, FailureKind};
