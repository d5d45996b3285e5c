//! Supabase client
//!
//! Table access for Supabase projects over the PostgREST API:
//! - [`SupabaseClient`]: authenticated connection handle
//! - [`TableQuery`]: declarative filter/order/paging query builder
//! - [`CrudService`]: envelope-returning CRUD operations on one table
//! - [`UsersService`] and other [`ResourceService`]s layered on top
//! - [`SupabaseApi`]: facade with a per-table service cache
//!
//! Queries run through a [`Backend`]; [`PostgrestBackend`] is the HTTP
//! default and [`MemoryBackend`] keeps tables in process memory.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod backend;
pub mod client;
pub mod config;
pub mod crud;
pub mod memory;
pub mod query;
pub mod services;

pub use api::SupabaseApi;
pub use backend::{Backend, BackendResponse, MemoryBackend, PostgrestBackend};
pub use client::SupabaseClient;
pub use config::SupabaseConfig;
pub use crud::{CrudService, QueryOptions};
pub use query::{filters, CountMode, Filter, FilterOperator, Filters, QueryRequest, TableQuery};
pub use services::{ResourceService, StatusStatistics, StatusTrackedService, UsersService};

pub use apikit_common::{Envelope, FailureKind, Record};
