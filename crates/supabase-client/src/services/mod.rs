//! Resource-specific services
//!
//! A resource service wraps a [`CrudService`] bound to its table and adds
//! typed shortcuts on top. Generic operations stay reachable through
//! [`ResourceService::crud`].

mod status;
mod users;

pub use status::{StatusStatistics, StatusTrackedService};
pub use users::UsersService;

use crate::client::SupabaseClient;
use crate::crud::CrudService;

/// A service layered over a generic CRUD service
pub trait ResourceService: Sized {
    /// Table used when none is given
    const DEFAULT_TABLE: &'static str;

    fn from_crud(crud: CrudService) -> Self;

    fn crud(&self) -> &CrudService;

    /// Bind to [`Self::DEFAULT_TABLE`]
    fn new(client: SupabaseClient) -> Self {
        Self::from_crud(CrudService::new(client, Self::DEFAULT_TABLE))
    }

    fn with_table(client: SupabaseClient, table: &str) -> Self {
        Self::from_crud(CrudService::new(client, table))
    }
}
