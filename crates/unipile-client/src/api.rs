//! Single entry point for Unipile operations

use std::path::Path;

use apikit_common::Result;

use crate::client::UnipileClient;
use crate::config::UnipileConfig;
use crate::profiles::ProfilesService;

/// Facade over a Unipile connection and its services
#[derive(Debug, Clone)]
pub struct UnipileApi {
    client: UnipileClient,
    profiles: ProfilesService,
}

impl UnipileApi {
    pub fn new(config: UnipileConfig) -> Result<Self> {
        Ok(Self::from_client(UnipileClient::new(config)?))
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::from_client(UnipileClient::from_env()?))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_client(UnipileClient::from_file(path)?))
    }

    pub fn from_client(client: UnipileClient) -> Self {
        tracing::info!(api_url = %client.config().api_url, "unipile api initialised");
        Self {
            profiles: ProfilesService::new(client.clone()),
            client,
        }
    }

    pub fn client(&self) -> &UnipileClient {
        &self.client
    }

    pub fn profiles(&self) -> &ProfilesService {
        &self.profiles
    }

    pub async fn test_connection(&self) -> bool {
        self.client.test_connection().await
    }
}
