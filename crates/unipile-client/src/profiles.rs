//! LinkedIn profile lookups

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use apikit_common::{Envelope, Failure};

use crate::client::UnipileClient;

/// Messaging provider a Unipile account is linked to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    LinkedIn,
    /// Any other provider name, passed through as given
    Other(String),
}

impl Provider {
    pub fn as_str(&self) -> &str {
        match self {
            Self::LinkedIn => "LINKEDIN",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("linkedin") {
            Ok(Self::LinkedIn)
        } else {
            Ok(Self::Other(s.to_string()))
        }
    }
}

/// Profile reads for a connected account
#[derive(Debug, Clone)]
pub struct ProfilesService {
    client: UnipileClient,
}

impl ProfilesService {
    pub fn new(client: UnipileClient) -> Self {
        Self { client }
    }

    /// Profile of the account owner
    pub async fn get_own_profile(&self, account_id: &str, provider: &Provider) -> Envelope {
        let params = [("provider", provider.as_str())];
        self.client
            .get(&profile_endpoint(account_id), &params)
            .await
            .with_context("Failed to get own profile")
    }

    /// Profile of any user, by profile URL, public username or member id
    pub async fn get_user_profile(
        &self,
        account_id: &str,
        identifier: &str,
        provider: &Provider,
    ) -> Envelope {
        let params = [("provider", provider.as_str()), ("identifier", identifier)];
        self.client
            .get(&profile_endpoint(account_id), &params)
            .await
            .with_context(format!("Failed to get profile for identifier: {identifier}"))
    }

    pub async fn get_user_profile_by_url(
        &self,
        account_id: &str,
        profile_url: &str,
        provider: &Provider,
    ) -> Envelope {
        self.get_user_profile(account_id, profile_url, provider).await
    }

    pub async fn get_user_profile_by_username(
        &self,
        account_id: &str,
        username: &str,
        provider: &Provider,
    ) -> Envelope {
        self.get_user_profile(account_id, username, provider).await
    }

    /// Fetch two profiles one after the other
    ///
    /// Succeeds with `{profile1, profile2}` only when both lookups succeed.
    /// Otherwise the error names each failed side and the detail carries
    /// whatever was retrieved.
    pub async fn compare_profiles(
        &self,
        account_id: &str,
        identifier1: &str,
        identifier2: &str,
        provider: &Provider,
    ) -> Envelope {
        let first = self.get_user_profile(account_id, identifier1, provider).await;
        let second = self.get_user_profile(account_id, identifier2, provider).await;

        let mut errors = Vec::new();
        let mut kind = None;
        for (n, result) in [(1, &first), (2, &second)] {
            if let Some(failure) = result.failure_ref() {
                errors.push(format!("Profile {n} error: {}", failure.error));
                kind.get_or_insert(failure.kind);
            }
        }

        let pair = json!({
            "profile1": first.into_data(),
            "profile2": second.into_data(),
        });

        match kind {
            None => Envelope::success(pair),
            Some(kind) => {
                let failure = Failure::new(kind, errors.join("; ")).with_detail(pair);
                Envelope::Failure(failure).with_context("Failed to retrieve one or both profiles")
            }
        }
    }
}

/// Profile data of a successful lookup
pub fn extract_profile_data(result: &Envelope) -> Option<&Value> {
    match result.data() {
        Value::Null => None,
        data if result.is_success() => Some(data),
        _ => None,
    }
}

fn profile_endpoint(account_id: &str) -> String {
    format!("/api/v1/users/{account_id}/profile")
}
