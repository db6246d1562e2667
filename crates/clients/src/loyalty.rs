//! Loyalty service API: tier profiles and tier adjustments.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::LoyaltyProfile;

use crate::USER_NAME_HEADER;
use crate::backend::{HttpBackend, Method};
use crate::dependency::Dependency;
use crate::error::{ClientError, Result};
use crate::facade::DependencyClient;

/// Operations offered by the loyalty service.
#[async_trait]
pub trait LoyaltyApi: Send + Sync {
    /// Fetches a user's loyalty profile.
    async fn get_profile(&self, username: &str) -> Result<LoyaltyProfile>;

    /// Bumps the user's tier after a successful booking.
    async fn improve(&self, username: &str) -> Result<()>;

    /// Lowers the user's tier after a cancellation.
    async fn degrade(&self, username: &str) -> Result<()>;
}

/// HTTP implementation over the breaker-gated facade.
#[derive(Clone)]
pub struct HttpLoyaltyClient<B> {
    client: DependencyClient<B>,
}

impl<B: HttpBackend> HttpLoyaltyClient<B> {
    /// Wraps a facade for the loyalty dependency.
    pub fn new(client: DependencyClient<B>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<B: HttpBackend> LoyaltyApi for HttpLoyaltyClient<B> {
    async fn get_profile(&self, username: &str) -> Result<LoyaltyProfile> {
        self.client
            .request_json(
                Method::Get,
                "/api/v1/loyalties",
                &[(USER_NAME_HEADER, username)],
                None,
                &format!("loyalty profile for {username}"),
            )
            .await
    }

    async fn improve(&self, username: &str) -> Result<()> {
        self.client
            .request_unit(
                Method::Get,
                "/api/v1/loyalties/improve",
                &[(USER_NAME_HEADER, username)],
                None,
            )
            .await
    }

    async fn degrade(&self, username: &str) -> Result<()> {
        self.client
            .request_unit(
                Method::Get,
                "/api/v1/loyalties/degrade",
                &[(USER_NAME_HEADER, username)],
                None,
            )
            .await
    }
}

#[derive(Debug, Default)]
struct InMemoryLoyaltyState {
    profiles: HashMap<String, LoyaltyProfile>,
    improve_calls: u32,
    degrade_calls: u32,
    fail_profile: bool,
    fail_improve: bool,
    fail_degrade: bool,
}

/// In-memory loyalty service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoyaltyClient {
    state: Arc<RwLock<InMemoryLoyaltyState>>,
}

impl InMemoryLoyaltyClient {
    /// Creates an empty in-memory loyalty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user's profile.
    pub fn set_profile(&self, username: &str, profile: LoyaltyProfile) {
        self.state
            .write()
            .unwrap()
            .profiles
            .insert(username.to_string(), profile);
    }

    /// Makes profile lookups fail.
    pub fn set_fail_profile(&self, fail: bool) {
        self.state.write().unwrap().fail_profile = fail;
    }

    /// Makes improve calls fail.
    pub fn set_fail_improve(&self, fail: bool) {
        self.state.write().unwrap().fail_improve = fail;
    }

    /// Makes degrade calls fail.
    pub fn set_fail_degrade(&self, fail: bool) {
        self.state.write().unwrap().fail_degrade = fail;
    }

    /// Number of successful improve calls.
    pub fn improve_calls(&self) -> u32 {
        self.state.read().unwrap().improve_calls
    }

    /// Number of successful degrade calls.
    pub fn degrade_calls(&self) -> u32 {
        self.state.read().unwrap().degrade_calls
    }

    fn failed(&self) -> ClientError {
        ClientError::Failed {
            dependency: Dependency::Loyalty,
            status: Some(503),
            message: "simulated failure".to_string(),
        }
    }
}

#[async_trait]
impl LoyaltyApi for InMemoryLoyaltyClient {
    async fn get_profile(&self, username: &str) -> Result<LoyaltyProfile> {
        let state = self.state.read().unwrap();
        if state.fail_profile {
            return Err(self.failed());
        }
        state
            .profiles
            .get(username)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                what: format!("loyalty profile for {username}"),
            })
    }

    async fn improve(&self, username: &str) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_improve {
            return Err(self.failed());
        }
        state.improve_calls += 1;
        if let Some(profile) = state.profiles.get_mut(username) {
            profile.reservation_count += 1;
        }
        Ok(())
    }

    async fn degrade(&self, username: &str) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_degrade {
            return Err(self.failed());
        }
        state.degrade_calls += 1;
        if let Some(profile) = state.profiles.get_mut(username) {
            profile.reservation_count = profile.reservation_count.saturating_sub(1);
        }
        Ok(())
    }
}
