//! Credential storage on top of a [`KeyValueStore`]

use crate::profile_cache::ProfileCache;
use crate::store::KeyValueStore;
use remit_core::{CredentialStore, RemitResult};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const TOKEN_KEY: &str = "auth_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Token, refresh token and cached profile sharing one store
#[derive(Clone)]
pub struct StoredCredentials {
    store: Arc<dyn KeyValueStore>,
    profile_cache: ProfileCache,
}

impl StoredCredentials {
    pub fn new(store: Arc<dyn KeyValueStore>, profile_ttl: Duration) -> Self {
        let profile_cache = ProfileCache::new(Arc::clone(&store), profile_ttl);
        Self {
            store,
            profile_cache,
        }
    }

    pub fn profile_cache(&self) -> &ProfileCache {
        &self.profile_cache
    }

    /// Persist the result of a successful login
    pub fn save_login<P: Serialize>(
        &self,
        token: &str,
        refresh_token: Option<&str>,
        profile: Option<&P>,
    ) -> RemitResult<()> {
        self.set_token(token)?;

        if let Some(refresh_token) = refresh_token {
            self.store.set(REFRESH_TOKEN_KEY, refresh_token)?;
        }

        if let Some(profile) = profile {
            self.profile_cache.store(profile);
        }

        info!("Credentials saved");
        Ok(())
    }

    pub fn refresh_token(&self) -> RemitResult<Option<String>> {
        Ok(self.store.get(REFRESH_TOKEN_KEY)?)
    }

    /// True when a token is stored. Read failures count as signed out.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.token(), Ok(Some(token)) if !token.is_empty())
    }
}

impl CredentialStore for StoredCredentials {
    fn token(&self) -> RemitResult<Option<String>> {
        Ok(self.store.get(TOKEN_KEY)?)
    }

    fn set_token(&self, token: &str) -> RemitResult<()> {
        self.store.set(TOKEN_KEY, token)?;
        Ok(())
    }

    fn clear_token(&self) -> RemitResult<()> {
        // Attempt both removals even if the first fails
        let token = self.store.remove(TOKEN_KEY);
        let refresh = self.store.remove(REFRESH_TOKEN_KEY);
        token?;
        refresh?;
        debug!("Tokens cleared");
        Ok(())
    }

    fn clear_profile(&self) -> RemitResult<()> {
        self.profile_cache.clear()?;
        debug!("Cached profile cleared");
        Ok(())
    }
}
