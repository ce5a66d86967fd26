//! Signed-in user's profile, served from cache when fresh

use crate::client::{ApiClient, RequestOptions};
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use remit_core::{CredentialStore, RemitResult};
use remit_session::{SessionLifecycleManager, StoredCredentials};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub last_login_at: Option<String>,
    #[serde(default)]
    pub user_profile: Option<ProfileDetails>,
    #[serde(default)]
    pub country: Option<NamedRef>,
    #[serde(default)]
    pub role: Option<NamedRef>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Identity details attached to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDetails {
    pub id: u64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub document_number: Option<String>,
    #[serde(default)]
    pub document_file: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub document: Option<DocumentRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

impl ProfileUpdates {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Remote source of the profile
#[async_trait]
pub trait ProfileBackend: Send + Sync {
    async fn fetch_profile(&self) -> ApiResult<UserProfile>;

    async fn update_profile(&self, updates: &ProfileUpdates) -> ApiResult<UserProfile>;
}

#[async_trait]
impl ProfileBackend for ApiClient {
    async fn fetch_profile(&self) -> ApiResult<UserProfile> {
        self.get::<UserProfile>(self.profile_path(), RequestOptions::new())
            .await?
            .ok_or_else(|| missing_user("Profile response did not include a user"))
    }

    async fn update_profile(&self, updates: &ProfileUpdates) -> ApiResult<UserProfile> {
        let endpoint = format!("{}/update", self.profile_path());
        self.put::<UserProfile, _>(
            &endpoint,
            updates,
            RequestOptions::new().with_success_message("Profile updated"),
        )
        .await?
        .ok_or_else(|| missing_user("Update response did not include a user"))
    }
}

fn missing_user(message: &str) -> ApiError {
    ApiError::Application {
        status: 200,
        message: message.to_string(),
    }
}

/// Cache-first access to the signed-in user's profile
pub struct ProfileService {
    backend: Arc<dyn ProfileBackend>,
    credentials: Arc<StoredCredentials>,
    session: Option<SessionLifecycleManager>,
}

impl ProfileService {
    pub fn new(backend: Arc<dyn ProfileBackend>, credentials: Arc<StoredCredentials>) -> Self {
        Self {
            backend,
            credentials,
            session: None,
        }
    }

    pub fn with_session(mut self, session: SessionLifecycleManager) -> Self {
        self.session = Some(session);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated()
    }

    /// Cached profile unless stale or `force_refresh`, otherwise a fresh fetch
    pub async fn get_profile(&self, force_refresh: bool) -> ApiResult<UserProfile> {
        if !self.is_authenticated() {
            return Err(ApiError::NotAuthenticated);
        }
        self.touch_session();

        if !force_refresh {
            if let Some(profile) = self.credentials.profile_cache().load::<UserProfile>() {
                debug!(user_id = profile.id, "Profile served from cache");
                return Ok(profile);
            }
        }

        info!(force_refresh, "Fetching profile from API");
        let profile = self.backend.fetch_profile().await?;
        self.credentials.profile_cache().store(&profile);
        Ok(profile)
    }

    pub async fn refresh_profile(&self) -> ApiResult<UserProfile> {
        self.get_profile(true).await
    }

    pub async fn update_profile(&self, updates: &ProfileUpdates) -> ApiResult<UserProfile> {
        if !self.is_authenticated() {
            return Err(ApiError::NotAuthenticated);
        }
        self.touch_session();

        let profile = self.backend.update_profile(updates).await?;
        self.credentials.profile_cache().store(&profile);
        info!(user_id = profile.id, "Profile updated");
        Ok(profile)
    }

    pub fn clear_cache(&self) -> RemitResult<()> {
        self.credentials.clear_profile()
    }

    fn touch_session(&self) {
        if let Some(session) = &self.session {
            session.extend_session();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_profile_parsing() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": 12,
            "first_name": "Awa",
            "last_name": "Diop",
            "email": "awa@example.com",
            "role": {"id": 1, "name": "admin"},
            "user_profile": {
                "id": 4,
                "city": "Dakar",
                "verified": true,
                "document": {"id": 2, "name": "passport.pdf", "type": "passport"}
            }
        }))
        .unwrap();

        assert_eq!(profile.full_name(), "Awa Diop");
        assert_eq!(profile.role.as_ref().map(|r| r.name.as_str()), Some("admin"));
        let details = profile.user_profile.unwrap();
        assert!(details.verified);
        assert_eq!(details.document.unwrap().kind, "passport");
        assert_eq!(profile.phone, None);
    }

    #[test]
    fn test_updates_skip_absent_fields() {
        let updates = ProfileUpdates {
            city: Some("Thiès".to_string()),
            ..Default::default()
        };

        assert_eq!(serde_json::to_value(&updates).unwrap(), json!({"city": "Thiès"}));
        assert!(!updates.is_empty());
        assert!(ProfileUpdates::default().is_empty());
    }
}
