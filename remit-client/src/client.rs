//! Bearer-authenticated JSON client for the Remit backend
//!
//! Every response is expected in the `{ success, data, message, error, user }` envelope.
//! Calls made while signed in count as user activity and extend the attached session;
//! a 401 ends it with a single "session expired" notice.

use crate::error::{ApiError, ApiResult};
use remit_core::{
    ApiConfig, CredentialStore, ErrorContext, Notifier, RemitError, RemitResult,
    TerminationReason, Toast, ToastLevel,
};
use remit_session::{SessionLifecycleManager, StoredCredentials};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-call toast behavior. Unset fields fall back to the defaults of the HTTP method.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub show_success_toast: Option<bool>,
    pub show_error_toast: Option<bool>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// No toasts at all
    pub fn quiet() -> Self {
        Self {
            show_success_toast: Some(false),
            show_error_toast: Some(false),
            ..Self::default()
        }
    }

    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self.show_success_toast.get_or_insert(true);
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    fn resolve(self, method: &Method) -> ResolvedOptions {
        let default_success = if *method == Method::POST {
            Some("Data created successfully")
        } else if *method == Method::PUT {
            Some("Data updated successfully")
        } else if *method == Method::DELETE {
            Some("Data deleted successfully")
        } else {
            None
        };

        ResolvedOptions {
            show_success_toast: self
                .show_success_toast
                .unwrap_or(default_success.is_some()),
            show_error_toast: self.show_error_toast.unwrap_or(true),
            success_message: self
                .success_message
                .or_else(|| default_success.map(str::to_string)),
            error_message: self.error_message,
        }
    }
}

struct ResolvedOptions {
    show_success_toast: bool,
    show_error_toast: bool,
    success_message: Option<String>,
    error_message: Option<String>,
}

/// Backend response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    message: Option<String>,
    error: Option<String>,
    /// Profile endpoints return their payload here instead of `data`
    user: Option<T>,
}

/// Looser shape used to pull a message out of error responses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

struct Delivered<T> {
    payload: Option<T>,
    message: Option<String>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    profile_path: String,
    credentials: Arc<StoredCredentials>,
    notifier: Arc<dyn Notifier>,
    session: Option<SessionLifecycleManager>,
}

impl ApiClient {
    pub fn new(
        config: &ApiConfig,
        credentials: Arc<StoredCredentials>,
        notifier: Arc<dyn Notifier>,
    ) -> RemitResult<Self> {
        let http = create_http_client(config)?;

        info!("Created API client for {}", config.base_url);

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            profile_path: config.profile_path.trim_matches('/').to_string(),
            credentials,
            notifier,
            session: None,
        })
    }

    /// Attach the session whose inactivity clock this client's calls extend
    pub fn with_session(mut self, session: SessionLifecycleManager) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&SessionLifecycleManager> {
        self.session.as_ref()
    }

    pub fn credentials(&self) -> &StoredCredentials {
        &self.credentials
    }

    pub(crate) fn profile_path(&self) -> &str {
        &self.profile_path
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ApiResult<Option<T>> {
        self.request(Method::GET, endpoint, None::<&()>, options)
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> ApiResult<Option<T>> {
        self.request(Method::POST, endpoint, Some(body), options)
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> ApiResult<Option<T>> {
        self.request(Method::PUT, endpoint, Some(body), options)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ApiResult<Option<T>> {
        self.request(Method::DELETE, endpoint, None::<&()>, options)
            .await
    }

    async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> ApiResult<Option<T>> {
        let options = options.resolve(&method);
        let url = self.url(endpoint);
        let token = self.bearer_token();

        let mut builder = self.http.request(method.clone(), &url);
        if let Some(token) = &token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        if token.is_some() {
            if let Some(session) = &self.session {
                session.extend_session();
            }
        }

        debug!(%method, %url, authenticated = token.is_some(), "API request");

        match self.execute::<T>(builder).await {
            Ok(delivered) => {
                if options.show_success_toast {
                    let description = options
                        .success_message
                        .or(delivered.message)
                        .unwrap_or_else(|| "Operation completed".to_string());
                    self.show_toast(Toast::success(description));
                }
                Ok(delivered.payload)
            }
            Err(error) => {
                warn!(%method, %url, error = %error, "API request failed");
                // A 401 already produced its own toast
                if options.show_error_toast && !error.is_auth_failure() {
                    let description = options
                        .error_message
                        .unwrap_or_else(|| user_message(&error));
                    self.show_toast(Toast::error(description));
                }
                Err(error)
            }
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> ApiResult<Delivered<T>> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: error_body_message(&body)
                    .unwrap_or_else(|| "Session expired".to_string()),
            });
        }

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: error_body_message(&body)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
                status: status.as_u16(),
                source,
            })?;

        if !envelope.success {
            return Err(ApiError::Application {
                status: status.as_u16(),
                message: envelope
                    .error
                    .or(envelope.message)
                    .unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        Ok(Delivered {
            payload: envelope.data.or(envelope.user),
            message: envelope.message,
        })
    }

    /// The backend no longer accepts our token
    fn handle_unauthorized(&self) {
        warn!("Backend rejected the stored credentials");
        let notice = Toast::new(
            ToastLevel::Error,
            "Session expired",
            "Session expired, please sign in again.",
        );

        match &self.session {
            // The notice stands in for the sign-out toast
            Some(session) => session.terminate_session_with(TerminationReason::Manual, notice),
            None => {
                self.show_toast(notice);
                if let Err(e) = self.credentials.clear_token() {
                    warn!(error = %e, "Failed to clear rejected token");
                }
                if let Err(e) = self.credentials.clear_profile() {
                    warn!(error = %e, "Failed to clear cached profile");
                }
            }
        }
    }

    fn bearer_token(&self) -> Option<String> {
        match self.credentials.token() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Could not read stored token, sending request unauthenticated");
                None
            }
        }
    }

    fn show_toast(&self, toast: Toast) {
        if let Err(e) = self.notifier.toast(&toast) {
            warn!(error = %e, "Failed to show toast");
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

/// Build the underlying HTTP client with the configured timeout and headers
pub(crate) fn create_http_client(config: &ApiConfig) -> RemitResult<reqwest::Client> {
    let mut headers = HeaderMap::new();

    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent).map_err(|e| RemitError::Config {
            message: format!("Invalid user agent: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| RemitError::Network {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })
}

fn transport_error(source: reqwest::Error) -> ApiError {
    ApiError::Transport {
        message: source.to_string(),
        source,
    }
}

/// `error` wins over `message`
fn error_body_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    parsed.error.or(parsed.message)
}

fn user_message(error: &ApiError) -> String {
    match error {
        ApiError::Http { message, .. } | ApiError::Application { message, .. } => {
            message.clone()
        }
        other => other.to_string(),
    }
}
