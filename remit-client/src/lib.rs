//! Remit Client - HTTP access to the Remit backend
//!
//! A bearer-authenticated JSON client wired into the session lifecycle, typed
//! resource handles and the cached profile service.

pub mod client;
pub mod error;
pub mod profile;
pub mod resources;

pub use client::{ApiClient, RequestOptions};
pub use error::{ApiError, ApiResult};
pub use profile::{
    DocumentRef, NamedRef, ProfileBackend, ProfileDetails, ProfileService, ProfileUpdates,
    UserProfile,
};
pub use resources::{Report, Resource};
