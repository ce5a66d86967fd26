//! Remit Session - client-side lifecycle of an authenticated admin session
//!
//! Tracks user activity, shows an expiry warning with a live countdown before the
//! inactivity timeout and tears the session down when it elapses. Also owns the
//! persisted credentials and the time-limited profile cache.

pub mod activity;
pub mod credentials;
pub mod manager;
pub mod profile_cache;
pub mod store;
pub mod timings;

pub use activity::ActivityHub;
pub use credentials::{StoredCredentials, REFRESH_TOKEN_KEY, TOKEN_KEY};
pub use manager::{SessionCollaborators, SessionLifecycleManager, SessionPhase};
pub use profile_cache::{CachedProfile, ProfileCache, PROFILE_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreResult};
pub use timings::{
    format_countdown, SessionTimings, COUNTDOWN_TICK, INACTIVITY_TIMEOUT, WARNING_THRESHOLD,
};
