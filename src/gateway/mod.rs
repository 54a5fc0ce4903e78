//! The remote operation gateway: the dashboard's typed view of the
//! server API.
//!
//! [`Gateway`] is the remote service's contract as this crate consumes
//! it; [`HttpGateway`](http::HttpGateway) is the production
//! implementation over reqwest. Tests substitute in-memory fakes --
//! everything above this seam is transport-agnostic.
//!
//! Side-effecting operations come in two shapes: synchronous CRUD calls
//! answered with the updated entity or an [`Ack`], and long-running
//! operations answered with a [`JobAccepted`] whose job id feeds the
//! [`JobPoller`](crate::poller::JobPoller).

pub mod http;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::constants::DEFAULT_HTTP_TIMEOUT;
use crate::error::Result;
use crate::types::{
    Collection, CollectionId, CollectionPatch, GameServer, JobAccepted, JobId, JobStatus, ModId,
    ModSubscription, ModSubscriptionPatch, NewCollection, NewModSubscription, NewSchedule,
    Schedule, ScheduleId, SchedulePatch, ServerId,
};

pub use http::HttpGateway;

/// A `{message}` acknowledgement from the server.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Ack {
    /// Human-readable acknowledgement.
    #[serde(default)]
    pub message: String,
}

/// Connection settings for the HTTP gateway.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use garrison_client::gateway::GatewayConfig;
/// use url::Url;
///
/// let config = GatewayConfig::new(Url::parse("http://localhost:5000/api").unwrap())
///     .with_timeout(Duration::from_secs(5))
///     .with_auth_token("secret");
/// assert_eq!(config.timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the API, e.g. `http://localhost:5000/api`.
    pub base_url: Url,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Bearer token attached to every request, when set.
    pub auth_token: Option<String>,
}

impl GatewayConfig {
    /// Creates a config with the default timeout and no auth token.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_HTTP_TIMEOUT,
            auth_token: None,
        }
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the bearer token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// The remote API surface.
///
/// Every method maps to one request/response exchange; none of them
/// stream or push. Long-running operations return a [`JobAccepted`] and
/// execute server-side -- their outcome is only observable by polling
/// [`job_status`](Gateway::job_status) or by refetching the affected
/// collection.
///
/// # Errors
///
/// All methods return [`Error`](crate::error::Error): `Api` for non-2xx
/// responses (with the server's message when it sent one), `Transport`
/// for connection-level failures, `Decode` for malformed bodies.
#[async_trait]
pub trait Gateway: Send + Sync {
    // ---- Jobs ----

    /// Current status of an asynchronous job.
    async fn job_status(&self, job_id: &JobId) -> Result<JobStatus>;

    // ---- Mod subscriptions ----

    /// All mod subscriptions.
    async fn list_mods(&self) -> Result<Vec<ModSubscription>>;

    /// Subscribes to one or more workshop items.
    async fn add_mods(&self, mods: &[NewModSubscription]) -> Result<Ack>;

    /// Updates a subscription's editable fields.
    async fn update_mod(&self, id: ModId, patch: &ModSubscriptionPatch) -> Result<Ack>;

    /// Removes a subscription record.
    async fn remove_mod(&self, id: ModId) -> Result<Ack>;

    /// Starts an asynchronous download of the mod's files.
    async fn download_mod(&self, id: ModId) -> Result<JobAccepted>;

    /// Starts an asynchronous removal of the mod's files.
    async fn uninstall_mod(&self, id: ModId) -> Result<JobAccepted>;

    /// The mod's preview image as raw bytes.
    async fn mod_image(&self, id: ModId) -> Result<Bytes>;

    // ---- Collections ----

    /// All collections, with denormalized member views.
    async fn list_collections(&self) -> Result<Vec<Collection>>;

    /// Creates a collection; the server computes the authoritative
    /// record (id, timestamps).
    async fn create_collection(&self, new: &NewCollection) -> Result<Collection>;

    /// Updates a collection's own fields.
    async fn update_collection(&self, id: CollectionId, patch: &CollectionPatch) -> Result<Ack>;

    /// Deletes a collection.
    async fn delete_collection(&self, id: CollectionId) -> Result<Ack>;

    /// Adds mods to a collection, appended to the load order.
    async fn add_collection_mods(&self, id: CollectionId, mods: &[ModId]) -> Result<Ack>;

    /// Removes a mod from a collection.
    async fn remove_collection_mod(&self, id: CollectionId, mod_id: ModId) -> Result<Ack>;

    /// Moves a mod to a new load order. The server renumbers the
    /// neighbouring entries, so callers must refetch for normalized
    /// positions.
    async fn reorder_collection_mod(
        &self,
        id: CollectionId,
        mod_id: ModId,
        load_order: u32,
    ) -> Result<Ack>;

    // ---- Schedules ----

    /// All schedules.
    async fn list_schedules(&self) -> Result<Vec<Schedule>>;

    /// Creates a schedule; the server computes the authoritative record.
    async fn create_schedule(&self, new: &NewSchedule) -> Result<Schedule>;

    /// Updates a schedule.
    async fn update_schedule(&self, id: ScheduleId, patch: &SchedulePatch) -> Result<Ack>;

    /// Deletes a schedule.
    async fn delete_schedule(&self, id: ScheduleId) -> Result<Ack>;

    /// Enables or disables a schedule.
    async fn toggle_schedule(&self, id: ScheduleId, enabled: bool) -> Result<Ack>;

    /// Triggers an immediate asynchronous run of the schedule's action.
    async fn execute_schedule(&self, id: ScheduleId) -> Result<JobAccepted>;

    // ---- Servers ----

    /// All configured game servers. Sensitive fields are included only
    /// when requested.
    async fn list_servers(&self, include_sensitive: bool) -> Result<Vec<GameServer>>;

    /// One server configuration.
    async fn get_server(&self, id: ServerId) -> Result<GameServer>;

    // ---- Health ----

    /// Liveness check.
    async fn health(&self) -> Result<Ack>;
}

/// Convenience alias for a shared gateway.
pub type SharedGateway = Arc<dyn Gateway>;
