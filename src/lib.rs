//! Client-side job orchestration and cache-consistency layer for the
//! Garrison game-server dashboard.
//!
//! The dashboard UI manages a game server, its workshop mod
//! subscriptions, mod collections, and maintenance schedules through an
//! HTTP API. This crate is the in-process layer between the UI and that
//! API. It owns three pieces of machinery the UI must never reimplement:
//!
//! - **Job polling** ([`poller`]) -- long-running server operations
//!   (mod downloads, uninstalls, schedule runs) are accepted with an
//!   opaque job id and observed by bounded, cancellable polling that
//!   always resolves to a terminal [`JobStatus`], never an error.
//! - **Optimistic entity stores** ([`store`]) -- each entity collection
//!   lives in one in-memory store that applies mutations locally first,
//!   confirms them against the gateway, rolls back on failure, and
//!   refetches server truth for the mutation classes that need
//!   reconciliation.
//! - **A reference-counted resource cache** ([`cache`]) -- preview
//!   images are materialized once and freed exactly when the last
//!   consumer releases them, tolerant of UI mount/unmount races.
//!
//! [`DashboardClient`] wires these together with the [`gateway`] and the
//! error-reporting seam in [`report`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use garrison_client::gateway::{GatewayConfig, HttpGateway};
//! use garrison_client::DashboardClient;
//! use url::Url;
//!
//! # async fn run() -> garrison_client::Result<()> {
//! let config = GatewayConfig::new(Url::parse("http://localhost:5000/api")?);
//! let client = DashboardClient::new(Arc::new(HttpGateway::new(config)?));
//!
//! client.refresh_all().await?;
//! for subscription in client.mods().entries() {
//!     println!("{}", subscription.display_name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod poller;
pub mod report;
pub mod store;
pub mod types;

// Re-exports for ergonomic access
pub use cache::{ResourceCache, ResourceHandle};
pub use client::DashboardClient;
pub use error::{Error, Result};
pub use gateway::{Ack, Gateway, GatewayConfig, HttpGateway, SharedGateway};
pub use poller::{JobPoller, PollOptions, StatusCallback};
pub use report::{ChannelSink, ErrorSink, Notice, NoticeLevel, SinkEvent, TracingSink};
pub use store::{EntityFetcher, EntityStore, Keyed, Mutation, MutationPolicy};
pub use types::{JobAccepted, JobId, JobState, JobStatus};
