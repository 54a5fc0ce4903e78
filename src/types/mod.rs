//! Domain and wire types: jobs, mods, collections, schedules, servers.
//!
//! Entity records carry the server's `snake_case` field names and keep
//! timestamps as ISO 8601 strings -- the server owns their format, the
//! client only displays them. Every entity implements
//! [`Keyed`](crate::store::Keyed) so it can live in an
//! [`EntityStore`](crate::store::EntityStore).

pub mod collections;
pub mod job;
pub mod mods;
pub mod schedules;
pub mod server;

pub use collections::{Collection, CollectionId, CollectionMod, CollectionPatch, NewCollection};
pub use job::{JobAccepted, JobId, JobState, JobStatus};
pub use mods::{ModId, ModKind, ModSubscription, ModSubscriptionPatch, NewModSubscription};
pub use schedules::{NewSchedule, Schedule, ScheduleId, SchedulePatch};
pub use server::{GameServer, ServerId};
