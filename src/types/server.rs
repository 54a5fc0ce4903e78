//! Game server configuration records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::Keyed;

/// Stable identifier of a configured game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(pub i64);

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A configured game server instance.
///
/// Sensitive fields (RCON passwords and the like) are only populated when
/// the listing was requested with `include_sensitive` -- see
/// [`Gateway::list_servers`](crate::gateway::Gateway::list_servers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameServer {
    /// Server-assigned id; the store key.
    pub id: ServerId,
    /// Display name.
    pub name: String,
    /// Hostname or address the instance binds to.
    #[serde(default)]
    pub hostname: Option<String>,
    /// Game port.
    #[serde(default)]
    pub port: Option<u16>,
    /// Whether this configuration is the active one.
    #[serde(default)]
    pub active: bool,
    /// Creation timestamp (ISO 8601).
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Keyed for GameServer {
    type Key = ServerId;

    fn key(&self) -> ServerId {
        self.id
    }
}
