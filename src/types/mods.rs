//! Mod subscription records and their request types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::Keyed;

/// Stable identifier of a mod subscription, assigned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModId(pub i64);

impl fmt::Display for ModId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of workshop item a subscription points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModKind {
    /// A regular mod.
    Mod,
    /// A mission file.
    Mission,
    /// A map/terrain.
    Map,
}

/// A subscribed workshop mod as known to the server.
///
/// Most fields are server-computed (sizes, timestamps, image
/// availability); the client treats them as display data and never edits
/// them locally outside an optimistic mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModSubscription {
    /// Server-assigned id; the store key.
    pub id: ModId,
    /// Workshop item id.
    pub steam_id: u64,
    /// Display name; absent until the server has resolved metadata.
    #[serde(default)]
    pub name: Option<String>,
    /// On-disk folder name.
    #[serde(default)]
    pub filename: Option<String>,
    /// Item kind, when known.
    #[serde(default)]
    pub mod_type: Option<ModKind>,
    /// Path where the mod is installed on the server, when downloaded.
    #[serde(default)]
    pub local_path: Option<String>,
    /// Extra launch arguments attached to this mod.
    #[serde(default)]
    pub arguments: Option<String>,
    /// Whether the mod is loaded server-side only.
    #[serde(default)]
    pub server_mod: bool,
    /// Installed size in bytes, when downloaded.
    #[serde(default)]
    pub size_bytes: Option<u64>,
    /// When the local copy was last updated (ISO 8601).
    #[serde(default)]
    pub last_updated: Option<String>,
    /// When the workshop item was last updated (ISO 8601).
    #[serde(default)]
    pub steam_last_updated: Option<String>,
    /// Whether the installed copy is stale relative to the workshop.
    #[serde(default)]
    pub should_update: bool,
    /// Whether the server has a preview image for this mod.
    #[serde(default)]
    pub image_available: bool,
}

impl ModSubscription {
    /// Display name, falling back to `Mod <steam_id>` while metadata is
    /// unresolved.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Mod {}", self.steam_id))
    }
}

impl Keyed for ModSubscription {
    type Key = ModId;

    fn key(&self) -> ModId {
        self.id
    }
}

/// Request payload for subscribing to a workshop item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewModSubscription {
    /// Workshop item id to subscribe to.
    pub steam_id: u64,
}

/// Partial update of a mod subscription. Unset fields are left untouched
/// by the server and by [`apply_to`](Self::apply_to).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModSubscriptionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_type: Option<ModKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_mod: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_update: Option<bool>,
}

impl ModSubscriptionPatch {
    /// Applies the set fields to a local record. This is the optimistic
    /// mirror of what the server does with the same payload.
    pub fn apply_to(&self, subscription: &mut ModSubscription) {
        if let Some(name) = &self.name {
            subscription.name = Some(name.clone());
        }
        if let Some(filename) = &self.filename {
            subscription.filename = Some(filename.clone());
        }
        if let Some(mod_type) = self.mod_type {
            subscription.mod_type = Some(mod_type);
        }
        if let Some(local_path) = &self.local_path {
            subscription.local_path = Some(local_path.clone());
        }
        if let Some(arguments) = &self.arguments {
            subscription.arguments = Some(arguments.clone());
        }
        if let Some(server_mod) = self.server_mod {
            subscription.server_mod = server_mod;
        }
        if let Some(should_update) = self.should_update {
            subscription.should_update = should_update;
        }
    }
}
