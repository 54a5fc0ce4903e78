//! Mod collections: named, ordered groupings of subscribed mods.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::Keyed;
use crate::types::mods::ModId;

/// Stable identifier of a collection, assigned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(pub i64);

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A mod's membership entry inside a collection.
///
/// This is a denormalized view: the authoritative mod record lives in the
/// mods collection, which is why membership changes invalidate both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMod {
    /// The member mod's subscription id.
    pub mod_id: ModId,
    /// Workshop item id of the member.
    pub steam_id: u64,
    /// Display name snapshot.
    #[serde(default)]
    pub name: Option<String>,
    /// 1-based position in the collection's load order. The server
    /// renumbers neighbouring entries on reorder, so the local value is
    /// only a guess until the collection is refetched.
    #[serde(default)]
    pub load_order: u32,
}

/// A named, ordered set of mods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Server-assigned id; the store key.
    pub id: CollectionId,
    /// Collection name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Member mods in load order.
    #[serde(default)]
    pub mods: Vec<CollectionMod>,
    /// Creation timestamp (ISO 8601).
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Collection {
    /// Index of a member mod in the load order, if present.
    pub fn mod_position(&self, mod_id: ModId) -> Option<usize> {
        self.mods.iter().position(|m| m.mod_id == mod_id)
    }

    /// Removes a member mod locally. Returns `true` if it was present.
    pub fn remove_mod(&mut self, mod_id: ModId) -> bool {
        match self.mod_position(mod_id) {
            Some(index) => {
                self.mods.remove(index);
                self.renumber();
                true
            }
            None => false,
        }
    }

    /// Moves a member mod to the given 1-based load order and renumbers
    /// the rest sequentially.
    ///
    /// This mirrors the server's shift semantics closely enough for
    /// optimistic display, but the server's normalized numbering is
    /// authoritative -- reorder mutations always refetch afterwards.
    pub fn reorder_mod(&mut self, mod_id: ModId, new_load_order: u32) -> bool {
        let Some(from) = self.mod_position(mod_id) else {
            return false;
        };
        let to = (new_load_order.max(1) as usize - 1).min(self.mods.len().saturating_sub(1));
        let entry = self.mods.remove(from);
        self.mods.insert(to, entry);
        self.renumber();
        true
    }

    fn renumber(&mut self) {
        for (index, entry) in self.mods.iter_mut().enumerate() {
            entry.load_order = index as u32 + 1;
        }
    }
}

impl Keyed for Collection {
    type Key = CollectionId;

    fn key(&self) -> CollectionId {
        self.id
    }
}

/// Request payload for creating a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCollection {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Partial update of a collection's own fields (not its membership).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CollectionPatch {
    /// Applies the set fields to a local record.
    pub fn apply_to(&self, collection: &mut Collection) {
        if let Some(name) = &self.name {
            collection.name = name.clone();
        }
        if let Some(description) = &self.description {
            collection.description = description.clone();
        }
    }
}
