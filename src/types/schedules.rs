//! Recurring server maintenance schedules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::Keyed;

/// Stable identifier of a schedule, assigned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(pub i64);

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recurring maintenance action (restart, mod update, backup) the
/// server runs on a named cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Server-assigned id; the store key.
    pub id: ScheduleId,
    /// Display name.
    pub name: String,
    /// Named run cadence understood by the scheduler (e.g. `every_hour`).
    pub cadence: String,
    /// The action the schedule triggers.
    pub action: String,
    /// Whether the schedule is currently active.
    pub enabled: bool,
    /// Creation timestamp (ISO 8601).
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last modification timestamp (ISO 8601).
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Outcome of the most recent run, when any.
    #[serde(default)]
    pub last_outcome: Option<String>,
    /// Timestamp of the most recent run (ISO 8601), when any.
    #[serde(default)]
    pub last_run: Option<String>,
}

impl Keyed for Schedule {
    type Key = ScheduleId;

    fn key(&self) -> ScheduleId {
        self.id
    }
}

/// Request payload for creating a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSchedule {
    pub name: String,
    pub cadence: String,
    pub action: String,
    pub enabled: bool,
}

/// Partial update of a schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl SchedulePatch {
    /// Applies the set fields to a local record.
    pub fn apply_to(&self, schedule: &mut Schedule) {
        if let Some(name) = &self.name {
            schedule.name = name.clone();
        }
        if let Some(cadence) = &self.cadence {
            schedule.cadence = cadence.clone();
        }
        if let Some(action) = &self.action {
            schedule.action = action.clone();
        }
        if let Some(enabled) = self.enabled {
            schedule.enabled = enabled;
        }
    }
}
