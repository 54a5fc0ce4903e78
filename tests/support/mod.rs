//! Shared test support: a scriptable in-memory [`Gateway`].
//!
//! `FakeGateway` serves entity listings from in-memory vectors, pops job
//! statuses from a per-test script, records every call by name, and can
//! be told to fail specific methods with a 500. Tests assert
//! reconciliation behavior by counting listing calls.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use garrison_client::gateway::{Ack, Gateway};
use garrison_client::types::{
    Collection, CollectionId, CollectionMod, CollectionPatch, GameServer, JobAccepted, JobId,
    JobState, JobStatus, ModId, ModSubscription, ModSubscriptionPatch, NewCollection,
    NewModSubscription, NewSchedule, Schedule, ScheduleId, SchedulePatch, ServerId,
};
use garrison_client::{Error, Result};

#[derive(Default)]
pub struct FakeGateway {
    pub job_script: Mutex<VecDeque<Result<JobStatus>>>,
    pub mods: Mutex<Vec<ModSubscription>>,
    pub collections: Mutex<Vec<Collection>>,
    pub schedules: Mutex<Vec<Schedule>>,
    pub servers: Mutex<Vec<GameServer>>,
    pub image: Mutex<Option<Bytes>>,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues statuses for successive `job_status` calls. When the
    /// script is exhausted further calls return `SUCCESS`.
    pub fn script_job(&self, statuses: impl IntoIterator<Item = JobStatus>) {
        let mut script = self.job_script.lock().unwrap();
        script.extend(statuses.into_iter().map(Ok));
    }

    /// Queues a transport failure for the next `job_status` call.
    pub fn script_job_error(&self, message: &str) {
        self.job_script
            .lock()
            .unwrap()
            .push_back(Err(Error::Transport(message.to_string())));
    }

    /// Makes the named method fail with a 500 until cleared.
    pub fn fail(&self, method: &'static str) {
        self.failing.lock().unwrap().insert(method);
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Number of calls made to the named method.
    pub fn calls_of(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|name| name.as_str() == method)
            .count()
    }

    fn record(&self, method: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(method.to_string());
        if self.failing.lock().unwrap().contains(method) {
            return Err(Error::Api {
                status: 500,
                message: "Server error - please try again later".to_string(),
            });
        }
        Ok(())
    }

    fn ack() -> Ack {
        Ack {
            message: "ok".to_string(),
        }
    }

    fn accepted(job: &str) -> JobAccepted {
        JobAccepted {
            job_id: JobId::new(job),
            message: "queued".to_string(),
        }
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn job_status(&self, _job_id: &JobId) -> Result<JobStatus> {
        self.record("job_status")?;
        match self.job_script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(JobStatus::new(JobState::Success, "done")),
        }
    }

    async fn list_mods(&self) -> Result<Vec<ModSubscription>> {
        self.record("list_mods")?;
        Ok(self.mods.lock().unwrap().clone())
    }

    async fn add_mods(&self, mods: &[NewModSubscription]) -> Result<Ack> {
        self.record("add_mods")?;
        let mut stored = self.mods.lock().unwrap();
        let next = stored.len() as i64 + 1;
        for (offset, new) in mods.iter().enumerate() {
            stored.push(mod_sub(next + offset as i64, new.steam_id, None));
        }
        Ok(Self::ack())
    }

    async fn update_mod(&self, _id: ModId, _patch: &ModSubscriptionPatch) -> Result<Ack> {
        self.record("update_mod")?;
        Ok(Self::ack())
    }

    async fn remove_mod(&self, _id: ModId) -> Result<Ack> {
        self.record("remove_mod")?;
        Ok(Self::ack())
    }

    async fn download_mod(&self, _id: ModId) -> Result<JobAccepted> {
        self.record("download_mod")?;
        Ok(Self::accepted("download-job"))
    }

    async fn uninstall_mod(&self, _id: ModId) -> Result<JobAccepted> {
        self.record("uninstall_mod")?;
        Ok(Self::accepted("uninstall-job"))
    }

    async fn mod_image(&self, _id: ModId) -> Result<Bytes> {
        self.record("mod_image")?;
        match self.image.lock().unwrap().clone() {
            Some(bytes) => Ok(bytes),
            None => Err(Error::Api {
                status: 404,
                message: "Resource not found".to_string(),
            }),
        }
    }

    async fn list_collections(&self) -> Result<Vec<Collection>> {
        self.record("list_collections")?;
        Ok(self.collections.lock().unwrap().clone())
    }

    async fn create_collection(&self, new: &NewCollection) -> Result<Collection> {
        self.record("create_collection")?;
        let mut stored = self.collections.lock().unwrap();
        let created = collection(stored.len() as i64 + 1, &new.name, &[]);
        stored.push(created.clone());
        Ok(created)
    }

    async fn update_collection(&self, _id: CollectionId, _patch: &CollectionPatch) -> Result<Ack> {
        self.record("update_collection")?;
        Ok(Self::ack())
    }

    async fn delete_collection(&self, _id: CollectionId) -> Result<Ack> {
        self.record("delete_collection")?;
        Ok(Self::ack())
    }

    async fn add_collection_mods(&self, _id: CollectionId, _mods: &[ModId]) -> Result<Ack> {
        self.record("add_collection_mods")?;
        Ok(Self::ack())
    }

    async fn remove_collection_mod(&self, _id: CollectionId, _mod_id: ModId) -> Result<Ack> {
        self.record("remove_collection_mod")?;
        Ok(Self::ack())
    }

    async fn reorder_collection_mod(
        &self,
        _id: CollectionId,
        _mod_id: ModId,
        _load_order: u32,
    ) -> Result<Ack> {
        self.record("reorder_collection_mod")?;
        Ok(Self::ack())
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>> {
        self.record("list_schedules")?;
        Ok(self.schedules.lock().unwrap().clone())
    }

    async fn create_schedule(&self, new: &NewSchedule) -> Result<Schedule> {
        self.record("create_schedule")?;
        let mut stored = self.schedules.lock().unwrap();
        let created = schedule(stored.len() as i64 + 1, &new.name, new.enabled);
        stored.push(created.clone());
        Ok(created)
    }

    async fn update_schedule(&self, _id: ScheduleId, _patch: &SchedulePatch) -> Result<Ack> {
        self.record("update_schedule")?;
        Ok(Self::ack())
    }

    async fn delete_schedule(&self, _id: ScheduleId) -> Result<Ack> {
        self.record("delete_schedule")?;
        Ok(Self::ack())
    }

    async fn toggle_schedule(&self, _id: ScheduleId, _enabled: bool) -> Result<Ack> {
        self.record("toggle_schedule")?;
        Ok(Self::ack())
    }

    async fn execute_schedule(&self, _id: ScheduleId) -> Result<JobAccepted> {
        self.record("execute_schedule")?;
        Ok(Self::accepted("schedule-job"))
    }

    async fn list_servers(&self, _include_sensitive: bool) -> Result<Vec<GameServer>> {
        self.record("list_servers")?;
        Ok(self.servers.lock().unwrap().clone())
    }

    async fn get_server(&self, id: ServerId) -> Result<GameServer> {
        self.record("get_server")?;
        self.servers
            .lock()
            .unwrap()
            .iter()
            .find(|server| server.id == id)
            .cloned()
            .ok_or(Error::Api {
                status: 404,
                message: "Resource not found".to_string(),
            })
    }

    async fn health(&self) -> Result<Ack> {
        self.record("health")?;
        Ok(Ack {
            message: "API is running".to_string(),
        })
    }
}

// ---- Entity builders ----

pub fn mod_sub(id: i64, steam_id: u64, name: Option<&str>) -> ModSubscription {
    ModSubscription {
        id: ModId(id),
        steam_id,
        name: name.map(str::to_string),
        filename: None,
        mod_type: None,
        local_path: None,
        arguments: None,
        server_mod: false,
        size_bytes: None,
        last_updated: None,
        steam_last_updated: None,
        should_update: false,
        image_available: false,
    }
}

pub fn collection(id: i64, name: &str, mod_ids: &[i64]) -> Collection {
    Collection {
        id: CollectionId(id),
        name: name.to_string(),
        description: String::new(),
        mods: mod_ids
            .iter()
            .enumerate()
            .map(|(index, mod_id)| CollectionMod {
                mod_id: ModId(*mod_id),
                steam_id: *mod_id as u64,
                name: None,
                load_order: index as u32 + 1,
            })
            .collect(),
        created_at: None,
    }
}

pub fn schedule(id: i64, name: &str, enabled: bool) -> Schedule {
    Schedule {
        id: ScheduleId(id),
        name: name.to_string(),
        cadence: "every_hour".to_string(),
        action: "restart".to_string(),
        enabled,
        created_at: None,
        updated_at: None,
        last_outcome: None,
        last_run: None,
    }
}

pub fn game_server(id: i64, name: &str) -> GameServer {
    GameServer {
        id: ServerId(id),
        name: name.to_string(),
        hostname: None,
        port: None,
        active: false,
        created_at: None,
    }
}

/// Shorthand for a status with the given state and empty message.
pub fn status(state: JobState) -> JobStatus {
    JobStatus::new(state, "")
}
