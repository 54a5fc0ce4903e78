//! High-level dashboard client: gateway + stores + poller + cache.
//!
//! [`DashboardClient`] owns one [`EntityStore`] per entity domain (mods,
//! collections, schedules, servers), the [`JobPoller`], the image
//! [`ResourceCache`], and the [`ErrorSink`]. Consumers read from the
//! stores, call the operations below, and render notices/reports from
//! the sink.
//!
//! # Mutation classes
//!
//! - **Creations** (`add_mod`, `create_collection`, `create_schedule`)
//!   are not applied optimistically: the server computes the
//!   authoritative record (id, timestamps, derived fields), so the call
//!   runs first and the collection is refetched on success.
//! - **Edits and deletes** are optimistic with rollback and no refetch on
//!   success -- the local result already equals server truth.
//! - **Reorders** are optimistic and refetch after both outcomes, since
//!   the server renumbers load orders in ways the local guess cannot
//!   reproduce.
//! - **Membership changes** couple two collections: adding mods to a
//!   collection refetches both the collections and the mods store, each
//!   carrying a denormalized view of the other.
//! - **Job-backed operations** (`download_mod`, `uninstall_mod`,
//!   `execute_schedule`) poll the accepted job to a terminal status and
//!   then refetch the affected collection regardless of the outcome --
//!   a poll failure says nothing certain about server state.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::{ResourceCache, ResourceHandle};
use crate::constants::MOD_IMAGE_KEY_PREFIX;
use crate::error::Result;
use crate::gateway::Gateway;
use crate::poller::{JobPoller, PollOptions, StatusCallback};
use crate::report::{ErrorSink, Notice, TracingSink};
use crate::store::{EntityFetcher, EntityStore, Mutation, MutationPolicy};
use crate::types::{
    Collection, CollectionId, CollectionPatch, GameServer, JobId, JobStatus, ModId,
    ModSubscription, ModSubscriptionPatch, NewCollection, NewModSubscription, NewSchedule,
    Schedule, ScheduleId, SchedulePatch, ServerId,
};

macro_rules! fetcher {
    ($name:ident, $entity:ty, $method:ident) => {
        struct $name(Arc<dyn Gateway>);

        #[async_trait]
        impl EntityFetcher<$entity> for $name {
            async fn fetch_all(&self) -> Result<Vec<$entity>> {
                self.0.$method().await
            }
        }
    };
}

fetcher!(ModsFetcher, ModSubscription, list_mods);
fetcher!(CollectionsFetcher, Collection, list_collections);
fetcher!(SchedulesFetcher, Schedule, list_schedules);

struct ServersFetcher(Arc<dyn Gateway>);

#[async_trait]
impl EntityFetcher<GameServer> for ServersFetcher {
    async fn fetch_all(&self) -> Result<Vec<GameServer>> {
        self.0.list_servers(false).await
    }
}

/// The dashboard's client-side orchestration layer.
pub struct DashboardClient {
    gateway: Arc<dyn Gateway>,
    poller: JobPoller,
    sink: Arc<dyn ErrorSink>,
    poll_options: PollOptions,
    mods: EntityStore<ModSubscription>,
    collections: EntityStore<Collection>,
    schedules: EntityStore<Schedule>,
    servers: EntityStore<GameServer>,
    images: ResourceCache,
}

impl DashboardClient {
    /// Creates a client that reports through the default tracing sink.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self::with_sink(gateway, Arc::new(TracingSink))
    }

    /// Creates a client with a custom error sink.
    pub fn with_sink(gateway: Arc<dyn Gateway>, sink: Arc<dyn ErrorSink>) -> Self {
        let mods = EntityStore::new(
            "mods",
            Arc::new(ModsFetcher(Arc::clone(&gateway))),
            Arc::clone(&sink),
        );
        let collections = EntityStore::new(
            "collections",
            Arc::new(CollectionsFetcher(Arc::clone(&gateway))),
            Arc::clone(&sink),
        );
        let schedules = EntityStore::new(
            "schedules",
            Arc::new(SchedulesFetcher(Arc::clone(&gateway))),
            Arc::clone(&sink),
        );
        let servers = EntityStore::new(
            "servers",
            Arc::new(ServersFetcher(Arc::clone(&gateway))),
            Arc::clone(&sink),
        );
        Self {
            poller: JobPoller::new(Arc::clone(&gateway)),
            gateway,
            sink,
            poll_options: PollOptions::default(),
            mods,
            collections,
            schedules,
            servers,
            images: ResourceCache::new(),
        }
    }

    /// Sets the polling cadence used by job-backed operations.
    pub fn with_poll_options(mut self, options: PollOptions) -> Self {
        self.poll_options = options;
        self
    }

    // ---- Read surfaces ----

    /// The mod subscriptions store.
    pub fn mods(&self) -> &EntityStore<ModSubscription> {
        &self.mods
    }

    /// The collections store.
    pub fn collections(&self) -> &EntityStore<Collection> {
        &self.collections
    }

    /// The schedules store.
    pub fn schedules(&self) -> &EntityStore<Schedule> {
        &self.schedules
    }

    /// The servers store.
    pub fn servers(&self) -> &EntityStore<GameServer> {
        &self.servers
    }

    /// The image resource cache.
    pub fn images(&self) -> &ResourceCache {
        &self.images
    }

    /// The job poller.
    pub fn poller(&self) -> &JobPoller {
        &self.poller
    }

    // ---- Refresh ----

    /// Refetches every collection. Stops at the first failure, which is
    /// reported through the sink before it is returned.
    pub async fn refresh_all(&self) -> Result<()> {
        self.refresh_mods().await?;
        self.refresh_collections().await?;
        self.refresh_schedules().await?;
        self.refresh_servers().await?;
        Ok(())
    }

    /// Refetches the mods collection.
    pub async fn refresh_mods(&self) -> Result<()> {
        self.refresh_store(&self.mods).await
    }

    /// Refetches the collections collection.
    pub async fn refresh_collections(&self) -> Result<()> {
        self.refresh_store(&self.collections).await
    }

    /// Refetches the schedules collection.
    pub async fn refresh_schedules(&self) -> Result<()> {
        self.refresh_store(&self.schedules).await
    }

    /// Refetches the servers collection.
    pub async fn refresh_servers(&self) -> Result<()> {
        self.refresh_store(&self.servers).await
    }

    async fn refresh_store<E>(&self, store: &EntityStore<E>) -> Result<()>
    where
        E: crate::store::Keyed + Clone + Send + Sync + 'static,
    {
        store.refresh().await.map_err(|err| {
            self.sink.report(store.label(), &err);
            err
        })
    }

    /// Refetch used inside successful flows, where a fetch failure must
    /// not mask the operation's result.
    async fn refresh_quietly<E>(&self, store: &EntityStore<E>)
    where
        E: crate::store::Keyed + Clone + Send + Sync + 'static,
    {
        if let Err(err) = store.refresh().await {
            self.sink.report(store.label(), &err);
        }
    }

    // ---- Mod subscriptions ----

    /// Subscribes to a workshop item. The server computes the record, so
    /// the mods collection is refetched on success.
    pub async fn add_mod(&self, steam_id: u64) -> Result<()> {
        let request = [NewModSubscription { steam_id }];
        match self.gateway.add_mods(&request).await {
            Ok(_) => {
                self.refresh_quietly(&self.mods).await;
                Ok(())
            }
            Err(err) => {
                self.sink.report("add mod subscription", &err);
                Err(err)
            }
        }
    }

    /// Edits a subscription optimistically; rolls back if the server
    /// rejects the change.
    pub async fn update_mod(&self, id: ModId, patch: ModSubscriptionPatch) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        let body = patch.clone();
        self.mods
            .apply(
                Mutation::update(id, move |subscription: &mut ModSubscription| {
                    patch.apply_to(subscription);
                }),
                MutationPolicy::plain(),
                async move { gateway.update_mod(id, &body).await.map(|_| ()) },
            )
            .await
    }

    /// Removes a subscription optimistically; rolls back on failure.
    pub async fn remove_mod(&self, id: ModId) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        self.mods
            .apply(Mutation::Delete(id), MutationPolicy::plain(), async move {
                gateway.remove_mod(id).await.map(|_| ())
            })
            .await
    }

    /// Starts a mod download and polls it to completion. The mods
    /// collection is refetched once polling ends, whatever the outcome.
    pub async fn download_mod(&self, id: ModId) -> Result<JobStatus> {
        self.download_mod_with(id, None, None).await
    }

    /// [`download_mod`](Self::download_mod) with status observers.
    pub async fn download_mod_with(
        &self,
        id: ModId,
        on_status_change: Option<StatusCallback>,
        on_complete: Option<StatusCallback>,
    ) -> Result<JobStatus> {
        self.sink.notify(Notice::info("Download requested"));
        let job = async { self.gateway.download_mod(id).await };
        self.run_job("download mod", &self.mods, job, on_status_change, on_complete)
            .await
    }

    /// Starts an asynchronous uninstall of the mod's files and polls it
    /// to completion.
    pub async fn uninstall_mod(&self, id: ModId) -> Result<JobStatus> {
        self.sink.notify(Notice::info("Uninstall requested"));
        let job = async { self.gateway.uninstall_mod(id).await };
        self.run_job("uninstall mod", &self.mods, job, None, None)
            .await
    }

    /// Fetches the mod's preview image and acquires a cache reference.
    ///
    /// The caller owns exactly one reference and must pair this with one
    /// [`release_mod_image`](Self::release_mod_image) on teardown. A
    /// missing image is not reported as an error notice -- the UI shows a
    /// fallback.
    pub async fn load_mod_image(&self, id: ModId) -> Result<ResourceHandle> {
        self.load_mod_image_with(id, |_| async { Ok(()) }).await
    }

    /// [`load_mod_image`](Self::load_mod_image) with a preload probe run
    /// against the handle before it is exposed (e.g. an image decode
    /// check). A probe failure is returned but leaves the acquired
    /// reference in place: the caller still owes one release.
    pub async fn load_mod_image_with<F, Fut>(
        &self,
        id: ModId,
        probe: F,
    ) -> Result<ResourceHandle>
    where
        F: FnOnce(ResourceHandle) -> Fut,
        Fut: std::future::Future<Output = Result<()>>,
    {
        let key = Self::image_key(id);
        let bytes = match self.gateway.mod_image(id).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(%id, %err, "mod image unavailable");
                return Err(err);
            }
        };
        self.images
            .get_or_create_loaded(&key, bytes, probe)
            .await
            .map_err(|err| {
                tracing::warn!(%id, %err, "mod image preload failed");
                err
            })
    }

    /// Releases one reference to the mod's cached image.
    pub fn release_mod_image(&self, id: ModId) {
        self.images.release(&Self::image_key(id));
    }

    fn image_key(id: ModId) -> String {
        format!("{MOD_IMAGE_KEY_PREFIX}{id}")
    }

    // ---- Collections ----

    /// Creates a collection and refetches the collections store.
    pub async fn create_collection(&self, new: NewCollection) -> Result<Collection> {
        match self.gateway.create_collection(&new).await {
            Ok(collection) => {
                self.refresh_quietly(&self.collections).await;
                Ok(collection)
            }
            Err(err) => {
                self.sink.report("create collection", &err);
                Err(err)
            }
        }
    }

    /// Edits a collection optimistically; rolls back on failure.
    pub async fn update_collection(
        &self,
        id: CollectionId,
        patch: CollectionPatch,
    ) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        let body = patch.clone();
        self.collections
            .apply(
                Mutation::update(id, move |collection: &mut Collection| {
                    patch.apply_to(collection);
                }),
                MutationPolicy::plain(),
                async move { gateway.update_collection(id, &body).await.map(|_| ()) },
            )
            .await
    }

    /// Deletes a collection optimistically; rolls back on failure.
    pub async fn delete_collection(&self, id: CollectionId) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        self.collections
            .apply(Mutation::Delete(id), MutationPolicy::plain(), async move {
                gateway.delete_collection(id).await.map(|_| ())
            })
            .await
    }

    /// Adds mods to a collection. On success both the collections and
    /// the mods stores are refetched: each carries a denormalized view
    /// of the other. On failure the collections store is refetched too,
    /// since the server may have applied part of the batch.
    pub async fn add_collection_mods(&self, id: CollectionId, mods: Vec<ModId>) -> Result<()> {
        match self.gateway.add_collection_mods(id, &mods).await {
            Ok(_) => {
                self.refresh_quietly(&self.collections).await;
                self.refresh_quietly(&self.mods).await;
                Ok(())
            }
            Err(err) => {
                self.sink.report("add mods to collection", &err);
                self.refresh_quietly(&self.collections).await;
                Err(err)
            }
        }
    }

    /// Removes a mod from a collection optimistically; rolls back on
    /// failure.
    pub async fn remove_collection_mod(&self, id: CollectionId, mod_id: ModId) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        self.collections
            .apply(
                Mutation::update(id, move |collection: &mut Collection| {
                    collection.remove_mod(mod_id);
                }),
                MutationPolicy::plain(),
                async move { gateway.remove_collection_mod(id, mod_id).await.map(|_| ()) },
            )
            .await
    }

    /// Moves a mod to a new load order. The local reorder is a guess;
    /// the collections store is resynchronized with the server's
    /// normalized numbering after success and after failure.
    pub async fn reorder_collection_mod(
        &self,
        id: CollectionId,
        mod_id: ModId,
        load_order: u32,
    ) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        self.collections
            .apply(
                Mutation::update(id, move |collection: &mut Collection| {
                    collection.reorder_mod(mod_id, load_order);
                }),
                MutationPolicy::reorder(),
                async move {
                    gateway
                        .reorder_collection_mod(id, mod_id, load_order)
                        .await
                        .map(|_| ())
                },
            )
            .await
    }

    // ---- Schedules ----

    /// Creates a schedule and refetches the schedules store.
    pub async fn create_schedule(&self, new: NewSchedule) -> Result<Schedule> {
        match self.gateway.create_schedule(&new).await {
            Ok(schedule) => {
                self.refresh_quietly(&self.schedules).await;
                Ok(schedule)
            }
            Err(err) => {
                self.sink.report("create schedule", &err);
                Err(err)
            }
        }
    }

    /// Edits a schedule optimistically; rolls back on failure.
    pub async fn update_schedule(&self, id: ScheduleId, patch: SchedulePatch) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        let body = patch.clone();
        self.schedules
            .apply(
                Mutation::update(id, move |schedule: &mut Schedule| {
                    patch.apply_to(schedule);
                }),
                MutationPolicy::plain(),
                async move { gateway.update_schedule(id, &body).await.map(|_| ()) },
            )
            .await
    }

    /// Deletes a schedule optimistically; rolls back on failure.
    pub async fn delete_schedule(&self, id: ScheduleId) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        self.schedules
            .apply(Mutation::Delete(id), MutationPolicy::plain(), async move {
                gateway.delete_schedule(id).await.map(|_| ())
            })
            .await
    }

    /// Enables or disables a schedule optimistically; rolls back on
    /// failure.
    pub async fn toggle_schedule(&self, id: ScheduleId, enabled: bool) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        self.schedules
            .apply(
                Mutation::update(id, move |schedule: &mut Schedule| {
                    schedule.enabled = enabled;
                }),
                MutationPolicy::plain(),
                async move { gateway.toggle_schedule(id, enabled).await.map(|_| ()) },
            )
            .await
    }

    /// Triggers an immediate run of the schedule's action and polls it
    /// to completion. The schedules store is refetched afterwards so
    /// `last_run`/`last_outcome` reflect the run.
    pub async fn execute_schedule(&self, id: ScheduleId) -> Result<JobStatus> {
        let job = async { self.gateway.execute_schedule(id).await };
        self.run_job("execute schedule", &self.schedules, job, None, None)
            .await
    }

    // ---- Servers ----

    /// One server configuration, fetched directly.
    pub async fn get_server(&self, id: ServerId) -> Result<GameServer> {
        self.gateway.get_server(id).await.map_err(|err| {
            self.sink.report("server", &err);
            err
        })
    }

    // ---- Health ----

    /// Liveness check against the API.
    pub async fn health(&self) -> Result<crate::gateway::Ack> {
        self.gateway.health().await
    }

    // ---- Jobs ----

    /// Polls an arbitrary job with the client's configured cadence.
    pub async fn poll_job(
        &self,
        job_id: &JobId,
        on_status_change: Option<StatusCallback>,
        on_complete: Option<StatusCallback>,
    ) -> JobStatus {
        self.poller
            .poll(job_id, self.poll_options.clone(), on_status_change, on_complete)
            .await
    }

    /// One un-polled status check.
    pub async fn job_status(&self, job_id: &JobId) -> Result<JobStatus> {
        self.poller.status(job_id).await
    }

    /// Starts a job, polls it to a terminal status, then refetches the
    /// affected store -- the poll outcome alone is not trusted as server
    /// truth.
    async fn run_job<E, F>(
        &self,
        context: &str,
        store: &EntityStore<E>,
        accept: F,
        on_status_change: Option<StatusCallback>,
        on_complete: Option<StatusCallback>,
    ) -> Result<JobStatus>
    where
        E: crate::store::Keyed + Clone + Send + Sync + 'static,
        F: std::future::Future<Output = Result<crate::types::JobAccepted>>,
    {
        let accepted = match accept.await {
            Ok(accepted) => accepted,
            Err(err) => {
                self.sink.report(context, &err);
                return Err(err);
            }
        };
        let status = self
            .poller
            .poll(
                &accepted.job_id,
                self.poll_options.clone(),
                on_status_change,
                on_complete,
            )
            .await;
        self.refresh_quietly(store).await;
        Ok(status)
    }
}

impl std::fmt::Debug for DashboardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardClient")
            .field("mods", &self.mods)
            .field("collections", &self.collections)
            .field("schedules", &self.schedules)
            .field("servers", &self.servers)
            .finish_non_exhaustive()
    }
}
