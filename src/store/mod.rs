//! Optimistic, order-preserving entity stores with rollback and
//! server reconciliation.
//!
//! # Architecture
//!
//! The store layer has three pieces:
//!
//! 1. **[`Keyed`]** -- implemented by every entity type; gives each
//!    record a stable unique key. At most one record per key lives in a
//!    store at any time.
//! 2. **[`EntityStore<E>`]** -- the single mutable source of truth for
//!    one entity collection. Reads always reflect the latest local state,
//!    including unconfirmed optimistic mutations. Mutations apply locally
//!    first, then await the remote call, and roll back to the
//!    pre-mutation snapshot if it fails.
//! 3. **[`EntityFetcher`]** -- how the store refetches server truth when
//!    a mutation class requires reconciliation.
//!
//! # Consistency model
//!
//! The local mutation and the rollback are both whole-snapshot swaps
//! under a write lock, so readers only ever observe "before" or "after",
//! never a half-applied state. Concurrent mutations against the same key
//! are not queued: the last local write wins locally and the
//! last-resolving remote call wins on the server -- callers that need
//! ordering must await one mutation before issuing the next.
//!
//! Reconciliation is policy-driven per mutation class
//! ([`MutationPolicy`]): plain mutations keep the optimistic result on
//! success with no redundant refetch; reorder/batch classes refetch on
//! success (server-computed derived fields) and on failure (local state
//! cannot be trusted after a partial operation).
//!
//! Every failed mutation is reported exactly once through the store's
//! [`ErrorSink`](crate::report::ErrorSink) before the error is returned.

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::report::ErrorSink;

/// An entity with a stable unique key.
pub trait Keyed {
    /// The key type. Cloneable and hashable so it can index the store.
    type Key: Clone + Eq + Hash + fmt::Debug + Send + Sync;

    /// The entity's key.
    fn key(&self) -> Self::Key;
}

/// Fetches the authoritative server state of one entity collection.
///
/// Used by [`EntityStore::refresh`] to reconcile local state with server
/// truth after invalidation.
#[async_trait]
pub trait EntityFetcher<E>: Send + Sync {
    /// Fetches every entity in the collection.
    async fn fetch_all(&self) -> Result<Vec<E>>;
}

/// A single optimistic mutation against one store.
///
/// Mirrors the pending-mutation lifecycle: created together with the
/// local state change, consumed when the remote call resolves (success
/// drops it, failure restores the pre-mutation snapshot).
pub enum Mutation<E: Keyed> {
    /// Insert a full record. Replaces any record with the same key.
    Insert(E),
    /// Patch the record with the given key in place. Applies nothing
    /// locally if the key is absent (the remote call still runs; the
    /// server is authoritative).
    Update {
        /// Key of the record to patch.
        key: E::Key,
        /// In-place patch, the optimistic mirror of the remote payload.
        patch: Box<dyn FnOnce(&mut E) + Send>,
    },
    /// Remove the record with the given key. Local no-op if absent.
    Delete(E::Key),
}

impl<E: Keyed> Mutation<E> {
    /// Convenience constructor for [`Mutation::Update`].
    pub fn update(key: E::Key, patch: impl FnOnce(&mut E) + Send + 'static) -> Self {
        Self::Update {
            key,
            patch: Box::new(patch),
        }
    }
}

impl<E: Keyed + fmt::Debug> fmt::Debug for Mutation<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert(item) => f.debug_tuple("Insert").field(item).finish(),
            Self::Update { key, .. } => f.debug_struct("Update").field("key", key).finish(),
            Self::Delete(key) => f.debug_tuple("Delete").field(key).finish(),
        }
    }
}

/// Reconciliation behavior of a mutation class.
///
/// # Examples
///
/// ```
/// use garrison_client::store::MutationPolicy;
///
/// let plain = MutationPolicy::plain();
/// assert!(!plain.reconcile_on_success);
/// assert!(!plain.invalidate_on_error);
///
/// let reorder = MutationPolicy::reorder();
/// assert!(reorder.reconcile_on_success);
/// assert!(reorder.invalidate_on_error);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MutationPolicy {
    /// Refetch the collection after a successful remote call. For
    /// mutation classes where the server computes derived fields the
    /// optimistic guess cannot reproduce (normalized load orders).
    pub reconcile_on_success: bool,

    /// Refetch the collection after a failed remote call, on top of the
    /// rollback. For classes where a partial server-side operation may
    /// have left state the rollback cannot reconstruct.
    pub invalidate_on_error: bool,
}

impl MutationPolicy {
    /// Ordinary single-record mutation: optimistic state is final on
    /// success, rollback alone suffices on failure.
    pub fn plain() -> Self {
        Self::default()
    }

    /// Reordering/batch mutation: server truth is refetched after both
    /// outcomes.
    pub fn reorder() -> Self {
        Self {
            reconcile_on_success: true,
            invalidate_on_error: true,
        }
    }
}

/// The single mutable source of truth for one entity collection.
///
/// Order-preserving: entities keep the order the server returned them in
/// (and inserts append), which is meaningful for load-ordered
/// collections.
pub struct EntityStore<E: Keyed> {
    label: &'static str,
    entries: RwLock<IndexMap<E::Key, E>>,
    fetcher: Arc<dyn EntityFetcher<E>>,
    sink: Arc<dyn ErrorSink>,
}

impl<E> EntityStore<E>
where
    E: Keyed + Clone + Send + Sync + 'static,
{
    /// Creates an empty store.
    ///
    /// `label` names the collection in error reports (e.g. `"mods"`).
    pub fn new(
        label: &'static str,
        fetcher: Arc<dyn EntityFetcher<E>>,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            label,
            entries: RwLock::new(IndexMap::new()),
            fetcher,
            sink,
        }
    }

    /// The collection's label.
    pub fn label(&self) -> &'static str {
        self.label
    }

    // ---- Read surface ----

    /// The record with the given key, if present.
    pub fn get(&self, key: &E::Key) -> Option<E> {
        self.entries.read().get(key).cloned()
    }

    /// All records in collection order.
    pub fn entries(&self) -> Vec<E> {
        self.entries.read().values().cloned().collect()
    }

    /// All keys in collection order.
    pub fn keys(&self) -> Vec<E::Key> {
        self.entries.read().keys().cloned().collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns `true` if a record with the given key is present.
    pub fn contains(&self, key: &E::Key) -> bool {
        self.entries.read().contains_key(key)
    }

    // ---- Reconciliation ----

    /// Atomically replaces the whole collection with server truth.
    ///
    /// On duplicate keys the last record wins, preserving the invariant
    /// of at most one record per key.
    pub fn replace_all(&self, items: Vec<E>) {
        let map: IndexMap<E::Key, E> = items.into_iter().map(|item| (item.key(), item)).collect();
        *self.entries.write() = map;
    }

    /// Discards local state and refetches the collection from the
    /// server.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; local state is left untouched so readers
    /// keep the best-known snapshot.
    pub async fn refresh(&self) -> Result<()> {
        let items = self.fetcher.fetch_all().await?;
        tracing::debug!(collection = self.label, count = items.len(), "refetched");
        self.replace_all(items);
        Ok(())
    }

    /// Refresh variant for reconciliation paths: a fetch failure is
    /// reported through the sink instead of propagating, so it cannot
    /// mask the outcome of the mutation that triggered it.
    async fn refresh_or_report(&self) {
        if let Err(err) = self.refresh().await {
            self.sink.report(self.label, &err);
        }
    }

    // ---- Mutation surface ----

    /// Applies an optimistic mutation.
    ///
    /// The local collection is mutated synchronously (immediately visible
    /// to all readers), then `op` -- the one remote call carrying the
    /// same payload -- is awaited:
    ///
    /// - success: optimistic state stays; if the policy requires
    ///   reconciliation the collection is refetched.
    /// - failure: the pre-mutation snapshot is restored, the error is
    ///   reported once through the sink, and if the policy says so the
    ///   collection is refetched to resynchronize with the server.
    ///
    /// # Errors
    ///
    /// Returns `op`'s error after rollback and reporting.
    pub async fn apply<T, F>(
        &self,
        mutation: Mutation<E>,
        policy: MutationPolicy,
        op: F,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
        T: Send,
    {
        let before = self.entries.read().clone();

        {
            let mut entries = self.entries.write();
            match mutation {
                Mutation::Insert(item) => {
                    entries.insert(item.key(), item);
                }
                Mutation::Update { key, patch } => {
                    if let Some(item) = entries.get_mut(&key) {
                        patch(item);
                    } else {
                        tracing::debug!(
                            collection = self.label,
                            ?key,
                            "optimistic update of absent key; remote call still issued"
                        );
                    }
                }
                Mutation::Delete(key) => {
                    entries.shift_remove(&key);
                }
            }
        }

        match op.await {
            Ok(value) => {
                if policy.reconcile_on_success {
                    self.refresh_or_report().await;
                }
                Ok(value)
            }
            Err(err) => {
                *self.entries.write() = before;
                self.sink.report(self.label, &err);
                if policy.invalidate_on_error {
                    self.refresh_or_report().await;
                }
                Err(err)
            }
        }
    }
}

impl<E: Keyed> fmt::Debug for EntityStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("label", &self.label)
            .field("len", &self.entries.read().len())
            .finish()
    }
}

/// Fetcher that always fails. Useful for stores whose collection is
/// mutated purely optimistically in contexts with no list endpoint.
pub struct NoFetch;

#[async_trait]
impl<E: Send + 'static> EntityFetcher<E> for NoFetch {
    async fn fetch_all(&self) -> Result<Vec<E>> {
        Err(Error::Config("collection has no fetcher".to_string()))
    }
}
