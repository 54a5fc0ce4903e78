//! Reference-counted cache for locally-materialized binary resources.
//!
//! Preview images are fetched as raw bytes and materialized into a
//! [`ResourceHandle`] that many consumers can share. The cache counts
//! references per key so a resource is freed exactly when its last
//! consumer releases it -- repeated mount/unmount cycles in the UI
//! neither leak memory nor revoke a resource still in use elsewhere.
//!
//! # Ownership discipline
//!
//! Every consumer that calls [`get_or_create`](ResourceCache::get_or_create)
//! must call [`release`](ResourceCache::release) exactly once when it no
//! longer needs the resource, regardless of whether any secondary load
//! step ever finished, and must not retain the handle afterwards.
//! Releasing an unknown key or releasing more times than acquired is
//! absorbed silently -- UI teardown ordering races are expected, not
//! errors.
//!
//! # Key stability
//!
//! On a cache hit the `bytes` argument is ignored: the cache assumes a
//! stable key always maps to the same content. Call sites own that
//! invariant (keys here embed the mod id, whose image the server treats
//! as immutable-per-version). [`peek`](ResourceCache::peek) and
//! [`ref_count`](ResourceCache::ref_count) exist to diagnose violations.
//!
//! The cache is an injected value, not a global: tests and embedders
//! instantiate isolated copies.

use std::future::Future;

use bytes::Bytes;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{Error, Result};

/// A locally-materialized binary resource.
///
/// Identity (`id`) is minted per materialization: after an entry's
/// refcount reaches zero and it is freed, a later acquisition of the same
/// key yields a handle with a new id. Clones share the underlying bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    id: Uuid,
    data: Bytes,
}

impl ResourceHandle {
    fn materialize(data: Bytes) -> Self {
        Self {
            id: Uuid::new_v4(),
            data,
        }
    }

    /// Unique identity of this materialization.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The resource's bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Size of the resource in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the resource is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug)]
struct CacheEntry {
    handle: ResourceHandle,
    ref_count: usize,
}

/// Reference-counted map from cache key to materialized resource.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use garrison_client::cache::ResourceCache;
///
/// let cache = ResourceCache::new();
///
/// let first = cache.get_or_create("img-1", Bytes::from_static(b"png"));
/// let second = cache.get_or_create("img-1", Bytes::from_static(b"ignored"));
/// assert_eq!(first, second);
/// assert_eq!(cache.ref_count("img-1"), 2);
///
/// cache.release("img-1");
/// assert!(cache.has("img-1"));
/// cache.release("img-1");
/// assert!(!cache.has("img-1"));
///
/// // Over-release is absorbed.
/// cache.release("img-1");
/// ```
#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: DashMap<String, CacheEntry>,
}

impl ResourceCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `key`, materializing it from `bytes` on
    /// first acquisition. Increments the key's reference count.
    ///
    /// On a hit the existing handle is returned and `bytes` is ignored
    /// (see the module docs on key stability).
    pub fn get_or_create(&self, key: &str, bytes: Bytes) -> ResourceHandle {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry {
                handle: ResourceHandle::materialize(bytes),
                ref_count: 0,
            });
        entry.ref_count += 1;
        entry.handle.clone()
    }

    /// Releases one reference to `key`. Frees the resource and removes
    /// the entry when the count reaches zero.
    ///
    /// Unknown keys and over-releases are absorbed without effect.
    pub fn release(&self, key: &str) {
        let reached_zero = match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.ref_count = entry.ref_count.saturating_sub(1);
                entry.ref_count == 0
            }
            None => {
                tracing::warn!(key, "release for unknown resource key ignored");
                return;
            }
        };
        if reached_zero {
            // Re-checked under the entry lock: a concurrent acquisition
            // between the decrement and here keeps the entry alive.
            self.entries.remove_if(key, |_, entry| entry.ref_count == 0);
        }
    }

    /// Materializes (or reuses) the resource, then runs a secondary
    /// asynchronous load step against the handle before exposing it.
    ///
    /// The probe models decode/validation work that must finish before a
    /// consumer can treat the resource as usable. A probe failure is
    /// surfaced as [`Error::ResourceLoad`] but does **not** touch the
    /// refcount bookkeeping: the caller acquired one reference either way
    /// and still owes one [`release`](Self::release).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceLoad`] when the probe fails.
    pub async fn get_or_create_loaded<F, Fut>(
        &self,
        key: &str,
        bytes: Bytes,
        probe: F,
    ) -> Result<ResourceHandle>
    where
        F: FnOnce(ResourceHandle) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let handle = self.get_or_create(key, bytes);
        match probe(handle.clone()).await {
            Ok(()) => Ok(handle),
            Err(err) => Err(Error::ResourceLoad {
                key: key.to_string(),
                message: err.to_string(),
            }),
        }
    }

    /// Returns `true` if a live entry exists for `key`.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The current handle for `key` without touching the reference
    /// count. Diagnostic use only -- holding the returned handle does not
    /// keep the entry alive.
    pub fn peek(&self, key: &str) -> Option<ResourceHandle> {
        self.entries.get(key).map(|entry| entry.handle.clone())
    }

    /// Current reference count for `key` (zero if absent).
    pub fn ref_count(&self, key: &str) -> usize {
        self.entries.get(key).map_or(0, |entry| entry.ref_count)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frees every entry regardless of reference counts. For teardown
    /// and tests.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
