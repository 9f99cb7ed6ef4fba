//! Song record store
//!
//! [`SongStore`] is the capability the handlers depend on. The only
//! implementation keeps records in process memory; a durable backend can be
//! swapped in behind the same trait.

use async_trait::async_trait;
use songchain_common::models::{data_id_for, SongPayload, SongRecord, SongStatus, StatusUpdate};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Data for a record about to be appended
#[derive(Debug, Clone)]
pub struct NewSong {
    pub data_id: String,
    pub song: SongPayload,
    pub baas_task_id: Option<String>,
}

/// Record store capability
#[async_trait]
pub trait SongStore: Send + Sync {
    /// All records in insertion order
    async fn list(&self) -> Vec<SongRecord>;

    /// Number of records
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Reserve a correlation key for a unix timestamp (seconds).
    ///
    /// Returns `song_<ts>` or, if that key is taken or reserved,
    /// `song_<ts>_2`, `song_<ts>_3`, ...
    async fn reserve_data_id(&self, unix_seconds: i64) -> String;

    /// Drop a reservation that will never be appended
    async fn release_data_id(&self, data_id: &str);

    /// Append a pending record, assigning the next 1-based id
    async fn append(&self, new_song: NewSong) -> SongRecord;

    /// First record with the given correlation key
    async fn find_by_data_id(&self, data_id: &str) -> Option<SongRecord>;

    /// Apply a webhook update to the first record with the given key.
    ///
    /// Returns the updated record, or `None` when nothing matches.
    async fn apply_update(&self, data_id: &str, update: &StatusUpdate) -> Option<SongRecord>;
}

/// A reserved correlation key.
///
/// Dropping it without [`Reservation::commit`] or [`Reservation::release`]
/// releases the key in a background task, so a request abandoned mid-flight
/// does not leave the key reserved.
pub struct Reservation {
    store: Arc<dyn SongStore>,
    data_id: String,
    settled: bool,
}

impl Reservation {
    /// Reserve a fresh key for a unix timestamp (seconds)
    pub async fn acquire(store: Arc<dyn SongStore>, unix_seconds: i64) -> Self {
        let data_id = store.reserve_data_id(unix_seconds).await;
        Self {
            store,
            data_id,
            settled: false,
        }
    }

    pub fn data_id(&self) -> &str {
        &self.data_id
    }

    /// Append the record under the reserved key
    pub async fn commit(mut self, song: SongPayload, baas_task_id: Option<String>) -> SongRecord {
        let record = self
            .store
            .append(NewSong {
                data_id: self.data_id.clone(),
                song,
                baas_task_id,
            })
            .await;
        self.settled = true;
        record
    }

    /// Give the key back now
    pub async fn release(mut self) {
        self.store.release_data_id(&self.data_id).await;
        self.settled = true;
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let store = Arc::clone(&self.store);
        let data_id = std::mem::take(&mut self.data_id);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                store.release_data_id(&data_id).await;
            });
        }
    }
}

#[derive(Default)]
struct Inner {
    songs: Vec<SongRecord>,
    reserved: HashSet<String>,
}

impl Inner {
    fn is_taken(&self, data_id: &str) -> bool {
        self.reserved.contains(data_id) || self.songs.iter().any(|s| s.data_id == data_id)
    }
}

/// In-memory store; every read-modify-write runs under one lock
#[derive(Default)]
pub struct InMemorySongStore {
    inner: RwLock<Inner>,
}

impl InMemorySongStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SongStore for InMemorySongStore {
    async fn list(&self) -> Vec<SongRecord> {
        self.inner.read().await.songs.clone()
    }

    async fn len(&self) -> usize {
        self.inner.read().await.songs.len()
    }

    async fn reserve_data_id(&self, unix_seconds: i64) -> String {
        let mut inner = self.inner.write().await;

        let base = data_id_for(unix_seconds);
        let mut candidate = base.clone();
        let mut suffix = 2u32;
        while inner.is_taken(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        inner.reserved.insert(candidate.clone());
        candidate
    }

    async fn release_data_id(&self, data_id: &str) {
        self.inner.write().await.reserved.remove(data_id);
    }

    async fn append(&self, new_song: NewSong) -> SongRecord {
        let mut inner = self.inner.write().await;
        inner.reserved.remove(&new_song.data_id);

        let record = SongRecord {
            id: inner.songs.len() as u64 + 1,
            data_id: new_song.data_id,
            song: new_song.song,
            baas_task_id: new_song.baas_task_id,
            status: SongStatus::Pending,
            blockchain_tx_id: None,
            explorer_url: None,
        };
        inner.songs.push(record.clone());
        record
    }

    async fn find_by_data_id(&self, data_id: &str) -> Option<SongRecord> {
        self.inner
            .read()
            .await
            .songs
            .iter()
            .find(|s| s.data_id == data_id)
            .cloned()
    }

    async fn apply_update(&self, data_id: &str, update: &StatusUpdate) -> Option<SongRecord> {
        let mut inner = self.inner.write().await;
        let song = inner.songs.iter_mut().find(|s| s.data_id == data_id)?;
        song.apply(update);
        Some(song.clone())
    }
}
