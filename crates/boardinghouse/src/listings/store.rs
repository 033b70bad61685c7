use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{Listing, ListingId, ListingUpdate, NewListing};

/// Storage for user-added listings. Catalog entries never pass through here.
pub trait ListingRepository: Send + Sync {
    fn list(&self) -> Result<Vec<Listing>, StoreError>;
    fn add(&self, listing: NewListing) -> Result<Listing, StoreError>;
    fn update(&self, id: ListingId, update: ListingUpdate) -> Result<Listing, StoreError>;
    fn delete(&self, id: ListingId) -> Result<Listing, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("listing {0} not found")]
    NotFound(ListingId),
    #[error("listing store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("listing store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("listing store lock poisoned")]
    Poisoned,
}

/// Persisted shape of the user listing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingBlob {
    pub houses: Vec<Listing>,
    pub last_id: ListingId,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Entries {
    houses: Vec<Listing>,
    last_id: ListingId,
}

impl Entries {
    fn add(&mut self, listing: NewListing) -> Listing {
        self.last_id += 1;
        let listing = listing.into_listing(self.last_id);
        self.houses.push(listing.clone());
        listing
    }

    fn update(&mut self, id: ListingId, update: ListingUpdate) -> Result<Listing, StoreError> {
        let listing = self
            .houses
            .iter_mut()
            .find(|listing| listing.id == id)
            .ok_or(StoreError::NotFound(id))?;
        update.apply(listing);
        Ok(listing.clone())
    }

    fn delete(&mut self, id: ListingId) -> Result<Listing, StoreError> {
        let index = self
            .houses
            .iter()
            .position(|listing| listing.id == id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(self.houses.remove(index))
    }
}

/// Process-local store used by tests and when no store path is configured.
#[derive(Debug, Default)]
pub struct InMemoryListingStore {
    entries: Mutex<Entries>,
}

impl InMemoryListingStore {
    /// Ids handed out start after `last_id`.
    pub fn new(last_id: ListingId) -> Self {
        Self {
            entries: Mutex::new(Entries {
                houses: Vec::new(),
                last_id,
            }),
        }
    }
}

impl ListingRepository for InMemoryListingStore {
    fn list(&self) -> Result<Vec<Listing>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.houses.clone())
    }

    fn add(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.add(listing))
    }

    fn update(&self, id: ListingId, update: ListingUpdate) -> Result<Listing, StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.update(id, update)
    }

    fn delete(&self, id: ListingId) -> Result<Listing, StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.delete(id)
    }
}

/// JSON-file store. The whole blob is rewritten through a temp file on
/// every mutation and reloaded on open.
#[derive(Debug)]
pub struct FileListingStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileListingStore {
    /// Open or create the store at `path`. Ids never fall back below
    /// `min_last_id`, so user entries cannot collide with the catalog.
    pub fn open(path: impl Into<PathBuf>, min_last_id: ListingId) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let blob: ListingBlob = serde_json::from_str(&raw)?;
            debug!(
                path = %path.display(),
                houses = blob.houses.len(),
                last_id = blob.last_id,
                "listing store loaded"
            );
            Entries {
                houses: blob.houses,
                last_id: blob.last_id.max(min_last_id),
            }
        } else {
            Entries {
                houses: Vec::new(),
                last_id: min_last_id,
            }
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &Entries) -> Result<(), StoreError> {
        let blob = ListingBlob {
            houses: entries.houses.clone(),
            last_id: entries.last_id,
            saved_at: Utc::now(),
        };
        let payload = serde_json::to_vec_pretty(&blob)?;

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&staging)?;
            file.write_all(&payload)?;
            file.sync_all()?;
        }
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    /// Apply a mutation and persist; the in-memory copy only changes when the
    /// write succeeds.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Entries) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        let mut draft = Entries {
            houses: entries.houses.clone(),
            last_id: entries.last_id,
        };
        let value = change(&mut draft)?;
        self.persist(&draft)?;
        *entries = draft;
        Ok(value)
    }
}

impl ListingRepository for FileListingStore {
    fn list(&self) -> Result<Vec<Listing>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.houses.clone())
    }

    fn add(&self, listing: NewListing) -> Result<Listing, StoreError> {
        self.mutate(|entries| Ok(entries.add(listing)))
    }

    fn update(&self, id: ListingId, update: ListingUpdate) -> Result<Listing, StoreError> {
        self.mutate(|entries| entries.update(id, update))
    }

    fn delete(&self, id: ListingId) -> Result<Listing, StoreError> {
        self.mutate(|entries| entries.delete(id))
    }
}
