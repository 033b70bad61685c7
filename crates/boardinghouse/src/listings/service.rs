use std::sync::Arc;

use tracing::info;

use super::catalog::ListingCatalog;
use super::domain::{Listing, ListingId, ListingUpdate, Locality, NewListing};
use super::store::{ListingRepository, StoreError};
use crate::routing::GeoPoint;

/// Merges the read-only catalog with user-added listings.
pub struct ListingService {
    catalog: Arc<ListingCatalog>,
    store: Arc<dyn ListingRepository>,
}

impl ListingService {
    pub fn new(catalog: Arc<ListingCatalog>, store: Arc<dyn ListingRepository>) -> Self {
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &ListingCatalog {
        &self.catalog
    }

    pub fn localities(&self) -> &[Locality] {
        self.catalog.localities()
    }

    /// Catalog and user listings for a locality and search term, by id.
    pub fn search(
        &self,
        locality: Option<&str>,
        term: Option<&str>,
    ) -> Result<Vec<Listing>, ListingError> {
        let key = locality.map(|key| key.trim().to_ascii_lowercase());
        let locality = key.as_deref();
        let mut listings: Vec<Listing> = self
            .catalog
            .search(locality, term)
            .into_iter()
            .cloned()
            .collect();
        listings.extend(
            self.store
                .list()?
                .into_iter()
                .filter(|listing| locality.map_or(true, |key| listing.locality == key))
                .filter(|listing| term.map_or(true, |term| listing.matches(term))),
        );
        listings.sort_by_key(|listing| listing.id);
        Ok(listings)
    }

    pub fn add(&self, mut listing: NewListing) -> Result<Listing, ListingError> {
        listing.name = listing.name.trim().to_string();
        if listing.name.is_empty() {
            return Err(ListingError::MissingName);
        }
        listing.locality = listing.locality.trim().to_ascii_lowercase();
        if !self.catalog.has_locality(&listing.locality) {
            return Err(ListingError::UnknownLocality(listing.locality));
        }
        self.check_area(listing.coordinates)?;

        let stored = self.store.add(listing)?;
        info!(id = stored.id, locality = %stored.locality, "listing added");
        Ok(stored)
    }

    pub fn update(&self, id: ListingId, mut update: ListingUpdate) -> Result<Listing, ListingError> {
        self.ensure_writable(id)?;
        if let Some(name) = update.name.as_mut() {
            *name = name.trim().to_string();
            if name.is_empty() {
                return Err(ListingError::MissingName);
            }
        }
        if let Some(coordinates) = update.coordinates {
            self.check_area(coordinates)?;
        }

        let stored = self.store.update(id, update).map_err(|error| match error {
            StoreError::NotFound(id) => ListingError::NotFound(id),
            other => ListingError::Store(other),
        })?;
        info!(id, "listing updated");
        Ok(stored)
    }

    pub fn delete(&self, id: ListingId) -> Result<Listing, ListingError> {
        self.ensure_writable(id)?;
        let removed = self.store.delete(id).map_err(|error| match error {
            StoreError::NotFound(id) => ListingError::NotFound(id),
            other => ListingError::Store(other),
        })?;
        info!(id, "listing removed");
        Ok(removed)
    }

    fn ensure_writable(&self, id: ListingId) -> Result<(), ListingError> {
        if self.catalog.get(id).is_some() {
            return Err(ListingError::ReadOnly(id));
        }
        Ok(())
    }

    fn check_area(&self, point: GeoPoint) -> Result<(), ListingError> {
        if self.catalog.area().contains(point) {
            Ok(())
        } else {
            Err(ListingError::OutsideServiceArea {
                lat: point.lat,
                lng: point.lng,
            })
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("listing name is required")]
    MissingName,
    #[error("unknown locality '{0}'")]
    UnknownLocality(String),
    #[error("coordinates ({lat}, {lng}) are outside the service area")]
    OutsideServiceArea { lat: f64, lng: f64 },
    #[error("listing {0} belongs to the catalog and cannot be changed")]
    ReadOnly(ListingId),
    #[error("listing {0} not found")]
    NotFound(ListingId),
    #[error(transparent)]
    Store(#[from] StoreError),
}
