//! Boarding-house listings: the read-only catalog, user-pinned entries and
//! the map endpoints that serve both.

pub mod catalog;
pub mod domain;
pub mod router;
pub mod service;
pub mod store;

pub use catalog::{CatalogError, ListingCatalog};
pub use domain::{
    Listing, ListingId, ListingSource, ListingStatus, ListingUpdate, Locality, NewListing,
    ServiceArea,
};
pub use router::listings_router;
pub use service::{ListingError, ListingService};
pub use store::{FileListingStore, InMemoryListingStore, ListingBlob, ListingRepository, StoreError};
