use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::accreditation::AccreditationStatus;
use crate::routing::GeoPoint;

/// Identifier shared by catalog and user-added listings.
pub type ListingId = u64;

/// Accreditation badge shown on a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListingStatus {
    Accredited,
    Conditional,
    #[serde(rename = "Not Accredited")]
    NotAccredited,
    #[default]
    Pending,
}

impl ListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ListingStatus::Accredited => "Accredited",
            ListingStatus::Conditional => "Conditional",
            ListingStatus::NotAccredited => "Not Accredited",
            ListingStatus::Pending => "Pending",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', " ").as_str() {
            "accredited" => Some(Self::Accredited),
            "conditional" => Some(Self::Conditional),
            "not accredited" => Some(Self::NotAccredited),
            "pending" | "" => Some(Self::Pending),
            _ => None,
        }
    }
}

impl From<AccreditationStatus> for ListingStatus {
    fn from(status: AccreditationStatus) -> Self {
        match status {
            AccreditationStatus::Accredited => Self::Accredited,
            AccreditationStatus::Conditional => Self::Conditional,
            AccreditationStatus::NotAccredited => Self::NotAccredited,
        }
    }
}

/// Where a listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSource {
    Catalog,
    #[default]
    User,
}

/// Boarding house shown on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub name: String,
    pub address: String,
    pub locality: String,
    pub rate: String,
    pub rating: f32,
    pub status: ListingStatus,
    pub amenities: BTreeSet<String>,
    pub features: BTreeSet<String>,
    pub coordinates: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<u32>,
    #[serde(default)]
    pub source: ListingSource,
}

impl Listing {
    /// Case-insensitive match on name or address; an empty term matches.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.name.to_lowercase().contains(&term)
            || self.address.to_lowercase().contains(&term)
    }
}

/// Fields supplied when pinning a new boarding house on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewListing {
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub locality: String,
    #[serde(default)]
    pub rate: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub status: ListingStatus,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    #[serde(default)]
    pub features: BTreeSet<String>,
    pub coordinates: GeoPoint,
    #[serde(default)]
    pub rooms: Option<u32>,
    #[serde(default)]
    pub available: Option<u32>,
}

impl NewListing {
    pub fn into_listing(self, id: ListingId) -> Listing {
        Listing {
            id,
            name: self.name,
            address: self.address,
            locality: self.locality,
            rate: self.rate,
            rating: self.rating,
            status: self.status,
            amenities: self.amenities,
            features: self.features,
            coordinates: self.coordinates,
            rooms: self.rooms,
            available: self.available,
            source: ListingSource::User,
        }
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub rate: Option<String>,
    pub rating: Option<f32>,
    pub status: Option<ListingStatus>,
    pub amenities: Option<BTreeSet<String>>,
    pub features: Option<BTreeSet<String>>,
    pub coordinates: Option<GeoPoint>,
    pub rooms: Option<u32>,
    pub available: Option<u32>,
}

impl ListingUpdate {
    pub fn apply(self, listing: &mut Listing) {
        if let Some(name) = self.name {
            listing.name = name;
        }
        if let Some(address) = self.address {
            listing.address = address;
        }
        if let Some(rate) = self.rate {
            listing.rate = rate;
        }
        if let Some(rating) = self.rating {
            listing.rating = rating;
        }
        if let Some(status) = self.status {
            listing.status = status;
        }
        if let Some(amenities) = self.amenities {
            listing.amenities = amenities;
        }
        if let Some(features) = self.features {
            listing.features = features;
        }
        if let Some(coordinates) = self.coordinates {
            listing.coordinates = coordinates;
        }
        if self.rooms.is_some() {
            listing.rooms = self.rooms;
        }
        if self.available.is_some() {
            listing.available = self.available;
        }
    }
}

/// Map area with its own tab on the listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locality {
    pub key: String,
    pub label: String,
    pub center: GeoPoint,
    pub zoom: u8,
}

/// South-west / north-east box the map is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceArea {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl ServiceArea {
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }
}

impl Default for ServiceArea {
    /// Tagbilaran City and Dauis, Bohol.
    fn default() -> Self {
        Self {
            south_west: GeoPoint::new(9.59, 123.82),
            north_east: GeoPoint::new(9.71, 123.92),
        }
    }
}
