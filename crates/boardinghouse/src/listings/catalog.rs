use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{Listing, ListingId, ListingSource, ListingStatus, Locality, ServiceArea};
use crate::routing::GeoPoint;

const DEFAULT_ZOOM: u8 = 14;

/// Immutable listing catalog loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingCatalog {
    localities: Vec<Locality>,
    listings: Vec<Listing>,
    area: ServiceArea,
}

impl ListingCatalog {
    pub fn new(localities: Vec<Locality>, listings: Vec<Listing>, area: ServiceArea) -> Self {
        Self {
            localities,
            listings,
            area,
        }
    }

    /// Surveyed boarding houses around Tagbilaran City and Dauis.
    pub fn standard() -> Self {
        let listings = vec![
            listing(
                1,
                "Sunrise Boarding House",
                "J.A. Clarin St., Tagbilaran City",
                "tagbilaran",
                "₱2,800/month",
                4.5,
                ListingStatus::Accredited,
                &["WiFi", "AC", "Security"],
                &["Fire Extinguisher", "Gate & Fence", "Curfew", "House Rules"],
                (9.6725, 123.8563),
                (12, 3),
            ),
            listing(
                2,
                "Mountain Peak Boarding",
                "Mansasa, Tagbilaran City",
                "tagbilaran",
                "₱2,500/month",
                4.2,
                ListingStatus::Accredited,
                &["WiFi", "Quiet Area"],
                &["Fire Extinguisher", "Gate & Fence", "Logbook"],
                (9.6750, 123.8600),
                (8, 2),
            ),
            listing(
                3,
                "City Center Lodge",
                "CPG Avenue, Tagbilaran City",
                "tagbilaran",
                "₱3,000/month",
                4.7,
                ListingStatus::Conditional,
                &["WiFi", "AC", "Near School"],
                &["Fire Extinguisher", "Gate & Fence"],
                (9.6680, 123.8480),
                (15, 5),
            ),
            listing(
                4,
                "Bohol Student Inn",
                "Gallares St., Tagbilaran City",
                "tagbilaran",
                "₱2,200/month",
                4.0,
                ListingStatus::Accredited,
                &["WiFi", "Study Area"],
                &["Fire Extinguisher", "House Rules", "Curfew"],
                (9.6700, 123.8520),
                (10, 4),
            ),
            listing(
                5,
                "Ocean View Lodge",
                "Dauis, Bohol",
                "dauis",
                "₱2,200/month",
                4.3,
                ListingStatus::Accredited,
                &["WiFi", "Near Beach"],
                &["Fire Extinguisher", "Gate & Fence", "Logbook"],
                (9.6250, 123.8700),
                (6, 2),
            ),
            listing(
                6,
                "Seaside Boarding House",
                "Dauis, Bohol",
                "dauis",
                "₱2,000/month",
                4.1,
                ListingStatus::Conditional,
                &["WiFi"],
                &["Fire Extinguisher"],
                (9.6200, 123.8750),
                (8, 3),
            ),
            listing(
                7,
                "Dauis Student Home",
                "Dauis, Bohol",
                "dauis",
                "₱2,400/month",
                4.4,
                ListingStatus::Accredited,
                &["WiFi", "AC", "Quiet"],
                &["Fire Extinguisher", "Gate & Fence", "House Rules", "Curfew"],
                (9.6150, 123.8650),
                (5, 1),
            ),
        ];

        Self::new(standard_localities(), listings, ServiceArea::default())
    }

    /// Load listings from a CSV export. Multi-valued columns use `;`.
    /// Localities not among the standard ones are centred on their listings.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut listings: Vec<Listing> = Vec::new();

        for (index, record) in csv_reader.deserialize::<CatalogRow>().enumerate() {
            let row = record?;
            let line = index + 2;
            let status = ListingStatus::parse(&row.status).ok_or_else(|| {
                CatalogError::InvalidStatus {
                    line,
                    value: row.status.clone(),
                }
            })?;
            if listings.iter().any(|existing| existing.id == row.id) {
                return Err(CatalogError::DuplicateId(row.id));
            }

            listings.push(Listing {
                id: row.id,
                name: row.name,
                address: row.address,
                locality: row.locality.to_ascii_lowercase(),
                rate: row.rate,
                rating: row.rating,
                status,
                amenities: row.amenities,
                features: row.features,
                coordinates: GeoPoint::new(row.lat, row.lng),
                rooms: row.rooms,
                available: row.available,
                source: ListingSource::Catalog,
            });
        }

        let mut localities = standard_localities();
        let unseen: BTreeSet<String> = listings
            .iter()
            .map(|listing| listing.locality.clone())
            .filter(|key| !localities.iter().any(|locality| &locality.key == key))
            .collect();
        for key in unseen {
            let members: Vec<GeoPoint> = listings
                .iter()
                .filter(|listing| listing.locality == key)
                .map(|listing| listing.coordinates)
                .collect();
            let count = members.len() as f64;
            let center = GeoPoint::new(
                members.iter().map(|point| point.lat).sum::<f64>() / count,
                members.iter().map(|point| point.lng).sum::<f64>() / count,
            );
            localities.push(Locality {
                label: title_case(&key),
                key,
                center,
                zoom: DEFAULT_ZOOM,
            });
        }

        Ok(Self::new(localities, listings, ServiceArea::default()))
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn localities(&self) -> &[Locality] {
        &self.localities
    }

    pub fn area(&self) -> ServiceArea {
        self.area
    }

    pub fn get(&self, id: ListingId) -> Option<&Listing> {
        self.listings.iter().find(|listing| listing.id == id)
    }

    pub fn has_locality(&self, key: &str) -> bool {
        self.localities.iter().any(|locality| locality.key == key)
    }

    /// Highest catalog id; user-added ids continue after it.
    pub fn max_id(&self) -> ListingId {
        self.listings
            .iter()
            .map(|listing| listing.id)
            .max()
            .unwrap_or(0)
    }

    /// Locality keys match case-insensitively.
    pub fn search(&self, locality: Option<&str>, term: Option<&str>) -> Vec<&Listing> {
        let locality = locality.map(str::trim);
        self.listings
            .iter()
            .filter(|listing| {
                locality.map_or(true, |key| listing.locality.eq_ignore_ascii_case(key))
            })
            .filter(|listing| term.map_or(true, |term| listing.matches(term)))
            .collect()
    }
}

impl Default for ListingCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_localities() -> Vec<Locality> {
    vec![
        Locality {
            key: "tagbilaran".to_string(),
            label: "Tagbilaran City".to_string(),
            center: GeoPoint::new(9.6700, 123.8550),
            zoom: DEFAULT_ZOOM,
        },
        Locality {
            key: "dauis".to_string(),
            label: "Dauis".to_string(),
            center: GeoPoint::new(9.6220, 123.8700),
            zoom: DEFAULT_ZOOM,
        },
    ]
}

fn title_case(key: &str) -> String {
    key.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[allow(clippy::too_many_arguments)]
fn listing(
    id: ListingId,
    name: &str,
    address: &str,
    locality: &str,
    rate: &str,
    rating: f32,
    status: ListingStatus,
    amenities: &[&str],
    features: &[&str],
    (lat, lng): (f64, f64),
    (rooms, available): (u32, u32),
) -> Listing {
    Listing {
        id,
        name: name.to_string(),
        address: address.to_string(),
        locality: locality.to_string(),
        rate: rate.to_string(),
        rating,
        status,
        amenities: amenities.iter().map(|value| value.to_string()).collect(),
        features: features.iter().map(|value| value.to_string()).collect(),
        coordinates: GeoPoint::new(lat, lng),
        rooms: Some(rooms),
        available: Some(available),
        source: ListingSource::Catalog,
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: ListingId,
    name: String,
    #[serde(default)]
    address: String,
    locality: String,
    #[serde(default)]
    rate: String,
    #[serde(default)]
    rating: f32,
    #[serde(default)]
    status: String,
    #[serde(default, deserialize_with = "split_list")]
    amenities: BTreeSet<String>,
    #[serde(default, deserialize_with = "split_list")]
    features: BTreeSet<String>,
    lat: f64,
    lng: f64,
    #[serde(default)]
    rooms: Option<u32>,
    #[serde(default)]
    available: Option<u32>,
}

fn split_list<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .split(';')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect())
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed catalog: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: unknown listing status '{value}'")]
    InvalidStatus { line: usize, value: String },
    #[error("listing id {0} appears more than once")]
    DuplicateId(ListingId),
}
