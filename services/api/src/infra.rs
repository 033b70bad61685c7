use boardinghouse::accreditation::{
    AccreditationId, AccreditationRecord, AccreditationRepository, RepositoryError, RubricSchema,
};
use boardinghouse::config::{RoutingBackendConfig, RoutingConfig};
use boardinghouse::error::AppError;
use boardinghouse::listings::{
    FileListingStore, InMemoryListingStore, ListingCatalog, ListingRepository,
};
use boardinghouse::routing::{PgRoutingPlanner, RoadNetwork, RoutePlanner};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAccreditationRepository {
    records: Arc<Mutex<HashMap<AccreditationId, AccreditationRecord>>>,
}

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::Unavailable("accreditation store lock poisoned".to_string())
}

impl AccreditationRepository for InMemoryAccreditationRepository {
    fn insert(&self, record: AccreditationRecord) -> Result<AccreditationRecord, RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: AccreditationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &AccreditationId) -> Result<Option<AccreditationRecord>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<AccreditationRecord>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.values().cloned().collect())
    }
}

pub(crate) fn load_rubric(path: Option<&Path>) -> Result<RubricSchema, AppError> {
    match path {
        Some(path) => {
            let rubric = RubricSchema::from_path(path)?;
            info!(path = %path.display(), items = rubric.item_count(), "rubric loaded");
            Ok(rubric)
        }
        None => Ok(RubricSchema::standard()),
    }
}

pub(crate) fn load_catalog(path: Option<&Path>) -> Result<ListingCatalog, AppError> {
    match path {
        Some(path) => {
            let catalog = ListingCatalog::from_path(path)?;
            info!(
                path = %path.display(),
                listings = catalog.listings().len(),
                "listing catalog imported"
            );
            Ok(catalog)
        }
        None => Ok(ListingCatalog::standard()),
    }
}

/// User listings live in a JSON file when a path is configured, otherwise in
/// memory for the life of the process.
pub(crate) fn open_listing_store(
    path: Option<&Path>,
    catalog: &ListingCatalog,
) -> Result<Arc<dyn ListingRepository>, AppError> {
    match path {
        Some(path) => {
            let store = FileListingStore::open(path, catalog.max_id())?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryListingStore::new(catalog.max_id()))),
    }
}

pub(crate) fn build_planner(config: &RoutingConfig) -> Result<Arc<dyn RoutePlanner>, AppError> {
    match &config.backend {
        RoutingBackendConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let planner =
                PgRoutingPlanner::connect_lazy(database_url, *max_connections, config.directed)?;
            Ok(Arc::new(planner))
        }
        RoutingBackendConfig::Memory { network_path } => {
            let network = match network_path {
                Some(path) => RoadNetwork::from_path(path, config.directed)?,
                None => RoadNetwork::empty(config.directed),
            };
            info!(
                vertices = network.vertex_count(),
                ways = network.way_count(),
                directed = network.is_directed(),
                "in-process road network ready"
            );
            Ok(Arc::new(network))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardinghouse::listings::{ListingStatus, NewListing};
    use boardinghouse::routing::GeoPoint;

    #[test]
    fn file_store_ids_start_after_catalog() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = ListingCatalog::standard();
        let store = open_listing_store(Some(dir.path().join("houses.json").as_path()), &catalog)
            .expect("store opens");

        let listing = store
            .add(NewListing {
                name: "Booy Rooms".to_string(),
                address: String::new(),
                locality: "tagbilaran".to_string(),
                rate: String::new(),
                rating: 0.0,
                status: ListingStatus::Pending,
                amenities: Default::default(),
                features: Default::default(),
                coordinates: GeoPoint::new(9.66, 123.86),
                rooms: None,
                available: None,
            })
            .expect("add");

        assert_eq!(listing.id, catalog.max_id() + 1);
    }

    #[test]
    fn missing_rubric_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = load_rubric(Some(dir.path().join("absent.json").as_path())).expect_err("missing file");
        assert!(matches!(error, AppError::Rubric(_)));
    }

    #[test]
    fn memory_backend_without_network_file_is_empty() {
        let config = RoutingConfig {
            backend: RoutingBackendConfig::Memory { network_path: None },
            directed: false,
        };
        let planner = build_planner(&config).expect("planner");
        assert_eq!(planner.backend(), "memory");
    }
}
