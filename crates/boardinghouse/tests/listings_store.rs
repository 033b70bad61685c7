use std::sync::Arc;

use boardinghouse::listings::{
    FileListingStore, ListingCatalog, ListingError, ListingRepository, ListingService,
    ListingSource, ListingStatus, ListingUpdate, NewListing,
};
use boardinghouse::routing::GeoPoint;

fn pin(name: &str, locality: &str, lat: f64, lng: f64) -> NewListing {
    NewListing {
        name: name.to_string(),
        address: format!("{name}, Bohol"),
        locality: locality.to_string(),
        rate: "₱1,800/month".to_string(),
        rating: 0.0,
        status: ListingStatus::Pending,
        amenities: ["WiFi".to_string()].into_iter().collect(),
        features: Default::default(),
        coordinates: GeoPoint::new(lat, lng),
        rooms: Some(4),
        available: Some(4),
    }
}

#[test]
fn file_store_survives_reopen_with_ids_continuing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data").join("houses.json");
    let catalog = Arc::new(ListingCatalog::standard());

    {
        let store = Arc::new(FileListingStore::open(&path, catalog.max_id()).expect("open store"));
        let service = ListingService::new(catalog.clone(), store);
        let first = service
            .add(pin("Cortes Bedspace", "tagbilaran", 9.6690, 123.8590))
            .expect("first pin");
        let second = service
            .add(pin("Bingag Rooms", "dauis", 9.6180, 123.8680))
            .expect("second pin");
        assert_eq!((first.id, second.id), (8, 9));
        service.delete(second.id).expect("delete user pin");
    }

    let store = Arc::new(FileListingStore::open(&path, catalog.max_id()).expect("reopen store"));
    let stored = store.list().expect("stored listings");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Cortes Bedspace");
    assert_eq!(stored[0].source, ListingSource::User);

    let service = ListingService::new(catalog, store);
    let third = service
        .add(pin("Totolan Lodge", "dauis", 9.6160, 123.8720))
        .expect("third pin");
    assert_eq!(third.id, 10, "ids continue from lastId, not from the live count");

    let tagbilaran = service.search(Some("tagbilaran"), None).expect("search");
    assert_eq!(tagbilaran.len(), 5);
    assert_eq!(tagbilaran.last().map(|listing| listing.id), Some(8));
}

#[test]
fn catalog_entries_are_read_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let catalog = Arc::new(ListingCatalog::standard());
    let store = Arc::new(
        FileListingStore::open(dir.path().join("houses.json"), catalog.max_id()).expect("open"),
    );
    let service = ListingService::new(catalog, store);

    assert!(matches!(service.delete(1), Err(ListingError::ReadOnly(1))));
    assert!(matches!(
        service.update(
            5,
            ListingUpdate {
                rate: Some("₱1,000/month".to_string()),
                ..ListingUpdate::default()
            }
        ),
        Err(ListingError::ReadOnly(5))
    ));
    assert!(matches!(service.delete(42), Err(ListingError::NotFound(42))));
}

#[test]
fn user_pins_are_validated_and_updatable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let catalog = Arc::new(ListingCatalog::standard());
    let store = Arc::new(
        FileListingStore::open(dir.path().join("houses.json"), catalog.max_id()).expect("open"),
    );
    let service = ListingService::new(catalog, store);

    assert!(matches!(
        service.add(pin("   ", "dauis", 9.62, 123.87)),
        Err(ListingError::MissingName)
    ));
    assert!(matches!(
        service.add(pin("Cebu Dorm", "dauis", 10.31, 123.89)),
        Err(ListingError::OutsideServiceArea { .. })
    ));
    assert!(matches!(
        service.add(pin("Loon House", "loon", 9.62, 123.87)),
        Err(ListingError::UnknownLocality(_))
    ));

    let pinned = service
        .add(pin("  Poblacion Rooms ", "Dauis", 9.6230, 123.8710))
        .expect("pin");
    assert_eq!(pinned.name, "Poblacion Rooms");
    assert_eq!(pinned.locality, "dauis");

    let updated = service
        .update(
            pinned.id,
            ListingUpdate {
                status: Some(ListingStatus::Conditional),
                available: Some(1),
                ..ListingUpdate::default()
            },
        )
        .expect("update");
    assert_eq!(updated.status, ListingStatus::Conditional);
    assert_eq!(updated.available, Some(1));
    assert_eq!(updated.rooms, Some(4));

    let found = service.search(None, Some("poblacion")).expect("search");
    assert_eq!(found.len(), 1);

    let dauis = service.search(Some(" DAUIS "), None).expect("search");
    assert_eq!(dauis.len(), 4, "three catalog houses plus the new pin");
    assert_eq!(dauis.last().map(|listing| listing.id), Some(pinned.id));
}
