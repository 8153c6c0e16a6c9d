use std::sync::Arc;
use std::time::Duration;

use actix_web::rt::time::timeout;
use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;
use once_cell::sync::Lazy;

use crate::errors::LocationError;
use crate::model::location::{Location, RegisteredLocation};

/// Registered-office catalog. Owned by an external collaborator in
/// production; lookups may be slow, so the resolver bounds them with a
/// timeout and caches hits.
#[async_trait]
pub trait LocationCatalog: Send + Sync {
    async fn find(&self, id: u32) -> Option<RegisteredLocation>;
    async fn all(&self) -> Vec<RegisteredLocation>;
}

/// In-memory catalog seeded with the registered offices.
pub struct InMemoryCatalog {
    entries: Vec<RegisteredLocation>,
}

impl InMemoryCatalog {
    pub fn new(entries: Vec<RegisteredLocation>) -> Self {
        Self { entries }
    }

    pub fn seeded() -> Self {
        let office = |id: u32, pincode: &str, name: &str| RegisteredLocation {
            id,
            pincode: pincode.to_string(),
            name: name.to_string(),
        };
        Self::new(vec![
            office(1, "500001", "Hyderabad Office"),
            office(2, "600001", "Chennai Office"),
            office(3, "400001", "Mumbai Office"),
            office(4, "110001", "Delhi Office"),
            office(5, "560001", "Bangalore Office"),
        ])
    }
}

#[async_trait]
impl LocationCatalog for InMemoryCatalog {
    async fn find(&self, id: u32) -> Option<RegisteredLocation> {
        self.entries.iter().find(|entry| entry.id == id).cloned()
    }

    async fn all(&self) -> Vec<RegisteredLocation> {
        self.entries.clone()
    }
}

static REGISTERED_CACHE: Lazy<Cache<u32, RegisteredLocation>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(3600)) // 1h TTL
        .build()
});

/// Pre-populate the registered-location cache so first check-ins skip the
/// catalog round trip.
pub async fn warmup_location_cache(catalog: &dyn LocationCatalog) -> Result<()> {
    let entries = catalog.all().await;
    let total_count = entries.len();

    let futures: Vec<_> = entries
        .into_iter()
        .map(|entry| REGISTERED_CACHE.insert(entry.id, entry))
        .collect();
    futures::future::join_all(futures).await;

    log::info!(
        "Location cache warmup complete: {} registered locations",
        total_count
    );

    Ok(())
}

/// Validated check-in location input. The wire shape carries optional
/// fields; this is the variant type they collapse into before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckInLocation {
    Registered {
        location_id: u32,
    },
    Gps {
        latitude: f64,
        longitude: f64,
        address: Option<String>,
    },
}

impl CheckInLocation {
    /// GPS wins only when both coordinates are explicitly supplied;
    /// otherwise a registered id is required.
    pub fn from_parts(
        location_id: Option<u32>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        address: Option<String>,
    ) -> Result<Self, LocationError> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Ok(CheckInLocation::Gps {
                latitude,
                longitude,
                address,
            }),
            _ => match location_id {
                Some(location_id) => Ok(CheckInLocation::Registered { location_id }),
                None => Err(LocationError::Missing),
            },
        }
    }
}

/// Deterministic human-readable address for raw coordinates, rounded to six
/// decimal places. Identical input must produce identical text.
pub fn synthesized_address(latitude: f64, longitude: f64) -> String {
    format!("GPS location ({latitude:.6}, {longitude:.6})")
}

pub struct LocationResolver {
    catalog: Arc<dyn LocationCatalog>,
    lookup_timeout: Duration,
}

impl LocationResolver {
    pub fn new(catalog: Arc<dyn LocationCatalog>, lookup_timeout: Duration) -> Self {
        Self {
            catalog,
            lookup_timeout,
        }
    }

    pub async fn resolve(&self, request: CheckInLocation) -> Result<Location, LocationError> {
        match request {
            CheckInLocation::Registered { location_id } => {
                self.resolve_registered(location_id).await
            }
            CheckInLocation::Gps {
                latitude,
                longitude,
                address,
            } => resolve_gps(latitude, longitude, address),
        }
    }

    /// Registered offices, for the locations listing.
    pub async fn registered(&self) -> Vec<RegisteredLocation> {
        self.catalog.all().await
    }

    async fn resolve_registered(&self, id: u32) -> Result<Location, LocationError> {
        if let Some(entry) = REGISTERED_CACHE.get(&id).await {
            return Ok(Location::registered(&entry));
        }

        let found = timeout(self.lookup_timeout, self.catalog.find(id))
            .await
            .map_err(|_| LocationError::LookupTimeout)?;

        let entry = found.ok_or(LocationError::NotFound(id))?;
        REGISTERED_CACHE.insert(id, entry.clone()).await;

        Ok(Location::registered(&entry))
    }
}

fn resolve_gps(
    latitude: f64,
    longitude: f64,
    address: Option<String>,
) -> Result<Location, LocationError> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(LocationError::InvalidCoordinates {
            latitude,
            longitude,
        });
    }

    let address = address
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| synthesized_address(latitude, longitude));

    Ok(Location::gps(latitude, longitude, address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::location::Provenance;

    fn resolver() -> LocationResolver {
        LocationResolver::new(Arc::new(InMemoryCatalog::seeded()), Duration::from_millis(250))
    }

    struct SlowCatalog;

    #[async_trait]
    impl LocationCatalog for SlowCatalog {
        async fn find(&self, _id: u32) -> Option<RegisteredLocation> {
            actix_web::rt::time::sleep(Duration::from_millis(200)).await;
            None
        }

        async fn all(&self) -> Vec<RegisteredLocation> {
            Vec::new()
        }
    }

    #[test]
    fn gps_takes_priority_over_registered_id() {
        let parsed = CheckInLocation::from_parts(Some(3), Some(12.97), Some(77.59), None).unwrap();
        assert!(matches!(parsed, CheckInLocation::Gps { .. }));
    }

    #[test]
    fn half_supplied_gps_falls_back_to_registered_id() {
        let parsed = CheckInLocation::from_parts(Some(3), Some(12.97), None, None).unwrap();
        assert_eq!(parsed, CheckInLocation::Registered { location_id: 3 });
    }

    #[test]
    fn absent_inputs_are_rejected() {
        let err = CheckInLocation::from_parts(None, None, None, None).unwrap_err();
        assert!(matches!(err, LocationError::Missing));
    }

    #[actix_web::test]
    async fn registered_lookup_tags_provenance() {
        let location = resolver()
            .resolve(CheckInLocation::Registered { location_id: 3 })
            .await
            .unwrap();
        assert_eq!(location.id, Some(3));
        assert_eq!(location.name, "Mumbai Office");
        assert_eq!(location.provenance, Provenance::Registered);
        assert!(location.address.contains("400001"));
    }

    #[actix_web::test]
    async fn unknown_registered_id_is_not_found() {
        let err = resolver()
            .resolve(CheckInLocation::Registered { location_id: 42 })
            .await
            .unwrap_err();
        assert!(matches!(err, LocationError::NotFound(42)));
    }

    #[actix_web::test]
    async fn out_of_range_latitude_is_rejected() {
        let err = resolver()
            .resolve(CheckInLocation::Gps {
                latitude: 91.0,
                longitude: 0.0,
                address: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LocationError::InvalidCoordinates { .. }));
    }

    #[actix_web::test]
    async fn synthesized_address_is_deterministic() {
        let request = CheckInLocation::Gps {
            latitude: 37.422,
            longitude: -122.084,
            address: None,
        };
        let first = resolver().resolve(request.clone()).await.unwrap();
        let second = resolver().resolve(request).await.unwrap();
        assert_eq!(first.address, "GPS location (37.422000, -122.084000)");
        assert_eq!(first.address, second.address);
        assert_eq!(first.name, first.address);
        assert!(first.is_gps());
    }

    #[actix_web::test]
    async fn caller_address_is_kept_verbatim() {
        let location = resolver()
            .resolve(CheckInLocation::Gps {
                latitude: 12.97,
                longitude: 77.59,
                address: Some("Client site, Koramangala".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(location.address, "Client site, Koramangala");
    }

    #[actix_web::test]
    async fn slow_catalog_lookup_times_out() {
        let resolver =
            LocationResolver::new(Arc::new(SlowCatalog), Duration::from_millis(20));
        let err = resolver
            .resolve(CheckInLocation::Registered { location_id: 9999 })
            .await
            .unwrap_err();
        assert!(matches!(err, LocationError::LookupTimeout));
    }

    #[actix_web::test]
    async fn warmup_populates_the_cache() {
        let catalog = InMemoryCatalog::seeded();
        warmup_location_cache(&catalog).await.unwrap();
        assert!(REGISTERED_CACHE.get(&1).await.is_some());
        assert!(REGISTERED_CACHE.get(&5).await.is_some());
    }
}
