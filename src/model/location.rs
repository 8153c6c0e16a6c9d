use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;

/// Where a session location came from: the registered office catalog or raw
/// GPS coordinates supplied at check-in.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Provenance {
    Registered,
    Gps,
}

/// One entry of the registered-office catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisteredLocation {
    #[schema(example = 3)]
    pub id: u32,
    #[schema(example = "400001")]
    pub pincode: String,
    #[schema(example = "Mumbai Office")]
    pub name: String,
}

/// Location attached to an attendance session. Immutable once attached:
/// either `id` (registered) or `(latitude, longitude)` (GPS) is
/// authoritative, and `address` is always human-readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: Option<u32>,
    pub name: String,
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: String,
    pub provenance: Provenance,
}

impl Location {
    pub fn registered(entry: &RegisteredLocation) -> Self {
        Self {
            id: Some(entry.id),
            name: entry.name.clone(),
            pincode: entry.pincode.clone(),
            latitude: None,
            longitude: None,
            address: format!("{}, pincode {}", entry.name, entry.pincode),
            provenance: Provenance::Registered,
        }
    }

    /// GPS location; `address` has already been resolved or synthesized, and
    /// doubles as the display name.
    pub fn gps(latitude: f64, longitude: f64, address: String) -> Self {
        Self {
            id: None,
            name: address.clone(),
            pincode: String::new(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            address,
            provenance: Provenance::Gps,
        }
    }

    pub fn is_gps(&self) -> bool {
        self.provenance == Provenance::Gps
    }
}
