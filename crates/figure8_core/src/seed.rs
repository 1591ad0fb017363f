//! crates/figure8_core/src/seed.rs
//!
//! The fixed demonstration data shown to anonymous users and used to seed a
//! new user's first map.

use crate::domain::{Category, MapData, Pin};
use chrono::{DateTime, Utc};

pub const EXAMPLE_MAP_NAME: &str = "Example Map";

/// Id of the local map shown while signed out. Never written remotely.
pub const ANONYMOUS_EXAMPLE_MAP_ID: &str = "example";

const DEMO_PINS: [(&str, &str, f64, f64, &str); 6] = [
    ("1", "Central Park", 40.785091, -73.968285, "Iconic park in NYC"),
    ("2", "Times Square", 40.758, -73.9855, "Famous intersection in NYC"),
    ("3", "Empire State Building", 40.748817, -73.985428, "Iconic skyscraper"),
    ("4", "Statue of Liberty", 40.6892, -74.0445, "Symbol of freedom"),
    ("5", "Brooklyn Bridge", 40.7061, -73.9969, "Historic bridge"),
    ("6", "Broadway", 40.759, -73.9845, "Famous theater district"),
];

/// Six sightseeing pins around New York City.
pub fn demo_pins() -> Vec<Pin> {
    DEMO_PINS
        .iter()
        .map(|&(id, name, lat, lng, notes)| Pin {
            id: id.to_string(),
            name: name.to_string(),
            lat,
            lng,
            category: Category::Sightseeing,
            notes: notes.to_string(),
        })
        .collect()
}

/// The well-known id of a user's provisioned default map. Provisioning the
/// same user twice always targets the same document.
pub fn default_map_id(owner_id: &str) -> String {
    format!("example-{owner_id}")
}

pub fn anonymous_example_map() -> MapData {
    MapData {
        id: ANONYMOUS_EXAMPLE_MAP_ID.to_string(),
        name: EXAMPLE_MAP_NAME.to_string(),
        owner_id: String::new(),
        pins: demo_pins(),
        created_at: DateTime::<Utc>::default(),
    }
}

pub fn default_map_for(owner_id: &str, created_at: DateTime<Utc>) -> MapData {
    MapData {
        id: default_map_id(owner_id),
        name: EXAMPLE_MAP_NAME.to_string(),
        owner_id: owner_id.to_string(),
        pins: demo_pins(),
        created_at,
    }
}
