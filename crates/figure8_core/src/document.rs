//! crates/figure8_core/src/document.rs
//!
//! The document layout of maps and pins in the remote store, and the conversion
//! between those records and the pure domain types.

use crate::domain::{Category, CategoryKind, FoodDetail, HikingDetail, MapData, Pin};
use crate::error::ValidationError;
use crate::ports::{Document, PortError, PortResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Collection holding one document per map.
pub const MAPS_COLLECTION: &str = "maps";

/// Sentinel used in documents for "no value".
const NOT_APPLICABLE: &str = "NA";

//=========================================================================================
// Record Structs
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinRecord {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hike_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_required: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub notes: String,
}

impl PinRecord {
    pub fn from_domain(pin: &Pin) -> Self {
        let (hike_length, reservation_required, meal_type) = match pin.category {
            Category::Hiking(detail) => (
                Some(or_na(detail.length.map(|l| l.as_str()))),
                Some(or_na(detail.reservation_required.map(yes_no))),
                None,
            ),
            Category::Food(detail) => (None, None, Some(or_na(detail.meal_type.map(|m| m.as_str())))),
            _ => (None, None, None),
        };

        Self {
            id: pin.id.clone(),
            name: pin.name.clone(),
            lat: pin.lat,
            lng: pin.lng,
            category: pin.category.kind().as_str().to_string(),
            hike_length,
            reservation_required,
            meal_type,
            notes: pin.notes.clone(),
        }
    }

    /// Converts the record back into a pin. Options stored for a category
    /// they do not belong to are dropped.
    pub fn to_domain(self) -> Result<Pin, ValidationError> {
        let kind = CategoryKind::from_str(&self.category)?;
        let category = match kind {
            CategoryKind::Hiking => Category::Hiking(HikingDetail {
                length: parse_option("hikeLength", self.hike_length.as_deref())?,
                reservation_required: parse_yes_no(self.reservation_required.as_deref())?,
            }),
            CategoryKind::Food => Category::Food(FoodDetail {
                meal_type: parse_option("mealType", self.meal_type.as_deref())?,
            }),
            other => Category::from(other),
        };

        let pin = Pin {
            id: self.id,
            name: self.name,
            lat: self.lat,
            lng: self.lng,
            category,
            notes: self.notes,
        };
        pin.validate()?;
        Ok(pin)
    }

    pub fn to_document(&self) -> PortResult<Document> {
        serde_json::to_value(self).map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub pins: Vec<PinRecord>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl MapRecord {
    pub fn from_domain(map: &MapData) -> Self {
        Self {
            id: map.id.clone(),
            name: map.name.clone(),
            owner_id: map.owner_id.clone(),
            pins: map.pins.iter().map(PinRecord::from_domain).collect(),
            created_at: map.created_at,
        }
    }

    /// Converts the record into a map. Pins that no longer validate are
    /// skipped with a warning rather than hiding the whole map.
    pub fn to_domain(self) -> MapData {
        let map_id = self.id;
        let pins = self
            .pins
            .into_iter()
            .filter_map(|record| {
                let pin_id = record.id.clone();
                match record.to_domain() {
                    Ok(pin) => Some(pin),
                    Err(e) => {
                        warn!(map_id = %map_id, pin_id = %pin_id, "Skipping malformed pin: {}", e);
                        None
                    }
                }
            })
            .collect();

        MapData {
            id: map_id,
            name: self.name,
            owner_id: self.owner_id,
            pins,
            created_at: self.created_at,
        }
    }

    pub fn from_document(document: Document) -> PortResult<Self> {
        serde_json::from_value(document).map_err(|e| PortError::Unexpected(e.to_string()))
    }

    pub fn to_document(&self) -> PortResult<Document> {
        serde_json::to_value(self).map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

/// Converts a list of pins into the array stored in a map document.
pub fn pins_to_document(pins: &[Pin]) -> PortResult<Document> {
    let records: Vec<PinRecord> = pins.iter().map(PinRecord::from_domain).collect();
    serde_json::to_value(records).map_err(|e| PortError::Unexpected(e.to_string()))
}

//=========================================================================================
// Option Helpers
//=========================================================================================

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_APPLICABLE).to_string()
}

fn yes_no(required: bool) -> &'static str {
    if required {
        "yes"
    } else {
        "no"
    }
}

fn is_absent(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => v.trim().is_empty() || v.trim().eq_ignore_ascii_case(NOT_APPLICABLE),
    }
}

/// Parses an optional select value where "NA" or an empty string mean absent.
pub(crate) fn parse_option<T>(field: &'static str, value: Option<&str>) -> Result<Option<T>, ValidationError>
where
    T: FromStr<Err = ValidationError>,
{
    if is_absent(value) {
        return Ok(None);
    }
    let raw = value.unwrap_or_default();
    raw.parse::<T>().map(Some).map_err(|_| ValidationError::UnknownOption {
        field,
        value: raw.to_string(),
    })
}

pub(crate) fn parse_yes_no(value: Option<&str>) -> Result<Option<bool>, ValidationError> {
    if is_absent(value) {
        return Ok(None);
    }
    let raw = value.unwrap_or_default();
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" => Ok(Some(true)),
        "no" => Ok(Some(false)),
        _ => Err(ValidationError::UnknownOption {
            field: "reservationRequired",
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HikeLength, MealType};
    use serde_json::json;

    fn hiking_pin() -> Pin {
        Pin {
            id: "p1".to_string(),
            name: "Bear Mountain".to_string(),
            lat: 41.31,
            lng: -74.0,
            category: Category::Hiking(HikingDetail {
                length: Some(HikeLength::Long),
                reservation_required: None,
            }),
            notes: String::new(),
        }
    }

    #[test]
    fn hiking_record_uses_original_layout() {
        let value = PinRecord::from_domain(&hiking_pin()).to_document().unwrap();
        assert_eq!(value["category"], "hiking");
        assert_eq!(value["hikeLength"], "long");
        assert_eq!(value["reservationRequired"], "NA");
        assert!(value.get("mealType").is_none());
    }

    #[test]
    fn options_of_other_categories_are_dropped() {
        let record: PinRecord = serde_json::from_value(json!({
            "id": "p2",
            "name": "Katz's",
            "lat": 40.72,
            "lng": -73.98,
            "category": "food",
            "hikeLength": "short",
            "mealType": "Lunch"
        }))
        .unwrap();
        let pin = record.to_domain().unwrap();
        assert_eq!(
            pin.category,
            Category::Food(FoodDetail {
                meal_type: Some(MealType::Lunch)
            })
        );
    }

    #[test]
    fn na_sentinel_reads_as_absent() {
        let record: PinRecord = serde_json::from_value(json!({
            "id": "p3",
            "name": "Trail",
            "lat": 1.0,
            "lng": 2.0,
            "category": "hiking",
            "hikeLength": "NA",
            "reservationRequired": "yes"
        }))
        .unwrap();
        assert_eq!(
            record.to_domain().unwrap().category,
            Category::Hiking(HikingDetail {
                length: None,
                reservation_required: Some(true)
            })
        );
    }

    #[test]
    fn malformed_pins_are_skipped_when_loading_a_map() {
        let record = MapRecord::from_document(json!({
            "id": "m1",
            "name": "Trip",
            "ownerId": "u1",
            "pins": [
                { "id": "ok", "name": "A", "lat": 1.0, "lng": 1.0, "category": "store" },
                { "id": "bad", "name": "B", "lat": 95.0, "lng": 1.0, "category": "store" },
                { "id": "odd", "name": "C", "lat": 1.0, "lng": 1.0, "category": "museum" }
            ]
        }))
        .unwrap();
        let map = record.to_domain();
        assert_eq!(map.pins.len(), 1);
        assert_eq!(map.pins[0].id, "ok");
    }

    #[test]
    fn map_without_created_at_still_loads() {
        let record = MapRecord::from_document(json!({ "id": "m2", "name": "Old" })).unwrap();
        assert_eq!(record.created_at, DateTime::<Utc>::default());
        assert!(record.to_domain().is_example());
    }
}
