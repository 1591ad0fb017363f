//! crates/figure8_core/src/draft.rs
//!
//! Turns the raw values of the pin-entry form into a validated `Pin`.

use crate::document::{parse_option, parse_yes_no};
use crate::domain::{validate_coordinates, Category, CategoryKind, FoodDetail, HikingDetail, Pin};
use crate::error::ValidationError;
use uuid::Uuid;

/// The pin-entry form exactly as typed. Coordinates are text.
#[derive(Debug, Clone, Default)]
pub struct PinDraft {
    pub name: String,
    pub lat: String,
    pub lng: String,
    pub category: Option<String>,
    pub hike_length: Option<String>,
    pub reservation_required: Option<String>,
    pub meal_type: Option<String>,
    pub notes: String,
}

impl PinDraft {
    /// Validates the draft and builds a pin with a fresh id.
    ///
    /// The category defaults to `other`. Hiking options only survive for
    /// hiking pins and the meal type only for food pins.
    pub fn into_pin(self) -> Result<Pin, ValidationError> {
        let lat = parse_coordinate("lat", &self.lat)?;
        let lng = parse_coordinate("lng", &self.lng)?;
        validate_coordinates(lat, lng)?;

        let kind = match self.category.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<CategoryKind>()?,
            _ => CategoryKind::Other,
        };
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

        Ok(Pin {
            id: new_pin_id(),
            name: self.name.trim().to_string(),
            lat,
            lng,
            category,
            notes: self.notes,
        })
    }
}

/// Parses a coordinate, letting a malformed number become NaN so that the
/// finite check below is the single gate.
fn parse_coordinate(field: &'static str, input: &str) -> Result<f64, ValidationError> {
    let value = input.trim().parse::<f64>().unwrap_or(f64::NAN);
    if !value.is_finite() {
        return Err(ValidationError::NonNumericCoordinate {
            field,
            input: input.to_string(),
        });
    }
    Ok(value)
}

pub fn new_pin_id() -> String {
    Uuid::new_v4().simple().to_string()
}
