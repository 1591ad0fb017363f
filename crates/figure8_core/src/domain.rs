//! crates/figure8_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any document layout or serialization format.

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

//=========================================================================================
// Identity
//=========================================================================================

/// An authenticated principal as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
}

/// What the identity provider currently knows about the principal.
///
/// `Unresolved` is only observed before the provider has finished restoring
/// any existing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Unresolved,
    SignedOut,
    SignedIn(Identity),
}

impl AuthState {
    pub fn principal(&self) -> Option<&Identity> {
        match self {
            AuthState::SignedIn(identity) => Some(identity),
            _ => None,
        }
    }
}

//=========================================================================================
// Pin Categories
//=========================================================================================

/// The category of a pin without any of its category-specific details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    Sightseeing,
    Hiking,
    Accommodation,
    Food,
    Store,
    Other,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 6] = [
        CategoryKind::Sightseeing,
        CategoryKind::Hiking,
        CategoryKind::Accommodation,
        CategoryKind::Food,
        CategoryKind::Store,
        CategoryKind::Other,
    ];

    /// The identifier stored in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Sightseeing => "sightseeing",
            CategoryKind::Hiking => "hiking",
            CategoryKind::Accommodation => "accommodation",
            CategoryKind::Food => "food",
            CategoryKind::Store => "store",
            CategoryKind::Other => "other",
        }
    }

    /// Human readable name, as shown in pin popups.
    pub fn label(&self) -> &'static str {
        match self {
            CategoryKind::Sightseeing => "Sightseeing",
            CategoryKind::Hiking => "Hiking",
            CategoryKind::Accommodation => "Accommodation",
            CategoryKind::Food => "Food",
            CategoryKind::Store => "Store",
            CategoryKind::Other => "Other",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CategoryKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HikeLength {
    Short,
    Medium,
    Long,
}

impl HikeLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            HikeLength::Short => "short",
            HikeLength::Medium => "medium",
            HikeLength::Long => "long",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HikeLength::Short => "Short Hike",
            HikeLength::Medium => "Medium Hike",
            HikeLength::Long => "Long Hike",
        }
    }
}

impl FromStr for HikeLength {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(HikeLength::Short),
            "medium" => Ok(HikeLength::Medium),
            "long" => Ok(HikeLength::Long),
            _ => Err(ValidationError::UnknownOption {
                field: "hikeLength",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

impl FromStr for MealType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Err(ValidationError::UnknownOption {
                field: "mealType",
                value: s.to_string(),
            }),
        }
    }
}

/// Details that only exist for hiking pins. `None` means "NA".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HikingDetail {
    pub length: Option<HikeLength>,
    pub reservation_required: Option<bool>,
}

/// Details that only exist for food pins. `None` means "NA".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoodDetail {
    pub meal_type: Option<MealType>,
}

/// A pin category together with the details that are meaningful for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Sightseeing,
    Hiking(HikingDetail),
    Accommodation,
    Food(FoodDetail),
    Store,
    Other,
}

impl Category {
    pub fn kind(&self) -> CategoryKind {
        match self {
            Category::Sightseeing => CategoryKind::Sightseeing,
            Category::Hiking(_) => CategoryKind::Hiking,
            Category::Accommodation => CategoryKind::Accommodation,
            Category::Food(_) => CategoryKind::Food,
            Category::Store => CategoryKind::Store,
            Category::Other => CategoryKind::Other,
        }
    }
}

impl From<CategoryKind> for Category {
    fn from(kind: CategoryKind) -> Self {
        match kind {
            CategoryKind::Sightseeing => Category::Sightseeing,
            CategoryKind::Hiking => Category::Hiking(HikingDetail::default()),
            CategoryKind::Accommodation => Category::Accommodation,
            CategoryKind::Food => Category::Food(FoodDetail::default()),
            CategoryKind::Store => Category::Store,
            CategoryKind::Other => Category::Other,
        }
    }
}

//=========================================================================================
// Pins and Maps
//=========================================================================================

/// A single geo-located annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub category: Category,
    pub notes: String,
}

impl Pin {
    /// Checks that the coordinates are finite and inside the valid ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_coordinates(self.lat, self.lng)
    }
}

pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), ValidationError> {
    // NaN fails `contains`, so a bad parse never slips through.
    if !lat.is_finite() || !LATITUDE_RANGE.contains(&lat) {
        return Err(ValidationError::LatitudeOutOfRange(lat));
    }
    if !lng.is_finite() || !LONGITUDE_RANGE.contains(&lng) {
        return Err(ValidationError::LongitudeOutOfRange(lng));
    }
    Ok(())
}

/// A named collection of pins owned by one principal.
///
/// An empty `owner_id` marks the local example map shown to anonymous users.
#[derive(Debug, Clone, PartialEq)]
pub struct MapData {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub pins: Vec<Pin>,
    pub created_at: DateTime<Utc>,
}

impl MapData {
    pub fn is_example(&self) -> bool {
        self.owner_id.is_empty()
    }

    pub fn pin(&self, pin_id: &str) -> Option<&Pin> {
        self.pins.iter().find(|pin| pin.id == pin_id)
    }
}
