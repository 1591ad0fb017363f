//! crates/figure8_core/src/render.rs
//!
//! Render-ready data for the map widget: marker colors, popup text and the
//! viewport. The widget itself lives outside the core.

use crate::domain::{Category, CategoryKind, Pin};
use serde::Serialize;

/// Where the widget is centered before any pin exists.
pub const DEFAULT_CENTER: (f64, f64) = (40.785091, -73.968285);
pub const DEFAULT_ZOOM: u8 = 10;
/// Zoom used when flying to the most recent pin.
pub const PIN_ZOOM: u8 = 12;

pub fn marker_color(kind: CategoryKind) -> &'static str {
    match kind {
        CategoryKind::Hiking => "green",
        CategoryKind::Sightseeing => "blue",
        CategoryKind::Accommodation => "black",
        CategoryKind::Food => "orange",
        CategoryKind::Store => "purple",
        CategoryKind::Other => "gray",
    }
}

/// Lines shown in a pin's popup, in display order.
pub fn popup_lines(pin: &Pin) -> Vec<String> {
    let mut lines = vec![pin.name.clone()];

    match pin.category {
        Category::Hiking(detail) => {
            lines.push(CategoryKind::Hiking.label().to_string());
            if let Some(length) = detail.length {
                lines.push(length.label().to_string());
            }
            if detail.reservation_required == Some(true) {
                lines.push("Need Reservation".to_string());
            }
        }
        Category::Food(detail) => {
            let label = detail
                .meal_type
                .map_or(CategoryKind::Food.label(), |meal| meal.as_str());
            lines.push(label.to_string());
        }
        Category::Other => {}
        other => lines.push(other.kind().label().to_string()),
    }

    if !pin.notes.is_empty() {
        lines.push(format!("Notes: {}", pin.notes));
    }
    lines
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub pin_id: String,
    pub lat: f64,
    pub lng: f64,
    pub color: &'static str,
    pub popup: Vec<String>,
}

impl Marker {
    pub fn for_pin(pin: &Pin) -> Self {
        Self {
            pin_id: pin.id.clone(),
            lat: pin.lat,
            lng: pin.lng,
            color: marker_color(pin.category.kind()),
            popup: popup_lines(pin),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

impl Viewport {
    /// Focuses the last (most recently added) pin, or the default center.
    pub fn for_pins(pins: &[Pin]) -> Self {
        match pins.last() {
            Some(pin) => Viewport {
                lat: pin.lat,
                lng: pin.lng,
                zoom: PIN_ZOOM,
            },
            None => Viewport {
                lat: DEFAULT_CENTER.0,
                lng: DEFAULT_CENTER.1,
                zoom: DEFAULT_ZOOM,
            },
        }
    }
}
