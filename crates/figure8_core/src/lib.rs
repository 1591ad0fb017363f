pub mod color;
pub mod document;
pub mod domain;
pub mod draft;
pub mod error;
pub mod ports;
pub mod render;
pub mod seed;
pub mod session;
pub mod store;

pub use color::{color_for, BackgroundColor, Hsl};
pub use domain::{
    AuthState, Category, CategoryKind, FoodDetail, HikeLength, HikingDetail, Identity, MapData,
    MealType, Pin,
};
pub use draft::PinDraft;
pub use error::{StoreError, StoreResult, ValidationError};
pub use ports::{Document, DocumentStore, Filter, IdentityProvider, PortError, PortResult};
pub use session::Session;
pub use store::{MapStore, MapStoreState, Phase, ViewState};
