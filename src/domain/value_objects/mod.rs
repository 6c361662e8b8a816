//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **PageRequest / PageMeta**: Offset pagination input and derived metadata
//! - **SearchTerm**: Case-insensitive substring search with a minimum length
//! - **GeoPoint**: Longitude/latitude pair with range checks
//! - **Image URLs**: Pattern check shared by users, listings and posts

mod geo_point;
mod image_url;
mod pagination;
mod search;

pub use geo_point::*;
pub use image_url::*;
pub use pagination::*;
pub use search::*;
