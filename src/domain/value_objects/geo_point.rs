//! Geographic point (WGS 84 longitude/latitude).

use serde::{Deserialize, Serialize};

use crate::shared::validation::FieldErrors;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Record range violations under `coordinates.longitude` / `coordinates.latitude`.
    pub fn check(&self, errors: &mut FieldErrors) {
        if !(self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude)) {
            errors.add(
                "coordinates.longitude",
                "Longitude must be between -180 and 180",
                self.longitude,
            );
        }
        if !(self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude)) {
            errors.add(
                "coordinates.latitude",
                "Latitude must be between -90 and 90",
                self.latitude,
            );
        }
    }
}
