use crate::prelude::{MapError, MapResult};
use geo::{GeodesicDistance, Point};
use serde::{Deserialize, Serialize};

/// Longitude/latitude pair in decimal degrees on WGS84.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeodeticPosition {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    /// Builds a position, rejecting non-finite or out-of-range values.
    pub fn checked(lon_deg: f64, lat_deg: f64) -> MapResult<Self> {
        let position = Self::new(lon_deg, lat_deg);
        position.validate()?;
        Ok(position)
    }

    pub fn validate(&self) -> MapResult<()> {
        if !self.lon_deg.is_finite() || !self.lat_deg.is_finite() {
            return Err(MapError::InvalidCoordinate(format!(
                "non-finite position ({}, {})",
                self.lon_deg, self.lat_deg
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon_deg) {
            return Err(MapError::InvalidCoordinate(format!(
                "longitude {} outside [-180, 180]",
                self.lon_deg
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat_deg) {
            return Err(MapError::InvalidCoordinate(format!(
                "latitude {} outside [-90, 90]",
                self.lat_deg
            )));
        }
        Ok(())
    }

    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.lon_deg, self.lat_deg)
    }

    /// Ellipsoidal (geodesic) distance in meters.
    pub fn geodesic_distance(&self, other: &GeodeticPosition) -> f64 {
        self.to_point().geodesic_distance(&other.to_point())
    }
}

/// Easting/northing pair in meters on the local projection plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanarPosition {
    pub x: f64,
    pub y: f64,
}

impl PlanarPosition {
    pub const ORIGIN: PlanarPosition = PlanarPosition { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &PlanarPosition) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn magnitude(&self) -> f64 {
        self.distance_to(&Self::ORIGIN)
    }
}
