use crate::geodesy::{GeodeticPosition, PlanarPosition};
use serde::{Deserialize, Serialize};

/// Surveyed antenna before projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntennaSite {
    pub label: String,
    pub geodetic: GeodeticPosition,
}

impl AntennaSite {
    pub fn new(label: impl Into<String>, geodetic: GeodeticPosition) -> Self {
        Self {
            label: label.into(),
            geodetic,
        }
    }
}

/// Antenna with both its surveyed and projected position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntennaPoint {
    pub label: String,
    pub geodetic: GeodeticPosition,
    pub planar: PlanarPosition,
}

impl AntennaPoint {
    pub fn new(site: &AntennaSite, planar: PlanarPosition) -> Self {
        Self {
            label: site.label.clone(),
            geodetic: site.geodetic,
            planar,
        }
    }

    /// Annotation text used on the plots.
    pub fn display_label(&self) -> String {
        format!("Ant {}", self.label)
    }
}
