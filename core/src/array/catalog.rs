//! Surveyed antenna positions for the array being mapped.

use crate::array::AntennaSite;
use crate::geodesy::GeodeticPosition;
use crate::prelude::{MapError, MapResult};

/// Antenna numbers, parallel to [`SURVEY_COORDS`].
pub const SURVEY_LABELS: [&str; 6] = ["09", "08", "07", "06", "03", "01"];

/// Longitude/latitude pairs in decimal degrees, WGS84.
pub const SURVEY_COORDS: [(f64, f64); 6] = [
    (-118.280_859_14, 37.233_331_1),
    (-118.280_859_68, 37.233_457_25),
    (-118.280_778_18, 37.233_393_58),
    (-118.280_703_17, 37.233_319_83),
    (-118.280_697_84, 37.233_458_07),
    (-118.294_838_294, 37.231_448_381_9),
];

/// Antenna 07 is the projection origin.
pub const ORIGIN_INDEX: usize = 2;

/// Antenna 01 sits well away from the others and is left out of the cluster.
pub const OUTLIER_INDEX: usize = 5;

/// Half-width of the cluster square as a multiple of the largest deviation.
pub const CLUSTER_MARGIN: f64 = 3.0;

/// Pairs labels with coordinates, validating both lists.
pub fn build_sites(labels: &[&str], coords: &[(f64, f64)]) -> MapResult<Vec<AntennaSite>> {
    if labels.len() != coords.len() {
        return Err(MapError::InvalidInput(format!(
            "{} labels for {} coordinates",
            labels.len(),
            coords.len()
        )));
    }
    labels
        .iter()
        .zip(coords)
        .map(|(label, &(lon, lat))| {
            let geodetic = GeodeticPosition::checked(lon, lat).map_err(|err| {
                MapError::InvalidCoordinate(format!("antenna {label}: {err}"))
            })?;
            Ok(AntennaSite::new(*label, geodetic))
        })
        .collect()
}

/// The surveyed array.
pub fn survey_sites() -> MapResult<Vec<AntennaSite>> {
    build_sites(&SURVEY_LABELS, &SURVEY_COORDS)
}
