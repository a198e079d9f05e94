use crate::geodesy::{GeodeticPosition, PlanarPosition};
use crate::prelude::MapResult;
use crate::processing::{ArrayMap, ClusterFrame};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntennaEntry {
    pub label: String,
    pub geodetic: GeodeticPosition,
    pub planar: PlanarPosition,
    pub clustered: bool,
    pub planar_from_origin_m: f64,
    pub geodesic_from_origin_m: f64,
}

/// Summary of a projected array, written next to the figure on request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayReport {
    pub origin_label: String,
    pub origin: GeodeticPosition,
    pub antennas: Vec<AntennaEntry>,
    pub frame: ClusterFrame,
}

impl ArrayReport {
    pub fn from_map(map: &ArrayMap) -> Self {
        let origin = map.origin();
        let antennas = map
            .antennas
            .iter()
            .enumerate()
            .map(|(i, antenna)| AntennaEntry {
                label: antenna.label.clone(),
                geodetic: antenna.geodetic,
                planar: antenna.planar,
                clustered: map.is_clustered(i),
                planar_from_origin_m: antenna.planar.distance_to(&origin.planar),
                geodesic_from_origin_m: antenna.geodetic.geodesic_distance(&origin.geodetic),
            })
            .collect();

        Self {
            origin_label: origin.label.clone(),
            origin: origin.geodetic,
            antennas,
            frame: map.frame,
        }
    }

    pub fn to_json(&self) -> MapResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::survey_sites;
    use crate::processing::MapPipeline;

    #[test]
    fn report_lists_every_antenna_with_distances() {
        let map = MapPipeline::default().run(&survey_sites().unwrap()).unwrap();
        let report = ArrayReport::from_map(&map);
        assert_eq!(report.origin_label, "07");
        assert_eq!(report.antennas.len(), 6);
        assert_eq!(report.antennas.iter().filter(|a| a.clustered).count(), 5);

        let origin = &report.antennas[map.origin_index];
        assert_eq!(origin.planar_from_origin_m, 0.0);
        assert!(origin.geodesic_from_origin_m.abs() < 1e-9);

        for entry in &report.antennas {
            assert!((entry.planar_from_origin_m - entry.geodesic_from_origin_m).abs() < 0.01);
        }
    }

    #[test]
    fn report_serializes_to_json() {
        let map = MapPipeline::default().run(&survey_sites().unwrap()).unwrap();
        let json = ArrayReport::from_map(&map).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["antennas"][5]["label"], "01");
        assert_eq!(value["antennas"][5]["clustered"], false);
        assert!(value["frame"]["half_width"].as_f64().unwrap() > 0.0);
    }
}
