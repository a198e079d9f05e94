use crate::array::{AntennaPoint, AntennaSite};
use crate::geodesy::{GeodeticPosition, PlanarPosition, TransverseMercator};
use crate::prelude::MapResult;
use crate::telemetry::log::LogManager;

/// Projects surveyed sites onto a transverse Mercator plane centred on one of them.
pub struct CoordinateProjector {
    projection: TransverseMercator,
    logger: LogManager,
}

impl CoordinateProjector {
    pub fn centered_on(origin: GeodeticPosition) -> MapResult<Self> {
        let projection = TransverseMercator::local(origin)?;
        let logger = LogManager::new("projector");
        logger.detail(&format!(
            "tmerc origin lon {:.8} lat {:.8}",
            origin.lon_deg, origin.lat_deg
        ));
        Ok(Self { projection, logger })
    }

    /// Locates a planar position back on the ellipsoid.
    pub fn unproject(&self, planar: &PlanarPosition) -> MapResult<GeodeticPosition> {
        self.projection.unproject(planar)
    }

    pub fn project_positions(&self, positions: &[GeodeticPosition]) -> MapResult<Vec<PlanarPosition>> {
        positions
            .iter()
            .map(|position| self.projection.project(position))
            .collect()
    }

    pub fn project(&self, sites: &[AntennaSite]) -> MapResult<Vec<AntennaPoint>> {
        let points = sites
            .iter()
            .map(|site| {
                let planar = self.projection.project(&site.geodetic)?;
                self.logger.detail(&format!(
                    "antenna {} -> ({:.3}, {:.3}) m",
                    site.label, planar.x, planar.y
                ));
                Ok(AntennaPoint::new(site, planar))
            })
            .collect::<MapResult<Vec<_>>>()?;
        self.logger
            .record(&format!("projected {} antennas", points.len()));
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{survey_sites, ORIGIN_INDEX, OUTLIER_INDEX};
    use crate::prelude::MapError;

    fn survey_points() -> Vec<AntennaPoint> {
        let sites = survey_sites().unwrap();
        let projector = CoordinateProjector::centered_on(sites[ORIGIN_INDEX].geodetic).unwrap();
        projector.project(&sites).unwrap()
    }

    #[test]
    fn origin_antenna_lands_on_zero() {
        let points = survey_points();
        let origin = points[ORIGIN_INDEX].planar;
        assert!(origin.x.abs() < 1e-9);
        assert!(origin.y.abs() < 1e-9);
    }

    #[test]
    fn outlier_is_kilometres_away_while_cluster_is_tight() {
        let points = survey_points();
        let outlier = points[OUTLIER_INDEX].planar;
        assert!(outlier.magnitude() > 1_000.0);
        assert!(outlier.x < 0.0 && outlier.y < 0.0);

        let cluster: Vec<_> = points
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != OUTLIER_INDEX)
            .map(|(_, point)| point.planar)
            .collect();
        for a in &cluster {
            assert!(a.magnitude() < outlier.magnitude());
            for b in &cluster {
                assert!(a.distance_to(b) < 50.0);
            }
        }
    }

    #[test]
    fn planar_distances_track_geodesic_distances() {
        let points = survey_points();
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                let planar = a.planar.distance_to(&b.planar);
                let geodesic = a.geodetic.geodesic_distance(&b.geodetic);
                assert!(
                    (planar - geodesic).abs() < 0.01,
                    "{} -> {}: planar {planar} geodesic {geodesic}",
                    a.label,
                    b.label
                );
            }
        }
    }

    #[test]
    fn distant_points_stay_sub_meter_accurate() {
        let origin = GeodeticPosition::new(-118.280_778_18, 37.233_393_58);
        let projector = CoordinateProjector::centered_on(origin).unwrap();
        let far = GeodeticPosition::new(-118.150, 37.350);
        let planar = projector.project_positions(&[far]).unwrap()[0];
        let geodesic = origin.geodesic_distance(&far);
        assert!(geodesic > 15_000.0);
        assert!((planar.magnitude() - geodesic).abs() < 1.0);
    }

    #[test]
    fn plane_origin_unprojects_to_the_centre() {
        let origin = GeodeticPosition::new(-118.280_778_18, 37.233_393_58);
        let projector = CoordinateProjector::centered_on(origin).unwrap();
        let centre = projector.unproject(&PlanarPosition::ORIGIN).unwrap();
        assert!((centre.lon_deg - origin.lon_deg).abs() < 1e-10);
        assert!((centre.lat_deg - origin.lat_deg).abs() < 1e-10);
        assert!(matches!(
            projector.unproject(&PlanarPosition::new(f64::INFINITY, 0.0)),
            Err(MapError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn malformed_site_aborts_projection() {
        let origin = GeodeticPosition::new(-118.28, 37.23);
        let projector = CoordinateProjector::centered_on(origin).unwrap();
        let sites = vec![
            AntennaSite::new("ok", origin),
            AntennaSite::new("bad", GeodeticPosition::new(f64::NAN, 37.23)),
        ];
        assert!(matches!(
            projector.project(&sites),
            Err(MapError::InvalidCoordinate(_))
        ));
    }
}
