use crate::array::{AntennaPoint, AntennaSite, CLUSTER_MARGIN, ORIGIN_INDEX, OUTLIER_INDEX};
use crate::geodesy::{GeodeticPosition, PlanarPosition};
use crate::prelude::{MapError, MapResult};
use crate::processing::framer::{ClusterFrame, ClusterFramer};
use crate::processing::projector::CoordinateProjector;
use crate::telemetry::log::LogManager;

/// Projected antennas together with the cluster frame.
#[derive(Debug, Clone)]
pub struct ArrayMap {
    pub antennas: Vec<AntennaPoint>,
    pub origin_index: usize,
    /// Geodetic position of the plane's (0, 0), found by inverse projection.
    pub plot_origin: GeodeticPosition,
    pub frame: ClusterFrame,
}

impl ArrayMap {
    pub fn origin(&self) -> &AntennaPoint {
        &self.antennas[self.origin_index]
    }

    pub fn outlier(&self) -> &AntennaPoint {
        &self.antennas[self.frame.excluded]
    }

    pub fn is_clustered(&self, index: usize) -> bool {
        index != self.frame.excluded
    }

    pub fn cluster(&self) -> impl Iterator<Item = &AntennaPoint> + '_ {
        self.antennas
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_clustered(*i))
            .map(|(_, antenna)| antenna)
    }
}

/// Projection followed by cluster framing.
#[derive(Debug, Clone)]
pub struct MapPipeline {
    pub origin_index: usize,
    pub outlier_index: usize,
    pub margin: f64,
}

impl Default for MapPipeline {
    fn default() -> Self {
        Self {
            origin_index: ORIGIN_INDEX,
            outlier_index: OUTLIER_INDEX,
            margin: CLUSTER_MARGIN,
        }
    }
}

impl MapPipeline {
    pub fn run(&self, sites: &[AntennaSite]) -> MapResult<ArrayMap> {
        let logger = LogManager::new("pipeline");
        let origin = sites.get(self.origin_index).ok_or_else(|| {
            MapError::InvalidInput(format!(
                "origin index {} out of range for {} antennas",
                self.origin_index,
                sites.len()
            ))
        })?;
        logger.record(&format!("projecting around antenna {}", origin.label));

        let projector = CoordinateProjector::centered_on(origin.geodetic)?;
        let antennas = projector.project(sites)?;
        let plot_origin = projector.unproject(&PlanarPosition::ORIGIN)?;
        logger.detail(&format!(
            "plane origin at lon {:.8} lat {:.8}",
            plot_origin.lon_deg, plot_origin.lat_deg
        ));
        let planar: Vec<PlanarPosition> = antennas.iter().map(|a| a.planar).collect();
        let frame = ClusterFramer::new(self.outlier_index, self.margin).frame(&planar)?;

        Ok(ArrayMap {
            antennas,
            origin_index: self.origin_index,
            plot_origin,
            frame,
        })
    }
}
