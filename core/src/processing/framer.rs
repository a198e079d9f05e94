use crate::geodesy::PlanarPosition;
use crate::math::stats::StatsHelper;
use crate::prelude::{MapError, MapResult};
use crate::telemetry::log::LogManager;
use geo::{coord, Rect};
use serde::{Deserialize, Serialize};

/// Axis-aligned square around every point but the excluded one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterFrame {
    pub center: PlanarPosition,
    pub half_width: f64,
    pub excluded: usize,
}

impl ClusterFrame {
    pub fn contains(&self, point: &PlanarPosition) -> bool {
        (point.x - self.center.x).abs() <= self.half_width
            && (point.y - self.center.y).abs() <= self.half_width
    }

    pub fn bounds(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.center.x - self.half_width, y: self.center.y - self.half_width },
            coord! { x: self.center.x + self.half_width, y: self.center.y + self.half_width },
        )
    }

    /// Midpoint of the left edge, where the left connector starts.
    pub fn left_anchor(&self) -> PlanarPosition {
        PlanarPosition::new(self.center.x - self.half_width, self.center.y)
    }

    /// Midpoint of the right edge, where the right connector starts.
    pub fn right_anchor(&self) -> PlanarPosition {
        PlanarPosition::new(self.center.x + self.half_width, self.center.y)
    }
}

/// Frames the cluster left after dropping one outlier.
pub struct ClusterFramer {
    excluded: usize,
    margin: f64,
    logger: LogManager,
}

impl ClusterFramer {
    pub fn new(excluded: usize, margin: f64) -> Self {
        Self {
            excluded,
            margin,
            logger: LogManager::new("framer"),
        }
    }

    /// Centroid of the kept points, with a half-width of `margin` times the
    /// largest per-axis deviation from it. A single kept point yields a
    /// zero-size square.
    pub fn frame(&self, points: &[PlanarPosition]) -> MapResult<ClusterFrame> {
        if self.excluded >= points.len() {
            return Err(MapError::InvalidInput(format!(
                "outlier index {} out of range for {} points",
                self.excluded,
                points.len()
            )));
        }
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(MapError::InvalidInput(format!(
                "cluster margin {} must be non-negative",
                self.margin
            )));
        }

        let (xs, ys): (Vec<f64>, Vec<f64>) = points
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.excluded)
            .map(|(_, p)| (p.x, p.y))
            .unzip();
        if xs.is_empty() {
            return Err(MapError::InvalidInput(
                "no points left in the cluster".into(),
            ));
        }

        let center = PlanarPosition::new(StatsHelper::mean(&xs), StatsHelper::mean(&ys));
        let deviation = StatsHelper::max_abs_deviation(&xs, center.x)
            .max(StatsHelper::max_abs_deviation(&ys, center.y));
        if xs.len() < 2 {
            self.logger
                .detail("single-point cluster, frame collapses to zero size");
        }

        let frame = ClusterFrame {
            center,
            half_width: deviation * self.margin,
            excluded: self.excluded,
        };
        self.logger.record(&format!(
            "cluster of {} centred ({:.3}, {:.3}) half-width {:.3} m",
            xs.len(),
            center.x,
            center.y,
            frame.half_width
        ));
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<PlanarPosition> {
        vec![
            PlanarPosition::new(-7.0, -7.0),
            PlanarPosition::new(-7.0, 7.0),
            PlanarPosition::new(0.0, 0.0),
            PlanarPosition::new(6.0, -8.0),
            PlanarPosition::new(6.0, 7.0),
            PlanarPosition::new(-1250.0, -215.0),
        ]
    }

    #[test]
    fn centroid_is_mean_of_kept_points() {
        let frame = ClusterFramer::new(5, 3.0).frame(&sample()).unwrap();
        assert!((frame.center.x - (-2.0 / 5.0)).abs() < 1e-12);
        assert!((frame.center.y - (-1.0 / 5.0)).abs() < 1e-12);
    }

    #[test]
    fn half_width_scales_largest_deviation() {
        let frame = ClusterFramer::new(5, 3.0).frame(&sample()).unwrap();
        // largest deviation is |-8 - (-0.2)| = 7.8 on the y axis
        assert!((frame.half_width - 3.0 * 7.8).abs() < 1e-9);
    }

    #[test]
    fn kept_points_lie_inside_and_outlier_outside() {
        let points = sample();
        let frame = ClusterFramer::new(5, 3.0).frame(&points).unwrap();
        for point in &points[..5] {
            assert!(frame.contains(point));
        }
        assert!(!frame.contains(&points[5]));

        let bounds = frame.bounds();
        assert!((bounds.width() - 2.0 * frame.half_width).abs() < 1e-9);
        assert_eq!(frame.left_anchor().y, frame.center.y);
        assert_eq!(frame.right_anchor().x, bounds.max().x);
    }

    #[test]
    fn single_point_cluster_collapses() {
        let points = vec![PlanarPosition::new(4.0, 5.0), PlanarPosition::new(900.0, 0.0)];
        let frame = ClusterFramer::new(1, 3.0).frame(&points).unwrap();
        assert_eq!(frame.center, PlanarPosition::new(4.0, 5.0));
        assert_eq!(frame.half_width, 0.0);
    }

    #[test]
    fn empty_cluster_and_bad_index_are_rejected() {
        let one = vec![PlanarPosition::ORIGIN];
        assert!(matches!(
            ClusterFramer::new(0, 3.0).frame(&one),
            Err(MapError::InvalidInput(_))
        ));
        assert!(matches!(
            ClusterFramer::new(6, 3.0).frame(&sample()),
            Err(MapError::InvalidInput(_))
        ));
    }
}
