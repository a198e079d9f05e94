//! Backend-independent description of the overview/zoom figure.
//!
//! Axis limits follow the usual autoscale rule: the data span plus a 5%
//! margin on each side. The connectors are expressed in each panel's own data
//! coordinates; renderers map them into figure space.

use crate::geodesy::PlanarPosition;
use crate::processing::framer::ClusterFrame;
use crate::processing::pipeline::ArrayMap;
use serde::{Deserialize, Serialize};

const AUTOSCALE_MARGIN: f64 = 0.05;
const DEGENERATE_HALF_SPAN_M: f64 = 1.0;

const EAST_WEST_DESC: &str = "East-West Distance (meters)";
const NORTH_SOUTH_DESC: &str = "North-South Distance (meters)";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// Smallest range covering `values`, padded by `margin` of its span.
    pub fn covering(values: impl IntoIterator<Item = f64>, margin: f64) -> Self {
        let (lo, hi) = values
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if !lo.is_finite() || !hi.is_finite() {
            return Self {
                min: -DEGENERATE_HALF_SPAN_M,
                max: DEGENERATE_HALF_SPAN_M,
            };
        }
        let span = hi - lo;
        if span <= 0.0 {
            return Self {
                min: lo - DEGENERATE_HALF_SPAN_M,
                max: hi + DEGENERATE_HALF_SPAN_M,
            };
        }
        Self {
            min: lo - span * margin,
            max: hi + span * margin,
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Position of `value` within the range, 0 at `min` and 1 at `max`.
    pub fn fraction(&self, value: f64) -> f64 {
        (value - self.min) / self.span()
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: PlanarPosition,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelLayout {
    pub title: String,
    pub x_desc: String,
    pub y_desc: Option<String>,
    pub x: AxisRange,
    pub y: AxisRange,
    pub markers: Vec<Marker>,
    pub frame: Option<ClusterFrame>,
    pub notes: Vec<String>,
}

impl PanelLayout {
    /// Maps a data position to unit panel coordinates, y pointing up.
    pub fn to_unit(&self, position: &PlanarPosition) -> (f64, f64) {
        (self.x.fraction(position.x), self.y.fraction(position.y))
    }

    /// Middle of the left or right axis limit, where a connector lands.
    pub fn edge_midpoint(&self, right: bool) -> PlanarPosition {
        let x = if right { self.x.max } else { self.x.min };
        PlanarPosition::new(x, self.y.midpoint())
    }
}

/// Straight line from the overview panel to the zoom panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    /// Overview data coordinates.
    pub from: PlanarPosition,
    /// Zoom data coordinates.
    pub to: PlanarPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureLayout {
    pub overview: PanelLayout,
    pub zoom: PanelLayout,
    pub connectors: [Connector; 2],
}

impl FigureLayout {
    pub fn build(map: &ArrayMap, annotate_origin: bool) -> Self {
        let frame = map.frame;
        let bounds = frame.bounds();

        let overview_markers = map
            .antennas
            .iter()
            .enumerate()
            .map(|(i, antenna)| Marker {
                position: antenna.planar,
                label: (!map.is_clustered(i)).then(|| antenna.display_label()),
            })
            .collect::<Vec<_>>();
        let overview_x = AxisRange::covering(
            overview_markers
                .iter()
                .map(|m| m.position.x)
                .chain([bounds.min().x, bounds.max().x]),
            AUTOSCALE_MARGIN,
        );
        let overview_y = AxisRange::covering(
            overview_markers
                .iter()
                .map(|m| m.position.y)
                .chain([bounds.min().y, bounds.max().y]),
            AUTOSCALE_MARGIN,
        );

        let notes = if annotate_origin {
            let origin = map.plot_origin;
            vec![
                "Origin (0,0) corresponds to:".to_string(),
                format!("Longitude: {:.8}", origin.lon_deg),
                format!("Latitude: {:.8}", origin.lat_deg),
            ]
        } else {
            Vec::new()
        };

        let overview = PanelLayout {
            title: "Antenna Locations".into(),
            x_desc: EAST_WEST_DESC.into(),
            y_desc: Some(NORTH_SOUTH_DESC.into()),
            x: overview_x,
            y: overview_y,
            markers: overview_markers,
            frame: Some(frame),
            notes,
        };

        let zoom_markers = map
            .cluster()
            .map(|antenna| Marker {
                position: antenna.planar,
                label: Some(antenna.display_label()),
            })
            .collect::<Vec<_>>();
        let zoom = PanelLayout {
            title: "Zoomed View of Clustered Antennas".into(),
            x_desc: EAST_WEST_DESC.into(),
            y_desc: None,
            x: AxisRange::covering(zoom_markers.iter().map(|m| m.position.x), AUTOSCALE_MARGIN),
            y: AxisRange::covering(zoom_markers.iter().map(|m| m.position.y), AUTOSCALE_MARGIN),
            markers: zoom_markers,
            frame: None,
            notes: Vec::new(),
        };

        let connectors = [
            Connector {
                from: frame.left_anchor(),
                to: zoom.edge_midpoint(false),
            },
            Connector {
                from: frame.right_anchor(),
                to: zoom.edge_midpoint(true),
            },
        ];

        Self {
            overview,
            zoom,
            connectors,
        }
    }
}
