pub mod framer;
pub mod layout;
pub mod pipeline;
pub mod projector;

pub use framer::{ClusterFrame, ClusterFramer};
pub use layout::{AxisRange, Connector, FigureLayout, Marker, PanelLayout};
pub use pipeline::{ArrayMap, MapPipeline};
pub use projector::CoordinateProjector;
