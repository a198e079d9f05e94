//! Core geometry and rendering for the antenna map tools.
//!
//! Surveyed antenna positions are projected onto a transverse Mercator plane
//! centred on a reference antenna, the tight cluster is framed with a bounding
//! square, and the result is laid out as an overview/zoom figure that the
//! binaries either rasterise or display.

pub mod array;
pub mod geodesy;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod render;
pub mod telemetry;

pub use prelude::{MapError, MapResult, RenderConfig};
