pub mod ellipsoid;
pub mod position;
pub mod tmerc;

pub use ellipsoid::Ellipsoid;
pub use position::{GeodeticPosition, PlanarPosition};
pub use tmerc::TransverseMercator;
