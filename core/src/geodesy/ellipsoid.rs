use serde::{Deserialize, Serialize};

/// Reference ellipsoid given by its semi-major axis and flattening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    pub semi_major_m: f64,
    pub flattening: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major_m: 6_378_137.0,
        flattening: 1.0 / 298.257_223_563,
    };

    /// Third flattening `n = f / (2 - f)`.
    pub fn third_flattening(&self) -> f64 {
        self.flattening / (2.0 - self.flattening)
    }

    pub fn eccentricity(&self) -> f64 {
        (self.flattening * (2.0 - self.flattening)).sqrt()
    }

    /// Radius of the rectifying sphere, scaled so that `A * pi / 2` is the
    /// equator-to-pole meridian length.
    pub fn rectifying_radius(&self) -> f64 {
        let n = self.third_flattening();
        let n2 = n * n;
        self.semi_major_m / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0)
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}
