//! Ellipsoidal transverse Mercator projection.
//!
//! Uses Krüger's series in the third flattening `n`, carried to `n^4`, which
//! keeps the projection accurate to well below a millimetre within a few
//! thousand kilometres of the central meridian. The false northing is chosen
//! so that the projection origin (`lat_0`, `lon_0`) lands on `(0, 0)`.

use crate::geodesy::{Ellipsoid, GeodeticPosition, PlanarPosition};
use crate::prelude::{MapError, MapResult};

const ORDER: usize = 4;

/// Transverse Mercator projection centred on an arbitrary origin.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    scale_factor: f64,
    lat0: f64,
    lon0: f64,
    rectifying_radius: f64,
    eccentricity: f64,
    alpha: [f64; ORDER],
    beta: [f64; ORDER],
    delta: [f64; ORDER],
    origin_northing: f64,
}

impl TransverseMercator {
    /// Local projection with unit scale factor on WGS84.
    pub fn local(origin: GeodeticPosition) -> MapResult<Self> {
        Self::new(origin, Ellipsoid::WGS84, 1.0)
    }

    pub fn new(origin: GeodeticPosition, ellipsoid: Ellipsoid, scale_factor: f64) -> MapResult<Self> {
        origin
            .validate()
            .map_err(|err| MapError::Projection(format!("bad origin: {err}")))?;
        if origin.lat_deg.abs() >= 90.0 {
            return Err(MapError::Projection(format!(
                "origin latitude {} is a pole",
                origin.lat_deg
            )));
        }
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            return Err(MapError::Projection(format!(
                "scale factor {scale_factor} must be positive"
            )));
        }
        if !(ellipsoid.semi_major_m > 0.0 && (0.0..1.0).contains(&ellipsoid.flattening)) {
            return Err(MapError::Projection(format!(
                "unusable ellipsoid {ellipsoid:?}"
            )));
        }

        let n = ellipsoid.third_flattening();
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0,
            49_561.0 * n4 / 161_280.0,
        ];
        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0,
            4397.0 * n4 / 161_280.0,
        ];
        let delta = [
            2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3 + 116.0 * n4 / 45.0,
            7.0 * n2 / 3.0 - 8.0 * n3 / 5.0 - 227.0 * n4 / 45.0,
            56.0 * n3 / 15.0 - 136.0 * n4 / 35.0,
            4279.0 * n4 / 630.0,
        ];

        let mut projection = Self {
            scale_factor,
            lat0: origin.lat_deg.to_radians(),
            lon0: origin.lon_deg.to_radians(),
            rectifying_radius: ellipsoid.rectifying_radius(),
            eccentricity: ellipsoid.eccentricity(),
            alpha,
            beta,
            delta,
            origin_northing: 0.0,
        };
        let (_, origin_xi) = projection.series_forward(projection.lat0, 0.0);
        projection.origin_northing = projection.scaled_radius() * origin_xi;
        Ok(projection)
    }

    /// Projects a geodetic position to easting/northing in meters.
    pub fn project(&self, position: &GeodeticPosition) -> MapResult<PlanarPosition> {
        position.validate()?;
        let lat = position.lat_deg.to_radians();
        let dlon = wrap_radians(position.lon_deg.to_radians() - self.lon0);
        let (eta, xi) = self.series_forward(lat, dlon);

        let radius = self.scaled_radius();
        let planar = PlanarPosition::new(radius * eta, radius * xi - self.origin_northing);
        if !planar.x.is_finite() || !planar.y.is_finite() {
            return Err(MapError::Projection(format!(
                "({}, {}) has no finite image under this projection",
                position.lon_deg, position.lat_deg
            )));
        }
        Ok(planar)
    }

    /// Maps easting/northing back onto the ellipsoid.
    pub fn unproject(&self, planar: &PlanarPosition) -> MapResult<GeodeticPosition> {
        if !planar.x.is_finite() || !planar.y.is_finite() {
            return Err(MapError::InvalidCoordinate(format!(
                "non-finite planar position ({}, {})",
                planar.x, planar.y
            )));
        }
        let radius = self.scaled_radius();
        let xi = (planar.y + self.origin_northing) / radius;
        let eta = planar.x / radius;

        let mut xi_prime = xi;
        let mut eta_prime = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_prime -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_prime -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_prime.sin() / eta_prime.cosh()).clamp(-1.0, 1.0).asin();
        let mut lat = chi;
        for (j, delta) in self.delta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            lat += delta * (k * chi).sin();
        }
        let lon = self.lon0 + eta_prime.sinh().atan2(xi_prime.cos());

        Ok(GeodeticPosition::new(
            wrap_radians(lon).to_degrees(),
            lat.to_degrees(),
        ))
    }

    fn scaled_radius(&self) -> f64 {
        self.scale_factor * self.rectifying_radius
    }

    /// Returns `(eta, xi)` on the rectifying sphere for a latitude and a
    /// longitude offset from the central meridian, both in radians.
    fn series_forward(&self, lat: f64, dlon: f64) -> (f64, f64) {
        let e = self.eccentricity;
        let sin_lat = lat.sin();
        let tau = (sin_lat.atanh() - e * (e * sin_lat).atanh()).sinh();
        let xi_prime = tau.atan2(dlon.cos());
        let eta_prime = (dlon.sin() / (1.0 + tau * tau).sqrt()).atanh();

        let mut xi = xi_prime;
        let mut eta = eta_prime;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_prime).sin() * (k * eta_prime).cosh();
            eta += alpha * (k * xi_prime).cos() * (k * eta_prime).sinh();
        }
        (eta, xi)
    }
}

fn wrap_radians(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI && angle > 0.0 {
        PI
    } else {
        wrapped
    }
}
