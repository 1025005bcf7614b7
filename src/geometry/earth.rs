//! Geodetic ↔ geocentric conversion on a spherical earth.

use super::{dot, norm, Vec3};

/// Mean earth radius in metres, as used by global NWP grids.
pub const EARTH_RADIUS: f64 = 6_371_229.0;

/// Geodetic (longitude, latitude) in degrees to geocentric Cartesian
/// coordinates on a sphere of radius `radius`.
pub fn lonlat_to_xyz(lon: f64, lat: f64, radius: f64) -> Vec3 {
    let lon = lon.to_radians();
    let lat = lat.to_radians();
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    [
        radius * cos_lat * cos_lon,
        radius * cos_lat * sin_lon,
        radius * sin_lat,
    ]
}

/// Geocentric Cartesian coordinates back to geodetic (longitude, latitude)
/// in degrees. The longitude of a pole point is 0.
pub fn xyz_to_lonlat(p: Vec3) -> (f64, f64) {
    let r = norm(p);
    if r == 0.0 {
        return (0.0, 0.0);
    }
    let lat = (p[2] / r).clamp(-1.0, 1.0).asin().to_degrees();
    let lon = if p[0] == 0.0 && p[1] == 0.0 {
        0.0
    } else {
        p[1].atan2(p[0]).to_degrees()
    };
    (lon, lat)
}

/// Central angle in radians between two points given in Cartesian
/// coordinates. The points need not lie on the same sphere.
pub fn central_angle(a: Vec3, b: Vec3) -> f64 {
    let denom = norm(a) * norm(b);
    if denom == 0.0 {
        return 0.0;
    }
    (dot(a, b) / denom).clamp(-1.0, 1.0).acos()
}

/// Great-circle distance in metres between two geodetic points (degrees).
pub fn geodetic_distance(lonlat_a: (f64, f64), lonlat_b: (f64, f64)) -> f64 {
    let a = lonlat_to_xyz(lonlat_a.0, lonlat_a.1, 1.0);
    let b = lonlat_to_xyz(lonlat_b.0, lonlat_b.1, 1.0);
    EARTH_RADIUS * central_angle(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equator_and_poles() {
        let p = lonlat_to_xyz(0.0, 0.0, EARTH_RADIUS);
        assert!((p[0] - EARTH_RADIUS).abs() < 1e-6);
        assert!(p[1].abs() < 1e-6 && p[2].abs() < 1e-6);

        let n = lonlat_to_xyz(45.0, 90.0, EARTH_RADIUS);
        assert!(n[0].abs() < 1e-6 && n[1].abs() < 1e-6);
        assert!((n[2] - EARTH_RADIUS).abs() < 1e-6);
    }

    #[test]
    fn lonlat_round_trip() {
        for &(lon, lat) in &[(10.0, 20.0), (-75.5, -33.25), (179.0, 89.0)] {
            let (lon2, lat2) = xyz_to_lonlat(lonlat_to_xyz(lon, lat, EARTH_RADIUS));
            assert!((lon - lon2).abs() < 1e-10, "{lon} vs {lon2}");
            assert!((lat - lat2).abs() < 1e-10, "{lat} vs {lat2}");
        }
    }

    #[test]
    fn quarter_circumference() {
        let d = geodetic_distance((0.0, 0.0), (90.0, 0.0));
        let expected = std::f64::consts::FRAC_PI_2 * EARTH_RADIUS;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn central_angle_of_antipodes() {
        let a = [1.0, 0.0, 0.0];
        let b = [-2.0, 0.0, 0.0];
        assert!((central_angle(a, b) - std::f64::consts::PI).abs() < 1e-12);
    }
}
