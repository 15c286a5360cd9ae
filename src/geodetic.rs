use std::f64::consts::TAU;

use chrono::{DateTime, TimeZone, Utc};

pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115_9e-5;
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.137;
/// Greenwich sidereal angle at J2000.0.
pub const SIDEREAL_ANGLE_J2000_RAD: f64 = 4.894_961_212_823_756;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

impl Geodetic {
    pub fn is_finite(&self) -> bool {
        self.latitude_deg.is_finite() && self.longitude_deg.is_finite() && self.altitude_km.is_finite()
    }
}

/// 2000-01-01T12:00:00 UTC
pub fn j2000() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0)
        .single()
        .expect("J2000 is a valid UTC instant")
}

pub fn seconds_since_j2000(epoch: DateTime<Utc>) -> f64 {
    let delta = epoch - j2000();
    delta
        .num_microseconds()
        .map_or(delta.num_milliseconds() as f64 / 1e3, |us| us as f64 / 1e6)
}

/// Rotation between the inertial frame and the Earth-fixed frame, in [0, 2π).
///
/// Linear in time from the J2000 angle. Precession, nutation and polar motion
/// are not modelled, so the error grows slowly with distance from J2000; at
/// multi-day horizons it stays well below what a map rendering can show.
pub fn sidereal_angle(epoch: DateTime<Utc>) -> f64 {
    (SIDEREAL_ANGLE_J2000_RAD + EARTH_ROTATION_RAD_S * seconds_since_j2000(epoch)).rem_euclid(TAU)
}

/// Brings a longitude in (-540, 540) into (-180, 180] with a single wrap.
pub fn normalize_longitude(lon_deg: f64) -> f64 {
    if lon_deg > 180.0 {
        lon_deg - 360.0
    } else if lon_deg <= -180.0 {
        lon_deg + 360.0
    } else {
        lon_deg
    }
}

/// Sub-satellite point of an ECI position on a spherical Earth.
///
/// Latitude is geocentric, not ellipsoidal, and altitude is measured from the
/// equatorial radius. Non-finite input yields non-finite output.
pub fn eci_to_geodetic(position_eci: [f64; 3], epoch: DateTime<Utc>) -> Geodetic {
    let [x, y, z] = position_eci;
    let theta = sidereal_angle(epoch);

    let longitude_deg = normalize_longitude((y.atan2(x) - theta).to_degrees());

    let r_xy = (x * x + y * y).sqrt();
    let latitude_deg = z.atan2(r_xy).to_degrees();

    let altitude_km = (x * x + y * y + z * z).sqrt() - EARTH_EQUATORIAL_RADIUS_KM;

    Geodetic {
        latitude_deg,
        longitude_deg,
        altitude_km,
    }
}

pub fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use chrono::Duration;
    use proptest::prelude::*;

    #[test]
    fn j2000_is_noon_first_of_january_2000() {
        assert_eq!(j2000().to_rfc3339(), "2000-01-01T12:00:00+00:00");
        assert_eq!(seconds_since_j2000(j2000()), 0.0);
        assert_eq!(seconds_since_j2000(j2000() + Duration::milliseconds(1500)), 1.5);
    }

    #[test]
    fn sidereal_angle_at_j2000_is_reference_angle() {
        assert_relative_eq!(sidereal_angle(j2000()), SIDEREAL_ANGLE_J2000_RAD);
    }

    #[test]
    fn sidereal_angle_advances_with_earth_rotation() {
        let later = j2000() + Duration::seconds(3600);
        let expected = (SIDEREAL_ANGLE_J2000_RAD + EARTH_ROTATION_RAD_S * 3600.0).rem_euclid(TAU);
        assert_relative_eq!(sidereal_angle(later), expected, epsilon = 1e-12);
    }

    #[test]
    fn sidereal_angle_before_j2000_stays_positive() {
        let earlier = j2000() - Duration::days(400);
        let theta = sidereal_angle(earlier);
        assert!((0.0..TAU).contains(&theta));
    }

    #[test]
    fn normalize_wraps_once() {
        assert_eq!(normalize_longitude(190.0), -170.0);
        assert_eq!(normalize_longitude(-190.0), 170.0);
        assert_eq!(normalize_longitude(-180.0), 180.0);
        assert_eq!(normalize_longitude(180.0), 180.0);
        assert_eq!(normalize_longitude(-450.0), -90.0);
        assert_eq!(normalize_longitude(42.0), 42.0);
    }

    #[test]
    fn point_over_equator_has_zero_latitude() {
        let g = eci_to_geodetic([7000.0, 0.0, 0.0], j2000());
        assert_abs_diff_eq!(g.latitude_deg, 0.0);
        assert_relative_eq!(g.altitude_km, 7000.0 - EARTH_EQUATORIAL_RADIUS_KM);
        let expected_lon = normalize_longitude(-SIDEREAL_ANGLE_J2000_RAD.to_degrees());
        assert_relative_eq!(g.longitude_deg, expected_lon, epsilon = 1e-9);
    }

    #[test]
    fn point_over_pole_has_ninety_latitude() {
        let g = eci_to_geodetic([0.0, 0.0, 7000.0], j2000());
        assert_relative_eq!(g.latitude_deg, 90.0);
        let g = eci_to_geodetic([0.0, 0.0, -7000.0], j2000());
        assert_relative_eq!(g.latitude_deg, -90.0);
    }

    #[test]
    fn forty_five_degree_latitude() {
        let g = eci_to_geodetic([5000.0, 0.0, 5000.0], j2000());
        assert_relative_eq!(g.latitude_deg, 45.0, epsilon = 1e-12);
    }

    #[test]
    fn nan_input_propagates() {
        let g = eci_to_geodetic([f64::NAN, 1.0, 1.0], j2000());
        assert!(!g.is_finite());
    }

    proptest! {
        #[test]
        fn altitude_is_norm_minus_radius(
            x in -1e5f64..1e5,
            y in -1e5f64..1e5,
            z in -1e5f64..1e5,
            secs in -1e9f64..1e9,
        ) {
            let epoch = j2000() + Duration::milliseconds((secs * 1e3) as i64);
            let g = eci_to_geodetic([x, y, z], epoch);
            let expected = norm([x, y, z]) - EARTH_EQUATORIAL_RADIUS_KM;
            prop_assert!((g.altitude_km - expected).abs() < 1e-9);
        }

        #[test]
        fn longitude_in_half_open_range(
            x in -1e5f64..1e5,
            y in -1e5f64..1e5,
            z in -1e5f64..1e5,
            secs in -1e10f64..1e10,
        ) {
            prop_assume!(x != 0.0 || y != 0.0);
            let epoch = j2000() + Duration::milliseconds((secs * 1e3) as i64);
            let g = eci_to_geodetic([x, y, z], epoch);
            prop_assert!(g.longitude_deg > -180.0 && g.longitude_deg <= 180.0);
            prop_assert!((-90.0..=90.0).contains(&g.latitude_deg));
        }
    }
}
