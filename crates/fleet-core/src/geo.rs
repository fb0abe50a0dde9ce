//! Geo primitives: coordinates, great-circle distance, circular zone
//! containment.

use serde::{Deserialize, Serialize};

/// Mean earth radius in meters, used by the haversine formula below.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other`, in meters.
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();
        EARTH_RADIUS_M * c
    }
}

/// A circular geofence: a center point and a radius in meters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Zone {
    pub zone_id: String,
    pub center: Coordinate,
    pub radius_m: f64,
    pub restricted: bool,
}

impl Zone {
    pub fn contains(&self, point: &Coordinate) -> bool {
        self.center.distance_m(point) <= self.radius_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let c = Coordinate::new(51.5074, -0.1278);
        assert!(c.distance_m(&c) < 1e-6);
    }

    #[test]
    fn known_distance_london_paris() {
        // London (St Paul's) to Paris (Notre-Dame), ~344 km.
        let london = Coordinate::new(51.5138, -0.0984);
        let paris = Coordinate::new(48.8530, 2.3499);
        let d = london.distance_m(&paris) / 1000.0;
        assert!((330.0..360.0).contains(&d), "distance was {d} km");
    }

    #[test]
    fn zone_containment() {
        let zone = Zone {
            zone_id: "test".into(),
            center: Coordinate::new(45.4642, 9.1900),
            radius_m: 500.0,
            restricted: true,
        };
        assert!(zone.contains(&Coordinate::new(45.4642, 9.1900)));
        // ~700 m away — outside a 500 m radius.
        assert!(!zone.contains(&Coordinate::new(45.4700, 9.1950)));
    }
}
