//! Static per-city zone tables. Canonical centers and radii for the
//! geofences referenced by the Milan and Rome policies.

use fleet_core::geo::{Coordinate, Zone};

/// Milan's restricted zone set (policy: any vehicle found inside one of
/// these triggers an emergency lock via `is_allowed`).
pub fn milan_restricted_zones() -> Vec<Zone> {
    vec![Zone {
        zone_id: "MI-CENTRO".into(),
        center: Coordinate::new(45.4642, 9.1900),
        radius_m: 500.0,
        restricted: true,
    }]
}

/// Rome's general ZTL (limited-traffic zone) — blocks every vehicle kind.
pub fn rome_ztl_zones() -> Vec<Zone> {
    vec![Zone {
        zone_id: "ROM-ZTL".into(),
        center: Coordinate::new(41.8933, 12.4829),
        radius_m: 1_200.0,
        restricted: true,
    }]
}

/// Rome's archaeological/pedestrian zone set — additionally blocks
/// scooters specifically.
pub fn rome_archaeological_zones() -> Vec<Zone> {
    vec![Zone {
        zone_id: "ROM-ARCHEO".into(),
        center: Coordinate::new(41.8902, 12.4922),
        radius_m: 600.0,
        restricted: true,
    }]
}

pub fn in_any(zones: &[Zone], point: &Coordinate) -> bool {
    zones.iter().any(|z| z.contains(point))
}
