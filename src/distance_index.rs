use std::collections::HashMap;

use crate::{
    coordinates::CoordinateTable,
    error::LookupError,
    model::{AirportCode, Coordinate},
};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let lambda1 = from.longitude.to_radians();
    let lambda2 = to.longitude.to_radians();

    let half_dlat = (phi2 - phi1) / 2.0;
    let half_dlon = (lambda2 - lambda1) / 2.0;
    let a = half_dlat.sin().powi(2) + phi1.cos() * phi2.cos() * half_dlon.sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

fn canonical_pair(a: AirportCode, b: AirportCode) -> (AirportCode, AirportCode) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Memoized airport-to-airport distances.
///
/// Every pair is computed in the same argument order, so `distance(a, b)` and
/// `distance(b, a)` are bit-identical. Entries are never evicted.
pub struct DistanceIndex<'a> {
    coordinates: &'a CoordinateTable,
    memo: HashMap<(AirportCode, AirportCode), f64>,
    computations: usize,
}

impl<'a> DistanceIndex<'a> {
    pub fn new(coordinates: &'a CoordinateTable) -> Self {
        DistanceIndex {
            coordinates,
            memo: HashMap::new(),
            computations: 0,
        }
    }

    pub fn distance(&mut self, a: AirportCode, b: AirportCode) -> Result<f64, LookupError> {
        let key = canonical_pair(a, b);
        if let Some(distance) = self.memo.get(&key) {
            return Ok(*distance);
        }
        let from = self.coordinates.coordinate(key.0)?;
        let to = self.coordinates.coordinate(key.1)?;
        let distance = haversine_km(from, to);
        self.computations += 1;
        self.memo.insert(key, distance);
        Ok(distance)
    }

    /// How many distances were actually computed rather than served from the memo.
    pub fn computations(&self) -> usize {
        self.computations
    }

    pub fn cached_pairs(&self) -> usize {
        self.memo.len()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn distance_is_symmetric(
            lat1 in -90.0f64..90.0, lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0, lon2 in -180.0f64..180.0,
        ) {
            let table = CoordinateTable::from_coordinates([("AAA", lat1, lon1), ("BBB", lat2, lon2)]);
            let mut forward = DistanceIndex::new(&table);
            let mut backward = DistanceIndex::new(&table);
            let ab = forward.distance("AAA".into(), "BBB".into()).unwrap();
            let ba = backward.distance("BBB".into(), "AAA".into()).unwrap();
            prop_assert_eq!(ab.to_bits(), ba.to_bits());
            prop_assert!(ab >= 0.0);
            prop_assert!(ab <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }
    }
}
