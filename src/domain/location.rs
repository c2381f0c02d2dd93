//! Locations and proximity
//!
//! Locations are named sites (as kept in the roster sheets) with optional
//! coordinates. Two locations with the same name are co-located; otherwise
//! distance is only known when both sides carry coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Error, PartialEq)]
pub enum LocationError {
    #[error("Invalid coordinates '{0}': expected 'lat,lon' in degrees")]
    InvalidCoordinates(String),
}

/// A point on the globe, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(LocationError::InvalidCoordinates(format!("{},{}", lat, lon)));
        }
        Ok(Self { lat, lon })
    }

    /// Great-circle distance in kilometres (haversine)
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.lon - self.lon).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

impl FromStr for GeoPoint {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LocationError::InvalidCoordinates(s.to_string());
        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
        Self::new(lat, lon).map_err(|_| invalid())
    }
}

/// A named site with optional coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
}

impl Location {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coordinates: None,
        }
    }

    pub fn with_coordinates(mut self, point: GeoPoint) -> Self {
        self.coordinates = Some(point);
        self
    }

    /// Returns true if both locations name the same site
    pub fn same_site(&self, other: &Location) -> bool {
        self.name.trim().eq_ignore_ascii_case(other.name.trim())
    }

    /// Distance in kilometres, or None when it cannot be determined
    pub fn distance_km(&self, other: &Location) -> Option<f64> {
        if self.same_site(other) {
            return Some(0.0);
        }
        match (&self.coordinates, &other.coordinates) {
            (Some(a), Some(b)) => Some(a.distance_km(b)),
            _ => None,
        }
    }

    /// Returns the distance if it falls within the radius
    pub fn within(&self, other: &Location, radius_km: f64) -> Option<f64> {
        self.distance_km(other).filter(|d| *d <= radius_km)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bangalore() -> Location {
        Location::named("Bangalore").with_coordinates(GeoPoint::new(12.9716, 77.5946).unwrap())
    }

    fn mysore() -> Location {
        Location::named("Mysore").with_coordinates(GeoPoint::new(12.2958, 76.6394).unwrap())
    }

    #[test]
    fn same_name_is_colocated() {
        let a = Location::named("Bangalore");
        let b = Location::named(" bangalore ");
        assert_eq!(a.distance_km(&b), Some(0.0));
    }

    #[test]
    fn haversine_distance_between_cities() {
        let d = bangalore().distance_km(&mysore()).unwrap();
        assert!((d - 127.0).abs() < 5.0, "unexpected distance {}", d);
    }

    #[test]
    fn unknown_distance_without_coordinates() {
        let a = Location::named("Mumbai");
        assert_eq!(a.distance_km(&bangalore()), None);
        assert_eq!(a.within(&bangalore(), 10_000.0), None);
    }

    #[test]
    fn within_radius() {
        assert!(bangalore().within(&mysore(), 150.0).is_some());
        assert!(bangalore().within(&mysore(), 50.0).is_none());
    }

    #[test]
    fn parse_coordinates() {
        let p: GeoPoint = "12.97, 77.59".parse().unwrap();
        assert_eq!(p.lat, 12.97);
        assert!("12.97".parse::<GeoPoint>().is_err());
        assert!("91,0".parse::<GeoPoint>().is_err());
    }
}
