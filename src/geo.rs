//! Coordinate helpers: distance between points and display formatting

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const EARTH_RADIUS_KM: f64 = 6371.0;
const DEFAULT_LABEL: &str = "Destination";

/// A point on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if valid {
            Ok(Self { latitude, longitude })
        } else {
            Err(Error::InvalidCoordinates { latitude, longitude })
        }
    }

    /// Great-circle distance in kilometres (haversine)
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Address text used when no geocoded address is available
    pub fn fallback_address(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// `850 m`, `2.4 km`, `37 km`
pub fn format_distance(distance_km: f64) -> String {
    if distance_km < 1.0 {
        format!("{} m", (distance_km * 1000.0).round())
    } else if distance_km < 10.0 {
        format!("{:.1} km", distance_km)
    } else {
        format!("{} km", distance_km.round())
    }
}

/// Deep links that open a route to a point in common map apps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationLinks {
    pub apple_maps: String,
    pub google_maps: String,
    pub google_navigation: String,
    pub geo: String,
    pub yandex: String,
}

/// Links to `destination`, routed from `origin` when the apps support it.
/// A blank label falls back to "Destination".
pub fn navigation_links(
    destination: Coordinates,
    label: &str,
    origin: Option<Coordinates>,
) -> NavigationLinks {
    let Coordinates { latitude: lat, longitude: lon } = destination;
    let label = match label.trim() {
        "" => DEFAULT_LABEL,
        trimmed => trimmed,
    };

    let (apple_maps, google_maps) = match origin {
        Some(o) => (
            format!("maps://app?saddr={},{}&daddr={},{}", o.latitude, o.longitude, lat, lon),
            format!(
                "https://maps.google.com/maps?saddr={},{}&daddr={},{}",
                o.latitude, o.longitude, lat, lon
            ),
        ),
        None => (
            format!("maps://app?daddr={},{}", lat, lon),
            format!("https://maps.google.com/maps?daddr={},{}", lat, lon),
        ),
    };

    NavigationLinks {
        apple_maps,
        google_maps,
        google_navigation: format!("google.navigation:q={},{}", lat, lon),
        geo: format!("geo:{lat},{lon}?q={lat},{lon}({})", encode_uri_component(label)),
        // yandex takes longitude first
        yandex: format!("yandexmaps://maps.yandex.ru/?pt={},{}&z=16&l=map", lon, lat),
    }
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
fn encode_uri_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Coordinates::new(90.1, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_distance_moscow_saint_petersburg() {
        let moscow = Coordinates::new(55.7558, 37.6173).unwrap();
        let spb = Coordinates::new(59.9343, 30.3351).unwrap();
        let d = moscow.distance_km(&spb);
        assert!((d - 634.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = Coordinates::new(48.8566, 2.3522).unwrap();
        assert!(p.distance_km(&p).abs() < 1e-9);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.25), "250 m");
        assert_eq!(format_distance(2.44), "2.4 km");
        assert_eq!(format_distance(37.6), "38 km");
    }

    #[test]
    fn test_formatting() {
        let p = Coordinates::new(55.75583, 37.6173).unwrap();
        assert_eq!(p.fallback_address(), "55.7558, 37.6173");
        assert_eq!(p.to_string(), "55.755830, 37.617300");
    }

    #[test]
    fn test_navigation_links_with_origin() {
        let car = Coordinates::new(55.75, 37.61).unwrap();
        let here = Coordinates::new(55.7, 37.5).unwrap();
        let links = navigation_links(car, "Tverskaya 1", Some(here));

        assert_eq!(links.apple_maps, "maps://app?saddr=55.7,37.5&daddr=55.75,37.61");
        assert_eq!(
            links.google_maps,
            "https://maps.google.com/maps?saddr=55.7,37.5&daddr=55.75,37.61"
        );
        assert_eq!(links.google_navigation, "google.navigation:q=55.75,37.61");
        assert_eq!(links.geo, "geo:55.75,37.61?q=55.75,37.61(Tverskaya%201)");
        assert_eq!(
            links.yandex,
            "yandexmaps://maps.yandex.ru/?pt=37.61,55.75&z=16&l=map"
        );
    }

    #[test]
    fn test_navigation_links_without_origin() {
        let car = Coordinates::new(-33.5, 151.25).unwrap();
        let links = navigation_links(car, "  ", None);

        assert_eq!(links.apple_maps, "maps://app?daddr=-33.5,151.25");
        assert_eq!(links.google_maps, "https://maps.google.com/maps?daddr=-33.5,151.25");
        assert_eq!(links.geo, "geo:-33.5,151.25?q=-33.5,151.25(Destination)");
    }

    #[test]
    fn test_label_encoding() {
        assert_eq!(encode_uri_component("Level 2 & B"), "Level%202%20%26%20B");
        assert_eq!(encode_uri_component("it's (here)!"), "it's%20(here)!");
        assert_eq!(encode_uri_component("Ул."), "%D0%A3%D0%BB.");
    }
}
