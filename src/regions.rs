//! Coordinate to Met Office warnings-region mapping.
//!
//! The regional warnings feed is addressed by short region codes. Coordinates
//! are resolved against an ordered list of bounding boxes; boxes overlap near
//! region borders, so the scan order is part of the mapping and must not be
//! reshuffled. Anything that misses every box gets the nationwide feed.

/// Rough UK check used to decide whether the region-specific sources apply
/// to a location at all.
pub fn is_uk(latitude: f64, longitude: f64) -> bool {
    (49.5..=61.0).contains(&latitude) && (-8.5..=2.0).contains(&longitude)
}

/// Nationwide fallback feed code.
pub const NATIONWIDE: &str = "uk";

struct RegionBox {
    code: &'static str,
    lat: (f64, f64),
    lon: (f64, f64),
}

impl RegionBox {
    fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.lat.0..=self.lat.1).contains(&latitude)
            && (self.lon.0..=self.lon.1).contains(&longitude)
    }
}

/// First match wins.
const REGIONS: &[RegionBox] = &[
    // Orkney & Shetland
    RegionBox { code: "os", lat: (58.7, 61.0), lon: (-3.5, 0.0) },
    // Highlands & Eilean Siar
    RegionBox { code: "he", lat: (56.7, 58.7), lon: (-7.5, -3.0) },
    // Grampian
    RegionBox { code: "gr", lat: (56.8, 58.0), lon: (-3.0, -1.7) },
    // Central, Tayside & Fife
    RegionBox { code: "ce", lat: (56.0, 56.8), lon: (-4.5, -2.5) },
    // Strathclyde
    RegionBox { code: "st", lat: (55.0, 56.7), lon: (-6.0, -4.0) },
    // Dumfries, Galloway, Lothian & Borders
    RegionBox { code: "dg", lat: (54.6, 56.0), lon: (-5.2, -2.0) },
    // Northern Ireland
    RegionBox { code: "ni", lat: (54.0, 55.3), lon: (-8.2, -5.3) },
    // North East England
    RegionBox { code: "ne", lat: (54.5, 55.8), lon: (-2.6, -1.0) },
    // Yorkshire & Humber
    RegionBox { code: "yh", lat: (53.3, 54.6), lon: (-2.2, 0.2) },
    // North West England
    RegionBox { code: "nw", lat: (53.3, 55.2), lon: (-3.7, -2.0) },
    // Wales
    RegionBox { code: "wl", lat: (51.3, 53.5), lon: (-5.4, -2.65) },
    // West Midlands
    RegionBox { code: "wm", lat: (52.0, 53.3), lon: (-3.0, -1.2) },
    // East Midlands
    RegionBox { code: "em", lat: (52.0, 53.6), lon: (-1.9, 0.4) },
    // East of England
    RegionBox { code: "ee", lat: (51.7, 53.1), lon: (0.0, 1.8) },
    // South West England
    RegionBox { code: "sw", lat: (49.9, 51.7), lon: (-6.5, -2.2) },
    // London & South East England
    RegionBox { code: "se", lat: (50.7, 52.2), lon: (-1.5, 1.5) },
];

/// Region feed code for a coordinate, [`NATIONWIDE`] when no box matches.
pub fn region_code(latitude: f64, longitude: f64) -> &'static str {
    REGIONS
        .iter()
        .find(|region| region.contains(latitude, longitude))
        .map(|region| region.code)
        .unwrap_or(NATIONWIDE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn london_is_south_east() {
        assert_eq!(region_code(51.5074, -0.1278), "se");
    }

    #[test]
    fn highlands() {
        assert_eq!(region_code(57.5, -4.0), "he");
    }

    #[test]
    fn outside_every_box_is_nationwide() {
        // Paris
        assert_eq!(region_code(48.8566, 2.3522), NATIONWIDE);
        // mid-Atlantic
        assert_eq!(region_code(54.0, -30.0), NATIONWIDE);
    }

    #[test]
    fn overlap_resolves_to_the_earlier_box() {
        // 55.0, -2.3 sits in both "dg" and "ne"; "dg" is listed first.
        assert_eq!(region_code(55.0, -2.3), "dg");
    }

    #[test]
    fn some_city_spot_checks() {
        assert_eq!(region_code(55.8642, -4.2518), "st"); // Glasgow
        assert_eq!(region_code(53.4808, -2.2426), "nw"); // Manchester
        assert_eq!(region_code(51.4545, -2.5879), "sw"); // Bristol
        assert_eq!(region_code(52.6309, 1.2974), "ee"); // Norwich
        assert_eq!(region_code(54.5973, -5.9301), "ni"); // Belfast
    }

    #[test]
    fn uk_bounds() {
        assert!(is_uk(51.5074, -0.1278));
        assert!(is_uk(57.5, -4.0));
        assert!(!is_uk(48.8566, 2.3522));
        assert!(!is_uk(40.7128, -74.0060));
    }
}
