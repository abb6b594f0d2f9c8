//! Free-text location parsing.
//!
//! A location such as `"Bangalore, Pallikaranai"` or `"Velachery Chennai"`
//! is split into a city and an area. The split is a heuristic: tokens are
//! checked against the city table and the first known city wins. When
//! neither token is a known city the input order is kept, so an unmapped
//! city written second is read as the area.

use serde::Serialize;

use crate::tables::{area_code, category_code, city_code, is_known_city, UNKNOWN, UNKNOWN_CODE};
use crate::{Code, Locality};

/// A location split into city and area names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub city: String,
    pub area: String,
}

impl Location {
    /// The location used when no tokens are present.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            city: UNKNOWN.to_string(),
            area: UNKNOWN.to_string(),
        }
    }

    /// The city code; the [`UNKNOWN`] city resolves to [`UNKNOWN_CODE`]
    /// without counting as a fallback.
    #[must_use]
    pub fn city_code(&self) -> Code {
        if self.city == UNKNOWN {
            return UNKNOWN_CODE;
        }
        city_code(&self.city)
    }

    #[must_use]
    pub fn area_code(&self) -> Code {
        if self.area == UNKNOWN {
            return UNKNOWN_CODE;
        }
        area_code(&self.area)
    }

    /// Resolves the category, city and area codes for this location.
    #[must_use]
    pub fn locality(&self, category: &str) -> Locality {
        Locality::new(category_code(category), self.city_code(), self.area_code())
    }
}

/// Splits a free-text location into city and area.
///
/// Splits on commas when any are present, otherwise on whitespace runs.
/// Tokens past the second are ignored.
#[must_use]
pub fn parse_location(raw: &str) -> Location {
    let tokens: Vec<&str> = if raw.contains(',') {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    } else {
        raw.split_whitespace().collect()
    };

    match tokens.as_slice() {
        [] => Location::unknown(),
        [only] => Location {
            city: (*only).to_string(),
            area: (*only).to_string(),
        },
        [first, second, ..] => {
            let (city, area) = if is_known_city(first) || !is_known_city(second) {
                (first, second)
            } else {
                (second, first)
            };
            Location {
                city: (*city).to_string(),
                area: (*area).to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Bangalore, Pallikaranai", "Bangalore", "Pallikaranai")]
    #[case("Pallikaranai, Bangalore", "Bangalore", "Pallikaranai")]
    #[case("Chennai Velachery", "Chennai", "Velachery")]
    #[case("Velachery   Chennai", "Chennai", "Velachery")]
    #[case("Trichy, Srirangam", "Trichy", "Srirangam")]
    #[case("Srirangam, Trichy", "Srirangam", "Trichy")]
    #[case("Chennai, Bangalore", "Chennai", "Bangalore")]
    #[case("New Delhi, Connaught Place", "New Delhi", "Connaught Place")]
    #[case("Chennai, Anna Nagar, Block 4", "Chennai", "Anna Nagar")]
    #[case("Mumbai", "Mumbai", "Mumbai")]
    #[case(" , Kochi ,", "Kochi", "Kochi")]
    fn test_parse_location(#[case] raw: &str, #[case] city: &str, #[case] area: &str) {
        let location = parse_location(raw);
        assert_eq!(location.city, city);
        assert_eq!(location.area, area);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case(",,")]
    fn test_parse_location_empty(#[case] raw: &str) {
        assert_eq!(parse_location(raw), Location::unknown());
    }

    #[test]
    fn test_unknown_location_codes() {
        let locality = parse_location("").locality("Coach");
        assert_eq!(locality.to_string(), "COUNUN");
    }

    #[test]
    fn test_locality_codes() {
        let locality = parse_location("Bangalore, Pallikaranai").locality("Coach");
        assert_eq!(locality.to_string(), "COBAPA");
    }
}
