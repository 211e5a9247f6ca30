use serde::{Deserialize, Serialize};
use validator::Validate;

/// A fixed physical observation site, identified by a stable source code
/// (WMO/ICAO style).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Station {
    pub id: String,

    pub name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub elevation: f64,

    pub call_sign: String,
}

impl Station {
    pub fn new(
        id: String,
        name: String,
        latitude: f64,
        longitude: f64,
        elevation: f64,
        call_sign: String,
    ) -> Self {
        Self {
            id,
            name,
            latitude,
            longitude,
            elevation,
            call_sign,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_validation() {
        let station = Station::new(
            "03772099999".to_string(),
            "HEATHROW".to_string(),
            51.478,
            -0.461,
            25.3,
            "EGLL".to_string(),
        );

        assert!(station.validate().is_ok());
    }

    #[test]
    fn test_invalid_coordinates() {
        let station = Station::new(
            "03772099999".to_string(),
            "NOWHERE".to_string(),
            91.0, // Invalid latitude
            -0.461,
            0.0,
            String::new(),
        );

        assert!(station.validate().is_err());
    }

    #[test]
    fn test_default_is_zeroed() {
        let station = Station::default();
        assert!(station.id.is_empty());
        assert_eq!(station.elevation, 0.0);
        assert_eq!(station.latitude, 0.0);
    }
}
