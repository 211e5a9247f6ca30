use serde::{Deserialize, Serialize};

/// One timestamped weather observation attributable to a station.
///
/// The row id is assigned by the store at persistence time, so it is not
/// part of the in-memory record. `date` and `wind` stay in their verbatim
/// source encoding: the ISD format bundles wind direction/speed/quality
/// into a single token, and timestamps are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub station: String,
    pub date: String,
    pub report_type: String,
    pub quality_control_flag: String,
    pub wind: String,
    pub cloud_ceiling: f64,
    pub visibility_distance: f64,
    pub temperature: f64,
    pub dew_points: f64,
    pub sea_level_pressure: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zeroed() {
        let measurement = Measurement::default();
        assert!(measurement.station.is_empty());
        assert_eq!(measurement.temperature, 0.0);
        assert_eq!(measurement.sea_level_pressure, 0.0);
    }
}
