use crate::models::{Measurement, Station};
use std::fmt;

/// Positional columns of the ISD Global Hourly CSV layout. The mapping is a
/// contract on the input format, not negotiated at runtime.
const COL_STATION_ID: usize = 0;
const COL_DATE: usize = 1;
const COL_LATITUDE: usize = 3;
const COL_LONGITUDE: usize = 4;
const COL_ELEVATION: usize = 5;
const COL_NAME: usize = 6;
const COL_REPORT_TYPE: usize = 7;
const COL_CALL_SIGN: usize = 8;
const COL_QUALITY_FLAG: usize = 9;
const COL_WIND: usize = 10;
const COL_CLOUD_CEILING: usize = 11;
const COL_VISIBILITY: usize = 12;
const COL_TEMPERATURE: usize = 13;
const COL_DEW_POINTS: usize = 14;
const COL_SEA_LEVEL_PRESSURE: usize = 15;

/// A single field that could not be populated from its token.
///
/// `token` is `None` when the line was too short to contain the field at
/// all, `Some` when a token was present but failed numeric parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub field: &'static str,
    pub token: Option<String>,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token {
            Some(token) => write!(f, "field '{}': unparseable token '{}'", self.field, token),
            None => write!(f, "field '{}': missing from line", self.field),
        }
    }
}

/// The outcome of parsing one line: both records are always present, each
/// possibly partial, with one diagnostic per field that kept its default.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub measurement: Measurement,
    pub station: Station,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParsedRecord {
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Best-effort parser for one observation line.
///
/// Parsing never fails: a malformed numeric token leaves its field at the
/// zero default and records a diagnostic, and every remaining field of the
/// same line is still parsed. Blank lines and header lines are the
/// orchestrator's problem, not the parser's.
pub struct RecordParser;

impl RecordParser {
    pub fn new() -> Self {
        Self
    }

    /// Split a line on commas, quote-aware: `"` toggles a literal region in
    /// which commas do not separate, and quote characters are stripped from
    /// token content (the format does not escape quotes).
    pub fn tokenize(&self, line: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut token = String::new();
        let mut in_quotes = false;

        for c in line.chars() {
            match c {
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => {
                    tokens.push(std::mem::take(&mut token));
                }
                _ => token.push(c),
            }
        }
        tokens.push(token);

        tokens
    }

    pub fn parse_line(&self, line: &str) -> ParsedRecord {
        let tokens = self.tokenize(line);
        let mut diagnostics = Vec::new();

        let measurement = Measurement {
            station: text_field(&tokens, COL_STATION_ID, "station", &mut diagnostics),
            date: text_field(&tokens, COL_DATE, "date", &mut diagnostics),
            report_type: text_field(&tokens, COL_REPORT_TYPE, "reportType", &mut diagnostics),
            quality_control_flag: text_field(
                &tokens,
                COL_QUALITY_FLAG,
                "qualityControlFlag",
                &mut diagnostics,
            ),
            wind: text_field(&tokens, COL_WIND, "wind", &mut diagnostics),
            cloud_ceiling: numeric_field(&tokens, COL_CLOUD_CEILING, "cloudCeiling", &mut diagnostics),
            visibility_distance: numeric_field(
                &tokens,
                COL_VISIBILITY,
                "visibilityDistance",
                &mut diagnostics,
            ),
            temperature: numeric_field(&tokens, COL_TEMPERATURE, "temperature", &mut diagnostics),
            dew_points: numeric_field(&tokens, COL_DEW_POINTS, "dewPoints", &mut diagnostics),
            sea_level_pressure: numeric_field(
                &tokens,
                COL_SEA_LEVEL_PRESSURE,
                "seaLevelPressure",
                &mut diagnostics,
            ),
        };

        let station = Station {
            id: measurement.station.clone(),
            name: text_field(&tokens, COL_NAME, "name", &mut diagnostics),
            latitude: numeric_field(&tokens, COL_LATITUDE, "latitude", &mut diagnostics),
            longitude: numeric_field(&tokens, COL_LONGITUDE, "longitude", &mut diagnostics),
            elevation: numeric_field(&tokens, COL_ELEVATION, "elevation", &mut diagnostics),
            call_sign: text_field(&tokens, COL_CALL_SIGN, "callSign", &mut diagnostics),
        };

        ParsedRecord {
            measurement,
            station,
            diagnostics,
        }
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

fn text_field(
    tokens: &[String],
    index: usize,
    field: &'static str,
    diagnostics: &mut Vec<ParseDiagnostic>,
) -> String {
    match tokens.get(index) {
        Some(token) => token.clone(),
        None => {
            diagnostics.push(ParseDiagnostic { field, token: None });
            String::new()
        }
    }
}

fn numeric_field(
    tokens: &[String],
    index: usize,
    field: &'static str,
    diagnostics: &mut Vec<ParseDiagnostic>,
) -> f64 {
    match tokens.get(index) {
        Some(token) => match token.trim().parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                diagnostics.push(ParseDiagnostic {
                    field,
                    token: Some(token.clone()),
                });
                0.0
            }
        },
        None => {
            diagnostics.push(ParseDiagnostic { field, token: None });
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VALID_LINE: &str = "03772099999,2024-01-15T12:00:00,4,51.478,-0.461,25.3,\"HEATHROW, UK\",FM-15,EGLL,V020,\"270,0050,N,1\",22000,16093,10.6,7.2,1013.2";

    #[test]
    fn test_tokenize_quoted_comma() {
        let parser = RecordParser::new();
        let tokens = parser.tokenize("\"A,B\",C");

        assert_eq!(tokens, vec!["A,B".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_tokenize_strips_quotes() {
        let parser = RecordParser::new();
        let tokens = parser.tokenize("plain,\"quoted\",\"270,0050,N,1\"");

        assert_eq!(tokens, vec!["plain", "quoted", "270,0050,N,1"]);
    }

    #[test]
    fn test_parse_valid_line() {
        let parser = RecordParser::new();
        let parsed = parser.parse_line(VALID_LINE);

        assert!(!parsed.is_degraded());

        assert_eq!(parsed.measurement.station, "03772099999");
        assert_eq!(parsed.measurement.date, "2024-01-15T12:00:00");
        assert_eq!(parsed.measurement.report_type, "FM-15");
        assert_eq!(parsed.measurement.quality_control_flag, "V020");
        assert_eq!(parsed.measurement.wind, "270,0050,N,1");
        assert_eq!(parsed.measurement.cloud_ceiling, 22000.0);
        assert_eq!(parsed.measurement.visibility_distance, 16093.0);
        assert_eq!(parsed.measurement.temperature, 10.6);
        assert_eq!(parsed.measurement.dew_points, 7.2);
        assert_eq!(parsed.measurement.sea_level_pressure, 1013.2);

        assert_eq!(parsed.station.id, "03772099999");
        assert_eq!(parsed.station.name, "HEATHROW, UK");
        assert_eq!(parsed.station.latitude, 51.478);
        assert_eq!(parsed.station.longitude, -0.461);
        assert_eq!(parsed.station.elevation, 25.3);
        assert_eq!(parsed.station.call_sign, "EGLL");
    }

    #[test]
    fn test_parse_is_pure() {
        let parser = RecordParser::new();
        let first = parser.parse_line(VALID_LINE);
        let second = parser.parse_line(VALID_LINE);

        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_numeric_degrades_one_field() {
        let parser = RecordParser::new();
        let line = VALID_LINE.replace("22000", "CIG999");
        let parsed = parser.parse_line(&line);

        assert_eq!(parsed.measurement.cloud_ceiling, 0.0);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].field, "cloudCeiling");
        assert_eq!(parsed.diagnostics[0].token.as_deref(), Some("CIG999"));

        // Fields after the failure point are still populated.
        assert_eq!(parsed.measurement.visibility_distance, 16093.0);
        assert_eq!(parsed.measurement.temperature, 10.6);
        assert_eq!(parsed.measurement.sea_level_pressure, 1013.2);
    }

    #[test]
    fn test_short_line_yields_partial_records() {
        let parser = RecordParser::new();
        let parsed = parser.parse_line("72503014732,2024-01-15T12:00:00");

        assert_eq!(parsed.measurement.station, "72503014732");
        assert_eq!(parsed.measurement.date, "2024-01-15T12:00:00");
        assert_eq!(parsed.measurement.temperature, 0.0);
        assert_eq!(parsed.station.id, "72503014732");
        assert!(parsed.station.name.is_empty());
        assert!(parsed.is_degraded());
        assert!(parsed.diagnostics.iter().all(|d| d.token.is_none()));
    }

    #[test]
    fn test_numeric_token_with_whitespace() {
        let parser = RecordParser::new();
        let line = VALID_LINE.replace("22000", " 22000 ");
        let parsed = parser.parse_line(&line);

        assert_eq!(parsed.measurement.cloud_ceiling, 22000.0);
        assert!(!parsed.is_degraded());
    }
}
