//! Fixed-column grammar validation and field extraction.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use super::checksum::{self, ChecksumWarning};
use super::error::ElementError;
use super::record::{decode_catalog_number, Classification, ElementRecord};

/// Length of both element set lines, check digit included.
pub const LINE_LENGTH: usize = 69;

// Alpha-5 catalog ids (2020 onwards) replace the leading digit with a letter,
// skipping I and O.
const LINE1_PATTERN: &str = concat!(
    "^1 ",
    "[0-9A-HJ-NP-Z][0-9]{4}",                           // 1.2 catalog id
    "[UCS] ",                                           // 1.3 classification
    "(?:[0-9]{2}(?:[0-9]{3}| [0-9]{2}|  [0-9])[A-Z ]{3}| {8}) ", // 1.4-1.6 designator, may be blank
    "[0-9]{2}(?:[0-9]{3}| [0-9]{2}|  [0-9])\\.[0-9]{8} ", // 1.7-1.8 epoch year and day
    "[-+ ]\\.[0-9]{8} ",                                // 1.9 first derivative of mean motion
    "[-+ ][0-9]{5}[-+][0-9] ",                          // 1.10 second derivative, point assumed
    "[-+ ][0-9]{5}[-+][0-9] ",                          // 1.11 B* drag term, point assumed
    "[0 ] ",                                            // 1.12 ephemeris type
    "[0-9 ]{3}[0-9]",                                   // 1.13 element set number
    "[0-9]$",                                           // 1.14 check digit
);

const LINE2_PATTERN: &str = concat!(
    "^2 ",
    "[0-9A-HJ-NP-Z][0-9]{4} ",                       // 2.2 catalog id
    "(?:[0-9]{3}| [0-9]{2}|  [0-9])\\.[0-9]{4} ",   // 2.3 inclination
    "(?:[0-9]{3}| [0-9]{2}|  [0-9])\\.[0-9]{4} ",   // 2.4 right ascension of ascending node
    "[0-9]{7} ",                                     // 2.5 eccentricity, point assumed
    "(?:[0-9]{3}| [0-9]{2}|  [0-9])\\.[0-9]{4} ",   // 2.6 argument of perigee
    "(?:[0-9]{3}| [0-9]{2}|  [0-9])\\.[0-9]{4} ",   // 2.7 mean anomaly
    "(?:[0-9]{2}| [0-9])\\.[0-9]{8}",               // 2.8 mean motion
    "[0-9 ]{4}[0-9]",                                // 2.9 revolution number
    "[0-9]$",                                        // 2.10 check digit
);

fn line1_grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| Regex::new(LINE1_PATTERN).expect("line 1 grammar is a valid regex"))
}

fn line2_grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| Regex::new(LINE2_PATTERN).expect("line 2 grammar is a valid regex"))
}

/// A parsed record together with any non-fatal check digit warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedElementSet {
    pub record: ElementRecord,
    pub warnings: Vec<ChecksumWarning>,
}

/// Parses one two-line element set.
///
/// `name` identifies the record in errors and warnings (typically the
/// source file name). Surrounding whitespace and line terminators are
/// ignored.
///
/// # Errors
///
/// Returns [`ElementError`] if either line fails its grammar, if the catalog
/// ids of the two lines differ, or if a field cannot be converted.
/// Check digit mismatches are logged and returned as warnings instead.
pub fn parse_element_set(
    name: &str,
    line1: &str,
    line2: &str,
) -> Result<ParsedElementSet, ElementError> {
    let line1 = line1.trim();
    let line2 = line2.trim();

    if !line1_grammar().is_match(line1) {
        return Err(ElementError::Grammar {
            name: name.to_string(),
            line: 1,
        });
    }
    if !line2_grammar().is_match(line2) {
        return Err(ElementError::Grammar {
            name: name.to_string(),
            line: 2,
        });
    }

    if line1[2..7] != line2[2..7] {
        return Err(ElementError::CatalogIdMismatch {
            name: name.to_string(),
            line1: line1[2..7].to_string(),
            line2: line2[2..7].to_string(),
        });
    }

    let warnings: Vec<ChecksumWarning> = [(1, line1), (2, line2)]
        .into_iter()
        .filter_map(|(number, line)| checksum::verify(name, number, line))
        .collect();
    for warning in &warnings {
        warn!(
            record = %warning.name,
            line = warning.line,
            found = warning.found,
            expected = warning.expected,
            "Element set check digit mismatch"
        );
    }

    let record = extract(name, line1, line2)?;
    Ok(ParsedElementSet { record, warnings })
}

/// Pulls every field out of two grammar-validated lines.
fn extract(name: &str, line1: &str, line2: &str) -> Result<ElementRecord, ElementError> {
    let field_error = |field: &'static str, value: &str| ElementError::InvalidField {
        name: name.to_string(),
        field,
        value: value.to_string(),
    };

    let catalog_id = &line1[2..7];
    let catalog_number =
        decode_catalog_number(catalog_id).ok_or_else(|| field_error("catalog_id", catalog_id))?;
    let classification = Classification::from_code(line1.as_bytes()[7] as char)
        .ok_or_else(|| field_error("classification", &line1[7..8]))?;

    let two_digit_year: i32 = parse_field(name, "epoch_year", &line1[18..20])?;
    let epoch_year = if two_digit_year < 57 {
        2000 + two_digit_year
    } else {
        1900 + two_digit_year
    };

    Ok(ElementRecord {
        catalog_id: catalog_id.to_string(),
        catalog_number,
        classification,
        international_designator: line1[9..17].trim_end().to_string(),
        epoch_year,
        epoch_day: parse_field(name, "epoch_day", &line1[20..32])?,
        mean_motion_dot: parse_field(name, "mean_motion_dot", &line1[33..43])?,
        mean_motion_ddot: parse_assumed_point(name, "mean_motion_ddot", &line1[44..52])?,
        bstar: parse_assumed_point(name, "bstar", &line1[53..61])?,
        ephemeris_type: 0,
        element_number: parse_field(name, "element_number", &line1[64..68])?,
        inclination_deg: parse_field(name, "inclination", &line2[8..16])?,
        right_ascension_deg: parse_field(name, "right_ascension", &line2[17..25])?,
        eccentricity: parse_field(name, "eccentricity", &format!("0.{}", &line2[26..33]))?,
        argument_of_perigee_deg: parse_field(name, "argument_of_perigee", &line2[34..42])?,
        mean_anomaly_deg: parse_field(name, "mean_anomaly", &line2[43..51])?,
        mean_motion: parse_field(name, "mean_motion", &line2[52..63])?,
        revolution_number: parse_field(name, "revolution_number", &line2[63..68])?,
    })
}

fn parse_field<T: FromStr>(name: &str, field: &'static str, raw: &str) -> Result<T, ElementError> {
    raw.trim().parse().map_err(|_| ElementError::InvalidField {
        name: name.to_string(),
        field,
        value: raw.to_string(),
    })
}

/// Parses `[-+ ]ddddd[-+]d` as `±0.ddddd × 10^±d`.
fn parse_assumed_point(name: &str, field: &'static str, raw: &str) -> Result<f64, ElementError> {
    let sign = if raw.starts_with('-') { "-" } else { "" };
    let text = format!("{}0.{}e{}", sign, &raw[1..6], &raw[6..8]);
    parse_field(name, field, &text)
}
