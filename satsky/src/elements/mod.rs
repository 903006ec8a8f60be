//! Two-line element set parsing.
//!
//! Turns the conventional 69-column two-line orbital element format into a
//! validated [`ElementRecord`], and formats records back into canonical lines.
//!
//! # Line Layout
//!
//! ```text
//! 1 25544U 98067A   25185.47485775  .00005492  00000+0  10282-3 0  9993
//! 2 25544  51.6344 221.3901 0002450 331.8120  28.2736 15.50368910517843
//! ```
//!
//! Every field lives at a fixed column range. Lines are checked against a
//! fixed grammar before anything is extracted, so a malformed line never
//! yields a half-populated record.
//!
//! # Checksums
//!
//! The last column of each line is a modulo-10 check digit. Published
//! catalogs are known to carry wrong check digits, so a mismatch produces a
//! [`ChecksumWarning`] instead of an error.
//!
//! # Example
//!
//! ```
//! use satsky::elements::parse_element_set;
//!
//! let parsed = parse_element_set(
//!     "iss",
//!     "1 25544U 98067A   25185.47485775  .00005492  00000+0  10282-3 0  9993",
//!     "2 25544  51.6344 221.3901 0002450 331.8120  28.2736 15.50368910517843",
//! )
//! .unwrap();
//!
//! assert_eq!(parsed.record.catalog_id, "25544");
//! assert!(parsed.warnings.is_empty());
//! ```

mod checksum;
mod error;
mod parser;
mod record;

pub use checksum::{compute_checksum, ChecksumWarning};
pub use error::ElementError;
pub use parser::{parse_element_set, ParsedElementSet, LINE_LENGTH};
pub use record::{decode_catalog_number, Classification, ElementRecord, OrbitRegime};
