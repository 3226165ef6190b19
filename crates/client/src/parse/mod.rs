//! Parsers for hotfix data formats.

pub mod csv;
pub mod version;

pub use csv::parse_csv;
pub use version::compare_versions;
