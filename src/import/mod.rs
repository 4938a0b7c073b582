//! Seeding the vehicle collection from CSV, JSON-array or NDJSON files.

mod csv;
mod detect;
mod json;
mod options;
mod pipeline;

pub use detect::detect_format;
pub use options::{SeedFormat, SeedOptions, SeedReport};
pub use pipeline::{seed_file, seed_from_reader};
