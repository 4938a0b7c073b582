mod core;
mod json;
mod types;

pub use self::core::{Document, ID_KEY};
pub use json::{bson_to_json, json_to_bson};
pub use types::Metadata;
