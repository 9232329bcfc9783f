mod json;

pub use json::{parse_json_document, read_json_document, ContentReadError};
