pub mod file;
pub(crate) mod json;
pub mod serialize;

pub use json::JsonError;
pub use serialize::{deserialize, serialize, serialize_with, DeserializeError, KeyStyle, SerializeError};
