//! Typed access into parsed `json` values, with errors that carry the path to the failing key.

use glam::DVec3;
use json::JsonValue;

pub type JsonResult<T> = Result<T, JsonError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JsonError {
	#[error("Key {0:?} does not exist")]
	KeyDoesNotExist(String),
	#[error("Value at {0:?} is not an object")]
	ValueIsNotObject(String),
	#[error("Value at {0:?} is not a string")]
	ValueIsNotString(String),
	#[error("Value at {0:?} is an empty string")]
	EmptyString(String),
	#[error("Error while parsing vec3 at {key:?}\n  - {msg}")]
	ParseVec3Error { key: String, msg: String },
	#[error("Error in object at {key:?}\n  - {inner}")]
	ErrorInObject { key: String, inner: Box<JsonError> },
}

impl JsonError {
	pub fn nested(self, key: &str) -> Self {
		Self::ErrorInObject {
			key: key.to_owned(),
			inner: Box::new(self),
		}
	}

	/// The innermost error, with the nesting path stripped.
	pub fn root_cause(&self) -> &JsonError {
		match self {
			Self::ErrorInObject { inner, .. } => inner.root_cause(),
			_ => self,
		}
	}
}

/// Correctly rounded, unlike `f64::from(Number)` which can be an ulp off.
fn number_to_f64(num: json::number::Number) -> f64 {
	if num.is_nan() {
		return f64::NAN;
	}
	let (positive, mantissa, exponent) = num.as_parts();
	let sign = if positive { "" } else { "-" };
	format!("{sign}{mantissa}e{exponent}").parse().unwrap_or(f64::NAN)
}

pub fn as_object<'a>(msg: &str, val: &'a JsonValue) -> JsonResult<JsonObject<'a>> {
	match val {
		JsonValue::Object(obj) => Ok(JsonObject(obj)),
		_ => Err(JsonError::ValueIsNotObject(msg.to_owned())),
	}
}

#[derive(Clone, Copy)]
pub struct JsonObject<'a>(pub &'a json::object::Object);

impl<'a> JsonObject<'a> {
	pub fn contains(&self, key: &str) -> bool {
		self.0.get(key).is_some()
	}

	pub fn get_value(&self, key: &str) -> Option<&'a JsonValue> {
		self.0.get(key)
	}

	fn get(&self, key: &str) -> JsonResult<&'a JsonValue> {
		match self.0.get(key) {
			Some(value) => Ok(value),
			None => Err(JsonError::KeyDoesNotExist(key.to_owned())),
		}
	}

	pub fn get_str(&self, key: &str) -> JsonResult<&'a str> {
		match self.get(key)?.as_str() {
			Some(val) => Ok(val),
			None => Err(JsonError::ValueIsNotString(key.to_owned())),
		}
	}

	pub fn get_nonempty_str(&self, key: &str) -> JsonResult<&'a str> {
		match self.get_str(key)? {
			"" => Err(JsonError::EmptyString(key.to_owned())),
			val => Ok(val),
		}
	}

	/// A missing key reads as `None`. A present key, `null` included, must hold an object.
	pub fn get_optional_object(&self, key: &str) -> JsonResult<Option<JsonObject<'a>>> {
		match self.0.get(key) {
			None => Ok(None),
			Some(val) => as_object(key, val).map(Some),
		}
	}

	pub fn get_dvec3(&self, key: &str) -> JsonResult<DVec3> {
		let list = match self.get(key)? {
			JsonValue::Array(arr) => arr,
			_ => {
				return Err(JsonError::ParseVec3Error {
					key: key.to_owned(),
					msg: "expected a list".to_owned(),
				})
			}
		};
		if list.len() != 3 {
			return Err(JsonError::ParseVec3Error {
				key: key.to_owned(),
				msg: format!("expected list of length 3, but has length {}", list.len()),
			});
		}

		let mut components = [0.0_f64; 3];
		for (component, val) in components.iter_mut().zip(list) {
			*component = match val.as_number() {
				Some(num) => number_to_f64(num),
				None => {
					return Err(JsonError::ParseVec3Error {
						key: key.to_owned(),
						msg: "expected float, but did not get a number".to_owned(),
					})
				}
			};
			if !component.is_finite() {
				return Err(JsonError::ParseVec3Error {
					key: key.to_owned(),
					msg: "expected a finite float".to_owned(),
				});
			}
		}

		Ok(DVec3::from_array(components))
	}

	pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a JsonValue)> {
		self.0.iter()
	}
}
