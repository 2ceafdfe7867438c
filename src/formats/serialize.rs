use glam::DVec3;
use json::JsonValue;
use tracing::warn;

use crate::node::HierarchyNode;

use super::json::{as_object, JsonError, JsonObject};

/// Field names used for a node object in a hierarchy document.
struct Keys {
	name: &'static str,
	position: &'static str,
	rotation: &'static str,
	children: &'static str,
}

const PLAIN_KEYS: Keys = Keys {
	name: "name",
	position: "position",
	rotation: "rotation",
	children: "children",
};

/// Numbered keys written by older tools, so a sorted dump keeps the fields in order.
const LEGACY_KEYS: Keys = Keys {
	name: "1_name",
	position: "2_pos",
	rotation: "2_rot",
	children: "3_children",
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyStyle {
	#[default]
	Plain,
	Legacy,
}

impl KeyStyle {
	fn keys(self) -> &'static Keys {
		match self {
			KeyStyle::Plain => &PLAIN_KEYS,
			KeyStyle::Legacy => &LEGACY_KEYS,
		}
	}
}

pub type SerializeResult<T> = Result<T, SerializeError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SerializeError {
	#[error("Node {node:?} has a non-finite {field}")]
	NonFiniteValue { node: String, field: &'static str },
	#[error("Node {parent:?} has more than one child named {name:?}")]
	DuplicateSiblingName { parent: String, name: String },
	#[error("Found a node with an empty name under {parent:?}")]
	EmptyName { parent: String },
}

pub type DeserializeResult<T> = Result<T, DeserializeError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeserializeError {
	#[error("Malformed hierarchy document\n  - {0}")]
	MalformedDocument(#[from] JsonError),
	#[error("Node {parent:?} has more than one child named {name:?}")]
	DuplicateSiblingName { parent: String, name: String },
}

impl DeserializeError {
	fn nested(self, key: &str) -> Self {
		match self {
			DeserializeError::MalformedDocument(err) => DeserializeError::MalformedDocument(err.nested(key)),
			_ => self,
		}
	}
}

fn vals<T>(key: &str, res: DeserializeResult<T>) -> DeserializeResult<T> {
	res.map_err(|e| e.nested(key))
}

// serialization

/// Serializes a hierarchy with the plain field names.
pub fn serialize(node: &HierarchyNode) -> SerializeResult<JsonValue> {
	serialize_with(node, KeyStyle::Plain)
}

pub fn serialize_with(node: &HierarchyNode, style: KeyStyle) -> SerializeResult<JsonValue> {
	if node.name.is_empty() {
		return Err(SerializeError::EmptyName {
			parent: "(root)".to_owned(),
		});
	}
	serialize_node(node, style.keys())
}

fn serialize_dvec3(node: &HierarchyNode, field: &'static str, vec: DVec3) -> SerializeResult<JsonValue> {
	if !vec.is_finite() {
		return Err(SerializeError::NonFiniteValue {
			node: node.name.clone(),
			field,
		});
	}
	Ok(JsonValue::Array(vec.to_array().into_iter().map(JsonValue::from).collect()))
}

fn serialize_node(node: &HierarchyNode, keys: &Keys) -> SerializeResult<JsonValue> {
	let mut obj = json::object::Object::with_capacity(4);
	obj.insert(keys.name, JsonValue::from(node.name.as_str()));
	obj.insert(keys.position, serialize_dvec3(node, "position", node.position)?);
	obj.insert(keys.rotation, serialize_dvec3(node, "rotation", node.rotation)?);

	if !node.children.is_empty() {
		let mut children = json::object::Object::with_capacity(node.children.len());
		for child in &node.children {
			if child.name.is_empty() {
				return Err(SerializeError::EmptyName {
					parent: node.name.clone(),
				});
			}
			// children are keyed by name, a second sibling would silently replace the first
			if children.get(&child.name).is_some() {
				return Err(SerializeError::DuplicateSiblingName {
					parent: node.name.clone(),
					name: child.name.clone(),
				});
			}
			children.insert(&child.name, serialize_node(child, keys)?);
		}
		obj.insert(keys.children, JsonValue::Object(children));
	}

	Ok(JsonValue::Object(obj))
}

// deserialization

/// Reads a hierarchy document, accepting plain or legacy field names on every node.
pub fn deserialize(payload: &JsonValue) -> DeserializeResult<HierarchyNode> {
	let obj = as_object("(root)", payload)?;
	deserialize_node(obj)
}

fn detect_keys(obj: &JsonObject) -> &'static Keys {
	if !obj.contains(PLAIN_KEYS.name) && obj.contains(LEGACY_KEYS.name) {
		&LEGACY_KEYS
	} else {
		&PLAIN_KEYS
	}
}

fn deserialize_node(obj: JsonObject) -> DeserializeResult<HierarchyNode> {
	let keys = detect_keys(&obj);

	let name = obj.get_nonempty_str(keys.name)?.to_owned();
	let position = obj.get_dvec3(keys.position)?;
	let rotation = obj.get_dvec3(keys.rotation)?;
	let mut node = HierarchyNode::new(name, position, rotation);

	let Some(children) = obj.get_optional_object(keys.children)? else {
		return Ok(node);
	};

	for (key, val) in children.iter() {
		let child = as_object(key, val).map_err(Into::into).and_then(deserialize_node);
		let child = vals(keys.children, vals(key, child))?;

		if child.name != key {
			warn!(
				"Child keyed {:?} under {:?} is named {:?}, using the name",
				key, node.name, child.name
			);
		}
		if node.children.iter().any(|sibling| sibling.name == child.name) {
			return Err(DeserializeError::DuplicateSiblingName {
				parent: node.name,
				name: child.name,
			});
		}
		node.children.push(child);
	}

	Ok(node)
}
