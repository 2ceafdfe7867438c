use std::io::{self, Read, Write};
use std::str::Utf8Error;

use crate::node::HierarchyNode;

use super::serialize::{deserialize, serialize_with, DeserializeError, KeyStyle, SerializeError};

#[derive(Debug, thiserror::Error)]
#[error("Could not read hierarchy file\n  - {0}")]
pub enum ReadHierarchyError {
	Io(#[from] io::Error),
	Utf8(#[from] Utf8Error),
	JsonParse(#[from] json::Error),
	Deserialize(#[from] DeserializeError),
}

#[derive(Debug, thiserror::Error)]
#[error("Could not write hierarchy file\n  - {0}")]
pub enum WriteHierarchyError {
	Io(#[from] io::Error),
	Serialize(#[from] SerializeError),
}

/// Indent width of written documents.
const INDENT: u16 = 2;

pub fn read_hierarchy<R: Read>(mut data: R) -> Result<HierarchyNode, ReadHierarchyError> {
	let mut payload = Vec::new();
	data.read_to_end(&mut payload)?;
	let payload = std::str::from_utf8(&payload)?;
	let payload = json::parse(payload)?;
	Ok(deserialize(&payload)?)
}

/// Serializes first, so nothing is written for an invalid hierarchy.
pub fn write_hierarchy<W: Write>(node: &HierarchyNode, mut out: W, style: KeyStyle) -> Result<(), WriteHierarchyError> {
	let payload = serialize_with(node, style)?;
	payload.write_pretty(&mut out, INDENT)?;
	writeln!(out)?;
	out.flush()?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use glam::{dvec3, DVec3};

	use super::*;

	#[test]
	fn test_write_then_read() {
		let tree = HierarchyNode::new("root_jnt", dvec3(0.0, 10.0, 0.0), DVec3::ZERO)
			.with_child(HierarchyNode::new("child_jnt", dvec3(0.0, 5.0, 0.0), dvec3(0.0, 0.0, 33.3)));

		let mut file = Vec::new();
		write_hierarchy(&tree, &mut file, KeyStyle::Plain).unwrap();
		let text = String::from_utf8(file.clone()).unwrap();
		assert!(text.starts_with("{\n  \"name\": \"root_jnt\","), "{text}");

		assert_eq!(read_hierarchy(file.as_slice()).unwrap(), tree);
	}

	#[test]
	fn test_invalid_hierarchy_writes_nothing() {
		let tree = HierarchyNode::new("root", dvec3(f64::NAN, 0.0, 0.0), DVec3::ZERO);
		let mut file = Vec::new();
		assert!(matches!(
			write_hierarchy(&tree, &mut file, KeyStyle::Plain),
			Err(WriteHierarchyError::Serialize(SerializeError::NonFiniteValue { .. }))
		));
		assert!(file.is_empty());
	}

	#[test]
	fn test_read_errors() {
		assert!(matches!(
			read_hierarchy(&b"{\"name\": \"r\""[..]),
			Err(ReadHierarchyError::JsonParse(_))
		));
		assert!(matches!(read_hierarchy(&[0xff, 0xfe][..]), Err(ReadHierarchyError::Utf8(_))));
		assert!(matches!(
			read_hierarchy(&b"{\"name\": \"r\"}"[..]),
			Err(ReadHierarchyError::Deserialize(DeserializeError::MalformedDocument(_)))
		));
	}
}
