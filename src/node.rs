use std::fmt;

use glam::DVec3;

/// One transform of a captured joint hierarchy, with world space placement.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
	pub name: String,
	/// World space translation.
	pub position: DVec3,
	/// World space Euler angles in degrees, in the order of the source scene.
	pub rotation: DVec3,
	/// Children in traversal order.
	pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
	pub fn new(name: impl Into<String>, position: DVec3, rotation: DVec3) -> Self {
		Self {
			name: name.into(),
			position,
			rotation,
			children: Vec::new(),
		}
	}

	pub fn with_child(mut self, child: HierarchyNode) -> Self {
		self.children.push(child);
		self
	}

	/// Number of nodes in this subtree, `self` included.
	pub fn count_nodes(&self) -> usize {
		1 + self.children.iter().map(HierarchyNode::count_nodes).sum::<usize>()
	}

	/// Depth-first pre-order walk over this subtree.
	pub fn iter(&self) -> Iter<'_> {
		Iter { stack: vec![self] }
	}
}

pub struct Iter<'a> {
	stack: Vec<&'a HierarchyNode>,
}

impl<'a> Iterator for Iter<'a> {
	type Item = &'a HierarchyNode;

	fn next(&mut self) -> Option<Self::Item> {
		let node = self.stack.pop()?;
		// reversed so the first child is popped next
		self.stack.extend(node.children.iter().rev());
		Some(node)
	}
}

impl<'a> IntoIterator for &'a HierarchyNode {
	type Item = &'a HierarchyNode;
	type IntoIter = Iter<'a>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

fn rec_fmt(indent: usize, f: &mut fmt::Formatter<'_>, node: &HierarchyNode) -> fmt::Result {
	let name = &node.name;
	#[cfg(feature = "owo")]
	let name = {
		use owo_colors::OwoColorize;
		name.magenta()
	};

	let DVec3 { x, y, z } = node.position;
	writeln!(f, "{}- {} ({}, {}, {})", "  ".repeat(indent), name, x, y, z)?;
	for child in &node.children {
		rec_fmt(indent + 1, f, child)?;
	}

	Ok(())
}

impl fmt::Display for HierarchyNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		rec_fmt(0, f, self)
	}
}

#[cfg(test)]
mod tests {
	use glam::dvec3;

	use super::*;

	fn arm() -> HierarchyNode {
		HierarchyNode::new("shoulder_L", dvec3(5.0, 10.0, 0.0), DVec3::ZERO)
			.with_child(
				HierarchyNode::new("elbow_L", dvec3(8.0, 10.0, 0.0), DVec3::ZERO)
					.with_child(HierarchyNode::new("wrist_L", dvec3(11.0, 10.0, 0.0), DVec3::ZERO)),
			)
			.with_child(HierarchyNode::new("twist_L", dvec3(6.0, 10.0, 0.0), dvec3(0.0, 0.0, 45.0)))
	}

	#[test]
	fn test_count_nodes() {
		assert_eq!(arm().count_nodes(), 4);
		assert_eq!(HierarchyNode::new("single", DVec3::ZERO, DVec3::ZERO).count_nodes(), 1);
	}

	#[test]
	fn test_pre_order_iteration() {
		let names: Vec<_> = arm().iter().map(|n| n.name.clone()).collect();
		assert_eq!(names, ["shoulder_L", "elbow_L", "wrist_L", "twist_L"]);
	}

	#[test]
	fn test_equality_is_order_sensitive() {
		let a = HierarchyNode::new("root", DVec3::ZERO, DVec3::ZERO)
			.with_child(HierarchyNode::new("a", DVec3::ZERO, DVec3::ZERO))
			.with_child(HierarchyNode::new("b", DVec3::ZERO, DVec3::ZERO));
		let b = HierarchyNode::new("root", DVec3::ZERO, DVec3::ZERO)
			.with_child(HierarchyNode::new("b", DVec3::ZERO, DVec3::ZERO))
			.with_child(HierarchyNode::new("a", DVec3::ZERO, DVec3::ZERO));
		assert_ne!(a, b);
		assert_eq!(a, a.clone());
	}

	#[cfg(not(feature = "owo"))]
	#[test]
	fn test_display_indents_children() {
		let printed = arm().to_string();
		let lines: Vec<_> = printed.lines().collect();
		assert_eq!(lines[0], "- shoulder_L (5, 10, 0)");
		assert_eq!(lines[1], "  - elbow_L (8, 10, 0)");
		assert_eq!(lines[2], "    - wrist_L (11, 10, 0)");
		assert_eq!(lines[3], "  - twist_L (6, 10, 0)");
	}
}
