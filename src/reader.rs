use std::fmt::Debug;

use tracing::{debug, info};

use crate::node::HierarchyNode;
use crate::scene::{SceneError, SceneQuery, SceneResult, SelectionProvider};

pub type CaptureResult<T> = Result<T, CaptureError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
	#[error("Nothing selected, select the root of a hierarchy")]
	NoSelection,
	#[error("Could not query node {node}\n  - {source}")]
	SceneQuery { node: String, source: SceneError },
}

fn queried<T>(node: &impl Debug, res: SceneResult<T>) -> CaptureResult<T> {
	res.map_err(|source| CaptureError::SceneQuery {
		node: format!("{node:?}"),
		source,
	})
}

/// Captures a live scene hierarchy into a [`HierarchyNode`] tree.
pub struct HierarchyReader<'s, S> {
	scene: &'s S,
}

impl<'s, S: SceneQuery> HierarchyReader<'s, S> {
	pub fn new(scene: &'s S) -> Self {
		Self { scene }
	}

	/// Walks the scene depth first from `root`. Without a root nothing is queried.
	///
	/// Any failed query aborts the whole capture.
	pub fn capture(&self, root: Option<&S::Node>) -> CaptureResult<HierarchyNode> {
		let Some(root) = root else {
			return Err(CaptureError::NoSelection);
		};

		let tree = self.capture_node(root)?;
		info!("Captured {} nodes under {:?}", tree.count_nodes(), tree.name);
		Ok(tree)
	}

	pub fn capture_selection<P>(&self, selection: &P) -> CaptureResult<HierarchyNode>
	where
		P: SelectionProvider<Node = S::Node>,
	{
		self.capture(selection.selected_root().as_ref())
	}

	fn capture_node(&self, node: &S::Node) -> CaptureResult<HierarchyNode> {
		let name = queried(node, self.scene.node_name(node))?;
		if name.is_empty() {
			return queried(node, Err(SceneError::InvalidData("empty node name".to_owned())));
		}

		let position = queried(&name, self.scene.world_translation(node))?;
		let rotation = queried(&name, self.scene.world_rotation(node))?;
		if !position.is_finite() || !rotation.is_finite() {
			return queried(
				&name,
				Err(SceneError::InvalidData(format!(
					"non-finite transform, translation {position}, rotation {rotation}"
				))),
			);
		}
		debug!("Captured {name:?} at {position}");

		let children = queried(&name, self.scene.list_children(node))?;
		let mut captured = HierarchyNode::new(name, position, rotation);
		captured.children.reserve(children.len());
		for child in &children {
			captured.children.push(self.capture_node(child)?);
		}

		Ok(captured)
	}
}
