pub mod builder;
pub mod formats;
pub mod node;
pub mod reader;
pub mod scene;

pub use builder::{BuildError, BuildOptions, HierarchyBuilder};
pub use formats::{deserialize, serialize};
pub use node::HierarchyNode;
pub use reader::{CaptureError, HierarchyReader};

use scene::{SceneAccess, SceneMutation, SceneQuery};

/// Captures the hierarchy under `root`, failing with [`CaptureError::NoSelection`] without one.
pub fn capture<S: SceneQuery>(scene: &S, root: Option<&S::Node>) -> Result<HierarchyNode, CaptureError> {
	HierarchyReader::new(scene).capture(root)
}

/// Rebuilds `tree` in `scene` under new names, mirrored across X if `mirror` is set.
pub fn reconstruct<S: SceneMutation>(
	scene: &mut S,
	tree: &HierarchyNode,
	suffix: &str,
	mirror: bool,
) -> Result<S::Node, BuildError> {
	HierarchyBuilder::new(BuildOptions::new(suffix, mirror)).reconstruct(scene, tree)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Could not duplicate hierarchy\n  - {0}")]
pub enum DuplicateError {
	Capture(#[from] CaptureError),
	Build(#[from] BuildError),
}

/// Captures the hierarchy under `root` and rebuilds it in the same scene, returning the
/// captured tree and the root of the copy.
pub fn duplicate<S: SceneAccess>(
	scene: &mut S,
	root: Option<&S::Node>,
	options: BuildOptions,
) -> Result<(HierarchyNode, S::Node), DuplicateError> {
	let tree = capture(scene, root)?;
	let copy = HierarchyBuilder::new(options).reconstruct(scene, &tree)?;
	Ok((tree, copy))
}
