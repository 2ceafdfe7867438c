//! Interfaces to the live scene a hierarchy is captured from and rebuilt into.
//!
//! The scene is passed explicitly to the reader and builder. Both walk it synchronously
//! and assume nothing else mutates it while they run.

pub mod memory;

use std::fmt::Debug;

use glam::DVec3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
	#[error("Node {0} does not exist in the scene")]
	UnknownNode(String),
	#[error("Node {0:?} has no transform")]
	NoTransform(String),
	#[error("Scene refused to create node {0:?}")]
	CreationRefused(String),
	#[error("Scene returned invalid data: {0}")]
	InvalidData(String),
	#[error("Scene host error: {0}")]
	Host(String),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Read access to a scene graph of transform nodes.
pub trait SceneQuery {
	/// Handle to a node of the scene.
	type Node: Clone + Debug;

	fn node_name(&self, node: &Self::Node) -> SceneResult<String>;
	fn world_translation(&self, node: &Self::Node) -> SceneResult<DVec3>;
	/// World space Euler angles, in degrees.
	fn world_rotation(&self, node: &Self::Node) -> SceneResult<DVec3>;
	/// Direct transform children in scene order. Shapes and other non-transform children are left out.
	fn list_children(&self, node: &Self::Node) -> SceneResult<Vec<Self::Node>>;
}

pub trait SceneMutation: SceneQuery {
	/// Creates an unparented transform node. The scene may pick a different name on collision.
	fn create_transform_node(&mut self, name: &str) -> SceneResult<Self::Node>;
	fn set_world_transform(&mut self, node: &Self::Node, position: DVec3, rotation: DVec3) -> SceneResult<()>;
	/// Parents `child` under `parent`, keeping its world transform.
	fn set_parent(&mut self, child: &Self::Node, parent: &Self::Node) -> SceneResult<()>;
}

/// Full read/write access, as needed to capture and rebuild hierarchies.
pub trait SceneAccess: SceneQuery + SceneMutation {}

impl<T: SceneQuery + SceneMutation> SceneAccess for T {}

/// Provides the root the user picked for capture.
pub trait SelectionProvider {
	type Node;

	fn selected_root(&self) -> Option<Self::Node>;
}
