use glam::{dvec3, DVec3};
use json::JsonValue;
use tracing::{debug, error, info};

use crate::formats::json::{as_object, JsonObject};
use crate::node::HierarchyNode;
use crate::scene::{SceneError, SceneMutation};

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
	#[error("Suffix must be a string, got {0}")]
	InvalidSuffix(String),
	#[error("Invalid build options: {0}")]
	InvalidOptions(String),
	#[error("Renaming {0:?} gives an empty name")]
	EmptyName(String),
	#[error("Could not create {node:?} after creating {} nodes\n  - {source}", .created.len())]
	SceneMutation {
		node: String,
		/// Nodes left in the scene by the failed build, in creation order.
		created: Vec<String>,
		source: SceneError,
	},
}

fn json_type_name(val: &JsonValue) -> &'static str {
	match val {
		JsonValue::Null => "null",
		JsonValue::Short(_) | JsonValue::String(_) => "string",
		JsonValue::Number(_) => "number",
		JsonValue::Boolean(_) => "bool",
		JsonValue::Object(_) => "object",
		JsonValue::Array(_) => "list",
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
	/// Appended to every rebuilt name, see [`rewrite_name`]. Empty keeps base names.
	pub suffix: String,
	/// Mirror positions across the YZ plane.
	pub mirror: bool,
}

impl BuildOptions {
	pub fn new(suffix: impl Into<String>, mirror: bool) -> Self {
		Self {
			suffix: suffix.into(),
			mirror,
		}
	}

	/// Reads options from an object like `{"suffix": "_R", "mirror": true}`.
	///
	/// Both keys are optional. `symmetrize` is accepted in place of `mirror`.
	pub fn from_json(payload: &JsonValue) -> BuildResult<Self> {
		let obj = as_object("(options)", payload).map_err(|e| BuildError::InvalidOptions(e.to_string()))?;
		Ok(Self {
			suffix: read_suffix(&obj)?,
			mirror: read_mirror(&obj)?,
		})
	}
}

fn read_suffix(obj: &JsonObject) -> BuildResult<String> {
	match obj.get_value("suffix") {
		None => Ok(String::new()),
		Some(val) => match val.as_str() {
			Some(suffix) => Ok(suffix.to_owned()),
			None => Err(BuildError::InvalidSuffix(json_type_name(val).to_owned())),
		},
	}
}

fn read_mirror(obj: &JsonObject) -> BuildResult<bool> {
	let val = ["mirror", "symmetrize"]
		.into_iter()
		.find_map(|key| Some((key, obj.get_value(key)?)));
	match val {
		None => Ok(false),
		Some((key, val)) => val.as_bool().ok_or_else(|| {
			BuildError::InvalidOptions(format!("{key:?} must be a bool, got {}", json_type_name(val)))
		}),
	}
}

/// Name given to a rebuilt node.
///
/// Everything from the first `_` on is treated as the old suffix and replaced, so
/// `"arm_upper_L"` with `"_R"` gives `"arm_R"`. Names without `_` get the suffix appended.
pub fn rewrite_name(name: &str, suffix: &str) -> String {
	match name.split_once('_') {
		Some((base, _)) => format!("{base}{suffix}"),
		None => format!("{name}{suffix}"),
	}
}

/// Position mirrored across the YZ plane. Rotations are never mirrored.
pub fn mirror_position(position: DVec3) -> DVec3 {
	dvec3(-position.x, position.y, position.z)
}

/// A node as it will be created, in depth-first pre-order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedNode {
	pub name: String,
	pub position: DVec3,
	pub rotation: DVec3,
	/// Index of the parent in the plan, `None` for the root.
	pub parent: Option<usize>,
}

/// Rebuilds a [`HierarchyNode`] tree as new transforms in a scene.
#[derive(Debug, Clone, Default)]
pub struct HierarchyBuilder {
	options: BuildOptions,
}

impl HierarchyBuilder {
	pub fn new(options: BuildOptions) -> Self {
		Self { options }
	}

	pub fn options(&self) -> &BuildOptions {
		&self.options
	}

	/// Renamed and mirrored nodes in creation order, without touching a scene.
	pub fn planned_nodes(&self, tree: &HierarchyNode) -> BuildResult<Vec<PlannedNode>> {
		let mut plan = Vec::with_capacity(tree.count_nodes());
		self.plan_node(tree, None, &mut plan)?;
		Ok(plan)
	}

	fn plan_node(&self, node: &HierarchyNode, parent: Option<usize>, plan: &mut Vec<PlannedNode>) -> BuildResult<()> {
		let name = rewrite_name(&node.name, &self.options.suffix);
		if name.is_empty() {
			return Err(BuildError::EmptyName(node.name.clone()));
		}
		let position = match self.options.mirror {
			true => mirror_position(node.position),
			false => node.position,
		};

		let index = plan.len();
		plan.push(PlannedNode {
			name,
			position,
			rotation: node.rotation,
			parent,
		});
		for child in &node.children {
			self.plan_node(child, Some(index), plan)?;
		}
		Ok(())
	}

	/// Creates one new transform per node of `tree` and returns the new root.
	///
	/// Nothing is created if a name can't be rewritten. A scene failure stops the build
	/// where it happened: nodes created before it stay in the scene and are listed in
	/// the error.
	pub fn reconstruct<S: SceneMutation>(&self, scene: &mut S, tree: &HierarchyNode) -> BuildResult<S::Node> {
		let plan = self.planned_nodes(tree)?;

		let mut created: Vec<S::Node> = Vec::with_capacity(plan.len());
		for planned in &plan {
			match create_node(scene, planned, &created) {
				Ok(node) => {
					debug!("Created {:?} as {node:?} at {}", planned.name, planned.position);
					created.push(node);
				}
				Err(source) => {
					error!(
						"Rebuilding {:?} failed at {:?}, leaving {} created nodes: {created:?}",
						tree.name,
						planned.name,
						created.len()
					);
					return Err(BuildError::SceneMutation {
						node: planned.name.clone(),
						created: plan[..created.len()].iter().map(|p| p.name.clone()).collect(),
						source,
					});
				}
			}
		}

		info!("Rebuilt {} nodes from {:?}", created.len(), tree.name);
		// a plan always holds at least the root
		Ok(created.swap_remove(0))
	}
}

fn create_node<S: SceneMutation>(scene: &mut S, planned: &PlannedNode, created: &[S::Node]) -> Result<S::Node, SceneError> {
	let node = scene.create_transform_node(&planned.name)?;
	scene.set_world_transform(&node, planned.position, planned.rotation)?;
	if let Some(parent) = planned.parent {
		scene.set_parent(&node, &created[parent])?;
	}
	Ok(node)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scene::memory::MemoryScene;
	use crate::scene::SceneQuery;

	fn leg() -> HierarchyNode {
		HierarchyNode::new("hip_L", dvec3(9.0, 90.0, 1.0), dvec3(0.0, 0.0, -90.0)).with_child(
			HierarchyNode::new("knee_L", dvec3(9.5, 50.0, 3.0), dvec3(0.0, 0.0, -92.0))
				.with_child(HierarchyNode::new("ankle_L", dvec3(9.5, 8.0, 0.0), DVec3::ZERO))
				.with_child(HierarchyNode::new("kneeTwist", dvec3(9.5, 45.0, 3.0), DVec3::ZERO)),
		)
	}

	#[test]
	fn test_rewrite_name() {
		assert_eq!(rewrite_name("jnt_L", "_R"), "jnt_R");
		assert_eq!(rewrite_name("spine", "_mirror"), "spine_mirror");
		assert_eq!(rewrite_name("pelvis_", "_X"), "pelvis_X");
		assert_eq!(rewrite_name("arm_upper_L", "_R"), "arm_R");
		assert_eq!(rewrite_name("arm_L", ""), "arm");
		assert_eq!(rewrite_name("spine", ""), "spine");
	}

	#[test]
	fn test_mirror_position() {
		assert_eq!(mirror_position(dvec3(9.0, 90.0, 1.0)), dvec3(-9.0, 90.0, 1.0));
		assert_eq!(mirror_position(dvec3(-2.0, 0.0, -4.0)), dvec3(2.0, 0.0, -4.0));
	}

	#[test]
	fn test_reconstruct_creates_one_node_per_entry() {
		let tree = leg();
		let mut scene = MemoryScene::new();
		let root = HierarchyBuilder::new(BuildOptions::new("_R", true))
			.reconstruct(&mut scene, &tree)
			.unwrap();

		assert_eq!(scene.transform_count(), tree.count_nodes());
		assert_eq!(scene.roots(), [root]);
		assert_eq!(scene.node_name(&root).unwrap(), "hip_R");

		let knee = scene.list_children(&root).unwrap()[0];
		let knee_children: Vec<_> = (scene.list_children(&knee).unwrap().iter())
			.map(|child| scene.node_name(child).unwrap())
			.collect();
		assert_eq!(knee_children, ["ankle_R", "kneeTwist_R"]);
	}

	#[test]
	fn test_mirror_only_negates_x() {
		let tree = leg();
		let mut scene = MemoryScene::new();
		let root = HierarchyBuilder::new(BuildOptions::new("_R", true))
			.reconstruct(&mut scene, &tree)
			.unwrap();

		assert_eq!(scene.world_translation(&root).unwrap(), dvec3(-9.0, 90.0, 1.0));
		assert_eq!(scene.world_rotation(&root).unwrap(), tree.rotation);
	}

	#[test]
	fn test_without_mirror_transforms_are_copied() {
		let tree = leg();
		let builder = HierarchyBuilder::new(BuildOptions::new("_copy", false));
		let plan = builder.planned_nodes(&tree).unwrap();

		for (planned, node) in plan.iter().zip(tree.iter()) {
			assert_eq!(planned.position, node.position);
			assert_eq!(planned.rotation, node.rotation);
		}
		let parents: Vec<_> = plan.iter().map(|p| p.parent).collect();
		assert_eq!(parents, [None, Some(0), Some(1), Some(1)]);
	}

	#[test]
	fn test_existing_nodes_are_left_alone() {
		let mut scene = MemoryScene::new();
		let existing = scene.add_transform("hip", None, dvec3(9.0, 90.0, 1.0), DVec3::ZERO);

		// suffix-less rebuild collides with the existing names and gets renamed by the scene
		let root = HierarchyBuilder::default().reconstruct(&mut scene, &leg()).unwrap();
		assert_ne!(root, existing);
		assert_eq!(scene.node_name(&existing).unwrap(), "hip");
		assert_eq!(scene.node_name(&root).unwrap(), "hip1");
		assert!(scene.list_children(&existing).unwrap().is_empty());
		assert_eq!(scene.world_translation(&existing).unwrap(), dvec3(9.0, 90.0, 1.0));
	}

	#[test]
	fn test_empty_name_creates_nothing() {
		let tree = leg().with_child(HierarchyNode::new("_hidden", DVec3::ZERO, DVec3::ZERO));
		let mut scene = MemoryScene::new();

		let err = HierarchyBuilder::default().reconstruct(&mut scene, &tree).unwrap_err();
		assert_eq!(err, BuildError::EmptyName("_hidden".to_owned()));
		assert_eq!(scene.node_count(), 0);
	}

	#[test]
	fn test_scene_failure_keeps_created_nodes() {
		let mut scene = MemoryScene::new();
		scene.refuse_creation_after(2);

		let err = HierarchyBuilder::new(BuildOptions::new("_R", false))
			.reconstruct(&mut scene, &leg())
			.unwrap_err();
		assert_eq!(
			err,
			BuildError::SceneMutation {
				node: "ankle_R".to_owned(),
				created: vec!["hip_R".to_owned(), "knee_R".to_owned()],
				source: SceneError::CreationRefused("ankle_R".to_owned()),
			}
		);
		// no rollback
		assert_eq!(scene.transform_count(), 2);
	}

	fn options(text: &str) -> BuildResult<BuildOptions> {
		BuildOptions::from_json(&json::parse(text).unwrap())
	}

	#[test]
	fn test_options_from_json() {
		assert_eq!(options(r#"{"suffix": "_R", "mirror": true}"#), Ok(BuildOptions::new("_R", true)));
		assert_eq!(options(r#"{"symmetrize": true}"#), Ok(BuildOptions::new("", true)));
		assert_eq!(
			options(r#"{"mirror": false, "symmetrize": true}"#),
			Ok(BuildOptions::new("", false))
		);
		assert_eq!(options("{}"), Ok(BuildOptions::default()));
	}

	#[test]
	fn test_options_reject_non_string_suffix() {
		assert_eq!(options(r#"{"suffix": 3}"#), Err(BuildError::InvalidSuffix("number".to_owned())));
		assert_eq!(options(r#"{"suffix": null}"#), Err(BuildError::InvalidSuffix("null".to_owned())));
		assert_eq!(options(r#"{"suffix": ["_R"]}"#), Err(BuildError::InvalidSuffix("list".to_owned())));
		assert!(matches!(options(r#"{"mirror": "yes"}"#), Err(BuildError::InvalidOptions(_))));
		assert!(matches!(options("[1]"), Err(BuildError::InvalidOptions(_))));
	}
}
