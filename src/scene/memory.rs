use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use glam::DVec3;
use indextree::{Arena, NodeId};

use super::{SceneError, SceneMutation, SceneQuery, SceneResult, SelectionProvider};

#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
	Transform { position: DVec3, rotation: DVec3 },
	/// Geometry attached under a transform, never part of a captured hierarchy.
	Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntry {
	pub name: String,
	pub kind: EntryKind,
}

/// Scene graph kept in an arena, standing in for a host application's scene.
///
/// Transforms are stored in world space, so reparenting never moves a node.
#[derive(Debug, Default)]
pub struct MemoryScene {
	arena: Arena<SceneEntry>,
	selection: Option<NodeId>,
	queries: Cell<usize>,
	creation_budget: Option<usize>,
	/// Names of every node in the arena.
	names: HashSet<String>,
	/// Next counter to try per clashing name.
	name_counters: HashMap<String, usize>,
}

impl MemoryScene {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_transform(&mut self, name: &str, parent: Option<NodeId>, position: DVec3, rotation: DVec3) -> NodeId {
		let name = self.unique_name(name);
		self.add_entry(
			SceneEntry {
				name,
				kind: EntryKind::Transform { position, rotation },
			},
			parent,
		)
	}

	pub fn add_shape(&mut self, name: &str, parent: NodeId) -> NodeId {
		let name = self.unique_name(name);
		self.add_entry(
			SceneEntry {
				name,
				kind: EntryKind::Shape,
			},
			Some(parent),
		)
	}

	fn add_entry(&mut self, entry: SceneEntry, parent: Option<NodeId>) -> NodeId {
		self.names.insert(entry.name.clone());
		let id = self.arena.new_node(entry);
		if let Some(parent) = parent {
			parent.append(id, &mut self.arena);
		}
		id
	}

	/// Sets the root handed out by [`SelectionProvider::selected_root`].
	pub fn select(&mut self, node: Option<NodeId>) {
		self.selection = node;
	}

	/// Makes every node creation after the next `n` fail, as a host refusing new nodes would.
	pub fn refuse_creation_after(&mut self, n: usize) {
		self.creation_budget = Some(n);
	}

	pub fn entry(&self, node: NodeId) -> Option<&SceneEntry> {
		let node = self.arena.get(node)?;
		(!node.is_removed()).then(|| node.get())
	}

	pub fn find(&self, name: &str) -> Option<NodeId> {
		self.live_ids().find(|id| self.entry(*id).is_some_and(|entry| entry.name == name))
	}

	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.arena.get(node)?.parent()
	}

	/// Unparented nodes, in creation order.
	pub fn roots(&self) -> Vec<NodeId> {
		self.live_ids().filter(|id| self.parent(*id).is_none()).collect()
	}

	pub fn node_count(&self) -> usize {
		self.live_ids().count()
	}

	pub fn transform_count(&self) -> usize {
		self.live_ids()
			.filter(|id| matches!(self.entry(*id), Some(SceneEntry { kind: EntryKind::Transform { .. }, .. })))
			.count()
	}

	/// Number of [`SceneQuery`] calls answered so far.
	pub fn query_count(&self) -> usize {
		self.queries.get()
	}

	fn live_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.arena
			.iter()
			.filter(|node| !node.is_removed())
			.filter_map(|node| self.arena.get_node_id(node))
	}

	/// Picks a free name the way hosts do, by appending a counter.
	fn unique_name(&mut self, name: &str) -> String {
		if !self.names.contains(name) {
			return name.to_owned();
		}
		let counter = self.name_counters.entry(name.to_owned()).or_insert(1);
		loop {
			let candidate = format!("{name}{counter}");
			*counter += 1;
			if !self.names.contains(&candidate) {
				return candidate;
			}
		}
	}

	fn checked_entry(&self, node: NodeId) -> SceneResult<&SceneEntry> {
		self.entry(node).ok_or_else(|| SceneError::UnknownNode(format!("{node:?}")))
	}

	fn transform_of(&self, node: NodeId) -> SceneResult<(DVec3, DVec3)> {
		self.queries.set(self.queries.get() + 1);
		match self.checked_entry(node)? {
			SceneEntry {
				kind: EntryKind::Transform { position, rotation },
				..
			} => Ok((*position, *rotation)),
			SceneEntry { name, .. } => Err(SceneError::NoTransform(name.clone())),
		}
	}
}

impl SceneQuery for MemoryScene {
	type Node = NodeId;

	fn node_name(&self, node: &NodeId) -> SceneResult<String> {
		self.queries.set(self.queries.get() + 1);
		Ok(self.checked_entry(*node)?.name.clone())
	}

	fn world_translation(&self, node: &NodeId) -> SceneResult<DVec3> {
		Ok(self.transform_of(*node)?.0)
	}

	fn world_rotation(&self, node: &NodeId) -> SceneResult<DVec3> {
		Ok(self.transform_of(*node)?.1)
	}

	fn list_children(&self, node: &NodeId) -> SceneResult<Vec<NodeId>> {
		self.queries.set(self.queries.get() + 1);
		self.checked_entry(*node)?;
		Ok(node
			.children(&self.arena)
			.filter(|child| matches!(self.entry(*child), Some(SceneEntry { kind: EntryKind::Transform { .. }, .. })))
			.collect())
	}
}

impl SceneMutation for MemoryScene {
	fn create_transform_node(&mut self, name: &str) -> SceneResult<NodeId> {
		if name.is_empty() {
			return Err(SceneError::Host("node names cannot be empty".to_owned()));
		}
		match self.creation_budget {
			Some(0) => return Err(SceneError::CreationRefused(name.to_owned())),
			Some(ref mut budget) => *budget -= 1,
			None => (),
		}
		Ok(self.add_transform(name, None, DVec3::ZERO, DVec3::ZERO))
	}

	fn set_world_transform(&mut self, node: &NodeId, position: DVec3, rotation: DVec3) -> SceneResult<()> {
		self.checked_entry(*node)?;
		let entry = self.arena[*node].get_mut();
		match &mut entry.kind {
			EntryKind::Transform {
				position: pos,
				rotation: rot,
			} => {
				*pos = position;
				*rot = rotation;
				Ok(())
			}
			EntryKind::Shape => Err(SceneError::NoTransform(entry.name.clone())),
		}
	}

	fn set_parent(&mut self, child: &NodeId, parent: &NodeId) -> SceneResult<()> {
		self.checked_entry(*child)?;
		self.checked_entry(*parent)?;
		if parent.ancestors(&self.arena).any(|ancestor| ancestor == *child) {
			return Err(SceneError::Host(format!("{child:?} cannot be parented under itself")));
		}
		child.detach(&mut self.arena);
		parent
			.checked_append(*child, &mut self.arena)
			.map_err(|e| SceneError::Host(e.to_string()))
	}
}

impl SelectionProvider for MemoryScene {
	type Node = NodeId;

	fn selected_root(&self) -> Option<NodeId> {
		self.selection.filter(|node| self.entry(*node).is_some())
	}
}
