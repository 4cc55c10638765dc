//! Provider dependency graph
//!
//! Built from the effective providers of a module. A scope validates its graph
//! before anything is constructed, so missing dependencies and cycles are
//! reported up front instead of surfacing as a hang or a late failure.
//!
//! The graph can also be rendered in DOT format for Graphviz:
//!
//! ```rust
//! use pgmount_di::{DependencyGraph, DependencyKey, Module, Provider};
//!
//! let module = Module::new("app")
//!     .provider(Provider::value(DependencyKey::named("config"), 1u8))
//!     .provider(Provider::from_fn(
//!         DependencyKey::named("service"),
//!         [DependencyKey::named("config")],
//!         |_deps| Ok::<_, pgmount_di::DiError>(()),
//!     ));
//!
//! let graph = DependencyGraph::from_module(&module);
//! let dot = graph.to_dot();
//! assert!(dot.contains("\"service\" -> \"config\""));
//! ```

use crate::{DependencyKey, DiError, DiResult, Module, ProviderKind};
use std::collections::{HashMap, HashSet};

/// Represents a node in the dependency graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
	pub key: DependencyKey,
	pub kind: ProviderKind,
	/// Name of the module that registered the provider
	pub module: String,
}

/// Directed graph of provider keys; an edge `a -> b` means `a` injects `b`
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
	nodes: Vec<GraphNode>,
	index: HashMap<DependencyKey, usize>,
	edges: Vec<(DependencyKey, DependencyKey)>,
}

impl DependencyGraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds the graph of a module's effective providers (imports included).
	pub fn from_module(module: &Module) -> Self {
		let mut effective = HashMap::new();
		let mut order = Vec::new();
		for (module_name, provider) in module.flatten() {
			if effective
				.insert(provider.key().clone(), (module_name, provider))
				.is_none()
			{
				order.push(provider.key().clone());
			}
		}

		let mut graph = Self::new();
		for key in &order {
			let (module_name, provider) = effective[key];
			graph.add_node(key.clone(), provider.kind(), module_name);
		}
		for key in &order {
			let (_, provider) = effective[key];
			for dep in provider.inject() {
				graph.add_dependency(key.clone(), dep.clone());
			}
		}
		graph
	}

	/// Adds a node, replacing any previous node with the same key.
	pub fn add_node(&mut self, key: DependencyKey, kind: ProviderKind, module: impl Into<String>) {
		let node = GraphNode {
			key: key.clone(),
			kind,
			module: module.into(),
		};
		match self.index.get(&key) {
			Some(&i) => self.nodes[i] = node,
			None => {
				self.index.insert(key, self.nodes.len());
				self.nodes.push(node);
			}
		}
	}

	/// Add a dependency edge from `from` to `to`
	pub fn add_dependency(&mut self, from: DependencyKey, to: DependencyKey) {
		self.edges.push((from, to));
	}

	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[(DependencyKey, DependencyKey)] {
		&self.edges
	}

	pub fn contains(&self, key: &DependencyKey) -> bool {
		self.index.contains_key(key)
	}

	/// Direct dependencies of `key`, in declaration order
	pub fn dependencies_of<'a>(
		&'a self,
		key: &'a DependencyKey,
	) -> impl Iterator<Item = &'a DependencyKey> + 'a {
		self.edges
			.iter()
			.filter_map(move |(from, to)| (from == key).then_some(to))
	}

	/// Edges whose target has no node
	pub fn missing_dependencies(&self) -> Vec<(&DependencyKey, &DependencyKey)> {
		self.edges
			.iter()
			.filter(|(_, to)| !self.contains(to))
			.map(|(from, to)| (from, to))
			.collect()
	}

	/// Detect circular dependencies in the graph
	///
	/// Each cycle is returned as the path from its first node back to itself
	/// (the closing node is not repeated).
	pub fn detect_cycles(&self) -> Vec<Vec<DependencyKey>> {
		let mut cycles = Vec::new();
		let mut visited = HashSet::new();
		let mut rec_stack = HashSet::new();

		for node in &self.nodes {
			if !visited.contains(&node.key) {
				let mut path = Vec::new();
				self.dfs_detect_cycles(
					&node.key,
					&mut visited,
					&mut rec_stack,
					&mut path,
					&mut cycles,
				);
			}
		}

		cycles
	}

	fn dfs_detect_cycles<'a>(
		&'a self,
		node: &'a DependencyKey,
		visited: &mut HashSet<&'a DependencyKey>,
		rec_stack: &mut HashSet<&'a DependencyKey>,
		path: &mut Vec<&'a DependencyKey>,
		cycles: &mut Vec<Vec<DependencyKey>>,
	) {
		visited.insert(node);
		rec_stack.insert(node);
		path.push(node);

		for dep in self.dependencies_of(node) {
			if !visited.contains(dep) {
				self.dfs_detect_cycles(dep, visited, rec_stack, path, cycles);
			} else if rec_stack.contains(dep)
				&& let Some(cycle_start) = path.iter().position(|p| *p == dep)
			{
				cycles.push(path[cycle_start..].iter().map(|k| (*k).clone()).collect());
			}
		}

		path.pop();
		rec_stack.remove(node);
	}

	/// Checks that every dependency is provided and that there are no cycles.
	pub fn validate(&self) -> DiResult<()> {
		if let Some((from, to)) = self.missing_dependencies().first() {
			return Err(DiError::DependencyNotFound {
				key: (*to).clone(),
				required_by: (*from).clone(),
			});
		}
		if let Some(cycle) = self.detect_cycles().first() {
			return Err(DiError::CircularDependency {
				path: format_cycle(cycle),
			});
		}
		Ok(())
	}

	/// Generate DOT format output for Graphviz
	pub fn to_dot(&self) -> String {
		let mut output = String::from("digraph DependencyGraph {\n");
		output.push_str("  rankdir=LR;\n");
		output.push_str("  node [shape=box, style=rounded];\n\n");

		for node in &self.nodes {
			let color = match node.kind {
				ProviderKind::Value => "lightblue",
				ProviderKind::Factory => "lightgreen",
			};
			output.push_str(&format!(
				"  \"{}\" [label=\"{}\\n({})\", fillcolor={}, style=filled];\n",
				node.key, node.key, node.module, color
			));
		}

		output.push('\n');

		for (from, to) in &self.edges {
			output.push_str(&format!("  \"{}\" -> \"{}\";\n", from, to));
		}

		output.push_str("}\n");
		output
	}
}

/// Formats a cycle as `A -> B -> C -> A`
fn format_cycle(cycle: &[DependencyKey]) -> String {
	let mut names: Vec<String> = cycle.iter().map(ToString::to_string).collect();
	if let Some(first) = cycle.first() {
		names.push(first.to_string());
	}
	names.join(" -> ")
}
