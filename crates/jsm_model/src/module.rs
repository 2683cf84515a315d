//! Module dependency graph stored as an arena with `u32` ids.

use jsm_classpath::ClasspathEntry;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u32);

impl ModuleId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleRequirement {
    pub target: ModuleId,
    /// Re-exported to modules requiring this one.
    pub transitive: bool,
}

#[derive(Debug, Clone)]
pub struct ModuleNode {
    pub id: ModuleId,
    pub name: String,
    pub requires: Vec<ModuleRequirement>,
    pub exports: Vec<String>,
    /// Classpath entries owned by this module, in classpath order.
    pub entries: Vec<ClasspathEntry>,
}

impl ModuleNode {
    pub fn source_folders(&self) -> impl Iterator<Item = &ClasspathEntry> {
        self.entries.iter().filter(|entry| entry.is_source())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    nodes: Vec<ModuleNode>,
    by_name: HashMap<String, ModuleId>,
}

impl ModuleGraph {
    pub fn builder() -> ModuleGraphBuilder {
        ModuleGraphBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: ModuleId) -> Option<&ModuleNode> {
        self.nodes.get(id.index())
    }

    pub fn find(&self, name: &str) -> Option<ModuleId> {
        self.by_name.get(name).copied()
    }

    pub fn node(&self, name: &str) -> Option<&ModuleNode> {
        self.find(name).and_then(|id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleNode> {
        self.nodes.iter()
    }

    /// The module owning a classpath entry.
    pub fn module_of_entry(&self, entry: &ClasspathEntry) -> Option<ModuleId> {
        self.nodes
            .iter()
            .find(|node| node.entries.contains(entry))
            .map(|node| node.id)
    }
}

#[derive(Debug, Default)]
pub struct ModuleGraphBuilder {
    graph: ModuleGraph,
}

impl ModuleGraphBuilder {
    /// Id of the named module, creating an empty node on first mention.
    pub fn module(&mut self, name: &str) -> ModuleId {
        if let Some(id) = self.graph.by_name.get(name) {
            return *id;
        }
        let id = ModuleId(self.graph.nodes.len() as u32);
        self.graph.nodes.push(ModuleNode {
            id,
            name: name.to_string(),
            requires: Vec::new(),
            exports: Vec::new(),
            entries: Vec::new(),
        });
        self.graph.by_name.insert(name.to_string(), id);
        id
    }

    pub fn requires(&mut self, from: &str, to: &str, transitive: bool) -> &mut Self {
        let from = self.module(from);
        let target = self.module(to);
        let node = &mut self.graph.nodes[from.index()];
        match node.requires.iter_mut().find(|edge| edge.target == target) {
            Some(edge) => edge.transitive |= transitive,
            None => node.requires.push(ModuleRequirement { target, transitive }),
        }
        self
    }

    pub fn exports(&mut self, module: &str, package: &str) -> &mut Self {
        let id = self.module(module);
        let exports = &mut self.graph.nodes[id.index()].exports;
        if !exports.iter().any(|existing| existing == package) {
            exports.push(package.to_string());
        }
        self
    }

    pub fn entry(&mut self, module: &str, entry: ClasspathEntry) -> &mut Self {
        let id = self.module(module);
        let entries = &mut self.graph.nodes[id.index()].entries;
        if !entries.contains(&entry) {
            entries.push(entry);
        }
        self
    }

    pub fn build(self) -> ModuleGraph {
        self.graph
    }
}
