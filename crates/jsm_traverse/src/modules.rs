use crate::{SizeHint, Traversal};
use jsm_model::{ModuleGraph, ModuleId, ModuleNode};
use std::collections::VecDeque;

/// Breadth-first walk over the `requires` edges of a module graph.
///
/// Each reachable module is yielded at most once, so graphs with cycles
/// terminate. The name filter only hides modules from the output; it never
/// changes which modules are expanded or in which order.
pub struct ModuleDependencies<'g> {
    graph: &'g ModuleGraph,
    recursive: bool,
    include_self: bool,
    transitive_only: bool,
    filter: Option<Box<dyn Fn(&str) -> bool + 'g>>,
    queue: VecDeque<(ModuleId, usize)>,
    visited: Vec<bool>,
}

impl<'g> ModuleDependencies<'g> {
    /// Direct dependencies of `start`, without `start` itself.
    pub fn of(graph: &'g ModuleGraph, start: ModuleId) -> Self {
        let mut visited = vec![false; graph.len()];
        let mut queue = VecDeque::new();
        if let Some(seen) = visited.get_mut(start.index()) {
            *seen = true;
            queue.push_back((start, 0));
        }
        Self {
            graph,
            recursive: false,
            include_self: false,
            transitive_only: false,
            filter: None,
            queue,
            visited,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn include_self(mut self, include: bool) -> Self {
        self.include_self = include;
        self
    }

    /// Follow only `requires transitive` edges, i.e. what the start module
    /// re-exports to its readers.
    pub fn transitive_only(mut self, transitive_only: bool) -> Self {
        self.transitive_only = transitive_only;
        self
    }

    pub fn name_filter(mut self, filter: impl Fn(&str) -> bool + 'g) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    fn expand(&mut self, node: &ModuleNode, depth: usize) {
        if depth > 0 && !self.recursive {
            return;
        }
        for edge in &node.requires {
            if self.transitive_only && !edge.transitive {
                continue;
            }
            let Some(seen) = self.visited.get_mut(edge.target.index()) else {
                continue;
            };
            if !*seen {
                *seen = true;
                self.queue.push_back((edge.target, depth + 1));
            }
        }
    }

    fn accepts(&self, node: &ModuleNode) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(&node.name))
    }
}

impl<'g> Iterator for ModuleDependencies<'g> {
    type Item = &'g ModuleNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.queue.pop_front() {
            let graph = self.graph;
            let Some(node) = graph.get(id) else {
                continue;
            };
            self.expand(node, depth);
            if depth == 0 && !self.include_self {
                continue;
            }
            if self.accepts(node) {
                return Some(node);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.size().bounds()
    }
}

impl Traversal for ModuleDependencies<'_> {
    fn size(&self) -> SizeHint {
        if self.queue.is_empty() {
            return SizeHint::Exact(0);
        }
        if self.recursive || self.filter.is_some() {
            return SizeHint::Unknown;
        }
        let pending = self
            .queue
            .iter()
            .map(|(id, depth)| match (depth, self.graph.get(*id)) {
                (0, Some(node)) => node.requires.len() + usize::from(self.include_self),
                (0, None) => 0,
                _ => 1,
            })
            .sum();
        SizeHint::Estimated(pending)
    }
}
