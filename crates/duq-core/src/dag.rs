//! Dependency graph construction and topological ordering

use crate::error::{CoreError, CoreResult};
use crate::model::SqlModel;
use crate::model_name::ModelName;
use duq_sql::unqualified_name;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet};

/// Directed graph of model dependencies.
///
/// Node indices follow insertion order, which is the tie-breaker whenever
/// several models could come next in a topological order. Edges point from a
/// dependency to its dependent.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<ModelName, ()>,
    node_map: HashMap<ModelName, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph from parsed models.
    ///
    /// References that do not name a model are treated as raw/external
    /// sources and produce no edge.
    pub fn build(models: &[SqlModel]) -> CoreResult<Self> {
        let mut dag = Self::default();
        let mut origins: HashMap<&str, String> = HashMap::new();

        for model in models {
            if let Some(first) = origins.get(model.name.as_str()) {
                return Err(CoreError::DuplicateModel {
                    name: model.name.to_string(),
                    first: first.clone(),
                    second: model.origin_display(),
                });
            }
            origins.insert(model.name.as_str(), model.origin_display());
            dag.add_model(model.name.clone());
        }

        for model in models {
            dag.add_dependencies(&model.name, model.dependencies.iter().map(String::as_str));
        }

        Ok(dag)
    }

    /// Build the graph from plain `(model, dependencies)` pairs.
    pub fn from_edges<'a, I, D>(entries: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (&'a str, D)>,
        D: IntoIterator<Item = &'a str>,
    {
        let entries: Vec<(&str, Vec<&str>)> = entries
            .into_iter()
            .map(|(name, deps)| (name, deps.into_iter().collect()))
            .collect();

        let mut dag = Self::default();
        for (name, _) in &entries {
            let model_name = ModelName::try_new(*name).ok_or_else(|| CoreError::UnnamedModel {
                origin: "<edges>".to_string(),
            })?;
            if dag.node_map.contains_key(*name) {
                return Err(CoreError::DuplicateModel {
                    name: name.to_string(),
                    first: "<edges>".to_string(),
                    second: "<edges>".to_string(),
                });
            }
            dag.add_model(model_name);
        }
        for (name, deps) in &entries {
            dag.add_dependencies(name, deps.iter().copied());
        }

        Ok(dag)
    }

    fn add_model(&mut self, name: ModelName) -> NodeIndex {
        let idx = self.graph.add_node(name.clone());
        self.node_map.insert(name, idx);
        idx
    }

    fn add_dependencies<'a>(&mut self, model: &str, deps: impl Iterator<Item = &'a str>) {
        let Some(&model_idx) = self.node_map.get(model) else {
            return;
        };
        for dep in deps {
            match self.resolve(dep) {
                // update_edge keeps a single edge when `main.x` and `x` both appear
                Some(dep_idx) => {
                    self.graph.update_edge(dep_idx, model_idx, ());
                }
                None => log::debug!("'{}' reads external relation '{}'", model, dep),
            }
        }
    }

    /// Resolve a referenced table name to a model node, falling back to the
    /// unqualified name for schema-qualified references.
    fn resolve(&self, dep: &str) -> Option<NodeIndex> {
        self.node_map
            .get(dep)
            .or_else(|| self.node_map.get(unqualified_name(dep)))
            .copied()
    }

    /// Models in dependency order.
    ///
    /// When more than one model is ready, the one inserted first goes first,
    /// so the same input always yields the same order.
    pub fn topological_order(&self) -> CoreResult<Vec<ModelName>> {
        let mut pending: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| self.graph.neighbors_directed(idx, Direction::Incoming).count())
            .collect();

        let mut ready: BinaryHeap<Reverse<NodeIndex>> = self
            .graph
            .node_indices()
            .filter(|idx| pending[idx.index()] == 0)
            .map(Reverse)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(idx)) = ready.pop() {
            order.push(self.graph[idx].clone());
            for dependent in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                pending[dependent.index()] -= 1;
                if pending[dependent.index()] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if order.len() < self.graph.node_count() {
            let stuck: HashSet<NodeIndex> = self
                .graph
                .node_indices()
                .filter(|idx| pending[idx.index()] > 0)
                .collect();
            return Err(CoreError::CircularDependency {
                cycle: self.describe_cycle(&stuck),
            });
        }

        Ok(order)
    }

    /// Render one cycle among `stuck` nodes as `a -> b -> a`.
    ///
    /// Every node left with unmet dependencies after Kahn's algorithm either
    /// lies on a cycle or downstream of one, so walking back along incoming
    /// edges inside `stuck` must revisit a node.
    fn describe_cycle(&self, stuck: &HashSet<NodeIndex>) -> String {
        let Some(&start) = stuck.iter().min() else {
            return String::new();
        };

        let mut path = vec![start];
        let mut seen = HashMap::from([(start, 0usize)]);
        let mut current = start;
        loop {
            let next = self
                .graph
                .neighbors_directed(current, Direction::Incoming)
                .filter(|idx| stuck.contains(idx))
                .min();
            let Some(next) = next else {
                break;
            };
            if let Some(&pos) = seen.get(&next) {
                path.drain(..pos);
                path.push(next);
                break;
            }
            seen.insert(next, path.len());
            path.push(next);
            current = next;
        }

        // walked dependent -> dependency; print in dependency order
        path.reverse();
        path.iter()
            .map(|idx| self.graph[*idx].as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Direct dependencies of a model that are models themselves
    pub fn dependencies(&self, model: &str) -> BTreeSet<ModelName> {
        self.neighbors(model, Direction::Incoming)
            .into_iter()
            .collect()
    }

    /// Direct dependents of a model, in insertion order
    pub fn dependents(&self, model: &str) -> Vec<ModelName> {
        self.neighbors(model, Direction::Outgoing)
    }

    fn neighbors(&self, model: &str, direction: Direction) -> Vec<ModelName> {
        let Some(&idx) = self.node_map.get(model) else {
            return Vec::new();
        };
        let mut indices: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        indices.sort();
        indices.into_iter().map(|i| self.graph[i].clone()).collect()
    }

    /// All transitive dependents of a model
    pub fn descendants(&self, model: &str) -> BTreeSet<ModelName> {
        let Some(&start) = self.node_map.get(model) else {
            return BTreeSet::new();
        };
        let mut result = BTreeSet::new();
        let mut stack = vec![start];
        let mut visited = HashSet::from([start]);
        while let Some(idx) = stack.pop() {
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if visited.insert(next) {
                    result.insert(self.graph[next].clone());
                    stack.push(next);
                }
            }
        }
        result
    }

    /// The graph as a plain mapping: model name -> model dependencies
    pub fn edges(&self) -> HashMap<ModelName, BTreeSet<ModelName>> {
        self.graph
            .node_indices()
            .map(|idx| {
                let name = self.graph[idx].clone();
                let deps = self.dependencies(&name);
                (name, deps)
            })
            .collect()
    }

    /// All model names in insertion order
    pub fn models(&self) -> Vec<ModelName> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// Check if a model exists in the graph
    pub fn contains(&self, model: &str) -> bool {
        self.node_map.contains_key(model)
    }

    /// Number of models
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// True when the graph holds no models
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub(crate) fn inner(&self) -> &DiGraph<ModelName, ()> {
        &self.graph
    }
}

#[cfg(test)]
#[path = "dag_test.rs"]
mod tests;
