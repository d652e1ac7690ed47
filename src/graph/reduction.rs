//! Transitive reduction of single-predicate subgraphs.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::{
    errors::{Error, Result},
    ontology::value_objects::Iri,
};

/// Plain directed graph over the edges of one predicate.
///
/// Parallel edges collapse into one; the graph remembers the predicate it was
/// extracted for and labels itself with the predicate's local name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiGraph {
    predicate: Iri,
    label: String,
    successors: BTreeMap<Iri, BTreeSet<Iri>>,
}

impl DiGraph {
    pub fn from_edges<I>(predicate: Iri, edges: I) -> Self
    where
        I: IntoIterator<Item = (Iri, Iri)>,
    {
        let label = predicate.local_name().to_string();
        let mut successors: BTreeMap<Iri, BTreeSet<Iri>> = BTreeMap::new();
        for (from, to) in edges {
            successors.entry(to.clone()).or_default();
            successors.entry(from).or_default().insert(to);
        }
        Self {
            predicate,
            label,
            successors,
        }
    }

    #[must_use]
    pub fn predicate(&self) -> &Iri {
        &self.predicate
    }

    /// Local name of the predicate, e.g. `subClassOf`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.successors.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.successors.values().map(BTreeSet::len).sum()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&Iri, &Iri)> {
        self.successors
            .iter()
            .flat_map(|(from, next)| next.iter().map(move |to| (from, to)))
    }

    /// Nodes reachable from `start` through one or more edges.
    #[must_use]
    pub fn reachable_from(&self, start: &Iri) -> BTreeSet<Iri> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&Iri> = self
            .successors
            .get(start)
            .into_iter()
            .flatten()
            .collect();
        while let Some(node) = queue.pop_front() {
            if seen.insert(node.clone()) {
                queue.extend(self.successors.get(node).into_iter().flatten());
            }
        }
        seen
    }

    /// Kahn ordering; fails with the nodes left on or behind a cycle.
    fn topological_order(&self) -> Result<Vec<&Iri>> {
        let mut in_degree: BTreeMap<&Iri, usize> =
            self.successors.keys().map(|node| (node, 0)).collect();
        for to in self.successors.values().flatten() {
            if let Some(degree) = in_degree.get_mut(to) {
                *degree += 1;
            }
        }

        let mut ready: VecDeque<&Iri> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(node, _)| *node)
            .collect();
        let mut order = Vec::with_capacity(self.successors.len());
        while let Some(node) = ready.pop_front() {
            order.push(node);
            for next in self.successors.get(node).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(next) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(next);
                    }
                }
            }
        }

        if order.len() < self.successors.len() {
            return Err(Error::CyclicSubgraph {
                predicate: self.predicate.to_string(),
                nodes: in_degree
                    .into_iter()
                    .filter(|(_, degree)| *degree > 0)
                    .map(|(node, _)| node.to_string())
                    .collect(),
            });
        }
        Ok(order)
    }

    /// Edges `(u, v)` for which `v` is also reachable from `u` through another
    /// successor of `u`, i.e. the edges the transitive reduction drops.
    pub fn redundant_edges(&self) -> Result<BTreeSet<(Iri, Iri)>> {
        let order = self.topological_order()?;

        let mut descendants: BTreeMap<&Iri, BTreeSet<&Iri>> = BTreeMap::new();
        for &node in order.iter().rev() {
            let mut reach = BTreeSet::new();
            for next in self.successors.get(node).into_iter().flatten() {
                reach.insert(next);
                if let Some(below) = descendants.get(next) {
                    reach.extend(below.iter().copied());
                }
            }
            descendants.insert(node, reach);
        }

        let mut redundant = BTreeSet::new();
        for (from, next) in &self.successors {
            for to in next {
                let bypassed = next.iter().any(|via| {
                    via != to && descendants.get(via).is_some_and(|below| below.contains(to))
                });
                if bypassed {
                    redundant.insert((from.clone(), to.clone()));
                }
            }
        }
        Ok(redundant)
    }

    /// Minimal edge set with the same reachability. Cycles are rejected.
    pub fn transitive_reduction(&self) -> Result<Self> {
        let redundant = self.redundant_edges()?;
        let mut reduced = self.clone();
        for (from, to) in &redundant {
            if let Some(next) = reduced.successors.get_mut(from) {
                next.remove(to);
            }
        }
        Ok(reduced)
    }
}
