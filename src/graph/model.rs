use std::collections::BTreeSet;

use oxrdf::{vocab, Literal, NamedNode, Triple};

use crate::ontology::value_objects::Iri;

/// Object position of a [`Statement`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Object {
    Node(Iri),
    Label(String),
}

/// One fact of the enrichment graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Statement {
    pub subject: Iri,
    pub predicate: Iri,
    pub object: Object,
}

impl Statement {
    #[must_use]
    pub fn edge(subject: Iri, predicate: Iri, object: Iri) -> Self {
        Self {
            subject,
            predicate,
            object: Object::Node(object),
        }
    }

    #[must_use]
    pub fn label(subject: Iri, label: impl Into<String>) -> Self {
        Self {
            subject,
            predicate: Iri::from(vocab::rdfs::LABEL),
            object: Object::Label(label.into()),
        }
    }

    /// `subject rdf:type owl:Class`.
    #[must_use]
    pub fn class(subject: Iri) -> Self {
        Self::edge(
            subject,
            Iri::from(vocab::rdf::TYPE),
            Iri::from(oxrdf::NamedNodeRef::new_unchecked(OWL_CLASS)),
        )
    }

    fn is_class_assertion(&self) -> bool {
        self.predicate.as_str() == vocab::rdf::TYPE.as_str()
            && matches!(&self.object, Object::Node(node) if node.as_str() == OWL_CLASS)
    }
}

const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";

/// Set of facts derived from an enrichment table: relationship edges, one
/// label fact per distinct node label and a class assertion per node.
///
/// Inserting a fact twice has no effect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnrichmentGraph {
    statements: BTreeSet<Statement>,
}

impl EnrichmentGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fact, returning `false` when it was already present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        self.statements.insert(statement)
    }

    /// Removes a fact, returning `false` when it was absent.
    pub fn remove(&mut self, statement: &Statement) -> bool {
        self.statements.remove(statement)
    }

    #[must_use]
    pub fn contains(&self, statement: &Statement) -> bool {
        self.statements.contains(statement)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    /// Whether any fact uses `predicate`.
    #[must_use]
    pub fn has_predicate(&self, predicate: &Iri) -> bool {
        self.statements.iter().any(|s| &s.predicate == predicate)
    }

    /// Node-to-node edges carrying `predicate`, class assertions excluded.
    #[must_use]
    pub fn edges_for(&self, predicate: &Iri) -> Vec<(Iri, Iri)> {
        self.statements
            .iter()
            .filter(|s| &s.predicate == predicate && !s.is_class_assertion())
            .filter_map(|s| match &s.object {
                Object::Node(object) => Some((s.subject.clone(), object.clone())),
                Object::Label(_) => None,
            })
            .collect()
    }

    /// Labels attached to `node`.
    #[must_use]
    pub fn labels(&self, node: &Iri) -> Vec<&str> {
        self.statements
            .iter()
            .filter(|s| &s.subject == node && s.predicate.as_str() == vocab::rdfs::LABEL.as_str())
            .filter_map(|s| match &s.object {
                Object::Label(label) => Some(label.as_str()),
                Object::Node(_) => None,
            })
            .collect()
    }

    /// Every node that carries a class assertion.
    #[must_use]
    pub fn nodes(&self) -> BTreeSet<&Iri> {
        self.statements
            .iter()
            .filter(|s| s.is_class_assertion())
            .map(|s| &s.subject)
            .collect()
    }

    /// Copies the facts into an `oxrdf` graph for serialisation.
    #[must_use]
    pub fn to_rdf_graph(&self) -> oxrdf::Graph {
        let mut graph = oxrdf::Graph::default();
        for statement in &self.statements {
            let subject: NamedNode = statement.subject.to_named_node();
            let predicate: NamedNode = statement.predicate.to_named_node();
            let triple = match &statement.object {
                Object::Node(object) => Triple::new(subject, predicate, object.to_named_node()),
                Object::Label(label) => {
                    Triple::new(subject, predicate, Literal::new_simple_literal(label.clone()))
                }
            };
            graph.insert(&triple);
        }
        graph
    }
}
