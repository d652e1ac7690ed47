use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, error};

use super::{
    model::{EnrichmentGraph, Object, Statement},
    reduction::DiGraph,
};
use crate::{
    enrichment::table::TripleTable,
    errors::Result,
    ontology::value_objects::{Iri, PrefixMap},
};

/// Outcome of [`GraphGenerator::apply_transitive_reduction`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReductionReport {
    /// Edges removed, as `(subject, predicate, object)` IRIs.
    pub removed: Vec<(String, String, String)>,
    /// Requested predicates with no fact in the graph, as given.
    pub invalid_predicates: Vec<String>,
}

/// Builds enrichment graphs from triple tables and reduces them.
pub struct GraphGenerator;

impl GraphGenerator {
    /// Creates one edge fact per row, plus a class assertion and a label fact
    /// for both ends. Repeated rows collapse.
    pub fn generate_enrichment_graph(table: &TripleTable, prefixes: &PrefixMap) -> Result<EnrichmentGraph> {
        let mut graph = EnrichmentGraph::new();
        for record in table {
            let subject = prefixes.expand(&record.s)?;
            let predicate = prefixes.expand(&record.p)?;
            let object = prefixes.expand(&record.o)?;

            graph.insert(Statement::class(subject.clone()));
            graph.insert(Statement::class(object.clone()));
            graph.insert(Statement::label(subject.clone(), record.s_label.as_str()));
            graph.insert(Statement::label(object.clone(), record.o_label.as_str()));
            graph.insert(Statement::edge(subject, predicate, object));
        }
        debug!(rows = table.len(), facts = graph.len(), "enrichment_graph_generated");
        Ok(graph)
    }

    /// Removes, for every requested predicate present in the graph, the edges
    /// implied by longer paths of that same predicate.
    ///
    /// Predicates absent from the graph are skipped and reported in a single
    /// error event. A cyclic predicate subgraph fails the whole call before any
    /// edge is removed.
    pub fn apply_transitive_reduction(
        graph: &mut EnrichmentGraph,
        predicates: &[String],
        prefixes: &PrefixMap,
    ) -> Result<ReductionReport> {
        let mut report = ReductionReport::default();
        let mut valid: Vec<Iri> = Vec::new();
        let mut seen = BTreeSet::new();

        for name in predicates {
            match prefixes.expand(name) {
                Ok(predicate) if graph.has_predicate(&predicate) => {
                    if seen.insert(predicate.clone()) {
                        valid.push(predicate);
                    }
                }
                _ => report.invalid_predicates.push(name.clone()),
            }
        }

        match report.invalid_predicates.as_slice() {
            [] => {}
            [single] => {
                error!(predicate = %single, "The predicate '{single}' does not exist in the graph");
            }
            many => {
                let joined = many.join(", ");
                error!(predicates = %joined, "The predicates {joined} do not exist in the graph");
            }
        }

        let mut redundant: Vec<Statement> = Vec::new();
        for predicate in &valid {
            let subgraph = DiGraph::from_edges(predicate.clone(), graph.edges_for(predicate));
            let edges = subgraph.redundant_edges()?;
            debug!(
                predicate = subgraph.label(),
                edges = subgraph.edge_count(),
                redundant = edges.len(),
                "predicate_subgraph_reduced"
            );
            redundant.extend(
                edges
                    .into_iter()
                    .map(|(from, to)| Statement::edge(from, predicate.clone(), to)),
            );
        }

        for statement in redundant {
            if graph.remove(&statement) {
                if let Object::Node(object) = &statement.object {
                    report.removed.push((
                        statement.subject.to_string(),
                        statement.predicate.to_string(),
                        object.to_string(),
                    ));
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::GraphGenerator;
    use crate::{
        enrichment::table::{TripleRecord, TripleTable},
        graph::model::Statement,
        ontology::value_objects::{Iri, PrefixMap},
    };

    fn record(s: &str, o: &str) -> TripleRecord {
        TripleRecord {
            s: s.to_string(),
            s_label: format!("{s} label"),
            p: "rdfs:subClassOf".to_string(),
            o: o.to_string(),
            o_label: format!("{o} label"),
        }
    }

    fn cl(local: &str) -> Iri {
        Iri::new(format!("http://purl.obolibrary.org/obo/CL_{local}")).expect("iri")
    }

    fn sub_class_of() -> Iri {
        Iri::new("http://www.w3.org/2000/01/rdf-schema#subClassOf").expect("iri")
    }

    #[test]
    fn repeated_rows_yield_one_fact_each() {
        let table = TripleTable::from_records(vec![
            record("CL:0000813", "CL:0000084"),
            record("CL:0000813", "CL:0000084"),
        ]);
        let graph =
            GraphGenerator::generate_enrichment_graph(&table, &PrefixMap::default()).expect("graph");

        // one edge, two labels, two class assertions
        assert_eq!(graph.len(), 5);
        assert!(graph.contains(&Statement::edge(cl("0000813"), sub_class_of(), cl("0000084"))));
        assert_eq!(graph.labels(&cl("0000084")), vec!["CL:0000084 label"]);
    }

    #[test]
    fn duplicate_predicates_are_reduced_once() {
        let table = TripleTable::from_records(vec![
            record("CL:0000897", "CL:0000084"),
            record("CL:0000897", "CL:0000813"),
            record("CL:0000813", "CL:0000084"),
        ]);
        let prefixes = PrefixMap::default();
        let mut graph = GraphGenerator::generate_enrichment_graph(&table, &prefixes).expect("graph");

        let report = GraphGenerator::apply_transitive_reduction(
            &mut graph,
            &["rdfs:subClassOf".to_string(), "rdfs:subClassOf".to_string()],
            &prefixes,
        )
        .expect("reduced");

        assert_eq!(report.removed.len(), 1);
        assert!(report.invalid_predicates.is_empty());
        assert!(!graph.contains(&Statement::edge(cl("0000897"), sub_class_of(), cl("0000084"))));
    }
}
