use ontoseed::{
    enrichment::table::{TripleRecord, TripleTable},
    graph::{DiGraph, GraphGenerator, Statement},
    ontology::{Iri, PrefixMap},
    Error,
};
use rstest::rstest;

fn record(s: &str, p: &str, o: &str) -> TripleRecord {
    TripleRecord {
        s: s.to_string(),
        s_label: format!("{s} label"),
        p: p.to_string(),
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

fn predicates(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

/// Deterministic DAG: edges only run from lower to higher node numbers.
fn layered_dag(nodes: usize, seed: u64) -> Vec<(usize, usize)> {
    let mut state = seed;
    let mut edges = Vec::new();
    for from in 0..nodes {
        for to in (from + 1)..nodes {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            if (state >> 33) % 3 == 0 {
                edges.push((from, to));
            }
        }
    }
    edges
}

#[test]
fn shortcut_through_memory_t_cell_is_removed() {
    let table = TripleTable::from_records(vec![
        record("CL:0000897", "rdfs:subClassOf", "CL:0000084"),
        record("CL:0000897", "rdfs:subClassOf", "CL:0000813"),
        record("CL:0000813", "rdfs:subClassOf", "CL:0000084"),
    ]);
    let prefixes = PrefixMap::default();
    let mut graph = GraphGenerator::generate_enrichment_graph(&table, &prefixes).expect("graph");

    GraphGenerator::apply_transitive_reduction(&mut graph, &predicates(&["rdfs:subClassOf"]), &prefixes)
        .expect("reduction");

    assert!(!graph.contains(&Statement::edge(cl("0000897"), sub_class_of(), cl("0000084"))));
    assert!(graph.contains(&Statement::edge(cl("0000897"), sub_class_of(), cl("0000813"))));
    assert!(graph.contains(&Statement::edge(cl("0000813"), sub_class_of(), cl("0000084"))));
    assert_eq!(graph.labels(&cl("0000084")), vec!["CL:0000084 label"]);
    assert_eq!(graph.nodes().len(), 3);
}

#[rstest]
#[case(6, 1)]
#[case(9, 7)]
#[case(12, 42)]
#[case(15, 2024)]
fn reduction_preserves_reachability_and_is_idempotent(#[case] nodes: usize, #[case] seed: u64) {
    let edges = layered_dag(nodes, seed);
    let table: TripleTable = edges
        .iter()
        .map(|(from, to)| record(&format!("CL:{from:07}"), "rdfs:subClassOf", &format!("CL:{to:07}")))
        .collect();
    let prefixes = PrefixMap::default();
    let mut graph = GraphGenerator::generate_enrichment_graph(&table, &prefixes).expect("graph");
    let before = DiGraph::from_edges(sub_class_of(), graph.edges_for(&sub_class_of()));

    GraphGenerator::apply_transitive_reduction(&mut graph, &predicates(&["rdfs:subClassOf"]), &prefixes)
        .expect("reduction");
    let after = DiGraph::from_edges(sub_class_of(), graph.edges_for(&sub_class_of()));

    for (from, _) in before.edges() {
        assert_eq!(before.reachable_from(from), after.reachable_from(from));
    }
    for (from, to) in after.edges() {
        let implied = after
            .edges()
            .filter(|(start, via)| *start == from && *via != to)
            .any(|(_, via)| after.reachable_from(via).contains(to));
        assert!(!implied, "{from} -> {to} survived although a longer path exists");
    }

    let again = GraphGenerator::apply_transitive_reduction(
        &mut graph,
        &predicates(&["rdfs:subClassOf"]),
        &prefixes,
    )
    .expect("second reduction");
    assert!(again.removed.is_empty());
}

#[test]
fn predicates_are_reduced_independently() {
    let table = TripleTable::from_records(vec![
        record("CL:0000001", "rdfs:subClassOf", "CL:0000002"),
        record("CL:0000002", "rdfs:subClassOf", "CL:0000003"),
        record("CL:0000001", "BFO:0000050", "CL:0000003"),
    ]);
    let prefixes = PrefixMap::default();
    let mut graph = GraphGenerator::generate_enrichment_graph(&table, &prefixes).expect("graph");

    let report = GraphGenerator::apply_transitive_reduction(
        &mut graph,
        &predicates(&["rdfs:subClassOf", "BFO:0000050"]),
        &prefixes,
    )
    .expect("reduction");

    assert!(report.removed.is_empty());
    let part_of = prefixes.expand("BFO:0000050").expect("iri");
    assert!(graph.contains(&Statement::edge(cl("0000001"), part_of, cl("0000003"))));
}

#[test]
fn cyclic_subgraph_fails_and_leaves_graph_untouched() {
    let table = TripleTable::from_records(vec![
        record("CL:0000001", "rdfs:subClassOf", "CL:0000002"),
        record("CL:0000002", "rdfs:subClassOf", "CL:0000001"),
        record("CL:0000001", "rdfs:subClassOf", "CL:0000003"),
        record("CL:0000002", "rdfs:subClassOf", "CL:0000003"),
    ]);
    let prefixes = PrefixMap::default();
    let mut graph = GraphGenerator::generate_enrichment_graph(&table, &prefixes).expect("graph");
    let snapshot = graph.clone();

    let err = GraphGenerator::apply_transitive_reduction(
        &mut graph,
        &predicates(&["rdfs:subClassOf"]),
        &prefixes,
    )
    .expect_err("cycle");

    assert!(matches!(err, Error::CyclicSubgraph { .. }));
    assert_eq!(graph, snapshot);
}
