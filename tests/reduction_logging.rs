use std::sync::{Arc, Mutex};

use ontoseed::{
    enrichment::table::{TripleRecord, TripleTable},
    graph::GraphGenerator,
    ontology::PrefixMap,
};
use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_subscriber::{layer::Context, prelude::*, Layer, Registry};

/// Collects the message of every ERROR event.
#[derive(Clone, Default)]
struct ErrorCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl ErrorCapture {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("capture lock").clone()
    }
}

struct MessageVisitor<'a>(&'a mut Option<String>);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: Subscriber> Layer<S> for ErrorCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }
        let mut message = None;
        event.record(&mut MessageVisitor(&mut message));
        if let Some(message) = message {
            self.messages.lock().expect("capture lock").push(message);
        }
    }
}

fn t_cell_table() -> TripleTable {
    [
        ("CL:0000897", "CL:0000084"),
        ("CL:0000897", "CL:0000813"),
        ("CL:0000813", "CL:0000084"),
    ]
    .into_iter()
    .map(|(s, o)| TripleRecord {
        s: s.to_string(),
        s_label: format!("{s} label"),
        p: "rdfs:subClassOf".to_string(),
        o: o.to_string(),
        o_label: format!("{o} label"),
    })
    .collect()
}

/// Runs a reduction on the T cell graph and returns the captured errors and
/// whether the graph changed.
fn reduce_capturing(predicates: &[&str]) -> (Vec<String>, bool) {
    let capture = ErrorCapture::default();
    let subscriber = Registry::default().with(capture.clone());
    let prefixes = PrefixMap::default();
    let mut graph = GraphGenerator::generate_enrichment_graph(&t_cell_table(), &prefixes).expect("graph");
    let before = graph.clone();
    let predicates: Vec<String> = predicates.iter().map(|p| (*p).to_string()).collect();

    tracing::subscriber::with_default(subscriber, || {
        GraphGenerator::apply_transitive_reduction(&mut graph, &predicates, &prefixes).expect("reduction");
    });

    (capture.messages(), graph != before)
}

#[test]
fn absent_predicate_is_reported_once_and_graph_is_unchanged() {
    let (messages, changed) = reduce_capturing(&["rdfs:subClassOfff"]);

    assert!(!changed);
    assert_eq!(
        messages,
        vec!["The predicate 'rdfs:subClassOfff' does not exist in the graph".to_string()]
    );
}

#[test]
fn absent_predicates_are_reported_in_one_message() {
    let (messages, changed) = reduce_capturing(&["rdfs:subClassOfff", "BFO:0000050"]);

    assert!(!changed);
    assert_eq!(
        messages,
        vec!["The predicates rdfs:subClassOfff, BFO:0000050 do not exist in the graph".to_string()]
    );
}

#[test]
fn present_predicate_logs_no_error() {
    let (messages, changed) = reduce_capturing(&["rdfs:subClassOf"]);

    assert!(messages.is_empty());
    assert!(changed);
}

#[test]
fn mixed_predicates_reduce_the_valid_one_and_report_the_other() {
    let (messages, changed) = reduce_capturing(&["rdfs:subClassOf", "BFO:0000050"]);

    assert!(changed);
    assert_eq!(
        messages,
        vec!["The predicate 'BFO:0000050' does not exist in the graph".to_string()]
    );
}
