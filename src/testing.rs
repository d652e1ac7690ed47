//! In-memory query collaborator for tests.
//!
//! Available to unit tests and, through the `testing` feature, to integration
//! tests and downstream crates.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;

use crate::{
    ontology::value_objects::PrefixMap,
    sparql::{QueryRow, SparqlClient, SparqlError},
};

type Responder = Box<dyn Fn(&str) -> Vec<QueryRow> + Send + Sync>;

/// Query text and derived prefixes of one recorded call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedQuery {
    pub query: String,
    pub prefixes: Vec<String>,
}

enum Script {
    Queue(Mutex<VecDeque<Vec<QueryRow>>>),
    Responder(Responder),
}

/// Fake [`SparqlClient`] answering from a queue or a closure and recording
/// every query it receives.
pub struct ScriptedClient {
    script: Script,
    prefixes: PrefixMap,
    calls: Mutex<Vec<RecordedQuery>>,
}

impl ScriptedClient {
    /// Answers successive queries with the queued result sets, in order.
    ///
    /// Once the queue is exhausted every query fails with
    /// [`SparqlError::Unavailable`].
    #[must_use]
    pub fn queued(responses: Vec<Vec<QueryRow>>) -> Self {
        Self::with_script(Script::Queue(Mutex::new(responses.into())))
    }

    /// Answers every query by calling `responder` with the query text.
    #[must_use]
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Vec<QueryRow> + Send + Sync + 'static,
    {
        Self::with_script(Script::Responder(Box::new(responder)))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            prefixes: PrefixMap::default(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the prefix map reported to callers.
    #[must_use]
    pub fn with_prefixes(mut self, prefixes: PrefixMap) -> Self {
        self.prefixes = prefixes;
        self
    }

    /// Returns every query received so far.
    #[must_use]
    pub fn recorded(&self) -> Vec<RecordedQuery> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Number of queries received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
    }
}

#[async_trait]
impl SparqlClient for ScriptedClient {
    fn prefix_map(&self) -> &PrefixMap {
        &self.prefixes
    }

    async fn select(&self, query: &str, prefixes: &[String]) -> Result<Vec<QueryRow>, SparqlError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedQuery {
                query: query.to_string(),
                prefixes: prefixes.to_vec(),
            });
        }

        match &self.script {
            Script::Responder(responder) => Ok(responder(query)),
            Script::Queue(queue) => queue
                .lock()
                .ok()
                .and_then(|mut queue| queue.pop_front())
                .ok_or_else(|| SparqlError::Unavailable("no scripted response left".to_string())),
        }
    }
}

/// Extracts the CURIEs listed in the `VALUES ?var { ... }` block of a query.
#[must_use]
pub fn values_of(query: &str, variable: &str) -> Vec<String> {
    let marker = format!("VALUES ?{variable} {{");
    query
        .find(&marker)
        .and_then(|start| {
            let rest = &query[start + marker.len()..];
            rest.find('}').map(|end| &rest[..end])
        })
        .map(|block| block.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}
