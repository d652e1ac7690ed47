//! Contract for the remote ontology query service.
//!
//! Components never talk to the endpoint directly: they receive an
//! [`Arc<ClientHandle>`] and go through [`run_query`] / [`fetch`], which derive
//! the prefixes a query references before dispatching it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::ontology::value_objects::PrefixMap;

pub mod http;
pub mod queries;
pub mod rows;

pub use rows::FromQueryRow;

/// Type alias simplifying client trait object usage inside the services.
pub type ClientHandle = dyn SparqlClient + Send + Sync + 'static;

/// One solution of a `SELECT` query.
///
/// Unbound optional variables are simply absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryRow {
    bindings: BTreeMap<String, String>,
}

impl QueryRow {
    /// Builds a row from `(variable, value)` pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            bindings: pairs
                .into_iter()
                .map(|(variable, value)| (variable.into(), value.into()))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.bindings.get(variable).map(String::as_str)
    }

    /// Returns a bound value as an owned string.
    #[must_use]
    pub fn owned(&self, variable: &str) -> Option<String> {
        self.get(variable).map(str::to_string)
    }

    /// Iterates over every bound value.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.bindings.values().map(String::as_str)
    }
}

/// Errors surfaced by query service adapters.
#[derive(Debug, Error)]
pub enum SparqlError {
    /// Building or sending the request failed.
    #[error("query transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("query endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The response body was not a SPARQL JSON result document.
    #[error("malformed query response: {0}")]
    Decode(String),
    /// A scripted or in-process client had nothing to answer with.
    #[error("query service unavailable: {0}")]
    Unavailable(String),
}

/// Contract implemented by ontology query services.
#[async_trait]
pub trait SparqlClient: Send + Sync {
    /// Prefixes the service understands.
    fn prefix_map(&self) -> &PrefixMap;

    /// Executes a `SELECT` query.
    ///
    /// `prefixes` lists the registered prefixes the query text references;
    /// implementors declare them before sending the query.
    async fn select(&self, query: &str, prefixes: &[String]) -> Result<Vec<QueryRow>, SparqlError>;
}

/// Runs a query after deriving the prefixes it references.
pub async fn run_query(client: &ClientHandle, query: &str) -> Result<Vec<QueryRow>, SparqlError> {
    let prefixes = client.prefix_map().referenced_in(query);
    debug!(prefixes = ?prefixes, query_len = query.len(), "sparql_select");
    client.select(query, &prefixes).await
}

/// Runs a query and decodes the rows into a typed shape, skipping rows that
/// lack the variables the shape requires.
pub async fn fetch<T>(client: &ClientHandle, query: &str) -> Result<Vec<T>, SparqlError>
where
    T: FromQueryRow,
{
    let rows = run_query(client, query).await?;
    Ok(rows.iter().filter_map(T::from_row).collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{fetch, run_query, rows::LabelRow, ClientHandle, QueryRow};
    use crate::testing::ScriptedClient;

    #[tokio::test]
    async fn run_query_forwards_referenced_prefixes() {
        let client = Arc::new(ScriptedClient::queued(vec![vec![]]));
        let handle: Arc<ClientHandle> = client.clone();

        run_query(handle.as_ref(), "SELECT ?t WHERE { ?t rdfs:label ?l VALUES ?t { CL:0000084 } }")
            .await
            .expect("query");

        let recorded = client.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].prefixes, vec!["CL", "rdfs"]);
    }

    #[tokio::test]
    async fn fetch_skips_rows_missing_required_variables() {
        let client: Arc<ClientHandle> = Arc::new(ScriptedClient::queued(vec![vec![
            QueryRow::from_pairs([("term", "CL:0000084"), ("label", "T cell")]),
            QueryRow::from_pairs([("label", "orphan label")]),
            QueryRow::from_pairs([("term", "CL:0000787")]),
        ]]));

        let rows: Vec<LabelRow> = fetch(client.as_ref(), "SELECT ?term ?label WHERE {}")
            .await
            .expect("fetch");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label.as_deref(), Some("T cell"));
        assert_eq!(rows[1].term, "CL:0000787");
        assert!(rows[1].label.is_none());
    }
}
