//! HTTP adapter speaking the SPARQL 1.1 protocol.

use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::debug;

use super::{QueryRow, SparqlClient, SparqlError};
use crate::{config::SparqlSettings, ontology::value_objects::PrefixMap};

const RESULTS_JSON: &str = "application/sparql-results+json";

/// Query service reached over HTTP, such as the public Ubergraph endpoint.
pub struct HttpSparqlClient {
    client: Client,
    endpoint: String,
    prefixes: PrefixMap,
}

impl HttpSparqlClient {
    /// Builds the adapter from the `sparql` configuration section.
    pub fn try_new(settings: &SparqlSettings) -> Result<Self, SparqlError> {
        if settings.endpoint.trim().is_empty() {
            return Err(SparqlError::Unavailable(
                "`sparql.endpoint` must be provided".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            prefixes: settings.prefix_map(),
        })
    }
}

#[async_trait]
impl SparqlClient for HttpSparqlClient {
    fn prefix_map(&self) -> &PrefixMap {
        &self.prefixes
    }

    async fn select(&self, query: &str, prefixes: &[String]) -> Result<Vec<QueryRow>, SparqlError> {
        let text = format!("{}{query}", self.prefixes.declarations(prefixes));
        let response = self
            .client
            .post(&self.endpoint)
            .header(header::ACCEPT, RESULTS_JSON)
            .form(&[("query", text.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SparqlError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let rows = decode_results(&body, &self.prefixes)?;
        debug!(endpoint = %self.endpoint, rows = rows.len(), "sparql_response");
        Ok(rows)
    }
}

#[derive(Deserialize)]
struct ResultsDocument {
    results: ResultSet,
}

#[derive(Deserialize)]
struct ResultSet {
    bindings: Vec<BTreeMap<String, Binding>>,
}

#[derive(Deserialize)]
struct Binding {
    #[serde(rename = "type")]
    kind: String,
    value: String,
}

/// Decodes a `application/sparql-results+json` document, contracting IRIs the
/// prefix map knows into CURIEs.
pub(crate) fn decode_results(body: &str, prefixes: &PrefixMap) -> Result<Vec<QueryRow>, SparqlError> {
    let document: ResultsDocument =
        serde_json::from_str(body).map_err(|err| SparqlError::Decode(err.to_string()))?;

    Ok(document
        .results
        .bindings
        .into_iter()
        .map(|solution| {
            QueryRow::from_pairs(solution.into_iter().map(|(variable, binding)| {
                let value = if binding.kind == "uri" {
                    prefixes.compact(&binding.value).unwrap_or(binding.value)
                } else {
                    binding.value
                };
                (variable, value)
            }))
        })
        .collect())
}
