use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    errors::{Error, Result},
    ontology::entities::Term,
    sparql::{
        fetch, queries,
        rows::{LabelRow, ReplacementRow},
        ClientHandle,
    },
};

/// Default number of CURIEs sent in one `VALUES` block.
pub const DEFAULT_CHUNK_SIZE: usize = 90;

/// Existence and label of one CURIE.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CurieValidation {
    pub label: Option<String>,
    pub valid: bool,
}

/// Deprecation record of one CURIE.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ObsoleteRecord {
    pub new_iri: Option<String>,
    pub new_label: Option<String>,
    pub deprecation_status: Option<String>,
}

/// Checks seed CURIEs against the ontology service and builds [`Term`]s.
#[derive(Clone)]
pub struct TermValidator {
    client: Arc<ClientHandle>,
    chunk_size: usize,
}

impl TermValidator {
    pub fn new(client: Arc<ClientHandle>) -> Self {
        Self {
            client,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Overrides the batch size. Zero is treated as one.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Looks up every CURIE, returning exactly one entry per distinct input.
    ///
    /// CURIEs the service does not know are reported invalid with no label.
    pub async fn validate(&self, curies: &[String]) -> Result<BTreeMap<String, CurieValidation>> {
        let unique = distinct(curies);
        let mut found: BTreeMap<String, Option<String>> = BTreeMap::new();

        for (index, chunk) in unique.chunks(self.chunk_size).enumerate() {
            debug!(chunk = index, size = chunk.len(), "term_validation_chunk");
            let rows: Vec<LabelRow> =
                fetch(self.client.as_ref(), &queries::label_query(chunk)).await?;
            for row in rows {
                if !chunk.contains(&row.term) {
                    continue;
                }
                let label = found.entry(row.term).or_insert(None);
                if label.is_none() {
                    *label = row.label;
                }
            }
        }

        let report: BTreeMap<_, _> = unique
            .into_iter()
            .map(|curie| {
                let validation = match found.remove(&curie) {
                    Some(label) => CurieValidation { label, valid: true },
                    None => CurieValidation {
                        label: None,
                        valid: false,
                    },
                };
                (curie, validation)
            })
            .collect();

        info!(
            terms = report.len(),
            invalid = report.values().filter(|v| !v.valid).count(),
            "term_validation_completed"
        );
        Ok(report)
    }

    /// Finds deprecated CURIEs and their successors. CURIEs without a
    /// deprecation record are absent from the result.
    pub async fn find_obsolete(&self, curies: &[String]) -> Result<BTreeMap<String, ObsoleteRecord>> {
        let unique = distinct(curies);
        let mut records = BTreeMap::new();

        for (index, chunk) in unique.chunks(self.chunk_size).enumerate() {
            debug!(chunk = index, size = chunk.len(), "obsolete_lookup_chunk");
            let rows: Vec<ReplacementRow> =
                fetch(self.client.as_ref(), &queries::replaced_by_query(chunk)).await?;
            for row in rows {
                if !chunk.contains(&row.term) {
                    continue;
                }
                records.entry(row.term).or_insert(ObsoleteRecord {
                    new_iri: row.new_term,
                    new_label: row.new_term_label,
                    deprecation_status: row.deprecation_status,
                });
            }
        }

        Ok(records)
    }

    /// Builds one [`Term`] per input CURIE, in input order.
    ///
    /// Only valid CURIEs are checked for deprecation.
    pub async fn construct_terms(&self, curies: &[String]) -> Result<Vec<Term>> {
        let validation = self.validate(curies).await?;
        let valid: Vec<String> = validation
            .iter()
            .filter(|(_, v)| v.valid)
            .map(|(curie, _)| curie.clone())
            .collect();
        let obsolete = if valid.is_empty() {
            BTreeMap::new()
        } else {
            self.find_obsolete(&valid).await?
        };

        Ok(curies
            .iter()
            .map(|curie| {
                let (label, is_valid) = validation
                    .get(curie)
                    .map_or((None, false), |v| (v.label.clone(), v.valid));
                match obsolete.get(curie).cloned() {
                    Some(record) => Term::with_replacement(
                        label,
                        curie.as_str(),
                        is_valid,
                        record.new_label,
                        record.new_iri,
                    ),
                    None => Term::new(label, curie.as_str(), is_valid),
                }
            })
            .collect())
    }

    /// Fails with [`Error::InvalidTerm`] if any term is invalid, otherwise
    /// with [`Error::ObsoletedTerm`] if any term is obsolete.
    pub fn validation_report(terms: &[Term]) -> Result<()> {
        let invalid: Vec<Term> = terms.iter().filter(|t| !t.is_valid()).cloned().collect();
        if !invalid.is_empty() {
            return Err(Error::InvalidTerm(invalid));
        }
        let obsoleted: Vec<Term> = terms.iter().filter(|t| t.is_obsolete()).cloned().collect();
        if !obsoleted.is_empty() {
            return Err(Error::ObsoletedTerm(obsoleted));
        }
        Ok(())
    }

    pub fn validate_curie_prefixes(&self, _curies: &[String]) -> Result<()> {
        Err(Error::Unsupported("CURIE prefix validation"))
    }

    pub fn suggest_replacements(&self, _term: &Term) -> Result<Vec<Term>> {
        Err(Error::Unsupported("replacement suggestion"))
    }
}

/// Drops repeated CURIEs, keeping first occurrences in order.
fn distinct(curies: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    curies
        .iter()
        .filter(|curie| seen.insert(curie.as_str()))
        .cloned()
        .collect()
}
