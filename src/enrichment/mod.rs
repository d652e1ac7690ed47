//! Enrichment of a validated seed list with relationships from the ontology
//! service.
//!
//! Every enrichment mode follows the same shape: pick an object set, query
//! edges from the seeds to each chunk of objects, sort the rows by subject,
//! then build the enrichment graph from a mirror query over the object set and
//! reduce it on the predicates found in the table.

pub mod table;

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use serde::Serialize;
use tracing::{debug, info, warn};

use self::table::{SynonymKind, SynonymRecord, SynonymTable, TripleRecord, TripleTable};
use crate::{
    config::QuerySettings,
    errors::{Error, Result, SeedListIssue},
    graph::{EnrichmentGraph, GraphGenerator, Object, ReductionReport},
    ontology::{value_objects::PrefixMap, SlimLookup, Term, TermValidator},
    sparql::{
        fetch, queries, run_query,
        rows::{ExpandedTripleRow, MemberRow, SynonymRow, TripleRow, SYNONYM_VARIABLES},
        ClientHandle,
    },
};

/// How a [`Query`] is built.
#[derive(Clone, Debug)]
pub struct QueryOptions {
    /// Relationships queried by the enrichment modes.
    pub properties: Vec<String>,
    /// Fail on invalid or obsoleted seeds instead of warning.
    pub strict: bool,
    pub settings: QuerySettings,
}

impl Default for QueryOptions {
    fn default() -> Self {
        let settings = QuerySettings::default();
        Self {
            properties: settings.default_predicates.clone(),
            strict: false,
            settings,
        }
    }
}

impl QueryOptions {
    /// Options taking their batching and predicates from configuration.
    #[must_use]
    pub fn from_settings(settings: QuerySettings) -> Self {
        Self {
            properties: settings.default_predicates.clone(),
            strict: false,
            settings,
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Vec<String>) -> Self {
        if !properties.is_empty() {
            self.properties = properties;
        }
        self
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Result of one enrichment call.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Enrichment {
    /// Seed-to-object rows, sorted by subject.
    pub table: TripleTable,
    /// All-pairs rows over the object set the graph was built from.
    pub mirror: TripleTable,
    #[serde(skip)]
    pub graph: EnrichmentGraph,
    pub report: ReductionReport,
    #[serde(skip)]
    prefixes: PrefixMap,
}

impl Enrichment {
    fn empty(prefixes: PrefixMap) -> Self {
        Self {
            prefixes,
            ..Self::default()
        }
    }

    /// Rows of [`Enrichment::table`] minus those whose edge the reduction
    /// removed from the graph.
    #[must_use]
    pub fn non_redundant_table(&self) -> TripleTable {
        let removed: BTreeSet<(&str, &str, &str)> = self
            .report
            .removed
            .iter()
            .map(|(s, p, o)| (s.as_str(), p.as_str(), o.as_str()))
            .collect();
        self.table
            .iter()
            .filter(|record| {
                match (
                    self.prefixes.expand(&record.s),
                    self.prefixes.expand(&record.p),
                    self.prefixes.expand(&record.o),
                ) {
                    (Ok(s), Ok(p), Ok(o)) => !removed.contains(&(s.as_str(), p.as_str(), o.as_str())),
                    _ => true,
                }
            })
            .cloned()
            .collect()
    }

    /// Graph edges as `(subject, predicate, object)` CURIEs where possible.
    #[must_use]
    pub fn graph_edges(&self) -> Vec<(String, String, String)> {
        let compact = |iri: &str| self.prefixes.compact(iri).unwrap_or_else(|| iri.to_string());
        self.graph
            .iter()
            .filter(|s| s.predicate.as_str() != oxrdf::vocab::rdf::TYPE.as_str())
            .filter_map(|s| match &s.object {
                Object::Node(object) => Some((
                    compact(s.subject.as_str()),
                    compact(s.predicate.as_str()),
                    compact(object.as_str()),
                )),
                Object::Label(_) => None,
            })
            .collect()
    }
}

/// Enrichment queries over a validated seed list.
pub struct Query {
    client: Arc<ClientHandle>,
    slims: SlimLookup,
    terms: Vec<Term>,
    properties: Vec<String>,
    settings: QuerySettings,
}

impl Query {
    /// Validates `seeds` and prepares the query.
    ///
    /// Invalid or obsoleted seeds are logged as a warning. With
    /// [`QueryOptions::strict`] they fail with [`Error::SeedList`] before any
    /// enrichment query is sent.
    pub async fn new(client: Arc<ClientHandle>, seeds: &[String], options: QueryOptions) -> Result<Self> {
        let validator = TermValidator::new(Arc::clone(&client)).with_chunk_size(options.settings.chunk_size);
        let terms = validator.construct_terms(seeds).await?;

        match TermValidator::validation_report(&terms) {
            Ok(()) => {}
            Err(err @ (Error::InvalidTerm(_) | Error::ObsoletedTerm(_))) => {
                warn!(err.msg = %err, "seed_list_validation_failed");
                if options.strict {
                    let issue = if matches!(err, Error::InvalidTerm(_)) {
                        SeedListIssue::InvalidTerms
                    } else {
                        SeedListIssue::ObsoletedTerms
                    };
                    return Err(Error::SeedList(issue));
                }
            }
            Err(err) => return Err(err),
        }

        Ok(Self {
            slims: SlimLookup::new(Arc::clone(&client)),
            client,
            terms,
            properties: options.properties,
            settings: options.settings,
        })
    }

    /// Seed terms in input order.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    #[must_use]
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    /// Replaces every obsoleted seed with its successor.
    pub fn update_obsoleted_terms(&mut self) {
        self.terms.iter_mut().for_each(Term::update_obsoleted_term);
    }

    fn prefixes(&self) -> PrefixMap {
        self.client.prefix_map().clone()
    }

    /// CURIEs of the valid seeds.
    fn sources(&self) -> Vec<String> {
        distinct(self.terms.iter().filter(|t| t.is_valid()).map(|t| t.iri().to_string()))
    }

    /// Edges among the seeds themselves.
    pub async fn simple_enrichment(&self) -> Result<Enrichment> {
        let sources = self.sources();
        if sources.is_empty() {
            return Ok(Enrichment::empty(self.prefixes()));
        }
        let rows: Vec<TripleRow> = fetch(
            self.client.as_ref(),
            &queries::simple_enrichment_query(&sources, &sources, &self.properties),
        )
        .await?;
        let table: TripleTable = rows.into_iter().map(TripleRecord::from).collect();
        self.finish("simple", table, &sources).await
    }

    /// Edges from the seeds to the seeds and the members of `slims`.
    pub async fn minimal_slim_enrichment(&self, slims: &[String]) -> Result<Enrichment> {
        let sources = self.sources();
        if sources.is_empty() {
            return Ok(Enrichment::empty(self.prefixes()));
        }
        let members = self.slims.slim_members(slims).await?;
        let objects = distinct(sources.iter().cloned().chain(members));
        let table = self.chunked_enrichment(&sources, &objects).await?;
        self.finish("minimal_slim", table, &objects).await
    }

    /// Like [`Query::minimal_slim_enrichment`], following `subClassOf` paths
    /// and reporting the intermediate classes as objects.
    pub async fn full_slim_enrichment(&self, slims: &[String]) -> Result<Enrichment> {
        let sources = self.sources();
        if sources.is_empty() {
            return Ok(Enrichment::empty(self.prefixes()));
        }
        let members = self.slims.slim_members(slims).await?;
        let objects = distinct(sources.iter().cloned().chain(members));

        let mut table = TripleTable::new();
        for (index, chunk) in objects.chunks(self.settings.chunk_size.max(1)).enumerate() {
            debug!(chunk = index, size = chunk.len(), "full_enrichment_chunk");
            let rows: Vec<ExpandedTripleRow> = fetch(
                self.client.as_ref(),
                &queries::full_enrichment_query(&sources, chunk),
            )
            .await?;
            table.extend(rows.into_iter().map(TripleRecord::from));
        }
        self.finish("full_slim", table, &objects).await
    }

    /// Edges from the seeds to the seeds and to every cell type that is part
    /// of one of the `context` terms.
    pub async fn contextual_slim_enrichment(&self, context: &[String]) -> Result<Enrichment> {
        let sources = self.sources();
        if sources.is_empty() {
            return Ok(Enrichment::empty(self.prefixes()));
        }
        let members: Vec<MemberRow> = if context.is_empty() {
            Vec::new()
        } else {
            fetch(self.client.as_ref(), &queries::contextual_members_query(context)).await?
        };
        let objects = distinct(sources.iter().cloned().chain(members.into_iter().map(|m| m.term)));
        let table = self.chunked_enrichment(&sources, &objects).await?;
        self.finish("contextual_slim", table, &objects).await
    }

    /// Edges from the seeds to every superclass at most `hops` steps above them.
    pub async fn ancestor_enrichment(&self, hops: usize) -> Result<Enrichment> {
        let sources = self.sources();
        if sources.is_empty() {
            return Ok(Enrichment::empty(self.prefixes()));
        }
        let rows = run_query(self.client.as_ref(), &queries::ancestor_query(&sources, hops)).await?;
        let objects = distinct(rows.iter().flat_map(|row| row.values().map(str::to_string)));
        let table = self.chunked_enrichment(&sources, &objects).await?;
        self.finish("ancestor", table, &objects).await
    }

    /// Ancestor enrichment limited to direct parents.
    pub async fn parent_enrichment(&self) -> Result<Enrichment> {
        self.ancestor_enrichment(1).await
    }

    /// Synonyms of every seed, one row per `(term, synonym, kind)`.
    pub async fn synonym_lookup(&self) -> Result<SynonymTable> {
        let labels: BTreeMap<&str, Option<&str>> = self
            .terms
            .iter()
            .map(|term| (term.iri(), term.label()))
            .collect();
        let ids: Vec<String> = distinct(self.terms.iter().map(|t| t.iri().to_string()));
        if ids.is_empty() {
            return Ok(SynonymTable::default());
        }

        let rows: Vec<SynonymRow> =
            fetch(self.client.as_ref(), &queries::synonym_query(&ids)).await?;

        let mut records = Vec::new();
        for variable in SYNONYM_VARIABLES {
            let Some(kind) = SynonymKind::from_variable(variable) else {
                continue;
            };
            for row in &rows {
                for (_, name) in row.synonyms.iter().filter(|(bound, _)| *bound == variable) {
                    records.push(SynonymRecord {
                        id: row.s.clone(),
                        label: labels
                            .get(row.s.as_str())
                            .copied()
                            .flatten()
                            .map(str::to_string),
                        name: name.clone(),
                        kind,
                    });
                }
            }
        }

        let table = SynonymTable::from_records(records).sorted_by_id();
        info!(rows = table.len(), "synonym_lookup_completed");
        Ok(table)
    }

    /// Filtering enriched rows by column has no defined matching rules yet.
    pub fn filter(&self, _column: &str, _term: &str) -> Result<TripleTable> {
        Err(Error::Unsupported("filtering enrichment results"))
    }

    /// All-pairs edges among `terms`, chunked on both axes.
    pub async fn mirror_enrichment(&self, terms: &[String]) -> Result<TripleTable> {
        let size = self.settings.mirror_chunk_size.max(1);
        let mut table = TripleTable::new();
        for subjects in terms.chunks(size) {
            for objects in terms.chunks(size) {
                let rows: Vec<TripleRow> = fetch(
                    self.client.as_ref(),
                    &queries::simple_enrichment_query(subjects, objects, &self.properties),
                )
                .await?;
                table.extend(rows.into_iter().map(TripleRecord::from));
            }
        }
        Ok(table.sorted_by_subject())
    }

    async fn chunked_enrichment(&self, sources: &[String], objects: &[String]) -> Result<TripleTable> {
        let mut table = TripleTable::new();
        for (index, chunk) in objects.chunks(self.settings.chunk_size.max(1)).enumerate() {
            debug!(chunk = index, size = chunk.len(), "enrichment_chunk");
            let rows: Vec<TripleRow> = fetch(
                self.client.as_ref(),
                &queries::simple_enrichment_query(sources, chunk, &self.properties),
            )
            .await?;
            table.extend(rows.into_iter().map(TripleRecord::from));
        }
        Ok(table)
    }

    /// Sorts the table, builds the graph from the mirror query over `objects`
    /// and reduces it on the predicates the table uses.
    async fn finish(&self, mode: &str, table: TripleTable, objects: &[String]) -> Result<Enrichment> {
        let prefixes = self.prefixes();
        let table = table.sorted_by_subject();
        if objects.is_empty() {
            info!(mode, rows = table.len(), "enrichment_completed");
            return Ok(Enrichment {
                table,
                ..Enrichment::empty(prefixes)
            });
        }

        let mirror = self.mirror_enrichment(objects).await?;
        let mut graph = GraphGenerator::generate_enrichment_graph(&mirror, &prefixes)?;
        let predicates = distinct(table.iter().map(|record| record.p.clone()));
        let report = GraphGenerator::apply_transitive_reduction(&mut graph, &predicates, &prefixes)?;

        info!(
            mode,
            rows = table.len(),
            mirror_rows = mirror.len(),
            removed = report.removed.len(),
            "enrichment_completed"
        );
        Ok(Enrichment {
            table,
            mirror,
            graph,
            report,
            prefixes,
        })
    }
}

/// Drops repeated values, keeping first occurrences in order.
fn distinct<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = BTreeSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{Query, QueryOptions};
    use crate::{
        errors::{Error, SeedListIssue},
        sparql::QueryRow,
        testing::{values_of, ScriptedClient},
    };

    fn label_rows(query: &str, known: &[&str]) -> Vec<QueryRow> {
        values_of(query, "term")
            .into_iter()
            .filter(|curie| known.contains(&curie.as_str()))
            .map(|curie| QueryRow::from_pairs([("term", curie.clone()), ("label", format!("{curie} label"))]))
            .collect()
    }

    fn seeds(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| (*item).to_string()).collect()
    }

    #[tokio::test]
    async fn strict_mode_rejects_invalid_seeds_before_enrichment() {
        let client = Arc::new(ScriptedClient::from_fn(|query| label_rows(query, &["CL:0000084"])));

        let err = Query::new(
            client.clone(),
            &seeds(&["CL:0000084", "CL:1234567"]),
            QueryOptions::default().strict(true),
        )
        .await
        .err()
        .expect("strict failure");

        assert!(matches!(err, Error::SeedList(SeedListIssue::InvalidTerms)));
        assert!(client
            .recorded()
            .iter()
            .all(|call| !call.query.contains("reasoner.renci.org")));
    }

    #[tokio::test]
    async fn lenient_mode_keeps_going_with_valid_seeds() {
        let client = Arc::new(ScriptedClient::from_fn(|query| label_rows(query, &["CL:0000084"])));

        let query = Query::new(client, &seeds(&["CL:0000084", "CL:1234567"]), QueryOptions::default())
            .await
            .expect("lenient");

        assert_eq!(query.terms().len(), 2);
        assert!(!query.terms()[1].is_valid());
    }

    #[tokio::test]
    async fn strict_mode_flags_obsoleted_seeds() {
        let client = Arc::new(ScriptedClient::from_fn(|query| {
            if query.contains("IAO:0100001") {
                return vec![QueryRow::from_pairs([
                    ("term", "CL:0011107"),
                    ("label", "obsolete Muller cell"),
                    ("depr_status", "true"),
                    ("new_term", "CL:0000636"),
                    ("new_term_label", "Mueller cell"),
                ])];
            }
            label_rows(query, &["CL:0011107"])
        }));

        let err = Query::new(client, &seeds(&["CL:0011107"]), QueryOptions::default().strict(true))
            .await
            .err()
            .expect("strict failure");
        assert!(matches!(err, Error::SeedList(SeedListIssue::ObsoletedTerms)));
    }

    #[tokio::test]
    async fn updating_obsoleted_terms_swaps_in_successors() {
        let client = Arc::new(ScriptedClient::from_fn(|query| {
            if query.contains("IAO:0100001") {
                return vec![QueryRow::from_pairs([
                    ("term", "CL:0011107"),
                    ("label", "obsolete Muller cell"),
                    ("depr_status", "true"),
                    ("new_term", "CL:0000636"),
                    ("new_term_label", "Mueller cell"),
                ])];
            }
            label_rows(query, &["CL:0011107"])
        }));
        let mut query = Query::new(client, &seeds(&["CL:0011107"]), QueryOptions::default())
            .await
            .expect("lenient");

        query.update_obsoleted_terms();

        assert_eq!(query.terms()[0].iri(), "CL:0000636");
        assert!(!query.terms()[0].is_obsolete());
    }

    #[tokio::test]
    async fn mirror_query_is_chunked_on_both_axes() {
        let client = Arc::new(ScriptedClient::from_fn(|query| label_rows(query, &["CL:1", "CL:2", "CL:3"])));
        let mut options = QueryOptions::default();
        options.settings.mirror_chunk_size = 2;
        let query = Query::new(client.clone(), &seeds(&["CL:1", "CL:2", "CL:3"]), options)
            .await
            .expect("query");
        let before = client.call_count();

        query
            .mirror_enrichment(&seeds(&["CL:1", "CL:2", "CL:3"]))
            .await
            .expect("mirror");

        let calls = client.recorded();
        assert_eq!(calls.len() - before, 4);
        assert_eq!(values_of(&calls[before].query, "s"), vec!["CL:1", "CL:2"]);
        assert_eq!(values_of(&calls[before + 1].query, "o"), vec!["CL:3"]);
    }

    #[tokio::test]
    async fn filtering_is_unsupported() {
        let client = Arc::new(ScriptedClient::from_fn(|query| label_rows(query, &["CL:0000084"])));
        let query = Query::new(client, &seeds(&["CL:0000084"]), QueryOptions::default())
            .await
            .expect("query");
        assert!(matches!(query.filter("o_label", "T cell"), Err(Error::Unsupported(_))));
    }
}
