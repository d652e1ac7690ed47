//! Query text for every lookup the crate performs against the ontology graph.
//!
//! CURIEs are inlined in `VALUES` blocks; callers are responsible for keeping
//! those blocks to a bounded size by chunking their input.

use crate::errors::{Error, Result};

const REDUNDANT_GRAPH: &str = "<http://reasoner.renci.org/redundant>";
const NONREDUNDANT_GRAPH: &str = "<http://reasoner.renci.org/nonredundant>";
const DC_TITLE: &str = "<http://purl.org/dc/elements/1.1/title>";

fn values(terms: &[String]) -> String {
    terms.join(" ")
}

/// Escapes a value embedded in a single-quoted SPARQL string literal.
fn literal(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Existence and label of each class, used for CURIE validation.
#[must_use]
pub fn label_query(terms: &[String]) -> String {
    format!(
        "SELECT ?term ?label WHERE {{ ?term rdf:type owl:Class. OPTIONAL {{ ?term rdfs:label ?label. }} \
         VALUES ?term {{ {} }} }}",
        values(terms)
    )
}

/// Deprecated classes together with the class that replaces them (IAO:0100001).
#[must_use]
pub fn replaced_by_query(terms: &[String]) -> String {
    format!(
        "SELECT * WHERE {{ ?term rdfs:label ?label. ?term owl:deprecated ?depr_status. \
         ?term IAO:0100001 ?new_term. ?new_term rdfs:label ?new_term_label \
         VALUES ?term {{ {} }} }}",
        values(terms)
    )
}

/// Direct or inferred edges from `subjects` to `objects` over `properties`,
/// excluding self-loops.
#[must_use]
pub fn simple_enrichment_query(subjects: &[String], objects: &[String], properties: &[String]) -> String {
    format!(
        "SELECT ?s ?s_label ?p ?o ?o_label WHERE {{ GRAPH {REDUNDANT_GRAPH} {{ \
         VALUES ?s {{ {} }} VALUES ?o {{ {} }} VALUES ?p {{ {} }} ?s ?p ?o. }} \
         ?s rdfs:label ?s_label. ?o rdfs:label ?o_label. FILTER(?s != ?o) }}",
        values(subjects),
        values(objects),
        values(properties)
    )
}

/// Paths `?s subClassOf* ?x subClassOf* ?o`, reporting the intermediate `?x`.
#[must_use]
pub fn full_enrichment_query(subjects: &[String], objects: &[String]) -> String {
    format!(
        "SELECT DISTINCT ?s ?s_label ?p ?x ?x_label ?o ?o_label WHERE {{ GRAPH {NONREDUNDANT_GRAPH} {{ \
         VALUES ?s {{ {} }} VALUES ?o {{ {} }} ?s rdfs:subClassOf* ?x. ?x rdfs:subClassOf* ?o. \
         FILTER(?s != ?x) }} ?s rdfs:label ?s_label. ?x rdfs:label ?x_label. ?o rdfs:label ?o_label }}",
        values(subjects),
        values(objects)
    )
}

/// Cell classes that are part of (BFO:0000050) any of the context terms.
#[must_use]
pub fn contextual_members_query(context: &[String]) -> String {
    format!(
        "SELECT * WHERE {{ VALUES ?context {{ {} }} ?term BFO:0000050 ?context. \
         ?term rdfs:subClassOf CL:0000000. ?term rdfs:label ?label }}",
        values(context)
    )
}

/// Superclasses of `terms` up to `hops` steps, one optional variable per hop.
#[must_use]
pub fn ancestor_query(terms: &[String], hops: usize) -> String {
    let mut pattern = String::new();
    for hop in (1..=hops).rev() {
        let from = if hop == 1 {
            "?s".to_string()
        } else {
            format!("?x{}", hop - 1)
        };
        pattern = format!(
            "OPTIONAL {{ {from} rdfs:subClassOf ?x{hop}. FILTER(isIRI(?x{hop})) {pattern}}} "
        );
    }
    format!(
        "SELECT * WHERE {{ GRAPH {NONREDUNDANT_GRAPH} {{ VALUES ?s {{ {} }} {pattern}}} }}",
        values(terms)
    )
}

/// Narrow, exact, related and broad synonyms, one UNION branch per kind.
#[must_use]
pub fn synonym_query(terms: &[String]) -> String {
    format!(
        "SELECT * WHERE {{ VALUES ?s {{ {} }} \
         {{ OPTIONAL {{ ?s oio:hasNarrowSynonym ?narrow_synonym }} }} \
         UNION {{ OPTIONAL {{ ?s oio:hasExactSynonym ?exact_synonym }} }} \
         UNION {{ OPTIONAL {{ ?s oio:hasRelatedSynonym ?related_synonym }} }} \
         UNION {{ OPTIONAL {{ ?s oio:hasBroadSynonym ?broad_synonym }} }} }}",
        values(terms)
    )
}

/// Titles of every ontology loaded in the graph.
#[must_use]
pub fn ontology_titles_query() -> String {
    format!("SELECT ?title WHERE {{ ?ontology a owl:Ontology. ?ontology {DC_TITLE} ?title }}")
}

/// Slims (subset annotations) declared by the ontology with the given title.
#[must_use]
pub fn slim_list_query(ontology: &str) -> String {
    format!(
        "SELECT DISTINCT ?slim ?label ?comment WHERE {{ GRAPH ?ontology {{ ?ontology a owl:Ontology. \
         ?ontology {DC_TITLE} ?title. ?term oio:inSubset ?slim. ?slim rdfs:label ?label. \
         ?slim rdfs:comment ?comment. FILTER(str(?title) = '{}') }} }}",
        literal(ontology)
    )
}

/// Classes tagged with the slim of the given name.
#[must_use]
pub fn slim_members_query(slim: &str) -> String {
    format!(
        "SELECT ?term WHERE {{ ?term oio:inSubset ?slim. ?slim rdfs:label ?slim_name. \
         FILTER(str(?slim_name) = '{}') }}",
        literal(slim)
    )
}

/// Minimal enrichment has no agreed query shape yet.
pub fn minimal_enrichment_query(_seeds: &[String]) -> Result<String> {
    Err(Error::Unsupported("minimal enrichment query"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curies(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| (*item).to_string()).collect()
    }

    #[test]
    fn simple_enrichment_inlines_all_values() {
        let query = simple_enrichment_query(
            &curies(&["CL:0000084", "CL:0000813"]),
            &curies(&["CL:0000084"]),
            &curies(&["rdfs:subClassOf"]),
        );
        assert!(query.contains("VALUES ?s { CL:0000084 CL:0000813 }"));
        assert!(query.contains("VALUES ?o { CL:0000084 }"));
        assert!(query.contains("VALUES ?p { rdfs:subClassOf }"));
        assert!(query.contains("FILTER(?s != ?o)"));
        assert!(query.contains(REDUNDANT_GRAPH));
    }

    #[test]
    fn ancestor_query_nests_one_optional_per_hop() {
        let query = ancestor_query(&curies(&["CL:0000084"]), 2);
        assert_eq!(
            query,
            "SELECT * WHERE { GRAPH <http://reasoner.renci.org/nonredundant> { VALUES ?s { CL:0000084 } \
             OPTIONAL { ?s rdfs:subClassOf ?x1. FILTER(isIRI(?x1)) \
             OPTIONAL { ?x1 rdfs:subClassOf ?x2. FILTER(isIRI(?x2)) } } } }"
        );
    }

    #[test]
    fn ancestor_query_without_hops_selects_seeds() {
        let query = ancestor_query(&curies(&["CL:0000084"]), 0);
        assert_eq!(
            query,
            "SELECT * WHERE { GRAPH <http://reasoner.renci.org/nonredundant> { VALUES ?s { CL:0000084 } } }"
        );
    }

    #[test]
    fn string_filters_are_escaped() {
        let query = slim_members_query("o'brien slim");
        assert!(query.contains("FILTER(str(?slim_name) = 'o\\'brien slim')"));
    }

    #[test]
    fn minimal_enrichment_is_unsupported() {
        assert!(matches!(
            minimal_enrichment_query(&curies(&["CL:0000084"])),
            Err(Error::Unsupported(_))
        ));
    }
}
