//! Crate-wide error type.
//!
//! Validation failures carry the offending terms so callers can render their
//! own listing; the `Display` output matches what lenient mode logs.

use std::fmt::{self, Display, Formatter};

use crate::{ontology::value_objects::IriError, ontology::Term, sparql::SparqlError};

/// Hard-stop reasons raised when a strict query rejects its seed list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedListIssue {
    InvalidTerms,
    ObsoletedTerms,
}

impl Display for SeedListIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTerms => f.write_str("Check your seed list! It contains invalid terms"),
            Self::ObsoletedTerms => f.write_str(
                "Check your seed list! It contains obsoleted terms. Use update_obsoleted_terms \
                 method to update all obsoleted term",
            ),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("The following terms are invalid: {}", join_iris(.0))]
    InvalidTerm(Vec<Term>),

    #[error(
        "The following terms are obsoleted: {}, and replaced by following terms: {}. Please consider using the new terms",
        join_iris(.0),
        join_replacements(.0)
    )]
    ObsoletedTerm(Vec<Term>),

    #[error(
        "The '{ontology}' ontology is invalid. \nPlease use one of the following ontologies: \n{}",
        .available.join(", ")
    )]
    InvalidOntology {
        ontology: String,
        available: Vec<String>,
    },

    #[error("{0}")]
    SeedList(SeedListIssue),

    #[error("the `{predicate}` subgraph contains a cycle through: {}", .nodes.join(", "))]
    CyclicSubgraph {
        predicate: String,
        nodes: Vec<String>,
    },

    #[error("{0} is not supported")]
    Unsupported(&'static str),

    #[error(transparent)]
    Iri(#[from] IriError),

    #[error(transparent)]
    Sparql(#[from] SparqlError),

    #[error("cannot read configuration `{path}`: {source}")]
    ConfigIo {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    YAMLFile(#[from] serde_yaml::Error),

    #[error(transparent)]
    JSON(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn join_iris(terms: &[Term]) -> String {
    terms.iter().map(Term::iri).collect::<Vec<_>>().join(", ")
}

fn join_replacements(terms: &[Term]) -> String {
    terms
        .iter()
        .map(|term| term.new_iri().unwrap_or("Unknown IRI"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::{Error, SeedListIssue};
    use crate::ontology::Term;

    #[test]
    fn invalid_term_lists_every_curie() {
        let err = Error::InvalidTerm(vec![
            Term::new(None, "CL:1234567", false),
            Term::new(None, "CL:7654321", false),
        ]);
        assert_snapshot!(err.to_string(), @"The following terms are invalid: CL:1234567, CL:7654321");
    }

    #[test]
    fn obsoleted_term_names_replacements() {
        let err = Error::ObsoletedTerm(vec![Term::with_replacement(
            Some("obsolete Muller cell".to_string()),
            "CL:0011107",
            true,
            Some("Mueller cell".to_string()),
            Some("CL:0000636".to_string()),
        )]);
        assert_eq!(
            err.to_string(),
            "The following terms are obsoleted: CL:0011107, and replaced by following terms: \
             CL:0000636. Please consider using the new terms"
        );
    }

    #[test]
    fn invalid_ontology_enumerates_titles() {
        let err = Error::InvalidOntology {
            ontology: "Cell Ontologyy".to_string(),
            available: vec!["Cell Ontology".to_string(), "Gene Ontology".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "The 'Cell Ontologyy' ontology is invalid. \nPlease use one of the following \
             ontologies: \nCell Ontology, Gene Ontology"
        );
    }

    #[test]
    fn seed_list_messages_are_fixed() {
        assert_snapshot!(
            Error::SeedList(SeedListIssue::InvalidTerms).to_string(),
            @"Check your seed list! It contains invalid terms"
        );
        assert_eq!(
            Error::SeedList(SeedListIssue::ObsoletedTerms).to_string(),
            "Check your seed list! It contains obsoleted terms. Use update_obsoleted_terms method \
             to update all obsoleted term"
        );
    }
}
