//! Typed views over [`QueryRow`] for each query shape the crate issues.

use super::QueryRow;

/// Decodes a typed record from a raw solution row.
pub trait FromQueryRow: Sized {
    /// Returns `None` when a required variable is unbound.
    fn from_row(row: &QueryRow) -> Option<Self>;
}

/// `?term ?label` rows of the label lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelRow {
    pub term: String,
    pub label: Option<String>,
}

impl FromQueryRow for LabelRow {
    fn from_row(row: &QueryRow) -> Option<Self> {
        Some(Self {
            term: row.owned("term")?,
            label: row.owned("label"),
        })
    }
}

/// Deprecation record of the replaced-by lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplacementRow {
    pub term: String,
    pub label: Option<String>,
    pub deprecation_status: Option<String>,
    pub new_term: Option<String>,
    pub new_term_label: Option<String>,
}

impl FromQueryRow for ReplacementRow {
    fn from_row(row: &QueryRow) -> Option<Self> {
        Some(Self {
            term: row.owned("term")?,
            label: row.owned("label"),
            deprecation_status: row.owned("depr_status"),
            new_term: row.owned("new_term"),
            new_term_label: row.owned("new_term_label"),
        })
    }
}

/// `?s ?s_label ?p ?o ?o_label` rows of the enrichment queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TripleRow {
    pub s: String,
    pub s_label: String,
    pub p: String,
    pub o: String,
    pub o_label: String,
}

impl FromQueryRow for TripleRow {
    fn from_row(row: &QueryRow) -> Option<Self> {
        Some(Self {
            s: row.owned("s")?,
            s_label: row.owned("s_label")?,
            p: row.owned("p")?,
            o: row.owned("o")?,
            o_label: row.owned("o_label")?,
        })
    }
}

/// Rows of the transitive enrichment query, where the intermediate `?x` is the
/// effective object and `?p` may be unbound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandedTripleRow {
    pub s: String,
    pub s_label: String,
    pub p: Option<String>,
    pub x: String,
    pub x_label: String,
}

impl FromQueryRow for ExpandedTripleRow {
    fn from_row(row: &QueryRow) -> Option<Self> {
        Some(Self {
            s: row.owned("s")?,
            s_label: row.owned("s_label")?,
            p: row.owned("p"),
            x: row.owned("x")?,
            x_label: row.owned("x_label")?,
        })
    }
}

/// Ontology catalog row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TitleRow {
    pub title: String,
}

impl FromQueryRow for TitleRow {
    fn from_row(row: &QueryRow) -> Option<Self> {
        Some(Self {
            title: row.owned("title")?,
        })
    }
}

/// Slim declared by an ontology.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlimRow {
    pub slim: Option<String>,
    pub label: String,
    pub comment: String,
}

impl FromQueryRow for SlimRow {
    fn from_row(row: &QueryRow) -> Option<Self> {
        Some(Self {
            slim: row.owned("slim"),
            label: row.owned("label")?,
            comment: row.owned("comment").unwrap_or_default(),
        })
    }
}

/// Member of a slim, or of a contextual restriction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRow {
    pub term: String,
}

impl FromQueryRow for MemberRow {
    fn from_row(row: &QueryRow) -> Option<Self> {
        Some(Self {
            term: row.owned("term")?,
        })
    }
}

/// Synonym variables bound by the synonym query, in reporting order.
pub const SYNONYM_VARIABLES: [&str; 4] = [
    "narrow_synonym",
    "exact_synonym",
    "related_synonym",
    "broad_synonym",
];

/// One UNION branch of the synonym query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynonymRow {
    pub s: String,
    /// `(variable, value)` for every synonym variable the branch bound.
    pub synonyms: Vec<(&'static str, String)>,
}

impl FromQueryRow for SynonymRow {
    fn from_row(row: &QueryRow) -> Option<Self> {
        let s = row.owned("s")?;
        let synonyms: Vec<_> = SYNONYM_VARIABLES
            .iter()
            .filter_map(|variable| row.owned(variable).map(|value| (*variable, value)))
            .collect();
        if synonyms.is_empty() {
            return None;
        }
        Some(Self { s, synonyms })
    }
}
