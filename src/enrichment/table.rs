//! Tabular results of enrichment and synonym lookups.

use serde::Serialize;

use crate::sparql::rows::{ExpandedTripleRow, TripleRow};

pub const DEFAULT_PREDICATE: &str = "rdfs:subClassOf";

/// One `(s, s_label, p, o, o_label)` row.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TripleRecord {
    pub s: String,
    pub s_label: String,
    pub p: String,
    pub o: String,
    pub o_label: String,
}

impl From<TripleRow> for TripleRecord {
    fn from(row: TripleRow) -> Self {
        Self {
            s: row.s,
            s_label: row.s_label,
            p: row.p,
            o: row.o,
            o_label: row.o_label,
        }
    }
}

impl From<ExpandedTripleRow> for TripleRecord {
    /// The intermediate node becomes the object; an unbound predicate means
    /// `rdfs:subClassOf`.
    fn from(row: ExpandedTripleRow) -> Self {
        Self {
            s: row.s,
            s_label: row.s_label,
            p: row.p.unwrap_or_else(|| DEFAULT_PREDICATE.to_string()),
            o: row.x,
            o_label: row.x_label,
        }
    }
}

/// Ordered triple rows with the fixed `s, s_label, p, o, o_label` schema.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TripleTable {
    records: Vec<TripleRecord>,
}

impl TripleTable {
    pub const COLUMNS: [&'static str; 5] = ["s", "s_label", "p", "o", "o_label"];

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_records(records: Vec<TripleRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn columns(&self) -> &'static [&'static str] {
        &Self::COLUMNS
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TripleRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn records(&self) -> &[TripleRecord] {
        &self.records
    }

    /// Stable sort on the subject column only.
    #[must_use]
    pub fn sorted_by_subject(mut self) -> Self {
        self.records.sort_by(|a, b| a.s.cmp(&b.s));
        self
    }
}

impl Extend<TripleRecord> for TripleTable {
    fn extend<I: IntoIterator<Item = TripleRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl FromIterator<TripleRecord> for TripleTable {
    fn from_iter<I: IntoIterator<Item = TripleRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TripleTable {
    type Item = &'a TripleRecord;
    type IntoIter = std::slice::Iter<'a, TripleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SynonymKind {
    #[serde(rename = "narrow_synonym")]
    Narrow,
    #[serde(rename = "exact_synonym")]
    Exact,
    #[serde(rename = "related_synonym")]
    Related,
    #[serde(rename = "broad_synonym")]
    Broad,
}

impl SynonymKind {
    #[must_use]
    pub fn from_variable(variable: &str) -> Option<Self> {
        match variable {
            "narrow_synonym" => Some(Self::Narrow),
            "exact_synonym" => Some(Self::Exact),
            "related_synonym" => Some(Self::Related),
            "broad_synonym" => Some(Self::Broad),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Narrow => "narrow_synonym",
            Self::Exact => "exact_synonym",
            Self::Related => "related_synonym",
            Self::Broad => "broad_synonym",
        }
    }
}

/// One `(ID, label, name, type)` row of a synonym lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SynonymRecord {
    #[serde(rename = "ID")]
    pub id: String,
    pub label: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SynonymKind,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SynonymTable {
    records: Vec<SynonymRecord>,
}

impl SynonymTable {
    pub const COLUMNS: [&'static str; 4] = ["ID", "label", "name", "type"];

    #[must_use]
    pub fn from_records(records: Vec<SynonymRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[SynonymRecord] {
        &self.records
    }

    /// Stable sort on the `ID` column only.
    #[must_use]
    pub fn sorted_by_id(mut self) -> Self {
        self.records.sort_by(|a, b| a.id.cmp(&b.id));
        self
    }
}
