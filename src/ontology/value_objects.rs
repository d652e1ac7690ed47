use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::OnceLock;

use oxrdf::{NamedNode, NamedNodeRef};
use regex::Regex;
use thiserror::Error;

/// Base of the OBO PURL space used to expand CURIEs with an unregistered prefix.
pub const OBO_BASE: &str = "http://purl.obolibrary.org/obo/";

/// Value object ensuring that supplied text represents a valid IRI.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iri {
    value: String,
}

impl Iri {
    /// Validates and constructs a new [`Iri`] value object.
    ///
    /// The constructor rejects malformed identifiers so every graph node and
    /// predicate is an absolute IRI.
    pub fn new(value: impl Into<String>) -> Result<Self, IriError> {
        let value = value.into();
        NamedNode::new(value.as_str()).map_err(|_| IriError::Invalid {
            value: value.clone(),
        })?;
        Ok(Self { value })
    }

    /// Returns the underlying textual representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Text after the last `#`, or failing that the last `/`.
    #[must_use]
    pub fn local_name(&self) -> &str {
        let separator = if self.value.contains('#') { '#' } else { '/' };
        self.value
            .rsplit(separator)
            .next()
            .unwrap_or(self.value.as_str())
    }

    /// Converts the value object into an `oxrdf` node.
    #[must_use]
    pub fn to_named_node(&self) -> NamedNode {
        NamedNode::new_unchecked(self.value.clone())
    }
}

impl From<NamedNodeRef<'_>> for Iri {
    fn from(node: NamedNodeRef<'_>) -> Self {
        Self {
            value: node.as_str().to_owned(),
        }
    }
}

impl Display for Iri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Iri {
    type Err = IriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for Iri {
    type Error = IriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Errors produced when validating an [`Iri`] or expanding a CURIE.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IriError {
    /// The provided text could not be parsed as an IRI.
    #[error("invalid IRI: {value}")]
    Invalid { value: String },
    /// The provided text is neither an absolute IRI nor a `PREFIX:local` CURIE.
    #[error("invalid CURIE: {value}")]
    MalformedCurie { value: String },
}

const BUILTIN_PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("oio", "http://www.geneontology.org/formats/oboInOwl#"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("obo", OBO_BASE),
    ("BFO", "http://purl.obolibrary.org/obo/BFO_"),
    ("CL", "http://purl.obolibrary.org/obo/CL_"),
    ("GO", "http://purl.obolibrary.org/obo/GO_"),
    ("HP", "http://purl.obolibrary.org/obo/HP_"),
    ("IAO", "http://purl.obolibrary.org/obo/IAO_"),
    ("MONDO", "http://purl.obolibrary.org/obo/MONDO_"),
    ("PATO", "http://purl.obolibrary.org/obo/PATO_"),
    ("PCL", "http://purl.obolibrary.org/obo/PCL_"),
    ("PR", "http://purl.obolibrary.org/obo/PR_"),
    ("RO", "http://purl.obolibrary.org/obo/RO_"),
    ("UBERON", "http://purl.obolibrary.org/obo/UBERON_"),
];

/// Registry of CURIE prefixes and the namespaces they abbreviate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixMap {
    namespaces: BTreeMap<String, String>,
}

impl Default for PrefixMap {
    fn default() -> Self {
        Self {
            namespaces: BUILTIN_PREFIXES
                .iter()
                .map(|(prefix, namespace)| ((*prefix).to_string(), (*namespace).to_string()))
                .collect(),
        }
    }
}

impl PrefixMap {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            namespaces: BTreeMap::new(),
        }
    }

    /// Registers (or replaces) a prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), namespace.into());
        self
    }

    /// Merges extra prefixes over the registered ones.
    pub fn extend<I, K, V>(&mut self, prefixes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.namespaces.extend(
            prefixes
                .into_iter()
                .map(|(prefix, namespace)| (prefix.into(), namespace.into())),
        );
    }

    /// Returns the namespace bound to `prefix`.
    #[must_use]
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    /// Iterates over `(prefix, namespace)` pairs in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.namespaces
            .iter()
            .map(|(prefix, namespace)| (prefix.as_str(), namespace.as_str()))
    }

    /// Namespace of `prefix`, falling back to the OBO PURL space for
    /// unregistered OBO-style prefixes such as `CHEBI` or `NCBITaxon`.
    fn resolve(&self, prefix: &str) -> Option<Cow<'_, str>> {
        match self.namespace(prefix) {
            Some(namespace) => Some(Cow::Borrowed(namespace)),
            None if is_obo_prefix(prefix) => Some(Cow::Owned(format!("{OBO_BASE}{prefix}_"))),
            None => None,
        }
    }

    /// Lists the prefixes that the query text references as `prefix:`, either
    /// registered or OBO-style.
    #[must_use]
    pub fn referenced_in(&self, query: &str) -> Vec<String> {
        static TOKEN: OnceLock<Regex> = OnceLock::new();
        let token = TOKEN.get_or_init(|| {
            Regex::new(r"(?:^|[^A-Za-z0-9_.\-:/#])([A-Za-z][A-Za-z0-9_.\-]*):").expect("static regex")
        });

        let mut found: Vec<String> = token
            .captures_iter(query)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|prefix| self.resolve(prefix).is_some())
            .map(str::to_string)
            .collect();
        found.sort();
        found.dedup();
        found
    }

    /// Expands a CURIE into an [`Iri`].
    ///
    /// Absolute IRIs pass through unchanged. Unregistered prefixes fall back to
    /// the OBO PURL convention `http://purl.obolibrary.org/obo/<PREFIX>_<local>`.
    pub fn expand(&self, curie: &str) -> Result<Iri, IriError> {
        if curie.contains("://") {
            return Iri::new(curie);
        }
        let Some((prefix, local)) = curie.split_once(':') else {
            return Err(IriError::MalformedCurie {
                value: curie.to_string(),
            });
        };
        if prefix.is_empty() || local.is_empty() {
            return Err(IriError::MalformedCurie {
                value: curie.to_string(),
            });
        }
        match self.namespace(prefix) {
            Some(namespace) => Iri::new(format!("{namespace}{local}")),
            None => Iri::new(format!("{OBO_BASE}{prefix}_{local}")),
        }
    }

    /// Contracts an absolute IRI into a CURIE using the longest matching namespace.
    ///
    /// OBO PURLs of unregistered prefixes contract to `<PREFIX>:<local>` rather
    /// than `obo:<PREFIX>_<local>`.
    #[must_use]
    pub fn compact(&self, iri: &str) -> Option<String> {
        let (prefix, namespace) = self
            .namespaces
            .iter()
            .filter(|(_, namespace)| iri.len() > namespace.len() && iri.starts_with(namespace.as_str()))
            .max_by_key(|(_, namespace)| namespace.len())?;
        let local = &iri[namespace.len()..];
        if namespace == OBO_BASE {
            if let Some((obo_prefix, obo_local)) = local.split_once('_') {
                if is_obo_prefix(obo_prefix) && !obo_local.is_empty() {
                    return Some(format!("{obo_prefix}:{obo_local}"));
                }
            }
        }
        Some(format!("{prefix}:{local}"))
    }

    /// Renders SPARQL `PREFIX` declarations for the given prefixes.
    #[must_use]
    pub fn declarations(&self, prefixes: &[String]) -> String {
        prefixes
            .iter()
            .filter_map(|prefix| {
                self.resolve(prefix)
                    .map(|namespace| format!("PREFIX {prefix}: <{namespace}>\n"))
            })
            .collect()
    }
}

/// OBO prefixes start with an uppercase letter and are alphanumeric.
fn is_obo_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    chars.next().is_some_and(|first| first.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}
