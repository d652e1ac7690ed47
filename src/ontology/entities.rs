use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// Ontology term looked up from a seed CURIE.
///
/// Obsolescence is decided once at construction: a term is obsolete when both a
/// replacement label and a replacement IRI were found. Resolving it with
/// [`Term::update_obsoleted_term`] swaps the replacement in and clears the flag.
#[derive(Clone, Debug, Serialize)]
pub struct Term {
    label: Option<String>,
    iri: String,
    is_valid: bool,
    new_label: Option<String>,
    new_iri: Option<String>,
    is_obsolete: bool,
}

impl Term {
    /// Creates a term without replacement information.
    #[must_use]
    pub fn new(label: Option<String>, iri: impl Into<String>, is_valid: bool) -> Self {
        Self::with_replacement(label, iri, is_valid, None, None)
    }

    /// Creates a term, recording the replacement offered for a deprecated class.
    #[must_use]
    pub fn with_replacement(
        label: Option<String>,
        iri: impl Into<String>,
        is_valid: bool,
        new_label: Option<String>,
        new_iri: Option<String>,
    ) -> Self {
        let is_obsolete = new_label.is_some() && new_iri.is_some();
        Self {
            label,
            iri: iri.into(),
            is_valid,
            new_label,
            new_iri,
            is_obsolete,
        }
    }

    /// Returns the label, absent for CURIEs unknown to the ontology.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the CURIE.
    #[must_use]
    pub fn iri(&self) -> &str {
        &self.iri
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Returns the label of the replacing term.
    #[must_use]
    pub fn new_label(&self) -> Option<&str> {
        self.new_label.as_deref()
    }

    /// Returns the CURIE of the replacing term.
    #[must_use]
    pub fn new_iri(&self) -> Option<&str> {
        self.new_iri.as_deref()
    }

    #[must_use]
    pub fn is_obsolete(&self) -> bool {
        self.is_obsolete
    }

    /// Replaces label and IRI with the successor's when the term is obsolete.
    ///
    /// Calling it again once resolved leaves the term unchanged.
    pub fn update_obsoleted_term(&mut self) {
        if !self.is_obsolete {
            return;
        }
        if let (Some(label), Some(iri)) = (self.new_label.clone(), self.new_iri.clone()) {
            self.label = Some(label);
            self.iri = iri;
        }
        self.is_obsolete = false;
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        let replacements_match = if self.is_obsolete && other.is_obsolete {
            self.new_label == other.new_label && self.new_iri == other.new_iri
        } else {
            true
        };
        self.label == other.label
            && self.iri == other.iri
            && self.is_valid == other.is_valid
            && self.is_obsolete == other.is_obsolete
            && replacements_match
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IRI: {}, Label: {}, Valid: {}",
            self.iri,
            self.label.as_deref().unwrap_or("Unknown label"),
            if self.is_valid { "True" } else { "False" }
        )?;
        if self.is_valid {
            write!(
                f,
                ", Obsoleted: {}",
                if self.is_obsolete { "True" } else { "False" }
            )?;
        }
        if self.is_obsolete {
            write!(
                f,
                ", New term label: {}, New term IRI: {}",
                self.new_label.as_deref().unwrap_or("Unknown label"),
                self.new_iri.as_deref().unwrap_or("Unknown IRI")
            )?;
        }
        Ok(())
    }
}

/// Named subset of ontology classes (a "slim").
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Slim {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    terms: Option<Vec<Term>>,
}

impl Slim {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            terms: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns member terms, when they were loaded.
    #[must_use]
    pub fn terms(&self) -> Option<&[Term]> {
        self.terms.as_deref()
    }

    /// Replaces the member list.
    pub fn set_terms(&mut self, terms: Vec<Term>) {
        self.terms = Some(terms);
    }
}

impl Display for Slim {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Name:{}, Description: {}", self.name, self.description)
    }
}
