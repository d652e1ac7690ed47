//! Ontology terms and the lookups that check them.
//!
//! Value objects and entities are pure data; [`TermValidator`] and
//! [`SlimLookup`] reach the ontology service through an injected
//! [`crate::sparql::SparqlClient`].

pub mod entities;
pub mod slims;
pub mod validator;
pub mod value_objects;

pub use entities::{Slim, Term};
pub use slims::SlimLookup;
pub use validator::{CurieValidation, ObsoleteRecord, TermValidator};
pub use value_objects::{Iri, IriError, PrefixMap};
