//! Seed-list enrichment against an ontology query service.
//!
//! A seed list of CURIEs is validated ([`ontology::TermValidator`]), enriched
//! with the relationships the ontology holds between the seeds and an object
//! set chosen per mode ([`enrichment::Query`]), and turned into a graph whose
//! per-predicate transitive reduction drops implied edges
//! ([`graph::GraphGenerator`]).

pub mod config;
pub mod enrichment;
pub mod errors;
pub mod graph;
pub mod logger;
pub mod ontology;
pub mod sparql;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use errors::{Error, Result};
