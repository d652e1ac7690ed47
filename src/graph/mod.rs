//! Enrichment graph and its per-predicate transitive reduction.

pub mod generator;
pub mod model;
pub mod reduction;

pub use generator::{GraphGenerator, ReductionReport};
pub use model::{EnrichmentGraph, Object, Statement};
pub use reduction::DiGraph;
