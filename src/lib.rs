//! Render GridLAB-D power-network models as annotated graph images.
//!
//! The pipeline has three stages: the loader reads a model document
//! (converting GLM sources to JSON through the external `gridlabd`
//! executable), the graph builder maps objects to an undirected weighted
//! graph with phase-derived visual attributes, and the renderer lays the
//! graph out and rasterizes it to a PNG.

pub mod application;
pub mod domain;
pub mod infra;
