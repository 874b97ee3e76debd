pub mod error;
pub mod graph;
pub mod model;
pub mod phases;
pub mod power;

pub use error::GraphError;
pub use graph::{GraphOptions, NetworkGraph, build_graph};
pub use model::{NodeId, ObjectRecord, ParsedModel};
