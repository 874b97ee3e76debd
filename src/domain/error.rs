//! Domain error types for gridplot.
//!
//! These errors represent model-level failures raised while building the
//! network graph. They carry the name of the offending object record so a
//! failing conversion points back into the model document.

use thiserror::Error;

/// Errors raised by the graph builder.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    /// A link endpoint names an object that is not in the document.
    #[error("'{record}' references unknown object '{name}'")]
    UnknownObject { record: String, name: String },

    /// An object participating in the graph lacks a required field.
    #[error("'{record}' has no '{field}' field")]
    MissingField {
        record: String,
        field: &'static str,
    },

    /// A link's power value could not be parsed as a complex number.
    #[error("'{record}': cannot parse power value '{value}'")]
    InvalidPower { record: String, value: String },

    /// A link's computed edge weight is out of range. This signals a
    /// modeling problem in the input, not a parsing bug.
    #[error("{record}: weight<=0; power = {power}")]
    WeightOutOfRange { record: String, power: String },
}

/// Convenience result alias for graph-building operations.
pub type Result<T> = std::result::Result<T, GraphError>;
