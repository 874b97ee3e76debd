//! The graph builder: model-to-graph mapping and visual encoding.
//!
//! Walks a parsed model's object collection, treats every record carrying
//! both `from` and `to` as a link, and assembles an undirected weighted
//! graph keyed by object id. Node attributes come from each endpoint's own
//! phase string, edge attributes from the link's. Pure and deterministic:
//! no I/O, insertion-ordered, same document in → same graph out.

use std::collections::HashMap;

use crate::domain::error::GraphError;
use crate::domain::model::{NodeId, ObjectRecord, ParsedModel};
use crate::domain::phases::{self, MarkerShape};
use crate::domain::power;

/// Options consumed by the graph builder. Nothing else affects its
/// semantics; rendering options live with the renderer.
#[derive(Debug, Clone)]
pub struct GraphOptions {
    /// Reference power magnitude for edge-width normalization. A link
    /// carrying no power gets weight 1; each factor of ten relative to the
    /// base adds one.
    pub power_base: f64,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self { power_base: 1e3 }
    }
}

/// A bus node with its visual attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    /// Fill color derived from the node's own phases.
    pub color: String,
    /// Marker outline: black when the node carries a neutral.
    pub edge_color: &'static str,
    /// Marker shape derived from the node's service markers.
    pub shape: MarkerShape,
}

/// A link edge with its visual attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub from: NodeId,
    pub to: NodeId,
    /// Stroke color derived from the link's own phases, not the endpoints'.
    pub color: String,
    /// Stroke width, see [`edge_weight`].
    pub weight: f64,
}

/// Undirected weighted graph of buses and links, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    index: HashMap<NodeId, usize>,
}

impl NetworkGraph {
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    /// Position of a node in insertion order; layout position vectors are
    /// indexed the same way.
    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Edge endpoints as node indices, for layout algorithms.
    pub fn edge_indices(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges
            .iter()
            .filter_map(|e| Some((self.index_of(&e.from)?, self.index_of(&e.to)?)))
    }

    /// Inserts the node unless its id is already present. Attributes are
    /// set once, on first insertion, and never overwritten by later links
    /// referencing the same endpoint.
    fn insert_once(&mut self, node: GraphNode) {
        let id = node.id.clone();
        self.index.entry(id).or_insert_with(|| {
            self.nodes.push(node);
            self.nodes.len() - 1
        });
    }
}

/// Logarithmic width encoding: `log10(|re| / base + 10)`. Weight 1 at zero
/// flow, one more per decade of power relative to the base, and invariant
/// under scaling power and base together.
pub fn edge_weight(real_power: f64, power_base: f64) -> f64 {
    ((real_power / power_base).abs() + 10.0).log10()
}

/// Build the network graph for a parsed model document.
///
/// Fails with a typed [`GraphError`] on the first defective link; no
/// partial graph is returned.
pub fn build_graph(model: &ParsedModel, options: &GraphOptions) -> Result<NetworkGraph, GraphError> {
    let records: HashMap<&str, &ObjectRecord> = model
        .objects
        .iter()
        .map(|(name, record)| (name.as_str(), record))
        .collect();

    let mut graph = NetworkGraph::default();

    for (name, record) in &model.objects {
        let (Some(from_name), Some(to_name)) = (record.from.as_deref(), record.to.as_deref())
        else {
            continue;
        };

        let from = endpoint_node(&records, &mut graph, name, from_name)?;
        let to = endpoint_node(&records, &mut graph, name, to_name)?;

        let power = record
            .power_out
            .as_deref()
            .ok_or_else(|| GraphError::MissingField {
                record: name.clone(),
                field: "power_out",
            })?;
        let token = power.split_whitespace().next().unwrap_or_default();
        let value = power::parse_complex(token).map_err(|_| GraphError::InvalidPower {
            record: name.clone(),
            value: power.to_string(),
        })?;
        let weight = edge_weight(value.re, options.power_base);
        check_weight(name, power, weight)?;

        let link_phases = record
            .phases
            .as_deref()
            .ok_or_else(|| GraphError::MissingField {
                record: name.clone(),
                field: "phases",
            })?;

        graph.edges.push(GraphEdge {
            from,
            to,
            color: phases::color(link_phases),
            weight,
        });
    }

    Ok(graph)
}

/// Resolve a link endpoint to its node key, inserting the node with
/// attributes from the endpoint's own record on first sight.
fn endpoint_node(
    records: &HashMap<&str, &ObjectRecord>,
    graph: &mut NetworkGraph,
    link_name: &str,
    endpoint: &str,
) -> Result<NodeId, GraphError> {
    let record = records
        .get(endpoint)
        .ok_or_else(|| GraphError::UnknownObject {
            record: link_name.to_string(),
            name: endpoint.to_string(),
        })?;

    let id = record.id.clone().ok_or_else(|| GraphError::MissingField {
        record: endpoint.to_string(),
        field: "id",
    })?;

    if graph.index_of(&id).is_none() {
        let node_phases = record
            .phases
            .as_deref()
            .ok_or_else(|| GraphError::MissingField {
                record: endpoint.to_string(),
                field: "phases",
            })?;
        graph.insert_once(GraphNode {
            id: id.clone(),
            color: phases::color(node_phases),
            edge_color: phases::edge_color(node_phases),
            shape: MarkerShape::for_phases(node_phases),
        });
    }

    Ok(id)
}

/// Hard-stop validation: a non-positive width cannot be drawn and always
/// indicates degenerate input data.
fn check_weight(record: &str, power: &str, weight: f64) -> Result<(), GraphError> {
    if weight <= 0.0 {
        return Err(GraphError::WeightOutOfRange {
            record: record.to_string(),
            power: power.to_string(),
        });
    }
    Ok(())
}
