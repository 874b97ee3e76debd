//! Parsed model documents.
//!
//! A model document is a JSON export of a GridLAB-D model: a top-level
//! `objects` mapping from object name to a free-form record. Only the
//! handful of fields the graph builder consumes are typed here; the
//! document is read-only input for the rest of the pipeline.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Graph node key: the `id` property of an object record.
///
/// GridLAB-D JSON exports carry integer ids, but hand-written documents
/// sometimes use strings; both are accepted and kept distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Number(i64),
    Name(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Number(n) => write!(f, "{n}"),
            NodeId::Name(s) => write!(f, "{s}"),
        }
    }
}

/// A single object record from the model document.
///
/// `id` and `phases` are optional at parse time; their absence is only an
/// error when the record actually participates in the graph.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectRecord {
    pub id: Option<NodeId>,
    pub phases: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub power_out: Option<String>,
}

impl ObjectRecord {
    /// Link records carry both endpoints; everything else is a potential
    /// node that only enters the graph when referenced by a link.
    pub fn is_link(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }
}

/// The parsed model document.
#[derive(Debug, Clone, Deserialize)]
pub struct ParsedModel {
    /// Name → record pairs in document order. Iteration order of the graph
    /// builder follows this order, so conversions are reproducible.
    #[serde(deserialize_with = "objects_in_order")]
    pub objects: Vec<(String, ObjectRecord)>,
}

impl ParsedModel {
    pub fn get(&self, name: &str) -> Option<&ObjectRecord> {
        self.objects
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, record)| record)
    }
}

/// `serde_json` maps do not preserve key order by default; the document's
/// insertion order is part of the output contract, so the mapping is
/// collected into a vector of pairs instead.
fn objects_in_order<'de, D>(deserializer: D) -> Result<Vec<(String, ObjectRecord)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedObjects;

    impl<'de> Visitor<'de> for OrderedObjects {
        type Value = Vec<(String, ObjectRecord)>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a mapping from object name to object record")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut objects = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(entry) = access.next_entry::<String, ObjectRecord>()? {
                objects.push(entry);
            }
            Ok(objects)
        }
    }

    deserializer.deserialize_map(OrderedObjects)
}
