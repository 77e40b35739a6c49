//! Inbound event contract: `{"type": ..., "data": ...}` text frames.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TraceError, TraceResult};
use crate::model::{EdgeKind, NodeKind};

/// A decoded stream frame.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    AddNode(Vec<NodeDescriptor>),
    UpdateNode(Vec<NodeUpdate>),
    AddEdge(Vec<EdgeDescriptor>),
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl TraceEvent {
    /// Decode a text frame.
    ///
    /// Unknown `type` values are reported separately from malformed frames so
    /// callers can log them at a lower level.
    pub fn parse(text: &str) -> TraceResult<Self> {
        let raw: RawFrame = serde_json::from_str(text)?;
        match raw.kind.as_str() {
            "add_node" => Ok(Self::AddNode(serde_json::from_value(raw.data)?)),
            "update_node" => {
                let objects = match raw.data {
                    Value::Array(items) => items
                        .into_iter()
                        .map(serde_json::from_value)
                        .collect::<Result<Vec<Map<String, Value>>, _>>()?,
                    other => vec![serde_json::from_value(other)?],
                };
                let updates = objects
                    .into_iter()
                    .map(NodeUpdate::from_object)
                    .collect::<TraceResult<Vec<_>>>()?;
                Ok(Self::UpdateNode(updates))
            }
            "add_edge" => {
                let objects: Vec<Map<String, Value>> = serde_json::from_value(raw.data)?;
                let edges = objects
                    .into_iter()
                    .map(EdgeDescriptor::from_object)
                    .collect::<TraceResult<Vec<_>>>()?;
                Ok(Self::AddEdge(edges))
            }
            other => Err(TraceError::UnknownEventType(other.to_string())),
        }
    }

    /// Wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            TraceEvent::AddNode(_) => "add_node",
            TraceEvent::UpdateNode(_) => "update_node",
            TraceEvent::AddEdge(_) => "add_edge",
        }
    }
}

/// Node as announced by `add_node`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub node_id: String,
    #[serde(default)]
    pub node_type: NodeKind,
    #[serde(default)]
    pub created_at: Option<f64>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl NodeDescriptor {
    pub fn new(node_id: impl Into<String>, node_type: NodeKind) -> Self {
        Self {
            node_id: node_id.into(),
            node_type,
            created_at: None,
            metadata: Map::new(),
        }
    }
}

/// Partial node carried by `update_node`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeUpdate {
    pub node_id: String,
    pub node_type: Option<NodeKind>,
    /// Keys merged over the node's existing metadata.
    pub metadata: Map<String, Value>,
}

impl NodeUpdate {
    fn from_object(mut object: Map<String, Value>) -> TraceResult<Self> {
        // Both keys name the node, so neither is metadata.
        let alias = object.remove("id");
        let node_id = match object.remove("node_id").or(alias) {
            Some(Value::String(id)) => id,
            _ => return Err(TraceError::MissingField("node_id")),
        };
        let node_type = match object.remove("node_type") {
            Some(value) => Some(serde_json::from_value(value)?),
            None => None,
        };
        Ok(Self {
            node_id,
            node_type,
            metadata: object,
        })
    }
}

/// Edge as announced by `add_edge`.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDescriptor {
    pub source_node_id: String,
    pub target_node_id: String,
    pub created_at: Option<f64>,
    pub edge_type: Option<EdgeKind>,
    /// The whole object, key order preserved.
    pub raw: Map<String, Value>,
}

impl EdgeDescriptor {
    /// Build a descriptor from a decoded JSON object.
    pub fn from_object(raw: Map<String, Value>) -> TraceResult<Self> {
        let source_node_id = string_field(&raw, "source_node_id")?;
        let target_node_id = string_field(&raw, "target_node_id")?;
        let created_at = raw.get("created_at").and_then(Value::as_f64);
        let edge_type = raw
            .get("edge_type")
            .and_then(|v| serde_json::from_value(v.clone()).ok());
        Ok(Self {
            source_node_id,
            target_node_id,
            created_at,
            edge_type,
            raw,
        })
    }
}

fn string_field(object: &Map<String, Value>, key: &'static str) -> TraceResult<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(TraceError::MissingField(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_add_node_with_free_form_fields() {
        let frame = json!({
            "type": "add_node",
            "data": [
                {"node_id": "app", "node_type": "app", "created_at": 1.0},
                {"node_id": "get_weather", "node_type": "tool", "tool_description": "Weather", "host_node": null}
            ]
        });
        let TraceEvent::AddNode(nodes) = TraceEvent::parse(&frame.to_string()).unwrap() else {
            panic!("expected add_node");
        };
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].node_type, NodeKind::App);
        assert_eq!(nodes[1].metadata["tool_description"], json!("Weather"));
        assert!(nodes[1].created_at.is_none());
    }

    #[test]
    fn unrecognised_node_type_maps_to_other() {
        let frame = json!({"type": "add_node", "data": [{"node_id": "x", "node_type": "vector_db"}]});
        let TraceEvent::AddNode(nodes) = TraceEvent::parse(&frame.to_string()).unwrap() else {
            panic!("expected add_node");
        };
        assert_eq!(nodes[0].node_type, NodeKind::Other);
    }

    #[test]
    fn edge_keeps_raw_object_in_order() {
        let frame = json!({
            "type": "add_edge",
            "data": [{
                "edge_type": "tool_call",
                "source_node_id": "llama3.1",
                "target_node_id": "get_weather",
                "created_at": 1629782400.5,
                "tool_input": {"city": "Paris"}
            }]
        });
        let TraceEvent::AddEdge(edges) = TraceEvent::parse(&frame.to_string()).unwrap() else {
            panic!("expected add_edge");
        };
        let edge = &edges[0];
        assert_eq!(edge.edge_type, Some(EdgeKind::ToolCall));
        assert_eq!(edge.created_at, Some(1629782400.5));
        let keys: Vec<_> = edge.raw.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["edge_type", "source_node_id", "target_node_id", "created_at", "tool_input"]
        );
    }

    #[test]
    fn edge_without_endpoint_is_rejected() {
        let frame = json!({"type": "add_edge", "data": [{"source_node_id": "app"}]});
        let err = TraceEvent::parse(&frame.to_string()).unwrap_err();
        assert!(matches!(err, TraceError::MissingField("target_node_id")));
    }

    #[test]
    fn update_node_accepts_single_object_and_id_alias() {
        let frame = json!({"type": "update_node", "data": {"id": "app", "label": "demo"}});
        let TraceEvent::UpdateNode(updates) = TraceEvent::parse(&frame.to_string()).unwrap() else {
            panic!("expected update_node");
        };
        assert_eq!(updates[0].node_id, "app");
        assert_eq!(updates[0].node_type, None);
        assert_eq!(updates[0].metadata["label"], json!("demo"));
    }

    #[test]
    fn update_node_with_both_keys_keeps_neither_in_metadata() {
        let frame = json!({
            "type": "update_node",
            "data": [{"node_id": "get_weather", "id": "stale", "status": "done"}]
        });
        let TraceEvent::UpdateNode(updates) = TraceEvent::parse(&frame.to_string()).unwrap() else {
            panic!("expected update_node");
        };
        assert_eq!(updates[0].node_id, "get_weather");
        assert!(!updates[0].metadata.contains_key("id"));
        assert!(!updates[0].metadata.contains_key("node_id"));
        assert_eq!(updates[0].metadata["status"], json!("done"));
    }

    #[test]
    fn unknown_type_is_distinguished_from_malformed() {
        let err = TraceEvent::parse(r#"{"type": "remove_node", "data": []}"#).unwrap_err();
        assert!(matches!(err, TraceError::UnknownEventType(ref t) if t == "remove_node"));

        let err = TraceEvent::parse("not json").unwrap_err();
        assert!(matches!(err, TraceError::Malformed(_)));

        let err = TraceEvent::parse(r#"{"type": "add_node", "data": {"node_id": 3}}"#).unwrap_err();
        assert!(matches!(err, TraceError::Malformed(_)));
    }
}
