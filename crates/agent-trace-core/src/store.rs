//! In-memory trace state driven by stream events.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::event::{EdgeDescriptor, NodeDescriptor, NodeUpdate, TraceEvent};
use crate::layout::initial_position;
use crate::model::{NodeKind, Position, TraceEdge, TraceNode};

/// Length of the id prefix used to match relabelled nodes.
const SIMILAR_PREFIX_CHARS: usize = 6;

/// Summary of what an event changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub nodes_added: usize,
    pub nodes_updated: usize,
    pub edges_added: usize,
    /// Edges dropped because their id was already present.
    pub edges_skipped: usize,
}

impl ApplyOutcome {
    pub fn changed(&self) -> bool {
        self.nodes_added + self.nodes_updated + self.edges_added > 0
    }
}

/// Resolve an edge endpoint against the known nodes.
///
/// An exact match wins. Otherwise the first node whose id shares the first six
/// characters is used, which tolerates relabelling such as
/// `claude-3.5-latest` resolving to `claude-3.5-20240620`. Failing both, the
/// id is returned unchanged.
pub fn resolve_node_id<'a, I>(node_ids: I, id: &str) -> String
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    if id.is_empty() || node_ids.clone().into_iter().any(|n| n == id) {
        return id.to_string();
    }
    let prefix: String = id.chars().take(SIMILAR_PREFIX_CHARS).collect();
    node_ids
        .into_iter()
        .find(|n| n.starts_with(&prefix))
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}

fn edge_id(source: &str, target: &str, created_at: Option<f64>) -> String {
    match created_at {
        Some(t) => format!("e{source}-{target}-{t}"),
        None => format!("e{source}-{target}-undefined"),
    }
}

/// Ordered nodes and edges of the trace, with idempotent inserts.
#[derive(Debug, Default, Clone)]
pub struct TraceStore {
    nodes: Vec<TraceNode>,
    node_index: HashMap<String, usize>,
    edges: Vec<TraceEdge>,
    edge_index: HashMap<String, usize>,
    revision: u64,
}

impl TraceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a decoded event in arrival order.
    pub fn apply(&mut self, event: TraceEvent) -> ApplyOutcome {
        match event {
            TraceEvent::AddNode(nodes) => ApplyOutcome {
                nodes_added: self.add_nodes(nodes),
                ..Default::default()
            },
            TraceEvent::UpdateNode(updates) => ApplyOutcome {
                nodes_updated: updates
                    .into_iter()
                    .map(|update| self.update_node(update))
                    .filter(|&merged| merged)
                    .count(),
                ..Default::default()
            },
            TraceEvent::AddEdge(edges) => {
                let total = edges.len();
                let added = self.add_edges(edges);
                ApplyOutcome {
                    edges_added: added,
                    edges_skipped: total - added,
                    ..Default::default()
                }
            }
        }
    }

    /// Add nodes not yet known. Returns how many were inserted.
    pub fn add_nodes(&mut self, descriptors: Vec<NodeDescriptor>) -> usize {
        let mut added = 0;
        for descriptor in descriptors {
            if self.node_index.contains_key(&descriptor.node_id) {
                continue;
            }
            let same_kind = self.count_kind(descriptor.node_type);
            let node = TraceNode {
                position: initial_position(descriptor.node_type, same_kind),
                id: descriptor.node_id,
                kind: descriptor.node_type,
                created_at: descriptor.created_at,
                metadata: descriptor.metadata,
            };
            debug!(node_id = %node.id, kind = node.kind.title(), "node added");
            self.node_index.insert(node.id.clone(), self.nodes.len());
            self.nodes.push(node);
            added += 1;
        }
        if added > 0 {
            self.revision += 1;
        }
        added
    }

    /// Merge an update onto an existing node. Returns false for unknown ids.
    pub fn update_node(&mut self, update: NodeUpdate) -> bool {
        let Some(&idx) = self.node_index.get(&update.node_id) else {
            debug!(node_id = %update.node_id, "update for unknown node ignored");
            return false;
        };
        let node = &mut self.nodes[idx];
        if let Some(kind) = update.node_type {
            node.kind = kind;
        }
        node.metadata.extend(update.metadata);
        self.revision += 1;
        true
    }

    /// Add edges, reconciling endpoints and dropping duplicates.
    /// Returns how many were inserted.
    pub fn add_edges(&mut self, descriptors: Vec<EdgeDescriptor>) -> usize {
        let mut added = 0;
        for descriptor in descriptors {
            let source = self.resolve(&descriptor.source_node_id);
            let target = self.resolve(&descriptor.target_node_id);
            let id = edge_id(&source, &target, descriptor.created_at);

            if self.edge_index.contains_key(&id) {
                debug!(edge_id = %id, "edge already exists, skipping");
                continue;
            }

            debug!(edge_id = %id, %source, %target, "edge added");
            self.edge_index.insert(id.clone(), self.edges.len());
            self.edges.push(TraceEdge {
                id,
                source,
                target,
                created_at: descriptor.created_at,
                data: descriptor.raw,
            });
            added += 1;
        }
        if added > 0 {
            self.revision += 1;
        }
        added
    }

    /// Record a position chosen by the user.
    pub fn set_position(&mut self, id: &str, position: Position) {
        if let Some(&idx) = self.node_index.get(id) {
            self.nodes[idx].position = position;
        }
    }

    fn resolve(&self, id: &str) -> String {
        resolve_node_id(self.nodes.iter().map(|n| n.id.as_str()), id)
    }

    fn count_kind(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    pub fn nodes(&self) -> &[TraceNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[TraceEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&TraceNode> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn edge(&self, id: &str) -> Option<&TraceEdge> {
        self.edge_index.get(id).map(|&idx| &self.edges[idx])
    }

    /// Edges sorted newest first; ties keep insertion order.
    pub fn edges_newest_first(&self) -> Vec<&TraceEdge> {
        let mut sorted: Vec<&TraceEdge> = self.edges.iter().collect();
        sorted.sort_by(|a, b| {
            b.sort_time()
                .partial_cmp(&a.sort_time())
                .unwrap_or(Ordering::Equal)
        });
        sorted
    }

    pub fn tool_count(&self) -> usize {
        self.count_kind(NodeKind::Tool)
    }

    /// Bumped on every mutation that changes nodes or edges.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn event(frame: Value) -> TraceEvent {
        TraceEvent::parse(&frame.to_string()).unwrap()
    }

    fn seeded() -> TraceStore {
        let mut store = TraceStore::new();
        store.apply(event(json!({
            "type": "add_node",
            "data": [
                {"node_id": "app", "node_type": "app"},
                {"node_id": "claude-3-5-sonnet-20240620", "node_type": "llm"},
                {"node_id": "get_weather", "node_type": "tool"}
            ]
        })));
        store
    }

    #[test]
    fn repeated_node_lists_are_idempotent() {
        let mut store = seeded();
        let revision = store.revision();
        let outcome = store.apply(event(json!({
            "type": "add_node",
            "data": [
                {"node_id": "app", "node_type": "app"},
                {"node_id": "get_weather", "node_type": "tool"},
                {"node_id": "get_time", "node_type": "tool"}
            ]
        })));
        assert_eq!(outcome.nodes_added, 1);
        assert_eq!(store.nodes().len(), 4);
        assert_eq!(store.revision(), revision + 1);
        assert_eq!(store.node("get_time").unwrap().position, Position::new(600.0, -150.0));
    }

    #[test]
    fn edges_dedup_by_computed_id() {
        let mut store = seeded();
        let frame = json!({
            "type": "add_edge",
            "data": [{"source_node_id": "app", "target_node_id": "get_weather", "created_at": 1629782400.0}]
        });
        assert_eq!(store.apply(event(frame.clone())).edges_added, 1);
        let outcome = store.apply(event(frame));
        assert_eq!(outcome.edges_added, 0);
        assert_eq!(outcome.edges_skipped, 1);
        assert!(!outcome.changed());
        assert_eq!(store.edges()[0].id, "eapp-get_weather-1629782400");
    }

    #[test]
    fn relabelled_model_resolves_by_prefix() {
        let mut store = seeded();
        store.apply(event(json!({
            "type": "add_edge",
            "data": [{
                "source_node_id": "app",
                "target_node_id": "claude-3-5-sonnet-latest",
                "created_at": 2.5,
                "prompt": "hi"
            }]
        })));
        let edge = &store.edges()[0];
        assert_eq!(edge.target, "claude-3-5-sonnet-20240620");
        assert_eq!(edge.id, "eapp-claude-3-5-sonnet-20240620-2.5");
        assert_eq!(edge.data["target_node_id"], json!("claude-3-5-sonnet-latest"));
    }

    #[test]
    fn unresolvable_endpoint_is_kept_verbatim() {
        let mut store = seeded();
        store.apply(event(json!({
            "type": "add_edge",
            "data": [{"source_node_id": "user", "target_node_id": "app"}]
        })));
        let edge = &store.edges()[0];
        assert_eq!(edge.source, "user");
        assert_eq!(edge.id, "euser-app-undefined");
    }

    #[test]
    fn resolve_uses_first_match_in_insertion_order() {
        let ids = ["gpt-4o-mini", "gpt-4o-2024"];
        assert_eq!(resolve_node_id(ids.iter().copied(), "gpt-4o"), "gpt-4o-mini");
        assert_eq!(resolve_node_id(ids.iter().copied(), "gpt-4o-2024"), "gpt-4o-2024");
        assert_eq!(resolve_node_id(ids.iter().copied(), "gpt"), "gpt-4o-mini");
        assert_eq!(resolve_node_id(ids.iter().copied(), "llama3"), "llama3");
        assert_eq!(resolve_node_id(ids.iter().copied(), ""), "");
    }

    #[test]
    fn update_merges_metadata_and_keeps_position() {
        let mut store = seeded();
        store.set_position("get_weather", Position::new(10.0, 20.0));
        let outcome = store.apply(event(json!({
            "type": "update_node",
            "data": [{"node_id": "get_weather", "node_type": "tool", "host_node": "weather-mcp"}]
        })));
        assert_eq!(outcome.nodes_updated, 1);
        let node = store.node("get_weather").unwrap();
        assert_eq!(node.metadata["host_node"], json!("weather-mcp"));
        assert_eq!(node.position, Position::new(10.0, 20.0));

        let outcome = store.apply(event(json!({
            "type": "update_node",
            "data": {"node_id": "missing"}
        })));
        assert_eq!(outcome.nodes_updated, 0);
    }

    #[test]
    fn update_replaces_node_type_when_given() {
        let mut store = seeded();
        store.apply(event(json!({
            "type": "update_node",
            "data": [{"node_id": "get_weather", "node_type": "mcp_server"}]
        })));
        assert_eq!(store.node("get_weather").unwrap().kind, NodeKind::McpServer);
        assert_eq!(store.tool_count(), 0);

        store.apply(event(json!({
            "type": "update_node",
            "data": [{"node_id": "get_weather", "status": "ok"}]
        })));
        assert_eq!(store.node("get_weather").unwrap().kind, NodeKind::McpServer);
    }

    #[test]
    fn duplicates_within_one_batch_are_skipped() {
        let mut store = seeded();
        let outcome = store.apply(event(json!({
            "type": "add_edge",
            "data": [
                {"source_node_id": "app", "target_node_id": "get_weather", "created_at": 3.0},
                {"source_node_id": "app", "target_node_id": "get_weather", "created_at": 3.0, "extra": 1}
            ]
        })));
        assert_eq!(outcome.edges_added, 1);
        assert_eq!(outcome.edges_skipped, 1);
        assert_eq!(store.edges().len(), 1);
        assert!(!store.edges()[0].data.contains_key("extra"));
    }

    #[test]
    fn tool_count_tracks_tool_nodes_only() {
        let mut store = seeded();
        assert_eq!(store.tool_count(), 1);
        store.apply(event(json!({
            "type": "add_node",
            "data": [
                {"node_id": "get_time", "node_type": "tool"},
                {"node_id": "weather-mcp", "node_type": "mcp_server"}
            ]
        })));
        assert_eq!(store.tool_count(), 2);
    }

    #[test]
    fn unknown_kinds_stack_left_of_the_app() {
        let mut store = TraceStore::new();
        store.apply(event(json!({
            "type": "add_node",
            "data": [
                {"node_id": "user", "node_type": "user"},
                {"node_id": "retriever", "node_type": "retriever"},
                {"node_id": "cache", "node_type": "cache"},
                {"node_id": "queue", "node_type": "queue"}
            ]
        })));
        let positions: Vec<_> = store.nodes().iter().map(|n| n.position).collect();
        assert!(store.nodes().iter().all(|n| n.kind == NodeKind::Other));
        assert_eq!(
            positions,
            [
                Position::new(-300.0, 0.0),
                Position::new(-300.0, 0.0),
                Position::new(-300.0, 200.0),
                Position::new(-300.0, -200.0),
            ]
        );
    }

    #[test]
    fn newest_first_is_stable_and_treats_missing_as_zero() {
        let mut store = seeded();
        store.apply(event(json!({
            "type": "add_edge",
            "data": [
                {"source_node_id": "app", "target_node_id": "get_weather", "created_at": 5.0},
                {"source_node_id": "app", "target_node_id": "claude-3-5-sonnet-20240620"},
                {"source_node_id": "get_weather", "target_node_id": "app", "created_at": 9.0},
                {"source_node_id": "app", "target_node_id": "get_weather", "created_at": 9.0}
            ]
        })));
        let order: Vec<_> = store
            .edges_newest_first()
            .into_iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(
            order,
            [
                "eget_weather-app-9",
                "eapp-get_weather-9",
                "eapp-get_weather-5",
                "eapp-claude-3-5-sonnet-20240620-undefined",
            ]
        );
    }
}
