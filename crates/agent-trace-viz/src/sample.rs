//! Sample trace for demonstration purposes.

use serde_json::json;

/// Frames describing a small trace: an app calling a model that calls a
/// tool, with one flagged interaction.
pub fn sample_frames() -> Vec<String> {
    let frames = [
        json!({
            "type": "add_node",
            "data": [
                {"node_id": "app", "node_type": "app", "created_at": 1629782390.0},
                {"node_id": "llama3.1-very-long-model-name", "node_type": "llm", "created_at": 1629782391.0},
                {
                    "node_id": "retrieve_user_emails-and-a-long-long-function-name",
                    "node_type": "tool",
                    "tool_description": "Fetch the most recent emails for a user",
                    "created_at": 1629782392.0
                },
                {"node_id": "mail-mcp", "node_type": "mcp_server", "created_at": 1629782392.0}
            ]
        }),
        json!({
            "type": "add_edge",
            "data": [
                {"source_node_id": "user", "target_node_id": "app", "created_at": 1629782399.0},
                {
                    "edge_type": "model_generate",
                    "source_node_id": "app",
                    "target_node_id": "llama3.1-latest",
                    "created_at": 1629782400.0,
                    "prompt": "Summarise my inbox and list anyone who sent their SSN."
                },
                {
                    "edge_type": "tool_call",
                    "source_node_id": "llama3.1-very-long-model-name",
                    "target_node_id": "retrieve_user_emails-and-a-long-long-function-name",
                    "created_at": 1629782401.0,
                    "tool_name": "retrieve_user_emails",
                    "tool_input": {"user": "alice", "limit": 20}
                },
                {
                    "edge_type": "mcp_call",
                    "source_node_id": "retrieve_user_emails-and-a-long-long-function-name",
                    "target_node_id": "mail-mcp",
                    "created_at": 1629782402.0,
                    "method": "tools/call",
                    "payload": {"name": "list_messages", "arguments": {"folder": "INBOX"}}
                },
                {
                    "edge_type": "model_generate",
                    "source_node_id": "llama3.1-very-long-model-name",
                    "target_node_id": "app",
                    "created_at": 1629782405.0,
                    "prompt": "Bob sent his SSN 078-05-1120 on Monday.",
                    "violation_info": "Response discloses a social security number to the app user."
                }
            ]
        }),
    ];
    frames.iter().map(|f| f.to_string()).collect()
}
