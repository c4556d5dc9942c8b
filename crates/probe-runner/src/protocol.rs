//! Line protocol: one JSON request per stdin line, one JSON reply per
//! stdout line.
//!
//! Request: `{"tool": "unity_search_objects", "args": {...}, "id": 7}`.
//! `args` and `id` are optional; `id` is echoed back on the reply.
//! The pseudo-tool `list_tools` replies with every tool descriptor.

use probe_tools::ToolRegistry;
use serde::Deserialize;
use serde_json::{Value as Json, json};
use tracing::warn;

/// Pseudo-tool that lists the registry instead of calling into it.
pub const LIST_TOOLS: &str = "list_tools";

#[derive(Debug, Deserialize)]
struct Request {
    tool: String,
    #[serde(default)]
    args: Json,
    #[serde(default)]
    id: Option<Json>,
}

/// Answer one request line. Returns `None` for blank lines.
pub fn handle_line(registry: &ToolRegistry, line: &str) -> Option<Json> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(err) => {
            warn!(%err, "malformed request");
            return Some(json!({
                "success": false,
                "error": format!("Invalid request: {err}"),
            }));
        }
    };

    let mut reply = if request.tool == LIST_TOOLS {
        json!({
            "success": true,
            "tools": registry.list(),
        })
    } else {
        registry.call(&request.tool, request.args)
    };
    if let (Some(id), Json::Object(map)) = (request.id, &mut reply) {
        map.insert("id".to_owned(), id);
    }
    Some(reply)
}
