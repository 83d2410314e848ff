use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_history_undo(state: &mut AppState, req: &Request) -> serde_json::Value {
    let changed = state.store.undo();
    ok(
        &req.id,
        json!({ "changed": changed, "history": state.store.history_state() }),
    )
}

fn handle_history_redo(state: &mut AppState, req: &Request) -> serde_json::Value {
    let changed = state.store.redo();
    ok(
        &req.id,
        json!({ "changed": changed, "history": state.store.history_state() }),
    )
}

fn handle_history_state(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "history": state.store.history_state() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "history.undo" => Some(handle_history_undo(state, req)),
        "history.redo" => Some(handle_history_redo(state, req)),
        "history.state" => Some(handle_history_state(state, req)),
        _ => None,
    }
}
