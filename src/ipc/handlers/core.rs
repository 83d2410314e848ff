use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    let doc = state.store.document();
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "courseId": doc.id,
            "moduleCount": doc.modules.len(),
        }),
    )
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "config": state.config }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "setup.get" => Some(handle_setup_get(state, req)),
        _ => None,
    }
}
