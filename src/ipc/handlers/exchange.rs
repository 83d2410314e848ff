use crate::exchange::{self, ExchangeError};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::Operation;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn import_failed(req: &Request, e: &ExchangeError) -> serde_json::Value {
    warn!(error = %e, "module import rejected");
    err(
        &req.id,
        "import_failed",
        e.to_string(),
        Some(json!({ "reason": e.code() })),
    )
}

fn handle_export_json(state: &mut AppState, req: &Request) -> serde_json::Value {
    let doc = state.store.document();
    let pretty = state.config.pretty_export;
    if let Some(out_path) = optional_str(req, "outPath") {
        if let Err(e) = exchange::write_json(doc, &PathBuf::from(&out_path), pretty) {
            return err(
                &req.id,
                "io_failed",
                format!("{e:#}"),
                Some(json!({ "path": out_path })),
            );
        }
        return ok(&req.id, json!({ "path": out_path }));
    }
    match exchange::export_json(doc, pretty) {
        Ok(text) => ok(&req.id, json!({ "json": text })),
        Err(e) => err(&req.id, "serialize_failed", format!("{e:#}"), None),
    }
}

fn handle_import_modules(state: &mut AppState, req: &Request) -> serde_json::Value {
    let limit = state.config.max_import_bytes;
    let parsed = if let Some(text) = req.params.get("json").and_then(|v| v.as_str()) {
        exchange::parse_modules(text, limit)
    } else if let Some(path) = optional_str(req, "path") {
        exchange::read_modules_file(&PathBuf::from(path), limit)
    } else {
        return err(&req.id, "bad_params", "missing json or path", None);
    };
    let modules = match parsed {
        Ok(v) => v,
        Err(e) => return import_failed(req, &e),
    };
    let count = modules.len();
    let applied = state
        .store
        .dispatch(Operation::BatchReplaceModules(modules));
    info!(modules = count, "imported modules");
    ok(
        &req.id,
        json!({ "changed": applied.changed, "moduleCount": count }),
    )
}

fn handle_export_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match required_str(req, "outPath") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let doc = state.store.document();
    let export = match exchange::export_bundle(doc, &PathBuf::from(&out_path)) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "io_failed",
                format!("{e:#}"),
                Some(json!({ "path": out_path })),
            )
        }
    };
    info!(path = %out_path, "exported course bundle");
    ok(
        &req.id,
        json!({
            "path": out_path,
            "bundleFormat": export.bundle_format,
            "courseSha256": export.course_sha256,
            "entryCount": export.entry_count
        }),
    )
}

fn handle_import_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let in_path = match required_str(req, "inPath") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let limit = state.config.max_import_bytes;
    let doc = match exchange::import_bundle(&PathBuf::from(&in_path), limit) {
        Ok(v) => v,
        Err(e) => {
            let reason = e.downcast_ref::<ExchangeError>().map(|x| x.code());
            warn!(path = %in_path, error = %format!("{e:#}"), "bundle import rejected");
            return err(
                &req.id,
                "import_failed",
                format!("{e:#}"),
                Some(json!({ "path": in_path, "reason": reason })),
            );
        }
    };
    let applied = state.store.dispatch(Operation::LoadCourse(doc));
    ok(&req.id, json!({ "changed": applied.changed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "exchange.exportJson" => Some(handle_export_json(state, req)),
        "exchange.importModules" => Some(handle_import_modules(state, req)),
        "exchange.exportBundle" => Some(handle_export_bundle(state, req)),
        "exchange.importBundle" => Some(handle_import_bundle(state, req)),
        _ => None,
    }
}
