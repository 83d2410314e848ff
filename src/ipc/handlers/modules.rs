use crate::course::{EntityId, Module, ModulePatch, ModuleSeed};
use crate::exchange;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{applied_json, optional_input, required_id, required_input};
use crate::ipc::types::{AppState, Request};
use crate::stats;
use crate::store::{self, Operation};
use serde_json::json;

fn handle_modules_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let seed: Option<ModuleSeed> = match optional_input(req, "input") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let applied = state.store.dispatch(Operation::AddModule(seed));
    ok(&req.id, applied_json(&applied, "moduleId"))
}

fn handle_modules_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let module_id = match required_id(req, "moduleId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let module = stats::find_module(state.store.document(), &module_id);
    ok(&req.id, json!({ "module": module }))
}

fn handle_modules_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let module_id = match required_id(req, "moduleId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch: ModulePatch = match required_input(req, "patch") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let applied = state
        .store
        .dispatch(Operation::UpdateModule { module_id, patch });
    ok(&req.id, applied_json(&applied, "moduleId"))
}

fn handle_modules_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let module_id = match required_id(req, "moduleId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let applied = state.store.dispatch(Operation::DeleteModule(module_id));
    ok(&req.id, applied_json(&applied, "moduleId"))
}

fn handle_modules_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let module_id = match required_id(req, "moduleId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let applied = state
        .store
        .dispatch(Operation::ToggleModule(module_id.clone()));
    let expanded = state
        .store
        .document()
        .module(&module_id)
        .map(|m| m.expanded);
    let mut out = applied_json(&applied, "moduleId");
    out["expanded"] = json!(expanded);
    ok(&req.id, out)
}

fn handle_modules_duplicate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let module_id = match required_id(req, "moduleId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let applied = state.store.dispatch(Operation::DuplicateModule(module_id));
    ok(&req.id, applied_json(&applied, "moduleId"))
}

fn handle_modules_replace_all(state: &mut AppState, req: &Request) -> serde_json::Value {
    let modules: Vec<Module> = match required_input(req, "modules") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if let Err(e) = exchange::check_unique_ids(&modules) {
        return err(&req.id, "bad_params", e.to_string(), None);
    }
    let applied = state
        .store
        .dispatch(Operation::BatchReplaceModules(modules));
    ok(&req.id, applied_json(&applied, "moduleId"))
}

fn handle_modules_reorder(state: &mut AppState, req: &Request) -> serde_json::Value {
    let order: Vec<EntityId> = match required_input(req, "moduleIds") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let modules = match store::reorder_modules(state.store.document(), &order) {
        Ok(v) => v,
        Err(missing) => {
            return err(
                &req.id,
                "bad_params",
                format!("module id not found: {}", missing),
                None,
            )
        }
    };
    let applied = state
        .store
        .dispatch(Operation::BatchReplaceModules(modules));
    ok(&req.id, applied_json(&applied, "moduleId"))
}

fn handle_modules_swap(state: &mut AppState, req: &Request) -> serde_json::Value {
    let module_id = match required_id(req, "moduleId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let target_id = match required_id(req, "targetModuleId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(modules) = store::swap_modules(state.store.document(), &module_id, &target_id)
    else {
        return ok(&req.id, json!({ "changed": false }));
    };
    let applied = state
        .store
        .dispatch(Operation::BatchReplaceModules(modules));
    ok(&req.id, applied_json(&applied, "moduleId"))
}

fn handle_modules_progress(state: &mut AppState, req: &Request) -> serde_json::Value {
    let module_id = match required_id(req, "moduleId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let progress =
        stats::find_module(state.store.document(), &module_id).map(stats::module_progress);
    ok(&req.id, json!({ "progress": progress }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "modules.add" => Some(handle_modules_add(state, req)),
        "modules.open" => Some(handle_modules_open(state, req)),
        "modules.update" => Some(handle_modules_update(state, req)),
        "modules.delete" => Some(handle_modules_delete(state, req)),
        "modules.toggle" => Some(handle_modules_toggle(state, req)),
        "modules.duplicate" => Some(handle_modules_duplicate(state, req)),
        "modules.replaceAll" => Some(handle_modules_replace_all(state, req)),
        "modules.reorder" => Some(handle_modules_reorder(state, req)),
        "modules.swap" => Some(handle_modules_swap(state, req)),
        "modules.progress" => Some(handle_modules_progress(state, req)),
        _ => None,
    }
}
