use crate::course::{EntityId, LessonPatch, LessonSeed};
use crate::ipc::error::ok;
use crate::ipc::helpers::{applied_json, optional_input, required_id, required_input};
use crate::ipc::types::{AppState, Request};
use crate::stats;
use crate::store::Operation;
use serde_json::json;

fn lesson_target(req: &Request) -> Result<(EntityId, EntityId), serde_json::Value> {
    Ok((required_id(req, "moduleId")?, required_id(req, "lessonId")?))
}

/// Completion cache of the parent module after the mutation, if it exists.
fn module_completed(state: &AppState, module_id: &EntityId) -> Option<usize> {
    state.store.document().module(module_id).map(|m| m.completed)
}

fn handle_lessons_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let module_id = match required_id(req, "moduleId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let seed: Option<LessonSeed> = match optional_input(req, "input") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let applied = state.store.dispatch(Operation::AddLesson {
        module_id: module_id.clone(),
        seed,
    });
    let mut out = applied_json(&applied, "lessonId");
    out["moduleCompleted"] = json!(module_completed(state, &module_id));
    ok(&req.id, out)
}

fn handle_lessons_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (module_id, lesson_id) = match lesson_target(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let lesson = stats::find_lesson(state.store.document(), &module_id, &lesson_id);
    ok(&req.id, json!({ "lesson": lesson }))
}

fn handle_lessons_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (module_id, lesson_id) = match lesson_target(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch: LessonPatch = match required_input(req, "patch") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let applied = state.store.dispatch(Operation::UpdateLesson {
        module_id: module_id.clone(),
        lesson_id,
        patch,
    });
    let mut out = applied_json(&applied, "lessonId");
    out["moduleCompleted"] = json!(module_completed(state, &module_id));
    ok(&req.id, out)
}

fn handle_lessons_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (module_id, lesson_id) = match lesson_target(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let applied = state.store.dispatch(Operation::DeleteLesson {
        module_id: module_id.clone(),
        lesson_id,
    });
    let mut out = applied_json(&applied, "lessonId");
    out["moduleCompleted"] = json!(module_completed(state, &module_id));
    ok(&req.id, out)
}

fn handle_lessons_toggle_completion(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (module_id, lesson_id) = match lesson_target(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let applied = state.store.dispatch(Operation::ToggleLessonCompletion {
        module_id: module_id.clone(),
        lesson_id: lesson_id.clone(),
    });
    let is_completed = stats::find_lesson(state.store.document(), &module_id, &lesson_id)
        .map(|l| l.is_completed);
    let mut out = applied_json(&applied, "lessonId");
    out["isCompleted"] = json!(is_completed);
    out["moduleCompleted"] = json!(module_completed(state, &module_id));
    ok(&req.id, out)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "lessons.add" => Some(handle_lessons_add(state, req)),
        "lessons.open" => Some(handle_lessons_open(state, req)),
        "lessons.update" => Some(handle_lessons_update(state, req)),
        "lessons.delete" => Some(handle_lessons_delete(state, req)),
        "lessons.toggleCompletion" => Some(handle_lessons_toggle_completion(state, req)),
        _ => None,
    }
}
