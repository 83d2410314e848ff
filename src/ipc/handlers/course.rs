use crate::course::{CourseDocument, CoursePatch};
use crate::ipc::error::ok;
use crate::ipc::helpers::{applied_json, required_input};
use crate::ipc::types::{AppState, Request};
use crate::stats;
use crate::store::Operation;
use serde_json::json;
use tracing::info;

fn handle_course_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "course": state.store.document() }))
}

fn handle_course_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let course: CourseDocument = match required_input(req, "course") {
        Ok(v) => v,
        Err(e) => return e,
    };
    info!(
        course_id = ?course.id,
        modules = course.modules.len(),
        "loading course"
    );
    let applied = state.store.dispatch(Operation::LoadCourse(course));
    ok(&req.id, applied_json(&applied, "courseId"))
}

fn handle_course_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    let applied = state.store.dispatch(Operation::ResetCourse);
    ok(&req.id, applied_json(&applied, "courseId"))
}

fn handle_course_update_info(state: &mut AppState, req: &Request) -> serde_json::Value {
    let patch: CoursePatch = match required_input(req, "patch") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let applied = state.store.dispatch(Operation::UpdateCourseInfo(patch));
    ok(&req.id, applied_json(&applied, "courseId"))
}

fn handle_course_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "stats": stats::stats(state.store.document()) }))
}

fn handle_course_progress(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({ "progress": stats::progress(state.store.document()) }),
    )
}

fn handle_course_validate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let report = stats::validate(state.store.document());
    ok(&req.id, json!(report))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "course.get" => Some(handle_course_get(state, req)),
        "course.load" => Some(handle_course_load(state, req)),
        "course.reset" => Some(handle_course_reset(state, req)),
        "course.updateInfo" => Some(handle_course_update_info(state, req)),
        "course.stats" => Some(handle_course_stats(state, req)),
        "course.progress" => Some(handle_course_progress(state, req)),
        "course.validate" => Some(handle_course_validate(state, req)),
        _ => None,
    }
}
