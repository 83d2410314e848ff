mod test_support;

use serde_json::json;
use test_support::{request_ok, spawn_sidecar};

#[test]
fn lessons_keep_module_completed_in_sync() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let module = request_ok(&mut stdin, &mut reader, "1", "modules.add", json!({}));
    let module_id = module["moduleId"].as_str().expect("moduleId").to_string();

    let mut lesson_ids = Vec::new();
    for (i, (duration, done)) in [("30m", true), ("1h", false), ("bogus", false), ("45m", true)]
        .iter()
        .enumerate()
    {
        let r = request_ok(
            &mut stdin,
            &mut reader,
            &format!("l{}", i),
            "lessons.add",
            json!({
                "moduleId": module_id,
                "input": { "title": format!("Lesson {}", i + 1), "duration": duration, "isCompleted": done }
            }),
        );
        lesson_ids.push(r["lessonId"].as_str().expect("lessonId").to_string());
    }

    let stats = request_ok(&mut stdin, &mut reader, "2", "course.stats", json!({}));
    assert_eq!(stats["stats"]["totalDurationMinutes"], json!(135));
    assert_eq!(stats["stats"]["totalLessons"], json!(4));
    assert_eq!(stats["stats"]["completedLessons"], json!(2));
    assert_eq!(stats["stats"]["progress"], json!(50));

    let toggled = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "lessons.toggleCompletion",
        json!({ "moduleId": module_id, "lessonId": lesson_ids[1] }),
    );
    assert_eq!(toggled["isCompleted"], json!(true));
    assert_eq!(toggled["moduleCompleted"], json!(3));

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "lessons.update",
        json!({ "moduleId": module_id, "lessonId": lesson_ids[0], "patch": { "isCompleted": false, "title": "Renamed" } }),
    );
    assert_eq!(updated["moduleCompleted"], json!(2));

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "lessons.delete",
        json!({ "moduleId": module_id, "lessonId": lesson_ids[3] }),
    );
    assert_eq!(deleted["changed"], json!(true));
    assert_eq!(deleted["moduleCompleted"], json!(1));

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "lessons.open",
        json!({ "moduleId": module_id, "lessonId": lesson_ids[0] }),
    );
    assert_eq!(opened["lesson"]["title"].as_str(), Some("Renamed"));

    let progress = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "modules.progress",
        json!({ "moduleId": module_id }),
    );
    assert_eq!(progress["progress"], json!(33));

    let course = request_ok(&mut stdin, &mut reader, "8", "course.get", json!({}));
    let m = &course["course"]["modules"][0];
    let live = m["lessons"]
        .as_array()
        .map(|a| a.iter().filter(|l| l["isCompleted"] == json!(true)).count())
        .unwrap_or(0);
    assert_eq!(m["completed"], json!(live));
}

#[test]
fn unknown_lesson_targets_leave_course_untouched() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let module = request_ok(&mut stdin, &mut reader, "1", "modules.add", json!({}));
    let module_id = module["moduleId"].as_str().expect("moduleId").to_string();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "lessons.add",
        json!({ "moduleId": module_id }),
    );
    let before = request_ok(&mut stdin, &mut reader, "3", "course.get", json!({}));

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "lessons.update",
        json!({ "moduleId": "missingModule", "lessonId": "missingLesson", "patch": { "title": "x" } }),
    );
    assert_eq!(r["changed"], json!(false));
    let r = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "lessons.toggleCompletion",
        json!({ "moduleId": module_id, "lessonId": "missingLesson" }),
    );
    assert_eq!(r["changed"], json!(false));
    let r = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "lessons.add",
        json!({ "moduleId": 12345 }),
    );
    assert_eq!(r["changed"], json!(false));
    assert!(r.get("lessonId").is_none());

    let after = request_ok(&mut stdin, &mut reader, "7", "course.get", json!({}));
    assert_eq!(before, after);

    let history = request_ok(&mut stdin, &mut reader, "8", "history.state", json!({}));
    assert_eq!(history["history"]["undoDepth"], json!(2));
}

#[test]
fn validate_reports_in_course_then_module_order() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "course.load",
        json!({ "course": {
            "id": null,
            "title": "",
            "description": "",
            "instructor": { "name": "Alice", "image": "" },
            "totalStudents": 0,
            "modules": [{ "id": 1, "title": "Intro", "lessons": [], "completed": 0, "expanded": true }]
        } }),
    );
    let report = request_ok(&mut stdin, &mut reader, "2", "course.validate", json!({}));
    assert_eq!(report["isValid"], json!(false));
    assert_eq!(
        report["errors"],
        json!([
            "Course title is required",
            "Module \"Intro\": At least one lesson is required"
        ])
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "course.updateInfo",
        json!({ "patch": { "title": "Intro to Rust" } }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "lessons.add",
        json!({ "moduleId": 1 }),
    );
    let report = request_ok(&mut stdin, &mut reader, "5", "course.validate", json!({}));
    assert_eq!(report["isValid"], json!(true));
    assert_eq!(report["errors"], json!([]));

    let progress = request_ok(&mut stdin, &mut reader, "6", "course.progress", json!({}));
    assert_eq!(progress["progress"], json!(0));

    let _ = request_ok(&mut stdin, &mut reader, "7", "course.reset", json!({}));
    let course = request_ok(&mut stdin, &mut reader, "8", "course.get", json!({}));
    assert_eq!(course["course"]["title"].as_str(), Some("Untitled Course"));
    assert_eq!(course["course"]["modules"], json!([]));
}
