use crate::course::{CourseDocument, EntityId, Lesson, Module};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStats {
    pub total_modules: usize,
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub total_duration_minutes: u64,
    pub total_duration_hours: u64,
    pub progress: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// `round(100 * done / total)`, 0 when there is nothing to complete.
fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // Integer half-up rounding; done <= total keeps this in 0..=100.
    let pct = (200 * done + total) / (2 * total);
    pct.min(100) as u8
}

fn total_lessons(doc: &CourseDocument) -> usize {
    doc.modules.iter().map(|m| m.lessons.len()).sum()
}

fn completed_lessons(doc: &CourseDocument) -> usize {
    doc.modules.iter().map(Module::completed_lessons).sum()
}

pub fn progress(doc: &CourseDocument) -> u8 {
    percent(completed_lessons(doc), total_lessons(doc))
}

pub fn module_progress(module: &Module) -> u8 {
    percent(module.completed_lessons(), module.lessons.len())
}

/// Minutes for a duration such as `30m` or `1h`.
///
/// Looks for the first run of digits followed directly by `m` or `h`;
/// anything else is worth zero.
pub fn parse_duration_minutes(raw: &str) -> u64 {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let unit = bytes.get(i).copied();
        let mult = match unit {
            Some(b'm') => 1,
            Some(b'h') => 60,
            _ => continue,
        };
        let value: u64 = raw[start..i].parse().unwrap_or(u64::MAX);
        return value.saturating_mul(mult);
    }
    0
}

pub fn lesson_minutes(lesson: &Lesson) -> u64 {
    parse_duration_minutes(&lesson.duration)
}

pub fn stats(doc: &CourseDocument) -> CourseStats {
    let total_duration_minutes = doc
        .modules
        .iter()
        .flat_map(|m| m.lessons.iter())
        .map(lesson_minutes)
        .fold(0u64, |acc, v| acc.saturating_add(v));
    CourseStats {
        total_modules: doc.modules.len(),
        total_lessons: total_lessons(doc),
        completed_lessons: completed_lessons(doc),
        total_duration_minutes,
        total_duration_hours: total_duration_minutes / 60
            + u64::from(total_duration_minutes % 60 >= 30),
        progress: progress(doc),
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub fn validate(doc: &CourseDocument) -> ValidationReport {
    let mut errors = Vec::new();

    if blank(&doc.title) {
        errors.push("Course title is required".to_string());
    }
    if blank(&doc.instructor.name) {
        errors.push("Instructor name is required".to_string());
    }
    if doc.modules.is_empty() {
        errors.push("At least one module is required".to_string());
    }

    for (idx, module) in doc.modules.iter().enumerate() {
        if blank(&module.title) {
            errors.push(format!("Module {}: Title is required", idx + 1));
        }
        if module.lessons.is_empty() {
            errors.push(format!(
                "Module \"{}\": At least one lesson is required",
                module.title
            ));
        }
        for (lesson_idx, lesson) in module.lessons.iter().enumerate() {
            if blank(&lesson.title) {
                errors.push(format!(
                    "Module \"{}\", Lesson {}: Title is required",
                    module.title,
                    lesson_idx + 1
                ));
            }
            if blank(&lesson.duration) {
                errors.push(format!(
                    "Module \"{}\", Lesson \"{}\": Duration is required",
                    module.title, lesson.title
                ));
            }
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

pub fn find_module<'a>(doc: &'a CourseDocument, module_id: &EntityId) -> Option<&'a Module> {
    doc.module(module_id)
}

pub fn find_lesson<'a>(
    doc: &'a CourseDocument,
    module_id: &EntityId,
    lesson_id: &EntityId,
) -> Option<&'a Lesson> {
    doc.module(module_id).and_then(|m| m.lesson(lesson_id))
}
