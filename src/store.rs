use crate::course::{
    CourseDocument, CoursePatch, EntityId, Lesson, LessonPatch, LessonSeed, Module, ModulePatch,
    ModuleSeed,
};
use std::collections::{HashSet, VecDeque};
use tracing::debug;
use uuid::Uuid;

/// Closed set of edits that move one course document to the next.
#[derive(Debug, Clone)]
pub enum Operation {
    UpdateCourseInfo(CoursePatch),
    AddModule(Option<ModuleSeed>),
    UpdateModule {
        module_id: EntityId,
        patch: ModulePatch,
    },
    DeleteModule(EntityId),
    ToggleModule(EntityId),
    DuplicateModule(EntityId),
    AddLesson {
        module_id: EntityId,
        seed: Option<LessonSeed>,
    },
    UpdateLesson {
        module_id: EntityId,
        lesson_id: EntityId,
        patch: LessonPatch,
    },
    DeleteLesson {
        module_id: EntityId,
        lesson_id: EntityId,
    },
    ToggleLessonCompletion {
        module_id: EntityId,
        lesson_id: EntityId,
    },
    LoadCourse(CourseDocument),
    ResetCourse,
    BatchReplaceModules(Vec<Module>),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::UpdateCourseInfo(_) => "updateCourseInfo",
            Operation::AddModule(_) => "addModule",
            Operation::UpdateModule { .. } => "updateModule",
            Operation::DeleteModule(_) => "deleteModule",
            Operation::ToggleModule(_) => "toggleModule",
            Operation::DuplicateModule(_) => "duplicateModule",
            Operation::AddLesson { .. } => "addLesson",
            Operation::UpdateLesson { .. } => "updateLesson",
            Operation::DeleteLesson { .. } => "deleteLesson",
            Operation::ToggleLessonCompletion { .. } => "toggleLessonCompletion",
            Operation::LoadCourse(_) => "loadCourse",
            Operation::ResetCourse => "resetCourse",
            Operation::BatchReplaceModules(_) => "batchReplaceModules",
        }
    }
}

/// Outcome of applying one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Applied {
    /// False when the operation named a module or lesson that is not there.
    pub changed: bool,
    /// Fresh id minted by add/duplicate operations.
    pub created: Option<EntityId>,
}

impl Applied {
    fn changed() -> Self {
        Self {
            changed: true,
            created: None,
        }
    }

    fn unchanged() -> Self {
        Self::default()
    }

    fn created(id: EntityId) -> Self {
        Self {
            changed: true,
            created: Some(id),
        }
    }
}

pub trait IdSource {
    fn next_id(&mut self) -> EntityId;
}

#[derive(Debug, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> EntityId {
        EntityId::Text(Uuid::new_v4().to_string())
    }
}

/// Predictable ids (`<prefix>-1`, `<prefix>-2`, ...).
#[allow(dead_code)]
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

#[allow(dead_code)]
impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> EntityId {
        let id = EntityId::Text(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

fn fresh_id<'a, I>(ids: &mut dyn IdSource, taken: I) -> EntityId
where
    I: IntoIterator<Item = &'a EntityId>,
{
    let taken: HashSet<&EntityId> = taken.into_iter().collect();
    loop {
        let candidate = ids.next_id();
        if !taken.contains(&candidate) {
            return candidate;
        }
    }
}

/// Re-ids later duplicates so lesson ids stay unique inside the module.
fn dedupe_lesson_ids(lessons: &mut [Lesson], ids: &mut dyn IdSource) {
    let mut seen: HashSet<EntityId> = HashSet::new();
    let mut dupes = Vec::new();
    for (idx, lesson) in lessons.iter().enumerate() {
        if !seen.insert(lesson.id.clone()) {
            dupes.push(idx);
        }
    }
    for idx in dupes {
        let id = fresh_id(ids, seen.iter());
        seen.insert(id.clone());
        lessons[idx].id = id;
    }
}

fn with_module<F>(doc: &mut CourseDocument, module_id: &EntityId, f: F) -> Applied
where
    F: FnOnce(&mut Module) -> Applied,
{
    match doc.module_mut(module_id) {
        Some(m) => f(m),
        None => Applied::unchanged(),
    }
}

/// Applies `op` to `doc` in place. Unknown targets leave `doc` untouched.
pub fn apply(doc: &mut CourseDocument, op: Operation, ids: &mut dyn IdSource) -> Applied {
    match op {
        Operation::UpdateCourseInfo(patch) => {
            doc.apply_patch(patch);
            Applied::changed()
        }
        Operation::AddModule(seed) => {
            let id = fresh_id(ids, doc.modules.iter().map(|m| &m.id));
            let mut module = Module::from_seed(id.clone(), seed.unwrap_or_default());
            dedupe_lesson_ids(&mut module.lessons, ids);
            doc.modules.push(module);
            Applied::created(id)
        }
        Operation::UpdateModule { module_id, patch } => with_module(doc, &module_id, |m| {
            m.apply_patch(patch);
            dedupe_lesson_ids(&mut m.lessons, ids);
            Applied::changed()
        }),
        Operation::DeleteModule(module_id) => {
            let before = doc.modules.len();
            doc.modules.retain(|m| m.id != module_id);
            if doc.modules.len() == before {
                Applied::unchanged()
            } else {
                Applied::changed()
            }
        }
        Operation::ToggleModule(module_id) => with_module(doc, &module_id, |m| {
            m.expanded = !m.expanded;
            Applied::changed()
        }),
        Operation::DuplicateModule(module_id) => {
            let Some(source) = doc.module(&module_id) else {
                return Applied::unchanged();
            };
            let mut copy = source.clone();
            let id = fresh_id(ids, doc.modules.iter().map(|m| &m.id));
            copy.id = id.clone();
            copy.title = format!("{} (Copy)", copy.title);
            let mut lesson_ids: Vec<EntityId> = Vec::with_capacity(copy.lessons.len());
            for lesson in &mut copy.lessons {
                lesson.id = fresh_id(ids, lesson_ids.iter());
                lesson_ids.push(lesson.id.clone());
            }
            copy.recount_completed();
            doc.modules.push(copy);
            Applied::created(id)
        }
        Operation::AddLesson { module_id, seed } => with_module(doc, &module_id, |m| {
            let id = fresh_id(ids, m.lessons.iter().map(|l| &l.id));
            m.lessons.push(Lesson::from_seed(id.clone(), seed.unwrap_or_default()));
            m.recount_completed();
            Applied::created(id)
        }),
        Operation::UpdateLesson {
            module_id,
            lesson_id,
            patch,
        } => with_module(doc, &module_id, |m| {
            let Some(lesson) = m.lesson_mut(&lesson_id) else {
                return Applied::unchanged();
            };
            lesson.apply_patch(patch);
            m.recount_completed();
            Applied::changed()
        }),
        Operation::DeleteLesson {
            module_id,
            lesson_id,
        } => with_module(doc, &module_id, |m| {
            let before = m.lessons.len();
            m.lessons.retain(|l| l.id != lesson_id);
            if m.lessons.len() == before {
                return Applied::unchanged();
            }
            m.recount_completed();
            Applied::changed()
        }),
        Operation::ToggleLessonCompletion {
            module_id,
            lesson_id,
        } => with_module(doc, &module_id, |m| {
            let Some(lesson) = m.lesson_mut(&lesson_id) else {
                return Applied::unchanged();
            };
            lesson.is_completed = !lesson.is_completed;
            // Count after the flip.
            m.recount_completed();
            Applied::changed()
        }),
        Operation::LoadCourse(mut course) => {
            course.recount_all();
            *doc = course;
            Applied::changed()
        }
        Operation::ResetCourse => {
            *doc = CourseDocument::default();
            Applied::changed()
        }
        Operation::BatchReplaceModules(mut modules) => {
            for m in &mut modules {
                m.recount_completed();
            }
            if doc.modules == modules {
                return Applied::unchanged();
            }
            doc.modules = modules;
            Applied::changed()
        }
    }
}

/// New module order: listed ids first, then everything unlisted in its
/// current order. Fails with the first id that is not in the document.
pub fn reorder_modules(
    doc: &CourseDocument,
    order: &[EntityId],
) -> Result<Vec<Module>, EntityId> {
    let mut seen: HashSet<&EntityId> = HashSet::new();
    let mut out = Vec::with_capacity(doc.modules.len());
    for id in order {
        if !seen.insert(id) {
            continue;
        }
        let Some(m) = doc.module(id) else {
            return Err(id.clone());
        };
        out.push(m.clone());
    }
    for m in &doc.modules {
        if !seen.contains(&m.id) {
            out.push(m.clone());
        }
    }
    Ok(out)
}

/// Drag-and-drop swap. `None` when the ids match or either is missing.
pub fn swap_modules(
    doc: &CourseDocument,
    dragged: &EntityId,
    target: &EntityId,
) -> Option<Vec<Module>> {
    if dragged == target {
        return None;
    }
    let from = doc.modules.iter().position(|m| &m.id == dragged)?;
    let to = doc.modules.iter().position(|m| &m.id == target)?;
    let mut modules = doc.modules.clone();
    modules.swap(from, to);
    Some(modules)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_depth: usize,
    pub redo_depth: usize,
}

/// One editing session: the current document plus undo/redo snapshots.
pub struct CourseStore {
    doc: CourseDocument,
    ids: Box<dyn IdSource>,
    undo: VecDeque<CourseDocument>,
    redo: Vec<CourseDocument>,
    history_limit: usize,
}

impl CourseStore {
    pub fn new(history_limit: usize) -> Self {
        Self::with_ids(history_limit, Box::new(UuidIds))
    }

    #[allow(dead_code)]
    pub fn with_ids(history_limit: usize, ids: Box<dyn IdSource>) -> Self {
        Self {
            doc: CourseDocument::default(),
            ids,
            undo: VecDeque::new(),
            redo: Vec::new(),
            history_limit,
        }
    }

    pub fn document(&self) -> &CourseDocument {
        &self.doc
    }

    pub fn dispatch(&mut self, op: Operation) -> Applied {
        let name = op.name();
        let starts_session = matches!(op, Operation::LoadCourse(_));
        let before = self.doc.clone();
        let mut applied = apply(&mut self.doc, op, self.ids.as_mut());
        // Patches that rewrite a field with its current value change nothing.
        if !starts_session && applied.changed && self.doc == before {
            applied = Applied::unchanged();
        }
        if starts_session {
            self.undo.clear();
            self.redo.clear();
        } else if applied.changed {
            self.push_undo(before);
            self.redo.clear();
        }
        debug!(op = name, changed = applied.changed, "applied operation");
        applied
    }

    fn push_undo(&mut self, snapshot: CourseDocument) {
        if self.history_limit == 0 {
            return;
        }
        self.undo.push_back(snapshot);
        while self.undo.len() > self.history_limit {
            self.undo.pop_front();
        }
    }

    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.undo.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.doc, prev);
        self.redo.push(current);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.doc, next);
        self.push_undo(current);
        true
    }

    pub fn history_state(&self) -> HistoryState {
        HistoryState {
            can_undo: !self.undo.is_empty(),
            can_redo: !self.redo.is_empty(),
            undo_depth: self.undo.len(),
            redo_depth: self.redo.len(),
        }
    }
}
