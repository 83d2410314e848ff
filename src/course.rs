use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_COURSE_TITLE: &str = "Untitled Course";
pub const DEFAULT_COURSE_DESCRIPTION: &str = "Add a description for your course";
pub const DEFAULT_INSTRUCTOR_NAME: &str = "Your Name";
pub const DEFAULT_INSTRUCTOR_IMAGE: &str = "https://i.pravatar.cc/150?img=1";
pub const DEFAULT_MODULE_TITLE: &str = "New Module";
pub const DEFAULT_LESSON_TITLE: &str = "New Lesson";
pub const DEFAULT_LESSON_DURATION: &str = "10m";

/// Opaque identifier for courses, modules and lessons.
///
/// Backends hand out either numbers (timestamp style) or strings; both are
/// kept as-is so an exported document matches what was loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{}", n),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(v: i64) -> Self {
        EntityId::Number(v.into())
    }
}

impl From<&str> for EntityId {
    fn from(v: &str) -> Self {
        EntityId::Text(v.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
}

impl Default for Instructor {
    fn default() -> Self {
        Self {
            name: DEFAULT_INSTRUCTOR_NAME.to_string(),
            image: DEFAULT_INSTRUCTOR_IMAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: EntityId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: EntityId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    /// Cached count of completed lessons. Rebuilt by `recount_completed`.
    #[serde(default)]
    pub completed: usize,
    #[serde(default = "default_expanded")]
    pub expanded: bool,
}

fn default_expanded() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDocument {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructor: Instructor,
    #[serde(default)]
    pub total_students: u64,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Default for CourseDocument {
    /// The blank document an editing session starts from.
    fn default() -> Self {
        Self {
            id: None,
            title: DEFAULT_COURSE_TITLE.to_string(),
            description: DEFAULT_COURSE_DESCRIPTION.to_string(),
            instructor: Instructor::default(),
            total_students: 0,
            modules: Vec::new(),
        }
    }
}

/// Optional input for creating a module. Blank strings count as unset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSeed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub lessons: Option<Vec<Lesson>>,
    pub expanded: Option<bool>,
}

/// Optional input for creating a lesson. Blank strings count as unset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSeed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    pub id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructor: Option<Instructor>,
    pub total_students: Option<u64>,
}

/// Fields of a module that may be overwritten. `id` and `completed` are
/// deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub lessons: Option<Vec<Lesson>>,
    pub expanded: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub is_completed: Option<bool>,
}

fn filled(v: Option<String>, default: &str) -> String {
    v.filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Lesson {
    pub fn from_seed(id: EntityId, seed: LessonSeed) -> Self {
        Self {
            id,
            title: filled(seed.title, DEFAULT_LESSON_TITLE),
            description: seed.description.unwrap_or_default(),
            duration: filled(seed.duration, DEFAULT_LESSON_DURATION),
            is_completed: seed.is_completed.unwrap_or(false),
        }
    }

    pub fn apply_patch(&mut self, patch: LessonPatch) {
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.duration {
            self.duration = v;
        }
        if let Some(v) = patch.is_completed {
            self.is_completed = v;
        }
    }
}

impl Module {
    pub fn from_seed(id: EntityId, seed: ModuleSeed) -> Self {
        let mut module = Self {
            id,
            title: filled(seed.title, DEFAULT_MODULE_TITLE),
            description: seed.description.unwrap_or_default(),
            lessons: seed.lessons.unwrap_or_default(),
            completed: 0,
            expanded: seed.expanded.unwrap_or(true),
        };
        module.recount_completed();
        module
    }

    /// Live count of completed lessons, independent of the cache.
    pub fn completed_lessons(&self) -> usize {
        self.lessons.iter().filter(|l| l.is_completed).count()
    }

    pub fn recount_completed(&mut self) {
        self.completed = self.completed_lessons();
    }

    pub fn lesson(&self, lesson_id: &EntityId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| &l.id == lesson_id)
    }

    pub fn lesson_mut(&mut self, lesson_id: &EntityId) -> Option<&mut Lesson> {
        self.lessons.iter_mut().find(|l| &l.id == lesson_id)
    }

    /// Lessons are replaced wholesale when the patch carries them, and the
    /// completion cache follows.
    pub fn apply_patch(&mut self, patch: ModulePatch) {
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.expanded {
            self.expanded = v;
        }
        if let Some(v) = patch.lessons {
            self.lessons = v;
            self.recount_completed();
        }
    }
}

impl CourseDocument {
    pub fn module(&self, module_id: &EntityId) -> Option<&Module> {
        self.modules.iter().find(|m| &m.id == module_id)
    }

    pub fn module_mut(&mut self, module_id: &EntityId) -> Option<&mut Module> {
        self.modules.iter_mut().find(|m| &m.id == module_id)
    }

    pub fn apply_patch(&mut self, patch: CoursePatch) {
        if let Some(v) = patch.id {
            self.id = Some(v);
        }
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.instructor {
            self.instructor = v;
        }
        if let Some(v) = patch.total_students {
            self.total_students = v;
        }
    }

    pub fn recount_all(&mut self) {
        for m in &mut self.modules {
            m.recount_completed();
        }
    }
}
