use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{EvaluationTags, PickHistoryEntry, Student};

const STUDENTS_FILE: &str = "students.json";
const HISTORY_FILE: &str = "pick_history.json";
const TEMPLATES_FILE: &str = "templates.json";

/// Best-effort local persistence: one JSON file per collection under the
/// data directory. Shapes match what the desktop app kept in localStorage,
/// so exported data moves between the two unchanged.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;
        Ok(Store { dir })
    }

    /// Data directory from `CLASSROOM_DATA_DIR`, defaulting to a dotted
    /// directory next to the working directory.
    pub fn dir_from_env() -> PathBuf {
        std::env::var("CLASSROOM_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".classroom-companion"))
    }

    pub fn templates_path(&self) -> PathBuf {
        self.dir.join(TEMPLATES_FILE)
    }

    fn students_path(&self) -> PathBuf {
        self.dir.join(STUDENTS_FILE)
    }

    fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    pub fn load_students(&self) -> anyhow::Result<Vec<Student>> {
        read_json(&self.students_path())
    }

    pub fn save_students(&self, students: &[Student]) -> anyhow::Result<()> {
        debug!(count = students.len(), "saving roster");
        write_json(&self.students_path(), students)
    }

    pub fn load_history(&self) -> anyhow::Result<Vec<PickHistoryEntry>> {
        read_json(&self.history_path())
    }

    pub fn save_history(&self, history: &[PickHistoryEntry]) -> anyhow::Result<()> {
        debug!(count = history.len(), "saving pick history");
        write_json(&self.history_path(), history)
    }

    pub fn clear_history(&self) -> anyhow::Result<()> {
        self.save_history(&[])
    }

    /// Bulk add from one comma-separated line; both ASCII and full-width
    /// commas separate names.
    pub fn add_bulk(&self, names: &str) -> anyhow::Result<Vec<Student>> {
        let mut students = self.load_students()?;
        let added: Vec<Student> = names
            .split([',', '，'])
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| Student {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                evaluation_tags: EvaluationTags::default(),
            })
            .collect();
        if added.is_empty() {
            return Ok(added);
        }
        students.extend(added.iter().cloned());
        self.save_students(&students)?;
        info!(count = added.len(), "students added");
        Ok(added)
    }

    /// Replaces one tag category for a student addressed by id or exact
    /// name.
    pub fn set_tags(&self, query: &str, category: &str, tags: Vec<String>) -> anyhow::Result<Student> {
        let mut students = self.load_students()?;
        let student = find_mut(&mut students, query)
            .with_context(|| format!("no student matches {query}"))?;
        if !student.evaluation_tags.set_category(category, tags) {
            anyhow::bail!("unknown tag category {category}");
        }
        let updated = student.clone();
        self.save_students(&students)?;
        Ok(updated)
    }

    pub fn remove_student(&self, query: &str) -> anyhow::Result<Student> {
        let mut students = self.load_students()?;
        let index = students
            .iter()
            .position(|s| s.id == query || s.name == query)
            .with_context(|| format!("no student matches {query}"))?;
        let removed = students.remove(index);
        self.save_students(&students)?;
        Ok(removed)
    }

    /// Drops every student. Returns how many were removed.
    pub fn clear_students(&self) -> anyhow::Result<usize> {
        let count = self.load_students()?.len();
        self.save_students(&[])?;
        Ok(count)
    }

    /// Loads realistic sample data: the eight demo students, no tags.
    pub fn seed(&self) -> anyhow::Result<usize> {
        let names = [
            "张小明", "李小红", "王小华", "刘小强", "陈小美", "赵小刚", "孙小丽", "周小勇",
        ];
        let mut students = self.load_students()?;
        for name in names {
            students.push(Student {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                evaluation_tags: EvaluationTags::default(),
            });
        }
        self.save_students(&students)?;
        Ok(names.len())
    }

    pub fn export_students(&self, path: &Path) -> anyhow::Result<usize> {
        let students = self.load_students()?;
        write_json(path, &students)?;
        Ok(students.len())
    }

    /// Imports students from a JSON export. Entries without a string id
    /// and a non-empty name are skipped, names already on the roster
    /// (case-insensitive) are skipped, and surviving entries get fresh ids
    /// so two imports never collide.
    pub fn import_students(&self, path: &Path) -> anyhow::Result<usize> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let values: Vec<serde_json::Value> = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a JSON array", path.display()))?;

        let mut students = self.load_students()?;
        let existing: Vec<String> = students.iter().map(|s| s.name.to_lowercase()).collect();

        let mut imported = 0usize;
        for value in values {
            let Ok(candidate) = serde_json::from_value::<Student>(value) else {
                continue;
            };
            if candidate.name.trim().is_empty() {
                continue;
            }
            if existing.contains(&candidate.name.to_lowercase()) {
                continue;
            }
            students.push(Student {
                id: Uuid::new_v4().to_string(),
                ..candidate
            });
            imported += 1;
        }

        if imported > 0 {
            self.save_students(&students)?;
        }
        info!(imported, "students imported");
        Ok(imported)
    }
}

fn find_mut<'a>(students: &'a mut [Student], query: &str) -> Option<&'a mut Student> {
    students.iter_mut().find(|s| s.id == query || s.name == query)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let values = serde_json::from_str(&raw)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    Ok(values)
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, values: &T) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(values)?;
    std::fs::write(path, raw).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
