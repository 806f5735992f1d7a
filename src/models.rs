use serde::{Deserialize, Serialize};

/// Evaluation tags grouped by the five fixed categories the desktop app
/// writes. Field names stay camelCase on disk so existing data loads as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluationTags {
    pub characteristics: Vec<String>,
    pub discipline: Vec<String>,
    pub academic: Vec<String>,
    pub homework: Vec<String>,
    pub physical_labor: Vec<String>,
}

impl EvaluationTags {
    /// Flattens all five categories into one list, in category order.
    pub fn all(&self) -> Vec<String> {
        let mut tags = Vec::new();
        tags.extend(self.characteristics.iter().cloned());
        tags.extend(self.discipline.iter().cloned());
        tags.extend(self.academic.iter().cloned());
        tags.extend(self.homework.iter().cloned());
        tags.extend(self.physical_labor.iter().cloned());
        tags
    }

    pub fn is_empty(&self) -> bool {
        self.characteristics.is_empty()
            && self.discipline.is_empty()
            && self.academic.is_empty()
            && self.homework.is_empty()
            && self.physical_labor.is_empty()
    }

    /// Replaces one category's tag list by its camelCase name.
    pub fn set_category(&mut self, category: &str, tags: Vec<String>) -> bool {
        match category {
            "characteristics" => self.characteristics = tags,
            "discipline" => self.discipline = tags,
            "academic" => self.academic = tags,
            "homework" => self.homework = tags,
            "physicalLabor" => self.physical_labor = tags,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub evaluation_tags: EvaluationTags,
}

/// Result of one comment generation. Ephemeral; persisted only when the
/// caller writes a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedComment {
    pub comment: String,
    pub used_tags: Vec<String>,
}

/// One pick, snapshotted by value. `time` is epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickHistoryEntry {
    pub student: Student,
    pub time: i64,
}

/// One parsed row of an imported score sheet.
#[derive(Debug, Clone)]
pub struct ScoreRow {
    pub class: String,
    pub name: String,
    pub scores: std::collections::HashMap<String, f64>,
}

/// A whole imported score sheet. `subjects` preserves column order.
#[derive(Debug, Clone)]
pub struct ScoreSheet {
    pub subjects: Vec<String>,
    pub rows: Vec<ScoreRow>,
}

#[derive(Debug, Clone)]
pub struct SubjectStatistics {
    pub subject: String,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub count: usize,
    pub pass_rate: f64,
}

/// Per-student intelligence dimension scores and the derived analysis.
#[derive(Debug, Clone)]
pub struct IntelligenceProfile {
    pub class: String,
    pub name: String,
    pub scores: Vec<(String, f64)>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}
