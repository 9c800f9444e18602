//! Assist: AI-generated summary, description, and skills text.
//!
//! The text service is an external collaborator behind `AssistAgent`. The core
//! only guarantees: one call in flight per task key, the task never stays
//! Pending after the call settles, and a failed call leaves the document
//! untouched and posts one notice.

pub mod agent;
pub mod handlers;
pub mod prompts;
pub mod service;
pub mod tasks;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::address::normalize_skills;
use crate::llm_client::LlmError;
use crate::models::cv::{CvData, EntitySection};

#[derive(Debug, Error)]
pub enum AssistError {
    /// No credential configured; no call was attempted.
    #[error("AI assist is unavailable: no API key is configured")]
    Unavailable,

    #[error("AI service error: {0}")]
    Llm(#[from] LlmError),

    #[error("AI service returned no usable text")]
    EmptyResult,

    #[error("An AI request for '{0}' is already in progress")]
    AlreadyPending(TaskKey),

    #[error("No {0} entry with id '{1}'")]
    UnknownEntity(EntitySection, String),
}

/// What kind of text an enhance call rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhanceKind {
    Experience,
    Project,
    Education,
}

impl From<EntitySection> for EnhanceKind {
    fn from(section: EntitySection) -> Self {
        match section {
            EntitySection::Experience => EnhanceKind::Experience,
            EntitySection::Education => EnhanceKind::Education,
            EntitySection::Projects => EnhanceKind::Project,
        }
    }
}

/// Inputs for summary generation, taken from a document snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryContext {
    pub job_title: Option<String>,
    pub skills: Vec<String>,
    pub experience_count: usize,
}

impl SummaryContext {
    pub fn from_doc(doc: &CvData) -> Self {
        Self {
            job_title: doc
                .experience
                .first()
                .map(|e| e.position.trim().to_string())
                .filter(|p| !p.is_empty()),
            skills: doc.skills.clone(),
            experience_count: doc.experience.len(),
        }
    }
}

/// Role hint for skill suggestions: the most recent position, or a generic
/// "professional".
pub fn role_hint(doc: &CvData) -> String {
    doc.experience
        .first()
        .map(|e| e.position.trim())
        .filter(|p| !p.is_empty())
        .unwrap_or("professional")
        .to_string()
}

/// Identity of one assist action. At most one call per key is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskKey {
    Summary,
    Skills,
    Enhance {
        section: EntitySection,
        entity_id: String,
    },
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKey::Summary => f.write_str("summary"),
            TaskKey::Skills => f.write_str("skills"),
            TaskKey::Enhance { section, entity_id } => write!(f, "{section}:{entity_id}"),
        }
    }
}

impl TaskKey {
    /// True for an enhance task on the given entity.
    pub fn targets(&self, section: EntitySection, id: &str) -> bool {
        matches!(self, TaskKey::Enhance { section: s, entity_id } if *s == section && entity_id == id)
    }
}

impl Serialize for TaskKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Merges suggestions into existing skills: set-union by exact string,
/// first occurrence wins, existing order kept, new ones appended. Suggestions
/// holding commas are split like typed input.
pub fn merge_skills(existing: &[String], suggested: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    existing
        .iter()
        .cloned()
        .chain(normalize_skills(suggested))
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::Experience;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_skills_appends_new_and_keeps_order() {
        let merged = merge_skills(&strings(&["Rust", "SQL"]), &strings(&["Go", "Rust", "Kafka"]));
        assert_eq!(merged, strings(&["Rust", "SQL", "Go", "Kafka"]));
    }

    #[test]
    fn test_merge_skills_dedups_exact_matches_only() {
        let merged = merge_skills(&strings(&["Go", "Go"]), &strings(&["go", "Go"]));
        assert_eq!(merged, strings(&["Go", "go"]));
    }

    #[test]
    fn test_merge_skills_splits_comma_suggestions() {
        let merged = merge_skills(&strings(&["Rust"]), &strings(&[" SQL, Rust ", "Go"]));
        assert_eq!(merged, strings(&["Rust", "SQL", "Go"]));
    }

    #[test]
    fn test_role_hint_defaults_to_professional() {
        assert_eq!(role_hint(&CvData::empty()), "professional");

        let mut doc = CvData::empty();
        doc.experience.push(Experience {
            position: "Data Engineer".to_string(),
            ..Experience::default()
        });
        assert_eq!(role_hint(&doc), "Data Engineer");
    }

    #[test]
    fn test_summary_context_from_doc() {
        let mut doc = CvData::empty();
        doc.skills = strings(&["Rust"]);
        doc.experience.push(Experience::default());

        let ctx = SummaryContext::from_doc(&doc);
        assert_eq!(ctx.job_title, None);
        assert_eq!(ctx.experience_count, 1);
        assert_eq!(ctx.skills, strings(&["Rust"]));
    }

    #[test]
    fn test_task_key_display() {
        let key = TaskKey::Enhance {
            section: EntitySection::Projects,
            entity_id: "p1".to_string(),
        };
        assert_eq!(key.to_string(), "projects:p1");
        assert_eq!(TaskKey::Skills.to_string(), "skills");
    }
}
