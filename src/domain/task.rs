use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use super::KanbanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "CRITICAL" => Ok(Priority::Critical),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<u32>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<Vec<String>>,
}

/// Fields supplied when a task is created from the "Create issue" dialog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub story_points: Option<u32>,
    #[serde(default)]
    pub acceptance_criteria: Option<Vec<String>>,
}

/// Partial edit from the task detail dialog. A field that is absent stays
/// untouched; `null` clears an optional field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub story_points: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub acceptance_criteria: Option<Option<Vec<String>>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Structured suggestion returned by the AI gateway for a single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiResponse {
    /// A concise, action-oriented title for the task.
    pub improved_title: String,
    /// A professional, detailed description of the task, in user story format where it fits.
    pub improved_description: String,
    /// A list of 3-5 clear acceptance criteria.
    #[schemars(length(min = 3, max = 5))]
    pub acceptance_criteria: Vec<String>,
    /// A list of 2-4 short relevant tags (e.g. "Frontend", "Bug", "Optimization").
    #[schemars(length(min = 2, max = 4))]
    pub suggested_tags: Vec<String>,
    /// Fibonacci estimate (1, 2, 3, 5, 8, 13) based on complexity.
    #[schemars(range(min = 1))]
    pub estimated_story_points: u32,
}

impl AiResponse {
    pub fn validate(&self) -> Result<(), KanbanError> {
        if self.improved_title.trim().is_empty() {
            return Err(KanbanError::Parse("AI response has an empty title".into()));
        }
        if !(3..=5).contains(&self.acceptance_criteria.len()) {
            return Err(KanbanError::Parse(format!(
                "AI response must carry 3-5 acceptance criteria, got {}",
                self.acceptance_criteria.len()
            )));
        }
        if !(2..=4).contains(&self.suggested_tags.len()) {
            return Err(KanbanError::Parse(format!(
                "AI response must carry 2-4 tags, got {}",
                self.suggested_tags.len()
            )));
        }
        if self.estimated_story_points == 0 {
            return Err(KanbanError::Parse(
                "AI response story points must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// One task produced by bulk generation from free-form notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<u32>,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<(), KanbanError> {
        if self.title.trim().is_empty() {
            return Err(KanbanError::Parse("Generated task has an empty title".into()));
        }
        if self.story_points == Some(0) {
            return Err(KanbanError::Parse(
                "Generated task story points must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Trims, drops blanks, and removes duplicates while keeping first occurrence order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|tag| tag.as_ref().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

pub(crate) fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.trim().is_empty())
}
