//! Work journal entry models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A dated unit of recorded work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkEntry {
    pub id: i64,
    pub user_id: String,
    pub date: NaiveDate,
    pub category: String,
    pub task: String,
    pub description: String,
    /// Hours spent
    pub duration: f64,
    /// Opaque image references (upload handling lives elsewhere)
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of a create-entry request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub date: NaiveDate,
    pub category: String,
    pub task: String,
    pub description: String,
    pub duration: f64,
    #[serde(default)]
    pub images: Vec<String>,
}

impl NewEntry {
    /// Check required fields, returning the first problem found
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("category", &self.category),
            ("task", &self.task),
            ("description", &self.description),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(format!("Missing required field: {}", name));
            }
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err("Duration must be a positive number of hours".to_string());
        }
        if self.images.iter().any(|image| image.trim().is_empty()) {
            return Err("Image references cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Single entry response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    pub success: bool,
    pub entry: WorkEntry,
}

/// Entry listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryList {
    pub success: bool,
    pub entries: Vec<WorkEntry>,
}
