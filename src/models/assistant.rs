//! AI assistant request and response models

use super::provider::ProviderKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_days() -> u32 {
    30
}

/// Expand a brief note into a full entry description
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    pub brief_description: String,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Preferred provider; falls back to the most recent credential
    #[serde(default)]
    pub provider: Option<ProviderKind>,
}

/// Weekly report over an inclusive date range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub provider: Option<ProviderKind>,
}

/// Productivity analysis over the last `days` days
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default)]
    pub provider: Option<ProviderKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponse {
    pub success: bool,
    pub enhanced_description: String,
    pub used_provider: ProviderKind,
}

/// Entry count and hours for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub count: usize,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub total_hours: f64,
    pub total_entries: usize,
    pub category_stats: BTreeMap<String, CategoryStat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub success: bool,
    pub report: String,
    pub used_provider: ProviderKind,
    pub stats: ReportStats,
}

/// Share of total hours taken by one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub name: String,
    pub count: usize,
    pub hours: f64,
    pub percentage: f64,
}

/// Hours logged on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayLoad {
    pub date: NaiveDate,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStats {
    pub period_days: u32,
    pub total_hours: f64,
    pub avg_hours_per_day: f64,
    pub total_entries: usize,
    /// Sorted by hours, largest first
    pub categories: Vec<CategoryShare>,
    pub busiest_day: DayLoad,
    pub quietest_day: DayLoad,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: String,
    pub used_provider: ProviderKind,
    pub stats: AnalysisStats,
}
