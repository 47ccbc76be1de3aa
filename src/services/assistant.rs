//! AI assistant service
//!
//! Description enhancement, weekly reports and productivity analysis. Each
//! operation resolves a credential first, then gathers entries, then makes
//! exactly one provider call.

use crate::models::assistant::{
    AnalysisStats, AnalyzeRequest, AnalyzeResponse, CategoryShare, CategoryStat, DayLoad,
    EnhanceRequest, EnhanceResponse, ReportRequest, ReportResponse, ReportStats,
};
use crate::models::entry::WorkEntry;
use crate::providers::{CompletionClient, ProviderRequest};
use crate::services::prompts;
use crate::services::selector::CredentialSelector;
use crate::services::store::EntryStore;
use crate::utils::error::{helpers, AppResult};
use chrono::{Duration, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

pub const ENHANCE_MAX_TOKENS: u32 = 1024;
pub const REPORT_MAX_TOKENS: u32 = 4096;
pub const ANALYZE_MAX_TOKENS: u32 = 4096;
pub const MAX_ANALYZE_DAYS: u32 = 365;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Entry count and hours per category
pub fn summarize_categories(entries: &[WorkEntry]) -> BTreeMap<String, CategoryStat> {
    let mut stats: BTreeMap<String, CategoryStat> = BTreeMap::new();
    for entry in entries {
        let stat = stats.entry(entry.category.clone()).or_default();
        stat.count += 1;
        stat.hours += entry.duration;
    }
    stats
}

pub fn report_stats(entries: &[WorkEntry]) -> ReportStats {
    ReportStats {
        total_hours: entries.iter().map(|e| e.duration).sum(),
        total_entries: entries.len(),
        category_stats: summarize_categories(entries),
    }
}

/// Workload statistics over a `days`-day window
///
/// Returns `None` for an empty slice. Hours and percentages are rounded to
/// one decimal. On ties the busiest day is the latest date and the quietest
/// day the earliest.
pub fn analyze_entries(entries: &[WorkEntry], days: u32) -> Option<AnalysisStats> {
    if entries.is_empty() {
        return None;
    }

    let total_hours: f64 = entries.iter().map(|e| e.duration).sum();

    let mut categories: Vec<CategoryShare> = summarize_categories(entries)
        .into_iter()
        .map(|(name, stat)| CategoryShare {
            name,
            count: stat.count,
            hours: round1(stat.hours),
            percentage: if total_hours > 0.0 {
                round1(stat.hours / total_hours * 100.0)
            } else {
                0.0
            },
        })
        .collect();
    categories.sort_by(|a, b| b.hours.total_cmp(&a.hours));

    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for entry in entries {
        *by_day.entry(entry.date).or_default() += entry.duration;
    }

    let mut busiest: Option<(NaiveDate, f64)> = None;
    let mut quietest: Option<(NaiveDate, f64)> = None;
    for (&date, &hours) in &by_day {
        if busiest.map_or(true, |(_, h)| hours >= h) {
            busiest = Some((date, hours));
        }
        if quietest.map_or(true, |(_, h)| hours < h) {
            quietest = Some((date, hours));
        }
    }
    let (busiest, quietest) = (busiest?, quietest?);

    Some(AnalysisStats {
        period_days: days,
        total_hours: round1(total_hours),
        avg_hours_per_day: round1(total_hours / f64::from(days.max(1))),
        total_entries: entries.len(),
        categories,
        busiest_day: DayLoad {
            date: busiest.0,
            hours: round1(busiest.1),
        },
        quietest_day: DayLoad {
            date: quietest.0,
            hours: round1(quietest.1),
        },
    })
}

/// AI features over a user's journal
#[derive(Clone)]
pub struct AssistantService {
    selector: CredentialSelector,
    entries: Arc<dyn EntryStore>,
    ai: Arc<dyn CompletionClient>,
}

impl AssistantService {
    pub fn new(
        selector: CredentialSelector,
        entries: Arc<dyn EntryStore>,
        ai: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            selector,
            entries,
            ai,
        }
    }

    /// Expand a brief note into a full description
    pub async fn enhance(
        &self,
        user_id: &str,
        request: EnhanceRequest,
    ) -> AppResult<EnhanceResponse> {
        if request.brief_description.trim().is_empty() {
            return Err(helpers::validation_error("briefDescription is required"));
        }

        let credential = self.selector.select(user_id, request.provider).await?;
        let prompt = prompts::enhance_prompt(&request);
        let call = ProviderRequest::new(credential.provider, credential.secret, prompt)
            .with_max_tokens(ENHANCE_MAX_TOKENS);
        let enhanced_description = self.ai.invoke(&call).await?;

        info!(provider = %credential.provider, "Entry description enhanced");
        Ok(EnhanceResponse {
            success: true,
            enhanced_description,
            used_provider: credential.provider,
        })
    }

    /// Report over the inclusive range `start_date..=end_date`
    pub async fn weekly_report(
        &self,
        user_id: &str,
        request: ReportRequest,
    ) -> AppResult<ReportResponse> {
        if request.start_date > request.end_date {
            return Err(helpers::validation_error("startDate must not be after endDate"));
        }

        let credential = self.selector.select(user_id, request.provider).await?;
        let entries = self
            .entries
            .entries_between(user_id, request.start_date, request.end_date)
            .await?;
        if entries.is_empty() {
            return Err(helpers::validation_error("no entries in this period"));
        }

        let stats = report_stats(&entries);
        let prompt = prompts::report_prompt(request.start_date, request.end_date, &stats, &entries);
        let call = ProviderRequest::new(credential.provider, credential.secret, prompt)
            .with_max_tokens(REPORT_MAX_TOKENS);
        let report = self.ai.invoke(&call).await?;

        info!(
            provider = %credential.provider,
            entries = stats.total_entries,
            "Weekly report generated"
        );
        Ok(ReportResponse {
            success: true,
            report,
            used_provider: credential.provider,
            stats,
        })
    }

    /// Analysis of the last `days` days, counted back from today (UTC)
    pub async fn analyze(
        &self,
        user_id: &str,
        request: AnalyzeRequest,
    ) -> AppResult<AnalyzeResponse> {
        self.analyze_as_of(user_id, request, Utc::now().date_naive()).await
    }

    /// Analysis with an explicit reference date
    pub async fn analyze_as_of(
        &self,
        user_id: &str,
        request: AnalyzeRequest,
        today: NaiveDate,
    ) -> AppResult<AnalyzeResponse> {
        if request.days == 0 || request.days > MAX_ANALYZE_DAYS {
            return Err(helpers::validation_error(format!(
                "days must be between 1 and {}",
                MAX_ANALYZE_DAYS
            )));
        }

        let credential = self.selector.select(user_id, request.provider).await?;
        let since = today - Duration::days(i64::from(request.days));
        let entries = self.entries.entries_since(user_id, since).await?;
        let stats = analyze_entries(&entries, request.days)
            .ok_or_else(|| helpers::validation_error("not enough data to analyze"))?;

        let prompt = prompts::analysis_prompt(&stats, &entries);
        let call = ProviderRequest::new(credential.provider, credential.secret, prompt)
            .with_max_tokens(ANALYZE_MAX_TOKENS);
        let analysis = self.ai.invoke(&call).await?;

        info!(
            provider = %credential.provider,
            days = request.days,
            entries = stats.total_entries,
            "Work analysis generated"
        );
        Ok(AnalyzeResponse {
            success: true,
            analysis,
            used_provider: credential.provider,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str, category: &str, duration: f64) -> WorkEntry {
        WorkEntry {
            id: 0,
            user_id: "alice".to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category: category.to_string(),
            task: "task".to_string(),
            description: "description".to_string(),
            duration,
            images: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summarize_categories() {
        let entries = vec![
            entry("2024-03-04", "dev", 2.0),
            entry("2024-03-05", "meetings", 1.0),
            entry("2024-03-05", "dev", 3.5),
        ];
        let stats = summarize_categories(&entries);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats["dev"], CategoryStat { count: 2, hours: 5.5 });
        assert_eq!(stats["meetings"], CategoryStat { count: 1, hours: 1.0 });
    }

    #[test]
    fn test_analyze_entries() {
        let entries = vec![
            entry("2024-03-06", "dev", 6.0),
            entry("2024-03-05", "dev", 2.0),
            entry("2024-03-05", "review", 2.0),
            entry("2024-03-04", "meetings", 1.0),
        ];
        let stats = analyze_entries(&entries, 10).unwrap();

        assert_eq!(stats.total_hours, 11.0);
        assert_eq!(stats.avg_hours_per_day, 1.1);
        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.categories[0].name, "dev");
        assert_eq!(stats.categories[0].hours, 8.0);
        assert_eq!(stats.categories[0].percentage, 72.7);
        assert_eq!(stats.busiest_day.date.to_string(), "2024-03-06");
        assert_eq!(stats.quietest_day.date.to_string(), "2024-03-04");
        assert_eq!(stats.quietest_day.hours, 1.0);
    }

    #[test]
    fn test_analyze_ties() {
        let entries = vec![entry("2024-03-05", "dev", 2.0), entry("2024-03-04", "dev", 2.0)];
        let stats = analyze_entries(&entries, 7).unwrap();

        assert_eq!(stats.busiest_day.date.to_string(), "2024-03-05");
        assert_eq!(stats.quietest_day.date.to_string(), "2024-03-04");
    }

    #[test]
    fn test_analyze_empty() {
        assert!(analyze_entries(&[], 30).is_none());
    }
}
