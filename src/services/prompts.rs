//! Prompt templates for the AI assistant

use crate::models::assistant::{AnalysisStats, EnhanceRequest, ReportStats};
use crate::models::entry::WorkEntry;
use chrono::NaiveDate;

/// Entries listed verbatim in the analysis prompt
pub const ANALYSIS_RECENT_ENTRIES: usize = 10;

fn or_unspecified(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => "unspecified",
    }
}

pub fn enhance_prompt(request: &EnhanceRequest) -> String {
    format!(
        "You are a professional work journal assistant. The user is writing a work log entry.\n\
         \n\
         Category: {category}\n\
         Task: {task}\n\
         Brief description: {brief}\n\
         \n\
         Based on the brief description, write a detailed, professional work log description. Requirements:\n\
         1. Keep an objective, professional tone\n\
         2. Expand on the details without departing from the original meaning\n\
         3. Highlight key points and outcomes\n\
         4. Between 100 and 300 words\n\
         5. Write in the first person\n\
         6. Do not add a summary or a title\n\
         \n\
         Output only the improved description.",
        category = or_unspecified(request.category.as_deref()),
        task = or_unspecified(request.task.as_deref()),
        brief = request.brief_description.trim(),
    )
}

pub fn report_prompt(
    start: NaiveDate,
    end: NaiveDate,
    stats: &ReportStats,
    entries: &[WorkEntry],
) -> String {
    let categories: String = stats
        .category_stats
        .iter()
        .map(|(category, stat)| {
            format!("- {}: {} entries, {:.1} hours\n", category, stat.count, stat.hours)
        })
        .collect();

    let listed: String = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            format!(
                "{}. [{}] {} - {}\n   {} ({} hours)\n\n",
                index + 1,
                entry.date,
                entry.category,
                entry.task,
                entry.description,
                entry.duration
            )
        })
        .collect();

    format!(
        "You are a professional weekly report writer. Write a weekly report from the work log below.\n\n\
         ## Period\n{start} to {end}\n\n\
         ## Statistics\n\
         - Total hours: {total_hours}\n\
         - Entries: {total_entries}\n\
         {categories}\n\
         ## Entries\n\
         {listed}\
         ## Requirements\n\
         Write a professional weekly report with these sections:\n\
         1. **Summary** (3-5 sentences on the main work and results)\n\
         2. **Key work** (the 2-3 most important items, one paragraph each)\n\
         3. **Workload analysis** (based on categories and hours)\n\
         4. **Problems and challenges** (if the log mentions any)\n\
         5. **Plan for next week** (a reasonable continuation of this week)\n\
         \n\
         Be concise and objective. Format the output as markdown.",
        start = start,
        end = end,
        total_hours = stats.total_hours,
        total_entries = stats.total_entries,
        categories = categories,
        listed = listed,
    )
}

pub fn analysis_prompt(stats: &AnalysisStats, entries: &[WorkEntry]) -> String {
    let categories: String = stats
        .categories
        .iter()
        .map(|share| {
            format!(
                "- {}: {:.1} hours ({:.1}%), {} entries\n",
                share.name, share.hours, share.percentage, share.count
            )
        })
        .collect();

    let recent: String = entries
        .iter()
        .take(ANALYSIS_RECENT_ENTRIES)
        .enumerate()
        .map(|(index, entry)| {
            format!(
                "{}. [{}] {} - {} ({}h)\n",
                index + 1,
                entry.date,
                entry.category,
                entry.task,
                entry.duration
            )
        })
        .collect();

    format!(
        "You are a professional productivity analyst. Analyze the user's work data below and suggest improvements.\n\n\
         ## Period\nLast {days} days ({total_entries} entries)\n\n\
         ## Workload\n\
         - Total hours: {total_hours:.1}\n\
         - Average hours per day: {avg:.1}\n\
         - Busiest day: {busiest} ({busiest_hours:.1} hours)\n\
         - Quietest day: {quietest} ({quietest_hours:.1} hours)\n\n\
         ## Time by category\n\
         {categories}\n\
         ## Recent work (latest {limit})\n\
         {recent}\n\
         ## Requirements\n\
         Write a professional work analysis covering:\n\
         1. **Intensity** (is the total and daily workload reasonable)\n\
         2. **Time allocation** (are the category shares reasonable)\n\
         3. **Work patterns** (regularities, productive periods)\n\
         4. **Potential issues** (uneven allocation, one category crowding out others)\n\
         5. **Recommendations** (3-5 concrete, actionable suggestions)\n\
         \n\
         Use a professional but friendly tone. Format the output as markdown with emphasis and lists.",
        days = stats.period_days,
        total_entries = stats.total_entries,
        total_hours = stats.total_hours,
        avg = stats.avg_hours_per_day,
        busiest = stats.busiest_day.date,
        busiest_hours = stats.busiest_day.hours,
        quietest = stats.quietest_day.date,
        quietest_hours = stats.quietest_day.hours,
        categories = categories,
        limit = ANALYSIS_RECENT_ENTRIES,
        recent = recent,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::assistant::{analyze_entries, report_stats};
    use chrono::Utc;

    fn entry(day: u32, category: &str, task: &str, duration: f64) -> WorkEntry {
        WorkEntry {
            id: i64::from(day),
            user_id: "alice".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            category: category.to_string(),
            task: task.to_string(),
            description: format!("{} notes", task),
            duration,
            images: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_enhance_prompt_defaults_missing_fields() {
        let request = EnhanceRequest {
            brief_description: "  fixed login bug ".to_string(),
            task: None,
            category: Some("  ".to_string()),
            provider: None,
        };
        let prompt = enhance_prompt(&request);

        assert!(prompt.contains("Category: unspecified"));
        assert!(prompt.contains("Task: unspecified"));
        assert!(prompt.contains("Brief description: fixed login bug\n"));
    }

    #[test]
    fn test_report_prompt_sections() {
        let entries = vec![
            entry(4, "dev", "API design", 3.0),
            entry(5, "meetings", "Standup", 0.5),
        ];
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let prompt = report_prompt(start, end, &report_stats(&entries), &entries);

        assert!(prompt.contains("## Period\n2024-03-04 to 2024-03-10\n"));
        assert!(prompt.contains("- Total hours: 3.5\n- Entries: 2\n"));
        assert!(prompt.contains("- dev: 1 entries, 3.0 hours\n- meetings: 1 entries, 0.5 hours\n"));
        assert!(prompt
            .contains("1. [2024-03-04] dev - API design\n   API design notes (3 hours)\n"));
        assert!(prompt.contains("2. [2024-03-05] meetings - Standup"));
        assert!(prompt.ends_with("Format the output as markdown."));
    }

    #[test]
    fn test_analysis_prompt_lists_recent_entries_only() {
        let entries: Vec<WorkEntry> = (1..=12)
            .rev()
            .map(|day| entry(day, "dev", &format!("Task {}", day), 1.0))
            .collect();
        let stats = analyze_entries(&entries, 30).unwrap();
        let prompt = analysis_prompt(&stats, &entries);

        assert!(prompt.contains("Last 30 days (12 entries)"));
        assert!(prompt.contains("- Total hours: 12.0\n- Average hours per day: 0.4\n"));
        assert!(prompt.contains("- dev: 12.0 hours (100.0%), 12 entries\n"));
        assert!(prompt
            .contains("## Recent work (latest 10)\n1. [2024-03-12] dev - Task 12 (1h)\n"));
        assert!(prompt.contains("10. [2024-03-03] dev - Task 3 (1h)\n"));
        assert!(!prompt.contains("Task 2 "));
    }
}
