//! One markdown digest per run, built from that run's new summaries.

use chrono::{Local, Utc};
use muse_core::{ArticleStore, NewCombinedSummary, Result, SummaryEntry};

const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Human-readable label for a run date, e.g. `October 19, 2026`.
pub fn date_label(date: chrono::NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// One section per entry, in the order given. `None` for an empty run.
pub fn build_combined_markdown(entries: &[SummaryEntry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let sections: Vec<String> = entries
        .iter()
        .map(|entry| {
            format!(
                "## {}\n\n**Journal:** {}\n**Authors:** {}\n\n{}",
                entry.title.trim(),
                entry.journal.trim(),
                entry.authors.trim(),
                entry.summary.trim()
            )
        })
        .collect();
    Some(sections.join(SECTION_SEPARATOR))
}

/// Store the run's combined summary dated with today's local date. Writes
/// nothing and returns `None` when the run produced no summaries.
pub async fn record_combined_summary(
    store: &dyn ArticleStore,
    entries: &[SummaryEntry],
) -> Result<Option<i64>> {
    let Some(content) = build_combined_markdown(entries) else {
        tracing::info!("No new summaries this run, skipping combined summary");
        return Ok(None);
    };
    let summary = NewCombinedSummary {
        date: date_label(Local::now().date_naive()),
        content,
        created_at: Utc::now(),
    };
    let id = store.insert_combined_summary(&summary).await?;
    tracing::info!("📚 Stored combined summary #{} with {} articles", id, entries.len());
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use muse_storage::InMemoryStorage;

    fn entry(title: &str) -> SummaryEntry {
        SummaryEntry {
            title: title.to_string(),
            journal: "AJS Review".to_string(),
            authors: "J. Rosen".to_string(),
            summary: format!("Summary of {}.", title),
        }
    }

    #[test]
    fn test_sections_keep_input_order() {
        let entries = vec![entry("Zeta"), entry("Alpha"), entry("Mu")];
        let markdown = build_combined_markdown(&entries).unwrap();
        let sections: Vec<&str> = markdown.split(SECTION_SEPARATOR).collect();

        assert_eq!(sections.len(), 3);
        for (section, entry) in sections.iter().zip(&entries) {
            assert!(section.starts_with(&format!("## {}\n", entry.title)));
            assert!(section.contains("**Journal:** AJS Review"));
            assert!(section.contains("**Authors:** J. Rosen"));
            assert!(section.ends_with(&entry.summary));
        }
    }

    #[test]
    fn test_empty_run_has_no_document() {
        assert!(build_combined_markdown(&[]).is_none());
    }

    #[test]
    fn test_date_label() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 9).unwrap();
        assert_eq!(date_label(date), "October 9, 2026");
    }

    #[tokio::test]
    async fn test_record_skips_empty_runs() {
        let store = InMemoryStorage::new();
        assert_eq!(record_combined_summary(&store, &[]).await.unwrap(), None);
        assert!(store.list_combined_summaries().await.unwrap().is_empty());

        let id = record_combined_summary(&store, &[entry("One")]).await.unwrap();
        assert_eq!(id, Some(1));
        let stored = store.latest_combined_summary().await.unwrap().unwrap();
        assert!(stored.content.starts_with("## One"));
    }
}
