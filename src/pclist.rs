//! Repair-job list ("PC list"): an in-memory cache of the service's job
//! records with local filtering and sorting.

use chrono::NaiveDateTime;

use crate::error::AppError;
use crate::models::{NewPcInput, PcEntry};
use crate::remote::RemoteService;

/// Terminal job status; everything else counts as in progress.
pub const STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PcSort {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
    ClientNameAsc,
    ClientNameDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcStats {
    pub total: usize,
    pub in_progress: usize,
    pub completed: usize,
}

/// Cache of loaded jobs plus the currently filtered view over them.
#[derive(Debug, Default)]
pub struct PcListCache {
    entries: Vec<PcEntry>,
    filtered: Vec<PcEntry>,
}

impl PcListCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload the cache from the service. Resets the filtered view to the
    /// full list. Returns the number of entries loaded.
    pub async fn load(&mut self, remote: &dyn RemoteService) -> Result<usize, AppError> {
        let entries = remote.get_pc_list().await?;
        Ok(self.set_entries(entries))
    }

    /// Replace the cached entries, resetting the filtered view.
    pub fn set_entries(&mut self, entries: Vec<PcEntry>) -> usize {
        self.entries = entries;
        self.filtered = self.entries.clone();
        tracing::debug!(count = self.entries.len(), "PC list loaded");
        self.entries.len()
    }

    /// Apply a case-insensitive substring search over name, phone, IMEI,
    /// problem description, and ticket number, combined with an exact
    /// status filter (empty/`None` status matches everything).
    pub fn filter(&mut self, search: &str, status: Option<&str>) {
        let needle = search.to_lowercase();
        self.filtered = self
            .entries
            .iter()
            .filter(|pc| {
                let matches_search = needle.is_empty()
                    || pc.client_name.to_lowercase().contains(&needle)
                    || pc.client_phone.contains(&needle)
                    || pc.imei.as_deref().is_some_and(|i| i.to_lowercase().contains(&needle))
                    || pc.problem_description.to_lowercase().contains(&needle)
                    || pc
                        .ticket_number
                        .as_deref()
                        .is_some_and(|t| t.to_lowercase().contains(&needle));

                let matches_status = match status {
                    None | Some("") => true,
                    Some(s) => pc.status == s,
                };

                matches_search && matches_status
            })
            .cloned()
            .collect();
    }

    /// Sort the filtered view in place.
    pub fn sort(&mut self, key: PcSort) {
        match key {
            PcSort::CreatedAtDesc => self
                .filtered
                .sort_by_key(|pc| std::cmp::Reverse(parse_created(&pc.created_at))),
            PcSort::CreatedAtAsc => self.filtered.sort_by_key(|pc| parse_created(&pc.created_at)),
            PcSort::ClientNameAsc => self
                .filtered
                .sort_by_key(|pc| pc.client_name.to_lowercase()),
            PcSort::ClientNameDesc => self
                .filtered
                .sort_by_key(|pc| std::cmp::Reverse(pc.client_name.to_lowercase())),
        }
    }

    pub fn entries(&self) -> &[PcEntry] {
        &self.filtered
    }

    /// Counts over the filtered view.
    pub fn stats(&self) -> PcStats {
        let completed = self
            .filtered
            .iter()
            .filter(|pc| pc.status == STATUS_COMPLETED)
            .count();
        PcStats {
            total: self.filtered.len(),
            in_progress: self.filtered.len() - completed,
            completed,
        }
    }
}

/// Submit a new job to the service. Callers reload the cache afterwards.
pub async fn save_new_pc(remote: &dyn RemoteService, input: &NewPcInput) -> Result<(), AppError> {
    remote.add_pc(input).await?;
    tracing::info!(client = %input.client_name, "new PC saved");
    Ok(())
}

/// Service timestamps arrive either as RFC 3339 or as the classic
/// `YYYY-MM-DD HH:MM:SS`; anything unparsable sorts to the epoch.
fn parse_created(s: &str) -> NaiveDateTime {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|d| d.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .unwrap_or(NaiveDateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, name: &str, status: &str, created_at: &str) -> PcEntry {
        PcEntry {
            id,
            ticket_number: Some(format!("T-{id}")),
            client_name: name.to_string(),
            client_phone: "0612345678".to_string(),
            device_type: "laptop".to_string(),
            device_brand: "Acme".to_string(),
            device_model: "Book".to_string(),
            imei: Some("123456789012345".to_string()),
            problem_description: "won't boot".to_string(),
            status: status.to_string(),
            created_at: created_at.to_string(),
        }
    }

    fn loaded_cache() -> PcListCache {
        let mut cache = PcListCache::default();
        cache.entries = vec![
            entry(1, "Jean Martin", "in_progress", "2025-08-01 09:00:00"),
            entry(2, "Alice Durand", STATUS_COMPLETED, "2025-08-03 09:00:00"),
            entry(3, "Bernard Petit", "in_progress", "2025-08-02 09:00:00"),
        ];
        cache.filtered = cache.entries.clone();
        cache
    }

    #[test]
    fn test_filter_by_name_is_case_insensitive() {
        let mut cache = loaded_cache();
        cache.filter("jean", None);
        assert_eq!(cache.entries().len(), 1);
        assert_eq!(cache.entries()[0].id, 1);
    }

    #[test]
    fn test_filter_by_ticket_number() {
        let mut cache = loaded_cache();
        cache.filter("t-2", None);
        assert_eq!(cache.entries().len(), 1);
        assert_eq!(cache.entries()[0].id, 2);
    }

    #[test]
    fn test_filter_combines_search_and_status() {
        let mut cache = loaded_cache();
        cache.filter("", Some(STATUS_COMPLETED));
        assert_eq!(cache.entries().len(), 1);

        cache.filter("jean", Some(STATUS_COMPLETED));
        assert!(cache.entries().is_empty());

        // Empty status string matches everything.
        cache.filter("", Some(""));
        assert_eq!(cache.entries().len(), 3);
    }

    #[test]
    fn test_sort_by_created_at() {
        let mut cache = loaded_cache();
        cache.sort(PcSort::CreatedAtDesc);
        let ids: Vec<i64> = cache.entries().iter().map(|pc| pc.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        cache.sort(PcSort::CreatedAtAsc);
        let ids: Vec<i64> = cache.entries().iter().map(|pc| pc.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_sort_by_client_name() {
        let mut cache = loaded_cache();
        cache.sort(PcSort::ClientNameAsc);
        let names: Vec<&str> = cache.entries().iter().map(|pc| pc.client_name.as_str()).collect();
        assert_eq!(names, vec!["Alice Durand", "Bernard Petit", "Jean Martin"]);
    }

    #[test]
    fn test_stats_split_by_status() {
        let cache = loaded_cache();
        let stats = cache.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.in_progress, 2);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn test_unparsable_dates_sort_to_epoch() {
        let mut cache = PcListCache::default();
        cache.entries = vec![
            entry(1, "A", "in_progress", "garbage"),
            entry(2, "B", "in_progress", "2025-08-01T10:00:00+00:00"),
        ];
        cache.filtered = cache.entries.clone();
        cache.sort(PcSort::CreatedAtDesc);
        assert_eq!(cache.entries()[0].id, 2);
    }
}
