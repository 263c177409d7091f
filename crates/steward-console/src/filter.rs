//! Two-stage run filtering and pagination.
//!
//! The server stage builds the query sent with each page fetch; the client
//! stage refines the already-fetched page locally. The two are never
//! merged: client bounds are not sent to the service.

use chrono::{DateTime, NaiveDate, Utc};
use steward_api::types::RunQuery;

use crate::run_view::{RunStatus, RunView};

/// Page sizes the console offers.
pub const PAGE_SIZES: [u32; 3] = [25, 50, 100];

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Current page window into the server-side run listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Change the page size, snapping unknown sizes to the default.
    /// Always rewinds to the first page.
    pub fn set_limit(&mut self, limit: u32) {
        self.limit = if PAGE_SIZES.contains(&limit) {
            limit
        } else {
            DEFAULT_PAGE_SIZE
        };
        self.offset = 0;
    }

    pub fn next(&mut self) {
        self.offset = self.offset.saturating_add(u64::from(self.limit));
    }

    pub fn prev(&mut self) {
        self.offset = self.offset.saturating_sub(u64::from(self.limit));
    }
}

/// Filters sent verbatim with the server page fetch. Empty strings mean
/// "no constraint" and are dropped from the query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerFilters {
    pub status: Option<RunStatus>,
    pub job_type: String,
    pub project_id: String,
    pub model: String,
}

impl ServerFilters {
    #[must_use]
    pub fn to_query(&self, page: &Pagination) -> RunQuery {
        RunQuery {
            status: self.status.map(|s| s.as_str().to_string()),
            job_type: non_empty(&self.job_type),
            project_id: non_empty(&self.project_id),
            model: non_empty(&self.model),
            limit: page.limit,
            offset: page.offset,
        }
    }
}

/// Client-stage filter text exactly as the presentation layer edits it.
/// Dates are `YYYY-MM-DD`; token bounds are decimal integers. Resolution
/// happens at filter time so typing an incomplete value never errors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientFilters {
    pub from: String,
    pub to: String,
    pub token_min: String,
    pub token_max: String,
}

impl ClientFilters {
    /// Parse the raw text into concrete bounds. Unparseable text resolves
    /// to an absent bound, never an error.
    #[must_use]
    pub fn resolve(&self) -> ResolvedClientFilters {
        ResolvedClientFilters {
            from: parse_day(&self.from).and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc()),
            to: parse_day(&self.to).and_then(|d| d.and_hms_opt(23, 59, 59)).map(|dt| dt.and_utc()),
            token_min: parse_tokens(&self.token_min),
            token_max: parse_tokens(&self.token_max),
        }
    }
}

/// Concrete client-stage bounds. `None` means unconstrained on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedClientFilters {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub token_min: Option<i64>,
    pub token_max: Option<i64>,
}

impl ResolvedClientFilters {
    /// Whether this run passes every bound.
    ///
    /// A run without a timestamp passes both date bounds. A run without a
    /// token count reads as negative infinity against the min bound and
    /// positive infinity against the max bound, so either bound excludes it.
    #[must_use]
    pub fn matches(&self, run: &RunView) -> bool {
        if let (Some(from), Some(created)) = (self.from, run.created_at) {
            if created < from {
                return false;
            }
        }
        if let (Some(to), Some(created)) = (self.to, run.created_at) {
            if created > to {
                return false;
            }
        }
        if let Some(min) = self.token_min {
            if run.total_tokens.unwrap_or(i64::MIN) < min {
                return false;
            }
        }
        if let Some(max) = self.token_max {
            if run.total_tokens.unwrap_or(i64::MAX) > max {
                return false;
            }
        }
        true
    }
}

/// Apply the client stage to a fetched page: an order-preserving
/// subsequence. Deterministic pure function of its inputs.
#[must_use]
pub fn filter_runs<'a>(runs: &'a [RunView], filters: &ResolvedClientFilters) -> Vec<&'a RunView> {
    runs.iter().filter(|run| filters.matches(run)).collect()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn parse_tokens(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::{filter_runs, ClientFilters, Pagination, ServerFilters, PAGE_SIZES};
    use crate::run_view::{derive_run_view, RunStatus, RunView};

    fn run_with_tokens(id: &str, tokens: Option<i64>) -> RunView {
        let mut record = json!({"id": id, "status": "failed"});
        if let Some(tokens) = tokens {
            record["total_tokens"] = json!(tokens);
        }
        derive_run_view(&record)
    }

    fn run_created_at(id: &str, created: &str) -> RunView {
        derive_run_view(&json!({"id": id, "created_at": created}))
    }

    fn ids(runs: &[&RunView]) -> Vec<String> {
        runs.iter().filter_map(|r| r.id.clone()).collect()
    }

    #[test]
    fn server_filters_build_query_dropping_blanks() {
        let filters = ServerFilters {
            status: Some(RunStatus::Failed),
            job_type: "  ".to_string(),
            project_id: "proj-a".to_string(),
            model: String::new(),
        };
        let query = filters.to_query(&Pagination { limit: 25, offset: 50 });
        assert_eq!(query.status.as_deref(), Some("failed"));
        assert_eq!(query.job_type, None);
        assert_eq!(query.project_id.as_deref(), Some("proj-a"));
        assert_eq!(query.model, None);
        assert_eq!(query.limit, 25);
        assert_eq!(query.offset, 50);
    }

    #[test]
    fn pagination_snaps_limit_and_saturates() {
        let mut page = Pagination::default();
        assert!(PAGE_SIZES.contains(&page.limit));

        page.set_limit(100);
        assert_eq!(page.limit, 100);
        page.next();
        assert_eq!(page.offset, 100);
        page.set_limit(17);
        assert_eq!(page.limit, 50);
        assert_eq!(page.offset, 0);
        page.prev();
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn token_min_excludes_low_and_missing_counts() {
        let runs = vec![
            run_with_tokens("r10", Some(10)),
            run_with_tokens("r20", Some(20)),
            run_with_tokens("rnull", None),
            run_with_tokens("r40", Some(40)),
            run_with_tokens("r50", Some(50)),
        ];
        let filters = ClientFilters {
            token_min: "15".to_string(),
            ..ClientFilters::default()
        }
        .resolve();
        assert_eq!(ids(&filter_runs(&runs, &filters)), vec!["r20", "r40", "r50"]);
    }

    #[test]
    fn token_max_excludes_high_and_missing_counts() {
        let runs = vec![
            run_with_tokens("r50", Some(50)),
            run_with_tokens("r150", Some(150)),
            run_with_tokens("r90", Some(90)),
            run_with_tokens("rnull", None),
        ];
        let filters = ClientFilters {
            token_max: "100".to_string(),
            ..ClientFilters::default()
        }
        .resolve();
        assert_eq!(ids(&filter_runs(&runs, &filters)), vec!["r50", "r90"]);
    }

    #[test]
    fn date_bounds_are_inclusive_calendar_days() {
        let runs = vec![
            run_created_at("early", "2025-05-31T23:59:00Z"),
            run_created_at("start", "2025-06-01T00:00:00Z"),
            run_created_at("end", "2025-06-02T23:59:59Z"),
            run_created_at("late", "2025-06-03T00:00:00Z"),
            run_created_at("undated", ""),
        ];
        let filters = ClientFilters {
            from: "2025-06-01".to_string(),
            to: "2025-06-02".to_string(),
            ..ClientFilters::default()
        }
        .resolve();
        // Runs without a parseable timestamp pass both date bounds.
        assert_eq!(
            ids(&filter_runs(&runs, &filters)),
            vec!["start", "end", "undated"]
        );
    }

    #[test]
    fn invalid_bound_text_is_treated_as_absent() {
        let runs = vec![run_with_tokens("r10", Some(10))];
        let filters = ClientFilters {
            from: "junk".to_string(),
            to: "2025-13-99".to_string(),
            token_min: "lots".to_string(),
            token_max: String::new(),
        }
        .resolve();
        assert_eq!(filters.from, None);
        assert_eq!(filters.to, None);
        assert_eq!(filters.token_min, None);
        assert_eq!(ids(&filter_runs(&runs, &filters)), vec!["r10"]);
    }

    #[test]
    fn filtering_is_idempotent_and_order_preserving() {
        let runs = vec![
            run_with_tokens("r50", Some(50)),
            run_with_tokens("r150", Some(150)),
            run_with_tokens("r90", Some(90)),
        ];
        let filters = ClientFilters {
            token_max: "100".to_string(),
            ..ClientFilters::default()
        }
        .resolve();

        let once = filter_runs(&runs, &filters);
        let once_owned: Vec<_> = once.iter().map(|r| (*r).clone()).collect();
        let twice = filter_runs(&once_owned, &filters);
        assert_eq!(ids(&once), ids(&twice));
        assert_eq!(ids(&once), vec!["r50", "r90"]);
    }
}
