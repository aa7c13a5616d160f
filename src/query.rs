//! Board filtering: search text, priority set and sort order.
//!
//! The filter round-trips through a query string
//! (`q=login&priority=low,high&sort=newest`) so a filtered board can be
//! bookmarked or shared.

use crate::clock::parse_timestamp;
use crate::types::{Priority, Status, Task};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Order applied on top of the board's own order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recently created first
    Newest,
    /// Oldest created first
    Oldest,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

/// Filter applied to the board's task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Case-insensitive substring of title or description
    pub search: String,
    /// Keep only these priorities; empty keeps all
    pub priorities: Vec<Priority>,
    pub sort: Option<SortOrder>,
}

/// Query-string shape of a [`Filter`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct QueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sort: Option<String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        if !self.priorities.contains(&priority) {
            self.priorities.push(priority);
        }
        self
    }

    pub fn priorities(mut self, priorities: impl IntoIterator<Item = Priority>) -> Self {
        for priority in priorities {
            self = self.priority(priority);
        }
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    /// True when the filter keeps every task in its original order.
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.priorities.is_empty() && self.sort.is_none()
    }

    /// Whether `task` passes the search and priority filters.
    pub fn matches(&self, task: &Task) -> bool {
        let search_ok = self.search.is_empty() || {
            let needle = self.search.to_lowercase();
            task.title.to_lowercase().contains(&needle) || task.description.to_lowercase().contains(&needle)
        };
        let priority_ok = self.priorities.is_empty() || self.priorities.contains(&task.priority);
        search_ok && priority_ok
    }

    /// Filter and sort `tasks`. Sorting is stable, so ties keep board order.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        let mut result: Vec<Task> = tasks.iter().filter(|t| self.matches(t)).cloned().collect();
        if let Some(sort) = self.sort {
            result.sort_by(|a, b| {
                let (ta, tb) = (parse_timestamp(&a.created_at), parse_timestamp(&b.created_at));
                match sort {
                    SortOrder::Newest => tb.cmp(&ta),
                    SortOrder::Oldest => ta.cmp(&tb),
                }
            });
        }
        result
    }

    /// Parse a query string. Unknown priorities and sort values are ignored.
    pub fn from_query_string(query: &str) -> Self {
        let params: QueryParams = serde_urlencoded::from_str(query.trim_start_matches('?')).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed filter query '{}': {}", query, e);
            QueryParams::default()
        });

        Filter {
            search: params.q.unwrap_or_default(),
            priorities: Vec::new(),
            sort: params.sort.and_then(|s| s.parse().ok()),
        }
        .priorities(
            params
                .priority
                .iter()
                .flat_map(|p| p.split(','))
                .filter_map(|p| p.parse().ok()),
        )
    }

    /// Encode as a query string, omitting parts that are unset.
    pub fn to_query_string(&self) -> String {
        let params = QueryParams {
            q: (!self.search.is_empty()).then(|| self.search.clone()),
            priority: (!self.priorities.is_empty()).then(|| {
                self.priorities
                    .iter()
                    .map(Priority::as_str)
                    .collect::<Vec<_>>()
                    .join(",")
            }),
            sort: self.sort.map(|s| s.as_str().to_string()),
        };
        serde_urlencoded::to_string(&params).unwrap_or_default()
    }
}

/// Split tasks into the three board columns, keeping order within each.
pub fn columns(tasks: &[Task]) -> Vec<(Status, Vec<&Task>)> {
    Status::ALL
        .into_iter()
        .map(|status| (status, tasks.iter().filter(|t| t.status == status).collect()))
        .collect()
}

/// Whether a due date lies strictly before `today`.
///
/// Tasks without a due date, or with one that is not `YYYY-MM-DD`, are never
/// overdue.
pub fn is_overdue(due_date: Option<&str>, today: NaiveDate) -> bool {
    due_date
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .is_some_and(|due| due < today)
}
