//! Route/date selection backing the crawl-control panel.
//!
//! Membership mirrors the checked state of the selection lists exactly:
//! toggling twice restores the set, bulk operations rewrite the whole
//! set in one pass. Nothing here survives a restart.

use std::collections::BTreeSet;

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::api::types::StartRequest;

pub const MIN_WORKERS: u32 = 1;
pub const MAX_WORKERS: u32 = 5;

/// Reason a start request was rejected before any HTTP call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("Select at least one route")]
    NoRoutes,
    #[error("Select at least one date")]
    NoDates,
    #[error("Workers must be between {MIN_WORKERS} and {MAX_WORKERS}")]
    WorkerBounds,
    #[error("Runs per task must be at least 1")]
    RunCount,
}

#[derive(Debug, Clone)]
pub struct SelectionState {
    routes: BTreeSet<String>,
    dates: BTreeSet<String>,
    pub max_workers: u32,
    pub runs_per_task: u32,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            routes: BTreeSet::new(),
            dates: BTreeSet::new(),
            max_workers: 3,
            runs_per_task: 1,
        }
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a route's membership; returns the new checked state.
    pub fn toggle_route(&mut self, route: &str) -> bool {
        if self.routes.remove(route) {
            false
        } else {
            self.routes.insert(route.to_string());
            true
        }
    }

    /// Flip a date's membership; returns the new checked state.
    pub fn toggle_date(&mut self, date: &str) -> bool {
        if self.dates.remove(date) {
            false
        } else {
            self.dates.insert(date.to_string());
            true
        }
    }

    /// Check every route in the group in a single pass.
    pub fn select_all_routes<I, S>(&mut self, routes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.routes = routes.into_iter().map(Into::into).collect();
    }

    pub fn select_all_dates<I, S>(&mut self, dates: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dates = dates.into_iter().map(Into::into).collect();
    }

    pub fn clear_routes(&mut self) {
        self.routes.clear();
    }

    pub fn clear_dates(&mut self) {
        self.dates.clear();
    }

    pub fn is_route_selected(&self, route: &str) -> bool {
        self.routes.contains(route)
    }

    pub fn is_date_selected(&self, date: &str) -> bool {
        self.dates.contains(date)
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn date_count(&self) -> usize {
        self.dates.len()
    }

    /// Tasks the server would run: routes × dates × runs.
    pub fn task_count(&self) -> u64 {
        self.routes.len() as u64 * self.dates.len() as u64 * u64::from(self.runs_per_task)
    }

    /// Gate before `POST /api/start`. On `Err` no request is sent and
    /// the existing UI state is untouched.
    pub fn validate_start(&self) -> Result<(), StartError> {
        if self.routes.is_empty() {
            return Err(StartError::NoRoutes);
        }
        if self.dates.is_empty() {
            return Err(StartError::NoDates);
        }
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&self.max_workers) {
            return Err(StartError::WorkerBounds);
        }
        if self.runs_per_task < 1 {
            return Err(StartError::RunCount);
        }
        Ok(())
    }

    /// Build the start body from the current selection.
    pub fn to_request(&self) -> StartRequest {
        StartRequest {
            routes: self.routes.iter().cloned().collect(),
            dates: self.dates.iter().cloned().collect(),
            max_workers: Some(self.max_workers),
            runs_per_task: Some(self.runs_per_task),
        }
    }
}

/// Strict `YYYY-MM-DD` check, shape via regex then calendar validity
/// via chrono.
pub fn is_valid_date(date: &str) -> bool {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    let shape = SHAPE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static regex"));
    shape.is_match(date) && chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_toggle_restores_selection() {
        let mut selection = SelectionState::new();
        selection.toggle_route("Jakarta-Semarang");
        let before: Vec<String> = selection.routes.iter().cloned().collect();

        assert!(selection.toggle_route("Jakarta-Surabaya"));
        assert!(!selection.toggle_route("Jakarta-Surabaya"));

        let after: Vec<String> = selection.routes.iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn select_all_then_clear_empties() {
        let mut selection = SelectionState::new();
        selection.select_all_routes(["Jakarta-Semarang", "Jakarta-Malang"]);
        selection.select_all_dates(["2025-12-01", "2025-12-02"]);
        assert_eq!(selection.route_count(), 2);
        assert_eq!(selection.date_count(), 2);

        selection.clear_routes();
        selection.clear_dates();
        assert_eq!(selection.route_count(), 0);
        assert_eq!(selection.date_count(), 0);
    }

    #[test]
    fn select_all_deduplicates() {
        let mut selection = SelectionState::new();
        selection.select_all_routes(["A", "A", "B"]);
        assert_eq!(selection.route_count(), 2);
    }

    #[test]
    fn start_rejected_on_empty_selection() {
        let mut selection = SelectionState::new();
        assert_eq!(selection.validate_start(), Err(StartError::NoRoutes));

        selection.toggle_route("Jakarta-Semarang");
        assert_eq!(selection.validate_start(), Err(StartError::NoDates));

        selection.toggle_date("2025-12-05");
        assert_eq!(selection.validate_start(), Ok(()));
    }

    #[test]
    fn start_rejected_on_bound_violations() {
        let mut selection = SelectionState::new();
        selection.toggle_route("Jakarta-Semarang");
        selection.toggle_date("2025-12-05");

        selection.max_workers = 0;
        assert_eq!(selection.validate_start(), Err(StartError::WorkerBounds));
        selection.max_workers = 6;
        assert_eq!(selection.validate_start(), Err(StartError::WorkerBounds));
        selection.max_workers = 5;
        assert_eq!(selection.validate_start(), Ok(()));

        selection.runs_per_task = 0;
        assert_eq!(selection.validate_start(), Err(StartError::RunCount));
    }

    #[test]
    fn task_count_multiplies_runs() {
        let mut selection = SelectionState::new();
        selection.select_all_routes(["A", "B", "C"]);
        selection.select_all_dates(["2025-12-01", "2025-12-02"]);
        selection.runs_per_task = 4;
        assert_eq!(selection.task_count(), 24);
    }

    #[test]
    fn date_validation() {
        assert!(is_valid_date("2025-12-05"));
        assert!(!is_valid_date("2025-13-05"));
        assert!(!is_valid_date("05-12-2025"));
        assert!(!is_valid_date("2025-12-5"));
        assert!(!is_valid_date("tomorrow"));
    }
}
