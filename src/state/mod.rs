//! Pure view state for the dashboard.
//!
//! Every panel's logic lives here as an explicit state object the TUI
//! passes to its render functions: selection sets, the crawl monitor
//! reducer, the log console and the client-side filters. None of these
//! touch the terminal or the network, so they are unit-testable on
//! their own.

pub mod analytics;
pub mod console;
pub mod progress;
pub mod routes;
pub mod selection;

pub use analytics::{BusClass, CompanyBreakdown, PredictionFilter, class_breakdown, filter_predictions};
pub use console::LogConsole;
pub use progress::{ControlPanel, CrawlMonitor, ProgressSnapshot, RunBadge};
pub use routes::{RouteFilter, StatusFilter, filter_routes, validate_url_template};
pub use selection::{SelectionState, StartError, is_valid_date};
