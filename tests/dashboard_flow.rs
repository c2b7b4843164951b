//! End-to-end exercises of the dashboard state machinery, driven the
//! way the event loop drives it: decoded push frames and status polls
//! feeding the app, keyboard actions mutating the views. No network.

use busdash::api::events::decode_frame;
use busdash::api::types::{CrawlStats, CrawlStatus};
use busdash::api::ServerEvent;
use busdash::config::AppConfig;
use busdash::state::{CrawlMonitor, SelectionState};
use busdash::tui::app::{Action, CrawlPane, DashboardApp, Prompt, PromptKey, View};

fn app() -> DashboardApp {
    let mut app = DashboardApp::new(AppConfig::default());
    app.data.catalog.routes = vec![
        "Jakarta-Semarang".to_string(),
        "Jakarta-Malang".to_string(),
    ];
    app.data.catalog.dates = vec!["2026-09-01".to_string(), "2026-09-02".to_string()];
    app
}

fn status(running: bool, completed: u64, total: u64) -> CrawlStatus {
    CrawlStatus {
        is_running: running,
        stats: CrawlStats::default(),
        progress: if total > 0 {
            completed as f64 * 100.0 / total as f64
        } else {
            0.0
        },
        total_tasks: total,
        completed_tasks: completed,
        current_tasks: vec![],
    }
}

#[tokio::test]
async fn crawl_lifecycle_through_both_update_paths() {
    let mut monitor = CrawlMonitor::new();

    // Local echo of an accepted start
    monitor.on_start_accepted(4);
    assert!(monitor.is_running());
    assert!(!monitor.control().start_enabled);

    // Push channel reports progress
    let frame = decode_frame(
        r#"{"event":"progress_update","data":{"progress":50.0,"completed":2,"total":4}}"#,
    )
    .unwrap();
    let ServerEvent::ProgressUpdate(update) = frame else {
        panic!("expected progress frame");
    };
    assert!(monitor.on_push_progress(&update));
    assert_eq!(monitor.snapshot().completed, 2);

    // A late poll from before the push must not move progress backwards
    monitor.on_status(&status(true, 1, 4));
    assert_eq!(monitor.snapshot().completed, 2);

    // Completion freezes the display
    let done = decode_frame(
        r#"{"event":"progress_update","data":{"progress":100.0,"completed":4,"total":4}}"#,
    )
    .unwrap();
    let ServerEvent::ProgressUpdate(update) = done else {
        panic!("expected progress frame");
    };
    monitor.on_push_progress(&update);
    assert_eq!(monitor.eta_label(), "Completed!");

    // Poll confirms idle, controls flip back
    monitor.on_status(&status(false, 4, 4));
    assert!(monitor.control().start_enabled);
}

#[tokio::test]
async fn selection_keys_toggle_and_gate_start() {
    let mut app = app();

    // Toggle the first route and first date via the keymap
    app.handle_action(Action::Select).await;
    app.handle_action(Action::SwitchPane).await;
    app.handle_action(Action::Select).await;

    assert!(app.selection.is_route_selected("Jakarta-Semarang"));
    assert!(app.selection.is_date_selected("2026-09-01"));
    assert_eq!(app.selection.task_count(), 1);

    // Start raises a confirmation, not a request
    app.handle_action(Action::Start).await;
    assert!(matches!(app.prompt, Some(Prompt::Confirm { .. })));

    // Declining clears the prompt
    app.handle_prompt_key(PromptKey::Char('n')).await;
    assert!(app.prompt.is_none());
}

#[tokio::test]
async fn empty_selection_cannot_start() {
    let mut app = app();
    app.handle_action(Action::Start).await;

    // Validation failed, so no confirmation was raised
    assert!(app.prompt.is_none());
    assert!(app.error.as_deref().is_some_and(|e| e.contains("route")));
}

#[tokio::test]
async fn worker_and_run_keys_stay_in_bounds() {
    let mut app = app();
    for _ in 0..10 {
        app.handle_action(Action::WorkersUp).await;
    }
    assert_eq!(app.selection.max_workers, 5);
    for _ in 0..10 {
        app.handle_action(Action::WorkersDown).await;
    }
    assert_eq!(app.selection.max_workers, 1);
    for _ in 0..3 {
        app.handle_action(Action::RunsDown).await;
    }
    assert_eq!(app.selection.runs_per_task, 1);
}

#[tokio::test]
async fn push_frames_land_in_the_console() {
    let mut app = app();

    let log = decode_frame(
        r#"{"event":"log_update","data":{"message":"Scraping Jakarta-Semarang","level":"info","timestamp":"10:00:01","platform":"redbus"}}"#,
    )
    .unwrap();
    app.on_server_event(log);

    let task = decode_frame(
        r#"{"event":"task_complete","data":{"task":"Jakarta-Semarang 2026-09-01","worker":2}}"#,
    )
    .unwrap();
    app.on_server_event(task);

    assert_eq!(app.console.len(), 2);
    let last = app.console.visible().last().unwrap();
    assert!(last.message.contains("[Worker 2] Completed"));

    // Platform filter hides tagged entries from other platforms but
    // keeps untagged ones
    app.console.set_filter(Some("traveloka".to_string()));
    assert_eq!(app.console.visible().count(), 1);
}

#[tokio::test]
async fn prompt_editing_round_trip() {
    let mut app = app();
    app.handle_action(Action::Tab(2)).await; // routes view, server off so list is empty
    assert!(matches!(app.view, View::Routes { .. }));

    app.handle_action(Action::Add).await;
    assert!(matches!(app.prompt, Some(Prompt::Input { .. })));

    for c in "abc".chars() {
        app.handle_prompt_key(PromptKey::Char(c)).await;
    }
    app.handle_prompt_key(PromptKey::Backspace).await;
    let Some(Prompt::Input { buffer, .. }) = &app.prompt else {
        panic!("prompt should still be open");
    };
    assert_eq!(buffer, "ab");

    app.handle_prompt_key(PromptKey::Cancel).await;
    assert!(app.prompt.is_none());
}

#[tokio::test]
async fn prediction_filter_parses_route_and_range() {
    let mut app = app();
    app.handle_action(Action::Tab(4)).await;
    app.handle_action(Action::Search).await;
    for c in "jakarta 2026-09-01..2026-09-30".chars() {
        app.handle_prompt_key(PromptKey::Char(c)).await;
    }
    app.handle_prompt_key(PromptKey::Submit).await;

    assert_eq!(app.prediction_filter.route, "jakarta");
    assert!(app.prediction_filter.from.is_some());
    assert!(app.prediction_filter.to.is_some());
}

#[test]
fn cli_selection_matches_tui_selection() {
    // The start subcommand builds the same request the TUI does
    let mut selection = SelectionState::new();
    selection.select_all_routes(["Jakarta-Semarang"]);
    selection.select_all_dates(["2026-09-01", "2026-09-02"]);
    selection.runs_per_task = 2;

    let request = selection.to_request();
    assert_eq!(request.routes.len(), 1);
    assert_eq!(request.dates.len(), 2);
    assert_eq!(request.runs_per_task, Some(2));
    assert_eq!(selection.task_count(), 4);
}
