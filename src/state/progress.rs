//! Crawl monitor: the single reducer behind the progress display.
//!
//! The status poller and the push channel both report progress for the
//! same job. Rather than letting two update paths race on the rendered
//! fields (last write wins, visible flicker), both feed this reducer,
//! which drops stale updates: while a job is running, an update may not
//! move `completed` backwards unless it announces a new job.

use std::time::{Duration, Instant};

use crate::api::types::{CrawlStats, CrawlStatus, ProgressUpdate};

/// Running-state badge next to the start/stop controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunBadge {
    #[default]
    Idle,
    Running,
}

impl RunBadge {
    pub fn label(self) -> &'static str {
        match self {
            RunBadge::Idle => "IDLE",
            RunBadge::Running => "RUNNING",
        }
    }
}

/// Start/stop button enablement, recomputed only when `is_running`
/// flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlPanel {
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub badge: RunBadge,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            start_enabled: true,
            stop_enabled: false,
            badge: RunBadge::Idle,
        }
    }
}

impl ControlPanel {
    fn for_running(running: bool) -> Self {
        Self {
            start_enabled: !running,
            stop_enabled: running,
            badge: if running {
                RunBadge::Running
            } else {
                RunBadge::Idle
            },
        }
    }
}

/// Latest merged view of job progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSnapshot {
    pub progress: f64,
    pub completed: u64,
    pub total: u64,
    pub current_tasks: Vec<String>,
}

/// Wall-clock tracker for the running job. Stopped exactly once, on
/// completion or user stop, so no interval leaks past the job.
#[derive(Debug, Clone, Default)]
struct ElapsedTimer {
    started: Option<Instant>,
    frozen: Option<Duration>,
}

impl ElapsedTimer {
    fn start(&mut self) {
        self.started = Some(Instant::now());
        self.frozen = None;
    }

    fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.frozen = Some(started.elapsed());
        }
    }

    fn is_running(&self) -> bool {
        self.started.is_some()
    }

    fn elapsed(&self) -> Option<Duration> {
        self.started.map(|s| s.elapsed()).or(self.frozen)
    }
}

/// Merged crawl state driving the control panel, progress bar, active
/// worker list and elapsed/ETA readouts.
#[derive(Debug, Clone, Default)]
pub struct CrawlMonitor {
    snapshot: ProgressSnapshot,
    stats: CrawlStats,
    running: bool,
    completed: bool,
    control: ControlPanel,
    timer: ElapsedTimer,
}

impl CrawlMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    pub fn control(&self) -> ControlPanel {
        self.control
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stale check shared by both update paths: a new job (zero
    /// completed, different total) always passes; otherwise `completed`
    /// must not go backwards.
    fn accepts(&self, completed: u64, total: u64) -> bool {
        if completed == 0 && total != self.snapshot.total {
            return true;
        }
        completed >= self.snapshot.completed
    }

    /// Local echo of an accepted `POST /api/start`: flip the controls
    /// immediately instead of waiting for the next poll.
    pub fn on_start_accepted(&mut self, total_tasks: u64) {
        self.snapshot = ProgressSnapshot {
            total: total_tasks,
            ..Default::default()
        };
        self.stats = CrawlStats::default();
        self.completed = false;
        self.set_running(true);
        self.timer.start();
    }

    /// User confirmed a stop. The server keeps finishing current tasks;
    /// locally we only freeze the timer and wait for the poller to
    /// report the real state.
    pub fn on_stop_requested(&mut self) {
        self.timer.stop();
    }

    /// Apply a push `progress_update`. Returns true if the update was
    /// accepted (not stale).
    pub fn on_push_progress(&mut self, update: &ProgressUpdate) -> bool {
        if !self.accepts(update.completed, update.total) {
            return false;
        }

        self.snapshot = ProgressSnapshot {
            progress: update.progress,
            completed: update.completed,
            total: update.total,
            current_tasks: update
                .active_tasks()
                .into_iter()
                .map(String::from)
                .collect(),
        };

        if update.total > 0 && update.completed == update.total && update.progress >= 100.0 {
            self.completed = true;
            self.timer.stop();
        }

        true
    }

    /// Apply a polled `/api/status` snapshot. Returns true if the
    /// running flag changed, i.e. button/badge state needs a redraw.
    pub fn on_status(&mut self, status: &CrawlStatus) -> bool {
        self.stats = status.stats.clone();

        if self.accepts(status.completed_tasks, status.total_tasks) {
            self.snapshot = ProgressSnapshot {
                progress: status.progress,
                completed: status.completed_tasks,
                total: status.total_tasks,
                current_tasks: status.current_tasks.clone(),
            };
        }

        let changed = status.is_running != self.running;
        if changed {
            self.set_running(status.is_running);
            if status.is_running {
                self.completed = false;
                if !self.timer.is_running() {
                    self.timer.start();
                }
            } else {
                self.timer.stop();
            }
        }
        changed
    }

    fn set_running(&mut self, running: bool) {
        self.running = running;
        self.control = ControlPanel::for_running(running);
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.timer.elapsed()
    }

    /// ETA readout: "Completed!" once done, an estimate while running,
    /// a placeholder otherwise.
    pub fn eta_label(&self) -> String {
        if self.completed {
            return "Completed!".to_string();
        }

        let Some(elapsed) = self.timer.elapsed() else {
            return "--".to_string();
        };
        let progress = self.snapshot.progress;
        if !self.timer.is_running() || progress <= 0.0 {
            return "--".to_string();
        }

        let remaining_secs = elapsed.as_secs_f64() * (100.0 - progress).max(0.0) / progress;
        format_duration(Duration::from_secs_f64(remaining_secs))
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(completed: u64, total: u64, progress: f64) -> ProgressUpdate {
        ProgressUpdate {
            progress,
            completed,
            total,
            current_task: None,
            current_tasks: vec![],
            platform: None,
        }
    }

    fn status(running: bool, completed: u64, total: u64) -> CrawlStatus {
        CrawlStatus {
            is_running: running,
            completed_tasks: completed,
            total_tasks: total,
            progress: if total > 0 {
                completed as f64 * 100.0 / total as f64
            } else {
                0.0
            },
            ..Default::default()
        }
    }

    #[test]
    fn completion_stops_timer_and_marks_eta() {
        let mut monitor = CrawlMonitor::new();
        monitor.on_start_accepted(10);
        assert!(monitor.timer.is_running());

        assert!(monitor.on_push_progress(&push(10, 10, 100.0)));
        assert!(!monitor.timer.is_running());
        assert_eq!(monitor.eta_label(), "Completed!");
    }

    #[test]
    fn stale_poll_after_fresher_push_is_dropped() {
        let mut monitor = CrawlMonitor::new();
        monitor.on_start_accepted(10);

        monitor.on_push_progress(&push(7, 10, 70.0));
        // Poll response issued before the push arrives late
        monitor.on_status(&status(true, 5, 10));

        assert_eq!(monitor.snapshot().completed, 7);
    }

    #[test]
    fn new_job_resets_even_with_lower_completed() {
        let mut monitor = CrawlMonitor::new();
        monitor.on_start_accepted(10);
        monitor.on_push_progress(&push(9, 10, 90.0));

        // Fresh job with a different task count starts from zero
        assert!(monitor.on_push_progress(&push(0, 24, 0.0)));
        assert_eq!(monitor.snapshot().total, 24);
        assert_eq!(monitor.snapshot().completed, 0);
    }

    #[test]
    fn running_transition_flips_controls() {
        let mut monitor = CrawlMonitor::new();
        assert!(monitor.control().start_enabled);
        assert!(!monitor.control().stop_enabled);

        assert!(monitor.on_status(&status(true, 0, 10)));
        assert!(!monitor.control().start_enabled);
        assert!(monitor.control().stop_enabled);
        assert_eq!(monitor.control().badge, RunBadge::Running);

        // Unchanged flag reports no transition
        assert!(!monitor.on_status(&status(true, 3, 10)));

        assert!(monitor.on_status(&status(false, 10, 10)));
        assert!(monitor.control().start_enabled);
        assert!(!monitor.control().stop_enabled);
        assert_eq!(monitor.control().badge, RunBadge::Idle);
    }

    #[test]
    fn stop_request_freezes_elapsed() {
        let mut monitor = CrawlMonitor::new();
        monitor.on_start_accepted(10);
        monitor.on_stop_requested();
        assert!(!monitor.timer.is_running());
        assert!(monitor.elapsed().is_some());
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(185)), "3m 5s");
        assert_eq!(format_duration(Duration::from_secs(7260)), "2h 1m");
    }
}
