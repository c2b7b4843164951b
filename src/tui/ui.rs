//! UI rendering for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::api::types::{LogLevel, TrainStatus};
use crate::state::progress::format_duration;
use crate::state::{class_breakdown, filter_predictions, filter_routes};

use super::app::{CrawlPane, DashboardApp, Prompt, View};

const TABS: [&str; 5] = ["Crawl", "Files", "Routes", "Analytics", "Predictions"];

/// Main render function - dispatches to view-specific renderers.
pub fn render(frame: &mut Frame, app: &DashboardApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer/help
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match &app.view {
        View::Crawl { pane, selected } => {
            render_crawl(frame, app, chunks[1], *pane, *selected);
        }
        View::Files { selected, db_mode } => {
            render_files(frame, app, chunks[1], *selected, *db_mode);
        }
        View::Routes { selected } => {
            render_routes(frame, app, chunks[1], *selected);
        }
        View::Analytics => {
            render_analytics(frame, app, chunks[1]);
        }
        View::Predictions { selected } => {
            render_predictions(frame, app, chunks[1], *selected);
        }
    }

    render_footer(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &DashboardApp, area: Rect) {
    let control = app.monitor.control();
    let badge_style = match control.badge.label() {
        "RUNNING" => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(Color::DarkGray),
    };

    let active = app.view.tab_index();
    let mut spans = vec![Span::raw("  ")];
    for (i, name) in TABS.iter().enumerate() {
        let style = if i == active {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("[{}] {}", i + 1, name), style));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        format!("● {}", control.badge.label()),
        badge_style,
    ));

    let block = Block::default()
        .title(format!(
            "Bus Crawler Dashboard  [{}]",
            app.config.platform
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_crawl(frame: &mut Frame, app: &DashboardApp, area: Rect, pane: CrawlPane, selected: usize) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28), // Routes
            Constraint::Percentage(24), // Dates
            Constraint::Min(0),         // Progress + logs
        ])
        .split(area);

    render_pick_list(
        frame,
        columns[0],
        &format!("Routes ({} selected)", app.selection.route_count()),
        &app.data.catalog.routes,
        |r| app.selection.is_route_selected(r),
        pane == CrawlPane::Routes,
        selected,
    );
    render_pick_list(
        frame,
        columns[1],
        &format!("Dates ({} selected)", app.selection.date_count()),
        &app.data.catalog.dates,
        |d| app.selection.is_date_selected(d),
        pane == CrawlPane::Dates,
        selected,
    );

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Progress panel
            Constraint::Min(0),    // Log console
        ])
        .split(columns[2]);

    render_progress(frame, app, right[0]);
    render_console(frame, app, right[1]);
}

/// Checkbox list shared by the routes and dates pickers.
fn render_pick_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: &[String],
    is_selected: impl Fn(&str) -> bool,
    focused: bool,
    cursor: usize,
) {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    if items.is_empty() {
        let text = Paragraph::new("  Nothing to select")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let rows: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let at_cursor = focused && i == cursor;
            let style = if at_cursor {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let mark = if is_selected(item) {
                Span::styled("[x]", Style::default().fg(Color::Green))
            } else {
                Span::raw("[ ]")
            };
            let line = Line::from(vec![
                Span::raw(if at_cursor { "> " } else { "  " }),
                mark,
                Span::raw(format!(" {}", item)),
            ]);
            ListItem::new(line).style(style)
        })
        .collect();

    frame.render_widget(List::new(rows).block(block), area);
}

fn render_progress(frame: &mut Frame, app: &DashboardApp, area: Rect) {
    let snapshot = app.monitor.snapshot();
    let stats = app.monitor.stats();

    let bar = progress_bar(snapshot.progress, 30);
    let elapsed = app
        .monitor
        .elapsed()
        .map(format_duration)
        .unwrap_or_else(|| "--".to_string());

    let mut lines = vec![
        Line::from(vec![
            Span::raw("  "),
            Span::raw(format!("{} {:>5.1}%", bar, snapshot.progress)),
        ]),
        Line::from(format!(
            "  Tasks: {}/{}   Scraped: {}   OK: {}   Failed: {}",
            snapshot.completed,
            snapshot.total,
            stats.total_scraped,
            stats.successful,
            stats.failed,
        )),
        Line::from(format!(
            "  Elapsed: {}   ETA: {}   Planned: {} tasks",
            elapsed,
            app.monitor.eta_label(),
            app.selection.task_count(),
        )),
    ];

    if snapshot.current_tasks.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No active workers",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for task in snapshot.current_tasks.iter().take(4) {
            lines.push(Line::from(vec![
                Span::styled("  ▶ ", Style::default().fg(Color::Green)),
                Span::raw(task.clone()),
            ]));
        }
    }

    let block = Block::default()
        .title(format!(
            "Progress  workers={} runs={}",
            app.selection.max_workers, app.selection.runs_per_task
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_console(frame: &mut Frame, app: &DashboardApp, area: Rect) {
    let title = match app.console.filter() {
        Some(platform) => format!("Logs [{}]", platform),
        None => "Logs".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let visible: Vec<_> = app.console.visible().collect();
    let height = area.height.saturating_sub(2) as usize;
    let skip = visible.len().saturating_sub(height);

    let rows: Vec<ListItem> = visible
        .into_iter()
        .skip(skip)
        .map(|entry| {
            let color = match entry.level {
                LogLevel::Info => Color::White,
                LogLevel::Success => Color::Green,
                LogLevel::Warning => Color::Yellow,
                LogLevel::Error => Color::Red,
            };
            let tag = entry.platform.as_deref().unwrap_or("");
            let line = Line::from(vec![
                Span::styled(
                    format!(" {} ", entry.timestamp),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    if tag.is_empty() {
                        String::new()
                    } else {
                        format!("[{}] ", tag)
                    },
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(entry.message.clone(), Style::default().fg(color)),
            ]);
            ListItem::new(line)
        })
        .collect();

    frame.render_widget(List::new(rows).block(block), area);
}

fn render_files(frame: &mut Frame, app: &DashboardApp, area: Rect, selected: usize, db_mode: bool) {
    if let Some(preview) = &app.data.preview {
        let block = Block::default()
            .title(format!("Preview: {}", preview.filename))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let mut lines = vec![
            Line::from(format!(
                "  {} rows   {} buses   {} types",
                preview.rows, preview.stats.unique_buses, preview.stats.unique_types
            )),
            Line::from(format!(
                "  Price: avg {}  min {}  max {}",
                opt_price(preview.stats.avg_price),
                opt_price(preview.stats.min_price),
                opt_price(preview.stats.max_price),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("  {}", preview.columns.join("  ")),
                Style::default().fg(Color::Yellow),
            )),
        ];
        for row in &preview.preview {
            let cells: Vec<String> = preview
                .columns
                .iter()
                .map(|c| {
                    row.get(c)
                        .map(render_value)
                        .unwrap_or_else(|| "-".to_string())
                })
                .collect();
            lines.push(Line::from(format!("  {}", cells.join("  "))));
        }
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    if db_mode {
        render_db_rows(frame, app, area, selected);
        return;
    }

    let block = Block::default()
        .title("Data Files")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.data.files.is_empty() {
        let text = Paragraph::new("  No data files yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let rows: Vec<ListItem> = app
        .data
        .files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let at_cursor = i == selected;
            let style = if at_cursor {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let platform = file.platform.as_deref().unwrap_or("-");
            let line = Line::from(vec![
                Span::raw(if at_cursor { "> " } else { "  " }),
                Span::styled(format!("{:<10}", platform), Style::default().fg(Color::Cyan)),
                Span::raw(format!(
                    "{:<44}  {:>6} rows  {:>9}  {}",
                    file.filename,
                    file.rows,
                    format_bytes(file.size),
                    file.modified,
                )),
            ]);
            ListItem::new(line).style(style)
        })
        .collect();

    frame.render_widget(List::new(rows).block(block), area);
}

fn render_db_rows(frame: &mut Frame, app: &DashboardApp, area: Rect, selected: usize) {
    let block = Block::default()
        .title("Database Rows")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.data.db_rows.is_empty() {
        let text = Paragraph::new("  No rows match the filter")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    // Fixed lead columns when present, remainder appended as-is.
    const LEAD: [&str; 5] = ["route_name", "date", "bus_name", "bus_type", "price"];

    let rows: Vec<ListItem> = app
        .data
        .db_rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let at_cursor = i == selected;
            let style = if at_cursor {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let mut cells: Vec<String> = LEAD
                .iter()
                .filter_map(|c| row.get(*c).map(render_value))
                .collect();
            if cells.is_empty() {
                cells = row.values().take(5).map(render_value).collect();
            }
            let line = Line::from(vec![
                Span::raw(if at_cursor { "> " } else { "  " }),
                Span::raw(cells.join("  ")),
            ]);
            ListItem::new(line).style(style)
        })
        .collect();

    frame.render_widget(List::new(rows).block(block), area);
}

fn render_routes(frame: &mut Frame, app: &DashboardApp, area: Rect, selected: usize) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Min(0)])
        .split(area);

    let filtered = filter_routes(&app.data.master_routes, &app.route_filter);

    let title = if app.route_filter.search.is_empty() {
        format!("Master Routes [{}]", app.route_filter.status.label())
    } else {
        format!(
            "Master Routes [{}] /{}",
            app.route_filter.status.label(),
            app.route_filter.search
        )
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if filtered.is_empty() {
        let text = Paragraph::new("  No routes match")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, columns[0]);
    } else {
        let rows: Vec<ListItem> = filtered
            .iter()
            .enumerate()
            .map(|(i, route)| {
                let at_cursor = i == selected;
                let style = if at_cursor {
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let state = if route.active {
                    Span::styled("●", Style::default().fg(Color::Green))
                } else {
                    Span::styled("○", Style::default().fg(Color::DarkGray))
                };
                let line = Line::from(vec![
                    Span::raw(if at_cursor { "> " } else { "  " }),
                    state,
                    Span::raw(format!(
                        " {:<28} {} → {}  [{}]",
                        route.name, route.origin, route.destination, route.category
                    )),
                ]);
                ListItem::new(line).style(style)
            })
            .collect();
        frame.render_widget(List::new(rows).block(block), columns[0]);
    }

    render_route_detail(frame, app, columns[1], filtered.get(selected).copied());
}

fn render_route_detail(
    frame: &mut Frame,
    app: &DashboardApp,
    area: Rect,
    route: Option<&crate::api::types::MasterRoute>,
) {
    let block = Block::default()
        .title("Route Detail")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(route) = route else {
        let text = Paragraph::new("  Select a route")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    };

    let mut lines = vec![
        field("Name:       ", &route.name),
        field("Origin:     ", &route.origin),
        field("Destination:", &route.destination),
        field("Category:   ", &route.category),
        field("Active:     ", if route.active { "yes" } else { "no" }),
    ];

    if !route.platforms.is_empty() {
        let mut platforms: Vec<_> = route.platforms.iter().collect();
        platforms.sort();
        let summary = platforms
            .iter()
            .map(|(p, has)| format!("{}{}", p, if **has { "✓" } else { "✗" }))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(field("Platforms:  ", &summary));
    }

    if let Some((id, urls)) = &app.data.route_urls {
        if *id == route.id {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  URL Templates",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
            let mut pairs: Vec<_> = urls.iter().collect();
            pairs.sort();
            for (platform, url) in pairs {
                lines.push(Line::from(format!("  {:<10} {}", platform, url)));
            }
        }
    }

    if let Some(url) = &app.data.formatted_url {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  Tested: ", Style::default().fg(Color::Green)),
            Span::raw(url.clone()),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_analytics(frame: &mut Frame, app: &DashboardApp, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(7)])
        .split(area);

    render_report(frame, app, chunks[0]);
    render_training(frame, app, chunks[1]);
}

fn render_report(frame: &mut Frame, app: &DashboardApp, area: Rect) {
    if let Some(report) = &app.data.analytics {
        let block = Block::default()
            .title(format!(
                "Analytics  {} / {} / {}",
                report.platform, report.route, report.date
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let summary = &report.summary;
        let mut lines = vec![
            Line::from(format!(
                "  {} crawls   {} companies   {} bus types",
                report.total_crawls, summary.total_unique_buses, summary.total_unique_types
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!(
                    "  {:<26} {:>5} {:>10} {:>8} {:>6} {:>6}",
                    "Company", "VIP", "Executive", "Economy", "Other", "Total"
                ),
                Style::default().fg(Color::Yellow),
            )),
        ];
        for row in class_breakdown(summary) {
            lines.push(Line::from(format!(
                "  {:<26} {:>5} {:>10} {:>8} {:>6} {:>6}",
                row.company, row.vip, row.executive, row.economy, row.other,
                row.total()
            )));
        }
        if !summary.crawl_times.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(format!(
                "  Crawled at: {}",
                summary.crawl_times.join(", ")
            )));
        }
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    if let Some(compare) = &app.data.compare {
        let block = Block::default()
            .title("Platform Comparison")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let mut lines = vec![
            Line::from(format!(
                "  traveloka: {} files  {} records  avg price {:.0}",
                compare.traveloka.total_files,
                compare.traveloka.total_records,
                compare.traveloka.avg_price
            )),
            Line::from(format!(
                "  redbus:    {} files  {} records  avg price {:.0}",
                compare.redbus.total_files,
                compare.redbus.total_records,
                compare.redbus.avg_price
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("  {:<30} {:>10} {:>10}", "Route", "traveloka", "redbus"),
                Style::default().fg(Color::Yellow),
            )),
        ];
        for row in &compare.comparison {
            lines.push(Line::from(format!(
                "  {:<30} {:>10} {:>10}",
                row.route, row.traveloka_records, row.redbus_records
            )));
        }
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let block = Block::default()
        .title("Analytics")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let text = Paragraph::new("  [a] run a report   [c] compare platforms")
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
    frame.render_widget(text, area);
}

fn render_training(frame: &mut Frame, app: &DashboardApp, area: Rect) {
    let block = Block::default()
        .title("Model Training")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let mut lines = Vec::new();

    // Push frames win over the last poll while the job runs.
    if let Some(live) = &app.data.live_training {
        lines.push(Line::from(vec![
            Span::styled("  ▶ ", Style::default().fg(Color::Green)),
            Span::raw(format!(
                "{} {:>5.1}%  {}",
                progress_bar(live.progress, 25),
                live.progress,
                live.step
            )),
        ]));
    }

    match &app.data.train_status {
        Some(status) if status.is_running && app.data.live_training.is_none() => {
            lines.push(Line::from(format!(
                "  {} {:>5.1}%  {}",
                progress_bar(status.progress, 25),
                status.progress,
                status.current_step
            )));
        }
        Some(status) => lines.extend(training_results(status)),
        None => lines.push(Line::from(Span::styled(
            "  [t] train a model",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn training_results(status: &TrainStatus) -> Vec<Line<'static>> {
    let Some(results) = &status.results else {
        return vec![Line::from(format!("  {}", status.current_step))];
    };
    if let Some(error) = &results.error {
        return vec![Line::from(Span::styled(
            format!("  Training failed: {}", error),
            Style::default().fg(Color::Red),
        ))];
    }
    let mut lines = vec![Line::from(format!(
        "  Trained on {} points ({} days back)",
        results.data_points, results.days_back
    ))];
    if let Some(metrics) = &results.metrics {
        lines.push(Line::from(Span::styled(
            format!(
                "  MAE {:.2}   RMSE {:.2}   R² {:.3}",
                metrics.mae, metrics.rmse, metrics.r2
            ),
            Style::default().fg(Color::Green),
        )));
    }
    lines
}

fn render_predictions(frame: &mut Frame, app: &DashboardApp, area: Rect, selected: usize) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Min(0)])
        .split(area);

    let block = Block::default()
        .title("Sessions")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.data.sessions.is_empty() {
        let text = Paragraph::new("  [h] load history   [p] predict")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, columns[0]);
    } else {
        let rows: Vec<ListItem> = app
            .data
            .sessions
            .iter()
            .enumerate()
            .map(|(i, session)| {
                let at_cursor = i == selected;
                let style = if at_cursor {
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let line = Line::from(vec![
                    Span::raw(if at_cursor { "> " } else { "  " }),
                    Span::raw(format!(
                        "#{:<5} {} → {}  ({} rows)",
                        session.id,
                        session.prediction_start_date,
                        session.prediction_end_date,
                        session.total_predictions
                    )),
                ]);
                ListItem::new(line).style(style)
            })
            .collect();
        frame.render_widget(List::new(rows).block(block), columns[0]);
    }

    let filtered = filter_predictions(&app.data.predictions, &app.prediction_filter);
    let title = if app.prediction_filter.route.is_empty() {
        format!("Predictions ({})", filtered.len())
    } else {
        format!(
            "Predictions ({}) /{}",
            filtered.len(),
            app.prediction_filter.route
        )
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let mut lines = vec![Line::from(Span::styled(
        format!(
            "  {:<24} {:<12} {:>6} {:>5} {:>5} {:>6} {:>8}",
            "Route", "Date", "Total", "VIP", "Exec", "Other", "Price"
        ),
        Style::default().fg(Color::Yellow),
    ))];
    for row in filtered {
        lines.push(Line::from(format!(
            "  {:<24} {:<12} {:>6.0} {:>5.0} {:>5.0} {:>6.0} {:>8}",
            row.route_name,
            row.prediction_date,
            row.predicted_total,
            row.predicted_vip,
            row.predicted_executive,
            row.predicted_other,
            opt_price(row.predicted_price),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), columns[1]);
}

fn render_footer(frame: &mut Frame, app: &DashboardApp, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    // An open prompt replaces the help line.
    if let Some(prompt) = &app.prompt {
        let line = match prompt {
            Prompt::Confirm { message, .. } => Line::from(Span::styled(
                format!("  {}", message),
                Style::default().fg(Color::Yellow),
            )),
            Prompt::Input { label, buffer, .. } => Line::from(vec![
                Span::styled(format!("  {} ", label), Style::default().fg(Color::Yellow)),
                Span::raw(buffer.clone()),
                Span::styled("▏", Style::default().fg(Color::Yellow)),
            ]),
        };
        frame.render_widget(Paragraph::new(line).block(block), area);
        return;
    }

    let help_text = match &app.view {
        View::Crawl { .. } => {
            "[←→] Pane  [Space] Toggle  [a] All  [n] None  [+-] Workers  [[]] Runs  [s] Start  [x] Stop  [c] Clear  [q] Quit"
        }
        View::Files { db_mode: false, .. } => {
            "[Enter] Preview  [d] Download  [b] DB mode  [r] Refresh  [Esc] Back  [q] Quit"
        }
        View::Files { db_mode: true, .. } => "[b] File mode  [r] Refresh  [q] Quit",
        View::Routes { .. } => {
            "[a] Add  [m] Rename  [y] Dup  [d] Del  [u] URL  [t] Test  [/] Search  [f] Status  [q] Quit"
        }
        View::Analytics => "[a] Report  [c] Compare  [t] Train  [r] Refresh  [q] Quit",
        View::Predictions { .. } => {
            "[p] Predict  [h] History  [Enter] Open session  [/] Filter  [q] Quit"
        }
    };

    let mut spans = vec![Span::raw(format!("  {}", help_text))];

    if let Some(error) = &app.error {
        spans.push(Span::styled(
            format!("  Error: {}", error),
            Style::default().fg(Color::Red),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn field(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {} ", label), Style::default().fg(Color::Cyan)),
        Span::raw(value.to_string()),
    ])
}

fn progress_bar(percentage: f64, width: usize) -> String {
    let clamped = percentage.clamp(0.0, 100.0);
    let filled = (clamped as usize * width) / 100;
    let empty = width - filled;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn opt_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("{:.0}", p),
        None => "-".to_string(),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
