//! Rendering.
//!
//! Stateless: every frame draws the current [`App`] model. No business
//! logic beyond display formatting (percentages, dates, color mapping).

use chrono::{DateTime, Utc};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, Gauge, GraphType, List,
    ListItem, ListState, Paragraph, Row, Table, TableState, Tabs, Wrap,
};
use ratatui::Frame;
use unicode_width::UnicodeWidthChar;

use radar_core::theme::{
    format_score, regulation_color, severity_color, status_color, Palette, Rgb, ScoreTier,
};
use radar_core::theme::Mode;
use radar_core::types::{Environment, Finding, Scan, Severity, TrendPoint};

use crate::app::{App, FormField, Overlay, Page};
use crate::chat::ChatRole;
use crate::state::RemoteData;

/// Regulations plotted on the dashboard trend chart.
const TREND_REGULATIONS: [&str; 4] = ["NIS2", "ISO27001", "DORA", "RGPD"];

const SPINNER_FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠇"];

pub fn draw(f: &mut Frame, app: &App) {
    let palette = &app.palette;
    let area = f.size();
    f.render_widget(
        Block::default().style(Style::default().bg(color(palette.background)).fg(color(palette.text))),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    draw_header(f, app, chunks[0]);
    match app.page {
        Page::Dashboard => draw_dashboard(f, app, chunks[1]),
        Page::Scans => draw_scans(f, app, chunks[1]),
        Page::ScanDetails => draw_detail(f, app, chunks[1]),
        Page::Environments => draw_environments(f, app, chunks[1]),
    }
    draw_footer(f, app, chunks[2]);

    match app.overlay {
        Overlay::None => {}
        Overlay::Assistant => draw_assistant(f, app),
        Overlay::NewScan => draw_new_scan(f, app),
        Overlay::EnvironmentForm => draw_environment_form(f, app),
        Overlay::ConfirmDelete => draw_confirm_delete(f, app),
        Overlay::Remediation => draw_remediation(f, app),
        Overlay::Analysis => draw_analysis(f, app),
        Overlay::Help => draw_help(f, app),
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color(palette.primary)))
        .title(Span::styled(
            " Compliance Radar ",
            Style::default()
                .fg(color(palette.primary))
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(18)])
        .split(inner);

    let selected = match app.page {
        Page::Dashboard => 0,
        Page::Scans | Page::ScanDetails => 1,
        Page::Environments => 2,
    };
    let tabs = Tabs::new(vec![
        Line::from("[1] Dashboard"),
        Line::from("[2] Scans"),
        Line::from("[3] Environments"),
    ])
    .select(selected)
    .style(Style::default().fg(color(palette.text_secondary)))
    .highlight_style(
        Style::default()
            .fg(color(palette.primary))
            .add_modifier(Modifier::BOLD),
    )
    .divider(symbols::DOT);
    f.render_widget(tabs, columns[0]);

    let mode = match app.palette.mode {
        Mode::Light => "light",
        Mode::Dark => "dark",
    };
    let right = Paragraph::new(Line::from(vec![
        Span::styled("[a]", Style::default().fg(color(palette.secondary))),
        Span::raw(" AI  "),
        Span::styled("[d] ", Style::default().fg(color(palette.text_secondary))),
        Span::raw(mode),
    ]))
    .alignment(Alignment::Right);
    f.render_widget(right, columns[1]);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    if let Some(notice) = app.notice() {
        let line = Paragraph::new(Span::styled(
            format!(" {notice}"),
            Style::default().fg(color(palette.warning)),
        ));
        f.render_widget(line, area);
        return;
    }

    let hints = match (app.overlay, app.page) {
        (Overlay::None, Page::Dashboard) => "j/k select  Enter details  n new scan  r refresh  ? help  q quit",
        (Overlay::None, Page::Scans) => "j/k select  Enter details  s/e filter  c clear  n new  t retry  r refresh",
        (Overlay::None, Page::ScanDetails) => "j/k select  Enter expand  s/n/g filter  f AI fix  m resolve  M resolve all  A analyze  b back",
        (Overlay::None, Page::Environments) => "j/k select  n new  e edit  s scan  x delete  r refresh",
        _ => "Esc close",
    };
    let line = Paragraph::new(Span::styled(
        format!(" {hints}"),
        Style::default().fg(color(palette.text_secondary)),
    ));
    f.render_widget(line, area);
}

// ── Dashboard ─────────────────────────────────────────────────────

fn draw_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let Some(metrics) = app.dashboard.metrics.data() else {
        draw_empty_state(f, app, area, &app.dashboard.metrics, "dashboard");
        return;
    };

    let mut constraints = vec![
        Constraint::Length(5),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Min(4),
    ];
    let mut next = 0;
    if app.dashboard.metrics.error().is_some() {
        constraints.insert(0, Constraint::Length(1));
        next = 1;
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    if next == 1 {
        draw_error_banner(f, app, rows[0], app.dashboard.metrics.error());
    }

    draw_metric_cards(f, app, rows[next], metrics);
    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(rows[next + 1]);
    draw_trend_chart(f, app, charts[0], &metrics.conformity_trend);
    draw_ai_insights(f, app, charts[1]);
    draw_resource_bars(f, app, rows[next + 2], metrics);
    draw_recent_scans(f, app, rows[next + 3], metrics);

    if app.dashboard.metrics.is_loading() {
        draw_refresh_indicator(f, app, area);
    }
}

fn draw_metric_cards(f: &mut Frame, app: &App, area: Rect, metrics: &radar_core::types::DashboardMetrics) {
    let palette = &app.palette;
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    // Overall score with tier color and progress bar.
    let score = metrics.average_conformity_score;
    let tier_color = ScoreTier::for_score(score).color(palette);
    let block = card_block("Overall Score", palette);
    let inner = block.inner(cards[0]);
    f.render_widget(block, cards[0]);
    let lines = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);
    f.render_widget(
        Paragraph::new(Span::styled(
            format_score(score),
            Style::default().fg(color(tier_color)).add_modifier(Modifier::BOLD),
        )),
        lines[0],
    );
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(color(tier_color)).bg(color(palette.surface)))
            .ratio(score.clamp(0.0, 1.0))
            .label(""),
        lines[1],
    );

    draw_stat_card(
        f,
        cards[1],
        palette,
        "Critical Findings",
        &metrics.critical_findings.to_string(),
        palette.error,
        "Requires immediate attention",
    );
    draw_stat_card(
        f,
        cards[2],
        palette,
        "Active Scans",
        &format!("{}/{}", metrics.active_scans, metrics.total_scans),
        palette.info,
        &format!("{} environments monitored", metrics.total_environments),
    );
    draw_stat_card(
        f,
        cards[3],
        palette,
        "Remediated",
        &metrics.remediated_estimate().to_string(),
        palette.success,
        "Issues fixed this month",
    );
}

fn draw_stat_card(
    f: &mut Frame,
    area: Rect,
    palette: &Palette,
    title: &str,
    value: &str,
    accent: Rgb,
    caption: &str,
) {
    let block = card_block(title, palette);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let text = Text::from(vec![
        Line::from(Span::styled(
            value.to_string(),
            Style::default().fg(color(accent)).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            caption.to_string(),
            Style::default().fg(color(palette.text_secondary)),
        )),
    ]);
    f.render_widget(Paragraph::new(text), inner);
}

fn draw_trend_chart(f: &mut Frame, app: &App, area: Rect, trend: &[TrendPoint]) {
    let palette = &app.palette;
    let block = card_block("Compliance Trend", palette);
    if trend.is_empty() {
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(
            Paragraph::new(Span::styled(
                "No trend data yet",
                Style::default().fg(color(palette.text_secondary)),
            )),
            inner,
        );
        return;
    }

    let series: Vec<Vec<(f64, f64)>> = TREND_REGULATIONS
        .iter()
        .map(|code| trend_series(trend, code))
        .collect();
    let datasets: Vec<Dataset> = TREND_REGULATIONS
        .iter()
        .zip(series.iter())
        .map(|(code, points)| {
            Dataset::default()
                .name(*code)
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color(regulation_color(code))))
                .data(points)
        })
        .collect();

    let x_max = (trend.len().saturating_sub(1)).max(1) as f64;
    let x_labels = vec![
        Span::styled(
            format_trend_date(&trend[0]),
            Style::default().fg(color(palette.text_secondary)),
        ),
        Span::styled(
            format_trend_date(trend.last().unwrap_or(&trend[0])),
            Style::default().fg(color(palette.text_secondary)),
        ),
    ];
    let y_labels = vec![
        Span::raw("0"),
        Span::raw("50"),
        Span::raw("100"),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels(x_labels)
                .style(Style::default().fg(color(palette.text_secondary))),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, 100.0])
                .labels(y_labels)
                .style(Style::default().fg(color(palette.text_secondary))),
        );
    f.render_widget(chart, area);
}

fn draw_ai_insights(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let block = card_block("AI Insights", palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = Text::from(vec![
        Line::from(Span::styled(
            "▲ NIS2 Compliance Gap Detected",
            Style::default().fg(color(palette.warning)).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "  Missing MFA enforcement on 12 IAM users",
            Style::default().fg(color(palette.text_secondary)),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "ℹ Recommended Action",
            Style::default().fg(color(palette.info)).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "  Enable S3 bucket encryption on 8 buckets",
            Style::default().fg(color(palette.text_secondary)),
        )),
    ]);
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
}

fn draw_resource_bars(
    f: &mut Frame,
    app: &App,
    area: Rect,
    metrics: &radar_core::types::DashboardMetrics,
) {
    let palette = &app.palette;
    let block = card_block("Findings by Resource Type", palette);
    if metrics.findings_by_resource.is_empty() {
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(
            Paragraph::new(Span::styled(
                "No findings recorded",
                Style::default().fg(color(palette.text_secondary)),
            )),
            inner,
        );
        return;
    }

    let mut chart = BarChart::default()
        .block(block)
        .bar_width(2)
        .bar_gap(0)
        .group_gap(2);
    for resource in metrics.findings_by_resource.iter().take(10) {
        let b = &resource.severity_breakdown;
        let bars = [
            (Severity::Critical, b.critical),
            (Severity::High, b.high),
            (Severity::Medium, b.medium),
            (Severity::Low, b.low),
        ]
        .into_iter()
        .map(|(severity, count)| {
            Bar::default()
                .value(u64::from(count))
                .style(Style::default().fg(color(severity_color(severity))))
        })
        .collect::<Vec<_>>();
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(truncate(&resource.resource_type, 12)))
                .bars(&bars),
        );
    }
    f.render_widget(chart, area);
}

fn draw_recent_scans(
    f: &mut Frame,
    app: &App,
    area: Rect,
    metrics: &radar_core::types::DashboardMetrics,
) {
    let palette = &app.palette;
    let block = card_block("Recent Scans", palette);
    if metrics.recent_scans.is_empty() {
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(
            Paragraph::new(Span::styled(
                "No scans yet. Press n to start one.",
                Style::default().fg(color(palette.text_secondary)),
            ))
            .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let rows: Vec<Row> = metrics
        .recent_scans
        .iter()
        .take(app.ui.recent_rows)
        .map(|scan| scan_row(scan, palette, None))
        .collect();
    let table = scan_table(rows, palette).block(block);
    let mut state = TableState::default().with_selected(Some(app.dashboard.selected));
    f.render_stateful_widget(table, area, &mut state);
}

// ── Scans page ────────────────────────────────────────────────────

fn draw_scans(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    if app.scans.data.data().is_none() {
        draw_empty_state(f, app, area, &app.scans.data, "scans");
        return;
    }

    let mut constraints = vec![Constraint::Length(1), Constraint::Min(3)];
    let mut next = 0;
    if app.scans.data.error().is_some() {
        constraints.insert(0, Constraint::Length(1));
        next = 1;
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    if next == 1 {
        draw_error_banner(f, app, rows[0], app.scans.data.error());
    }

    let environments = app.scan_environments();
    let visible = app.visible_scans();

    let status_label = app
        .scans
        .filter
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "all".to_string());
    let env_label = app
        .scans
        .filter
        .environment_id
        .map(|id| environment_name(environments, id))
        .unwrap_or_else(|| "all".to_string());
    let filter_line = Paragraph::new(Line::from(vec![
        Span::styled(" Status [s]: ", Style::default().fg(color(palette.text_secondary))),
        Span::styled(status_label, Style::default().fg(color(palette.primary))),
        Span::styled("  Environment [e]: ", Style::default().fg(color(palette.text_secondary))),
        Span::styled(env_label, Style::default().fg(color(palette.primary))),
        Span::styled(
            format!("  — {} scan{}", visible.len(), plural(visible.len())),
            Style::default().fg(color(palette.text_secondary)),
        ),
    ]));
    f.render_widget(filter_line, rows[next]);

    if visible.is_empty() {
        let message = if app.scans.filter.is_empty() {
            "No scans found. Press n to create your first scan."
        } else {
            "No scans found. Try adjusting your filters (c to clear)."
        };
        f.render_widget(
            Paragraph::new(Span::styled(
                message,
                Style::default().fg(color(palette.text_secondary)),
            ))
            .alignment(Alignment::Center)
            .block(card_block("Security Scans", palette)),
            rows[next + 1],
        );
        return;
    }

    let table_rows: Vec<Row> = visible
        .iter()
        .map(|scan| scan_row(scan, palette, Some(environments)))
        .collect();
    let table = scan_table(table_rows, palette).block(card_block("Security Scans", palette));
    let mut state = TableState::default().with_selected(Some(app.scans.selected));
    f.render_stateful_widget(table, rows[next + 1], &mut state);

    if app.scans.data.is_loading() {
        draw_refresh_indicator(f, app, area);
    }
}

fn scan_table<'a>(rows: Vec<Row<'a>>, palette: &Palette) -> Table<'a> {
    Table::new(
        rows,
        [
            Constraint::Min(18),
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Length(17),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(9),
        ],
    )
    .header(
        Row::new(vec![
            "Environment",
            "Type",
            "Status",
            "Started",
            "Score",
            "Findings",
            "Critical",
        ])
        .style(
            Style::default()
                .fg(color(palette.text_secondary))
                .add_modifier(Modifier::BOLD),
        ),
    )
    .highlight_style(
        Style::default()
            .bg(color(palette.surface))
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▸ ")
}

fn scan_row<'a>(scan: &'a Scan, palette: &Palette, environments: Option<&[Environment]>) -> Row<'a> {
    let name = match environments {
        Some(envs) => environment_name(envs, scan.environment_id),
        None => scan.environment_label(),
    };
    let env_type = scan
        .environment_type
        .map(|t| t.label().to_string())
        .or_else(|| {
            environments.and_then(|envs| {
                envs.iter()
                    .find(|e| e.id == scan.environment_id)
                    .map(|e| e.env_type.label().to_string())
            })
        })
        .unwrap_or_else(|| "—".to_string());

    let score_cell = match scan.overall_score {
        Some(score) => Span::styled(
            format_score(score),
            Style::default()
                .fg(color(ScoreTier::for_score(score).color(palette)))
                .add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("–", Style::default().fg(color(palette.text_secondary))),
    };

    Row::new(vec![
        Line::from(name),
        Line::from(env_type),
        Line::from(Span::styled(
            scan.status.to_string(),
            Style::default().fg(color(status_color(scan.status))),
        )),
        Line::from(format_ts(&scan.started_at)),
        Line::from(score_cell),
        Line::from(scan.total_findings.to_string()),
        Line::from(Span::styled(
            scan.critical_count.to_string(),
            Style::default().fg(color(severity_color(Severity::Critical))),
        )),
    ])
}

// ── Scan details ──────────────────────────────────────────────────

fn draw_detail(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let Some(detail) = &app.detail else {
        return;
    };
    let Some((scan, _)) = detail.data.data() else {
        draw_empty_state(f, app, area, &detail.data, "scan details");
        return;
    };

    let mut constraints = vec![
        Constraint::Length(2),
        Constraint::Length(7),
        Constraint::Length(1),
        Constraint::Min(3),
    ];
    let mut next = 0;
    if detail.data.error().is_some() {
        constraints.insert(0, Constraint::Length(1));
        next = 1;
    }
    if detail.expanded {
        constraints.push(Constraint::Length(11));
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    if next == 1 {
        draw_error_banner(f, app, rows[0], detail.data.error());
    }

    // Header: environment, start time, status, task note.
    let mut header = vec![
        Span::styled(
            format!(" Scan #{} — {}", scan.id, scan.environment_label()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  started {}", format_ts(&scan.started_at)),
            Style::default().fg(color(palette.text_secondary)),
        ),
        Span::raw("  "),
        Span::styled(
            scan.status.to_string(),
            Style::default()
                .fg(color(status_color(scan.status)))
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(note) = &detail.task_note {
        header.push(Span::styled(
            format!("  task: {note}"),
            Style::default().fg(color(palette.text_secondary)),
        ));
    }
    if scan.status.is_active() {
        header.push(Span::styled(
            format!("  {}", spinner(app.tick)),
            Style::default().fg(color(palette.info)),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(header)), rows[next]);

    draw_detail_summary(f, app, rows[next + 1], scan);
    draw_detail_filters(f, app, rows[next + 2], detail);
    draw_findings_list(f, app, rows[next + 3], detail);
    if detail.expanded {
        draw_finding_panel(f, app, rows[rows.len() - 1]);
    }

    if detail.data.is_loading() {
        draw_refresh_indicator(f, app, area);
    }
}

fn draw_detail_summary(f: &mut Frame, app: &App, area: Rect, scan: &Scan) {
    let palette = &app.palette;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    // Per-regulation scores plus the overall gauge.
    let block = card_block("Compliance Scores", palette);
    let inner = block.inner(columns[0]);
    f.render_widget(block, columns[0]);

    let mut score_spans: Vec<Span> = Vec::new();
    for (regulation, score) in &scan.conformity_scores {
        score_spans.push(Span::styled(
            format!(" {regulation} "),
            Style::default().fg(color(regulation_color(regulation))),
        ));
        score_spans.push(Span::styled(
            format_score(*score),
            Style::default()
                .fg(color(ScoreTier::for_score(*score).color(palette)))
                .add_modifier(Modifier::BOLD),
        ));
        score_spans.push(Span::raw("  "));
    }
    if score_spans.is_empty() {
        score_spans.push(Span::styled(
            " No scores yet",
            Style::default().fg(color(palette.text_secondary)),
        ));
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);
    f.render_widget(Paragraph::new(Line::from(score_spans)).wrap(Wrap { trim: false }), parts[0]);

    if let Some(score) = scan.overall_score {
        let tier_color = ScoreTier::for_score(score).color(palette);
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw(" Overall Score  "),
                Span::styled(
                    format_score(score),
                    Style::default().fg(color(tier_color)).add_modifier(Modifier::BOLD),
                ),
            ])),
            parts[1],
        );
        f.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(color(tier_color)).bg(color(palette.surface)))
                .ratio(score.clamp(0.0, 1.0))
                .label(""),
            parts[2],
        );
    }

    // Severity distribution.
    let block = card_block("Findings by Severity", palette);
    let inner = block.inner(columns[1]);
    f.render_widget(block, columns[1]);
    let counts = [
        (Severity::Critical, scan.critical_count),
        (Severity::High, scan.high_count),
        (Severity::Medium, scan.medium_count),
        (Severity::Low, scan.low_count),
    ];
    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
    let mut lines = Vec::new();
    for (severity, count) in counts {
        let width = 20_u32 * count / max;
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:>8} ", severity.as_str()),
                Style::default().fg(color(severity_color(severity))),
            ),
            Span::styled(
                "█".repeat(width as usize),
                Style::default().fg(color(severity_color(severity))),
            ),
            Span::raw(format!(" {count}")),
        ]));
    }
    lines.push(Line::from(Span::styled(
        format!("   Total {} findings", scan.total_findings),
        Style::default().fg(color(palette.text_secondary)),
    )));
    f.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn draw_detail_filters(f: &mut Frame, app: &App, area: Rect, detail: &crate::app::DetailState) {
    let palette = &app.palette;
    let visible = app.visible_findings().len();
    let severity = detail
        .filter
        .severity
        .map(|s| s.to_string())
        .unwrap_or_else(|| "all".to_string());
    let scanner = detail.filter.scanner.clone().unwrap_or_else(|| "all".to_string());
    let regulation = detail
        .filter
        .regulation
        .clone()
        .unwrap_or_else(|| "all".to_string());

    let line = Paragraph::new(Line::from(vec![
        Span::styled(" Severity [s]: ", Style::default().fg(color(palette.text_secondary))),
        Span::styled(severity, Style::default().fg(color(palette.primary))),
        Span::styled("  Scanner [n]: ", Style::default().fg(color(palette.text_secondary))),
        Span::styled(scanner, Style::default().fg(color(palette.primary))),
        Span::styled("  Regulation [g]: ", Style::default().fg(color(palette.text_secondary))),
        Span::styled(regulation, Style::default().fg(color(palette.primary))),
        Span::styled(
            format!("  — {visible} finding{}", plural(visible)),
            Style::default().fg(color(palette.text_secondary)),
        ),
    ]));
    f.render_widget(line, area);
}

fn draw_findings_list(f: &mut Frame, app: &App, area: Rect, detail: &crate::app::DetailState) {
    let palette = &app.palette;
    let visible = app.visible_findings();
    if visible.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "No findings match your filters. Try adjusting the filter criteria (c to clear).",
                Style::default().fg(color(palette.text_secondary)),
            ))
            .alignment(Alignment::Center)
            .block(card_block("Findings", palette)),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = visible.iter().map(|finding| finding_item(finding, palette)).collect();
    let list = List::new(items)
        .block(card_block("Findings", palette))
        .highlight_style(Style::default().bg(color(palette.surface)).add_modifier(Modifier::BOLD))
        .highlight_symbol("▸ ");
    let mut state = ListState::default().with_selected(Some(detail.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn finding_item<'a>(finding: &'a Finding, palette: &Palette) -> ListItem<'a> {
    let mut spans = vec![
        Span::styled(
            format!("[{:^8}] ", finding.severity.as_str()),
            Style::default()
                .fg(color(severity_color(finding.severity)))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(finding.title.as_str()),
        Span::styled(
            format!("  {} • {}", finding.scanner, finding.check_id),
            Style::default().fg(color(palette.text_secondary)),
        ),
    ];
    for regulation in &finding.regulations {
        spans.push(Span::styled(
            format!(" {regulation}"),
            Style::default().fg(color(regulation_color(regulation))),
        ));
    }
    if finding.status != "open" {
        spans.push(Span::styled(
            format!(" ({})", finding.status),
            Style::default().fg(color(palette.success)),
        ));
    }
    ListItem::new(Line::from(spans))
}

/// Expanded view of the selected finding.
fn draw_finding_panel(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let selected = app
        .detail
        .as_ref()
        .map(|d| d.selected)
        .unwrap_or(0);
    let visible = app.visible_findings();
    let Some(finding) = visible.get(selected) else {
        return;
    };

    let block = card_block("Finding", palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![Line::from(vec![
        Span::styled(
            finding.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} • {} • {}", finding.severity, finding.scanner, finding.check_id),
            Style::default().fg(color(severity_color(finding.severity))),
        ),
    ])];
    for text_line in finding.description.lines() {
        lines.push(Line::from(text_line.to_string()));
    }
    if let (Some(resource_type), resource_id) = (&finding.resource_type, &finding.resource_id) {
        lines.push(Line::from(Span::styled(
            format!(
                "Resource: {resource_type}{}",
                resource_id
                    .as_deref()
                    .map(|id| format!(" ({id})"))
                    .unwrap_or_default()
            ),
            Style::default().fg(color(palette.text_secondary)),
        )));
    }
    if let Some(remediation) = &finding.remediation {
        lines.push(Line::from(Span::styled(
            "Recommended Remediation",
            Style::default().fg(color(palette.success)).add_modifier(Modifier::BOLD),
        )));
        for text_line in remediation.lines() {
            lines.push(Line::from(text_line.to_string()));
        }
    }
    lines.push(Line::from(Span::styled(
        "f AI auto-fix  m mark resolved  Enter collapse",
        Style::default().fg(color(palette.text_secondary)),
    )));
    f.render_widget(Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }), inner);
}

/// Centered overlay rectangle as a percentage of the full frame.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

// ── Environments page ─────────────────────────────────────────────

fn draw_environments(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    if app.environments.data.data().is_none() {
        draw_empty_state(f, app, area, &app.environments.data, "environments");
        return;
    }

    let mut constraints = vec![Constraint::Min(3)];
    let mut next = 0;
    if app.environments.data.error().is_some() {
        constraints.insert(0, Constraint::Length(1));
        next = 1;
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    if next == 1 {
        draw_error_banner(f, app, rows[0], app.environments.data.error());
    }

    let environments = app.environment_list();
    if environments.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "No environments configured. Press n to add one.",
                Style::default().fg(color(palette.text_secondary)),
            ))
            .alignment(Alignment::Center)
            .block(card_block("Environments", palette)),
            rows[next],
        );
        return;
    }

    let table_rows: Vec<Row> = environments
        .iter()
        .map(|env| {
            Row::new(vec![
                Line::from(Span::styled(
                    env.name.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(env.env_type.label()),
                Line::from(env.description.as_deref().unwrap_or("—").to_string()),
                Line::from(
                    env.last_scan
                        .as_ref()
                        .map(format_ts)
                        .unwrap_or_else(|| "never".to_string()),
                ),
            ])
        })
        .collect();

    let table = Table::new(
        table_rows,
        [
            Constraint::Min(16),
            Constraint::Length(11),
            Constraint::Min(20),
            Constraint::Length(17),
        ],
    )
    .header(
        Row::new(vec!["Name", "Type", "Description", "Last scan"]).style(
            Style::default()
                .fg(color(palette.text_secondary))
                .add_modifier(Modifier::BOLD),
        ),
    )
    .highlight_style(Style::default().bg(color(palette.surface)).add_modifier(Modifier::BOLD))
    .highlight_symbol("▸ ")
    .block(card_block("Environments", palette));
    let mut state = TableState::default().with_selected(Some(app.environments.selected));
    f.render_stateful_widget(table, rows[next], &mut state);

    if app.environments.data.is_loading() {
        draw_refresh_indicator(f, app, area);
    }
}

// ── Overlays ──────────────────────────────────────────────────────

fn draw_assistant(f: &mut Frame, app: &App) {
    let palette = &app.palette;
    let area = centered_rect(70, 80, f.size());
    f.render_widget(Clear, area);
    let block = overlay_block(" AI Compliance Assistant ", palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3), Constraint::Length(1)])
        .split(inner);

    let mut lines: Vec<Line> = Vec::new();
    for message in app.assistant.transcript.messages() {
        let (tag, tag_color) = match message.role {
            ChatRole::User => ("you", palette.primary),
            ChatRole::Assistant => ("assistant", palette.secondary),
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{tag} "),
                Style::default().fg(color(tag_color)).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                message.timestamp.format("%H:%M:%S").to_string(),
                Style::default().fg(color(palette.text_secondary)),
            ),
        ]));
        for text_line in message.content.lines() {
            lines.push(Line::from(format!("  {text_line}")));
        }
        for (i, suggestion) in message.suggestions.iter().enumerate() {
            lines.push(Line::from(Span::styled(
                format!("  {}) {suggestion}", i + 1),
                Style::default().fg(color(palette.info)),
            )));
        }
        lines.push(Line::from(""));
    }
    if app.assistant.waiting {
        lines.push(Line::from(Span::styled(
            format!("{} Thinking...", spinner(app.tick)),
            Style::default().fg(color(palette.text_secondary)),
        )));
    }

    // Keep the tail of the conversation in view.
    let height = parts[0].height as usize;
    let scroll = lines.len().saturating_sub(height) as u16;
    f.render_widget(
        Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }).scroll((scroll, 0)),
        parts[0],
    );

    let input = Paragraph::new(Line::from(vec![
        Span::raw(app.assistant.input.as_str()),
        Span::styled("█", Style::default().fg(color(palette.primary))),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color(palette.primary)))
            .title(" Ask about compliance, findings, or best practices "),
    );
    f.render_widget(input, parts[1]);

    f.render_widget(
        Paragraph::new(Span::styled(
            "Enter send  1-4 suggested question  Ctrl+R reset  Esc close",
            Style::default().fg(color(palette.text_secondary)),
        )),
        parts[2],
    );
}

fn draw_new_scan(f: &mut Frame, app: &App) {
    let palette = &app.palette;
    let area = centered_rect(50, 50, f.size());
    f.render_widget(Clear, area);
    let block = overlay_block(" Create New Scan ", palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(dialog) = &app.new_scan else {
        return;
    };
    let environments = app.scan_environments();

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    if environments.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "No environments configured. Please add an environment first.",
                Style::default().fg(color(palette.info)),
            ))
            .wrap(Wrap { trim: true }),
            parts[0],
        );
    } else {
        let items: Vec<ListItem> = environments
            .iter()
            .map(|env| {
                ListItem::new(Line::from(vec![
                    Span::styled(env.name.as_str(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(
                        format!("  {} — {}", env.env_type.label(), env.description.as_deref().unwrap_or("No description")),
                        Style::default().fg(color(palette.text_secondary)),
                    ),
                ]))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().bg(color(palette.background)).add_modifier(Modifier::BOLD))
            .highlight_symbol("▸ ");
        let mut state = ListState::default().with_selected(Some(dialog.selected));
        f.render_stateful_widget(list, parts[0], &mut state);
    }

    if let Some(error) = &dialog.error {
        f.render_widget(
            Paragraph::new(Span::styled(
                error.as_str(),
                Style::default().fg(color(palette.error)),
            )),
            parts[1],
        );
    }

    let hint = if dialog.creating {
        format!("{} Starting...", spinner(app.tick))
    } else {
        "j/k select environment  Enter start scan  Esc cancel".to_string()
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            hint,
            Style::default().fg(color(palette.text_secondary)),
        )),
        parts[2],
    );
}

fn draw_environment_form(f: &mut Frame, app: &App) {
    let palette = &app.palette;
    let area = centered_rect(50, 45, f.size());
    f.render_widget(Clear, area);
    let Some(form) = &app.env_form else {
        return;
    };
    let title = if form.editing.is_some() {
        " Edit Environment "
    } else {
        " Add Environment "
    };
    let block = overlay_block(title, palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    draw_form_field(f, parts[0], palette, "Name", &form.name, form.field == FormField::Name);
    draw_form_field(
        f,
        parts[1],
        palette,
        "Type (←/→)",
        form.env_type().label(),
        form.field == FormField::Type,
    );
    draw_form_field(
        f,
        parts[2],
        palette,
        "Description",
        &form.description,
        form.field == FormField::Description,
    );

    if let Some(error) = &form.error {
        f.render_widget(
            Paragraph::new(Span::styled(
                error.as_str(),
                Style::default().fg(color(palette.error)),
            )),
            parts[3],
        );
    }

    let hint = if form.saving {
        format!("{} Saving...", spinner(app.tick))
    } else {
        "Tab next field  Enter save  Esc cancel".to_string()
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            hint,
            Style::default().fg(color(palette.text_secondary)),
        )),
        parts[4],
    );
}

fn draw_form_field(f: &mut Frame, area: Rect, palette: &Palette, label: &str, value: &str, active: bool) {
    let label_style = if active {
        Style::default().fg(color(palette.primary)).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color(palette.text_secondary))
    };
    let mut spans = vec![
        Span::styled(format!("{label}: "), label_style),
        Span::raw(value.to_string()),
    ];
    if active {
        spans.push(Span::styled("█", Style::default().fg(color(palette.primary))));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_confirm_delete(f: &mut Frame, app: &App) {
    let palette = &app.palette;
    let area = centered_rect(44, 22, f.size());
    f.render_widget(Clear, area);
    let Some(confirm) = &app.confirm_delete else {
        return;
    };
    let block = overlay_block(" Delete Environment ", palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let body = if confirm.deleting {
        Text::from(Line::from(Span::styled(
            format!("{} Deleting...", spinner(app.tick)),
            Style::default().fg(color(palette.text_secondary)),
        )))
    } else {
        Text::from(vec![
            Line::from(vec![
                Span::raw("Delete environment '"),
                Span::styled(confirm.name.as_str(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("'?"),
            ]),
            Line::from(Span::styled(
                "Its scan history stays on the backend.",
                Style::default().fg(color(palette.text_secondary)),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("y", Style::default().fg(color(palette.error)).add_modifier(Modifier::BOLD)),
                Span::raw(" delete  "),
                Span::styled("n", Style::default().fg(color(palette.success)).add_modifier(Modifier::BOLD)),
                Span::raw(" cancel"),
            ]),
        ])
    };
    f.render_widget(Paragraph::new(body).wrap(Wrap { trim: true }), inner);
}

fn draw_remediation(f: &mut Frame, app: &App) {
    let palette = &app.palette;
    let area = centered_rect(74, 84, f.size());
    f.render_widget(Clear, area);
    let Some(dialog) = &app.remediation else {
        return;
    };
    let block = overlay_block(" AI-Generated Remediation ", palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    match (&dialog.data, dialog.data.error()) {
        (RemoteData::Loading { .. }, _) => {
            f.render_widget(
                Paragraph::new(Text::from(vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("{} Analyzing finding and generating remediation plan...", spinner(app.tick)),
                        Style::default().fg(color(palette.text_secondary)),
                    )),
                ]))
                .alignment(Alignment::Center),
                inner,
            );
        }
        (_, Some(error)) => {
            f.render_widget(
                Paragraph::new(Text::from(vec![
                    Line::from(Span::styled(
                        "Failed to generate remediation",
                        Style::default().fg(color(palette.error)).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(error.to_string()),
                    Line::from(""),
                    Line::from(Span::styled(
                        "Esc close",
                        Style::default().fg(color(palette.text_secondary)),
                    )),
                ]))
                .wrap(Wrap { trim: true }),
                inner,
            );
        }
        _ => {
            let Some((finding, plan)) = dialog.data.data() else {
                return;
            };
            let mut lines = vec![
                Line::from(Span::styled(
                    finding.title.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("Severity: {} • Scanner: {}", finding.severity, finding.scanner),
                    Style::default().fg(color(severity_color(finding.severity))),
                )),
                Line::from(""),
                section_title("Remediation Plan", palette),
            ];
            for text_line in plan.remediation_plan.lines() {
                lines.push(Line::from(text_line.to_string()));
            }
            if let Some(code) = &plan.terraform_code {
                lines.push(Line::from(""));
                lines.push(section_title("Terraform Code", palette));
                for code_line in code.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("  {code_line}"),
                        Style::default().fg(color(palette.success)),
                    )));
                }
            }
            if let Some(code) = &plan.helm_code {
                lines.push(Line::from(""));
                lines.push(section_title("Helm/Kubernetes YAML", palette));
                for code_line in code.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("  {code_line}"),
                        Style::default().fg(color(palette.success)),
                    )));
                }
            }
            if !plan.manual_steps.is_empty() {
                lines.push(Line::from(""));
                lines.push(section_title("Manual Steps", palette));
                for (i, step) in plan.manual_steps.iter().enumerate() {
                    lines.push(Line::from(format!("  {}. {step}", i + 1)));
                }
            }
            lines.push(Line::from(""));
            lines.push(section_title("Risk Assessment", palette));
            for text_line in plan.risk_assessment.lines() {
                lines.push(Line::from(text_line.to_string()));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(
                    "Estimated effort: {} • Confidence: {}",
                    plan.estimated_effort,
                    format_score(plan.ai_confidence)
                ),
                Style::default().fg(color(palette.text_secondary)),
            )));
            lines.push(Line::from(Span::styled(
                "j/k scroll  Esc close",
                Style::default().fg(color(palette.text_secondary)),
            )));

            f.render_widget(
                Paragraph::new(Text::from(lines))
                    .wrap(Wrap { trim: false })
                    .scroll((dialog.scroll, 0)),
                inner,
            );
        }
    }
}

fn draw_analysis(f: &mut Frame, app: &App) {
    let palette = &app.palette;
    let area = centered_rect(70, 80, f.size());
    f.render_widget(Clear, area);
    let Some(dialog) = &app.analysis else {
        return;
    };
    let block = overlay_block(" AI Compliance Analysis ", palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if dialog.data.is_loading() {
        f.render_widget(
            Paragraph::new(Span::styled(
                format!("{} Analyzing scan #{}...", spinner(app.tick), dialog.scan_id),
                Style::default().fg(color(palette.text_secondary)),
            ))
            .alignment(Alignment::Center),
            inner,
        );
        return;
    }
    if let Some(error) = dialog.data.error() {
        f.render_widget(
            Paragraph::new(Span::styled(
                format!("Analysis failed: {error}"),
                Style::default().fg(color(palette.error)),
            ))
            .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }
    if let Some(value) = dialog.data.data() {
        let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        f.render_widget(
            Paragraph::new(pretty)
                .wrap(Wrap { trim: false })
                .scroll((dialog.scroll, 0)),
            inner,
        );
    }
}

fn draw_help(f: &mut Frame, app: &App) {
    let palette = &app.palette;
    let area = centered_rect(56, 70, f.size());
    f.render_widget(Clear, area);
    let block = overlay_block(" Keys ", palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let entries = [
        ("1 / 2 / 3", "Dashboard / Scans / Environments"),
        ("j / k", "Move selection"),
        ("Enter", "Open details / expand finding"),
        ("r", "Refresh current page"),
        ("d", "Toggle dark mode"),
        ("a", "AI assistant"),
        ("s, e, n, g", "Cycle filters (page dependent)"),
        ("c", "Clear filters"),
        ("f", "AI remediation for selected finding"),
        ("m / M", "Resolve selected / all filtered findings"),
        ("A", "AI analysis of the scan"),
        ("t", "Retry failed scan"),
        ("n / e / x", "New / edit / delete environment"),
        ("Esc", "Dismiss error, close dialog, go back"),
        ("q", "Quit"),
    ];
    let lines: Vec<Line> = entries
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(
                    format!(" {keys:<12}"),
                    Style::default().fg(color(palette.primary)).add_modifier(Modifier::BOLD),
                ),
                Span::raw(*what),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(Text::from(lines)), inner);
}

// ── Shared helpers ────────────────────────────────────────────────

/// Blocking spinner / retry affordance when a page has no data at all.
fn draw_empty_state<T>(f: &mut Frame, app: &App, area: Rect, data: &RemoteData<T>, what: &str) {
    let palette = &app.palette;
    let content = if data.is_loading() {
        Text::from(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("{} Loading {what}...", spinner(app.tick)),
                Style::default().fg(color(palette.text_secondary)),
            )),
        ])
    } else if let Some(error) = data.error() {
        Text::from(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("Failed to load {what}"),
                Style::default().fg(color(palette.error)).add_modifier(Modifier::BOLD),
            )),
            Line::from(error.to_string()),
            Line::from(""),
            Line::from(Span::styled(
                "Press r to retry",
                Style::default().fg(color(palette.text_secondary)),
            )),
        ])
    } else {
        Text::from("")
    };
    f.render_widget(
        Paragraph::new(content)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_error_banner(f: &mut Frame, app: &App, area: Rect, error: Option<&str>) {
    let palette = &app.palette;
    if let Some(error) = error {
        f.render_widget(
            Paragraph::new(Span::styled(
                format!(" {error}  (Esc to dismiss)"),
                Style::default().fg(color(palette.error)),
            )),
            area,
        );
    }
}

/// Corner badge shown while a refresh runs over stale data.
fn draw_refresh_indicator(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let width = 14_u16.min(area.width);
    let badge = Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height: 1,
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            format!("{} refreshing", spinner(app.tick)),
            Style::default().fg(color(palette.info)),
        ))
        .alignment(Alignment::Right),
        badge,
    );
}

fn card_block<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color(palette.text_secondary)))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(color(palette.text)).add_modifier(Modifier::BOLD),
        ))
}

fn overlay_block<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color(palette.primary)))
        .style(Style::default().bg(color(palette.surface)).fg(color(palette.text)))
        .title(Span::styled(
            title,
            Style::default().fg(color(palette.primary)).add_modifier(Modifier::BOLD),
        ))
}

fn section_title<'a>(title: &'a str, palette: &Palette) -> Line<'a> {
    Line::from(Span::styled(
        title,
        Style::default().fg(color(palette.primary)).add_modifier(Modifier::BOLD),
    ))
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn spinner(tick: u64) -> &'static str {
    SPINNER_FRAMES[(tick % SPINNER_FRAMES.len() as u64) as usize]
}

fn environment_name(environments: &[Environment], id: i64) -> String {
    environments
        .iter()
        .find(|e| e.id == id)
        .map(|e| e.name.clone())
        .unwrap_or_else(|| format!("Environment {id}"))
}

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

fn format_trend_date(point: &TrendPoint) -> String {
    point.date.format("%b %d").to_string()
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Scores scaled to percentages for one regulation across the trend.
fn trend_series(trend: &[TrendPoint], code: &str) -> Vec<(f64, f64)> {
    trend
        .iter()
        .enumerate()
        .map(|(i, point)| {
            (
                i as f64,
                point.scores.get(code).copied().unwrap_or(0.0) * 100.0,
            )
        })
        .collect()
}

/// Width-aware truncation for table cells.
fn truncate(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            out.push('…');
            return out;
        }
        width += w;
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    #[test]
    fn trend_series_scales_scores_to_percentages() {
        let mut scores = BTreeMap::new();
        scores.insert("NIS2".to_string(), 0.85);
        let trend = vec![
            TrendPoint {
                date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
                scores: scores.clone(),
            },
            TrendPoint {
                date: NaiveDate::from_ymd_opt(2025, 11, 2).unwrap(),
                scores: BTreeMap::new(),
            },
        ];

        let series = trend_series(&trend, "NIS2");
        assert_eq!(series, vec![(0.0, 85.0), (1.0, 0.0)]);

        // Absent regulations plot flat at zero.
        let missing = trend_series(&trend, "DORA");
        assert_eq!(missing, vec![(0.0, 0.0), (1.0, 0.0)]);
    }

    #[test]
    fn truncate_respects_display_width() {
        assert_eq!(truncate("S3Bucket", 12), "S3Bucket");
        assert_eq!(truncate("VeryLongResourceTypeName", 8), "VeryLon…");
        assert_eq!(truncate("", 4), "");
    }

    #[test]
    fn environment_name_falls_back_to_id() {
        let envs = vec![Environment {
            id: 3,
            name: "prod".to_string(),
            env_type: radar_core::types::EnvironmentType::Aws,
            description: None,
            last_scan: None,
        }];
        assert_eq!(environment_name(&envs, 3), "prod");
        assert_eq!(environment_name(&envs, 9), "Environment 9");
    }

    #[test]
    fn spinner_cycles_through_frames() {
        let first = spinner(0);
        assert_eq!(spinner(SPINNER_FRAMES.len() as u64), first);
    }
}
