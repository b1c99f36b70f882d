//! Read-only rendering of a validation's last execution.
//!
//! The report has four states: closed (not drawn at all), running (spinner
//! only), pending (status and configuration only) and everything else, which
//! shows the full breakdown. A failed run without a results payload still
//! gets the summary section, with every count at zero.

use chrono::{DateTime, Local, Utc};
use compareflow_theme as theme;
use ratatui::{prelude::*, widgets::*};

use super::{centered_rect, spinner, status_style, Frame};
use crate::models::{Difference, DifferenceKind, Validation, ValidationStatus};

const MAX_DIFFERENCES: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
  pub format_queries: bool,
}

fn format_date_time(value: Option<DateTime<Utc>>) -> String {
  value.map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()).unwrap_or_else(|| "N/A".into())
}

fn percent(rate: f64) -> String {
  if rate.fract() == 0.0 {
    format!("{rate:.0}%")
  } else {
    format!("{rate}%")
  }
}

fn json_or_dash(value: Option<&serde_json::Value>) -> String {
  match value {
    None | Some(serde_json::Value::Null) => "-".into(),
    Some(value) => value.to_string(),
  }
}

fn section(title: &str) -> Line<'static> {
  Line::from(Span::styled(title.to_string(), theme::header()))
}

fn field(label: &str, value: String) -> Line<'static> {
  Line::from(vec![Span::styled(format!("{label}: "), theme::muted()), Span::styled(value, theme::title())])
}

fn query_lines(query: &str, options: ReportOptions) -> Vec<Line<'static>> {
  if query.trim().is_empty() {
    return vec![Line::from(Span::styled("  N/A", theme::muted()))];
  }
  let text = if options.format_queries {
    sqlformat::format(query, &sqlformat::QueryParams::None, sqlformat::FormatOptions::default())
  } else {
    query.to_string()
  };
  text.lines().map(|line| Line::from(Span::styled(format!("  {line}"), theme::code()))).collect()
}

fn difference_line(diff: &Difference) -> Line<'static> {
  let style = match diff.kind {
    DifferenceKind::Missing => theme::chip(theme::ERROR),
    DifferenceKind::Extra => theme::chip(theme::INFO),
    DifferenceKind::Mismatch => theme::chip(theme::WARNING),
  };
  let columns = if diff.columns.is_empty() { "N/A".to_string() } else { diff.columns.join(", ") };
  Line::from(vec![
    Span::styled(format!(" {} ", diff.kind), style),
    Span::raw(format!(
      " key={} source={} target={} columns={}",
      json_or_dash(Some(&diff.key)),
      json_or_dash(diff.source_data.as_ref()),
      json_or_dash(diff.target_data.as_ref()),
      columns
    )),
  ])
}

/// Body of the report as styled lines, ready for a scrolling paragraph.
pub fn report_lines(validation: &Validation, running: bool, options: ReportOptions, tick: usize) -> Vec<Line<'static>> {
  if running {
    return vec![
      Line::default(),
      Line::from(Span::styled(format!("{} Running validation...", spinner(tick)), theme::info())).centered(),
      Line::from(Span::styled("This may take a few moments depending on the data size", theme::muted())).centered(),
    ];
  }

  let results = validation.results.clone().unwrap_or_default();
  let mut lines = vec![
    section("Status"),
    Line::from(vec![
      Span::styled(format!(" {} ", validation.status.to_string().to_uppercase()), status_style(validation.status)),
      Span::raw(format!("  Last run: {}", format_date_time(validation.updated_at))),
    ]),
  ];
  if let Some(ms) = results.duration_ms {
    lines.push(field("Duration", format!("{ms} ms")));
  }
  if let Some(execution) = results.execution_id.as_ref() {
    lines.push(field("Execution", execution.clone()));
  }

  lines.push(Line::default());
  lines.push(section("Configuration"));
  lines.push(field(
    "Type",
    validation.config.comparison_type.map(|t| t.to_string()).unwrap_or_else(|| "N/A".into()),
  ));
  lines.push(field("Source", validation.source_name().unwrap_or("N/A").to_string()));
  lines.push(field("Target", validation.target_name().unwrap_or("N/A").to_string()));
  if !validation.config.key_columns.is_empty() {
    lines.push(field("Key columns", validation.config.key_columns.join(", ")));
  }

  if validation.status == ValidationStatus::Pending {
    return lines;
  }

  let summary = validation.summary();
  let rate = summary.success_rate.unwrap_or(0.0);
  lines.push(Line::default());
  lines.push(section("Summary Statistics"));
  lines.push(field("Source Rows", summary.source_row_count.unwrap_or(0).to_string()));
  lines.push(field("Target Rows", summary.target_row_count.unwrap_or(0).to_string()));
  lines.push(Line::from(vec![
    Span::styled("Matched Rows: ", theme::muted()),
    Span::styled(summary.matched_rows.unwrap_or(0).to_string(), theme::success()),
  ]));
  lines.push(Line::from(vec![
    Span::styled("Success Rate: ", theme::muted()),
    Span::styled(percent(rate), if rate == 100.0 { theme::success() } else { theme::warning() }),
  ]));

  if summary.has_discrepancies() {
    lines.push(Line::default());
    lines.push(section("Discrepancies Found"));
    let alerts = [
      ("Mismatched Rows", summary.mismatched_rows, theme::warning()),
      ("Missing in Target", summary.missing_in_target, theme::error()),
      ("Extra in Target", summary.extra_in_target, theme::info()),
    ];
    for (label, count, style) in alerts {
      if let Some(count) = count.filter(|c| *c > 0) {
        lines.push(Line::from(Span::styled(format!("! {label}: {count}"), style)));
      }
    }
  }

  lines.push(Line::default());
  lines.push(section("Queries Executed"));
  lines.push(Line::from(Span::styled("Source Query", theme::muted())));
  lines.extend(query_lines(&validation.config.source_query, options));
  lines.push(Line::from(Span::styled("Target Query", theme::muted())));
  lines.extend(query_lines(&validation.config.target_query, options));

  if !results.errors.is_empty() {
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Errors", theme::error().add_modifier(Modifier::BOLD))));
    for error in &results.errors {
      lines.push(Line::from(Span::styled(format!("x {}", error.message()), theme::error())));
    }
  }

  let details = results.details.unwrap_or_default();
  if !details.differences.is_empty() {
    lines.push(Line::default());
    lines.push(section("Sample Differences (First 10)"));
    lines.extend(details.differences.iter().take(MAX_DIFFERENCES).map(difference_line));
  }

  if !details.column_stats.is_empty() {
    lines.push(Line::default());
    lines.push(section("Column Statistics"));
    for (column, stats) in &details.column_stats {
      lines.push(Line::from(vec![
        Span::styled(format!("{column}: "), theme::title()),
        Span::raw(format!(
          "source min {} max {} avg {} | target min {} max {} avg {}",
          json_or_dash(stats.source_min.as_ref()),
          json_or_dash(stats.source_max.as_ref()),
          stats.source_avg.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into()),
          json_or_dash(stats.target_min.as_ref()),
          json_or_dash(stats.target_max.as_ref()),
          stats.target_avg.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into()),
        )),
      ]));
    }
  }

  lines
}

/// Draws the report as a popup over `area`.
pub fn render_report(
  f: &mut Frame<'_>,
  area: Rect,
  validation: &Validation,
  running: bool,
  options: ReportOptions,
  scroll: u16,
  tick: usize,
) {
  let popup = centered_rect(90, 85, area);
  f.render_widget(Clear, popup);

  let block = Block::default()
    .title(format!(" Validation Execution Report: {} ", validation.name))
    .title_style(theme::title())
    .title_bottom(Line::from(" [Esc] close  [Up/Down] scroll ").right_aligned())
    .borders(Borders::ALL)
    .border_type(BorderType::Rounded)
    .border_style(theme::border_focused())
    .style(theme::bg_primary());

  let body = Paragraph::new(report_lines(validation, running, options, tick))
    .block(block)
    .wrap(Wrap { trim: false })
    .scroll((scroll, 0));
  f.render_widget(body, popup);
}
