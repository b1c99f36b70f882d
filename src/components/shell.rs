//! Chrome around the active page: section tabs, signed-in user, and a footer
//! that shows either the latest store error or the page's key hints.

use compareflow_theme as theme;
use ratatui::{prelude::*, widgets::*};

use super::Frame;
use crate::{router::Route, store::Store};

const SECTIONS: [(Route, &str); 3] =
  [(Route::Dashboard, "[1] Dashboard"), (Route::Connections, "[2] Connections"), (Route::Validations, "[3] Validations")];

/// Draws header and footer, returning the area left for the page.
pub fn draw(f: &mut Frame<'_>, area: Rect, route: Route, store: &Store, hints: &[(&str, &str)]) -> Rect {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(1)])
    .split(area);

  draw_header(f, chunks[0], route, store);
  draw_footer(f, chunks[2], store, hints);
  chunks[1]
}

fn draw_header(f: &mut Frame<'_>, area: Rect, route: Route, store: &Store) {
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(theme::border_normal())
    .border_type(BorderType::Rounded)
    .style(theme::bg_primary())
    .title(Span::styled(" compareflow ", theme::title()));

  let user = match store.auth().user() {
    Some(user) => format!(" {} [Ctrl-x] logout ", user.username),
    None if store.is_authenticated() => " signed in [Ctrl-x] logout ".to_string(),
    None => String::new(),
  };
  let block = block.title(Line::from(Span::styled(user, theme::muted())).right_aligned());
  let inner = block.inner(area);
  f.render_widget(block, area);

  if route.is_auth_page() {
    f.render_widget(Paragraph::new(Span::styled(route.title(), theme::header())), inner);
    return;
  }

  let selected = SECTIONS.iter().position(|(section, _)| *section == route.section());
  let tabs = Tabs::new(SECTIONS.iter().map(|(_, label)| *label))
    .style(theme::tab_normal())
    .highlight_style(theme::tab_selected())
    .select(selected.unwrap_or(0))
    .divider(" ");
  f.render_widget(tabs, inner);
}

fn draw_footer(f: &mut Frame<'_>, area: Rect, store: &Store, hints: &[(&str, &str)]) {
  let line = match store.last_error() {
    Some(error) => Line::from(vec![
      Span::styled(format!(" {error} "), theme::chip(theme::ERROR)),
      Span::styled("  [Esc] dismiss", theme::muted()),
    ]),
    None => Line::from(
      hints
        .iter()
        .flat_map(|(key, label)| {
          [Span::styled(format!(" {key} "), theme::highlight_number()), Span::styled(format!("{label} "), theme::muted())]
        })
        .collect::<Vec<_>>(),
    ),
  };
  f.render_widget(Paragraph::new(line).style(theme::status_bar()), area);
}
