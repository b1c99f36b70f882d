use color_eyre::eyre::Result;
use compareflow_theme as theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc::UnboundedSender;

use super::{status_chip, Component, Frame};
use crate::{action::Action, mode::Mode, router::Route, store::Store};

const RECENT_VALIDATIONS: usize = 5;

#[derive(Default)]
pub struct Dashboard {
  command_tx: Option<UnboundedSender<Action>>,
}

impl Dashboard {
  pub fn new() -> Self {
    Self::default()
  }

  fn fetch_all(&self) -> Result<()> {
    if let Some(tx) = &self.command_tx {
      tx.send(Action::FetchConnections)?;
      tx.send(Action::FetchValidations)?;
    }
    Ok(())
  }
}

fn stat_card(title: &str, value: usize, color: Color) -> Paragraph<'static> {
  Paragraph::new(vec![
    Line::from(Span::styled(title.to_string(), theme::muted())),
    Line::from(Span::styled(value.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD))),
  ])
  .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).border_style(theme::border_normal()))
}

impl Component for Dashboard {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.command_tx = Some(tx);
    Ok(())
  }

  fn mode(&self) -> Mode {
    Mode::Dashboard
  }

  fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
    vec![("c", "new connection"), ("v", "new validation"), ("a", "view all"), ("F5", "refresh"), ("q", "quit")]
  }

  fn handle_key_events(&mut self, key: KeyEvent, _store: &Store) -> Result<Option<Action>> {
    Ok(match key.code {
      KeyCode::Char('c') => Some(Action::Navigate(Route::NewConnection)),
      KeyCode::Char('v') => Some(Action::Navigate(Route::NewValidation)),
      KeyCode::Char('a') => Some(Action::Navigate(Route::Validations)),
      _ => None,
    })
  }

  fn update(&mut self, action: Action, _store: &Store) -> Result<Option<Action>> {
    if action == Action::Navigate(Route::Dashboard) {
      self.fetch_all()?;
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect, store: &Store) -> Result<()> {
    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(4), Constraint::Min(6)])
      .split(area);

    let cards = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
      .split(rows[0]);
    let validations = store.validations();
    f.render_widget(stat_card("Total Connections", store.connections().all().len(), theme::ACCENT_BLUE), cards[0]);
    f.render_widget(stat_card("Total Validations", validations.all().len(), theme::ACCENT_GREEN), cards[1]);
    f.render_widget(stat_card("Running Validations", validations.running_count(), theme::ACCENT_ORANGE), cards[2]);

    let panels = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
      .split(rows[1]);

    let quick = Paragraph::new(vec![
      Line::from(vec![Span::styled(" c ", theme::highlight_number()), Span::raw("Add New Connection")]),
      Line::from(vec![Span::styled(" v ", theme::highlight_number()), Span::raw("Create New Validation")]),
      Line::from(vec![Span::styled(" a ", theme::highlight_number()), Span::raw("View All Validations")]),
    ])
    .block(
      Block::default()
        .title(" Quick Actions ")
        .title_style(theme::title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_normal()),
    );
    f.render_widget(quick, panels[0]);

    let recent_block = Block::default()
      .title(" Recent Validations ")
      .title_style(theme::title())
      .borders(Borders::ALL)
      .border_type(BorderType::Rounded)
      .border_style(theme::border_normal());
    if validations.all().is_empty() {
      let message = if validations.is_loading() { "Loading..." } else { "No validations yet" };
      f.render_widget(Paragraph::new(Span::styled(message, theme::muted())).block(recent_block), panels[1]);
    } else {
      let items: Vec<ListItem> = validations
        .all()
        .iter()
        .take(RECENT_VALIDATIONS)
        .map(|v| ListItem::new(Line::from(vec![Span::raw(format!("{} ", v.name)), status_chip(v.status)])))
        .collect();
      f.render_widget(List::new(items).block(recent_block), panels[1]);
    }
    Ok(())
  }
}
