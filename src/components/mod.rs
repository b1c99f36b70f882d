pub mod connection_form;
pub mod connections;
pub mod dashboard;
pub mod form;
pub mod login;
pub mod report;
pub mod shell;
pub mod validation_form;
pub mod validations;

use color_eyre::eyre::Result;
use compareflow_theme as theme;
use crossterm::event::KeyEvent;
use ratatui::{
  layout::{Constraint, Direction, Layout, Rect},
  style::Style,
  text::Span,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::{action::Action, config::Config, mode::Mode, models::ValidationStatus, store::Store, tui};

pub type Frame<'a> = ratatui::Frame<'a>;

/// A page of the client. Pages read the store but never write it; anything
/// they want changed goes back out as an [`Action`].
pub trait Component {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    let _ = tx;
    Ok(())
  }

  fn register_config_handler(&mut self, config: Config) -> Result<()> {
    let _ = config;
    Ok(())
  }

  fn init(&mut self, _area: Rect) -> Result<()> {
    Ok(())
  }

  /// The page is active while the current route maps to this mode.
  fn mode(&self) -> Mode;

  /// Keys worth advertising in the footer.
  fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
    Vec::new()
  }

  /// While true the page sees every key and the mode keymap is bypassed.
  fn captures_keys(&self) -> bool {
    false
  }

  fn handle_events(&mut self, event: Option<tui::Event>, store: &Store) -> Result<Option<Action>> {
    match event {
      Some(tui::Event::Key(key)) => self.handle_key_events(key, store),
      Some(tui::Event::Paste(text)) => self.handle_paste(&text),
      _ => Ok(None),
    }
  }

  fn handle_key_events(&mut self, key: KeyEvent, store: &Store) -> Result<Option<Action>>;

  fn handle_paste(&mut self, _text: &str) -> Result<Option<Action>> {
    Ok(None)
  }

  fn update(&mut self, action: Action, store: &Store) -> Result<Option<Action>>;

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect, store: &Store) -> Result<()>;
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
  let popup_layout = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Percentage((100 - percent_y) / 2),
      Constraint::Percentage(percent_y),
      Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

  Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Percentage((100 - percent_x) / 2),
      Constraint::Percentage(percent_x),
      Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

/// Yes/no dialog used before destructive requests.
pub fn render_confirm(f: &mut Frame<'_>, area: Rect, title: &str, message: &str) {
  use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

  let popup = centered_rect(50, 30, area);
  f.render_widget(Clear, popup);
  let block = Block::default()
    .title(format!(" {title} "))
    .title_style(theme::title())
    .title_bottom(ratatui::text::Line::from(" [y] delete  [n] cancel ").right_aligned())
    .borders(Borders::ALL)
    .border_type(BorderType::Rounded)
    .border_style(theme::border_focused())
    .style(theme::bg_primary());
  f.render_widget(Paragraph::new(message.to_string()).block(block).wrap(Wrap { trim: true }), popup);
}

pub fn status_style(status: ValidationStatus) -> Style {
  match status {
    ValidationStatus::Completed => theme::chip(theme::SUCCESS),
    ValidationStatus::Failed => theme::chip(theme::ERROR),
    ValidationStatus::Running => theme::chip(theme::INFO),
    ValidationStatus::Pending => theme::chip_default(),
  }
}

pub fn status_chip(status: ValidationStatus) -> Span<'static> {
  Span::styled(format!(" {status} "), status_style(status))
}

/// `98%` style rate, `-` when there is none to show.
pub fn format_rate(rate: Option<f64>) -> String {
  match rate {
    Some(rate) if rate.fract() == 0.0 => format!("{rate:.0}%"),
    Some(rate) => format!("{rate:.2}%"),
    None => "-".to_string(),
  }
}

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn spinner(tick: usize) -> &'static str {
  SPINNER[tick % SPINNER.len()]
}
