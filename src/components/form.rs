//! Field widgets shared by the login and editor pages.

use compareflow_theme as theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{prelude::*, widgets::*};
use tui_textarea::{CursorMove, TextArea};

use super::Frame;

enum Input {
  Text { area: TextArea<'static>, lines: u16 },
  Toggle(bool),
  Select { options: Vec<String>, selected: usize },
}

pub struct FormField {
  label: &'static str,
  input: Input,
  required: bool,
  hidden: bool,
}

fn text_area(value: &str) -> TextArea<'static> {
  let mut area = TextArea::new(value.split('\n').map(String::from).collect());
  area.set_cursor_line_style(Style::default());
  area.move_cursor(CursorMove::Bottom);
  area.move_cursor(CursorMove::End);
  area
}

impl FormField {
  pub fn text(label: &'static str) -> Self {
    Self { label, input: Input::Text { area: text_area(""), lines: 1 }, required: false, hidden: false }
  }

  /// Text input where Enter inserts a newline.
  pub fn multiline(label: &'static str, lines: u16) -> Self {
    Self { label, input: Input::Text { area: text_area(""), lines: lines.max(2) }, required: false, hidden: false }
  }

  pub fn toggle(label: &'static str, value: bool) -> Self {
    Self { label, input: Input::Toggle(value), required: false, hidden: false }
  }

  pub fn select(label: &'static str, options: Vec<String>) -> Self {
    Self { label, input: Input::Select { options, selected: 0 }, required: false, hidden: false }
  }

  pub fn required(mut self) -> Self {
    self.required = true;
    self
  }

  pub fn masked(mut self) -> Self {
    if let Input::Text { area, .. } = &mut self.input {
      area.set_mask_char('\u{2022}');
    }
    self
  }

  pub fn label(&self) -> &'static str {
    self.label
  }

  pub fn is_multiline(&self) -> bool {
    matches!(self.input, Input::Text { lines, .. } if lines > 1)
  }

  /// Text content, lines joined with `\n`. Empty for non-text fields.
  pub fn value(&self) -> String {
    match &self.input {
      Input::Text { area, .. } => area.lines().join("\n"),
      _ => String::new(),
    }
  }

  pub fn set_value(&mut self, value: &str) {
    if let Input::Text { area, .. } = &mut self.input {
      let mask = area.mask_char();
      *area = text_area(value);
      if let Some(mask) = mask {
        area.set_mask_char(mask);
      }
    }
  }

  pub fn checked(&self) -> bool {
    matches!(self.input, Input::Toggle(true))
  }

  pub fn set_checked(&mut self, value: bool) {
    if let Input::Toggle(current) = &mut self.input {
      *current = value;
    }
  }

  pub fn selected(&self) -> usize {
    match self.input {
      Input::Select { selected, .. } => selected,
      _ => 0,
    }
  }

  pub fn select_index(&mut self, index: usize) {
    if let Input::Select { options, selected } = &mut self.input {
      if index < options.len() {
        *selected = index;
      }
    }
  }

  /// Replaces the options, keeping the selection index in range.
  pub fn set_options(&mut self, new_options: Vec<String>) {
    if let Input::Select { options, selected } = &mut self.input {
      *options = new_options;
      if *selected >= options.len() {
        *selected = 0;
      }
    }
  }

  pub fn is_missing(&self) -> bool {
    self.required && !self.hidden && self.value().trim().is_empty() && matches!(self.input, Input::Text { .. })
  }

  fn height(&self) -> u16 {
    match self.input {
      Input::Text { lines, .. } => lines + 2,
      _ => 3,
    }
  }

  /// Returns true when the key changed the field.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    match &mut self.input {
      Input::Text { area, lines } => {
        if key.code == KeyCode::Enter && *lines == 1 {
          return false;
        }
        area.input(key)
      },
      Input::Toggle(value) => match key.code {
        KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
          *value = !*value;
          true
        },
        _ => false,
      },
      Input::Select { options, selected } if !options.is_empty() => match key.code {
        KeyCode::Right | KeyCode::Char(' ') => {
          *selected = (*selected + 1) % options.len();
          true
        },
        KeyCode::Left => {
          *selected = (*selected + options.len() - 1) % options.len();
          true
        },
        _ => false,
      },
      Input::Select { .. } => false,
    }
  }

  pub fn paste(&mut self, text: &str) -> bool {
    match &mut self.input {
      Input::Text { area, lines } if *lines == 1 => area.insert_str(text.replace(['\r', '\n'], "")),
      Input::Text { area, .. } => area.insert_str(text.replace('\r', "")),
      _ => false,
    }
  }

  pub fn render(&mut self, f: &mut Frame<'_>, area: Rect, focused: bool) {
    let title = if self.required { format!(" {} * ", self.label) } else { format!(" {} ", self.label) };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_type(BorderType::Rounded)
      .border_style(theme::border(focused))
      .title(title)
      .title_style(if focused { theme::title() } else { theme::muted() });

    match &mut self.input {
      Input::Text { area: text, .. } => {
        text.set_block(block);
        text.set_style(theme::input());
        text.set_cursor_style(if focused { Style::default().add_modifier(Modifier::REVERSED) } else { Style::default() });
        f.render_widget(&*text, area);
      },
      Input::Toggle(value) => {
        let (mark, style) = if *value { ("[x] Yes", theme::success()) } else { ("[ ] No", theme::muted()) };
        f.render_widget(Paragraph::new(Span::styled(mark, style)).block(block), area);
      },
      Input::Select { options, selected } => {
        let current = options.get(*selected).map(String::as_str).unwrap_or("(none)");
        let line = Line::from(vec![
          Span::styled("< ", theme::muted()),
          Span::styled(current.to_string(), if focused { theme::selection_active() } else { theme::input() }),
          Span::styled(" >", theme::muted()),
        ]);
        f.render_widget(Paragraph::new(line).block(block), area);
      },
    }
  }
}

/// What a key press meant to the form as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent<K> {
  Submit,
  Cancel,
  Changed(K),
  Moved,
  Ignored,
}

/// Ordered set of fields with a focus cursor. Hidden fields are skipped.
pub struct Form<K> {
  fields: Vec<(K, FormField)>,
  focus: usize,
}

impl<K: Copy + PartialEq> Form<K> {
  pub fn new(fields: Vec<(K, FormField)>) -> Self {
    let mut form = Self { fields, focus: 0 };
    form.focus = form.visible_indices().first().copied().unwrap_or(0);
    form
  }

  fn index(&self, key: K) -> Option<usize> {
    self.fields.iter().position(|(k, _)| *k == key)
  }

  fn visible_indices(&self) -> Vec<usize> {
    self.fields.iter().enumerate().filter(|(_, (_, field))| !field.hidden).map(|(i, _)| i).collect()
  }

  pub fn field(&self, key: K) -> Option<&FormField> {
    self.fields.iter().find(|(k, _)| *k == key).map(|(_, field)| field)
  }

  pub fn field_mut(&mut self, key: K) -> Option<&mut FormField> {
    self.fields.iter_mut().find(|(k, _)| *k == key).map(|(_, field)| field)
  }

  pub fn value(&self, key: K) -> String {
    self.field(key).map(FormField::value).unwrap_or_default()
  }

  pub fn set_value(&mut self, key: K, value: &str) {
    if let Some(field) = self.field_mut(key) {
      field.set_value(value);
    }
  }

  pub fn checked(&self, key: K) -> bool {
    self.field(key).is_some_and(FormField::checked)
  }

  pub fn selected(&self, key: K) -> usize {
    self.field(key).map(FormField::selected).unwrap_or(0)
  }

  pub fn focused(&self) -> Option<K> {
    self.fields.get(self.focus).map(|(k, _)| *k)
  }

  pub fn focus(&mut self, key: K) {
    if let Some(index) = self.index(key) {
      if !self.fields[index].1.hidden {
        self.focus = index;
      }
    }
  }

  pub fn set_hidden(&mut self, key: K, hidden: bool) {
    if let Some(field) = self.field_mut(key) {
      field.hidden = hidden;
    }
    if self.fields.get(self.focus).is_some_and(|(_, field)| field.hidden) {
      self.focus = self.visible_indices().first().copied().unwrap_or(0);
    }
  }

  /// Labels of visible required text fields left blank.
  pub fn missing(&self) -> Vec<&'static str> {
    self.fields.iter().filter(|(_, field)| field.is_missing()).map(|(_, field)| field.label).collect()
  }

  fn step(&mut self, forward: bool) {
    let visible = self.visible_indices();
    if visible.is_empty() {
      return;
    }
    let position = visible.iter().position(|i| *i == self.focus).unwrap_or(0);
    let next = if forward { (position + 1) % visible.len() } else { (position + visible.len() - 1) % visible.len() };
    self.focus = visible[next];
  }

  fn on_last(&self) -> bool {
    self.visible_indices().last() == Some(&self.focus)
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> FormEvent<K> {
    let multiline = self.fields.get(self.focus).is_some_and(|(_, field)| field.is_multiline());
    match key.code {
      KeyCode::Esc => return FormEvent::Cancel,
      KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => return FormEvent::Submit,
      KeyCode::Tab => {
        self.step(true);
        return FormEvent::Moved;
      },
      KeyCode::BackTab => {
        self.step(false);
        return FormEvent::Moved;
      },
      KeyCode::Down if !multiline => {
        self.step(true);
        return FormEvent::Moved;
      },
      KeyCode::Up if !multiline => {
        self.step(false);
        return FormEvent::Moved;
      },
      KeyCode::Enter if !multiline => {
        if self.on_last() {
          return FormEvent::Submit;
        }
        self.step(true);
        return FormEvent::Moved;
      },
      _ => {},
    }
    let Some((k, field)) = self.fields.get_mut(self.focus) else {
      return FormEvent::Ignored;
    };
    if field.handle_key(key) {
      FormEvent::Changed(*k)
    } else {
      FormEvent::Ignored
    }
  }

  pub fn paste(&mut self, text: &str) -> FormEvent<K> {
    let Some((k, field)) = self.fields.get_mut(self.focus) else {
      return FormEvent::Ignored;
    };
    if field.paste(text) {
      FormEvent::Changed(*k)
    } else {
      FormEvent::Ignored
    }
  }

  /// Draws visible fields top to bottom, scrolled so the focused one is on screen.
  pub fn render(&mut self, f: &mut Frame<'_>, area: Rect) {
    let visible = self.visible_indices();
    let position = visible.iter().position(|i| *i == self.focus).unwrap_or(0);

    let mut start = 0;
    while start < position {
      let needed: u16 = visible[start..=position].iter().map(|i| self.fields[*i].1.height()).sum();
      if needed <= area.height {
        break;
      }
      start += 1;
    }

    let mut y = area.y;
    for index in &visible[start..] {
      let (_, field) = &mut self.fields[*index];
      let height = field.height();
      if y + height > area.y + area.height {
        break;
      }
      field.render(f, Rect::new(area.x, y, area.width, height), *index == self.focus);
      y += height;
    }
  }
}
