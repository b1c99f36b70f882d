use ratatui::style::{Color, Modifier, Style};

/// One Dark palette shared by every compareflow screen.
/// Kept in its own crate so palette tweaks don't rebuild the client.

// Color constants
pub const ACCENT_BLUE: Color = Color::Rgb(97, 175, 239);
pub const ACCENT_CYAN: Color = Color::Rgb(86, 182, 194);
pub const ACCENT_GREEN: Color = Color::Rgb(152, 195, 121);
pub const ACCENT_ORANGE: Color = Color::Rgb(209, 154, 102);
pub const ACCENT_PURPLE: Color = Color::Rgb(198, 120, 221);
pub const BG_PRIMARY: Color = Color::Rgb(40, 44, 52);
pub const BG_SECONDARY: Color = Color::Rgb(33, 37, 43);
pub const BG_SELECTION: Color = Color::Rgb(62, 68, 81);
pub const BG_TERTIARY: Color = Color::Rgb(44, 49, 58);
pub const BORDER_FOCUSED: Color = Color::Rgb(97, 175, 239);
pub const BORDER_NORMAL: Color = Color::Rgb(92, 99, 112);
pub const ERROR: Color = Color::Rgb(224, 108, 117);
pub const FG_PRIMARY: Color = Color::Rgb(171, 178, 191);
pub const FG_SECONDARY: Color = Color::Rgb(92, 99, 112);
pub const INFO: Color = Color::Rgb(97, 175, 239);
pub const SUCCESS: Color = Color::Rgb(152, 195, 121);
pub const WARNING: Color = Color::Rgb(229, 192, 123);

/// Main application background
pub fn bg_primary() -> Style {
  Style::new().bg(BG_PRIMARY).fg(FG_PRIMARY)
}

/// Input field styling
pub fn input() -> Style {
  Style::new().bg(BG_TERTIARY).fg(FG_PRIMARY)
}

/// Active selection with accent color
pub fn selection_active() -> Style {
  Style::new().bg(ACCENT_BLUE).fg(BG_PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn border_normal() -> Style {
  Style::new().fg(BORDER_NORMAL)
}

pub fn border_focused() -> Style {
  Style::new().fg(BORDER_FOCUSED)
}

/// Border style based on focus state
pub fn border(focused: bool) -> Style {
  if focused {
    border_focused()
  } else {
    border_normal()
  }
}

/// Header styling for tables
pub fn header() -> Style {
  Style::new().bg(BG_SELECTION).fg(ACCENT_CYAN).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn title() -> Style {
  Style::new().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD)
}

pub fn success() -> Style {
  Style::new().fg(SUCCESS).add_modifier(Modifier::BOLD)
}

pub fn warning() -> Style {
  Style::new().fg(WARNING).add_modifier(Modifier::BOLD)
}

pub fn error() -> Style {
  Style::new().fg(ERROR).add_modifier(Modifier::BOLD)
}

pub fn info() -> Style {
  Style::new().fg(INFO)
}

/// Muted text styling
pub fn muted() -> Style {
  Style::new().fg(FG_SECONDARY)
}

pub fn tab_normal() -> Style {
  Style::new().fg(FG_SECONDARY)
}

pub fn tab_selected() -> Style {
  Style::new().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn status_bar() -> Style {
  Style::new().bg(BG_SECONDARY).fg(FG_PRIMARY)
}

/// Filled badge, the terminal stand-in for a chip
pub fn chip(color: Color) -> Style {
  Style::new().bg(color).fg(BG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Neutral chip for states without a semantic color
pub fn chip_default() -> Style {
  Style::new().bg(BG_SELECTION).fg(FG_PRIMARY)
}

/// Query text in reports
pub fn code() -> Style {
  Style::new().bg(BG_SECONDARY).fg(ACCENT_GREEN)
}

pub fn highlight_number() -> Style {
  Style::new().fg(ACCENT_ORANGE).add_modifier(Modifier::BOLD)
}
