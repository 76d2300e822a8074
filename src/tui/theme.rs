//! Colors per configured theme. `mono` keeps modifiers but drops color, for
//! terminals with poor palettes.

use ratatui::style::{Color, Modifier, Style};

use crate::core::config::Theme;
use crate::core::model::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub focus_border: Color,
    pub selection: Style,
    pub error: Color,
    pub success: Color,
    pub star: Color,
    pub high: Color,
    pub medium: Color,
    pub low: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Default => Self {
                text: Color::White,
                muted: Color::DarkGray,
                accent: Color::Magenta,
                border: Color::DarkGray,
                focus_border: Color::Magenta,
                selection: Style::default()
                    .fg(Color::White)
                    .bg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
                error: Color::Red,
                success: Color::Green,
                star: Color::Yellow,
                high: Color::Red,
                medium: Color::Yellow,
                low: Color::Blue,
            },
            Theme::Mono => Self {
                text: Color::Reset,
                muted: Color::Reset,
                accent: Color::Reset,
                border: Color::Reset,
                focus_border: Color::Reset,
                selection: Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD),
                error: Color::Reset,
                success: Color::Reset,
                star: Color::Reset,
                high: Color::Reset,
                medium: Color::Reset,
                low: Color::Reset,
            },
        }
    }

    pub fn priority(&self, priority: Priority) -> Color {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
            Priority::None => self.muted,
        }
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.focus_border)
        } else {
            Style::default().fg(self.border)
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::for_theme(Theme::Default)
    }
}
