use ratatui::style::{Color, Modifier, Style};

/// Color theme for the palaver TUI.
///
/// Bluish dark palette tuned for long reading sessions; message metadata and
/// separators stay muted so the body text carries the contrast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub blue: Color,
    pub cyan: Color,
    pub green: Color,
    pub yellow: Color,
    pub red: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::Rgb(22, 24, 33),
            fg: Color::Rgb(198, 200, 209),
            muted: Color::Rgb(107, 112, 137),
            blue: Color::Rgb(132, 160, 198),
            cyan: Color::Rgb(137, 184, 194),
            green: Color::Rgb(180, 190, 130),
            yellow: Color::Rgb(226, 164, 120),
            red: Color::Rgb(226, 120, 120),
        }
    }
}

impl Theme {
    /// Base style for message body text
    pub fn body(&self) -> Style {
        Style::default().fg(self.fg)
    }

    /// Sender/time metadata line
    pub fn meta(&self) -> Style {
        Style::default().fg(self.muted).add_modifier(Modifier::ITALIC)
    }

    /// Metadata line for the local participant
    pub fn meta_local(&self) -> Style {
        Style::default().fg(self.green).add_modifier(Modifier::ITALIC)
    }

    /// Date separator line
    pub fn boundary(&self) -> Style {
        Style::default().fg(self.yellow).add_modifier(Modifier::BOLD)
    }

    /// Attachment line
    pub fn attachment(&self) -> Style {
        Style::default().fg(self.cyan)
    }

    /// Status bar at the bottom of the viewport
    pub fn status(&self) -> Style {
        Style::default().fg(self.blue)
    }
}
