//! Terminal color sequences used by the renderer

use crossterm::Command;
use crossterm::style::{Color, ResetColor, SetForegroundColor};

/// Escape sequences for the colors the renderer uses.
///
/// A disabled palette renders every sequence as the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub red: String,
    pub yellow: String,
    pub green: String,
    pub magenta: String,
    pub reset: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self::ansi()
    }
}

impl Palette {
    /// ANSI foreground colors
    pub fn ansi() -> Self {
        Self {
            red: foreground(Color::DarkRed),
            yellow: foreground(Color::DarkYellow),
            green: foreground(Color::DarkGreen),
            magenta: foreground(Color::DarkMagenta),
            reset: ansi_string(ResetColor),
        }
    }

    /// No escape sequences at all
    pub fn plain() -> Self {
        Self {
            red: String::new(),
            yellow: String::new(),
            green: String::new(),
            magenta: String::new(),
            reset: String::new(),
        }
    }

    /// Color for a log level value, if it has one
    pub fn level_color(&self, level: &str) -> Option<&str> {
        match level {
            "Error" | "Emergency" => Some(self.red.as_str()),
            "Warning" => Some(self.yellow.as_str()),
            "Info" => Some(self.green.as_str()),
            "Debug" => Some(self.magenta.as_str()),
            _ => None,
        }
    }

    /// Sequence that starts a highlighted match
    pub fn highlight_start(&self) -> &str {
        &self.red
    }

    /// Wrap text in a color and reset, or return it unchanged when the
    /// palette is disabled
    pub fn paint(&self, color: &str, text: &str) -> String {
        if color.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", color, text, self.reset)
        }
    }
}

fn foreground(color: Color) -> String {
    ansi_string(SetForegroundColor(color))
}

fn ansi_string(command: impl Command) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = command.write_ansi(&mut out);
    out
}
