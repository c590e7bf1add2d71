//! Status bar widget - mode indicator and command line

use crate::app::MessageType;
use crate::theme::Theme;
use pskope_input::Mode;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Widget for displaying the status bar with mode and command input
pub struct StatusBarWidget<'a> {
    mode: Mode,
    command_buffer: &'a str,
    message: Option<&'a str>,
    message_type: MessageType,
    theme: &'a Theme,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(mode: Mode, command_buffer: &'a str, theme: &'a Theme) -> Self {
        Self {
            mode,
            command_buffer,
            message: None,
            message_type: MessageType::Info,
            theme,
        }
    }

    pub fn message(mut self, msg: Option<&'a str>, msg_type: MessageType) -> Self {
        self.message = msg;
        self.message_type = msg_type;
        self
    }

    fn mode_style(&self) -> Style {
        match self.mode {
            Mode::Normal | Mode::Help => self.theme.highlight(),
            Mode::Command => self.theme.accent(),
        }
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let chunks = Layout::horizontal([
            Constraint::Length(10), // Mode indicator
            Constraint::Min(20),    // Command/message area
            Constraint::Length(24), // Help hint
        ])
        .split(area);

        let mode_line = Line::from(vec![
            Span::raw("["),
            Span::styled(self.mode.display_name(), self.mode_style()),
            Span::raw("]"),
        ]);
        Paragraph::new(mode_line).render(chunks[0], buf);

        let content = if self.mode == Mode::Command {
            Line::from(vec![
                Span::styled(":", self.theme.accent()),
                Span::styled(self.command_buffer, self.theme.normal()),
                Span::styled("█", self.theme.highlight()),
            ])
        } else if let Some(msg) = self.message {
            Line::from(Span::styled(msg, self.theme.message(self.message_type)))
        } else {
            Line::from(Span::styled(
                "Ready. :open <file> then u to upload",
                self.theme.dim(),
            ))
        };
        Paragraph::new(content).render(chunks[1], buf);

        let help = match self.mode {
            Mode::Normal => "space:play  u:up  ?:help",
            Mode::Command => "Enter:run  Esc:cancel",
            Mode::Help => "Esc:close help",
        };
        Paragraph::new(Line::from(Span::styled(help, self.theme.dim()))).render(chunks[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::SLATE;

    fn row(buf: &Buffer, width: u16) -> String {
        (0..width).map(|x| buf[(x, 0)].symbol().to_string()).collect()
    }

    #[test]
    fn test_command_mode_shows_buffer() {
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new(Mode::Command, "bits 16", &SLATE).render(area, &mut buf);

        let line = row(&buf, area.width);
        assert!(line.contains("[COMMAND]"));
        assert!(line.contains(":bits 16"));
    }

    #[test]
    fn test_error_message_styled() {
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new(Mode::Normal, "", &SLATE)
            .message(Some("server error 500"), MessageType::Error)
            .render(area, &mut buf);

        assert!(row(&buf, area.width).contains("server error 500"));
        assert_eq!(buf[(10, 0)].fg, SLATE.danger);
    }
}
