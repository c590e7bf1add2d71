//! Transport widget - playback phase, position and progress

use crate::theme::Theme;
use pskope_playback::{Phase, PlaybackState};
use pskope_render::DynamicMode;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// One-line transport readout
pub struct TransportWidget<'a> {
    state: PlaybackState,
    mode: DynamicMode,
    has_media: bool,
    theme: &'a Theme,
}

impl<'a> TransportWidget<'a> {
    pub fn new(state: PlaybackState, theme: &'a Theme) -> Self {
        Self {
            state,
            mode: DynamicMode::default(),
            has_media: true,
            theme,
        }
    }

    pub fn mode(mut self, mode: DynamicMode) -> Self {
        self.mode = mode;
        self
    }

    /// Whether a playable media resource is loaded
    pub fn has_media(mut self, has_media: bool) -> Self {
        self.has_media = has_media;
        self
    }

    fn phase_span(&self) -> Span<'static> {
        let (icon, style) = match self.state.phase {
            Phase::Playing => ("▶", self.theme.highlight()),
            Phase::Paused => ("⏸", Style::default().fg(self.theme.warning)),
            Phase::Ended => ("■", self.theme.dim()),
            Phase::Loaded => ("■", self.theme.normal()),
            Phase::Idle => ("·", self.theme.dim()),
        };
        let label = if self.has_media {
            self.state.phase.display_name()
        } else {
            "NO MEDIA"
        };
        Span::styled(format!(" {icon} {label} "), style)
    }
}

/// `width` cells of progress bar for `progress` (0.0 - 1.0)
fn progress_bar(progress: Option<f64>, width: usize) -> (String, String) {
    let Some(progress) = progress else {
        return (String::new(), "─".repeat(width));
    };
    let filled = ((progress * width as f64).round() as usize).min(width);
    ("━".repeat(filled), "─".repeat(width - filled))
}

impl Widget for TransportWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let chunks = Layout::horizontal([
            Constraint::Length(13), // Phase
            Constraint::Length(18), // Position readout
            Constraint::Min(10),    // Progress bar
            Constraint::Length(10), // Dynamic mode
        ])
        .split(area);

        Paragraph::new(Line::from(self.phase_span())).render(chunks[0], buf);

        Paragraph::new(Line::from(Span::styled(
            self.state.readout(),
            self.theme.normal(),
        )))
        .render(chunks[1], buf);

        let bar_width = chunks[2].width.saturating_sub(2) as usize;
        let (done, rest) = progress_bar(self.state.progress(), bar_width);
        Paragraph::new(Line::from(vec![
            Span::raw(" "),
            Span::styled(done, self.theme.accent()),
            Span::styled(rest, self.theme.dim()),
        ]))
        .render(chunks[2], buf);

        let mode = match self.mode {
            DynamicMode::FocusContext => "[FOCUS]",
            DynamicMode::LiveTap => "[LIVE]",
        };
        Paragraph::new(Line::from(Span::styled(mode, self.theme.title()))).render(chunks[3], buf);
    }
}
