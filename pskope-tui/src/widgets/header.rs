//! Header widget - file, processing settings and service address

use crate::app::{AppState, UploadStatus};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

pub struct HeaderWidget<'a> {
    state: &'a AppState,
}

impl<'a> HeaderWidget<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }
}

impl Widget for HeaderWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }
        let theme = &self.state.theme;

        let file = self
            .state
            .current_file_name()
            .unwrap_or_else(|| "no file (:open <path>)".to_string());

        let mut spans = vec![
            Span::styled(" FILE ", theme.dim()),
            Span::styled(file, theme.normal()),
            Span::styled("  │ ", theme.border()),
            Span::styled(self.state.settings.bit_depth.to_string(), theme.accent()),
            Span::styled(" │ ", theme.border()),
            Span::styled(self.state.settings.sample_rate.to_string(), theme.accent()),
            Span::styled(" │ ", theme.border()),
            Span::styled(self.state.server_url.as_str(), theme.dim()),
        ];

        if let Some(label) = &self.state.results_label {
            spans.push(Span::styled("  │ shown: ", theme.border()));
            spans.push(Span::styled(label.as_str(), theme.normal()));
            if let (Some(original), Some(processed)) = self.state.reported_rates {
                spans.push(Span::styled(
                    format!(" ({original} → {processed} Hz)"),
                    theme.dim(),
                ));
            }
        }

        match &self.state.upload {
            UploadStatus::Idle => {}
            UploadStatus::Uploading { file } => {
                spans.push(Span::styled("  │ ", theme.border()));
                spans.push(Span::styled(format!("uploading {file}..."), theme.title()));
            }
            UploadStatus::Downloading => {
                spans.push(Span::styled("  │ ", theme.border()));
                spans.push(Span::styled("fetching audio...", theme.title()));
            }
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
