//! Help overlay

use crate::theme::Theme;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

const HELP_WIDTH: u16 = 60;

const HELP_LINES: &[&str] = &[
    "╔══════════════════════════════════════════════════════════╗",
    "║            pskope - PCM / Polar / BPSK scope             ║",
    "╠══════════════════════════════════════════════════════════╣",
    "║ PLAYBACK                                                 ║",
    "║   space         Play / pause the modulated signal        ║",
    "║   s             Stop and rewind                          ║",
    "║   ← / h         Seek back 5 s                            ║",
    "║   → / l         Seek forward 5 s                         ║",
    "╠──────────────────────────────────────────────────────────╣",
    "║ PROCESSING                                               ║",
    "║   u             Upload the current file                  ║",
    "║   b             Cycle bit depth (8 / 16)                 ║",
    "║   r             Cycle sample rate (44.1 / 48 / 96 kHz)   ║",
    "╠──────────────────────────────────────────────────────────╣",
    "║ VIEW                                                     ║",
    "║   v             Focus window / live tap on PSK surface   ║",
    "╠──────────────────────────────────────────────────────────╣",
    "║ COMMANDS (:)                                             ║",
    "║   :open <path>        Select a .wav .mp3 .flac .ogg file ║",
    "║   :upload [path]      Upload (optionally a new file)     ║",
    "║   :save [path]        Write the modulated signal (WAV)   ║",
    "║   :bits <8|16>        Set bit depth                      ║",
    "║   :rate <hz>          44100 / 48000 / 96000              ║",
    "║   :server <url>       Processing service address         ║",
    "║   :theme <name>       slate / green / amber / cyber      ║",
    "║   :mode               Toggle dynamic surface mode        ║",
    "║   :q                  Quit                               ║",
    "╠══════════════════════════════════════════════════════════╣",
    "║        Esc or ? to close help, Ctrl-Q to quit            ║",
    "╚══════════════════════════════════════════════════════════╝",
];

/// Help overlay widget
pub struct HelpWidget<'a> {
    theme: &'a Theme,
}

impl<'a> HelpWidget<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    fn is_frame(ch: char) -> bool {
        matches!(ch, '║' | '╔' | '╗' | '╚' | '╝' | '═' | '╠' | '╣' | '─')
    }
}

impl Widget for HelpWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                buf[(x, y)].set_char(' ').set_style(self.theme.normal());
            }
        }

        let start_x = area.x + area.width.saturating_sub(HELP_WIDTH) / 2;

        for (i, line) in HELP_LINES.iter().take(area.height as usize).enumerate() {
            let y = area.y + i as u16;
            for (j, ch) in line.chars().enumerate() {
                let x = start_x + j as u16;
                if x >= area.right() {
                    break;
                }
                let style = if Self::is_frame(ch) {
                    self.theme.border()
                } else {
                    self.theme.normal()
                };
                buf[(x, y)].set_char(ch).set_style(style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::SLATE;

    #[test]
    fn test_lines_share_width() {
        for line in HELP_LINES {
            assert_eq!(line.chars().count(), HELP_WIDTH as usize, "{line}");
        }
    }

    #[test]
    fn test_render_clipped() {
        let area = Rect::new(0, 0, 30, 5);
        let mut buf = Buffer::empty(area);
        HelpWidget::new(&SLATE).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "╔");
        assert_eq!(buf[(0, 4)].symbol(), "║");
    }
}
