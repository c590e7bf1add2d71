//! Surface widget - blits a pixel surface into braille cells

use crate::theme::Theme;
use pskope_render::{DrawSurface, PixelSurface, Rgba};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Span,
    widgets::{Block, Borders, Widget},
};

/// Braille dot bit for column `dx` (0-1) and row `dy` (0-3) of a cell
const BRAILLE_DOTS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

const BRAILLE_BASE: u32 = 0x2800;

/// Renders a [`PixelSurface`] scaled to the widget area
///
/// Each terminal cell covers a 2x4 grid of braille dots. A dot is lit when
/// any pixel mapped onto it is painted; the cell takes the color of its most
/// opaque pixel. Text runs are laid out at their proportional position.
pub struct SurfaceWidget<'a> {
    surface: &'a PixelSurface,
    theme: &'a Theme,
    title: Option<&'a str>,
    title_color: Option<Rgba>,
    border: bool,
    active: bool,
}

impl<'a> SurfaceWidget<'a> {
    pub fn new(surface: &'a PixelSurface, theme: &'a Theme) -> Self {
        Self {
            surface,
            theme,
            title: None,
            title_color: None,
            border: true,
            active: false,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn title_color(mut self, color: Rgba) -> Self {
        self.title_color = Some(color);
        self
    }

    pub fn border(mut self, border: bool) -> Self {
        self.border = border;
        self
    }

    /// Highlight the border (playback running on this surface)
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    fn block(&self) -> Block<'a> {
        let border_style = if self.active {
            self.theme.border_active()
        } else {
            self.theme.border()
        };
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style);

        if let Some(title) = self.title {
            let style = match self.title_color {
                Some(color) if self.theme.stage_colors => {
                    Style::default().fg(Color::Rgb(color.r, color.g, color.b))
                }
                _ => self.theme.title(),
            };
            block = block.title(Span::styled(format!(" {title} "), style));
        }
        block
    }

    fn render_dots(&self, area: Rect, buf: &mut Buffer) {
        let cols = area.width as usize;
        let rows = area.height as usize;
        let sw = self.surface.width() as usize;
        let sh = self.surface.height() as usize;
        if cols == 0 || rows == 0 || sw == 0 || sh == 0 {
            return;
        }

        let dots_x = cols * 2;
        let dots_y = rows * 4;
        let mut bits = vec![0u8; cols * rows];
        let mut colors: Vec<Option<Rgba>> = vec![None; cols * rows];

        for (i, pixel) in self.surface.pixels().iter().enumerate() {
            if pixel.is_transparent() {
                continue;
            }
            let dot_x = (i % sw) * dots_x / sw;
            let dot_y = (i / sw) * dots_y / sh;
            let cell = (dot_y / 4) * cols + dot_x / 2;

            bits[cell] |= BRAILLE_DOTS[dot_x % 2][dot_y % 4];
            if colors[cell].map_or(true, |c| pixel.a > c.a) {
                colors[cell] = Some(*pixel);
            }
        }

        for (cell, &mask) in bits.iter().enumerate() {
            if mask == 0 {
                continue;
            }
            let Some(ch) = char::from_u32(BRAILLE_BASE + mask as u32) else {
                continue;
            };
            let x = area.x + (cell % cols) as u16;
            let y = area.y + (cell / cols) as u16;
            let fg = colors[cell]
                .map(|c| self.theme.trace_color(c))
                .unwrap_or(self.theme.fg);
            buf[(x, y)].set_char(ch).set_fg(fg);
        }
    }

    fn render_text(&self, area: Rect, buf: &mut Buffer) {
        let sw = self.surface.width() as f32;
        let sh = self.surface.height() as f32;

        for run in self.surface.text_runs() {
            let col = ((run.x / sw) * area.width as f32).floor().max(0.0) as u16;
            let row = ((run.y / sh) * area.height as f32).floor().max(0.0) as u16;
            if col >= area.width || row >= area.height {
                continue;
            }
            let fg = if self.theme.stage_colors {
                Color::Rgb(run.color.r, run.color.g, run.color.b)
            } else {
                self.theme.fg
            };
            buf.set_stringn(
                area.x + col,
                area.y + row,
                &run.text,
                (area.width - col) as usize,
                Style::default().fg(fg),
            );
        }
    }
}

impl Widget for SurfaceWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if self.border {
            let block = self.block();
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        self.render_dots(inner, buf);
        self.render_text(inner, buf);
    }
}
