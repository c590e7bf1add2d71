//! Color themes for pskope

use crate::app::MessageType;
use pskope_render::Rgba;
use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    /// Primary foreground color (text, borders)
    pub fg: Color,
    /// Dimmed foreground (secondary text)
    pub fg_dim: Color,
    pub bg: Color,
    /// Selected items, active elements
    pub highlight: Color,
    /// Playhead, progress bar
    pub accent: Color,
    pub warning: Color,
    pub danger: Color,
    /// Draw stage traces in their own palette colors
    pub stage_colors: bool,
}

impl Theme {
    /// Get style for normal text
    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Get style for dimmed text
    pub fn dim(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.bg)
    }

    /// Get style for highlighted/selected items
    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    pub fn border_active(&self) -> Style {
        Style::default().fg(self.highlight)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Status line style for a message of `kind`
    pub fn message(&self, kind: MessageType) -> Style {
        match kind {
            MessageType::Info => self.dim(),
            MessageType::Success => Style::default().fg(self.accent),
            MessageType::Warning => Style::default().fg(self.warning),
            MessageType::Error => Style::default().fg(self.danger),
        }
    }

    /// Terminal color for a surface pixel
    ///
    /// Monochrome themes map every trace to their foreground, scaled by the
    /// pixel's alpha so the dim context trace stays dim.
    pub fn trace_color(&self, pixel: Rgba) -> Color {
        if self.stage_colors {
            return Color::Rgb(pixel.r, pixel.g, pixel.b);
        }
        let Color::Rgb(r, g, b) = self.fg else {
            return self.fg;
        };
        let scale = |c: u8| ((c as u16 * pixel.a as u16) / 255) as u8;
        if pixel.a == 255 {
            Color::Rgb(r, g, b)
        } else {
            Color::Rgb(scale(r), scale(g), scale(b))
        }
    }
}

/// Dark slate theme with the stage palette
pub const SLATE: Theme = Theme {
    name: "slate",
    fg: Color::Rgb(236, 240, 241),        // #ecf0f1
    fg_dim: Color::Rgb(127, 140, 141),    // #7f8c8d
    bg: Color::Rgb(20, 26, 31),
    highlight: Color::Rgb(142, 68, 173),  // #8e44ad
    accent: Color::Rgb(241, 196, 15),     // #f1c40f - playhead
    warning: Color::Rgb(230, 126, 34),
    danger: Color::Rgb(231, 76, 60),
    stage_colors: true,
};

/// Classic phosphor green CRT theme
pub const PHOSPHOR: Theme = Theme {
    name: "phosphor-green",
    fg: Color::Rgb(51, 255, 51),
    fg_dim: Color::Rgb(25, 128, 25),
    bg: Color::Rgb(0, 10, 0),
    highlight: Color::Rgb(180, 255, 180),
    accent: Color::Rgb(100, 255, 100),
    warning: Color::Rgb(255, 255, 100),
    danger: Color::Rgb(255, 100, 100),
    stage_colors: false,
};

/// Amber CRT theme (1980s monochrome)
pub const AMBER: Theme = Theme {
    name: "amber",
    fg: Color::Rgb(255, 176, 0),
    fg_dim: Color::Rgb(128, 88, 0),
    bg: Color::Rgb(10, 5, 0),
    highlight: Color::Rgb(255, 220, 128),
    accent: Color::Rgb(255, 200, 64),
    warning: Color::Rgb(255, 255, 100),
    danger: Color::Rgb(255, 100, 100),
    stage_colors: false,
};

/// Neon theme, keeps the stage palette
pub const CYBERPUNK: Theme = Theme {
    name: "cyberpunk",
    fg: Color::Rgb(0, 255, 255),
    fg_dim: Color::Rgb(0, 128, 128),
    bg: Color::Rgb(5, 0, 10),
    highlight: Color::Rgb(255, 0, 255),
    accent: Color::Rgb(0, 255, 128),
    warning: Color::Rgb(255, 255, 0),
    danger: Color::Rgb(255, 50, 50),
    stage_colors: true,
};

impl Theme {
    /// Look a theme up by name or alias
    pub fn by_name(name: &str) -> Option<Theme> {
        match name.to_lowercase().as_str() {
            "slate" | "default" | "dark" => Some(SLATE),
            "green" | "phosphor" | "phosphor-green" => Some(PHOSPHOR),
            "amber" | "orange" => Some(AMBER),
            "cyber" | "cyberpunk" | "neon" => Some(CYBERPUNK),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        SLATE
    }
}
