//! pskope - PCM / polar / BPSK pipeline scope
//!
//! Uploads an audio file to the processing service, draws every pipeline
//! stage, and plays the modulated signal with a synchronized PSK view.

mod session;

use std::fs::{self, OpenOptions};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Terminal,
};
use tracing_subscriber::EnvFilter;

use pskope_client::Config;
use pskope_input::{Command, InputHandler};
use pskope_playback::default_output_rate;
use pskope_render::{stage_color, DYNAMIC_STAGE};
use pskope_signal::Stage;
use pskope_tui::{
    App, HeaderWidget, HelpWidget, StatusBarWidget, SurfaceWidget, Theme, TransportWidget,
};

use session::Session;

/// Frame rate for UI updates
const FPS: u64 = 30;

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pskope starting");

    let mut config = Config::load();

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = config.save() {
        tracing::warn!(error = %e, "failed to save config");
    }
    tracing::info!("pskope stopped");

    result
}

/// Log to `<data dir>/pskope/pskope.log`; the terminal belongs to the UI
fn init_tracing() -> anyhow::Result<()> {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pskope");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;

    let log_path = dir.join("pskope.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &mut Config,
) -> anyhow::Result<()> {
    let mut app = App::new(config);
    let mut input_handler = InputHandler::new();

    let output_rate = default_output_rate();
    if output_rate.is_none() {
        tracing::warn!("no audio output device, media will keep its own rate");
    }
    let mut session = Session::new(app.state.dynamic_mode, output_rate);
    session.check_health(&app.state.server_url);

    let frame_duration = Duration::from_millis(1000 / FPS);
    let mut last_frame = Instant::now();

    app.state
        .set_message("pskope | :open <file>, u to upload, ? for help");

    loop {
        if app.should_quit {
            break;
        }

        session.poll_upload(&mut app.state, config);
        session.poll_health(&mut app.state);
        session.tick();

        app.state.frame_count = app.state.frame_count.wrapping_add(1);

        terminal.draw(|frame| {
            render_ui(frame, &app, &session);
        })?;

        let timeout = frame_duration.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(cmd) = input_handler.handle_key(key) {
                        handle_command(&mut app, &mut session, cmd);
                    }
                    app.state.set_mode(input_handler.mode());
                    app.state.command_buffer = input_handler.command_buffer().to_string();
                }
            }
        }

        let elapsed = last_frame.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
        last_frame = Instant::now();
    }

    app.state.store(config);
    Ok(())
}

fn handle_command(app: &mut App, session: &mut Session, cmd: Command) {
    let state = &mut app.state;
    match cmd {
        Command::TogglePlay => session.toggle_play(state),
        Command::Stop => session.stop(state),
        Command::Seek(delta) => session.seek_by(state, delta),

        Command::Upload(path) => session.start_upload(state, path),
        Command::OpenFile(path) => session.open_file(state, path),
        Command::Save(path) => session.save(state, path),

        Command::CycleBitDepth => state.cycle_bit_depth(),
        Command::CycleSampleRate => state.cycle_sample_rate(),
        Command::SetBitDepth(bits) => state.set_bit_depth(bits),
        Command::SetSampleRate(hz) => state.set_sample_rate(hz),
        Command::SetServer(url) => {
            state.set_server(&url);
            session.check_health(&state.server_url);
        }

        Command::ToggleDynamicMode => {
            let mode = state.dynamic_mode.toggle();
            session.set_dynamic_mode(state, mode);
        }
        Command::SetTheme(name) => state.set_theme(&name),
        Command::ToggleHelp => state.toggle_help(),

        Command::EnterCommandMode | Command::EnterNormalMode => {}
        Command::ExecuteCommand(line) => {
            state.set_error(format!("Unknown command: {line}"));
        }
        Command::Cancel => state.clear_message(),
        Command::Quit => app.quit(),
    }
}

fn render_ui(frame: &mut ratatui::Frame, app: &App, session: &Session) {
    let area = frame.area();
    let theme = &app.state.theme;
    let view = &session.view;
    let playback = view.playback();

    let block = ratatui::widgets::Block::default().style(theme.normal());
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(1),      // Title
        Constraint::Length(1),      // File / settings
        Constraint::Min(12),        // Stage grid
        Constraint::Percentage(22), // Dynamic surface
        Constraint::Length(1),      // Transport
        Constraint::Length(1),      // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], theme);
    frame.render_widget(HeaderWidget::new(&app.state), chunks[1]);

    // Six stages, two per row, in pipeline order
    let rows = Layout::vertical([Constraint::Ratio(1, 3); 3]).split(chunks[2]);
    for (row, pair) in rows.iter().zip(Stage::ALL.chunks(2)) {
        let cells = Layout::horizontal([Constraint::Percentage(50); 2]).split(*row);
        for (cell, &stage) in cells.iter().zip(pair) {
            let widget = SurfaceWidget::new(view.stage_surface(stage), theme)
                .title(stage.title())
                .title_color(stage_color(stage));
            frame.render_widget(widget, *cell);
        }
    }

    let dynamic_title = format!("{} · {}", DYNAMIC_STAGE.title(), view.dynamic_mode());
    let dynamic = SurfaceWidget::new(view.dynamic_surface(), theme)
        .title(&dynamic_title)
        .title_color(stage_color(DYNAMIC_STAGE))
        .active(playback.is_playing());
    frame.render_widget(dynamic, chunks[3]);

    let transport = TransportWidget::new(playback, theme)
        .mode(view.dynamic_mode())
        .has_media(session.has_media());
    frame.render_widget(transport, chunks[4]);

    let status = StatusBarWidget::new(app.state.mode, &app.state.command_buffer, theme)
        .message(app.state.message.as_deref(), app.state.message_type);
    frame.render_widget(status, chunks[5]);

    if app.state.show_help {
        let help_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, help_area);
        frame.render_widget(HelpWidget::new(theme), help_area);
    }
}

fn render_title(frame: &mut ratatui::Frame, area: Rect, theme: &Theme) {
    let title_text = " pskope - PCM / Polar / BPSK ";
    let width = area.width as usize;
    let len = title_text.chars().count();
    let padding = width.saturating_sub(len) / 2;
    let padded = format!(
        "{:═<pad$}{}{:═<rest$}",
        "",
        title_text,
        "",
        pad = padding,
        rest = width.saturating_sub(padding + len)
    );

    let line = Line::from(Span::styled(padded, theme.title()));
    frame.render_widget(Paragraph::new(line), area);
}

/// Create a centered rectangle
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
