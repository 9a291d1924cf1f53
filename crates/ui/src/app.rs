//! Interactive transcript viewer.
//!
//! The app owns the terminal event loop and plays the rendering collaborator
//! role: it records scroll extents before a reveal, lets the window
//! controller compute intent, re-runs layout, publishes the new extents, and
//! only then applies the controller's scroll adjustments.

use crate::render::UnitRenderer;
use crate::theme::Theme;
use crate::window::{RevealOutcome, ScrollAdjustment, WindowController, WindowOptions};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use palaver_store::EntryStore;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Layout};
use ratatui::text::{Line, Text};
use ratatui::widgets::Paragraph;
use std::io::Result;
use std::panic;
use std::path::PathBuf;
use std::time::Duration;

pub struct App {
    store: EntryStore,
    controller: WindowController,
    theme: Theme,
    media_root: PathBuf,
    /// Flattened rows of every retained unit plus inter-unit spacing
    lines: Vec<Line<'static>>,
    /// Scroll offset in rows from the top of the retained content
    offset: u64,
    content_width: u16,
    content_height: u16,
    status: String,
    should_exit: bool,
}

impl App {
    pub fn new(store: EntryStore, options: WindowOptions, media_root: PathBuf) -> Self {
        Self {
            store,
            controller: WindowController::new(options),
            theme: Theme::default(),
            media_root,
            lines: Vec::new(),
            offset: 0,
            content_width: 80,
            content_height: 24,
            status: String::new(),
            should_exit: false,
        }
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn controller(&self) -> &WindowController {
        &self.controller
    }

    /// Total rendered rows of the retained window
    fn total_rows(&self) -> u64 {
        self.lines.len() as u64
    }

    /// Maximum scroll offset given the current viewport
    fn max_scroll(&self) -> u64 {
        self.total_rows().saturating_sub(self.content_height as u64)
    }

    /// Re-render every retained unit at the current width and publish the
    /// resulting extents back to the controller. This is the layout-settle
    /// step; eviction extents of future reveals come from what is published
    /// here.
    fn reflow(&mut self) {
        let spacing = self.controller.options().unit_spacing;
        let renderer = UnitRenderer::new(&self.theme, &self.media_root, self.content_width as usize);

        let mut extents: Vec<u64> = Vec::with_capacity(self.controller.unit_count());
        let mut lines: Vec<Line<'static>> = Vec::new();
        for unit in self.controller.units() {
            let unit_lines = renderer.render_unit(unit);
            extents.push(unit_lines.len() as u64);
            lines.extend(unit_lines);
            for _ in 0..spacing {
                lines.push(Line::default());
            }
        }

        self.lines = lines;
        self.controller.settle_layout(&extents);
    }

    /// Reveal the next batch and correct the scroll position so the visual
    /// anchor does not jump: relative preservation for growth, exact shift
    /// for the pruned extent.
    pub fn load_more(&mut self) {
        let old_max = self.max_scroll();

        match self.controller.request_more(&self.store) {
            RevealOutcome::Revealed(batch) => {
                self.reflow();
                let new_max = self.max_scroll();

                self.offset = ScrollAdjustment::PreserveRelative { old_max, new_max }.apply(self.offset);
                if let Some(prune) = batch.prune {
                    self.offset = prune.apply(self.offset);
                }
                self.offset = self.offset.min(self.max_scroll());

                self.status = format!(
                    "{}/{} messages revealed • j/k scroll • m load more • q quit",
                    self.controller.revealed_count(),
                    self.store.total()
                );
            }
            RevealOutcome::NoMore => {
                self.status = "no more messages • j/k scroll • q quit".to_string();
            }
        }
    }

    fn scroll_by(&mut self, delta: i64) {
        self.offset = ScrollAdjustment::ShiftBy { delta }.apply(self.offset).min(self.max_scroll());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_exit = true,
            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1),
            KeyCode::PageDown => self.scroll_by(self.content_height as i64),
            KeyCode::PageUp => self.scroll_by(-(self.content_height as i64)),
            KeyCode::Char('g') | KeyCode::Home => self.offset = 0,
            KeyCode::Char('G') | KeyCode::End => self.offset = self.max_scroll(),
            KeyCode::Char('m') | KeyCode::Char(' ') | KeyCode::Enter => self.load_more(),
            _ => {}
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.content_width = width;
        self.content_height = height.saturating_sub(1);
        self.reflow();
        self.offset = self.offset.min(self.max_scroll());
    }

    pub fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        <B as Backend>::Error: std::error::Error + Send + Sync + 'static,
    {
        terminal.draw(|frame| {
            let [content, status] =
                Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

            if self.content_width != content.width || self.content_height != content.height {
                self.content_width = content.width;
                self.content_height = content.height;
                self.reflow();
                self.offset = self.offset.min(self.total_rows().saturating_sub(content.height as u64));
            }

            let scroll = self.offset.min(u16::MAX as u64) as u16;
            let body = Paragraph::new(Text::from(self.lines.clone())).style(self.theme.body()).scroll((scroll, 0));
            frame.render_widget(body, content);

            let bar = Paragraph::new(self.status.as_str()).style(self.theme.status());
            frame.render_widget(bar, status);
        })
        .map_err(std::io::Error::other)?;
        Ok(())
    }

    /// Run the interactive viewer until the user quits.
    pub fn run(&mut self) -> Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;

        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = crossterm::terminal::disable_raw_mode();
            let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        let backend = CrosstermBackend::new(std::io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Initial batch, so the viewer opens with content.
        self.load_more();
        self.draw(&mut terminal)?;

        while !self.should_exit {
            if crossterm::event::poll(Duration::from_millis(100))? {
                match crossterm::event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(width, height) => self.resize(width, height),
                    _ => {}
                }
                self.draw(&mut terminal)?;
            }
        }

        terminal.show_cursor()?;
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;

        Ok(())
    }
}
