//! Turns retained render units into terminal lines.
//!
//! One unit renders to one or more rows; the row count is the unit's extent,
//! published back to the window controller after each layout pass.

use crate::theme::Theme;
use crate::window::RenderUnit;
use chrono::NaiveDate;
use palaver_core::Entry;
use ratatui::layout::Alignment;
use ratatui::text::{Line, Span};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

pub struct UnitRenderer<'a> {
    theme: &'a Theme,
    /// Directory holding the transcript and its media files
    media_root: &'a Path,
    width: usize,
}

impl<'a> UnitRenderer<'a> {
    pub fn new(theme: &'a Theme, media_root: &'a Path, width: usize) -> Self {
        Self { theme, media_root, width: width.max(8) }
    }

    /// Render one unit; the returned line count is its extent.
    pub fn render_unit(&self, unit: &RenderUnit) -> Vec<Line<'static>> {
        match unit {
            RenderUnit::DateBoundary(date) => self.render_boundary(*date),
            RenderUnit::Message { entry, is_local } => self.render_message(entry, *is_local),
        }
    }

    fn render_boundary(&self, date: NaiveDate) -> Vec<Line<'static>> {
        let label = format!(" {} ", date.format("%A, %d %B %Y"));
        let flank = self.width.saturating_sub(label.width()) / 2;
        let rule = "─".repeat(flank);
        vec![Line::from(Span::styled(format!("{rule}{label}{rule}"), self.theme.boundary()))]
    }

    fn render_message(&self, entry: &Entry, is_local: bool) -> Vec<Line<'static>> {
        let alignment = if is_local { Alignment::Right } else { Alignment::Left };
        let meta_style = if is_local { self.theme.meta_local() } else { self.theme.meta() };

        let meta = format!("{} • {}", entry.sender, entry.timestamp.format("%H:%M"));
        let mut lines = vec![Line::from(Span::styled(meta, meta_style)).alignment(alignment)];

        // A message whose attachment file is present renders as an attachment
        // line; an absent file falls back to the body as plain text, marker
        // included.
        if let Some(media) = entry.media_reference()
            && self.media_root.join(&media.file_name).is_file()
        {
            let label = format!("⎙ {} · {}", media.file_name, media.kind().as_str());
            lines.push(Line::from(Span::styled(label, self.theme.attachment())).alignment(alignment));
            return lines;
        }

        for source_line in entry.body.lines() {
            if source_line.is_empty() {
                lines.push(Line::default());
                continue;
            }
            for wrapped in textwrap::wrap(source_line, self.width) {
                lines.push(Line::from(Span::styled(wrapped.into_owned(), self.theme.body())).alignment(alignment));
            }
        }

        lines
    }
}
