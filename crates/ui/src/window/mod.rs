mod reveal;
mod scroll;

pub use reveal::{RevealBatch, RevealOutcome};
pub use scroll::ScrollAdjustment;

use chrono::NaiveDate;
use palaver_core::Entry;
use std::collections::VecDeque;

/// A unit handed to the rendering layer.
///
/// Date boundaries are derived units inserted between messages whenever the
/// calendar date changes; they are not entries and never count against the
/// revealed cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderUnit {
    DateBoundary(NaiveDate),
    Message { entry: Entry, is_local: bool },
}

impl RenderUnit {
    pub fn is_message(&self) -> bool {
        matches!(self, RenderUnit::Message { .. })
    }
}

/// Controller state: reveals are synchronous, so there is no observable
/// loading phase between these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowState {
    #[default]
    Idle,
    /// Terminal: every entry has been revealed and a further request was made
    Exhausted,
}

/// Construction-time options for the window controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOptions {
    /// Entries revealed per request (default 50)
    pub batch_size: usize,
    /// Maximum retained rendered units (default 200)
    pub visible_cap: usize,
    /// Rendered extent between adjacent units, counted in prune offsets
    pub unit_spacing: u64,
    /// Sender name rendered as the local participant
    pub local_participant: Option<String>,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self { batch_size: 50, visible_cap: 200, unit_spacing: 1, local_participant: None }
    }
}

struct Retained {
    unit: RenderUnit,
    /// Rendered extent published by the consumer's last layout pass; zero
    /// until the unit has been laid out at least once
    extent: u64,
}

/// Governs how many entries are revealed, how many rendered units are
/// retained, and what scroll correction the consumer must apply after each
/// reveal or eviction.
///
/// The controller computes intent synchronously; extents arrive later via
/// [`WindowController::settle_layout`] once the rendering collaborator's
/// layout pass has run. Exactly one caller issues requests at a time.
pub struct WindowController {
    options: WindowOptions,
    state: WindowState,
    revealed_count: usize,
    last_boundary: Option<NaiveDate>,
    retained: VecDeque<Retained>,
}

impl WindowController {
    pub fn new(options: WindowOptions) -> Self {
        Self {
            options,
            state: WindowState::default(),
            revealed_count: 0,
            last_boundary: None,
            retained: VecDeque::new(),
        }
    }

    /// Entries released to the consumer so far; non-decreasing
    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == WindowState::Exhausted
    }

    /// Retained rendered units, oldest first
    pub fn units(&self) -> impl Iterator<Item = &RenderUnit> {
        self.retained.iter().map(|r| &r.unit)
    }

    /// Count of retained rendered units (entries plus boundary markers)
    pub fn unit_count(&self) -> usize {
        self.retained.len()
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }
}

impl Default for WindowController {
    fn default() -> Self {
        Self::new(WindowOptions::default())
    }
}
