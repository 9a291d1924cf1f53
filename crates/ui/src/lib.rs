pub mod app;
pub mod render;
pub mod theme;
pub mod window;

pub use app::App;
pub use render::UnitRenderer;
pub use theme::Theme;
pub use window::{RenderUnit, RevealBatch, RevealOutcome, ScrollAdjustment, WindowController, WindowOptions, WindowState};
