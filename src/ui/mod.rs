//! Terminal UI rendering using ratatui.
//!
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`parameters`]: Parameter table with status, statistics and a chart of the selection
//! - [`link`]: RS422 throughput and message validation gauges
//! - [`controls`]: Control switches and the LED panel
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (parameters/link/controls::render)   │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Help overlay rendered on top (common::render_help)
//! ```

pub mod common;
pub mod controls;
pub mod link;
pub mod parameters;
pub mod theme;

pub use theme::Theme;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the last `width` sparkline levels as block characters.
pub(crate) fn render_sparkline(levels: &[u8], width: usize) -> String {
    if levels.is_empty() {
        return " ".repeat(width);
    }
    let skip = levels.len().saturating_sub(width);
    levels[skip..]
        .iter()
        .map(|&v| SPARKLINE_CHARS[v.min(7) as usize])
        .collect()
}
