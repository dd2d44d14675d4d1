//! Columns and the windows stacked inside them (spec.md §3 "Scroll engine nodes").

use crate::animation::{AlphaAnim, MoveAnim};
use crate::ids::{NodeId, WindowHandle};
use crate::rect::Rect;

/// A column's width is resolved from one of these presets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidthPreset {
    /// A proportion `(0, 1]` of the working area's width.
    Proportion(f64),
    /// An absolute pixel width.
    Fixed(f64),
    /// Sized to the tightest constraint among the column's windows.
    AutoFit,
}

/// The default preset ring columns cycle through with `toggle_column_width`.
pub const DEFAULT_WIDTH_PRESETS: &[WidthPreset] = &[
    WidthPreset::Proportion(1.0 / 3.0),
    WidthPreset::Proportion(0.5),
    WidthPreset::Proportion(2.0 / 3.0),
    WidthPreset::Proportion(1.0),
];

/// One window inside a column.
#[derive(Debug, Clone)]
pub struct ScrollWindowNode {
    pub id: NodeId,
    pub handle: WindowHandle,
    pub cached_frame: Option<Rect>,
    pub alpha_anim: Option<AlphaAnim>,
    pub move_anim: Option<MoveAnim>,
    pub is_fullscreen: bool,
}

impl ScrollWindowNode {
    pub fn new(handle: WindowHandle) -> Self {
        Self {
            id: NodeId::fresh(),
            handle,
            cached_frame: None,
            alpha_anim: None,
            move_anim: None,
            is_fullscreen: false,
        }
    }
}

/// An ordered stack of windows occupying one horizontal slot in the strip.
#[derive(Debug, Clone)]
pub struct Column {
    pub id: NodeId,
    pub windows: Vec<ScrollWindowNode>,
    pub is_tabbed: bool,
    pub active_tile_idx: usize,
    pub width_preset_cursor: usize,
    pub cached_width: f64,
    pub cached_frame: Option<Rect>,
    /// Set when `toggle_full_width` is active; remembers the prior cursor.
    pub full_width_previous_cursor: Option<usize>,
    /// An explicit proportion set by `balance_sizes`, overriding the preset
    /// ring until the next `cycle_width`/`toggle_full_width` call.
    pub width_override: Option<f64>,
}

impl Column {
    pub fn new(first_window: WindowHandle) -> Self {
        Self {
            id: NodeId::fresh(),
            windows: vec![ScrollWindowNode::new(first_window)],
            is_tabbed: false,
            active_tile_idx: 0,
            width_preset_cursor: 1, // 0.5 by default
            cached_width: 0.0,
            cached_frame: None,
            full_width_previous_cursor: None,
            width_override: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.windows.iter().any(|w| w.handle == handle)
    }

    pub fn index_of(&self, handle: WindowHandle) -> Option<usize> {
        self.windows.iter().position(|w| w.handle == handle)
    }

    pub fn width_preset(&self) -> WidthPreset {
        DEFAULT_WIDTH_PRESETS[self.width_preset_cursor % DEFAULT_WIDTH_PRESETS.len()]
    }

    /// Advances the preset cursor with wrap; `forwards=false` goes backward.
    pub fn cycle_width(&mut self, forwards: bool) {
        self.width_override = None;
        let len = DEFAULT_WIDTH_PRESETS.len();
        self.width_preset_cursor = if forwards {
            (self.width_preset_cursor + 1) % len
        } else {
            (self.width_preset_cursor + len - 1) % len
        };
    }

    pub fn toggle_full_width(&mut self) {
        self.width_override = None;
        match self.full_width_previous_cursor.take() {
            Some(previous) => self.width_preset_cursor = previous,
            None => {
                self.full_width_previous_cursor = Some(self.width_preset_cursor);
                self.width_preset_cursor = DEFAULT_WIDTH_PRESETS
                    .iter()
                    .position(|p| matches!(p, WidthPreset::Proportion(r) if (*r - 1.0).abs() < f64::EPSILON))
                    .unwrap_or(self.width_preset_cursor);
            }
        }
    }

    /// Resolves this column's width in pixels given the working area's width.
    pub fn resolve_width(&self, working_width: i32) -> f64 {
        if let Some(share) = self.width_override {
            return working_width as f64 * share;
        }
        match self.width_preset() {
            WidthPreset::Proportion(p) => working_width as f64 * p,
            WidthPreset::Fixed(px) => px,
            WidthPreset::AutoFit => self
                .windows
                .iter()
                .filter_map(|w| w.cached_frame.map(|r| r.width as f64))
                .fold(working_width as f64 * 0.5, f64::min),
        }
    }

    /// Per-window heights within the column's working height, stacking
    /// evenly and re-balancing after constraint clamps.
    pub fn row_heights(&self, working_height: i32, gap: i32) -> Vec<i32> {
        let n = self.windows.len().max(1) as i32;
        let available = (working_height - (n - 1) * gap).max(0);
        let base = available / n;
        let remainder = available - base * n;
        (0..n)
            .map(|i| if i < remainder { base + 1 } else { base })
            .collect()
    }
}
