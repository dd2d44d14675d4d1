//! Monitor descriptors (spec.md §3 "Monitor").

use crate::ids::MonitorId;
use crate::rect::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A physical display, reported by the window service and kept up to date
/// by `reconcile_after_monitor_change` on display-link changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Monitor {
    pub id: MonitorId,
    /// The OS's own display identifier; not process-lifetime stable across
    /// reconnects the way `id` is, so `id` is what the rest of the model
    /// references.
    pub display_id: u64,
    pub name: String,
    pub frame: Rect,
    pub visible_frame: Rect,
    pub orientation: Orientation,
    pub refresh_rate_hz: f64,
}

impl Monitor {
    pub fn new(display_id: u64, name: impl Into<String>, frame: Rect, visible_frame: Rect) -> Self {
        Self {
            id: MonitorId::fresh(),
            display_id,
            name: name.into(),
            frame,
            visible_frame,
            orientation: Orientation::Horizontal,
            refresh_rate_hz: 60.0,
        }
    }

    /// The working frame: `visible_frame` inset by the per-edge outer struts.
    pub fn working_frame(&self, outer: (i32, i32, i32, i32)) -> Rect {
        self.visible_frame.inset(outer.0, outer.1, outer.2, outer.3)
    }
}
