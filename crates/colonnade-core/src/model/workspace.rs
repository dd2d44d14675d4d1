//! Workspace descriptors and per-workspace viewport state (spec.md §3).

use crate::animation::OffsetAnim;
use crate::ids::{MonitorId, NodeId, WorkspaceId};

/// Which engine owns a workspace's layout tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    #[default]
    Scroll,
    Binary,
}

/// `{ id, name, monitor_id?, layout_kind }` from spec.md §3.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceDescriptor {
    pub id: WorkspaceId,
    /// A small string used for hotkey addressing, typically a decimal index.
    pub name: String,
    pub monitor_id: Option<MonitorId>,
    pub layout_kind: LayoutKind,
}

impl WorkspaceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorkspaceId::fresh(),
            name: name.into(),
            monitor_id: None,
            layout_kind: LayoutKind::default(),
        }
    }
}

/// Per-workspace viewport state (spec.md §3 "Viewport state").
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    pub selected_node_id: Option<NodeId>,
    pub view_offset_px: OffsetAnim,
    pub active_column_index: usize,
    /// The view offset captured just before a column was created, so the
    /// viewport can animate back to it once that column disappears again
    /// while still single-window (spec.md §4.3 "Deletion and fallback").
    /// Staged by `Orchestrator::add_to_layout_engine` and consumed by
    /// `remove_from_layout_engine`/`run_scroll_pipeline`; spec.md §9's open
    /// question on restoration scope is resolved in DESIGN.md.
    pub activate_prev_on_removal: Option<f64>,
    pub display_refresh_rate_hz: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            selected_node_id: None,
            view_offset_px: OffsetAnim::static_at(0.0),
            active_column_index: 0,
            activate_prev_on_removal: None,
            display_refresh_rate_hz: 60.0,
        }
    }
}
