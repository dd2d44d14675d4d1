//! Window entries (spec.md §3 "WindowEntry").

use serde::{Deserialize, Serialize};

use crate::ids::{ExternalWindowId, WindowHandle, WorkspaceId};

/// An opaque ticket the window service hands back for a window, used for
/// subsequent frame/title/alpha reads and writes. The core never interprets
/// its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxRef(pub u64);

/// Why a window is laid out the way it currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutReason {
    #[default]
    Standard,
    /// The owning app was hidden (`app_hidden` event); excluded from layout
    /// tree membership until `app_unhidden` restores it.
    AppHidden,
}

/// `{ min_size, max_size? }` cached from the window service's
/// `size_constraints` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeConstraints {
    pub min_size: (i32, i32),
    pub max_size: Option<(i32, i32)>,
}

/// `{ handle, window_id, workspace_id, ax_ref, layout_reason, cached_constraints? }`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEntry {
    pub handle: WindowHandle,
    pub window_id: ExternalWindowId,
    pub workspace_id: WorkspaceId,
    pub ax_ref: AxRef,
    pub layout_reason: LayoutReason,
    pub cached_constraints: Option<SizeConstraints>,
}

impl WindowEntry {
    pub fn new(ax_ref: AxRef, handle: WindowHandle, workspace_id: WorkspaceId) -> Self {
        Self {
            handle,
            window_id: handle.window_id,
            workspace_id,
            ax_ref,
            layout_reason: LayoutReason::Standard,
            cached_constraints: None,
        }
    }

    pub fn is_standard(&self) -> bool {
        self.layout_reason == LayoutReason::Standard
    }
}
