//! The external window service contract (spec.md §6 "External interfaces").
//!
//! This is the accessibility-bridge collaborator the orchestrator treats as
//! out of scope: enumeration, frame/title/alpha reads and writes, raising,
//! and the event stream. `colonnade-memory` provides the in-process
//! reference implementation this crate tests against.

use serde::{Deserialize, Serialize};

use crate::error::WindowResult;
use crate::ids::{ExternalWindowId, Pid};
use crate::model::{AxRef, SizeConstraints};
use crate::rect::Rect;

/// One row of `query_all_visible()`'s snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub window_id: ExternalWindowId,
    pub pid: Pid,
    pub ax_ref: AxRef,
    pub frame: Rect,
    pub bundle_id: Option<String>,
    pub title: Option<String>,
}

/// The event stream's payload (spec.md §6 "Event stream").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum WindowServiceEvent {
    Created { window_id: ExternalWindowId, pid: Pid },
    Destroyed { window_id: ExternalWindowId },
    Closed { window_id: ExternalWindowId },
    Moved { window_id: ExternalWindowId },
    Resized { window_id: ExternalWindowId },
    TitleChanged { window_id: ExternalWindowId },
    FrontAppChanged { pid: Pid },
    AppHidden { pid: Pid },
    AppUnhidden { pid: Pid },
}

/// Required operations a window-service implementation must expose
/// (spec.md §6). All calls are made from the single controller thread;
/// implementations must not block it indefinitely.
pub trait WindowService: std::fmt::Debug + Send + Sync {
    fn query_all_visible(&self) -> WindowResult<Vec<WindowSnapshot>>;
    fn window_info(&self, window_id: ExternalWindowId) -> Option<WindowSnapshot>;
    fn window_bounds(&self, ax_ref: AxRef) -> Option<Rect>;
    fn window_title(&self, ax_ref: AxRef) -> Option<String>;

    fn set_frame(&self, ax_ref: AxRef, rect: Rect) -> WindowResult<()>;
    fn set_origin_via_compositor(&self, window_id: ExternalWindowId, point: (i32, i32)) -> WindowResult<()>;
    fn set_alpha(&self, window_id: ExternalWindowId, alpha: f32) -> WindowResult<()>;

    fn raise(&self, ax_ref: AxRef) -> WindowResult<()>;
    fn focus(&self, pid: Pid, window_id: ExternalWindowId, ax_ref: AxRef) -> WindowResult<()>;
    fn is_fullscreen(&self, ax_ref: AxRef) -> bool;
    fn set_native_fullscreen(&self, ax_ref: AxRef, enabled: bool) -> WindowResult<()>;

    fn size_constraints(&self, ax_ref: AxRef, current_size: Option<(i32, i32)>) -> SizeConstraints;

    /// Drains events accumulated since the last call; delivered serially.
    fn poll_events(&self) -> Vec<WindowServiceEvent>;
}

/// Batch frame-write request for `apply_frames_parallel` (spec.md §5):
/// fire-and-forget, unspecified ordering within the batch, every write
/// idempotent so a dropped write is corrected by the next pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameWrite {
    pub ax_ref: AxRef,
    pub window_id: ExternalWindowId,
    pub frame: Rect,
    pub alpha: Option<f32>,
}

/// Issues every write in `updates`, swallowing individual failures (spec.md
/// §7 kind 1 and 2: a rejected or stale write is logged and skipped, never
/// propagated).
pub fn apply_frames_parallel(service: &dyn WindowService, updates: &[FrameWrite]) {
    for update in updates {
        if let Err(err) = service.set_frame(update.ax_ref, update.frame) {
            crate::log_warn!("frame write failed for {:?}: {err}", update.ax_ref);
            continue;
        }
        if let Some(alpha) = update.alpha {
            if let Err(err) = service.set_alpha(update.window_id, alpha) {
                crate::log_warn!("alpha write failed for window {}: {err}", update.window_id);
            }
        }
    }
}
