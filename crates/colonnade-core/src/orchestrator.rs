//! Orchestrator (C9, spec.md §4.9): owns every other component and drives
//! the refresh pipelines end to end.
//!
//! Grounded on the teacher's `TilingManager` (one struct holding all engine
//! state, mutated from a single thread) fused with `daemon_loop.rs`'s
//! `while let Ok(msg) = rx.recv()` consumer loop -- here generalized to
//! `ControllerMsg` and a `RefreshGeneration` cancellation token instead of
//! the teacher's one-shot `AtomicBool` stop flag.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use crate::binary::BinaryEngine;
use crate::clock::{AnimationClock, Seconds};
use crate::focus::FocusController;
use crate::ids::{MonitorId, WindowHandle, WorkspaceId};
use crate::model::{LayoutKind, Monitor, WorkspaceMonitorModel};
use crate::notify::{
    notify_focus_changed, notify_focused_monitor_changed, notify_focused_workspace_changed, NotificationSink, NullSink,
};
use crate::rect::Rect;
use crate::refresh::{schedule_refresh, ControllerMsg, RefreshGeneration, RefreshTrigger};
use crate::scrolling::{HideSide, ScrollSettings, ScrollWorkspace};
use crate::service::{apply_frames_parallel, FrameWrite, WindowService, WindowServiceEvent};
use crate::settings::Settings;

/// How far past the working frame a hidden tile is stashed, so its whole
/// bounding box sits outside the visible area but the compositor still
/// considers it a normal (non-offscreen-clamped) window.
const HIDE_MARGIN: i32 = 40;

pub struct Orchestrator {
    model: WorkspaceMonitorModel,
    scroll: HashMap<WorkspaceId, ScrollWorkspace>,
    /// Set by `remove_from_layout_engine` when a single-window column
    /// disappears and a pre-creation offset was staged for it; consumed by
    /// the next `run_scroll_pipeline` pass for that workspace (spec.md §4.3
    /// "Deletion and fallback").
    pending_viewport_restores: HashMap<WorkspaceId, f64>,
    binary: BinaryEngine,
    focus: FocusController,
    settings: Settings,
    service: Box<dyn WindowService>,
    clock: Arc<dyn AnimationClock>,
    notifications: Box<dyn NotificationSink>,
    generation: Arc<RefreshGeneration>,
    tx: Sender<ControllerMsg>,
    current_focused_workspace: Option<(WorkspaceId, String)>,
    current_focused_monitor: Option<MonitorId>,
    last_published_workspace: Option<(WorkspaceId, String)>,
    last_published_monitor: Option<MonitorId>,
}

impl Orchestrator {
    pub fn new(service: Box<dyn WindowService>, clock: Arc<dyn AnimationClock>) -> (Self, Receiver<ControllerMsg>) {
        let (tx, rx) = mpsc::channel();
        let orchestrator = Self {
            model: WorkspaceMonitorModel::new(),
            scroll: HashMap::new(),
            pending_viewport_restores: HashMap::new(),
            binary: BinaryEngine::new(),
            focus: FocusController::new(),
            settings: Settings::default(),
            service,
            clock,
            notifications: Box::new(NullSink),
            generation: Arc::new(RefreshGeneration::new()),
            tx,
            current_focused_workspace: None,
            current_focused_monitor: None,
            last_published_workspace: None,
            last_published_monitor: None,
        };
        (orchestrator, rx)
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_notification_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.notifications = sink;
        self
    }

    /// A clonable handle callers (event bridges, command sources, timer
    /// threads) use to feed the single consumer loop.
    pub fn sender(&self) -> Sender<ControllerMsg> {
        self.tx.clone()
    }

    pub fn add_monitor(&mut self, monitor: Monitor) -> MonitorId {
        let id = monitor.id;
        self.model.add_monitor(monitor);
        id
    }

    fn now(&self) -> Seconds {
        self.clock.now()
    }

    // ---- message loop ---------------------------------------------------

    /// The single controller thread's body (mirrors the teacher's
    /// `daemon_loop`): drains `rx` until every sender is dropped.
    pub fn run(&mut self, rx: Receiver<ControllerMsg>) {
        self.full_refresh();
        while let Ok(msg) = rx.recv() {
            self.handle_message(msg);
        }
    }

    pub fn handle_message(&mut self, msg: ControllerMsg) {
        match msg {
            ControllerMsg::Event(event) => self.handle_event(event),
            ControllerMsg::RunRefresh { generation, full } => {
                if !self.generation.is_current(generation) {
                    return;
                }
                if full {
                    self.full_refresh();
                } else {
                    self.incremental_refresh();
                }
            }
            ControllerMsg::DisplayTick { monitor, target_time: _ } => {
                self.tick_monitor_animations(monitor);
            }
            ControllerMsg::Command(command) => self.dispatch(command),
        }
    }

    pub fn request_refresh(&self, trigger: RefreshTrigger) {
        schedule_refresh(&self.tx, &self.generation, trigger);
    }

    /// spec.md §4.8's "light session": run `f` against the live model/engines,
    /// then settle with one incremental refresh and one focus revalidation,
    /// rather than a refresh per individual mutation.
    pub(crate) fn light_session(&mut self, f: impl FnOnce(&mut Self)) {
        f(self);
        self.incremental_refresh();
    }

    // ---- refresh pipelines ---------------------------------------------------

    /// spec.md §4.6 `full_refresh`, 7 steps: enumerate, reconcile entries,
    /// reassign monitors, run every workspace's layout pipeline, revalidate
    /// focus, garbage-collect unused workspaces, publish notifications.
    pub fn full_refresh(&mut self) {
        let snapshots = match self.service.query_all_visible() {
            Ok(snapshots) => snapshots,
            Err(err) => {
                crate::log_warn!("full_refresh: enumeration failed: {err}");
                return;
            }
        };

        let seen: HashSet<WindowHandle> = snapshots
            .iter()
            .map(|s| WindowHandle::new(s.pid, s.window_id))
            .collect();

        for removed in self.model.remove_missing(&seen) {
            self.forget_window(removed.handle, Some(removed.workspace_id));
        }

        for snapshot in &snapshots {
            let handle = WindowHandle::new(snapshot.pid, snapshot.window_id);
            if self.model.entry(handle).is_some() {
                continue;
            }
            if snapshot
                .bundle_id
                .as_deref()
                .and_then(|b| self.settings.bundle_rule(b))
                .map(|rule| rule.always_float)
                .unwrap_or(false)
            {
                continue;
            }
            let monitor = self.monitor_containing(snapshot.frame).or_else(|| self.model.monitors().first().map(|m| m.id));
            let Some(monitor) = monitor else { continue };
            let Some(ws) = self.resolve_workspace_for_new_window(snapshot.pid, snapshot.bundle_id.as_deref(), monitor) else {
                continue;
            };
            self.model.add_window(snapshot.ax_ref, handle, ws);
            self.add_to_layout_engine(ws, handle);
        }

        self.reassign_monitors(&snapshots);
        self.run_active_workspace_pipelines();
        self.hide_inactive_workspaces();
        self.revalidate_focus();
        let focused_ws = self.current_focused_workspace.as_ref().map(|(id, _)| *id);
        self.model.garbage_collect_unused(focused_ws);
        self.publish_notifications();
    }

    /// spec.md §4.6 `incremental_refresh`: skips re-enumeration, just reruns
    /// the layout pipelines, inactive-workspace hiding, and focus
    /// revalidation for a command-triggered or event-triggered change already
    /// applied to the model.
    pub fn incremental_refresh(&mut self) {
        self.run_active_workspace_pipelines();
        self.hide_inactive_workspaces();
        self.revalidate_focus();
        self.publish_notifications();
    }

    /// spec.md §4.6 step 5: slide every window belonging to a monitor's
    /// non-active workspaces off-screen, past the working frame's edge,
    /// reusing the same `hidden_origin_rect`/`HideSide` stashing the scroll
    /// pipeline uses for tabbed-column tiles (spec.md scenario 6). Without
    /// this, a workspace switch leaves the previously-active workspace's
    /// windows sitting on top of the newly active one at their last frame.
    fn hide_inactive_workspaces(&mut self) {
        let monitor_ids: Vec<MonitorId> = self.model.monitors().iter().map(|m| m.id).collect();
        for monitor in monitor_ids {
            let Some(mon) = self.model.monitor(monitor) else { continue };
            let working_frame = mon.working_frame(self.settings.outer_struts.as_tuple());
            let active = self.model.active_workspace(monitor);
            let side = self.preferred_hide_side(working_frame);

            for ws in self.model.workspaces_on_monitor(monitor).to_vec() {
                if Some(ws) == active {
                    continue;
                }
                let updates: Vec<FrameWrite> = self
                    .model
                    .entries_in_workspace(ws)
                    .into_iter()
                    .map(|entry| FrameWrite {
                        ax_ref: entry.ax_ref,
                        window_id: entry.window_id,
                        frame: self.hidden_origin_rect(working_frame, None, side),
                        alpha: None,
                    })
                    .collect();
                apply_frames_parallel(self.service.as_ref(), &updates);
            }
        }
    }

    /// spec.md §4.6 "Hide/unhide": pick the side whose hidden-origin sliver
    /// overlaps other monitors' frames the least, defaulting to the right
    /// edge on a tie.
    fn preferred_hide_side(&self, working_frame: Rect) -> HideSide {
        let left = Rect::new(working_frame.x - HIDE_MARGIN - 1, working_frame.y, 1, working_frame.height);
        let right = Rect::new(working_frame.right() + HIDE_MARGIN, working_frame.y, 1, working_frame.height);

        let mut left_overlap = 0i64;
        let mut right_overlap = 0i64;
        for other in self.model.monitors() {
            left_overlap += left.overlap_area(&other.frame);
            right_overlap += right.overlap_area(&other.frame);
        }

        if right_overlap <= left_overlap { HideSide::Right } else { HideSide::Left }
    }

    fn reassign_monitors(&mut self, snapshots: &[crate::service::WindowSnapshot]) {
        for snapshot in snapshots {
            let handle = WindowHandle::new(snapshot.pid, snapshot.window_id);
            let Some(entry) = self.model.entry(handle) else { continue };
            let Some(current_ws) = self.model.workspace(entry.workspace_id) else { continue };
            let Some(current_monitor) = current_ws.monitor_id else { continue };
            let Some(owning) = self.monitor_containing(snapshot.frame) else { continue };
            if owning == current_monitor {
                continue;
            }
            // The window physically moved to another display; follow it into
            // that monitor's active workspace rather than re-running the
            // new-window placement rule.
            if let Some(target_ws) = self.model.active_workspace(owning) {
                self.move_window_to_workspace(handle, target_ws);
            }
        }
    }

    fn add_to_layout_engine(&mut self, ws: WorkspaceId, handle: WindowHandle) {
        let kind = self.model.workspace(ws).map(|w| w.layout_kind).unwrap_or_default();
        let t = self.now();
        match kind {
            LayoutKind::Scroll => {
                // spec.md §4.3 "Deletion and fallback": stage this column's
                // pre-creation offset so the viewport can animate back to it
                // if the column is later removed while still single-window.
                let pre_add_offset = self.model.viewport_state(ws).view_offset_px.current(t);
                self.scroll.entry(ws).or_default().add_window(handle);
                self.model.with_viewport_state(ws, |state| {
                    state.activate_prev_on_removal = Some(pre_add_offset);
                });
            }
            LayoutKind::Binary => {
                let frame = self.workspace_frame(ws).unwrap_or_default();
                self.binary.add_window(ws, handle, frame);
            }
        }
        if self.settings.animations_enabled {
            if let Some(sw) = self.scroll.get_mut(&ws) {
                sw.trigger_appear_animation(handle, t);
            }
        }
    }

    fn move_window_to_workspace(&mut self, handle: WindowHandle, target_ws: WorkspaceId) {
        let Some(entry) = self.model.entry(handle).cloned() else { return };
        if entry.workspace_id == target_ws {
            return;
        }
        self.remove_from_layout_engine(entry.workspace_id, handle);
        self.model.remove_window(handle);
        self.model.add_window(entry.ax_ref, handle, target_ws);
        self.splice_into_layout_engine(target_ws, handle);
        self.focus.handle_window_removed(handle, Some(entry.workspace_id));
    }

    /// Exposed for the command dispatcher (`move_window_to_workspace` command).
    pub(crate) fn move_focused_window_to_workspace(&mut self, target_ws: WorkspaceId) {
        if let Some(handle) = self.focus.focused_handle() {
            self.move_window_to_workspace(handle, target_ws);
        }
    }

    /// Exposed for the command dispatcher's `MoveColumnToWorkspace` command
    /// (spec.md §4.3 `move_column_to_workspace`): moves the whole column at
    /// `column_idx` in `src_ws` into `target_ws`, splicing it after the
    /// destination's active column and preserving the column's tabbed bit
    /// and width-preset cursor (it moves as one `Column` value, not
    /// per-window reconstructions).
    pub(crate) fn move_column_to_workspace(&mut self, src_ws: WorkspaceId, column_idx: usize, target_ws: WorkspaceId) {
        if src_ws == target_ws {
            return;
        }
        let Some(mut src) = self.scroll.remove(&src_ws) else { return };
        if column_idx >= src.columns.len() {
            self.scroll.insert(src_ws, src);
            return;
        }

        let fallback_focus = src.fallback_selection_on_removal(column_idx, 0).and_then(|n| src.node_handle(n));

        let dst_active_column_index = self.model.viewport_state(target_ws).active_column_index;
        let dst = self.scroll.entry(target_ws).or_default();
        let moved_handles = src.move_column_to_workspace(column_idx, dst, dst_active_column_index).unwrap_or_default();
        self.scroll.insert(src_ws, src);

        for handle in &moved_handles {
            if let Some(entry) = self.model.entry(*handle).cloned() {
                self.model.remove_window(*handle);
                self.model.add_window(entry.ax_ref, *handle, target_ws);
            }
        }

        if let Some(focused) = self.focus.focused_handle() {
            if moved_handles.contains(&focused) {
                self.focus.handle_window_removed(focused, Some(src_ws));
                if let Some(fallback) = fallback_focus {
                    self.focus_window(fallback);
                }
            }
        }
    }

    /// Exposed for the command dispatcher (`MoveColumnToWorkspace` command):
    /// moves the active column of the focused monitor's current workspace.
    pub(crate) fn move_focused_column_to_workspace(&mut self, src_ws: WorkspaceId, target_ws: WorkspaceId) {
        let column_idx = self.model.viewport_state(src_ws).active_column_index;
        self.move_column_to_workspace(src_ws, column_idx, target_ws);
    }

    /// Inserts `handle` into `ws`'s layout engine at the position spec.md
    /// §4.3's cross-workspace move operations require: the scroll engine
    /// splices a new 1-window column right after `active_column_index`
    /// rather than appending trailing, like ordinary new-window placement
    /// (`add_to_layout_engine`) does. The binary engine has no equivalent
    /// "after the active leaf" notion, so it falls back to its ordinary
    /// smart split.
    fn splice_into_layout_engine(&mut self, ws: WorkspaceId, handle: WindowHandle) {
        let kind = self.model.workspace(ws).map(|w| w.layout_kind).unwrap_or_default();
        let t = self.now();
        match kind {
            LayoutKind::Scroll => {
                let active_column_index = self.model.viewport_state(ws).active_column_index;
                let pre_add_offset = self.model.viewport_state(ws).view_offset_px.current(t);
                self.scroll.entry(ws).or_default().insert_window_at(handle, active_column_index + 1);
                self.model.with_viewport_state(ws, |state| {
                    state.activate_prev_on_removal = Some(pre_add_offset);
                });
            }
            LayoutKind::Binary => {
                let frame = self.workspace_frame(ws).unwrap_or_default();
                self.binary.add_window(ws, handle, frame);
            }
        }
        if self.settings.animations_enabled {
            if let Some(sw) = self.scroll.get_mut(&ws) {
                sw.trigger_appear_animation(handle, t);
            }
        }
    }

    fn remove_from_layout_engine(&mut self, ws: WorkspaceId, handle: WindowHandle) {
        if let Some(sw) = self.scroll.get_mut(&ws) {
            if let Some((_, emptied)) = sw.remove_window(handle) {
                if emptied {
                    let restore_to = self.model.with_viewport_state(ws, |state| state.activate_prev_on_removal.take());
                    if let Some(restore_to) = restore_to {
                        self.pending_viewport_restores.insert(ws, restore_to);
                    }
                }
            }
        }
        self.binary.remove_window(ws, handle);
    }

    fn forget_window(&mut self, handle: WindowHandle, ws: Option<WorkspaceId>) {
        if let Some(ws) = ws {
            self.remove_from_layout_engine(ws, handle);
        }
        self.focus.handle_window_removed(handle, ws);
    }

    fn monitor_containing(&self, frame: Rect) -> Option<MonitorId> {
        self.model
            .monitors()
            .iter()
            .max_by_key(|m| m.frame.overlap_area(&frame))
            .filter(|m| m.frame.overlap_area(&frame) > 0)
            .map(|m| m.id)
            .or_else(|| self.model.monitors().first().map(|m| m.id))
    }

    fn workspace_frame(&self, ws: WorkspaceId) -> Option<Rect> {
        let monitor_id = self.model.workspace(ws)?.monitor_id?;
        let monitor = self.model.monitor(monitor_id)?;
        Some(monitor.working_frame(self.settings.outer_struts.as_tuple()))
    }

    /// spec.md §4.9 `resolve_workspace_for_new_window`, 5-step rule:
    /// 1. the bundle's configured `assign_to_workspace`, if any;
    /// 2. an existing workspace already hosting another window from the
    ///    same process;
    /// 3. the target monitor's currently active workspace;
    /// 4. the configured fallback workspace name;
    /// 5. a freshly created workspace attached to the target monitor.
    ///
    /// Returns `None` only when `monitor` itself no longer exists (the model
    /// has nowhere left to attach a workspace to).
    pub(crate) fn resolve_workspace_for_new_window(
        &mut self,
        pid: crate::ids::Pid,
        bundle_id: Option<&str>,
        monitor: MonitorId,
    ) -> Option<WorkspaceId> {
        if self.model.monitor(monitor).is_none() {
            return None;
        }

        if let Some(name) = bundle_id.and_then(|b| self.settings.bundle_rule(b)).and_then(|r| r.assign_to_workspace.as_deref()) {
            let (ws, _) = self.model.focus_workspace(name, monitor);
            self.ensure_layout_kind(ws, name);
            return Some(ws);
        }

        if let Some(existing) = self.model.entries_for_pid(pid).first().map(|e| e.workspace_id) {
            return Some(existing);
        }

        if let Some(active) = self.model.active_workspace(monitor) {
            return Some(active);
        }

        if let Some(name) = self.settings.fallback_workspace_name.clone() {
            let (ws, _) = self.model.focus_workspace(&name, monitor);
            self.ensure_layout_kind(ws, &name);
            self.model.set_active_workspace(monitor, ws);
            return Some(ws);
        }

        let name = self.next_workspace_name(monitor);
        let (ws, _) = self.model.focus_workspace(&name, monitor);
        self.ensure_layout_kind(ws, &name);
        self.model.set_active_workspace(monitor, ws);
        Some(ws)
    }

    fn ensure_layout_kind(&mut self, ws: WorkspaceId, name: &str) {
        let kind = self.settings.layout_kind_for(name);
        if let Some(descriptor) = self.model.workspace_mut(ws) {
            descriptor.layout_kind = kind;
        }
    }

    fn next_workspace_name(&self, monitor: MonitorId) -> String {
        let used = self.model.workspaces_on_monitor(monitor).len();
        (used + 1).to_string()
    }

    // ---- per-workspace layout pipelines ---------------------------------------------------

    fn run_active_workspace_pipelines(&mut self) {
        let monitors: Vec<MonitorId> = self.model.monitors().iter().map(|m| m.id).collect();
        for monitor in monitors {
            let Some(ws) = self.model.active_workspace(monitor) else { continue };
            let Some(descriptor) = self.model.workspace(ws).cloned() else { continue };
            match descriptor.layout_kind {
                LayoutKind::Scroll => self.run_scroll_pipeline(ws, monitor),
                LayoutKind::Binary => self.run_binary_pipeline(ws, monitor),
            }
        }
    }

    /// spec.md §4.3/§4.6's scroll-engine pipeline: reconcile windows into the
    /// column strip, resolve selection, trigger enter animations, reconcile
    /// the viewport offset, compute frames, and apply them.
    fn run_scroll_pipeline(&mut self, ws: WorkspaceId, monitor: MonitorId) {
        let Some(working_frame) = self.workspace_frame(ws) else { return };
        let gap = self.settings.gap;
        let t = self.now();
        let settings = ScrollSettings {
            gap,
            center_mode: if self.settings.always_center_single_column {
                crate::scrolling::CenterMode::Always
            } else {
                crate::scrolling::CenterMode::OnOverflow
            },
            always_center_single_column: self.settings.always_center_single_column,
            infinite_loop: self.settings.infinite_loop,
        };

        let handles: Vec<WindowHandle> = self.model.entries_in_workspace(ws).into_iter().map(|e| e.handle).collect();
        let scroll = self.scroll.entry(ws).or_default();

        let created = scroll.sync_windows(&handles);
        if self.settings.animations_enabled {
            for node in created {
                if let Some(handle) = scroll.node_handle(node) {
                    scroll.trigger_appear_animation(handle, t);
                }
            }
        }

        let mut state = self.model.viewport_state(ws);
        if let Some(selected) = state.selected_node_id {
            if scroll.column_of_node(selected).is_none() {
                state.selected_node_id = scroll.columns.first().and_then(|c| c.windows.first()).map(|w| w.id);
            }
        } else {
            state.selected_node_id = scroll.columns.first().and_then(|c| c.windows.first()).map(|w| w.id);
        }
        if let Some((col_idx, _)) = state.selected_node_id.and_then(|n| scroll.column_of_node(n)) {
            state.active_column_index = col_idx;
        }

        // spec.md §4.3 "Deletion and fallback": a single-window column that
        // disappeared this refresh (via `remove_from_layout_engine`) leaves
        // its pre-creation offset here; consume it in place of the normal
        // `ensure_selection_visible` reconciliation for this tick.
        let restore_to = self.pending_viewport_restores.remove(&ws);
        let target_offset = restore_to.unwrap_or_else(|| scroll.target_view_offset(&state, working_frame, gap, &settings, t));
        if (state.view_offset_px.current(t) - target_offset).abs() > f64::EPSILON {
            state.view_offset_px.animate_to(t, target_offset);
        }
        scroll.tick_window_animations(t);

        let (frames, hidden) = scroll.calculate_combined_layout_using_pools(working_frame, gap, &state, t);
        self.model.update_viewport_state(ws, state);
        self.apply_workspace_frames(ws, monitor, &frames, &hidden);
    }

    /// spec.md §4.4/§4.6's binary-partition pipeline: reconcile the tree,
    /// compute the static layout, overlay per-window move springs, apply.
    fn run_binary_pipeline(&mut self, ws: WorkspaceId, monitor: MonitorId) {
        let Some(working_frame) = self.workspace_frame(ws) else { return };
        let gap = self.settings.gap;
        let t = self.now();

        let handles: Vec<WindowHandle> = self.model.entries_in_workspace(ws).into_iter().map(|e| e.handle).collect();
        let old_frames = self.binary.calculate_layout(ws, working_frame, gap);
        self.binary.sync_windows(ws, &handles, working_frame);
        let new_frames = self.binary.calculate_layout(ws, working_frame, gap);

        if self.settings.animations_enabled {
            self.binary.animate_window_movements(ws, &old_frames, &new_frames, t);
        }
        let animated = self.binary.calculate_animated_frames(ws, &new_frames, t);
        self.binary.prune_completed_animations(ws, t);

        let frames: HashMap<WindowHandle, Rect> = animated;
        let hidden = HashMap::new();
        self.apply_workspace_frames(ws, monitor, &frames, &hidden);
    }

    /// spec.md §4.6 steps 10-12: hide/unhide corner-stashing, batched frame
    /// writes, and raising/alpha upkeep for the focused window.
    fn apply_workspace_frames(
        &mut self,
        ws: WorkspaceId,
        monitor: MonitorId,
        frames: &HashMap<WindowHandle, Rect>,
        hidden: &HashMap<WindowHandle, HideSide>,
    ) {
        let Some(mon) = self.model.monitor(monitor) else { return };
        let working_frame = mon.working_frame(self.settings.outer_struts.as_tuple());
        let mut updates = Vec::new();

        for entry in self.model.entries_in_workspace(ws) {
            let handle = entry.handle;
            let frame = if let Some(side) = hidden.get(&handle) {
                self.hidden_origin_rect(working_frame, frames.get(&handle).copied(), *side)
            } else if let Some(frame) = frames.get(&handle) {
                *frame
            } else {
                continue;
            };
            updates.push(FrameWrite {
                ax_ref: entry.ax_ref,
                window_id: entry.window_id,
                frame,
                alpha: None,
            });
        }

        apply_frames_parallel(self.service.as_ref(), &updates);
    }

    /// Stashes a hidden tile just past the working frame's edge named by
    /// `side`, preserving its own width/height so unhiding it animates back
    /// in rather than popping.
    fn hidden_origin_rect(&self, working_frame: Rect, own_frame: Option<Rect>, side: HideSide) -> Rect {
        let (width, height) = own_frame.map(|r| (r.width, r.height)).unwrap_or((working_frame.width, working_frame.height));
        let y = own_frame.map(|r| r.y).unwrap_or(working_frame.y);
        let x = match side {
            HideSide::Left => working_frame.x - width - HIDE_MARGIN,
            HideSide::Right => working_frame.right() + HIDE_MARGIN,
        };
        Rect::new(x, y, width, height)
    }

    fn tick_monitor_animations(&mut self, monitor: MonitorId) {
        let Some(ws) = self.model.active_workspace(monitor) else { return };
        self.incremental_refresh_quiet(ws, monitor);
    }

    fn incremental_refresh_quiet(&mut self, ws: WorkspaceId, monitor: MonitorId) {
        let Some(descriptor) = self.model.workspace(ws).cloned() else { return };
        match descriptor.layout_kind {
            LayoutKind::Scroll => self.run_scroll_pipeline(ws, monitor),
            LayoutKind::Binary => self.run_binary_pipeline(ws, monitor),
        }
    }

    // ---- focus ---------------------------------------------------

    /// Simplified, hand-unrolled version of `FocusController::ensure_focused_handle_valid`
    /// that does not need to borrow `self.model`/`self.service`/`self.focus`
    /// simultaneously through a closure boundary: it reads the two lookups
    /// it needs up front, then performs the (at most one) focus attempt.
    fn revalidate_focus(&mut self) {
        for monitor in self.model.monitors().iter().map(|m| m.id).collect::<Vec<_>>() {
            let Some(ws) = self.model.active_workspace(monitor) else { continue };

            let current_valid = self
                .focus
                .focused_handle()
                .map(|h| self.model.entry(h).map(|e| e.workspace_id) == Some(Some(ws)))
                .unwrap_or(false);
            if current_valid {
                continue;
            }

            let remembered = self.focus.last_focused(ws).filter(|h| self.model.entry(*h).map(|e| e.workspace_id) == Some(ws));
            let first = self.model.entries_in_workspace(ws).first().map(|e| e.handle);
            let candidate = remembered.or(first);

            match candidate {
                Some(handle) => {
                    let _ = self.perform_focus(handle, ws);
                }
                None => self.focus.clear(),
            }
        }

        if let Some(focused) = self.focus.focused_handle() {
            let ws = self.model.entry(focused).map(|e| e.workspace_id);
            let monitor = ws.and_then(|w| self.model.workspace(w)).and_then(|w| w.monitor_id);
            self.current_focused_workspace = ws.and_then(|w| self.model.workspace(w)).map(|w| (w.id, w.name.clone()));
            self.current_focused_monitor = monitor;
        }
    }

    /// Synchronous focus application, grounded on spec.md §4.5 `focus_window`;
    /// `perform_focus` here is the closure the controller passes into
    /// `FocusController::focus_window`.
    fn perform_focus(&mut self, handle: WindowHandle, ws: WorkspaceId) -> bool {
        let Some(entry) = self.model.entry(handle).cloned() else { return false };
        let now = self.now();
        let service = self.service.as_ref();
        let old = self.focus.focused_handle();
        let outcome = self.focus.focus_window(
            handle,
            ws,
            now,
            |h| service.focus(h.pid, h.window_id, entry.ax_ref).is_ok(),
            |_deferred| {},
        );
        let applied = matches!(outcome, crate::focus::FocusOutcome::Applied);
        if applied {
            notify_focus_changed(self.notifications.as_ref(), old, Some(handle));
        }
        applied
    }

    /// Entry point for the event handler and command dispatcher: attempts to
    /// focus `handle`, recording it as the workspace's `last_focused` target.
    pub(crate) fn focus_window(&mut self, handle: WindowHandle) -> bool {
        let Some(ws) = self.model.entry(handle).map(|e| e.workspace_id) else { return false };
        self.perform_focus(handle, ws)
    }

    pub(crate) fn focused_handle(&self) -> Option<WindowHandle> {
        self.focus.focused_handle()
    }

    pub(crate) fn model(&self) -> &WorkspaceMonitorModel {
        &self.model
    }

    pub(crate) fn model_mut(&mut self) -> &mut WorkspaceMonitorModel {
        &mut self.model
    }

    pub(crate) fn scroll_mut(&mut self, ws: WorkspaceId) -> &mut ScrollWorkspace {
        self.scroll.entry(ws).or_default()
    }

    pub(crate) fn binary_mut(&mut self) -> &mut BinaryEngine {
        &mut self.binary
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Toggles the OS-native fullscreen state of `handle` via the window
    /// service (spec.md §4.8 "native fullscreen"), distinct from the
    /// layout-level `ToggleFullscreen` command which just dedicates the
    /// workspace's working area to one tile without leaving the WM.
    pub(crate) fn toggle_native_fullscreen(&mut self, handle: WindowHandle) {
        let Some(entry) = self.model.entry(handle).cloned() else { return };
        let enabled = !self.service.is_fullscreen(entry.ax_ref);
        let _ = self.service.set_native_fullscreen(entry.ax_ref, enabled);
    }

    pub(crate) fn set_non_managed_focus(&mut self, value: bool) {
        self.focus.set_non_managed_focus(value);
    }

    pub(crate) fn clear_focus(&mut self) {
        self.focus.clear();
    }

    /// spec.md §4.7 `app_hidden`: removes every window of `pid` from its
    /// workspace's layout tree (without forgetting the window entry itself,
    /// so `app_unhidden` can restore it in place).
    pub(crate) fn hide_app(&mut self, pid: crate::ids::Pid) {
        let entries: Vec<_> = self.model.entries_for_pid(pid).into_iter().map(|e| (e.handle, e.workspace_id)).collect();
        for (handle, ws) in entries {
            self.remove_from_layout_engine(ws, handle);
            if self.focus.focused_handle() == Some(handle) {
                self.focus.handle_window_removed(handle, Some(ws));
            }
        }
        self.model.set_layout_reason_for_app(pid, crate::model::LayoutReason::AppHidden);
    }

    /// spec.md §4.7 `app_unhidden`: re-admits `pid`'s windows into their
    /// workspace's layout tree.
    pub(crate) fn unhide_app(&mut self, pid: crate::ids::Pid) {
        self.model.set_layout_reason_for_app(pid, crate::model::LayoutReason::Standard);
        let entries: Vec<_> = self.model.entries_for_pid(pid).into_iter().map(|e| (e.handle, e.workspace_id)).collect();
        for (handle, ws) in entries {
            self.add_to_layout_engine(ws, handle);
        }
    }

    /// Forgets a window identified only by its external id (spec.md §4.7
    /// `destroyed`/`closed`: the window may already be gone from the window
    /// service by the time the event is handled, so enumeration can't find it).
    pub(crate) fn forget_window_by_window_id(&mut self, window_id: crate::ids::ExternalWindowId) {
        let Some(entry) = self.model.entry_by_window_id(window_id).cloned() else { return };
        self.remove_from_layout_engine(entry.workspace_id, entry.handle);
        self.model.remove_window(entry.handle);
        self.focus.handle_window_removed(entry.handle, Some(entry.workspace_id));
    }

    /// spec.md §8 scenario 6 "Monitor disconnect": reattaches every workspace
    /// the removed monitor was hosting onto a surviving monitor (the first
    /// one in the model, mirroring `monitor_containing`'s own fallback),
    /// clears any focus/previous-monitor bookkeeping that pointed at the
    /// removed monitor, and runs a full refresh so the reattached
    /// workspaces' active one lays out immediately.
    pub fn disconnect_monitor(&mut self, monitor: MonitorId) {
        let Some(fallback) = self.model.monitors().iter().map(|m| m.id).find(|&id| id != monitor) else {
            self.model.remove_monitor(monitor);
            return;
        };

        let orphaned: Vec<WorkspaceId> = self.model.workspaces_on_monitor(monitor).to_vec();
        for ws in orphaned {
            self.model.move_workspace_to_monitor(ws, fallback);
        }
        if self.model.active_workspace(fallback).is_none() {
            if let Some(&first) = self.model.workspaces_on_monitor(fallback).first() {
                self.model.set_active_workspace(fallback, first);
            }
        }

        self.model.remove_monitor(monitor);

        if self.current_focused_monitor == Some(monitor) {
            self.current_focused_monitor = None;
            self.focus.clear();
        }
        if self.last_published_monitor == Some(monitor) {
            self.last_published_monitor = None;
        }

        self.full_refresh();
    }

    pub(crate) fn active_workspace_on_focused_monitor(&self) -> Option<(WorkspaceId, MonitorId)> {
        let monitor = self.current_focused_monitor.or_else(|| self.model.monitors().first().map(|m| m.id))?;
        let ws = self.model.active_workspace(monitor)?;
        Some((ws, monitor))
    }

    fn publish_notifications(&mut self) {
        let new_ws = self.current_focused_workspace.clone();
        let new_monitor = self.current_focused_monitor;
        notify_focused_workspace_changed(self.notifications.as_ref(), self.last_published_workspace.clone(), new_ws.clone());
        notify_focused_monitor_changed(self.notifications.as_ref(), self.last_published_monitor, new_monitor);
        self.last_published_workspace = new_ws;
        self.last_published_monitor = new_monitor;
    }
}
