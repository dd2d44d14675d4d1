//! Command dispatcher (C8, spec.md §4.8).
//!
//! Grounded on the teacher's `mosaico_core::action::Action`: a flat,
//! serde-kebab-case enum triggered by a hotkey or the CLI, matched in one
//! big `dispatch`. Generalized here across two layout engines: a command
//! that doesn't apply to the active workspace's engine is a silent no-op
//! (spec.md §7 `CommandInapplicable`), never an error surfaced to the caller.

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::ids::NodeId;
use crate::model::LayoutKind;
use crate::orchestrator::Orchestrator;

/// The full command surface a hotkey binding or the CLI's IPC channel can
/// send. Layout-specific variants are named after the engine method they
/// drive directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    FocusDirection(Direction),
    FocusUpOrRight,
    FocusDownOrLeft,
    FocusColumn(usize),
    FocusColumnFirst,
    FocusColumnLast,
    FocusPrevious,
    MoveWindow(Direction),
    SwapWindow(Direction),
    MoveColumn(Direction),
    ConsumeWindow(Direction),
    ExpelWindow(Direction),
    ToggleColumnTabbed,
    ToggleColumnWidth { forwards: bool },
    ToggleFullWidth,
    ToggleFullscreen,
    ToggleNativeFullscreen,
    BalanceSizes,
    ToggleOrientation,
    SwapSplit,
    CycleSplitRatio { forward: bool },
    ResizeSelected { delta: i32, direction: Direction },
    MoveSelectionToRoot { stable: bool },
    SetPreselection(Option<Direction>),
    SwitchWorkspace(String),
    SwitchWorkspaceNext { wrap: bool },
    SwitchWorkspacePrevious { wrap: bool },
    SwitchWorkspaceBackAndForth,
    SummonWorkspace(String),
    MoveWorkspaceToMonitor(Direction),
    MoveFocusedWindowToWorkspace(String),
    MoveColumnToWorkspace(String),
    FocusMonitor(Direction),
    MoveFocusedWindowToMonitor(Direction),
    CloseFocusedWindow,
}

impl Orchestrator {
    /// spec.md §4.8's "light session" pattern: every command runs inside
    /// `light_session`, which settles with exactly one incremental refresh
    /// and one focus revalidation no matter how many model mutations the
    /// command performs.
    pub fn dispatch(&mut self, command: Command) {
        self.light_session(|orchestrator| orchestrator.dispatch_inner(command));
    }

    fn dispatch_inner(&mut self, command: Command) {
        let Some((ws, monitor)) = self.active_workspace_on_focused_monitor() else { return };
        let kind = self.model().workspace(ws).map(|w| w.layout_kind).unwrap_or_default();

        match command {
            Command::FocusDirection(direction) => self.cmd_focus_direction(ws, kind, direction),
            Command::FocusUpOrRight if kind == LayoutKind::Scroll => {
                if let Some(node) = self.selected_scroll_node(ws) {
                    if let Some(target) = self.scroll_mut(ws).focus_up_or_right(node) {
                        self.focus_node(ws, target);
                    }
                }
            }
            Command::FocusDownOrLeft if kind == LayoutKind::Scroll => {
                if let Some(node) = self.selected_scroll_node(ws) {
                    if let Some(target) = self.scroll_mut(ws).focus_down_or_left(node) {
                        self.focus_node(ws, target);
                    }
                }
            }
            Command::FocusColumn(index) if kind == LayoutKind::Scroll => {
                if let Some(node) = self.scroll_mut(ws).focus_column(index) {
                    self.focus_node(ws, node);
                }
            }
            Command::FocusColumnFirst if kind == LayoutKind::Scroll => {
                if let Some(node) = self.scroll_mut(ws).focus_column_first() {
                    self.focus_node(ws, node);
                }
            }
            Command::FocusColumnLast if kind == LayoutKind::Scroll => {
                if let Some(node) = self.scroll_mut(ws).focus_column_last() {
                    self.focus_node(ws, node);
                }
            }
            Command::FocusPrevious if kind == LayoutKind::Scroll => {
                let current = self.focused_handle();
                if let Some(handle) = self.scroll_mut(ws).focus_previous(current) {
                    self.focus_window(handle);
                }
            }
            Command::MoveWindow(direction) => self.cmd_move_window(ws, kind, direction),
            Command::SwapWindow(direction) => self.cmd_swap_window(ws, kind, direction),
            Command::MoveColumn(direction) if kind == LayoutKind::Scroll => {
                if let Some((col_idx, _)) = self.selected_scroll_position(ws) {
                    let infinite_loop = self.settings().infinite_loop;
                    self.scroll_mut(ws).move_column(col_idx, direction, infinite_loop);
                }
            }
            Command::ConsumeWindow(direction) if kind == LayoutKind::Scroll => {
                if let Some((col_idx, _)) = self.selected_scroll_position(ws) {
                    self.scroll_mut(ws).consume_window(col_idx, direction);
                }
            }
            Command::ExpelWindow(direction) if kind == LayoutKind::Scroll => {
                if let Some(node) = self.selected_scroll_node(ws) {
                    self.scroll_mut(ws).expel_window(node, direction);
                }
            }
            Command::ToggleColumnTabbed if kind == LayoutKind::Scroll => {
                if let Some((col_idx, _)) = self.selected_scroll_position(ws) {
                    self.scroll_mut(ws).toggle_column_tabbed(col_idx);
                }
            }
            Command::ToggleColumnWidth { forwards } if kind == LayoutKind::Scroll => {
                if let Some((col_idx, _)) = self.selected_scroll_position(ws) {
                    self.scroll_mut(ws).toggle_column_width(col_idx, forwards);
                }
            }
            Command::ToggleFullWidth if kind == LayoutKind::Scroll => {
                if let Some((col_idx, _)) = self.selected_scroll_position(ws) {
                    self.scroll_mut(ws).toggle_full_width(col_idx);
                }
            }
            Command::ToggleFullscreen => self.cmd_toggle_fullscreen(ws, kind),
            Command::ToggleNativeFullscreen => {
                if let Some(handle) = self.focused_handle() {
                    self.toggle_native_fullscreen(handle);
                }
            }
            Command::BalanceSizes => self.cmd_balance_sizes(ws, kind),
            Command::ToggleOrientation if kind == LayoutKind::Binary => {
                self.binary_mut().toggle_orientation(ws);
            }
            Command::SwapSplit if kind == LayoutKind::Binary => {
                self.binary_mut().swap_split(ws);
            }
            Command::CycleSplitRatio { forward } if kind == LayoutKind::Binary => {
                self.binary_mut().cycle_split_ratio(ws, forward);
            }
            Command::ResizeSelected { delta, direction } if kind == LayoutKind::Binary => {
                let frame = self.workspace_working_frame(monitor);
                self.binary_mut().resize_selected(ws, frame, delta, direction);
            }
            Command::MoveSelectionToRoot { stable } if kind == LayoutKind::Binary => {
                self.binary_mut().move_selection_to_root(ws, stable);
            }
            Command::SetPreselection(direction) if kind == LayoutKind::Binary => {
                self.binary_mut().set_preselection(ws, direction);
            }
            Command::SwitchWorkspace(name) => {
                let (target, _) = self.model_mut().focus_workspace(&name, monitor);
                self.model_mut().set_active_workspace(monitor, target);
            }
            Command::SwitchWorkspaceNext { wrap } => {
                if let Some(target) = self.model().next_workspace_in_order(monitor, ws, wrap) {
                    self.model_mut().set_active_workspace(monitor, target);
                }
            }
            Command::SwitchWorkspacePrevious { wrap } => {
                if let Some(target) = self.model().previous_workspace_in_order(monitor, ws, wrap) {
                    self.model_mut().set_active_workspace(monitor, target);
                }
            }
            Command::SwitchWorkspaceBackAndForth => {
                if let Some(target) = self.model().back_and_forth_target(monitor) {
                    self.model_mut().set_active_workspace(monitor, target);
                }
            }
            Command::SummonWorkspace(name) => {
                let (target, _) = self.model_mut().focus_workspace(&name, monitor);
                self.model_mut().summon_workspace(target, monitor);
            }
            Command::MoveWorkspaceToMonitor(direction) => {
                if let Some(target_monitor) = self.model().adjacent_monitor(monitor, direction) {
                    self.model_mut().move_workspace_to_monitor(ws, target_monitor);
                }
            }
            Command::MoveFocusedWindowToWorkspace(name) => {
                let (target, _) = self.model_mut().focus_workspace(&name, monitor);
                self.move_focused_window_to_workspace(target);
            }
            Command::MoveColumnToWorkspace(name) if kind == LayoutKind::Scroll => {
                let (target, _) = self.model_mut().focus_workspace(&name, monitor);
                self.move_focused_column_to_workspace(ws, target);
            }
            Command::FocusMonitor(direction) => {
                if let Some(target) = self.model().adjacent_monitor(monitor, direction) {
                    if let Some(target_ws) = self.model().active_workspace(target) {
                        self.focus_first_window_in(target_ws);
                    }
                }
            }
            Command::MoveFocusedWindowToMonitor(direction) => {
                if let Some(target) = self.model().adjacent_monitor(monitor, direction) {
                    if let Some(target_ws) = self.model().active_workspace(target) {
                        self.move_focused_window_to_workspace(target_ws);
                    }
                }
            }
            Command::CloseFocusedWindow => {
                // Closing is the window service's job (a close request, not a
                // frame write); out of scope for the core per spec.md §6 --
                // the CLI/event bridge issues the close and the resulting
                // `Destroyed`/`Closed` event is what actually updates state.
            }
            _ => {
                crate::log_debug!("command not applicable to the active layout");
            }
        }
    }

    fn cmd_focus_direction(&mut self, ws: crate::ids::WorkspaceId, kind: LayoutKind, direction: Direction) {
        match kind {
            LayoutKind::Scroll => {
                let Some(selected) = self.selected_scroll_node(ws) else { return };
                let positions = self.scroll_node_positions(ws);
                if let Some(node) = self.scroll_mut(ws).focus_direction(selected, &positions, direction) {
                    self.focus_node(ws, node);
                }
            }
            LayoutKind::Binary => {
                let frame = self.workspace_working_frame_for(ws);
                let gap = self.settings().gap;
                if self.binary_mut().move_focus(ws, frame, gap, direction) {
                    if let Some(handle) = self.binary_mut().selected_handle(ws) {
                        self.focus_window(handle);
                    }
                }
            }
        }
    }

    fn cmd_move_window(&mut self, ws: crate::ids::WorkspaceId, kind: LayoutKind, direction: Direction) {
        match kind {
            LayoutKind::Scroll => {
                if let Some(node) = self.selected_scroll_node(ws) {
                    let infinite_loop = self.settings().infinite_loop;
                    self.scroll_mut(ws).move_window(node, direction, infinite_loop);
                }
            }
            LayoutKind::Binary => {
                // The binary engine has no separate "move" op distinct from
                // swap; moving the selection is expressed as a swap with the
                // neighbor (spec.md §4.4 non-goal: no free-form reordering).
                self.cmd_swap_window(ws, kind, direction);
            }
        }
    }

    fn cmd_swap_window(&mut self, ws: crate::ids::WorkspaceId, kind: LayoutKind, direction: Direction) {
        match kind {
            LayoutKind::Scroll => {
                if let Some(node) = self.selected_scroll_node(ws) {
                    let positions = self.scroll_node_positions(ws);
                    self.scroll_mut(ws).swap_window(node, &positions, direction);
                }
            }
            LayoutKind::Binary => {
                let frame = self.workspace_working_frame_for(ws);
                let gap = self.settings().gap;
                self.binary_mut().swap_windows(ws, frame, gap, direction);
            }
        }
    }

    fn cmd_toggle_fullscreen(&mut self, ws: crate::ids::WorkspaceId, kind: LayoutKind) {
        match kind {
            LayoutKind::Scroll => {
                if let Some(node) = self.selected_scroll_node(ws) {
                    self.scroll_mut(ws).toggle_fullscreen(node);
                }
            }
            LayoutKind::Binary => {
                self.binary_mut().toggle_fullscreen(ws);
            }
        }
    }

    fn cmd_balance_sizes(&mut self, ws: crate::ids::WorkspaceId, kind: LayoutKind) {
        match kind {
            LayoutKind::Scroll => self.scroll_mut(ws).balance_sizes(),
            LayoutKind::Binary => self.binary_mut().balance_sizes(ws),
        }
    }

    fn selected_scroll_node(&mut self, ws: crate::ids::WorkspaceId) -> Option<NodeId> {
        self.model_mut().viewport_state(ws).selected_node_id
    }

    fn selected_scroll_position(&mut self, ws: crate::ids::WorkspaceId) -> Option<(usize, usize)> {
        let node = self.selected_scroll_node(ws)?;
        self.scroll_mut(ws).column_of_node(node)
    }

    fn scroll_node_positions(&mut self, ws: crate::ids::WorkspaceId) -> Vec<(NodeId, crate::rect::Rect)> {
        let frame = self.workspace_working_frame_for(ws);
        let gap = self.settings().gap;
        let strip = self.scroll_mut(ws).strip_positions(frame.width, gap);
        let columns = &self.scroll_mut(ws).columns;
        let mut positions = Vec::new();
        for (ci, x, width) in strip {
            let Some(column) = columns.get(ci) else { continue };
            let h0 = (frame.height - 2 * gap).max(0);
            let row_heights = column.row_heights(h0, gap);
            let mut y = frame.y + gap;
            for (wi, window) in column.windows.iter().enumerate() {
                let h = row_heights.get(wi).copied().unwrap_or(0);
                positions.push((window.id, crate::rect::Rect::new(frame.x + x, y, width, h)));
                y += h + gap;
            }
        }
        positions
    }

    fn focus_node(&mut self, ws: crate::ids::WorkspaceId, node: NodeId) {
        let Some(handle) = self.scroll_mut(ws).node_handle(node) else { return };
        self.model_mut().with_viewport_state(ws, |state| state.selected_node_id = Some(node));
        self.focus_window(handle);
    }

    fn focus_first_window_in(&mut self, ws: crate::ids::WorkspaceId) {
        if let Some(handle) = self.model().entries_in_workspace(ws).first().map(|e| e.handle) {
            self.focus_window(handle);
        }
    }

    fn workspace_working_frame(&self, monitor: crate::ids::MonitorId) -> crate::rect::Rect {
        self.model()
            .monitor(monitor)
            .map(|m| m.working_frame(self.settings().outer_struts.as_tuple()))
            .unwrap_or_default()
    }

    fn workspace_working_frame_for(&self, ws: crate::ids::WorkspaceId) -> crate::rect::Rect {
        self.model()
            .workspace(ws)
            .and_then(|w| w.monitor_id)
            .map(|m| self.workspace_working_frame(m))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;
    use crate::error::WindowResult;
    use crate::ids::{ExternalWindowId, Pid, WindowHandle};
    use crate::model::{AxRef, Monitor, SizeConstraints};
    use crate::rect::Rect;
    use crate::service::{WindowService, WindowServiceEvent, WindowSnapshot};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct StubService {
        snapshots: Mutex<Vec<WindowSnapshot>>,
    }

    impl WindowService for StubService {
        fn query_all_visible(&self) -> WindowResult<Vec<WindowSnapshot>> {
            Ok(self.snapshots.lock().unwrap().clone())
        }
        fn window_info(&self, _window_id: ExternalWindowId) -> Option<WindowSnapshot> {
            None
        }
        fn window_bounds(&self, _ax_ref: AxRef) -> Option<Rect> {
            None
        }
        fn window_title(&self, _ax_ref: AxRef) -> Option<String> {
            None
        }
        fn set_frame(&self, _ax_ref: AxRef, _rect: Rect) -> WindowResult<()> {
            Ok(())
        }
        fn set_origin_via_compositor(&self, _window_id: ExternalWindowId, _point: (i32, i32)) -> WindowResult<()> {
            Ok(())
        }
        fn set_alpha(&self, _window_id: ExternalWindowId, _alpha: f32) -> WindowResult<()> {
            Ok(())
        }
        fn raise(&self, _ax_ref: AxRef) -> WindowResult<()> {
            Ok(())
        }
        fn focus(&self, _pid: Pid, _window_id: ExternalWindowId, _ax_ref: AxRef) -> WindowResult<()> {
            Ok(())
        }
        fn is_fullscreen(&self, _ax_ref: AxRef) -> bool {
            false
        }
        fn set_native_fullscreen(&self, _ax_ref: AxRef, _enabled: bool) -> WindowResult<()> {
            Ok(())
        }
        fn size_constraints(&self, _ax_ref: AxRef, _current_size: Option<(i32, i32)>) -> SizeConstraints {
            SizeConstraints { min_size: (0, 0), max_size: None }
        }
        fn poll_events(&self) -> Vec<WindowServiceEvent> {
            Vec::new()
        }
    }

    fn snapshot(pid: u32, window_id: u64, frame: Rect) -> WindowSnapshot {
        WindowSnapshot { window_id, pid, ax_ref: AxRef(window_id), frame, bundle_id: None, title: None }
    }

    fn orchestrator_with_two_windows() -> Orchestrator {
        let service = Box::new(StubService {
            snapshots: Mutex::new(vec![
                snapshot(1, 1, Rect::new(0, 0, 800, 600)),
                snapshot(2, 2, Rect::new(800, 0, 800, 600)),
            ]),
            ..Default::default()
        });
        let (mut orchestrator, _rx) = Orchestrator::new(service, std::sync::Arc::new(VirtualClock::new()));
        orchestrator.add_monitor(Monitor::new(1, "Main", Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1080)));
        orchestrator.full_refresh();
        orchestrator
    }

    #[test]
    fn toggle_full_width_is_a_no_op_on_a_binary_workspace() {
        let mut orchestrator = orchestrator_with_two_windows();
        let (ws, _) = orchestrator.active_workspace_on_focused_monitor().unwrap();
        orchestrator.model_mut().workspace_mut(ws).unwrap().layout_kind = LayoutKind::Binary;

        orchestrator.dispatch(Command::ToggleFullWidth);
    }

    #[test]
    fn switch_workspace_creates_and_activates_a_named_workspace() {
        let mut orchestrator = orchestrator_with_two_windows();
        let (_, monitor) = orchestrator.active_workspace_on_focused_monitor().unwrap();

        orchestrator.dispatch(Command::SwitchWorkspace("2".to_string()));

        let active = orchestrator.model().active_workspace(monitor);
        assert_eq!(active.and_then(|ws| orchestrator.model().workspace(ws)).map(|w| w.name.as_str()), Some("2"));
    }

    #[test]
    fn move_focused_window_to_workspace_reassigns_its_entry() {
        let mut orchestrator = orchestrator_with_two_windows();
        let handle = WindowHandle::new(1, 1);
        orchestrator.focus_window(handle);

        orchestrator.dispatch(Command::MoveFocusedWindowToWorkspace("2".to_string()));

        let ws_name = orchestrator
            .model()
            .entry(handle)
            .and_then(|e| orchestrator.model().workspace(e.workspace_id))
            .map(|w| w.name.clone());
        assert_eq!(ws_name.as_deref(), Some("2"));
    }

    #[test]
    fn focus_column_selects_the_requested_column() {
        let mut orchestrator = orchestrator_with_two_windows();

        orchestrator.dispatch(Command::FocusColumn(1));

        let handle = WindowHandle::new(1, 2);
        assert_eq!(orchestrator.focused_handle(), Some(handle));
    }

    #[test]
    fn switch_workspace_next_and_previous_cycle_through_attached_workspaces() {
        let mut orchestrator = orchestrator_with_two_windows();
        let (first_ws, monitor) = orchestrator.active_workspace_on_focused_monitor().unwrap();
        orchestrator.model_mut().focus_workspace("2", monitor);

        orchestrator.dispatch(Command::SwitchWorkspaceNext { wrap: true });
        let after_next = orchestrator.model().active_workspace(monitor);
        assert_ne!(after_next, Some(first_ws));

        orchestrator.dispatch(Command::SwitchWorkspacePrevious { wrap: true });
        assert_eq!(orchestrator.model().active_workspace(monitor), Some(first_ws));
    }

    #[test]
    fn summon_workspace_activates_it_on_the_current_monitor() {
        let mut orchestrator = orchestrator_with_two_windows();
        let (_, monitor) = orchestrator.active_workspace_on_focused_monitor().unwrap();

        orchestrator.dispatch(Command::SummonWorkspace("2".to_string()));

        let active = orchestrator.model().active_workspace(monitor);
        assert_eq!(active.and_then(|ws| orchestrator.model().workspace(ws)).map(|w| w.name.as_str()), Some("2"));
    }

    #[test]
    fn toggle_native_fullscreen_is_a_no_op_without_a_focused_window() {
        let mut orchestrator = orchestrator_with_two_windows();
        orchestrator.dispatch(Command::ToggleNativeFullscreen);
    }

    #[test]
    fn move_column_to_workspace_splices_the_whole_column_into_the_destination() {
        let mut orchestrator = orchestrator_with_two_windows();
        let (src_ws, _) = orchestrator.active_workspace_on_focused_monitor().unwrap();
        let handle = WindowHandle::new(1, 1);
        orchestrator.focus_window(handle);

        orchestrator.dispatch(Command::MoveColumnToWorkspace("2".to_string()));

        let ws_name = orchestrator
            .model()
            .entry(handle)
            .and_then(|e| orchestrator.model().workspace(e.workspace_id))
            .map(|w| w.name.clone());
        assert_eq!(ws_name.as_deref(), Some("2"));
        assert_ne!(orchestrator.model().entry(handle).map(|e| e.workspace_id), Some(src_ws));
    }
}
