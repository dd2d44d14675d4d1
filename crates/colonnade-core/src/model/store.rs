//! `WorkspaceMonitorModel` (C2): the mapping of window -> workspace -> monitor,
//! per-monitor ordered workspace lists, active-workspace memory, and
//! back-and-forth history (spec.md §4.2).
//!
//! Generalizes the teacher's single `Workspace` (one per monitor) into many
//! workspaces per monitor plus the cross-workspace bookkeeping spec.md needs.

use std::collections::{HashMap, HashSet};

use crate::direction::Direction;
use crate::ids::{MonitorId, WindowHandle, WorkspaceId};
use crate::model::monitor::Monitor;
use crate::model::window::{AxRef, LayoutReason, WindowEntry};
use crate::model::workspace::{ViewportState, WorkspaceDescriptor};

#[derive(Debug, Default)]
pub struct WorkspaceMonitorModel {
    monitors: Vec<Monitor>,
    workspaces: HashMap<WorkspaceId, WorkspaceDescriptor>,
    /// Per-monitor ordered workspace list (spec.md §4.2's `workspaces(on monitor)`).
    order: HashMap<MonitorId, Vec<WorkspaceId>>,
    active: HashMap<MonitorId, WorkspaceId>,
    /// Most recent two active workspaces per monitor, most-recent last; used
    /// by the command dispatcher's "back-and-forth" workspace switch.
    history: HashMap<MonitorId, Vec<WorkspaceId>>,
    entries: HashMap<WindowHandle, WindowEntry>,
    viewport_states: HashMap<WorkspaceId, ViewportState>,
}

impl WorkspaceMonitorModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- monitors ---------------------------------------------------

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn monitor(&self, id: MonitorId) -> Option<&Monitor> {
        self.monitors.iter().find(|m| m.id == id)
    }

    pub fn add_monitor(&mut self, monitor: Monitor) {
        self.order.entry(monitor.id).or_default();
        self.monitors.push(monitor);
    }

    pub fn remove_monitor(&mut self, id: MonitorId) {
        self.monitors.retain(|m| m.id != id);
        self.order.remove(&id);
        self.active.remove(&id);
        self.history.remove(&id);
    }

    /// 2D adjacency derived from monitor frame centroids; ties broken by id.
    pub fn adjacent_monitor(&self, from: MonitorId, direction: Direction) -> Option<MonitorId> {
        let origin = self.monitor(from)?;
        let (ox, oy) = (origin.frame.center_x(), origin.frame.center_y());

        self.monitors
            .iter()
            .filter(|m| m.id != from)
            .filter(|m| {
                let (cx, cy) = (m.frame.center_x(), m.frame.center_y());
                match direction {
                    Direction::Left => cx < ox,
                    Direction::Right => cx > ox,
                    Direction::Up => cy < oy,
                    Direction::Down => cy > oy,
                }
            })
            .min_by_key(|m| {
                let (cx, cy) = (m.frame.center_x(), m.frame.center_y());
                let axis_distance = match direction {
                    Direction::Left | Direction::Right => (cx - ox).abs(),
                    Direction::Up | Direction::Down => (cy - oy).abs(),
                };
                (axis_distance, m.id)
            })
            .map(|m| m.id)
    }

    // ---- workspaces ---------------------------------------------------

    pub fn workspace(&self, id: WorkspaceId) -> Option<&WorkspaceDescriptor> {
        self.workspaces.get(&id)
    }

    pub fn workspace_mut(&mut self, id: WorkspaceId) -> Option<&mut WorkspaceDescriptor> {
        self.workspaces.get_mut(&id)
    }

    pub fn workspace_by_name(&self, name: &str) -> Option<&WorkspaceDescriptor> {
        self.workspaces.values().find(|w| w.name == name)
    }

    pub fn workspaces_on_monitor(&self, monitor: MonitorId) -> &[WorkspaceId] {
        self.order.get(&monitor).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn active_workspace(&self, monitor: MonitorId) -> Option<WorkspaceId> {
        self.active.get(&monitor).copied()
    }

    /// Sets the active workspace for `monitor`, recording the previous one
    /// in `history` for the back-and-forth command.
    pub fn set_active_workspace(&mut self, monitor: MonitorId, ws: WorkspaceId) {
        if let Some(previous) = self.active.insert(monitor, ws) {
            if previous != ws {
                let hist = self.history.entry(monitor).or_default();
                hist.push(previous);
                if hist.len() > 2 {
                    hist.remove(0);
                }
            }
        }
    }

    /// The workspace to switch back to with the "back-and-forth" command.
    pub fn back_and_forth_target(&self, monitor: MonitorId) -> Option<WorkspaceId> {
        self.history.get(&monitor)?.last().copied()
    }

    /// Attaches a new workspace to `monitor`'s ordered list, appending it.
    pub fn attach_workspace(&mut self, mut descriptor: WorkspaceDescriptor, monitor: MonitorId) -> WorkspaceId {
        descriptor.monitor_id = Some(monitor);
        let id = descriptor.id;
        self.workspaces.insert(id, descriptor);
        self.order.entry(monitor).or_default().push(id);
        self.viewport_states.entry(id).or_default();
        id
    }

    /// `focus_workspace(named name)`: creates the workspace by name if
    /// missing and attaches it to `current_monitor` if unattached.
    pub fn focus_workspace(&mut self, name: &str, current_monitor: MonitorId) -> (WorkspaceId, MonitorId) {
        if let Some(existing) = self.workspace_by_name(name) {
            let id = existing.id;
            let monitor = existing.monitor_id.unwrap_or(current_monitor);
            if existing.monitor_id.is_none() {
                self.attach_to_monitor(id, monitor);
            }
            return (id, monitor);
        }
        let descriptor = WorkspaceDescriptor::new(name);
        let id = self.attach_workspace(descriptor, current_monitor);
        (id, current_monitor)
    }

    fn attach_to_monitor(&mut self, ws: WorkspaceId, monitor: MonitorId) {
        if let Some(descriptor) = self.workspaces.get_mut(&ws) {
            descriptor.monitor_id = Some(monitor);
        }
        self.order.entry(monitor).or_default().push(ws);
    }

    pub fn move_workspace_to_monitor(&mut self, ws: WorkspaceId, monitor: MonitorId) {
        if let Some(descriptor) = self.workspaces.get(&ws) {
            if let Some(old_monitor) = descriptor.monitor_id {
                if let Some(order) = self.order.get_mut(&old_monitor) {
                    order.retain(|&w| w != ws);
                }
                if self.active.get(&old_monitor) == Some(&ws) {
                    self.active.remove(&old_monitor);
                }
            }
        }
        self.attach_to_monitor(ws, monitor);
    }

    /// Swaps two workspaces' monitor assignments (and active-ness) in place.
    pub fn swap_workspaces(&mut self, a: WorkspaceId, b: WorkspaceId) {
        let ma = self.workspaces.get(&a).and_then(|w| w.monitor_id);
        let mb = self.workspaces.get(&b).and_then(|w| w.monitor_id);
        let (Some(ma), Some(mb)) = (ma, mb) else { return };

        let a_was_active = self.active.get(&ma) == Some(&a);
        let b_was_active = self.active.get(&mb) == Some(&b);

        self.move_workspace_to_monitor(a, mb);
        self.move_workspace_to_monitor(b, ma);

        if a_was_active {
            self.active.insert(mb, a);
        }
        if b_was_active {
            self.active.insert(ma, b);
        }
    }

    /// Moves `ws` to `monitor` and makes it the active workspace there.
    pub fn summon_workspace(&mut self, ws: WorkspaceId, monitor: MonitorId) {
        self.move_workspace_to_monitor(ws, monitor);
        self.set_active_workspace(monitor, ws);
    }

    pub fn next_workspace_in_order(&self, monitor: MonitorId, from: WorkspaceId, wrap: bool) -> Option<WorkspaceId> {
        let order = self.workspaces_on_monitor(monitor);
        let idx = order.iter().position(|&w| w == from)?;
        if idx + 1 < order.len() {
            Some(order[idx + 1])
        } else if wrap && !order.is_empty() {
            Some(order[0])
        } else {
            None
        }
    }

    pub fn previous_workspace_in_order(&self, monitor: MonitorId, from: WorkspaceId, wrap: bool) -> Option<WorkspaceId> {
        let order = self.workspaces_on_monitor(monitor);
        let idx = order.iter().position(|&w| w == from)?;
        if idx > 0 {
            Some(order[idx - 1])
        } else if wrap && !order.is_empty() {
            Some(order[order.len() - 1])
        } else {
            None
        }
    }

    /// Removes workspaces with zero entries that are neither focused nor
    /// active on any monitor (spec.md §3's lifecycle GC rule).
    pub fn garbage_collect_unused(&mut self, focused_ws: Option<WorkspaceId>) -> Vec<WorkspaceId> {
        let active: HashSet<WorkspaceId> = self.active.values().copied().collect();
        let mut removed = Vec::new();
        let candidates: Vec<WorkspaceId> = self
            .workspaces
            .keys()
            .copied()
            .filter(|id| Some(*id) != focused_ws && !active.contains(id))
            .filter(|id| self.entries_in_workspace(*id).is_empty())
            .collect();

        for id in candidates {
            self.workspaces.remove(&id);
            self.viewport_states.remove(&id);
            for order in self.order.values_mut() {
                order.retain(|&w| w != id);
            }
            for hist in self.history.values_mut() {
                hist.retain(|&w| w != id);
            }
            removed.push(id);
        }
        removed
    }

    // ---- window entries ---------------------------------------------------

    pub fn entry(&self, handle: WindowHandle) -> Option<&WindowEntry> {
        self.entries.get(&handle)
    }

    pub fn entry_by_window_id(&self, window_id: u64) -> Option<&WindowEntry> {
        self.entries.values().find(|e| e.window_id == window_id)
    }

    pub fn entries_in_workspace(&self, ws: WorkspaceId) -> Vec<&WindowEntry> {
        self.entries.values().filter(|e| e.workspace_id == ws).collect()
    }

    pub fn entries_for_pid(&self, pid: u32) -> Vec<&WindowEntry> {
        self.entries.values().filter(|e| e.handle.pid == pid).collect()
    }

    pub fn all_entries(&self) -> impl Iterator<Item = &WindowEntry> {
        self.entries.values()
    }

    pub fn add_window(&mut self, ax_ref: AxRef, handle: WindowHandle, workspace: WorkspaceId) -> WindowEntry {
        let entry = WindowEntry::new(ax_ref, handle, workspace);
        self.entries.insert(handle, entry.clone());
        entry
    }

    pub fn remove_window(&mut self, handle: WindowHandle) -> Option<WindowEntry> {
        self.entries.remove(&handle)
    }

    /// Removes every entry whose handle is not in `seen`, returning them.
    pub fn remove_missing(&mut self, seen: &HashSet<WindowHandle>) -> Vec<WindowEntry> {
        let stale: Vec<WindowHandle> = self
            .entries
            .keys()
            .copied()
            .filter(|h| !seen.contains(h))
            .collect();
        stale
            .into_iter()
            .filter_map(|h| self.entries.remove(&h))
            .collect()
    }

    /// Marks every entry for `pid` with `reason` (spec.md §4.7 "app_hidden" /
    /// "app_unhidden"); the caller is responsible for adding or removing the
    /// corresponding handles from the layout engines.
    pub fn set_layout_reason_for_app(&mut self, pid: u32, reason: LayoutReason) {
        for entry in self.entries.values_mut() {
            if entry.handle.pid == pid {
                entry.layout_reason = reason;
            }
        }
    }

    pub fn remove_windows_for_app(&mut self, pid: u32) -> Vec<WindowEntry> {
        let handles: Vec<WindowHandle> = self
            .entries
            .values()
            .filter(|e| e.handle.pid == pid)
            .map(|e| e.handle)
            .collect();
        handles.into_iter().filter_map(|h| self.entries.remove(&h)).collect()
    }

    // ---- viewport state ---------------------------------------------------

    pub fn viewport_state(&self, ws: WorkspaceId) -> ViewportState {
        self.viewport_states.get(&ws).cloned().unwrap_or_default()
    }

    pub fn update_viewport_state(&mut self, ws: WorkspaceId, state: ViewportState) {
        self.viewport_states.insert(ws, state);
    }

    /// Scoped mutation of a workspace's viewport state; creates a default
    /// one if none existed yet.
    pub fn with_viewport_state<R>(&mut self, ws: WorkspaceId, f: impl FnOnce(&mut ViewportState) -> R) -> R {
        let state = self.viewport_states.entry(ws).or_default();
        f(state)
    }
}
