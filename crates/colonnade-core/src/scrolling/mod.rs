//! Scrollable-column engine (C3, "NiriEngine", spec.md §4.3).
//!
//! Net-new relative to the teacher (a non-scrolling BSP window manager);
//! grounded on the corpus's own scrollable-column prior art (`YaLTeR-niri`)
//! for the data shape, re-expressed in the teacher's idiom: plain structs,
//! `Vec`-backed ordered collections, and the same directional-neighbor
//! algorithm (`crate::spatial`) the teacher uses for its own navigation.

pub mod column;

use std::collections::HashMap;

use crate::animation::{AlphaAnim, MoveAnim, OffsetAnim};
use crate::clock::Seconds;
use crate::direction::Direction;
use crate::ids::{NodeId, WindowHandle, WorkspaceId};
use crate::model::ViewportState;
use crate::rect::Rect;
use crate::spatial;
use column::{Column, ScrollWindowNode};

/// Which side of the monitor a hidden tile or window is stashed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideSide {
    Left,
    Right,
}


/// Controls where the viewport targets the selected column (spec.md §4.3
/// "Centering mode").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CenterMode {
    Never,
    #[default]
    Always,
    OnOverflow,
}

/// Geometry and behavior knobs the engine needs but that live in the
/// orchestrator's settings snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ScrollSettings {
    pub gap: i32,
    pub center_mode: CenterMode,
    pub always_center_single_column: bool,
    pub infinite_loop: bool,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            gap: 10,
            center_mode: CenterMode::Always,
            always_center_single_column: true,
            infinite_loop: false,
        }
    }
}

/// One workspace's column strip.
#[derive(Debug, Default)]
pub struct ScrollWorkspace {
    pub columns: Vec<Column>,
    /// Most-recently-focused handles, most recent last; backs `focus_previous`.
    recency: Vec<WindowHandle>,
}

impl ScrollWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn window_count(&self) -> usize {
        self.columns.iter().map(|c| c.windows.len()).sum()
    }

    pub fn column_of_node(&self, node: NodeId) -> Option<(usize, usize)> {
        for (ci, column) in self.columns.iter().enumerate() {
            if let Some(wi) = column.windows.iter().position(|w| w.id == node) {
                return Some((ci, wi));
            }
            if column.id == node {
                return Some((ci, usize::MAX));
            }
        }
        None
    }

    pub fn node_handle(&self, node: NodeId) -> Option<WindowHandle> {
        self.columns.iter().flat_map(|c| &c.windows).find(|w| w.id == node).map(|w| w.handle)
    }

    fn record_focus(&mut self, handle: WindowHandle) {
        self.recency.retain(|h| *h != handle);
        self.recency.push(handle);
    }

    /// Reconciles the column strip to `handles`, preserving order for window
    /// that survive; brand-new handles are appended as trailing 1-window
    /// columns. Returns newly created node ids.
    pub fn sync_windows(&mut self, handles: &[WindowHandle]) -> Vec<NodeId> {
        let present: Vec<WindowHandle> = self.columns.iter().flat_map(|c| &c.windows).map(|w| w.handle).collect();

        for handle in present {
            if !handles.contains(&handle) {
                self.remove_window(handle);
            }
        }

        let mut created = Vec::new();
        for handle in handles {
            if !self.columns.iter().any(|c| c.contains(*handle)) {
                let column = Column::new(*handle);
                created.push(column.windows[0].id);
                self.columns.push(column);
            }
        }
        created
    }

    /// Appends a brand-new window as its own trailing column. Returns the
    /// new window's node id.
    pub fn add_window(&mut self, handle: WindowHandle) -> NodeId {
        let column = Column::new(handle);
        let id = column.windows[0].id;
        self.columns.push(column);
        id
    }

    /// Inserts a brand-new window as its own 1-window column at `index`,
    /// clamped to the strip's length, instead of always appending trailing
    /// (spec.md §4.3's cross-workspace move operations splice after the
    /// destination's active column rather than at the end).
    pub fn insert_window_at(&mut self, handle: WindowHandle, index: usize) -> NodeId {
        let column = Column::new(handle);
        let id = column.windows[0].id;
        let index = index.min(self.columns.len());
        self.columns.insert(index, column);
        id
    }

    /// Removes `handle`, returning the index of the column it was removed
    /// from, and whether that column was thereby emptied (and removed).
    pub fn remove_window(&mut self, handle: WindowHandle) -> Option<(usize, bool)> {
        for (ci, column) in self.columns.iter_mut().enumerate() {
            if let Some(wi) = column.index_of(handle) {
                column.windows.remove(wi);
                if column.active_tile_idx >= column.windows.len() && !column.windows.is_empty() {
                    column.active_tile_idx = column.windows.len() - 1;
                }
                self.recency.retain(|h| *h != handle);
                let emptied = column.is_empty();
                if emptied {
                    self.columns.remove(ci);
                }
                return Some((ci, emptied));
            }
        }
        None
    }

    // ---- navigation ---------------------------------------------------

    fn node_rect(&self, positions: &[(NodeId, Rect)], node: NodeId) -> Option<Rect> {
        positions.iter().find(|(id, _)| *id == node).map(|(_, r)| *r)
    }

    /// Geometric neighbor focus, using the same directional algorithm the
    /// binary engine uses.
    pub fn focus_direction(&mut self, selected: NodeId, positions: &[(NodeId, Rect)], direction: Direction) -> Option<NodeId> {
        let focused_rect = self.node_rect(positions, selected)?;
        let next = spatial::find_neighbor(positions, &focused_rect, direction)?;
        if let Some(handle) = self.node_handle(next) {
            self.record_focus(handle);
        }
        Some(next)
    }

    pub fn focus_column_first(&mut self) -> Option<NodeId> {
        self.columns.first().map(|c| c.id)
    }

    pub fn focus_column_last(&mut self) -> Option<NodeId> {
        self.columns.last().map(|c| c.id)
    }

    pub fn focus_column(&self, index: usize) -> Option<NodeId> {
        self.columns.get(index).map(|c| c.id)
    }

    pub fn focus_window_top(&self, column_idx: usize) -> Option<NodeId> {
        self.columns.get(column_idx)?.windows.first().map(|w| w.id)
    }

    pub fn focus_window_bottom(&self, column_idx: usize) -> Option<NodeId> {
        self.columns.get(column_idx)?.windows.last().map(|w| w.id)
    }

    /// Revisits the most-recently-focused other window in this workspace.
    pub fn focus_previous(&self, current: Option<WindowHandle>) -> Option<WindowHandle> {
        self.recency.iter().rev().find(|h| Some(**h) != current).copied()
    }

    /// Combines intra-column vertical movement with inter-column horizontal
    /// traversal (spec.md §4.3): moves up within the current column if
    /// there's a row above; otherwise moves right to the next column,
    /// landing on its top window.
    pub fn focus_up_or_right(&mut self, node: NodeId) -> Option<NodeId> {
        let (ci, wi) = self.column_of_node(node)?;
        if wi != usize::MAX {
            if let Some(target) = wi.checked_sub(1) {
                let id = self.columns[ci].windows[target].id;
                self.record_focus(self.columns[ci].windows[target].handle);
                return Some(id);
            }
        }
        let next_ci = ci + 1;
        let id = self.focus_window_top(next_ci)?;
        if let Some(handle) = self.node_handle(id) {
            self.record_focus(handle);
        }
        Some(id)
    }

    /// Combines intra-column vertical movement with inter-column horizontal
    /// traversal (spec.md §4.3): moves down within the current column if
    /// there's a row below; otherwise moves left to the previous column,
    /// landing on its bottom window.
    pub fn focus_down_or_left(&mut self, node: NodeId) -> Option<NodeId> {
        let (ci, wi) = self.column_of_node(node)?;
        if wi != usize::MAX {
            let target = wi + 1;
            if target < self.columns[ci].windows.len() {
                let id = self.columns[ci].windows[target].id;
                self.record_focus(self.columns[ci].windows[target].handle);
                return Some(id);
            }
        }
        let prev_ci = ci.checked_sub(1)?;
        let id = self.focus_window_bottom(prev_ci)?;
        if let Some(handle) = self.node_handle(id) {
            self.record_focus(handle);
        }
        Some(id)
    }

    // ---- structural operations ---------------------------------------------------

    /// Moves a window within its column or across a column boundary.
    /// Returns `true` if anything changed.
    pub fn move_window(&mut self, node: NodeId, direction: Direction, infinite_loop: bool) -> bool {
        let Some((ci, wi)) = self.column_of_node(node) else { return false };
        if wi == usize::MAX {
            return false;
        }

        if direction.is_vertical() {
            let column = &mut self.columns[ci];
            let target = if direction == Direction::Up { wi.checked_sub(1) } else { Some(wi + 1) };
            let Some(target) = target else { return false };
            if target >= column.windows.len() {
                return false;
            }
            column.windows.swap(wi, target);
            return true;
        }

        let target_ci = if direction == Direction::Left { ci.checked_sub(1) } else { Some(ci + 1) };
        let target_ci = match target_ci {
            Some(idx) if idx < self.columns.len() => idx,
            _ if infinite_loop && !self.columns.is_empty() => {
                if direction == Direction::Left { self.columns.len() - 1 } else { 0 }
            }
            _ => {
                // No column in that direction: expel into a brand-new column.
                let window = self.columns[ci].windows.remove(wi);
                let handle = window.handle;
                let mut new_column = Column::new(handle);
                new_column.windows[0] = window;
                if self.columns[ci].is_empty() {
                    self.columns.remove(ci);
                }
                if direction == Direction::Left {
                    self.columns.insert(0, new_column);
                } else {
                    self.columns.push(new_column);
                }
                return true;
            }
        };

        let window = self.columns[ci].windows.remove(wi);
        let source_emptied = self.columns[ci].is_empty();
        if source_emptied {
            self.columns.remove(ci);
        }
        let insert_at = if source_emptied && target_ci > ci { target_ci - 1 } else { target_ci };
        self.columns[insert_at].windows.push(window);
        true
    }

    /// Swaps two windows without changing column count.
    pub fn swap_window(&mut self, node: NodeId, positions: &[(NodeId, Rect)], direction: Direction) -> bool {
        let Some(rect) = self.node_rect(positions, node) else { return false };
        let Some(neighbor) = spatial::find_neighbor(positions, &rect, direction) else { return false };
        let (Some((c1, w1)), Some((c2, w2))) = (self.column_of_node(node), self.column_of_node(neighbor)) else {
            return false;
        };
        if w1 == usize::MAX || w2 == usize::MAX {
            return false;
        }
        if c1 == c2 {
            self.columns[c1].windows.swap(w1, w2);
        } else {
            let a = self.columns[c1].windows[w1].handle;
            let b = self.columns[c2].windows[w2].handle;
            self.columns[c1].windows[w1].handle = b;
            self.columns[c2].windows[w2].handle = a;
        }
        true
    }

    pub fn move_column(&mut self, column_idx: usize, direction: Direction, infinite_loop: bool) -> bool {
        if !direction.is_horizontal() {
            return false;
        }
        let target = if direction == Direction::Left { column_idx.checked_sub(1) } else { Some(column_idx + 1) };
        let target = match target {
            Some(idx) if idx < self.columns.len() => idx,
            _ if infinite_loop && !self.columns.is_empty() => {
                if direction == Direction::Left { self.columns.len() - 1 } else { 0 }
            }
            _ => return false,
        };
        self.columns.swap(column_idx, target);
        true
    }

    /// Pulls the nearest window from the neighboring column (in `direction`)
    /// into `column_idx`.
    pub fn consume_window(&mut self, column_idx: usize, direction: Direction) -> bool {
        if !direction.is_horizontal() {
            return false;
        }
        let neighbor_idx = if direction == Direction::Left { column_idx.checked_sub(1) } else { Some(column_idx + 1) };
        let Some(neighbor_idx) = neighbor_idx else { return false };
        if neighbor_idx >= self.columns.len() || self.columns[neighbor_idx].windows.is_empty() {
            return false;
        }
        let window = self.columns[neighbor_idx].windows.remove(0);
        if self.columns[neighbor_idx].is_empty() {
            self.columns.remove(neighbor_idx);
        }
        let column_idx = if neighbor_idx < column_idx { column_idx - 1 } else { column_idx };
        self.columns[column_idx].windows.push(window);
        true
    }

    /// Ejects a window from its column into a brand-new column on `direction`'s side.
    pub fn expel_window(&mut self, node: NodeId, direction: Direction) -> bool {
        if !direction.is_horizontal() {
            return false;
        }
        let Some((ci, wi)) = self.column_of_node(node) else { return false };
        if wi == usize::MAX || self.columns[ci].windows.len() < 2 {
            return false;
        }
        let window = self.columns[ci].windows.remove(wi);
        let mut new_column = Column::new(window.handle);
        new_column.windows[0] = window;
        let insert_at = if direction == Direction::Left { ci } else { ci + 1 };
        self.columns.insert(insert_at, new_column);
        true
    }

    pub fn toggle_column_tabbed(&mut self, column_idx: usize) -> bool {
        let Some(column) = self.columns.get_mut(column_idx) else { return false };
        column.is_tabbed = !column.is_tabbed;
        true
    }

    pub fn toggle_column_width(&mut self, column_idx: usize, forwards: bool) -> bool {
        let Some(column) = self.columns.get_mut(column_idx) else { return false };
        column.cycle_width(forwards);
        true
    }

    pub fn toggle_full_width(&mut self, column_idx: usize) -> bool {
        let Some(column) = self.columns.get_mut(column_idx) else { return false };
        column.toggle_full_width();
        true
    }

    /// Sets every column's width preset cursor so all columns share the
    /// workspace's working width equally (spec.md I5).
    pub fn balance_sizes(&mut self) {
        if self.columns.is_empty() {
            return;
        }
        let share = 1.0 / self.columns.len() as f64;
        for column in &mut self.columns {
            column.full_width_previous_cursor = None;
            column.width_override = Some(share);
        }
    }

    pub fn toggle_fullscreen(&mut self, node: NodeId) -> bool {
        for column in &mut self.columns {
            for window in &mut column.windows {
                if window.id == node {
                    window.is_fullscreen = !window.is_fullscreen;
                    return true;
                }
                if window.is_fullscreen && window.id != node {
                    window.is_fullscreen = false;
                }
            }
        }
        false
    }

    pub fn fullscreen_handle(&self) -> Option<WindowHandle> {
        self.columns.iter().flat_map(|c| &c.windows).find(|w| w.is_fullscreen).map(|w| w.handle)
    }

    /// The sibling tile, else nearest column to the right then left;
    /// stable tie-break by column index then row index (spec.md §4.3
    /// "Deletion and fallback").
    pub fn fallback_selection_on_removal(&self, removed_column_idx: usize, removed_row_idx: usize) -> Option<NodeId> {
        if let Some(column) = self.columns.get(removed_column_idx) {
            if !column.windows.is_empty() {
                let idx = removed_row_idx.min(column.windows.len() - 1);
                return Some(column.windows[idx].id);
            }
        }
        for offset in 1..=self.columns.len() {
            if let Some(column) = self.columns.get(removed_column_idx + offset) {
                if let Some(first) = column.windows.first() {
                    return Some(first.id);
                }
            }
            if let Some(idx) = removed_column_idx.checked_sub(offset) {
                if let Some(column) = self.columns.get(idx) {
                    if let Some(first) = column.windows.first() {
                        return Some(first.id);
                    }
                }
            }
        }
        None
    }

    /// Moves the column at `column_idx` out of `self` and splices it into
    /// `dst` right after `dst_active_column_index` (spec.md §4.3
    /// `move_column_to_workspace`). The whole `Column` value moves, so its
    /// tabbed bit and width-preset cursor carry over unchanged. Returns the
    /// handles that moved, in the column's existing row order.
    pub fn move_column_to_workspace(
        &mut self,
        column_idx: usize,
        dst: &mut ScrollWorkspace,
        dst_active_column_index: usize,
    ) -> Option<Vec<WindowHandle>> {
        if column_idx >= self.columns.len() {
            return None;
        }
        let column = self.columns.remove(column_idx);
        let handles: Vec<WindowHandle> = column.windows.iter().map(|w| w.handle).collect();
        for handle in &handles {
            self.recency.retain(|h| h != handle);
        }
        let insert_at = (dst_active_column_index + 1).min(dst.columns.len());
        dst.columns.insert(insert_at, column);
        Some(handles)
    }

    // ---- layout ---------------------------------------------------

    /// Column positions in strip space (not yet offset by the viewport),
    /// `(index, x, width)` with `x` including the leading gap.
    pub fn strip_positions(&self, working_width: i32, gap: i32) -> Vec<(usize, i32, i32)> {
        let mut x = gap;
        let mut out = Vec::with_capacity(self.columns.len());
        for (i, column) in self.columns.iter().enumerate() {
            let w = column.resolve_width(working_width).round() as i32;
            out.push((i, x, w));
            x += w + gap;
        }
        out
    }

    /// Computes the view-offset target for `ensure_selection_visible`
    /// (spec.md §4.3 "Viewport reconciliation"), without mutating state.
    pub fn target_view_offset(
        &self,
        state: &ViewportState,
        working_frame: Rect,
        gap: i32,
        settings: &ScrollSettings,
        t: Seconds,
    ) -> f64 {
        let current_offset = state.view_offset_px.current(t);
        if self.columns.is_empty() {
            return current_offset;
        }
        let positions = self.strip_positions(working_frame.width, gap);
        let sel_col = state.active_column_index.min(self.columns.len().saturating_sub(1));
        let Some(&(_, sel_x, sel_w)) = positions.get(sel_col) else { return current_offset };

        if settings.always_center_single_column && self.columns.len() == 1 {
            return (sel_x as f64) + (sel_w as f64 - working_frame.width as f64) / 2.0;
        }

        if settings.center_mode == CenterMode::Always {
            return (sel_x as f64) + (sel_w as f64 - working_frame.width as f64) / 2.0;
        }

        let visible_start = current_offset;
        let visible_end = current_offset + working_frame.width as f64;
        if sel_w as f64 <= working_frame.width as f64
            && sel_x as f64 >= visible_start
            && (sel_x + sel_w) as f64 <= visible_end
        {
            return current_offset;
        }

        if (sel_x as f64) < visible_start {
            (sel_x - gap) as f64
        } else {
            (sel_x + sel_w - working_frame.width + gap) as f64
        }
    }

    /// Computes final per-window frames and the set of hidden handles
    /// (tabbed non-active tiles), following spec.md §4.3's layout rule.
    pub fn calculate_combined_layout_using_pools(
        &self,
        working_frame: Rect,
        gap: i32,
        state: &ViewportState,
        t: Seconds,
    ) -> (HashMap<WindowHandle, Rect>, HashMap<WindowHandle, HideSide>) {
        let mut frames = HashMap::new();
        let mut hidden = HashMap::new();

        if let Some(fullscreen) = self.fullscreen_handle() {
            frames.insert(fullscreen, working_frame);
            for column in &self.columns {
                for window in &column.windows {
                    if window.handle != fullscreen {
                        hidden.insert(window.handle, HideSide::Right);
                    }
                }
            }
            return (frames, hidden);
        }

        let view_offset = state.view_offset_px.current(t);
        let positions = self.strip_positions(working_frame.width, gap);

        for (ci, strip_x, width) in positions {
            let column = &self.columns[ci];
            let final_x = working_frame.x + strip_x - view_offset.round() as i32;
            let y0 = working_frame.y + gap;
            let h0 = (working_frame.height - 2 * gap).max(0);

            if column.is_tabbed {
                for (wi, window) in column.windows.iter().enumerate() {
                    if wi == column.active_tile_idx {
                        frames.insert(window.handle, Rect::new(final_x, y0, width, h0));
                    } else {
                        hidden.insert(window.handle, HideSide::Right);
                    }
                }
                continue;
            }

            let row_heights = column.row_heights(h0, gap);
            let mut y = y0;
            for (wi, window) in column.windows.iter().enumerate() {
                let h = row_heights.get(wi).copied().unwrap_or(0);
                frames.insert(window.handle, Rect::new(final_x, y, width, h));
                y += h + gap;
            }
        }

        (frames, hidden)
    }

    pub fn has_any_window_animations_running(&self, t: Seconds) -> bool {
        self.columns.iter().flat_map(|c| &c.windows).any(|w| {
            w.move_anim.map(|a| !a.is_complete(t)).unwrap_or(false)
                || w.alpha_anim.as_ref().map(|a| !a.is_complete(t)).unwrap_or(false)
        })
    }

    pub fn tick_window_animations(&mut self, t: Seconds) -> bool {
        let mut any = false;
        for column in &mut self.columns {
            for window in &mut column.windows {
                if let Some(anim) = window.move_anim {
                    if anim.is_complete(t) {
                        window.move_anim = None;
                    } else {
                        any = true;
                    }
                }
                if let Some(anim) = window.alpha_anim.as_mut() {
                    if anim.is_complete(t) {
                        if !anim.take_reset_signal(t) {
                            window.alpha_anim = None;
                        }
                    } else {
                        any = true;
                    }
                }
            }
        }
        any
    }

    pub fn trigger_move_animation(&mut self, handle: WindowHandle, dx: f64, dy: f64, t: Seconds) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        for column in &mut self.columns {
            for window in &mut column.windows {
                if window.handle == handle {
                    window.move_anim = Some(MoveAnim::new(dx, dy, t));
                }
            }
        }
    }

    pub fn trigger_appear_animation(&mut self, handle: WindowHandle, t: Seconds) {
        for column in &mut self.columns {
            for window in &mut column.windows {
                if window.handle == handle {
                    window.alpha_anim = Some(AlphaAnim::appear(t));
                }
            }
        }
    }
}

/// Per-monitor workspace-switch animation: the previous workspace
/// translates out while the target translates in (spec.md §4.3
/// "Workspace switch").
#[derive(Debug, Clone, Copy)]
pub struct WorkspaceSwitchAnim {
    pub offset: crate::animation::Spring,
}

impl WorkspaceSwitchAnim {
    pub fn new(t: Seconds) -> Self {
        Self {
            offset: crate::animation::Spring::new(1.0, 0.0, t),
        }
    }

    pub fn progress(&self, t: Seconds) -> f64 {
        self.offset.value(t)
    }

    pub fn is_complete(&self, t: Seconds) -> bool {
        self.offset.is_complete(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::WindowHandle;

    fn handle(n: u64) -> WindowHandle {
        WindowHandle::new(1, n)
    }

    #[test]
    fn sync_windows_appends_new_handles_as_trailing_columns() {
        let mut ws = ScrollWorkspace::new();
        ws.sync_windows(&[handle(1), handle(2)]);
        assert_eq!(ws.column_count(), 2);
    }

    #[test]
    fn move_window_right_migrates_to_the_next_column() {
        let mut ws = ScrollWorkspace::new();
        ws.sync_windows(&[handle(1), handle(2)]);
        let node = ws.columns[0].windows[0].id;

        let changed = ws.move_window(node, Direction::Right, false);

        assert!(changed);
        assert_eq!(ws.column_count(), 1);
        assert_eq!(ws.columns[0].windows.len(), 2);
    }

    #[test]
    fn move_window_past_the_last_column_creates_a_new_trailing_column() {
        let mut ws = ScrollWorkspace::new();
        ws.sync_windows(&[handle(1)]);
        let node = ws.columns[0].windows[0].id;

        let changed = ws.move_window(node, Direction::Right, false);

        assert!(changed);
        assert_eq!(ws.column_count(), 1);
    }

    #[test]
    fn expel_window_creates_a_new_column_from_a_stacked_window() {
        let mut ws = ScrollWorkspace::new();
        ws.sync_windows(&[handle(1)]);
        ws.columns[0].windows.push(ScrollWindowNode::new(handle(2)));
        let node = ws.columns[0].windows[1].id;

        let changed = ws.expel_window(node, Direction::Right);

        assert!(changed);
        assert_eq!(ws.column_count(), 2);
        assert_eq!(ws.columns[0].windows.len(), 1);
        assert_eq!(ws.columns[1].windows.len(), 1);
    }

    #[test]
    fn toggle_column_tabbed_hides_non_active_tiles() {
        let mut ws = ScrollWorkspace::new();
        ws.sync_windows(&[handle(1)]);
        ws.columns[0].windows.push(ScrollWindowNode::new(handle(2)));
        ws.columns[0].windows.push(ScrollWindowNode::new(handle(3)));
        ws.columns[0].active_tile_idx = 1;
        ws.toggle_column_tabbed(0);

        let state = ViewportState::default();
        let (frames, hidden) =
            ws.calculate_combined_layout_using_pools(Rect::new(0, 0, 1920, 1080), 10, &state, 0.0);

        assert!(frames.contains_key(&handle(2)));
        assert!(hidden.contains_key(&handle(1)));
        assert!(hidden.contains_key(&handle(3)));
    }

    #[test]
    fn fallback_selection_prefers_sibling_tile_in_same_column() {
        let mut ws = ScrollWorkspace::new();
        ws.sync_windows(&[handle(1)]);
        ws.columns[0].windows.push(ScrollWindowNode::new(handle(2)));

        let fallback = ws.fallback_selection_on_removal(0, 0);

        assert_eq!(fallback, Some(ws.columns[0].windows[0].id));
    }

    #[test]
    fn balance_sizes_gives_every_column_an_equal_share() {
        let mut ws = ScrollWorkspace::new();
        ws.sync_windows(&[handle(1), handle(2), handle(3)]);

        ws.balance_sizes();

        let working_width = 1200;
        for column in &ws.columns {
            assert!((column.resolve_width(working_width) - 400.0).abs() < 0.01);
        }
    }

    #[test]
    fn first_window_is_centered_when_narrower_than_working_area() {
        let mut ws = ScrollWorkspace::new();
        ws.sync_windows(&[handle(1)]);
        ws.columns[0].width_preset_cursor = 1; // 0.5 of working width

        let state = ViewportState::default();
        let settings = ScrollSettings::default();
        let working_frame = Rect::new(10, 10, 1880, 1040);

        let target = ws.target_view_offset(&state, working_frame, 10, &settings, 0.0);

        let column_width = ws.columns[0].resolve_width(working_frame.width);
        let expected = (column_width - working_frame.width as f64) / 2.0;
        assert!((target - expected).abs() < 1.0);
    }

    #[test]
    fn insert_window_at_splices_rather_than_appending() {
        let mut ws = ScrollWorkspace::new();
        ws.sync_windows(&[handle(1), handle(2)]);

        ws.insert_window_at(handle(3), 1);

        assert_eq!(ws.column_count(), 3);
        assert_eq!(ws.columns[1].windows[0].handle, handle(3));
    }

    #[test]
    fn focus_up_or_right_moves_within_column_then_crosses_to_the_next() {
        let mut ws = ScrollWorkspace::new();
        ws.sync_windows(&[handle(1)]);
        ws.columns[0].windows.push(ScrollWindowNode::new(handle(2)));
        ws.sync_windows(&[handle(1), handle(2), handle(3)]);
        let bottom = ws.columns[0].windows[1].id;
        let top = ws.columns[0].windows[0].id;

        let up = ws.focus_up_or_right(bottom);
        assert_eq!(up, Some(top));

        let crossed = ws.focus_up_or_right(top);
        assert_eq!(crossed, Some(ws.columns[1].windows[0].id));
    }

    #[test]
    fn focus_down_or_left_moves_within_column_then_crosses_to_the_previous() {
        let mut ws = ScrollWorkspace::new();
        ws.sync_windows(&[handle(1)]);
        ws.columns[0].windows.push(ScrollWindowNode::new(handle(2)));
        ws.sync_windows(&[handle(1), handle(2), handle(3)]);
        let top = ws.columns[0].windows[0].id;
        let bottom = ws.columns[0].windows[1].id;
        let next_column_top = ws.columns[1].windows[0].id;

        let down = ws.focus_down_or_left(top);
        assert_eq!(down, Some(bottom));

        let crossed = ws.focus_down_or_left(next_column_top);
        assert_eq!(crossed, Some(bottom));
    }

    #[test]
    fn move_column_to_workspace_splices_after_the_destination_active_column() {
        let mut src = ScrollWorkspace::new();
        src.sync_windows(&[handle(1), handle(2)]);
        src.columns[1].is_tabbed = true;

        let mut dst = ScrollWorkspace::new();
        dst.sync_windows(&[handle(10), handle(11)]);

        let moved = src.move_column_to_workspace(1, &mut dst, 0);

        assert_eq!(moved, Some(vec![handle(2)]));
        assert_eq!(src.column_count(), 1);
        assert_eq!(dst.column_count(), 3);
        assert!(dst.columns[1].is_tabbed);
        assert_eq!(dst.columns[1].windows[0].handle, handle(2));
    }
}
