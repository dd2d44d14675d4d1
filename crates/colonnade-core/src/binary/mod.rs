//! Binary-partition engine (C4, "DwindleEngine", spec.md §4.4).

pub mod tree;

use std::collections::HashMap;

use crate::animation::MoveAnim;
use crate::clock::Seconds;
use crate::direction::Direction;
use crate::ids::{NodeId, WindowHandle, WorkspaceId};
use crate::model::Orientation;
use crate::rect::Rect;
use crate::spatial;
use tree::{BNode, BinaryTree, RATIO_PRESETS};

/// Per-workspace binary-partition state: the tree plus selection,
/// preselection, and fullscreen bookkeeping named in spec.md §3.
#[derive(Debug, Default)]
pub struct BinaryWorkspace {
    pub tree: BinaryTree,
    pub selected_node_id: Option<NodeId>,
    pub preselection_direction: Option<Direction>,
    pub fullscreen_leaf: Option<NodeId>,
    animations: HashMap<WindowHandle, MoveAnim>,
}

impl BinaryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    fn select(&mut self, node: Option<NodeId>) {
        self.selected_node_id = node;
    }
}

/// Owns every workspace's `BinaryWorkspace`.
#[derive(Debug, Default)]
pub struct BinaryEngine {
    workspaces: HashMap<WorkspaceId, BinaryWorkspace>,
    pub smart_split: bool,
}

impl BinaryEngine {
    pub fn new() -> Self {
        Self {
            workspaces: HashMap::new(),
            smart_split: true,
        }
    }

    pub fn workspace(&mut self, ws: WorkspaceId) -> &mut BinaryWorkspace {
        self.workspaces.entry(ws).or_default()
    }

    pub fn workspace_ref(&self, ws: WorkspaceId) -> Option<&BinaryWorkspace> {
        self.workspaces.get(&ws)
    }

    /// Reconciles the tree to the given handle set, preserving existing
    /// leaves and adding new ones via smart split against the current
    /// selection (or the tree's first leaf if nothing is selected).
    pub fn sync_windows(&mut self, ws: WorkspaceId, handles: &[WindowHandle], frame: Rect) {
        let existing: Vec<WindowHandle> = {
            let w = self.workspace(ws);
            w.tree.leaves().into_iter().map(|(_, h)| h).collect()
        };
        for handle in &existing {
            if !handles.contains(handle) {
                self.remove_window(ws, *handle);
            }
        }
        for handle in handles {
            let already_present = self.workspace(ws).tree.leaves().into_iter().any(|(_, h)| h == *handle);
            if !already_present {
                self.add_window(ws, *handle, frame);
            }
        }
    }

    /// Adds `handle`, splitting the currently selected leaf (spec.md §4.4
    /// "Smart split"). A pending `set_preselection` direction overrides the
    /// split's axis and side and is consumed (cleared) by this call; absent
    /// that, the split falls back to the shorter-axis smart split. The new
    /// leaf becomes selected.
    pub fn add_window(&mut self, ws: WorkspaceId, handle: WindowHandle, frame: Rect) -> NodeId {
        let smart_split = self.smart_split;
        let w = self.workspace(ws);

        if w.tree.is_empty() {
            let id = w.tree.insert_root(handle);
            w.select(Some(id));
            return id;
        }

        let target = w
            .selected_node_id
            .filter(|id| matches!(w.tree.node(*id), Some(BNode::Leaf { .. })))
            .unwrap_or_else(|| w.tree.leaves().first().map(|(id, _)| *id).unwrap());

        let preselection = w.preselection_direction.take();
        let (orientation, new_handle_first) = match preselection {
            Some(Direction::Left) => (Orientation::Horizontal, true),
            Some(Direction::Right) => (Orientation::Horizontal, false),
            Some(Direction::Up) => (Orientation::Vertical, true),
            Some(Direction::Down) => (Orientation::Vertical, false),
            None => {
                let orientation = if smart_split {
                    if frame.width >= frame.height { Orientation::Horizontal } else { Orientation::Vertical }
                } else {
                    Orientation::Horizontal
                };
                (orientation, true)
            }
        };

        let new_id = w.tree.split_leaf(target, handle, orientation, new_handle_first).unwrap_or(target);
        w.select(Some(new_id));
        new_id
    }

    /// Removes `handle`'s leaf, selecting the promoted sibling if any.
    pub fn remove_window(&mut self, ws: WorkspaceId, handle: WindowHandle) {
        let w = self.workspace(ws);
        let Some(leaf) = w.tree.find_leaf(handle) else { return };
        let was_selected = w.selected_node_id == Some(leaf);
        let sibling = w.tree.remove_leaf(leaf);
        if w.fullscreen_leaf == Some(leaf) {
            w.fullscreen_leaf = None;
        }
        if was_selected {
            w.select(sibling.or(w.tree.leaves().first().map(|(id, _)| *id)));
        }
    }

    pub fn calculate_layout(&self, ws: WorkspaceId, frame: Rect, gap: i32) -> HashMap<WindowHandle, Rect> {
        let Some(w) = self.workspace_ref(ws) else { return HashMap::new() };
        if let Some(fullscreen) = w.fullscreen_leaf {
            if let Some(BNode::Leaf { handle: Some(h) }) = w.tree.node(fullscreen) {
                return HashMap::from([(*h, frame)]);
            }
        }
        w.tree.layout(frame, gap)
    }

    /// Moves the selection to the geometric neighbor in `direction`.
    /// Returns `true` if the selection changed.
    pub fn move_focus(&mut self, ws: WorkspaceId, frame: Rect, gap: i32, direction: Direction) -> bool {
        let w = self.workspace(ws);
        let Some(selected) = w.selected_node_id else { return false };
        let layout = w.tree.layout(frame, gap);
        let leaves = w.tree.leaves();
        let positions: Vec<(NodeId, Rect)> = leaves
            .iter()
            .filter_map(|(id, h)| layout.get(h).map(|r| (*id, *r)))
            .collect();
        let Some((_, focused_rect)) = positions.iter().find(|(id, _)| *id == selected) else {
            return false;
        };
        let focused_rect = *focused_rect;
        match spatial::find_neighbor(&positions, &focused_rect, direction) {
            Some(next) if next != selected => {
                w.select(Some(next));
                true
            }
            _ => false,
        }
    }

    /// Swaps the selected leaf's handle with its geometric neighbor's.
    pub fn swap_windows(&mut self, ws: WorkspaceId, frame: Rect, gap: i32, direction: Direction) -> bool {
        let w = self.workspace(ws);
        let Some(selected) = w.selected_node_id else { return false };
        let layout = w.tree.layout(frame, gap);
        let leaves = w.tree.leaves();
        let positions: Vec<(NodeId, Rect)> = leaves
            .iter()
            .filter_map(|(id, h)| layout.get(h).map(|r| (*id, *r)))
            .collect();
        let Some((_, focused_rect)) = positions.iter().find(|(id, _)| *id == selected) else {
            return false;
        };
        let focused_rect = *focused_rect;
        match spatial::find_neighbor(&positions, &focused_rect, direction) {
            Some(neighbor) if neighbor != selected => {
                w.tree.swap_leaf_handles(selected, neighbor);
                true
            }
            _ => false,
        }
    }

    /// Toggles a per-workspace fullscreen: the selected leaf temporarily
    /// occupies the whole working area.
    pub fn toggle_fullscreen(&mut self, ws: WorkspaceId) -> bool {
        let w = self.workspace(ws);
        match (w.fullscreen_leaf, w.selected_node_id) {
            (Some(_), _) => {
                w.fullscreen_leaf = None;
                true
            }
            (None, Some(selected)) => {
                w.fullscreen_leaf = Some(selected);
                true
            }
            (None, None) => false,
        }
    }

    /// Resets every internal node's ratio to 0.5 along the path from the
    /// selection to the root (spec.md §4.4's literal wording).
    pub fn balance_sizes(&mut self, ws: WorkspaceId) {
        let w = self.workspace(ws);
        let Some(selected) = w.selected_node_id else { return };
        for ancestor in w.tree.ancestors(selected) {
            w.tree.set_ratio(ancestor, 0.5);
        }
    }

    pub fn toggle_orientation(&mut self, ws: WorkspaceId) -> bool {
        let w = self.workspace(ws);
        let Some(selected) = w.selected_node_id else { return false };
        let Some(parent) = w.tree.parent_of(selected) else { return false };
        w.tree.toggle_orientation(parent);
        true
    }

    /// Swaps the children of the selected leaf's parent internal node.
    pub fn swap_split(&mut self, ws: WorkspaceId) -> bool {
        let w = self.workspace(ws);
        let Some(selected) = w.selected_node_id else { return false };
        let Some(parent) = w.tree.parent_of(selected) else { return false };
        w.tree.swap_children(parent);
        true
    }

    /// Advances the selection's parent ratio through `RATIO_PRESETS`, wrapping.
    pub fn cycle_split_ratio(&mut self, ws: WorkspaceId, forward: bool) -> bool {
        let w = self.workspace(ws);
        let Some(selected) = w.selected_node_id else { return false };
        let Some(parent) = w.tree.parent_of(selected) else { return false };
        let Some(BNode::Internal { ratio, .. }) = w.tree.node(parent).copied() else { return false };
        let idx = RATIO_PRESETS
            .iter()
            .position(|r| (*r - ratio).abs() < 0.001)
            .unwrap_or(RATIO_PRESETS.len() / 2);
        let next_idx = if forward {
            (idx + 1) % RATIO_PRESETS.len()
        } else {
            (idx + RATIO_PRESETS.len() - 1) % RATIO_PRESETS.len()
        };
        w.tree.set_ratio(parent, RATIO_PRESETS[next_idx]);
        true
    }

    /// Adjusts the nearest ancestor whose orientation matches `direction`'s
    /// axis by `delta` pixels, expressed as a ratio delta of that ancestor's
    /// span.
    pub fn resize_selected(&mut self, ws: WorkspaceId, frame: Rect, delta: i32, direction: Direction) -> bool {
        let w = self.workspace(ws);
        let Some(selected) = w.selected_node_id else { return false };
        let wants_horizontal = direction.is_horizontal();
        for ancestor in w.tree.ancestors(selected) {
            if let Some(BNode::Internal { orientation, ratio, .. }) = w.tree.node(ancestor).copied() {
                let matches = matches!(orientation, Orientation::Horizontal) == wants_horizontal;
                if matches {
                    let span = if wants_horizontal { frame.width } else { frame.height };
                    let delta_ratio = delta as f64 / span.max(1) as f64;
                    let sign = if matches!(direction, Direction::Right | Direction::Down) { 1.0 } else { -1.0 };
                    w.tree.set_ratio(ancestor, ratio + sign * delta_ratio);
                    return true;
                }
            }
        }
        false
    }

    /// Promotes the selected leaf's subtree to the workspace root.
    ///
    /// `stable = true` keeps the displaced sibling's subtree shape by
    /// re-inserting it as the new root's other child instead of discarding
    /// intermediate structure.
    pub fn move_selection_to_root(&mut self, ws: WorkspaceId, stable: bool) -> bool {
        let w = self.workspace(ws);
        let Some(selected) = w.selected_node_id else { return false };
        if Some(selected) == w.tree.root {
            return false;
        }
        let _ = stable; // tree shape is already preserved by `remove_leaf`'s promotion.
        let handle = match w.tree.node(selected) {
            Some(BNode::Leaf { handle: Some(h) }) => *h,
            _ => return false,
        };
        w.tree.remove_leaf(selected);
        let Some(old_root) = w.tree.root else {
            let new_root = w.tree.insert_root(handle);
            w.select(Some(new_root));
            return true;
        };
        let new_id = w.tree.split_leaf(old_root, handle, Orientation::Horizontal, true);
        w.select(new_id.or(Some(old_root)));
        true
    }

    pub fn set_preselection(&mut self, ws: WorkspaceId, direction: Option<Direction>) {
        self.workspace(ws).preselection_direction = direction;
    }

    pub fn selected_handle(&self, ws: WorkspaceId) -> Option<WindowHandle> {
        let w = self.workspace_ref(ws)?;
        let selected = w.selected_node_id?;
        match w.tree.node(selected) {
            Some(BNode::Leaf { handle: Some(h) }) => Some(*h),
            _ => None,
        }
    }

    /// Captures per-window springs decaying `old_frames -> new_frames` back
    /// to zero offset (spec.md §4.4 "Animations").
    pub fn animate_window_movements(
        &mut self,
        ws: WorkspaceId,
        old_frames: &HashMap<WindowHandle, Rect>,
        new_frames: &HashMap<WindowHandle, Rect>,
        now: Seconds,
    ) {
        let w = self.workspace(ws);
        for (handle, new_rect) in new_frames {
            if let Some(old_rect) = old_frames.get(handle) {
                let dx = (old_rect.x - new_rect.x) as f64;
                let dy = (old_rect.y - new_rect.y) as f64;
                if dx != 0.0 || dy != 0.0 {
                    w.animations.insert(*handle, MoveAnim::new(dx, dy, now));
                }
            }
        }
    }

    pub fn calculate_animated_frames(
        &self,
        ws: WorkspaceId,
        base_frames: &HashMap<WindowHandle, Rect>,
        t: Seconds,
    ) -> HashMap<WindowHandle, Rect> {
        let Some(w) = self.workspace_ref(ws) else { return base_frames.clone() };
        base_frames
            .iter()
            .map(|(handle, rect)| {
                let mut rect = *rect;
                if let Some(anim) = w.animations.get(handle) {
                    let (dx, dy) = anim.offset(t);
                    rect.x += dx.round() as i32;
                    rect.y += dy.round() as i32;
                }
                (*handle, rect)
            })
            .collect()
    }

    pub fn has_active_animations(&self, ws: WorkspaceId, t: Seconds) -> bool {
        self.workspace_ref(ws)
            .map(|w| w.animations.values().any(|a| !a.is_complete(t)))
            .unwrap_or(false)
    }

    pub fn prune_completed_animations(&mut self, ws: WorkspaceId, t: Seconds) {
        self.workspace(ws).animations.retain(|_, a| !a.is_complete(t));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(n: u64) -> WindowHandle {
        WindowHandle::new(1, n)
    }

    #[test]
    fn add_window_splits_the_selected_leaf() {
        // Arrange
        let mut engine = BinaryEngine::new();
        let ws = WorkspaceId::fresh();
        let frame = Rect::new(0, 0, 1920, 1080);

        // Act
        engine.add_window(ws, handle(1), frame);
        engine.add_window(ws, handle(2), frame);
        let layout = engine.calculate_layout(ws, frame, 0);

        // Assert
        assert_eq!(layout.len(), 2);
    }

    #[test]
    fn remove_window_promotes_sibling_and_reselects() {
        // Arrange
        let mut engine = BinaryEngine::new();
        let ws = WorkspaceId::fresh();
        let frame = Rect::new(0, 0, 1920, 1080);
        engine.add_window(ws, handle(1), frame);
        engine.add_window(ws, handle(2), frame);

        // Act
        engine.remove_window(ws, handle(2));
        let layout = engine.calculate_layout(ws, frame, 0);

        // Assert
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[&handle(1)], frame);
    }

    #[test]
    fn toggle_fullscreen_makes_selected_leaf_occupy_the_whole_frame() {
        // Arrange
        let mut engine = BinaryEngine::new();
        let ws = WorkspaceId::fresh();
        let frame = Rect::new(0, 0, 1920, 1080);
        engine.add_window(ws, handle(1), frame);
        engine.add_window(ws, handle(2), frame);

        // Act
        engine.toggle_fullscreen(ws);
        let layout = engine.calculate_layout(ws, frame, 0);

        // Assert
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[&handle(2)], frame);
    }

    #[test]
    fn balance_sizes_resets_ancestor_ratios_to_half() {
        // Arrange
        let mut engine = BinaryEngine::new();
        let ws = WorkspaceId::fresh();
        let frame = Rect::new(0, 0, 1920, 1080);
        engine.add_window(ws, handle(1), frame);
        engine.add_window(ws, handle(2), frame);
        engine.cycle_split_ratio(ws, true);

        // Act
        engine.balance_sizes(ws);
        let layout = engine.calculate_layout(ws, frame, 0);

        // Assert
        assert_eq!(layout[&handle(1)].width, layout[&handle(2)].width);
    }

    #[test]
    fn cycle_split_ratio_wraps_around() {
        // Arrange
        let mut engine = BinaryEngine::new();
        let ws = WorkspaceId::fresh();
        let frame = Rect::new(0, 0, 1920, 1080);
        engine.add_window(ws, handle(1), frame);
        engine.add_window(ws, handle(2), frame);

        // Act
        for _ in 0..RATIO_PRESETS.len() {
            engine.cycle_split_ratio(ws, true);
        }
        let w = engine.workspace_ref(ws).unwrap();
        let selected = w.selected_node_id.unwrap();
        let parent = w.tree.parent_of(selected).unwrap();

        // Assert: back to the preset we started at (0.5).
        if let Some(BNode::Internal { ratio, .. }) = w.tree.node(parent) {
            assert!((*ratio - 0.5).abs() < 0.001);
        } else {
            panic!("expected internal node");
        }
    }
}
