//! The binary-partition tree itself: an arena-indexed, persistent tree of
//! splits and leaves (spec.md §4.4), restructured from the teacher's flat
//! recursive `BspLayout` function over a `Vec<handle>` into a tree with
//! stable node ids so operations like `move_focus`, `swap_split`, and
//! `move_selection_to_root` have something to address across calls.

use std::collections::HashMap;

use crate::ids::{NodeId, WindowHandle};
use crate::model::Orientation;
use crate::rect::Rect;

/// Clamp band every split ratio is kept within.
pub const RATIO_MIN: f64 = 0.1;
pub const RATIO_MAX: f64 = 0.9;

/// Ratios offered by `cycle_split_ratio`.
pub const RATIO_PRESETS: &[f64] = &[0.25, 1.0 / 3.0, 0.5, 2.0 / 3.0, 0.75];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BNode {
    Internal {
        orientation: Orientation,
        ratio: f64,
        left: NodeId,
        right: NodeId,
    },
    /// A leaf may be empty only while staged by `set_preselection`.
    Leaf { handle: Option<WindowHandle> },
}

/// One workspace's binary-partition tree plus selection/preselection state.
#[derive(Debug, Default)]
pub struct BinaryTree {
    arena: HashMap<NodeId, BNode>,
    parents: HashMap<NodeId, NodeId>,
    pub root: Option<NodeId>,
}

impl BinaryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn node(&self, id: NodeId) -> Option<&BNode> {
        self.arena.get(&id)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    pub fn leaves(&self) -> Vec<(NodeId, WindowHandle)> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.collect_leaves(root, &mut out);
        }
        out
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<(NodeId, WindowHandle)>) {
        match self.arena.get(&id) {
            Some(BNode::Leaf { handle: Some(h) }) => out.push((id, *h)),
            Some(BNode::Leaf { handle: None }) => {}
            Some(BNode::Internal { left, right, .. }) => {
                let (left, right) = (*left, *right);
                self.collect_leaves(left, out);
                self.collect_leaves(right, out);
            }
            None => {}
        }
    }

    pub fn find_leaf(&self, handle: WindowHandle) -> Option<NodeId> {
        self.leaves().into_iter().find(|(_, h)| *h == handle).map(|(id, _)| id)
    }

    /// Inserts the first window into an empty tree.
    pub fn insert_root(&mut self, handle: WindowHandle) -> NodeId {
        let id = NodeId::fresh();
        self.arena.insert(id, BNode::Leaf { handle: Some(handle) });
        self.root = Some(id);
        id
    }

    /// Splits `target` (a leaf) into an internal node with two leaf
    /// children: the existing handle stays on `side`'s opposite, the new
    /// handle takes `side`. Returns the new leaf's node id.
    pub fn split_leaf(
        &mut self,
        target: NodeId,
        new_handle: WindowHandle,
        orientation: Orientation,
        new_handle_first: bool,
    ) -> Option<NodeId> {
        let existing = match self.arena.get(&target) {
            Some(BNode::Leaf { handle }) => *handle,
            _ => return None,
        };

        let existing_id = NodeId::fresh();
        let new_id = NodeId::fresh();
        self.arena.insert(existing_id, BNode::Leaf { handle: existing });
        self.arena.insert(new_id, BNode::Leaf { handle: Some(new_handle) });

        let (left, right) = if new_handle_first { (new_id, existing_id) } else { (existing_id, new_id) };

        self.arena.insert(
            target,
            BNode::Internal {
                orientation,
                ratio: 0.5,
                left,
                right,
            },
        );
        self.parents.insert(left, target);
        self.parents.insert(right, target);

        Some(new_id)
    }

    /// Removes a leaf, collapsing its parent by promoting the sibling
    /// subtree into the parent's place. Returns the sibling's node id, if
    /// any (useful as a fallback selection).
    pub fn remove_leaf(&mut self, leaf: NodeId) -> Option<NodeId> {
        if Some(leaf) == self.root {
            self.arena.remove(&leaf);
            self.root = None;
            return None;
        }

        let parent = self.parents.remove(&leaf)?;
        let Some(BNode::Internal { left, right, .. }) = self.arena.get(&parent).copied() else {
            return None;
        };
        let sibling = if left == leaf { right } else { left };

        self.arena.remove(&leaf);
        let sibling_node = self.arena.remove(&sibling);
        self.parents.remove(&sibling);

        if let Some(sibling_node) = sibling_node {
            if let Some(grandparent) = self.parents.remove(&parent) {
                self.arena.insert(parent, sibling_node);
                self.parents.insert(parent, grandparent);
                // Re-point grandparent's child slot: `parent`'s node id is
                // reused for the sibling's data, so the grandparent's
                // left/right fields (which still say `parent`) remain valid.
                if let BNode::Internal { left, right, .. } = sibling_node {
                    self.parents.insert(left, parent);
                    self.parents.insert(right, parent);
                }
            } else {
                self.arena.insert(parent, sibling_node);
                self.root = Some(parent);
                if let BNode::Internal { left, right, .. } = sibling_node {
                    self.parents.insert(left, parent);
                    self.parents.insert(right, parent);
                }
            }
        }
        self.arena.remove(&parent);
        Some(parent)
    }

    pub fn set_ratio(&mut self, internal: NodeId, ratio: f64) {
        if let Some(BNode::Internal { ratio: r, .. }) = self.arena.get_mut(&internal) {
            *r = ratio.clamp(RATIO_MIN, RATIO_MAX);
        }
    }

    pub fn toggle_orientation(&mut self, internal: NodeId) {
        if let Some(BNode::Internal { orientation, .. }) = self.arena.get_mut(&internal) {
            *orientation = match orientation {
                Orientation::Horizontal => Orientation::Vertical,
                Orientation::Vertical => Orientation::Horizontal,
            };
        }
    }

    pub fn swap_children(&mut self, internal: NodeId) {
        if let Some(BNode::Internal { left, right, .. }) = self.arena.get_mut(&internal) {
            std::mem::swap(left, right);
        }
    }

    /// Swaps the handles carried by two leaves without changing tree shape.
    pub fn swap_leaf_handles(&mut self, a: NodeId, b: NodeId) {
        let ha = match self.arena.get(&a) {
            Some(BNode::Leaf { handle }) => *handle,
            _ => return,
        };
        let hb = match self.arena.get(&b) {
            Some(BNode::Leaf { handle }) => *handle,
            _ => return,
        };
        self.arena.insert(a, BNode::Leaf { handle: hb });
        self.arena.insert(b, BNode::Leaf { handle: ha });
    }

    /// Every internal node id on the path from `leaf` up to (and including)
    /// the root, nearest ancestor first.
    pub fn ancestors(&self, leaf: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = leaf;
        while let Some(parent) = self.parents.get(&current) {
            out.push(*parent);
            current = *parent;
        }
        out
    }

    pub fn layout(&self, frame: Rect, gap: i32) -> HashMap<WindowHandle, Rect> {
        let mut out = HashMap::new();
        if let Some(root) = self.root {
            self.layout_node(root, frame, gap, &mut out);
        }
        out
    }

    fn layout_node(&self, id: NodeId, frame: Rect, gap: i32, out: &mut HashMap<WindowHandle, Rect>) {
        match self.arena.get(&id) {
            Some(BNode::Leaf { handle: Some(h) }) => {
                out.insert(*h, frame);
            }
            Some(BNode::Leaf { handle: None }) => {}
            Some(BNode::Internal { orientation, ratio, left, right }) => {
                let (left_frame, right_frame) = split_frame(frame, *orientation, *ratio, gap);
                let (left, right) = (*left, *right);
                self.layout_node(left, left_frame, gap, out);
                self.layout_node(right, right_frame, gap, out);
            }
            None => {}
        }
    }
}

fn split_frame(frame: Rect, orientation: Orientation, ratio: f64, gap: i32) -> (Rect, Rect) {
    let half_gap = gap / 2;
    match orientation {
        Orientation::Horizontal => {
            let left_width = ((frame.width - gap) as f64 * ratio).round() as i32;
            let left = Rect::new(frame.x, frame.y, left_width.max(0), frame.height);
            let right = Rect::new(
                frame.x + left_width + gap,
                frame.y,
                (frame.width - left_width - gap).max(0),
                frame.height,
            );
            let _ = half_gap;
            (left, right)
        }
        Orientation::Vertical => {
            let top_height = ((frame.height - gap) as f64 * ratio).round() as i32;
            let top = Rect::new(frame.x, frame.y, frame.width, top_height.max(0));
            let bottom = Rect::new(
                frame.x,
                frame.y + top_height + gap,
                frame.width,
                (frame.height - top_height - gap).max(0),
            );
            (top, bottom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(n: u64) -> WindowHandle {
        WindowHandle::new(1, n)
    }

    #[test]
    fn single_window_fills_the_frame() {
        // Arrange
        let mut tree = BinaryTree::new();
        let root = tree.insert_root(handle(1));

        // Act
        let layout = tree.layout(Rect::new(0, 0, 1000, 800), 10);

        // Assert
        assert_eq!(layout[&handle(1)], Rect::new(0, 0, 1000, 800));
        assert_eq!(tree.root, Some(root));
    }

    #[test]
    fn split_leaf_produces_two_side_by_side_leaves() {
        // Arrange
        let mut tree = BinaryTree::new();
        let root = tree.insert_root(handle(1));

        // Act
        tree.split_leaf(root, handle(2), Orientation::Horizontal, true);
        let layout = tree.layout(Rect::new(0, 0, 1000, 800), 0);

        // Assert
        assert_eq!(layout.len(), 2);
        assert_eq!(layout[&handle(1)].width + layout[&handle(2)].width, 1000);
    }

    #[test]
    fn remove_leaf_collapses_parent_promoting_sibling() {
        // Arrange
        let mut tree = BinaryTree::new();
        let root = tree.insert_root(handle(1));
        let new_leaf = tree.split_leaf(root, handle(2), Orientation::Horizontal, true).unwrap();

        // Act
        tree.remove_leaf(new_leaf);
        let layout = tree.layout(Rect::new(0, 0, 1000, 800), 0);

        // Assert
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[&handle(1)], Rect::new(0, 0, 1000, 800));
    }

    #[test]
    fn ratios_are_clamped_to_the_safe_band() {
        // Arrange
        let mut tree = BinaryTree::new();
        let root = tree.insert_root(handle(1));
        tree.split_leaf(root, handle(2), Orientation::Horizontal, true);

        // Act
        tree.set_ratio(root, 0.0);

        // Assert
        if let Some(BNode::Internal { ratio, .. }) = tree.node(root) {
            assert_eq!(*ratio, RATIO_MIN);
        } else {
            panic!("expected internal node");
        }
    }

    #[test]
    fn three_way_split_produces_three_leaves_summing_to_full_area() {
        // Arrange
        let mut tree = BinaryTree::new();
        let root = tree.insert_root(handle(1));
        let second = tree.split_leaf(root, handle(2), Orientation::Horizontal, true).unwrap();
        tree.split_leaf(second, handle(3), Orientation::Vertical, true);

        // Act
        let layout = tree.layout(Rect::new(0, 0, 1000, 800), 0);

        // Assert
        assert_eq!(layout.len(), 3);
    }
}
