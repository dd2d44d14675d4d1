//! Directional neighbor-finding over a flat set of positioned nodes.
//!
//! Shared by the scrollable-column engine (inter-column and intra-column
//! navigation) and the binary-partition engine (`move_focus`), generalized
//! from the teacher's window-handle-keyed version to work over any `Copy`
//! node key.

use crate::direction::Direction;
use crate::rect::Rect;

/// Finds the nearest node in `positions` that lies in `direction` from
/// `focused` and overlaps it along the perpendicular axis, breaking ties by
/// the candidate's position along that perpendicular axis.
pub fn find_neighbor<K: Copy>(positions: &[(K, Rect)], focused: &Rect, direction: Direction) -> Option<K> {
    let candidates: Vec<&(K, Rect)> = positions
        .iter()
        .filter(|(_, rect)| is_beyond(rect, focused, direction))
        .filter(|(_, rect)| overlaps_perpendicular(rect, focused, direction))
        .collect();

    candidates
        .into_iter()
        .min_by_key(|(_, rect)| (edge_distance(rect, focused, direction), perpendicular_key(rect, direction)))
        .map(|(key, _)| *key)
}

/// Finds the entry point into a set of positioned nodes when navigating in
/// `direction` from outside the set entirely (e.g. focusing the first column
/// from no selection): the topmost candidate, tie-broken by the directional
/// edge.
pub fn find_entry<K: Copy>(positions: &[(K, Rect)], direction: Direction) -> Option<K> {
    positions
        .iter()
        .max_by_key(|(_, rect)| (-rect.y, -directional_edge(rect, direction)))
        .map(|(key, _)| *key)
}

fn is_beyond(rect: &Rect, focused: &Rect, direction: Direction) -> bool {
    match direction {
        Direction::Left => rect.x < focused.x,
        Direction::Right => rect.x > focused.x,
        Direction::Up => rect.y < focused.y,
        Direction::Down => rect.y > focused.y,
    }
}

fn overlaps_perpendicular(rect: &Rect, focused: &Rect, direction: Direction) -> bool {
    if direction.is_horizontal() {
        rect.vertical_overlap(focused) > 0
    } else {
        rect.horizontal_overlap(focused) > 0
    }
}

fn edge_distance(rect: &Rect, focused: &Rect, direction: Direction) -> i32 {
    match direction {
        Direction::Left => (focused.x - rect.right()).abs(),
        Direction::Right => (rect.x - focused.right()).abs(),
        Direction::Up => (focused.y - rect.bottom()).abs(),
        Direction::Down => (rect.y - focused.bottom()).abs(),
    }
}

fn perpendicular_key(rect: &Rect, direction: Direction) -> i32 {
    if direction.is_horizontal() {
        rect.y
    } else {
        rect.x
    }
}

fn directional_edge(rect: &Rect, direction: Direction) -> i32 {
    match direction {
        Direction::Left => rect.right(),
        Direction::Right => -rect.x,
        Direction::Up => rect.bottom(),
        Direction::Down => -rect.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_windows_side_by_side() -> Vec<(u32, Rect)> {
        vec![(0, Rect::new(0, 0, 100, 100)), (1, Rect::new(100, 0, 100, 100))]
    }

    #[test]
    fn find_neighbor_right_from_left_window() {
        // Arrange
        let positions = two_windows_side_by_side();
        let focused = positions[0].1;

        // Act
        let result = find_neighbor(&positions, &focused, Direction::Right);

        // Assert
        assert_eq!(result, Some(1));
    }

    #[test]
    fn find_neighbor_returns_none_past_the_last_window() {
        // Arrange
        let positions = two_windows_side_by_side();
        let focused = positions[1].1;

        // Act
        let result = find_neighbor(&positions, &focused, Direction::Right);

        // Assert
        assert_eq!(result, None);
    }

    #[test]
    fn find_neighbor_ignores_non_overlapping_rows() {
        // Arrange
        let positions = vec![
            (0, Rect::new(0, 0, 100, 100)),
            (1, Rect::new(100, 200, 100, 100)),
        ];
        let focused = positions[0].1;

        // Act
        let result = find_neighbor(&positions, &focused, Direction::Right);

        // Assert
        assert_eq!(result, None);
    }

    #[test]
    fn find_entry_picks_the_topmost_candidate() {
        // Arrange
        let positions = vec![
            (0, Rect::new(0, 100, 100, 100)),
            (1, Rect::new(0, 0, 100, 100)),
        ];

        // Act
        let result = find_entry(&positions, Direction::Right);

        // Assert
        assert_eq!(result, Some(1));
    }
}
