use std::collections::BTreeSet;

use serde::Serialize;

/// One stop on the world map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MapNode {
    /// Index into the level table.
    pub level: usize,
    /// Nodes sharing a region share an entry cinematic.
    pub region: usize,
    /// Unavailable nodes are shown but never enterable, and never gate
    /// later nodes.
    pub available: bool,
    pub label: &'static str,
}

pub static MAP_NODES: &[MapNode] = &[
    MapNode { level: 0, region: 0, available: true, label: "1-1" },
    MapNode { level: 1, region: 0, available: true, label: "1-2" },
    MapNode { level: 2, region: 1, available: true, label: "2-1" },
    MapNode { level: 3, region: 2, available: true, label: "3-1" },
    MapNode { level: 4, region: 2, available: false, label: "3-2" },
];

/// Node `index` is open once every earlier available node's level has been
/// completed. Sequential by position, not by completion order.
pub fn is_unlocked(nodes: &[MapNode], index: usize, completed: &BTreeSet<usize>) -> bool {
    let Some(node) = nodes.get(index) else {
        return false;
    };
    if !node.available {
        return false;
    }
    nodes[..index]
        .iter()
        .filter(|n| n.available)
        .all(|n| completed.contains(&n.level))
}

/// Clamp a cursor move to the node list.
pub fn move_cursor(cursor: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (cursor as i64 + delta as i64).clamp(0, len as i64 - 1) as usize
}

/// Node index showing `level`, if any.
pub fn node_for_level(nodes: &[MapNode], level: usize) -> Option<usize> {
    nodes.iter().position(|n| n.level == level)
}

/// Presentation view of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub label: &'static str,
    pub level: usize,
    pub unlocked: bool,
    pub completed: bool,
}

pub fn node_views(nodes: &[MapNode], completed: &BTreeSet<usize>) -> Vec<NodeView> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, n)| NodeView {
            label: n.label,
            level: n.level,
            unlocked: is_unlocked(nodes, i, completed),
            completed: completed.contains(&n.level),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<MapNode> {
        (0..5)
            .map(|i| MapNode {
                level: 10 + i,
                region: 0,
                available: true,
                label: "n",
            })
            .collect()
    }

    #[test]
    fn first_node_always_open() {
        assert!(is_unlocked(&chain(), 0, &BTreeSet::new()));
    }

    #[test]
    fn gating_is_by_position_not_completion_order() {
        let nodes = chain();
        // completed 10, 12 and 13, but never 11
        let completed: BTreeSet<usize> = [10, 12, 13].into_iter().collect();
        assert!(is_unlocked(&nodes, 1, &completed));
        assert!(!is_unlocked(&nodes, 2, &completed));
        assert!(!is_unlocked(&nodes, 3, &completed));
        assert!(!is_unlocked(&nodes, 4, &completed));

        let completed: BTreeSet<usize> = [10, 11, 12, 13].into_iter().collect();
        assert!(is_unlocked(&nodes, 4, &completed));
    }

    #[test]
    fn unavailable_nodes_do_not_gate() {
        let mut nodes = chain();
        nodes[1].available = false;
        let completed: BTreeSet<usize> = [10].into_iter().collect();
        assert!(!is_unlocked(&nodes, 1, &completed));
        assert!(is_unlocked(&nodes, 2, &completed));
        assert!(!is_unlocked(&nodes, 9, &completed));
    }

    #[test]
    fn cursor_clamps() {
        assert_eq!(move_cursor(0, -1, 5), 0);
        assert_eq!(move_cursor(4, 1, 5), 4);
        assert_eq!(move_cursor(2, 1, 5), 3);
        assert_eq!(node_for_level(MAP_NODES, 3), Some(3));
    }
}
