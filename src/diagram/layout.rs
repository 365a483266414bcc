//! Diagram-space layout of the worktree/branch hierarchy.
//!
//! `compute_layout` is a pure function from the worktree list to node
//! rectangles and connector curves in diagram coordinates (origin top-left,
//! unscaled). The viewport transform is applied later at render time, so
//! layout never needs to know about pan or zoom.

use crate::diagram::geometry::{
    accent_for, BRANCH_GAP, BRANCH_H, BRANCH_W, H_GAP, LEFT_MARGIN, TOP_MARGIN, WORKTREE_GAP,
    WORKTREE_H, WORKTREE_W,
};
use crate::store::Worktree;
use crate::ui::Rect;

/// Positioned worktree box.
#[derive(Clone, Debug, PartialEq)]
pub struct WorktreeNode {
    pub id: String,
    pub rect: Rect,
    pub accent: [f32; 4],
    pub row: usize,
}

/// Positioned branch box.
#[derive(Clone, Debug, PartialEq)]
pub struct BranchNode {
    pub worktree_id: String,
    pub name: String,
    pub rect: Rect,
    pub accent: [f32; 4],
}

/// Cubic Bézier from a worktree's right-edge midpoint to a branch's
/// left-edge midpoint. Control points sit at the horizontal midpoint at the
/// source and destination heights, giving horizontal tangents at both ends.
#[derive(Clone, Debug, PartialEq)]
pub struct BranchConnector {
    pub from: (f32, f32),
    pub ctrl1: (f32, f32),
    pub ctrl2: (f32, f32),
    pub to: (f32, f32),
    pub accent: [f32; 4],
}

/// Dashed vertical trunk segment between two consecutive worktree boxes.
#[derive(Clone, Debug, PartialEq)]
pub struct TrunkConnector {
    pub x: f32,
    pub y_top: f32,
    pub y_bottom: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiagramLayout {
    pub worktrees: Vec<WorktreeNode>,
    pub branches: Vec<BranchNode>,
    pub connectors: Vec<BranchConnector>,
    pub trunks: Vec<TrunkConnector>,
    pub total_width: f32,
    pub total_height: f32,
}

impl DiagramLayout {
    pub fn worktree_node(&self, id: &str) -> Option<&WorktreeNode> {
        self.worktrees.iter().find(|n| n.id == id)
    }

    pub fn branch_node(&self, worktree_id: &str, name: &str) -> Option<&BranchNode> {
        self.branches
            .iter()
            .find(|n| n.worktree_id == worktree_id && n.name == name)
    }
}

fn branch_column_x() -> f32 {
    LEFT_MARGIN + WORKTREE_W + H_GAP
}

fn connector_between(from: (f32, f32), to: (f32, f32), accent: [f32; 4]) -> BranchConnector {
    let mid_x = (from.0 + to.0) / 2.0;
    BranchConnector {
        from,
        ctrl1: (mid_x, from.1),
        ctrl2: (mid_x, to.1),
        to,
        accent,
    }
}

pub fn compute_layout(worktrees: &[Worktree]) -> DiagramLayout {
    let mut layout = DiagramLayout::default();
    let branch_x = branch_column_x();
    let mut max_bottom: f32 = 0.0;

    for (row, wt) in worktrees.iter().enumerate() {
        let accent = accent_for(row);
        let wt_y = TOP_MARGIN + row as f32 * (WORKTREE_H + WORKTREE_GAP);
        let wt_rect = Rect::new(LEFT_MARGIN, wt_y, WORKTREE_W, WORKTREE_H);
        let wt_center_y = wt_y + WORKTREE_H / 2.0;
        max_bottom = max_bottom.max(wt_rect.bottom());

        layout.worktrees.push(WorktreeNode {
            id: wt.id.clone(),
            rect: wt_rect,
            accent,
            row,
        });

        // Branch centers spread symmetrically around the worktree center, so
        // a single branch lands exactly on it.
        let n = wt.branches.len();
        for (j, br) in wt.branches.iter().enumerate() {
            let offset = (j as f32 - (n as f32 - 1.0) / 2.0) * BRANCH_GAP;
            let br_center_y = wt_center_y + offset;
            let br_rect = Rect::new(branch_x, br_center_y - BRANCH_H / 2.0, BRANCH_W, BRANCH_H);
            max_bottom = max_bottom.max(br_rect.bottom());

            layout.connectors.push(connector_between(
                (wt_rect.right(), wt_center_y),
                (branch_x, br_center_y),
                accent,
            ));
            layout.branches.push(BranchNode {
                worktree_id: wt.id.clone(),
                name: br.name.clone(),
                rect: br_rect,
                accent,
            });
        }
    }

    // Dashed trunk between each consecutive worktree pair, anchored at the
    // boxes' horizontal center.
    let trunk_x = LEFT_MARGIN + WORKTREE_W / 2.0;
    for pair in layout.worktrees.windows(2) {
        layout.trunks.push(TrunkConnector {
            x: trunk_x,
            y_top: pair[0].rect.bottom(),
            y_bottom: pair[1].rect.y,
        });
    }

    layout.total_width = branch_x + BRANCH_W + LEFT_MARGIN;
    layout.total_height = max_bottom + TOP_MARGIN;
    layout
}

/// Rectangle for the "add worktree" ghost: the row slot below the last
/// worktree.
pub fn ghost_worktree_rect(worktree_count: usize) -> Rect {
    let y = TOP_MARGIN + worktree_count as f32 * (WORKTREE_H + WORKTREE_GAP);
    Rect::new(LEFT_MARGIN, y, WORKTREE_W, WORKTREE_H)
}

/// Rectangle for the "add branch" ghost: one branch slot below the
/// worktree's current last branch, or centered on the worktree when it has
/// no branches yet.
pub fn ghost_branch_rect(layout: &DiagramLayout, worktree_id: &str) -> Option<Rect> {
    let wt = layout.worktree_node(worktree_id)?;
    let last_center = layout
        .branches
        .iter()
        .filter(|b| b.worktree_id == worktree_id)
        .map(|b| b.rect.y + b.rect.height / 2.0)
        .fold(f32::NEG_INFINITY, f32::max);
    let center_y = if last_center.is_finite() {
        last_center + BRANCH_GAP
    } else {
        wt.rect.y + wt.rect.height / 2.0
    };
    Some(Rect::new(
        branch_column_x(),
        center_y - BRANCH_H / 2.0,
        BRANCH_W,
        BRANCH_H,
    ))
}

/// Ghost connector for a prospective branch rect.
pub fn ghost_branch_connector(layout: &DiagramLayout, worktree_id: &str, ghost: Rect) -> Option<BranchConnector> {
    let wt = layout.worktree_node(worktree_id)?;
    let from = (wt.rect.right(), wt.rect.y + wt.rect.height / 2.0);
    let to = (ghost.x, ghost.y + ghost.height / 2.0);
    Some(connector_between(from, to, wt.accent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Branch, Worktree};

    fn wt(id: &str, branch_names: &[&str]) -> Worktree {
        Worktree {
            id: id.into(),
            name: id.into(),
            path: format!("/{id}"),
            current_branch: branch_names.first().unwrap_or(&"main").to_string(),
            branches: branch_names
                .iter()
                .map(|n| Branch::new(n, false, false, "1h ago"))
                .collect(),
        }
    }

    #[test]
    fn deterministic_for_same_input() {
        let wts = vec![wt("wt-1", &["main", "dev"]), wt("wt-2", &["main"])];
        assert_eq!(compute_layout(&wts), compute_layout(&wts));
    }

    #[test]
    fn rows_stack_with_fixed_pitch() {
        let wts = vec![wt("wt-1", &[]), wt("wt-2", &[]), wt("wt-3", &[])];
        let layout = compute_layout(&wts);
        assert_eq!(layout.worktrees.len(), 3);
        assert_eq!(layout.worktrees[0].rect.y, 40.0);
        assert_eq!(layout.worktrees[1].rect.y, 40.0 + 156.0);
        assert_eq!(layout.worktrees[2].rect.y, 40.0 + 312.0);
    }

    #[test]
    fn zero_branch_worktree_still_occupies_a_row() {
        let wts = vec![wt("wt-1", &[]), wt("wt-2", &["main"])];
        let layout = compute_layout(&wts);
        assert_eq!(layout.worktrees.len(), 2);
        assert_eq!(layout.worktrees[1].rect.y, 40.0 + 156.0);
    }

    #[test]
    fn single_branch_centers_on_worktree() {
        // Three single-branch worktrees: every branch center matches its
        // worktree center, and there is one trunk per consecutive pair.
        let wts = vec![wt("wt-1", &["main"]), wt("wt-2", &["main"]), wt("wt-3", &["main"])];
        let layout = compute_layout(&wts);
        assert_eq!(layout.branches.len(), 3);
        for (node, branch) in layout.worktrees.iter().zip(&layout.branches) {
            let wt_center = node.rect.y + node.rect.height / 2.0;
            let br_center = branch.rect.y + branch.rect.height / 2.0;
            assert!((wt_center - br_center).abs() < 1e-4);
        }
        assert_eq!(layout.trunks.len(), 2);
    }

    #[test]
    fn branches_spread_symmetrically() {
        let wts = vec![wt("wt-1", &["a", "b", "c"])];
        let layout = compute_layout(&wts);
        let center = layout.worktrees[0].rect.y + WORKTREE_H / 2.0;
        let centers: Vec<f32> = layout
            .branches
            .iter()
            .map(|b| b.rect.y + b.rect.height / 2.0)
            .collect();
        assert!((centers[0] - (center - BRANCH_GAP)).abs() < 1e-4);
        assert!((centers[1] - center).abs() < 1e-4);
        assert!((centers[2] - (center + BRANCH_GAP)).abs() < 1e-4);
    }

    #[test]
    fn connectors_have_horizontal_tangents() {
        let wts = vec![wt("wt-1", &["a", "b"])];
        let layout = compute_layout(&wts);
        for c in &layout.connectors {
            assert_eq!(c.ctrl1.1, c.from.1);
            assert_eq!(c.ctrl2.1, c.to.1);
            let mid = (c.from.0 + c.to.0) / 2.0;
            assert_eq!(c.ctrl1.0, mid);
            assert_eq!(c.ctrl2.0, mid);
        }
    }

    #[test]
    fn trunk_spans_the_row_gap() {
        let wts = vec![wt("wt-1", &["main"]), wt("wt-2", &["main"])];
        let layout = compute_layout(&wts);
        let t = &layout.trunks[0];
        assert_eq!(t.x, LEFT_MARGIN + WORKTREE_W / 2.0);
        assert_eq!(t.y_top, layout.worktrees[0].rect.bottom());
        assert_eq!(t.y_bottom, layout.worktrees[1].rect.y);
    }

    #[test]
    fn bounds_cover_the_branch_column() {
        let wts = vec![wt("wt-1", &["a", "b", "c", "d"])];
        let layout = compute_layout(&wts);
        let rightmost = layout.branches.iter().map(|b| b.rect.right()).fold(0.0, f32::max);
        let lowest = layout.branches.iter().map(|b| b.rect.bottom()).fold(0.0, f32::max);
        assert!(layout.total_width >= rightmost);
        assert!(layout.total_height >= lowest);
    }

    #[test]
    fn ghost_slots_extend_the_layout() {
        let wts = vec![wt("wt-1", &["main", "dev"])];
        let layout = compute_layout(&wts);

        let gw = ghost_worktree_rect(wts.len());
        assert_eq!(gw.y, 40.0 + 156.0);

        let gb = ghost_branch_rect(&layout, "wt-1").unwrap();
        let last = layout.branches.last().unwrap();
        let last_center = last.rect.y + last.rect.height / 2.0;
        assert!((gb.y + gb.height / 2.0 - (last_center + BRANCH_GAP)).abs() < 1e-4);

        let conn = ghost_branch_connector(&layout, "wt-1", gb).unwrap();
        assert_eq!(conn.to, (gb.x, gb.y + gb.height / 2.0));
    }
}
