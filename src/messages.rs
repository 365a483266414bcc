use crate::crash_log;
use crate::diagram::geometry::accent_for;
use crate::store::{
    add_branch, add_worktree, delete_worktree, duplicate_worktree, fork_branch, rename_branch,
    rename_worktree, Worktree,
};
use crate::ui::widgets::HeaderBar;
use crate::views::{BranchPanel, MindmapView};

/// Application-level messages for state changes
#[derive(Clone, Debug)]
pub enum AppMessage {
    RenameWorktree { id: String, new_name: String },
    RenameBranch { worktree_id: String, old_name: String, new_name: String },
    AddBranch { worktree_id: String },
    ForkBranch { worktree_id: String, source: String },
    AddWorktree,
    DuplicateWorktree { id: String },
    DeleteWorktree { id: String },
    OpenBranch { worktree_id: String, name: String },
    NewIngestion { worktree_id: String, name: String },
    SelectBranch { worktree_id: String, name: String },
    HoverBranch { worktree_id: String, name: String },
    TogglePanel,
}

/// A borrowing view into `App` fields needed by the message handler.
///
/// This avoids passing the entire renderer state and makes the required
/// dependencies explicit.
pub struct MessageViewState<'a> {
    pub mindmap_view: &'a mut MindmapView,
    pub branch_panel: &'a mut BranchPanel,
    pub header_bar: &'a mut HeaderBar,
    pub panel_visible: &'a mut bool,
}

/// Dispatch a single `AppMessage` against the worktree list.
///
/// Returns `true` if the message changed the worktree hierarchy (so the
/// caller can persist or re-derive anything that depends on it).
pub fn handle_app_message(
    msg: AppMessage,
    worktrees: &mut Vec<Worktree>,
    view_state: &mut MessageViewState<'_>,
) -> bool {
    let mutated = match msg {
        AppMessage::RenameWorktree { id, new_name } => {
            crash_log::breadcrumb(format!("rename worktree {} -> {}", id, new_name));
            *worktrees = rename_worktree(worktrees, &id, &new_name);
            true
        }
        AppMessage::RenameBranch { worktree_id, old_name, new_name } => {
            crash_log::breadcrumb(format!(
                "rename branch {}/{} -> {}",
                worktree_id, old_name, new_name
            ));
            *worktrees = rename_branch(worktrees, &worktree_id, &old_name, &new_name);
            // The panel may be showing the branch under its old name
            if view_state.branch_panel.selected_branch()
                == Some((worktree_id.as_str(), old_name.as_str()))
            {
                refresh_panel_selection(&worktree_id, &new_name, worktrees, view_state);
            }
            true
        }
        AppMessage::AddBranch { worktree_id } => {
            crash_log::breadcrumb(format!("add branch in {}", worktree_id));
            *worktrees = add_branch(worktrees, &worktree_id);
            true
        }
        AppMessage::ForkBranch { worktree_id, source } => {
            crash_log::breadcrumb(format!("fork branch {}/{}", worktree_id, source));
            *worktrees = fork_branch(worktrees, &worktree_id, &source);
            true
        }
        AppMessage::AddWorktree => {
            crash_log::breadcrumb("add worktree".to_string());
            *worktrees = add_worktree(worktrees);
            true
        }
        AppMessage::DuplicateWorktree { id } => {
            crash_log::breadcrumb(format!("duplicate worktree {}", id));
            *worktrees = duplicate_worktree(worktrees, &id);
            true
        }
        AppMessage::DeleteWorktree { id } => {
            crash_log::breadcrumb(format!("delete worktree {}", id));
            *worktrees = delete_worktree(worktrees, &id);
            true
        }
        AppMessage::OpenBranch { worktree_id, name } => {
            crash_log::breadcrumb(format!("open branch {}/{}", worktree_id, name));
            refresh_panel_selection(&worktree_id, &name, worktrees, view_state);
            *view_state.panel_visible = true;
            false
        }
        AppMessage::NewIngestion { worktree_id, name } => {
            crash_log::breadcrumb(format!("new ingestion from {}/{}", worktree_id, name));
            false
        }
        AppMessage::SelectBranch { worktree_id, name } => {
            refresh_panel_selection(&worktree_id, &name, worktrees, view_state);
            false
        }
        AppMessage::HoverBranch { worktree_id, name } => {
            refresh_panel_selection(&worktree_id, &name, worktrees, view_state);
            false
        }
        AppMessage::TogglePanel => {
            *view_state.panel_visible = !*view_state.panel_visible;
            false
        }
    };

    if mutated {
        // Drop selections that no longer resolve after the mutation
        view_state.mindmap_view.sync_selection(worktrees);
        if let Some((wt_id, name)) = view_state
            .branch_panel
            .selected_branch()
            .map(|(a, b)| (a.to_string(), b.to_string()))
        {
            let alive = worktrees
                .iter()
                .any(|wt| wt.id == wt_id && wt.branch(&name).is_some());
            if !alive {
                view_state.branch_panel.clear_selection();
            }
        }
        view_state.header_bar.worktree_count = worktrees.len();
    }

    mutated
}

/// Point the detail panel at a branch, with the accent of its worktree row
fn refresh_panel_selection(
    worktree_id: &str,
    name: &str,
    worktrees: &[Worktree],
    view_state: &mut MessageViewState<'_>,
) {
    let found = worktrees
        .iter()
        .enumerate()
        .find(|(_, wt)| wt.id == worktree_id)
        .and_then(|(row, wt)| wt.branch(name).map(|b| (row, wt.name.clone(), b.clone())));

    if let Some((row, wt_name, branch)) = found {
        view_state.branch_panel.set_selection(
            worktree_id.to_string(),
            wt_name,
            branch,
            accent_for(row),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::worktrees_for_project;

    fn view_state<'a>(
        mindmap: &'a mut MindmapView,
        panel: &'a mut BranchPanel,
        header: &'a mut HeaderBar,
        panel_visible: &'a mut bool,
    ) -> MessageViewState<'a> {
        MessageViewState {
            mindmap_view: mindmap,
            branch_panel: panel,
            header_bar: header,
            panel_visible,
        }
    }

    #[test]
    fn delete_clears_a_selection_into_the_deleted_worktree() {
        let mut worktrees = worktrees_for_project("1");
        let victim = worktrees[1].clone();
        let branch = victim.branches[0].name.clone();

        let mut mindmap = MindmapView::new();
        let mut panel = BranchPanel::new();
        let mut header = HeaderBar::new();
        let mut visible = true;
        let mut vs = view_state(&mut mindmap, &mut panel, &mut header, &mut visible);

        handle_app_message(
            AppMessage::SelectBranch { worktree_id: victim.id.clone(), name: branch },
            &mut worktrees,
            &mut vs,
        );
        assert!(vs.branch_panel.selected_branch().is_some());

        let mutated = handle_app_message(
            AppMessage::DeleteWorktree { id: victim.id.clone() },
            &mut worktrees,
            &mut vs,
        );
        assert!(mutated);
        assert!(worktrees.iter().all(|wt| wt.id != victim.id));
        assert!(vs.branch_panel.selected_branch().is_none());
    }

    #[test]
    fn rename_keeps_the_panel_on_the_renamed_branch() {
        let mut worktrees = worktrees_for_project("1");
        let wt_id = worktrees[0].id.clone();
        let old = worktrees[0].branches[0].name.clone();

        let mut mindmap = MindmapView::new();
        let mut panel = BranchPanel::new();
        let mut header = HeaderBar::new();
        let mut visible = true;
        let mut vs = view_state(&mut mindmap, &mut panel, &mut header, &mut visible);

        handle_app_message(
            AppMessage::SelectBranch { worktree_id: wt_id.clone(), name: old.clone() },
            &mut worktrees,
            &mut vs,
        );
        handle_app_message(
            AppMessage::RenameBranch {
                worktree_id: wt_id.clone(),
                old_name: old,
                new_name: "renamed".into(),
            },
            &mut worktrees,
            &mut vs,
        );
        assert_eq!(
            vs.branch_panel.selected_branch(),
            Some((wt_id.as_str(), "renamed"))
        );
    }

    #[test]
    fn open_branch_reveals_the_panel() {
        let mut worktrees = worktrees_for_project("1");
        let wt_id = worktrees[0].id.clone();
        let name = worktrees[0].branches[0].name.clone();

        let mut mindmap = MindmapView::new();
        let mut panel = BranchPanel::new();
        let mut header = HeaderBar::new();
        let mut visible = false;
        let mut vs = view_state(&mut mindmap, &mut panel, &mut header, &mut visible);

        handle_app_message(
            AppMessage::OpenBranch { worktree_id: wt_id, name },
            &mut worktrees,
            &mut vs,
        );
        assert!(*vs.panel_visible);
        assert!(vs.branch_panel.selected_branch().is_some());
    }
}
