//! Interaction state machine for the diagram.
//!
//! One tagged state at a time: opening any overlay structurally replaces
//! whatever was open before, so mutual exclusion between the context menu,
//! the inline rename editor, the delete confirmation and ghost previews
//! never needs cross-checking. The reducer is pure over semantic events;
//! side effects (mutations, pan updates, navigation) come back as `Effect`
//! values for the view to apply.

/// What a context click landed on.
#[derive(Clone, Debug, PartialEq)]
pub enum MenuTarget {
    Worktree { id: String },
    Branch { worktree_id: String, name: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum InteractionState {
    Idle,
    /// Pointer captured: every move routes here until release.
    Panning {
        start_screen: (f32, f32),
        start_pan: (f32, f32),
    },
    /// Ghost "add" affordances shown for one worktree.
    GhostPreview { worktree_id: String },
    ContextMenu {
        target: MenuTarget,
        screen_pos: (f32, f32),
    },
    RenamingWorktree { id: String },
    RenamingBranch { worktree_id: String, name: String },
    DeleteConfirm { worktree_id: String, name: String },
}

/// Semantic input, produced by the view's hit-testing.
#[derive(Clone, Debug)]
pub enum DiagramEvent {
    CanvasPress { screen: (f32, f32), pan: (f32, f32) },
    PointerDrag { screen: (f32, f32) },
    Release,
    WorktreeClick { id: String },
    GhostWorktreeClick,
    GhostBranchClick { worktree_id: String },
    BranchDoubleClick { worktree_id: String, name: String },
    ContextClick { target: MenuTarget, screen: (f32, f32) },
    MenuRenameWorktree { id: String },
    MenuRenameBranch { worktree_id: String, name: String },
    MenuDeleteWorktree { worktree_id: String, name: String },
    OutsideClick,
    RenameCommitted,
    RenameCanceled,
    DeleteConfirmed,
    DeleteCanceled,
    Escape,
}

/// Side effect requested by a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    SetPan { x: f32, y: f32 },
    AddWorktree,
    AddBranch { worktree_id: String },
    OpenBranch { worktree_id: String, name: String },
}

pub struct InteractionController {
    state: InteractionState,
    pending_focus: bool,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            state: InteractionState::Idle,
            pending_focus: false,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.state, InteractionState::Panning { .. })
    }

    /// True exactly once after a rename overlay opens; the view uses it to
    /// focus the inline editor on its first frame.
    pub fn take_pending_focus(&mut self) -> bool {
        std::mem::take(&mut self.pending_focus)
    }

    pub fn handle(&mut self, event: DiagramEvent) -> Option<Effect> {
        use DiagramEvent as E;
        use InteractionState as S;

        match event {
            E::CanvasPress { screen, pan } => {
                // A press over empty canvas closes whatever overlay is open;
                // from a neutral state it starts the pan gesture (and drops
                // any ghost previews).
                match self.state {
                    S::Idle | S::GhostPreview { .. } => {
                        self.state = S::Panning {
                            start_screen: screen,
                            start_pan: pan,
                        };
                    }
                    _ => self.state = S::Idle,
                }
                None
            }
            E::PointerDrag { screen } => match self.state {
                S::Panning { start_screen, start_pan } => Some(Effect::SetPan {
                    x: start_pan.0 + (screen.0 - start_screen.0),
                    y: start_pan.1 + (screen.1 - start_screen.1),
                }),
                _ => None,
            },
            E::Release => {
                if self.is_panning() {
                    self.state = S::Idle;
                }
                None
            }
            E::WorktreeClick { id } => {
                // Clicking the previewed worktree again toggles the ghosts off.
                self.state = match &self.state {
                    S::GhostPreview { worktree_id } if *worktree_id == id => S::Idle,
                    _ => S::GhostPreview { worktree_id: id },
                };
                None
            }
            E::GhostWorktreeClick => {
                self.state = S::Idle;
                Some(Effect::AddWorktree)
            }
            E::GhostBranchClick { worktree_id } => {
                self.state = S::Idle;
                Some(Effect::AddBranch { worktree_id })
            }
            E::BranchDoubleClick { worktree_id, name } => {
                Some(Effect::OpenBranch { worktree_id, name })
            }
            E::ContextClick { target, screen } => {
                // Replaces any open overlay, including another context menu.
                self.state = S::ContextMenu {
                    target,
                    screen_pos: screen,
                };
                None
            }
            E::MenuRenameWorktree { id } => {
                self.state = S::RenamingWorktree { id };
                self.pending_focus = true;
                None
            }
            E::MenuRenameBranch { worktree_id, name } => {
                self.state = S::RenamingBranch { worktree_id, name };
                self.pending_focus = true;
                None
            }
            E::MenuDeleteWorktree { worktree_id, name } => {
                self.state = S::DeleteConfirm { worktree_id, name };
                None
            }
            E::OutsideClick
            | E::RenameCommitted
            | E::RenameCanceled
            | E::DeleteConfirmed
            | E::DeleteCanceled => {
                self.state = S::Idle;
                None
            }
            E::Escape => {
                // One level per press: only the currently open state closes.
                if self.state != S::Idle {
                    self.state = S::Idle;
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DiagramEvent as E;
    use InteractionState as S;

    fn menu_target() -> MenuTarget {
        MenuTarget::Worktree { id: "wt-1".into() }
    }

    #[test]
    fn canvas_press_starts_pan_and_drag_moves_it() {
        let mut ic = InteractionController::new();
        ic.handle(E::CanvasPress { screen: (100.0, 100.0), pan: (10.0, 20.0) });
        assert!(ic.is_panning());

        let eff = ic.handle(E::PointerDrag { screen: (130.0, 90.0) });
        assert_eq!(eff, Some(Effect::SetPan { x: 40.0, y: 10.0 }));

        ic.handle(E::Release);
        assert_eq!(*ic.state(), S::Idle);
    }

    #[test]
    fn drag_outside_pan_is_ignored() {
        let mut ic = InteractionController::new();
        assert_eq!(ic.handle(E::PointerDrag { screen: (5.0, 5.0) }), None);
    }

    #[test]
    fn ghost_preview_toggles_per_worktree() {
        let mut ic = InteractionController::new();
        ic.handle(E::WorktreeClick { id: "wt-1".into() });
        assert_eq!(*ic.state(), S::GhostPreview { worktree_id: "wt-1".into() });

        // Different worktree moves the preview
        ic.handle(E::WorktreeClick { id: "wt-2".into() });
        assert_eq!(*ic.state(), S::GhostPreview { worktree_id: "wt-2".into() });

        // Same worktree toggles off
        ic.handle(E::WorktreeClick { id: "wt-2".into() });
        assert_eq!(*ic.state(), S::Idle);
    }

    #[test]
    fn ghost_clicks_emit_mutations_and_reset() {
        let mut ic = InteractionController::new();
        ic.handle(E::WorktreeClick { id: "wt-1".into() });
        let eff = ic.handle(E::GhostBranchClick { worktree_id: "wt-1".into() });
        assert_eq!(eff, Some(Effect::AddBranch { worktree_id: "wt-1".into() }));
        assert_eq!(*ic.state(), S::Idle);

        ic.handle(E::WorktreeClick { id: "wt-1".into() });
        assert_eq!(ic.handle(E::GhostWorktreeClick), Some(Effect::AddWorktree));
        assert_eq!(*ic.state(), S::Idle);
    }

    #[test]
    fn canvas_press_clears_ghosts_before_panning() {
        let mut ic = InteractionController::new();
        ic.handle(E::WorktreeClick { id: "wt-1".into() });
        ic.handle(E::CanvasPress { screen: (0.0, 0.0), pan: (0.0, 0.0) });
        assert!(ic.is_panning());
    }

    #[test]
    fn overlays_are_mutually_exclusive() {
        let mut ic = InteractionController::new();
        ic.handle(E::ContextClick { target: menu_target(), screen: (50.0, 60.0) });
        assert!(matches!(ic.state(), S::ContextMenu { .. }));

        // Opening the rename editor replaces the menu outright
        ic.handle(E::MenuRenameWorktree { id: "wt-1".into() });
        assert_eq!(*ic.state(), S::RenamingWorktree { id: "wt-1".into() });
        assert!(ic.take_pending_focus());
        assert!(!ic.take_pending_focus());

        // A context click while renaming replaces the editor
        ic.handle(E::ContextClick {
            target: MenuTarget::Branch { worktree_id: "wt-1".into(), name: "main".into() },
            screen: (80.0, 90.0),
        });
        assert!(matches!(ic.state(), S::ContextMenu { .. }));
    }

    #[test]
    fn delete_needs_explicit_confirmation() {
        let mut ic = InteractionController::new();
        ic.handle(E::MenuDeleteWorktree { worktree_id: "wt-1".into(), name: "Main".into() });
        assert_eq!(
            *ic.state(),
            S::DeleteConfirm { worktree_id: "wt-1".into(), name: "Main".into() }
        );
        ic.handle(E::DeleteCanceled);
        assert_eq!(*ic.state(), S::Idle);
    }

    #[test]
    fn escape_closes_one_level_per_press() {
        let mut ic = InteractionController::new();
        ic.handle(E::MenuRenameBranch { worktree_id: "wt-1".into(), name: "dev".into() });
        ic.handle(E::Escape);
        assert_eq!(*ic.state(), S::Idle);

        ic.handle(E::WorktreeClick { id: "wt-1".into() });
        ic.handle(E::Escape);
        assert_eq!(*ic.state(), S::Idle);
    }

    #[test]
    fn double_click_navigates_without_state_change() {
        let mut ic = InteractionController::new();
        ic.handle(E::WorktreeClick { id: "wt-1".into() });
        let eff = ic.handle(E::BranchDoubleClick {
            worktree_id: "wt-1".into(),
            name: "develop".into(),
        });
        assert_eq!(
            eff,
            Some(Effect::OpenBranch { worktree_id: "wt-1".into(), name: "develop".into() })
        );
        assert_eq!(*ic.state(), S::GhostPreview { worktree_id: "wt-1".into() });
    }

    #[test]
    fn canvas_press_closes_open_overlay_instead_of_panning() {
        let mut ic = InteractionController::new();
        ic.handle(E::ContextClick { target: menu_target(), screen: (5.0, 5.0) });
        ic.handle(E::CanvasPress { screen: (200.0, 200.0), pan: (0.0, 0.0) });
        assert_eq!(*ic.state(), S::Idle);
        assert!(!ic.is_panning());
    }
}
