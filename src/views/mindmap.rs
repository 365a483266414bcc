//! Worktree mindmap view - the pan/zoom diagram canvas
//!
//! Renders the worktree/branch hierarchy as rounded nodes joined by curved
//! connectors, and owns every piece of direct manipulation on it: panning,
//! cursor-anchored zoom, ghost "add" previews, the context menu, inline
//! rename, and the delete confirmation.

use std::time::{Duration, Instant};

use crate::diagram::geometry::FIT_PADDING;
use crate::diagram::interaction::{
    DiagramEvent, Effect, InteractionController, InteractionState, MenuTarget,
};
use crate::diagram::layout::{
    compute_layout, ghost_branch_connector, ghost_branch_rect, ghost_worktree_rect, BranchConnector,
    DiagramLayout,
};
use crate::diagram::viewport::Viewport;
use crate::input::{EventResponse, InputEvent, Key, MouseButton};
use crate::store::Worktree;
use crate::ui::widget::{
    create_dashed_rect_outline_vertices, create_circle_vertices, create_rect_vertices,
    create_rounded_rect_outline_vertices, create_rounded_rect_vertices, theme, Widget, WidgetOutput,
};
use crate::ui::widgets::{
    ConfirmDialog, ConfirmDialogAction, ContextMenu, MenuAction, MenuItem, TextInput, ZoomAction,
    ZoomHud,
};
use crate::ui::{Rect, TextRenderer};

const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

/// Zoom step for the HUD buttons
const ZOOM_STEP: f32 = 1.25;

/// Longest branch name shown on a node before truncation
const BRANCH_NAME_MAX: usize = 18;

/// Mutations and navigation requested by the view
#[derive(Clone, Debug, PartialEq)]
pub enum MindmapAction {
    RenameWorktree { id: String, new_name: String },
    RenameBranch { worktree_id: String, old_name: String, new_name: String },
    AddBranch { worktree_id: String },
    ForkBranch { worktree_id: String, source: String },
    AddWorktree,
    DuplicateWorktree { id: String },
    DeleteWorktree { id: String },
    OpenBranch { worktree_id: String, name: String },
    SelectBranch { worktree_id: String, name: String },
    HoverBranch { worktree_id: String, name: String },
}

pub struct MindmapView {
    viewport: Viewport,
    controller: InteractionController,
    context_menu: ContextMenu,
    rename_input: TextInput,
    confirm_dialog: ConfirmDialog,
    zoom_hud: ZoomHud,
    /// Fit once, on the first frame with a measured canvas
    needs_fit: bool,
    last_branch_click: Option<(String, String, Instant)>,
    hovered_worktree: Option<String>,
    hovered_branch: Option<(String, String)>,
    selected_branch: Option<(String, String)>,
    pending_actions: Vec<MindmapAction>,
}

impl MindmapView {
    pub fn new() -> Self {
        Self {
            viewport: Viewport::new(),
            controller: InteractionController::new(),
            context_menu: ContextMenu::new(),
            rename_input: TextInput::new(),
            confirm_dialog: ConfirmDialog::new(),
            zoom_hud: ZoomHud::new(),
            needs_fit: false,
            last_branch_click: None,
            hovered_worktree: None,
            hovered_branch: None,
            selected_branch: None,
            pending_actions: Vec::new(),
        }
    }

    /// Drain the actions accumulated since the last call
    pub fn take_actions(&mut self) -> Vec<MindmapAction> {
        std::mem::take(&mut self.pending_actions)
    }

    pub fn zoom(&self) -> f32 {
        self.viewport.scale
    }

    /// Re-fit on the next frame (e.g. after switching projects)
    pub fn request_fit(&mut self) {
        self.needs_fit = true;
    }

    pub fn selected_branch(&self) -> Option<(&str, &str)> {
        self.selected_branch
            .as_ref()
            .map(|(wt, name)| (wt.as_str(), name.as_str()))
    }

    /// Clear the selection if it no longer resolves to a branch
    pub fn sync_selection(&mut self, worktrees: &[Worktree]) {
        if let Some((wt_id, name)) = &self.selected_branch {
            let alive = worktrees
                .iter()
                .any(|wt| wt.id == *wt_id && wt.branch(name).is_some());
            if !alive {
                self.selected_branch = None;
            }
        }
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::SetPan { x, y } => {
                self.viewport.pan_x = x;
                self.viewport.pan_y = y;
            }
            Effect::AddWorktree => self.pending_actions.push(MindmapAction::AddWorktree),
            Effect::AddBranch { worktree_id } => self
                .pending_actions
                .push(MindmapAction::AddBranch { worktree_id }),
            Effect::OpenBranch { worktree_id, name } => self
                .pending_actions
                .push(MindmapAction::OpenBranch { worktree_id, name }),
        }
    }

    fn dispatch(&mut self, event: DiagramEvent) {
        if let Some(effect) = self.controller.handle(event) {
            self.apply_effect(effect);
        }
    }

    /// Transform a diagram-space rect into window coordinates
    fn rect_to_screen(&self, rect: &Rect, canvas: Rect) -> Rect {
        let (x, y) = self.viewport.diagram_to_screen(rect.x, rect.y);
        Rect::new(
            canvas.x + x,
            canvas.y + y,
            rect.width * self.viewport.scale,
            rect.height * self.viewport.scale,
        )
    }

    fn point_to_diagram(&self, x: f32, y: f32, canvas: Rect) -> (f32, f32) {
        self.viewport.screen_to_diagram(x - canvas.x, y - canvas.y)
    }

    fn zoom_hud_bounds(&self, canvas: Rect) -> Rect {
        let (w, h) = ZoomHud::size();
        Rect::new(canvas.x + 16.0, canvas.bottom() - h - 16.0, w, h)
    }

    /// Bounds of the inline rename editor in window coordinates
    fn rename_bounds(&self, layout: &DiagramLayout, canvas: Rect) -> Option<Rect> {
        match self.controller.state() {
            InteractionState::RenamingWorktree { id } => layout
                .worktree_node(id)
                .map(|node| self.rect_to_screen(&node.rect, canvas)),
            InteractionState::RenamingBranch { worktree_id, name } => layout
                .branch_node(worktree_id, name)
                .map(|node| self.rect_to_screen(&node.rect, canvas)),
            _ => None,
        }
    }

    fn open_context_menu(&mut self, target: MenuTarget, x: f32, y: f32) {
        let items = match &target {
            MenuTarget::Worktree { .. } => vec![
                MenuItem::new("Rename", "rename-worktree"),
                MenuItem::new("Add branch", "add-branch"),
                MenuItem::new("Duplicate", "duplicate-worktree"),
                MenuItem::new("Delete", "delete-worktree").destructive(),
            ],
            MenuTarget::Branch { .. } => vec![
                MenuItem::new("Rename", "rename-branch"),
                MenuItem::new("Fork", "fork-branch"),
                MenuItem::new("Open", "open-branch").with_shortcut("dbl-click"),
            ],
        };
        self.context_menu.show(items, x, y);
        self.dispatch(DiagramEvent::ContextClick { target, screen: (x, y) });
    }

    fn handle_menu_action(&mut self, action_id: &str, worktrees: &[Worktree]) {
        let InteractionState::ContextMenu { target, .. } = self.controller.state().clone() else {
            return;
        };

        match (action_id, target) {
            ("rename-worktree", MenuTarget::Worktree { id }) => {
                if let Some(wt) = worktrees.iter().find(|wt| wt.id == id) {
                    self.rename_input.set_text(wt.name.clone());
                    self.rename_input.select_all();
                }
                self.dispatch(DiagramEvent::MenuRenameWorktree { id });
            }
            ("add-branch", MenuTarget::Worktree { id }) => {
                self.dispatch(DiagramEvent::OutsideClick);
                self.pending_actions
                    .push(MindmapAction::AddBranch { worktree_id: id });
            }
            ("duplicate-worktree", MenuTarget::Worktree { id }) => {
                self.dispatch(DiagramEvent::OutsideClick);
                self.pending_actions
                    .push(MindmapAction::DuplicateWorktree { id });
            }
            ("delete-worktree", MenuTarget::Worktree { id }) => {
                let name = worktrees
                    .iter()
                    .find(|wt| wt.id == id)
                    .map(|wt| wt.name.clone())
                    .unwrap_or_default();
                self.confirm_dialog.show(
                    "Delete worktree?",
                    &format!("\"{}\" and its branches will be removed.", name),
                );
                self.dispatch(DiagramEvent::MenuDeleteWorktree { worktree_id: id, name });
            }
            ("rename-branch", MenuTarget::Branch { worktree_id, name }) => {
                self.rename_input.set_text(name.clone());
                self.rename_input.select_all();
                self.dispatch(DiagramEvent::MenuRenameBranch { worktree_id, name });
            }
            ("fork-branch", MenuTarget::Branch { worktree_id, name }) => {
                self.dispatch(DiagramEvent::OutsideClick);
                self.pending_actions.push(MindmapAction::ForkBranch {
                    worktree_id,
                    source: name,
                });
            }
            ("open-branch", MenuTarget::Branch { worktree_id, name }) => {
                self.dispatch(DiagramEvent::OutsideClick);
                self.pending_actions
                    .push(MindmapAction::OpenBranch { worktree_id, name });
            }
            _ => {}
        }
    }

    fn commit_rename(&mut self, worktrees: &[Worktree]) {
        let new_name = self.rename_input.text().trim().to_string();
        match self.controller.state().clone() {
            InteractionState::RenamingWorktree { id } => {
                let unchanged = worktrees
                    .iter()
                    .find(|wt| wt.id == id)
                    .map(|wt| wt.name == new_name)
                    .unwrap_or(true);
                if !new_name.is_empty() && !unchanged {
                    self.pending_actions
                        .push(MindmapAction::RenameWorktree { id, new_name });
                }
            }
            InteractionState::RenamingBranch { worktree_id, name } => {
                if !new_name.is_empty() && new_name != name {
                    self.pending_actions.push(MindmapAction::RenameBranch {
                        worktree_id,
                        old_name: name,
                        new_name,
                    });
                }
            }
            _ => {}
        }
        self.rename_input.set_focused(false);
        self.dispatch(DiagramEvent::RenameCommitted);
    }

    fn cancel_rename(&mut self) {
        self.rename_input.set_focused(false);
        self.dispatch(DiagramEvent::RenameCanceled);
    }

    fn branch_click(&mut self, worktree_id: String, name: String) {
        let now = Instant::now();
        let is_double = self
            .last_branch_click
            .as_ref()
            .map(|(wt, n, t)| {
                *wt == worktree_id && *n == name && now.duration_since(*t) < DOUBLE_CLICK_WINDOW
            })
            .unwrap_or(false);

        if is_double {
            self.last_branch_click = None;
            self.dispatch(DiagramEvent::BranchDoubleClick {
                worktree_id: worktree_id.clone(),
                name: name.clone(),
            });
        } else {
            self.last_branch_click = Some((worktree_id.clone(), name.clone(), now));
        }

        self.selected_branch = Some((worktree_id.clone(), name.clone()));
        self.pending_actions
            .push(MindmapAction::SelectBranch { worktree_id, name });
    }

    pub fn handle_event(
        &mut self,
        event: &InputEvent,
        canvas: Rect,
        worktrees: &[Worktree],
    ) -> EventResponse {
        let layout = compute_layout(worktrees);

        // Modal layers first: the delete confirmation swallows everything
        if self.confirm_dialog.is_visible() {
            let response = self.confirm_dialog.handle_event(event, canvas);
            if let Some(action) = self.confirm_dialog.take_action() {
                match action {
                    ConfirmDialogAction::Confirm => {
                        if let InteractionState::DeleteConfirm { worktree_id, .. } =
                            self.controller.state().clone()
                        {
                            self.pending_actions
                                .push(MindmapAction::DeleteWorktree { id: worktree_id });
                        }
                        self.dispatch(DiagramEvent::DeleteConfirmed);
                    }
                    ConfirmDialogAction::Cancel => self.dispatch(DiagramEvent::DeleteCanceled),
                }
            }
            return response;
        }

        // Inline rename: Enter commits, Escape cancels, click-away commits
        if matches!(
            self.controller.state(),
            InteractionState::RenamingWorktree { .. } | InteractionState::RenamingBranch { .. }
        ) {
            if self.controller.take_pending_focus() {
                self.rename_input.set_focused(true);
            }

            if let InputEvent::KeyDown { key, .. } = event {
                match key {
                    Key::Enter => {
                        self.commit_rename(worktrees);
                        return EventResponse::Consumed;
                    }
                    Key::Escape => {
                        self.cancel_rename();
                        return EventResponse::Consumed;
                    }
                    _ => {}
                }
            }

            let editor_bounds = self
                .rename_bounds(&layout, canvas)
                .unwrap_or(Rect::from_size(0.0, 0.0));

            if let InputEvent::MouseDown { x, y, .. } = event {
                if !editor_bounds.contains(*x, *y) {
                    self.commit_rename(worktrees);
                    return EventResponse::Consumed;
                }
            }

            return self.rename_input.handle_event(event, editor_bounds);
        }

        // Context menu overlay
        if self.context_menu.is_visible() {
            let response = self.context_menu.handle_event(event);
            if let Some(MenuAction::Selected(action_id)) = self.context_menu.take_action() {
                self.handle_menu_action(&action_id, worktrees);
                return EventResponse::Consumed;
            }
            // Keep the state machine in step when the menu closed itself
            // (Escape, outside click, another right-click)
            if !self.context_menu.is_visible()
                && matches!(self.controller.state(), InteractionState::ContextMenu { .. })
            {
                self.dispatch(DiagramEvent::OutsideClick);
            }
            if response.is_consumed() {
                return response;
            }
            // Fall through so the closing click still lands on the canvas
        }

        // Zoom HUD
        let hud_bounds = self.zoom_hud_bounds(canvas);
        if self.zoom_hud.handle_event(event, hud_bounds).is_consumed() {
            if let Some(action) = self.zoom_hud.take_action() {
                match action {
                    ZoomAction::ZoomIn => {
                        self.viewport.zoom_by(ZOOM_STEP, canvas.width, canvas.height)
                    }
                    ZoomAction::ZoomOut => {
                        self.viewport
                            .zoom_by(1.0 / ZOOM_STEP, canvas.width, canvas.height)
                    }
                    ZoomAction::Fit => self.viewport.fit_to_view(
                        canvas.width,
                        canvas.height,
                        layout.total_width,
                        layout.total_height,
                        FIT_PADDING,
                    ),
                }
            }
            return EventResponse::Consumed;
        }

        match event {
            InputEvent::KeyDown { key: Key::Escape, .. } => {
                self.dispatch(DiagramEvent::Escape);
                EventResponse::Consumed
            }
            InputEvent::Scroll { delta_y, x, y, .. } => {
                if canvas.contains(*x, *y) {
                    let factor = (delta_y * 0.0015).exp();
                    self.viewport.zoom_at(x - canvas.x, y - canvas.y, factor);
                    return EventResponse::Consumed;
                }
                EventResponse::Ignored
            }
            InputEvent::MouseDown { button: MouseButton::Left, x, y, .. } => {
                if !canvas.contains(*x, *y) {
                    return EventResponse::Ignored;
                }
                let (dx, dy) = self.point_to_diagram(*x, *y, canvas);

                // Ghost affordances, when previewed
                if let InteractionState::GhostPreview { worktree_id } =
                    self.controller.state().clone()
                {
                    if let Some(ghost) = ghost_branch_rect(&layout, &worktree_id) {
                        if ghost.contains(dx, dy) {
                            self.dispatch(DiagramEvent::GhostBranchClick { worktree_id });
                            return EventResponse::Consumed;
                        }
                    }
                    if ghost_worktree_rect(worktrees.len()).contains(dx, dy) {
                        self.dispatch(DiagramEvent::GhostWorktreeClick);
                        return EventResponse::Consumed;
                    }
                }

                // Branch nodes sit visually in front of worktree nodes
                if let Some(node) = layout.branches.iter().find(|b| b.rect.contains(dx, dy)) {
                    self.branch_click(node.worktree_id.clone(), node.name.clone());
                    return EventResponse::Consumed;
                }

                if let Some(node) = layout.worktrees.iter().find(|w| w.rect.contains(dx, dy)) {
                    self.dispatch(DiagramEvent::WorktreeClick { id: node.id.clone() });
                    return EventResponse::Consumed;
                }

                self.dispatch(DiagramEvent::CanvasPress {
                    screen: (*x, *y),
                    pan: (self.viewport.pan_x, self.viewport.pan_y),
                });
                EventResponse::Consumed
            }
            InputEvent::MouseDown { button: MouseButton::Right, x, y, .. } => {
                if !canvas.contains(*x, *y) {
                    return EventResponse::Ignored;
                }
                let (dx, dy) = self.point_to_diagram(*x, *y, canvas);

                if let Some(node) = layout.branches.iter().find(|b| b.rect.contains(dx, dy)) {
                    self.open_context_menu(
                        MenuTarget::Branch {
                            worktree_id: node.worktree_id.clone(),
                            name: node.name.clone(),
                        },
                        *x,
                        *y,
                    );
                    return EventResponse::Consumed;
                }

                if let Some(node) = layout.worktrees.iter().find(|w| w.rect.contains(dx, dy)) {
                    self.open_context_menu(MenuTarget::Worktree { id: node.id.clone() }, *x, *y);
                    return EventResponse::Consumed;
                }

                EventResponse::Ignored
            }
            InputEvent::MouseMove { x, y, .. } => {
                if self.controller.is_panning() {
                    self.dispatch(DiagramEvent::PointerDrag { screen: (*x, *y) });
                    return EventResponse::Consumed;
                }

                let previous = self.hovered_branch.take();
                self.hovered_worktree = None;
                if canvas.contains(*x, *y) {
                    let (dx, dy) = self.point_to_diagram(*x, *y, canvas);
                    if let Some(node) = layout.branches.iter().find(|b| b.rect.contains(dx, dy)) {
                        self.hovered_branch =
                            Some((node.worktree_id.clone(), node.name.clone()));
                    } else if let Some(node) =
                        layout.worktrees.iter().find(|w| w.rect.contains(dx, dy))
                    {
                        self.hovered_worktree = Some(node.id.clone());
                    }
                }
                // Report every entry into a branch node, but not motion within it
                if self.hovered_branch != previous
                    && let Some((worktree_id, name)) = self.hovered_branch.clone()
                {
                    self.pending_actions
                        .push(MindmapAction::HoverBranch { worktree_id, name });
                }
                EventResponse::Ignored
            }
            InputEvent::MouseUp { button: MouseButton::Left, .. } => {
                if self.controller.is_panning() {
                    self.dispatch(DiagramEvent::Release);
                    return EventResponse::Consumed;
                }
                EventResponse::Ignored
            }
            _ => EventResponse::Ignored,
        }
    }

    pub fn layout(
        &mut self,
        text_renderer: &TextRenderer,
        canvas: Rect,
        worktrees: &[Worktree],
    ) -> WidgetOutput {
        let mut output = WidgetOutput::new();
        let diagram = compute_layout(worktrees);

        if self.needs_fit && canvas.width > 0.0 && canvas.height > 0.0 {
            self.viewport.fit_to_view(
                canvas.width,
                canvas.height,
                diagram.total_width,
                diagram.total_height,
                FIT_PADDING,
            );
            self.needs_fit = false;
        }

        // Canvas background
        output
            .spline_vertices
            .extend(create_rect_vertices(&canvas, theme::PANEL_CANVAS.to_array()));

        let scale = self.viewport.scale;

        // Trunk connectors between consecutive worktree rows (dashed)
        for trunk in &diagram.trunks {
            let (x, y_top) = self.to_screen(trunk.x, trunk.y_top, canvas);
            let (_, y_bottom) = self.to_screen(trunk.x, trunk.y_bottom, canvas);
            self.push_vertical_dashes(&mut output, x, y_top, y_bottom, scale);
        }

        // Curved branch connectors
        for connector in &diagram.connectors {
            self.push_connector(&mut output, connector, canvas, 0.6);
        }

        // Worktree nodes
        for node in &diagram.worktrees {
            let rect = self.rect_to_screen(&node.rect, canvas);
            let hovered = self.hovered_worktree.as_deref() == Some(node.id.as_str());
            let previewed = matches!(
                self.controller.state(),
                InteractionState::GhostPreview { worktree_id } if *worktree_id == node.id
            );

            let fill = if hovered {
                theme::SURFACE_RAISED.lighten(0.03)
            } else {
                theme::SURFACE_RAISED
            };
            let radius = 8.0 * scale;
            output
                .spline_vertices
                .extend(create_rounded_rect_vertices(&rect, fill.to_array(), radius));

            let outline = if previewed {
                node.accent
            } else {
                theme::BORDER.to_array()
            };
            output.spline_vertices.extend(create_rounded_rect_outline_vertices(
                &rect, outline, radius, 1.0,
            ));

            // Accent bar along the left edge
            let bar = Rect::new(rect.x, rect.y + radius, 3.0 * scale, rect.height - radius * 2.0);
            output.spline_vertices.extend(create_rect_vertices(&bar, node.accent));

            let wt = worktrees.iter().find(|wt| wt.id == node.id);
            let renaming = matches!(
                self.controller.state(),
                InteractionState::RenamingWorktree { id } if *id == node.id
            );
            if let Some(wt) = wt {
                if !renaming {
                    let text_x = rect.x + 12.0 * scale;
                    output.text_vertices.extend(text_renderer.layout_text_scaled(
                        &wt.name,
                        text_x,
                        rect.y + 8.0 * scale,
                        theme::TEXT_BRIGHT.to_array(),
                        scale,
                    ));
                    output.text_vertices.extend(text_renderer.layout_text_scaled(
                        &wt.path,
                        text_x,
                        rect.y + 8.0 * scale + text_renderer.line_height() * scale,
                        theme::TEXT_MUTED.to_array(),
                        0.85 * scale,
                    ));
                }
            }
        }

        // Branch nodes
        for node in &diagram.branches {
            let rect = self.rect_to_screen(&node.rect, canvas);
            let hovered = self
                .hovered_branch
                .as_ref()
                .map(|(wt, n)| *wt == node.worktree_id && *n == node.name)
                .unwrap_or(false);
            let selected = self
                .selected_branch
                .as_ref()
                .map(|(wt, n)| *wt == node.worktree_id && *n == node.name)
                .unwrap_or(false);

            let fill = if hovered {
                theme::SURFACE.lighten(0.04)
            } else {
                theme::SURFACE
            };
            let radius = 6.0 * scale;
            output
                .spline_vertices
                .extend(create_rounded_rect_vertices(&rect, fill.to_array(), radius));

            let outline = if selected { node.accent } else { theme::BORDER.to_array() };
            output.spline_vertices.extend(create_rounded_rect_outline_vertices(
                &rect,
                outline,
                radius,
                if selected { 1.5 } else { 1.0 },
            ));

            let renaming = matches!(
                self.controller.state(),
                InteractionState::RenamingBranch { worktree_id, name }
                    if *worktree_id == node.worktree_id && *name == node.name
            );
            if renaming {
                continue;
            }

            let branch = worktrees
                .iter()
                .find(|wt| wt.id == node.worktree_id)
                .and_then(|wt| wt.branch(&node.name));

            let mut text_x = rect.x + 10.0 * scale;

            // Dot marks the worktree's current branch
            if branch.map(|b| b.is_current).unwrap_or(false) {
                let cy = rect.y + rect.height / 2.0;
                output.spline_vertices.extend(create_circle_vertices(
                    text_x + 3.0 * scale,
                    cy,
                    3.0 * scale,
                    node.accent,
                ));
                text_x += 10.0 * scale;
            }

            output.text_vertices.extend(text_renderer.layout_text_scaled(
                &truncate_label(&node.name),
                text_x,
                rect.y + 5.0 * scale,
                theme::TEXT.to_array(),
                scale,
            ));

            if let Some(branch) = branch {
                output.text_vertices.extend(text_renderer.layout_text_scaled(
                    &branch.last_commit,
                    text_x,
                    rect.y + 5.0 * scale + text_renderer.line_height() * scale * 0.95,
                    theme::TEXT_MUTED.to_array(),
                    0.75 * scale,
                ));
            }
        }

        // Ghost previews
        if let InteractionState::GhostPreview { worktree_id } = self.controller.state().clone() {
            if let Some(ghost) = ghost_branch_rect(&diagram, &worktree_id) {
                if let Some(connector) = ghost_branch_connector(&diagram, &worktree_id, ghost) {
                    self.push_connector(&mut output, &connector, canvas, 0.3);
                }
                self.push_ghost(&mut output, text_renderer, &ghost, canvas, "+ branch");
            }
            let ghost_wt = ghost_worktree_rect(worktrees.len());
            self.push_ghost(&mut output, text_renderer, &ghost_wt, canvas, "+ worktree");
        }

        // Inline rename editor on top of the node it edits
        if let Some(editor_bounds) = self.rename_bounds(&diagram, canvas) {
            output.extend(self.rename_input.layout(text_renderer, editor_bounds));
        }

        // Zoom HUD
        self.zoom_hud.zoom = self.viewport.scale;
        let hud_bounds = self.zoom_hud_bounds(canvas);
        output.extend(self.zoom_hud.layout(text_renderer, hud_bounds));

        // Overlays last so they render on top
        output.extend(self.context_menu.layout(text_renderer));
        output.extend(self.confirm_dialog.layout(text_renderer, canvas));

        output
    }

    fn to_screen(&self, x: f32, y: f32, canvas: Rect) -> (f32, f32) {
        let (sx, sy) = self.viewport.diagram_to_screen(x, y);
        (canvas.x + sx, canvas.y + sy)
    }

    fn push_connector(
        &self,
        output: &mut WidgetOutput,
        connector: &BranchConnector,
        canvas: Rect,
        alpha: f32,
    ) {
        use crate::ui::{Spline, SplinePoint};

        let (fx, fy) = self.to_screen(connector.from.0, connector.from.1, canvas);
        let (c1x, c1y) = self.to_screen(connector.ctrl1.0, connector.ctrl1.1, canvas);
        let (c2x, c2y) = self.to_screen(connector.ctrl2.0, connector.ctrl2.1, canvas);
        let (tx, ty) = self.to_screen(connector.to.0, connector.to.1, canvas);

        let color = [
            connector.accent[0],
            connector.accent[1],
            connector.accent[2],
            connector.accent[3] * alpha,
        ];
        let mut spline = Spline::new(
            SplinePoint::new(fx, fy),
            color,
            (2.0 * self.viewport.scale).max(1.0),
        );
        spline.cubic_to(
            SplinePoint::new(c1x, c1y),
            SplinePoint::new(c2x, c2y),
            SplinePoint::new(tx, ty),
        );
        output.spline_vertices.extend(spline.to_vertices(24));
    }

    fn push_vertical_dashes(
        &self,
        output: &mut WidgetOutput,
        x: f32,
        y_top: f32,
        y_bottom: f32,
        scale: f32,
    ) {
        let dash = 6.0 * scale;
        let gap = 4.0 * scale;
        let width = (1.5 * scale).max(1.0);
        let color = theme::BORDER_LIGHT.to_array();

        let mut y = y_top;
        while y < y_bottom {
            let end = (y + dash).min(y_bottom);
            let rect = Rect::new(x - width / 2.0, y, width, end - y);
            output.spline_vertices.extend(create_rect_vertices(&rect, color));
            y = end + gap;
        }
    }

    fn push_ghost(
        &self,
        output: &mut WidgetOutput,
        text_renderer: &TextRenderer,
        ghost: &Rect,
        canvas: Rect,
        label: &str,
    ) {
        let rect = self.rect_to_screen(ghost, canvas);
        let scale = self.viewport.scale;
        let color = theme::TEXT_MUTED.with_alpha(0.6).to_array();

        output.spline_vertices.extend(create_dashed_rect_outline_vertices(
            &rect,
            color,
            1.0,
            6.0 * scale,
            4.0 * scale,
        ));

        let text_w = text_renderer.measure_text_scaled(label, scale);
        output.text_vertices.extend(text_renderer.layout_text_scaled(
            label,
            rect.x + (rect.width - text_w) / 2.0,
            rect.y + (rect.height - text_renderer.line_height() * scale) / 2.0,
            color,
            scale,
        ));
    }
}

impl Default for MindmapView {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorten long branch names for node labels
fn truncate_label(name: &str) -> String {
    if name.chars().count() <= BRANCH_NAME_MAX {
        name.to_string()
    } else {
        let head: String = name.chars().take(BRANCH_NAME_MAX - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::store::worktrees_for_project;

    fn canvas() -> Rect {
        Rect::new(0.0, 48.0, 1280.0, 672.0)
    }

    fn left_down(x: f32, y: f32) -> InputEvent {
        InputEvent::MouseDown { button: MouseButton::Left, x, y, modifiers: Modifiers::empty() }
    }

    fn right_down(x: f32, y: f32) -> InputEvent {
        InputEvent::MouseDown { button: MouseButton::Right, x, y, modifiers: Modifiers::empty() }
    }

    /// Window coordinates of a diagram point for an identity viewport
    fn at(view: &MindmapView, canvas: Rect, x: f32, y: f32) -> (f32, f32) {
        let (sx, sy) = view.viewport.diagram_to_screen(x, y);
        (canvas.x + sx, canvas.y + sy)
    }

    #[test]
    fn clicking_a_worktree_then_its_ghost_adds_a_branch() {
        let mut view = MindmapView::new();
        let worktrees = worktrees_for_project("1");
        let layout = compute_layout(&worktrees);
        let c = canvas();

        let wt = &layout.worktrees[0];
        let (x, y) = at(
            &view,
            c,
            wt.rect.x + wt.rect.width / 2.0,
            wt.rect.y + wt.rect.height / 2.0,
        );
        view.handle_event(&left_down(x, y), c, &worktrees);
        assert!(matches!(
            view.controller.state(),
            InteractionState::GhostPreview { .. }
        ));

        let ghost = ghost_branch_rect(&layout, &wt.id).unwrap();
        let (gx, gy) = at(
            &view,
            c,
            ghost.x + ghost.width / 2.0,
            ghost.y + ghost.height / 2.0,
        );
        view.handle_event(&left_down(gx, gy), c, &worktrees);

        let actions = view.take_actions();
        assert!(actions
            .iter()
            .any(|a| *a == MindmapAction::AddBranch { worktree_id: wt.id.clone() }));
    }

    #[test]
    fn double_clicking_a_branch_opens_it() {
        let mut view = MindmapView::new();
        let worktrees = worktrees_for_project("1");
        let layout = compute_layout(&worktrees);
        let c = canvas();

        let node = &layout.branches[0];
        let (x, y) = at(
            &view,
            c,
            node.rect.x + node.rect.width / 2.0,
            node.rect.y + node.rect.height / 2.0,
        );
        view.handle_event(&left_down(x, y), c, &worktrees);
        view.handle_event(&left_down(x, y), c, &worktrees);

        let actions = view.take_actions();
        assert!(actions.iter().any(|a| matches!(
            a,
            MindmapAction::OpenBranch { worktree_id, name }
                if *worktree_id == node.worktree_id && *name == node.name
        )));
        // The first click also selected the branch for the detail panel
        assert!(actions
            .iter()
            .any(|a| matches!(a, MindmapAction::SelectBranch { .. })));
    }

    #[test]
    fn hovering_a_branch_reports_it_once_per_entry() {
        let mut view = MindmapView::new();
        let worktrees = worktrees_for_project("1");
        let layout = compute_layout(&worktrees);
        let c = canvas();

        let node = &layout.branches[0];
        let (x, y) = at(
            &view,
            c,
            node.rect.x + node.rect.width / 2.0,
            node.rect.y + node.rect.height / 2.0,
        );
        let hover = |x: f32, y: f32| InputEvent::MouseMove {
            x,
            y,
            modifiers: Modifiers::empty(),
        };

        view.handle_event(&hover(x, y), c, &worktrees);
        view.handle_event(&hover(x + 2.0, y), c, &worktrees);
        let reports: Vec<_> = view
            .take_actions()
            .into_iter()
            .filter(|a| matches!(a, MindmapAction::HoverBranch { .. }))
            .collect();
        assert_eq!(
            reports,
            vec![MindmapAction::HoverBranch {
                worktree_id: node.worktree_id.clone(),
                name: node.name.clone(),
            }]
        );

        // Leaving and re-entering fires again
        view.handle_event(&hover(c.right() - 5.0, c.bottom() - 5.0), c, &worktrees);
        view.handle_event(&hover(x, y), c, &worktrees);
        assert!(view
            .take_actions()
            .iter()
            .any(|a| matches!(a, MindmapAction::HoverBranch { .. })));
    }

    #[test]
    fn right_click_then_delete_requires_confirmation() {
        let mut view = MindmapView::new();
        let worktrees = worktrees_for_project("1");
        let layout = compute_layout(&worktrees);
        let c = canvas();

        let wt = &layout.worktrees[0];
        let (x, y) = at(
            &view,
            c,
            wt.rect.x + wt.rect.width / 2.0,
            wt.rect.y + wt.rect.height / 2.0,
        );
        view.handle_event(&right_down(x, y), c, &worktrees);
        assert!(view.context_menu.is_visible());

        view.handle_menu_action("delete-worktree", &worktrees);
        assert!(view.confirm_dialog.is_visible());
        assert!(matches!(
            view.controller.state(),
            InteractionState::DeleteConfirm { .. }
        ));

        // Enter confirms
        let enter = InputEvent::KeyDown {
            key: Key::Enter,
            modifiers: Modifiers::empty(),
            text: None,
        };
        view.handle_event(&enter, c, &worktrees);
        let actions = view.take_actions();
        assert!(actions
            .iter()
            .any(|a| *a == MindmapAction::DeleteWorktree { id: wt.id.clone() }));
    }

    #[test]
    fn drag_on_empty_canvas_pans_the_viewport() {
        let mut view = MindmapView::new();
        let worktrees = worktrees_for_project("1");
        let c = canvas();

        // Far corner of the canvas is empty space
        view.handle_event(&left_down(c.right() - 5.0, c.bottom() - 5.0), c, &worktrees);
        assert!(view.controller.is_panning());

        let before = (view.viewport.pan_x, view.viewport.pan_y);
        let drag = InputEvent::MouseMove {
            x: c.right() - 45.0,
            y: c.bottom() - 25.0,
            modifiers: Modifiers::empty(),
        };
        view.handle_event(&drag, c, &worktrees);
        assert_eq!(view.viewport.pan_x, before.0 - 40.0);
        assert_eq!(view.viewport.pan_y, before.1 - 20.0);

        let up = InputEvent::MouseUp {
            button: MouseButton::Left,
            x: 0.0,
            y: 0.0,
            modifiers: Modifiers::empty(),
        };
        view.handle_event(&up, c, &worktrees);
        assert!(!view.controller.is_panning());
    }

    #[test]
    fn scroll_zooms_within_limits() {
        let mut view = MindmapView::new();
        let worktrees = worktrees_for_project("1");
        let c = canvas();

        for _ in 0..200 {
            let scroll = InputEvent::Scroll {
                delta_x: 0.0,
                delta_y: 20.0,
                x: c.x + 100.0,
                y: c.y + 100.0,
                modifiers: Modifiers::empty(),
            };
            view.handle_event(&scroll, c, &worktrees);
        }
        assert!(view.viewport.scale <= 2.5 + 1e-5);

        for _ in 0..400 {
            let scroll = InputEvent::Scroll {
                delta_x: 0.0,
                delta_y: -20.0,
                x: c.x + 100.0,
                y: c.y + 100.0,
                modifiers: Modifiers::empty(),
            };
            view.handle_event(&scroll, c, &worktrees);
        }
        assert!(view.viewport.scale >= 0.3 - 1e-5);
    }

    #[test]
    fn stale_selection_is_dropped() {
        let mut view = MindmapView::new();
        let worktrees = worktrees_for_project("1");
        view.selected_branch = Some((worktrees[0].id.clone(), "no-such-branch".into()));
        view.sync_selection(&worktrees);
        assert!(view.selected_branch.is_none());
    }

    #[test]
    fn truncation_keeps_short_names_intact() {
        assert_eq!(truncate_label("main"), "main");
        assert_eq!(
            truncate_label("a-very-long-branch-name-indeed"),
            "a-very-long-bra..."
        );
    }
}
