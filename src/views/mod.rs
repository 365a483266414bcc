mod branch_panel;
mod mindmap;

pub use branch_panel::{BranchPanel, PanelAction};
pub use mindmap::{MindmapAction, MindmapView};
