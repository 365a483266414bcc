//! Widget implementations

mod button;
mod confirm_dialog;
mod context_menu;
mod header_bar;
mod text_input;
mod zoom_hud;

pub use button::Button;
pub use confirm_dialog::{ConfirmDialog, ConfirmDialogAction};
pub use context_menu::{ContextMenu, MenuAction, MenuItem};
pub use header_bar::{HeaderAction, HeaderBar};
pub use text_input::TextInput;
pub use zoom_hud::{ZoomAction, ZoomHud};
